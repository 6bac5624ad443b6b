use aisle_catalog::Flight;

/// Upgrade adjacency between fare classes.
///
/// The class at position `i` upgrades only to position `i + 1`. A configured
/// order is first narrowed to the classes the flight actually has; with no
/// configuration the flight's own cheapest-to-dearest order applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPriority {
    order: Vec<String>,
}

impl ClassPriority {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        for class in classes {
            let class = class.into();
            if !order.contains(&class) {
                order.push(class);
            }
        }
        Self { order }
    }

    pub fn is_configured(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.order
    }

    /// The flight's classes in upgrade order
    pub fn resolve(&self, flight: &Flight) -> Vec<String> {
        if !self.is_configured() {
            return flight.fare_classes();
        }
        self.order
            .iter()
            .filter(|class| flight.has_fare_class(class))
            .cloned()
            .collect()
    }

    /// The single class one tier above `fare_class`, if any
    pub fn upgrade_for(&self, flight: &Flight, fare_class: &str) -> Option<String> {
        let classes = self.resolve(flight);
        let position = classes.iter().position(|class| class == fare_class)?;
        classes.get(position + 1).cloned()
    }
}
