use serde::{Deserialize, Serialize};

/// One cell of a fare-class seat layout.
///
/// A non-empty `special` marker (crew rest, blocked, ...) makes the seat
/// permanently unbookable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSpec {
    #[serde(default)]
    pub special: String,
}

impl SeatSpec {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn special(marker: impl Into<String>) -> Self {
        Self { special: marker.into() }
    }
}

/// Rectangular seat grid, row-major: `layout[row][column]`
pub type SeatLayout = Vec<Vec<SeatSpec>>;

/// Point-in-time inventory figures for one fare class of a flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareClassSummary {
    pub fare_class: String,
    pub total: usize,
    pub available: usize,
    pub base_fare: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_spec_defaults_to_open() {
        let spec: SeatSpec = serde_json::from_str("{}").expect("Failed to deserialize");
        assert_eq!(spec, SeatSpec::open());

        let blocked: SeatSpec = serde_json::from_str(r#"{"special": "crew"}"#).expect("Failed to deserialize");
        assert_eq!(blocked.special, "crew");
    }
}
