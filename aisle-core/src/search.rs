use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Exact-match flight lookup
#[derive(Debug, Clone, Deserialize)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate, // UTC calendar day of departure
}

impl FlightQuery {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date,
        }
    }

    pub fn matches(&self, origin: &str, destination: &str, departure: DateTime<Utc>) -> bool {
        self.origin == origin && self.destination == destination && departure.date_naive() == self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_deserialization() {
        let json = r#"
            {
                "origin": "BKK",
                "destination": "NRT",
                "date": "2026-12-25"
            }
        "#;
        let query: FlightQuery = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(query.origin, "BKK");
        assert_eq!(query.date, NaiveDate::from_ymd_opt(2026, 12, 25).unwrap());
    }

    #[test]
    fn test_matches_same_day_only() {
        let query = FlightQuery::new("BKK", "NRT", NaiveDate::from_ymd_opt(2026, 12, 25).unwrap());

        let morning = Utc.with_ymd_and_hms(2026, 12, 25, 6, 30, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 12, 25, 23, 59, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2026, 12, 26, 0, 5, 0).unwrap();

        assert!(query.matches("BKK", "NRT", morning));
        assert!(query.matches("BKK", "NRT", late));
        assert!(!query.matches("BKK", "NRT", next_day));
        assert!(!query.matches("NRT", "BKK", morning));
    }
}
