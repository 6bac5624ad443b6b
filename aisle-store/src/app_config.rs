use serde::Deserialize;
use std::env;
use aisle_shared::{SeatLayout, SeatSpec};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BookingConfig {
    /// Upgrade order, lowest tier first. Empty means cheapest-to-dearest.
    #[serde(default)]
    pub class_priority: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    #[serde(default)]
    pub backend: LedgerBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

fn default_redis_url() -> String { "redis://127.0.0.1:6379".into() }

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Memory,
            redis_url: default_redis_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    pub aircraft: String,
    pub days_to_departure: i64,
    pub flight_hours: i64,
    pub passengers: usize,
    /// Every n-th successful booking is cancelled again; 0 disables
    #[serde(default)]
    pub cancel_every: usize,
    pub fare_classes: Vec<FareClassConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FareClassConfig {
    pub name: String,
    pub base_fare: f64,
    pub rows: usize,
    pub columns: usize,
    #[serde(default)]
    pub blocked: Vec<BlockedSeat>,
}

/// A seat taken out of sale, 1-based coordinates
#[derive(Debug, Deserialize, Clone)]
pub struct BlockedSeat {
    pub row: usize,
    pub column: usize,
    pub reason: String,
}

impl FareClassConfig {
    /// Row-major grid with the blocked seats marked. Out-of-range entries are ignored.
    pub fn layout(&self) -> SeatLayout {
        let mut layout = vec![vec![SeatSpec::open(); self.columns]; self.rows];
        for blocked in &self.blocked {
            if blocked.row == 0 || blocked.column == 0 {
                continue;
            }
            if let Some(cell) = layout
                .get_mut(blocked.row - 1)
                .and_then(|row| row.get_mut(blocked.column - 1))
            {
                *cell = SeatSpec::special(blocked.reason.clone());
            }
        }
        layout
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. AISLE__LEDGER__BACKEND=redis
            .add_source(
                config::Environment::with_prefix("AISLE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("booking.class_priority")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
