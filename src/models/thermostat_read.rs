use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ThermostatRead {
    pub id: i32,
    pub thermostat_id: i32,
    /// Position in the thermostat's sequence, unique per thermostat
    pub number: i32,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Battery charge in percent
    pub battery_charge: f64,
    pub created_at: OffsetDateTime,
}

/// A read as submitted, before a number is assigned and the measurements are
/// checked. Everything is optional here; [`ThermostatRead`] is not.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReadDraft {
    /// Caller-picked sequence number, assigned from the counter when omitted
    pub number: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub battery_charge: Option<f64>,
}

#[derive(Clone)]
pub struct ThermostatReadTable;

impl Table for ThermostatReadTable {
    fn name(&self) -> &'static str {
        "thermostat_reads"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS thermostat_reads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                thermostat_id INTEGER NOT NULL,
                number INTEGER NOT NULL,
                temperature REAL NOT NULL,
                humidity REAL NOT NULL,
                battery_charge REAL NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (thermostat_id) REFERENCES thermostats (id) ON DELETE CASCADE,
                UNIQUE (thermostat_id, number)
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS thermostat_reads;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["thermostats"]
    }
}
