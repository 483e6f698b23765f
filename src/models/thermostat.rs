use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thermostat {
    pub id: i32,
    pub name: String,
    /// Opaque credential shared by every thermostat in the same household
    pub household_token: String,
    /// Highest read number handed out automatically, never decreases
    pub last_read_number: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct ThermostatTable;

impl Table for ThermostatTable {
    fn name(&self) -> &'static str {
        "thermostats"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS thermostats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                household_token VARCHAR(255) NOT NULL,
                last_read_number INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS thermostats;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
