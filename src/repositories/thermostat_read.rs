use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::ThermostatRead;

pub struct ThermostatReadRepository {
    storage: Arc<Storage>,
}

impl ThermostatReadRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl ThermostatReadRepository {
    // Insert a read; the UNIQUE (thermostat_id, number) constraint is the
    // storage-level backstop behind the service's own number check.
    pub async fn create(
        &self,
        item: &ThermostatRead,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO thermostat_reads (thermostat_id, number, temperature, humidity, battery_charge, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.thermostat_id)
        .bind(item.number)
        .bind(item.temperature)
        .bind(item.humidity)
        .bind(item.battery_charge)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ThermostatRead>, Error> {
        let read: Option<ThermostatRead> =
            sqlx::query_as("SELECT * FROM thermostat_reads WHERE id = $1")
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(read)
    }

    pub async fn find_by_number(
        &self,
        thermostat_id: i32,
        number: i32,
    ) -> Result<Option<ThermostatRead>, Error> {
        let read: Option<ThermostatRead> = sqlx::query_as(
            "SELECT * FROM thermostat_reads WHERE thermostat_id = $1 AND number = $2",
        )
        .bind(thermostat_id)
        .bind(number)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(read)
    }

    // Latest N reads for a thermostat, newest number first
    pub async fn find_latest_by_thermostat_id(
        &self,
        thermostat_id: i32,
        limit: i64,
    ) -> Result<Vec<ThermostatRead>, Error> {
        let reads: Vec<ThermostatRead> = sqlx::query_as(
            r#"
            SELECT * FROM thermostat_reads
            WHERE thermostat_id = $1
            ORDER BY number DESC
            LIMIT $2
            "#,
        )
        .bind(thermostat_id)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(reads)
    }

    pub async fn number_exists(&self, thermostat_id: i32, number: i32) -> Result<bool, Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM thermostat_reads WHERE thermostat_id = $1 AND number = $2 LIMIT 1",
        )
        .bind(thermostat_id)
        .bind(number)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(row.is_some())
    }
}
