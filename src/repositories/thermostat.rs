use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::Thermostat;

pub struct ThermostatRepository {
    storage: Arc<Storage>,
}

impl ThermostatRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl ThermostatRepository {
    pub async fn create(
        &self,
        item: &Thermostat,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO thermostats (name, household_token)
            VALUES ($1, $2)
            "#,
        )
        .bind(&item.name)
        .bind(&item.household_token)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Thermostat>, Error> {
        let thermostat: Option<Thermostat> =
            sqlx::query_as("SELECT * FROM thermostats WHERE id = $1")
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(thermostat)
    }

    pub async fn find_all(&self) -> Result<Vec<Thermostat>, Error> {
        let thermostats: Vec<Thermostat> = sqlx::query_as("SELECT * FROM thermostats ORDER BY id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(thermostats)
    }

    pub async fn token_exists(&self, token: &str) -> Result<bool, Error> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM thermostats WHERE household_token = $1 LIMIT 1")
                .bind(token)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(row.is_some())
    }

    // Name and household token only; the counter moves through
    // next_read_number and nothing else.
    pub async fn update(
        &self,
        id: i32,
        item: &Thermostat,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE thermostats
            SET name = $1, household_token = $2
            WHERE id = $3
            "#,
        )
        .bind(&item.name)
        .bind(&item.household_token)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM thermostats WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }

    /// Claim the next read number for a thermostat.
    ///
    /// A single read-modify-write statement on the pool, deliberately outside
    /// any caller transaction: the counter must stay advanced even when the
    /// read it was claimed for is rejected later, and SQLite serializes the
    /// statement so concurrent callers always see distinct values. `None`
    /// means the thermostat row is gone.
    pub async fn next_read_number(&self, id: i32) -> Result<Option<i32>, Error> {
        let number: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE thermostats
            SET last_read_number = last_read_number + 1
            WHERE id = $1
            RETURNING last_read_number
            "#,
        )
        .bind(id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(number.map(|(number,)| number))
    }
}
