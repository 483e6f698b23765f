use std::sync::Arc;

use time::OffsetDateTime;

use crate::errors::ReadError;
use crate::errors::validation::{self, FieldErrors};
use crate::models::{ReadDraft, Thermostat, ThermostatRead};
use crate::repositories::{ThermostatReadRepository, ThermostatRepository};

/// Turns submitted drafts into persisted reads: assigns a sequence number
/// from the thermostat's counter when the caller did not pick one, validates,
/// and inserts.
///
/// The counter is advanced through the repository in its own statement, so an
/// assigned number survives even when the draft is rejected afterwards. Gaps
/// in the sequence are expected; duplicates are not.
pub struct ReadService {
    thermostat_repository: Arc<ThermostatRepository>,
    thermostat_read_repository: Arc<ThermostatReadRepository>,
}

impl ReadService {
    pub fn new(
        thermostat_repository: Arc<ThermostatRepository>,
        thermostat_read_repository: Arc<ThermostatReadRepository>,
    ) -> Self {
        Self {
            thermostat_repository,
            thermostat_read_repository,
        }
    }

    /// Validate and persist one read.
    ///
    /// A number the service assigned itself can be stolen by a concurrent
    /// writer between the claim and the insert; that case is retried once
    /// with a freshly claimed number. A number the caller picked is never
    /// retried: it comes back as a validation failure on `number`.
    pub async fn record_read(
        &self,
        thermostat: &Thermostat,
        draft: &ReadDraft,
    ) -> Result<ThermostatRead, ReadError> {
        let assigned = draft.number.is_none();
        let mut number = match draft.number {
            Some(number) => number,
            None => self.next_number(thermostat.id).await?,
        };
        let mut retried = false;

        loop {
            let mut errors = FieldErrors::new();
            let measurements = Self::complete_measurements(draft, &mut errors);

            if self
                .thermostat_read_repository
                .number_exists(thermostat.id, number)
                .await?
            {
                errors.add("number", validation::TAKEN);
            }

            // A draft missing measurements is dead regardless of the number,
            // so every failure it has is reported in one pass.
            let Some((temperature, humidity, battery_charge)) = measurements else {
                return Err(ReadError::Invalid(errors));
            };

            if !errors.is_empty() {
                // Measurements are complete, the only failure left is the
                // number slot.
                if assigned && !retried {
                    tracing::warn!(
                        thermostat_id = thermostat.id,
                        number,
                        "assigned read number already taken, claiming a fresh one"
                    );
                    retried = true;
                    number = self.next_number(thermostat.id).await?;
                    continue;
                }

                return Err(ReadError::Invalid(errors));
            }

            match self
                .insert(thermostat.id, number, temperature, humidity, battery_charge)
                .await
            {
                Ok(read) => return Ok(read),
                Err(e) if is_unique_violation(&e) && assigned && !retried => {
                    tracing::warn!(
                        thermostat_id = thermostat.id,
                        number,
                        "assigned read number already taken, claiming a fresh one"
                    );
                    retried = true;
                    number = self.next_number(thermostat.id).await?;
                }
                Err(e) if is_unique_violation(&e) => {
                    let mut errors = FieldErrors::new();
                    errors.add("number", validation::TAKEN);
                    return Err(ReadError::Invalid(errors));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Check a draft against a thermostat without writing anything. All
    /// failures are collected, none short-circuits.
    pub async fn validate(
        &self,
        thermostat_id: i32,
        number: Option<i32>,
        draft: &ReadDraft,
    ) -> Result<FieldErrors, ReadError> {
        let mut errors = FieldErrors::new();
        Self::complete_measurements(draft, &mut errors);

        match number {
            None => errors.add("number", validation::BLANK),
            Some(number) => {
                if self
                    .thermostat_read_repository
                    .number_exists(thermostat_id, number)
                    .await?
                {
                    errors.add("number", validation::TAKEN);
                }
            }
        }

        Ok(errors)
    }

    /// Household token of the thermostat the read belongs to, looked up fresh
    /// on every call so a rotated token shows up immediately.
    pub async fn household_token(&self, read: &ThermostatRead) -> Result<String, ReadError> {
        let thermostat = self
            .thermostat_repository
            .find_by_id(read.thermostat_id)
            .await?
            .ok_or(ReadError::ThermostatMissing)?;

        Ok(thermostat.household_token)
    }

    async fn next_number(&self, thermostat_id: i32) -> Result<i32, ReadError> {
        self.thermostat_repository
            .next_read_number(thermostat_id)
            .await?
            .ok_or(ReadError::ThermostatMissing)
    }

    // Reports every absent measurement, and yields the values once all three
    // are present. Any finite value passes, zero and negatives included.
    fn complete_measurements(
        draft: &ReadDraft,
        errors: &mut FieldErrors,
    ) -> Option<(f64, f64, f64)> {
        if draft.temperature.is_none() {
            errors.add("temperature", validation::BLANK);
        }
        if draft.humidity.is_none() {
            errors.add("humidity", validation::BLANK);
        }
        if draft.battery_charge.is_none() {
            errors.add("battery_charge", validation::BLANK);
        }

        Some((draft.temperature?, draft.humidity?, draft.battery_charge?))
    }

    async fn insert(
        &self,
        thermostat_id: i32,
        number: i32,
        temperature: f64,
        humidity: f64,
        battery_charge: f64,
    ) -> Result<ThermostatRead, sqlx::Error> {
        let read = ThermostatRead {
            id: 0,
            thermostat_id,
            number,
            temperature,
            humidity,
            battery_charge,
            created_at: OffsetDateTime::now_utc(),
        };

        let mut tx = self.thermostat_read_repository.get_pool().begin().await?;
        let id = self.thermostat_read_repository.create(&read, &mut tx).await?;
        tx.commit().await?;

        self.thermostat_read_repository
            .find_by_id(id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(e) if e.is_unique_violation())
}
