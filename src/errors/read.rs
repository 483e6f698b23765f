use super::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Invalid read: {0}")]
    Invalid(FieldErrors),

    #[error("Read not found")]
    ReadNotFound,

    #[error("Thermostat is gone")]
    ThermostatMissing,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
