use super::{AuthError, ReadError, ThermostatError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Thermostat error: {0}")]
    ThermostatError(#[from] ThermostatError),

    #[error("Read error: {0}")]
    ReadError(#[from] ReadError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
