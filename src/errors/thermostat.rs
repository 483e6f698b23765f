use super::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ThermostatError {
    #[error("Thermostat not found")]
    ThermostatNotFound,

    #[error("Invalid thermostat: {0}")]
    Invalid(FieldErrors),
}
