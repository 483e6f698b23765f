#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Unknown token")]
    UnknownToken,

    #[error("Token does not belong to this household")]
    HouseholdMismatch,

    #[error("Admin token required")]
    AdminOnly,
}
