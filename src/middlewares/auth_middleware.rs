use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Header};

use crate::configs::Auth;
use crate::errors::{ApiError, AuthError};
use crate::models::Thermostat;
use crate::repositories::ThermostatRepository;

#[derive(Clone)]
pub struct TokenState {
    pub thermostat_repository: Arc<ThermostatRepository>,
    pub auth: Auth,
}

/// Bearer token as the caller presented it, stashed in request extensions by
/// [`auth`] so handlers can hold it against the resource they load.
#[derive(Clone)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn is_admin(&self, auth: &Auth) -> bool {
        self.0 == auth.admin_token
    }

    /// Whether this token opens the given thermostat, either as the admin
    /// token or as the thermostat's own household token.
    pub fn grants(&self, thermostat: &Thermostat, auth: &Auth) -> bool {
        self.is_admin(auth) || self.0 == thermostat.household_token
    }
}

/// Rejects requests that carry no recognizable token. Which resources the
/// token actually opens is decided per handler; this layer only guarantees
/// the token exists somewhere.
pub async fn auth(
    State(state): State<TokenState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let mut headers = req
        .headers_mut()
        .get_all(header::AUTHORIZATION)
        .iter();

    let header: Authorization<Bearer> = Authorization::decode(&mut headers)
        .map_err(|_| AuthError::MissingToken)?;

    let token = header.token().to_string();

    let known = token == state.auth.admin_token
        || state.thermostat_repository.token_exists(&token).await?;

    if !known {
        return Err(AuthError::UnknownToken.into());
    }

    req.extensions_mut().insert(AuthToken(token));

    Ok(next.run(req).await)
}
