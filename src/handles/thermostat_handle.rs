use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::configs::Auth;
use crate::errors::validation::{self, FieldErrors};
use crate::errors::{ApiError, AuthError, ThermostatError};
use crate::middlewares::{AuthToken, TokenState, auth};
use crate::models::Thermostat;
use crate::repositories::ThermostatRepository;

#[derive(Clone, Deserialize, ToSchema)]
pub struct CreateThermostatRequest {
    pub name: Option<String>,
    /// Token of the household to enroll into. Omitted or blank means a new
    /// household, with a freshly generated token.
    pub household_token: Option<String>,
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct UpdateThermostatRequest {
    pub name: Option<String>,
    pub household_token: Option<String>,
}

#[derive(Clone, Serialize, ToSchema)]
pub struct ThermostatResponse {
    pub id: i32,
    pub name: String,
    pub household_token: String,
    pub last_read_number: i32,
}

#[derive(Clone, Serialize, ToSchema)]
pub struct ThermostatEnvelope {
    pub success: bool,
    pub thermostat: ThermostatResponse,
}

#[derive(Clone, Serialize, ToSchema)]
pub struct ThermostatListEnvelope {
    pub success: bool,
    pub thermostats: Vec<ThermostatResponse>,
}

#[derive(Clone, Serialize, ToSchema)]
pub struct StatusEnvelope {
    pub success: bool,
}

#[derive(Clone)]
pub struct ThermostatState {
    pub thermostat_repository: Arc<ThermostatRepository>,
    pub auth: Auth,
}

pub fn thermostat_router(thermostat_state: ThermostatState, token_state: TokenState) -> Router {
    Router::new()
        .route(
            "/api/thermostats",
            get(get_thermostats).post(create_thermostat),
        )
        .route(
            "/api/thermostats/:thermostat_id",
            get(get_thermostat_by_id)
                .put(update_thermostat)
                .delete(delete_thermostat),
        )
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(thermostat_state)
}

#[utoipa::path(
    post,
    path = "/api/thermostats",
    tag = "thermostat",
    request_body = CreateThermostatRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Thermostat created", body = ThermostatEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_thermostat(
    Extension(token): Extension<AuthToken>,
    State(state): State<ThermostatState>,
    Json(body): Json<CreateThermostatRequest>,
) -> Result<Json<ThermostatEnvelope>, ApiError> {
    // Only the admin token can enroll hardware
    if !token.is_admin(&state.auth) {
        return Err(AuthError::AdminOnly.into());
    }

    let name = match body.name {
        Some(ref name) if !name.trim().is_empty() => name.clone(),
        _ => {
            let mut errors = FieldErrors::new();
            errors.add("name", validation::BLANK);
            return Err(ThermostatError::Invalid(errors).into());
        }
    };

    let household_token = match body.household_token {
        Some(ref token) if !token.trim().is_empty() => token.clone(),
        _ => Uuid::new_v4().to_string(),
    };

    let thermostat = Thermostat {
        id: 0,
        name,
        household_token,
        last_read_number: 0,
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = state.thermostat_repository.get_pool().begin().await?;
    let thermostat_id = state
        .thermostat_repository
        .create(&thermostat, &mut tx)
        .await?;
    tx.commit().await?;

    // Get created thermostat
    let created = state
        .thermostat_repository
        .find_by_id(thermostat_id)
        .await?
        .ok_or(ThermostatError::ThermostatNotFound)?;

    Ok(Json(ThermostatEnvelope {
        success: true,
        thermostat: ThermostatResponse {
            id: created.id,
            name: created.name,
            household_token: created.household_token,
            last_read_number: created.last_read_number,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/thermostats",
    tag = "thermostat",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every enrolled thermostat", body = ThermostatListEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_thermostats(
    Extension(token): Extension<AuthToken>,
    State(state): State<ThermostatState>,
) -> Result<Json<ThermostatListEnvelope>, ApiError> {
    if !token.is_admin(&state.auth) {
        return Err(AuthError::AdminOnly.into());
    }

    let thermostats = state.thermostat_repository.find_all().await?;

    let thermostat_responses: Vec<ThermostatResponse> = thermostats
        .into_iter()
        .map(|thermostat| ThermostatResponse {
            id: thermostat.id,
            name: thermostat.name,
            household_token: thermostat.household_token,
            last_read_number: thermostat.last_read_number,
        })
        .collect();

    Ok(Json(ThermostatListEnvelope {
        success: true,
        thermostats: thermostat_responses,
    }))
}

#[utoipa::path(
    get,
    path = "/api/thermostats/{thermostat_id}",
    tag = "thermostat",
    params(
        ("thermostat_id" = i32, Path, description = "Thermostat ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Thermostat found", body = ThermostatEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Thermostat not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_thermostat_by_id(
    Extension(token): Extension<AuthToken>,
    State(state): State<ThermostatState>,
    Path(thermostat_id): Path<i32>,
) -> Result<Json<ThermostatEnvelope>, ApiError> {
    // Check if thermostat exists
    let thermostat = state
        .thermostat_repository
        .find_by_id(thermostat_id)
        .await?
        .ok_or(ThermostatError::ThermostatNotFound)?;

    // A household token only opens its own thermostats
    if !token.grants(&thermostat, &state.auth) {
        return Err(AuthError::HouseholdMismatch.into());
    }

    Ok(Json(ThermostatEnvelope {
        success: true,
        thermostat: ThermostatResponse {
            id: thermostat.id,
            name: thermostat.name,
            household_token: thermostat.household_token,
            last_read_number: thermostat.last_read_number,
        },
    }))
}

#[utoipa::path(
    put,
    path = "/api/thermostats/{thermostat_id}",
    tag = "thermostat",
    params(
        ("thermostat_id" = i32, Path, description = "Thermostat ID")
    ),
    request_body = UpdateThermostatRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Thermostat updated", body = ThermostatEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Thermostat not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_thermostat(
    Extension(token): Extension<AuthToken>,
    State(state): State<ThermostatState>,
    Path(thermostat_id): Path<i32>,
    Json(body): Json<UpdateThermostatRequest>,
) -> Result<Json<ThermostatEnvelope>, ApiError> {
    if !token.is_admin(&state.auth) {
        return Err(AuthError::AdminOnly.into());
    }

    // Check if thermostat exists
    let mut thermostat = state
        .thermostat_repository
        .find_by_id(thermostat_id)
        .await?
        .ok_or(ThermostatError::ThermostatNotFound)?;

    // Absent fields keep their current value, present ones must not be blank
    let mut errors = FieldErrors::new();
    match body.name {
        Some(ref name) if name.trim().is_empty() => errors.add("name", validation::BLANK),
        Some(ref name) => thermostat.name = name.clone(),
        None => {}
    }
    match body.household_token {
        Some(ref token) if token.trim().is_empty() => {
            errors.add("household_token", validation::BLANK)
        }
        Some(ref token) => thermostat.household_token = token.clone(),
        None => {}
    }

    if !errors.is_empty() {
        return Err(ThermostatError::Invalid(errors).into());
    }

    let mut tx = state.thermostat_repository.get_pool().begin().await?;
    state
        .thermostat_repository
        .update(thermostat_id, &thermostat, &mut tx)
        .await?;
    tx.commit().await?;

    // Get updated thermostat
    let updated = state
        .thermostat_repository
        .find_by_id(thermostat_id)
        .await?
        .ok_or(ThermostatError::ThermostatNotFound)?;

    Ok(Json(ThermostatEnvelope {
        success: true,
        thermostat: ThermostatResponse {
            id: updated.id,
            name: updated.name,
            household_token: updated.household_token,
            last_read_number: updated.last_read_number,
        },
    }))
}

#[utoipa::path(
    delete,
    path = "/api/thermostats/{thermostat_id}",
    tag = "thermostat",
    params(
        ("thermostat_id" = i32, Path, description = "Thermostat ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Thermostat deleted", body = StatusEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Thermostat not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_thermostat(
    Extension(token): Extension<AuthToken>,
    State(state): State<ThermostatState>,
    Path(thermostat_id): Path<i32>,
) -> Result<Json<StatusEnvelope>, ApiError> {
    if !token.is_admin(&state.auth) {
        return Err(AuthError::AdminOnly.into());
    }

    // Check if thermostat exists
    state
        .thermostat_repository
        .find_by_id(thermostat_id)
        .await?
        .ok_or(ThermostatError::ThermostatNotFound)?;

    // Reads go with the thermostat through ON DELETE CASCADE
    let mut tx = state.thermostat_repository.get_pool().begin().await?;
    state
        .thermostat_repository
        .delete(thermostat_id, &mut tx)
        .await?;
    tx.commit().await?;

    Ok(Json(StatusEnvelope { success: true }))
}
