use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::configs::Auth;
use crate::errors::{ApiError, AuthError, ReadError, ThermostatError};
use crate::middlewares::{AuthToken, TokenState, auth};
use crate::models::ReadDraft;
use crate::repositories::{ThermostatReadRepository, ThermostatRepository};
use crate::services::ReadService;

/// Page size for listings that do not pass `?limit`.
const DEFAULT_READ_LIMIT: i64 = 20;

#[derive(Clone, Serialize, ToSchema)]
pub struct ReadResponse {
    pub number: i32,
    pub household_token: String,
    pub temperature: f64,
    pub humidity: f64,
    pub battery_charge: f64,
}

#[derive(Clone, Serialize, ToSchema)]
pub struct ReadEnvelope {
    pub success: bool,
    pub read: ReadResponse,
}

#[derive(Clone, Serialize, ToSchema)]
pub struct ReadListEnvelope {
    pub success: bool,
    pub reads: Vec<ReadResponse>,
}

#[derive(Clone, Deserialize)]
pub struct ReadListQuery {
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct ReadState {
    pub thermostat_repository: Arc<ThermostatRepository>,
    pub thermostat_read_repository: Arc<ThermostatReadRepository>,
    pub read_service: Arc<ReadService>,
    pub auth: Auth,
}

pub fn read_router(read_state: ReadState, token_state: TokenState) -> Router {
    Router::new()
        .route(
            "/api/thermostats/:thermostat_id/reads",
            get(get_reads).post(create_read),
        )
        .route(
            "/api/thermostats/:thermostat_id/reads/:number",
            get(get_read_by_number),
        )
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(read_state)
}

#[utoipa::path(
    post,
    path = "/api/thermostats/{thermostat_id}/reads",
    tag = "read",
    params(
        ("thermostat_id" = i32, Path, description = "Thermostat ID")
    ),
    request_body = ReadDraft,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Read recorded", body = ReadEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Thermostat not found"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_read(
    Extension(token): Extension<AuthToken>,
    State(state): State<ReadState>,
    Path(thermostat_id): Path<i32>,
    Json(body): Json<ReadDraft>,
) -> Result<Json<ReadEnvelope>, ApiError> {
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

    let read = state.read_service.record_read(&thermostat, &body).await?;

    // The token comes from the read's owner, not from the request
    let household_token = state.read_service.household_token(&read).await?;

    Ok(Json(ReadEnvelope {
        success: true,
        read: ReadResponse {
            number: read.number,
            household_token,
            temperature: read.temperature,
            humidity: read.humidity,
            battery_charge: read.battery_charge,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/thermostats/{thermostat_id}/reads",
    tag = "read",
    params(
        ("thermostat_id" = i32, Path, description = "Thermostat ID"),
        ("limit" = Option<i64>, Query, description = "Page size, newest first")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Latest reads, newest number first", body = ReadListEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Thermostat not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_reads(
    Extension(token): Extension<AuthToken>,
    State(state): State<ReadState>,
    Path(thermostat_id): Path<i32>,
    Query(query): Query<ReadListQuery>,
) -> Result<Json<ReadListEnvelope>, ApiError> {
    // Check if thermostat exists
    let thermostat = state
        .thermostat_repository
        .find_by_id(thermostat_id)
        .await?
        .ok_or(ThermostatError::ThermostatNotFound)?;

    if !token.grants(&thermostat, &state.auth) {
        return Err(AuthError::HouseholdMismatch.into());
    }

    let limit = query.limit.unwrap_or(DEFAULT_READ_LIMIT);
    let reads = state
        .thermostat_read_repository
        .find_latest_by_thermostat_id(thermostat_id, limit)
        .await?;

    // Every read on the page shares the thermostat, one token covers them all
    let read_responses: Vec<ReadResponse> = reads
        .into_iter()
        .map(|read| ReadResponse {
            number: read.number,
            household_token: thermostat.household_token.clone(),
            temperature: read.temperature,
            humidity: read.humidity,
            battery_charge: read.battery_charge,
        })
        .collect();

    Ok(Json(ReadListEnvelope {
        success: true,
        reads: read_responses,
    }))
}

#[utoipa::path(
    get,
    path = "/api/thermostats/{thermostat_id}/reads/{number}",
    tag = "read",
    params(
        ("thermostat_id" = i32, Path, description = "Thermostat ID"),
        ("number" = i32, Path, description = "Read number within the thermostat")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Read found", body = ReadEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Thermostat or read not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_read_by_number(
    Extension(token): Extension<AuthToken>,
    State(state): State<ReadState>,
    Path((thermostat_id, number)): Path<(i32, i32)>,
) -> Result<Json<ReadEnvelope>, ApiError> {
    // Check if thermostat exists
    let thermostat = state
        .thermostat_repository
        .find_by_id(thermostat_id)
        .await?
        .ok_or(ThermostatError::ThermostatNotFound)?;

    if !token.grants(&thermostat, &state.auth) {
        return Err(AuthError::HouseholdMismatch.into());
    }

    let read = state
        .thermostat_read_repository
        .find_by_number(thermostat_id, number)
        .await?
        .ok_or(ReadError::ReadNotFound)?;

    let household_token = state.read_service.household_token(&read).await?;

    Ok(Json(ReadEnvelope {
        success: true,
        read: ReadResponse {
            number: read.number,
            household_token,
            temperature: read.temperature,
            humidity: read.humidity,
            battery_charge: read.battery_charge,
        },
    }))
}
