use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::middlewares::TokenState;
use crate::repositories::{ThermostatReadRepository, ThermostatRepository};
use crate::services::ReadService;

pub async fn create_app(settings: &Arc<Settings>) -> Router {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .unwrap(),
    );

    let thermostat_repository = Arc::new(ThermostatRepository::new(storage.clone()));
    let thermostat_read_repository = Arc::new(ThermostatReadRepository::new(storage.clone()));

    let read_service = Arc::new(ReadService::new(
        thermostat_repository.clone(),
        thermostat_read_repository.clone(),
    ));

    let token_state = TokenState {
        thermostat_repository: thermostat_repository.clone(),
        auth: settings.auth.clone(),
    };

    let thermostats = thermostat_router(
        ThermostatState {
            thermostat_repository: thermostat_repository.clone(),
            auth: settings.auth.clone(),
        },
        token_state.clone(),
    );

    let reads = read_router(
        ReadState {
            thermostat_repository: thermostat_repository.clone(),
            thermostat_read_repository: thermostat_read_repository.clone(),
            read_service: read_service.clone(),
            auth: settings.auth.clone(),
        },
        token_state.clone(),
    );

    Router::new()
        .merge(thermostats)
        .merge(reads)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
