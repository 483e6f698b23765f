use std::sync::Arc;

use axum::Router;

use thermolog::configs::{Auth, Database, SchemaManager, Storage};
use thermolog::handles::{ReadState, ThermostatState, read_router, thermostat_router};
use thermolog::middlewares::TokenState;
use thermolog::models::{Thermostat, ThermostatRead};
use thermolog::repositories::{ThermostatReadRepository, ThermostatRepository};
use thermolog::services::ReadService;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub auth: Auth,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = Arc::new(
            Storage::new(
                Database {
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        );

        let auth = Auth {
            admin_token: String::from(ADMIN_TOKEN),
        };

        Self {
            storage,
            auth,
            router: Router::new(),
        }
    }

    pub fn with_thermostat_handle(mut self) -> Self {
        let thermostat_repository = Arc::new(ThermostatRepository::new(self.storage.clone()));

        let router = thermostat_router(
            ThermostatState {
                thermostat_repository: thermostat_repository.clone(),
                auth: self.auth.clone(),
            },
            TokenState {
                thermostat_repository,
                auth: self.auth.clone(),
            },
        );

        self.router = self.router.merge(router);
        self
    }

    pub fn with_read_handle(mut self) -> Self {
        let thermostat_repository = Arc::new(ThermostatRepository::new(self.storage.clone()));
        let thermostat_read_repository =
            Arc::new(ThermostatReadRepository::new(self.storage.clone()));
        let read_service = Arc::new(ReadService::new(
            thermostat_repository.clone(),
            thermostat_read_repository.clone(),
        ));

        let router = read_router(
            ReadState {
                thermostat_repository: thermostat_repository.clone(),
                thermostat_read_repository,
                read_service,
                auth: self.auth.clone(),
            },
            TokenState {
                thermostat_repository,
                auth: self.auth.clone(),
            },
        );

        self.router = self.router.merge(router);
        self
    }
}

pub async fn create_test_thermostat(
    storage: Arc<Storage>,
    name: &str,
    household_token: &str,
) -> Thermostat {
    sqlx::query_as::<_, Thermostat>(
        "INSERT INTO thermostats (name, household_token) VALUES ($1, $2) RETURNING *;",
    )
    .bind(name)
    .bind(household_token)
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}

pub async fn create_test_read(
    storage: Arc<Storage>,
    thermostat_id: i32,
    number: i32,
) -> ThermostatRead {
    sqlx::query_as::<_, ThermostatRead>(
        r#"
        INSERT INTO thermostat_reads (thermostat_id, number, temperature, humidity, battery_charge)
            VALUES ($1, $2, 21.5, 45.0, 88.0)
            RETURNING *;
        "#,
    )
    .bind(thermostat_id)
    .bind(number)
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}
