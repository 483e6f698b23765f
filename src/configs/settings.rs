use std::env;
use std::fs;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    /// Token that unlocks the management endpoints
    pub admin_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub auth: Auth,
}

/// Optional per-run-mode overlay. A present section replaces the matching
/// section of the defaults wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overrides {
    pub server: Option<Server>,
    pub logger: Option<Logger>,
    pub database: Option<Database>,
    pub auth: Option<Auth>,
}

impl Settings {
    pub fn new() -> anyhow::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let default_path = normalize_path("configs/default.toml")?;
        let settings: Settings = toml::from_str(
            &fs::read_to_string(&default_path)
                .with_context(|| format!("failed to read {}", default_path.display()))?,
        )?;

        let overlay_path = normalize_path(&format!("configs/{run_mode}.toml"))?;
        if overlay_path.is_file() {
            let overrides: Overrides = toml::from_str(&fs::read_to_string(&overlay_path)?)?;

            return Self::merge(settings, overrides);
        }

        Ok(settings)
    }

    pub fn merge<L, R, T>(left: L, right: R) -> anyhow::Result<T>
    where
        L: Serialize,
        R: Serialize,
        T: Serialize + DeserializeOwned,
    {
        let mut left_map = serde_json::to_value(&left)?
            .as_object()
            .map(|map| map.to_owned())
            .context("Failed to serialize left value which is not an object")?;

        let mut right_map = serde_json::to_value(&right)?
            .as_object()
            .map(|map| map.to_owned())
            .context("Failed to serialize right value which is not an object")?;

        right_map.retain(|_, v| !v.is_null());
        left_map.extend(right_map);

        let value = serde_json::to_value(&left_map)?;

        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            server: Server {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            logger: Logger {
                level: "info".to_string(),
            },
            database: Database {
                clean_start: false,
                url: "sqlite:thermolog.db?mode=rwc".to_string(),
            },
            auth: Auth {
                admin_token: "dev-admin-token".to_string(),
            },
        }
    }

    #[test]
    fn test_merge_takes_present_sections() {
        let overrides = Overrides {
            database: Some(Database {
                clean_start: true,
                url: "sqlite::memory:".to_string(),
            }),
            ..Default::default()
        };

        let merged: Settings = Settings::merge(base_settings(), overrides).unwrap();

        assert!(merged.database.clean_start);
        assert_eq!(merged.database.url, "sqlite::memory:");
        // untouched sections keep the defaults
        assert_eq!(merged.server.port, 3000);
        assert_eq!(merged.auth.admin_token, "dev-admin-token");
    }

    #[test]
    fn test_merge_ignores_absent_sections() {
        let merged: Settings = Settings::merge(base_settings(), Overrides::default()).unwrap();

        assert_eq!(merged.server.host, "127.0.0.1");
        assert_eq!(merged.logger.level, "info");
        assert_eq!(merged.database.url, "sqlite:thermolog.db?mode=rwc");
    }
}
