use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "supplynet.yaml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: String,
    pub log_level: String,
    pub admin: Option<AdminCredentials>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "supplynet.db".to_string(),
            log_level: "info".to_string(),
            admin: None,
        }
    }
}

/// Credentials for the superuser created on first start
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminCredentials {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty()
            && !self.username.trim().is_empty()
            && !self.password.is_empty()
    }
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read the YAML file (explicit path, or `supplynet.yaml` when present),
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_yaml(&content)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_yaml(&fs::read_to_string(DEFAULT_CONFIG_FILE)?)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = get("SUPPLYNET_DATABASE") {
            self.database = database;
        }
        if let Some(level) = get("SUPPLYNET_LOG_LEVEL") {
            self.log_level = level;
        }

        let email = get("ADMIN_EMAIL");
        let username = get("ADMIN_USERNAME");
        let password = get("ADMIN_PASSWORD");
        if email.is_some() || username.is_some() || password.is_some() {
            let admin = self.admin.get_or_insert_with(AdminCredentials::default);
            if let Some(email) = email {
                admin.email = email;
            }
            if let Some(username) = username {
                admin.username = username;
            }
            if let Some(password) = password {
                admin.password = password;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_deserialization() {
        let yaml = r#"
database: "network.db"
admin:
  email: "admin@example.com"
  username: "admin"
  password: "changeme"
"#;

        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database, "network.db");
        assert_eq!(config.log_level, "info");
        assert!(config.admin.unwrap().is_complete());
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SUPPLYNET_DATABASE", "override.db"),
            ("ADMIN_PASSWORD", "from-env"),
        ]);

        let mut config = AppConfig::from_yaml("admin:\n  email: a@b.c\n  username: root\n").unwrap();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database, "override.db");
        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.password, "from-env");
    }

    #[test]
    fn test_partial_credentials_are_incomplete() {
        let mut config = AppConfig::default();
        config.apply_env(|key| (key == "ADMIN_EMAIL").then(|| "a@b.c".to_string()));
        assert!(!config.admin.unwrap().is_complete());
    }
}
