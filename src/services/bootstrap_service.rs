use anyhow::{anyhow, Result};
use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::AdminCredentials;
use crate::database::entities::users;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BootstrapOutcome {
    MissingCredentials,
    AlreadyPresent,
    Created { username: String, email: String },
}

/// Idempotent start-up provisioning of the administrative account
#[derive(Clone)]
pub struct BootstrapService {
    db: DatabaseConnection,
}

impl BootstrapService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn hash_password(password: &str) -> Result<String> {
        if password.is_empty() {
            return Err(anyhow!("Password cannot be empty"));
        }

        hash(password, DEFAULT_COST).map_err(|e| anyhow!("Failed to hash password: {}", e))
    }

    /// Create a superuser unless one exists or credentials are incomplete
    pub async fn ensure_superuser(
        &self,
        credentials: Option<&AdminCredentials>,
    ) -> Result<BootstrapOutcome> {
        let Some(credentials) = credentials.filter(|c| c.is_complete()) else {
            warn!("Admin credentials are not fully configured; skipping superuser bootstrap");
            return Ok(BootstrapOutcome::MissingCredentials);
        };

        let existing = users::Entity::find()
            .filter(users::Column::IsSuperuser.eq(true))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            info!("Superuser already exists; skipping bootstrap");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let password_hash = Self::hash_password(&credentials.password)?;
        let user = users::ActiveModel {
            email: Set(credentials.email.clone()),
            username: Set(credentials.username.clone()),
            password_hash: Set(password_hash),
            is_superuser: Set(true),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            error!("Failed to create superuser: {}", e);
            anyhow!("Failed to create superuser: {}", e)
        })?;

        info!("Superuser created: {} <{}>", user.username, user.email);
        Ok(BootstrapOutcome::Created {
            username: user.username,
            email: user.email,
        })
    }
}
