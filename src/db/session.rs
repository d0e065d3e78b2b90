//! Session repository.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::CrmError;
use crate::models::UserProfile;

/// Snapshot of the stored session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub profile: Option<UserProfile>,
    pub theme: Option<String>,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

/// Reads and writes the single session row.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the current session.
    pub async fn load(&self) -> Result<Session, CrmError> {
        let row = sqlx::query("SELECT token, profile_json, theme FROM session WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        let profile_json: Option<String> = row.get("profile_json");
        let profile = match profile_json {
            Some(json) => match serde_json::from_str(&json) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable cached profile: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Session {
            token: row.get("token"),
            profile,
            theme: row.get("theme"),
        })
    }

    /// Store a freshly issued token with the profile that came with it.
    pub async fn save_token(&self, token: &str, profile: &UserProfile) -> Result<(), CrmError> {
        let profile_json = serde_json::to_string(profile)?;
        sqlx::query(
            "UPDATE session SET token = ?, profile_json = ?, theme = COALESCE(?, theme), updated_at = ? WHERE id = 1",
        )
        .bind(token)
        .bind(&profile_json)
        .bind(&profile.theme)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace the cached profile, keeping the token.
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<(), CrmError> {
        let profile_json = serde_json::to_string(profile)?;
        sqlx::query("UPDATE session SET profile_json = ?, updated_at = ? WHERE id = 1")
            .bind(&profile_json)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn save_theme(&self, theme_id: &str) -> Result<(), CrmError> {
        sqlx::query("UPDATE session SET theme = ?, updated_at = ? WHERE id = 1")
            .bind(theme_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Forget the token and profile. The theme preference survives sign-out.
    pub async fn clear(&self) -> Result<(), CrmError> {
        sqlx::query(
            "UPDATE session SET token = NULL, profile_json = NULL, updated_at = ? WHERE id = 1",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
