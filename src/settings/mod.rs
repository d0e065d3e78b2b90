//! Profile and appearance settings.

use crate::api::ApiClient;
use crate::db::{Session, SessionStore};
use crate::errors::{CrmError, CrmResult};
use crate::models::{AvatarUpload, Theme, UserProfile};

/// Theme to render with: the local choice, else the profile's, else the default.
pub fn current_theme(session: &Session) -> Theme {
    let id = session
        .theme
        .as_deref()
        .or_else(|| session.profile.as_ref().and_then(|p| p.theme.as_deref()));
    Theme::resolve(id)
}

/// Fetch the profile and refresh the cached copy.
pub async fn load_profile(api: &ApiClient, session: &SessionStore) -> CrmResult<UserProfile> {
    let profile = api.get_profile().await?;
    session.update_profile(&profile).await?;
    Ok(profile)
}

pub async fn update_profile(
    api: &ApiClient,
    session: &SessionStore,
    full_name: &str,
    avatar: Option<AvatarUpload>,
) -> CrmResult<UserProfile> {
    let profile = api.update_profile(full_name, avatar).await?;
    session.update_profile(&profile).await?;
    tracing::info!("Profile updated");
    Ok(profile)
}

/// Select a theme and sync it to the profile. Unknown ids never reach the server.
pub async fn set_theme(api: &ApiClient, session: &SessionStore, theme_id: &str) -> CrmResult<Theme> {
    let theme = Theme::find(theme_id)
        .ok_or_else(|| CrmError::Validation(format!("Unknown theme: {}", theme_id)))?;

    let profile = api.update_theme(theme.id).await?;
    session.save_theme(theme.id).await?;
    session.update_profile(&profile).await?;
    tracing::info!(theme = theme.id, "Theme synced with profile");
    Ok(theme)
}
