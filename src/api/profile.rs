//! Profile and theme endpoints.

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use super::{send_json, ApiClient};
use crate::errors::{CrmError, CrmResult};
use crate::models::{
    AvatarUpload, ProfileEnvelope, ProfileUpdateResponse, ThemeRequest, UserProfile,
};

impl ApiClient {
    /// GET /api/profile
    pub async fn get_profile(&self) -> CrmResult<UserProfile> {
        let envelope: ProfileEnvelope = send_json(self.authorized(Method::GET, &["profile"])?).await?;
        Ok(envelope.user)
    }

    /// PUT /api/profile/update - multipart with `fullName` and an optional `profileImage`.
    pub async fn update_profile(
        &self,
        full_name: &str,
        avatar: Option<AvatarUpload>,
    ) -> CrmResult<UserProfile> {
        if full_name.trim().is_empty() {
            return Err(CrmError::Validation("Full name is required".to_string()));
        }

        let mut form = Form::new().text("fullName", full_name.to_string());
        if let Some(avatar) = avatar {
            form = form.part(
                "profileImage",
                Part::bytes(avatar.bytes).file_name(avatar.file_name),
            );
        }

        let response: ProfileUpdateResponse =
            send_json(self.authorized(Method::PUT, &["profile", "update"])?.multipart(form)).await?;
        accepted_user(response, "Failed to update profile")
    }

    /// PUT /api/theme
    pub async fn update_theme(&self, theme_id: &str) -> CrmResult<UserProfile> {
        let body = ThemeRequest {
            theme: theme_id.to_string(),
        };
        let response: ProfileUpdateResponse =
            send_json(self.authorized(Method::PUT, &["theme"])?.json(&body)).await?;
        accepted_user(response, "Theme update failed")
    }
}

fn accepted_user(response: ProfileUpdateResponse, failure: &str) -> CrmResult<UserProfile> {
    match response {
        ProfileUpdateResponse {
            success: true,
            user: Some(user),
        } => Ok(user),
        _ => Err(CrmError::Network(failure.to_string())),
    }
}
