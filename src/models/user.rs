//! Signed-in user profile and authentication payloads.

use serde::{Deserialize, Serialize};

use crate::errors::CrmError;

/// The signed-in user's profile, cached locally between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Theme id chosen in settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by `POST /api/auth/signin`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Sign-up form including the confirmation field, which never leaves the client.
#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), CrmError> {
        if [&self.full_name, &self.email, &self.password]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(CrmError::Validation(
                "Please fill in the required fields".to_string(),
            ));
        }
        check_passwords_match(&self.password, &self.confirm_password)
    }

    pub fn into_request(self) -> SignUpRequest {
        SignUpRequest {
            full_name: self.full_name,
            email: self.email,
            password: self.password,
        }
    }
}

pub fn check_passwords_match(password: &str, confirm: &str) -> Result<(), CrmError> {
    if password.is_empty() {
        return Err(CrmError::Validation("Password is required".to_string()));
    }
    if password != confirm {
        return Err(CrmError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body returned by `GET /api/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEnvelope {
    pub user: UserProfile,
}

/// Body returned by `PUT /api/profile/update` and `PUT /api/theme`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeRequest {
    pub theme: String,
}

/// Image attached to a profile update.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
