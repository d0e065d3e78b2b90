//! Authentication endpoints.

use reqwest::Method;

use super::{send_empty, send_json, ApiClient};
use crate::errors::CrmResult;
use crate::models::{
    AuthResponse, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest, SignInRequest,
    SignUpRequest,
};

impl ApiClient {
    /// POST /api/auth/signin
    pub async fn sign_in(&self, request: &SignInRequest) -> CrmResult<AuthResponse> {
        send_json(self.public(Method::POST, &["auth", "signin"]).json(request)).await
    }

    /// POST /api/auth/signup
    pub async fn sign_up(&self, request: &SignUpRequest) -> CrmResult<MessageResponse> {
        send_json(self.public(Method::POST, &["auth", "signup"]).json(request)).await
    }

    /// POST /api/auth/forgot-password
    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> CrmResult<MessageResponse> {
        send_json(self.public(Method::POST, &["auth", "forgot-password"]).json(request)).await
    }

    /// POST /api/auth/reset-password/:token
    pub async fn reset_password(
        &self,
        reset_token: &str,
        request: &ResetPasswordRequest,
    ) -> CrmResult<MessageResponse> {
        let path = ["auth", "reset-password", reset_token];
        send_json(self.public(Method::POST, &path).json(request)).await
    }

    /// POST /api/auth/logout
    pub async fn logout(&self) -> CrmResult<()> {
        send_empty(
            self.authorized(Method::POST, &["auth", "logout"])?
                .json(&serde_json::json!({})),
        )
        .await
    }
}
