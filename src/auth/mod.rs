//! Sign-in, sign-up, password recovery and sign-out.
//!
//! Credentials are checked locally first; the issued bearer token is persisted in the
//! session store and installed on the API client.

use crate::api::ApiClient;
use crate::db::{Session, SessionStore};
use crate::errors::{CrmError, CrmResult};
use crate::models::{
    check_passwords_match, ForgotPasswordRequest, ResetPasswordRequest, SignInRequest,
    SignUpForm, UserProfile,
};

/// `Authorization` header value for a bearer token. Fails locally when there is none.
pub fn bearer_header(token: Option<&str>) -> CrmResult<String> {
    match token {
        Some(token) if !token.is_empty() => Ok(format!("Bearer {}", token)),
        _ => Err(CrmError::Authorization(
            "Session expired. Please sign in again.".to_string(),
        )),
    }
}

/// Load the stored session and install its token on the client.
pub async fn restore_session(api: &mut ApiClient, session: &SessionStore) -> CrmResult<Session> {
    let stored = session.load().await?;
    api.set_token(stored.token.clone());
    Ok(stored)
}

pub async fn sign_in(
    api: &mut ApiClient,
    session: &SessionStore,
    email: &str,
    password: &str,
) -> CrmResult<UserProfile> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CrmError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let response = api
        .sign_in(&SignInRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await?;

    session.save_token(&response.token, &response.user).await?;
    api.set_token(Some(response.token));
    tracing::info!(email = %email.trim(), "Signed in");
    Ok(response.user)
}

/// Returns the server's confirmation message.
pub async fn sign_up(api: &ApiClient, form: SignUpForm) -> CrmResult<String> {
    form.validate()?;
    let response = api.sign_up(&form.into_request()).await?;
    Ok(response
        .message
        .unwrap_or_else(|| "Signup successful".to_string()))
}

pub async fn forgot_password(api: &ApiClient, email: &str) -> CrmResult<String> {
    if email.trim().is_empty() {
        return Err(CrmError::Validation("Email is required".to_string()));
    }
    let response = api
        .forgot_password(&ForgotPasswordRequest {
            email: email.trim().to_string(),
        })
        .await?;
    Ok(response
        .message
        .unwrap_or_else(|| "Reset link sent to your email".to_string()))
}

pub async fn reset_password(
    api: &ApiClient,
    reset_token: &str,
    password: &str,
    confirm: &str,
) -> CrmResult<String> {
    if reset_token.trim().is_empty() {
        return Err(CrmError::Validation("Reset token is required".to_string()));
    }
    check_passwords_match(password, confirm)?;
    let response = api
        .reset_password(
            reset_token,
            &ResetPasswordRequest {
                password: password.to_string(),
            },
        )
        .await?;
    Ok(response
        .message
        .unwrap_or_else(|| "Password reset successful".to_string()))
}

/// Tell the server, then forget the session locally whatever the server said.
pub async fn sign_out(api: &mut ApiClient, session: &SessionStore) -> CrmResult<()> {
    if api.token().is_some() {
        if let Err(e) = api.logout().await {
            tracing::warn!("Logout request failed, signing out locally: {}", e);
        }
    }
    force_sign_out(api, session).await
}

/// Drop the credential after the server rejected it. No request is sent.
pub async fn force_sign_out(api: &mut ApiClient, session: &SessionStore) -> CrmResult<()> {
    api.set_token(None);
    session.clear().await?;
    tracing::info!("Session cleared");
    Ok(())
}
