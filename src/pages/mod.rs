//! Page controllers.
//!
//! Each page owns its own cache and talks to the API through its own client. Remote
//! failures never escape as panics: they are logged, queued as a [`Notice`] and returned.
//! An authorization failure additionally clears the session and marks the page signed out.

mod leads;
mod sales_team;

pub use leads::LeadsPage;
pub use sales_team::SalesTeamPage;

use crate::api::ApiClient;
use crate::auth::force_sign_out;
use crate::db::SessionStore;
use crate::errors::CrmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    SignedOut,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Notification queue of one page.
#[derive(Debug, Default)]
pub struct Notifier {
    notices: Vec<Notice>,
    signed_out: bool,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    fn push(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice { kind, message });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Set once the server rejected the credential.
    pub fn is_signed_out(&self) -> bool {
        self.signed_out
    }

    /// Surface a failed `action` and pass the error back to the caller.
    pub async fn report(
        &mut self,
        api: &mut ApiClient,
        session: &SessionStore,
        action: &str,
        err: CrmError,
    ) -> CrmError {
        match &err {
            CrmError::Authorization(_) => {
                tracing::info!(action, "Credential rejected, signing out: {}", err);
            }
            CrmError::Validation(_) | CrmError::InvalidTransition(_) => {
                tracing::warn!(action, "Rejected locally: {}", err);
            }
            _ => tracing::warn!(action, "Request failed: {}", err),
        }

        if err.is_authorization() {
            if let Err(e) = force_sign_out(api, session).await {
                tracing::error!("Failed to clear session: {}", e);
            }
            self.signed_out = true;
            self.push(NoticeKind::SignedOut, err.message().to_string());
        } else {
            self.push(NoticeKind::Error, err.message().to_string());
        }
        err
    }
}
