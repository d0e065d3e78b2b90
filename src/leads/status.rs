//! Named lead status transitions.
//!
//! Any status may be replaced by any other through a general update. The named
//! operations below have fixed semantics and are the only ones with preconditions.

use crate::errors::CrmError;
use crate::models::LeadStatus;

/// A status change requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Soft-delete; valid from any status except `Archived`.
    Archive,
    /// Valid only from `Archived`; always lands on `New`, never on the prior status.
    Restore,
    /// Mark as won, from any status.
    Convert,
    /// General update to an explicit status.
    Set(LeadStatus),
}

impl Transition {
    /// The archive toggle shown next to every lead: restore archived leads, archive the rest.
    pub fn toggle_archive(current: LeadStatus) -> Self {
        if current == LeadStatus::Archived {
            Transition::Restore
        } else {
            Transition::Archive
        }
    }

    /// Compute the status after applying this transition to `from`.
    pub fn apply(self, from: LeadStatus) -> Result<LeadStatus, CrmError> {
        match (self, from) {
            (Transition::Archive, LeadStatus::Archived) => Err(CrmError::InvalidTransition(
                "Lead is already archived".to_string(),
            )),
            (Transition::Archive, _) => Ok(LeadStatus::Archived),
            (Transition::Restore, LeadStatus::Archived) => Ok(LeadStatus::New),
            (Transition::Restore, other) => Err(CrmError::InvalidTransition(format!(
                "Only archived leads can be restored (lead is {})",
                other
            ))),
            (Transition::Convert, _) => Ok(LeadStatus::Converted),
            (Transition::Set(to), _) => Ok(to),
        }
    }

    /// Notification text after the server acknowledged the change.
    pub fn success_message(self) -> &'static str {
        match self {
            Transition::Archive => "Lead moved to archive.",
            Transition::Restore => "Lead restored successfully.",
            Transition::Convert => "Lead completed successfully!",
            Transition::Set(_) => "Lead updated.",
        }
    }
}
