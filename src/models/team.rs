//! Sales team and member models matching the CRM API team document.

use serde::{Deserialize, Serialize};

use crate::errors::CrmError;

/// A salesperson inside a team, with an individual conversion target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Number of leads the member must convert
    #[serde(default)]
    pub target: u32,
    /// Server-maintained counter; a cache, the lead list is authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leads_completed: Option<u32>,
}

/// A named group of members under a department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: String,
    pub team_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Team {
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }
}

/// Request body for `POST /api/sales-teams`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub team_name: String,
    pub department: String,
}

impl CreateTeamRequest {
    pub fn validate(&self) -> Result<(), CrmError> {
        if self.team_name.trim().is_empty() {
            return Err(CrmError::Validation("Team name is required".to_string()));
        }
        Ok(())
    }
}

/// Request body for `POST /api/sales-teams/{teamId}/member`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub name: String,
    pub role: String,
    pub target: u32,
}

impl AddMemberRequest {
    pub fn validate(&self) -> Result<(), CrmError> {
        if self.name.trim().is_empty() {
            return Err(CrmError::Validation("Member name is required".to_string()));
        }
        Ok(())
    }
}
