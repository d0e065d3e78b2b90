//! Lead model matching the CRM API lead document.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CrmError;

/// Position of a lead in the status funnel, plus the orthogonal archived state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
    Archived,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
        LeadStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
            LeadStatus::Archived => "Archived",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CrmError::Validation(format!("Unknown lead status: {}", s)))
    }
}

/// Where a lead came from. Unknown sources are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeadSource {
    #[default]
    Website,
    Referral,
    SocialMedia,
    ColdCall,
    Email,
    Other(String),
}

impl LeadSource {
    pub fn as_str(&self) -> &str {
        match self {
            LeadSource::Website => "Website",
            LeadSource::Referral => "Referral",
            LeadSource::SocialMedia => "Social Media",
            LeadSource::ColdCall => "Cold Call",
            LeadSource::Email => "Email",
            LeadSource::Other(s) => s,
        }
    }
}

impl From<String> for LeadSource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Website" => LeadSource::Website,
            "Referral" => LeadSource::Referral,
            "Social Media" => LeadSource::SocialMedia,
            "Cold Call" => LeadSource::ColdCall,
            "Email" => LeadSource::Email,
            _ => LeadSource::Other(s),
        }
    }
}

impl From<LeadSource> for String {
    fn from(source: LeadSource) -> Self {
        match source {
            LeadSource::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prospective customer tracked through the status funnel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub source: LeadSource,
    pub status: LeadStatus,
    /// Member identifier this lead is assigned to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Plain-text card used by the "copy lead" action.
    pub fn summary(&self) -> String {
        format!(
            "Lead ID: {}\nName: {}\nEmail: {}\nPhone: {}\nSource: {}\nStatus: {}",
            self.id, self.name, self.email, self.phone, self.source, self.status
        )
    }
}

/// Body of `GET /api/leads`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadList {
    #[serde(default)]
    pub leads: Vec<Lead>,
}

/// Request body for creating a lead, also used as the full edit form.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: LeadSource,
    pub status: LeadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl LeadDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            source: LeadSource::default(),
            status: LeadStatus::default(),
            assigned_to: None,
        }
    }

    /// Name, email and phone are all required.
    pub fn validate(&self) -> Result<(), CrmError> {
        if [&self.name, &self.email, &self.phone]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(CrmError::Validation(
                "Please fill in the required fields".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Lead> for LeadDraft {
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            source: lead.source.clone(),
            status: lead.status,
            assigned_to: lead.assigned_to.clone(),
        }
    }
}

/// Partial update body for `PUT /api/leads/{id}`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LeadSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl UpdateLeadRequest {
    /// Status-only update used by archive, restore and convert.
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Any required field that is present must not be blank.
    pub fn validate(&self) -> Result<(), CrmError> {
        if [&self.name, &self.email, &self.phone]
            .iter()
            .filter_map(|field| field.as_ref())
            .any(|value| value.trim().is_empty())
        {
            return Err(CrmError::Validation(
                "Please fill in the required fields".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<LeadDraft> for UpdateLeadRequest {
    fn from(draft: LeadDraft) -> Self {
        Self {
            name: Some(draft.name),
            email: Some(draft.email),
            phone: Some(draft.phone),
            source: Some(draft.source),
            status: Some(draft.status),
            assigned_to: draft.assigned_to,
        }
    }
}
