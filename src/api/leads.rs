//! Lead endpoints.

use reqwest::Method;
use serde::Deserialize;

use super::{send_empty, send_json, ApiClient};
use crate::errors::CrmResult;
use crate::models::{Lead, LeadDraft, LeadList, UpdateLeadRequest};

/// Lead write responses come back either bare or wrapped as `{ "lead": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LeadEnvelope {
    Wrapped { lead: Lead },
    Bare(Lead),
}

impl LeadEnvelope {
    fn into_lead(self) -> Lead {
        match self {
            LeadEnvelope::Wrapped { lead } | LeadEnvelope::Bare(lead) => lead,
        }
    }
}

impl ApiClient {
    /// GET /api/leads - List leads; `include_archived` asks for every lead.
    pub async fn list_leads(&self, include_archived: bool) -> CrmResult<Vec<Lead>> {
        let mut request = self.authorized(Method::GET, &["leads"])?;
        if include_archived {
            request = request.query(&[("all", "true")]);
        }
        let list: LeadList = send_json(request).await?;
        Ok(list.leads)
    }

    /// POST /api/leads - Create a lead. Validation runs before anything is sent.
    pub async fn create_lead(&self, draft: &LeadDraft) -> CrmResult<Lead> {
        draft.validate()?;
        let request = self.authorized(Method::POST, &["leads"])?.json(draft);
        let envelope: LeadEnvelope = send_json(request).await?;
        Ok(envelope.into_lead())
    }

    /// PUT /api/leads/:id - Partial update.
    pub async fn update_lead(&self, id: &str, update: &UpdateLeadRequest) -> CrmResult<Lead> {
        update.validate()?;
        let request = self
            .authorized(Method::PUT, &["leads", id])?
            .json(update);
        let envelope: LeadEnvelope = send_json(request).await?;
        Ok(envelope.into_lead())
    }

    /// DELETE /api/leads/:id
    pub async fn delete_lead(&self, id: &str) -> CrmResult<()> {
        send_empty(self.authorized(Method::DELETE, &["leads", id])?).await
    }
}
