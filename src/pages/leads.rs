//! Leads table controller.

use crate::api::ApiClient;
use crate::db::SessionStore;
use crate::errors::{CrmError, CrmResult};
use crate::leads::{LeadStore, SortDirection, StatusFilter, Transition};
use crate::models::{Lead, LeadDraft, LeadStatus, UpdateLeadRequest};

use super::Notifier;

pub struct LeadsPage {
    api: ApiClient,
    session: SessionStore,
    store: LeadStore,
    notifier: Notifier,
}

impl LeadsPage {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self {
            api,
            session,
            store: LeadStore::new(),
            notifier: Notifier::new(),
        }
    }

    async fn fail(&mut self, action: &str, err: CrmError) -> CrmError {
        self.notifier
            .report(&mut self.api, &self.session, action, err)
            .await
    }

    /// Re-fetch every lead, archived ones included, so the status filter works locally.
    pub async fn refresh(&mut self) -> CrmResult<()> {
        let ticket = self.store.begin_request();
        match self.api.list_leads(true).await {
            Ok(leads) => {
                let count = leads.len();
                if self.store.apply_fetched(ticket, leads) {
                    tracing::debug!(count, "Leads refreshed");
                }
                Ok(())
            }
            Err(e) => Err(self.fail("load leads", e).await),
        }
    }

    /// A failed re-fetch after a confirmed mutation is reported but does not undo it.
    async fn refresh_after_mutation(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::debug!("Refresh after mutation failed: {}", e);
        }
    }

    pub async fn create(&mut self, draft: LeadDraft) -> CrmResult<Lead> {
        let ticket = self.store.begin_request();
        let lead = match self.api.create_lead(&draft).await {
            Ok(lead) => lead,
            Err(e) => return Err(self.fail("create lead", e).await),
        };

        self.store.apply_created(ticket, lead.clone());
        tracing::info!(lead_id = %lead.id, "Lead created");
        self.notifier.success("Lead added successfully!");
        self.refresh_after_mutation().await;
        Ok(lead)
    }

    /// Save the edit form of an existing lead.
    pub async fn update(&mut self, id: &str, draft: LeadDraft) -> CrmResult<Lead> {
        if let Err(e) = self.store.require(id) {
            return Err(self.fail("update lead", e).await);
        }
        if let Err(e) = draft.validate() {
            return Err(self.fail("update lead", e).await);
        }
        self.send_update(id, UpdateLeadRequest::from(draft), "Lead updated successfully!")
            .await
    }

    async fn send_update(
        &mut self,
        id: &str,
        update: UpdateLeadRequest,
        success: &str,
    ) -> CrmResult<Lead> {
        let ticket = self.store.begin_request();
        let lead = match self.api.update_lead(id, &update).await {
            Ok(lead) => lead,
            Err(e) => return Err(self.fail("update lead", e).await),
        };

        self.store.apply_updated(ticket, lead.clone());
        tracing::info!(lead_id = %lead.id, status = %lead.status, "Lead updated");
        self.notifier.success(success);
        self.refresh_after_mutation().await;
        Ok(lead)
    }

    /// Delete after confirmation; the cache is spliced, not re-fetched.
    pub async fn delete(&mut self, id: &str) -> CrmResult<()> {
        if let Err(e) = self.store.require(id) {
            return Err(self.fail("delete lead", e).await);
        }

        let ticket = self.store.begin_request();
        if let Err(e) = self.api.delete_lead(id).await {
            return Err(self.fail("delete lead", e).await);
        }

        self.store.apply_deleted(ticket, id);
        tracing::info!(lead_id = %id, "Lead deleted");
        self.notifier.success("Lead deleted successfully!");
        Ok(())
    }

    /// Apply a named status change. Nothing changes locally until the server acknowledges it.
    pub async fn transition(&mut self, id: &str, transition: Transition) -> CrmResult<Lead> {
        let next = match self
            .store
            .require(id)
            .and_then(|lead| transition.apply(lead.status))
        {
            Ok(next) => next,
            Err(e) => return Err(self.fail("change lead status", e).await),
        };
        self.send_update(id, UpdateLeadRequest::status(next), transition.success_message())
            .await
    }

    pub async fn archive(&mut self, id: &str) -> CrmResult<Lead> {
        self.transition(id, Transition::Archive).await
    }

    pub async fn restore(&mut self, id: &str) -> CrmResult<Lead> {
        self.transition(id, Transition::Restore).await
    }

    pub async fn convert(&mut self, id: &str) -> CrmResult<Lead> {
        self.transition(id, Transition::Convert).await
    }

    pub async fn set_status(&mut self, id: &str, status: LeadStatus) -> CrmResult<Lead> {
        self.transition(id, Transition::Set(status)).await
    }

    /// Archive button: restores archived leads, archives the rest.
    pub async fn toggle_archive(&mut self, id: &str) -> CrmResult<Lead> {
        let transition = match self.store.require(id) {
            Ok(lead) => Transition::toggle_archive(lead.status),
            Err(e) => return Err(self.fail("change lead status", e).await),
        };
        self.transition(id, transition).await
    }

    pub fn visible(&self, query: &str, filter: StatusFilter, direction: SortDirection) -> Vec<&Lead> {
        self.store.visible(query, filter, direction)
    }

    /// Text placed on the clipboard by the copy action.
    pub fn summary(&self, id: &str) -> CrmResult<String> {
        self.store.require(id).map(Lead::summary)
    }

    pub fn export_json(&mut self) -> CrmResult<String> {
        self.store.export_json().inspect_err(|e| {
            self.notifier.error(e.message());
        })
    }

    pub fn store(&self) -> &LeadStore {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
