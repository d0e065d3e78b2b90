//! In-memory lead cache owned by a page.
//!
//! Every request against the API takes a [`Ticket`] before it is sent. Results are
//! applied through the store, which drops anything that an already-landed, newer full
//! refresh supersedes.

use crate::errors::CrmError;
use crate::models::Lead;

use super::filter::{filter_leads, SortDirection, StatusFilter};

/// Monotonically increasing request sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues tickets and remembers the newest full refresh that landed.
#[derive(Debug, Default)]
pub struct Sequence {
    next: u64,
    landed: Option<Ticket>,
}

impl Sequence {
    pub fn begin(&mut self) -> Ticket {
        self.next += 1;
        Ticket(self.next)
    }

    /// Record a full refresh. Returns `false` if the same or a newer one already landed.
    pub fn land(&mut self, ticket: Ticket) -> bool {
        if self.landed.is_some_and(|landed| landed >= ticket) {
            return false;
        }
        self.landed = Some(ticket);
        true
    }

    /// Whether a partial update issued at `ticket` predates the newest landed refresh.
    pub fn superseded(&self, ticket: Ticket) -> bool {
        self.landed.is_some_and(|landed| landed > ticket)
    }
}

/// Cached lead list plus the bookkeeping needed to ignore stale responses.
#[derive(Debug, Default)]
pub struct LeadStore {
    leads: Vec<Lead>,
    sequence: Sequence,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the ticket for a request about to be sent.
    pub fn begin_request(&mut self) -> Ticket {
        self.sequence.begin()
    }

    /// Replace the cache with a full fetch result. Returns `false` if a newer
    /// refresh already landed.
    pub fn apply_fetched(&mut self, ticket: Ticket, leads: Vec<Lead>) -> bool {
        if !self.sequence.land(ticket) {
            tracing::debug!(?ticket, "Discarding stale lead list");
            return false;
        }
        self.leads = leads;
        true
    }

    /// Append a lead the server just created.
    pub fn apply_created(&mut self, ticket: Ticket, lead: Lead) -> bool {
        if self.sequence.superseded(ticket) {
            return false;
        }
        if self.leads.iter().any(|l| l.id == lead.id) {
            return self.apply_updated(ticket, lead);
        }
        self.leads.push(lead);
        true
    }

    /// Replace a lead in place, keeping its position in fetch order.
    pub fn apply_updated(&mut self, ticket: Ticket, lead: Lead) -> bool {
        if self.sequence.superseded(ticket) {
            return false;
        }
        match self.leads.iter_mut().find(|l| l.id == lead.id) {
            Some(slot) => {
                *slot = lead;
                true
            }
            None => false,
        }
    }

    /// Remove a lead after the server confirmed the delete.
    pub fn apply_deleted(&mut self, ticket: Ticket, id: &str) -> bool {
        if self.sequence.superseded(ticket) {
            return false;
        }
        let before = self.leads.len();
        self.leads.retain(|l| l.id != id);
        self.leads.len() != before
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn get(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// Like [`LeadStore::get`], as an error for operations that need the lead to exist.
    pub fn require(&self, id: &str) -> Result<&Lead, CrmError> {
        self.get(id)
            .ok_or_else(|| CrmError::NotFound(format!("Lead {} not found", id)))
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    /// The filtered, ordered view rendered by the leads table.
    pub fn visible(&self, query: &str, filter: StatusFilter, direction: SortDirection) -> Vec<&Lead> {
        filter_leads(&self.leads, query, filter, direction)
    }

    /// Pretty-printed JSON array of the cache, using the API's field names.
    pub fn export_json(&self) -> Result<String, CrmError> {
        if self.is_empty() {
            return Err(CrmError::Validation("No data".to_string()));
        }
        Ok(serde_json::to_string_pretty(&self.leads)?)
    }
}
