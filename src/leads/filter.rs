//! Search, status filter and name ordering for the leads table.

use std::str::FromStr;

use crate::errors::CrmError;
use crate::models::{Lead, LeadStatus};

/// Status filter chosen in the leads table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every lead that is not archived.
    #[default]
    All,
    /// Exactly one status, `Archived` included.
    Only(LeadStatus),
}

impl StatusFilter {
    pub fn admits(&self, status: LeadStatus) -> bool {
        match self {
            StatusFilter::All => status != LeadStatus::Archived,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Case-insensitive substring match on name or email. An empty query matches everything.
pub fn matches_search(lead: &Lead, query: &str) -> bool {
    let needle = query.to_lowercase();
    lead.name.to_lowercase().contains(&needle) || lead.email.to_lowercase().contains(&needle)
}

/// Apply the search and status filter, then order by name.
///
/// Names compare case-insensitively; equal names keep their fetch order in both
/// directions.
pub fn filter_leads<'a>(
    leads: &'a [Lead],
    query: &str,
    filter: StatusFilter,
    direction: SortDirection,
) -> Vec<&'a Lead> {
    let mut keyed: Vec<(String, &Lead)> = leads
        .iter()
        .filter(|lead| filter.admits(lead.status) && matches_search(lead, query))
        .map(|lead| (lead.name.to_lowercase(), lead))
        .collect();

    match direction {
        SortDirection::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    keyed.into_iter().map(|(_, lead)| lead).collect()
}
