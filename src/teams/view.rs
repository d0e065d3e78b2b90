//! Expand/collapse state of the sales team page.

use std::collections::HashMap;

/// Toggle state keyed by team and member id, owned by the page.
#[derive(Debug, Clone, Default)]
pub struct SalesTeamView {
    expanded_teams: HashMap<String, bool>,
    member_leads: HashMap<String, bool>,
}

impl SalesTeamView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a team card open or closed; returns the new state.
    pub fn toggle_team(&mut self, team_id: &str) -> bool {
        flip(&mut self.expanded_teams, team_id)
    }

    pub fn is_team_expanded(&self, team_id: &str) -> bool {
        self.expanded_teams.get(team_id).copied().unwrap_or(false)
    }

    /// Flip the "view leads" panel of a member; returns the new state.
    pub fn toggle_member_leads(&mut self, member_id: &str) -> bool {
        flip(&mut self.member_leads, member_id)
    }

    pub fn is_showing_leads(&self, member_id: &str) -> bool {
        self.member_leads.get(member_id).copied().unwrap_or(false)
    }

    /// Drop toggles for members that no longer exist.
    pub fn retain_members<'a>(&mut self, member_ids: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = member_ids.into_iter().collect();
        self.member_leads.retain(|id, _| keep.contains(id.as_str()));
    }
}

fn flip(map: &mut HashMap<String, bool>, key: &str) -> bool {
    let entry = map.entry(key.to_string()).or_insert(false);
    *entry = !*entry;
    *entry
}
