//! Sales team page controller.

use crate::api::ApiClient;
use crate::db::SessionStore;
use crate::errors::{CrmError, CrmResult};
use crate::leads::{LeadStore, Sequence, Ticket, Transition};
use crate::models::{AddMemberRequest, CreateTeamRequest, Lead, Team, UpdateLeadRequest};
use crate::teams::{
    department_targets, member_distribution, total_members, total_target, AssignedLeads,
    DepartmentTarget, MemberStats, SalesTeamView, TeamPerformance, TeamShare,
};

use super::Notifier;

/// Teams, the full lead list and the page's toggle state.
pub struct SalesTeamPage {
    api: ApiClient,
    session: SessionStore,
    teams: Vec<Team>,
    team_requests: Sequence,
    leads: LeadStore,
    view: SalesTeamView,
    notifier: Notifier,
}

impl SalesTeamPage {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self {
            api,
            session,
            teams: Vec::new(),
            team_requests: Sequence::default(),
            leads: LeadStore::new(),
            view: SalesTeamView::new(),
            notifier: Notifier::new(),
        }
    }

    async fn fail(&mut self, action: &str, err: CrmError) -> CrmError {
        self.notifier
            .report(&mut self.api, &self.session, action, err)
            .await
    }

    /// Re-fetch teams and leads. Both are attempted unless the first one signed the
    /// user out; the first failure is returned.
    pub async fn refresh(&mut self) -> CrmResult<()> {
        let teams = self.refresh_teams().await;
        if self.notifier.is_signed_out() {
            return teams;
        }
        let leads = self.refresh_leads().await;
        teams.and(leads)
    }

    pub async fn refresh_teams(&mut self) -> CrmResult<()> {
        let ticket = self.team_requests.begin();
        match self.api.list_teams().await {
            Ok(teams) => {
                if self.team_requests.land(ticket) {
                    self.teams = teams;
                    self.view.retain_members(
                        self.teams
                            .iter()
                            .flat_map(|t| t.members.iter().map(|m| m.id.as_str())),
                    );
                } else {
                    tracing::debug!(?ticket, "Discarding stale team list");
                }
                Ok(())
            }
            Err(e) => Err(self.fail("load teams", e).await),
        }
    }

    /// Leads are fetched with archived ones included; completion counts converted leads
    /// whatever happened to them afterwards.
    pub async fn refresh_leads(&mut self) -> CrmResult<()> {
        let ticket = self.leads.begin_request();
        match self.api.list_leads(true).await {
            Ok(leads) => {
                self.leads.apply_fetched(ticket, leads);
                Ok(())
            }
            Err(e) => Err(self.fail("load leads", e).await),
        }
    }

    async fn after_team_change(&mut self) {
        if let Err(e) = self.refresh_teams().await {
            tracing::debug!("Refresh after team change failed: {}", e);
        }
    }

    /// Replace one team with the server's copy unless a newer list already landed.
    fn apply_team(&mut self, ticket: Ticket, team: Team) {
        if self.team_requests.superseded(ticket) {
            return;
        }
        match self.teams.iter_mut().find(|t| t.id == team.id) {
            Some(slot) => *slot = team,
            None => self.teams.push(team),
        }
    }

    /// "Complete" button on an assigned lead: convert it, then re-fetch leads.
    pub async fn complete_lead(&mut self, lead_id: &str) -> CrmResult<Lead> {
        let next = match self
            .leads
            .require(lead_id)
            .and_then(|lead| Transition::Convert.apply(lead.status))
        {
            Ok(next) => next,
            Err(e) => return Err(self.fail("complete lead", e).await),
        };

        let ticket = self.leads.begin_request();
        let lead = match self
            .api
            .update_lead(lead_id, &UpdateLeadRequest::status(next))
            .await
        {
            Ok(lead) => lead,
            Err(e) => return Err(self.fail("complete lead", e).await),
        };

        self.leads.apply_updated(ticket, lead.clone());
        tracing::info!(lead_id, "Lead converted");
        self.notifier.success(Transition::Convert.success_message());
        if let Err(e) = self.refresh_leads().await {
            tracing::debug!("Refresh after completion failed: {}", e);
        }
        Ok(lead)
    }

    pub async fn create_team(&mut self, team_name: &str, department: Option<&str>) -> CrmResult<Team> {
        let request = CreateTeamRequest {
            team_name: team_name.trim().to_string(),
            department: department.map(str::trim).unwrap_or_default().to_string(),
        };

        let ticket = self.team_requests.begin();
        let team = match self.api.create_team(&request).await {
            Ok(team) => team,
            Err(e) => return Err(self.fail("create team", e).await),
        };

        self.apply_team(ticket, team.clone());
        tracing::info!(team_id = %team.id, "Team created");
        self.notifier.success("Team created successfully!");
        self.after_team_change().await;
        Ok(team)
    }

    pub async fn add_member(
        &mut self,
        team_id: &str,
        name: &str,
        role: &str,
        target: u32,
    ) -> CrmResult<Team> {
        let request = AddMemberRequest {
            name: name.trim().to_string(),
            role: role.trim().to_string(),
            target,
        };

        let ticket = self.team_requests.begin();
        let team = match self.api.add_member(team_id, &request).await {
            Ok(team) => team,
            Err(e) => return Err(self.fail("add member", e).await),
        };

        self.apply_team(ticket, team.clone());
        tracing::info!(team_id, "Member added");
        self.notifier.success("Member added successfully!");
        self.after_team_change().await;
        Ok(team)
    }

    pub async fn remove_member(&mut self, team_id: &str, member_id: &str) -> CrmResult<()> {
        if let Err(e) = self.api.remove_member(team_id, member_id).await {
            return Err(self.fail("remove member", e).await);
        }

        tracing::info!(team_id, member_id, "Member removed");
        self.notifier.success("Member removed.");
        self.after_team_change().await;
        Ok(())
    }

    /// Server-side completion endpoint. It may convert a lead as well, so both lists
    /// are re-fetched.
    pub async fn complete_member(&mut self, team_id: &str, member_id: &str) -> CrmResult<Team> {
        let ticket = self.team_requests.begin();
        let team = match self.api.complete_member(team_id, member_id).await {
            Ok(team) => team,
            Err(e) => return Err(self.fail("complete member", e).await),
        };

        self.apply_team(ticket, team.clone());
        match team.member(member_id) {
            Some(member) => tracing::info!(team_id, member = %member.name, "Member lead completed"),
            None => tracing::info!(team_id, member_id, "Member lead completed"),
        }
        self.notifier.success("Lead completed successfully!");
        if let Err(e) = self.refresh().await {
            tracing::debug!("Refresh after completion failed: {}", e);
        }
        Ok(team)
    }

    pub fn toggle_team(&mut self, team_id: &str) -> bool {
        self.view.toggle_team(team_id)
    }

    pub fn toggle_member_leads(&mut self, member_id: &str) -> bool {
        self.view.toggle_member_leads(member_id)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn view(&self) -> &SalesTeamView {
        &self.view
    }

    pub fn performance(&self) -> TeamPerformance<'_> {
        TeamPerformance::new(self.leads.leads())
    }

    /// Member rows of one team; empty for an unknown team.
    pub fn member_stats(&self, team_id: &str) -> Vec<MemberStats> {
        self.team(team_id)
            .map(|team| self.performance().team_stats(team))
            .unwrap_or_default()
    }

    /// Assigned leads of a member whose "view leads" panel is open.
    pub fn visible_member_leads<'s>(&'s self, member_id: &'s str) -> Option<AssignedLeads<'s>> {
        self.view
            .is_showing_leads(member_id)
            .then(|| self.performance().assigned_leads(member_id))
    }

    pub fn department_targets(&self) -> Vec<DepartmentTarget> {
        department_targets(&self.teams)
    }

    pub fn member_distribution(&self) -> Vec<TeamShare> {
        member_distribution(&self.teams)
    }

    pub fn total_members(&self) -> usize {
        total_members(&self.teams)
    }

    pub fn total_target(&self) -> u64 {
        total_target(&self.teams)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
