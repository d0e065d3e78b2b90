//! Sales team endpoints.

use reqwest::Method;
use serde::Deserialize;

use super::{send_empty, send_json, ApiClient};
use crate::errors::CrmResult;
use crate::models::{AddMemberRequest, CreateTeamRequest, Team, TeamDashboard};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TeamEnvelope {
    Wrapped { team: Team },
    Bare(Team),
}

impl TeamEnvelope {
    fn into_team(self) -> Team {
        match self {
            TeamEnvelope::Wrapped { team } | TeamEnvelope::Bare(team) => team,
        }
    }
}

impl ApiClient {
    /// GET /api/sales-teams
    pub async fn list_teams(&self) -> CrmResult<Vec<Team>> {
        send_json(self.authorized(Method::GET, &["sales-teams"])?).await
    }

    /// GET /api/sales-teams/dashboard - Team overview; served without a credential.
    pub async fn team_dashboard(&self) -> CrmResult<TeamDashboard> {
        send_json(self.public(Method::GET, &["sales-teams", "dashboard"])).await
    }

    /// POST /api/sales-teams
    pub async fn create_team(&self, request: &CreateTeamRequest) -> CrmResult<Team> {
        request.validate()?;
        let envelope: TeamEnvelope =
            send_json(self.authorized(Method::POST, &["sales-teams"])?.json(request)).await?;
        Ok(envelope.into_team())
    }

    /// POST /api/sales-teams/:teamId/member
    pub async fn add_member(&self, team_id: &str, request: &AddMemberRequest) -> CrmResult<Team> {
        request.validate()?;
        let path = ["sales-teams", team_id, "member"];
        let envelope: TeamEnvelope =
            send_json(self.authorized(Method::POST, &path)?.json(request)).await?;
        Ok(envelope.into_team())
    }

    /// DELETE /api/sales-teams/:teamId/member/:memberId
    pub async fn remove_member(&self, team_id: &str, member_id: &str) -> CrmResult<()> {
        let path = ["sales-teams", team_id, "member", member_id];
        send_empty(self.authorized(Method::DELETE, &path)?).await
    }

    /// PATCH /api/sales-teams/:teamId/member/:memberId/complete
    pub async fn complete_member(&self, team_id: &str, member_id: &str) -> CrmResult<Team> {
        let path = ["sales-teams", team_id, "member", member_id, "complete"];
        let envelope: TeamEnvelope = send_json(self.authorized(Method::PATCH, &path)?).await?;
        Ok(envelope.into_team())
    }
}
