//! Read-only statistics joining leads to team members.
//!
//! Completion is always derived from the lead list (`assignedTo == member` and
//! `Converted`). A member's server-side `leadsCompleted` counter is only compared
//! against it.

use serde::Serialize;

use crate::models::{Lead, LeadStatus, Member, Team};

/// Department label for teams without one.
pub const OTHER_DEPARTMENT: &str = "Other";

/// `round(100 * completed / target)` clamped to 100; 0 when there is no target.
pub fn completion_percentage(completed: usize, target: u32) -> u8 {
    if target == 0 {
        return 0;
    }
    let completed = completed as u64;
    let target = u64::from(target);
    // Round half up in integer arithmetic.
    let rounded = (200 * completed + target) / (2 * target);
    rounded.min(100) as u8
}

/// Coarse progress band for a completion percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceBand {
    Behind,
    OnTrack,
    Achieved,
}

impl PerformanceBand {
    pub fn for_percentage(percentage: u8) -> Self {
        match percentage {
            0..=49 => PerformanceBand::Behind,
            50..=99 => PerformanceBand::OnTrack,
            _ => PerformanceBand::Achieved,
        }
    }
}

/// Leads assigned to one member, in fetch order. Cloning restarts the sequence.
#[derive(Debug, Clone)]
pub struct AssignedLeads<'a> {
    leads: std::slice::Iter<'a, Lead>,
    member_id: &'a str,
}

impl<'a> Iterator for AssignedLeads<'a> {
    type Item = &'a Lead;

    fn next(&mut self) -> Option<Self::Item> {
        let member_id = self.member_id;
        self.leads
            .find(|lead| lead.assigned_to.as_deref() == Some(member_id))
    }
}

/// Per-member row of the team table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub member_id: String,
    pub name: String,
    pub target: u32,
    pub assigned: usize,
    pub completed: usize,
    pub percentage: u8,
    pub band: PerformanceBand,
    /// Server counter, when it disagrees with the derived completion count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_counter: Option<u32>,
}

/// Summed member targets for one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentTarget {
    pub department: String,
    pub target: u64,
}

/// Member count of one team, for proportion charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamShare {
    pub team_id: String,
    pub team_name: String,
    pub members: usize,
}

/// Joins the current lead cache to members. Holds a borrow, never a copy.
#[derive(Debug, Clone, Copy)]
pub struct TeamPerformance<'a> {
    leads: &'a [Lead],
}

impl<'a> TeamPerformance<'a> {
    pub fn new(leads: &'a [Lead]) -> Self {
        Self { leads }
    }

    pub fn assigned_leads<'m>(&self, member_id: &'m str) -> AssignedLeads<'m>
    where
        'a: 'm,
    {
        AssignedLeads {
            leads: self.leads.iter(),
            member_id,
        }
    }

    pub fn completed_leads<'m>(&self, member_id: &'m str) -> impl Iterator<Item = &'m Lead> + Clone
    where
        'a: 'm,
    {
        self.assigned_leads(member_id)
            .filter(|lead| lead.status == LeadStatus::Converted)
    }

    pub fn member_stats(&self, member: &Member) -> MemberStats {
        let assigned = self.assigned_leads(&member.id).count();
        let completed = self.completed_leads(&member.id).count();
        let percentage = completion_percentage(completed, member.target);

        let stale_counter = member
            .leads_completed
            .filter(|&counter| counter as usize != completed);
        if let Some(counter) = stale_counter {
            tracing::debug!(
                member_id = %member.id,
                counter,
                derived = completed,
                "Server completion counter disagrees with lead list"
            );
        }

        MemberStats {
            member_id: member.id.clone(),
            name: member.name.clone(),
            target: member.target,
            assigned,
            completed,
            percentage,
            band: PerformanceBand::for_percentage(percentage),
            stale_counter,
        }
    }

    pub fn team_stats(&self, team: &Team) -> Vec<MemberStats> {
        team.members.iter().map(|m| self.member_stats(m)).collect()
    }
}

/// Sum member targets per department, in first-seen department order.
///
/// Departments match exactly (case-sensitive); a missing or empty department counts
/// as [`OTHER_DEPARTMENT`].
pub fn department_targets(teams: &[Team]) -> Vec<DepartmentTarget> {
    let mut totals: Vec<DepartmentTarget> = Vec::new();
    for team in teams {
        let department = team
            .department
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(OTHER_DEPARTMENT);
        let sum: u64 = team.members.iter().map(|m| u64::from(m.target)).sum();

        match totals.iter_mut().find(|t| t.department == department) {
            Some(entry) => entry.target += sum,
            None => totals.push(DepartmentTarget {
                department: department.to_string(),
                target: sum,
            }),
        }
    }
    totals
}

/// Member count per team, in team order.
pub fn member_distribution(teams: &[Team]) -> Vec<TeamShare> {
    teams
        .iter()
        .map(|team| TeamShare {
            team_id: team.id.clone(),
            team_name: team.team_name.clone(),
            members: team.members.len(),
        })
        .collect()
}

pub fn total_members(teams: &[Team]) -> usize {
    teams.iter().map(|t| t.members.len()).sum()
}

pub fn total_target(teams: &[Team]) -> u64 {
    teams
        .iter()
        .flat_map(|t| &t.members)
        .map(|m| u64::from(m.target))
        .sum()
}
