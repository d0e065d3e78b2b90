//! Dashboard payloads.

use serde::{Deserialize, Serialize};

use super::Team;

/// One point of a lead trend series. The label key differs per series
/// (`month`, `week`, `year`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    #[serde(alias = "month", alias = "week", alias = "year", alias = "day")]
    pub label: String,
    #[serde(default)]
    pub leads: u64,
    #[serde(default)]
    pub conversions: u64,
}

/// Lead count per source, e.g. `{ "name": "Website", "value": 12 }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSlice {
    pub name: String,
    #[serde(default)]
    pub value: u64,
}

/// Body of `GET /api/dashboard`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardMetrics {
    pub total_leads: u64,
    pub new_this_week: u64,
    pub trend_data: Vec<TrendPoint>,
    pub weekly_data: Vec<TrendPoint>,
    pub yearly_data: Vec<TrendPoint>,
    pub source_data: Vec<SourceSlice>,
}

/// Which trend series to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrendPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl DashboardMetrics {
    pub fn trend(&self, period: TrendPeriod) -> &[TrendPoint] {
        match period {
            TrendPeriod::Weekly => &self.weekly_data,
            TrendPeriod::Monthly => &self.trend_data,
            TrendPeriod::Yearly => &self.yearly_data,
        }
    }
}

/// Body of `GET /api/sales-teams/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamDashboard {
    pub teams: Vec<Team>,
    pub total_teams: u64,
    pub total_members: u64,
    pub total_target: u64,
}
