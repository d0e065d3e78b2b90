//! Dashboard endpoint.

use reqwest::Method;

use super::{send_json, ApiClient};
use crate::errors::CrmResult;
use crate::models::DashboardMetrics;

impl ApiClient {
    /// GET /api/dashboard
    pub async fn dashboard(&self) -> CrmResult<DashboardMetrics> {
        send_json(self.authorized(Method::GET, &["dashboard"])?).await
    }
}
