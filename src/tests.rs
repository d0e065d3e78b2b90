//! Integration tests against an in-process mock of the CRM API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower_http::trace::TraceLayer;

use crate::api::ApiClient;
use crate::auth;
use crate::db::{init_database, SessionStore};
use crate::errors::CrmError;
use crate::leads::{SortDirection, StatusFilter};
use crate::models::{AvatarUpload, LeadDraft, LeadStatus, TrendPeriod, UserProfile};
use crate::pages::{LeadsPage, NoticeKind, SalesTeamPage};
use crate::settings;
use crate::teams::{DepartmentTarget, PerformanceBand};

const TOKEN: &str = "test-token";
const BEARER: &str = "Bearer test-token";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Server-side records of the mock.
struct MockData {
    leads: Vec<Value>,
    teams: Vec<Value>,
    user: Value,
    requests: usize,
    next_id: u64,
    /// Lead updates answer 500 while set
    fail_writes: bool,
}

impl MockData {
    fn seeded() -> Self {
        Self {
            leads: vec![
                json!({ "_id": "l1", "name": "Bob", "email": "bob@example.com", "phone": "555-0101",
                        "source": "Website", "status": "New", "assignedTo": "m1" }),
                json!({ "_id": "l2", "name": "alice", "email": "alice@example.com", "phone": "555-0102",
                        "source": "Referral", "status": "Converted", "assignedTo": "m1" }),
                json!({ "_id": "l3", "name": "Carol", "email": "carol@corp.io", "phone": "555-0103",
                        "source": "Social Media", "status": "Contacted", "assignedTo": null }),
                json!({ "_id": "l4", "name": "Dave", "email": "dave@example.com", "phone": "555-0104",
                        "source": "Trade Show", "status": "Archived", "assignedTo": "m2" }),
            ],
            teams: vec![
                json!({ "_id": "t1", "teamName": "Closers", "department": "Direct Sales", "members": [
                    { "_id": "m1", "name": "Ana", "role": "AE", "target": 4, "leadsCompleted": 3 },
                    { "_id": "m2", "name": "Ben", "role": "SDR", "target": 46 },
                ]}),
                json!({ "_id": "t2", "teamName": "Hunters", "department": "Direct Sales", "members": [
                    { "_id": "m3", "name": "Cem", "role": "AE", "target": 30, "leadsCompleted": 0 },
                ]}),
                json!({ "_id": "t3", "teamName": "Key Accounts", "department": "Enterprise B2B", "members": [
                    { "_id": "m4", "name": "Dia", "role": "KAM", "target": 20 },
                ]}),
                json!({ "_id": "t4", "teamName": "Ops", "department": "", "members": [
                    { "_id": "m5", "name": "Eli", "role": "Ops", "target": 10 },
                ]}),
            ],
            user: json!({ "_id": "u1", "fullName": "Test User", "email": "test@example.com",
                          "role": "admin", "avatar": null, "theme": "royal-indigo" }),
            requests: 0,
            next_id: 100,
            fail_writes: false,
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn team_mut(&mut self, team_id: &str) -> Result<&mut Value, (StatusCode, Json<Value>)> {
        self.teams
            .iter_mut()
            .find(|t| t["_id"] == team_id)
            .ok_or_else(|| not_found("Team not found"))
    }
}

#[derive(Clone)]
struct MockApi {
    inner: Arc<Mutex<MockData>>,
}

impl MockApi {
    fn data(&self) -> MutexGuard<'_, MockData> {
        self.inner.lock().unwrap()
    }
}

fn not_found(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message })))
}

fn check_auth(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if presented == Some(BEARER) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Not authorized, token failed" })),
        ))
    }
}

async fn count_requests(State(api): State<MockApi>, request: Request, next: Next) -> Response {
    api.data().requests += 1;
    next.run(request).await
}

async fn signin(State(api): State<MockApi>, Json(body): Json<Value>) -> Reply {
    if body["password"] != "secret" {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        ));
    }
    let user = api.data().user.clone();
    Ok(Json(json!({ "token": TOKEN, "user": user })))
}

async fn signup(Json(body): Json<Value>) -> Reply {
    if body.get("confirmPassword").is_some() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Unexpected field" })),
        ));
    }
    Ok(Json(json!({ "message": "User registered successfully" })))
}

async fn forgot_password(Json(_body): Json<Value>) -> Reply {
    Ok(Json(json!({ "message": "Reset link sent" })))
}

async fn reset_password(Path(token): Path<String>, Json(_body): Json<Value>) -> Reply {
    if token != "reset-123" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid or expired token" })),
        ));
    }
    Ok(Json(json!({ "message": "Password updated" })))
}

async fn logout(headers: HeaderMap) -> Reply {
    check_auth(&headers)?;
    Ok(Json(json!({ "message": "Logged out" })))
}

async fn list_leads(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    check_auth(&headers)?;
    let all = params.get("all").is_some_and(|v| v == "true");
    let leads: Vec<Value> = api
        .data()
        .leads
        .iter()
        .filter(|l| all || l["status"] != "Archived")
        .cloned()
        .collect();
    Ok(Json(json!({ "leads": leads })))
}

async fn create_lead(State(api): State<MockApi>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    let mut lead = body;
    lead["_id"] = json!(data.next_id("lead"));
    lead["createdAt"] = json!("2026-01-05T09:30:00Z");
    data.leads.push(lead.clone());
    Ok(Json(lead))
}

async fn update_lead(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    if data.fail_writes {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Internal server error" })),
        ));
    }
    let lead = data
        .leads
        .iter_mut()
        .find(|l| l["_id"] == id.as_str())
        .ok_or_else(|| not_found("Lead not found"))?;
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            lead[key.as_str()] = value.clone();
        }
    }
    Ok(Json(json!({ "lead": lead.clone() })))
}

async fn delete_lead(State(api): State<MockApi>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    let index = data
        .leads
        .iter()
        .position(|l| l["_id"] == id.as_str())
        .ok_or_else(|| not_found("Lead not found"))?;
    data.leads.remove(index);
    Ok(Json(json!({ "message": "Lead deleted" })))
}

async fn list_teams(State(api): State<MockApi>, headers: HeaderMap) -> Reply {
    check_auth(&headers)?;
    Ok(Json(Value::Array(api.data().teams.clone())))
}

async fn team_dashboard(State(api): State<MockApi>) -> Reply {
    let data = api.data();
    let members: Vec<&Value> = data
        .teams
        .iter()
        .filter_map(|t| t["members"].as_array())
        .flatten()
        .collect();
    let total_target: u64 = members.iter().filter_map(|m| m["target"].as_u64()).sum();
    Ok(Json(json!({
        "teams": data.teams,
        "totalTeams": data.teams.len(),
        "totalMembers": members.len(),
        "totalTarget": total_target,
    })))
}

async fn create_team(State(api): State<MockApi>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    let team = json!({
        "_id": data.next_id("team"),
        "teamName": body["teamName"],
        "department": body["department"],
        "members": [],
    });
    data.teams.push(team.clone());
    Ok(Json(json!({ "team": team })))
}

async fn add_member(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    let member = json!({
        "_id": data.next_id("member"),
        "name": body["name"],
        "role": body["role"],
        "target": body["target"],
        "leadsCompleted": 0,
    });
    let team = data.team_mut(&team_id)?;
    if let Some(members) = team["members"].as_array_mut() {
        members.push(member);
    }
    Ok(Json(team.clone()))
}

async fn remove_member(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path((team_id, member_id)): Path<(String, String)>,
) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    let team = data.team_mut(&team_id)?;
    if let Some(members) = team["members"].as_array_mut() {
        members.retain(|m| m["_id"] != member_id.as_str());
    }
    Ok(Json(json!({ "message": "Member removed" })))
}

async fn complete_member(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path((team_id, member_id)): Path<(String, String)>,
) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    let team = data.team_mut(&team_id)?;
    let member = team["members"]
        .as_array_mut()
        .and_then(|members| members.iter_mut().find(|m| m["_id"] == member_id.as_str()))
        .ok_or_else(|| not_found("Member not found"))?;
    let completed = member["leadsCompleted"].as_u64().unwrap_or(0);
    member["leadsCompleted"] = json!(completed + 1);
    Ok(Json(team.clone()))
}

async fn get_profile(State(api): State<MockApi>, headers: HeaderMap) -> Reply {
    check_auth(&headers)?;
    Ok(Json(json!({ "user": api.data().user })))
}

async fn update_profile(
    State(api): State<MockApi>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    check_auth(&headers)?;
    let mut full_name = None;
    let mut avatar = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "fullName" => full_name = field.text().await.ok(),
            "profileImage" => {
                avatar = field.file_name().map(|f| format!("/uploads/{}", f));
                let _ = field.bytes().await;
            }
            _ => {}
        }
    }

    let mut data = api.data();
    if let Some(full_name) = full_name {
        data.user["fullName"] = json!(full_name);
    }
    if let Some(avatar) = avatar {
        data.user["avatar"] = json!(avatar);
    }
    Ok(Json(json!({ "success": true, "user": data.user })))
}

async fn update_theme(State(api): State<MockApi>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    check_auth(&headers)?;
    let mut data = api.data();
    data.user["theme"] = body["theme"].clone();
    Ok(Json(json!({ "success": true, "user": data.user })))
}

async fn dashboard(headers: HeaderMap) -> Reply {
    check_auth(&headers)?;
    Ok(Json(json!({
        "totalLeads": 4,
        "newThisWeek": 2,
        "trendData": [ { "month": "Jan", "leads": 10, "conversions": 3 } ],
        "weeklyData": [ { "week": "W1", "leads": 3, "conversions": 1 },
                        { "week": "W2", "leads": 5, "conversions": 2 } ],
        "sourceData": [ { "name": "Website", "value": 6 } ],
    })))
}

fn mock_router(api: MockApi) -> Router {
    Router::new()
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password/{token}", post(reset_password))
        .route("/api/auth/logout", post(logout))
        .route("/api/leads", get(list_leads).post(create_lead))
        .route("/api/leads/{id}", put(update_lead).delete(delete_lead))
        .route("/api/sales-teams", get(list_teams).post(create_team))
        .route("/api/sales-teams/dashboard", get(team_dashboard))
        .route("/api/sales-teams/{team_id}/member", post(add_member))
        .route(
            "/api/sales-teams/{team_id}/member/{member_id}",
            delete(remove_member),
        )
        .route(
            "/api/sales-teams/{team_id}/member/{member_id}/complete",
            patch(complete_member),
        )
        .route("/api/profile", get(get_profile))
        .route("/api/profile/update", put(update_profile))
        .route("/api/theme", put(update_theme))
        .route("/api/dashboard", get(dashboard))
        .layer(middleware::from_fn_with_state(api.clone(), count_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(api)
}

/// Test fixture: a running mock API plus a fresh session database.
struct TestFixture {
    mock: MockApi,
    base_url: String,
    session: SessionStore,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("session.sqlite"))
            .await
            .expect("Failed to init DB");

        let mock = MockApi {
            inner: Arc::new(Mutex::new(MockData::seeded())),
        };
        let app = mock_router(mock.clone());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            mock,
            base_url: format!("http://{}", addr),
            session: SessionStore::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn client(&self, token: Option<&str>) -> ApiClient {
        let mut client = ApiClient::new(&self.base_url, Duration::from_secs(5)).unwrap();
        client.set_token(token.map(str::to_string));
        client
    }

    fn signed_in(&self) -> ApiClient {
        self.client(Some(TOKEN))
    }

    fn requests(&self) -> usize {
        self.mock.data().requests
    }

    async fn leads_page(&self) -> LeadsPage {
        let mut page = LeadsPage::new(self.signed_in(), self.session.clone());
        page.refresh().await.unwrap();
        page
    }

    async fn sales_team_page(&self) -> SalesTeamPage {
        let mut page = SalesTeamPage::new(self.signed_in(), self.session.clone());
        page.refresh().await.unwrap();
        page
    }
}

fn names(leads: &[&crate::models::Lead]) -> Vec<String> {
    leads.iter().map(|l| l.name.clone()).collect()
}

// ==================== Auth ====================

#[tokio::test]
async fn test_signin_persists_token() {
    let fixture = TestFixture::new().await;
    let mut api = fixture.client(None);

    let err = auth::sign_in(&mut api, &fixture.session, "test@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(err.is_authorization());
    assert_eq!(err.message(), "Invalid email or password");
    assert!(api.token().is_none());

    let user = auth::sign_in(&mut api, &fixture.session, "test@example.com", "secret")
        .await
        .unwrap();
    assert_eq!(user.full_name, "Test User");
    assert_eq!(api.token(), Some(TOKEN));

    let mut fresh = fixture.client(None);
    let stored = auth::restore_session(&mut fresh, &fixture.session).await.unwrap();
    assert!(stored.is_signed_in());
    assert_eq!(stored.profile.unwrap().email, "test@example.com");
    assert_eq!(fresh.token(), Some(TOKEN));
}

#[tokio::test]
async fn test_signin_requires_credentials_locally() {
    let fixture = TestFixture::new().await;
    let mut api = fixture.client(None);

    let err = auth::sign_in(&mut api, &fixture.session, " ", "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
    assert_eq!(fixture.requests(), 0);
}

#[tokio::test]
async fn test_signup_and_password_reset() {
    let fixture = TestFixture::new().await;
    let api = fixture.client(None);

    let mismatch = crate::models::SignUpForm {
        full_name: "New User".to_string(),
        email: "new@example.com".to_string(),
        password: "pw1".to_string(),
        confirm_password: "pw2".to_string(),
    };
    let err = auth::sign_up(&api, mismatch.clone()).await.unwrap_err();
    assert_eq!(err.message(), "Passwords do not match");
    assert_eq!(fixture.requests(), 0);

    let form = crate::models::SignUpForm {
        confirm_password: "pw1".to_string(),
        ..mismatch
    };
    let message = auth::sign_up(&api, form).await.unwrap();
    assert_eq!(message, "User registered successfully");

    let message = auth::forgot_password(&api, "new@example.com").await.unwrap();
    assert_eq!(message, "Reset link sent");

    let err = auth::reset_password(&api, "bogus", "pw", "pw").await.unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
    let message = auth::reset_password(&api, "reset-123", "pw", "pw").await.unwrap();
    assert_eq!(message, "Password updated");
}

#[tokio::test]
async fn test_sign_out_keeps_theme() {
    let fixture = TestFixture::new().await;
    let mut api = fixture.client(None);
    auth::sign_in(&mut api, &fixture.session, "test@example.com", "secret")
        .await
        .unwrap();
    fixture.session.save_theme("sunset-glow").await.unwrap();

    let before = fixture.requests();
    auth::sign_out(&mut api, &fixture.session).await.unwrap();
    assert_eq!(fixture.requests(), before + 1);
    assert!(api.token().is_none());

    let stored = fixture.session.load().await.unwrap();
    assert!(!stored.is_signed_in());
    assert!(stored.profile.is_none());
    assert_eq!(stored.theme.as_deref(), Some("sunset-glow"));
}

#[tokio::test]
async fn test_rejected_token_forces_sign_out() {
    let fixture = TestFixture::new().await;
    fixture
        .session
        .save_token("expired", &UserProfile::default())
        .await
        .unwrap();

    let mut page = LeadsPage::new(fixture.client(Some("expired")), fixture.session.clone());
    let err = page.refresh().await.unwrap_err();

    assert!(err.is_authorization());
    assert!(page.notifier().is_signed_out());
    assert_eq!(page.notifier().notices()[0].kind, NoticeKind::SignedOut);
    assert!(page.store().is_empty());
    assert!(!fixture.session.load().await.unwrap().is_signed_in());

    // The cleared client fails locally from now on.
    let before = fixture.requests();
    assert!(page.refresh().await.unwrap_err().is_authorization());
    assert_eq!(fixture.requests(), before);
}

// ==================== Leads ====================

#[tokio::test]
async fn test_refresh_includes_archived_but_all_filter_hides_them() {
    let fixture = TestFixture::new().await;
    let page = fixture.leads_page().await;

    assert_eq!(page.store().len(), 4);
    let visible = page.visible("", StatusFilter::All, SortDirection::Ascending);
    assert_eq!(names(&visible), vec!["alice", "Bob", "Carol"]);

    let archived = page.visible(
        "",
        StatusFilter::Only(LeadStatus::Archived),
        SortDirection::Ascending,
    );
    assert_eq!(names(&archived), vec!["Dave"]);

    let descending = page.visible("", StatusFilter::All, SortDirection::Descending);
    assert_eq!(names(&descending), vec!["Carol", "Bob", "alice"]);

    let by_email = page.visible("CORP", StatusFilter::All, SortDirection::Ascending);
    assert_eq!(names(&by_email), vec!["Carol"]);
}

#[tokio::test]
async fn test_unknown_source_survives_round_trip() {
    let fixture = TestFixture::new().await;
    let page = fixture.leads_page().await;
    let dave = page.store().get("l4").unwrap();
    assert_eq!(dave.source.as_str(), "Trade Show");
    assert!(page.store().get("l3").unwrap().assigned_to.is_none());
}

#[tokio::test]
async fn test_create_with_empty_phone_sends_no_request() {
    let fixture = TestFixture::new().await;
    let mut page = LeadsPage::new(fixture.signed_in(), fixture.session.clone());

    let draft = LeadDraft::new("Zed", "zed@example.com", "");
    let err = page.create(draft).await.unwrap_err();

    assert!(matches!(err, CrmError::Validation(_)));
    assert_eq!(fixture.requests(), 0);
    assert_eq!(page.notifier().notices()[0].kind, NoticeKind::Error);
    assert!(!page.notifier().is_signed_out());
}

#[tokio::test]
async fn test_create_appends_and_refetches() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.leads_page().await;

    let lead = page
        .create(LeadDraft::new("Erin", "erin@example.com", "555-0199"))
        .await
        .unwrap();

    assert!(lead.id.starts_with("lead-"));
    assert_eq!(lead.status, LeadStatus::New);
    assert!(lead.created_at.is_some());
    assert_eq!(page.store().len(), 5);
    assert_eq!(fixture.mock.data().leads.len(), 5);
    assert_eq!(page.notifier().notices()[0].message, "Lead added successfully!");
}

#[tokio::test]
async fn test_update_rejects_blank_field_without_request() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.leads_page().await;
    let before = fixture.requests();

    let mut draft = LeadDraft::from(page.store().get("l3").unwrap());
    draft.phone = "   ".to_string();
    let err = page.update("l3", draft).await.unwrap_err();

    assert!(matches!(err, CrmError::Validation(_)));
    assert_eq!(fixture.requests(), before);
    assert_eq!(page.store().get("l3").unwrap().phone, "555-0103");
}

#[tokio::test]
async fn test_archive_then_restore_resets_to_new() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.leads_page().await;
    assert_eq!(page.store().get("l3").unwrap().status, LeadStatus::Contacted);

    let archived = page.archive("l3").await.unwrap();
    assert_eq!(archived.status, LeadStatus::Archived);
    assert_eq!(page.store().get("l3").unwrap().status, LeadStatus::Archived);

    let restored = page.restore("l3").await.unwrap();
    assert_eq!(restored.status, LeadStatus::New);
    assert_eq!(page.store().get("l3").unwrap().status, LeadStatus::New);
    assert_eq!(fixture.mock.data().leads[2]["status"], "New");
}

#[tokio::test]
async fn test_invalid_transitions_send_no_request() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.leads_page().await;
    let before = fixture.requests();

    let err = page.archive("l4").await.unwrap_err();
    assert!(matches!(err, CrmError::InvalidTransition(_)));
    let err = page.restore("l1").await.unwrap_err();
    assert!(matches!(err, CrmError::InvalidTransition(_)));
    let err = page.convert("missing").await.unwrap_err();
    assert!(matches!(err, CrmError::NotFound(_)));

    assert_eq!(fixture.requests(), before);
}

#[tokio::test]
async fn test_toggle_archive_follows_current_status() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.leads_page().await;

    assert_eq!(page.toggle_archive("l4").await.unwrap().status, LeadStatus::New);
    assert_eq!(page.toggle_archive("l1").await.unwrap().status, LeadStatus::Archived);
    assert_eq!(
        page.set_status("l1", LeadStatus::Lost).await.unwrap().status,
        LeadStatus::Lost
    );
}

#[tokio::test]
async fn test_delete_splices_without_refetch() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.leads_page().await;
    let before = fixture.requests();

    page.delete("l3").await.unwrap();

    assert_eq!(fixture.requests(), before + 1);
    assert_eq!(page.store().len(), 3);
    assert!(page.store().get("l3").is_none());
    assert_eq!(fixture.mock.data().leads.len(), 3);
}

#[tokio::test]
async fn test_failed_delete_leaves_cache_untouched() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.leads_page().await;

    // Someone else deleted it in the meantime.
    fixture.mock.data().leads.retain(|l| l["_id"] != "l1");

    let err = page.delete("l1").await.unwrap_err();
    assert!(matches!(err, CrmError::NotFound(_)));
    assert_eq!(page.store().len(), 4);
    assert!(page.store().get("l1").is_some());
    assert!(!page.notifier().is_signed_out());
}

#[tokio::test]
async fn test_server_error_keeps_cache_and_session() {
    let fixture = TestFixture::new().await;
    fixture
        .session
        .save_token(TOKEN, &UserProfile::default())
        .await
        .unwrap();
    let mut page = fixture.leads_page().await;
    fixture.mock.data().fail_writes = true;

    let err = page.archive("l3").await.unwrap_err();
    assert!(matches!(err, CrmError::Network(_)));
    assert_eq!(page.store().get("l3").unwrap().status, LeadStatus::Contacted);
    assert!(matches!(page.convert("l1").await, Err(CrmError::Network(_))));
    assert_eq!(page.store().get("l1").unwrap().status, LeadStatus::New);
    assert!(matches!(page.restore("l4").await, Err(CrmError::Network(_))));
    assert_eq!(page.store().get("l4").unwrap().status, LeadStatus::Archived);

    let notices = page.notifier().notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.kind == NoticeKind::Error));
    assert!(!page.notifier().is_signed_out());
    assert_eq!(
        fixture.session.load().await.unwrap().token.as_deref(),
        Some(TOKEN)
    );
}

#[tokio::test]
async fn test_unreachable_server_keeps_cache() {
    let fixture = TestFixture::new().await;
    fixture
        .session
        .save_token(TOKEN, &UserProfile::default())
        .await
        .unwrap();

    // Grab a free port, then close it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut api = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    api.set_token(Some(TOKEN.to_string()));
    let mut offline = LeadsPage::new(api, fixture.session.clone());
    let err = offline.refresh().await.unwrap_err();
    assert!(matches!(err, CrmError::Network(_)));
    assert!(offline.store().is_empty());
    assert_eq!(offline.notifier().notices()[0].kind, NoticeKind::Error);
    assert!(!offline.notifier().is_signed_out());
    assert_eq!(
        fixture.session.load().await.unwrap().token.as_deref(),
        Some(TOKEN)
    );
}

#[tokio::test]
async fn test_export_and_summary() {
    let fixture = TestFixture::new().await;
    let mut page = LeadsPage::new(fixture.signed_in(), fixture.session.clone());
    assert!(matches!(page.export_json(), Err(CrmError::Validation(_))));

    page.refresh().await.unwrap();
    let exported = page.export_json().unwrap();
    let parsed: Vec<Value> = serde_json::from_str(&exported).unwrap();
    assert_eq!(parsed.len(), 4);
    assert_eq!(parsed[2]["source"], "Social Media");

    let summary = page.summary("l1").unwrap();
    assert!(summary.contains("Name: Bob"));
}

// ==================== Sales teams ====================

#[tokio::test]
async fn test_member_stats_derive_from_leads() {
    let fixture = TestFixture::new().await;
    let page = fixture.sales_team_page().await;

    let stats = page.member_stats("t1");
    assert_eq!(stats.len(), 2);
    let ana = &stats[0];
    assert_eq!(ana.assigned, 2);
    assert_eq!(ana.completed, 1);
    assert_eq!(ana.percentage, 25);
    assert_eq!(ana.band, PerformanceBand::Behind);
    assert_eq!(ana.stale_counter, Some(3));

    // Archived leads still count as assigned.
    assert_eq!(stats[1].assigned, 1);
    assert_eq!(stats[1].percentage, 0);

    assert!(page.member_stats("missing").is_empty());
}

#[tokio::test]
async fn test_complete_lead_recomputes_percentage() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.sales_team_page().await;

    let lead = page.complete_lead("l1").await.unwrap();
    assert_eq!(lead.status, LeadStatus::Converted);

    let ana = &page.member_stats("t1")[0];
    assert_eq!(ana.completed, 2);
    assert_eq!(ana.percentage, 50);
    assert_eq!(ana.band, PerformanceBand::OnTrack);
}

#[tokio::test]
async fn test_department_targets_and_totals() {
    let fixture = TestFixture::new().await;
    let page = fixture.sales_team_page().await;

    assert_eq!(
        page.department_targets(),
        vec![
            DepartmentTarget {
                department: "Direct Sales".to_string(),
                target: 80
            },
            DepartmentTarget {
                department: "Enterprise B2B".to_string(),
                target: 20
            },
            DepartmentTarget {
                department: "Other".to_string(),
                target: 10
            },
        ]
    );
    assert_eq!(page.total_members(), 5);
    assert_eq!(page.total_target(), 110);

    let distribution = page.member_distribution();
    assert_eq!(distribution[0].members, 2);
    assert_eq!(distribution[3].team_name, "Ops");
}

#[tokio::test]
async fn test_member_leads_toggle() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.sales_team_page().await;

    assert!(page.visible_member_leads("m1").is_none());
    assert!(page.toggle_member_leads("m1"));

    let assigned = page.visible_member_leads("m1").unwrap();
    let ids: Vec<&str> = assigned.clone().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["l1", "l2"]);
    // Restartable: the clone above did not consume it.
    assert_eq!(assigned.count(), 2);

    assert!(page.toggle_team("t1"));
    assert!(page.view().is_team_expanded("t1"));
}

#[tokio::test]
async fn test_team_management() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.sales_team_page().await;
    let before = fixture.requests();

    let err = page.create_team("  ", Some("Direct Sales")).await.unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
    let err = page.add_member("t3", "", "AE", 5).await.unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
    assert_eq!(fixture.requests(), before);

    let team = page.create_team("Farmers", None).await.unwrap();
    assert_eq!(page.teams().len(), 5);

    let team = page.add_member(&team.id, "Fay", "AE", 12).await.unwrap();
    assert_eq!(team.members.len(), 1);
    assert_eq!(page.team(&team.id).unwrap().members[0].target, 12);
    assert_eq!(page.department_targets().last().unwrap().target, 22);

    page.remove_member("t1", "m2").await.unwrap();
    assert_eq!(page.team("t1").unwrap().members.len(), 1);
    assert_eq!(page.total_members(), 5);
}

#[tokio::test]
async fn test_complete_member_updates_counter() {
    let fixture = TestFixture::new().await;
    let mut page = fixture.sales_team_page().await;

    let team = page.complete_member("t2", "m3").await.unwrap();
    assert_eq!(team.member("m3").unwrap().leads_completed, Some(1));
    assert_eq!(
        page.team("t2").unwrap().member("m3").unwrap().leads_completed,
        Some(1)
    );
    // No converted lead backs the counter.
    assert_eq!(page.member_stats("t2")[0].stale_counter, Some(1));
}

#[tokio::test]
async fn test_expired_token_signs_out_sales_team_once() {
    let fixture = TestFixture::new().await;
    fixture
        .session
        .save_token("expired", &UserProfile::default())
        .await
        .unwrap();

    let mut page = SalesTeamPage::new(fixture.client(Some("expired")), fixture.session.clone());
    let err = page.refresh().await.unwrap_err();

    assert!(err.is_authorization());
    assert_eq!(fixture.requests(), 1);
    let notices = page.notifier().notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::SignedOut);
    assert!(page.notifier().is_signed_out());
    assert!(page.teams().is_empty());
    assert!(!fixture.session.load().await.unwrap().is_signed_in());
}

#[tokio::test]
async fn test_team_dashboard_is_public() {
    let fixture = TestFixture::new().await;
    let api = fixture.client(None);

    let overview = api.team_dashboard().await.unwrap();
    assert_eq!(overview.total_teams, 4);
    assert_eq!(overview.total_members, 5);
    assert_eq!(overview.total_target, 110);
    assert_eq!(crate::teams::department_targets(&overview.teams).len(), 3);
}

// ==================== Dashboard & settings ====================

#[tokio::test]
async fn test_dashboard_metrics() {
    let fixture = TestFixture::new().await;
    let metrics = fixture.signed_in().dashboard().await.unwrap();

    assert_eq!(metrics.total_leads, 4);
    assert_eq!(metrics.trend(TrendPeriod::Monthly)[0].label, "Jan");
    assert_eq!(metrics.trend(TrendPeriod::Weekly).len(), 2);
    assert!(metrics.trend(TrendPeriod::Yearly).is_empty());
}

#[tokio::test]
async fn test_set_theme_syncs_profile() {
    let fixture = TestFixture::new().await;
    let api = fixture.signed_in();

    let err = settings::set_theme(&api, &fixture.session, "neon").await.unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
    assert_eq!(fixture.requests(), 0);

    let theme = settings::set_theme(&api, &fixture.session, "emerald-glass")
        .await
        .unwrap();
    assert_eq!(theme.name, "Emerald");

    let stored = fixture.session.load().await.unwrap();
    assert_eq!(stored.theme.as_deref(), Some("emerald-glass"));
    assert_eq!(
        stored.profile.as_ref().unwrap().theme.as_deref(),
        Some("emerald-glass")
    );
    assert_eq!(settings::current_theme(&stored).id, "emerald-glass");
    assert_eq!(fixture.mock.data().user["theme"], "emerald-glass");
}

#[tokio::test]
async fn test_profile_update_with_avatar() {
    let fixture = TestFixture::new().await;
    let api = fixture.signed_in();

    let err = settings::update_profile(&api, &fixture.session, " ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Validation(_)));
    assert_eq!(fixture.requests(), 0);

    let avatar = AvatarUpload {
        file_name: "me.png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    };
    let profile = settings::update_profile(&api, &fixture.session, "Renamed", Some(avatar))
        .await
        .unwrap();
    assert_eq!(profile.full_name, "Renamed");
    assert_eq!(profile.avatar.as_deref(), Some("/uploads/me.png"));

    let loaded = settings::load_profile(&api, &fixture.session).await.unwrap();
    assert_eq!(loaded, profile);
    let stored = fixture.session.load().await.unwrap();
    assert_eq!(stored.profile.unwrap().full_name, "Renamed");
}
