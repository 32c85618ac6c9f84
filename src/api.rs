//! HTTP API for the Dashboard Engine.
//!
//! This module serves the role-scoped dashboards as JSON using the
//! [`axum`](https://crates.io/crates/axum) framework.  Each request
//! forwards the caller's bearer token to the backend through an explicit
//! [`Session`], loads a fresh snapshot on the blocking pool, and builds
//! the view-model for the requested role.
//!
//! Every dashboard route requires a bearer token; anonymous requests get
//! `401`.  The admin dashboard is additionally tracked in one
//! [`DashboardSession`] per token, so `GET /api/dashboard/admin/current`
//! returns the caller's own most recently *started* refresh that has
//! completed.  Slower, older refreshes never overwrite it, and one
//! caller never sees another caller's view.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::client::{BackendClient, HttpBackend, Role, Session};
use crate::config::DashboardConfig;
use crate::engine::{build_admin_dashboard, build_employee_dashboard, build_manager_dashboard, AdminDashboard};
use crate::errors::DashboardError;
use crate::models::ReportPeriod;
use crate::session::DashboardSession;
use crate::snapshot::{load_snapshot, Snapshot};

/// Produces a backend client bound to one caller's session.
pub type BackendFactory = Arc<dyn Fn(Session) -> Box<dyn BackendClient> + Send + Sync>;

/// Application state shared across requests.
pub struct AppState {
    pub config: DashboardConfig,
    pub backends: BackendFactory,
    /// Admin views keyed by the bearer token that requested them.
    admin_sessions: RwLock<HashMap<String, Arc<DashboardSession<AdminDashboard>>>>,
}

impl AppState {
    pub fn new(config: DashboardConfig, backends: BackendFactory) -> Self {
        Self {
            config,
            backends,
            admin_sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The admin session owned by `token`, created on first use.
    async fn admin_session(&self, token: &str) -> Arc<DashboardSession<AdminDashboard>> {
        if let Some(session) = self.admin_sessions.read().await.get(token) {
            return session.clone();
        }
        self.admin_sessions
            .write()
            .await
            .entry(token.to_string())
            .or_default()
            .clone()
    }

    /// The admin session owned by `token`, if it ever refreshed.
    async fn existing_admin_session(&self, token: &str) -> Option<Arc<DashboardSession<AdminDashboard>>> {
        self.admin_sessions.read().await.get(token).cloned()
    }

    /// State whose backends talk HTTP to `config.backend_url`.
    pub fn with_http_backend(config: DashboardConfig) -> Self {
        let base = config.backend_url.clone();
        let timeout = config.timeout;
        let backends: BackendFactory =
            Arc::new(move |session| Box::new(HttpBackend::new(base.clone(), session, timeout)) as Box<dyn BackendClient>);
        Self::new(config, backends)
    }
}

/// Optional month/year filter; missing parts default to the current
/// month.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodQuery {
    fn resolve(&self, today: NaiveDate) -> std::result::Result<ReportPeriod, DashboardError> {
        let current = ReportPeriod::containing(today);
        ReportPeriod::new(self.month.unwrap_or(current.month), self.year.unwrap_or(current.year))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

fn failure(err: DashboardError) -> Response {
    match err {
        DashboardError::InvalidPeriod { .. } => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        other if other.is_transport() => {
            warn!(error = %other, "backend unavailable");
            error_response(StatusCode::BAD_GATEWAY, other.to_string())
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// Bearer token from the incoming request, without the scheme.  `None`
/// when the header is missing, unreadable or blank.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "missing bearer token")
}

/// Loads a snapshot for `period` on the blocking pool.
async fn fetch_snapshot(state: &Arc<AppState>, session: Session, period: ReportPeriod) -> Result<Snapshot, Response> {
    let factory = state.backends.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let client = factory(session);
        load_snapshot(client.as_ref(), period)
    })
    .await;
    match joined {
        Ok(Ok(snapshot)) => Ok(snapshot),
        Ok(Err(err)) => Err(failure(err)),
        Err(join_err) => {
            error!(error = %join_err, "snapshot task panicked");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "snapshot task failed"))
        }
    }
}

/// Build the API router around `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    Router::new()
        .route("/health", get(health_check))
        .route("/api/dashboard/admin", get(admin_handler))
        .route("/api/dashboard/admin/current", get(admin_current_handler))
        .route("/api/dashboard/manager/:department_id", get(manager_handler))
        .route("/api/dashboard/employee/:code", get(employee_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Handler for GET /api/dashboard/admin
pub async fn admin_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let today = Local::now().date_naive();
    let period = match query.resolve(today) {
        Ok(p) => p,
        Err(err) => return failure(err),
    };
    let admin = state.admin_session(&token).await;
    let ticket = admin.begin_refresh();
    let snapshot = match fetch_snapshot(&state, Session::new(token, Role::Admin), period).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let view = build_admin_dashboard(&snapshot, today, state.config.top_performers);
    admin.commit(ticket, view.clone()).await;
    (StatusCode::OK, Json(view)).into_response()
}

/// Handler for GET /api/dashboard/admin/current
pub async fn admin_current_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let view = match state.existing_admin_session(&token).await {
        Some(admin) => admin.current().await,
        None => None,
    };
    match view {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "no admin dashboard has been loaded yet"),
    }
}

/// Handler for GET /api/dashboard/manager/:department_id
pub async fn manager_handler(
    State(state): State<Arc<AppState>>,
    Path(department_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let today = Local::now().date_naive();
    let period = match query.resolve(today) {
        Ok(p) => p,
        Err(err) => return failure(err),
    };
    let session = Session::new(token, Role::Manager);
    match fetch_snapshot(&state, session, period).await {
        Ok(snapshot) => Json(build_manager_dashboard(&snapshot, &department_id, today)).into_response(),
        Err(resp) => resp,
    }
}

/// Handler for GET /api/dashboard/employee/:code
pub async fn employee_handler(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };
    let today = Local::now().date_naive();
    let period = match query.resolve(today) {
        Ok(p) => p,
        Err(err) => return failure(err),
    };
    let session = Session::new(token, Role::Employee);
    match fetch_snapshot(&state, session, period).await {
        Ok(snapshot) => Json(build_employee_dashboard(&snapshot, &code, today)).into_response(),
        Err(resp) => resp,
    }
}

/// Launch the API server.  Binds to `config.bind_addr` and blocks until
/// the server terminates.
pub async fn serve(config: DashboardConfig) -> Result<()> {
    let addr = config.bind_addr.clone();
    let state = Arc::new(AppState::with_http_backend(config));
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DashboardError::Config(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "dashboard server listening");
    axum::serve(listener, router).await.context("server terminated")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::extract_result;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct Fixture {
        responses: HashMap<String, Value>,
        down: bool,
    }

    impl BackendClient for Fixture {
        fn get_result(&self, path: &str, _query: &[(&'static str, String)]) -> crate::errors::Result<Option<Value>> {
            if self.down {
                return Err(DashboardError::transport(path, "connection refused"));
            }
            Ok(self.responses.get(path).cloned().and_then(extract_result))
        }

        fn put_json(&self, _path: &str, _body: &Value) -> crate::errors::Result<()> {
            Ok(())
        }
    }

    fn state(down: bool, seen: Arc<Mutex<Vec<Session>>>) -> Arc<AppState> {
        let mut responses = HashMap::new();
        responses.insert("/departments".to_string(), json!({"result": [{"id": "A", "name": "Alpha"}]}));
        responses.insert(
            "/departments/A/projects".to_string(),
            json!({"result": [{"id": "P1", "status": "PLANNED"}]}),
        );
        responses.insert(
            "/attendance/summary".to_string(),
            json!({"result": [{"code": "E1", "name": "Ann", "presentDays": 22}]}),
        );
        let backends: BackendFactory = Arc::new(move |session| {
            seen.lock().unwrap().push(session);
            Box::new(Fixture {
                responses: responses.clone(),
                down,
            }) as Box<dyn BackendClient>
        });
        Arc::new(AppState::new(DashboardConfig::default(), backends))
    }

    fn auth(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        headers
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn admin_dashboard_is_served_and_remembered() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let st = state(false, seen.clone());
        let resp = admin_handler(State(st.clone()), auth("tok"), Query(PeriodQuery::default())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["attendanceRate"], json!(100.0));
        assert_eq!(body["departments"][0]["projects"]["planned"], json!(1));
        assert_eq!(seen.lock().unwrap()[0], Session::new("tok", Role::Admin));

        let current = admin_current_handler(State(st), auth("tok")).await;
        assert_eq!(current.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_view_is_private_to_its_token() {
        let st = state(false, Arc::new(Mutex::new(Vec::new())));
        let resp = admin_handler(State(st.clone()), auth("admin-secret"), Query(PeriodQuery::default())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let anonymous = admin_current_handler(State(st.clone()), HeaderMap::new()).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
        let other = admin_current_handler(State(st.clone()), auth("someone-else")).await;
        assert_eq!(other.status(), StatusCode::NOT_FOUND);

        let owner = admin_current_handler(State(st), auth("admin-secret")).await;
        assert_eq!(owner.status(), StatusCode::OK);
        assert_eq!(body_json(owner).await["departments"][0]["projects"]["planned"], json!(1));
    }

    #[tokio::test]
    async fn anonymous_requests_are_unauthorized() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let st = state(false, seen.clone());
        let admin = admin_handler(State(st.clone()), HeaderMap::new(), Query(PeriodQuery::default())).await;
        assert_eq!(admin.status(), StatusCode::UNAUTHORIZED);
        let manager =
            manager_handler(State(st.clone()), Path("A".to_string()), auth(" "), Query(PeriodQuery::default())).await;
        assert_eq!(manager.status(), StatusCode::UNAUTHORIZED);
        let employee =
            employee_handler(State(st), Path("E1".to_string()), HeaderMap::new(), Query(PeriodQuery::default())).await;
        assert_eq!(employee.status(), StatusCode::UNAUTHORIZED);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_month_is_a_bad_request() {
        let st = state(false, Arc::new(Mutex::new(Vec::new())));
        let query = PeriodQuery {
            month: Some(13),
            year: Some(2024),
        };
        let resp = admin_handler(State(st), auth("tok"), Query(query)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn backend_outage_is_a_bad_gateway() {
        let st = state(true, Arc::new(Mutex::new(Vec::new())));
        let resp = manager_handler(State(st.clone()), Path("A".to_string()), auth("m"), Query(PeriodQuery::default())).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let current = admin_current_handler(State(st), auth("m")).await;
        assert_eq!(current.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn employee_dashboard_is_scoped_to_code() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let st = state(false, seen.clone());
        let resp = employee_handler(State(st), Path("E1".to_string()), auth("e"), Query(PeriodQuery::default())).await;
        let body = body_json(resp).await;
        assert_eq!(body["code"], json!("E1"));
        assert_eq!(body["attendance"]["presentDays"], json!(22));
        assert_eq!(seen.lock().unwrap()[0].role, Role::Employee);
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(bearer_token(&auth("abc")).as_deref(), Some("abc"));
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&auth("  ")), None);
    }
}
