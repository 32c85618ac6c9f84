//! Backend fetch collaborator.
//!
//! Every backend endpoint answers with a `{ "result": ... }` envelope.
//! The [`BackendClient`] trait exposes the raw envelope fetch plus typed
//! helpers for each collection the dashboards need; [`HttpBackend`] is
//! the production implementation on top of `ureq`.
//!
//! Degradation rules: a non-2xx status, a body that is not JSON, a
//! missing or `null` `result`, or individual elements that fail to decode
//! all become "no data" with a warning.  Only transport failures are
//! returned as errors.
//!
//! The caller's credentials travel in an explicit [`Session`]; nothing
//! here reads ambient state.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{DashboardError, Result};
use crate::models::{
    normalize_department, normalize_project, normalize_task, AttendanceSummaryRow, Department, Employee, Meeting,
    Project, ReportPeriod, SalaryStatistics, Task,
};

/// Which dashboard the authenticated user is entitled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

/// Credentials for one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Pulls `result` out of an envelope.  `null` counts as missing.
pub fn extract_result(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Null) | None => None,
            Some(result) => Some(result),
        },
        _ => None,
    }
}

/// Decodes an envelope payload as a list, element by element.  Elements
/// that do not fit `T` are skipped.
pub fn decode_list<T: DeserializeOwned>(what: &str, result: Option<Value>) -> Vec<T> {
    raw_list(what, result)
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(what, error = %err, "skipping undecodable element");
                None
            }
        })
        .collect()
}

/// Decodes an envelope payload as a single object.
pub fn decode_object<T: DeserializeOwned>(what: &str, result: Option<Value>) -> Option<T> {
    let value = result?;
    match serde_json::from_value::<T>(value) {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(what, error = %err, "could not decode object; treating as absent");
            None
        }
    }
}

fn raw_list(what: &str, result: Option<Value>) -> Vec<Value> {
    match result {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(what, kind = value_kind(&other), "expected a list; treating as empty");
            Vec::new()
        }
        None => {
            debug!(what, "no result in response");
            Vec::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Characters that may not appear raw inside one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encodes a backend id for use as a single path segment, so an id like
/// `R&D/2` cannot address a different endpoint.
pub fn path_segment(id: &str) -> String {
    utf8_percent_encode(id, PATH_SEGMENT).to_string()
}

fn period_query(period: ReportPeriod) -> Vec<(&'static str, String)> {
    vec![("month", period.month.to_string()), ("year", period.year.to_string())]
}

/// A source of backend data.
///
/// Implementations must be thread-safe (`Send + Sync`) because the
/// snapshot loader fans requests out across a thread pool.
pub trait BackendClient: Send + Sync {
    /// GETs `path` and returns the envelope's `result`, or `None` when
    /// the backend had nothing usable to say.
    fn get_result(&self, path: &str, query: &[(&'static str, String)]) -> Result<Option<Value>>;

    /// PUTs a JSON body to `path`.
    fn put_json(&self, path: &str, body: &Value) -> Result<()>;

    fn employees(&self) -> Result<Vec<Employee>> {
        Ok(decode_list("employees", self.get_result("/employees", &[])?))
    }

    fn departments(&self) -> Result<Vec<Department>> {
        let raw = raw_list("departments", self.get_result("/departments", &[])?);
        Ok(raw.iter().filter_map(normalize_department).collect())
    }

    fn projects_for(&self, department_id: &str) -> Result<Vec<Project>> {
        let path = format!("/departments/{}/projects", path_segment(department_id));
        let raw = raw_list("projects", self.get_result(&path, &[])?);
        Ok(raw
            .iter()
            .filter_map(|p| normalize_project(p, Some(department_id)))
            .collect())
    }

    fn tasks_for(&self, project_id: &str) -> Result<Vec<Task>> {
        let path = format!("/projects/{}/tasks", path_segment(project_id));
        let raw = raw_list("tasks", self.get_result(&path, &[])?);
        Ok(raw.iter().filter_map(|t| normalize_task(t, Some(project_id))).collect())
    }

    fn meetings(&self) -> Result<Vec<Meeting>> {
        Ok(decode_list("meetings", self.get_result("/meetings", &[])?))
    }

    fn attendance_summary(&self, period: ReportPeriod) -> Result<Vec<AttendanceSummaryRow>> {
        let result = self.get_result("/attendance/summary", &period_query(period))?;
        Ok(decode_list("attendance summary", result))
    }

    fn salary_statistics(&self, period: ReportPeriod) -> Result<Option<SalaryStatistics>> {
        let result = self.get_result("/salary/statistics", &period_query(period))?;
        Ok(decode_object("salary statistics", result))
    }

    fn update_task_status(&self, task_id: &str, status: &str) -> Result<()> {
        self.put_json(&format!("/tasks/{}/status", path_segment(task_id)), &json!({ "status": status }))
    }
}

/// Decodes a successful response's envelope.  A body that is not JSON
/// (a proxy's HTML error page, say) carries no `result`, so it is
/// treated like one.
fn read_envelope(url: &str, response: ureq::Response) -> Option<Value> {
    match response.into_json::<Value>() {
        Ok(body) => extract_result(body),
        Err(err) => {
            warn!(url, error = %err, "response body is not JSON; treating as empty");
            None
        }
    }
}

/// `ureq`-backed client for the real REST backend.
pub struct HttpBackend {
    base_url: String,
    session: Session,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, session: Session, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            agent,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl BackendClient for HttpBackend {
    fn get_result(&self, path: &str, query: &[(&'static str, String)]) -> Result<Option<Value>> {
        let url = self.url(path);
        let mut request = self.agent.get(&url).set("Authorization", &self.session.bearer());
        for (key, value) in query {
            request = request.query(key, value);
        }
        match request.call() {
            Ok(response) => Ok(read_envelope(&url, response)),
            Err(ureq::Error::Status(code, _)) => {
                warn!(%url, code, "backend returned an error status; treating as empty");
                Ok(None)
            }
            Err(ureq::Error::Transport(err)) => Err(DashboardError::transport(url, err)),
        }
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.url(path);
        match self
            .agent
            .put(&url)
            .set("Authorization", &self.session.bearer())
            .send_json(body)
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => {
                Err(DashboardError::transport(url, format!("backend rejected write with status {code}")))
            }
            Err(ureq::Error::Transport(err)) => Err(DashboardError::transport(url, err)),
        }
    }
}
