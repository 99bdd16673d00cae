//! In-memory stand-in for the Supabase backend.
//!
//! Evaluates `SelectQuery` values directly (equality, case-insensitive
//! substring, OR lists, order chain, row window, exact count) so tests can
//! assert on real result sets as well as on the queries that were issued.
//! Offsets past an exact count fail with 416, as PostgREST does.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;
use job_board::models::profile::Role;
use job_board::services::backend::{
    AuthSession, AuthUser, Backend, BackendError, Credentials, RowSet, UserMetadata,
};
use job_board::services::postgrest::{Filter, SelectQuery};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::fixtures::JobRow;

#[derive(Default)]
pub struct InMemoryBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    /// access token -> user
    sessions: Mutex<HashMap<String, AuthUser>>,
    /// email -> (password, user)
    accounts: Mutex<HashMap<String, (String, AuthUser)>>,
    failing_tables: Mutex<HashSet<String>>,
    /// Tables whose next write fails once.
    failing_once: Mutex<HashSet<String>>,
    /// Sign-up returns no access token until the email is confirmed.
    email_confirmation: Mutex<bool>,
    selects: Mutex<Vec<SelectQuery>>,
}

/// A signed-in test user.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user: AuthUser,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: &[JobRow]) -> Self {
        let backend = Self::new();
        for job in jobs {
            backend.insert_row("jobs", job.to_value());
        }
        backend
    }

    pub fn insert_row(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every select and insert against `table` fail with a 503.
    pub fn fail_table(&self, table: &str) {
        self.failing_tables
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    pub fn restore_table(&self, table: &str) {
        self.failing_tables.lock().unwrap().remove(table);
    }

    /// Make only the next insert or upsert into `table` fail with a 503.
    pub fn fail_next_write(&self, table: &str) {
        self.failing_once
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    pub fn require_email_confirmation(&self) {
        *self.email_confirmation.lock().unwrap() = true;
    }

    pub fn has_session(&self, token: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(token)
    }

    pub fn recorded_selects(&self) -> Vec<SelectQuery> {
        self.selects.lock().unwrap().clone()
    }

    pub fn selects_on(&self, table: &str) -> Vec<SelectQuery> {
        self.recorded_selects()
            .into_iter()
            .filter(|q| q.table == table)
            .collect()
    }

    /// Register a user with a profile row and a live session token.
    pub fn add_user(&self, role: Role, email: &str) -> TestUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                full_name: Some("Test User".to_string()),
                role: Some(role),
                company_name: (role == Role::Employer).then(|| "Acme".to_string()),
            },
        };
        let token = format!("token-{}", user.id);
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), user.clone());
        self.insert_row("profiles", profile_row(&user, role));
        TestUser { user, token }
    }

    /// Record an existing application.
    pub fn add_application(&self, job_id: Uuid, candidate_id: Uuid) {
        let now = Utc::now().to_rfc3339();
        self.insert_row(
            "applications",
            json!({
                "id": Uuid::new_v4(),
                "job_id": job_id,
                "candidate_id": candidate_id,
                "cover_letter": "Hello",
                "resume_url": "https://files.example.com/cv.pdf",
                "status": "pending",
                "created_at": now,
                "updated_at": now
            }),
        );
    }

    fn check_writable(&self, table: &str) -> Result<(), BackendError> {
        if self.failing_once.lock().unwrap().remove(table) {
            return Err(BackendError::Status {
                status: 503,
                message: format!("{} unavailable", table),
            });
        }
        self.check_available(table)
    }

    fn check_available(&self, table: &str) -> Result<(), BackendError> {
        if self.failing_tables.lock().unwrap().contains(table) {
            return Err(BackendError::Status {
                status: 503,
                message: format!("{} unavailable", table),
            });
        }
        Ok(())
    }

    fn run_select(&self, query: &SelectQuery) -> Result<RowSet, BackendError> {
        self.selects.lock().unwrap().push(query.clone());
        self.check_available(&query.table)?;

        let mut rows: Vec<Value> = self
            .rows(&query.table)
            .into_iter()
            .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
            .collect();

        rows.sort_by(|a, b| {
            for order in &query.order {
                let ord = compare_cells(a.get(&order.column), b.get(&order.column));
                let ord = if order.ascending { ord } else { ord.reverse() };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let total = rows.len() as u64;
        if let Some(range) = query.range {
            if query.count_exact && range.from > 0 && range.from >= total {
                return Err(BackendError::RangeNotSatisfiable { total: Some(total) });
            }
            rows = rows
                .into_iter()
                .skip(range.from as usize)
                .take(range.row_count() as usize)
                .collect();
        }

        let rows = rows
            .into_iter()
            .map(|row| project(row, &query.columns))
            .collect();
        Ok(RowSet {
            rows,
            total: query.count_exact.then_some(total),
        })
    }

    fn run_insert(&self, table: &str, mut row: Value) -> Result<Value, BackendError> {
        self.check_writable(table)?;

        if table == "applications" {
            let duplicate = self.rows(table).iter().any(|existing| {
                existing["job_id"] == row["job_id"] && existing["candidate_id"] == row["candidate_id"]
            });
            if duplicate {
                return Err(BackendError::Status {
                    status: 409,
                    message: "duplicate key value violates unique constraint".to_string(),
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        if let Some(obj) = row.as_object_mut() {
            obj.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
            obj.entry("created_at").or_insert_with(|| json!(now));
            obj.entry("updated_at").or_insert_with(|| json!(now));
        }
        self.insert_row(table, row.clone());
        Ok(row)
    }

    fn run_upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Value, BackendError> {
        self.check_writable(table)?;

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(existing) = rows
            .iter_mut()
            .find(|existing| existing.get(on_conflict) == row.get(on_conflict))
        {
            if let (Some(target), Some(fields)) = (existing.as_object_mut(), row.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
                target.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
            }
            return Ok(existing.clone());
        }
        drop(tables);
        self.run_insert(table, row)
    }
}

impl Backend for InMemoryBackend {
    async fn select(
        &self,
        query: &SelectQuery,
        _access_token: Option<&str>,
    ) -> Result<RowSet, BackendError> {
        self.run_select(query)
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        _access_token: Option<&str>,
    ) -> Result<Value, BackendError> {
        self.run_insert(table, row)
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
        _access_token: Option<&str>,
    ) -> Result<Value, BackendError> {
        self.run_upsert(table, row, on_conflict)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, BackendError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(&credentials.email) {
            Some((password, user)) if *password == credentials.password => {
                let token = format!("token-{}", Uuid::new_v4());
                self.sessions
                    .lock()
                    .unwrap()
                    .insert(token.clone(), user.clone());
                Ok(AuthSession {
                    access_token: Some(token),
                    user: user.clone(),
                })
            }
            _ => Err(BackendError::Status {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &UserMetadata,
    ) -> Result<AuthSession, BackendError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&credentials.email) {
            return Err(BackendError::Status {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(credentials.email.clone()),
            user_metadata: metadata.clone(),
        };
        accounts.insert(
            credentials.email.clone(),
            (credentials.password.clone(), user.clone()),
        );
        if *self.email_confirmation.lock().unwrap() {
            return Ok(AuthSession {
                access_token: None,
                user,
            });
        }
        let token = format!("token-{}", user.id);
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), user.clone());
        Ok(AuthSession {
            access_token: Some(token),
            user,
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError> {
        Ok(self.sessions.lock().unwrap().get(access_token).cloned())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.sessions.lock().unwrap().remove(access_token);
        Ok(())
    }
}

fn profile_row(user: &AuthUser, role: Role) -> Value {
    let now = Utc::now().to_rfc3339();
    let company_name = (role == Role::Employer).then_some("Acme");
    json!({
        "id": Uuid::new_v4(),
        "user_id": user.id,
        "full_name": "Test User",
        "email": user.email,
        "role": role,
        "company_name": company_name,
        "company_logo": null,
        "phone": null,
        "location": null,
        "website": null,
        "bio": null,
        "resume_url": null,
        "created_at": now,
        "updated_at": now
    })
}

fn cell_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => cell_text(row, column).as_deref() == Some(value.as_str()),
        Filter::ILike { column, needle } => cell_text(row, column)
            .map(|cell| cell.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
        Filter::Or { filters } => filters.iter().any(|f| matches_filter(row, f)),
    }
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn project(row: Value, columns: &str) -> Value {
    if columns.trim() == "*" {
        return row;
    }
    let mut out = serde_json::Map::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(value) = row.get(column) {
            out.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(out)
}
