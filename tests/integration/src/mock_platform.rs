//! In-process stand-in for the chat platform's REST API
//!
//! Serves the handful of guild member, role and message endpoints the
//! directory client calls, and records every role change and message.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A guild member as the platform reports it
#[derive(Debug, Clone)]
pub struct MockMember {
    pub id: i64,
    pub username: String,
    pub global_name: Option<String>,
    pub nick: Option<String>,
    pub roles: Vec<i64>,
}

impl MockMember {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            global_name: None,
            nick: None,
            roles: Vec::new(),
        }
    }

    pub fn nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    pub fn role(mut self, role_id: i64) -> Self {
        self.roles.push(role_id);
        self
    }

    fn to_wire(&self) -> Value {
        json!({
            "user": {
                "id": self.id.to_string(),
                "username": self.username,
                "global_name": self.global_name,
            },
            "nick": self.nick,
            "roles": self.roles.iter().map(ToString::to_string).collect::<Vec<_>>(),
        })
    }
}

/// A role change applied through the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    Added { user_id: i64, role_id: i64 },
    Removed { user_id: i64, role_id: i64 },
}

#[derive(Default)]
struct PlatformState {
    members: Mutex<BTreeMap<i64, MockMember>>,
    role_changes: Mutex<Vec<RoleChange>>,
    messages: Mutex<Vec<(i64, String)>>,
}

/// Running platform stand-in
pub struct MockPlatform {
    pub addr: SocketAddr,
    state: Arc<PlatformState>,
    _handle: JoinHandle<()>,
}

impl MockPlatform {
    pub async fn start() -> Result<Self> {
        let state = Arc::new(PlatformState::default());

        let app = Router::new()
            .route("/guilds/:guild_id/members", get(list_members))
            .route("/guilds/:guild_id/members/:user_id", get(get_member))
            .route(
                "/guilds/:guild_id/members/:user_id/roles/:role_id",
                put(add_role).delete(remove_role),
            )
            .route("/channels/:channel_id/messages", post(create_message))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    pub fn api_base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn add_member(&self, member: MockMember) {
        self.state.members.lock().insert(member.id, member);
    }

    pub fn member_roles(&self, user_id: i64) -> Vec<i64> {
        self.state
            .members
            .lock()
            .get(&user_id)
            .map(|m| m.roles.clone())
            .unwrap_or_default()
    }

    pub fn role_changes(&self) -> Vec<RoleChange> {
        self.state.role_changes.lock().clone()
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.state.messages.lock().clone()
    }
}

async fn list_members(
    State(state): State<Arc<PlatformState>>,
    Path(_guild_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let after: i64 = params
        .get("after")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    let page = state
        .members
        .lock()
        .range(after + 1..)
        .take(limit)
        .map(|(_, m)| m.to_wire())
        .collect();
    Json(page)
}

async fn get_member(
    State(state): State<Arc<PlatformState>>,
    Path((_guild_id, user_id)): Path<(String, i64)>,
) -> impl IntoResponse {
    match state.members.lock().get(&user_id) {
        Some(member) => (StatusCode::OK, Json(member.to_wire())).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Unknown Member"}))).into_response(),
    }
}

async fn add_role(
    State(state): State<Arc<PlatformState>>,
    Path((_guild_id, user_id, role_id)): Path<(String, i64, i64)>,
) -> StatusCode {
    let mut members = state.members.lock();
    let Some(member) = members.get_mut(&user_id) else {
        return StatusCode::NOT_FOUND;
    };
    if !member.roles.contains(&role_id) {
        member.roles.push(role_id);
    }
    state
        .role_changes
        .lock()
        .push(RoleChange::Added { user_id, role_id });
    StatusCode::NO_CONTENT
}

async fn remove_role(
    State(state): State<Arc<PlatformState>>,
    Path((_guild_id, user_id, role_id)): Path<(String, i64, i64)>,
) -> StatusCode {
    let mut members = state.members.lock();
    let Some(member) = members.get_mut(&user_id) else {
        return StatusCode::NOT_FOUND;
    };
    member.roles.retain(|r| *r != role_id);
    state
        .role_changes
        .lock()
        .push(RoleChange::Removed { user_id, role_id });
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct CreateMessage {
    content: String,
}

async fn create_message(
    State(state): State<Arc<PlatformState>>,
    Path(channel_id): Path<i64>,
    Json(body): Json<CreateMessage>,
) -> Json<Value> {
    let mut messages = state.messages.lock();
    messages.push((channel_id, body.content));
    Json(json!({ "id": messages.len().to_string(), "channel_id": channel_id.to_string() }))
}
