//! In-process fake of the GitLab REST endpoints the SDK talks to.
//!
//! Only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! gitlab-sdk = { path = "../gitlab-sdk", features = ["testing"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use gitlab_sdk::testing::{FakeGitLab, user};
//!
//! let server = FakeGitLab::new("secret")
//!     .with_user(user(5, "jroe", "blocked"))
//!     .spawn()
//!     .await;
//! let client = server.client();
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use gitlab_api::{AccountState, ApiError, ContainerKind, Group, Member, Project, User};
use serde::{Deserialize, Serialize};

use crate::{ClientOptions, GitLabClient, RetryPolicy, TOKEN_HEADER};

pub use axum::http::{Method, StatusCode};

/// Build a user with a derived display name and email
pub fn user(id: u64, username: &str, state: &str) -> User {
    User {
        id,
        name: format!("User {username}"),
        username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        state: AccountState::from(state),
    }
}

/// A request the fake server received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path below `/api/v4`, without the query string
    pub path: String,
    pub page: Option<u32>,
}

#[derive(Default)]
struct FakeState {
    token: String,
    users: Vec<User>,
    groups: Vec<Group>,
    projects: Vec<Project>,
    members: HashMap<(ContainerKind, u64), Vec<Member>>,
    page_failures: HashMap<(String, u32), StatusCode>,
    delete_overrides: HashMap<(ContainerKind, u64, u64), StatusCode>,
    requests: Vec<RecordedRequest>,
}

/// Builder for a fake GitLab instance
pub struct FakeGitLab {
    state: FakeState,
}

impl FakeGitLab {
    pub fn new(token: &str) -> Self {
        Self {
            state: FakeState {
                token: token.to_string(),
                ..FakeState::default()
            },
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.state.users.push(user);
        self
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = User>) -> Self {
        self.state.users.extend(users);
        self
    }

    /// Add a group whose direct members are the users with `member_ids`
    pub fn with_group(mut self, id: u64, name: &str, member_ids: &[u64]) -> Self {
        self.state.groups.push(Group {
            id,
            name: name.to_string(),
        });
        let members = self.members_for(member_ids);
        self.state.members.insert((ContainerKind::Group, id), members);
        self
    }

    /// Add a project whose direct members are the users with `member_ids`
    pub fn with_project(mut self, id: u64, name: &str, member_ids: &[u64]) -> Self {
        self.state.projects.push(Project {
            id,
            name: name.to_string(),
        });
        let members = self.members_for(member_ids);
        self.state
            .members
            .insert((ContainerKind::Project, id), members);
        self
    }

    /// Add a raw member to a container, independent of the user list
    pub fn with_member(mut self, kind: ContainerKind, container_id: u64, member: Member) -> Self {
        self.state
            .members
            .entry((kind, container_id))
            .or_default()
            .push(member);
        self
    }

    /// Answer `page` of `path` (below `/api/v4`) with `status` every time
    pub fn fail_page(mut self, path: &str, page: u32, status: StatusCode) -> Self {
        self.state
            .page_failures
            .insert((path.to_string(), page), status);
        self
    }

    /// Answer the removal of `user_id` from a container with `status`
    /// without touching the member list
    pub fn override_delete(
        mut self,
        kind: ContainerKind,
        container_id: u64,
        user_id: u64,
        status: StatusCode,
    ) -> Self {
        self.state
            .delete_overrides
            .insert((kind, container_id, user_id), status);
        self
    }

    fn members_for(&self, ids: &[u64]) -> Vec<Member> {
        ids.iter()
            .map(|id| {
                match self.state.users.iter().find(|u| u.id == *id) {
                    Some(u) => Member {
                        id: u.id,
                        username: u.username.clone(),
                        name: u.name.clone(),
                        state: Some(u.state.clone()),
                    },
                    None => Member {
                        id: *id,
                        username: format!("user{id}"),
                        name: format!("User {id}"),
                        state: Some(AccountState::Active),
                    },
                }
            })
            .collect()
    }

    /// Serve the fake API on an ephemeral local port
    pub async fn spawn(self) -> FakeServer {
        let state = Arc::new(Mutex::new(self.state));

        let app = Router::new()
            .route("/api/v4/users", get(list_users))
            .route("/api/v4/groups", get(list_groups))
            .route("/api/v4/projects", get(list_projects))
            .route("/api/v4/:kind/:id/members", get(list_members))
            .route("/api/v4/:kind/:id/members/:user_id", delete(remove_member))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake GitLab listener");
        let addr = listener.local_addr().expect("fake GitLab local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeServer { addr, state }
    }
}

/// Handle to a running fake GitLab
pub struct FakeServer {
    addr: SocketAddr,
    state: Arc<Mutex<FakeState>>,
}

impl FakeServer {
    /// Instance URL, as it would appear in `GITLAB_URL`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client with the configured token, page size 100 and no retries
    pub fn client(&self) -> GitLabClient {
        self.client_with(ClientOptions {
            retry: RetryPolicy::none(),
            ..ClientOptions::default()
        })
    }

    pub fn client_with(&self, options: ClientOptions) -> GitLabClient {
        let token = self.lock().token.clone();
        GitLabClient::new(&self.url(), &token, options).expect("build client for fake GitLab")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests whose path equals `path`
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn deletes(&self) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == Method::DELETE)
            .cloned()
            .collect()
    }

    /// Current member ids of a container
    pub fn member_ids(&self, kind: ContainerKind, container_id: u64) -> Vec<u64> {
        self.lock()
            .members
            .get(&(kind, container_id))
            .map(|members| members.iter().map(|m| m.id).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake GitLab state poisoned")
    }
}

type Shared = State<Arc<Mutex<FakeState>>>;

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
    per_page: Option<u32>,
}

fn parse_kind(segment: &str) -> Option<ContainerKind> {
    match segment {
        "groups" => Some(ContainerKind::Group),
        "projects" => Some(ContainerKind::Project),
        _ => None,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    if status == StatusCode::NO_CONTENT {
        return status.into_response();
    }
    (status, Json(ApiError::new(message))).into_response()
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == state.token)
}

fn paged<T: Serialize>(
    state: &mut FakeState,
    headers: &HeaderMap,
    path: String,
    query: &PageQuery,
    items: impl Fn(&FakeState) -> Vec<T>,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100) as usize;

    state.requests.push(RecordedRequest {
        method: Method::GET,
        path: path.clone(),
        page: Some(page),
    });

    if !authorized(state, headers) {
        return error(StatusCode::UNAUTHORIZED, "401 Unauthorized");
    }
    if let Some(status) = state.page_failures.get(&(path, page)) {
        return error(*status, "injected failure");
    }

    let all = items(state);
    let start = (page as usize - 1).saturating_mul(per_page);
    let slice: Vec<T> = all.into_iter().skip(start).take(per_page).collect();
    (StatusCode::OK, Json(slice)).into_response()
}

async fn list_users(
    State(state): Shared,
    headers: HeaderMap,
    Query(q): Query<PageQuery>,
) -> Response {
    let mut state = state.lock().expect("fake GitLab state poisoned");
    paged(&mut state, &headers, "/users".to_string(), &q, |s| s.users.clone())
}

async fn list_groups(
    State(state): Shared,
    headers: HeaderMap,
    Query(q): Query<PageQuery>,
) -> Response {
    let mut state = state.lock().expect("fake GitLab state poisoned");
    paged(&mut state, &headers, "/groups".to_string(), &q, |s| s.groups.clone())
}

async fn list_projects(
    State(state): Shared,
    headers: HeaderMap,
    Query(q): Query<PageQuery>,
) -> Response {
    let mut state = state.lock().expect("fake GitLab state poisoned");
    paged(&mut state, &headers, "/projects".to_string(), &q, |s| {
        s.projects.clone()
    })
}

async fn list_members(
    State(state): Shared,
    headers: HeaderMap,
    Path((kind, id)): Path<(String, u64)>,
    Query(q): Query<PageQuery>,
) -> Response {
    let Some(kind) = parse_kind(&kind) else {
        return error(StatusCode::NOT_FOUND, "404 Not found");
    };
    let mut state = state.lock().expect("fake GitLab state poisoned");
    let path = format!("/{}/{id}/members", kind.collection());
    paged(&mut state, &headers, path, &q, |s| {
        s.members.get(&(kind, id)).cloned().unwrap_or_default()
    })
}

async fn remove_member(
    State(state): Shared,
    headers: HeaderMap,
    Path((kind, id, user_id)): Path<(String, u64, u64)>,
) -> Response {
    let Some(kind) = parse_kind(&kind) else {
        return error(StatusCode::NOT_FOUND, "404 Not found");
    };
    let mut state = state.lock().expect("fake GitLab state poisoned");
    state.requests.push(RecordedRequest {
        method: Method::DELETE,
        path: format!("/{}/{id}/members/{user_id}", kind.collection()),
        page: None,
    });

    if !authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "401 Unauthorized");
    }
    if let Some(status) = state.delete_overrides.get(&(kind, id, user_id)) {
        return error(*status, "injected failure");
    }

    let Some(members) = state.members.get_mut(&(kind, id)) else {
        return error(StatusCode::NOT_FOUND, "404 Not found");
    };
    match members.iter().position(|m| m.id == user_id) {
        Some(index) => {
            members.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "404 Member Not Found"),
    }
}
