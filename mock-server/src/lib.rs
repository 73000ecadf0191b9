use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use axum::{
    extract::{Path, Query, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

pub use axum::http::StatusCode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub closed: bool,
    pub pinned: bool,
    pub short_url: String,
    pub url: String,
    pub id_organization: Option<String>,
    pub prefs: Value,
    pub label_names: Value,
}

impl Board {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            desc: String::new(),
            closed: false,
            pinned: false,
            short_url: format!("https://trello.test/b/{id}"),
            url: format!("https://trello.test/b/{id}/{}", name.to_lowercase().replace(' ', "-")),
            id_organization: None,
            prefs: serde_json::json!({ "background": "blue", "permissionLevel": "private" }),
            label_names: serde_json::json!({ "green": "", "red": "" }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub name: String,
    pub closed: bool,
    pub id_board: String,
    pub pos: f64,
}

/// One request as it reached the server, before routing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw, still-encoded query string.
    pub query: String,
}

#[derive(Default)]
struct Store {
    boards: HashMap<String, Board>,
    lists: Vec<List>,
    requests: Vec<RecordedRequest>,
    forced: Option<StatusCode>,
    next_id: u64,
}

/// Shared in-memory state. Clones see the same data, so a test can keep one
/// handle for seeding and inspection while the router owns another.
#[derive(Clone, Default)]
pub struct MockState(Arc<RwLock<Store>>);

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.0.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_board(&self, board: Board) {
        self.write().boards.insert(board.id.clone(), board);
    }

    /// Append a list to the end of `board_id`.
    pub fn add_list(&self, board_id: &str, id: &str, name: &str) {
        let mut store = self.write();
        let pos = next_bottom(&store.lists, board_id);
        store.lists.push(List {
            id: id.to_string(),
            name: name.to_string(),
            closed: false,
            id_board: board_id.to_string(),
            pos,
        });
    }

    pub fn list(&self, id: &str) -> Option<List> {
        self.read().lists.iter().find(|l| l.id == id).cloned()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.read().requests.clone()
    }

    /// Answer every subsequent request with `status` and an empty body.
    pub fn fail_with(&self, status: StatusCode) {
        self.write().forced = Some(status);
    }

    pub fn clear_failure(&self) {
        self.write().forced = None;
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/1/boards/{id}", get(get_board))
        .route("/1/lists", post(create_list))
        .route("/1/lists/{id}/{field}", put(update_list))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

/// A board with two open lists, used by the binary.
pub fn demo_state() -> MockState {
    let state = MockState::new();
    state.add_board(Board::new("demo", "Demo Board"));
    state.add_list("demo", "list-todo", "To Do");
    state.add_list("demo", "list-done", "Done");
    state
}

async fn record(State(state): State<MockState>, req: Request, next: Next) -> Response {
    let forced = {
        let mut store = state.write();
        store.requests.push(RecordedRequest {
            method: req.method().as_str().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().unwrap_or_default().to_string(),
        });
        store.forced
    };
    match forced {
        Some(status) => status.into_response(),
        None => next.run(req).await,
    }
}

type Params = HashMap<String, String>;
type Rejection = (StatusCode, &'static str);

fn require_key(params: &Params) -> Result<(), Rejection> {
    match params.get("key") {
        Some(k) if !k.is_empty() => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "invalid key")),
    }
}

fn require_token(params: &Params) -> Result<(), Rejection> {
    require_key(params)?;
    match params.get("token") {
        Some(t) if !t.is_empty() => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "unauthorized permission requested")),
    }
}

fn next_bottom(lists: &[List], board_id: &str) -> f64 {
    lists
        .iter()
        .filter(|l| l.id_board == board_id)
        .map(|l| l.pos)
        .fold(0.0, f64::max)
        + 16384.0
}

async fn get_board(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    require_key(&params)?;
    let store = state.read();
    let board = store
        .boards
        .get(&id)
        .ok_or((StatusCode::NOT_FOUND, "The requested resource was not found."))?;

    let mut body = serde_json::to_value(board)
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "encode failed"))?;
    let keep: fn(&List) -> bool = match params.get("lists").map(String::as_str) {
        None | Some("none") => return Ok(Json(body)),
        Some("all") => |_: &List| true,
        Some("open") => |l: &List| !l.closed,
        Some("closed") => |l: &List| l.closed,
        Some(_) => return Err((StatusCode::BAD_REQUEST, "invalid value for lists")),
    };
    let mut lists: Vec<&List> = store
        .lists
        .iter()
        .filter(|l| l.id_board == id && keep(l))
        .collect();
    lists.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    body["lists"] = serde_json::to_value(lists)
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "encode failed"))?;
    Ok(Json(body))
}

async fn update_list(
    State(state): State<MockState>,
    Path((id, field)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> Result<Json<List>, Rejection> {
    require_token(&params)?;
    let value = params
        .get("value")
        .ok_or((StatusCode::BAD_REQUEST, "invalid value"))?;

    let mut store = state.write();
    let list = store
        .lists
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or((StatusCode::NOT_FOUND, "model not found"))?;
    match field.as_str() {
        "name" if !value.is_empty() => list.name = value.clone(),
        "closed" => {
            list.closed = value
                .parse()
                .map_err(|_| (StatusCode::BAD_REQUEST, "invalid value for closed"))?
        }
        _ => return Err((StatusCode::BAD_REQUEST, "invalid value")),
    }
    Ok(Json(list.clone()))
}

async fn create_list(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Json<List>, Rejection> {
    require_token(&params)?;
    let name = params
        .get("name")
        .filter(|n| !n.is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "invalid value for name"))?;
    let board_id = params
        .get("idBoard")
        .ok_or((StatusCode::BAD_REQUEST, "invalid value for idBoard"))?;

    let mut store = state.write();
    if !store.boards.contains_key(board_id) {
        return Err((StatusCode::BAD_REQUEST, "invalid value for idBoard"));
    }
    let pos = match params.get("pos").map(String::as_str) {
        None | Some("bottom") => next_bottom(&store.lists, board_id),
        Some("top") => {
            store
                .lists
                .iter()
                .filter(|l| &l.id_board == board_id)
                .map(|l| l.pos)
                .fold(f64::INFINITY, f64::min)
                .min(16384.0)
                / 2.0
        }
        Some(n) => n
            .parse::<f64>()
            .ok()
            .filter(|p| *p >= 0.0)
            .ok_or((StatusCode::BAD_REQUEST, "invalid value for pos"))?,
    };

    store.next_id += 1;
    let list = List {
        id: format!("list-{}", store.next_id),
        name: name.clone(),
        closed: false,
        id_board: board_id.clone(),
        pos,
    };
    store.lists.push(list.clone());
    Ok(Json(list))
}
