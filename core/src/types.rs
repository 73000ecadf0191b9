//! Wire DTOs for the board and list resources.
//!
//! # Design
//! Every field is defaulted so a partial body (for instance
//! `{"id":"B1","name":"Roadmap"}`) still decodes. `descData`,
//! `idOrganization`, `prefs` and `labelNames` vary across accounts and are
//! kept as opaque JSON so they survive a decode/encode cycle untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A board as returned by `GET /1/boards/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardData {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub desc_data: Value,
    pub closed: bool,
    pub id_organization: Value,
    pub pinned: bool,
    pub short_url: String,
    pub url: String,
    pub prefs: Option<Map<String, Value>>,
    pub label_names: Option<Map<String, Value>>,
    /// Present only when the board was fetched with `lists=all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<ListData>>,
}

/// A list as returned inside a board or by `POST /1/lists`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListData {
    pub id: String,
    pub name: String,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_board: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<Value>,
}
