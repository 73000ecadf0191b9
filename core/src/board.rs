//! The `Board` capability and the service that fetches boards.
//!
//! # Design
//! A plain `get_board` does not ask for the board's lists; `Board::lists`
//! makes a second round trip with `lists=all` when the caller needs them.
//! `get_board_with_lists` folds both into one request for callers that know
//! up front, and `Board::embedded_lists` exposes what it brought back.

use std::fmt;

use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::Result;
use crate::list::{List, ListHandle};
use crate::types::BoardData;

/// A board snapshot plus the `Client` that fetched it.
pub trait Board: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn desc(&self) -> &str;

    fn closed(&self) -> bool;

    fn pinned(&self) -> bool;

    fn short_url(&self) -> &str;

    fn url(&self) -> &str;

    fn desc_data(&self) -> &Value;

    fn id_organization(&self) -> &Value;

    fn prefs(&self) -> Option<&Map<String, Value>>;

    fn label_names(&self) -> Option<&Map<String, Value>>;

    /// Decoded fields as returned by the service.
    fn data(&self) -> &BoardData;

    /// Lists decoded together with the board. `None` unless the board was
    /// fetched with `BoardService::get_board_with_lists`.
    fn embedded_lists(&self) -> Option<Vec<Box<dyn List>>>;

    /// Fetch the board's lists. One GET with `lists=all`; an empty board
    /// yields an empty `Vec`.
    fn lists(&self) -> Result<Vec<Box<dyn List>>>;
}

struct BoardHandle {
    data: BoardData,
    client: Client,
}

impl BoardHandle {
    fn boxed(data: BoardData, client: Client) -> Box<dyn Board> {
        Box::new(Self { data, client })
    }
}

impl fmt::Debug for BoardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("id", &self.data.id)
            .field("name", &self.data.name)
            .field("closed", &self.data.closed)
            .field("url", &self.data.url)
            .finish()
    }
}

impl Board for BoardHandle {
    fn id(&self) -> &str {
        &self.data.id
    }

    fn name(&self) -> &str {
        &self.data.name
    }

    fn desc(&self) -> &str {
        &self.data.desc
    }

    fn closed(&self) -> bool {
        self.data.closed
    }

    fn pinned(&self) -> bool {
        self.data.pinned
    }

    fn short_url(&self) -> &str {
        &self.data.short_url
    }

    fn url(&self) -> &str {
        &self.data.url
    }

    fn desc_data(&self) -> &Value {
        &self.data.desc_data
    }

    fn id_organization(&self) -> &Value {
        &self.data.id_organization
    }

    fn prefs(&self) -> Option<&Map<String, Value>> {
        self.data.prefs.as_ref()
    }

    fn label_names(&self) -> Option<&Map<String, Value>> {
        self.data.label_names.as_ref()
    }

    fn data(&self) -> &BoardData {
        &self.data
    }

    fn embedded_lists(&self) -> Option<Vec<Box<dyn List>>> {
        let lists = self.data.lists.as_ref()?;
        Some(
            lists
                .iter()
                .cloned()
                .map(|l| ListHandle::boxed(l, self.client.clone()))
                .collect(),
        )
    }

    fn lists(&self) -> Result<Vec<Box<dyn List>>> {
        let req = self.client.build_get_board(&self.data.id, true)?;
        let board = self.client.parse_board(self.client.execute(req)?)?;
        Ok(board
            .lists
            .unwrap_or_default()
            .into_iter()
            .map(|l| ListHandle::boxed(l, self.client.clone()))
            .collect())
    }
}

/// Operations on boards, bound to one `Client`.
#[derive(Debug, Clone)]
pub struct BoardService {
    client: Client,
}

impl BoardService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a board by id. One GET, lists not included.
    pub fn get_board(&self, id: &str) -> Result<Box<dyn Board>> {
        self.fetch(id, false)
    }

    /// Fetch a board by id together with all of its lists.
    pub fn get_board_with_lists(&self, id: &str) -> Result<Box<dyn Board>> {
        self.fetch(id, true)
    }

    fn fetch(&self, id: &str, include_lists: bool) -> Result<Box<dyn Board>> {
        let req = self.client.build_get_board(id, include_lists)?;
        let data = self.client.parse_board(self.client.execute(req)?)?;
        Ok(BoardHandle::boxed(data, self.client.clone()))
    }
}
