//! The `List` capability and the service that creates lists.

use std::fmt;

use log::info;

use crate::client::Client;
use crate::error::Result;
use crate::types::ListData;

/// A list on a board. Handles are produced by `ListService::create` and
/// `Board::lists`; each one carries the `Client` that fetched it so `rename`
/// and `close` authenticate without the caller passing credentials again.
pub trait List: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn closed(&self) -> bool;

    /// Owning board, when the response included `idBoard`.
    fn board_id(&self) -> Option<&str>;

    /// Decoded fields as returned by the service.
    fn data(&self) -> &ListData;

    /// Set the list's `name` field. One PUT, no retry.
    fn rename(&self, new_name: &str) -> Result<()>;

    /// Set the list's `closed` field to `true`. One PUT, no retry.
    fn close(&self) -> Result<()>;
}

pub(crate) struct ListHandle {
    data: ListData,
    client: Client,
}

impl ListHandle {
    pub(crate) fn new(data: ListData, client: Client) -> Self {
        Self { data, client }
    }

    pub(crate) fn boxed(data: ListData, client: Client) -> Box<dyn List> {
        Box::new(Self::new(data, client))
    }
}

impl fmt::Debug for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("id", &self.data.id)
            .field("name", &self.data.name)
            .field("closed", &self.data.closed)
            .finish()
    }
}

impl List for ListHandle {
    fn id(&self) -> &str {
        &self.data.id
    }

    fn name(&self) -> &str {
        &self.data.name
    }

    fn closed(&self) -> bool {
        self.data.closed
    }

    fn board_id(&self) -> Option<&str> {
        self.data.id_board.as_deref()
    }

    fn data(&self) -> &ListData {
        &self.data
    }

    fn rename(&self, new_name: &str) -> Result<()> {
        let req = self.client.build_rename_list(&self.data.id, new_name)?;
        self.client.parse_update(self.client.execute(req)?)
    }

    fn close(&self) -> Result<()> {
        let req = self.client.build_close_list(&self.data.id)?;
        self.client.parse_update(self.client.execute(req)?)
    }
}

/// Operations on the list collection, bound to one `Client`.
#[derive(Debug, Clone)]
pub struct ListService {
    client: Client,
}

impl ListService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a list named `name` on `board_id`. `pos` may be empty.
    pub fn create(&self, name: &str, board_id: &str, pos: &str) -> Result<Box<dyn List>> {
        let req = self.client.build_create_list(name, board_id, pos)?;
        let data = self.client.parse_list(self.client.execute(req)?)?;
        info!("created list {} on board {board_id}", data.id);
        Ok(ListHandle::boxed(data, self.client.clone()))
    }
}
