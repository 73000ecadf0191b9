//! Synchronous client for the Trello REST API (boards and lists).
//!
//! # Overview
//! `Client::new(key, token)` holds the credential pair. `board_service()` and
//! `list_service()` hand out accessors bound to it; the `Board` and `List`
//! handles they return carry the same client so follow-up calls
//! (`Board::lists`, `List::rename`, `List::close`) authenticate on their own.
//!
//! # Design
//! - Every operation is one blocking HTTP request and one decoded response.
//!   Nothing is retried or cached.
//! - Requests are built and responses parsed as plain data
//!   (`build_*` / `parse_*` on `Client`); a `Transport` runs the round trip.
//! - Callers see `Board` and `List` as traits; the concrete handles are
//!   private to this crate.

pub mod board;
pub mod client;
pub mod error;
pub mod http;
pub mod list;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use board::{Board, BoardService};
pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use list::{List, ListService};
pub use types::{BoardData, ListData};
