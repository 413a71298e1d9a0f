//! Remote data collaborators
//!
//! The form view never talks to the network directly. It is handed a
//! [`RecordLoader`] and a [`RecordSubmitter`]; [`WsClient`] implements both
//! on top of the rpel server's WebSocket protocol.

pub mod client;
pub mod protocol;

pub use client::WsClient;
pub use protocol::{DbObject, Item};

use crate::errors::Result;

#[cfg(test)]
use mockall::automock;

/// Fetches records and select lists
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RecordLoader: Send + Sync {
    /// Fetch one record by kind and id.
    async fn fetch_item(&self, item: Item) -> Result<DbObject>;

    /// Fetch a named list such as `ScopeSelect`.
    async fn fetch_list(&self, name: String) -> Result<DbObject>;
}

/// Persists records
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RecordSubmitter: Send + Sync {
    /// Create a record, returning its new id.
    async fn insert_item(&self, object: DbObject) -> Result<i64>;

    /// Update a record, returning the number of affected rows.
    async fn update_item(&self, object: DbObject) -> Result<i64>;

    /// Delete a record, returning the number of affected rows.
    async fn delete_item(&self, item: Item) -> Result<i64>;
}
