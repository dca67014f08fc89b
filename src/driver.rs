//! Boundary to the external database driver.
//!
//! The core never speaks the wire protocol itself. It depends on two
//! narrow capabilities: a [`Driver`] that can materialize connections,
//! and the [`Globals`] surface each live connection exposes. Values and
//! subscripts pass through uninterpreted.

use crate::config::ConnectParams;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

/// Capability surface of a live connection.
///
/// Keys address globals-style hierarchical storage; `subscripts` select a
/// node under the key. The core forwards these calls unchanged.
pub trait Globals: Send + Sync {
    /// Read the value at `key(subscripts...)`, if any.
    fn get(&self, key: &str, subscripts: &[&str]) -> Result<Option<Value>>;

    /// Write `value` at `key(subscripts...)`.
    fn set(&self, value: &Value, key: &str, subscripts: &[&str]) -> Result<()>;

    /// Delete the node at `key(subscripts...)` and everything under it.
    fn kill(&self, key: &str, subscripts: &[&str]) -> Result<()>;
}

/// A cached, shareable connection handle.
pub type Handle = Arc<dyn Globals>;

/// Factory for live connections.
///
/// Connection failures are returned unmodified; the core neither retries
/// nor wraps them.
pub trait Driver: Send + Sync {
    fn connect(&self, params: &ConnectParams) -> Result<Handle>;
}
