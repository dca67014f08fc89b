//! Named connection profiles for globals-style databases.
//!
//! Resolves profiles from `dbconns`/`.dbconns` files found in a directory
//! cascade, prompts interactively for missing fields, and caches live
//! connections by resolved identity and by logical name.

pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod registry;
pub mod resolver;
pub mod secret;

pub use config::{ConnectParams, ConnectionConfig};
pub use driver::{Driver, Globals, Handle};
pub use error::{Error, Result};
pub use registry::ConnectionRegistry;
pub use resolver::ConfigResolver;
pub use secret::Secret;
