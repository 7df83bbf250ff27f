//! LDAP directory client.
//!
//! This crate provides a stateful client facade over the `ldap3` protocol
//! library: one connection to one directory server, with bind, search,
//! read, add, modify, delete and attribute-level operations, and an error
//! taxonomy that separates transport failures from protocol failures from
//! "not found" conditions that are not errors.

#![deny(missing_docs)]

mod client;
mod config;
mod options;
mod query;
mod result;
mod session;

pub use client::DirectoryClient;
pub use config::{DirectoryConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT};
pub use options::{DirectoryOption, OptionValue};
pub use query::{escape_filter_value, DirectoryQuery, DirectoryQueryBuilder, SearchOptions};
pub use result::{EntryStream, SearchResult};
pub use session::DirectoryModification;

pub use directory_core::{codes, DerefPolicy, DirectoryEntry, Error, SearchScope};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = directory_core::Result<T>;
