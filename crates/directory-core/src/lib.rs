//! # directory-core
//!
//! Core types for LDAP directory client crates.
//!
//! This crate provides the shared vocabulary used by the client facade:
//! the error taxonomy, well-known LDAP result codes, directory entries,
//! and search scope / alias dereference enumerations.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result alias
//! - [`codes`] - Well-known LDAP result codes
//! - [`entry`] - Directory entry representation
//! - [`scope`] - Search scope and alias dereference policies

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codes;
pub mod entry;
pub mod error;
pub mod scope;

// Re-export commonly used types
pub use entry::DirectoryEntry;
pub use error::{Error, Result};
pub use scope::{DerefPolicy, SearchScope};
