//! Session and connector seams over the `ldap3` protocol library.
//!
//! The traits isolate the wire protocol behind an object-safe surface so the
//! client facade can be exercised against mock sessions. The real backend
//! drives an async `ldap3` connection and translates library failures into
//! the crate's error taxonomy: I/O problems and "server down" codes become
//! connection errors, everything else a protocol error carrying the numeric
//! result code.

use crate::options::{DirectoryOption, OptionValue, SessionOptions};
use crate::query::SearchOptions;
use crate::result::EntryStream;
use crate::{DirectoryConfig, Result};
use async_trait::async_trait;
use directory_core::{codes, DerefPolicy, DirectoryEntry, Error, SearchScope};
use ldap3::{
    DerefAliases, LdapConnAsync, LdapConnSettings, LdapError, Mod, ResultEntry, Scope, SearchEntry,
    SearchStream,
};
use std::collections::HashSet;
use std::sync::Arc;

/// One attribute-level modification within a modify request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryModification {
    /// Add values to an attribute.
    Add {
        /// Attribute to modify.
        attribute: String,
        /// Values to add.
        values: Vec<String>,
    },
    /// Delete attribute values (an empty list removes the attribute).
    Delete {
        /// Attribute to modify.
        attribute: String,
        /// Values to delete.
        values: Vec<String>,
    },
    /// Replace all values of an attribute.
    Replace {
        /// Attribute to modify.
        attribute: String,
        /// Replacement values.
        values: Vec<String>,
    },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapSession: Send {
    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()>;
    async fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        options: &SearchOptions,
    ) -> Result<Box<dyn EntryStream>>;
    async fn add(&mut self, dn: &str, attributes: Vec<(String, Vec<String>)>) -> Result<()>;
    async fn modify(&mut self, dn: &str, modifications: &[DirectoryModification]) -> Result<()>;
    async fn delete(&mut self, dn: &str) -> Result<()>;
    async fn set_option(&mut self, option: DirectoryOption, value: OptionValue) -> Result<()>;
    async fn get_option(&mut self, option: DirectoryOption) -> Result<OptionValue>;
    async fn unbind(&mut self) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub(crate) trait LdapConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn LdapSession>>;
}

const fn wire_scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::Base => Scope::Base,
        SearchScope::OneLevel => Scope::OneLevel,
        SearchScope::Subtree => Scope::Subtree,
    }
}

const fn wire_deref(policy: DerefPolicy) -> DerefAliases {
    match policy {
        DerefPolicy::Never => DerefAliases::Never,
        DerefPolicy::Searching => DerefAliases::Searching,
        DerefPolicy::Finding => DerefAliases::Finding,
        DerefPolicy::Always => DerefAliases::Always,
    }
}

fn map_ldap_error(endpoint: &str, operation: &str, err: LdapError) -> Error {
    match err {
        LdapError::Io { source } => Error::connection(endpoint, source.to_string()),
        LdapError::EndOfStream => Error::connection(endpoint, "connection closed by server"),
        LdapError::LdapResult { result } if codes::is_transport_class(result.rc) => {
            Error::connection(endpoint, result.text)
        }
        LdapError::LdapResult { result } => Error::protocol(operation, result.rc, result.text),
        other => Error::protocol(operation, codes::LOCAL_ERROR, other.to_string()),
    }
}

/// Connector backed by `ldap3`.
pub(crate) struct RealLdapConnector {
    config: Arc<DirectoryConfig>,
}

impl RealLdapConnector {
    pub(crate) fn new(config: Arc<DirectoryConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LdapConnector for RealLdapConnector {
    async fn connect(&self) -> Result<Box<dyn LdapSession>> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.config.connect_timeout());
        let endpoint = self.config.endpoint();
        let outcome = LdapConnAsync::with_settings(settings, &self.config.url()).await;
        let (conn, ldap) = outcome.map_err(|err| map_ldap_error(&endpoint, "connect", err))?;
        ldap3::drive!(conn);
        Ok(Box::new(RealLdapSession {
            inner: ldap,
            endpoint,
            options: SessionOptions::default(),
        }))
    }
}

struct RealLdapSession {
    inner: ldap3::Ldap,
    endpoint: String,
    options: SessionOptions,
}

impl RealLdapSession {
    fn map_err(&self, operation: &str, err: LdapError) -> Error {
        map_ldap_error(&self.endpoint, operation, err)
    }

    /// Applies the session network timeout, if any, to the next operation.
    fn apply_timeout(&mut self) {
        if let Some(timeout) = self.options.network_timeout {
            self.inner.with_timeout(timeout);
        }
    }

    fn finish(
        &self,
        operation: &str,
        outcome: std::result::Result<ldap3::LdapResult, LdapError>,
    ) -> Result<()> {
        let result = outcome.map_err(|err| self.map_err(operation, err))?;
        result
            .success()
            .map_err(|err| self.map_err(operation, err))?;
        Ok(())
    }
}

/// Effective search parameters after layering per-call options over the
/// session defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedSearchOptions {
    deref: DerefPolicy,
    attributes_only: bool,
    size_limit: Option<i32>,
    time_limit: Option<i32>,
}

fn resolve_search_options(
    defaults: &SessionOptions,
    options: &SearchOptions,
) -> ResolvedSearchOptions {
    ResolvedSearchOptions {
        deref: options.deref_policy().unwrap_or(defaults.deref),
        attributes_only: options.is_attributes_only(),
        size_limit: options.size_limit_value().or(defaults.size_limit),
        time_limit: options.time_limit_value().or(defaults.time_limit),
    }
}

fn wire_search_options(resolved: ResolvedSearchOptions) -> ldap3::SearchOptions {
    let mut wire = ldap3::SearchOptions::new()
        .deref(wire_deref(resolved.deref))
        .typesonly(resolved.attributes_only);
    if let Some(limit) = resolved.size_limit {
        wire = wire.sizelimit(limit);
    }
    if let Some(limit) = resolved.time_limit {
        wire = wire.timelimit(limit);
    }
    wire
}

#[async_trait]
impl LdapSession for RealLdapSession {
    async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<()> {
        self.apply_timeout();
        let outcome = self.inner.simple_bind(dn, password).await;
        self.finish("bind", outcome)
    }

    async fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        options: &SearchOptions,
    ) -> Result<Box<dyn EntryStream>> {
        let wire_options = wire_search_options(resolve_search_options(&self.options, options));
        let attributes: Vec<String> = options.attributes_list().to_vec();
        self.apply_timeout();
        let outcome = self
            .inner
            .with_search_options(wire_options)
            .streaming_search(base_dn, wire_scope(scope), filter, attributes)
            .await;
        let stream = outcome.map_err(|err| self.map_err("search", err))?;
        Ok(Box::new(WireEntries {
            stream,
            endpoint: self.endpoint.clone(),
            done: false,
        }))
    }

    async fn add(&mut self, dn: &str, attributes: Vec<(String, Vec<String>)>) -> Result<()> {
        let attrs: Vec<(String, HashSet<String>)> = attributes
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().collect()))
            .collect();
        self.apply_timeout();
        let outcome = self.inner.add(dn, attrs).await;
        self.finish("add", outcome)
    }

    async fn modify(&mut self, dn: &str, modifications: &[DirectoryModification]) -> Result<()> {
        let mods = modifications
            .iter()
            .map(|m| match m {
                DirectoryModification::Add { attribute, values } => Mod::Add(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
                DirectoryModification::Delete { attribute, values } => Mod::Delete(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
                DirectoryModification::Replace { attribute, values } => Mod::Replace(
                    attribute.clone(),
                    values.iter().cloned().collect::<HashSet<_>>(),
                ),
            })
            .collect::<Vec<_>>();
        self.apply_timeout();
        let outcome = self.inner.modify(dn, mods).await;
        self.finish("modify", outcome)
    }

    async fn delete(&mut self, dn: &str) -> Result<()> {
        self.apply_timeout();
        let outcome = self.inner.delete(dn).await;
        self.finish("delete", outcome)
    }

    async fn set_option(&mut self, option: DirectoryOption, value: OptionValue) -> Result<()> {
        self.options.set(option, value)
    }

    async fn get_option(&mut self, option: DirectoryOption) -> Result<OptionValue> {
        Ok(self.options.get(option))
    }

    async fn unbind(&mut self) -> Result<()> {
        let outcome = self.inner.unbind().await;
        outcome.map_err(|err| self.map_err("unbind", err))
    }
}

/// Decodes one protocol frame, skipping referral references.
fn decode_frame(raw: ResultEntry) -> Option<DirectoryEntry> {
    if raw.is_ref() {
        return None;
    }
    let entry = SearchEntry::construct(raw);
    Some(DirectoryEntry::from_parts(entry.dn, entry.attrs))
}

/// Entry stream pulling search responses off the connection as they are
/// consumed.
///
/// Each `next_entry` awaits the next frame from the server; nothing is
/// buffered ahead of the caller. The protocol result arrives after the last
/// entry and is checked when the stream ends.
struct WireEntries {
    stream: SearchStream<'static, String, Vec<String>>,
    endpoint: String,
    done: bool,
}

#[async_trait]
impl EntryStream for WireEntries {
    async fn next_entry(&mut self) -> Result<Option<DirectoryEntry>> {
        if self.done {
            return Ok(None);
        }
        loop {
            let outcome = self.stream.next().await;
            let Some(raw) = outcome.map_err(|err| map_ldap_error(&self.endpoint, "search", err))?
            else {
                self.done = true;
                let result = self.stream.finish().await;
                result
                    .success()
                    .map_err(|err| map_ldap_error(&self.endpoint, "search", err))?;
                return Ok(None);
            };
            if let Some(entry) = decode_frame(raw) {
                return Ok(Some(entry));
            }
        }
    }
}
