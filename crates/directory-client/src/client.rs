//! The directory client facade.

use crate::config::DirectoryConfig;
use crate::options::{DirectoryOption, OptionValue};
use crate::query::{DirectoryQuery, SearchOptions};
use crate::result::{sort_by_attribute, SearchResult};
use crate::session::{DirectoryModification, LdapConnector, LdapSession, RealLdapConnector};
use crate::Result;
use directory_core::{codes, DirectoryEntry, Error, SearchScope};
use std::sync::Arc;
use tracing::{debug, warn};

/// Filter matching any object class, used for base-scope entry reads.
const MATCH_ALL_FILTER: &str = "(objectClass=*)";

/// A stateful client for one directory server.
///
/// Owns at most one session at a time: `connect` establishes it, `close`
/// releases it, and every other operation requires it. The client is a
/// sequential facade; callers needing concurrent access must wrap it in
/// their own synchronization, which the `&mut self` receivers make explicit.
pub struct DirectoryClient {
    config: DirectoryConfig,
    connector: Box<dyn LdapConnector>,
    session: Option<Box<dyn LdapSession>>,
}

impl DirectoryClient {
    /// Creates a client for the configured server, using the real `ldap3`
    /// backend. No network activity happens until [`connect`](Self::connect).
    #[must_use]
    pub fn new(config: DirectoryConfig) -> Self {
        let connector: Box<dyn LdapConnector> =
            Box::new(RealLdapConnector::new(Arc::new(config.clone())));
        Self {
            config,
            connector,
            session: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_connector(config: DirectoryConfig, connector: Box<dyn LdapConnector>) -> Self {
        Self {
            config,
            connector,
            session: None,
        }
    }

    /// Establishes the connection. Idempotent: an already-connected client
    /// returns success without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when no usable session can be obtained
    /// for the configured endpoint.
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let session = self.connector.connect().await.map_err(|err| match err {
            connection @ Error::Connection { .. } => connection,
            other => Error::connection(self.config.endpoint(), other.to_string()),
        })?;
        debug!(endpoint = %self.config.endpoint(), "directory connection established");
        self.session = Some(session);
        Ok(())
    }

    /// Returns true iff a session is currently held.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Releases the session, if any. Idempotent, and never fails: an unbind
    /// error during teardown is traced and discarded.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            if let Err(err) = session.unbind().await {
                warn!("ignoring unbind failure during close: {err}");
            }
        }
        Ok(())
    }

    /// Authenticates the session. Omitting both arguments performs an
    /// anonymous bind.
    ///
    /// # Errors
    ///
    /// Transport-class failures (server unreachable or gone) surface as
    /// [`Error::Connection`]; any other rejection as [`Error::Protocol`]
    /// carrying the result code and the attempted identity.
    pub async fn bind(&mut self, user: Option<&str>, password: Option<&str>) -> Result<()> {
        let endpoint = self.config.endpoint();
        let identity = user.unwrap_or("");
        let session = self.session_mut()?;
        match session.simple_bind(identity, password.unwrap_or("")).await {
            Ok(()) => Ok(()),
            Err(Error::Protocol { code, message, .. }) if codes::is_transport_class(code) => {
                Err(Error::connection(endpoint, message))
            }
            Err(Error::Protocol { code, message, .. }) => {
                let label = if identity.is_empty() { "anonymous" } else { identity };
                Err(Error::protocol(
                    "bind",
                    code,
                    format!("as `{label}`: {message}"),
                ))
            }
            Err(other) => Err(other),
        }
    }

    /// Sets a session-level protocol option.
    ///
    /// # Errors
    ///
    /// Option identifiers and values are validated only by the session;
    /// rejection surfaces as [`Error::Protocol`] naming the option.
    pub async fn set_option(&mut self, option: DirectoryOption, value: OptionValue) -> Result<()> {
        self.session_mut()?.set_option(option, value).await
    }

    /// Reads a session-level protocol option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] without a session, or the session's
    /// own rejection.
    pub async fn get_option(&mut self, option: DirectoryOption) -> Result<OptionValue> {
        self.session_mut()?.get_option(option).await
    }

    /// Subtree search: the most permissive entry point, forwarding base DN,
    /// filter and options directly to the wire search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `search` on any library failure.
    pub async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        self.search_scoped(SearchScope::Subtree, base_dn, filter, options)
            .await
    }

    /// Search with an explicit scope: base-object read, one-level listing,
    /// or full subtree search. The scope enum is closed, so dispatch is
    /// compile-time exhaustive; untyped scope values are rejected at the
    /// [`SearchScope`] conversion boundary before any call reaches here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `search` on any library failure.
    pub async fn search_scoped(
        &mut self,
        scope: SearchScope,
        base_dn: &str,
        filter: &str,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        let session = self.session_mut()?;
        let stream = session
            .search(base_dn, scope, filter, options)
            .await
            .map_err(|err| relabel("search", err))?;
        Ok(SearchResult::new(stream))
    }

    /// Runs a structured query. Scope, options and filter come from the
    /// query; when sort attributes are present the materialized result is
    /// re-sorted once per attribute in the order given, so the last
    /// attribute dominates the final ordering (see
    /// [`DirectoryQuery::sort_attributes`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `search` on any library failure;
    /// no failure is reported through any side channel.
    pub async fn search_by(&mut self, query: &DirectoryQuery) -> Result<SearchResult> {
        let session = self.session_mut()?;
        let stream = session
            .search(query.base_dn(), query.scope(), query.filter(), query.options())
            .await
            .map_err(|err| relabel("search", err))?;
        let mut result = SearchResult::new(stream);
        if query.sort_attributes().is_empty() {
            return Ok(result);
        }
        let mut entries = result.collect_entries().await?;
        for attribute in query.sort_attributes() {
            sort_by_attribute(&mut entries, attribute);
        }
        Ok(SearchResult::from_entries(entries))
    }

    /// Reads one entry by DN with all its attributes.
    ///
    /// # Errors
    ///
    /// A missing entry is an error here: the server's `noSuchObject` code
    /// surfaces as [`Error::Protocol`] labeled `read`, like every other
    /// non-success code.
    pub async fn read(&mut self, dn: &str) -> Result<DirectoryEntry> {
        self.read_base(dn).await?.ok_or_else(|| {
            Error::protocol(
                "read",
                codes::NO_SUCH_OBJECT,
                format!("no entry returned for `{dn}`"),
            )
        })
    }

    /// Returns whether the entry exists.
    ///
    /// This is the one place a library error is downgraded to a normal
    /// result: `noSuchObject` answers `false` instead of failing. Any other
    /// non-success code is still an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for non-success codes other than
    /// `noSuchObject`, and [`Error::Connection`] on transport failure.
    pub async fn exists(&mut self, dn: &str) -> Result<bool> {
        match self.read_base(dn).await {
            Ok(found) => Ok(found.is_some()),
            Err(Error::Protocol { code, .. }) if code == codes::NO_SUCH_OBJECT => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Creates the entry with its full attribute map.
    ///
    /// # Errors
    ///
    /// Any outcome other than a usable success result is a failure,
    /// surfaced as [`Error::Protocol`] labeled `add`.
    pub async fn add(&mut self, entry: &DirectoryEntry) -> Result<()> {
        let attributes: Vec<(String, Vec<String>)> = entry
            .attributes()
            .iter()
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();
        let session = self.session_mut()?;
        session
            .add(entry.dn(), attributes)
            .await
            .map_err(|err| relabel("add", err))
    }

    /// Overwrites the entry: every attribute in `entry` becomes a replace
    /// modification, and attributes not present in `entry` are not
    /// preserved. This is a full overwrite, not a diff; use the
    /// single-attribute operations for partial updates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `modify` on failure.
    pub async fn modify(&mut self, entry: &DirectoryEntry) -> Result<()> {
        let modifications: Vec<DirectoryModification> = entry
            .attributes()
            .iter()
            .map(|(name, values)| DirectoryModification::Replace {
                attribute: name.clone(),
                values: values.clone(),
            })
            .collect();
        let session = self.session_mut()?;
        session
            .modify(entry.dn(), &modifications)
            .await
            .map_err(|err| relabel("modify", err))
    }

    /// Deletes the entry by DN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `delete` on failure.
    pub async fn delete(&mut self, dn: &str) -> Result<()> {
        let session = self.session_mut()?;
        session.delete(dn).await.map_err(|err| relabel("delete", err))
    }

    /// Adds one value to an attribute of the entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `add attribute` on failure.
    pub async fn add_attribute(&mut self, dn: &str, attribute: &str, value: &str) -> Result<()> {
        self.modify_one(
            dn,
            "add attribute",
            DirectoryModification::Add {
                attribute: attribute.to_string(),
                values: vec![value.to_string()],
            },
        )
        .await
    }

    /// Removes an attribute from the entry entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `delete attribute` on failure.
    pub async fn delete_attribute(&mut self, dn: &str, attribute: &str) -> Result<()> {
        self.modify_one(
            dn,
            "delete attribute",
            DirectoryModification::Delete {
                attribute: attribute.to_string(),
                values: Vec::new(),
            },
        )
        .await
    }

    /// Replaces the value of one attribute, leaving the rest of the entry
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] labeled `replace attribute` on failure.
    pub async fn replace_attribute(&mut self, dn: &str, attribute: &str, value: &str) -> Result<()> {
        self.modify_one(
            dn,
            "replace attribute",
            DirectoryModification::Replace {
                attribute: attribute.to_string(),
                values: vec![value.to_string()],
            },
        )
        .await
    }

    async fn modify_one(
        &mut self,
        dn: &str,
        operation: &str,
        modification: DirectoryModification,
    ) -> Result<()> {
        let session = self.session_mut()?;
        session
            .modify(dn, &[modification])
            .await
            .map_err(|err| relabel(operation, err))
    }

    async fn read_base(&mut self, dn: &str) -> Result<Option<DirectoryEntry>> {
        let session = self.session_mut()?;
        let mut stream = session
            .search(dn, SearchScope::Base, MATCH_ALL_FILTER, &SearchOptions::default())
            .await
            .map_err(|err| relabel("read", err))?;
        stream.next_entry().await
    }

    fn session_mut(&mut self) -> Result<&mut Box<dyn LdapSession>> {
        self.session.as_mut().ok_or(Error::NotConnected)
    }
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("config", &self.config)
            .field("connected", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

fn relabel(operation: &str, err: Error) -> Error {
    match err {
        Error::Protocol { code, message, .. } => Error::protocol(operation, code, message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{BufferedEntries, EntryStream};
    use crate::session::{MockLdapConnector, MockLdapSession};
    use directory_core::DerefPolicy;

    fn sample_config() -> DirectoryConfig {
        DirectoryConfig::new("ldap.example.org", 389).unwrap()
    }

    fn people_entry(uid: &str, cn: &str) -> DirectoryEntry {
        DirectoryEntry::new(format!("uid={uid},ou=People,dc=Example,dc=Org"))
            .with_attribute("uid", [uid])
            .with_attribute("cn", [cn])
    }

    fn stream_of(entries: Vec<DirectoryEntry>) -> Box<dyn EntryStream> {
        Box::new(BufferedEntries::new(entries))
    }

    async fn connected_client(session: MockLdapSession) -> DirectoryClient {
        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .times(1)
            .return_once(move || Ok(Box::new(session)));
        let mut client = DirectoryClient::with_connector(sample_config(), Box::new(connector));
        client.connect().await.unwrap();
        client
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .times(1)
            .return_once(|| Ok(Box::new(MockLdapSession::new())));

        let mut client = DirectoryClient::with_connector(sample_config(), Box::new(connector));
        assert!(!client.is_connected());
        client.connect().await.unwrap();
        client.connect().await.unwrap();
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn connect_failure_is_connection_error() {
        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .return_once(|| Err(Error::protocol("connect", codes::LOCAL_ERROR, "refused")));

        let mut client = DirectoryClient::with_connector(sample_config(), Box::new(connector));
        let err = client.connect().await.unwrap_err();
        assert!(
            matches!(err, Error::Connection { ref endpoint, .. } if endpoint == "ldap.example.org:389")
        );
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_swallows_unbind_failure() {
        let mut session = MockLdapSession::new();
        session
            .expect_unbind()
            .times(1)
            .returning(|| Err(Error::protocol("unbind", codes::LOCAL_ERROR, "boom")));

        let mut client = connected_client(session).await;
        client.close().await.unwrap();
        assert!(!client.is_connected());
        // Second close has no session left and still succeeds.
        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn operations_require_connection() {
        let connector = MockLdapConnector::new();
        let mut client = DirectoryClient::with_connector(sample_config(), Box::new(connector));

        assert_eq!(client.bind(None, None).await.unwrap_err(), Error::NotConnected);
        let err = client
            .search("dc=example,dc=org", "(objectClass=*)", &SearchOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err, Error::NotConnected);
        assert_eq!(
            client.read("uid=a,dc=example,dc=org").await.unwrap_err(),
            Error::NotConnected
        );
        assert_eq!(
            client.delete("uid=a,dc=example,dc=org").await.unwrap_err(),
            Error::NotConnected
        );
    }

    #[tokio::test]
    async fn anonymous_bind_sends_empty_credentials() {
        let mut session = MockLdapSession::new();
        session
            .expect_simple_bind()
            .withf(|dn, password| dn.is_empty() && password.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut client = connected_client(session).await;
        client.bind(None, None).await.unwrap();
    }

    #[tokio::test]
    async fn bind_rejection_names_the_identity() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| {
            Err(Error::protocol(
                "bind",
                codes::INVALID_CREDENTIALS,
                "invalid credentials",
            ))
        });

        let mut client = connected_client(session).await;
        let err = client
            .bind(Some("cn=admin,dc=example,dc=org"), Some("wrong"))
            .await
            .unwrap_err();
        match err {
            Error::Protocol {
                operation,
                code,
                message,
            } => {
                assert_eq!(operation, "bind");
                assert_eq!(code, codes::INVALID_CREDENTIALS);
                assert!(message.contains("cn=admin,dc=example,dc=org"));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bind_transport_failure_is_connection_error() {
        let mut session = MockLdapSession::new();
        session.expect_simple_bind().returning(|_, _| {
            Err(Error::protocol("bind", codes::SERVER_DOWN, "server down"))
        });

        let mut client = connected_client(session).await;
        let err = client.bind(None, None).await.unwrap_err();
        assert!(
            matches!(err, Error::Connection { ref endpoint, .. } if endpoint == "ldap.example.org:389")
        );
    }

    #[tokio::test]
    async fn subtree_scenario_yields_entries_with_dns() {
        let mut session = MockLdapSession::new();
        session
            .expect_simple_bind()
            .returning(|_, _| Ok(()));
        session
            .expect_search()
            .withf(|base, scope, filter, _| {
                base == "ou=People,dc=Example,dc=Org"
                    && *scope == SearchScope::Subtree
                    && filter == "(objectClass=*)"
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(stream_of(vec![
                    people_entry("jdoe", "John Doe"),
                    people_entry("asmith", "Alice Smith"),
                ]))
            });

        let mut client = connected_client(session).await;
        assert!(client.is_connected());
        client.bind(None, None).await.unwrap();

        let mut result = client
            .search_scoped(
                SearchScope::Subtree,
                "ou=People,dc=Example,dc=Org",
                "(objectClass=*)",
                &SearchOptions::new(),
            )
            .await
            .unwrap();
        let entries = result.collect_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| !entry.dn().is_empty()));
    }

    #[tokio::test]
    async fn search_scoped_forwards_scope_and_options() {
        let mut session = MockLdapSession::new();
        session
            .expect_search()
            .withf(|_, scope, _, options| {
                *scope == SearchScope::OneLevel
                    && options.attributes_list() == ["cn"]
                    && options.size_limit_value() == Some(10)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(stream_of(Vec::new())));

        let mut client = connected_client(session).await;
        let options = SearchOptions::new().with_attributes(["cn"]).size_limit(10);
        let mut result = client
            .search_scoped(
                SearchScope::OneLevel,
                "dc=Example,dc=Org",
                "(uid=*)",
                &options,
            )
            .await
            .unwrap();
        assert!(result.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_failure_is_protocol_error() {
        let mut session = MockLdapSession::new();
        session
            .expect_search()
            .returning(|_, _, _, _| Err(Error::protocol("search", 1, "operations error")));

        let mut client = connected_client(session).await;
        let err = client
            .search("dc=example,dc=org", "(objectClass=*)", &SearchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol { ref operation, code: 1, .. } if operation == "search"
        ));
    }

    #[tokio::test]
    async fn unrecognized_scope_fails_before_any_network_call() {
        let mut connector = MockLdapConnector::new();
        connector.expect_connect().times(0);

        // The scope value never becomes a SearchScope, so no client call can
        // be made with it; the connector stays untouched.
        let err = SearchScope::try_from(7).unwrap_err();
        assert_eq!(err, Error::InvalidScope(7));

        let client = DirectoryClient::with_connector(sample_config(), Box::new(connector));
        drop(client);
    }

    #[tokio::test]
    async fn search_by_applies_repeated_single_key_sort() {
        let mut session = MockLdapSession::new();
        session
            .expect_search()
            .withf(|base, scope, filter, _| {
                base == "ou=People,dc=Example,dc=Org"
                    && *scope == SearchScope::Subtree
                    && filter == "(objectClass=person)"
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(stream_of(vec![
                    people_entry("3", "bob"),
                    people_entry("1", "zoe"),
                    people_entry("2", "alice"),
                ]))
            });

        let mut client = connected_client(session).await;
        let query = DirectoryQuery::builder("ou=People,dc=Example,dc=Org", "(objectClass=person)")
            .sort_by("cn")
            .sort_by("uid")
            .build();
        let mut result = client.search_by(&query).await.unwrap();
        let entries = result.collect_entries().await.unwrap();

        // The last sort attribute (`uid`) dominates; a combined cn-then-uid
        // comparator would have produced alice, bob, zoe instead.
        let uids: Vec<&str> = entries.iter().filter_map(|e| e.first("uid")).collect();
        assert_eq!(uids, ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn search_by_forwards_query_options() {
        let mut session = MockLdapSession::new();
        session
            .expect_search()
            .withf(|_, scope, _, options| {
                *scope == SearchScope::Base
                    && options.is_attributes_only()
                    && options.time_limit_value() == Some(5)
                    && options.deref_policy() == Some(DerefPolicy::Always)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(stream_of(Vec::new())));

        let mut client = connected_client(session).await;
        let query = DirectoryQuery::builder("dc=Example,dc=Org", "(objectClass=*)")
            .scope(SearchScope::Base)
            .attributes_only(true)
            .time_limit(5)
            .deref(DerefPolicy::Always)
            .build();
        client.search_by(&query).await.unwrap();
    }

    #[tokio::test]
    async fn read_returns_the_entry() {
        let mut session = MockLdapSession::new();
        session
            .expect_search()
            .withf(|base, scope, filter, options| {
                base == "uid=jdoe,ou=People,dc=Example,dc=Org"
                    && *scope == SearchScope::Base
                    && filter == "(objectClass=*)"
                    && options.attributes_list().is_empty()
            })
            .returning(|_, _, _, _| Ok(stream_of(vec![people_entry("jdoe", "John Doe")])));

        let mut client = connected_client(session).await;
        let entry = client
            .read("uid=jdoe,ou=People,dc=Example,dc=Org")
            .await
            .unwrap();
        assert_eq!(entry.first("cn"), Some("John Doe"));
    }

    #[tokio::test]
    async fn read_of_missing_entry_is_protocol_error() {
        let mut session = MockLdapSession::new();
        session.expect_search().returning(|_, _, _, _| {
            Err(Error::protocol(
                "search",
                codes::NO_SUCH_OBJECT,
                "no such object",
            ))
        });

        let mut client = connected_client(session).await;
        let err = client
            .read("uid=ghost,ou=People,dc=Example,dc=Org")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol { ref operation, code, .. }
                if operation == "read" && code == codes::NO_SUCH_OBJECT
        ));
    }

    #[tokio::test]
    async fn exists_downgrades_no_such_object() {
        let mut session = MockLdapSession::new();
        session.expect_search().times(1).returning(|_, _, _, _| {
            Err(Error::protocol(
                "search",
                codes::NO_SUCH_OBJECT,
                "no such object",
            ))
        });

        let mut client = connected_client(session).await;
        assert!(!client.exists("uid=ghost,dc=Example,dc=Org").await.unwrap());
    }

    #[tokio::test]
    async fn exists_propagates_other_failures() {
        let mut session = MockLdapSession::new();
        session.expect_search().returning(|_, _, _, _| {
            Err(Error::protocol(
                "search",
                codes::INSUFFICIENT_ACCESS_RIGHTS,
                "insufficient access",
            ))
        });

        let mut client = connected_client(session).await;
        let err = client.exists("uid=jdoe,dc=Example,dc=Org").await.unwrap_err();
        assert_eq!(err.result_code(), Some(codes::INSUFFICIENT_ACCESS_RIGHTS));
    }

    #[tokio::test]
    async fn exists_true_when_entry_is_returned() {
        let mut session = MockLdapSession::new();
        session
            .expect_search()
            .returning(|_, _, _, _| Ok(stream_of(vec![people_entry("jdoe", "John Doe")])));

        let mut client = connected_client(session).await;
        assert!(client
            .exists("uid=jdoe,ou=People,dc=Example,dc=Org")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn add_submits_full_attribute_map() {
        let mut session = MockLdapSession::new();
        session
            .expect_add()
            .withf(|dn, attributes| {
                dn == "uid=new,ou=People,dc=Example,dc=Org"
                    && attributes.len() == 2
                    && attributes
                        .iter()
                        .any(|(name, values)| name == "cn" && values == &["New User"])
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut client = connected_client(session).await;
        let entry = DirectoryEntry::new("uid=new,ou=People,dc=Example,dc=Org")
            .with_attribute("uid", ["new"])
            .with_attribute("cn", ["New User"]);
        client.add(&entry).await.unwrap();
    }

    #[tokio::test]
    async fn add_failure_is_protocol_error() {
        let mut session = MockLdapSession::new();
        session.expect_add().returning(|_, _| {
            Err(Error::protocol(
                "add",
                codes::UNWILLING_TO_PERFORM,
                "unwilling",
            ))
        });

        let mut client = connected_client(session).await;
        let entry = DirectoryEntry::new("uid=new,dc=Example,dc=Org");
        let err = client.add(&entry).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol { ref operation, .. } if operation == "add"
        ));
    }

    #[tokio::test]
    async fn modify_replaces_every_attribute() {
        let mut session = MockLdapSession::new();
        session
            .expect_modify()
            .withf(|dn, modifications| {
                dn == "uid=jdoe,ou=People,dc=Example,dc=Org"
                    && modifications.len() == 2
                    && modifications
                        .iter()
                        .all(|m| matches!(m, DirectoryModification::Replace { .. }))
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut client = connected_client(session).await;
        // Supplying only {uid, cn} means the server-side entry keeps only
        // those attributes; nothing else is diffed or preserved.
        let entry = people_entry("jdoe", "John Doe");
        client.modify(&entry).await.unwrap();
    }

    #[tokio::test]
    async fn replace_attribute_touches_only_the_named_attribute() {
        let mut session = MockLdapSession::new();
        session
            .expect_modify()
            .withf(|dn, modifications| {
                dn == "uid=jdoe,ou=People,dc=Example,dc=Org"
                    && modifications
                        == [DirectoryModification::Replace {
                            attribute: "mail".to_string(),
                            values: vec!["new@example.org".to_string()],
                        }]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut client = connected_client(session).await;
        client
            .replace_attribute(
                "uid=jdoe,ou=People,dc=Example,dc=Org",
                "mail",
                "new@example.org",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_attribute_removes_the_whole_attribute() {
        let mut session = MockLdapSession::new();
        session
            .expect_modify()
            .withf(|_, modifications| {
                modifications
                    == [DirectoryModification::Delete {
                        attribute: "mail".to_string(),
                        values: Vec::new(),
                    }]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut client = connected_client(session).await;
        client
            .delete_attribute("uid=jdoe,ou=People,dc=Example,dc=Org", "mail")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_attribute_failure_carries_specific_label() {
        let mut session = MockLdapSession::new();
        session.expect_modify().returning(|_, _| {
            Err(Error::protocol(
                "modify",
                codes::UNWILLING_TO_PERFORM,
                "unwilling",
            ))
        });

        let mut client = connected_client(session).await;
        let err = client
            .add_attribute("uid=jdoe,dc=Example,dc=Org", "mail", "x@example.org")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol { ref operation, .. } if operation == "add attribute"
        ));
    }

    #[tokio::test]
    async fn delete_failure_is_protocol_error() {
        let mut session = MockLdapSession::new();
        session.expect_delete().returning(|_| {
            Err(Error::protocol(
                "delete",
                codes::INSUFFICIENT_ACCESS_RIGHTS,
                "insufficient access",
            ))
        });

        let mut client = connected_client(session).await;
        let err = client
            .delete("uid=jdoe,ou=People,dc=Example,dc=Org")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol { ref operation, .. } if operation == "delete"
        ));
    }

    #[tokio::test]
    async fn options_pass_through_to_the_session() {
        let mut session = MockLdapSession::new();
        session
            .expect_set_option()
            .withf(|option, value| {
                *option == DirectoryOption::SizeLimit && *value == OptionValue::Number(50)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        session
            .expect_get_option()
            .withf(|option| *option == DirectoryOption::SizeLimit)
            .times(1)
            .returning(|_| Ok(OptionValue::Number(50)));

        let mut client = connected_client(session).await;
        client
            .set_option(DirectoryOption::SizeLimit, OptionValue::Number(50))
            .await
            .unwrap();
        assert_eq!(
            client.get_option(DirectoryOption::SizeLimit).await.unwrap(),
            OptionValue::Number(50)
        );
    }

    #[tokio::test]
    async fn option_rejection_surfaces_as_protocol_error() {
        let mut session = MockLdapSession::new();
        session.expect_set_option().returning(|option, _| {
            Err(Error::protocol(
                format!("set option `{option}`"),
                codes::PARAM_ERROR,
                "unsupported value",
            ))
        });

        let mut client = connected_client(session).await;
        let err = client
            .set_option(DirectoryOption::ProtocolVersion, OptionValue::Number(2))
            .await
            .unwrap_err();
        assert_eq!(err.result_code(), Some(codes::PARAM_ERROR));
    }
}
