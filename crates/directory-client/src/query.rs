//! Search options and structured queries.

use directory_core::{DerefPolicy, SearchScope};
use serde::{Deserialize, Serialize};

/// Optional parameters for one search call.
///
/// Replaces the classic variadic search tail with named fields. Every field
/// has a neutral default: all attributes, values included, no size or time
/// limit, and the session's alias dereference policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    attributes: Vec<String>,
    attributes_only: bool,
    size_limit: Option<i32>,
    time_limit: Option<i32>,
    deref: Option<DerefPolicy>,
}

impl SearchOptions {
    /// Creates options with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the returned attributes. An empty list returns everything.
    #[must_use]
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Returns attribute names only, without values.
    #[must_use]
    pub const fn attributes_only(mut self, attributes_only: bool) -> Self {
        self.attributes_only = attributes_only;
        self
    }

    /// Caps the number of entries the server may return.
    #[must_use]
    pub const fn size_limit(mut self, limit: i32) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Caps the server-side search duration, in seconds.
    #[must_use]
    pub const fn time_limit(mut self, limit: i32) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Overrides the alias dereference policy for this call.
    #[must_use]
    pub const fn deref(mut self, policy: DerefPolicy) -> Self {
        self.deref = Some(policy);
        self
    }

    /// Requested attributes (empty means all).
    #[must_use]
    pub fn attributes_list(&self) -> &[String] {
        &self.attributes
    }

    /// Whether only attribute names are requested.
    #[must_use]
    pub const fn is_attributes_only(&self) -> bool {
        self.attributes_only
    }

    /// Entry count cap, if any.
    #[must_use]
    pub const fn size_limit_value(&self) -> Option<i32> {
        self.size_limit
    }

    /// Search duration cap in seconds, if any.
    #[must_use]
    pub const fn time_limit_value(&self) -> Option<i32> {
        self.time_limit
    }

    /// Per-call dereference policy, if overridden.
    #[must_use]
    pub const fn deref_policy(&self) -> Option<DerefPolicy> {
        self.deref
    }
}

/// A structured search: base DN, filter, scope, options, and optional
/// post-search sort attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryQuery {
    base_dn: String,
    filter: String,
    scope: SearchScope,
    options: SearchOptions,
    sort_attributes: Vec<String>,
}

impl DirectoryQuery {
    /// Starts building a query over the given base DN and filter.
    #[must_use]
    pub fn builder(base_dn: impl Into<String>, filter: impl Into<String>) -> DirectoryQueryBuilder {
        DirectoryQueryBuilder {
            query: Self {
                base_dn: base_dn.into(),
                filter: filter.into(),
                scope: SearchScope::Subtree,
                options: SearchOptions::default(),
                sort_attributes: Vec::new(),
            },
        }
    }

    /// Base DN the search starts from.
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Filter expression.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Search scope.
    #[must_use]
    pub const fn scope(&self) -> SearchScope {
        self.scope
    }

    /// Per-call search options.
    #[must_use]
    pub const fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Sort attributes applied after the search, in application order.
    ///
    /// Each attribute triggers an independent stable re-sort of the full
    /// result set, so the last attribute listed dominates the final order.
    #[must_use]
    pub fn sort_attributes(&self) -> &[String] {
        &self.sort_attributes
    }
}

/// Builder for [`DirectoryQuery`].
#[derive(Debug, Clone)]
pub struct DirectoryQueryBuilder {
    query: DirectoryQuery,
}

impl DirectoryQueryBuilder {
    /// Sets the search scope (default: subtree).
    #[must_use]
    pub const fn scope(mut self, scope: SearchScope) -> Self {
        self.query.scope = scope;
        self
    }

    /// Restricts the returned attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.query.options = self.query.options.with_attributes(attributes);
        self
    }

    /// Returns attribute names only, without values.
    #[must_use]
    pub fn attributes_only(mut self, attributes_only: bool) -> Self {
        self.query.options = self.query.options.attributes_only(attributes_only);
        self
    }

    /// Caps the number of entries the server may return.
    #[must_use]
    pub fn size_limit(mut self, limit: i32) -> Self {
        self.query.options = self.query.options.size_limit(limit);
        self
    }

    /// Caps the server-side search duration, in seconds.
    #[must_use]
    pub fn time_limit(mut self, limit: i32) -> Self {
        self.query.options = self.query.options.time_limit(limit);
        self
    }

    /// Sets the alias dereference policy.
    #[must_use]
    pub fn deref(mut self, policy: DerefPolicy) -> Self {
        self.query.options = self.query.options.deref(policy);
        self
    }

    /// Appends a post-search sort attribute.
    #[must_use]
    pub fn sort_by(mut self, attribute: impl Into<String>) -> Self {
        self.query.sort_attributes.push(attribute.into());
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> DirectoryQuery {
        self.query
    }
}

/// Escapes a value for embedding in a filter expression (RFC 4515).
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
