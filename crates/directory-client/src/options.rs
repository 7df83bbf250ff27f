//! Protocol option access.
//!
//! Options set on a session become defaults for later operations; a
//! per-search [`SearchOptions`](crate::SearchOptions) overrides them for one
//! call. Validation happens at the session level, never in the client facade,
//! so an unsupported option or value surfaces as a protocol error carrying
//! [`codes::PARAM_ERROR`].

use crate::Result;
use directory_core::{codes, DerefPolicy, Error};
use std::fmt;
use std::time::Duration;

/// Identifies a session-level protocol option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOption {
    /// LDAP protocol version. Only version 3 is supported.
    ProtocolVersion,
    /// Default cap on the number of entries a search may return.
    SizeLimit,
    /// Default cap on server-side search duration, in seconds.
    TimeLimit,
    /// Default alias dereference policy for searches.
    Deref,
    /// Whether referrals are chased. Stored, not acted upon.
    Referrals,
    /// Per-operation network timeout, in seconds. Zero disables it.
    NetworkTimeout,
}

impl fmt::Display for DirectoryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ProtocolVersion => "protocol version",
            Self::SizeLimit => "size limit",
            Self::TimeLimit => "time limit",
            Self::Deref => "deref",
            Self::Referrals => "referrals",
            Self::NetworkTimeout => "network timeout",
        };
        f.write_str(name)
    }
}

/// Value carried by an option get or set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Numeric option value.
    Number(i64),
    /// Textual option value.
    Text(String),
    /// Boolean option value.
    Flag(bool),
}

/// Session option state applied as defaults to later operations.
#[derive(Debug, Clone)]
pub(crate) struct SessionOptions {
    pub(crate) size_limit: Option<i32>,
    pub(crate) time_limit: Option<i32>,
    pub(crate) deref: DerefPolicy,
    pub(crate) referrals: bool,
    pub(crate) network_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            size_limit: None,
            time_limit: None,
            deref: DerefPolicy::Never,
            referrals: true,
            network_timeout: None,
        }
    }
}

fn rejected(option: DirectoryOption, detail: impl Into<String>) -> Error {
    Error::protocol(format!("set option `{option}`"), codes::PARAM_ERROR, detail)
}

impl SessionOptions {
    /// Applies a set request, validating identifier/value pairing.
    pub(crate) fn set(&mut self, option: DirectoryOption, value: OptionValue) -> Result<()> {
        match (option, value) {
            (DirectoryOption::ProtocolVersion, OptionValue::Number(3)) => Ok(()),
            (DirectoryOption::ProtocolVersion, OptionValue::Number(other)) => Err(rejected(
                option,
                format!("protocol version {other} is not supported"),
            )),
            (DirectoryOption::SizeLimit, OptionValue::Number(n)) if n >= 0 => {
                self.size_limit = (n > 0).then(|| i32::try_from(n).unwrap_or(i32::MAX));
                Ok(())
            }
            (DirectoryOption::TimeLimit, OptionValue::Number(n)) if n >= 0 => {
                self.time_limit = (n > 0).then(|| i32::try_from(n).unwrap_or(i32::MAX));
                Ok(())
            }
            (DirectoryOption::Deref, OptionValue::Text(name)) => {
                self.deref = parse_deref(&name).ok_or_else(|| {
                    rejected(option, format!("unknown deref policy `{name}`"))
                })?;
                Ok(())
            }
            (DirectoryOption::Referrals, OptionValue::Flag(flag)) => {
                self.referrals = flag;
                Ok(())
            }
            (DirectoryOption::NetworkTimeout, OptionValue::Number(n)) if n >= 0 => {
                self.network_timeout = (n > 0).then(|| Duration::from_secs(n.unsigned_abs()));
                Ok(())
            }
            (option, value) => Err(rejected(option, format!("unsupported value {value:?}"))),
        }
    }

    /// Returns the current value of an option.
    pub(crate) fn get(&self, option: DirectoryOption) -> OptionValue {
        match option {
            DirectoryOption::ProtocolVersion => OptionValue::Number(3),
            DirectoryOption::SizeLimit => {
                OptionValue::Number(i64::from(self.size_limit.unwrap_or(0)))
            }
            DirectoryOption::TimeLimit => {
                OptionValue::Number(i64::from(self.time_limit.unwrap_or(0)))
            }
            DirectoryOption::Deref => OptionValue::Text(deref_name(self.deref).to_string()),
            DirectoryOption::Referrals => OptionValue::Flag(self.referrals),
            DirectoryOption::NetworkTimeout => OptionValue::Number(
                self.network_timeout
                    .map_or(0, |timeout| i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX)),
            ),
        }
    }
}

fn parse_deref(name: &str) -> Option<DerefPolicy> {
    match name.to_ascii_lowercase().as_str() {
        "never" => Some(DerefPolicy::Never),
        "searching" => Some(DerefPolicy::Searching),
        "finding" => Some(DerefPolicy::Finding),
        "always" => Some(DerefPolicy::Always),
        _ => None,
    }
}

const fn deref_name(policy: DerefPolicy) -> &'static str {
    match policy {
        DerefPolicy::Never => "never",
        DerefPolicy::Searching => "searching",
        DerefPolicy::Finding => "finding",
        DerefPolicy::Always => "always",
    }
}
