//! Well-known LDAP result codes.
//!
//! Only the codes the client inspects are named here; every other code is
//! passed through to the caller untouched inside [`crate::Error::Protocol`].

/// The operation completed successfully.
pub const SUCCESS: u32 = 0;

/// The named entry does not exist in the directory.
pub const NO_SUCH_OBJECT: u32 = 32;

/// The supplied credentials were rejected.
pub const INVALID_CREDENTIALS: u32 = 49;

/// The client has insufficient access rights for the operation.
pub const INSUFFICIENT_ACCESS_RIGHTS: u32 = 50;

/// The server is unwilling to perform the operation.
pub const UNWILLING_TO_PERFORM: u32 = 53;

/// Client-side code: the server cannot be contacted.
pub const SERVER_DOWN: u32 = 81;

/// Client-side code: a local (library) error occurred.
pub const LOCAL_ERROR: u32 = 82;

/// Client-side code: an option or parameter was rejected by the library.
pub const PARAM_ERROR: u32 = 89;

/// Returns true for client-side codes that indicate a lost or unreachable
/// server rather than a server-side rejection.
#[must_use]
pub const fn is_transport_class(code: u32) -> bool {
    code == SERVER_DOWN
}
