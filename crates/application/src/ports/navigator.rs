//! Navigation port used to send the user back to the login screen.

use std::fmt;

/// Why the session ended and the user must sign in again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginRedirect {
    /// The refresh call failed; the token pair was discarded.
    RefreshFailed,
    /// The server reported the session as invalid.
    SessionInvalid,
    /// A request replayed after a refresh was rejected as expired again.
    RetryExhausted,
}

impl fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::RefreshFailed => "refresh failed",
            Self::SessionInvalid => "session invalid",
            Self::RetryExhausted => "token rejected after refresh",
        };
        f.write_str(reason)
    }
}

/// Port through which the client asks the UI shell to show the login entry
/// point. The client only signals; routing belongs to the shell.
pub trait SessionNavigator: Send + Sync {
    /// Requests navigation to the login entry point.
    fn redirect_to_login(&self, reason: LoginRedirect);
}
