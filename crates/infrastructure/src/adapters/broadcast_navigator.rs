//! Session events published to the UI shell.

use mentorlink_application::ports::{LoginRedirect, SessionNavigator};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Default capacity of the session event channel.
const DEFAULT_CAPACITY: usize = 16;

/// Event emitted when the session state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session ended and the user must sign in again.
    LoginRequired {
        /// Why the session ended.
        reason: LoginRedirect,
    },
}

/// Navigator that publishes [`SessionEvent`]s on a broadcast channel.
///
/// The UI shell subscribes and routes to its login screen. Signals sent
/// while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNavigator {
    sender: broadcast::Sender<SessionEvent>,
}

impl BroadcastNavigator {
    /// Creates a navigator with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a navigator buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionNavigator for BroadcastNavigator {
    fn redirect_to_login(&self, reason: LoginRedirect) {
        info!(%reason, "login required");
        if self
            .sender
            .send(SessionEvent::LoginRequired { reason })
            .is_err()
        {
            debug!("no subscriber for session events");
        }
    }
}
