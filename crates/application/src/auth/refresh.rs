//! Single-flight access token refresh.
//!
//! When several requests find their access token expired at the same time,
//! only the first one starts a refresh. The others wait in a FIFO queue and
//! are settled with the same outcome once the refresh completes:
//!
//! - `IDLE -> REFRESHING`: the first waiter snapshots the refresh token and a
//!   refresh task is spawned.
//! - `REFRESHING -> IDLE` on success: the token store is updated, then every
//!   waiter receives the new access token in enqueue order.
//! - `REFRESHING -> IDLE` on failure: the token store is cleared, every waiter
//!   receives the refresh error and the login redirect is signalled once.
//! - `REFRESHING -> IDLE` when the refresh task unwinds: every waiter receives
//!   a transport error and the session is left as it was.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use mentorlink_domain::{ApiError, Credentials};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::auth::TokenStore;
use crate::ports::{LoginRedirect, SessionNavigator};

/// Exchanges a refresh token for a new credential pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Calls the refresh endpoint with `refresh_token`.
    ///
    /// # Errors
    ///
    /// Returns the error reported by the refresh endpoint or the transport.
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, ApiError>;
}

type Outcome = Result<String, ApiError>;

/// A request waiting on the in-flight refresh.
struct PendingRequest {
    reply: oneshot::Sender<Outcome>,
}

#[derive(Default)]
struct RefreshState {
    in_progress: bool,
    waiters: VecDeque<PendingRequest>,
}

struct Inner {
    state: Mutex<RefreshState>,
    refresher: Arc<dyn TokenRefresher>,
    tokens: Arc<TokenStore>,
    navigator: Arc<dyn SessionNavigator>,
    refreshes: AtomicU64,
}

/// Coordinates token refreshes so at most one is in flight.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(
        refresher: Arc<dyn TokenRefresher>,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn SessionNavigator>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RefreshState::default()),
                refresher,
                tokens,
                navigator,
                refreshes: AtomicU64::new(0),
            }),
        }
    }

    /// Returns a fresh access token, starting a refresh or joining the one
    /// in flight.
    ///
    /// The refresh runs on its own task, so dropping this future does not
    /// leave the other waiters stranded. Must be called within a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns the refresh error. By then the token store has been cleared
    /// and the login redirect signalled.
    pub async fn refreshed_access_token(&self) -> Result<String, ApiError> {
        let (reply, outcome) = oneshot::channel();

        let starts_refresh = {
            let mut state = self.inner.state.lock();
            state.waiters.push_back(PendingRequest { reply });
            !std::mem::replace(&mut state.in_progress, true)
        };

        if starts_refresh {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.run().await });
        } else {
            debug!("joined in-flight token refresh");
        }

        outcome
            .await
            .unwrap_or_else(|_| Err(ApiError::transport("token refresh was abandoned")))
    }

    /// Returns true while a refresh is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.state.lock().in_progress
    }

    /// Number of requests waiting on the in-flight refresh.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.state.lock().waiters.len()
    }

    /// Number of refresh calls issued so far.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.inner.refreshes.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Releases the waiters if the refresh task unwinds before settling them.
struct AbandonGuard<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let waiters = self
                .inner
                .settle(&Err(ApiError::transport("token refresh was abandoned")));
            warn!(waiters, "token refresh aborted before completing");
        }
    }
}

impl Inner {
    async fn run(&self) {
        let mut guard = AbandonGuard {
            inner: self,
            armed: true,
        };
        let result = self.refresh().await;
        guard.armed = false;

        match result {
            Ok(credentials) => {
                let waiters = self.settle(&Ok(credentials.access_token));
                info!(waiters, "access token refreshed");
            }
            Err(err) => {
                if let Err(clear_err) = self.tokens.clear().await {
                    warn!(error = %clear_err, "failed to clear session after refresh failure");
                }
                let waiters = self.settle(&Err(err.clone()));
                warn!(error = %err, waiters, "token refresh failed, session cleared");
                self.navigator
                    .redirect_to_login(LoginRedirect::RefreshFailed);
            }
        }
    }

    async fn refresh(&self) -> Result<Credentials, ApiError> {
        let refresh_token = self
            .tokens
            .get()
            .await?
            .map(|c| c.refresh_token)
            .ok_or_else(|| ApiError::session_invalid("NO_SESSION", "no refresh token stored"))?;

        self.refreshes.fetch_add(1, Ordering::Relaxed);
        debug!("calling refresh endpoint");
        let credentials = self.refresher.refresh(&refresh_token).await?;
        self.tokens.set(&credentials).await?;
        Ok(credentials)
    }

    /// Drains the queue in FIFO order and returns to idle. Returns the number
    /// of waiters settled.
    fn settle(&self, outcome: &Outcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };

        let settled = waiters.len();
        for waiter in waiters {
            // The waiter may have given up; nothing to deliver then.
            let _ = waiter.reply.send(outcome.clone());
        }
        settled
    }
}
