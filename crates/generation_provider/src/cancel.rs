use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier for one session attempt. Strictly increasing per coordinator.
pub type SessionId = u64;

const NO_LIVE_SESSION: SessionId = 0;

#[derive(Debug, Default)]
struct SlotState {
    next_session: AtomicU64,
    live_session: AtomicU64,
}

/// Owns the single "currently authorized session" slot.
///
/// Session ids are allocated in increasing order and the live slot only moves
/// forward (to a newer session) or to "none", so a token that stopped being
/// live can never become live again.
#[derive(Debug, Default)]
pub struct CancellationCoordinator {
    state: Arc<SlotState>,
}

/// Revocable handle authorizing one session to mutate shared state.
///
/// Tokens are only minted by [`CancellationCoordinator::begin_session`]; holders
/// can check liveness but never revive a token.
#[derive(Debug, Clone)]
pub struct CancelToken {
    session: SessionId,
    state: Arc<SlotState>,
}

impl CancellationCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh live token and revokes whichever token was live before.
    pub fn begin_session(&self) -> CancelToken {
        let session = self.state.next_session.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.live_session.fetch_max(session, Ordering::SeqCst);
        CancelToken {
            session,
            state: Arc::clone(&self.state),
        }
    }

    #[must_use]
    pub fn is_live(&self, token: &CancelToken) -> bool {
        Arc::ptr_eq(&self.state, &token.state) && token.is_live()
    }

    /// Revokes `token` when it is the live one. Stale or foreign tokens are a no-op.
    ///
    /// Returns true when this call performed the revocation.
    pub fn cancel(&self, token: &CancelToken) -> bool {
        if !Arc::ptr_eq(&self.state, &token.state) {
            return false;
        }

        self.state
            .live_session
            .compare_exchange(
                token.session,
                NO_LIVE_SESSION,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Revokes the live token, if any, without starting a new session.
    pub fn cancel_live(&self) -> Option<SessionId> {
        match self
            .state
            .live_session
            .swap(NO_LIVE_SESSION, Ordering::SeqCst)
        {
            NO_LIVE_SESSION => None,
            session => Some(session),
        }
    }

    #[must_use]
    pub fn live_session(&self) -> Option<SessionId> {
        match self.state.live_session.load(Ordering::SeqCst) {
            NO_LIVE_SESSION => None,
            session => Some(session),
        }
    }
}

impl CancelToken {
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state.live_session.load(Ordering::SeqCst) == self.session
    }

    #[must_use]
    pub fn is_revoked(&self) -> bool {
        !self.is_live()
    }

    /// Returns true once a newer session has been started, whether or not it
    /// is still live.
    #[must_use]
    pub fn is_superseded(&self) -> bool {
        self.state.next_session.load(Ordering::SeqCst) > self.session
    }
}

#[cfg(test)]
mod tests {
    use super::CancellationCoordinator;

    #[test]
    fn begin_session_revokes_previous_token() {
        let coordinator = CancellationCoordinator::new();
        let first = coordinator.begin_session();
        assert!(first.is_live());

        let second = coordinator.begin_session();
        assert!(!first.is_live());
        assert!(second.is_live());
        assert!(second.session() > first.session());
        assert!(first.is_superseded());
    }

    #[test]
    fn cancel_only_revokes_the_live_token() {
        let coordinator = CancellationCoordinator::new();
        let stale = coordinator.begin_session();
        let live = coordinator.begin_session();

        assert!(!coordinator.cancel(&stale));
        assert!(live.is_live());

        assert!(coordinator.cancel(&live));
        assert!(!live.is_live());
        assert!(!live.is_superseded());
        assert_eq!(coordinator.live_session(), None);
    }

    #[test]
    fn revoked_tokens_stay_revoked_across_later_sessions() {
        let coordinator = CancellationCoordinator::new();
        let first = coordinator.begin_session();
        assert!(coordinator.cancel(&first));

        for _ in 0..8 {
            let next = coordinator.begin_session();
            assert!(!first.is_live());
            assert!(next.is_live());
        }
    }

    #[test]
    fn cancel_live_reports_revoked_session() {
        let coordinator = CancellationCoordinator::new();
        assert_eq!(coordinator.cancel_live(), None);

        let token = coordinator.begin_session();
        assert_eq!(coordinator.cancel_live(), Some(token.session()));
        assert!(!token.is_live());
        assert_eq!(coordinator.cancel_live(), None);
    }

    #[test]
    fn tokens_from_another_coordinator_are_never_live_here() {
        let ours = CancellationCoordinator::new();
        let theirs = CancellationCoordinator::new();
        let foreign = theirs.begin_session();
        let _own = ours.begin_session();

        assert!(foreign.is_live());
        assert!(!ours.is_live(&foreign));
        assert!(!ours.cancel(&foreign));
        assert!(foreign.is_live());
    }
}
