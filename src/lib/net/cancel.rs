use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::SyncSender,
    Arc, Mutex,
};

use crate::net::arbiter::{Decision, RequestPhase};

/// Cooperative cancellation handle for a blocked
/// [fire_cancellable](crate::net::PetriNet::fire_cancellable) call. Clone it,
/// hand the clone to another thread and call [CancelToken::cancel] there to
/// abandon the wait.
///
/// Cancellation races cleanly with the decision loop: whoever wins the
/// request's phase transition sends the single wake-up message, so a grant
/// that was already underway completes normally and a cancelled request is
/// never granted. One token guards at most one in-flight call at a time;
/// attaching it to a second concurrent call is a programming error and
/// panics.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    attached: Mutex<Option<(Arc<RequestPhase>, SyncSender<Decision>)>>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Cancels the attached fire call, if any. Until [CancelToken::reset] is
    /// called, every future call guarded by this token fails fast with
    /// [FireError::Cancelled](crate::net::FireError::Cancelled).
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let attached = self.inner.attached.lock().unwrap().take();
        if let Some((phase, wake)) = attached {
            // Losing this race means the decision loop already granted the
            // request and the fire call completes normally.
            if phase.cancel() {
                let _ = wake.send(Decision::Cancelled);
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Re-arms a token that was used to cancel a previous call.
    pub fn reset(&self) {
        self.inner.cancelled.store(false, Ordering::SeqCst);
    }

    /// Attaches an in-flight request. Returns false when the token is already
    /// cancelled (the caller must not submit the request).
    pub(crate) fn attach(&self, phase: Arc<RequestPhase>, wake: SyncSender<Decision>) -> bool {
        let mut attached = self.inner.attached.lock().unwrap();
        assert!(
            attached.is_none(),
            "CancelToken is already attached to a blocked fire call"
        );
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return false;
        }
        *attached = Some((phase, wake));
        true
    }

    pub(crate) fn detach(&self) {
        self.inner.attached.lock().unwrap().take();
    }
}
