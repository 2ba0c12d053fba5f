use std::sync::{
    atomic::{AtomicU8, Ordering},
    mpsc::{Receiver, SyncSender, TryRecvError},
    Arc, Mutex,
};

use crate::{
    logger::Logger,
    net::{marking::Marking, transition::Transition, Place},
};

const WAITING: u8 = 0;
const CHOSEN: u8 = 1;
const CANCELLED: u8 = 2;

/// Phase of a pending fire request. Exactly one of the decision loop
/// ([RequestPhase::choose]) and the caller's token ([RequestPhase::cancel])
/// wins the transition out of `WAITING`, which decides who sends the single
/// message on the request's decision channel.
#[derive(Debug)]
pub(crate) struct RequestPhase(AtomicU8);

impl RequestPhase {
    pub(crate) fn new() -> Self {
        RequestPhase(AtomicU8::new(WAITING))
    }

    pub(crate) fn choose(&self) -> bool {
        self.0
            .compare_exchange(WAITING, CHOSEN, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn cancel(&self) -> bool {
        self.0
            .compare_exchange(WAITING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire) == CANCELLED
    }
}

/// Sent exactly once per request, either by the decision loop (with the index
/// of the transition it granted) or by the cancelling token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Granted(usize),
    Cancelled,
}

/// One blocked `fire` call. Lives in the decision loop's working list from
/// submission until it is granted or reaped after cancellation.
pub(crate) struct FireRequest<P: Place> {
    pub(crate) transitions: Vec<Transition<P>>,
    pub(crate) phase: Arc<RequestPhase>,
    pub(crate) decision: SyncSender<Decision>,
    pub(crate) ack: Receiver<()>,
}

/// The decision loop: the only code path that selects enabled transitions for
/// granting. Runs on its own thread for the lifetime of the net, owns the
/// FIFO working list of pending requests and pulls new ones lazily from the
/// intake channel. Exits when the net is dropped (intake disconnects).
pub(crate) fn decision_loop<P: Place>(
    marking: Arc<Mutex<Marking<P>>>,
    intake: Receiver<FireRequest<P>>,
    logger: Option<Arc<Logger>>,
) {
    let mut waiting: Vec<FireRequest<P>> = Vec::new();

    loop {
        if grant_one(&marking, &mut waiting, logger.as_deref()) {
            // the marking changed, so retry every earlier request first
            continue;
        }

        // Nothing is enabled and the working list is exhausted. The marking
        // cannot change while this loop sits idle, so block on the intake.
        match intake.try_recv() {
            Ok(request) => waiting.push(request),
            Err(TryRecvError::Empty) => match intake.recv() {
                Ok(request) => waiting.push(request),
                Err(_) => break,
            },
            Err(TryRecvError::Disconnected) => break,
        }

        // Take whatever else queued up while we were scanning.
        while let Ok(request) = intake.try_recv() {
            waiting.push(request);
        }
    }
}

/// One scan over the working list in FIFO submission order. Grants the first
/// request that has an enabled transition (first by list order within the
/// request) and blocks until the winner has applied it. Returns false when
/// nothing is currently enabled.
fn grant_one<P: Place>(
    marking: &Arc<Mutex<Marking<P>>>,
    waiting: &mut Vec<FireRequest<P>>,
    logger: Option<&Logger>,
) -> bool {
    let mut index = 0;
    while index < waiting.len() {
        if waiting[index].phase.is_cancelled() {
            if let Some(logger) = logger {
                logger.debug("reaping cancelled request");
            }
            waiting.remove(index);
            continue;
        }

        let enabled = {
            let current = marking.lock().unwrap();
            waiting[index]
                .transitions
                .iter()
                .position(|t| t.is_enabled(&current))
        };
        let Some(chosen) = enabled else {
            index += 1;
            continue;
        };

        let request = waiting.remove(index);
        if !request.phase.choose() {
            // cancelled between the liveness check and the grant; no permit
            // is held at this point, so just keep scanning
            continue;
        }

        if let Some(logger) = logger {
            logger.debug(&format!("granting {:?}", request.transitions[chosen]));
        }

        if request.decision.send(Decision::Granted(chosen)).is_ok() {
            // Exclusive-access window: the winner is mutating the marking,
            // nothing else is scanned until it acknowledges.
            let _ = request.ack.recv();
        }
        return true;
    }

    false
}
