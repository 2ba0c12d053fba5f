use std::{
    fmt::{self, Debug, Display},
    hash::Hash,
    sync::{
        mpsc::{self, SyncSender},
        Arc, Mutex,
    },
    thread,
};

use hashbrown::HashSet;
use petgraph::graph::DiGraph;

use crate::{
    logger::Logger,
    net::{
        arbiter::{decision_loop, Decision, FireRequest, RequestPhase},
        cancel::CancelToken,
        marking::Marking,
        transition::Transition,
    },
};

pub(crate) mod arbiter;
pub mod cancel;
pub mod marking;
pub mod reachability;
pub mod transition;

/// This trait represents types that can be used as place identifiers in a
/// net. Blanket-implemented; clients normally use a plain enum.
pub trait Place: Debug + Clone + Ord + Hash + Send + 'static {}
impl<T> Place for T where T: Debug + Clone + Ord + Hash + Send + 'static {}

/// Requests the decision loop has not pulled yet queue up here. The bound
/// only limits the submission backlog, never the number of blocked callers.
const INTAKE_BACKLOG: usize = 128;

/// Errors a fire call can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireError {
    /// The call was abandoned through its [CancelToken] before a transition
    /// was granted. The only expected abnormal exit; the net stays fully
    /// consistent for every other caller.
    Cancelled,
    /// The decision loop is gone. Not observable through the public API while
    /// the net is alive; kept so the channel boundary propagates instead of
    /// panicking.
    Disconnected,
}

impl Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireError::Cancelled => write!(f, "fire call was cancelled while waiting"),
            FireError::Disconnected => write!(f, "the decision loop has shut down"),
        }
    }
}

impl std::error::Error for FireError {}

/// A concurrently executable Petri net.
///
/// The net owns the live marking and a background decision loop that
/// serializes all firing: callers block in [PetriNet::fire] until the loop
/// selects one of their transitions, apply it under an exclusive window and
/// return it. Any number of threads may fire against one net (behind an
/// `Arc`) without further locking on their side.
pub struct PetriNet<P: Place> {
    marking: Arc<Mutex<Marking<P>>>,
    intake: Option<SyncSender<FireRequest<P>>>,
    decision_loop: Option<thread::JoinHandle<()>>,
}

impl<P: Place> PetriNet<P> {
    /// Creates a net with the given initial marking and starts its decision
    /// loop. `fair` is kept for interface parity: the FIFO-preference restart
    /// policy is the only arbitration mode and is always active.
    pub fn new(initial: Marking<P>, fair: bool) -> Self {
        Self::start(initial, fair, None)
    }

    /// Like [PetriNet::new], with a logger tracing grants and cancellations
    /// inside the decision loop.
    pub fn with_logger(initial: Marking<P>, fair: bool, logger: Logger) -> Self {
        Self::start(initial, fair, Some(Arc::new(logger)))
    }

    fn start(initial: Marking<P>, _fair: bool, logger: Option<Arc<Logger>>) -> Self {
        let marking = Arc::new(Mutex::new(initial));
        let (intake, requests) = mpsc::sync_channel(INTAKE_BACKLOG);
        let loop_marking = Arc::clone(&marking);
        let handle = thread::spawn(move || decision_loop(loop_marking, requests, logger));

        PetriNet {
            marking,
            intake: Some(intake),
            decision_loop: Some(handle),
        }
    }

    /// Blocks until one of `transitions` is enabled against the live marking,
    /// applies exactly one of them and returns it. Within the given list the
    /// first enabled transition wins; across concurrent callers the decision
    /// loop prefers earlier-submitted requests after every firing.
    ///
    /// If no transition in the set ever becomes enabled the call blocks
    /// indefinitely; that is intended behavior, not a failure mode.
    pub fn fire(&self, transitions: &[Transition<P>]) -> Result<Transition<P>, FireError> {
        self.fire_inner(transitions, None)
    }

    /// Like [PetriNet::fire], but the wait can be abandoned through `token`,
    /// in which case the call returns [FireError::Cancelled] promptly and the
    /// net keeps serving every other caller.
    pub fn fire_cancellable(
        &self,
        transitions: &[Transition<P>],
        token: &CancelToken,
    ) -> Result<Transition<P>, FireError> {
        self.fire_inner(transitions, Some(token))
    }

    fn fire_inner(
        &self,
        transitions: &[Transition<P>],
        token: Option<&CancelToken>,
    ) -> Result<Transition<P>, FireError> {
        let phase = Arc::new(RequestPhase::new());
        let (decision_tx, decision_rx) = mpsc::sync_channel(1);
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);

        if let Some(token) = token {
            if !token.attach(Arc::clone(&phase), decision_tx.clone()) {
                return Err(FireError::Cancelled);
            }
        }

        let request = FireRequest {
            transitions: transitions.to_vec(),
            phase,
            decision: decision_tx,
            ack: ack_rx,
        };

        let outcome = self
            .submit(request)
            .and_then(|()| decision_rx.recv().map_err(|_| FireError::Disconnected));

        if let Some(token) = token {
            token.detach();
        }

        match outcome? {
            Decision::Granted(index) => {
                {
                    let mut current = self.marking.lock().unwrap();
                    transitions[index].apply(&mut current);
                }
                // release the exclusive window
                let _ = ack_tx.send(());
                Ok(transitions[index].clone())
            }
            Decision::Cancelled => Err(FireError::Cancelled),
        }
    }

    fn submit(&self, request: FireRequest<P>) -> Result<(), FireError> {
        match &self.intake {
            Some(intake) => intake.send(request).map_err(|_| FireError::Disconnected),
            None => Err(FireError::Disconnected),
        }
    }

    /// Snapshot of the current marking, taken under the same lock that guards
    /// firing, so it never observes a half-applied transition.
    pub fn marking(&self) -> Marking<P> {
        self.marking.lock().unwrap().clone()
    }

    /// The set of all markings reachable from the current one through any
    /// finite firing sequence drawn from `transitions`, the current marking
    /// included. Runs against a consistent snapshot: the live marking is not
    /// mutated and the call never enters the fire queue. Termination on an
    /// infinite state space is the caller's responsibility.
    pub fn reachable(&self, transitions: &[Transition<P>]) -> HashSet<Marking<P>> {
        reachability::explore(self.marking(), transitions)
    }

    /// Like [PetriNet::reachable], but keeps the firing structure: nodes are
    /// markings, edge weights index into `transitions`.
    pub fn reachability_graph(&self, transitions: &[Transition<P>]) -> DiGraph<Marking<P>, usize> {
        reachability::explore_graph(self.marking(), transitions)
    }
}

impl<P: Place> Drop for PetriNet<P> {
    fn drop(&mut self) {
        // closing the intake ends the decision loop
        drop(self.intake.take());
        if let Some(handle) = self.decision_loop.take() {
            let _ = handle.join();
        }
    }
}
