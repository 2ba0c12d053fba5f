//! Unary multiplication driven purely by token passing.
//!
//! `B1`/`B2` hold the multiplier, `B1T`/`B2T` mark which of the two is the
//! current source, `A` counts the remaining rounds. Every round copies the
//! multiplier across (dropping one copy into `B3` per token), the accumulator
//! drains `B3` into `Res`, and the turn-around transitions start the next
//! round from the other side. With `A = a` and `B1 = b` initially, `Res`
//! holds `a * b` at quiescence. The end transition is enabled exactly once,
//! when nothing else is.
//!
//! The net has no client-side locking at all: any number of workers fire the
//! same shared transition set and correctness rests entirely on the engine's
//! serialization.

use serde::{Deserialize, Serialize};

use crate::{
    marking,
    net::{marking::Marking, transition::Transition, PetriNet},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MultiplicatorPlace {
    A,
    B1,
    B2,
    B3,
    B1T,
    B2T,
    Acc,
    Res,
    End,
}

/// The seven transitions shared by every worker.
pub fn worker_transitions() -> Vec<Transition<MultiplicatorPlace>> {
    use MultiplicatorPlace::*;

    vec![
        // copy a token out of B1
        Transition::new([(B1, 1), (B1T, 1)], [], [], [(B1T, 1), (B2, 1), (B3, 1)]),
        // copy a token out of B2
        Transition::new([(B2, 1), (B2T, 1)], [], [], [(B2T, 1), (B1, 1), (B3, 1)]),
        // B1 drained: hand the turn to the accumulator
        Transition::new([(A, 1), (B1T, 1)], [], [B1], [(Acc, 1)]),
        // B2 drained: hand the turn to the accumulator
        Transition::new([(A, 1), (B2T, 1)], [], [B2], [(Acc, 1)]),
        // move one copied token into the result
        Transition::new([(B3, 1), (Acc, 1)], [], [], [(Acc, 1), (Res, 1)]),
        // accumulator done: start the next round from B2
        Transition::new([(A, 1), (Acc, 1)], [], [B1, B3], [(B2T, 1), (A, 1)]),
        // accumulator done: start the next round from B1
        Transition::new([(A, 1), (Acc, 1)], [], [B2, B3], [(B1T, 1), (A, 1)]),
    ]
}

/// Enabled exactly when the multiplication has run to quiescence: no rounds
/// left, nothing left to accumulate, not finished already.
pub fn end_transitions() -> Vec<Transition<MultiplicatorPlace>> {
    use MultiplicatorPlace::*;

    vec![Transition::new([], [], [A, B3, End], [(End, 1)])]
}

pub fn initial_marking(a: usize, b: usize) -> Marking<MultiplicatorPlace> {
    use MultiplicatorPlace::*;
    marking![A => a, B1 => b, B1T => 1]
}

pub fn new_net(a: usize, b: usize) -> PetriNet<MultiplicatorPlace> {
    PetriNet::new(initial_marking(a, b), true)
}
