//! Three processes passing a critical section around.
//!
//! Each process `Pn` owns a history place `Hn` that records its last visit:
//! an inhibitor arc on the process's own history blocks immediate re-entry,
//! and entering resets the sibling histories. `Start` and `Exe` are the
//! shared control places; mutual exclusion means no reachable marking ever
//! holds more than one `Exe` token.

use serde::{Deserialize, Serialize};

use crate::{
    marking,
    net::{marking::Marking, transition::Transition, PetriNet},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlternatorPlace {
    P1,
    P2,
    P3,
    Start,
    Exe,
    H1,
    H2,
    H3,
}

pub const PROCESSES: [AlternatorPlace; 3] = [
    AlternatorPlace::P1,
    AlternatorPlace::P2,
    AlternatorPlace::P3,
];

pub const HISTORIES: [AlternatorPlace; 3] = [
    AlternatorPlace::H1,
    AlternatorPlace::H2,
    AlternatorPlace::H3,
];

/// The two transitions of process `index` (0..3): enter the critical section
/// and leave it again. Entering is blocked while the process's own history
/// holds a token and clears both sibling histories.
pub fn process_transitions(index: usize) -> Vec<Transition<AlternatorPlace>> {
    use AlternatorPlace::*;

    let enter = Transition::new(
        [(PROCESSES[index], 1), (Start, 1)],
        [HISTORIES[(index + 1) % 3], HISTORIES[(index + 2) % 3]],
        [HISTORIES[index]],
        [(Exe, 1), (HISTORIES[index], 1)],
    );
    let leave = Transition::new(
        [(Exe, 1)],
        [],
        [PROCESSES[index]],
        [(PROCESSES[index], 1), (Start, 1)],
    );

    vec![enter, leave]
}

/// Every transition of the net, process by process.
pub fn all_transitions() -> Vec<Transition<AlternatorPlace>> {
    (0..3).flat_map(process_transitions).collect()
}

pub fn initial_marking() -> Marking<AlternatorPlace> {
    use AlternatorPlace::*;
    marking![P1 => 1, P2 => 1, P3 => 1, Start => 1]
}

pub fn new_net() -> PetriNet<AlternatorPlace> {
    PetriNet::new(initial_marking(), true)
}
