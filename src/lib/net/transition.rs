use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::net::{marking::Marking, Place};

/// A firing rule: consumes `input` tokens, clears every `reset` place and
/// produces `output` tokens. A transition is blocked while any `inhibitor`
/// place holds tokens. Immutable once built and freely shared between
/// concurrent callers; it never carries state of its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition<P: Place> {
    input: BTreeMap<P, usize>,
    output: BTreeMap<P, usize>,
    reset: BTreeSet<P>,
    inhibitor: BTreeSet<P>,
}

impl<P: Place> Transition<P> {
    /// Argument order follows the net description format: input arcs, reset
    /// arcs, inhibitor arcs, output arcs. Zero-weight entries are dropped,
    /// duplicate places accumulate.
    pub fn new(
        input: impl IntoIterator<Item = (P, usize)>,
        reset: impl IntoIterator<Item = P>,
        inhibitor: impl IntoIterator<Item = P>,
        output: impl IntoIterator<Item = (P, usize)>,
    ) -> Self {
        Transition::default()
            .with_inputs(input)
            .with_resets(reset)
            .with_inhibitors(inhibitor)
            .with_outputs(output)
    }

    pub fn with_input(mut self, place: P, weight: usize) -> Self {
        if weight > 0 {
            *self.input.entry(place).or_insert(0) += weight;
        }
        self
    }

    pub fn with_output(mut self, place: P, weight: usize) -> Self {
        if weight > 0 {
            *self.output.entry(place).or_insert(0) += weight;
        }
        self
    }

    pub fn with_reset(mut self, place: P) -> Self {
        self.reset.insert(place);
        self
    }

    pub fn with_inhibitor(mut self, place: P) -> Self {
        self.inhibitor.insert(place);
        self
    }

    pub fn with_inputs(self, arcs: impl IntoIterator<Item = (P, usize)>) -> Self {
        arcs.into_iter()
            .fold(self, |t, (place, weight)| t.with_input(place, weight))
    }

    pub fn with_outputs(self, arcs: impl IntoIterator<Item = (P, usize)>) -> Self {
        arcs.into_iter()
            .fold(self, |t, (place, weight)| t.with_output(place, weight))
    }

    pub fn with_resets(self, places: impl IntoIterator<Item = P>) -> Self {
        places.into_iter().fold(self, Transition::with_reset)
    }

    pub fn with_inhibitors(self, places: impl IntoIterator<Item = P>) -> Self {
        places.into_iter().fold(self, Transition::with_inhibitor)
    }

    /// Whether this transition can fire under `marking`: every input place
    /// must hold at least the required tokens and every inhibitor place must
    /// be empty. Pure; safe to call concurrently against a stable snapshot.
    pub fn is_enabled(&self, marking: &Marking<P>) -> bool {
        for (place, weight) in &self.input {
            if marking.tokens(place) < *weight {
                return false;
            }
        }
        self.inhibitor.iter().all(|place| !marking.contains(place))
    }

    /// Fires this transition against `marking`. The order is fixed: inputs
    /// are consumed first, then every reset place is cleared, then outputs
    /// are produced. A place that is both consumed from and reset ends up
    /// empty; a place that is both reset and produced to ends up holding
    /// exactly the output amount.
    ///
    /// The caller must have checked [Transition::is_enabled] on the same
    /// marking; inside the engine this is guaranteed by the grant protocol.
    pub fn apply(&self, marking: &mut Marking<P>) {
        for (place, weight) in &self.input {
            marking.remove_tokens(place, *weight);
        }
        for place in &self.reset {
            marking.clear_place(place);
        }
        for (place, weight) in &self.output {
            marking.add_tokens(place.clone(), *weight);
        }
    }

    pub fn input(&self) -> &BTreeMap<P, usize> {
        &self.input
    }

    pub fn output(&self) -> &BTreeMap<P, usize> {
        &self.output
    }

    pub fn reset(&self) -> &BTreeSet<P> {
        &self.reset
    }

    pub fn inhibitor(&self) -> &BTreeSet<P> {
        &self.inhibitor
    }
}

impl<P: Place> Default for Transition<P> {
    fn default() -> Self {
        Transition {
            input: BTreeMap::new(),
            output: BTreeMap::new(),
            reset: BTreeSet::new(),
            inhibitor: BTreeSet::new(),
        }
    }
}
