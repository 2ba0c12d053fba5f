use std::{collections::BTreeMap, fmt::Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::net::Place;

/// The token assignment of a net: every place maps to a strictly positive
/// token count, and a missing entry means the place is empty. Zero counts are
/// never stored, so two markings describing the same token distribution are
/// always structurally equal (and hash alike).
///
/// A marking is a plain value type. The engine clones it freely for snapshots
/// and reachability exploration; only [Transition::apply] mutates one, and the
/// live marking of a [PetriNet] is only ever mutated under the grant protocol.
///
/// [Transition::apply]: crate::net::transition::Transition::apply
/// [PetriNet]: crate::net::PetriNet
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marking<P: Place>(BTreeMap<P, usize>);

impl<P: Place> Marking<P> {
    pub fn new() -> Self {
        Marking(BTreeMap::new())
    }

    /// The token count of `place`, 0 when absent.
    pub fn tokens(&self, place: &P) -> usize {
        self.0.get(place).copied().unwrap_or(0)
    }

    /// Whether `place` holds any tokens.
    pub fn contains(&self, place: &P) -> bool {
        self.0.contains_key(place)
    }

    /// Sets the token count of `place`. Setting 0 removes the entry.
    pub fn set_tokens(&mut self, place: P, count: usize) {
        if count == 0 {
            self.0.remove(&place);
        } else {
            self.0.insert(place, count);
        }
    }

    pub fn add_tokens(&mut self, place: P, count: usize) {
        if count > 0 {
            *self.0.entry(place).or_insert(0) += count;
        }
    }

    /// Removes `count` tokens from `place`, dropping the entry when it hits
    /// 0. The caller must have checked sufficiency (enabled transitions
    /// always have); going below 0 is a logic error.
    pub fn remove_tokens(&mut self, place: &P, count: usize) {
        if count == 0 {
            return;
        }
        let current = self.tokens(place);
        debug_assert!(
            current >= count,
            "removing {count} tokens from a place holding {current}"
        );
        self.set_tokens(place.clone(), current.saturating_sub(count));
    }

    /// Empties `place` unconditionally, whatever it held before.
    pub fn clear_place(&mut self, place: &P) {
        self.0.remove(place);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of non-empty places.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&P, usize)> {
        self.0.iter().map(|(place, count)| (place, *count))
    }

    pub fn places(&self) -> impl Iterator<Item = &P> {
        self.0.keys()
    }

    pub fn to_json(&self) -> anyhow::Result<String>
    where
        P: Serialize,
    {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self>
    where
        P: serde::de::DeserializeOwned,
    {
        Ok(serde_json::from_str(json)?)
    }
}

impl<P: Place> FromIterator<(P, usize)> for Marking<P> {
    fn from_iter<I: IntoIterator<Item = (P, usize)>>(iter: I) -> Self {
        let mut marking = Marking::new();
        for (place, count) in iter {
            marking.add_tokens(place, count);
        }
        marking
    }
}

impl<P: Place> Display for Marking<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.0
                .iter()
                .map(|(place, count)| format!("{place:?}: {count}"))
                .join(", ")
        )
    }
}
