//! Raw input events and the sorted, interned [`EventStream`] derived from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single timestamped, typed life event as supplied by the caller.
///
/// `time_ms` is a fractional-millisecond UTC timestamp rather than `i64` so
/// that a value which failed upstream parsing can be represented as `NaN`
/// and uniformly discarded alongside genuinely infinite timestamps, instead
/// of requiring a separate `Option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "typeName")]
    pub type_name: String,
    #[serde(rename = "timeMs")]
    pub time_ms: f64,
}

impl Event {
    pub fn new(type_name: impl Into<String>, time_ms: f64) -> Self {
        Self {
            type_name: type_name.into(),
            time_ms,
        }
    }

    fn is_usable(&self) -> bool {
        self.time_ms.is_finite() && !self.type_name.is_empty()
    }
}

/// A sorted, type-interned view over the events that fall inside the
/// observation windows.
///
/// `times` and `type_idx` are parallel arrays, sorted non-decreasing by
/// time; `type_names[type_idx[i]]` names the type of event `i`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventStream {
    pub times_ms: Vec<f64>,
    pub type_idx: Vec<u32>,
    pub type_names: Vec<String>,
    #[serde(skip)]
    name_to_idx: HashMap<String, u32>,
}

impl EventStream {
    /// Build a stream from arbitrary, possibly unsorted and malformed,
    /// events. Events with non-finite timestamps or empty type names are
    /// dropped. Type names are interned in sorted (alphabetical) order so
    /// the resulting index assignment does not depend on input order —
    /// required for permutation invariance.
    pub fn from_events(events: &[Event]) -> (Self, usize) {
        let mut usable: Vec<&Event> = events.iter().filter(|e| e.is_usable()).collect();
        let dropped = events.len() - usable.len();

        usable.sort_by(|a, b| {
            a.time_ms
                .partial_cmp(&b.time_ms)
                .unwrap()
                .then_with(|| a.type_name.cmp(&b.type_name))
        });

        let mut type_names: Vec<String> = usable.iter().map(|e| e.type_name.clone()).collect();
        type_names.sort();
        type_names.dedup();

        let name_to_idx: HashMap<String, u32> = type_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as u32))
            .collect();

        let times_ms = usable.iter().map(|e| e.time_ms).collect();
        let type_idx = usable
            .iter()
            .map(|e| name_to_idx[&e.type_name])
            .collect();

        (
            Self {
                times_ms,
                type_idx,
                type_names,
                name_to_idx,
            },
            dropped,
        )
    }

    pub fn len(&self) -> usize {
        self.times_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times_ms.is_empty()
    }

    pub fn num_types(&self) -> usize {
        self.type_names.len()
    }

    pub fn type_index(&self, name: &str) -> Option<u32> {
        self.name_to_idx.get(name).copied()
    }

    /// Number of events of the given type index.
    pub fn count_of(&self, type_idx: u32) -> usize {
        self.type_idx.iter().filter(|&&t| t == type_idx).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_finite_and_empty_names() {
        let events = vec![
            Event::new("a", 1.0),
            Event::new("", 2.0),
            Event::new("b", f64::NAN),
            Event::new("b", f64::INFINITY),
            Event::new("b", 3.0),
        ];
        let (stream, dropped) = EventStream::from_events(&events);
        assert_eq!(dropped, 3);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn sorted_by_time_then_name() {
        let events = vec![Event::new("b", 5.0), Event::new("a", 5.0), Event::new("c", 1.0)];
        let (stream, _) = EventStream::from_events(&events);
        assert_eq!(stream.times_ms, vec![1.0, 5.0, 5.0]);
        // at the tied time=5.0, "a" sorts before "b"
        let a_idx = stream.type_index("a").unwrap();
        let b_idx = stream.type_index("b").unwrap();
        assert_eq!(stream.type_idx[1], a_idx);
        assert_eq!(stream.type_idx[2], b_idx);
    }

    #[test]
    fn permutation_invariance_of_type_indices() {
        let events1 = vec![Event::new("b", 1.0), Event::new("a", 2.0), Event::new("c", 3.0)];
        let mut events2 = events1.clone();
        events2.reverse();

        let (s1, _) = EventStream::from_events(&events1);
        let (s2, _) = EventStream::from_events(&events2);
        assert_eq!(s1.type_names, s2.type_names);
        assert_eq!(s1.times_ms, s2.times_ms);
        assert_eq!(s1.type_idx, s2.type_idx);
    }
}
