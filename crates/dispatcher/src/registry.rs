//! Priority-ordered subject registry

use std::sync::Arc;

use contracts::SubjectRef;

/// Subjects in dispatch order.
///
/// Invariants:
/// - non-decreasing by priority, `Last` subjects form a trailing suffix
/// - equal priorities keep insertion order
/// - a subject (by identity) appears at most once
#[derive(Default)]
pub struct SubjectRegistry {
    subjects: Vec<SubjectRef>,
}

impl SubjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, subject: &SubjectRef) -> bool {
        self.subjects.iter().any(|s| Arc::ptr_eq(s, subject))
    }

    /// Insert `subject` at its priority position.
    ///
    /// Returns the position, or `None` if the same subject was already registered.
    pub fn insert(&mut self, subject: SubjectRef) -> Option<usize> {
        if self.contains(&subject) {
            return None;
        }

        let priority = subject.dispatch_priority();
        let pos = self
            .subjects
            .iter()
            .position(|existing| priority.goes_before(existing.dispatch_priority()))
            .unwrap_or(self.subjects.len());
        self.subjects.insert(pos, subject);
        Some(pos)
    }

    pub fn as_slice(&self) -> &[SubjectRef] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSubject;
    use contracts::DispatchPriority;
    use rand::Rng;

    fn ids(registry: &SubjectRegistry) -> Vec<String> {
        registry
            .as_slice()
            .iter()
            .map(|s| s.id().to_string())
            .collect()
    }

    fn subject(id: &str, priority: DispatchPriority) -> SubjectRef {
        Arc::new(ScriptedSubject::historical(id, &[]).with_priority(priority))
    }

    #[test]
    fn last_priority_appends() {
        let mut registry = SubjectRegistry::new();
        registry.insert(subject("a", DispatchPriority::Last));
        registry.insert(subject("b", DispatchPriority::Last));
        assert_eq!(ids(&registry), vec!["a", "b"]);
    }

    #[test]
    fn levels_go_before_last_and_ties_stay_stable() {
        let mut registry = SubjectRegistry::new();
        registry.insert(subject("feed", DispatchPriority::Last));
        registry.insert(subject("bars_1", DispatchPriority::Level(3000)));
        registry.insert(subject("broker", DispatchPriority::Level(1000)));
        registry.insert(subject("bars_2", DispatchPriority::Level(3000)));
        registry.insert(subject("filter", DispatchPriority::Level(2000)));

        assert_eq!(
            ids(&registry),
            vec!["broker", "filter", "bars_1", "bars_2", "feed"]
        );
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut registry = SubjectRegistry::new();
        let a = subject("a", DispatchPriority::Level(1));
        let b = subject("b", DispatchPriority::Level(2));
        assert_eq!(registry.insert(a.clone()), Some(0));
        assert_eq!(registry.insert(b), Some(1));
        assert_eq!(registry.insert(a.clone()), None);

        assert_eq!(registry.len(), 2);
        assert_eq!(ids(&registry), vec!["a", "b"]);
    }

    #[test]
    fn same_id_different_instance_is_not_a_duplicate() {
        let mut registry = SubjectRegistry::new();
        registry.insert(subject("a", DispatchPriority::Last));
        registry.insert(subject("a", DispatchPriority::Last));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn random_insertions_keep_order_invariants() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let mut registry = SubjectRegistry::new();
            let count = rng.random_range(0..24);
            for n in 0..count {
                let priority = if rng.random_bool(0.3) {
                    DispatchPriority::Last
                } else {
                    DispatchPriority::Level(rng.random_range(0..5))
                };
                // Insertion index is encoded in the id to check stability.
                registry.insert(subject(&format!("{n:03}"), priority));
            }

            let entries: Vec<(DispatchPriority, String)> = registry
                .as_slice()
                .iter()
                .map(|s| (s.dispatch_priority(), s.id().to_string()))
                .collect();

            for pair in entries.windows(2) {
                let (p0, id0) = &pair[0];
                let (p1, id1) = &pair[1];
                assert!(p0 <= p1, "priority order broken: {entries:?}");
                if p0 == p1 {
                    assert!(id0 < id1, "insertion order broken: {entries:?}");
                }
            }
        }
    }
}
