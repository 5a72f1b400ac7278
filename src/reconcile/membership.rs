//! Membership set diffing.
//!
//! Role permissions, role inheritance and group members can only be changed
//! through `add_*` / `remove_*` lists on the Braintrust API, so updates
//! send the delta between the remote membership and the planned one.

use std::collections::HashSet;
use std::hash::Hash;

use crate::framework::Attr;

/// Minimal changes that turn a current membership into a desired one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDiff<T> {
    /// Desired elements missing from the current membership.
    pub to_add: Vec<T>,
    /// Current elements absent from the desired membership.
    pub to_remove: Vec<T>,
}

impl<T> Default for MembershipDiff<T> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_remove: Vec::new(),
        }
    }
}

impl<T> MembershipDiff<T> {
    /// Returns true if nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// `to_add` as an option, `None` when empty.
    #[must_use]
    pub fn additions(&self) -> Option<&[T]> {
        (!self.to_add.is_empty()).then_some(self.to_add.as_slice())
    }

    /// `to_remove` as an option, `None` when empty.
    #[must_use]
    pub fn removals(&self) -> Option<&[T]> {
        (!self.to_remove.is_empty()).then_some(self.to_remove.as_slice())
    }
}

/// Computes the add/remove sets reconciling `current` to `desired`.
///
/// Both inputs are treated as sets. Output order follows the first
/// occurrence in the respective input. An unknown `desired` means "leave
/// membership alone" and yields an empty diff; a null `desired` is the
/// empty set and removes everything.
#[must_use]
pub fn diff_membership<T>(current: &[T], desired: &Attr<Vec<T>>) -> MembershipDiff<T>
where
    T: Eq + Hash + Clone,
{
    let desired: &[T] = match desired {
        Attr::Unknown => return MembershipDiff::default(),
        Attr::Null => &[],
        Attr::Known(values) => values,
    };

    let current_set: HashSet<&T> = current.iter().collect();
    let desired_set: HashSet<&T> = desired.iter().collect();

    MembershipDiff {
        to_add: ordered_difference(desired, &current_set),
        to_remove: ordered_difference(current, &desired_set),
    }
}

fn ordered_difference<T>(items: &[T], exclude: &HashSet<&T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| !exclude.contains(item) && seen.insert(*item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn apply(current: &[String], diff: &MembershipDiff<String>) -> HashSet<String> {
        let mut set: HashSet<String> = current.iter().cloned().collect();
        set.extend(diff.to_add.iter().cloned());
        for removed in &diff.to_remove {
            set.remove(removed);
        }
        set
    }

    #[test]
    fn test_add_and_remove() {
        let current = strings(&["read", "delete"]);
        let desired = Attr::Known(strings(&["read", "update"]));

        let diff = diff_membership(&current, &desired);

        assert_eq!(diff.to_add, strings(&["update"]));
        assert_eq!(diff.to_remove, strings(&["delete"]));
    }

    #[test]
    fn test_equal_sets_produce_no_changes() {
        let current = strings(&["a", "b", "c"]);
        let desired = Attr::Known(strings(&["c", "a", "b", "a"]));

        let diff = diff_membership(&current, &desired);

        assert!(diff.is_empty());
        assert!(diff.additions().is_none());
        assert!(diff.removals().is_none());
    }

    #[test]
    fn test_unknown_desired_leaves_membership_alone() {
        let current = strings(&["a", "b"]);
        let diff = diff_membership(&current, &Attr::Unknown);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_known_empty_desired_removes_everything() {
        let current = strings(&["a", "b"]);
        let diff = diff_membership(&current, &Attr::Known(Vec::new()));
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove, current);
    }

    #[test]
    fn test_null_desired_removes_everything() {
        let current = strings(&["a"]);
        let diff = diff_membership(&current, &Attr::Null);
        assert_eq!(diff.to_remove, current);
    }

    #[test]
    fn test_duplicates_collapse_in_first_occurrence_order() {
        let current = strings(&["x", "y", "x", "z", "y"]);
        let desired = Attr::Known(strings(&["n", "m", "n", "x"]));

        let diff = diff_membership(&current, &desired);

        assert_eq!(diff.to_add, strings(&["n", "m"]));
        assert_eq!(diff.to_remove, strings(&["y", "z"]));
    }

    #[test]
    fn test_applying_diff_reaches_desired_set() {
        let cases = [
            (strings(&[]), strings(&["a"])),
            (strings(&["a", "b"]), strings(&["b", "c", "d"])),
            (strings(&["a", "a", "b"]), strings(&[])),
            (strings(&["p", "q"]), strings(&["q", "p"])),
        ];

        for (current, desired) in cases {
            let diff = diff_membership(&current, &Attr::Known(desired.clone()));
            let expected: HashSet<String> = desired.into_iter().collect();
            assert_eq!(apply(&current, &diff), expected);
        }
    }

    #[test]
    fn test_outputs_are_disjoint() {
        let current = strings(&["a", "b", "c"]);
        let desired = Attr::Known(strings(&["c", "d"]));
        let diff = diff_membership(&current, &desired);
        assert!(diff.to_add.iter().all(|item| !diff.to_remove.contains(item)));
    }
}
