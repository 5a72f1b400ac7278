//! Unique-match resolution over list results.

use tracing::debug;

use crate::error::LookupError;

/// An entity that can be soft-deleted.
pub trait SoftDeleted {
    /// Deletion timestamp; `None` or `""` means the entity is live.
    fn deleted_at(&self) -> Option<&str>;

    /// Returns true if the entity carries a deletion timestamp.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some_and(|at| !at.is_empty())
    }
}

/// An entity with a user-facing name.
pub trait Named: SoftDeleted {
    /// The entity name.
    fn name(&self) -> &str;
}

/// Selects the single live entity whose name equals `name` exactly.
///
/// # Errors
///
/// Returns [`LookupError::NotFound`] when no live entity matches and
/// [`LookupError::Ambiguous`] when more than one does.
pub fn resolve_unique<T: Named>(
    kind: &'static str,
    name: &str,
    candidates: impl IntoIterator<Item = T>,
) -> Result<T, LookupError> {
    resolve_unique_by(kind, "name", name, candidates, Named::name)
}

/// Selects the single live entity whose `key_fn` value equals `value`.
///
/// Matching is byte-for-byte: no case folding, no prefix matching.
///
/// # Errors
///
/// Returns [`LookupError::NotFound`] when no live entity matches and
/// [`LookupError::Ambiguous`] when more than one does.
pub fn resolve_unique_by<T, F>(
    kind: &'static str,
    key: &'static str,
    value: &str,
    candidates: impl IntoIterator<Item = T>,
    key_fn: F,
) -> Result<T, LookupError>
where
    T: SoftDeleted,
    F: Fn(&T) -> &str,
{
    let mut found: Option<T> = None;
    let mut count = 0_usize;

    for candidate in candidates {
        if candidate.is_deleted() || key_fn(&candidate) != value {
            continue;
        }
        count += 1;
        if found.is_none() {
            found = Some(candidate);
        }
    }

    debug!("{kind} lookup by {key} \"{value}\" matched {count} live entities");

    match (found, count) {
        (Some(entity), 1) => Ok(entity),
        (None, _) => Err(LookupError::NotFound {
            kind,
            key,
            value: value.to_string(),
        }),
        (Some(_), _) => Err(LookupError::Ambiguous {
            kind,
            key,
            value: value.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entity {
        id: &'static str,
        name: &'static str,
        deleted_at: Option<&'static str>,
    }

    impl SoftDeleted for Entity {
        fn deleted_at(&self) -> Option<&str> {
            self.deleted_at
        }
    }

    impl Named for Entity {
        fn name(&self) -> &str {
            self.name
        }
    }

    const fn live(id: &'static str, name: &'static str) -> Entity {
        Entity {
            id,
            name,
            deleted_at: None,
        }
    }

    const fn deleted(id: &'static str, name: &'static str) -> Entity {
        Entity {
            id,
            name,
            deleted_at: Some("2024-01-01T00:00:00Z"),
        }
    }

    #[test]
    fn test_single_match() {
        let candidates = vec![live("1", "alpha"), live("2", "beta")];
        let found = resolve_unique("project", "beta", candidates).unwrap();
        assert_eq!(found.id, "2");
    }

    #[test]
    fn test_no_match() {
        let candidates = vec![live("1", "alpha")];
        let err = resolve_unique("project", "gamma", candidates).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { kind: "project", .. }));
    }

    #[test]
    fn test_empty_candidates() {
        let err = resolve_unique("project", "alpha", Vec::<Entity>::new()).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_multiple_matches_are_ambiguous() {
        let candidates = vec![live("1", "alpha"), live("2", "alpha"), live("3", "alpha")];
        let err = resolve_unique("dataset", "alpha", candidates).unwrap_err();
        assert_eq!(
            err,
            LookupError::Ambiguous {
                kind: "dataset",
                key: "name",
                value: String::from("alpha"),
                count: 3,
            }
        );
    }

    #[test]
    fn test_deleted_entities_are_skipped() {
        let candidates = vec![deleted("1", "alpha"), live("2", "alpha")];
        let found = resolve_unique("project", "alpha", candidates).unwrap();
        assert_eq!(found.id, "2");
    }

    #[test]
    fn test_unique_deleted_match_is_not_found() {
        let candidates = vec![deleted("1", "alpha"), live("2", "beta")];
        let err = resolve_unique("project", "alpha", candidates).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_empty_deleted_at_counts_as_live() {
        let candidates = vec![Entity {
            id: "1",
            name: "alpha",
            deleted_at: Some(""),
        }];
        assert!(resolve_unique("project", "alpha", candidates).is_ok());
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let candidates = vec![live("1", "Alpha"), live("2", "alpha ")];
        let err = resolve_unique("project", "alpha", candidates).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_by_other_key() {
        let candidates = vec![live("1", "alpha"), live("2", "beta")];
        let found = resolve_unique_by("prompt", "slug", "1", candidates, |e| e.id).unwrap();
        assert_eq!(found.name, "alpha");
    }
}
