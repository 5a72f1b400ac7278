//! Query parameters for list and scoped requests.

/// Filters, pagination and scoping parameters for a request.
///
/// Parameters keep insertion order; `ids` may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    params: Vec<(&'static str, String)>,
}

impl ListOptions {
    /// Creates an empty set of options.
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Adds a parameter, replacing an earlier one with the same key.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.retain(|(k, _)| *k != key);
        self.params.push((key, value.into()));
        self
    }

    /// Adds a parameter when `value` is set and not empty.
    #[must_use]
    pub fn with_opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.with(key, value),
            _ => self,
        }
    }

    /// Adds one `ids` parameter per id.
    #[must_use]
    pub fn with_ids<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        for id in ids {
            self.params.push(("ids", id.as_ref().to_string()));
        }
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_limit(self, limit: usize) -> Self {
        self.with("limit", limit.to_string())
    }

    /// Sets the pagination cursor.
    #[must_use]
    pub fn with_starting_after(self, cursor: &str) -> Self {
        self.with("starting_after", cursor)
    }

    /// Returns the value of a parameter, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Query pairs in insertion order.
    #[must_use]
    pub fn as_query(&self) -> &[(&'static str, String)] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_replaces_existing_key() {
        let options = ListOptions::new().with_limit(10).with_limit(20);
        assert_eq!(options.get("limit"), Some("20"));
        assert_eq!(options.as_query().len(), 1);
    }

    #[test]
    fn test_with_opt_skips_empty() {
        let options = ListOptions::new()
            .with_opt("project_name", None)
            .with_opt("org_name", Some(""))
            .with_opt("project_id", Some("p1"));
        assert_eq!(options.as_query(), &[("project_id", String::from("p1"))]);
    }

    #[test]
    fn test_ids_repeat() {
        let options = ListOptions::new().with_ids(&["a", "b"]);
        assert_eq!(
            options.as_query(),
            &[("ids", String::from("a")), ("ids", String::from("b"))]
        );
    }
}
