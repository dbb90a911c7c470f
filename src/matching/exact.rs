//! O(1) lookup from normalized place name to a previously resolved region.

use ahash::AHashMap;

use crate::normalize::normalize_name;

/// Reference-table index keyed by normalized name. Duplicate names are
/// deduplicated at build time with a first-occurrence-wins policy, so a
/// lookup can never be ambiguous.
#[derive(Debug, Default)]
pub struct ExactLookupIndex {
    regions: AHashMap<String, String>,
    keys_sorted: Vec<String>,
}

impl ExactLookupIndex {
    /// Build from `(name, region)` rows. Names are normalized here, once;
    /// the first row wins when two rows normalize to the same key.
    pub fn build<I, S, T>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: Into<String>,
    {
        let mut regions = AHashMap::new();
        for (name, region) in rows {
            let key = normalize_name(name.as_ref());
            regions.entry(key).or_insert_with(|| region.into());
        }
        let mut keys_sorted: Vec<String> = regions.keys().cloned().collect();
        keys_sorted.sort_unstable();
        Self { regions, keys_sorted }
    }

    /// Lookup by raw name; normalizes the query once.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.get(&normalize_name(name))
    }

    /// Lookup by an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.regions.get(key).map(String::as_str)
    }

    /// Normalized keys in lexicographic order. Fuzzy matching iterates this
    /// list so tie-breaking never depends on hash-map iteration order.
    pub fn keys_sorted(&self) -> &[String] {
        &self.keys_sorted
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let idx = ExactLookupIndex::build([("Bondi", "Eastern Suburbs")]);
        assert_eq!(idx.lookup("  BONDI "), Some("Eastern Suburbs"));
        assert_eq!(idx.lookup("bondi"), Some("Eastern Suburbs"));
        assert_eq!(idx.lookup("bondi beach"), None);
    }

    #[test]
    fn duplicate_keys_keep_first_occurrence() {
        let idx = ExactLookupIndex::build([("Richmond", "Inner East"), ("RICHMOND ", "Hawkesbury")]);
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.lookup("richmond"), Some("Inner East"));
    }

    #[test]
    fn keys_are_sorted() {
        let idx = ExactLookupIndex::build([("perth", "WA"), ("adelaide", "SA"), ("cairns", "QLD")]);
        assert_eq!(idx.keys_sorted(), &["adelaide", "cairns", "perth"]);
    }
}
