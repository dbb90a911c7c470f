//! Place-name canonicalization applied by every matching stage.

/// Lowercase and trim a place name. Applied exactly once per stored key and
/// once per query key so that exact lookups succeed whenever a
/// case/whitespace-insensitive match exists.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_name("  Surry Hills "), "surry hills");
        assert_eq!(normalize_name("MELBOURNE"), "melbourne");
    }

    #[test]
    fn idempotent() {
        let once = normalize_name(" Coogee ");
        assert_eq!(normalize_name(&once), once);
    }
}
