//! Domain Match Heuristic
//!
//! Server keys may store a canonicalized or prefixed form of what the user
//! typed (scheme or subdomain variants), so strict equality would
//! under-match. Normalize both sides, then accept equality or containment
//! in either direction. False positives only accelerate the success
//! notification; entitlement truth always comes from the backend snapshot.

/// Whether a user-typed domain and a server-reported key refer to the
/// same resource. Commutative and reflexive.
pub fn domains_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

/// How many expected domains have at least one matching server key
pub fn matched_count(expected: &[String], keys: &[&str]) -> u32 {
    expected
        .iter()
        .filter(|domain| keys.iter().any(|key| domains_match(domain, key)))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_reflexive() {
        assert!(domains_match("example.com", "example.com"));
    }

    #[test]
    fn test_match_is_commutative() {
        let pairs = [
            ("a.com", "www.a.com"),
            ("Example.COM", "example.com"),
            ("a.com", "b.org"),
        ];
        for (a, b) in pairs {
            assert_eq!(domains_match(a, b), domains_match(b, a));
        }
    }

    #[test]
    fn test_subdomain_variant_matches() {
        assert!(domains_match("a.com", "www.a.com"));
        assert!(domains_match("https://shop.example.com", "example.com"));
    }

    #[test]
    fn test_normalization() {
        assert!(domains_match("  Example.com ", "example.com"));
    }

    #[test]
    fn test_unrelated_domains_do_not_match() {
        assert!(!domains_match("a.com", "b.org"));
    }

    #[test]
    fn test_empty_input_never_matches() {
        assert!(!domains_match("", "example.com"));
        assert!(!domains_match("   ", "example.com"));
    }

    #[test]
    fn test_matched_count_counts_expected_side() {
        let expected = vec!["a.com".to_string(), "b.org".to_string()];
        let keys = vec!["www.a.com", "unrelated.net"];
        assert_eq!(matched_count(&expected, &keys), 1);
    }
}
