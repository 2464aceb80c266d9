//! Rule identifier generation.

/// Derives a rule id from its domain and path.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`, so the id is safe to
/// use as a URL path segment. Domain-level rules get the bare domain form.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(generate_rule_id("a.com", ""), "a_com");
/// assert_eq!(generate_rule_id("a.com", "/promo"), "a_com__promo");
/// ```
pub fn generate_rule_id(domain: &str, path: &str) -> String {
    let raw = if path.is_empty() {
        domain.to_string()
    } else {
        format!("{domain}_{path}")
    };

    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns `base`, or the first of `base_2`, `base_3`, ... that `in_use`
/// rejects.
///
/// Generated ids are lossy (`/a.b` and `/a_b` map to the same id), so callers
/// pass every id already owned by a rule at another key.
pub fn unique_rule_id(base: &str, mut in_use: impl FnMut(&str) -> bool) -> String {
    if !in_use(base) {
        return base.to_string();
    }

    (2u32..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !in_use(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_level_id() {
        assert_eq!(generate_rule_id("a.com", ""), "a_com");
        assert_eq!(generate_rule_id("go.example.org", ""), "go_example_org");
    }

    #[test]
    fn test_path_level_id() {
        assert_eq!(generate_rule_id("a.com", "/promo"), "a_com__promo");
        assert_eq!(generate_rule_id("a.com", "/a/b?c"), "a_com__a_b_c");
    }

    #[test]
    fn test_distinct_keys_get_distinct_ids() {
        assert_ne!(generate_rule_id("a.com", ""), generate_rule_id("a.com", "/x"));
    }

    #[test]
    fn test_lossy_ids_collide() {
        assert_eq!(
            generate_rule_id("a.com", "/a.b"),
            generate_rule_id("a.com", "/a_b")
        );
    }

    #[test]
    fn test_unique_rule_id_appends_suffix() {
        assert_eq!(unique_rule_id("a_com", |_| false), "a_com");

        let taken = ["a_com__a_b", "a_com__a_b_2"];
        assert_eq!(
            unique_rule_id("a_com__a_b", |id| taken.contains(&id)),
            "a_com__a_b_3"
        );
    }
}
