//! Cache key namespace and TTL policy.
//!
//! Keys are shared with existing operational tooling and must not change
//! shape.

use emporium_core::{CategoryId, ProductId, UserId};
use std::time::Duration;

pub const PRODUCT_PREFIX: &str = "product:";
pub const CATEGORY_PREFIX: &str = "category:";
pub const SEARCH_PREFIX: &str = "search:";
pub const SESSION_PREFIX: &str = "session:";
pub const CART_PREFIX: &str = "cart:";
pub const STATS_PREFIX: &str = "stats:";

/// Singleton key holding the full category list.
pub const ALL_CATEGORIES: &str = "all_categories";

pub const PRODUCT_TTL: Duration = Duration::from_secs(60 * 60);
pub const CATEGORY_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const ALL_CATEGORIES_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const SEARCH_TTL: Duration = Duration::from_secs(30 * 60);
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const CART_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const STATS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[must_use]
pub fn product(id: ProductId) -> String {
    format!("{PRODUCT_PREFIX}{id}")
}

#[must_use]
pub fn category(id: CategoryId) -> String {
    format!("{CATEGORY_PREFIX}{id}")
}

/// Search results key, derived from the trimmed term.
#[must_use]
pub fn search(term: &str) -> String {
    format!("{SEARCH_PREFIX}{}", string_hash(term.trim()))
}

#[must_use]
pub fn session(username: &str) -> String {
    format!("{SESSION_PREFIX}{username}")
}

#[must_use]
pub fn cart(user_id: UserId) -> String {
    format!("{CART_PREFIX}{user_id}")
}

#[must_use]
pub fn stats(counter: &str) -> String {
    format!("{STATS_PREFIX}{counter}")
}

/// Pattern matching every key under `prefix`.
#[must_use]
pub fn partition(prefix: &str) -> String {
    format!("{prefix}*")
}

/// 32-bit polynomial string hash over UTF-16 code units
/// (`h = 31 * h + unit`, wrapping), identical to `java.lang.String#hashCode`.
#[must_use]
pub fn string_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0_i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_hash_known_values() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("hello"), 99_162_322);
        assert_eq!(string_hash("Aa"), string_hash("BB"));
        assert_eq!(string_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn test_search_key_trims_and_may_be_negative() {
        assert_eq!(search("  hello "), "search:99162322");
        assert_eq!(search("polygenelubricants"), "search:-2147483648");
    }

    #[test]
    fn test_entity_keys() {
        let id = ProductId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(product(id), "product:550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(session("alice"), "session:alice");
        assert_eq!(stats("product_cache_hits"), "stats:product_cache_hits");
        assert_eq!(partition(PRODUCT_PREFIX), "product:*");
    }

    #[test]
    fn test_ttl_policy() {
        assert_eq!(PRODUCT_TTL.as_secs(), 3_600);
        assert_eq!(CATEGORY_TTL.as_secs(), 7_200);
        assert_eq!(SEARCH_TTL.as_secs(), 1_800);
        assert_eq!(SESSION_TTL.as_secs(), 86_400);
        assert_eq!(CART_TTL.as_secs(), 7_200);
    }
}
