//! Cache-key composition for address lookups
//!
//! Keys are composed as `neighborhood|district|city`, case-folded with
//! Turkish dotted/dotless-I handling. The neighborhood's trailing
//! administrative suffix is stripped first so variant spellings like
//! "Fenerbahçe Mahallesi" and "Fenerbahçe Mah." share one cache entry.

use std::fmt;

/// Trailing neighborhood suffixes stripped before composing a key
///
/// Compared against the case-folded last word of the neighborhood.
const NEIGHBORHOOD_SUFFIXES: &[&str] = &["mahallesi", "mah.", "mah", "mh.", "mh"];

/// Normalized composite key indexing the coordinate cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Composes a key from the raw form fields
    pub fn from_parts(city: &str, district: &str, neighborhood: &str) -> Self {
        let neighborhood = turkish_lowercase(neighborhood);
        Self(format!(
            "{}|{}|{}",
            strip_neighborhood_suffix(&neighborhood),
            turkish_lowercase(district),
            turkish_lowercase(city),
        ))
    }

    /// The composed key string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases text with Turkish casing rules
///
/// Plain `to_lowercase` maps `İ`→`i̇` (with a combining dot) and `I`→`i`;
/// Turkish wants `İ`→`i` and `I`→`ı`.
pub fn turkish_lowercase(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            'İ' => folded.push('i'),
            'I' => folded.push('ı'),
            _ => folded.extend(ch.to_lowercase()),
        }
    }
    folded
}

/// Drops a trailing administrative suffix from a case-folded neighborhood
fn strip_neighborhood_suffix(folded: &str) -> &str {
    let trimmed = folded.trim_end();
    match trimmed.rfind(char::is_whitespace) {
        Some(idx) if NEIGHBORHOOD_SUFFIXES.contains(&trimmed[idx..].trim_start()) => {
            trimmed[..idx].trim_end()
        }
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turkish_lowercase_dotted_and_dotless_i() {
        assert_eq!(turkish_lowercase("İstanbul"), "istanbul");
        assert_eq!(turkish_lowercase("ISPARTA"), "ısparta");
        assert_eq!(turkish_lowercase("Kadıköy"), "kadıköy");
        assert_eq!(turkish_lowercase("ÇEŞME"), "çeşme");
    }

    #[test]
    fn test_key_composition_order_and_separator() {
        let key = CacheKey::from_parts("İstanbul", "Kadıköy", "Moda");

        assert_eq!(key.as_str(), "moda|kadıköy|istanbul");
    }

    #[test]
    fn test_suffix_variants_collide_to_same_key() {
        let full = CacheKey::from_parts("İstanbul", "Kadıköy", "Fenerbahçe Mahallesi");
        let abbreviated = CacheKey::from_parts("İstanbul", "Kadıköy", "Fenerbahçe Mah.");
        let short = CacheKey::from_parts("İstanbul", "Kadıköy", "Fenerbahçe Mh.");
        let bare = CacheKey::from_parts("İstanbul", "Kadıköy", "Fenerbahçe");

        assert_eq!(full, bare);
        assert_eq!(abbreviated, bare);
        assert_eq!(short, bare);
        assert_eq!(bare.as_str(), "fenerbahçe|kadıköy|istanbul");
    }

    #[test]
    fn test_suffix_stripping_is_case_insensitive() {
        let upper = CacheKey::from_parts("İstanbul", "Kadıköy", "FENERBAHÇE MAHALLESİ");
        let lower = CacheKey::from_parts("İstanbul", "Kadıköy", "fenerbahçe mahallesi");

        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "fenerbahçe|kadıköy|istanbul");
    }

    #[test]
    fn test_non_suffix_last_word_is_kept() {
        let key = CacheKey::from_parts("İstanbul", "Üsküdar", "Kuzguncuk Sahili");

        assert_eq!(key.as_str(), "kuzguncuk sahili|üsküdar|istanbul");
    }

    #[test]
    fn test_suffix_only_neighborhood_is_kept() {
        // A lone "Mahallesi" has no preceding name to preserve; leave it alone.
        let key = CacheKey::from_parts("İstanbul", "Kadıköy", "Mahallesi");

        assert_eq!(key.as_str(), "mahallesi|kadıköy|istanbul");
    }

    #[test]
    fn test_empty_neighborhood_produces_empty_first_segment() {
        let key = CacheKey::from_parts("İstanbul", "Kadıköy", "");

        assert_eq!(key.as_str(), "|kadıköy|istanbul");
    }
}
