use strsim::normalized_levenshtein;

/// Similarity percentage: `(max_len - distance) / max_len * 100`, with the
/// distance counted over Unicode scalars. Two empty strings score 100.
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use strsim::levenshtein;

    #[test]
    fn test_similarity_percent() {
        assert_eq!(similarity_percent("paulkabila", "paulkabila"), 100.0);
        assert_eq!(similarity_percent("", ""), 100.0);
        assert_eq!(similarity_percent("abcd", ""), 0.0);
        // one substitution over ten characters
        assert!((similarity_percent("paulkabila", "paulkabela") - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_matches_distance_formula() {
        for (a, b) in [("kitten", "sitting"), ("flaw", "lawn"), ("mukendi", "mukenda")] {
            let max_len = a.chars().count().max(b.chars().count());
            let expected = (max_len - levenshtein(a, b)) as f64 / max_len as f64 * 100.0;
            assert!((similarity_percent(a, b) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_similarity_counts_characters_not_bytes() {
        // "é" is two bytes but one substitution
        assert!((similarity_percent("helene", "hélène") - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(similarity_percent("mukendi", "mukenda"), similarity_percent("mukenda", "mukendi"));
    }
}
