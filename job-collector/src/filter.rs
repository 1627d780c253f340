use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use lazy_static::lazy_static;
use regex::Regex;

/// Lowercase and collapse runs of whitespace into single spaces
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn tokens(s: &str) -> HashSet<String> {
    lazy_static! {
        static ref WORD_RE: Regex = Regex::new(r"[a-zA-Z]+").unwrap();
    }
    WORD_RE
        .find_iter(&normalize(s))
        .map(|m| m.as_str().to_owned())
        .collect()
}

const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Token-overlap similarity between a found title and the target titles.
/// Deliberately lightweight, a candidate for embeddings later.
pub fn title_is_similar(found_title: &str, target_titles: &[String]) -> bool {
    let found = tokens(found_title);
    if found.is_empty() {
        return false;
    }
    target_titles.iter().any(|target| {
        let target_tokens = tokens(target);
        if target_tokens.is_empty() {
            return false;
        }
        let overlap = found.intersection(&target_tokens).count() as f64;
        overlap / target_tokens.len() as f64 >= SIMILARITY_THRESHOLD
    })
}

/// Duplicate-detection key over the fields that identify a listing
pub fn dedup_key(title: &str, company: &str, location: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    normalize(title).hash(&mut hasher);
    normalize(company).hash(&mut hasher);
    normalize(location).hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod test {
    use super::*;

    fn targets(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Senior   AI\tEngineer "), "senior ai engineer");
    }

    #[test]
    fn test_similar_title_is_kept() {
        let targets = targets(&["AI Engineer", "GenAI Engineer"]);
        assert!(title_is_similar("Senior AI Engineer", &targets));
        assert!(title_is_similar("ai engineer (remote)", &targets));
    }

    #[test]
    fn test_unrelated_title_is_discarded() {
        let targets = targets(&["AI Engineer"]);
        assert!(!title_is_similar("Accountant", &targets));
        assert!(!title_is_similar("", &targets));
    }

    #[test]
    fn test_partial_overlap_below_threshold() {
        // one of three target tokens present: 0.33 < 0.6
        let targets = targets(&["Generative AI Engineer"]);
        assert!(!title_is_similar("Data Engineer", &targets));
    }

    #[test]
    fn test_dedup_key_ignores_case_and_spacing() {
        let a = dedup_key("AI Engineer", "Acme  Corp", "Cairo, Egypt");
        let b = dedup_key("ai engineer", "acme corp", "cairo, egypt");
        assert_eq!(a, b);
        let c = dedup_key("AI Engineer", "Other Corp", "Cairo, Egypt");
        assert_ne!(a, c);
    }
}
