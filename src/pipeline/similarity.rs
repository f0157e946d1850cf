//! Pure name-similarity scoring used to rank match candidates.
//!
//! The score is a ranking signal only, never an equality test: exact
//! identifiers (URLs, place ids) are compared separately where identity
//! matters, and duplicate detection never goes through this module.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

/// Articles that carry no identity: "The Red Lion" and "Red Lion" are the
/// same pub. Ignored for token overlap unless nothing else remains.
static FILLER_TOKENS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["the", "a", "an"].into_iter().collect());

/// Case-folds and canonicalizes punctuation variants of a name.
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
        .replace('&', "and")
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn content_tokens(normalized: &str) -> HashSet<&str> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let content: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !FILLER_TOKENS.contains(t))
        .collect();
    let kept = if content.is_empty() { tokens } else { content };
    kept.into_iter().collect()
}

/// Scores two names' likeness in `[0, 1]`.
///
/// Symmetric, case-insensitive, deterministic, no I/O. `1.0` for names
/// identical after normalization; `0.0` for fully disjoint names. The
/// score is the better of a normalized edit distance (catches misspellings
/// of single-word names) and token-set overlap (catches reordered or
/// partially-quoted multi-word names).
pub fn similarity(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);
    if na == nb {
        return 1.0;
    }
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }

    let edit = normalized_levenshtein(&na, &nb);

    let tokens_a = content_tokens(&na);
    let tokens_b = content_tokens(&nb);
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    let overlap = intersection as f64 / union as f64;

    edit.max(overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_one() {
        assert_eq!(similarity("The Red Lion", "The Red Lion"), 1.0);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(similarity("the red lion", "THE RED LION"), 1.0);
    }

    #[test]
    fn punctuation_variants_score_one() {
        assert_eq!(similarity("Dog & Duck", "dog and duck"), 1.0);
        assert_eq!(similarity("Half-Moon", "half moon"), 1.0);
    }

    #[test]
    fn symmetric_for_arbitrary_pairs() {
        let pairs = [
            ("The Red Lion", "Red Lion Inn"),
            ("Troubadour", "Troubadore"),
            ("", "anything"),
            ("The Crows", "Counting Crows"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn disjoint_names_score_zero() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn misspellings_score_high() {
        assert!(similarity("Troubadour", "Troubadore") > 0.75);
    }

    #[test]
    fn leading_article_is_not_identity() {
        // Token overlap sees through the article.
        assert_eq!(similarity("The Red Lion", "Red Lion"), 1.0);
    }

    #[test]
    fn unrelated_multiword_names_score_low() {
        assert!(similarity("The Red Lion", "The Kings Arms") < 0.5);
    }

    #[test]
    fn bounded_by_zero_and_one() {
        let names = ["The Red Lion", "red lion", "Lion", "x", ""];
        for a in names {
            for b in names {
                let s = similarity(a, b);
                assert!((0.0..=1.0).contains(&s), "{a} vs {b} gave {s}");
            }
        }
    }
}
