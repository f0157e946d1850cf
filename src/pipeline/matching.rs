//! Turns ranked candidates into a bind-or-create decision.

use tracing::debug;

use crate::constants::MATCH_THRESHOLD;
use crate::domain::{MatchResult, RawEntityRef};
use crate::pipeline::resolver::Candidate;
use crate::pipeline::similarity::similarity;

/// An exact shared identifier is definitive proof of identity, stronger
/// than any name similarity.
fn shares_identifier(raw: &RawEntityRef, candidate: &Candidate) -> bool {
    fn both_eq(a: &Option<String>, b: &Option<String>) -> bool {
        matches!((a, b), (Some(x), Some(y)) if x == y)
    }
    both_eq(&raw.website_url, &candidate.website_url)
        || both_eq(&raw.facebook_url, &candidate.facebook_url)
        || both_eq(&raw.instagram_url, &candidate.instagram_url)
        || both_eq(&raw.place_id, &candidate.place_id)
}

fn score_candidate(raw: &RawEntityRef, candidate: &Candidate) -> f64 {
    if shares_identifier(raw, candidate) {
        1.0
    } else {
        similarity(&candidate.name, &raw.name)
    }
}

/// Binding requires strictly more than the threshold; a candidate at
/// exactly 0.70 is treated as new.
fn meets_threshold(score: f64) -> bool {
    score > MATCH_THRESHOLD
}

/// Decides between binding to an existing record and marking the entity
/// as new. Ties are broken by encounter order: the first-seen candidate
/// wins when scores are exactly equal.
pub fn decide(raw: &RawEntityRef, candidates: &[Candidate]) -> MatchResult {
    let mut best: Option<(&Candidate, f64)> = None;
    for candidate in candidates {
        let score = score_candidate(raw, candidate);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((candidate, score)) if meets_threshold(score) => {
            debug!(
                "Bound {:?} to {:?} at {:.2}",
                raw.name, candidate.name, score
            );
            if candidate.id.is_some() {
                MatchResult {
                    candidate_id: candidate.id,
                    candidate_name: candidate.name.clone(),
                    confidence: score,
                    is_new: false,
                    place: None,
                }
            } else {
                // The winner came from the external lookup: no stable id
                // to bind to, so the entity is still new, but the score
                // and geocoded payload carry over for the commit step.
                MatchResult {
                    candidate_id: None,
                    candidate_name: candidate.name.clone(),
                    confidence: score,
                    is_new: true,
                    place: candidate.place.clone(),
                }
            }
        }
        _ => {
            debug!("No candidate bound for {:?}, marking new", raw.name);
            let mut result = MatchResult::new_entity(&raw.name);
            // Keep the closest external suggestion for the reviewer even
            // when nothing scored well enough to adopt its name.
            result.place = candidates.iter().find_map(|c| c.place.clone());
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlaceCandidate;
    use uuid::Uuid;

    fn raw(name: &str) -> RawEntityRef {
        RawEntityRef {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn canonical(name: &str) -> Candidate {
        Candidate {
            id: Some(Uuid::new_v4()),
            name: name.to_string(),
            website_url: None,
            facebook_url: None,
            instagram_url: None,
            place_id: None,
            place: None,
        }
    }

    fn external(name: &str) -> Candidate {
        Candidate::from(PlaceCandidate {
            name: name.to_string(),
            formatted_address: "1 High Street".into(),
            latitude: 51.5,
            longitude: -0.1,
            place_id: format!("place-{name}"),
        })
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!meets_threshold(0.70));
        assert!(meets_threshold(0.7000001));
        assert!(!meets_threshold(0.69));
    }

    #[test]
    fn strong_match_binds() {
        let candidates = vec![canonical("The Kings Arms"), canonical("The Red Lion")];
        let result = decide(&raw("Red Lion"), &candidates);
        assert!(!result.is_new);
        assert_eq!(result.candidate_id, candidates[1].id);
        assert_eq!(result.candidate_name, "The Red Lion");
        assert!(result.confidence > MATCH_THRESHOLD);
    }

    #[test]
    fn weak_matches_mark_new() {
        let candidates = vec![canonical("The Kings Arms")];
        let result = decide(&raw("Red Lion"), &candidates);
        assert!(result.is_new);
        assert!(result.candidate_id.is_none());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.candidate_name, "Red Lion");
    }

    #[test]
    fn no_candidates_marks_new_with_zero_confidence() {
        let result = decide(&raw("Red Lion"), &[]);
        assert!(result.is_new);
        assert!(result.candidate_id.is_none());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn shared_website_url_forces_full_confidence() {
        let mut candidate = canonical("Completely Different Name");
        candidate.website_url = Some("https://redlion.example".into());
        let mut source = raw("Red Lion");
        source.website_url = Some("https://redlion.example".into());

        let result = decide(&source, &[candidate]);
        assert!(!result.is_new);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn first_seen_candidate_wins_exact_ties() {
        // Identical names score 1.0 for both; encounter order decides.
        let first = canonical("The Red Lion");
        let second = canonical("The Red Lion");
        let result = decide(&raw("The Red Lion"), &[first.clone(), second]);
        assert_eq!(result.candidate_id, first.id);
    }

    #[test]
    fn winning_place_candidate_stays_new_but_keeps_payload() {
        let result = decide(&raw("The Red Lion"), &[external("The Red Lion")]);
        assert!(result.is_new);
        assert!(result.candidate_id.is_none());
        assert_eq!(result.confidence, 1.0);
        assert!(result.place.is_some());
        assert_eq!(result.candidate_name, "The Red Lion");
    }

    #[test]
    fn losing_place_candidate_is_kept_as_suggestion() {
        let result = decide(&raw("Red Lion"), &[external("The Kings Arms")]);
        assert!(result.is_new);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.candidate_name, "Red Lion");
        assert!(result.place.is_some());
    }
}
