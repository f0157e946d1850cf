//! Fixed design constants for the reconciliation pipeline.
//! None of these are user-configurable; they define the matching and
//! conflict semantics the review UI is built around.

/// A candidate is bound to a canonical record only when its similarity
/// score is strictly greater than this.
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Two start times clash when their HHMM-integer difference is at most
/// this (e.g. |2030 - 1900| = 130, a clash; |2331 - 1900| = 431, not).
/// Back-to-back bookings within a few hours are almost always either a
/// data-entry duplicate or a genuinely clashing commitment.
pub const CONFLICT_WINDOW_HHMM: i32 = 400;

/// Cap on results requested from the external place lookup.
pub const PLACE_RESULT_LIMIT: usize = 5;

/// Minimum search-term lengths for the canonical-store prefilter.
/// Shorter terms return no candidates rather than scanning everything.
pub const MIN_VENUE_TERM_LEN: usize = 3;
pub const MIN_ARTIST_TERM_LEN: usize = 2;
