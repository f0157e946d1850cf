//! Scheduling-conflict detection against confirmed events.
//!
//! Proximity conflicts are advisory: the reviewer can still commit. An
//! exact duplicate (same venue, same full artist set, same date) is a
//! hard block surfaced as a flag, never as an error.

use chrono::{NaiveDate, NaiveTime, Timelike};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::app::ports::CanonicalStore;
use crate::constants::CONFLICT_WINDOW_HHMM;
use crate::domain::{Conflict, ConflictKind, Event, MatchResult};
use crate::error::Result;

/// Conflict-check outcome for one imported record.
#[derive(Debug, Clone, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    pub exact_duplicate: bool,
}

/// Represents "20:30" as 2030 so the 4-hour window is an integer compare.
fn to_hhmm(time: NaiveTime) -> i32 {
    (time.hour() * 100 + time.minute()) as i32
}

fn within_window(a: i32, b: i32) -> bool {
    (a - b).abs() <= CONFLICT_WINDOW_HHMM
}

fn display_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Flags temporal overlaps between an incoming record and the events
/// already booked for its canonical venue and artists.
pub struct ConflictDetector {
    store: Arc<dyn CanonicalStore>,
}

impl ConflictDetector {
    pub fn new(store: Arc<dyn CanonicalStore>) -> Self {
        Self { store }
    }

    /// Checks an incoming booking against existing events on `date`.
    ///
    /// Non-canonical venue or artists are skipped entirely: a record
    /// cannot conflict with events tied to an entity that does not yet
    /// exist. A record with no start time yields no proximity conflicts,
    /// but the (time-independent) duplicate check still runs.
    pub async fn check(
        &self,
        venue: &MatchResult,
        artists: &[MatchResult],
        date: NaiveDate,
        start_time: Option<NaiveTime>,
    ) -> Result<ConflictReport> {
        let mut report = ConflictReport::default();
        let incoming_time = start_time.map(to_hhmm);

        if let Some(venue_id) = venue.candidate_id {
            let existing = self.store.events_at_venue_on(venue_id, date).await?;
            debug!(
                "Checking {} existing events at venue {:?} on {}",
                existing.len(),
                venue.candidate_name,
                date
            );

            let incoming_artists: BTreeSet<Uuid> =
                artists.iter().filter_map(|a| a.candidate_id).collect();
            let all_artists_canonical =
                !artists.is_empty() && artists.iter().all(|a| a.candidate_id.is_some());

            for event in &existing {
                if all_artists_canonical && artist_set(event) == incoming_artists {
                    report.exact_duplicate = true;
                    report.conflicts.push(Conflict {
                        kind: ConflictKind::ExactDuplicate,
                        subject_name: venue.candidate_name.clone(),
                        existing_event_name: event.name.clone(),
                        existing_event_start_time: display_time(event.start_time),
                    });
                    continue;
                }
                if let Some(conflict) = proximity_conflict(
                    ConflictKind::Venue,
                    &venue.candidate_name,
                    incoming_time,
                    event,
                ) {
                    report.conflicts.push(conflict);
                }
            }
        }

        for artist in artists {
            let Some(artist_id) = artist.candidate_id else {
                continue;
            };
            let existing = self.store.events_with_artist_on(artist_id, date).await?;
            debug!(
                "Checking {} existing events for artist {:?} on {}",
                existing.len(),
                artist.candidate_name,
                date
            );
            for event in &existing {
                if let Some(conflict) = proximity_conflict(
                    ConflictKind::Artist,
                    &artist.candidate_name,
                    incoming_time,
                    event,
                ) {
                    report.conflicts.push(conflict);
                }
            }
        }

        Ok(report)
    }
}

fn artist_set(event: &Event) -> BTreeSet<Uuid> {
    event.artist_ids.iter().copied().collect()
}

fn proximity_conflict(
    kind: ConflictKind,
    subject_name: &str,
    incoming_time: Option<i32>,
    event: &Event,
) -> Option<Conflict> {
    let incoming = incoming_time?;
    let existing = event.start_time.map(to_hhmm)?;
    if !within_window(incoming, existing) {
        return None;
    }
    Some(Conflict {
        kind,
        subject_name: subject_name.to_string(),
        existing_event_name: event.name.clone(),
        existing_event_start_time: display_time(event.start_time),
    })
}
