//! The reconciliation pipeline: advances each imported record through
//! `pending → processing → {ready | error}`, resolving its venue and
//! artist against the canonical store and flagging scheduling conflicts.
//!
//! One pipeline instance owns one batch. Batch processing is strictly
//! sequential: concurrent processing of the same unknown venue or artist
//! name across records could race to propose duplicate creations for what
//! is really one new entity appearing twice in the import.

pub mod conflicts;
pub mod matching;
pub mod resolver;
pub mod similarity;

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::{CanonicalStore, PlaceLookup};
use crate::domain::{
    EntityKind, ImportedRecord, MatchResult, RawRow, RecordStatus, ReviewBucket,
};
use crate::error::{ReconcileError, Result};
use conflicts::{ConflictDetector, ConflictReport};
use resolver::CandidateResolver;

/// Everything reconciliation produced for one record.
struct Reconciled {
    venue: MatchResult,
    artist: MatchResult,
    report: ConflictReport,
}

/// Totals over a processed batch, for the review UI header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub ready: usize,
    pub errored: usize,
    pub pending: usize,
    pub exact_duplicates: usize,
    pub bucket_counts: BTreeMap<ReviewBucket, usize>,
}

pub struct ReconciliationPipeline {
    resolver: CandidateResolver,
    detector: ConflictDetector,
    records: Vec<ImportedRecord>,
}

impl ReconciliationPipeline {
    pub fn new(store: Arc<dyn CanonicalStore>, places: Arc<dyn PlaceLookup>) -> Self {
        Self {
            resolver: CandidateResolver::new(store.clone(), places),
            detector: ConflictDetector::new(store),
            records: Vec::new(),
        }
    }

    /// Admits parsed rows into the batch as `Pending` records. Rows with
    /// an empty artist or venue name are dropped here so the invariant
    /// "raw names are non-empty" holds everywhere downstream. Returns the
    /// number of records admitted.
    pub fn load(&mut self, rows: Vec<RawRow>) -> usize {
        let mut admitted = 0;
        for row in rows {
            if row.artist.name.trim().is_empty() || row.venue.name.trim().is_empty() {
                warn!(
                    "Dropping row with empty name (artist: {:?}, venue: {:?})",
                    row.artist.name, row.venue.name
                );
                continue;
            }
            let id = format!("import-{}", self.records.len());
            self.records.push(ImportedRecord::from_row(id, row));
            admitted += 1;
        }
        info!("Admitted {} records into the batch", admitted);
        admitted
    }

    /// Read-only snapshot of the batch for the review UI.
    pub fn records(&self) -> &[ImportedRecord] {
        &self.records
    }

    /// Processes one `Pending` record to a terminal status. A lookup
    /// failure lands the record in `Error` with its message retained;
    /// that is not an `Err` from this method, which only fails for
    /// unknown ids or records not in a processable state.
    pub async fn process(&mut self, record_id: &str) -> Result<()> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == record_id)
            .ok_or_else(|| ReconcileError::UnknownRecord(record_id.to_string()))?;

        if self.records[idx].status != RecordStatus::Pending {
            return Err(ReconcileError::InvalidState {
                id: record_id.to_string(),
                status: self.records[idx].status.to_string(),
            });
        }

        self.records[idx].status = RecordStatus::Processing;
        let input = self.records[idx].clone();

        match self.reconcile(&input).await {
            Ok(outcome) => {
                let record = &mut self.records[idx];
                record.venue_match = Some(outcome.venue);
                record.artist_match = Some(outcome.artist);
                record.conflicts = outcome.report.conflicts;
                record.exact_duplicate = outcome.report.exact_duplicate;
                record.error = None;
                record.status = RecordStatus::Ready;
                info!("Record {} ready", record.id);
            }
            Err(e) => {
                // No partial matches: the record keeps nothing from a
                // failed attempt except the error message.
                let record = &mut self.records[idx];
                record.venue_match = None;
                record.artist_match = None;
                record.conflicts = Vec::new();
                record.exact_duplicate = false;
                record.error = Some(e.to_string());
                record.status = RecordStatus::Error;
                warn!("Record {} failed: {}", record.id, e);
            }
        }
        Ok(())
    }

    /// Puts an `Error` record back to `Pending` and processes it again.
    pub async fn retry(&mut self, record_id: &str) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| ReconcileError::UnknownRecord(record_id.to_string()))?;
        if record.status != RecordStatus::Error {
            return Err(ReconcileError::InvalidState {
                id: record_id.to_string(),
                status: record.status.to_string(),
            });
        }
        record.status = RecordStatus::Pending;
        self.process(record_id).await
    }

    /// Processes every `Pending` record, strictly one at a time. One
    /// record's failure never aborts the batch.
    pub async fn process_all(&mut self) -> BatchSummary {
        let pending: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.status == RecordStatus::Pending)
            .map(|r| r.id.clone())
            .collect();

        info!("Processing batch of {} pending records", pending.len());
        for id in pending {
            // Errors here are unknown-id/state races, impossible for ids
            // we just collected; record-level failures are captured on
            // the record itself.
            if let Err(e) = self.process(&id).await {
                warn!("Skipping record {}: {}", id, e);
            }
        }
        self.summary()
    }

    async fn reconcile(&self, record: &ImportedRecord) -> Result<Reconciled> {
        // Venue and artist resolution touch disjoint data and can run
        // concurrently; conflict detection must wait for both.
        let (venue_candidates, artist_candidates) = tokio::join!(
            self.resolver.resolve(EntityKind::Venue, &record.venue),
            self.resolver.resolve(EntityKind::Artist, &record.artist),
        );

        let venue = matching::decide(&record.venue, &venue_candidates?);
        let artist = matching::decide(&record.artist, &artist_candidates?);

        // Conflict checks against not-yet-existing entities are
        // meaningless and skipped outright, not treated as "no conflicts".
        let report = if venue.is_canonical() && artist.is_canonical() {
            self.detector
                .check(
                    &venue,
                    std::slice::from_ref(&artist),
                    record.date,
                    record.time,
                )
                .await?
        } else {
            ConflictReport::default()
        };

        Ok(Reconciled {
            venue,
            artist,
            report,
        })
    }

    /// Review bucket for a processed record, or `None` while it has no
    /// match results to classify.
    pub fn bucket_for(record: &ImportedRecord) -> Option<ReviewBucket> {
        let venue = record.venue_match.as_ref()?;
        let artist = record.artist_match.as_ref()?;
        let bucket = if venue.is_canonical() && artist.is_canonical() {
            ReviewBucket::Verified
        } else if artist.is_canonical() {
            ReviewBucket::VerifiedArtistNewVenue
        } else if venue.is_canonical() || venue.place.is_some() {
            ReviewBucket::NewArtistNewVenue
        } else {
            ReviewBucket::NoVenueMatch
        };
        Some(bucket)
    }

    /// Ready records grouped by review bucket, in bucket precedence order.
    pub fn grouped(&self) -> BTreeMap<ReviewBucket, Vec<&ImportedRecord>> {
        let mut groups: BTreeMap<ReviewBucket, Vec<&ImportedRecord>> = BTreeMap::new();
        for record in &self.records {
            if record.status != RecordStatus::Ready {
                continue;
            }
            if let Some(bucket) = Self::bucket_for(record) {
                groups.entry(bucket).or_default().push(record);
            }
        }
        groups
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.records.len(),
            ..Default::default()
        };
        for record in &self.records {
            match record.status {
                RecordStatus::Ready => summary.ready += 1,
                RecordStatus::Error => summary.errored += 1,
                RecordStatus::Pending | RecordStatus::Processing => summary.pending += 1,
            }
            if record.exact_duplicate {
                summary.exact_duplicates += 1;
            }
            if record.status == RecordStatus::Ready {
                if let Some(bucket) = Self::bucket_for(record) {
                    *summary.bucket_counts.entry(bucket).or_insert(0) += 1;
                }
            }
        }
        summary
    }
}
