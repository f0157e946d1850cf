use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Artist, Event, PlaceCandidate, Venue};
use crate::error::Result;

/// The canonical record store the pipeline reconciles against.
///
/// Search is a recall-oriented prefilter: case-insensitive substring match
/// on the name or any recorded name variant. Precision is enforced
/// downstream by similarity scoring, never here.
///
/// The reconciliation core only reads; the `create_*` operations exist for
/// the human-confirmed commit step (and for seeding dev stores).
#[async_trait]
pub trait CanonicalStore: Send + Sync {
    async fn search_venues(&self, term: &str) -> Result<Vec<Venue>>;
    async fn search_artists(&self, term: &str) -> Result<Vec<Artist>>;

    async fn venue_by_id(&self, id: Uuid) -> Result<Option<Venue>>;
    async fn artist_by_id(&self, id: Uuid) -> Result<Option<Artist>>;

    /// All confirmed events at a venue on a calendar date.
    async fn events_at_venue_on(&self, venue_id: Uuid, date: NaiveDate) -> Result<Vec<Event>>;
    /// All confirmed events featuring an artist on a calendar date.
    async fn events_with_artist_on(&self, artist_id: Uuid, date: NaiveDate) -> Result<Vec<Event>>;

    async fn create_venue(&self, venue: &mut Venue) -> Result<()>;
    async fn create_artist(&self, artist: &mut Artist) -> Result<()>;
    async fn create_event(&self, event: &mut Event) -> Result<()>;
}

/// External place/geocoding lookup, consulted only when no canonical venue
/// matches an imported name. Its own timeout policy governs; the pipeline
/// imposes none.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<PlaceCandidate>>;
}
