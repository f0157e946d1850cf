//! Candidate resolution: free-text name + entity kind in, ranked canonical
//! candidates out. Venues fall back to the external place lookup when
//! nothing canonical matches; artists never do. An artist that is not in
//! the canonical store is simply new.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::ports::{CanonicalStore, PlaceLookup};
use crate::constants::{MIN_ARTIST_TERM_LEN, MIN_VENUE_TERM_LEN, PLACE_RESULT_LIMIT};
use crate::domain::{Artist, EntityKind, PlaceCandidate, RawEntityRef, Venue};
use crate::error::Result;

/// A canonical or externally-sourced entity proposed as a possible match.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Present only for canonical records; place results have no stable id.
    pub id: Option<Uuid>,
    pub name: String,
    pub website_url: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub place_id: Option<String>,
    /// Geocoded payload, carried when this candidate came from the
    /// external place lookup.
    pub place: Option<PlaceCandidate>,
}

impl From<Venue> for Candidate {
    fn from(venue: Venue) -> Self {
        Self {
            id: venue.id,
            name: venue.name,
            website_url: venue.website_url,
            facebook_url: venue.facebook_url,
            instagram_url: None,
            place_id: venue.google_place_id,
            place: None,
        }
    }
}

impl From<Artist> for Candidate {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            website_url: artist.website_url,
            facebook_url: artist.facebook_url,
            instagram_url: artist.instagram_url,
            place_id: None,
            place: None,
        }
    }
}

impl From<PlaceCandidate> for Candidate {
    fn from(place: PlaceCandidate) -> Self {
        Self {
            id: None,
            name: place.name.clone(),
            website_url: None,
            facebook_url: None,
            instagram_url: None,
            place_id: Some(place.place_id.clone()),
            place: Some(place),
        }
    }
}

/// Resolves raw imported names to match candidates via the canonical
/// store's substring prefilter, with the venue-only external fallback.
pub struct CandidateResolver {
    store: Arc<dyn CanonicalStore>,
    places: Arc<dyn PlaceLookup>,
}

impl CandidateResolver {
    pub fn new(store: Arc<dyn CanonicalStore>, places: Arc<dyn PlaceLookup>) -> Self {
        Self { store, places }
    }

    /// Returns all candidates for a raw reference, in store encounter
    /// order. No confidence filtering happens here; thresholding is the
    /// match decision's responsibility.
    pub async fn resolve(&self, kind: EntityKind, raw: &RawEntityRef) -> Result<Vec<Candidate>> {
        let term = raw.name.trim();
        // Minimums are character counts, so accented short names do not
        // slip past on byte length.
        let term_chars = term.chars().count();
        match kind {
            EntityKind::Artist => {
                if term_chars < MIN_ARTIST_TERM_LEN {
                    warn!("Artist search term too short, skipping: {:?}", term);
                    return Ok(Vec::new());
                }
                let artists = self.store.search_artists(term).await?;
                debug!("Found {} canonical artist candidates for {:?}", artists.len(), term);
                // Artists are never auto-created from an external lookup;
                // no canonical hits means the artist is new.
                Ok(artists.into_iter().map(Candidate::from).collect())
            }
            EntityKind::Venue => {
                if term_chars < MIN_VENUE_TERM_LEN {
                    warn!("Venue search term too short, skipping: {:?}", term);
                    return Ok(Vec::new());
                }
                let venues = self.store.search_venues(term).await?;
                if !venues.is_empty() {
                    debug!("Found {} canonical venue candidates for {:?}", venues.len(), term);
                    return Ok(venues.into_iter().map(Candidate::from).collect());
                }

                // Nothing canonical: ask the place lookup for suggestions.
                let places = self.places.search(term).await?;
                debug!("Place lookup returned {} results for {:?}", places.len(), term);
                Ok(places
                    .into_iter()
                    .take(PLACE_RESULT_LIMIT)
                    .map(Candidate::from)
                    .collect())
            }
        }
    }
}
