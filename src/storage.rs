//! In-memory canonical store for development and testing. The production
//! store lives behind the same port in whatever backend hosts the
//! calendar; nothing in the pipeline knows the difference.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::app::ports::CanonicalStore;
use crate::domain::{Artist, Event, Venue};
use crate::error::Result;

fn matches_term(name: &str, variants: &[String], term: &str) -> bool {
    let lowered = term.to_lowercase();
    name.to_lowercase().contains(&lowered)
        || variants
            .iter()
            .any(|v| v.to_lowercase().contains(&lowered))
}

#[derive(Default)]
pub struct InMemoryCanonicalStore {
    venues: Arc<Mutex<HashMap<Uuid, Venue>>>,
    artists: Arc<Mutex<HashMap<Uuid, Artist>>>,
    events: Arc<Mutex<HashMap<Uuid, Event>>>,
}

impl InMemoryCanonicalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CanonicalStore for InMemoryCanonicalStore {
    async fn search_venues(&self, term: &str) -> Result<Vec<Venue>> {
        let venues = self.venues.lock().unwrap();
        Ok(venues
            .values()
            .filter(|v| matches_term(&v.name, &v.name_variants, term))
            .cloned()
            .collect())
    }

    async fn search_artists(&self, term: &str) -> Result<Vec<Artist>> {
        let artists = self.artists.lock().unwrap();
        Ok(artists
            .values()
            .filter(|a| matches_term(&a.name, &a.name_variants, term))
            .cloned()
            .collect())
    }

    async fn venue_by_id(&self, id: Uuid) -> Result<Option<Venue>> {
        let venues = self.venues.lock().unwrap();
        Ok(venues.get(&id).cloned())
    }

    async fn artist_by_id(&self, id: Uuid) -> Result<Option<Artist>> {
        let artists = self.artists.lock().unwrap();
        Ok(artists.get(&id).cloned())
    }

    async fn events_at_venue_on(&self, venue_id: Uuid, date: NaiveDate) -> Result<Vec<Event>> {
        let events = self.events.lock().unwrap();
        Ok(events
            .values()
            .filter(|e| e.venue_id == venue_id && e.date == date)
            .cloned()
            .collect())
    }

    async fn events_with_artist_on(&self, artist_id: Uuid, date: NaiveDate) -> Result<Vec<Event>> {
        let events = self.events.lock().unwrap();
        Ok(events
            .values()
            .filter(|e| e.artist_ids.contains(&artist_id) && e.date == date)
            .cloned()
            .collect())
    }

    async fn create_venue(&self, venue: &mut Venue) -> Result<()> {
        let id = Uuid::new_v4();
        venue.id = Some(id);

        let mut venues = self.venues.lock().unwrap();
        venues.insert(id, venue.clone());

        debug!("Created venue: {} with id {}", venue.name, id);
        Ok(())
    }

    async fn create_artist(&self, artist: &mut Artist) -> Result<()> {
        let id = Uuid::new_v4();
        artist.id = Some(id);

        let mut artists = self.artists.lock().unwrap();
        artists.insert(id, artist.clone());

        debug!("Created artist: {} with id {}", artist.name, id);
        Ok(())
    }

    async fn create_event(&self, event: &mut Event) -> Result<()> {
        let id = Uuid::new_v4();
        event.id = Some(id);

        let mut events = self.events.lock().unwrap();
        events.insert(id, event.clone());

        debug!("Created event: {} with id {}", event.name, id);
        Ok(())
    }
}
