use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_now() -> DateTime<Utc> {
    Utc::now()
}

/// The two reference sets an imported name can be reconciled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Venue,
    Artist,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Venue => write!(f, "venue"),
            EntityKind::Artist => write!(f, "artist"),
        }
    }
}

/// A venue in the canonical store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub name_variants: Vec<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub google_place_id: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub validated: bool,
    #[serde(default = "default_now")]
    pub created_at: DateTime<Utc>,
}

/// A performing artist in the canonical store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub name_variants: Vec<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "default_now")]
    pub created_at: DateTime<Utc>,
}

/// A confirmed event in the canonical store. The conflict detector only
/// reads these; creation happens at the human-confirmed commit step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_time")]
    pub start_time: Option<NaiveTime>,
    pub venue_id: Uuid,
    #[serde(default)]
    pub artist_ids: Vec<Uuid>,
    #[serde(default = "default_now")]
    pub created_at: DateTime<Utc>,
}

/// A geocoded result from the external place lookup. Non-canonical: it
/// has no stable id until the operator commits the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: String,
}

/// A raw venue or artist reference as it arrived from a spreadsheet row
/// or scraped page, before reconciliation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntityRef {
    pub name: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// One row of a batch import, as parsed by the (external) file/page
/// parsers. Rows with an empty artist or venue name never become records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub artist: RawEntityRef,
    pub venue: RawEntityRef,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub ticket_price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Reconciliation status of one imported record.
/// `Ready` and `Error` are terminal for an attempt; an `Error` record may
/// be retried, re-entering `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Processing,
    Ready,
    Error,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStatus::Pending => write!(f, "pending"),
            RecordStatus::Processing => write!(f, "processing"),
            RecordStatus::Ready => write!(f, "ready"),
            RecordStatus::Error => write!(f, "error"),
        }
    }
}

/// The outcome of a match decision for one entity kind.
///
/// Invariant: `is_new == candidate_id.is_none()`. A winning external
/// place candidate has no stable id to bind to, so it stays `is_new` but
/// keeps its score and geocoded payload for the commit step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: Option<Uuid>,
    pub candidate_name: String,
    pub confidence: f64,
    pub is_new: bool,
    #[serde(default)]
    pub place: Option<PlaceCandidate>,
}

impl MatchResult {
    /// New entity with nothing canonical chosen; the raw name carries over.
    pub fn new_entity(raw_name: &str) -> Self {
        Self {
            candidate_id: None,
            candidate_name: raw_name.to_string(),
            confidence: 0.0,
            is_new: true,
            place: None,
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.candidate_id.is_some()
    }

    /// Confidence rounded to two decimals, for display only.
    pub fn display_confidence(&self) -> f64 {
        (self.confidence * 100.0).round() / 100.0
    }
}

/// What kind of clash a conflict represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Venue,
    Artist,
    ExactDuplicate,
}

/// A scheduling clash surfaced to the human reviewer. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub subject_name: String,
    pub existing_event_name: String,
    pub existing_event_start_time: String,
}

/// Mutually-exclusive review categories for processed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewBucket {
    /// Venue and artist both bound to canonical records.
    Verified,
    /// Artist canonical, venue will be created.
    VerifiedArtistNewVenue,
    /// Neither canonical, but the venue at least resolved to a candidate.
    NewArtistNewVenue,
    /// The venue name matched nothing, canonical or external.
    NoVenueMatch,
}

impl std::fmt::Display for ReviewBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewBucket::Verified => write!(f, "verified/verified"),
            ReviewBucket::VerifiedArtistNewVenue => write!(f, "verified artist, new venue"),
            ReviewBucket::NewArtistNewVenue => write!(f, "new artist, new venue"),
            ReviewBucket::NoVenueMatch => write!(f, "no venue match"),
        }
    }
}

/// One imported row and everything reconciliation has learned about it.
/// Owned exclusively by the pipeline for the duration of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedRecord {
    /// Import-local id, not persisted.
    pub id: String,
    pub artist: RawEntityRef,
    pub venue: RawEntityRef,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub ticket_price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub venue_match: Option<MatchResult>,
    #[serde(default)]
    pub artist_match: Option<MatchResult>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    #[serde(default)]
    pub exact_duplicate: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ImportedRecord {
    pub fn from_row(id: String, row: RawRow) -> Self {
        Self {
            id,
            artist: row.artist,
            venue: row.venue,
            date: row.date,
            time: row.time,
            ticket_url: row.ticket_url,
            ticket_price: row.ticket_price,
            description: row.description,
            status: RecordStatus::Pending,
            venue_match: None,
            artist_match: None,
            conflicts: Vec::new(),
            exact_duplicate: false,
            error: None,
        }
    }

    /// An exact duplicate is a hard block; ordinary proximity conflicts
    /// are advisory and do not block the commit action.
    pub fn can_commit(&self) -> bool {
        self.status == RecordStatus::Ready && !self.exact_duplicate
    }
}

/// Serde helper for `HH:MM` wire times (also accepts `HH:MM:SS`).
pub mod hhmm_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_some(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveTime::parse_from_str(&s, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
