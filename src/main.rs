use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use gig_reconciler::app::ports::{CanonicalStore, PlaceLookup};
use gig_reconciler::config::Config;
use gig_reconciler::domain::{hhmm_time, Artist, Event, RawRow, RecordStatus, Venue};
use gig_reconciler::infra::place_lookup::{DisabledPlaceLookup, NominatimPlaceLookup};
use gig_reconciler::logging;
use gig_reconciler::pipeline::ReconciliationPipeline;
use gig_reconciler::storage::InMemoryCanonicalStore;

#[derive(Parser)]
#[command(name = "gig_reconciler")]
#[command(about = "Reconciles imported gig listings against canonical venues and artists")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a batch of imported rows and print the review summary
    Process {
        /// JSON file with the imported rows
        #[arg(long)]
        input: PathBuf,
        /// JSON file seeding the in-memory canonical store
        #[arg(long)]
        seed: Option<PathBuf>,
        /// Consult the external place lookup for unmatched venues
        #[arg(long)]
        online: bool,
    },
}

/// Seed data for the in-memory store. Events reference venues and artists
/// by name so seed files stay hand-writable.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    venues: Vec<Venue>,
    #[serde(default)]
    artists: Vec<Artist>,
    #[serde(default)]
    events: Vec<SeedEvent>,
}

#[derive(Debug, Deserialize)]
struct SeedEvent {
    name: String,
    venue: String,
    #[serde(default)]
    artists: Vec<String>,
    date: NaiveDate,
    #[serde(default, with = "hhmm_time")]
    time: Option<NaiveTime>,
}

async fn apply_seed(store: &dyn CanonicalStore, path: &Path) -> anyhow::Result<()> {
    let seed: SeedFile = serde_json::from_str(&fs::read_to_string(path)?)
        .with_context(|| format!("reading seed file {}", path.display()))?;

    let mut venue_ids = HashMap::new();
    for mut venue in seed.venues {
        store.create_venue(&mut venue).await?;
        venue_ids.insert(venue.name.clone(), venue.id.unwrap_or_default());
    }

    let mut artist_ids = HashMap::new();
    for mut artist in seed.artists {
        store.create_artist(&mut artist).await?;
        artist_ids.insert(artist.name.clone(), artist.id.unwrap_or_default());
    }

    for seed_event in seed.events {
        let Some(&venue_id) = venue_ids.get(&seed_event.venue) else {
            bail!("seed event {:?} references unknown venue {:?}", seed_event.name, seed_event.venue);
        };
        let mut event_artists = Vec::new();
        for artist_name in &seed_event.artists {
            let Some(&artist_id) = artist_ids.get(artist_name) else {
                bail!("seed event {:?} references unknown artist {:?}", seed_event.name, artist_name);
            };
            event_artists.push(artist_id);
        }
        let mut event = Event {
            id: None,
            name: seed_event.name,
            date: seed_event.date,
            start_time: seed_event.time,
            venue_id,
            artist_ids: event_artists,
            created_at: chrono::Utc::now(),
        };
        store.create_event(&mut event).await?;
    }

    info!(
        "Seeded store: {} venues, {} artists",
        venue_ids.len(),
        artist_ids.len()
    );
    Ok(())
}

fn status_icon(status: RecordStatus) -> &'static str {
    match status {
        RecordStatus::Pending => "…",
        RecordStatus::Processing => "⏳",
        RecordStatus::Ready => "✅",
        RecordStatus::Error => "❌",
    }
}

async fn run_process(input: PathBuf, seed: Option<PathBuf>, online: bool) -> anyhow::Result<()> {
    let config = Config::load()?;

    let store: Arc<dyn CanonicalStore> = Arc::new(InMemoryCanonicalStore::new());
    if let Some(seed_path) = seed {
        apply_seed(store.as_ref(), &seed_path).await?;
    }

    let places: Arc<dyn PlaceLookup> = if online {
        Arc::new(NominatimPlaceLookup::new(&config.place_lookup)?)
    } else {
        Arc::new(DisabledPlaceLookup)
    };

    let rows: Vec<RawRow> = serde_json::from_str(&fs::read_to_string(&input)?)
        .with_context(|| format!("reading batch file {}", input.display()))?;
    let total = rows.len();

    let mut pipeline = ReconciliationPipeline::new(store, places);
    let admitted = pipeline.load(rows);
    if admitted < total {
        println!("⚠️  Dropped {} rows with empty names", total - admitted);
    }

    let summary = pipeline.process_all().await;

    println!("\n📊 Reconciliation results:");
    for record in pipeline.records() {
        println!(
            "\n{} {}: {} at {} on {}",
            status_icon(record.status),
            record.id,
            record.artist.name,
            record.venue.name,
            record.date
        );
        if let Some(venue) = &record.venue_match {
            if venue.is_new {
                match &venue.place {
                    Some(place) => println!(
                        "   Venue: will create {:?} ({})",
                        venue.candidate_name, place.formatted_address
                    ),
                    None => println!("   Venue: will create {:?}", venue.candidate_name),
                }
            } else {
                println!(
                    "   Venue: matched {:?} ({}% confidence)",
                    venue.candidate_name,
                    (venue.display_confidence() * 100.0).round()
                );
            }
        }
        if let Some(artist) = &record.artist_match {
            if artist.is_new {
                println!("   Artist: will create {:?}", artist.candidate_name);
            } else {
                println!(
                    "   Artist: matched {:?} ({}% confidence)",
                    artist.candidate_name,
                    (artist.display_confidence() * 100.0).round()
                );
            }
        }
        for conflict in &record.conflicts {
            println!(
                "   ⚠️  {:?} conflict: {} has {:?} at {}",
                conflict.kind,
                conflict.subject_name,
                conflict.existing_event_name,
                conflict.existing_event_start_time
            );
        }
        if record.exact_duplicate {
            println!("   ⛔ Exact duplicate of an existing event, commit disabled");
        }
        if let Some(error) = &record.error {
            println!("   Error: {error}");
        }
    }

    println!("\n   Total: {}", summary.total);
    println!("   Ready: {}", summary.ready);
    println!("   Errors: {}", summary.errored);
    println!("   Blocked duplicates: {}", summary.exact_duplicates);
    println!("\n   Review buckets:");
    for (bucket, count) in &summary.bucket_counts {
        println!("   {bucket}: {count}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Process {
            input,
            seed,
            online,
        } => run_process(input, seed, online).await,
    }
}
