use crate::dlog;
use crate::types::{Coords, NewWorkout, ValidationError, Workout};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

/// Key the workout list lives under.
pub const WORKOUTS_KEY: &str = "workouts";

/// Flat string-to-string storage, the local-storage shape the adapter persists into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Key-value table in a SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let shown = path.display();
        let conn = Connection::open(path).with_context(|| format!("Opening SQLite DB: {shown}"))?;
        tracing::debug!(path = %shown, "opened key-value store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite DB")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
              key    TEXT PRIMARY KEY NOT NULL,
              value  TEXT NOT NULL
            );
            ",
        )
        .context("Ensuring key-value schema")?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Reading key {key:?}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
                INSERT INTO kv (key, value) VALUES (?1, ?2)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value
                ",
                params![key, value],
            )
            .with_context(|| format!("Writing key {key:?}"))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Removing key {key:?}"))?;
        Ok(())
    }
}

/// Why a stored snapshot could not be restored. Never surfaced to the user;
/// [`WorkoutRepository::load`] turns every variant into an empty list.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no saved workouts")]
    Absent,

    #[error("saved workouts are not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("saved workouts are not a list")]
    NotAList,

    #[error("reading storage failed: {0:#}")]
    Backend(anyhow::Error),
}

/// One persisted workout. Field names follow the blobs the browser app wrote,
/// so those still load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Record {
    Running {
        id: String,
        date: DateTime<FixedOffset>,
        distance: f64,
        duration: f64,
        coords: [f64; 2],
        cadence: f64,
        pace: Option<f64>,
        description: Option<String>,
    },
    Cycling {
        id: String,
        date: DateTime<FixedOffset>,
        distance: f64,
        duration: f64,
        coords: [f64; 2],
        elevation: f64,
        speed: Option<f64>,
        description: Option<String>,
    },
}

impl From<&Workout> for Record {
    fn from(w: &Workout) -> Self {
        let id = w.id().to_string();
        let date = w.created_at();
        let coords = w.coords().to_pair();
        let description = Some(w.description().to_string());
        match w.input() {
            NewWorkout::Running {
                distance_km,
                duration_min,
                cadence_spm,
            } => Self::Running {
                id,
                date,
                distance: distance_km,
                duration: duration_min,
                coords,
                cadence: cadence_spm,
                pace: w.pace_min_per_km(),
                description,
            },
            NewWorkout::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m,
            } => Self::Cycling {
                id,
                date,
                distance: distance_km,
                duration: duration_min,
                coords,
                elevation: elevation_gain_m,
                speed: w.speed_km_per_h(),
                description,
            },
        }
    }
}

impl TryFrom<Record> for Workout {
    type Error = ValidationError;

    // Stored pace/speed/description are ignored; `build` derives them again.
    fn try_from(r: Record) -> Result<Self, Self::Error> {
        match r {
            Record::Running {
                id,
                date,
                distance,
                duration,
                coords,
                cadence,
                ..
            } => Self::build(
                id,
                date,
                NewWorkout::Running {
                    distance_km: distance,
                    duration_min: duration,
                    cadence_spm: cadence,
                },
                Coords::from(coords),
            ),
            Record::Cycling {
                id,
                date,
                distance,
                duration,
                coords,
                elevation,
                ..
            } => Self::build(
                id,
                date,
                NewWorkout::Cycling {
                    distance_km: distance,
                    duration_min: duration,
                    elevation_gain_m: elevation,
                },
                Coords::from(coords),
            ),
        }
    }
}

/// Snapshots the workout list into a [`KeyValueStore`] and restores it.
pub struct WorkoutRepository<S> {
    kv: S,
}

impl<S: KeyValueStore> WorkoutRepository<S> {
    pub const fn new(kv: S) -> Self {
        Self { kv }
    }

    pub const fn backend(&self) -> &S {
        &self.kv
    }

    pub fn into_backend(self) -> S {
        self.kv
    }

    /// Replaces the stored snapshot with `workouts`.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<()> {
        let records: Vec<Record> = workouts.iter().map(Record::from).collect();
        let blob = serde_json::to_string(&records).context("Serializing workouts")?;
        self.kv.set(WORKOUTS_KEY, &blob)?;
        dlog!("saved workouts={} bytes={}", records.len(), blob.len());
        Ok(())
    }

    /// Restores the stored snapshot, or an empty list if there is nothing usable.
    pub fn load(&self) -> Vec<Workout> {
        match self.try_load() {
            Ok(workouts) => workouts,
            Err(LoadError::Absent) => {
                dlog!("no saved workouts");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(err = %e, "ignoring saved workouts");
                Vec::new()
            }
        }
    }

    /// Like [`Self::load`] but reports why nothing could be restored.
    ///
    /// Individual records that fail to parse or validate are skipped.
    pub fn try_load(&self) -> Result<Vec<Workout>, LoadError> {
        let blob = self
            .kv
            .get(WORKOUTS_KEY)
            .map_err(LoadError::Backend)?
            .ok_or(LoadError::Absent)?;

        let value: JsonValue = serde_json::from_str(&blob)?;
        let items = match value {
            JsonValue::Array(items) => items,
            JsonValue::Null => return Err(LoadError::Absent),
            _ => return Err(LoadError::NotAList),
        };

        let total = items.len();
        let mut out = Vec::with_capacity(total);
        for (idx, item) in items.into_iter().enumerate() {
            let record = match serde_json::from_value::<Record>(item) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(idx, err = %e, "skipping unreadable saved workout");
                    continue;
                }
            };
            match Workout::try_from(record) {
                Ok(w) => out.push(w),
                Err(e) => tracing::warn!(idx, err = %e, "skipping invalid saved workout"),
            }
        }

        dlog!("loaded workouts={} of {}", out.len(), total);
        Ok(out)
    }

    /// Removes the stored snapshot.
    pub fn clear(&mut self) -> Result<()> {
        self.kv.remove(WORKOUTS_KEY)
    }
}
