use crate::dlog;
use crate::storage::{KeyValueStore, WorkoutRepository};
use crate::store::WorkoutStore;
use crate::types::{Coords, NewWorkout, ValidationError, Workout, WorkoutKind};
use anyhow::{Context, Result};

/// Raw text of the workout form, before any numeric coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutForm {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl WorkoutForm {
    /// Coerces the fields the selected kind uses and validates them.
    ///
    /// Blank reads as `0` and garbage as NaN, so both end up rejected.
    pub fn parse(&self) -> Result<NewWorkout, ValidationError> {
        let kind: WorkoutKind = self.kind.parse()?;
        let distance = coerce(&self.distance);
        let duration = coerce(&self.duration);
        match kind {
            WorkoutKind::Running => NewWorkout::running(distance, duration, coerce(&self.cadence)),
            WorkoutKind::Cycling => {
                NewWorkout::cycling(distance, duration, coerce(&self.elevation))
            }
        }
    }
}

fn coerce(field: &str) -> f64 {
    let s = field.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Location service is off or the user denied it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("geolocation unavailable: {reason}")]
pub struct GeolocationUnavailable {
    pub reason: String,
}

pub trait Geolocation {
    fn current_position(&self) -> Result<Coords, GeolocationUnavailable>;
}

/// A position known up front (or known to be missing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub Option<Coords>);

impl Geolocation for FixedPosition {
    fn current_position(&self) -> Result<Coords, GeolocationUnavailable> {
        self.0.ok_or_else(|| GeolocationUnavailable {
            reason: "no position configured".to_string(),
        })
    }
}

/// Asks `geo` once; unavailability is logged and turned into `None`.
pub fn locate_user(geo: &impl Geolocation) -> Option<Coords> {
    match geo.current_position() {
        Ok(c) => {
            dlog!("current position {c}");
            Some(c)
        }
        Err(e) => {
            tracing::warn!(err = %e, "continuing without current position");
            None
        }
    }
}

/// Owns the session's workouts and keeps the persisted snapshot in step with them.
pub struct App<S> {
    store: WorkoutStore,
    repo: WorkoutRepository<S>,
}

impl<S: KeyValueStore> App<S> {
    /// Restores whatever was saved; a missing or broken snapshot starts empty.
    pub fn start(kv: S) -> Self {
        let repo = WorkoutRepository::new(kv);
        let mut store = WorkoutStore::new();
        store.extend(repo.load());
        tracing::info!(workouts = store.len(), "session ready");
        Self { store, repo }
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn workouts(&self) -> &[Workout] {
        self.store.all()
    }

    /// Validates `form`, records the workout at `coords` and saves the snapshot.
    ///
    /// Validation or save failures leave the store untouched.
    pub fn new_workout(&mut self, form: &WorkoutForm, coords: Coords) -> Result<&Workout> {
        let input = form.parse()?;
        self.add(input, coords)
    }

    pub fn add(&mut self, input: NewWorkout, coords: Coords) -> Result<&Workout> {
        let workout = Workout::create(input, coords)?;
        let mut snapshot = self.store.all().to_vec();
        snapshot.push(workout);
        self.repo.save(&snapshot).context("Saving workouts")?;

        // Saved; only now does the session see it.
        let workout = snapshot.pop().context("snapshot is empty right after push")?;
        tracing::info!(
            id = workout.id(),
            kind = %workout.kind(),
            at = %coords,
            "workout added"
        );
        self.store.append(workout);
        self.store
            .last()
            .context("store is empty right after append")
    }

    /// Coordinates to center the map on for workout `id`.
    pub fn locate(&self, id: &str) -> Option<Coords> {
        let found = self.store.find_by_id(id).map(Workout::coords);
        if found.is_none() {
            dlog!("locate miss id={id}");
        }
        found
    }

    /// Drops every workout, in memory and in storage.
    pub fn reset(&mut self) -> Result<()> {
        self.repo.clear().context("Clearing saved workouts")?;
        let dropped = self.store.len();
        self.store.clear();
        tracing::info!(dropped, "workouts reset");
        Ok(())
    }

    pub fn into_backend(self) -> S {
        self.repo.into_backend()
    }
}
