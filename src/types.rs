use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone};
use std::fmt;
use std::str::FromStr;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Rejected workout input. The store is never touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a positive number (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("unknown workout type: {0:?} (expected running or cycling)")]
    UnknownKind(String),

    #[error("coordinates must be LAT,LNG (got {0:?})")]
    BadCoords(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            _ => Err(ValidationError::UnknownKind(s.to_string())),
        }
    }
}

/// Latitude / longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub const fn to_pair(self) -> [f64; 2] {
        [self.lat, self.lng]
    }

    fn validate(self) -> Result<Self, ValidationError> {
        finite("latitude", self.lat)?;
        finite("longitude", self.lng)?;
        Ok(self)
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `LAT,LNG`.
impl FromStr for Coords {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ValidationError::BadCoords(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(bad)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| bad())?;
        let lng = lng.trim().parse::<f64>().map_err(|_| bad())?;
        Self::new(lat, lng).validate()
    }
}

/// Variant-specific payload together with its derived metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl Activity {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// Validated input for a workout that has not been timestamped yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewWorkout {
    Running {
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    },
    Cycling {
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    },
}

impl NewWorkout {
    pub fn running(
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        positive("distance", distance_km)?;
        positive("duration", duration_min)?;
        positive("cadence", cadence_spm)?;
        Ok(Self::Running {
            distance_km,
            duration_min,
            cadence_spm,
        })
    }

    pub fn cycling(
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        positive("distance", distance_km)?;
        positive("duration", duration_min)?;
        finite("elevation", elevation_gain_m)?;
        Ok(Self::Cycling {
            distance_km,
            duration_min,
            elevation_gain_m,
        })
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// A logged session. Immutable once built; every derived field is computed in the constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    created_at: DateTime<FixedOffset>,
    distance_km: f64,
    duration_min: f64,
    coords: Coords,
    activity: Activity,
    description: String,
}

impl Workout {
    /// Builds a workout stamped with the current local time.
    pub fn create(input: NewWorkout, coords: Coords) -> Result<Self, ValidationError> {
        let created_at = Local::now().fixed_offset();
        Self::build(workout_id(&created_at), created_at, input, coords)
    }

    pub fn create_running(
        distance_km: f64,
        duration_min: f64,
        coords: Coords,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        Self::create(
            NewWorkout::running(distance_km, duration_min, cadence_spm)?,
            coords,
        )
    }

    pub fn create_cycling(
        distance_km: f64,
        duration_min: f64,
        coords: Coords,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        Self::create(
            NewWorkout::cycling(distance_km, duration_min, elevation_gain_m)?,
            coords,
        )
    }

    /// Rebuilds a workout with a known identity (used when restoring from storage).
    ///
    /// Input is validated again and derived fields are recomputed.
    pub fn build(
        id: String,
        created_at: impl Into<DateTime<FixedOffset>>,
        input: NewWorkout,
        coords: Coords,
    ) -> Result<Self, ValidationError> {
        let created_at = created_at.into();
        let coords = coords.validate()?;
        let (distance_km, duration_min, activity) = match input {
            NewWorkout::Running {
                distance_km,
                duration_min,
                cadence_spm,
            } => {
                NewWorkout::running(distance_km, duration_min, cadence_spm)?;
                let activity = Activity::Running {
                    cadence_spm,
                    pace_min_per_km: pace_min_per_km(distance_km, duration_min),
                };
                (distance_km, duration_min, activity)
            }
            NewWorkout::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m,
            } => {
                NewWorkout::cycling(distance_km, duration_min, elevation_gain_m)?;
                let activity = Activity::Cycling {
                    elevation_gain_m,
                    speed_km_per_h: speed_km_per_h(distance_km, duration_min),
                };
                (distance_km, duration_min, activity)
            }
        };

        Ok(Self {
            description: describe(activity.kind(), &created_at),
            id,
            created_at,
            distance_km,
            duration_min,
            coords,
            activity,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time, in the UTC offset it was recorded with.
    pub const fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn pace_min_per_km(&self) -> Option<f64> {
        match self.activity {
            Activity::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            Activity::Cycling { .. } => None,
        }
    }

    pub const fn speed_km_per_h(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            Activity::Running { .. } => None,
        }
    }

    /// Base fields without the derived ones, suitable for [`Workout::build`].
    pub const fn input(&self) -> NewWorkout {
        match self.activity {
            Activity::Running { cadence_spm, .. } => NewWorkout::Running {
                distance_km: self.distance_km,
                duration_min: self.duration_min,
                cadence_spm,
            },
            Activity::Cycling {
                elevation_gain_m, ..
            } => NewWorkout::Cycling {
                distance_km: self.distance_km,
                duration_min: self.duration_min,
                elevation_gain_m,
            },
        }
    }
}

pub fn pace_min_per_km(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

pub fn speed_km_per_h(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

/// Last 10 digits of the millisecond timestamp. Two workouts created in the
/// same millisecond share an id.
pub fn workout_id<Tz: TimeZone>(created_at: &DateTime<Tz>) -> String {
    let ms = created_at.timestamp_millis().to_string();
    ms[ms.len().saturating_sub(10)..].to_string()
}

/// `"<Kind> on <Month> <day>"`, e.g. `Running on April 14`, in `date`'s own offset.
pub fn describe<Tz: TimeZone>(kind: WorkoutKind, date: &DateTime<Tz>) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} on {month} {}", kind.label(), date.day())
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn running_pace_is_duration_over_distance() {
        let w = Workout::create_running(10.0, 47.0, Coords::new(22.0, -55.0), 178.0).unwrap();
        assert_eq!(w.kind(), WorkoutKind::Running);
        assert_eq!(w.pace_min_per_km(), Some(4.7));
        assert_eq!(w.speed_km_per_h(), None);
    }

    #[test]
    fn cycling_speed_is_km_per_hour() {
        let w = Workout::create_cycling(10.0, 14.0, Coords::new(22.0, -55.0), 523.0).unwrap();
        assert_eq!(w.speed_km_per_h(), Some(42.857_142_857_142_854));
        assert_eq!(w.pace_min_per_km(), None);
    }

    #[test]
    fn derived_metrics_match_formulas() {
        for (d, t) in [(1.0, 1.0), (5.5, 31.2), (42.195, 180.0), (0.3, 0.7)] {
            let r = Workout::create_running(d, t, Coords::new(0.0, 0.0), 170.0).unwrap();
            assert_eq!(r.pace_min_per_km(), Some(t / d));
            let c = Workout::create_cycling(d, t, Coords::new(0.0, 0.0), 0.0).unwrap();
            assert_eq!(c.speed_km_per_h(), Some(d / (t / 60.0)));
        }
    }

    #[test]
    fn rejects_negative_distance() {
        let err = Workout::create_running(-1.0, 10.0, Coords::new(0.0, 0.0), 5.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotPositive {
                field: "distance",
                value: -1.0
            }
        );
    }

    #[test]
    fn rejects_zero_duration() {
        let err = Workout::create_cycling(10.0, 0.0, Coords::new(0.0, 0.0), 5.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotPositive {
                field: "duration",
                ..
            }
        ));
    }

    #[test]
    fn rejects_nan_and_infinite() {
        assert!(NewWorkout::running(f64::NAN, 10.0, 170.0).is_err());
        assert!(NewWorkout::running(10.0, f64::INFINITY, 170.0).is_err());
        assert!(NewWorkout::running(10.0, 10.0, 0.0).is_err());
        assert!(NewWorkout::cycling(10.0, 10.0, f64::NAN).is_err());
    }

    #[test]
    fn cycling_elevation_may_be_zero_or_negative() {
        assert!(NewWorkout::cycling(10.0, 30.0, 0.0).is_ok());
        assert!(NewWorkout::cycling(10.0, 30.0, -120.0).is_ok());
    }

    #[test]
    fn rejects_non_finite_coords() {
        let err = Workout::create_running(1.0, 1.0, Coords::new(f64::NAN, 0.0), 1.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotFinite {
                field: "latitude",
                ..
            }
        ));
    }

    #[test]
    fn description_uses_month_name_and_day() {
        assert_eq!(describe(WorkoutKind::Running, &at(2024, 4, 14)), "Running on April 14");
        assert_eq!(describe(WorkoutKind::Cycling, &at(2023, 1, 1)), "Cycling on January 1");
        assert_eq!(describe(WorkoutKind::Cycling, &at(2023, 12, 31)), "Cycling on December 31");
    }

    #[test]
    fn description_uses_recorded_local_day() {
        // 2024-04-15 02:30 UTC is still the evening of April 14 at UTC-5.
        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        let t = west.with_ymd_and_hms(2024, 4, 14, 21, 30, 0).unwrap();
        let input = NewWorkout::cycling(20.0, 60.0, 0.0).unwrap();
        let w = Workout::build("1".into(), t, input, Coords::new(0.0, 0.0)).unwrap();
        assert_eq!(w.description(), "Cycling on April 14");
        assert_eq!(w.created_at().offset(), &west);
        assert_eq!(describe(WorkoutKind::Cycling, &t.with_timezone(&Utc)), "Cycling on April 15");
    }

    #[test]
    fn id_is_last_ten_digits_of_millis() {
        let t = Utc.timestamp_millis_opt(1_713_100_000_123).unwrap();
        assert_eq!(workout_id(&t), "3100000123");
        let short = Utc.timestamp_millis_opt(42).unwrap();
        assert_eq!(workout_id(&short), "42");
    }

    #[test]
    fn build_keeps_identity_and_recomputes() {
        let t = at(2024, 6, 2);
        let input = NewWorkout::running(8.0, 40.0, 172.0).unwrap();
        let w = Workout::build("1234567890".into(), t, input, Coords::new(1.0, 2.0)).unwrap();
        assert_eq!(w.id(), "1234567890");
        assert_eq!(w.created_at(), t);
        assert_eq!(w.description(), "Running on June 2");
        assert_eq!(w.pace_min_per_km(), Some(5.0));
        assert_eq!(w.input(), input);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Running".parse::<WorkoutKind>().unwrap(), WorkoutKind::Running);
        assert_eq!(" cycling ".parse::<WorkoutKind>().unwrap(), WorkoutKind::Cycling);
        assert!("swimming".parse::<WorkoutKind>().is_err());
    }

    #[test]
    fn coords_parse_lat_lng() {
        assert_eq!("22,-55".parse::<Coords>().unwrap(), Coords::new(22.0, -55.0));
        assert_eq!(" 48.85 , 2.35 ".parse::<Coords>().unwrap(), Coords::new(48.85, 2.35));
        assert!("22".parse::<Coords>().is_err());
        assert!("a,b".parse::<Coords>().is_err());
        assert!("inf,0".parse::<Coords>().is_err());
    }
}
