use crate::types::{Activity, Workout, WorkoutKind};

pub const fn icon(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => "🏃‍♂️",
        WorkoutKind::Cycling => "🚴‍♀️",
    }
}

/// Marker popup text.
pub fn popup(w: &Workout) -> String {
    format!("{} {}", icon(w.kind()), w.description())
}

/// `<value> <unit>` pairs shown under a list entry's title.
pub fn metrics(w: &Workout) -> Vec<(String, &'static str)> {
    let mut out = vec![
        (w.distance_km().to_string(), "km"),
        (w.duration_min().to_string(), "min"),
    ];
    match *w.activity() {
        Activity::Running {
            cadence_spm,
            pace_min_per_km,
        } => {
            out.push((format!("{pace_min_per_km:.1}"), "min/km"));
            out.push((cadence_spm.to_string(), "spm"));
        }
        Activity::Cycling {
            elevation_gain_m,
            speed_km_per_h,
        } => {
            out.push((format!("{speed_km_per_h:.1}"), "km/h"));
            out.push((elevation_gain_m.to_string(), "m"));
        }
    }
    out
}

pub fn metrics_line(w: &Workout) -> String {
    metrics(w)
        .into_iter()
        .map(|(v, unit)| format!("{v} {unit}"))
        .collect::<Vec<_>>()
        .join("  ")
}

/// One list entry: popup text followed by the metrics.
pub fn entry(w: &Workout) -> String {
    format!("{}\t{}", popup(w), metrics_line(w))
}

/// Newest first, as entries are inserted at the top of the list.
pub fn list_order(workouts: &[Workout]) -> impl Iterator<Item = &Workout> {
    workouts.iter().rev()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coords, NewWorkout};
    use chrono::{TimeZone, Utc};

    fn build(id: &str, input: NewWorkout) -> Workout {
        let t = Utc.with_ymd_and_hms(2024, 4, 14, 9, 0, 0).unwrap();
        Workout::build(id.into(), t, input, Coords::new(22.0, -55.0)).unwrap()
    }

    #[test]
    fn running_entry() {
        let w = build("1", NewWorkout::running(10.0, 47.0, 178.0).unwrap());
        assert_eq!(popup(&w), "🏃‍♂️ Running on April 14");
        assert_eq!(metrics_line(&w), "10 km  47 min  4.7 min/km  178 spm");
    }

    #[test]
    fn cycling_entry() {
        let w = build("2", NewWorkout::cycling(10.0, 14.0, 523.0).unwrap());
        assert_eq!(entry(&w), "🚴‍♀️ Cycling on April 14\t10 km  14 min  42.9 km/h  523 m");
    }

    #[test]
    fn list_is_newest_first() {
        let ws = vec![
            build("1", NewWorkout::running(1.0, 5.0, 170.0).unwrap()),
            build("2", NewWorkout::running(2.0, 10.0, 170.0).unwrap()),
        ];
        let ids: Vec<&str> = list_order(&ws).map(Workout::id).collect();
        assert_eq!(ids, ["2", "1"]);
    }
}
