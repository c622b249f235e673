use crate::types::Coords;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = "trailpin.sqlite";

#[derive(Parser, Debug)]
#[command(
    name = "trailpin",
    about = "Log running and cycling workouts pinned to map coordinates"
)]
pub struct Cli {
    /// SQLite file holding the saved workouts.
    #[arg(long, env = "TRAILPIN_DB", default_value = DEFAULT_DB, global = true)]
    pub db: PathBuf,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Record a workout at a map position.
    Add(AddArgs),

    /// List saved workouts, newest first.
    List {
        /// Also print id, date and coordinates.
        #[arg(long)]
        details: bool,
    },

    /// Show one workout and the position to center the map on.
    Show {
        /// Workout id as printed by `list --details`.
        id: String,
    },

    /// Write all workouts as GPX waypoints.
    ExportGpx {
        /// Output file.
        out: PathBuf,

        /// Current position, added as its own waypoint.
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        home: Option<Coords>,
    },

    /// Delete every saved workout.
    Reset,
}

/// Form fields are kept as text and validated by the library.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// running or cycling
    #[arg(long = "type", value_name = "TYPE", default_value = "running")]
    pub kind: String,

    /// Distance in km.
    #[arg(long, allow_hyphen_values = true)]
    pub distance: String,

    /// Duration in minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: String,

    /// Steps per minute (running).
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub cadence: String,

    /// Elevation gain in meters (cycling).
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub elevation: String,

    /// Where the workout happened.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub at: Coords,
}
