#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

use anyhow::Result;
use clap::Parser;
use trailpin::app::{App, FixedPosition, WorkoutForm, locate_user};
use trailpin::storage::SqliteStore;
use trailpin::{cli, gpx, render, utils};

#[macro_use]
extern crate trailpin;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let kv = SqliteStore::open(&cli.db)?;
    let mut app = App::start(kv);

    match cli.cmd {
        Some(cli::Cmd::Add(args)) => {
            dlog!("mode=add type={} at={}", args.kind, args.at);
            let form = WorkoutForm {
                kind: args.kind,
                distance: args.distance,
                duration: args.duration,
                cadence: args.cadence,
                elevation: args.elevation,
            };
            let w = app.new_workout(&form, args.at)?;
            println!("{}\t{}", w.id(), render::entry(w));
            Ok(())
        }
        Some(cli::Cmd::Show { id }) => {
            dlog!("mode=show id={id}");
            let Some(w) = app.store().find_by_id(&id) else {
                anyhow::bail!("No workout with id {id}");
            };
            println!("{}", render::popup(w));
            for (value, unit) in render::metrics(w) {
                println!("  {value} {unit}");
            }
            if let Some(c) = app.locate(&id) {
                println!("center {c}");
            }
            Ok(())
        }
        Some(cli::Cmd::ExportGpx { out, home }) => {
            dlog!("mode=export-gpx out={}", out.display());
            let home = locate_user(&FixedPosition(home));
            gpx::export_to_path(app.workouts(), home, &out)
        }
        Some(cli::Cmd::Reset) => {
            dlog!("mode=reset db={}", cli.db.display());
            app.reset()
        }
        Some(cli::Cmd::List { details }) => {
            print_list(&app, details);
            Ok(())
        }
        None => {
            print_list(&app, false);
            Ok(())
        }
    }
}

fn print_list(app: &App<SqliteStore>, details: bool) {
    dlog!("mode=list details={details}");
    if app.workouts().is_empty() {
        tracing::info!("no workouts yet; add one with `trailpin add`");
        return;
    }

    for w in render::list_order(app.workouts()) {
        if details {
            let date = w.created_at().to_rfc3339();
            println!("{}\t{date}\t{}\t{}", w.id(), w.coords(), render::entry(w));
        } else {
            println!("{}", render::entry(w));
        }
    }
}
