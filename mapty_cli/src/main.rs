mod terminal;

use clap::{Parser, Subcommand};
use mapty_core::*;
use std::path::PathBuf;
use terminal::{TerminalMap, TerminalPage};

#[derive(Parser)]
#[command(name = "mapty")]
#[command(about = "Map-based running and cycling log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Current position as LAT,LNG (overrides [location] in the config)
    #[arg(long, global = true, allow_hyphen_values = true)]
    position: Option<Coords>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stored workouts (default)
    List,

    /// Log a workout
    Add {
        /// Workout type (running, cycling)
        #[arg(long = "type")]
        workout_type: String,

        /// Distance in km
        #[arg(long, allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes
        #[arg(long, allow_hyphen_values = true)]
        duration: String,

        /// Cadence in steps/min (running)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in meters (cycling)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        elevation: String,

        /// Where the workout happened as LAT,LNG (defaults to the current position)
        #[arg(long, allow_hyphen_values = true)]
        at: Option<Coords>,
    },

    /// Center the map on a workout
    Show {
        /// Workout id
        id: String,
    },

    /// Delete every stored workout
    Reset,

    /// Export workouts to CSV
    Export {
        /// Output file (defaults to <data dir>/workouts.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

type TerminalApp = App<TerminalMap, TerminalPage, FileStore>;

fn main() -> Result<()> {
    // Initialize logging
    mapty_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let mut locator = StaticLocator::new(cli.position.or_else(|| config.home()));

    match cli.command {
        Some(Commands::Add {
            workout_type,
            distance,
            duration,
            cadence,
            elevation,
            at,
        }) => {
            let form = WorkoutForm {
                workout_type,
                distance,
                duration,
                cadence,
                elevation_gain: elevation,
            };
            cmd_add(&config, data_dir, &mut locator, form, at)
        }
        Some(Commands::Show { id }) => cmd_show(&config, data_dir, &mut locator, &id),
        Some(Commands::Reset) => cmd_reset(&config, data_dir, &mut locator),
        Some(Commands::Export { out }) => cmd_export(&config, data_dir, &mut locator, out),
        Some(Commands::List) | None => cmd_list(&config, data_dir, &mut locator),
    }
}

fn start_app(
    config: &Config,
    data_dir: PathBuf,
    locator: &mut StaticLocator,
    show_entries: bool,
) -> Result<TerminalApp> {
    let mut app = App::new(
        config.settings(),
        TerminalMap::default(),
        TerminalPage::new(show_entries),
        FileStore::new(data_dir),
    );
    app.start(locator)?;
    Ok(app)
}

fn cmd_list(config: &Config, data_dir: PathBuf, locator: &mut StaticLocator) -> Result<()> {
    let app = start_app(config, data_dir, locator, true)?;
    if app.workouts().is_empty() {
        println!("No workouts yet.");
    }
    Ok(())
}

fn cmd_add(
    config: &Config,
    data_dir: PathBuf,
    locator: &mut StaticLocator,
    form: WorkoutForm,
    at: Option<Coords>,
) -> Result<()> {
    let mut app = start_app(config, data_dir, locator, false)?;

    let click = at
        .or_else(|| app.map_center())
        .ok_or(Error::MapNotLoaded)?;
    if let Ok(workout_type) = form.workout_type.parse::<WorkoutType>() {
        app.handle_type_change(workout_type);
    }
    app.handle_map_click(click)?;

    let workout = app.submit_workout(&form)?;

    println!("✓ Workout logged!");
    println!("  {}", WorkoutEntry::for_workout(&workout));
    Ok(())
}

fn cmd_show(
    config: &Config,
    data_dir: PathBuf,
    locator: &mut StaticLocator,
    id: &str,
) -> Result<()> {
    let mut app = start_app(config, data_dir, locator, false)?;
    app.focus_workout(id)?;

    if let Some(workout) = app.find(id) {
        println!("  {}", WorkoutEntry::for_workout(workout));
    }
    Ok(())
}

fn cmd_reset(config: &Config, data_dir: PathBuf, locator: &mut StaticLocator) -> Result<()> {
    let mut app = start_app(config, data_dir, locator, false)?;
    let removed = app.workouts().len();
    app.reset(locator)?;

    println!("✓ Removed {} workouts", removed);
    Ok(())
}

fn cmd_export(
    config: &Config,
    data_dir: PathBuf,
    locator: &mut StaticLocator,
    out: Option<PathBuf>,
) -> Result<()> {
    let csv_path = out.unwrap_or_else(|| data_dir.join("workouts.csv"));
    let app = start_app(config, data_dir, locator, false)?;

    let count = export_csv(app.workouts(), &csv_path)?;

    println!("✓ Exported {} workouts", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}
