use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use stand_thinning_planner::{
    analysis::check_fit,
    io::{self, JsonModelStore, ModelStore},
    models::StandMetadata,
    simulation::{BearingSource, SimulationEngine},
    visualization::{
        print_base_lines_table, print_events_table, print_fit_report, print_stand_summary,
        print_thinning_chart,
    },
    EngineSettings,
};

#[derive(Parser)]
#[command(
    name = "thinning-planner",
    about = "Stand thinning planner - fit reference curves and simulate thinning schedules",
    version,
    author
)]
struct Cli {
    /// TOML file with engine settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit curve models from digitized chart lines and store them
    Fit {
        /// Training series (digitizer JSON or line,x,y CSV); may be repeated
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Chart name, used as the model file name
        #[arg(short, long)]
        name: String,

        /// Last age at which thinning is allowed
        #[arg(long)]
        age_thinning: f64,

        /// Last age at which thinning is allowed in a protective forest
        #[arg(long)]
        age_thinning_save: f64,

        #[arg(long)]
        area_code: Option<String>,

        #[arg(long)]
        breed_code: Option<String>,

        #[arg(long)]
        condition_code: Option<String>,

        /// Directory holding stored charts
        #[arg(short, long, default_value = "models")]
        models_dir: PathBuf,
    },

    /// Simulate a thinning schedule for a stored chart
    Simulate {
        /// Chart name
        #[arg(short, long)]
        name: String,

        /// Directory holding stored charts
        #[arg(short, long, default_value = "models")]
        models_dir: PathBuf,

        /// Age of a point the bearing line should pass through
        #[arg(long, requires = "bearing_y", conflicts_with = "bearing_parameter")]
        bearing_x: Option<f64>,

        /// Density of a point the bearing line should pass through
        #[arg(long, requires = "bearing_x")]
        bearing_y: Option<f64>,

        /// Growth start parameter of the bearing line
        #[arg(long)]
        bearing_parameter: Option<f64>,

        /// Apply the protective forest age limit to the plan
        #[arg(long)]
        protective: bool,

        /// First age of the simulation grid
        #[arg(long)]
        start: Option<f64>,

        /// Last age of the simulation grid
        #[arg(long)]
        end: Option<f64>,

        /// Age step of the simulation grid
        #[arg(long)]
        step: Option<f64>,

        /// Show every n-th grid age in the base line table
        #[arg(long, default_value = "10")]
        stride: usize,

        /// Write the planned events to this CSV file
        #[arg(long)]
        events_csv: Option<PathBuf>,

        /// Write the density track to this CSV file
        #[arg(long)]
        track_csv: Option<PathBuf>,
    },

    /// Check a stored chart against held-out test series
    Check {
        /// Chart name
        #[arg(short, long)]
        name: String,

        /// Directory holding stored charts
        #[arg(short, long, default_value = "models")]
        models_dir: PathBuf,

        /// Test series (digitizer JSON or line,x,y CSV); may be repeated
        #[arg(short, long, required = true)]
        test: Vec<PathBuf>,
    },
}

fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    match path {
        Some(path) => EngineSettings::from_file(path)
            .with_context(|| format!("reading settings from {}", path.display())),
        None => Ok(EngineSettings::default()),
    }
}

fn read_all_series(paths: &[PathBuf]) -> Result<Vec<io::SampleSeries>> {
    let mut series = Vec::new();
    for path in paths {
        let loaded =
            io::read_series(path).with_context(|| format!("reading {}", path.display()))?;
        series.extend(loaded);
    }
    Ok(series)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Fit {
            input,
            name,
            age_thinning,
            age_thinning_save,
            area_code,
            breed_code,
            condition_code,
            models_dir,
        } => {
            let mut stand = StandMetadata::new(&name, age_thinning, age_thinning_save);
            stand.update_codes(
                area_code.as_deref(),
                breed_code.as_deref(),
                condition_code.as_deref(),
            )?;

            let series = read_all_series(&input)?;
            if series.is_empty() {
                anyhow::bail!("No loadable chart lines found in the input files");
            }
            println!(
                "\n{}",
                format!("Fitting chart '{name}' from {} lines", series.len())
                    .bold()
                    .cyan()
            );

            let (registry, report) = io::prepare_models(&series, &mut stand, settings.degree)?;
            stand.validate()?;
            for (category, error) in &report.failed {
                eprintln!("{}: {category}: {error}", "Warning".yellow());
            }

            let store = JsonModelStore::new(&models_dir);
            store.save(&stand, &registry)?;
            print_stand_summary(&stand);
            println!(
                "\n{} Fitted {} models -> {}",
                "Success:".green().bold(),
                report.succeeded.len(),
                store.path_for(&name)?.display()
            );
        }

        Commands::Simulate {
            name,
            models_dir,
            bearing_x,
            bearing_y,
            bearing_parameter,
            protective,
            start,
            end,
            step,
            stride,
            events_csv,
            track_csv,
        } => {
            let store = JsonModelStore::new(&models_dir);
            let (stand, registry) = store.load(&name)?;
            let bearing = match (bearing_x, bearing_y, bearing_parameter) {
                (Some(x), Some(y), _) => BearingSource::Point { x, y },
                (_, _, Some(p)) => BearingSource::Parameter(p),
                _ => BearingSource::Midpoint,
            };

            let mut engine = SimulationEngine::new(&registry, stand, settings);
            engine.initialize_base_lines(start, end, step)?;
            engine.set_bearing_parameter(bearing)?;
            engine.initialize_bearing_line()?;
            engine.simulate_thinning(None, None)?;
            if protective {
                engine.set_protective(true);
                engine.check_save_forest()?;
            }

            println!(
                "\n{}",
                format!("Thinning plan for '{name}'").bold().cyan()
            );
            print_stand_summary(engine.stand());
            println!(
                "  Bearing parameter: {:.3}",
                engine.bearing_parameter()?
            );
            let bearing_line = engine.bearing_curve()?;
            print_base_lines_table(engine.base_lines()?, Some(&bearing_line.y), stride);
            print_events_table(engine.timeline()?);
            print_thinning_chart(engine.timeline()?);

            if let Some(path) = events_csv {
                io::write_events_csv(engine.timeline()?, &path)?;
                println!("{} events -> {}", "Wrote".green(), path.display());
            }
            if let Some(path) = track_csv {
                io::write_track_csv(engine.track()?, &path)?;
                println!("{} track -> {}", "Wrote".green(), path.display());
            }
        }

        Commands::Check {
            name,
            models_dir,
            test,
        } => {
            let store = JsonModelStore::new(&models_dir);
            let (_, registry) = store.load(&name)?;
            let series = read_all_series(&test)?;
            let report = check_fit(&registry, &series)?;
            print_fit_report(&report);
        }
    }

    Ok(())
}
