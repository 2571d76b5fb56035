use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use earth_moon_fields::export::{self, writer_for_path};
use earth_moon_fields::numerics::units::j_to_mj;
use earth_moon_fields::pipeline::{self, RunOptions};
use earth_moon_fields::propulsion::BurnSummary;
use earth_moon_fields::scenario::Scenario;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Earth–Moon gravitational potential, force field and launch-burn altitude"
)]
struct Cli {
    /// Scenario file (TOML or YAML); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the grid resolution (samples per axis)
    #[arg(long, global = true)]
    resolution: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full sequence: potentials, force field, burn; renders figures
    Run {
        /// Directory for rendered PNG figures
        #[arg(long, default_value = "artifacts")]
        output_dir: PathBuf,

        /// Skip rendering
        #[arg(long)]
        no_render: bool,

        /// Also write CSV/JSON exports into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Combined Earth+Moon potential over the grid as CSV
    Potential {
        /// Destination CSV path (`-` for stdout)
        #[arg(long, default_value = "-")]
        output: PathBuf,

        /// Also write the on-axis potential curve to this CSV path
        #[arg(long)]
        curve: Option<PathBuf>,
    },
    /// Force on the command module over the grid as CSV
    Force {
        /// Destination CSV path (`-` for stdout)
        #[arg(long, default_value = "-")]
        output: PathBuf,
    },
    /// Burn time and altitude at burnout
    Burn {
        /// Write the burn summary as JSON to this path (`-` for stdout)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Number of telemetry samples in the summary
        #[arg(long, default_value_t = 50)]
        samples: usize,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let scenario = Scenario::load(cli.config.as_deref(), cli.resolution)
        .context("failed to load scenario")?;

    match cli.command {
        Command::Run {
            output_dir,
            no_render,
            export,
        } => {
            let options = RunOptions {
                figure_dir: (!no_render).then_some(output_dir),
                export_dir: export,
                ..RunOptions::default()
            };
            let report = pipeline::run(&scenario, &options)?;
            for path in report.figures.iter().chain(&report.exports) {
                info!(path = %path.display(), "wrote");
            }
            print_burn(&report.burn);
        }
        Command::Potential { output, curve } => {
            let grid = scenario.grid()?;
            let stage = pipeline::potential_stage(&scenario, &grid);
            if let Some((lo, hi)) = stage.combined_field.finite_range() {
                info!(
                    min_mj_kg = j_to_mj(lo),
                    max_mj_kg = j_to_mj(hi),
                    "combined potential range"
                );
            }
            let writer = writer_for_path(&output)
                .with_context(|| format!("failed to open {}", output.display()))?;
            export::fields::write_scalar_csv(writer, &grid, &stage.combined_field)?;
            if let Some(path) = curve {
                let writer = writer_for_path(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                export::fields::write_curve_csv(writer, &stage.combined_curve)?;
            }
        }
        Command::Force { output } => {
            let grid = scenario.grid()?;
            let field = pipeline::force_stage(&scenario, &grid);
            let writer = writer_for_path(&output)
                .with_context(|| format!("failed to open {}", output.display()))?;
            export::fields::write_vector_csv(writer, &grid, &field)?;
        }
        Command::Burn { json, samples } => {
            let summary = pipeline::burn_stage(&scenario, samples);
            let to_stdout = json.as_deref().is_some_and(|p| p.as_os_str() == "-");
            if let Some(path) = json {
                let writer = writer_for_path(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                export::burn::write_summary_json(writer, &scenario.burn, &summary)?;
            }
            // the JSON already owns stdout
            if !to_stdout {
                print_burn(&summary);
            }
        }
    }

    Ok(())
}

fn print_burn(summary: &BurnSummary) {
    println!("Burn time: {:.2} s", summary.burn_time_s);
    println!("Altitude at burnout: {:.1} m", summary.altitude_m);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
