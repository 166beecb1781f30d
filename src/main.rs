// src/main.rs

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use rssi_distance_analysis::constants::{
    DEFAULT_EXPORT_SUBDIR, DEFAULT_HALL_READER, DEFAULT_MOVING_PREFIX, DEFAULT_OUTPUT_DIR,
    DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_POWER_DBM, DEFAULT_RETRY_MARKER, DEFAULT_ROOM_READER,
    DEFAULT_WALL_LABEL,
};
use rssi_distance_analysis::data_analysis::path_loss::PathLossModel;
use rssi_distance_analysis::data_input::log_parser::TranscriptMarkers;
use rssi_distance_analysis::plot_style::PlotStyle;
use rssi_distance_analysis::workflows::{
    run_accuracy, run_analyze, run_calibration, run_export, run_parse, run_scalability, AnalyzeOptions,
};

#[derive(Parser)]
#[command(name = "rssi-analysis", about = "RSSI ranging transcript parser and distance analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a ranging transcript into the experiment CSV files
    Parse {
        transcript: PathBuf,
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[arg(long, default_value = DEFAULT_WALL_LABEL)]
        wall_label: String,
        #[arg(long, default_value = DEFAULT_MOVING_PREFIX)]
        moving_prefix: String,
        #[arg(long, default_value = DEFAULT_RETRY_MARKER)]
        retry_marker: String,
    },
    /// Summarize the experiment CSV files and render their charts
    Analyze {
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        input_dir: PathBuf,
        /// Chart directory (defaults to the input directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Replace recorded distances with path-loss model estimates
        #[arg(long)]
        recompute: bool,
        #[command(flatten)]
        model: ModelArgs,
        /// Also render logarithmic |RSSI| variants
        #[arg(long)]
        log_scale: bool,
        /// Overlay a smoothed curve on the moving chart
        #[arg(long)]
        smooth: bool,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Write .npz figure bundles for an external plotting tool
    Export {
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        input_dir: PathBuf,
        /// Bundle directory (defaults to <input-dir>/fig_exports)
        #[arg(long)]
        export_dir: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Analyse a multi-tag accuracy test
    Accuracy {
        data: PathBuf,
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Analyse reader log volume over time
    Scalability {
        logs: PathBuf,
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[arg(long, default_value = DEFAULT_ROOM_READER)]
        room_reader: String,
        #[arg(long, default_value = DEFAULT_HALL_READER)]
        hall_reader: String,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Render the clear-path calibration curve
    Calibration {
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        input_dir: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Print the version
    Version,
}

#[derive(Args)]
struct ModelArgs {
    /// RSSI at 1 meter in dBm
    #[arg(long, default_value_t = DEFAULT_REFERENCE_POWER_DBM, allow_negative_numbers = true)]
    reference_power: f64,
    #[arg(long, default_value_t = DEFAULT_PATH_LOSS_EXPONENT)]
    path_loss_exponent: f64,
}

impl ModelArgs {
    fn model(&self) -> PathLossModel {
        PathLossModel::new(self.reference_power, self.path_loss_exponent)
    }
}

#[derive(Args)]
struct StyleArgs {
    /// TOML file overriding the built-in plot style
    #[arg(long = "style")]
    style_file: Option<PathBuf>,
}

impl StyleArgs {
    fn load(&self) -> Result<PlotStyle, Box<dyn Error>> {
        Ok(PlotStyle::load(self.style_file.as_deref())?)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            transcript,
            output_dir,
            wall_label,
            moving_prefix,
            retry_marker,
        } => {
            let markers = TranscriptMarkers {
                wall_label,
                moving_prefix,
                retry_marker,
            };
            run_parse(&transcript, &output_dir, &markers)?;
        }
        Commands::Analyze {
            input_dir,
            output_dir,
            recompute,
            model,
            log_scale,
            smooth,
            style,
        } => {
            let options = AnalyzeOptions {
                recompute: recompute.then(|| model.model()),
                log_scale,
                smooth,
            };
            let output_dir = output_dir.unwrap_or_else(|| input_dir.clone());
            run_analyze(&input_dir, &output_dir, &options, &style.load()?)?;
        }
        Commands::Export {
            input_dir,
            export_dir,
            style,
        } => {
            let export_dir = export_dir.unwrap_or_else(|| input_dir.join(DEFAULT_EXPORT_SUBDIR));
            run_export(&input_dir, &export_dir, &style.load()?)?;
        }
        Commands::Accuracy {
            data,
            output_dir,
            model,
            style,
        } => {
            run_accuracy(&data, &output_dir, &model.model(), &style.load()?)?;
        }
        Commands::Scalability {
            logs,
            output_dir,
            room_reader,
            hall_reader,
            style,
        } => {
            run_scalability(&logs, &output_dir, &room_reader, &hall_reader, &style.load()?)?;
        }
        Commands::Calibration {
            input_dir,
            output_dir,
            style,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| input_dir.clone());
            run_calibration(&input_dir, &output_dir, &style.load()?)?;
        }
        Commands::Version => {
            println!("rssi-analysis {}", rssi_distance_analysis::crate_version());
        }
    }

    Ok(())
}

// src/main.rs
