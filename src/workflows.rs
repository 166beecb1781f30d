// src/workflows.rs
// One entry point per command: load inputs, analyse, report, render.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::constants::DRIFT_WARNING_DBM_PER_CYCLE;
use crate::data_analysis::accuracy::{compare_filters, render_accuracy_report, rssi_drift, tag_accuracy};
use crate::data_analysis::path_loss::{recompute_distances, PathLossModel};
use crate::data_analysis::scalability::{cumulative_counts, reduction_report, render_reduction_report, ScanCapacity};
use crate::data_analysis::summary::{render_summary_table, summarize, GroupKey, SummaryRow};
use crate::data_input::accuracy_log::read_accuracy_csv;
use crate::data_input::experiment_csv::{read_experiment_csv, write_experiment_csvs};
use crate::data_input::location_log::read_location_csv;
use crate::data_input::log_data::{ExperimentKind, Observation};
use crate::data_input::log_parser::{parse_transcript_file, TranscriptMarkers};
use crate::error::AnalysisError;
use crate::figure_export::export_experiment_bundles;
use crate::plot_functions::plot_calibration_curve::plot_calibration_curve;
use crate::plot_functions::plot_cumulative_logs::plot_cumulative_logs;
use crate::plot_functions::plot_error_bars::plot_rssi_error_bars;
use crate::plot_functions::plot_error_histogram::plot_error_histogram;
use crate::plot_functions::plot_estimated_distance::plot_estimated_distance;
use crate::plot_functions::plot_moving::plot_moving_experiment;
use crate::plot_functions::plot_raw_vs_kalman::plot_raw_vs_kalman;
use crate::plot_functions::plot_regression::plot_regression;
use crate::plot_functions::plot_rssi_bands::plot_rssi_bands;
use crate::plot_functions::plot_success_failed::plot_success_failed_markers;
use crate::plot_style::PlotStyle;

/// Options of the `analyze` command.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub recompute: Option<PathLossModel>,
    pub log_scale: bool,
    pub smooth: bool,
}

fn group_key(kind: ExperimentKind) -> GroupKey {
    match kind {
        ExperimentKind::Moving => GroupKey::ReadingIndex,
        _ => GroupKey::Distance,
    }
}

fn create_dir(dir: &Path) -> Result<(), AnalysisError> {
    fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))
}

/// Loads every experiment CSV present in `input_dir`. Missing files are
/// reported and skipped so a transcript without a moving run still works.
pub fn load_experiments(input_dir: &Path) -> Result<Vec<(ExperimentKind, Vec<Observation>)>, AnalysisError> {
    let mut loaded = Vec::new();
    for kind in ExperimentKind::ALL {
        let path = input_dir.join(kind.csv_file_name());
        if !path.is_file() {
            warn!("No {} data: '{}' not found", kind.title(), path.display());
            continue;
        }
        loaded.push((kind, read_experiment_csv(input_dir, kind)?));
    }
    if loaded.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "experiment CSV files in '{}'",
            input_dir.display()
        )));
    }
    Ok(loaded)
}

/// Parses a transcript and writes the three experiment CSVs.
pub fn run_parse(
    transcript: &Path,
    output_dir: &Path,
    markers: &TranscriptMarkers,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let parsed = parse_transcript_file(transcript, markers)?;
    for error in &parsed.errors {
        warn!("{error}");
    }

    let written = write_experiment_csvs(&parsed.experiments, output_dir)?;
    println!("Successfully parsed the log file and saved the data to:");
    for (kind, path) in ExperimentKind::ALL.iter().zip(&written) {
        println!(
            "  {:<10} {} readings -> {}",
            kind.label(),
            parsed.experiments.reading_count(*kind),
            path.display()
        );
    }
    if !parsed.errors.is_empty() {
        println!("  {} malformed line(s) skipped", parsed.errors.len());
    }
    Ok(written)
}

/// Summarises each experiment, prints the tables and renders its charts.
pub fn run_analyze(
    input_dir: &Path,
    output_dir: &Path,
    options: &AnalyzeOptions,
    style: &PlotStyle,
) -> Result<(), Box<dyn Error>> {
    create_dir(output_dir)?;

    for (kind, mut observations) in load_experiments(input_dir)? {
        if let Some(model) = &options.recompute {
            info!(
                "Recomputing {} distances (P0 = {} dBm, n = {})",
                kind.label(),
                model.reference_power_dbm,
                model.path_loss_exponent
            );
            recompute_distances(&mut observations, model);
        }

        let key = group_key(kind);
        let rows = summarize(&observations, key);
        println!("\n{} Summary:", kind.title());
        print!("{}", render_summary_table(&rows, key));

        match kind {
            ExperimentKind::Moving => {
                plot_moving_experiment(&observations, &rows, style, output_dir, false, options.smooth)?;
                if options.log_scale {
                    plot_moving_experiment(&observations, &rows, style, output_dir, true, options.smooth)?;
                }
            }
            _ => {
                plot_rssi_error_bars(kind, &rows, style, output_dir, false)?;
                if options.log_scale {
                    plot_rssi_error_bars(kind, &rows, style, output_dir, true)?;
                }
                plot_success_failed_markers(kind, &observations, &rows, style, output_dir)?;
                plot_regression(kind, &observations, style, output_dir)?;
            }
        }
    }
    Ok(())
}

/// Writes the `.npz` figure bundles of every available experiment.
pub fn run_export(input_dir: &Path, export_dir: &Path, style: &PlotStyle) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    for (kind, observations) in load_experiments(input_dir)? {
        let rows = summarize(&observations, group_key(kind));
        written.extend(export_experiment_bundles(kind, &observations, &rows, style, export_dir)?);
    }
    println!("Exported {} figure bundle(s):", written.len());
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(written)
}

/// Per-tag accuracy, raw vs Kalman comparison and drift check of an accuracy test.
pub fn run_accuracy(
    data_file: &Path,
    output_dir: &Path,
    model: &PathLossModel,
    style: &PlotStyle,
) -> Result<(), Box<dyn Error>> {
    let samples = read_accuracy_csv(data_file)?;
    if samples.is_empty() {
        return Err(AnalysisError::NoData(format!("accuracy samples in '{}'", data_file.display())).into());
    }
    create_dir(output_dir)?;

    let tags = tag_accuracy(&samples);
    let comparison = compare_filters(&samples, model);
    let drift = rssi_drift(&samples);
    print!("{}", render_accuracy_report(&tags, &comparison, drift.as_ref()));
    if let Some(d) = drift.as_ref().filter(|d| d.drifting) {
        warn!(
            "RSSI drift of {:.3} dBm/cycle exceeds {DRIFT_WARNING_DBM_PER_CYCLE} dBm/cycle",
            d.drift_rate
        );
    }

    plot_estimated_distance(&samples, style, output_dir)?;
    plot_raw_vs_kalman(&samples, style, output_dir)?;
    plot_rssi_bands(&samples, style, output_dir)?;
    plot_error_histogram(&comparison, style, output_dir)?;
    Ok(())
}

/// Cumulative log volume of the two readers and the reduction achieved
/// against scanning without deduplication.
pub fn run_scalability(
    log_file: &Path,
    output_dir: &Path,
    room_reader: &str,
    hall_reader: &str,
    style: &PlotStyle,
) -> Result<(), Box<dyn Error>> {
    let entries = read_location_csv(log_file)?;
    if entries.is_empty() {
        return Err(AnalysisError::NoData(format!("location logs in '{}'", log_file.display())).into());
    }
    create_dir(output_dir)?;

    let counts = cumulative_counts(&entries, room_reader, hall_reader);
    let report = reduction_report(&counts, &ScanCapacity::default());
    print!("{}", render_reduction_report(&report));

    plot_cumulative_logs(&counts, style, output_dir)
}

/// Calibration curve of the clear-path summary.
pub fn run_calibration(input_dir: &Path, output_dir: &Path, style: &PlotStyle) -> Result<(), Box<dyn Error>> {
    let observations = read_experiment_csv(input_dir, ExperimentKind::ClearPath)?;
    let rows: Vec<SummaryRow> = summarize(&observations, GroupKey::Distance);
    create_dir(output_dir)?;
    plot_calibration_curve(&rows, style, output_dir)
}

// src/workflows.rs
