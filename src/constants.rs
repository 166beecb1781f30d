// src/constants.rs

// Plot dimensions (11 x 7 inch figures at 150 dpi).
pub const PLOT_WIDTH: u32 = 1650;
pub const PLOT_HEIGHT: u32 = 1050;

// Figure size handed to the external plotting tool in the export bundles.
pub const EXPORT_FIG_WIDTH_PX: u32 = 1000;
pub const EXPORT_FIG_HEIGHT_PX: u32 = 600;

// Log-distance path-loss model calibration.
pub const DEFAULT_REFERENCE_POWER_DBM: f64 = -68.0; // RSSI measured at 1 meter
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.5;

// Transcript markers written by the ranging firmware.
pub const DEFAULT_WALL_LABEL: &str = "Wall";
pub const DEFAULT_MOVING_PREFIX: &str = "From 15 meters";
pub const DEFAULT_RETRY_MARKER: &str = "Scanning...";

// Output file names of the transcript parser.
pub const CLEAR_PATH_CSV: &str = "clear_path_experiment.csv";
pub const WALL_PATH_CSV: &str = "wall_experiment.csv";
pub const MOVING_CSV: &str = "moving_experiment.csv";
pub const DEFAULT_OUTPUT_DIR: &str = ".output";
pub const DEFAULT_EXPORT_SUBDIR: &str = "fig_exports";

// Display smoothing.
pub const SMOOTHING_WINDOW: usize = 7;
pub const SPLINE_SAMPLE_POINTS: usize = 200;
pub const REGRESSION_LINE_POINTS: usize = 100;

// Tick limits. Exported tick vectors wider than the cap get a coarser step.
pub const MAX_EXPORT_XTICKS: usize = 1000;
pub const MIN_XTICK_STEP: f64 = 1e-3;

// Accuracy test.
pub const SAMPLES_PER_TRIAL: usize = 10;
pub const ERROR_HISTOGRAM_BINS: usize = 15;
pub const DRIFT_WARNING_DBM_PER_CYCLE: f64 = -0.2;

// Logarithmic |RSSI| axis limits in dBm.
pub const LOG_SCALE_RSSI_MIN: f64 = 30.0;
pub const LOG_SCALE_RSSI_MAX: f64 = 100.0;

// Scalability test: one scan every 30 s, 5 tags in the room, ~3 tags seen per hallway scan.
pub const SCAN_INTERVAL_S: u32 = 30;
pub const ROOM_TAGS_PER_SCAN: u32 = 5;
pub const HALL_AVG_TAGS_PER_SCAN: u32 = 3;
pub const DEFAULT_ROOM_READER: &str = "Asset_Reader_01";
pub const DEFAULT_HALL_READER: &str = "Asset_Reader_02";

// Font sizes.
pub const FONT_SIZE_MAIN_TITLE: i32 = 30;
pub const FONT_SIZE_CHART_TITLE: i32 = 26;
pub const FONT_SIZE_AXIS_LABEL: i32 = 24;
pub const FONT_SIZE_LEGEND: i32 = 22;
pub const FONT_SIZE_ANNOTATION: i32 = 18;
pub const FONT_SIZE_MESSAGE: i32 = 22;

// --- Plot Color Assignments (RGB) ---
pub const COLOR_TEAL: [u8; 3] = [0, 128, 128];
pub const COLOR_GREEN: [u8; 3] = [0, 128, 0];
pub const COLOR_RED: [u8; 3] = [255, 0, 0];
pub const COLOR_BLUE: [u8; 3] = [0, 0, 255];
pub const COLOR_DARK_BLUE: [u8; 3] = [0, 0, 139];
pub const COLOR_WHITE: [u8; 3] = [255, 255, 255];
pub const COLOR_RAW_MEAN: [u8; 3] = [0, 128, 255]; // #0080ff
pub const COLOR_RAW_MAX: [u8; 3] = [0, 51, 102]; // #003366
pub const COLOR_RAW_MIN: [u8; 3] = [128, 191, 255]; // #80bfff
pub const COLOR_KALMAN_MEAN: [u8; 3] = [231, 76, 60]; // #e74c3c
pub const COLOR_KALMAN_MAX: [u8; 3] = [128, 0, 0]; // #800000
pub const COLOR_KALMAN_MIN: [u8; 3] = [255, 179, 179]; // #ffb3b3
pub const COLOR_TOTAL_LOGS: [u8; 3] = [39, 174, 96]; // #27ae60

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 2;
pub const LINE_WIDTH_LEGEND: u32 = 3;

// src/constants.rs
