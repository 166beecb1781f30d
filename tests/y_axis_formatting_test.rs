// tests/y_axis_formatting_test.rs

use rssi_distance_analysis::plot_framework::format_y_axis_label;

#[test]
fn test_rssi_axis_uses_whole_numbers() {
    let label = "RSSI (dBm)";
    assert_eq!(format_y_axis_label(-60.0, label), "-60");
    assert_eq!(format_y_axis_label(-62.5, label), "-62");
    assert_eq!(format_y_axis_label(0.0, label), "0");
}

#[test]
fn test_distance_axis_keeps_one_decimal_for_small_values() {
    let label = "Estimated Distance (m)";
    assert_eq!(format_y_axis_label(0.5, label), "0.5");
    assert_eq!(format_y_axis_label(2.25, label), "2.2");
    assert_eq!(format_y_axis_label(2.0, label), "2");
    assert_eq!(format_y_axis_label(10.5, label), "10");
}

#[test]
fn test_count_axis_uses_k_and_m_notation() {
    let label = "Cumulative Logs";
    assert_eq!(format_y_axis_label(999.0, label), "999");
    assert_eq!(format_y_axis_label(1500.0, label), "2k");
    assert_eq!(format_y_axis_label(2_500_000.0, label), "2.5M");
}

#[test]
fn test_linear_power_axis_uses_scientific_notation() {
    let label = "Power (mW)";
    assert_eq!(format_y_axis_label(1e-7, label), "1e-7");
    assert_eq!(format_y_axis_label(0.001, label), "1e-3");
    assert_eq!(format_y_axis_label(0.0, label), "0");
}
