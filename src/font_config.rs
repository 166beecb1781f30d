// src/font_config.rs

// Font styles for plot rendering. Sizes come from the active PlotStyle so a
// style file can scale every text element at once.

use crate::plot_style::PlotStyle;

/// Font family name for default system fonts.
/// When plotters renders with "sans-serif", it uses system fonts
pub const FONT_FAMILY_SYSTEM: &str = "sans-serif";

/// Represents a font style (family + size) for consistent usage throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontStyle {
    pub family: &'static str,
    pub size: i32,
}

impl FontStyle {
    const fn system(size: i32) -> Self {
        Self {
            family: FONT_FAMILY_SYSTEM,
            size,
        }
    }

    /// Tuple representation for plotters' IntoFont trait (`.caption()`, `.label_style()`).
    pub fn tuple(&self) -> (&'static str, i32) {
        (self.family, self.size)
    }
}

/// Every text role a chart uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartFonts {
    pub main_title: FontStyle,
    pub chart_title: FontStyle,
    pub axis_label: FontStyle,
    pub legend: FontStyle,
    pub annotation: FontStyle,
    pub message: FontStyle,
}

impl ChartFonts {
    pub fn from_style(style: &PlotStyle) -> Self {
        Self {
            main_title: FontStyle::system(style.font_size_title),
            chart_title: FontStyle::system(style.font_size_chart_title),
            axis_label: FontStyle::system(style.font_size_axis_label),
            legend: FontStyle::system(style.font_size_legend),
            annotation: FontStyle::system(style.font_size_annotation),
            message: FontStyle::system(style.font_size_message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_follow_style() {
        let style = PlotStyle {
            font_size_legend: 11,
            ..PlotStyle::default()
        };
        let fonts = ChartFonts::from_style(&style);
        assert_eq!(fonts.legend.tuple(), ("sans-serif", 11));
        assert_eq!(fonts.main_title.size, style.font_size_title);
    }
}
