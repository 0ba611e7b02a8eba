//! Engine tunables
//!
//! Defaults match what template authors expect out of the box; hosts may
//! override a few of them through the environment.

use serde::{Deserialize, Serialize};
use shared_types::{Size, TextAlign, Typography, VerticalAlign};

/// Font sizes a variable may use, in points
pub const FONT_SIZES_PT: &[f32] = &[
    5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0, 28.0, 32.0,
];

pub const MIN_LINE_HEIGHT: f32 = 0.5;
pub const MAX_LINE_HEIGHT: f32 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest width/height a variable can shrink to, in page units
    pub min_size: Size,
    /// Size given to freshly placed variables
    pub default_size: Size,
    pub default_typography: Typography,
    /// Line height given to freshly placed raw-text variables
    pub default_line_height: f32,
    pub default_text_align: TextAlign,
    pub default_vertical_align: VerticalAlign,
    /// Side of a resize handle's hit area, in viewport pixels
    pub handle_size: f64,
    /// chrono format string for computed date fields
    pub date_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_size: Size::new(20.0, 20.0),
            default_size: Size::new(100.0, 30.0),
            default_typography: Typography::default(),
            default_line_height: 1.2,
            default_text_align: TextAlign::Left,
            default_vertical_align: VerticalAlign::Middle,
            handle_size: 8.0,
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `TEMPLATE_DATE_FORMAT` and `TEMPLATE_HANDLE_SIZE`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(format) = std::env::var("TEMPLATE_DATE_FORMAT") {
            if format.trim().is_empty() {
                tracing::warn!("TEMPLATE_DATE_FORMAT is empty, keeping {}", config.date_format);
            } else {
                config.date_format = format;
            }
        }

        if let Ok(raw) = std::env::var("TEMPLATE_HANDLE_SIZE") {
            match raw.parse::<f64>() {
                Ok(size) if size > 0.0 => config.handle_size = size,
                _ => tracing::warn!(
                    "Ignoring invalid TEMPLATE_HANDLE_SIZE '{}', keeping {}",
                    raw,
                    config.handle_size
                ),
            }
        }

        config
    }
}

pub fn is_allowed_font_size(size: f32) -> bool {
    FONT_SIZES_PT.iter().any(|allowed| (allowed - size).abs() < f32::EPSILON)
}

pub fn is_allowed_line_height(line_height: f32) -> bool {
    (MIN_LINE_HEIGHT..=MAX_LINE_HEIGHT).contains(&line_height)
}
