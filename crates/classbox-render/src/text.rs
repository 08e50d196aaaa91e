use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Rows of a label, split at `<br>` tags in any of their spellings.
pub fn label_lines(text: &str) -> impl Iterator<Item = &str> {
    static BR: OnceLock<Regex> = OnceLock::new();
    BR.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|\n").expect("valid regex"))
        .split(text)
}

/// Font-independent measurer: each display column is `em_per_column` em wide and each row
/// `em_per_row` em tall.
#[derive(Debug, Clone)]
pub struct DeterministicTextMeasurer {
    pub em_per_column: f64,
    pub em_per_row: f64,
}

impl Default for DeterministicTextMeasurer {
    fn default() -> Self {
        Self {
            em_per_column: 0.6,
            em_per_row: 1.2,
        }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let em = style.font_size.max(1.0);
        let (rows, columns) = label_lines(text).fold((0usize, 0usize), |(rows, widest), row| {
            (rows + 1, widest.max(row.width()))
        });
        TextMetrics {
            width: columns as f64 * em * self.em_per_column,
            height: rows as f64 * em * self.em_per_row,
        }
    }
}
