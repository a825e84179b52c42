//! Turns ranked categories into report lines.
//!
//! Raw scores are not shown as probabilities. They are rescaled against an assumed
//! maximum raw score, a per-model calibration constant picked by watching what the
//! model typically emits, then clamped to `[0, 100]`:
//!
//! ```text
//! percent = clamp(raw / assumed_max * 100, 0, 100)
//! ```

use log::{debug, info};

use crate::classifier::{Classifications, ClassifierError};
use crate::labels::LabelTable;
use crate::report::Report;

/// Assumed maximum raw score for the bundled MobileNet V3 model.
///
/// Tune per model: quantized V3 outputs rarely exceed ~0.3, while V2 logits were
/// closer to 15.0.
pub const DEFAULT_ASSUMED_MAX_RAW_SCORE: f32 = 0.3;

pub const RESULTS_HEADER: &str = "--- Classification Results ---";
pub const RESULTS_FOOTER: &str = "----------------------------";
pub const NO_RESULTS: &str = "No classification results found or categories are empty.";

/// Display calibration: maps raw scores onto a 0-100 percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreScale {
    assumed_max: f32,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            assumed_max: DEFAULT_ASSUMED_MAX_RAW_SCORE,
        }
    }
}

impl ScoreScale {
    /// # Errors
    /// `ValidationError` unless `assumed_max` is finite and positive
    pub fn new(assumed_max: f32) -> Result<Self, ClassifierError> {
        if !assumed_max.is_finite() || assumed_max <= 0.0 {
            return Err(ClassifierError::ValidationError(format!(
                "assumed max raw score must be finite and positive, got {}",
                assumed_max
            )));
        }
        Ok(Self { assumed_max })
    }

    pub fn assumed_max(&self) -> f32 {
        self.assumed_max
    }

    /// Rescaled percentage in `[0, 100]`; NaN maps to 0.
    pub fn percent(&self, raw: f32) -> f32 {
        let scaled = raw / self.assumed_max * 100.0;
        if scaled.is_nan() {
            0.0
        } else {
            scaled.clamp(0.0, 100.0)
        }
    }

    /// Percentage with one decimal place, e.g. `"16.7%"`.
    pub fn format(&self, raw: f32) -> String {
        format!("{:.1}%", self.percent(raw))
    }
}

/// Formats one ranked line: `"<rank>. <label>: <percent>%"`.
pub fn format_line(rank: usize, label: &str, raw: f32, scale: &ScoreScale) -> String {
    format!("{}. {}: {}", rank, label, scale.format(raw))
}

/// Lines for the first classification group, without header and footer.
pub fn result_lines(results: &[Classifications], labels: &LabelTable, scale: &ScoreScale) -> Vec<String> {
    let Some(group) = results.first().filter(|group| !group.is_empty()) else {
        return Vec::new();
    };

    group
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            debug!(
                "Raw Category Data for result {}: Index={}, Score={}, LabelFromModel='{}', DisplayName='{}'",
                i + 1,
                category.index,
                category.score,
                category.label,
                category.display_name
            );
            format_line(i + 1, &labels.resolve(category), category.score, scale)
        })
        .collect()
}

/// Appends the framed result list to `report`.
pub fn render_results(report: &mut Report, results: &[Classifications], labels: &LabelTable, scale: &ScoreScale) {
    report.append_line("");
    report.append_line(RESULTS_HEADER);

    let lines = result_lines(results, labels, scale);
    if lines.is_empty() {
        report.append_line(NO_RESULTS);
        info!("{}", NO_RESULTS);
    }
    for line in lines {
        info!("{}", line);
        report.append_line(line);
    }

    report.append_line(RESULTS_FOOTER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;

    #[test]
    fn test_percent_edges() {
        let scale = ScoreScale::new(0.3).unwrap();
        assert_eq!(scale.format(0.0), "0.0%");
        assert_eq!(scale.format(0.3), "100.0%");
        assert_eq!(scale.format(0.9), "100.0%");
        assert_eq!(scale.format(-0.2), "0.0%");
        assert_eq!(scale.format(f32::NAN), "0.0%");
        assert_eq!(scale.format(0.05), "16.7%");
    }

    #[test]
    fn test_custom_assumed_max() {
        let scale = ScoreScale::new(15.0).unwrap();
        assert_eq!(scale.format(7.5), "50.0%");
        assert_eq!(scale.assumed_max(), 15.0);
    }

    #[test]
    fn test_invalid_assumed_max() {
        assert!(ScoreScale::new(0.0).is_err());
        assert!(ScoreScale::new(-1.0).is_err());
        assert!(ScoreScale::new(f32::INFINITY).is_err());
        assert_eq!(ScoreScale::default().assumed_max(), DEFAULT_ASSUMED_MAX_RAW_SCORE);
    }

    #[test]
    fn test_render_ranked_lines() {
        let labels = LabelTable::new(vec!["cat".into(), "dog".into(), "bird".into()]);
        let results = vec![Classifications::new(
            0,
            vec![Category::new(1, 0.15), Category::new(0, 0.05)],
        )];
        let mut report = Report::new();
        render_results(&mut report, &results, &labels, &ScoreScale::default());

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec!["", RESULTS_HEADER, "1. dog: 50.0%", "2. cat: 16.7%", RESULTS_FOOTER]
        );
    }

    #[test]
    fn test_render_empty_results() {
        let labels = LabelTable::new(vec!["cat".into()]);
        for results in [vec![], vec![Classifications::default()]] {
            let mut report = Report::new();
            render_results(&mut report, &results, &labels, &ScoreScale::default());
            assert!(report.contains(NO_RESULTS));
            assert!(report.contains(RESULTS_FOOTER));
        }
    }

    #[test]
    fn test_only_first_group_rendered() {
        let labels = LabelTable::new(vec!["a".into(), "b".into()]);
        let results = vec![
            Classifications::new(0, vec![Category::new(0, 0.3)]),
            Classifications::new(1, vec![Category::new(1, 0.3)]),
        ];
        let lines = result_lines(&results, &labels, &ScoreScale::default());
        assert_eq!(lines, vec!["1. a: 100.0%"]);
    }
}
