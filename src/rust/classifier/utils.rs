use std::cmp::Ordering;

use super::builder::ClassifierOptions;
use super::category::{Category, Classifications};
use super::error::ClassifierError;

/// Ranks a score row into categories, highest first.
///
/// NaN scores sort last. Categories below `threshold` are dropped, then the list is
/// truncated to `max_results`.
pub(crate) fn rank_scores(
    scores: &[f32],
    max_results: usize,
    threshold: Option<f32>,
    display_names: &[String],
) -> Vec<Category> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
    });

    indexed
        .into_iter()
        .filter(|(_, score)| threshold.map_or(true, |t| *score >= t))
        .take(max_results)
        .filter_map(|(index, score)| {
            let index = i32::try_from(index).ok()?;
            let display_name = display_names
                .get(index as usize)
                .cloned()
                .unwrap_or_default();
            Some(Category::new(index, score).with_display_name(display_name))
        })
        .collect()
}

/// Splits a flat output into one ranked group per head.
///
/// `num_classes` of 0 marks a dynamic class axis, in which case the whole output is a
/// single head.
pub(crate) fn group_scores(
    scores: &[f32],
    num_classes: usize,
    options: &ClassifierOptions,
    display_names: &[String],
) -> Result<Vec<Classifications>, ClassifierError> {
    if scores.is_empty() {
        return Err(ClassifierError::InferenceError("Model produced no scores".into()));
    }

    let num_classes = match num_classes {
        0 => scores.len(),
        n => n,
    };
    if scores.len() % num_classes != 0 {
        return Err(ClassifierError::InferenceError(format!(
            "Output of {} scores is not a multiple of {} classes",
            scores.len(),
            num_classes
        )));
    }

    Ok(scores
        .chunks(num_classes)
        .enumerate()
        .map(|(head, row)| {
            let categories = rank_scores(row, options.max_results, options.score_threshold, display_names);
            Classifications::new(head, categories)
        })
        .collect())
}

/// Maps quantized `u8` scores onto `[0, 1]`.
pub(crate) fn dequantize(scores: &[u8]) -> Vec<f32> {
    scores.iter().map(|&s| f32::from(s) / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_scores_orders_and_truncates() {
        let scores = [0.1, 0.7, 0.05, 0.9, 0.3];
        let ranked = rank_scores(&scores, 3, None, &[]);
        let indices: Vec<i32> = ranked.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![3, 1, 4]);
        assert_eq!(ranked[0].score, 0.9);
    }

    #[test]
    fn test_rank_scores_threshold_and_nan() {
        let scores = [f32::NAN, 0.2, 0.6];
        let ranked = rank_scores(&scores, 5, Some(0.25), &[]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 2);
    }

    #[test]
    fn test_rank_scores_display_names() {
        let names = vec!["zero".to_string(), "one".to_string()];
        let ranked = rank_scores(&[0.2, 0.8, 0.5], 3, None, &names);
        assert_eq!(ranked[0].display_name, "one");
        assert_eq!(ranked[1].display_name, "");
        assert_eq!(ranked[2].display_name, "zero");
    }

    #[test]
    fn test_dequantize() {
        assert_eq!(dequantize(&[0, 255]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_group_scores_one_group_per_head() {
        let scores = [0.1, 0.8, 0.1, 0.6, 0.3, 0.1];
        let options = ClassifierOptions::default().with_max_results(2);
        let groups = group_scores(&scores, 3, &options, &[]).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].head_index, 0);
        assert_eq!(groups[1].head_index, 1);
        let first: Vec<i32> = groups[0].categories.iter().map(|c| c.index).collect();
        let second: Vec<i32> = groups[1].categories.iter().map(|c| c.index).collect();
        assert_eq!(first, vec![1, 0]);
        assert_eq!(second, vec![0, 1]);
    }

    #[test]
    fn test_group_scores_dynamic_class_axis() {
        let scores = [0.2, 0.1, 0.4, 0.05, 0.15, 0.3, 0.25];
        let names: Vec<String> = (0..7).map(|i| format!("n{}", i)).collect();
        let groups = group_scores(&scores, 0, &ClassifierOptions::default(), &names).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].categories.len(), 5);
        assert_eq!(groups[0].categories[0].index, 2);
        assert_eq!(groups[0].categories[0].display_name, "n2");
    }

    #[test]
    fn test_group_scores_rejects_partial_rows() {
        let result = group_scores(&[0.1; 7], 3, &ClassifierOptions::default(), &[]);
        assert!(matches!(result, Err(ClassifierError::InferenceError(_))));

        let result = group_scores(&[], 3, &ClassifierOptions::default(), &[]);
        assert!(matches!(result, Err(ClassifierError::InferenceError(_))));
    }

    #[test]
    fn test_group_scores_dequantized_row() {
        let scores = dequantize(&[0, 51, 255, 102]);
        let groups = group_scores(&scores, 4, &ClassifierOptions::default(), &[]).unwrap();
        let ranked: Vec<(i32, f32)> = groups[0].categories.iter().map(|c| (c.index, c.score)).collect();
        assert_eq!(ranked, vec![(2, 1.0), (3, 0.4), (1, 0.2), (0, 0.0)]);
    }
}
