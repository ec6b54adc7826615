use serde::Serialize;
use serde_json::Value;

use crate::{models::Series, ProducerError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub target: String,
    /// `None` when the series had no valid datapoints.
    pub mean: Option<f64>,
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: f64,
    pub series: Vec<SeriesSummary>,
}

/// A datapoint counts only if both its value and its timestamp are JSON numbers.
fn datapoint_value(datapoint: &Value) -> Option<f64> {
    let pair = datapoint.as_array()?;
    match (pair.first(), pair.get(1)) {
        (Some(Value::Number(value)), Some(Value::Number(_))) => value.as_f64(),
        _ => None,
    }
}

fn summarize_series(series: &Series, max_datapoints: Option<usize>) -> SeriesSummary {
    let mut values: Vec<f64> = series.datapoints.iter().filter_map(datapoint_value).collect();

    if let Some(max) = max_datapoints {
        let skip = values.len().saturating_sub(max);
        values.drain(..skip);
    }

    let mean = if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };

    SeriesSummary {
        target: series.target.clone(),
        mean,
        points: values.len(),
    }
}

/// Reduces a render API body to the sum of every series' mean.
///
/// Each series weighs the same regardless of how many points it had. Series
/// without any valid datapoint add nothing to the total.
pub fn summarize(body: &str, max_datapoints: Option<usize>) -> Result<Summary> {
    let payload: Vec<Series> = serde_json::from_str(body)?;

    let series: Vec<SeriesSummary> = payload
        .iter()
        .map(|s| summarize_series(s, max_datapoints))
        .collect();
    let total: f64 = series.iter().filter_map(|s| s.mean).sum();
    if !total.is_finite() {
        return Err(ProducerError::Range(format!(
            "aggregate of {} series is not finite",
            series.len()
        )));
    }

    Ok(Summary { total, series })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_of_means() {
        let body = r#"[
            {"target": "a", "datapoints": [[2, 100], [4, 200]]},
            {"target": "b", "datapoints": [[10, 100]]}
        ]"#;

        let summary = summarize(body, None).unwrap();
        assert_eq!(summary.total, 13.0);
        assert_eq!(summary.series[0].mean, Some(3.0));
        assert_eq!(summary.series[1].mean, Some(10.0));
    }

    #[test]
    fn test_invalid_datapoints_filtered() {
        let body = r#"[
            {"target": "a", "datapoints": [[null, 100], [4, 200], [6, null], ["7", 300], [8], 5, [2, 400]]}
        ]"#;

        let summary = summarize(body, None).unwrap();
        assert_eq!(summary.series[0].points, 2);
        assert_eq!(summary.total, 3.0);
    }

    #[test]
    fn test_empty_series_contributes_nothing() {
        let body = r#"[
            {"target": "a", "datapoints": [[null, 100], [null, 200]]},
            {"target": "b", "datapoints": []},
            {"target": "c"},
            {"target": "d", "datapoints": [[1.5, 100]]}
        ]"#;

        let summary = summarize(body, None).unwrap();
        assert_eq!(summary.total, 1.5);
        assert!(summary.total.is_finite());
        assert_eq!(summary.series[0].mean, None);
        assert_eq!(summary.series[1].mean, None);
        assert_eq!(summary.series[2].mean, None);
    }

    #[test]
    fn test_null_datapoints_is_empty_series() {
        let body = r#"[
            {"target": "a", "datapoints": null},
            {"target": null, "datapoints": [[2, 1]]}
        ]"#;

        let summary = summarize(body, None).unwrap();
        assert_eq!(summary.total, 2.0);
        assert_eq!(summary.series[0].mean, None);
        assert_eq!(summary.series[1].target, "");
    }

    #[test]
    fn test_empty_payload() {
        let summary = summarize("[]", None).unwrap();
        assert_eq!(summary.total, 0.0);
        assert!(summary.series.is_empty());
    }

    #[test]
    fn test_max_datapoints_keeps_latest() {
        let body = r#"[{"target": "a", "datapoints": [[100, 1], [null, 2], [2, 3], [4, 4]]}]"#;

        let summary = summarize(body, Some(2)).unwrap();
        assert_eq!(summary.total, 3.0);

        let summary = summarize(body, Some(10)).unwrap();
        assert_eq!(summary.series[0].points, 3);
    }

    #[test]
    fn test_overflowing_total_is_range_error() {
        let body = r#"[{"target": "a", "datapoints": [[1e308, 1], [1e308, 2]]}]"#;
        let err = summarize(body, None).unwrap_err();
        assert!(matches!(err, ProducerError::Range(_)));
        assert!(err.to_string().ends_with("code: ERANGE"));

        let body = r#"[
            {"target": "a", "datapoints": [[1e308, 1]]},
            {"target": "b", "datapoints": [[1e308, 1]]}
        ]"#;
        assert!(matches!(summarize(body, None), Err(ProducerError::Range(_))));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(summarize("[{\"target\":", None), Err(ProducerError::Parse(_))));
        assert!(matches!(summarize("{\"target\": \"a\"}", None), Err(ProducerError::Parse(_))));
        assert!(matches!(summarize("", None), Err(ProducerError::Parse(_))));
    }
}
