//! Analysis result model returned to callers

use serde::{Deserialize, Serialize};

/// Suitability verdict for one activity on one day
///
/// Constructed fresh for every request by the rule engine; the wire shape
/// uses camelCase names and omits `trendAlert` entirely when no trend rule
/// matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Accumulated score, clamped to the configured bounds
    pub score: i32,
    /// Qualitative label from the analysis map
    pub qualitative: String,
    /// Display color from the analysis map
    pub color: String,
    /// Messages of matched rules with positive points
    pub pros: Vec<String>,
    /// Messages of matched rules with zero or negative points
    pub cons: Vec<String>,
    /// First matching trend alert, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_alert: Option<String>,
}
