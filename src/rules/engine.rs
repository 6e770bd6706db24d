//! Pure rule evaluation over one day of climate data

use crate::models::{AnalysisResult, ClimateRecord};
use crate::rules::schema::{
    AnalysisBand, ConditionValue, DEFAULT_ACTIVITY, Fact, Operator, Rule, RuleCondition,
    RulesConfig, ScalarValue,
};

/// Message pushed to `cons` when no rule in the selected set matched
pub const NEUTRAL_MESSAGE: &str =
    "The weather conditions are neutral or insufficient for a detailed analysis of this activity.";

/// Scoring engine over a validated rules document
///
/// Pure and deterministic: no I/O, no clock, no shared mutable state. The
/// same record, activity and document always produce the same result.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    config: RulesConfig,
}

impl RuleEngine {
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    /// Score one day of climate data for an activity
    ///
    /// Never fails: an unknown activity falls back to the `default` rule
    /// set, an unusable analysis map falls back to a fixed indeterminate
    /// band, and a condition that cannot be evaluated counts as unmatched.
    #[must_use]
    pub fn analyze(&self, climate: &ClimateRecord, activity: &str) -> AnalysisResult {
        let scoring = &self.config.scoring;
        let mut score = scoring.baseline;
        let mut pros = Vec::new();
        let mut cons = Vec::new();

        for rule in self.select_rules(activity) {
            if evaluate_condition(climate, &rule.condition) {
                score += rule.points;
                if rule.points > 0 {
                    pros.push(rule.message.clone());
                } else {
                    cons.push(rule.message.clone());
                }
            }
        }

        if pros.is_empty() && cons.is_empty() {
            cons.push(NEUTRAL_MESSAGE.to_string());
        }

        let score = score.clamp(scoring.clamp_min, scoring.clamp_max);
        let band = self.classify(score);

        AnalysisResult {
            score,
            qualitative: band.qualitative,
            color: band.color,
            pros,
            cons,
            trend_alert: self.trend_alert(climate),
        }
    }

    /// Rule set for the activity, falling back to `default`, then to none
    fn select_rules(&self, activity: &str) -> &[Rule] {
        let rules = &self.config.activity_rules;
        rules
            .get(&activity.to_lowercase())
            .or_else(|| rules.get(DEFAULT_ACTIVITY))
            .map_or(&[], Vec::as_slice)
    }

    /// Highest analysis threshold at or below the score's decile
    fn classify(&self, score: i32) -> AnalysisBand {
        let score_group = u8::try_from(score / 10).unwrap_or(0);
        let map = &self.config.analysis_map;

        for (threshold, band) in map.iter().rev() {
            if *threshold <= score_group {
                return band.clone();
            }
        }

        map.get(&self.config.scoring.fallback_group)
            .cloned()
            .unwrap_or_else(AnalysisBand::indeterminate)
    }

    /// Message of the first matching trend rule, in declared order
    fn trend_alert(&self, climate: &ClimateRecord) -> Option<String> {
        self.config
            .trend_alert_rules
            .iter()
            .find(|rule| evaluate_condition(climate, &rule.condition))
            .map(|rule| rule.message.clone())
    }
}

/// Evaluate a single condition against the record
///
/// Total and fail-safe: a field that is absent on this record, or a value
/// whose shape does not fit the operator, makes the condition false.
fn evaluate_condition(climate: &ClimateRecord, condition: &RuleCondition) -> bool {
    if condition.fact == Fact::Condition {
        return evaluate_text(climate.condition.as_str(), condition);
    }
    match numeric_fact(climate, condition.fact) {
        Some(field) => evaluate_numeric(field, condition),
        None => false,
    }
}

/// Numeric field referenced by a fact; `None` when absent on this record
fn numeric_fact(climate: &ClimateRecord, fact: Fact) -> Option<f64> {
    match fact {
        Fact::Temperature => Some(climate.temperature),
        Fact::Humidity => Some(climate.humidity),
        Fact::Wind => Some(climate.wind),
        Fact::UvIndex => Some(climate.uv_index),
        Fact::Precipitation => climate.precipitation,
        Fact::Condition => None,
    }
}

fn evaluate_numeric(field: f64, condition: &RuleCondition) -> bool {
    match (condition.operator, &condition.value) {
        (Operator::Equals, ConditionValue::Scalar(ScalarValue::Number(value))) => field == *value,
        (Operator::GreaterThan, ConditionValue::Scalar(ScalarValue::Number(value))) => {
            field > *value
        }
        (Operator::LessThan, ConditionValue::Scalar(ScalarValue::Number(value))) => field < *value,
        (Operator::Between, ConditionValue::List(values)) => match values.as_slice() {
            [ScalarValue::Number(low), ScalarValue::Number(high)] => {
                field >= *low && field <= *high
            }
            _ => false,
        },
        (Operator::Outside, ConditionValue::List(values)) => match values.as_slice() {
            [ScalarValue::Number(low), ScalarValue::Number(high)] => field < *low || field > *high,
            _ => false,
        },
        (Operator::In, ConditionValue::List(values)) => values
            .iter()
            .any(|value| matches!(value, ScalarValue::Number(n) if *n == field)),
        _ => false,
    }
}

fn evaluate_text(field: &str, condition: &RuleCondition) -> bool {
    match (condition.operator, &condition.value) {
        (Operator::Equals, ConditionValue::Scalar(ScalarValue::Text(value))) => field == value,
        (Operator::In, ConditionValue::List(values)) => values
            .iter()
            .any(|value| matches!(value, ScalarValue::Text(t) if t == field)),
        _ => false,
    }
}
