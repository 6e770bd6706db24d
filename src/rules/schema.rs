//! Rules document schema, parsing and eager validation

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClimaCertoError;
use crate::models::WeatherCondition;

/// Reserved activity key used when the requested activity has no rules
pub const DEFAULT_ACTIVITY: &str = "default";

/// Climate record field a condition can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fact {
    Temperature,
    Humidity,
    Wind,
    UvIndex,
    Condition,
    Precipitation,
}

impl Fact {
    /// True for facts that carry numeric values
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Fact::Condition)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Fact::Temperature => "temperature",
            Fact::Humidity => "humidity",
            Fact::Wind => "wind",
            Fact::UvIndex => "uvIndex",
            Fact::Condition => "condition",
            Fact::Precipitation => "precipitation",
        }
    }
}

/// Comparison applied between a fact and the configured value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    GreaterThan,
    LessThan,
    Between,
    Outside,
    In,
}

impl Operator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::Between => "between",
            Operator::Outside => "outside",
            Operator::In => "in",
        }
    }
}

/// A single configured value: a number for numeric facts, a condition name
/// for the `condition` fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
}

/// The value side of a condition: one scalar, or a list for the pair and
/// set operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Scalar(ScalarValue),
    List(Vec<ScalarValue>),
}

/// One comparison evaluated against the climate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub fact: Fact,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl RuleCondition {
    /// Reject value shapes the operator could never match at runtime
    fn validate(&self, context: &str) -> crate::Result<()> {
        match self.operator {
            Operator::Equals => self.validate_scalar(context),
            Operator::GreaterThan | Operator::LessThan => self.validate_numeric_scalar(context),
            Operator::Between | Operator::Outside => self.validate_ordered_pair(context),
            Operator::In => self.validate_set(context),
        }
    }

    fn validate_scalar(&self, context: &str) -> crate::Result<()> {
        match &self.value {
            ConditionValue::Scalar(scalar) => self.validate_scalar_type(scalar, context),
            ConditionValue::List(_) => Err(ClimaCertoError::config(format!(
                "{context}: '{}' requires a single value, not a list",
                self.operator.as_str()
            ))),
        }
    }

    fn validate_numeric_scalar(&self, context: &str) -> crate::Result<()> {
        self.require_numeric_fact(context)?;
        match &self.value {
            ConditionValue::Scalar(ScalarValue::Number(_)) => Ok(()),
            _ => Err(ClimaCertoError::config(format!(
                "{context}: '{}' requires a single numeric value",
                self.operator.as_str()
            ))),
        }
    }

    fn validate_ordered_pair(&self, context: &str) -> crate::Result<()> {
        self.require_numeric_fact(context)?;
        let values = match &self.value {
            ConditionValue::List(values) => values.as_slice(),
            ConditionValue::Scalar(_) => &[],
        };
        match values {
            [ScalarValue::Number(low), ScalarValue::Number(high)] if low <= high => Ok(()),
            [ScalarValue::Number(_), ScalarValue::Number(_)] => {
                Err(ClimaCertoError::config(format!(
                    "{context}: '{}' requires low <= high",
                    self.operator.as_str()
                )))
            }
            _ => Err(ClimaCertoError::config(format!(
                "{context}: '{}' requires a [low, high] pair of numbers",
                self.operator.as_str()
            ))),
        }
    }

    fn validate_set(&self, context: &str) -> crate::Result<()> {
        match &self.value {
            ConditionValue::List(values) if !values.is_empty() => {
                for scalar in values {
                    self.validate_scalar_type(scalar, context)?;
                }
                Ok(())
            }
            _ => Err(ClimaCertoError::config(format!(
                "{context}: 'in' requires a non-empty list of values"
            ))),
        }
    }

    fn validate_scalar_type(&self, scalar: &ScalarValue, context: &str) -> crate::Result<()> {
        match (self.fact.is_numeric(), scalar) {
            (true, ScalarValue::Number(_)) => Ok(()),
            (true, ScalarValue::Text(_)) => Err(ClimaCertoError::config(format!(
                "{context}: the '{}' fact compares against numbers",
                self.fact.as_str()
            ))),
            (false, ScalarValue::Text(name)) => {
                if WeatherCondition::from_name(name).is_some() {
                    Ok(())
                } else {
                    Err(ClimaCertoError::config(format!(
                        "{context}: '{name}' is not a known weather condition"
                    )))
                }
            }
            (false, ScalarValue::Number(_)) => Err(ClimaCertoError::config(format!(
                "{context}: the 'condition' fact compares against condition names"
            ))),
        }
    }

    fn require_numeric_fact(&self, context: &str) -> crate::Result<()> {
        if self.fact.is_numeric() {
            Ok(())
        } else {
            Err(ClimaCertoError::config(format!(
                "{context}: '{}' cannot be applied to the '{}' fact",
                self.operator.as_str(),
                self.fact.as_str()
            )))
        }
    }
}

/// A scored, human-readable statement about the day's weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub condition: RuleCondition,
    /// Score contribution; positive rules land in `pros`, the rest in
    /// `cons`. Trend alert rules leave it at 0.
    #[serde(default)]
    pub points: i32,
    pub message: String,
}

impl Rule {
    fn validate(&self, context: &str) -> crate::Result<()> {
        if self.message.is_empty() {
            return Err(ClimaCertoError::config(format!(
                "{context}: message must not be empty"
            )));
        }
        self.condition.validate(context)
    }
}

/// Color and label for one score-decile band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBand {
    pub color: String,
    pub qualitative: String,
}

impl AnalysisBand {
    /// Band used when the analysis map cannot classify a score
    #[must_use]
    pub fn indeterminate() -> Self {
        Self {
            color: "gray".to_string(),
            qualitative: "Indeterminate".to_string(),
        }
    }
}

/// Score bookkeeping constants, overridable from the rules document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Score every analysis starts from
    #[serde(default = "default_baseline")]
    pub baseline: i32,
    /// Lower clamp bound for the final score
    #[serde(default = "default_clamp_min")]
    pub clamp_min: i32,
    /// Upper clamp bound for the final score
    #[serde(default = "default_clamp_max")]
    pub clamp_max: i32,
    /// Analysis map key tried when no threshold matches the score decile
    #[serde(default = "default_fallback_group")]
    pub fallback_group: u8,
}

fn default_baseline() -> i32 {
    50
}

fn default_clamp_min() -> i32 {
    0
}

fn default_clamp_max() -> i32 {
    100
}

fn default_fallback_group() -> u8 {
    1
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            clamp_min: default_clamp_min(),
            clamp_max: default_clamp_max(),
            fallback_group: default_fallback_group(),
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> crate::Result<()> {
        if self.clamp_min < 0
            || self.clamp_min > self.baseline
            || self.baseline > self.clamp_max
            || self.clamp_max > 100
        {
            return Err(ClimaCertoError::config(
                "scoring must satisfy 0 <= clampMin <= baseline <= clampMax <= 100",
            ));
        }
        if self.fallback_group > 10 {
            return Err(ClimaCertoError::config(
                "scoring.fallbackGroup must be a score decile between 0 and 10",
            ));
        }
        Ok(())
    }
}

/// The whole rules document
///
/// Loaded once at startup, validated eagerly, read-only afterwards. Every
/// section may be absent; an empty document is valid and makes the engine
/// degrade to the neutral message and the indeterminate band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    /// Ordered rule sets per lower-cased activity identifier
    #[serde(default)]
    pub activity_rules: HashMap<String, Vec<Rule>>,
    /// Score-decile threshold (0-10) to classification band
    #[serde(default)]
    pub analysis_map: BTreeMap<u8, AnalysisBand>,
    /// Advisory rules; only the first match is surfaced, points ignored
    #[serde(default)]
    pub trend_alert_rules: Vec<Rule>,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl RulesConfig {
    /// Load and validate a rules document from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ClimaCertoError::config(format!("cannot read rules file {}: {e}", path.display()))
        })?;
        Self::load_from_str(&raw)
    }

    /// Parse and validate a rules document from its JSON text
    pub fn load_from_str(raw: &str) -> crate::Result<Self> {
        let mut config: RulesConfig = serde_json::from_str(raw)
            .map_err(|e| ClimaCertoError::config(format!("invalid rules document: {e}")))?;
        config.normalize_activity_keys()?;
        config.validate()?;
        if !config.activity_rules.contains_key(DEFAULT_ACTIVITY) {
            tracing::warn!(
                "rules document has no '{DEFAULT_ACTIVITY}' rule set; unknown activities \
                 will score neutral"
            );
        }
        Ok(config)
    }

    /// Lower-case activity keys so lookup is case-insensitive
    fn normalize_activity_keys(&mut self) -> crate::Result<()> {
        let mut normalized = HashMap::with_capacity(self.activity_rules.len());
        for (key, rules) in self.activity_rules.drain() {
            let lowered = key.to_lowercase();
            if normalized.insert(lowered.clone(), rules).is_some() {
                return Err(ClimaCertoError::config(format!(
                    "activityRules contains duplicate activity '{lowered}' after lower-casing"
                )));
            }
        }
        self.activity_rules = normalized;
        Ok(())
    }

    /// Validate the whole document
    pub fn validate(&self) -> crate::Result<()> {
        self.scoring.validate()?;
        self.validate_analysis_map()?;
        self.validate_rules()?;
        Ok(())
    }

    fn validate_analysis_map(&self) -> crate::Result<()> {
        for (threshold, band) in &self.analysis_map {
            if *threshold > 10 {
                return Err(ClimaCertoError::config(format!(
                    "analysisMap threshold {threshold} is outside the score-decile range 0-10"
                )));
            }
            if band.color.is_empty() || band.qualitative.is_empty() {
                return Err(ClimaCertoError::config(format!(
                    "analysisMap entry {threshold} must name a color and a qualitative label"
                )));
            }
        }
        Ok(())
    }

    fn validate_rules(&self) -> crate::Result<()> {
        for (activity, rules) in &self.activity_rules {
            for (index, rule) in rules.iter().enumerate() {
                rule.validate(&format!("activityRules.{activity}[{index}]"))?;
            }
        }
        for (index, rule) in self.trend_alert_rules.iter().enumerate() {
            rule.validate(&format!("trendAlertRules[{index}]"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_is_valid() {
        let config = RulesConfig::load_from_str("{}").unwrap();
        assert!(config.activity_rules.is_empty());
        assert!(config.analysis_map.is_empty());
        assert!(config.trend_alert_rules.is_empty());
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_full_document_parses() {
        let config = RulesConfig::load_from_str(
            r#"{
                "activityRules": {
                    "hiking": [
                        {
                            "condition": {"fact": "temperature", "operator": "between", "value": [10, 25]},
                            "points": 15,
                            "message": "Comfortable temperature for hiking."
                        },
                        {
                            "condition": {"fact": "condition", "operator": "in", "value": ["Rain", "Snow"]},
                            "points": -20,
                            "message": "Precipitation expected on the trail."
                        }
                    ],
                    "default": [
                        {
                            "condition": {"fact": "uvIndex", "operator": "greaterThan", "value": 8},
                            "points": -10,
                            "message": "Very high UV index."
                        }
                    ]
                },
                "analysisMap": {
                    "0": {"color": "red", "qualitative": "Bad"},
                    "5": {"color": "yellow", "qualitative": "Ok"},
                    "8": {"color": "green", "qualitative": "Great"}
                },
                "trendAlertRules": [
                    {
                        "condition": {"fact": "wind", "operator": "greaterThan", "value": 15},
                        "message": "Strong winds expected."
                    }
                ],
                "scoring": {"baseline": 40}
            }"#,
        )
        .unwrap();

        assert_eq!(config.activity_rules["hiking"].len(), 2);
        assert_eq!(config.analysis_map.len(), 3);
        assert_eq!(config.analysis_map[&5].qualitative, "Ok");
        assert_eq!(config.trend_alert_rules[0].points, 0);
        assert_eq!(config.scoring.baseline, 40);
        assert_eq!(config.scoring.clamp_max, 100);
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "wind", "operator": "matches", "value": 1}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("invalid rules document"));
    }

    #[test]
    fn test_unknown_fact_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "dewPoint", "operator": "equals", "value": 1}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("invalid rules document"));
    }

    #[test]
    fn test_inverted_pair_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "temperature", "operator": "between", "value": [25, 10]}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("low <= high"));
    }

    #[test]
    fn test_pair_arity_enforced() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "temperature", "operator": "outside", "value": [1, 2, 3]}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("[low, high] pair"));

        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "temperature", "operator": "between", "value": 5}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("[low, high] pair"));
    }

    #[test]
    fn test_empty_set_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "condition", "operator": "in", "value": []}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("non-empty list"));
    }

    #[test]
    fn test_unknown_condition_name_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "condition", "operator": "equals", "value": "Drizzle"}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("not a known weather condition"));
    }

    #[test]
    fn test_numeric_fact_with_text_value_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "wind", "operator": "equals", "value": "strong"}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("compares against numbers"));
    }

    #[test]
    fn test_ordering_operator_on_condition_fact_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "condition", "operator": "greaterThan", "value": 1}, "message": "x"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("cannot be applied"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"analysisMap": {"11": {"color": "red", "qualitative": "Bad"}}}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("score-decile range"));
    }

    #[test]
    fn test_negative_threshold_fails_parse() {
        let err = RulesConfig::load_from_str(
            r#"{"analysisMap": {"-1": {"color": "red", "qualitative": "Bad"}}}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("invalid rules document"));
    }

    #[test]
    fn test_activity_keys_are_lowercased() {
        let config = RulesConfig::load_from_str(
            r#"{"activityRules": {"Hiking": [
                {"condition": {"fact": "wind", "operator": "lessThan", "value": 10}, "points": 5, "message": "Calm."}
            ]}}"#,
        )
        .unwrap();
        assert!(config.activity_rules.contains_key("hiking"));
        assert!(!config.activity_rules.contains_key("Hiking"));
    }

    #[test]
    fn test_duplicate_activity_after_lowercasing_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"activityRules": {
                "Hiking": [{"condition": {"fact": "wind", "operator": "lessThan", "value": 10}, "points": 5, "message": "a"}],
                "hiking": [{"condition": {"fact": "wind", "operator": "lessThan", "value": 10}, "points": 5, "message": "b"}]
            }}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("duplicate activity"));
    }

    #[test]
    fn test_invalid_scoring_rejected() {
        let err =
            RulesConfig::load_from_str(r#"{"scoring": {"baseline": 120}}"#).unwrap_err();
        assert!(err.message().contains("clampMax"));

        let err = RulesConfig::load_from_str(r#"{"scoring": {"fallbackGroup": 11}}"#)
            .unwrap_err();
        assert!(err.message().contains("fallbackGroup"));
    }

    #[test]
    fn test_empty_message_rejected() {
        let err = RulesConfig::load_from_str(
            r#"{"trendAlertRules": [
                {"condition": {"fact": "wind", "operator": "greaterThan", "value": 15}, "message": ""}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("message must not be empty"));
    }
}
