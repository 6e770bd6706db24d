//! Configurable suitability rules
//!
//! The rules document maps activities to scored weather conditions. It is
//! parsed and validated once at startup ([`schema`]) and then evaluated by
//! a pure engine ([`engine`]) for every request.

pub mod engine;
pub mod schema;

pub use engine::RuleEngine;
pub use schema::{
    AnalysisBand, ConditionValue, Fact, Operator, Rule, RuleCondition, RulesConfig, ScalarValue,
    ScoringConfig,
};
