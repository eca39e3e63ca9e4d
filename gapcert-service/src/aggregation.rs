//! Requirement aggregation — the pure pass/fail computation.
//!
//! Primary failures block certification outright; secondary requirements
//! pass as a percentage that must meet the configured threshold
//! (inclusive). Percentage rounding is half-up, and an inspection with no
//! secondary requirements has compliance 0 by definition — it cannot
//! pass, and never divides by zero.

use gapcert_core::types::{EvaluationResult, RequirementLevel};
use serde::Serialize;

/// Aggregate counts and verdict for one inspection's evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSummary {
    pub main_total: u32,
    pub main_failed: u32,
    pub secondary_total: u32,
    pub secondary_passed: u32,
    pub secondary_compliance: u32,
    pub is_passed: bool,
}

/// Compute the summary. An unevaluated requirement counts as not-Yes, so
/// an incomplete inspection can never pass even if this is called before
/// the completeness check.
pub fn summarize<I>(evaluations: I, compliance_threshold: u32) -> RequirementSummary
where
    I: IntoIterator<Item = (RequirementLevel, Option<EvaluationResult>)>,
{
    let mut main_total = 0u32;
    let mut main_failed = 0u32;
    let mut secondary_total = 0u32;
    let mut secondary_passed = 0u32;

    for (level, result) in evaluations {
        let is_yes = result == Some(EvaluationResult::Yes);
        match level {
            RequirementLevel::Primary => {
                main_total += 1;
                if !is_yes {
                    main_failed += 1;
                }
            }
            RequirementLevel::Secondary => {
                secondary_total += 1;
                if is_yes {
                    secondary_passed += 1;
                }
            }
        }
    }

    let secondary_compliance = percentage_half_up(secondary_passed, secondary_total);
    let is_passed = main_failed == 0 && secondary_compliance >= compliance_threshold;

    RequirementSummary {
        main_total,
        main_failed,
        secondary_total,
        secondary_passed,
        secondary_compliance,
        is_passed,
    }
}

/// `round(passed * 100 / total)` with half-up rounding; 0 when total is 0.
fn percentage_half_up(passed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (passed * 100 + total / 2) / total
}
