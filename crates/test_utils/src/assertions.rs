//! Custom Test Assertions
//!
//! Assertion helpers for decisions and money that give more meaningful
//! failure messages than bare `assert!`.

use core_kernel::Money;
use domain_adjudication::{Decision, Outcome};
use domain_claims::IndicatorCode;
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts the outcome, printing the reasoning trail on failure
pub fn assert_outcome(decision: &Decision, expected: Outcome) {
    assert_eq!(
        decision.outcome,
        expected,
        "Expected {} but got {} (confidence {}, {}). Reasoning:\n{}",
        expected,
        decision.outcome,
        decision.confidence,
        decision.rule,
        decision.reasoning_steps.join("\n")
    );
}

/// Asserts the confidence lies in `[min, max]`
pub fn assert_confidence_between(decision: &Decision, min: Decimal, max: Decimal) {
    let value = decision.confidence.value();
    assert!(
        value >= min && value <= max,
        "Confidence {} outside [{}, {}] for {} by {}",
        value,
        min,
        max,
        decision.outcome,
        decision.rule
    );
}

/// Asserts an indicator with the given code was raised
pub fn assert_has_indicator(decision: &Decision, code: IndicatorCode) {
    let codes: Vec<IndicatorCode> = decision.fraud_indicators.iter().map(|i| i.code).collect();
    assert!(
        codes.contains(&code),
        "Expected indicator {} among {:?}",
        code,
        codes
    );
}

/// Asserts the invariants every decision must satisfy
///
/// - confidence in [0, 1]
/// - compensation set if and only if the outcome is APPROVE
/// - indicators ordered most severe first
/// - reasoning ends with the outcome step
pub fn assert_decision_invariants(decision: &Decision) {
    let confidence = decision.confidence.value();
    assert!(
        confidence >= Decimal::ZERO && confidence <= Decimal::ONE,
        "Confidence {} out of range",
        confidence
    );

    if decision.compensation.is_some() {
        assert_eq!(
            decision.outcome,
            Outcome::Approve,
            "Compensation set on a {} decision",
            decision.outcome
        );
    }

    let ordered = decision
        .fraud_indicators
        .windows(2)
        .all(|pair| pair[0].severity <= pair[1].severity);
    assert!(ordered, "Fraud indicators are not ordered by severity");

    let last = decision
        .reasoning_steps
        .last()
        .expect("a decision always has reasoning steps");
    assert!(
        last.starts_with(&format!("Outcome {}", decision.outcome)),
        "Last reasoning step should state the outcome, got: {}",
        last
    );
}
