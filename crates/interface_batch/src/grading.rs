//! Benchmark grading
//!
//! Compares decisions with the expected answers shipped alongside a
//! benchmark. An expected answer names the decision a reviewer would
//! give and, optionally, a second decision that is also acceptable.
//! Grading never feeds back into the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use domain_adjudication::Outcome;

/// The reviewer's answer for one case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedAnswer {
    #[serde(deserialize_with = "outcome_any_case")]
    pub decision: Outcome,
    #[serde(default, deserialize_with = "optional_outcome_any_case")]
    pub acceptable_decision: Option<Outcome>,
}

impl ExpectedAnswer {
    pub fn new(decision: Outcome) -> Self {
        Self {
            decision,
            acceptable_decision: None,
        }
    }

    pub fn or_acceptable(mut self, decision: Outcome) -> Self {
        self.acceptable_decision = Some(decision);
        self
    }

    /// Grades an actual outcome against this answer
    pub fn grade(&self, actual: Outcome) -> Grade {
        if actual == self.decision {
            Grade::Exact
        } else if self.acceptable_decision == Some(actual) {
            Grade::Acceptable
        } else {
            Grade::Mismatch
        }
    }
}

/// How a decision compares with the expected answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Exact,
    Acceptable,
    Mismatch,
}

impl Grade {
    pub fn is_correct(&self) -> bool {
        matches!(self, Grade::Exact | Grade::Acceptable)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Exact => write!(f, "exact"),
            Grade::Acceptable => write!(f, "acceptable"),
            Grade::Mismatch => write!(f, "mismatch"),
        }
    }
}

/// Outcome and grade counts over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingSummary {
    pub total: usize,
    pub approved: usize,
    pub denied: usize,
    pub uncertain: usize,
    pub exact_matches: usize,
    pub acceptable_matches: usize,
    pub mismatches: usize,
    /// Cases without an expected answer
    pub ungraded: usize,
}

impl GradingSummary {
    pub fn record(&mut self, outcome: Outcome, grade: Option<Grade>) {
        self.total += 1;
        match outcome {
            Outcome::Approve => self.approved += 1,
            Outcome::Deny => self.denied += 1,
            Outcome::Uncertain => self.uncertain += 1,
        }
        match grade {
            Some(Grade::Exact) => self.exact_matches += 1,
            Some(Grade::Acceptable) => self.acceptable_matches += 1,
            Some(Grade::Mismatch) => self.mismatches += 1,
            None => self.ungraded += 1,
        }
    }

    pub fn graded(&self) -> usize {
        self.exact_matches + self.acceptable_matches + self.mismatches
    }

    /// Share of graded cases that were exact or acceptable; zero when
    /// nothing was graded
    pub fn accuracy(&self) -> Decimal {
        let graded = self.graded();
        if graded == 0 {
            return Decimal::ZERO;
        }
        let correct = Decimal::from(self.exact_matches + self.acceptable_matches);
        (correct / Decimal::from(graded)).round_dp(4)
    }
}

impl fmt::Display for GradingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} claims: {} approved, {} denied, {} uncertain",
            self.total, self.approved, self.denied, self.uncertain
        )?;
        if self.graded() > 0 {
            write!(
                f,
                "; {} exact, {} acceptable, {} mismatched, accuracy {:.1}%",
                self.exact_matches,
                self.acceptable_matches,
                self.mismatches,
                self.accuracy() * Decimal::ONE_HUNDRED
            )?;
        }
        Ok(())
    }
}

fn parse_outcome(raw: &str) -> Option<Outcome> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "APPROVE" | "APPROVED" => Some(Outcome::Approve),
        "DENY" | "DENIED" => Some(Outcome::Deny),
        "UNCERTAIN" => Some(Outcome::Uncertain),
        _ => None,
    }
}

fn outcome_any_case<'de, D>(deserializer: D) -> Result<Outcome, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_outcome(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown decision '{}'", raw)))
}

fn optional_outcome_any_case<'de, D>(deserializer: D) -> Result<Option<Outcome>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_outcome(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown decision '{}'", raw))),
    }
}
