//! Compensation calculation for covered claims

use tracing::debug;

use core_kernel::{DomainPort, Money};
use domain_claims::Claim;
use crate::error::PolicyError;
use crate::matcher::ClauseMatch;

/// Computes the amount owed for a covered clause
///
/// Implementations may call out to a rating service; the engine treats any
/// error as "compensation unavailable" and never fails the decision.
pub trait PayoutCalculator: DomainPort {
    fn compute(&self, clause: &ClauseMatch, claim: &Claim) -> Result<Money, PolicyError>;
}

/// Applies the clause's payout formula to the reimbursable amount
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaPayoutCalculator;

impl DomainPort for FormulaPayoutCalculator {}

impl PayoutCalculator for FormulaPayoutCalculator {
    fn compute(&self, clause: &ClauseMatch, claim: &Claim) -> Result<Money, PolicyError> {
        let formula = clause
            .payout
            .as_ref()
            .ok_or_else(|| PolicyError::NoPayoutFormula(clause.section.clone()))?;
        let claimed = claim
            .reimbursable_amount()
            .ok_or(PolicyError::MissingClaimedAmount)?;

        let mut base = claimed;
        if let Some(deductible) = &formula.deductible {
            base = base.checked_sub(deductible)?.floor_zero();
        }

        let mut payout = formula.rate().apply(&base);
        if let Some(cap) = &formula.cap {
            payout = payout.checked_min(cap)?;
        }
        let payout = payout.round_to_currency();

        debug!(section = %clause.section, claimed = %claimed, payout = %payout, "payout computed");
        Ok(payout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use crate::clause::{ClauseCategory, PayoutFormula};

    fn clause(payout: Option<PayoutFormula>) -> ClauseMatch {
        ClauseMatch {
            section: "3.4".into(),
            title: "Theft or loss of travel documents".into(),
            category: Some(ClauseCategory::TheftOrLoss),
            strength: dec!(1),
            matched_keywords: vec!["stolen".into()],
            exclusion: None,
            payout,
        }
    }

    fn claim(amount: Option<Decimal>) -> Claim {
        let claim = Claim::new("My passport was stolen", Utc::now());
        match amount {
            Some(a) => claim.with_claimed_amount(Money::new(a, Currency::EUR)),
            None => claim,
        }
    }

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    #[test]
    fn test_deductible_then_rate_then_cap() {
        let formula = PayoutFormula {
            reimbursement_percent: dec!(80),
            cap: Some(eur(dec!(2000))),
            deductible: Some(eur(dec!(50))),
        };
        let calc = FormulaPayoutCalculator;

        let small = calc.compute(&clause(Some(formula.clone())), &claim(Some(dec!(1050)))).unwrap();
        assert_eq!(small.amount(), dec!(800));

        let large = calc.compute(&clause(Some(formula)), &claim(Some(dec!(9000)))).unwrap();
        assert_eq!(large.amount(), dec!(2000));
    }

    #[test]
    fn test_rounds_to_minor_unit() {
        let formula = PayoutFormula {
            reimbursement_percent: dec!(75),
            cap: None,
            deductible: None,
        };
        let payout = FormulaPayoutCalculator
            .compute(&clause(Some(formula)), &claim(Some(dec!(333.33))))
            .unwrap();

        assert_eq!(payout.amount(), dec!(250.00));
    }

    #[test]
    fn test_deductible_never_goes_negative() {
        let formula = PayoutFormula {
            reimbursement_percent: dec!(100),
            cap: None,
            deductible: Some(eur(dec!(50))),
        };
        let payout = FormulaPayoutCalculator
            .compute(&clause(Some(formula)), &claim(Some(dec!(20))))
            .unwrap();

        assert!(payout.is_zero());
    }

    #[test]
    fn test_missing_inputs() {
        let calc = FormulaPayoutCalculator;
        assert!(matches!(
            calc.compute(&clause(None), &claim(Some(dec!(100)))),
            Err(PolicyError::NoPayoutFormula(_))
        ));
        assert!(matches!(
            calc.compute(&clause(Some(PayoutFormula::full())), &claim(None)),
            Err(PolicyError::MissingClaimedAmount)
        ));
    }

    #[test]
    fn test_currency_mismatch_is_an_error() {
        let formula = PayoutFormula {
            reimbursement_percent: dec!(100),
            cap: Some(Money::new(dec!(1000), Currency::USD)),
            deductible: None,
        };
        let result =
            FormulaPayoutCalculator.compute(&clause(Some(formula)), &claim(Some(dec!(100))));

        assert!(matches!(result, Err(PolicyError::Financial(_))));
    }
}
