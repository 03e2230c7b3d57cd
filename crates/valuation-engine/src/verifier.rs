use valuation_core::{FinancialFacts, VerificationResult};

use crate::ValuationPolicy;

/// Run the earnings-quality and balance-sheet checks.
///
/// Returns the verification result plus the high-leverage flag. All checks
/// degrade gracefully: zero total assets means a leverage ratio of 0 (not an
/// error), and the cash-flow cover check multiplies instead of dividing so a
/// zero net income cannot blow up.
pub fn verify(
    facts: &FinancialFacts,
    high_leverage_threshold: f64,
    policy: &ValuationPolicy,
) -> (VerificationResult, bool) {
    let leverage_ratio = if facts.total_assets > 0.0 {
        facts.interest_bearing_debt / facts.total_assets
    } else {
        0.0
    };

    let verification = VerificationResult {
        profit_is_real: facts.operating_cash_flow >= facts.net_income * policy.cash_flow_cover,
        profit_sustainable: facts.net_income > 0.0,
        low_capital_consumption: facts.capex <= facts.depreciation * policy.capex_tolerance,
        leverage_ratio,
    };

    let is_high_leverage = leverage_ratio >= high_leverage_threshold;

    (verification, is_high_leverage)
}
