//! Deterministic stock valuation engine.
//!
//! A single-pass, side-effect-free pipeline over normalized financial facts
//! and analyst parameters: quality verification, three-year earnings
//! projection, leverage-adjusted PE, buy/sell price derivation, a
//! recommendation, and a step-by-step audit trail of the whole calculation.
//!
//! The engine is total: every input combination yields a defined numeric
//! output. Missing fields arrive zero-defaulted, all divisions are guarded,
//! and `evaluate` never returns an error.

pub mod pricing;
pub mod projector;
pub mod recommend;
pub mod steps;
pub mod verifier;

use serde::{Deserialize, Serialize};
use valuation_core::{FinancialFacts, ValuationOutcome, ValuationParameters};

use steps::AuditTrail;

/// Fixed policy constants of the valuation model.
///
/// These were inline literals in the original model; they are kept
/// overridable here so the policy can be tuned without touching the
/// calculation logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationPolicy {
    /// Multiplier applied to the baseline PE for highly levered balance
    /// sheets (0.7 = a 30% haircut).
    pub leverage_pe_discount: f64,
    /// PE multiple applied to current earnings for the first sell estimate.
    pub sell_current_pe: f64,
    /// PE multiple applied to year-3 earnings for the second sell estimate.
    pub sell_projected_pe: f64,
    /// Premium multiplier on the projected-earnings sell estimate.
    pub sell_projected_premium: f64,
    /// Fraction of net income that operating cash flow must cover for the
    /// profit to count as real.
    pub cash_flow_cover: f64,
    /// How far capex may exceed depreciation before capital consumption is
    /// flagged.
    pub capex_tolerance: f64,
}

impl Default for ValuationPolicy {
    fn default() -> Self {
        Self {
            leverage_pe_discount: 0.7,
            sell_current_pe: 50.0,
            sell_projected_pe: 25.0,
            sell_projected_premium: 1.5,
            cash_flow_cover: 0.8,
            capex_tolerance: 1.2,
        }
    }
}

/// The valuation engine. Stateless; one instance can serve concurrent
/// callers without coordination.
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    policy: ValuationPolicy,
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ValuationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValuationPolicy {
        &self.policy
    }

    /// Run the full valuation pipeline.
    ///
    /// Infallible by contract: degraded inputs (zero shares, zero assets,
    /// negative income) produce degraded but defined outputs, never an
    /// error, NaN, or infinity.
    pub fn evaluate(
        &self,
        facts: &FinancialFacts,
        params: &ValuationParameters,
    ) -> ValuationOutcome {
        let mut trail = AuditTrail::new();
        trail.record_validation(facts);

        let (verification, is_high_leverage) =
            verifier::verify(facts, params.high_leverage_threshold, &self.policy);
        trail.record_verification(facts, &verification, params.high_leverage_threshold, &self.policy);

        let future_earnings = projector::project(facts.net_income, params.growth_rate);
        trail.record_projection(facts.net_income, params.growth_rate, &future_earnings);

        let adjusted_pe = pricing::adjust_pe(params.reasonable_pe, is_high_leverage, &self.policy);
        trail.record_pe_adjustment(
            params.reasonable_pe,
            verification.leverage_ratio,
            is_high_leverage,
            adjusted_pe,
            &self.policy,
        );

        let band = pricing::derive_prices(
            future_earnings.year3,
            adjusted_pe,
            params.safety_margin,
            facts.total_shares,
            facts.net_income,
            &self.policy,
        );
        trail.record_intrinsic_value(
            future_earnings.year3,
            adjusted_pe,
            params.safety_margin,
            facts.total_shares,
            &band,
        );
        trail.record_sell_price(
            facts.net_income,
            future_earnings.year3,
            facts.total_shares,
            &band,
            &self.policy,
        );

        let (recommendation, recommendation_reason) =
            recommend::resolve(facts.current_price, band.buy_price, band.sell_price);
        let upside = recommend::upside(band.buy_price, facts.current_price);
        let (risk_factors, risk_level) = recommend::assess_risk(&verification, is_high_leverage);

        tracing::debug!(
            buy_price = band.buy_price,
            sell_price = band.sell_price,
            recommendation = recommendation.label(),
            "valuation derived"
        );

        ValuationOutcome {
            verification,
            is_high_leverage,
            future_earnings,
            adjusted_pe,
            buy_price: band.buy_price,
            sell_price: band.sell_price,
            recommendation,
            recommendation_reason,
            recommendation_color: recommendation.color().to_string(),
            upside,
            risk_factors,
            risk_level,
            calculation_steps: trail.into_steps(),
            parameters: *params,
            current_price: facts.current_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::{Recommendation, RiskLevel};

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} != {} (tol {})", a, b, tol);
    }

    fn base_facts() -> FinancialFacts {
        FinancialFacts {
            net_income: 100.0,
            total_shares: 10.0,
            operating_cash_flow: 90.0,
            total_assets: 50.0,
            interest_bearing_debt: 30.0,
            capex: 10.0,
            depreciation: 10.0,
            current_price: 100.0,
        }
    }

    fn base_params() -> ValuationParameters {
        ValuationParameters {
            growth_rate: 0.10,
            reasonable_pe: 20.0,
            safety_margin: 0.5,
            high_leverage_threshold: 0.7,
        }
    }

    #[test]
    fn normal_leverage_scenario() {
        let outcome = ValuationEngine::new().evaluate(&base_facts(), &base_params());

        // leverage 30/50 = 0.6, below the 0.7 threshold
        assert!(!outcome.is_high_leverage);
        assert_close(outcome.verification.leverage_ratio, 0.6, 1e-12);
        assert_close(outcome.future_earnings.year3, 133.1, 1e-9);
        assert_close(outcome.adjusted_pe, 20.0, 1e-12);
        assert_close(outcome.buy_price, 133.1, 1e-9);
    }

    #[test]
    fn high_leverage_scenario() {
        let mut facts = base_facts();
        facts.interest_bearing_debt = 40.0; // leverage 0.8 >= 0.7

        let outcome = ValuationEngine::new().evaluate(&facts, &base_params());

        assert!(outcome.is_high_leverage);
        assert_close(outcome.adjusted_pe, 14.0, 1e-12);
        // future value 133.1 * 14 = 1863.4, buy 1863.4 * 0.5 / 10 = 93.17
        assert_close(outcome.buy_price, 93.17, 1e-9);
    }

    #[test]
    fn zero_shares_scenario_degrades_without_panic() {
        let mut facts = base_facts();
        facts.total_shares = 0.0;

        let outcome = ValuationEngine::new().evaluate(&facts, &base_params());

        assert_eq!(outcome.buy_price, 0.0);
        assert_eq!(outcome.sell_price, 0.0);
        assert_eq!(outcome.calculation_steps.len(), 6);
        assert!(outcome.buy_price.is_finite());
    }

    #[test]
    fn evaluate_is_deterministic() {
        let engine = ValuationEngine::new();
        let a = engine.evaluate(&base_facts(), &base_params());
        let b = engine.evaluate(&base_facts(), &base_params());
        assert_eq!(a, b);
    }

    #[test]
    fn growth_compounding_holds_within_tolerance() {
        let outcome = ValuationEngine::new().evaluate(&base_facts(), &base_params());
        let fe = outcome.future_earnings;
        let rel = |a: f64, b: f64| (a - b).abs() / b.abs();
        assert!(rel(fe.year2, fe.year1 * 1.10) < 1e-9);
        assert!(rel(fe.year3, fe.year2 * 1.10) < 1e-9);
    }

    #[test]
    fn sell_price_is_the_minimum_estimate() {
        let outcome = ValuationEngine::new().evaluate(&base_facts(), &base_params());
        let option1: f64 = 100.0 * 50.0 / 10.0;
        let option2 = outcome.future_earnings.year3 * 25.0 * 1.5 / 10.0;
        assert_close(outcome.sell_price, option1.min(option2), 1e-9);
    }

    #[test]
    fn audit_trail_is_ordered_and_complete() {
        let outcome = ValuationEngine::new().evaluate(&base_facts(), &base_params());
        let titles: Vec<&str> = outcome
            .calculation_steps
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec![
                "Base data validation",
                "Quality verification",
                "Earnings growth projection",
                "PE multiple adjustment",
                "Intrinsic value calculation",
                "Sell price calculation",
            ]
        );
        for (i, step) in outcome.calculation_steps.iter().enumerate() {
            assert_eq!(step.step as usize, i + 1);
        }
    }

    #[test]
    fn recommendation_and_risk_wired_through() {
        let mut facts = base_facts();
        // Price well below the buy price: 100 < 133.1
        let outcome = ValuationEngine::new().evaluate(&facts, &base_params());
        assert_eq!(outcome.recommendation, Recommendation::Buy);
        assert_eq!(outcome.recommendation_color, "green");
        assert_close(outcome.upside, 33.1, 1e-9);
        assert_eq!(outcome.risk_level, RiskLevel::Low);

        // Push the price above the sell target
        facts.current_price = 600.0;
        let outcome = ValuationEngine::new().evaluate(&facts, &base_params());
        assert_eq!(outcome.recommendation, Recommendation::Sell);
        assert_eq!(outcome.recommendation_color, "red");
    }

    #[test]
    fn zero_facts_produce_a_fully_defined_outcome() {
        let outcome =
            ValuationEngine::new().evaluate(&FinancialFacts::default(), &base_params());
        assert_eq!(outcome.buy_price, 0.0);
        assert_eq!(outcome.sell_price, 0.0);
        assert_eq!(outcome.upside, 0.0);
        assert_eq!(outcome.recommendation, Recommendation::Hold);
        assert_eq!(outcome.calculation_steps.len(), 6);
        assert!(outcome.future_earnings.year3.is_finite());
    }

    #[test]
    fn custom_policy_overrides_constants() {
        let policy = ValuationPolicy {
            leverage_pe_discount: 0.5,
            ..Default::default()
        };
        let mut facts = base_facts();
        facts.interest_bearing_debt = 40.0;

        let outcome = ValuationEngine::with_policy(policy).evaluate(&facts, &base_params());
        assert_close(outcome.adjusted_pe, 10.0, 1e-12);
    }
}
