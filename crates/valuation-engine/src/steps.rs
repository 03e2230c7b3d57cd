//! Audit trail builder.
//!
//! One `StepRecord` per pipeline stage, in strict execution order. Steps are
//! append-only; a degraded upstream value (zero shares, zero assets) still
//! gets recorded with its degraded inputs and result rather than aborting.

use std::collections::BTreeMap;

use valuation_core::{
    FinancialFacts, FutureEarnings, StepDetail, StepFormula, StepRecord, StepValue,
    VerificationResult,
};

use crate::pricing::PriceBand;
use crate::ValuationPolicy;

pub struct AuditTrail {
    steps: Vec<StepRecord>,
}

fn pass_fail(ok: bool) -> &'static str {
    if ok {
        "pass"
    } else {
        "fail"
    }
}

impl AuditTrail {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }

    fn push(
        &mut self,
        title: &str,
        description: &str,
        inputs: BTreeMap<String, StepValue>,
        formula: StepFormula,
        calculation: Option<StepDetail>,
        result: StepDetail,
    ) {
        self.steps.push(StepRecord {
            step: self.steps.len() as u32 + 1,
            title: title.to_string(),
            description: description.to_string(),
            inputs,
            formula,
            calculation,
            result,
        });
    }

    /// Step 1: completeness check on the base inputs.
    pub fn record_validation(&mut self, facts: &FinancialFacts) {
        let mut inputs = BTreeMap::new();
        inputs.insert("net income".to_string(), facts.net_income.into());
        inputs.insert("total shares".to_string(), facts.total_shares.into());
        inputs.insert(
            "operating cash flow".to_string(),
            facts.operating_cash_flow.into(),
        );
        inputs.insert("total assets".to_string(), facts.total_assets.into());
        inputs.insert(
            "interest-bearing debt".to_string(),
            facts.interest_bearing_debt.into(),
        );
        inputs.insert("current price".to_string(), facts.current_price.into());

        let valid = facts.net_income > 0.0 && facts.total_shares > 0.0;
        self.push(
            "Base data validation",
            "Check that the core financial inputs are usable",
            inputs,
            StepFormula::Single("Data completeness check".to_string()),
            None,
            StepDetail::Scalar(
                if valid {
                    "Data valid"
                } else {
                    "Missing key data"
                }
                .to_string(),
            ),
        );
    }

    /// Step 2: earnings quality and balance-sheet health.
    pub fn record_verification(
        &mut self,
        facts: &FinancialFacts,
        verification: &VerificationResult,
        high_leverage_threshold: f64,
        policy: &ValuationPolicy,
    ) {
        // Display-only ratio; the check itself multiplies, so the guard is
        // needed here and not in the verifier.
        let cash_flow_ratio = if facts.net_income != 0.0 {
            facts.operating_cash_flow / facts.net_income
        } else {
            0.0
        };

        let mut inputs = BTreeMap::new();
        inputs.insert(
            "operating cash flow".to_string(),
            facts.operating_cash_flow.into(),
        );
        inputs.insert("net income".to_string(), facts.net_income.into());
        inputs.insert(
            "cash flow to income ratio".to_string(),
            cash_flow_ratio.into(),
        );
        inputs.insert("capex".to_string(), facts.capex.into());
        inputs.insert("depreciation".to_string(), facts.depreciation.into());
        inputs.insert(
            "leverage ratio".to_string(),
            verification.leverage_ratio.into(),
        );

        let formulas = StepFormula::Sequence(vec![
            format!(
                "profit is real = operating cash flow / net income >= {}",
                policy.cash_flow_cover
            ),
            format!(
                "low capital consumption = capex <= depreciation x {}",
                policy.capex_tolerance
            ),
            "leverage ratio = interest-bearing debt / total assets".to_string(),
        ]);

        let mut result = BTreeMap::new();
        result.insert(
            "profit is real".to_string(),
            pass_fail(verification.profit_is_real).to_string(),
        );
        result.insert(
            "low capital consumption".to_string(),
            pass_fail(verification.low_capital_consumption).to_string(),
        );
        result.insert(
            "leverage".to_string(),
            if verification.leverage_ratio < high_leverage_threshold {
                "normal".to_string()
            } else {
                "elevated".to_string()
            },
        );

        self.push(
            "Quality verification",
            "Verify profit quality and financial health",
            inputs,
            formulas,
            None,
            StepDetail::Breakdown(result),
        );
    }

    /// Step 3: three-year earnings projection.
    pub fn record_projection(
        &mut self,
        net_income: f64,
        growth_rate: f64,
        earnings: &FutureEarnings,
    ) {
        let mut inputs = BTreeMap::new();
        inputs.insert("current net income".to_string(), net_income.into());
        inputs.insert(
            "annual growth rate".to_string(),
            format!("{:.1}%", growth_rate * 100.0).into(),
        );

        let mut calculation = BTreeMap::new();
        calculation.insert(
            "year 1".to_string(),
            format!("{:.2} x (1 + {})^1 = {:.2}", net_income, growth_rate, earnings.year1),
        );
        calculation.insert(
            "year 2".to_string(),
            format!("{:.2} x (1 + {})^2 = {:.2}", net_income, growth_rate, earnings.year2),
        );
        calculation.insert(
            "year 3".to_string(),
            format!("{:.2} x (1 + {})^3 = {:.2}", net_income, growth_rate, earnings.year3),
        );

        let mut result = BTreeMap::new();
        result.insert("year1".to_string(), format!("{:.2}", earnings.year1));
        result.insert("year2".to_string(), format!("{:.2}", earnings.year2));
        result.insert("year3".to_string(), format!("{:.2}", earnings.year3));

        self.push(
            "Earnings growth projection",
            "Project the next three years of net income at the chosen growth rate",
            inputs,
            StepFormula::Single(
                "future income = current net income x (1 + growth rate)^years".to_string(),
            ),
            Some(StepDetail::Breakdown(calculation)),
            StepDetail::Breakdown(result),
        );
    }

    /// Step 4: leverage haircut on the PE multiple.
    pub fn record_pe_adjustment(
        &mut self,
        reasonable_pe: f64,
        leverage_ratio: f64,
        is_high_leverage: bool,
        adjusted_pe: f64,
        policy: &ValuationPolicy,
    ) {
        let mut inputs = BTreeMap::new();
        inputs.insert("base PE".to_string(), reasonable_pe.into());
        inputs.insert(
            "leverage ratio".to_string(),
            format!("{:.1}%", leverage_ratio * 100.0).into(),
        );
        inputs.insert(
            "high leverage".to_string(),
            if is_high_leverage { "yes" } else { "no" }.into(),
        );

        let (formula, calculation) = if is_high_leverage {
            (
                format!(
                    "adjusted PE = base PE x {} (high-leverage haircut)",
                    policy.leverage_pe_discount
                ),
                format!(
                    "{} x {} = {:.1}",
                    reasonable_pe, policy.leverage_pe_discount, adjusted_pe
                ),
            )
        } else {
            (
                "adjusted PE = base PE (no adjustment)".to_string(),
                format!("{} (no adjustment)", reasonable_pe),
            )
        };

        self.push(
            "PE multiple adjustment",
            "Discount the baseline PE multiple when leverage is high",
            inputs,
            StepFormula::Single(formula),
            Some(StepDetail::Scalar(calculation)),
            StepDetail::Scalar(format!("Adjusted PE: {:.1}x", adjusted_pe)),
        );
    }

    /// Step 5: intrinsic value and buy price.
    pub fn record_intrinsic_value(
        &mut self,
        year3_earnings: f64,
        adjusted_pe: f64,
        safety_margin: f64,
        total_shares: f64,
        band: &PriceBand,
    ) {
        let mut inputs = BTreeMap::new();
        inputs.insert("year-3 net income".to_string(), year3_earnings.into());
        inputs.insert("adjusted PE".to_string(), adjusted_pe.into());
        inputs.insert(
            "safety margin".to_string(),
            format!("{:.0}%", safety_margin * 100.0).into(),
        );
        inputs.insert("total shares".to_string(), total_shares.into());

        let formulas = StepFormula::Sequence(vec![
            "year-3 market value = year-3 net income x adjusted PE".to_string(),
            "safety value = year-3 market value x safety margin".to_string(),
            "intrinsic value per share = safety value / total shares".to_string(),
        ]);

        let safety_value = band.future_value * safety_margin;
        let mut calculation = BTreeMap::new();
        calculation.insert(
            "year-3 market value".to_string(),
            format!("{:.2} x {:.1} = {:.2}", year3_earnings, adjusted_pe, band.future_value),
        );
        calculation.insert(
            "safety value".to_string(),
            format!("{:.2} x {} = {:.2}", band.future_value, safety_margin, safety_value),
        );
        calculation.insert(
            "intrinsic value".to_string(),
            format!("{:.2} / {:.2} = {:.2}", safety_value, total_shares, band.buy_price),
        );

        self.push(
            "Intrinsic value calculation",
            "Derive the margin-of-safety buy price from year-3 earnings",
            inputs,
            formulas,
            Some(StepDetail::Breakdown(calculation)),
            StepDetail::Scalar(format!("Buy price: {:.2}", band.buy_price)),
        );
    }

    /// Step 6: conservative sell target.
    pub fn record_sell_price(
        &mut self,
        net_income: f64,
        year3_earnings: f64,
        total_shares: f64,
        band: &PriceBand,
        policy: &ValuationPolicy,
    ) {
        let mut inputs = BTreeMap::new();
        inputs.insert("current net income".to_string(), net_income.into());
        inputs.insert("year-3 net income".to_string(), year3_earnings.into());
        inputs.insert("total shares".to_string(), total_shares.into());

        let formulas = StepFormula::Sequence(vec![
            format!(
                "option 1: current income x {}x PE / shares",
                policy.sell_current_pe
            ),
            format!(
                "option 2: year-3 income x {}x PE x {} premium / shares",
                policy.sell_projected_pe, policy.sell_projected_premium
            ),
            "sell price = min(option 1, option 2)".to_string(),
        ]);

        let mut calculation = BTreeMap::new();
        calculation.insert(
            "option 1".to_string(),
            format!(
                "{:.2} x {} / {:.2} = {:.2}",
                net_income, policy.sell_current_pe, total_shares, band.sell_option_current
            ),
        );
        calculation.insert(
            "option 2".to_string(),
            format!(
                "{:.2} x {} x {} / {:.2} = {:.2}",
                year3_earnings,
                policy.sell_projected_pe,
                policy.sell_projected_premium,
                total_shares,
                band.sell_option_projected
            ),
        );
        calculation.insert(
            "selection".to_string(),
            format!(
                "min({:.2}, {:.2}) = {:.2}",
                band.sell_option_current, band.sell_option_projected, band.sell_price
            ),
        );

        self.push(
            "Sell price calculation",
            "Take the lower of two independent sell estimates",
            inputs,
            formulas,
            Some(StepDetail::Breakdown(calculation)),
            StepDetail::Scalar(format!("Sell price: {:.2}", band.sell_price)),
        );
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}
