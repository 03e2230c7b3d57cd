use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ValuationError;

/// Normalized company financial facts for one valuation call.
///
/// Every field defaults to 0 when absent from the request; the engine never
/// fails on missing data, it only produces degraded (zero-valued) results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialFacts {
    /// Trailing annual net income. May be zero or negative.
    pub net_income: f64,
    /// Shares outstanding, the per-share divisor. Accepts the
    /// `sharesOutstanding` alias used by quote providers.
    #[serde(alias = "sharesOutstanding")]
    pub total_shares: f64,
    pub operating_cash_flow: f64,
    pub total_assets: f64,
    pub interest_bearing_debt: f64,
    pub capex: f64,
    pub depreciation: f64,
    pub current_price: f64,
}

/// Analyst-chosen valuation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuationParameters {
    /// Annual earnings growth rate as a fraction (0.10 = 10%).
    pub growth_rate: f64,
    /// Baseline price-to-earnings multiple before any leverage haircut.
    #[serde(rename = "reasonablePE")]
    pub reasonable_pe: f64,
    /// Margin of safety applied to the terminal value, in (0, 1].
    pub safety_margin: f64,
    /// Leverage ratio at or above which the PE haircut kicks in, in (0, 1].
    pub high_leverage_threshold: f64,
}

impl Default for ValuationParameters {
    fn default() -> Self {
        Self {
            growth_rate: 0.10,
            reasonable_pe: 20.0,
            safety_margin: 0.5,
            high_leverage_threshold: 0.7,
        }
    }
}

impl ValuationParameters {
    /// Range validation for caller-supplied parameters. The engine itself
    /// accepts any values; this is for the request boundary.
    pub fn validate(&self) -> Result<(), ValuationError> {
        if !self.growth_rate.is_finite() || self.growth_rate <= -1.0 {
            return Err(ValuationError::InvalidParameter(
                "growthRate must be a finite fraction greater than -1".to_string(),
            ));
        }
        if !(self.reasonable_pe > 0.0) {
            return Err(ValuationError::InvalidParameter(
                "reasonablePE must be positive".to_string(),
            ));
        }
        if !(self.safety_margin > 0.0 && self.safety_margin <= 1.0) {
            return Err(ValuationError::InvalidParameter(
                "safetyMargin must be in (0, 1]".to_string(),
            ));
        }
        if !(self.high_leverage_threshold > 0.0 && self.high_leverage_threshold <= 1.0) {
            return Err(ValuationError::InvalidParameter(
                "highLeverageThreshold must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Earnings-quality and balance-sheet health checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Operating cash flow covers at least 80% of reported net income.
    pub profit_is_real: bool,
    /// Net income is positive.
    pub profit_sustainable: bool,
    /// Capex stays within 120% of depreciation.
    pub low_capital_consumption: bool,
    /// Interest-bearing debt over total assets, 0 when assets are 0.
    pub leverage_ratio: f64,
}

/// Three-year compounded earnings projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FutureEarnings {
    pub year1: f64,
    pub year2: f64,
    pub year3: f64,
}

/// A value shown in an audit step: raw number or pre-formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Number(f64),
    Text(String),
}

impl From<f64> for StepValue {
    fn from(v: f64) -> Self {
        StepValue::Number(v)
    }
}

impl From<String> for StepValue {
    fn from(v: String) -> Self {
        StepValue::Text(v)
    }
}

impl From<&str> for StepValue {
    fn from(v: &str) -> Self {
        StepValue::Text(v.to_string())
    }
}

/// One formula line, or the ordered list of formulas a step applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepFormula {
    Single(String),
    Sequence(Vec<String>),
}

/// A step's worked calculation or result: a single line, or a small keyed
/// breakdown when the step produces several figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepDetail {
    Scalar(String),
    Breakdown(BTreeMap<String, String>),
}

/// One entry of the calculation audit trail. Steps are append-only and
/// their order is the canonical presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// 1-based, sequential.
    pub step: u32,
    pub title: String,
    pub description: String,
    pub inputs: BTreeMap<String, StepValue>,
    pub formula: StepFormula,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<StepDetail>,
    pub result: StepDetail,
}

/// Recommendation signal from comparing the current price against the
/// buy/sell band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        }
    }

    /// Presentation color tag consumed by UI callers.
    pub fn color(&self) -> &'static str {
        match self {
            Recommendation::Buy => "green",
            Recommendation::Hold => "yellow",
            Recommendation::Sell => "red",
        }
    }
}

/// Aggregate risk bucket derived from the number of failed checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a risk-factor count: 0 is Low, 1-2 Medium, 3+ High.
    pub fn from_factor_count(count: usize) -> Self {
        match count {
            0 => RiskLevel::Low,
            1 | 2 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

/// Complete result of one valuation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationOutcome {
    pub verification: VerificationResult,
    pub is_high_leverage: bool,
    pub future_earnings: FutureEarnings,
    #[serde(rename = "adjustedPE")]
    pub adjusted_pe: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    pub recommendation_color: String,
    /// Percentage distance from current price to the buy price.
    pub upside: f64,
    pub risk_factors: Vec<String>,
    pub risk_level: RiskLevel,
    pub calculation_steps: Vec<StepRecord>,
    /// Effective parameters the calculation ran with.
    pub parameters: ValuationParameters,
    pub current_price: f64,
}
