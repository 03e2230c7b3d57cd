//! Recommendation and risk resolution.
//!
//! Band boundaries are a policy decision pending product sign-off: at or
//! below the buy price is a Buy, at or above the sell target is a Sell,
//! anything in between is a Hold. Buy is checked first so a degenerate band
//! (sell target below buy price) resolves toward the entry signal.

use valuation_core::{Recommendation, RiskLevel, VerificationResult};

/// Map the current price against the buy/sell band.
pub fn resolve(current_price: f64, buy_price: f64, sell_price: f64) -> (Recommendation, String) {
    if current_price <= 0.0 {
        return (
            Recommendation::Hold,
            "No usable market price; holding by default".to_string(),
        );
    }

    if current_price <= buy_price {
        (
            Recommendation::Buy,
            format!(
                "Current price {:.2} is at or below the buy price {:.2}, inside the margin of safety",
                current_price, buy_price
            ),
        )
    } else if current_price >= sell_price {
        (
            Recommendation::Sell,
            format!(
                "Current price {:.2} is at or above the sell target {:.2}",
                current_price, sell_price
            ),
        )
    } else {
        (
            Recommendation::Hold,
            format!(
                "Current price {:.2} sits between the buy price {:.2} and the sell target {:.2}",
                current_price, buy_price, sell_price
            ),
        )
    }
}

/// Percentage distance from the current price up to the buy price.
/// Zero when there is no usable current price.
pub fn upside(buy_price: f64, current_price: f64) -> f64 {
    if current_price > 0.0 {
        (buy_price - current_price) / current_price * 100.0
    } else {
        0.0
    }
}

/// One human-readable factor per failed check, bucketed into a risk level.
pub fn assess_risk(
    verification: &VerificationResult,
    is_high_leverage: bool,
) -> (Vec<String>, RiskLevel) {
    let mut factors = Vec::new();

    if !verification.profit_is_real {
        factors.push("Operating cash flow lags reported profit".to_string());
    }
    if !verification.profit_sustainable {
        factors.push("Company is not currently profitable".to_string());
    }
    if !verification.low_capital_consumption {
        factors.push("Capital spending outpaces depreciation".to_string());
    }
    if is_high_leverage {
        factors.push(format!(
            "High balance-sheet leverage ({:.1}% of assets is interest-bearing debt)",
            verification.leverage_ratio * 100.0
        ));
    }

    let level = RiskLevel::from_factor_count(factors.len());
    (factors, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_below_buy_is_a_buy() {
        let (rec, reason) = resolve(80.0, 100.0, 300.0);
        assert_eq!(rec, Recommendation::Buy);
        assert!(reason.contains("buy price"));
    }

    #[test]
    fn price_exactly_at_band_edges() {
        let (rec, _) = resolve(100.0, 100.0, 300.0);
        assert_eq!(rec, Recommendation::Buy);
        let (rec, _) = resolve(300.0, 100.0, 300.0);
        assert_eq!(rec, Recommendation::Sell);
    }

    #[test]
    fn price_inside_band_is_a_hold() {
        let (rec, _) = resolve(200.0, 100.0, 300.0);
        assert_eq!(rec, Recommendation::Hold);
    }

    #[test]
    fn zero_price_holds_by_default() {
        let (rec, reason) = resolve(0.0, 100.0, 300.0);
        assert_eq!(rec, Recommendation::Hold);
        assert!(reason.contains("No usable market price"));
    }

    #[test]
    fn degenerate_band_resolves_to_buy_first() {
        // Sell target below buy price: entry signal wins at a low price.
        let (rec, _) = resolve(50.0, 100.0, 80.0);
        assert_eq!(rec, Recommendation::Buy);
    }

    #[test]
    fn upside_is_percent_distance_to_buy_price() {
        assert!((upside(133.1, 100.0) - 33.1).abs() < 1e-9);
        assert!((upside(80.0, 100.0) + 20.0).abs() < 1e-9);
        assert_eq!(upside(133.1, 0.0), 0.0);
    }

    #[test]
    fn risk_factors_accumulate_per_failed_check() {
        let clean = VerificationResult {
            profit_is_real: true,
            profit_sustainable: true,
            low_capital_consumption: true,
            leverage_ratio: 0.3,
        };
        let (factors, level) = assess_risk(&clean, false);
        assert!(factors.is_empty());
        assert_eq!(level, RiskLevel::Low);

        let troubled = VerificationResult {
            profit_is_real: false,
            profit_sustainable: false,
            low_capital_consumption: true,
            leverage_ratio: 0.8,
        };
        let (factors, level) = assess_risk(&troubled, true);
        assert_eq!(factors.len(), 3);
        assert_eq!(level, RiskLevel::High);
    }
}
