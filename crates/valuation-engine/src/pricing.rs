use crate::ValuationPolicy;

/// Buy/sell price band plus the intermediates the audit trail reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    /// Terminal value: year-3 earnings × adjusted PE.
    pub future_value: f64,
    /// Margin-of-safety discounted terminal value, per share.
    pub buy_price: f64,
    /// Current-earnings multiple estimate, per share.
    pub sell_option_current: f64,
    /// Projected-earnings multiple estimate with premium, per share.
    pub sell_option_projected: f64,
    /// The lower of the two sell estimates.
    pub sell_price: f64,
}

/// Apply the leverage haircut to the baseline PE multiple.
pub fn adjust_pe(reasonable_pe: f64, is_high_leverage: bool, policy: &ValuationPolicy) -> f64 {
    if is_high_leverage {
        reasonable_pe * policy.leverage_pe_discount
    } else {
        reasonable_pe
    }
}

/// Derive the buy price and the conservative sell price.
///
/// Buy: `year3 × adjusted_pe × safety_margin / total_shares`. Sell: the
/// minimum of a current-earnings multiple and a premium-adjusted
/// projected-earnings multiple. The minimum is load-bearing: taking the
/// lower of two independently derived ceilings keeps the sell target
/// deliberately biased downward. Zero shares yields a zero band instead of
/// a division by zero.
pub fn derive_prices(
    year3_earnings: f64,
    adjusted_pe: f64,
    safety_margin: f64,
    total_shares: f64,
    net_income: f64,
    policy: &ValuationPolicy,
) -> PriceBand {
    let future_value = year3_earnings * adjusted_pe;

    if total_shares <= 0.0 {
        return PriceBand {
            future_value,
            buy_price: 0.0,
            sell_option_current: 0.0,
            sell_option_projected: 0.0,
            sell_price: 0.0,
        };
    }

    let buy_price = (future_value * safety_margin) / total_shares;

    let sell_option_current = (net_income * policy.sell_current_pe) / total_shares;
    let sell_option_projected =
        (year3_earnings * policy.sell_projected_pe * policy.sell_projected_premium) / total_shares;
    let sell_price = sell_option_current.min(sell_option_projected);

    PriceBand {
        future_value,
        buy_price,
        sell_option_current,
        sell_option_projected,
        sell_price,
    }
}
