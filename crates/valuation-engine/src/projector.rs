use valuation_core::FutureEarnings;

/// Compound current net income forward three years at the supplied growth
/// rate: `year_n = net_income × (1 + growth_rate)^n`.
///
/// Negative net income propagates signed compounding (a loss-maker projects
/// a widening loss under positive growth), which is a deliberate
/// simplification rather than a special case.
pub fn project(net_income: f64, growth_rate: f64) -> FutureEarnings {
    let g = 1.0 + growth_rate;
    FutureEarnings {
        year1: net_income * g,
        year2: net_income * g.powi(2),
        year3: net_income * g.powi(3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rel_eq(a: f64, b: f64) {
        let scale = b.abs().max(1.0);
        assert!((a - b).abs() / scale < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn compounds_three_years() {
        let fe = project(100.0, 0.10);
        assert_rel_eq(fe.year1, 110.0);
        assert_rel_eq(fe.year2, 121.0);
        assert_rel_eq(fe.year3, 133.1);
    }

    #[test]
    fn each_year_compounds_from_the_previous() {
        let fe = project(873.5, 0.07);
        assert_rel_eq(fe.year2, fe.year1 * 1.07);
        assert_rel_eq(fe.year3, fe.year2 * 1.07);
    }

    #[test]
    fn negative_income_widens_under_positive_growth() {
        let fe = project(-100.0, 0.10);
        assert_rel_eq(fe.year3, -133.1);
        assert!(fe.year3 < fe.year1);
    }

    #[test]
    fn negative_growth_narrows_a_loss() {
        let fe = project(-100.0, -0.10);
        assert_rel_eq(fe.year1, -90.0);
        assert!(fe.year3 > fe.year1);
    }

    #[test]
    fn zero_income_projects_zero() {
        let fe = project(0.0, 0.25);
        assert_eq!(fe.year1, 0.0);
        assert_eq!(fe.year3, 0.0);
    }
}
