//! Valuation API routes.
//!
//! The engine itself never fails; the only failure class here is boundary
//! validation of the manual-entry request before the engine is invoked.

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use valuation_core::{FinancialFacts, ValuationError, ValuationOutcome, ValuationParameters};

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    pub financial_data: Option<FinancialFacts>,
    #[serde(default)]
    pub parameters: ValuationParameters,
    /// Display currency echoed back to the caller; defaults to USD.
    /// Formatting stays the caller's responsibility.
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResponse {
    #[serde(flatten)]
    pub outcome: ValuationOutcome,
    pub currency: String,
    pub calculation_time: DateTime<Utc>,
}

pub fn valuation_routes() -> Router<AppState> {
    Router::new().route("/api/valuation/calculate", post(calculate_valuation))
}

async fn calculate_valuation(
    State(state): State<AppState>,
    Json(request): Json<ValuationRequest>,
) -> Result<Json<ApiResponse<ValuationResponse>>, AppError> {
    let facts = request.financial_data.ok_or_else(|| {
        AppError::BadRequest(ValuationError::MissingData("financialData".to_string()).to_string())
    })?;

    request
        .parameters
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let outcome = state.engine.evaluate(&facts, &request.parameters);

    tracing::info!(
        recommendation = outcome.recommendation.label(),
        buy_price = outcome.buy_price,
        sell_price = outcome.sell_price,
        "valuation calculated"
    );

    Ok(Json(ApiResponse::success(ValuationResponse {
        outcome,
        currency: request.currency.unwrap_or_else(|| "USD".to_string()),
        calculation_time: Utc::now(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::Recommendation;

    fn request_with_facts() -> ValuationRequest {
        ValuationRequest {
            financial_data: Some(FinancialFacts {
                net_income: 100.0,
                total_shares: 10.0,
                operating_cash_flow: 90.0,
                total_assets: 50.0,
                interest_bearing_debt: 30.0,
                capex: 10.0,
                depreciation: 10.0,
                current_price: 100.0,
            }),
            parameters: ValuationParameters::default(),
            currency: None,
        }
    }

    #[tokio::test]
    async fn calculate_rejects_missing_financial_data() {
        let request = ValuationRequest {
            financial_data: None,
            parameters: ValuationParameters::default(),
            currency: None,
        };

        let err = calculate_valuation(State(AppState::new()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn calculate_rejects_out_of_range_parameters() {
        let mut request = request_with_facts();
        request.parameters.safety_margin = 2.0;

        let err = calculate_valuation(State(AppState::new()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn calculate_defaults_currency_and_attaches_time() {
        let Json(response) = calculate_valuation(State(AppState::new()), Json(request_with_facts()))
            .await
            .unwrap();

        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.currency, "USD");
        assert_eq!(data.outcome.recommendation, Recommendation::Buy);
        assert!((data.outcome.buy_price - 133.1).abs() < 1e-9);
        assert!(data.calculation_time <= Utc::now());
    }

    #[test]
    fn request_body_fills_defaults() {
        let request: ValuationRequest = serde_json::from_str(
            r#"{"financialData": {"netIncome": 50.0, "totalShares": 5.0}}"#,
        )
        .unwrap();

        assert!(request.financial_data.is_some());
        assert_eq!(request.parameters, ValuationParameters::default());
        assert!(request.currency.is_none());
    }

    #[test]
    fn response_flattens_outcome_into_one_object() {
        let state = AppState::new();
        let outcome = state.engine.evaluate(
            &request_with_facts().financial_data.unwrap(),
            &ValuationParameters::default(),
        );
        let response = ValuationResponse {
            outcome,
            currency: "HKD".to_string(),
            calculation_time: Utc::now(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("buyPrice").is_some());
        assert!(value.get("calculationSteps").is_some());
        assert!(value.get("riskLevel").is_some());
        assert_eq!(value["currency"], "HKD");
        assert!(value.get("calculationTime").is_some());
    }
}
