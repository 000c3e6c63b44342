//! Payment intent routes
//!
//! The synchronous rebilling trigger: validates parameters, runs the
//! workflow at generation 0, and maps the workflow's terminal failures to
//! client-visible errors. Success and insufficient-funds outcomes are
//! both 200s with descriptive text; insufficient funds is not an error.

use axum::extract::{Path, State};
use axum::Json;
use rebill_billing::PaymentAttempt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Both fields optional so missingness is reported explicitly rather than
/// through a deserializer rejection.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub subscription_id: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponseBody {
    pub message: String,
}

/// POST /payment_intents
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentIntentRequest>,
) -> ApiResult<Json<PaymentIntentResponseBody>> {
    let (Some(subscription_id), Some(amount)) = (body.subscription_id, body.amount) else {
        return Err(ApiError::Validation("Invalid parameters".to_string()));
    };

    let report = match state.rebilling.rebill(&subscription_id, amount, 0).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(
                subscription_id = %subscription_id,
                error = %e,
                "Rebilling failed"
            );
            return Err(e.into());
        }
    };

    Ok(Json(PaymentIntentResponseBody {
        message: report.message(),
    }))
}

/// GET /subscriptions/{subscription_id}/payment_attempts
pub async fn attempt_history(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> ApiResult<Json<Vec<PaymentAttempt>>> {
    let attempts = state.rebilling.attempt_history(&subscription_id).await?;
    Ok(Json(attempts))
}
