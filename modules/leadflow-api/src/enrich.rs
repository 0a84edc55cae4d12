use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{info, warn};

use leadflow_enricher::{
    BatchEnrichmentError, EnrichRequest, EnrichResponse, MAX_CONTACTS_PER_REQUEST,
};

use crate::AppState;

/// HTTP status for each failure kind.
pub fn status_for(error: &BatchEnrichmentError) -> StatusCode {
    match error {
        BatchEnrichmentError::Authentication(_) => StatusCode::UNAUTHORIZED,
        BatchEnrichmentError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        BatchEnrichmentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        BatchEnrichmentError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BatchEnrichmentError::Failed(_) => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(error: &BatchEnrichmentError) -> Response {
    (status_for(error), Json(EnrichResponse::err(error))).into_response()
}

fn check(body: &EnrichRequest) -> Result<(), BatchEnrichmentError> {
    if body.api_key.trim().is_empty() {
        return Err(BatchEnrichmentError::InvalidInput(
            "missing credential".to_string(),
        ));
    }
    if body.contacts.is_empty() {
        return Err(BatchEnrichmentError::InvalidInput("no contacts".to_string()));
    }
    if body.contacts.len() > MAX_CONTACTS_PER_REQUEST {
        return Err(BatchEnrichmentError::InvalidInput(format!(
            "at most {MAX_CONTACTS_PER_REQUEST} contacts per request, got {}",
            body.contacts.len()
        )));
    }
    Ok(())
}

pub async fn api_enrich(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EnrichRequest>,
) -> Response {
    if let Err(err) = check(&body) {
        warn!(error = %err, "Rejected enrichment request");
        return error_response(&err);
    }

    let call = state
        .enricher
        .enrich(&body.api_key, &body.contacts, &body.options);
    let result = match tokio::time::timeout(state.call_timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(BatchEnrichmentError::Timeout(format!(
            "provider did not answer within {}s",
            state.call_timeout.as_secs()
        ))),
    };

    match result {
        Ok(outcome) => {
            let matched = outcome.results.iter().filter(|r| r.is_success()).count();
            info!(
                contacts = body.contacts.len(),
                matched,
                api_calls = outcome.api_calls,
                "Enrichment request served"
            );
            Json(EnrichResponse::ok(outcome.results, outcome.api_calls)).into_response()
        }
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "Enrichment request failed");
            error_response(&err)
        }
    }
}
