//! HTTP binding for the trainer service

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::Instrument;
use uuid::Uuid;

use super::envelope::{
    encode_fault, encode_get_trainer_response, encode_post_trainer_response, FaultCode,
    SoapRequest,
};
use crate::service::{ServiceError, TrainerService};
use crate::{APP_VERSION, SOAP_REQUEST_BYTES_MAX};

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Build the router: `POST /soap` and `GET /health`.
pub fn router(service: TrainerService) -> Router {
    Router::new()
        .route("/soap", post(soap_endpoint))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(SOAP_REQUEST_BYTES_MAX))
        .with_state(service)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": APP_VERSION,
    }))
}

async fn soap_endpoint(State(service): State<TrainerService>, body: String) -> Response {
    let span = tracing::info_span!("soap", request_id = %Uuid::new_v4());
    async move {
        let request = match SoapRequest::decode(&body) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "rejected envelope");
                return fault(FaultCode::Client, &e.to_string());
            }
        };
        tracing::debug!(operation = request.operation(), "dispatching");

        let result = match request {
            SoapRequest::GetTrainer { id } => service
                .get_trainer(id)
                .await
                .map(|lines| encode_get_trainer_response(&lines)),
            SoapRequest::PostTrainer(trainer) => service
                .post_trainer(trainer)
                .await
                .map(|message| encode_post_trainer_response(&message)),
        };

        match result {
            Ok(xml) => xml_response(StatusCode::OK, xml),
            Err(e @ ServiceError::InvalidArgument(_)) => fault(FaultCode::Client, &e.to_string()),
            Err(e @ ServiceError::StorageUnavailable(_)) => {
                tracing::error!(error = %e, "storage failure");
                fault(FaultCode::Server, &e.to_string())
            }
        }
    }
    .instrument(span)
    .await
}

fn fault(code: FaultCode, message: &str) -> Response {
    xml_response(StatusCode::INTERNAL_SERVER_ERROR, encode_fault(code, message))
}

fn xml_response(status: StatusCode, xml: String) -> Response {
    (status, [(header::CONTENT_TYPE, SOAP_CONTENT_TYPE)], xml).into_response()
}
