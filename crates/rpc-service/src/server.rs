//! HTTP servers for the RPC service.
//!
//! The API listener accepts JSON-RPC 2.0 calls on `POST /`. The metrics
//! listener exposes `GET /metrics` in the Prometheus text format.

use axum::{
	body::Bytes,
	extract::{DefaultBodyLimit, State},
	http::{header, StatusCode},
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use rpc_config::{ApiConfig, MetricsConfig};
use rpc_core_client::CallContext;
use rpc_methods::{GetVersionInfoHandler, SendTransactionHandler};
use rpc_metrics::MetricsRegistry;
use rpc_types::{JsonRpcRequest, JsonRpcResponse, Params, RpcError, SendTransactionRequest};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub send_transaction: Arc<SendTransactionHandler>,
	pub get_version_info: Arc<GetVersionInfoHandler>,
	/// Deadline applied to every call.
	pub request_timeout: Duration,
}

/// Builds the JSON-RPC router.
pub fn api_router(state: AppState, max_request_size: usize) -> Router {
	Router::new()
		.route("/", post(handle_rpc))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive())
				.layer(DefaultBodyLimit::max(max_request_size)),
		)
		.with_state(state)
}

/// Builds the metrics router.
pub fn metrics_router(registry: Arc<MetricsRegistry>) -> Router {
	Router::new()
		.route("/metrics", get(handle_metrics))
		.with_state(registry)
}

/// Starts the JSON-RPC server and serves until it fails.
pub async fn start_api_server(
	config: &ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = api_router(state, config.max_request_size);

	let bind_address = format!("{}:{}", config.host, config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("JSON-RPC server starting on {}", bind_address);

	axum::serve(listener, app).await?;
	Ok(())
}

/// Starts the metrics server and serves until it fails.
pub async fn start_metrics_server(
	config: &MetricsConfig,
	registry: Arc<MetricsRegistry>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = metrics_router(registry);

	let bind_address = format!("{}:{}", config.host, config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("Metrics server starting on {}", bind_address);

	axum::serve(listener, app).await?;
	Ok(())
}

/// Handles POST / requests.
///
/// Framing problems are answered with JSON-RPC errors rather than HTTP
/// errors, so clients always receive a JSON-RPC envelope.
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Json<JsonRpcResponse> {
	let value: Value = match serde_json::from_slice(&body) {
		Ok(value) => value,
		Err(e) => {
			tracing::debug!(error = %e, "Rejected unparsable request body");
			return Json(JsonRpcResponse::failure(
				Value::Null,
				RpcError::parse_error("parse error"),
			));
		},
	};

	let id = value.get("id").cloned().unwrap_or(Value::Null);
	let request: JsonRpcRequest = match serde_json::from_value(value) {
		Ok(request) => request,
		Err(e) => {
			tracing::debug!(error = %e, "Rejected malformed request");
			return Json(JsonRpcResponse::failure(
				id,
				RpcError::invalid_request(format!("invalid request: {}", e)),
			));
		},
	};
	if request.jsonrpc != "2.0" {
		return Json(JsonRpcResponse::failure(
			id,
			RpcError::invalid_request("jsonrpc must be \"2.0\""),
		));
	}

	let id = request.id.clone();
	let response = match dispatch(&state, request).await {
		Ok(result) => JsonRpcResponse::success(id, result),
		Err(err) => JsonRpcResponse::failure(id, err),
	};
	Json(response)
}

async fn dispatch(state: &AppState, request: JsonRpcRequest) -> Result<Value, RpcError> {
	let ctx = CallContext::with_timeout(state.request_timeout);

	match request.method.as_str() {
		"sendTransaction" => {
			let params = send_transaction_params(request.params)?;
			let response = state.send_transaction.handle(&ctx, params).await?;
			to_result(&response)
		},
		"getVersionInfo" => {
			let response = state.get_version_info.handle(&ctx).await;
			to_result(&response)
		},
		other => Err(RpcError::method_not_found(other)),
	}
}

/// Accepts `{"transaction": ".."}` or a single positional string.
fn send_transaction_params(params: Params) -> Result<SendTransactionRequest, RpcError> {
	match params {
		Params::Object(map) => serde_json::from_value(Value::Object(map))
			.map_err(|e| RpcError::invalid_params(format!("invalid parameters: {}", e))),
		Params::Array(values) => match values.as_slice() {
			[Value::String(transaction)] => Ok(SendTransactionRequest {
				transaction: transaction.clone(),
			}),
			_ => Err(RpcError::invalid_params(
				"expected a single transaction parameter",
			)),
		},
		Params::None => Err(RpcError::invalid_params("missing parameters")),
	}
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
	serde_json::to_value(value).map_err(|e| {
		tracing::error!(error = %e, "Could not encode result");
		RpcError::internal("could not encode result")
	})
}

/// Handles GET /metrics requests.
async fn handle_metrics(State(registry): State<Arc<MetricsRegistry>>) -> Response {
	registry.run_upkeep();
	match registry.render() {
		Ok(body) => (
			[(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
			body,
		)
			.into_response(),
		Err(e) => {
			tracing::warn!("Metrics rendering failed: {}", e);
			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		},
	}
}
