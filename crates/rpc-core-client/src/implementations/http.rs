//! HTTP client for core's command interface.
//!
//! Submissions go to `GET /tx?blob=<envelope>` and build information comes
//! from `GET /info`. Both endpoints answer with JSON.

use crate::{CallContext, CoreClient, CoreClientError};
use async_trait::async_trait;
use rpc_types::{CoreInfo, TxResponse};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Core client speaking HTTP.
pub struct HttpCoreClient {
	/// Shared HTTP client with connection pooling.
	client: reqwest::Client,
	/// Base URL of core, without trailing slash.
	base_url: String,
}

impl HttpCoreClient {
	/// Creates a client for the core instance at `base_url`.
	///
	/// `timeout` bounds every request regardless of the caller's deadline.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreClientError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.timeout(timeout)
			.build()
			.map_err(|e| CoreClientError::Network(e.to_string()))?;

		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	async fn get_json<T: DeserializeOwned>(
		&self,
		path: &str,
		query: &[(&str, &str)],
	) -> Result<T, CoreClientError> {
		let url = format!("{}{}", self.base_url, path);
		let response = self
			.client
			.get(&url)
			.query(query)
			.send()
			.await
			.map_err(|e| CoreClientError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(CoreClientError::Http {
				status: status.as_u16(),
				body,
			});
		}

		response
			.json::<T>()
			.await
			.map_err(|e| CoreClientError::Decode(e.to_string()))
	}
}

#[async_trait]
impl CoreClient for HttpCoreClient {
	async fn submit_transaction(
		&self,
		ctx: &CallContext,
		envelope: &str,
	) -> Result<TxResponse, CoreClientError> {
		ctx.run(self.get_json("/tx", &[("blob", envelope)])).await?
	}

	async fn info(&self, ctx: &CallContext) -> Result<CoreInfo, CoreClientError> {
		ctx.run(self.get_json("/info", &[])).await?
	}
}
