//! StorefrontCartGateway - GraphQL implementation of the remote cart gateway.
//!
//! Each gateway operation is one POST to the storefront endpoint. HTTP and
//! GraphQL-level failures map to `Transport`, `userErrors` to
//! `RemoteValidation`, and a missing cart to `EmptyResult`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use cartsync_core::config::GatewayConfig;
use cartsync_core::error::{CartError, Result};
use cartsync_core::{CartAttribute, CartGateway, CartLineInput, RemoteCart};

use super::documents::CartMutation;
use super::wire::{
    GraphqlResponse, add_variables, create_variables, parse_cart_response, remove_variables,
    update_variables,
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

#[derive(Clone)]
pub struct StorefrontCartGateway {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl StorefrontCartGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Builds a gateway from configuration. The endpoint must be set.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(CartError::config(
                "gateway.endpoint is not set (config.toml or CARTSYNC_ENDPOINT)",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CartError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_token: config.access_token.clone(),
        })
    }

    async fn execute(&self, mutation: CartMutation, variables: Value) -> Result<RemoteCart> {
        let operation = mutation.operation();
        let body = json!({
            "query": mutation.document(),
            "variables": variables,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.access_token {
            request = request.header(ACCESS_TOKEN_HEADER, token);
        }

        tracing::debug!(operation, "Sending storefront cart request");

        let response = request.send().await.map_err(|err| {
            CartError::transport(format!("{} request failed: {}", operation, err))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(CartError::transport(format!(
                "{} returned HTTP {}: {}",
                operation,
                status.as_u16(),
                truncate(&body_text, 300)
            )));
        }

        let parsed: GraphqlResponse = response.json().await.map_err(|err| {
            CartError::transport(format!("Failed to parse {} response: {}", operation, err))
        })?;

        let result = parse_cart_response(operation, parsed);
        if let Err(e) = &result {
            tracing::warn!(operation, "Storefront cart request failed: {}", e);
        }
        result
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[async_trait]
impl CartGateway for StorefrontCartGateway {
    async fn create_cart(
        &self,
        lines: &[CartLineInput],
        attributes: &[CartAttribute],
    ) -> Result<RemoteCart> {
        self.execute(CartMutation::Create, create_variables(lines, attributes))
            .await
    }

    async fn add_lines(&self, cart_id: &str, lines: &[CartLineInput]) -> Result<RemoteCart> {
        self.execute(CartMutation::LinesAdd, add_variables(cart_id, lines))
            .await
    }

    async fn update_line_quantities(
        &self,
        cart_id: &str,
        line_ids: &[String],
        quantity: u32,
    ) -> Result<RemoteCart> {
        self.execute(
            CartMutation::LinesUpdate,
            update_variables(cart_id, line_ids, quantity),
        )
        .await
    }

    async fn remove_lines(&self, cart_id: &str, line_ids: &[String]) -> Result<RemoteCart> {
        self.execute(CartMutation::LinesRemove, remove_variables(cart_id, line_ids))
            .await
    }
}
