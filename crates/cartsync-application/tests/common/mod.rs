//! Shared test fixtures: a scripted in-memory cart gateway.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cartsync_core::error::{CartError, Result};
use cartsync_core::{
    CartAttribute, CartGateway, CartLineInput, ItemDetails, OrderType, RemoteCart, RemoteLine,
};

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Create {
        lines: Vec<CartLineInput>,
        attributes: Vec<CartAttribute>,
    },
    Add {
        cart_id: String,
        lines: Vec<CartLineInput>,
    },
    Update {
        cart_id: String,
        line_ids: Vec<String>,
        quantity: u32,
    },
    Remove {
        cart_id: String,
        line_ids: Vec<String>,
    },
}

/// Gateway that answers from a queue of scripted responses and records every call.
#[derive(Default)]
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<RemoteCart>>>,
    calls: Mutex<Vec<GatewayCall>>,
    delay: Option<Duration>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, response: Result<RemoteCart>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: GatewayCall) -> Result<RemoteCart> {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CartError::internal("no scripted response")))
    }
}

#[async_trait]
impl CartGateway for MockGateway {
    async fn create_cart(
        &self,
        lines: &[CartLineInput],
        attributes: &[CartAttribute],
    ) -> Result<RemoteCart> {
        self.answer(GatewayCall::Create {
            lines: lines.to_vec(),
            attributes: attributes.to_vec(),
        })
        .await
    }

    async fn add_lines(&self, cart_id: &str, lines: &[CartLineInput]) -> Result<RemoteCart> {
        self.answer(GatewayCall::Add {
            cart_id: cart_id.to_string(),
            lines: lines.to_vec(),
        })
        .await
    }

    async fn update_line_quantities(
        &self,
        cart_id: &str,
        line_ids: &[String],
        quantity: u32,
    ) -> Result<RemoteCart> {
        self.answer(GatewayCall::Update {
            cart_id: cart_id.to_string(),
            line_ids: line_ids.to_vec(),
            quantity,
        })
        .await
    }

    async fn remove_lines(&self, cart_id: &str, line_ids: &[String]) -> Result<RemoteCart> {
        self.answer(GatewayCall::Remove {
            cart_id: cart_id.to_string(),
            line_ids: line_ids.to_vec(),
        })
        .await
    }
}

/// Remote cart snapshot with the given `(line id, merchandise id, quantity)` lines.
pub fn remote_cart(cart_id: &str, lines: &[(&str, &str, u32)]) -> RemoteCart {
    RemoteCart {
        id: cart_id.to_string(),
        checkout_url: Some(format!("https://shop.test/checkout/{cart_id}")),
        lines: lines
            .iter()
            .map(|(id, merch, qty)| RemoteLine::new(*id, *merch, *qty))
            .collect(),
        ..Default::default()
    }
}

pub fn diaper_details(size: &str, current: f64, original: f64) -> ItemDetails {
    ItemDetails {
        title: "Diaper Bundle".into(),
        image_url: "https://cdn.test/diapers.png".into(),
        size: size.into(),
        display_size: format!("Size {size}"),
        diaper_count: 186,
        plan_type: "diaper-and-wipes".into(),
        order_type: OrderType::Subscription,
        ..Default::default()
    }
    .with_prices(current, original)
}
