//! Wire-level types exchanged with the commerce backend.

use serde::{Deserialize, Serialize};

/// `{key, value}` attribute pair, used on carts and lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartAttribute {
    pub key: String,
    pub value: String,
}

impl CartAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A line to create or add.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<CartAttribute>,
}

impl CartLineInput {
    pub fn new(merchandise_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            merchandise_id: merchandise_id.into(),
            quantity,
            selling_plan_id: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_selling_plan(mut self, selling_plan_id: impl Into<String>) -> Self {
        self.selling_plan_id = Some(selling_plan_id.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(CartAttribute::new(key, value));
        self
    }
}

/// One line of the authoritative remote cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLine {
    pub id: String,
    pub merchandise_id: String,
    /// Missing when the backend omits it; callers fall back to what they requested.
    pub quantity: Option<u32>,
}

impl RemoteLine {
    pub fn new(id: impl Into<String>, merchandise_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            merchandise_id: merchandise_id.into(),
            quantity: Some(quantity),
        }
    }
}

/// Full cart snapshot returned by every successful gateway call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    pub id: String,
    pub checkout_url: Option<String>,
    pub lines: Vec<RemoteLine>,
}

/// Structured user-facing error returned by the backend (e.g. out of stock).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserError {
    #[serde(default)]
    pub field: Vec<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: Vec::new(),
            message: message.into(),
            code: None,
        }
    }
}
