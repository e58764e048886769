//! Cart aggregate state and derived totals.

use std::collections::HashSet;

use serde::Serialize;

use super::model::{CartItem, round_cents};

/// Request status of the cart.
///
/// Replaces independent `isLoading` / `error` flags so that a loading cart
/// can never also carry a stale error.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum RequestStatus {
    /// Nothing has happened yet this session.
    #[default]
    Idle,
    /// A gateway request is in flight.
    Loading,
    /// The last request failed; the message is shopper-facing.
    Error(String),
    /// The last request (or hydration) committed successfully.
    Ready,
}

/// The single cart aggregate for a session.
///
/// Derived values (item count, subtotal, savings, free shipping) are computed
/// from `items` on demand and never stored.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    /// Remote cart id; `None` until the first successful creation.
    pub cart_id: Option<String>,
    /// Refreshed on every successful mutation.
    pub checkout_url: Option<String>,
    /// Insertion order is add order. No two items share a `line_id`.
    pub items: Vec<CartItem>,
    /// Drawer visibility. Not persisted.
    pub is_open: bool,
    pub status: RequestStatus,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, RequestStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            RequestStatus::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn find_item(&self, line_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.line_id == line_id)
    }

    /// Full id set (primary + companions) for the item keyed by `line_id`.
    pub fn line_ids_for(&self, line_id: &str) -> Option<Vec<String>> {
        self.find_item(line_id).map(CartItem::all_line_ids)
    }

    /// Every remote line id backing an item, as primary or companion.
    pub fn known_line_ids(&self) -> HashSet<String> {
        self.items.iter().flat_map(CartItem::all_line_ids).collect()
    }

    // ============================================================================
    // Derived totals
    // ============================================================================

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.quantity)
            .fold(0, u32::saturating_add)
    }

    pub fn subtotal(&self) -> f64 {
        round_cents(self.items.iter().map(CartItem::line_total).sum())
    }

    pub fn total_savings(&self) -> f64 {
        round_cents(self.items.iter().map(CartItem::line_savings).sum())
    }

    pub fn qualifies_for_free_shipping(&self, threshold: f64) -> bool {
        self.subtotal() >= threshold
    }

    /// Amount still needed to reach the free-shipping threshold.
    pub fn remaining_for_free_shipping(&self, threshold: f64) -> f64 {
        round_cents((threshold - self.subtotal()).max(0.0))
    }
}
