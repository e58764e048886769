//! Cart actions and the pure reducer that applies them.

use super::model::CartItem;
use super::state::{CartState, RequestStatus};

/// A committed transition of [`CartState`].
///
/// Gateway calls happen outside the reducer; the store dispatches one of these
/// only after the awaited response resolves (or `RequestStarted` synchronously
/// when the action is issued).
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// A gateway request was issued.
    RequestStarted,
    /// The gateway request failed. Items and cart id stay as they were.
    RequestFailed { message: String },
    /// Lines were created or added and reconciled into `items`.
    /// Opens the cart drawer.
    ItemsReconciled {
        cart_id: String,
        checkout_url: Option<String>,
        items: Vec<CartItem>,
    },
    /// Quantity of one item (and its companions) changed remotely.
    QuantityUpdated {
        line_id: String,
        quantity: u32,
        checkout_url: Option<String>,
    },
    /// One item (and its companions) was removed remotely.
    ItemRemoved {
        line_id: String,
        checkout_url: Option<String>,
    },
    /// State restored from the on-device record. Does not open the drawer.
    Hydrated {
        cart_id: String,
        checkout_url: Option<String>,
        items: Vec<CartItem>,
    },
    OpenCart,
    CloseCart,
}

impl CartAction {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartAction::RequestStarted => "request_started",
            CartAction::RequestFailed { .. } => "request_failed",
            CartAction::ItemsReconciled { .. } => "items_reconciled",
            CartAction::QuantityUpdated { .. } => "quantity_updated",
            CartAction::ItemRemoved { .. } => "item_removed",
            CartAction::Hydrated { .. } => "hydrated",
            CartAction::OpenCart => "open_cart",
            CartAction::CloseCart => "close_cart",
        }
    }
}

/// Applies `action` to `state` and returns the next state.
pub fn reduce(mut state: CartState, action: CartAction) -> CartState {
    match action {
        CartAction::RequestStarted => {
            state.status = RequestStatus::Loading;
        }
        CartAction::RequestFailed { message } => {
            state.status = RequestStatus::Error(message);
        }
        CartAction::ItemsReconciled {
            cart_id,
            checkout_url,
            items,
        } => {
            state.cart_id = Some(cart_id);
            if checkout_url.is_some() {
                state.checkout_url = checkout_url;
            }
            state.items = items;
            state.is_open = true;
            state.status = RequestStatus::Ready;
        }
        CartAction::QuantityUpdated {
            line_id,
            quantity,
            checkout_url,
        } => {
            if let Some(item) = state.items.iter_mut().find(|item| item.line_id == line_id) {
                item.quantity = quantity.max(1);
            }
            if checkout_url.is_some() {
                state.checkout_url = checkout_url;
            }
            state.status = RequestStatus::Ready;
        }
        CartAction::ItemRemoved {
            line_id,
            checkout_url,
        } => {
            state.items.retain(|item| item.line_id != line_id);
            if checkout_url.is_some() {
                state.checkout_url = checkout_url;
            }
            state.status = RequestStatus::Ready;
        }
        CartAction::Hydrated {
            cart_id,
            checkout_url,
            items,
        } => {
            state.cart_id = Some(cart_id);
            state.checkout_url = checkout_url;
            state.items = items;
            state.status = RequestStatus::Ready;
        }
        CartAction::OpenCart => {
            state.is_open = true;
        }
        CartAction::CloseCart => {
            state.is_open = false;
        }
    }
    state
}
