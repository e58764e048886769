//! Cart store: the injectable cart state machine.
//!
//! Public operations issue gateway calls and commit state through the pure
//! reducer only after the awaited response resolves. The `Loading` status is
//! the one thing set before the call. Mutating operations are serialized per
//! store so interleaved add/remove calls cannot race at the remote side.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, watch};

use cartsync_core::config::CartConfig;
use cartsync_core::error::{CartError, Result};
use cartsync_core::grouping::{self, GroupingIntent};
use cartsync_core::{
    CartAction, CartAttribute, CartGateway, CartLineInput, CartState, ItemDetails, cart::reduce,
};

use crate::persistence::CartPersistence;

/// Settings the store needs from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub free_shipping_threshold: f64,
    /// Sent as the `source` cart attribute on creation.
    pub cart_source: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from(&CartConfig::default())
    }
}

impl From<&CartConfig> for StoreSettings {
    fn from(config: &CartConfig) -> Self {
        Self {
            free_shipping_threshold: config.free_shipping_threshold,
            cart_source: config.cart_source.clone(),
        }
    }
}

/// What the shopper selected.
#[derive(Debug, Clone, PartialEq)]
pub struct AddToCartOptions {
    pub merchandise_id: String,
    pub quantity: u32,
    pub selling_plan_id: Option<String>,
    /// Display data for the new row; prices included.
    pub details: ItemDetails,
    /// Bundle/upsell lines sent in the same request. They become companions.
    pub bundle_lines: Vec<CartLineInput>,
    /// Attributes attached to the primary line.
    pub line_attributes: Vec<CartAttribute>,
}

impl AddToCartOptions {
    pub fn new(merchandise_id: impl Into<String>, quantity: u32, details: ItemDetails) -> Self {
        Self {
            merchandise_id: merchandise_id.into(),
            quantity,
            selling_plan_id: None,
            details,
            bundle_lines: Vec::new(),
            line_attributes: Vec::new(),
        }
    }

    pub fn with_selling_plan(mut self, selling_plan_id: impl Into<String>) -> Self {
        self.selling_plan_id = Some(selling_plan_id.into());
        self
    }

    pub fn with_bundle_line(mut self, line: CartLineInput) -> Self {
        self.bundle_lines.push(line);
        self
    }

    /// Primary line first, then bundle lines, flattened into one request.
    fn request_lines(&self) -> Vec<CartLineInput> {
        let primary = CartLineInput {
            merchandise_id: self.merchandise_id.clone(),
            quantity: self.quantity,
            selling_plan_id: self.selling_plan_id.clone(),
            attributes: self.line_attributes.clone(),
        };
        std::iter::once(primary)
            .chain(self.bundle_lines.iter().cloned())
            .collect()
    }
}

/// Derived numbers read by the rendering layer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: f64,
    pub total_savings: f64,
    pub free_shipping: bool,
    pub remaining_for_free_shipping: f64,
}

pub struct CartStore {
    state: watch::Sender<CartState>,
    gateway: Arc<dyn CartGateway>,
    persistence: Option<CartPersistence>,
    settings: StoreSettings,
    /// Held for the duration of each mutating gateway call.
    in_flight: Mutex<()>,
}

impl CartStore {
    /// Creates a store with a fresh cart and no persistence.
    pub fn new(gateway: Arc<dyn CartGateway>, settings: StoreSettings) -> Self {
        let (state, _) = watch::channel(CartState::new());
        Self {
            state,
            gateway,
            persistence: None,
            settings,
            in_flight: Mutex::new(()),
        }
    }

    /// Creates a store wired to persistence and hydrates it from the stored record.
    pub fn with_persistence(
        gateway: Arc<dyn CartGateway>,
        persistence: CartPersistence,
        settings: StoreSettings,
    ) -> Self {
        let mut store = Self::new(gateway, settings);
        store.persistence = Some(persistence);
        store.hydrate();
        store
    }

    /// Seeds state from the stored record. Does not open the cart.
    ///
    /// Returns `true` if a cart was restored. Only applies to a fresh store.
    pub fn hydrate(&self) -> bool {
        let Some(persistence) = &self.persistence else {
            return false;
        };
        if self.state.borrow().cart_id.is_some() {
            return false;
        }
        let Some(cart) = persistence.load() else {
            return false;
        };

        tracing::info!(
            cart_id = %cart.cart_id,
            items = cart.items.len(),
            "Restored cart from storage"
        );
        persistence.suppress_next_write();
        self.dispatch(CartAction::Hydrated {
            cart_id: cart.cart_id,
            checkout_url: cart.checkout_url,
            items: cart.items,
        });
        true
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every committed state.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn totals(&self) -> CartTotals {
        let state = self.state.borrow();
        let threshold = self.settings.free_shipping_threshold;
        CartTotals {
            item_count: state.item_count(),
            subtotal: state.subtotal(),
            total_savings: state.total_savings(),
            free_shipping: state.qualifies_for_free_shipping(threshold),
            remaining_for_free_shipping: state.remaining_for_free_shipping(threshold),
        }
    }

    pub fn open_cart(&self) {
        self.dispatch(CartAction::OpenCart);
    }

    pub fn close_cart(&self) {
        self.dispatch(CartAction::CloseCart);
    }

    /// Adds one purchase decision (primary line plus bundle lines) as a single item.
    ///
    /// Creates the remote cart on first use, otherwise appends to it and
    /// reconciles the returned lines against existing items.
    pub async fn add_to_cart(&self, options: AddToCartOptions) -> Result<()> {
        if options.quantity == 0 {
            return Err(CartError::invalid_input("Quantity must be at least 1"));
        }

        let _guard = self.begin_request().await;

        let lines = options.request_lines();
        let details = options
            .details
            .clone()
            .with_prices(options.details.current_price, options.details.original_price);
        let intent = GroupingIntent {
            merchandise_id: options.merchandise_id.clone(),
            quantity: options.quantity,
            requested_lines: lines.len(),
            details,
        };

        let cart_id = self.state.borrow().cart_id.clone();
        let response = match cart_id.as_deref() {
            None => {
                let attributes = vec![
                    CartAttribute::new("type", options.details.order_type.as_attribute()),
                    CartAttribute::new("source", self.settings.cart_source.clone()),
                ];
                self.gateway.create_cart(&lines, &attributes).await
            }
            Some(id) => self.gateway.add_lines(id, &lines).await,
        };

        let cart = match response {
            Ok(cart) if cart.id.is_empty() => {
                return Err(self.fail("add_to_cart", CartError::empty_result("add_to_cart")));
            }
            Ok(cart) => cart,
            Err(e) => return Err(self.fail("add_to_cart", e)),
        };

        let current_items = self.state.borrow().items.clone();
        let reconciliation = grouping::reconcile(&current_items, &cart.lines, &intent);
        for correction in &reconciliation.corrections {
            tracing::info!(
                line_id = %correction.line_id,
                local = correction.local,
                remote = correction.remote,
                "Remote merged lines, quantity corrected"
            );
        }

        tracing::info!(
            cart_id = %cart.id,
            new_line = ?reconciliation.new_line_id,
            items = reconciliation.items.len(),
            "Added to cart"
        );
        self.dispatch(CartAction::ItemsReconciled {
            cart_id: cart.id,
            checkout_url: cart.checkout_url,
            items: reconciliation.items,
        });
        Ok(())
    }

    /// Sets the quantity of the item keyed by `line_id`, moving every companion line with it.
    pub async fn update_quantity(&self, line_id: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(CartError::invalid_input(
                "Quantity must be at least 1; remove the item instead",
            ));
        }

        let _guard = self.begin_request().await;
        let (cart_id, line_ids) = match self.resolve(line_id) {
            Ok(resolved) => resolved,
            Err(e) => return Err(self.fail("update_quantity", e)),
        };

        match self
            .gateway
            .update_line_quantities(&cart_id, &line_ids, quantity)
            .await
        {
            Ok(cart) => {
                tracing::info!(line_id, quantity, "Updated cart quantity");
                self.dispatch(CartAction::QuantityUpdated {
                    line_id: line_id.to_string(),
                    quantity,
                    checkout_url: cart.checkout_url,
                });
                Ok(())
            }
            Err(e) => Err(self.fail("update_quantity", e)),
        }
    }

    /// Removes the item keyed by `line_id` together with its companion lines.
    pub async fn remove_item(&self, line_id: &str) -> Result<()> {
        let _guard = self.begin_request().await;
        let (cart_id, line_ids) = match self.resolve(line_id) {
            Ok(resolved) => resolved,
            Err(e) => return Err(self.fail("remove_item", e)),
        };

        match self.gateway.remove_lines(&cart_id, &line_ids).await {
            Ok(cart) => {
                tracing::info!(line_id, lines = line_ids.len(), "Removed cart item");
                self.dispatch(CartAction::ItemRemoved {
                    line_id: line_id.to_string(),
                    checkout_url: cart.checkout_url,
                });
                Ok(())
            }
            Err(e) => Err(self.fail("remove_item", e)),
        }
    }

    // ============================================================================
    // Internals
    // ============================================================================

    /// Marks the cart loading, then waits for any in-flight mutation to finish.
    async fn begin_request(&self) -> MutexGuard<'_, ()> {
        self.dispatch(CartAction::RequestStarted);
        let guard = self.in_flight.lock().await;
        if !self.state.borrow().is_loading() {
            self.dispatch(CartAction::RequestStarted);
        }
        guard
    }

    fn resolve(&self, line_id: &str) -> Result<(String, Vec<String>)> {
        let state = self.state.borrow();
        let cart_id = state
            .cart_id
            .clone()
            .ok_or_else(|| CartError::not_found("cart", "none"))?;
        let line_ids = state
            .line_ids_for(line_id)
            .ok_or_else(|| CartError::not_found("cart line", line_id))?;
        Ok((cart_id, line_ids))
    }

    fn fail(&self, operation: &str, err: CartError) -> CartError {
        tracing::warn!(operation, "Cart operation failed: {}", err);
        self.dispatch(CartAction::RequestFailed {
            message: err.user_message(),
        });
        err
    }

    /// Commits `action` and persists the result when cart data changed.
    fn dispatch(&self, action: CartAction) {
        let name = action.name();
        let changes_items = matches!(
            action,
            CartAction::ItemsReconciled { .. }
                | CartAction::QuantityUpdated { .. }
                | CartAction::ItemRemoved { .. }
                | CartAction::Hydrated { .. }
        );

        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, action);
        });
        tracing::trace!(action = name, "Committed cart action");

        if changes_items && let Some(persistence) = &self.persistence {
            let snapshot = self.state();
            persistence.persist(&snapshot);
        }
    }
}
