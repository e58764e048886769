//! Hydration/persistence bridge.
//!
//! Seeds the store from the on-device record at startup and writes a fresh
//! record after every committed change to cart data. The first write after a
//! hydration is suppressed, since it would only re-persist what was just read.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cartsync_core::{CartItem, CartRecordStore, CartState, SizeTable};
use cartsync_infrastructure::codec;
use cartsync_infrastructure::dto::PersistedCartRecord;

/// Domain cart restored from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct HydratedCart {
    pub cart_id: String,
    pub checkout_url: Option<String>,
    pub items: Vec<CartItem>,
}

pub struct CartPersistence {
    store: Arc<dyn CartRecordStore>,
    sizes: SizeTable,
    /// One-shot guard armed when the store dispatches a hydration.
    skip_next_write: AtomicBool,
}

impl CartPersistence {
    pub fn new(store: Arc<dyn CartRecordStore>, sizes: SizeTable) -> Self {
        Self {
            store,
            sizes,
            skip_next_write: AtomicBool::new(false),
        }
    }

    /// Reads the stored record.
    ///
    /// Returns `None` when storage is unavailable, the record is missing or
    /// malformed, it has no items, or it has items but no cart id. Does not
    /// touch the write guard.
    pub fn load(&self) -> Option<HydratedCart> {
        let record = self.read_record()?;
        if record.items.is_empty() {
            tracing::debug!("Persisted cart has no items, starting fresh");
            return None;
        }

        let cart = codec::to_domain(&record, &self.sizes);
        let Some(cart_id) = cart.cart_id else {
            tracing::warn!(
                "Persisted cart has {} items but no cart id, ignoring",
                record.items.len()
            );
            return None;
        };
        if cart.items.is_empty() {
            return None;
        }

        Some(HydratedCart {
            cart_id,
            checkout_url: cart.checkout_url,
            items: cart.items,
        })
    }

    /// Writes `state` to storage, using the current record as the
    /// field-preservation base. Failures are logged, never returned.
    pub fn persist(&self, state: &CartState) {
        let Some(cart_id) = state.cart_id.as_deref() else {
            return;
        };

        if self.skip_next_write.swap(false, Ordering::SeqCst) {
            tracing::debug!("Skipping write of just-hydrated cart");
            return;
        }

        let previous = self.read_record();
        let record = codec::from_domain(
            Some(cart_id),
            state.checkout_url.as_deref(),
            &state.items,
            previous.as_ref(),
            &self.sizes,
        );

        let raw = match codec::encode(&record) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to encode cart record: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.write(&raw) {
            tracing::warn!("Failed to persist cart: {}", e);
        }
    }

    /// Suppresses the next `persist`, which would only re-write a just-loaded record.
    pub(crate) fn suppress_next_write(&self) {
        self.skip_next_write.store(true, Ordering::SeqCst);
    }

    /// True while the post-hydration write is still pending suppression.
    pub fn is_write_suppressed(&self) -> bool {
        self.skip_next_write.load(Ordering::SeqCst)
    }

    fn read_record(&self) -> Option<PersistedCartRecord> {
        match self.store.read() {
            Ok(Some(raw)) => codec::decode(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Cart storage unavailable, treating as empty: {}", e);
                None
            }
        }
    }
}
