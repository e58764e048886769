//! Cart item domain models.

use serde::{Deserialize, Serialize};

/// Subscription vs one-time purchase.
///
/// Carried to the commerce backend as the `type` cart attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Auto-renewing subscription order.
    #[default]
    Subscription,
    /// Single purchase.
    OneTime,
}

impl OrderType {
    /// Wire value used in cart and line attributes.
    pub fn as_attribute(&self) -> &'static str {
        match self {
            OrderType::Subscription => "auto_renew",
            OrderType::OneTime => "one_time",
        }
    }

    /// Only `auto_renew` means subscription; anything else is one-time.
    pub fn from_attribute(value: &str) -> Self {
        if value.eq_ignore_ascii_case("auto_renew") {
            OrderType::Subscription
        } else {
            OrderType::OneTime
        }
    }
}

/// Display metadata for a cart row.
///
/// The remote cart payload carries no display metadata, so these fields come
/// from what the shopper selected when the item was added (or from the
/// on-device record on reload).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub title: String,
    pub image_url: String,
    /// Size code, e.g. `"2"` or `"N"`. Empty for add-ons.
    pub size: String,
    /// Human-readable size, e.g. `"Size 2"`. Empty for add-ons.
    pub display_size: String,
    /// Diapers per box. Zero for add-ons or when unknown.
    pub diaper_count: u32,
    pub plan_type: String,
    pub order_type: OrderType,
    /// Per-unit price the shopper pays.
    pub current_price: f64,
    /// Per-unit compare-at price.
    pub original_price: f64,
    /// Per-unit savings (`original_price - current_price`, never negative).
    pub savings_amount: f64,
    /// Items with no size semantics (wipes, creams, ...).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_add_on: bool,
}

impl ItemDetails {
    /// Recomputes `savings_amount` from the two prices.
    pub fn with_prices(mut self, current_price: f64, original_price: f64) -> Self {
        self.current_price = current_price;
        self.original_price = original_price;
        self.savings_amount = savings_between(original_price, current_price);
        self
    }
}

/// One logical product selection in the cart.
///
/// Backed by a primary remote line plus zero or more companion lines that are
/// always mutated together with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Primary remote line id; stable for the item's lifetime.
    pub line_id: String,
    /// Never contains `line_id`.
    pub companion_line_ids: Vec<String>,
    pub merchandise_id: String,
    /// Mirrors the primary remote line's quantity. Always >= 1.
    pub quantity: u32,
    #[serde(flatten)]
    pub details: ItemDetails,
}

impl CartItem {
    /// Creates an item, dropping companion ids that repeat the primary or each other.
    pub fn new(
        line_id: impl Into<String>,
        companion_line_ids: Vec<String>,
        merchandise_id: impl Into<String>,
        quantity: u32,
        details: ItemDetails,
    ) -> Self {
        let line_id = line_id.into();
        let mut companions: Vec<String> = Vec::with_capacity(companion_line_ids.len());
        for id in companion_line_ids {
            if id != line_id && !companions.contains(&id) {
                companions.push(id);
            }
        }

        Self {
            line_id,
            companion_line_ids: companions,
            merchandise_id: merchandise_id.into(),
            quantity: quantity.max(1),
            details,
        }
    }

    /// Primary line id followed by every companion id.
    pub fn all_line_ids(&self) -> Vec<String> {
        std::iter::once(self.line_id.clone())
            .chain(self.companion_line_ids.iter().cloned())
            .collect()
    }

    /// True if `line_id` is the primary or one of the companions.
    pub fn owns_line(&self, line_id: &str) -> bool {
        self.line_id == line_id || self.companion_line_ids.iter().any(|id| id == line_id)
    }

    pub fn line_total(&self) -> f64 {
        round_cents(self.details.current_price * f64::from(self.quantity))
    }

    pub fn line_savings(&self) -> f64 {
        round_cents(self.details.savings_amount * f64::from(self.quantity))
    }
}

/// Rounds a currency amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Per-unit savings; zero when there is no discount.
pub fn savings_between(original_price: f64, current_price: f64) -> f64 {
    round_cents((original_price - current_price).max(0.0))
}
