//! Persisted cart record.
//!
//! The on-device snapshot stored under the `cart` key. Every field read here is
//! optional or defaulted so partial and legacy records still load, and unknown
//! fields are collected into `extra` so a newer writer's fields survive a
//! read-modify-write cycle by this version.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cartsync_core::OrderType;

use super::lenient::{
    default_quantity, f64_or_zero, map_or_empty, optional_f64, optional_timestamp,
    string_list_or_empty, string_or_empty, u32_or_zero,
};

/// Line attribute holding `auto_renew` / `one_time`.
pub const ATTR_ORDER_TYPE: &str = "type";
/// Line attribute flagging items with no size semantics.
pub const ATTR_ADD_ON: &str = "isAddOn";
/// Line attribute holding the plan type label.
pub const ATTR_PLAN_TYPE: &str = "planType";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCartRecord {
    #[serde(default)]
    pub cart_id: Option<String>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub items: Vec<PersistedLine>,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub sub_totals: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub grand_total: f64,
    #[serde(default, deserialize_with = "u32_or_zero")]
    pub item_quantity: u32,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated_at: Option<String>,
    /// Fields this version does not know about, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersistedCartRecord {
    pub fn find_line(&self, id: &str) -> Option<&PersistedLine> {
        self.items.iter().find(|line| line.id == id)
    }

    /// Copy with `updated_at` cleared, for comparisons that ignore write time.
    pub fn without_timestamp(&self) -> Self {
        Self {
            updated_at: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLine {
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub variant_id: String,
    #[serde(default = "default_quantity", deserialize_with = "u32_or_zero")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub product_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub size_name: String,
    /// Freeform subtitle, e.g. "198 diapers". Diaper count is recovered from it.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub summary_subtitle: String,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub price: f64,
    #[serde(
        default,
        deserialize_with = "optional_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub compare_at_price: Option<f64>,
    #[serde(default, deserialize_with = "map_or_empty")]
    pub attributes: Map<String, Value>,
    /// Lines bundled with this one. Absent in records written before bundles persisted.
    #[serde(
        default,
        deserialize_with = "string_list_or_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub companion_line_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersistedLine {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant_id: String::new(),
            quantity: 1,
            product_name: String::new(),
            image: String::new(),
            size_name: String::new(),
            summary_subtitle: String::new(),
            price: 0.0,
            compare_at_price: None,
            attributes: Map::new(),
            companion_line_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn order_type(&self) -> OrderType {
        self.attributes
            .get(ATTR_ORDER_TYPE)
            .and_then(Value::as_str)
            .map(OrderType::from_attribute)
            .unwrap_or(OrderType::OneTime)
    }

    pub fn is_add_on(&self) -> bool {
        match self.attributes.get(ATTR_ADD_ON) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn plan_type(&self) -> String {
        self.attributes
            .get(ATTR_PLAN_TYPE)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}
