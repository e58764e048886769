//! Persistence codec.
//!
//! Pure functions converting between the raw on-device string, the
//! [`PersistedCartRecord`] DTO, and domain [`CartItem`]s.

use std::collections::HashMap;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use cartsync_core::cart::round_cents;
use cartsync_core::error::{CartError, Result};
use cartsync_core::{CartItem, ItemDetails, SizeTable};

use crate::dto::{ATTR_ADD_ON, ATTR_ORDER_TYPE, ATTR_PLAN_TYPE, PersistedCartRecord, PersistedLine};

static DIAPER_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*diapers?\b").expect("diaper count pattern is valid")
});

/// Domain view of a persisted record.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainCart {
    pub cart_id: Option<String>,
    pub checkout_url: Option<String>,
    pub items: Vec<CartItem>,
}

/// Parses a raw record, reporting why it was rejected.
pub fn try_decode(raw: &str) -> Result<PersistedCartRecord> {
    if raw.trim().is_empty() {
        return Err(CartError::PersistenceDecode("empty record".into()));
    }
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(CartError::PersistenceDecode("record is not an object".into()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Parses a raw record. Never fails: malformed input reads as "no record".
pub fn decode(raw: &str) -> Option<PersistedCartRecord> {
    match try_decode(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Ignoring unreadable persisted cart: {}", e);
            None
        }
    }
}

pub fn encode(record: &PersistedCartRecord) -> Result<String> {
    serde_json::to_string(record)
        .map_err(|e| CartError::internal(format!("Failed to encode cart record: {}", e)))
}

/// Extracts the diaper count from a subtitle such as "198 diapers".
pub fn diaper_count_from_subtitle(subtitle: &str) -> u32 {
    DIAPER_COUNT
        .captures(subtitle)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Rebuilds domain items from a flat record.
///
/// Add-on lines come back with empty size and diaper fields.
pub fn to_domain(record: &PersistedCartRecord, sizes: &SizeTable) -> DomainCart {
    let mut items: Vec<CartItem> = Vec::with_capacity(record.items.len());

    for line in &record.items {
        if line.id.is_empty() || items.iter().any(|item| item.line_id == line.id) {
            tracing::debug!(line_id = %line.id, "Skipping blank or duplicate persisted line");
            continue;
        }
        items.push(line_to_item(line, sizes));
    }

    DomainCart {
        cart_id: record.cart_id.clone().filter(|id| !id.is_empty()),
        checkout_url: record.checkout_url.clone(),
        items,
    }
}

fn line_to_item(line: &PersistedLine, sizes: &SizeTable) -> CartItem {
    let is_add_on = line.is_add_on();

    let (size, display_size, diaper_count) = if is_add_on {
        (String::new(), String::new(), 0)
    } else {
        let (code, display) = match sizes.lookup(&line.size_name) {
            Some(entry) => (entry.code.clone(), entry.display_name.clone()),
            None => (line.size_name.clone(), line.size_name.clone()),
        };
        (code, display, diaper_count_from_subtitle(&line.summary_subtitle))
    };

    let original_price = line.compare_at_price.unwrap_or(line.price);
    let details = ItemDetails {
        title: line.product_name.clone(),
        image_url: line.image.clone(),
        size,
        display_size,
        diaper_count,
        plan_type: line.plan_type(),
        order_type: line.order_type(),
        is_add_on,
        ..Default::default()
    }
    .with_prices(line.price, original_price);

    CartItem::new(
        line.id.clone(),
        line.companion_line_ids.clone(),
        line.variant_id.clone(),
        line.quantity,
        details,
    )
}

/// Builds a record from domain items.
///
/// Lines already present in `previous` keep every field except quantity,
/// price, compare-at price, variant id, and companion ids. New lines are
/// synthesized from the item and the size table.
pub fn from_domain(
    cart_id: Option<&str>,
    checkout_url: Option<&str>,
    items: &[CartItem],
    previous: Option<&PersistedCartRecord>,
    sizes: &SizeTable,
) -> PersistedCartRecord {
    let prior_lines: HashMap<&str, &PersistedLine> = previous
        .map(|record| {
            record
                .items
                .iter()
                .map(|line| (line.id.as_str(), line))
                .collect()
        })
        .unwrap_or_default();

    let lines: Vec<PersistedLine> = items
        .iter()
        .map(|item| match prior_lines.get(item.line_id.as_str()) {
            Some(prior) => merge_line(prior, item),
            None => fresh_line(item, sizes),
        })
        .collect();

    let sub_totals = round_cents(lines.iter().map(|l| l.price * f64::from(l.quantity)).sum());

    PersistedCartRecord {
        cart_id: cart_id.map(str::to_string),
        checkout_url: checkout_url.map(str::to_string),
        item_quantity: lines.iter().map(|l| l.quantity).fold(0, u32::saturating_add),
        items: lines,
        sub_totals,
        grand_total: sub_totals,
        updated_at: Some(Utc::now().to_rfc3339()),
        extra: previous.map(|r| r.extra.clone()).unwrap_or_default(),
    }
}

fn merge_line(prior: &PersistedLine, item: &CartItem) -> PersistedLine {
    let mut line = prior.clone();
    line.quantity = item.quantity;
    line.price = item.details.current_price;
    line.compare_at_price = compare_at_for(item, prior.compare_at_price.is_some());
    line.variant_id = item.merchandise_id.clone();
    line.companion_line_ids = item.companion_line_ids.clone();
    line
}

fn fresh_line(item: &CartItem, sizes: &SizeTable) -> PersistedLine {
    let details = &item.details;

    let mut attributes = Map::new();
    attributes.insert(
        ATTR_ORDER_TYPE.to_string(),
        Value::from(details.order_type.as_attribute()),
    );
    if details.is_add_on {
        attributes.insert(ATTR_ADD_ON.to_string(), Value::Bool(true));
    }
    if !details.plan_type.is_empty() {
        attributes.insert(ATTR_PLAN_TYPE.to_string(), Value::from(details.plan_type.clone()));
    }

    let (size_name, summary_subtitle) = if details.is_add_on {
        (String::new(), String::new())
    } else {
        let count = if details.diaper_count > 0 {
            details.diaper_count
        } else {
            sizes
                .lookup(&details.size)
                .map(|entry| entry.diaper_count)
                .unwrap_or(0)
        };
        let size_name = if details.display_size.is_empty() {
            details.size.clone()
        } else {
            details.display_size.clone()
        };
        let subtitle = if count > 0 {
            format!("{} diapers", count)
        } else {
            String::new()
        };
        (size_name, subtitle)
    };

    PersistedLine {
        variant_id: item.merchandise_id.clone(),
        quantity: item.quantity,
        product_name: details.title.clone(),
        image: details.image_url.clone(),
        size_name,
        summary_subtitle,
        price: details.current_price,
        compare_at_price: compare_at_for(item, false),
        attributes,
        companion_line_ids: item.companion_line_ids.clone(),
        ..PersistedLine::new(item.line_id.clone())
    }
}

/// Omits the compare-at price when it equals the price and none was stored before.
fn compare_at_for(item: &CartItem, had_compare_at: bool) -> Option<f64> {
    let details = &item.details;
    if had_compare_at || details.original_price != details.current_price {
        Some(details.original_price)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartsync_core::OrderType;

    fn diaper_item() -> CartItem {
        CartItem::new(
            "L1",
            vec!["L1-wipes".into()],
            "V-size-2",
            1,
            ItemDetails {
                title: "Diaper Bundle".into(),
                image_url: "https://cdn.test/d.png".into(),
                size: "2".into(),
                display_size: "Size 2".into(),
                diaper_count: 186,
                plan_type: "monthly".into(),
                order_type: OrderType::Subscription,
                ..Default::default()
            }
            .with_prices(95.0, 105.5),
        )
    }

    fn add_on_item() -> CartItem {
        CartItem::new(
            "L2",
            vec![],
            "V-cream",
            2,
            ItemDetails {
                title: "Rash Cream".into(),
                order_type: OrderType::OneTime,
                is_add_on: true,
                ..Default::default()
            }
            .with_prices(12.0, 12.0),
        )
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(decode("").is_none());
        assert!(decode("{not json").is_none());
        assert!(decode("[]").is_none());
        assert!(decode(r#"{"cartId": "C1", "items": "oops"}"#).is_none());
        assert!(decode(r#"{"cartId": "C1", "items": null}"#).is_none());
    }

    #[test]
    fn test_decode_tolerates_partial_record() {
        let record = decode(r#"{"cartId": "C1"}"#).unwrap();
        assert_eq!(record.cart_id.as_deref(), Some("C1"));
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_decode_tolerates_mistyped_metadata() {
        let record = decode(
            r#"{
                "cartId": "C1",
                "items": [
                    {"id": "L1", "variantId": "V1", "attributes": null, "companionLineIds": null},
                    {"id": "L2", "variantId": "V2", "attributes": "auto_renew", "companionLineIds": ["L2w", 7]}
                ],
                "updatedAt": 1696150000000
            }"#,
        )
        .expect("record with mistyped metadata still decodes");

        assert_eq!(record.updated_at.as_deref(), Some("2023-10-01T08:46:40+00:00"));
        assert!(record.items[0].attributes.is_empty());
        assert!(record.items[0].companion_line_ids.is_empty());
        assert!(record.items[1].attributes.is_empty());
        assert_eq!(record.items[1].companion_line_ids, vec!["L2w".to_string()]);

        let cart = to_domain(&record, &SizeTable::standard());
        assert_eq!(cart.cart_id.as_deref(), Some("C1"));
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].details.order_type, OrderType::OneTime);
    }

    #[test]
    fn test_null_or_odd_timestamp_reads_as_none() {
        let record = decode(r#"{"cartId": "C1", "updatedAt": null}"#).unwrap();
        assert!(record.updated_at.is_none());
        let record = decode(r#"{"cartId": "C1", "updatedAt": {"seconds": 1}}"#).unwrap();
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn test_item_quantity_saturates() {
        let mut first = diaper_item();
        first.quantity = u32::MAX;
        let mut second = add_on_item();
        second.quantity = u32::MAX;

        let record = from_domain(Some("C1"), None, &[first, second], None, &SizeTable::standard());
        assert_eq!(record.item_quantity, u32::MAX);
    }

    #[test]
    fn test_diaper_count_extraction() {
        assert_eq!(diaper_count_from_subtitle("198 diapers"), 198);
        assert_eq!(diaper_count_from_subtitle("Size 2 · 186 Diapers / month"), 186);
        assert_eq!(diaper_count_from_subtitle("1 diaper"), 1);
        assert_eq!(diaper_count_from_subtitle("Monthly bundle"), 0);
        assert_eq!(diaper_count_from_subtitle(""), 0);
    }

    #[test]
    fn test_round_trip_preserves_items() {
        let sizes = SizeTable::standard();
        let items = vec![diaper_item(), add_on_item()];
        let record = from_domain(
            Some("C1"),
            Some("https://shop.test/checkout"),
            &items,
            None,
            &sizes,
        );

        let raw = encode(&record).unwrap();
        let restored = to_domain(&decode(&raw).unwrap(), &sizes);

        assert_eq!(restored.cart_id.as_deref(), Some("C1"));
        assert_eq!(restored.checkout_url.as_deref(), Some("https://shop.test/checkout"));
        assert_eq!(restored.items, items);
    }

    #[test]
    fn test_fresh_line_fields() {
        let record = from_domain(Some("C1"), None, &[diaper_item()], None, &SizeTable::standard());
        let line = &record.items[0];

        assert_eq!(line.size_name, "Size 2");
        assert_eq!(line.summary_subtitle, "186 diapers");
        assert_eq!(line.compare_at_price, Some(105.5));
        assert_eq!(line.attributes[ATTR_ORDER_TYPE], "auto_renew");
        assert_eq!(record.sub_totals, 95.0);
        assert_eq!(record.item_quantity, 1);
        assert!(record.updated_at.is_some());
    }

    #[test]
    fn test_fresh_line_uses_size_table_when_count_unknown() {
        let mut item = diaper_item();
        item.details.diaper_count = 0;
        let record = from_domain(Some("C1"), None, &[item], None, &SizeTable::standard());
        assert_eq!(record.items[0].summary_subtitle, "186 diapers");
    }

    #[test]
    fn test_add_on_round_trip_is_lossy_for_size_fields() {
        let sizes = SizeTable::standard();
        let mut item = add_on_item();
        item.details.size = "2".into();
        item.details.diaper_count = 50;

        let record = from_domain(Some("C1"), None, &[item], None, &sizes);
        let restored = to_domain(&record, &sizes);

        let restored_item = &restored.items[0];
        assert!(restored_item.details.is_add_on);
        assert!(restored_item.details.size.is_empty());
        assert_eq!(restored_item.details.diaper_count, 0);
    }

    #[test]
    fn test_existing_line_keeps_untracked_fields() {
        let sizes = SizeTable::standard();
        let previous = decode(
            r#"{
                "cartId": "C1",
                "items": [{
                    "id": "L1",
                    "variantId": "V-old",
                    "quantity": 1,
                    "productName": "Custom Name",
                    "image": "https://cdn.test/old.png",
                    "sizeName": "size 2",
                    "summarySubtitle": "Bundle of 186 diapers",
                    "price": 99,
                    "attributes": {"type": "auto_renew", "promo": "SPRING"},
                    "giftWrap": true
                }],
                "loyaltyId": "X-9"
            }"#,
        )
        .unwrap();

        let mut item = diaper_item();
        item.quantity = 3;
        let record = from_domain(Some("C1"), None, &[item], Some(&previous), &sizes);
        let line = &record.items[0];

        assert_eq!(line.quantity, 3);
        assert_eq!(line.price, 95.0);
        assert_eq!(line.compare_at_price, Some(105.5));
        assert_eq!(line.variant_id, "V-size-2");
        assert_eq!(line.product_name, "Custom Name");
        assert_eq!(line.summary_subtitle, "Bundle of 186 diapers");
        assert_eq!(line.attributes["promo"], "SPRING");
        assert_eq!(line.extra["giftWrap"], true);
        assert_eq!(record.extra["loyaltyId"], "X-9");
        assert_eq!(record.sub_totals, 285.0);
    }

    #[test]
    fn test_to_domain_recovers_size_case_insensitively() {
        let record = decode(
            r#"{
                "cartId": "C1",
                "items": [{"id": "L1", "sizeName": "NEWBORN", "summarySubtitle": "198 diapers", "price": 80}]
            }"#,
        )
        .unwrap();
        let cart = to_domain(&record, &SizeTable::standard());
        let item = &cart.items[0];

        assert_eq!(item.details.size, "N");
        assert_eq!(item.details.display_size, "Newborn");
        assert_eq!(item.details.diaper_count, 198);
        assert_eq!(item.details.order_type, OrderType::OneTime);
        assert_eq!(item.details.original_price, 80.0);
        assert_eq!(item.details.savings_amount, 0.0);
    }

    #[test]
    fn test_to_domain_skips_duplicate_lines() {
        let record = decode(
            r#"{"cartId": "C1", "items": [{"id": "L1"}, {"id": "L1"}, {"id": ""}]}"#,
        )
        .unwrap();
        let cart = to_domain(&record, &SizeTable::standard());
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_rehydrate_then_persist_is_stable() {
        let sizes = SizeTable::standard();
        let items = vec![diaper_item(), add_on_item()];
        let original = from_domain(
            Some("C1"),
            Some("https://shop.test/checkout"),
            &items,
            None,
            &sizes,
        );

        let cart = to_domain(&original, &sizes);
        let rewritten = from_domain(
            cart.cart_id.as_deref(),
            cart.checkout_url.as_deref(),
            &cart.items,
            Some(&original),
            &sizes,
        );

        assert_eq!(rewritten.without_timestamp(), original.without_timestamp());
    }
}
