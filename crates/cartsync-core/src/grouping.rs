//! Line grouping: folds a returned remote line list into domain items.
//!
//! A logical [`CartItem`] may span several remote lines (a primary line plus
//! companions such as bundled wipes). After every create/add call the returned
//! snapshot is reconciled against the items already held locally:
//!
//! 1. Lines whose id is already known (primary or companion) are existing.
//!    Every other line is new.
//! 2. When an existing primary's remote quantity differs from the local one,
//!    the backend merged an added line into it. Remote wins.
//! 3. All new lines form exactly one new item: the first new line is the
//!    primary, the rest become companions. Display fields come from the
//!    caller's intent, since the remote payload carries none.
//!
//! Surplus lines: if the backend returns more new lines than were requested
//! (a promotional auto-add, for instance), the extra lines are absorbed as
//! companions of the new item. They are reported in
//! [`Reconciliation::surplus_line_ids`] so the caller can log them.

use std::collections::HashSet;

use crate::cart::{CartItem, ItemDetails};
use crate::gateway::RemoteLine;

/// What the shopper just asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingIntent {
    /// Requested variant of the primary line.
    pub merchandise_id: String,
    /// Requested quantity of the primary line.
    pub quantity: u32,
    /// Number of lines sent in the request (primary + bundle lines).
    pub requested_lines: usize,
    pub details: ItemDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityCorrection {
    pub line_id: String,
    pub local: u32,
    pub remote: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Existing items (with corrected quantities) followed by the new item, if any.
    pub items: Vec<CartItem>,
    /// Primary line id of the newly grouped item.
    pub new_line_id: Option<String>,
    pub corrections: Vec<QuantityCorrection>,
    /// New lines beyond the number requested, absorbed as companions.
    pub surplus_line_ids: Vec<String>,
}

impl Reconciliation {
    pub fn new_item(&self) -> Option<&CartItem> {
        let line_id = self.new_line_id.as_deref()?;
        self.items.iter().find(|item| item.line_id == line_id)
    }
}

/// Reconciles `remote_lines` against `existing` items.
///
/// On first creation `existing` is empty, so every returned line lands in the
/// single new group.
pub fn reconcile(
    existing: &[CartItem],
    remote_lines: &[RemoteLine],
    intent: &GroupingIntent,
) -> Reconciliation {
    let known: HashSet<&str> = existing
        .iter()
        .flat_map(|item| {
            std::iter::once(item.line_id.as_str())
                .chain(item.companion_line_ids.iter().map(String::as_str))
        })
        .collect();

    let mut items: Vec<CartItem> = existing.to_vec();
    let mut corrections = Vec::new();
    let mut new_lines: Vec<&RemoteLine> = Vec::new();
    let mut seen_new: HashSet<&str> = HashSet::new();

    for line in remote_lines {
        if known.contains(line.id.as_str()) {
            let Some(remote_quantity) = line.quantity else {
                continue;
            };
            if let Some(item) = items.iter_mut().find(|item| item.line_id == line.id)
                && item.quantity != remote_quantity
                && remote_quantity > 0
            {
                tracing::debug!(
                    line_id = %line.id,
                    local = item.quantity,
                    remote = remote_quantity,
                    "Remote quantity differs, taking remote"
                );
                corrections.push(QuantityCorrection {
                    line_id: line.id.clone(),
                    local: item.quantity,
                    remote: remote_quantity,
                });
                item.quantity = remote_quantity;
            }
        } else if seen_new.insert(line.id.as_str()) {
            new_lines.push(line);
        }
    }

    let mut surplus_line_ids = Vec::new();
    let mut new_line_id = None;

    if let Some((primary, companions)) = new_lines.split_first() {
        if intent.requested_lines > 0 && new_lines.len() > intent.requested_lines {
            surplus_line_ids = new_lines[intent.requested_lines..]
                .iter()
                .map(|line| line.id.clone())
                .collect();
            tracing::warn!(
                requested = intent.requested_lines,
                returned = new_lines.len(),
                surplus = ?surplus_line_ids,
                "Remote cart grew by more lines than requested; absorbing as companions"
            );
        }

        let merchandise_id = if primary.merchandise_id.is_empty() {
            intent.merchandise_id.clone()
        } else {
            primary.merchandise_id.clone()
        };
        let quantity = primary
            .quantity
            .filter(|q| *q > 0)
            .unwrap_or(intent.quantity);

        let item = CartItem::new(
            primary.id.clone(),
            companions.iter().map(|line| line.id.clone()).collect(),
            merchandise_id,
            quantity,
            intent.details.clone(),
        );
        new_line_id = Some(item.line_id.clone());
        items.push(item);
    }

    Reconciliation {
        items,
        new_line_id,
        corrections,
        surplus_line_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(requested_lines: usize) -> GroupingIntent {
        GroupingIntent {
            merchandise_id: "V-diaper-2".into(),
            quantity: 1,
            requested_lines,
            details: ItemDetails {
                title: "Diaper Bundle".into(),
                size: "2".into(),
                display_size: "Size 2".into(),
                diaper_count: 186,
                ..Default::default()
            },
        }
    }

    fn existing(line_id: &str, companions: &[&str], quantity: u32) -> CartItem {
        CartItem::new(
            line_id,
            companions.iter().map(|s| s.to_string()).collect(),
            "V-existing",
            quantity,
            ItemDetails::default(),
        )
    }

    #[test]
    fn test_first_creation_groups_all_lines() {
        let lines = vec![
            RemoteLine::new("A", "V-diaper-2", 1),
            RemoteLine::new("B", "V-wipes", 1),
            RemoteLine::new("C", "V-cream", 1),
        ];
        let result = reconcile(&[], &lines, &intent(3));

        assert_eq!(result.items.len(), 1);
        let item = &result.items[0];
        assert_eq!(item.line_id, "A");
        assert_eq!(item.companion_line_ids, vec!["B", "C"]);
        assert_eq!(item.merchandise_id, "V-diaper-2");
        assert_eq!(item.details.title, "Diaper Bundle");
        assert_eq!(result.new_line_id.as_deref(), Some("A"));
        assert!(result.surplus_line_ids.is_empty());
    }

    #[test]
    fn test_remote_merge_corrects_quantity_without_duplicate() {
        let items = vec![existing("L1", &[], 1)];
        let lines = vec![RemoteLine::new("L1", "V-existing", 2)];
        let result = reconcile(&items, &lines, &intent(1));

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].quantity, 2);
        assert!(result.new_line_id.is_none());
        assert_eq!(
            result.corrections,
            vec![QuantityCorrection {
                line_id: "L1".into(),
                local: 1,
                remote: 2
            }]
        );
    }

    #[test]
    fn test_add_to_existing_appends_new_group() {
        let items = vec![existing("L1", &["L1w"], 1)];
        let lines = vec![
            RemoteLine::new("L1", "V-existing", 1),
            RemoteLine::new("L1w", "V-wipes", 1),
            RemoteLine::new("L2", "V-diaper-2", 1),
            RemoteLine::new("L2w", "V-wipes", 1),
        ];
        let result = reconcile(&items, &lines, &intent(2));

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].line_id, "L1");
        let added = result.new_item().expect("new item");
        assert_eq!(added.line_id, "L2");
        assert_eq!(added.companion_line_ids, vec!["L2w"]);
        assert!(result.corrections.is_empty());
    }

    #[test]
    fn test_companion_quantities_are_not_corrected() {
        let items = vec![existing("L1", &["L1w"], 1)];
        let lines = vec![
            RemoteLine::new("L1", "V-existing", 1),
            RemoteLine::new("L1w", "V-wipes", 5),
        ];
        let result = reconcile(&items, &lines, &intent(1));
        assert!(result.corrections.is_empty());
        assert_eq!(result.items[0].quantity, 1);
    }

    #[test]
    fn test_surplus_lines_absorbed_and_reported() {
        let lines = vec![
            RemoteLine::new("A", "V-diaper-2", 1),
            RemoteLine::new("B", "V-wipes", 1),
            RemoteLine::new("PROMO", "V-gift", 1),
        ];
        let result = reconcile(&[], &lines, &intent(2));

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].companion_line_ids, vec!["B", "PROMO"]);
        assert_eq!(result.surplus_line_ids, vec!["PROMO"]);
    }

    #[test]
    fn test_missing_remote_quantity_falls_back_to_requested() {
        let mut line = RemoteLine::new("A", "", 1);
        line.quantity = None;
        let mut wanted = intent(1);
        wanted.quantity = 4;
        let result = reconcile(&[], &[line], &wanted);

        let item = &result.items[0];
        assert_eq!(item.quantity, 4);
        assert_eq!(item.merchandise_id, "V-diaper-2");
    }

    #[test]
    fn test_no_lines_yields_no_new_item() {
        let items = vec![existing("L1", &[], 1)];
        let result = reconcile(&items, &[], &intent(1));
        assert_eq!(result.items, items);
        assert!(result.new_line_id.is_none());
    }
}
