//! The shopping cart.
//!
//! [`CartStore`] owns the line list. Every mutation that changes something
//! updates the list, publishes it, and persists it under [`CART_KEY`] before
//! returning; the derived total, count, and summary are already current by
//! then. A mutation that changes nothing publishes nothing and writes nothing.
//!
//! The store does not cap quantities. Callers clamp with
//! [`bistro_core::clamp_quantity`] first.

use std::sync::Arc;

use bistro_core::{
    CartLine, LineId, MenuItem, MenuItemId, MergeKey, Price, lines_count, lines_total,
    normalize_note,
};

use crate::observable::{Observable, Subject};
use crate::persistence::{CART_KEY, KeyValueStore, load_document, save_document};
use crate::pricing::{CartSummary, Pricing};

/// Holds the cart lines and their derived totals.
#[derive(Debug)]
pub struct CartStore {
    lines: Subject<Vec<CartLine>>,
    total: Observable<Price>,
    count: Observable<u32>,
    summary: Observable<CartSummary>,
    storage: Arc<dyn KeyValueStore>,
}

impl CartStore {
    /// Open the cart, restoring any lines persisted under [`CART_KEY`].
    ///
    /// A missing or unreadable document yields an empty cart.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>, pricing: Pricing) -> Self {
        let lines = Subject::new(restore(storage.as_ref()));
        let total = lines.observe().map(|lines: &Vec<CartLine>| lines_total(lines));
        let count = lines.observe().map(|lines: &Vec<CartLine>| lines_count(lines));
        let summary = lines
            .observe()
            .map(move |lines: &Vec<CartLine>| pricing.summarize(lines));

        Self {
            lines,
            total,
            count,
            summary,
            storage,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of `item` with an optional note.
    ///
    /// Merges into the line with the same item and note if there is one,
    /// otherwise appends a new line. Returns the ID of the line that now
    /// holds the item, or `None` when `quantity` is zero.
    pub fn add_line(
        &self,
        item: Arc<MenuItem>,
        quantity: u32,
        note: Option<String>,
    ) -> Option<LineId> {
        if quantity == 0 {
            return None;
        }

        let note = normalize_note(note);
        let item_id = item.id;
        let mut line_id = None;

        self.lines.modify(|lines| {
            let key = MergeKey::new(item_id, note.as_deref());
            if let Some(line) = lines.iter_mut().find(|line| line.merge_key() == key) {
                line.quantity = line.quantity.saturating_add(quantity);
                line_id = Some(line.id);
            } else {
                let line = CartLine::new(item, quantity, note);
                line_id = Some(line.id);
                lines.push(line);
            }
            true
        });

        tracing::debug!(item_id = %item_id, quantity, "added to cart");
        self.persist();
        line_id
    }

    /// Set the quantity of a line. Zero or less removes it.
    ///
    /// The line keeps its ID and position. Returns `false` if no line has
    /// `line_id`.
    pub fn set_quantity(&self, line_id: LineId, quantity: i64) -> bool {
        let mut found = false;

        let changed = self.lines.modify(|lines| {
            let Some(index) = lines.iter().position(|line| line.id == line_id) else {
                return false;
            };
            found = true;

            if quantity <= 0 {
                lines.remove(index);
                return true;
            }

            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            match lines.get_mut(index) {
                Some(line) if line.quantity != quantity => {
                    line.quantity = quantity;
                    true
                }
                _ => false,
            }
        });

        if changed {
            tracing::debug!(line_id = %line_id, quantity, "cart quantity updated");
            self.persist();
        }
        found
    }

    /// Remove a line. Returns `false` if no line has `line_id`.
    pub fn remove_line(&self, line_id: LineId) -> bool {
        let removed = self.lines.modify(|lines| {
            let before = lines.len();
            lines.retain(|line| line.id != line_id);
            lines.len() != before
        });

        if removed {
            tracing::debug!(line_id = %line_id, "removed from cart");
            self.persist();
        }
        removed
    }

    /// Empty the cart and delete its persisted document.
    pub fn clear(&self) {
        let cleared = self.lines.modify(|lines| {
            let had_lines = !lines.is_empty();
            lines.clear();
            had_lines
        });

        if cleared {
            tracing::debug!("cart cleared");
        }
        if let Err(e) = self.storage.remove(CART_KEY) {
            tracing::error!(error = %e, "failed to remove persisted cart");
        }
    }

    fn persist(&self) {
        let result = self
            .lines
            .with(|lines| save_document(self.storage.as_ref(), CART_KEY, lines));
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to persist cart");
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// The line list, in insertion order.
    #[must_use]
    pub fn lines(&self) -> Observable<Vec<CartLine>> {
        self.lines.observe()
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Observable<Price> {
        self.total.clone()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> Observable<u32> {
        self.count.clone()
    }

    /// Subtotal, tax, delivery fee, and grand total.
    #[must_use]
    pub fn summary(&self) -> Observable<CartSummary> {
        self.summary.clone()
    }

    /// Whether any line holds `item_id`.
    #[must_use]
    pub fn contains(&self, item_id: MenuItemId) -> Observable<bool> {
        self.lines.observe().map(move |lines: &Vec<CartLine>| {
            lines.iter().any(|line| line.menu_item.id == item_id)
        })
    }

    /// A copy of the current lines, for handing to checkout.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.get()
    }

    /// The line with `line_id`, if present.
    #[must_use]
    pub fn line(&self, line_id: LineId) -> Option<CartLine> {
        self.lines
            .with(|lines| lines.iter().find(|line| line.id == line_id).cloned())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.with(Vec::is_empty)
    }
}

fn restore(storage: &dyn KeyValueStore) -> Vec<CartLine> {
    let Some(mut lines) = load_document::<Vec<CartLine>>(storage, CART_KEY) else {
        return Vec::new();
    };

    let before = lines.len();
    lines.retain(|line| line.quantity > 0);
    if lines.len() != before {
        tracing::warn!(
            dropped = before - lines.len(),
            "dropped persisted cart lines with zero quantity"
        );
    }

    tracing::info!(lines = lines.len(), "restored cart");
    lines
}
