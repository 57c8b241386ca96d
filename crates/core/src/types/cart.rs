//! Cart lines.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::id::{LineId, MenuItemId};
use super::menu::MenuItem;
use super::price::Price;

/// Largest quantity a caller should put on a single line.
///
/// The cart store does not enforce this; callers clamp or reject first.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Clamp a requested quantity into `1..=MAX_LINE_QUANTITY`.
#[must_use]
pub fn clamp_quantity(quantity: i64) -> u32 {
    let clamped = quantity.clamp(1, i64::from(MAX_LINE_QUANTITY));
    u32::try_from(clamped).unwrap_or(1)
}

/// One line of a cart: an item, how many, and an optional note for the kitchen.
///
/// The item is shared with the catalog, never owned or mutated by the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: LineId,
    pub menu_item: Arc<MenuItem>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl CartLine {
    /// Start a new line with a freshly generated ID.
    ///
    /// Blank instructions are stored as `None`.
    #[must_use]
    pub fn new(menu_item: Arc<MenuItem>, quantity: u32, special_instructions: Option<String>) -> Self {
        Self {
            id: LineId::generate(),
            menu_item,
            quantity,
            special_instructions: normalize_note(special_instructions),
        }
    }

    /// The key that decides whether an addition merges into this line.
    #[must_use]
    pub fn merge_key(&self) -> MergeKey<'_> {
        MergeKey {
            item_id: self.menu_item.id,
            note: self.special_instructions.as_deref(),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.menu_item.price.times(self.quantity)
    }
}

/// Item ID plus special instructions, compared verbatim.
///
/// Blank and absent instructions are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeKey<'a> {
    pub item_id: MenuItemId,
    pub note: Option<&'a str>,
}

impl<'a> MergeKey<'a> {
    /// Build a key from raw user input.
    #[must_use]
    pub fn new(item_id: MenuItemId, note: Option<&'a str>) -> Self {
        Self {
            item_id,
            note: note.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Drop instructions that are empty or only whitespace. Other text is kept as written.
#[must_use]
pub fn normalize_note(note: Option<String>) -> Option<String> {
    note.filter(|n| !n.trim().is_empty())
}

/// Sum of line totals.
#[must_use]
pub fn lines_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

/// Sum of quantities.
#[must_use]
pub fn lines_count(lines: &[CartLine]) -> u32 {
    lines.iter().map(|line| line.quantity).sum()
}
