//! Computed visual attributes and the two-generation attribute store.
//!
//! Every placed element gets exactly one [`LayoutAttributes`] record per
//! layout pass, keyed by its [`ElementKey`]. The store keeps two owned
//! generations: *current* (what the next draw will ask for) and
//! *previous* (what was on screen before the active rebuild). At rebuild
//! start the current generation is **moved** into the previous slot — an
//! ownership transfer, never a shared alias — so transition queries always
//! read a stable snapshot.
//!
//! Lookups for keys with no record return `None`. Absence is a valid
//! answer everywhere in this engine: scroll and drag events can race
//! ahead of a pending rebuild, and callers treat a missing record as
//! "no transition needed".

use std::collections::HashMap;

use trellis_core::{Color, EdgeInsets, Rect};

use crate::element::{ElementKey, ElementKind};

/// Stacking-order constants. Pinned supplements are elevated above all
/// ordinary content and ranked among themselves by pin order.
pub mod z {
    /// Section backgrounds, behind everything in the section.
    pub const BACKGROUND: i32 = 0;
    /// Hairline separators.
    pub const SEPARATOR: i32 = 10;
    /// Ordinary cells and placeholders.
    pub const CELL: i32 = 20;
    /// Unpinned headers and footers.
    pub const SUPPLEMENT: i32 = 30;
    /// Base for pinned supplements; pin order is added on top.
    pub const PINNED_BASE: i32 = 1000;
}

/// The computed visual state of one element.
///
/// Records are value types produced fresh on every layout pass; hosts
/// read them, they never write them back.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutAttributes {
    /// The element this record describes.
    pub key: ElementKey,
    /// Frame in content coordinates.
    pub frame: Rect,
    /// Stacking order; higher draws above lower.
    pub z_index: i32,
    /// Hidden elements keep their geometry but are not drawn.
    pub hidden: bool,
    /// Opacity in `[0, 1]`; transition endpoints use 0 for fades.
    pub alpha: f32,
    /// Whether the element is currently clamped to a viewport edge.
    pub pinned: bool,
    /// The y position the element returns to when it stops pinning.
    pub unpinned_y: f32,
    /// Whether the host may begin editing at this element.
    pub editable: bool,
    /// Whether the host may begin a reorder drag at this element.
    pub movable: bool,
    /// Column index, for cells.
    pub column: usize,
    /// Inner padding, for supplements.
    pub padding: EdgeInsets,
    /// Background color, if any.
    pub background: Option<Color>,
    /// Selected/highlighted background color, if any.
    pub selected_background: Option<Color>,
}

impl LayoutAttributes {
    /// A visible, unpinned record at the given frame.
    pub fn new(key: ElementKey, frame: Rect) -> Self {
        let z_index = match key.kind {
            ElementKind::SectionBackground => z::BACKGROUND,
            ElementKind::Cell | ElementKind::Placeholder => z::CELL,
            ElementKind::Header | ElementKind::Footer => z::SUPPLEMENT,
            _ => z::SEPARATOR,
        };
        Self {
            key,
            frame,
            z_index,
            hidden: false,
            alpha: 1.0,
            pinned: false,
            unpinned_y: frame.top(),
            editable: false,
            movable: false,
            column: 0,
            padding: EdgeInsets::ZERO,
            background: None,
            selected_background: None,
        }
    }

    /// Set the stacking order.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the hidden flag.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the column index.
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Set the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Set the movable flag.
    pub fn with_movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    /// Set the inner padding.
    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    /// Set the background colors.
    pub fn with_backgrounds(
        mut self,
        background: Option<Color>,
        selected_background: Option<Color>,
    ) -> Self {
        self.background = background;
        self.selected_background = selected_background;
        self
    }

    /// Reset pinning state to the element's natural position.
    pub(crate) fn reset_pinning(&mut self) {
        self.frame.origin.y = self.unpinned_y;
        self.pinned = false;
        self.z_index = match self.key.kind {
            ElementKind::Header | ElementKind::Footer => z::SUPPLEMENT,
            _ => self.z_index.min(z::SUPPLEMENT),
        };
    }
}

/// Two owned generations of attribute records.
#[derive(Debug, Default)]
pub struct AttributeStore {
    current: HashMap<ElementKey, LayoutAttributes>,
    previous: HashMap<ElementKey, LayoutAttributes>,
}

impl AttributeStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new generation: the current generation becomes the
    /// previous one by move, and current starts empty.
    ///
    /// Whatever was in the previous slot is dropped — only two
    /// generations ever exist.
    pub fn begin_generation(&mut self) {
        self.previous = std::mem::take(&mut self.current);
        tracing::trace!(
            target: "trellis::attributes",
            previous_len = self.previous.len(),
            "generation swapped"
        );
    }

    /// End the update transaction: the previous generation is dropped.
    pub fn end_generation(&mut self) {
        self.previous.clear();
    }

    /// Clear the current generation without touching the previous one.
    ///
    /// Used by metrics-only relayouts, which rewrite current frames but
    /// must not disturb an in-flight transition snapshot.
    pub fn reset_current(&mut self) {
        self.current.clear();
    }

    /// Insert a record into the current generation.
    ///
    /// Exactly one record per key may be produced per pass; a duplicate
    /// replaces the earlier record.
    pub fn insert(&mut self, attributes: LayoutAttributes) {
        self.current.insert(attributes.key, attributes);
    }

    /// Look up a current-generation record.
    pub fn current(&self, key: ElementKey) -> Option<&LayoutAttributes> {
        self.current.get(&key)
    }

    /// Look up a previous-generation record.
    pub fn previous(&self, key: ElementKey) -> Option<&LayoutAttributes> {
        self.previous.get(&key)
    }

    /// Mutable access to a current-generation record (pinning).
    pub(crate) fn current_mut(&mut self, key: ElementKey) -> Option<&mut LayoutAttributes> {
        self.current.get_mut(&key)
    }

    /// Iterate the current generation in unspecified order.
    pub fn iter_current(&self) -> impl Iterator<Item = &LayoutAttributes> {
        self.current.values()
    }

    /// Number of records in the current generation.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the current generation is empty.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
