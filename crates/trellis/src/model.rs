//! The content interface the layout engine consumes.
//!
//! [`GridModel`] is the engine's only window onto the content: counts,
//! natural sizes, reorder/edit permissions, and (optionally) the
//! declarative metrics snapshot. The engine never stores model data; it
//! asks again on every rebuild.
//!
//! Optional capabilities are declared once through
//! [`GridModel::capabilities`] and cached by the engine when the model is
//! attached — they are never re-queried per call. A model that does not
//! supply metrics degrades gracefully to a single column with the default
//! row height and no separators.

use trellis_core::Size;

use crate::element::ItemLocator;
use crate::metrics::{MetricsSnapshot, SupplementKind};

/// What an attached model can do beyond supplying counts and sizes.
///
/// Resolved once at attach time. The default is a measure-only model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelCapabilities {
    /// The model supplies a [`MetricsSnapshot`].
    pub supplies_metrics: bool,
    /// The model supports interactive reordering.
    pub supports_move: bool,
    /// The model supports item editing.
    pub supports_edit: bool,
}

impl ModelCapabilities {
    /// Capabilities of a measure-only model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable metrics supply.
    pub fn with_metrics(mut self) -> Self {
        self.supplies_metrics = true;
        self
    }

    /// Enable reordering.
    pub fn with_move(mut self) -> Self {
        self.supports_move = true;
        self
    }

    /// Enable editing.
    pub fn with_edit(mut self) -> Self {
        self.supports_edit = true;
        self
    }
}

/// The content provider consumed by [`GridLayout`](crate::GridLayout).
///
/// # Implementation Requirements
///
/// At minimum, implement [`section_count`](Self::section_count),
/// [`item_count`](Self::item_count), and [`item_size`](Self::item_size).
/// Size queries may be invoked several times per rebuild (once per
/// unresolved dimension); they take `&self` and must not attempt to
/// mutate engine state.
///
/// Models that reorder or edit must also override
/// [`capabilities`](Self::capabilities) — the engine checks the cached
/// descriptor, not the individual methods.
pub trait GridModel {
    /// Number of real sections.
    fn section_count(&self) -> usize;

    /// Number of items in a real section.
    fn item_count(&self, section: usize) -> usize;

    /// The natural size of an item, given the size budget it must fit.
    fn item_size(&self, locator: ItemLocator, fitting: Size) -> Size;

    /// The natural size of a supplement, given the size budget.
    ///
    /// `ordinal` is the supplement's position among the section's
    /// supplements of that kind. The default is a zero size, which
    /// collapses measured supplements.
    fn supplement_size(
        &self,
        locator: ItemLocator,
        kind: SupplementKind,
        fitting: Size,
    ) -> Size {
        let _ = (locator, kind, fitting);
        Size::ZERO
    }

    /// Whether the item at `from` may move to `to`. Only consulted when
    /// [`ModelCapabilities::supports_move`] is set.
    fn can_move_item(&self, from: ItemLocator, to: ItemLocator) -> bool {
        let _ = (from, to);
        false
    }

    /// Commit an accepted move. Called once per completed drag.
    fn move_item(&self, from: ItemLocator, to: ItemLocator) {
        let _ = (from, to);
    }

    /// Whether the item is editable. Only consulted when
    /// [`ModelCapabilities::supports_edit`] is set.
    fn can_edit_item(&self, locator: ItemLocator) -> bool {
        let _ = locator;
        false
    }

    /// The declarative metrics for this build. Only consulted when
    /// [`ModelCapabilities::supplies_metrics`] is set.
    fn metrics(&self) -> Option<MetricsSnapshot> {
        None
    }

    /// Declares the optional capabilities this model implements.
    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountOnly;

    impl GridModel for CountOnly {
        fn section_count(&self) -> usize {
            1
        }

        fn item_count(&self, _section: usize) -> usize {
            3
        }

        fn item_size(&self, _locator: ItemLocator, fitting: Size) -> Size {
            Size::new(fitting.width, 20.0)
        }
    }

    #[test]
    fn test_defaults_are_inert() {
        let model = CountOnly;
        assert_eq!(model.capabilities(), ModelCapabilities::default());
        assert!(!model.can_move_item(ItemLocator::new(0, 0), ItemLocator::new(0, 1)));
        assert!(!model.can_edit_item(ItemLocator::new(0, 0)));
        assert!(model.metrics().is_none());
        assert_eq!(
            model.supplement_size(
                ItemLocator::new(0, 0),
                SupplementKind::Header,
                Size::new(100.0, 100.0)
            ),
            Size::ZERO
        );
    }

    #[test]
    fn test_capability_builder() {
        let caps = ModelCapabilities::new().with_metrics().with_move();
        assert!(caps.supplies_metrics);
        assert!(caps.supports_move);
        assert!(!caps.supports_edit);
    }
}
