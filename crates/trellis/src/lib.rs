//! Trellis: a sectioned grid layout engine for scrollable collection views.
//!
//! This crate computes the visual layout — positions, sizes, stacking
//! order, visibility — of items placed inside a scrollable, sectioned
//! container, and manages the transition between two layout snapshots
//! when the underlying content changes or during interactive reordering:
//!
//! - **Metrics model**: declarative per-section configuration (columns,
//!   row height policy, separators, insets, header/footer descriptors)
//! - **Section layout**: turns metrics plus content counts into concrete
//!   pixel-snapped frames for every cell, supplement, and decoration
//! - **Generational attribute cache**: two owned snapshots of computed
//!   attributes drive insert/remove/move/reload transitions without
//!   stale references
//! - **Pinning**: sticky headers clamped to the viewport edge on every
//!   scroll change, stacked without overlap
//! - **Drag-reorder**: an interactive reorder state machine with a
//!   phantom drop slot and edge autoscroll
//!
//! Drawing, event delivery, and scrolling physics are the host's job:
//! the engine consumes a [`GridModel`] and a viewport, and produces
//! [`LayoutAttributes`] records.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis::{GridLayout, GridModel, ItemLocator};
//! use trellis_core::{Point, Rect, Size};
//!
//! struct Numbers;
//!
//! impl GridModel for Numbers {
//!     fn section_count(&self) -> usize {
//!         1
//!     }
//!     fn item_count(&self, _section: usize) -> usize {
//!         100
//!     }
//!     fn item_size(&self, _locator: ItemLocator, fitting: Size) -> Size {
//!         Size::new(fitting.width, 32.0)
//!     }
//! }
//!
//! let mut layout = GridLayout::new();
//! layout.set_viewport_size(Size::new(320.0, 480.0));
//! layout.set_model(Some(Arc::new(Numbers)));
//! layout.prepare_layout();
//!
//! let visible = layout.attributes_in_rect(Rect::new(0.0, 0.0, 320.0, 480.0));
//! assert!(!visible.is_empty());
//! layout.set_content_offset(Point::new(0.0, 120.0));
//! ```

pub mod attributes;
pub mod drag;
pub mod element;
pub mod engine;
pub mod metrics;
pub mod model;
mod pinning;
pub mod section;

pub use attributes::{AttributeStore, LayoutAttributes};
pub use drag::{
    AUTOSCROLL_BASE_SPEED, AUTOSCROLL_INTERVAL, AUTOSCROLL_MAX_MULTIPLIER,
    AUTOSCROLL_TRIGGER_MARGIN, AutoscrollDirection, autoscroll_speed,
};
pub use element::{ElementKey, ElementKind, ItemLocator, SectionIndex};
pub use engine::{
    BoundsChangeEffect, ChangeOp, GridLayout, SlideDirection, UpdateError, UpdateResult,
};
pub use metrics::{
    MetricsSnapshot, RowHeight, SectionMetrics, SeparatorOptions, SeparatorStyle, SupplementKind,
    SupplementMetrics,
};
pub use model::{GridModel, ModelCapabilities};
pub use section::{ItemState, PhantomSlot, SectionState, SupplementState};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Engine lifecycle: invalidation, rebuilds, update transactions.
    pub const ENGINE: &str = "trellis::engine";
    /// Generation swaps in the attribute store.
    pub const ATTRIBUTES: &str = "trellis::attributes";
    /// Pinned-supplement repositioning.
    pub const PINNING: &str = "trellis::pinning";
    /// Drag-reorder and autoscroll state transitions.
    pub const DRAG: &str = "trellis::drag";
}
