//! The layout engine: rebuild orchestration, attribute queries, and
//! update transactions.
//!
//! [`GridLayout`] owns all mutable layout state under a single logical
//! owner: section/item runtime state, the two-generation attribute store,
//! the validity flags, and the drag-reorder controller. Hosts drive it
//! synchronously — invalidation, scroll notifications, pointer events,
//! and the autoscroll tick all re-enter the engine on the owning thread.
//!
//! # Validity
//!
//! Two flags gate the cached geometry. `data_valid` covers counts and
//! structure (section/item lists); `metrics_valid` covers frames.
//! Invalidating data always invalidates metrics; invalidating metrics
//! alone keeps the structure and only rewrites frames on the next
//! [`prepare_layout`](GridLayout::prepare_layout). A rebuild request
//! arriving while a rebuild is in progress is a no-op.
//!
//! # Update transactions
//!
//! ```ignore
//! use trellis::{ChangeOp, GridLayout};
//!
//! layout.begin_updates(&[ChangeOp::InsertSection { index: 2, direction: None }])?;
//! // Query appearing_attributes / disappearing_attributes to drive the
//! // transition animation...
//! layout.end_updates()?;
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use thiserror::Error;
use trellis_core::{EdgeInsets, Point, Rect, Size};

use crate::attributes::{AttributeStore, LayoutAttributes};
use crate::drag::DragPhase;
use crate::element::{ElementKey, ElementKind, ItemLocator, SectionIndex};
use crate::metrics::{MetricsSnapshot, SectionMetrics};
use crate::model::{GridModel, ModelCapabilities};
use crate::pinning;
use crate::section::{PhantomSlot, SectionState};

/// Horizontal travel direction for a directional section operation.
///
/// The direction names the way the *content travels* during the
/// transition: with [`Left`](SlideDirection::Left), existing content
/// exits to the left and inserted content enters from the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Content travels left.
    Left,
    /// Content travels right.
    Right,
}

/// One entry in an update-transaction change list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeOp {
    /// A section was inserted at `index`.
    InsertSection {
        index: usize,
        direction: Option<SlideDirection>,
    },
    /// The section at `index` was removed.
    RemoveSection {
        index: usize,
        direction: Option<SlideDirection>,
    },
    /// The section at `index` was reloaded in place.
    ReloadSection { index: usize },
    /// A section moved from `from` to `to`.
    MoveSection {
        from: usize,
        to: usize,
        direction: Option<SlideDirection>,
    },
    /// An item was inserted at the locator.
    InsertItem { locator: ItemLocator },
    /// The item at the locator was removed.
    RemoveItem { locator: ItemLocator },
    /// The item at the locator was reloaded in place.
    ReloadItem { locator: ItemLocator },
    /// An item moved from `from` to `to`.
    MoveItem { from: ItemLocator, to: ItemLocator },
}

/// Errors reported at the update-transaction boundary.
///
/// A malformed change list is a programmer error on the caller's side;
/// the engine rejects it instead of computing a layout from inconsistent
/// bookkeeping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    /// `begin_updates` was called while a transaction was already open.
    #[error("an update transaction is already in progress")]
    AlreadyInProgress,
    /// `end_updates` was called with no open transaction.
    #[error("no update transaction is in progress")]
    NotInProgress,
    /// The change list names a section twice for the same operation.
    #[error("duplicate change for section {0}")]
    DuplicateSection(usize),
    /// The change list both removes and reloads the same section.
    #[error("conflicting changes for section {0}")]
    ConflictingSection(usize),
}

/// Result type for update-transaction operations.
pub type UpdateResult<T> = Result<T, UpdateError>;

/// What a bounds change requires of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsChangeEffect {
    /// Nothing changed.
    Unchanged,
    /// Scroll-only change: pinned supplements were repositioned.
    Repin,
    /// The available width (or x origin) changed: a full metrics
    /// recompute is pending.
    Relayout,
}

/// Classified change sets for the transaction in flight.
#[derive(Debug, Default)]
struct UpdateTransaction {
    inserted_sections: BTreeMap<usize, Option<SlideDirection>>,
    removed_sections: BTreeMap<usize, Option<SlideDirection>>,
    reloaded_sections: BTreeSet<usize>,
    inserted_items: BTreeSet<ItemLocator>,
    removed_items: BTreeSet<ItemLocator>,
    reloaded_items: BTreeSet<ItemLocator>,
    offset_at_begin: Point,
}

impl UpdateTransaction {
    fn classify(changes: &[ChangeOp]) -> UpdateResult<Self> {
        let mut transaction = Self::default();
        for change in changes {
            match *change {
                ChangeOp::InsertSection { index, direction } => {
                    if transaction
                        .inserted_sections
                        .insert(index, direction)
                        .is_some()
                    {
                        return Err(UpdateError::DuplicateSection(index));
                    }
                }
                ChangeOp::RemoveSection { index, direction } => {
                    if transaction
                        .removed_sections
                        .insert(index, direction)
                        .is_some()
                    {
                        return Err(UpdateError::DuplicateSection(index));
                    }
                }
                ChangeOp::ReloadSection { index } => {
                    if !transaction.reloaded_sections.insert(index) {
                        return Err(UpdateError::DuplicateSection(index));
                    }
                }
                ChangeOp::MoveSection {
                    from,
                    to,
                    direction,
                } => {
                    if transaction.removed_sections.insert(from, direction).is_some() {
                        return Err(UpdateError::DuplicateSection(from));
                    }
                    if transaction.inserted_sections.insert(to, direction).is_some() {
                        return Err(UpdateError::DuplicateSection(to));
                    }
                }
                ChangeOp::InsertItem { locator } => {
                    transaction.inserted_items.insert(locator);
                }
                ChangeOp::RemoveItem { locator } => {
                    transaction.removed_items.insert(locator);
                }
                ChangeOp::ReloadItem { locator } => {
                    transaction.reloaded_items.insert(locator);
                }
                ChangeOp::MoveItem { from, to } => {
                    transaction.removed_items.insert(from);
                    transaction.inserted_items.insert(to);
                }
            }
        }

        for &section in &transaction.reloaded_sections {
            if transaction.removed_sections.contains_key(&section) {
                return Err(UpdateError::ConflictingSection(section));
            }
        }
        Ok(transaction)
    }

    fn inserted_direction(&self, section: SectionIndex) -> Option<SlideDirection> {
        section
            .index()
            .and_then(|index| self.inserted_sections.get(&index))
            .copied()
            .flatten()
    }

    fn removed_direction(&self, section: SectionIndex) -> Option<SlideDirection> {
        section
            .index()
            .and_then(|index| self.removed_sections.get(&index))
            .copied()
            .flatten()
    }

    fn is_inserted(&self, key: ElementKey) -> bool {
        let in_section = key
            .locator
            .section
            .index()
            .is_some_and(|index| self.inserted_sections.contains_key(&index));
        in_section
            || (key.kind == ElementKind::Cell && self.inserted_items.contains(&key.locator))
    }

    fn is_removed(&self, key: ElementKey) -> bool {
        let in_section = key
            .locator
            .section
            .index()
            .is_some_and(|index| self.removed_sections.contains_key(&index));
        in_section
            || (key.kind == ElementKind::Cell && self.removed_items.contains(&key.locator))
    }

    fn is_reloaded(&self, key: ElementKey) -> bool {
        let in_section = key
            .locator
            .section
            .index()
            .is_some_and(|index| self.reloaded_sections.contains(&index));
        in_section
            || (key.kind == ElementKind::Cell && self.reloaded_items.contains(&key.locator))
    }
}

/// The sectioned grid layout engine.
///
/// See the [module documentation](self) for the lifecycle. All state is
/// owned here; the attached model is consulted through
/// [`GridModel`] on every rebuild and never cached beyond the counts and
/// frames derived from it.
pub struct GridLayout {
    model: Option<Arc<dyn GridModel>>,
    pub(crate) capabilities: ModelCapabilities,
    pub(crate) viewport_size: Size,
    content_insets: EdgeInsets,
    pub(crate) content_offset: Point,
    scale: f32,
    data_valid: bool,
    metrics_valid: bool,
    building: bool,
    pub(crate) global: SectionState,
    pub(crate) sections: Vec<SectionState>,
    pub(crate) store: AttributeStore,
    pub(crate) measured_size: Size,
    previous_measured_size: Size,
    transaction: Option<UpdateTransaction>,
    pub(crate) drag: DragPhase,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GridLayout {
    /// Create an engine with no model attached.
    pub fn new() -> Self {
        Self {
            model: None,
            capabilities: ModelCapabilities::default(),
            viewport_size: Size::ZERO,
            content_insets: EdgeInsets::ZERO,
            content_offset: Point::ZERO,
            scale: 1.0,
            data_valid: false,
            metrics_valid: false,
            building: false,
            global: SectionState::new(SectionIndex::Global, SectionMetrics::default(), 0),
            sections: Vec::new(),
            store: AttributeStore::new(),
            measured_size: Size::ZERO,
            previous_measured_size: Size::ZERO,
            transaction: None,
            drag: DragPhase::Idle,
        }
    }

    // =========================================================================
    // Model
    // =========================================================================

    /// The attached model, if any.
    pub fn model(&self) -> Option<&Arc<dyn GridModel>> {
        self.model.as_ref()
    }

    /// Attach or detach the model.
    ///
    /// Capabilities are resolved here, once, and cached for the lifetime
    /// of the attachment. Any active drag is abandoned.
    pub fn set_model(&mut self, model: Option<Arc<dyn GridModel>>) {
        self.capabilities = model
            .as_ref()
            .map(|m| m.capabilities())
            .unwrap_or_default();
        tracing::debug!(
            target: "trellis::engine",
            attached = model.is_some(),
            capabilities = ?self.capabilities,
            "model changed"
        );
        self.model = model;
        self.abandon_drag();
        self.invalidate_data();
    }

    /// The cached capability descriptor for the attached model.
    pub fn capabilities(&self) -> ModelCapabilities {
        self.capabilities
    }

    pub(crate) fn model_handle(&self) -> Option<Arc<dyn GridModel>> {
        self.model.clone()
    }

    // =========================================================================
    // Host geometry
    // =========================================================================

    /// Set the viewport size. A width change invalidates metrics.
    pub fn set_viewport_size(&mut self, size: Size) {
        if self.viewport_size != size {
            self.viewport_size = size;
            self.invalidate_metrics();
        }
    }

    /// The current viewport size.
    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Set the content insets. Changes invalidate metrics.
    pub fn set_content_insets(&mut self, insets: EdgeInsets) {
        if self.content_insets != insets {
            self.content_insets = insets;
            self.invalidate_metrics();
        }
    }

    /// Set the device scale factor used for pixel-grid snapping.
    pub fn set_scale_factor(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = scale;
            self.invalidate_metrics();
        }
    }

    /// The device scale factor.
    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    /// Record a new scroll position and reposition pinned supplements.
    ///
    /// This is the cheap path: section geometry is untouched, only the
    /// pinned subset of the current generation moves.
    pub fn set_content_offset(&mut self, offset: Point) {
        self.content_offset = offset;
        if self.metrics_valid {
            pinning::apply_pinning(
                &mut self.store,
                &self.global,
                &self.sections,
                offset.y,
                self.viewport_size.height,
            );
        }
    }

    /// The current scroll position.
    pub fn content_offset(&self) -> Point {
        self.content_offset
    }

    /// Classify a bounds change and apply it.
    ///
    /// A width or x-origin change warrants a full metrics recompute; a
    /// y-origin (scroll) change only repositions pinned supplements.
    pub fn bounds_changed(&mut self, old: Rect, new: Rect) -> BoundsChangeEffect {
        if new.size != old.size || new.origin.x != old.origin.x {
            self.viewport_size = new.size;
            self.content_offset = new.origin;
            self.invalidate_metrics();
            BoundsChangeEffect::Relayout
        } else if new.origin.y != old.origin.y {
            self.set_content_offset(new.origin);
            BoundsChangeEffect::Repin
        } else {
            BoundsChangeEffect::Unchanged
        }
    }

    // =========================================================================
    // Invalidation & rebuild
    // =========================================================================

    /// Invalidate counts and structure. Implies metrics invalidation.
    pub fn invalidate_data(&mut self) {
        tracing::trace!(target: "trellis::engine", "data invalidated");
        self.data_valid = false;
        self.metrics_valid = false;
    }

    /// Invalidate frames only; counts and structure are kept.
    pub fn invalidate_metrics(&mut self) {
        tracing::trace!(target: "trellis::engine", "metrics invalidated");
        self.metrics_valid = false;
    }

    /// Whether the cached geometry is current.
    pub fn is_layout_valid(&self) -> bool {
        self.data_valid && self.metrics_valid
    }

    /// Bring the cached geometry up to date.
    ///
    /// Re-entrant calls (a rebuild request arriving while one is active)
    /// are no-ops rather than queued retries.
    pub fn prepare_layout(&mut self) {
        if self.building || self.is_layout_valid() {
            return;
        }
        self.building = true;

        if !self.data_valid {
            self.rebuild_sections();
            self.data_valid = true;
        }
        self.layout_pass();
        self.metrics_valid = true;

        self.building = false;
    }

    /// Rebuild section/item runtime state wholesale from the model.
    fn rebuild_sections(&mut self) {
        self.abandon_drag();

        let Some(model) = self.model.clone() else {
            self.global = SectionState::new(SectionIndex::Global, SectionMetrics::default(), 0);
            self.sections.clear();
            return;
        };

        let snapshot = if self.capabilities.supplies_metrics {
            model.metrics().unwrap_or_default()
        } else {
            MetricsSnapshot::default()
        };

        self.global = SectionState::new(
            SectionIndex::Global,
            snapshot.global.clone().unwrap_or_default(),
            0,
        );

        let section_count = model.section_count();
        self.sections = (0..section_count)
            .map(|index| {
                SectionState::new(
                    SectionIndex::Section(index),
                    snapshot.section(index),
                    model.item_count(index),
                )
            })
            .collect();

        tracing::debug!(
            target: "trellis::engine",
            sections = section_count,
            "rebuilt section state"
        );
    }

    /// Run the full placement pass and refill the current generation.
    fn layout_pass(&mut self) {
        self.store.reset_current();

        let Some(model) = self.model.clone() else {
            self.measured_size = Size::ZERO;
            return;
        };

        let inner_left = self.content_insets.left;
        let inner_width = (self.viewport_size.width - self.content_insets.horizontal()).max(0.0);
        let viewport_height = self.viewport_size.height;
        let mut y = self.content_insets.top;

        let inbound = Rect::new(inner_left, y, inner_width, (viewport_height - y).max(0.0));
        y = self
            .global
            .layout(inbound, model.as_ref(), self.scale, false)
            .y;

        let section_count = self.sections.len();
        for (index, section) in self.sections.iter_mut().enumerate() {
            let remaining = (viewport_height - y).max(0.0);
            let inbound = Rect::new(inner_left, y, inner_width, remaining);
            let is_last = index + 1 == section_count;
            y = section.layout(inbound, model.as_ref(), self.scale, is_last).y;
        }

        self.measured_size = Size::new(self.viewport_size.width, y + self.content_insets.bottom);
        self.collect_attributes(model.as_ref());

        pinning::apply_pinning(
            &mut self.store,
            &self.global,
            &self.sections,
            self.content_offset.y,
            self.viewport_size.height,
        );

        tracing::debug!(
            target: "trellis::engine",
            records = self.store.len(),
            content_height = self.measured_size.height,
            "layout pass complete"
        );
    }

    /// Produce one attribute record per placed element.
    fn collect_attributes(&mut self, model: &dyn GridModel) {
        let capabilities = self.capabilities;
        let store = &mut self.store;

        for section in std::iter::once(&self.global).chain(self.sections.iter()) {
            if let Some(color) = section.metrics.background
                && !section.frame.is_empty()
            {
                store.insert(
                    LayoutAttributes::new(
                        ElementKey::new(
                            ItemLocator::in_section(section.index, 0),
                            ElementKind::SectionBackground,
                        ),
                        section.frame,
                    )
                    .with_backgrounds(Some(color), None),
                );
            }

            for (ordinal, header) in section.headers.iter().enumerate() {
                store.insert(
                    LayoutAttributes::new(
                        ElementKey::header(section.index, ordinal),
                        header.frame,
                    )
                    .with_hidden(header.hidden)
                    .with_padding(header.metrics.padding)
                    .with_backgrounds(
                        header.metrics.background,
                        header.metrics.selected_background,
                    ),
                );
            }

            if let Some(frame) = section.placeholder_frame {
                store.insert(LayoutAttributes::new(
                    ElementKey::new(
                        ItemLocator::in_section(section.index, 0),
                        ElementKind::Placeholder,
                    ),
                    frame,
                ));
            }

            for (ordinal, item) in section.items.iter().enumerate() {
                let locator = ItemLocator::in_section(section.index, ordinal);
                let editable =
                    capabilities.supports_edit && model.can_edit_item(locator);
                store.insert(
                    LayoutAttributes::new(ElementKey::cell(locator), item.frame)
                        .with_column(item.column)
                        .with_hidden(item.dragging)
                        .with_editable(editable)
                        .with_movable(capabilities.supports_move),
                );
            }

            for separator in &section.separators {
                store.insert(
                    LayoutAttributes::new(
                        ElementKey::new(
                            ItemLocator::in_section(section.index, separator.ordinal),
                            separator.kind,
                        ),
                        separator.frame,
                    )
                    .with_backgrounds(Some(section.metrics.separators.color), None),
                );
            }

            for (ordinal, footer) in section.footers.iter().enumerate() {
                if footer.omitted {
                    continue;
                }
                store.insert(
                    LayoutAttributes::new(
                        ElementKey::footer(section.index, ordinal),
                        footer.frame,
                    )
                    .with_hidden(footer.hidden)
                    .with_padding(footer.metrics.padding)
                    .with_backgrounds(
                        footer.metrics.background,
                        footer.metrics.selected_background,
                    ),
                );
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The computed content size.
    ///
    /// While an update transaction is in flight the previous generation's
    /// size is reported, so the host's scroll range does not jump
    /// mid-transition.
    pub fn content_size(&self) -> Size {
        if self.transaction.is_some() {
            self.previous_measured_size
        } else {
            self.measured_size
        }
    }

    /// All visible current-generation records intersecting `rect`, in
    /// deterministic (z, key) order.
    pub fn attributes_in_rect(&self, rect: Rect) -> Vec<LayoutAttributes> {
        let mut records: Vec<LayoutAttributes> = self
            .store
            .iter_current()
            .filter(|record| !record.hidden && record.frame.intersects(&rect))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.z_index
                .cmp(&b.z_index)
                .then_with(|| a.key.cmp(&b.key))
        });
        records
    }

    /// The current-generation record for a cell.
    pub fn attributes_for_item(&self, locator: ItemLocator) -> Option<&LayoutAttributes> {
        self.store.current(ElementKey::cell(locator))
    }

    /// The current-generation record for any element.
    ///
    /// A missing record is reported as `None`; callers treat absence as
    /// "no transition needed", never as an error.
    pub fn attributes_for_element(&self, key: ElementKey) -> Option<&LayoutAttributes> {
        self.store.current(key)
    }

    /// The aggregate frame of a section.
    pub fn section_frame(&self, section: SectionIndex) -> Option<Rect> {
        self.section_state(section).map(|state| state.frame)
    }

    /// The item under a content-space point.
    pub fn item_locator_at(&self, point: Point) -> Option<ItemLocator> {
        for section in &self.sections {
            if let Some(item) = section.item_at(point) {
                return Some(ItemLocator::in_section(section.index, item));
            }
        }
        None
    }

    pub(crate) fn section_state(&self, section: SectionIndex) -> Option<&SectionState> {
        match section {
            SectionIndex::Global => Some(&self.global),
            SectionIndex::Section(index) => self.sections.get(index),
        }
    }

    pub(crate) fn section_state_mut(&mut self, section: SectionIndex) -> Option<&mut SectionState> {
        match section {
            SectionIndex::Global => Some(&mut self.global),
            SectionIndex::Section(index) => self.sections.get_mut(index),
        }
    }

    /// Hold space open at `slot` in `section`, clearing the phantom slot
    /// of every other section: only one drag target exists system-wide.
    pub(crate) fn set_phantom_slot(&mut self, section: usize, slot: Option<PhantomSlot>) {
        for state in &mut self.sections {
            state.phantom = None;
        }
        if let Some(state) = self.sections.get_mut(section) {
            state.phantom = slot;
        }
    }

    pub(crate) fn clear_phantom_slots(&mut self) {
        for state in &mut self.sections {
            state.phantom = None;
        }
    }

    /// Drop any drag session without touching the model. Used when the
    /// underlying data is rebuilt out from under an active drag.
    fn abandon_drag(&mut self) {
        if !matches!(self.drag, DragPhase::Idle) {
            tracing::debug!(target: "trellis::drag", "drag abandoned by data rebuild");
            self.drag = DragPhase::Idle;
        }
    }

    // =========================================================================
    // Update transactions
    // =========================================================================

    /// Open an update transaction.
    ///
    /// Classifies `changes` into inserted/removed/reloaded locators and
    /// sections, swaps the attribute generations (the current generation
    /// becomes the stable "previous" snapshot by move), and rebuilds
    /// layout for the new content.
    pub fn begin_updates(&mut self, changes: &[ChangeOp]) -> UpdateResult<()> {
        if self.transaction.is_some() {
            return Err(UpdateError::AlreadyInProgress);
        }
        let mut transaction = UpdateTransaction::classify(changes)?;
        transaction.offset_at_begin = self.content_offset;

        tracing::debug!(
            target: "trellis::engine",
            inserted_sections = transaction.inserted_sections.len(),
            removed_sections = transaction.removed_sections.len(),
            reloaded_sections = transaction.reloaded_sections.len(),
            "update transaction opened"
        );

        self.previous_measured_size = self.measured_size;
        self.store.begin_generation();
        self.transaction = Some(transaction);
        self.invalidate_data();
        self.prepare_layout();
        Ok(())
    }

    /// Close the transaction: the previous generation is dropped.
    pub fn end_updates(&mut self) -> UpdateResult<()> {
        if self.transaction.take().is_none() {
            return Err(UpdateError::NotInProgress);
        }
        self.store.end_generation();
        tracing::debug!(target: "trellis::engine", "update transaction closed");
        Ok(())
    }

    /// Whether an update transaction is in flight.
    pub fn is_updating(&self) -> bool {
        self.transaction.is_some()
    }

    /// The opening visual state for an element appearing in the current
    /// generation, or `None` when no record exists for the key.
    ///
    /// Inserted elements fade in (or slide in by one viewport width when
    /// their section operation is directional); reloaded elements with no
    /// previous counterpart cross-fade in; everything else starts from
    /// its current frame adjusted by the scroll-offset delta accrued
    /// since the transaction opened.
    pub fn appearing_attributes(&self, key: ElementKey) -> Option<LayoutAttributes> {
        let mut record = self.store.current(key)?.clone();
        let Some(transaction) = &self.transaction else {
            return Some(record);
        };

        if let Some(direction) = transaction.inserted_direction(key.locator.section) {
            // Directional operations override the fade heuristics
            // entirely, pinned state included.
            record.frame.origin.x += match direction {
                SlideDirection::Left => self.viewport_size.width,
                SlideDirection::Right => -self.viewport_size.width,
            };
        } else if transaction.is_inserted(key) {
            record.alpha = 0.0;
        } else if transaction.is_reloaded(key) && self.store.previous(key).is_none() {
            record.alpha = 0.0;
        } else {
            let delta = self.pending_offset_delta(transaction);
            record.frame = record.frame.offset(delta.x, delta.y);
        }
        Some(record)
    }

    /// The closing visual state for an element leaving the previous
    /// generation, or `None` when no record exists for the key.
    pub fn disappearing_attributes(&self, key: ElementKey) -> Option<LayoutAttributes> {
        let mut record = self.store.previous(key)?.clone();
        let Some(transaction) = &self.transaction else {
            return Some(record);
        };

        if let Some(direction) = transaction.removed_direction(key.locator.section) {
            record.frame.origin.x += match direction {
                SlideDirection::Left => -self.viewport_size.width,
                SlideDirection::Right => self.viewport_size.width,
            };
        } else if transaction.is_removed(key) {
            record.alpha = 0.0;
        } else if transaction.is_reloaded(key) && self.store.current(key).is_none() {
            record.alpha = 0.0;
        } else {
            let delta = self.pending_offset_delta(transaction);
            record.frame = record.frame.offset(delta.x, delta.y);
        }
        Some(record)
    }

    fn pending_offset_delta(&self, transaction: &UpdateTransaction) -> Point {
        Point::new(
            self.content_offset.x - transaction.offset_at_begin.x,
            self.content_offset.y - transaction.offset_at_begin.y,
        )
    }

    /// Adjust a proposed scroll offset so the first directionally
    /// inserted section lands below the pinned-header stack instead of
    /// underneath it. Identity when no such section exists.
    pub fn target_offset_for(&self, proposed: Point) -> Point {
        let Some(transaction) = &self.transaction else {
            return proposed;
        };
        let Some((&index, _)) = transaction
            .inserted_sections
            .iter()
            .find(|(_, direction)| direction.is_some())
        else {
            return proposed;
        };
        let Some(section) = self.sections.get(index) else {
            return proposed;
        };

        let stack = pinning::pinned_stack_height(&self.store, &self.global);
        let max_offset = (self.measured_size.height - self.viewport_size.height).max(0.0);
        let y = (section.frame.top() - stack).clamp(0.0, max_offset);
        Point::new(proposed.x, y)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::metrics::{RowHeight, SupplementMetrics};

    /// A mutable fixture model: sections of item counts, fixed metrics.
    struct FixtureModel {
        counts: RefCell<Vec<usize>>,
        metrics: MetricsSnapshot,
    }

    impl FixtureModel {
        fn new(counts: Vec<usize>, metrics: MetricsSnapshot) -> Arc<Self> {
            Arc::new(Self {
                counts: RefCell::new(counts),
                metrics,
            })
        }
    }

    impl GridModel for FixtureModel {
        fn section_count(&self) -> usize {
            self.counts.borrow().len()
        }

        fn item_count(&self, section: usize) -> usize {
            self.counts.borrow().get(section).copied().unwrap_or(0)
        }

        fn item_size(&self, _locator: ItemLocator, fitting: Size) -> Size {
            Size::new(fitting.width, 30.0)
        }

        fn metrics(&self) -> Option<MetricsSnapshot> {
            Some(self.metrics.clone())
        }

        fn capabilities(&self) -> ModelCapabilities {
            ModelCapabilities::new().with_metrics()
        }
    }

    fn three_section_metrics() -> MetricsSnapshot {
        let section = SectionMetrics::new().with_row_height(RowHeight::Fixed(44.0));
        MetricsSnapshot::new()
            .with_section(section.clone())
            .with_section(section.clone())
            .with_section(section)
    }

    fn engine_with(counts: Vec<usize>, metrics: MetricsSnapshot) -> (GridLayout, Arc<FixtureModel>) {
        let model = FixtureModel::new(counts, metrics);
        let mut layout = GridLayout::new();
        layout.set_viewport_size(Size::new(300.0, 400.0));
        layout.set_model(Some(model.clone()));
        layout.prepare_layout();
        (layout, model)
    }

    #[test]
    fn test_layout_is_idempotent() {
        let (mut layout, _model) = engine_with(vec![2, 3, 1], three_section_metrics());

        let before: Vec<_> = (0..3)
            .flat_map(|s| {
                (0..layout.section_state(SectionIndex::Section(s)).unwrap().items.len())
                    .map(move |i| ItemLocator::new(s, i))
            })
            .map(|locator| layout.attributes_for_item(locator).unwrap().frame)
            .collect();

        layout.invalidate_data();
        layout.prepare_layout();

        let after: Vec<_> = (0..3)
            .flat_map(|s| {
                (0..layout.section_state(SectionIndex::Section(s)).unwrap().items.len())
                    .map(move |i| ItemLocator::new(s, i))
            })
            .map(|locator| layout.attributes_for_item(locator).unwrap().frame)
            .collect();

        assert_eq!(before, after);
    }

    #[test]
    fn test_insert_section_purges_stale_records() {
        let (mut layout, model) = engine_with(vec![2, 2], three_section_metrics());

        // Section 1's items start after section 0's two rows.
        let old_frame = layout
            .attributes_for_item(ItemLocator::new(1, 0))
            .unwrap()
            .frame;
        assert_eq!(old_frame.top(), 88.0);

        // The content gains a section at index 1; the old section 1 is
        // now reachable only at index 2.
        model.counts.borrow_mut().insert(1, 1);
        layout
            .begin_updates(&[ChangeOp::InsertSection {
                index: 1,
                direction: None,
            }])
            .unwrap();

        let shifted = layout
            .attributes_for_item(ItemLocator::new(2, 0))
            .unwrap()
            .frame;
        assert_eq!(shifted.top(), 88.0 + 44.0);

        // No stale record survives for the vacated tail locator.
        assert!(layout.attributes_for_item(ItemLocator::new(2, 2)).is_none());
        layout.end_updates().unwrap();
    }

    #[test]
    fn test_content_size_is_previous_mid_transaction() {
        let (mut layout, model) = engine_with(vec![2], three_section_metrics());
        assert_eq!(layout.content_size(), Size::new(300.0, 88.0));

        model.counts.borrow_mut()[0] = 4;
        layout
            .begin_updates(&[
                ChangeOp::InsertItem {
                    locator: ItemLocator::new(0, 2),
                },
                ChangeOp::InsertItem {
                    locator: ItemLocator::new(0, 3),
                },
            ])
            .unwrap();

        // Mid-transaction the old size is reported...
        assert_eq!(layout.content_size(), Size::new(300.0, 88.0));
        layout.end_updates().unwrap();
        // ...and the new size afterwards.
        assert_eq!(layout.content_size(), Size::new(300.0, 176.0));
    }

    #[test]
    fn test_appearing_inserted_item_fades_in() {
        let (mut layout, model) = engine_with(vec![2], three_section_metrics());

        model.counts.borrow_mut()[0] = 3;
        layout
            .begin_updates(&[ChangeOp::InsertItem {
                locator: ItemLocator::new(0, 2),
            }])
            .unwrap();

        let appearing = layout
            .appearing_attributes(ElementKey::cell(ItemLocator::new(0, 2)))
            .unwrap();
        assert_eq!(appearing.alpha, 0.0);
        assert_eq!(appearing.frame.top(), 88.0);

        // An untouched element starts from its current frame.
        let steady = layout
            .appearing_attributes(ElementKey::cell(ItemLocator::new(0, 0)))
            .unwrap();
        assert_eq!(steady.alpha, 1.0);
        layout.end_updates().unwrap();
    }

    #[test]
    fn test_directional_insert_slides_by_viewport_width() {
        let (mut layout, model) = engine_with(vec![2], three_section_metrics());

        model.counts.borrow_mut().insert(0, 1);
        layout
            .begin_updates(&[ChangeOp::InsertSection {
                index: 0,
                direction: Some(SlideDirection::Left),
            }])
            .unwrap();

        let appearing = layout
            .appearing_attributes(ElementKey::cell(ItemLocator::new(0, 0)))
            .unwrap();
        // Content travels left, so the inserted cell enters from the right.
        assert_eq!(appearing.frame.left(), 300.0);
        assert_eq!(appearing.alpha, 1.0);
        layout.end_updates().unwrap();
    }

    #[test]
    fn test_disappearing_removed_item_fades_out() {
        let (mut layout, model) = engine_with(vec![3], three_section_metrics());

        model.counts.borrow_mut()[0] = 2;
        layout
            .begin_updates(&[ChangeOp::RemoveItem {
                locator: ItemLocator::new(0, 2),
            }])
            .unwrap();

        let disappearing = layout
            .disappearing_attributes(ElementKey::cell(ItemLocator::new(0, 2)))
            .unwrap();
        assert_eq!(disappearing.alpha, 0.0);

        // Keys that never existed resolve to a clear absence.
        assert!(
            layout
                .disappearing_attributes(ElementKey::cell(ItemLocator::new(9, 9)))
                .is_none()
        );
        layout.end_updates().unwrap();
    }

    #[test]
    fn test_transaction_guards() {
        let (mut layout, _model) = engine_with(vec![1], three_section_metrics());

        assert_eq!(layout.end_updates(), Err(UpdateError::NotInProgress));
        layout.begin_updates(&[]).unwrap();
        assert_eq!(layout.begin_updates(&[]), Err(UpdateError::AlreadyInProgress));
        layout.end_updates().unwrap();
    }

    #[test]
    fn test_malformed_change_lists_are_rejected() {
        let (mut layout, _model) = engine_with(vec![1], three_section_metrics());

        let duplicate = [
            ChangeOp::InsertSection {
                index: 1,
                direction: None,
            },
            ChangeOp::InsertSection {
                index: 1,
                direction: None,
            },
        ];
        assert_eq!(
            layout.begin_updates(&duplicate),
            Err(UpdateError::DuplicateSection(1))
        );

        let conflicting = [
            ChangeOp::RemoveSection {
                index: 0,
                direction: None,
            },
            ChangeOp::ReloadSection { index: 0 },
        ];
        assert_eq!(
            layout.begin_updates(&conflicting),
            Err(UpdateError::ConflictingSection(0))
        );

        // A rejected change list leaves no transaction open.
        assert!(!layout.is_updating());
    }

    #[test]
    fn test_bounds_change_classification() {
        let (mut layout, _model) = engine_with(vec![2], three_section_metrics());

        let old = Rect::new(0.0, 0.0, 300.0, 400.0);
        // Scroll-only change repins.
        assert_eq!(
            layout.bounds_changed(old, Rect::new(0.0, 50.0, 300.0, 400.0)),
            BoundsChangeEffect::Repin
        );
        assert!(layout.is_layout_valid());
        assert_eq!(layout.content_offset().y, 50.0);

        // Width change relayouts.
        assert_eq!(
            layout.bounds_changed(
                Rect::new(0.0, 50.0, 300.0, 400.0),
                Rect::new(0.0, 50.0, 320.0, 400.0)
            ),
            BoundsChangeEffect::Relayout
        );
        assert!(!layout.is_layout_valid());

        layout.prepare_layout();
        assert_eq!(
            layout.bounds_changed(
                Rect::new(0.0, 50.0, 320.0, 400.0),
                Rect::new(0.0, 50.0, 320.0, 400.0)
            ),
            BoundsChangeEffect::Unchanged
        );
    }

    #[test]
    fn test_missing_metrics_capability_degrades_to_defaults() {
        struct PlainModel;
        impl GridModel for PlainModel {
            fn section_count(&self) -> usize {
                1
            }
            fn item_count(&self, _section: usize) -> usize {
                2
            }
            fn item_size(&self, _locator: ItemLocator, fitting: Size) -> Size {
                Size::new(fitting.width, 30.0)
            }
            fn metrics(&self) -> Option<MetricsSnapshot> {
                // Even though this model could supply metrics, it does not
                // declare the capability, so the engine must not ask.
                panic!("metrics queried without the capability");
            }
        }

        let mut layout = GridLayout::new();
        layout.set_viewport_size(Size::new(200.0, 400.0));
        layout.set_model(Some(Arc::new(PlainModel)));
        layout.prepare_layout();

        // One column at the default row height.
        let first = layout.attributes_for_item(ItemLocator::new(0, 0)).unwrap();
        assert_eq!(first.frame, Rect::new(0.0, 0.0, 200.0, 44.0));
        let second = layout.attributes_for_item(ItemLocator::new(0, 1)).unwrap();
        assert_eq!(second.frame.top(), 44.0);
        assert_eq!(second.column, 0);
    }

    #[test]
    fn test_global_header_scenario() {
        // 1 global section (one 50pt pinned header) + 2 regular sections
        // of 3 items at row height 44 in a 300x400 viewport.
        let metrics = MetricsSnapshot::new()
            .with_global(
                SectionMetrics::new().with_supplement(
                    SupplementMetrics::header()
                        .with_height(50.0)
                        .with_pinnable(true),
                ),
            )
            .with_section(SectionMetrics::new().with_row_height(RowHeight::Fixed(44.0)))
            .with_section(SectionMetrics::new().with_row_height(RowHeight::Fixed(44.0)));
        let (mut layout, _model) = engine_with(vec![3, 3], metrics);

        assert_eq!(
            layout.content_size(),
            Size::new(300.0, 50.0 + 3.0 * 44.0 + 3.0 * 44.0)
        );

        let header_key = ElementKey::header(SectionIndex::Global, 0);
        let header = layout.attributes_for_element(header_key).unwrap();
        assert_eq!(header.frame.top(), 0.0);
        assert!(!header.pinned);

        layout.set_content_offset(Point::new(0.0, 10.0));
        let header = layout.attributes_for_element(header_key).unwrap();
        assert_eq!(header.frame.top(), 10.0);
        assert!(header.pinned);
    }

    #[test]
    fn test_attributes_in_rect_ordering_and_visibility() {
        let metrics = MetricsSnapshot::new()
            .with_section(
                SectionMetrics::new()
                    .with_row_height(RowHeight::Fixed(44.0))
                    .with_background(trellis_core::Color::WHITE),
            );
        let (layout, _model) = engine_with(vec![3], metrics);

        let records = layout.attributes_in_rect(Rect::new(0.0, 0.0, 300.0, 80.0));
        // Background first, then cells in locator order.
        assert_eq!(records[0].key.kind, ElementKind::SectionBackground);
        let cells: Vec<_> = records
            .iter()
            .filter(|r| r.key.kind == ElementKind::Cell)
            .map(|r| r.key.locator.item)
            .collect();
        assert_eq!(cells, vec![0, 1]);

        // Far-away rects see nothing.
        assert!(layout.attributes_in_rect(Rect::new(0.0, 5000.0, 10.0, 10.0)).is_empty());
    }
}
