//! Per-section runtime state and the section layout algorithm.
//!
//! [`SectionState`] is rebuilt wholesale whenever content counts change
//! and reused (frames overwritten) for metrics-only relayouts such as a
//! width change or a drag move. [`SectionState::layout`] places every
//! element of one section into an inbound rectangle and returns the
//! origin for the next section.

use trellis_core::{Point, Rect, Size, hairline};

use crate::element::{ElementKind, ItemLocator, SectionIndex};
use crate::metrics::{RowHeight, SectionMetrics, SeparatorOptions, SupplementKind, SupplementMetrics};
use crate::model::GridModel;

/// Runtime state for one item.
#[derive(Debug, Clone, Default)]
pub struct ItemState {
    /// Frame in content coordinates.
    pub frame: Rect,
    /// Column index within the item's row.
    pub column: usize,
    /// Set while the item is the source of an active reorder drag; the
    /// item keeps its slot but is excluded from normal rendering.
    pub dragging: bool,
}

/// Runtime state for one header or footer.
#[derive(Debug, Clone)]
pub struct SupplementState {
    /// The declarative descriptor this state was built from.
    pub metrics: SupplementMetrics,
    /// Frame in content coordinates.
    pub frame: Rect,
    /// Resolved height (fixed or measured).
    pub height: f32,
    /// Suppressed from the visible set (keeps a zero-size record).
    pub hidden: bool,
    /// Dropped from the record set entirely (zero-height footers).
    pub omitted: bool,
}

impl SupplementState {
    fn new(metrics: SupplementMetrics) -> Self {
        Self {
            metrics,
            frame: Rect::ZERO,
            height: 0.0,
            hidden: false,
            omitted: false,
        }
    }
}

/// A reserved, currently-empty slot a dragged item would land in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhantomSlot {
    /// Slot position within the section's item list.
    pub index: usize,
    /// Size of the dragged item the slot is holding space for.
    pub size: Size,
}

/// A separator placed during layout. Separators are derived decorations:
/// they occupy no layout space and are regenerated on every pass.
#[derive(Debug, Clone, Copy)]
pub struct SeparatorState {
    /// One of the separator element kinds.
    pub kind: ElementKind,
    /// Disambiguates multiple separators of one kind within a section.
    pub ordinal: usize,
    /// Frame in content coordinates (already pixel-snapped).
    pub frame: Rect,
}

/// Runtime state for one section (or the global pseudo-section).
#[derive(Debug)]
pub struct SectionState {
    /// Which section this is.
    pub index: SectionIndex,
    /// The metrics this build used.
    pub metrics: SectionMetrics,
    /// Item states in ordinal order.
    pub items: Vec<ItemState>,
    /// Header supplements in descriptor order.
    pub headers: Vec<SupplementState>,
    /// Footer supplements in descriptor order.
    pub footers: Vec<SupplementState>,
    /// The one space being held open for a drag target, if any.
    pub phantom: Option<PhantomSlot>,
    /// Aggregate frame spanning everything the section placed.
    pub frame: Rect,
    /// The placeholder's frame while the placeholder is active.
    pub placeholder_frame: Option<Rect>,
    /// Separators produced by the last layout pass.
    pub separators: Vec<SeparatorState>,
    /// Indices into `headers` that are eligible for pinning, in layout
    /// order. Computed during layout.
    pub pinnable_headers: Vec<usize>,
}

impl SectionState {
    /// Build fresh state from metrics and an item count.
    ///
    /// The global pseudo-section always has zero items regardless of the
    /// count passed in.
    pub fn new(index: SectionIndex, metrics: SectionMetrics, item_count: usize) -> Self {
        let item_count = if index.is_global() { 0 } else { item_count };
        let mut headers = Vec::new();
        let mut footers = Vec::new();
        for supplement in &metrics.supplements {
            match supplement.kind {
                SupplementKind::Header => headers.push(SupplementState::new(supplement.clone())),
                SupplementKind::Footer => footers.push(SupplementState::new(supplement.clone())),
            }
        }

        Self {
            index,
            metrics,
            items: vec![ItemState::default(); item_count],
            headers,
            footers,
            phantom: None,
            frame: Rect::ZERO,
            placeholder_frame: None,
            separators: Vec::new(),
            pinnable_headers: Vec::new(),
        }
    }

    /// Whether the placeholder is active for this build.
    ///
    /// The placeholder wins over items when both are declared.
    #[inline]
    pub fn placeholder_active(&self) -> bool {
        self.metrics.has_placeholder
    }

    /// The number of layout slots: items plus the phantom gap.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.items.len() + usize::from(self.phantom.is_some())
    }

    /// The item index whose frame contains `point`, if any.
    pub fn item_at(&self, point: Point) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.frame.contains(point))
    }

    /// Lay the section out into `inbound` and return the origin for the
    /// next section (one past the bottom-right of everything placed).
    ///
    /// `inbound` has x fixed at the content origin, y at the end of the
    /// previous section, width equal to the viewport width minus content
    /// insets, and height equal to the remaining viewport height (the
    /// placeholder consumes exactly that remainder). Separators never
    /// advance the running offset.
    pub fn layout(
        &mut self,
        inbound: Rect,
        model: &dyn GridModel,
        scale: f32,
        is_last: bool,
    ) -> Point {
        let width = inbound.width();
        let mut y = inbound.top();

        self.separators.clear();
        self.pinnable_headers.clear();
        self.placeholder_frame = None;

        let placeholder_active = self.placeholder_active();
        // A real section with no items and no placeholder shows only the
        // supplements that opted into the empty state.
        let empty = !self.index.is_global()
            && !placeholder_active
            && self.items.is_empty()
            && self.phantom.is_none();
        let suppress_plain = placeholder_active || empty;

        // Headers, top-down in descriptor order. A suppressed or
        // zero-height header keeps a zero-size record for bookkeeping.
        for i in 0..self.headers.len() {
            let suppressed = {
                let header = &self.headers[i];
                header.metrics.hidden
                    || (suppress_plain && !header.metrics.visible_while_placeholder)
            };
            let height = if suppressed {
                0.0
            } else {
                self.resolve_supplement_height(i, SupplementKind::Header, width, model)
            };

            let header = &mut self.headers[i];
            header.hidden = suppressed;
            header.omitted = false;
            header.height = height;
            header.frame = Rect::new(inbound.left(), y, width, height);
            y += height;

            if !suppressed && height > 0.0 && header.metrics.pinnable {
                self.pinnable_headers.push(i);
            }
        }

        let headers_bottom = y;

        if placeholder_active {
            let remaining = (inbound.bottom() - y).max(0.0);
            self.placeholder_frame = Some(Rect::new(inbound.left(), y, width, remaining));
            y += remaining;
        } else if !self.items.is_empty() || self.phantom.is_some() {
            y = self.layout_rows(inbound, y, width, model, scale, is_last);
        }

        let separators = self.metrics.separators;
        if separators.options.contains(SeparatorOptions::SUPPLEMENTS) {
            if self.headers.iter().any(|h| !h.hidden && h.height > 0.0) {
                self.push_horizontal_separator(
                    ElementKind::HeaderSeparator,
                    0,
                    inbound,
                    headers_bottom,
                    scale,
                );
            }
            if self.visible_footer_pending(suppress_plain, width, model) {
                self.push_horizontal_separator(ElementKind::FooterSeparator, 0, inbound, y, scale);
            }
        }

        // Footers and other trailing supplements. A zero-height footer is
        // omitted outright rather than kept as a collapsed record.
        for i in 0..self.footers.len() {
            let suppressed = {
                let footer = &self.footers[i];
                footer.metrics.hidden
                    || (suppress_plain && !footer.metrics.visible_while_placeholder)
            };
            let height = if suppressed {
                0.0
            } else {
                self.resolve_supplement_height(i, SupplementKind::Footer, width, model)
            };

            let footer = &mut self.footers[i];
            footer.hidden = suppressed;
            footer.omitted = height <= 0.0;
            footer.height = height;
            footer.frame = Rect::new(inbound.left(), y, width, height);
            y += height;
        }

        self.frame = Rect::new(inbound.left(), inbound.top(), width, y - inbound.top());
        Point::new(inbound.right(), y)
    }

    /// Lay out the item rows (including the phantom gap) and emit row and
    /// column separators. Returns the new running offset.
    fn layout_rows(
        &mut self,
        inbound: Rect,
        items_start: f32,
        width: f32,
        model: &dyn GridModel,
        scale: f32,
        is_last: bool,
    ) -> f32 {
        let insets = self.metrics.insets;
        let columns = self.metrics.effective_columns();
        let content_left = inbound.left() + insets.left;
        let content_width = (width - insets.horizontal()).max(0.0);
        let column_width = content_width / columns as f32;

        let mut y = items_start + insets.top;
        let rows_top = y;

        // Slot order: item ordinals with the phantom gap spliced in.
        let mut slots: Vec<Option<usize>> = (0..self.items.len()).map(Some).collect();
        if let Some(phantom) = self.phantom {
            slots.insert(phantom.index.min(slots.len()), None);
        }

        let row_count = slots.len().div_ceil(columns);
        for row in 0..row_count {
            let chunk = &slots[row * columns..((row + 1) * columns).min(slots.len())];
            let row_top = y;
            let row_height = match self.metrics.row_height {
                RowHeight::Fixed(height) => height,
                RowHeight::Measured => {
                    let fitting = Size::new(column_width, inbound.height());
                    chunk
                        .iter()
                        .map(|slot| match slot {
                            Some(ordinal) => {
                                let locator =
                                    ItemLocator::in_section(self.index, *ordinal);
                                model.item_size(locator, fitting).height
                            }
                            None => self.phantom.map_or(0.0, |p| p.size.height),
                        })
                        .fold(0.0, f32::max)
                }
            };

            for (column, slot) in chunk.iter().enumerate() {
                if let Some(ordinal) = slot {
                    let item = &mut self.items[*ordinal];
                    item.column = column;
                    item.frame = Rect::new(
                        content_left + column as f32 * column_width,
                        row_top,
                        column_width,
                        row_height,
                    )
                    .snapped(scale);
                }
            }

            if row > 0 && self.metrics.separators.options.contains(SeparatorOptions::ROWS) {
                self.push_horizontal_separator(ElementKind::RowSeparator, row, inbound, row_top, scale);
            }

            y = row_top + row_height;
        }

        let rows_bottom = y;
        let separators = self.metrics.separators.options;
        if separators.contains(SeparatorOptions::BEFORE_SECTION) && row_count > 0 {
            self.push_horizontal_separator(ElementKind::RowSeparator, 0, inbound, rows_top, scale);
        }
        let wants_trailing = separators.contains(SeparatorOptions::AFTER_SECTION)
            || (is_last && separators.contains(SeparatorOptions::AFTER_LAST_SECTION));
        if wants_trailing && row_count > 0 {
            self.push_horizontal_separator(
                ElementKind::RowSeparator,
                row_count,
                inbound,
                rows_bottom,
                scale,
            );
        }
        if separators.contains(SeparatorOptions::COLUMNS) && row_count > 0 {
            for column in 1..columns {
                let x = content_left + column as f32 * column_width;
                self.separators.push(SeparatorState {
                    kind: ElementKind::ColumnSeparator,
                    ordinal: column,
                    frame: Rect::new(x, rows_top, hairline(scale), rows_bottom - rows_top)
                        .snapped(scale),
                });
            }
        }

        y + insets.bottom
    }

    fn push_horizontal_separator(
        &mut self,
        kind: ElementKind,
        ordinal: usize,
        inbound: Rect,
        boundary_y: f32,
        scale: f32,
    ) {
        let insets = self.metrics.separators.insets;
        let frame = Rect::new(
            inbound.left() + insets.left,
            boundary_y,
            (inbound.width() - insets.horizontal()).max(0.0),
            hairline(scale),
        );
        self.separators.push(SeparatorState {
            kind,
            ordinal,
            frame: frame.snapped(scale),
        });
    }

    /// Whether any footer will end up visible, without committing frames
    /// yet. Used to decide whether a footer separator is warranted.
    fn visible_footer_pending(
        &self,
        suppress_plain: bool,
        width: f32,
        model: &dyn GridModel,
    ) -> bool {
        self.footers.iter().enumerate().any(|(i, footer)| {
            let suppressed = footer.metrics.hidden
                || (suppress_plain && !footer.metrics.visible_while_placeholder);
            if suppressed {
                return false;
            }
            self.resolve_supplement_height(i, SupplementKind::Footer, width, model) > 0.0
        })
    }

    fn resolve_supplement_height(
        &self,
        ordinal: usize,
        kind: SupplementKind,
        width: f32,
        model: &dyn GridModel,
    ) -> f32 {
        let state = match kind {
            SupplementKind::Header => &self.headers[ordinal],
            SupplementKind::Footer => &self.footers[ordinal],
        };
        match state.metrics.height {
            Some(height) => height,
            None => {
                let locator = ItemLocator::in_section(self.index, ordinal);
                let fitting = Size::new(width, f32::MAX);
                model.supplement_size(locator, kind, fitting).height
            }
        }
    }
}
