//! Property tests for the layout invariants.

use std::sync::Arc;

use proptest::prelude::*;
use trellis::{
    GridLayout, GridModel, ItemLocator, MetricsSnapshot, ModelCapabilities, RowHeight,
    SectionIndex, SectionMetrics, SupplementMetrics, autoscroll_speed,
};
use trellis_core::{Point, Size};

struct UniformModel {
    count: usize,
    metrics: MetricsSnapshot,
}

impl GridModel for UniformModel {
    fn section_count(&self) -> usize {
        1
    }

    fn item_count(&self, _section: usize) -> usize {
        self.count
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

fn layout_with(count: usize, metrics: MetricsSnapshot) -> GridLayout {
    let mut layout = GridLayout::new();
    layout.set_viewport_size(Size::new(320.0, 480.0));
    layout.set_model(Some(Arc::new(UniformModel { count, metrics })));
    layout.prepare_layout();
    layout
}

proptest! {
    /// Column and row assignment is pure modular arithmetic over the
    /// ordinal, for any column count and item count.
    #[test]
    fn column_assignment_is_modular(columns in 1usize..6, count in 0usize..40) {
        let metrics = MetricsSnapshot::new().with_section(
            SectionMetrics::new()
                .with_columns(columns)
                .with_row_height(RowHeight::Fixed(44.0)),
        );
        let layout = layout_with(count, metrics);

        for ordinal in 0..count {
            let cell = layout
                .attributes_for_item(ItemLocator::new(0, ordinal))
                .unwrap();
            prop_assert_eq!(cell.column, ordinal % columns);
            prop_assert_eq!(cell.frame.top(), (ordinal / columns) as f32 * 44.0);
        }
    }

    /// Rebuilding with identical inputs reproduces identical frames.
    #[test]
    fn relayout_is_idempotent(columns in 1usize..5, count in 0usize..30) {
        let metrics = MetricsSnapshot::new().with_section(
            SectionMetrics::new()
                .with_columns(columns)
                .with_row_height(RowHeight::Measured),
        );
        let mut layout = layout_with(count, metrics);

        let before: Vec<_> = (0..count)
            .filter_map(|i| layout.attributes_for_item(ItemLocator::new(0, i)))
            .map(|record| record.frame)
            .collect();

        layout.invalidate_data();
        layout.prepare_layout();

        let after: Vec<_> = (0..count)
            .filter_map(|i| layout.attributes_for_item(ItemLocator::new(0, i)))
            .map(|record| record.frame)
            .collect();

        prop_assert_eq!(before, after);
    }

    /// Pinned headers never overlap, whatever the scroll offset and
    /// header heights.
    #[test]
    fn pinned_headers_never_overlap(
        heights in prop::collection::vec(5.0f32..80.0, 1..5),
        offset in 0.0f32..2000.0,
    ) {
        let mut global = SectionMetrics::new();
        for &height in &heights {
            global = global.with_supplement(
                SupplementMetrics::header().with_height(height).with_pinnable(true),
            );
        }
        let metrics = MetricsSnapshot::new()
            .with_global(global)
            .with_section(SectionMetrics::new().with_row_height(RowHeight::Fixed(44.0)));
        let mut layout = layout_with(60, metrics);
        layout.set_content_offset(Point::new(0.0, offset));

        let records: Vec<_> = (0..heights.len())
            .map(|ordinal| {
                layout
                    .attributes_for_element(trellis::ElementKey::header(
                        SectionIndex::Global,
                        ordinal,
                    ))
                    .unwrap()
                    .clone()
            })
            .collect();

        for pair in records.windows(2) {
            prop_assert!(pair[0].frame.bottom() <= pair[1].frame.top() + 1e-4);
        }
        // Clamping only ever pushes a header down, never above its
        // natural position.
        for record in &records {
            prop_assert!(record.frame.top() + 1e-4 >= record.unpinned_y);
        }
    }

    /// Autoscroll speed is zero at the margin's outer edge, monotone in
    /// penetration, and capped.
    #[test]
    fn autoscroll_speed_is_monotone_and_capped(a in 0.0f32..1.0, b in 0.0f32..1.0) {
        prop_assert_eq!(autoscroll_speed(0.0), 0.0);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(autoscroll_speed(low) <= autoscroll_speed(high));
        prop_assert!(
            autoscroll_speed(high)
                <= trellis::AUTOSCROLL_BASE_SPEED * trellis::AUTOSCROLL_MAX_MULTIPLIER
        );
    }
}
