//! Sticky-header positioning.
//!
//! Pinning repositions pin-eligible supplements so they hug the viewport
//! edge while their section is in view. It runs on every scroll-position
//! change, mutating the current-generation attribute records in place and
//! non-destructively: each record keeps its natural (unpinned) y, and the
//! `pinned` flag is derived by comparing the clamped position against it.
//!
//! Top pins stack: candidates are processed in layout order against an
//! advancing minimum so two pinned headers never overlap. Bottom pins
//! (global footers) are processed in reverse order against a shrinking
//! maximum. Only the first real section whose frame contains the pin
//! offset pins its own headers; headers of sections the viewport has
//! scrolled past return to their natural position.

use crate::attributes::{AttributeStore, z};
use crate::element::{ElementKey, SectionIndex};
use crate::section::SectionState;

/// Reposition every pin-eligible supplement for the given scroll state.
///
/// `pin_offset` is the content-space y coordinate of the viewport's top
/// edge; negative values (rubber-banding) never pull headers above their
/// natural position.
pub(crate) fn apply_pinning(
    store: &mut AttributeStore,
    global: &SectionState,
    sections: &[SectionState],
    pin_offset: f32,
    viewport_height: f32,
) {
    // Everything returns to its natural position first, so sections that
    // left the viewport lose their pinning without special cases.
    reset_section(store, global);
    for section in sections {
        reset_section(store, section);
    }

    let pin_offset = pin_offset.max(0.0);
    let mut pin_order = 0;
    let mut running_min_y = pin_offset;

    // Global top pins, in layout order.
    for &ordinal in &global.pinnable_headers {
        clamp_top(
            store,
            ElementKey::header(SectionIndex::Global, ordinal),
            &mut running_min_y,
            &mut pin_order,
        );
    }

    // Only the section currently intersecting the pin offset pins its own
    // headers, stacked below the global ones.
    if let Some(active) = sections
        .iter()
        .find(|section| section.frame.contains_y(pin_offset))
    {
        for &ordinal in &active.pinnable_headers {
            clamp_top(
                store,
                ElementKey::header(active.index, ordinal),
                &mut running_min_y,
                &mut pin_order,
            );
        }
    }

    // Global bottom pins, in reverse layout order against the viewport's
    // bottom edge.
    let mut running_max_y = pin_offset + viewport_height;
    for index in (0..global.footers.len()).rev() {
        let footer = &global.footers[index];
        if !footer.metrics.pinnable || footer.hidden || footer.omitted {
            continue;
        }
        let key = ElementKey::footer(SectionIndex::Global, index);
        let Some(record) = store.current_mut(key) else {
            continue;
        };
        let natural = record.unpinned_y;
        let clamped = natural.min(running_max_y - record.frame.height());
        record.frame.origin.y = clamped;
        record.pinned = clamped != natural;
        if record.pinned {
            record.z_index = z::PINNED_BASE + pin_order;
            pin_order += 1;
        }
        running_max_y = clamped;
    }

    if pin_order > 0 {
        tracing::trace!(target: "trellis::pinning", pinned = pin_order, offset = pin_offset, "applied pinning");
    }
}

/// The combined height of the currently pinned top-edge stack.
///
/// Used when adjusting a proposed scroll offset so newly inserted content
/// lands below the pinned headers instead of underneath them.
pub(crate) fn pinned_stack_height(store: &AttributeStore, global: &SectionState) -> f32 {
    global
        .pinnable_headers
        .iter()
        .filter_map(|&ordinal| store.current(ElementKey::header(SectionIndex::Global, ordinal)))
        .filter(|record| !record.hidden)
        .map(|record| record.frame.height())
        .sum()
}

fn reset_section(store: &mut AttributeStore, section: &SectionState) {
    for &ordinal in &section.pinnable_headers {
        if let Some(record) = store.current_mut(ElementKey::header(section.index, ordinal)) {
            record.reset_pinning();
        }
    }
    for (index, footer) in section.footers.iter().enumerate() {
        if footer.metrics.pinnable {
            if let Some(record) = store.current_mut(ElementKey::footer(section.index, index)) {
                record.reset_pinning();
            }
        }
    }
}

fn clamp_top(
    store: &mut AttributeStore,
    key: ElementKey,
    running_min_y: &mut f32,
    pin_order: &mut i32,
) {
    let Some(record) = store.current_mut(key) else {
        return;
    };
    let natural = record.unpinned_y;
    let clamped = natural.max(*running_min_y);
    record.frame.origin.y = clamped;
    record.pinned = clamped != natural;
    if record.pinned {
        record.z_index = z::PINNED_BASE + *pin_order;
        *pin_order += 1;
    }
    *running_min_y = clamped + record.frame.height();
}
