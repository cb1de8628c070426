//! Interactive drag-reorder with edge autoscroll.
//!
//! The drag state machine is `Idle → Dragging → Idle`, with the commit
//! and cancel paths both returning to idle. While dragging, the source
//! item keeps its slot but is hidden; the space a drop would occupy is
//! held open by a phantom slot in the target section, and the engine
//! enforces that at most one phantom slot exists system-wide.
//!
//! Autoscroll engages when the drag visual's center enters a trigger
//! margin at the viewport's top or bottom edge. Scroll speed is linear in
//! penetration depth — zero at the margin's outer edge, capped at
//! [`AUTOSCROLL_MAX_MULTIPLIER`] times the base speed at the inner edge —
//! and the per-tick displacement is clamped so the content offset stays
//! inside the scrollable range. The tick itself is an [`IntervalTimer`]
//! with an explicit lifecycle: starting an already-running direction is a
//! no-op, a new direction replaces the running timer, and direction
//! `None` cancels it outright.

use std::time::{Duration, Instant};

use trellis_core::{IntervalTimer, Point, Rect, Size};

use crate::element::{ItemLocator, SectionIndex};
use crate::engine::GridLayout;
use crate::section::PhantomSlot;

/// Distance from a viewport edge at which autoscroll engages.
pub const AUTOSCROLL_TRIGGER_MARGIN: f32 = 48.0;

/// Scroll displacement per tick at minimal penetration, in points.
pub const AUTOSCROLL_BASE_SPEED: f32 = 4.0;

/// Cap on the speed, as a multiple of [`AUTOSCROLL_BASE_SPEED`].
pub const AUTOSCROLL_MAX_MULTIPLIER: f32 = 4.0;

/// The autoscroll tick interval.
pub const AUTOSCROLL_INTERVAL: Duration = Duration::from_millis(16);

/// The per-tick scroll speed for a penetration depth in `[0, 1]`.
///
/// Zero at the margin's outer edge, rising linearly to the capped
/// maximum at the inner edge. Out-of-range penetrations are clamped.
pub fn autoscroll_speed(penetration: f32) -> f32 {
    penetration.clamp(0.0, 1.0) * AUTOSCROLL_BASE_SPEED * AUTOSCROLL_MAX_MULTIPLIER
}

/// Which viewport edge autoscroll is currently driving toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoscrollDirection {
    /// Not scrolling.
    #[default]
    None,
    /// Scrolling toward smaller offsets (content moves down).
    Up,
    /// Scrolling toward larger offsets (content moves up).
    Down,
}

/// The drag-reorder state machine's phase.
#[derive(Debug)]
pub(crate) enum DragPhase {
    Idle,
    Dragging(Box<DragSession>),
}

/// State of the active drag.
#[derive(Debug)]
pub(crate) struct DragSession {
    /// Where the drag started; the item keeps this slot until commit.
    source: ItemLocator,
    /// The dragged item's size, captured at begin.
    size: Size,
    /// The drag visual's frame in content coordinates.
    visual: Rect,
    /// Clamp region for the visual's center, in viewport coordinates:
    /// the viewport inset by half the item size on each edge.
    bounds: Rect,
    /// Last reported pointer position, in viewport coordinates.
    pointer: Point,
    autoscroll: AutoscrollDirection,
    timer: IntervalTimer,
}

impl GridLayout {
    /// Begin dragging the item at `locator` from `pointer` (viewport
    /// coordinates). Returns `false` when the model does not support
    /// reordering or the locator has no backing item.
    pub fn begin_drag(&mut self, locator: ItemLocator, pointer: Point) -> bool {
        if !self.capabilities.supports_move || !matches!(self.drag, DragPhase::Idle) {
            return false;
        }
        self.prepare_layout();

        let Some(frame) = self
            .section_state(locator.section)
            .and_then(|section| section.items.get(locator.item))
            .map(|item| item.frame)
        else {
            return false;
        };

        if let Some(section) = self.section_state_mut(locator.section) {
            section.items[locator.item].dragging = true;
        }

        let size = frame.size;
        let viewport = self.viewport_size;
        let bounds = Rect::new(
            size.width / 2.0,
            size.height / 2.0,
            (viewport.width - size.width).max(0.0),
            (viewport.height - size.height).max(0.0),
        );

        self.drag = DragPhase::Dragging(Box::new(DragSession {
            source: locator,
            size,
            visual: frame,
            bounds,
            pointer,
            autoscroll: AutoscrollDirection::None,
            timer: IntervalTimer::new(AUTOSCROLL_INTERVAL),
        }));

        tracing::debug!(target: "trellis::drag", ?locator, "drag began");
        self.invalidate_metrics();
        self.prepare_layout();
        true
    }

    /// Handle a pointer move (viewport coordinates) during a drag.
    ///
    /// Repositions the drag visual within its bounds, retargets the
    /// phantom slot when the pointer center lands on a different item and
    /// the model permits the move, and updates the autoscroll direction.
    pub fn update_drag(&mut self, pointer: Point) {
        let DragPhase::Dragging(mut session) = std::mem::replace(&mut self.drag, DragPhase::Idle)
        else {
            return;
        };

        session.pointer = pointer;
        let center = clamp_point(pointer, session.bounds);
        let content_center = center.offset(self.content_offset.x, self.content_offset.y);
        session.visual = Rect::from_center(content_center, session.size);

        if let Some(candidate) = self.item_locator_at(content_center)
            && candidate != session.source
            && let SectionIndex::Section(target_section) = candidate.section
        {
            let mut target_index = candidate.item;
            let existing = self.sections[target_section].phantom;
            // The open slot shifts everything at or past it by one; the
            // hit-tested ordinal compensates.
            if let Some(phantom) = existing
                && target_index >= phantom.index
            {
                target_index += 1;
            }

            let retarget = !existing.is_some_and(|phantom| phantom.index == target_index);
            if retarget {
                let destination = ItemLocator::new(target_section, target_index);
                let permitted = self
                    .model_handle()
                    .is_some_and(|model| model.can_move_item(session.source, destination));
                if permitted {
                    let slot = PhantomSlot {
                        index: target_index.min(self.sections[target_section].items.len()),
                        size: session.size,
                    };
                    self.set_phantom_slot(target_section, Some(slot));
                    tracing::trace!(
                        target: "trellis::drag",
                        section = target_section,
                        index = slot.index,
                        "phantom slot moved"
                    );
                    self.invalidate_metrics();
                    self.prepare_layout();
                }
            }
        }

        let direction = if center.y < AUTOSCROLL_TRIGGER_MARGIN {
            AutoscrollDirection::Up
        } else if center.y > self.viewport_size.height - AUTOSCROLL_TRIGGER_MARGIN {
            AutoscrollDirection::Down
        } else {
            AutoscrollDirection::None
        };
        set_autoscroll(&mut session, direction, Instant::now());

        self.drag = DragPhase::Dragging(session);
    }

    /// Commit the drag. When the phantom slot names a position other than
    /// the source, the item physically moves, the model is notified, and
    /// the accepted `(from, to)` pair is returned.
    pub fn end_drag(&mut self) -> Option<(ItemLocator, ItemLocator)> {
        let DragPhase::Dragging(mut session) = std::mem::replace(&mut self.drag, DragPhase::Idle)
        else {
            return None;
        };
        session.timer.stop();

        let source = session.source;
        self.clear_dragging_flag(source);

        let target = self
            .sections
            .iter()
            .enumerate()
            .find_map(|(index, section)| section.phantom.map(|slot| (index, slot)));
        self.clear_phantom_slots();

        let mut committed = None;
        if let (Some((dest_section, slot)), SectionIndex::Section(src_section)) =
            (target, source.section)
            && source.item < self.sections[src_section].items.len()
            && !(dest_section == src_section && slot.index == source.item)
        {
            let item = self.sections[src_section].items.remove(source.item);
            let mut dest_index = slot.index;
            // Removing the source shifts everything after it up by one.
            if dest_section == src_section && dest_index > source.item {
                dest_index -= 1;
            }
            let dest_index = dest_index.min(self.sections[dest_section].items.len());
            self.sections[dest_section].items.insert(dest_index, item);

            let destination = ItemLocator::new(dest_section, dest_index);
            if let Some(model) = self.model_handle() {
                model.move_item(source, destination);
            }
            tracing::debug!(target: "trellis::drag", ?source, ?destination, "drag committed");
            committed = Some((source, destination));
        } else {
            tracing::debug!(target: "trellis::drag", ?source, "drag ended in place");
        }

        self.invalidate_metrics();
        self.prepare_layout();
        committed
    }

    /// Cancel the drag: the item stays at its source position and the
    /// model is not notified.
    pub fn cancel_drag(&mut self) {
        let DragPhase::Dragging(mut session) = std::mem::replace(&mut self.drag, DragPhase::Idle)
        else {
            return;
        };
        session.timer.stop();
        self.clear_dragging_flag(session.source);
        self.clear_phantom_slots();
        tracing::debug!(target: "trellis::drag", source = ?session.source, "drag cancelled");
        self.invalidate_metrics();
        self.prepare_layout();
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragPhase::Dragging(_))
    }

    /// The drag visual's frame in content coordinates, while dragging.
    pub fn drag_visual_frame(&self) -> Option<Rect> {
        match &self.drag {
            DragPhase::Dragging(session) => Some(session.visual),
            DragPhase::Idle => None,
        }
    }

    /// The autoscroll direction currently engaged.
    pub fn autoscroll_direction(&self) -> AutoscrollDirection {
        match &self.drag {
            DragPhase::Dragging(session) => session.autoscroll,
            DragPhase::Idle => AutoscrollDirection::None,
        }
    }

    /// Advance autoscroll. The host calls this at its display cadence;
    /// ticks are paced by the session's interval timer, so calling more
    /// often than the interval is harmless.
    ///
    /// Returns the new content offset when the content scrolled; the drag
    /// visual is translated by the same displacement so it keeps tracking
    /// the pointer.
    pub fn autoscroll_tick(&mut self, now: Instant) -> Option<Point> {
        let DragPhase::Dragging(mut session) = std::mem::replace(&mut self.drag, DragPhase::Idle)
        else {
            return None;
        };
        let scrolled = self.drive_autoscroll(&mut session, now);
        self.drag = DragPhase::Dragging(session);
        scrolled
    }

    fn drive_autoscroll(&mut self, session: &mut DragSession, now: Instant) -> Option<Point> {
        if session.autoscroll == AutoscrollDirection::None {
            return None;
        }
        let ticks = session.timer.poll(now);
        if ticks == 0 {
            return None;
        }

        let center = clamp_point(session.pointer, session.bounds);
        let depth = match session.autoscroll {
            AutoscrollDirection::Up => AUTOSCROLL_TRIGGER_MARGIN - center.y,
            AutoscrollDirection::Down => {
                center.y - (self.viewport_size.height - AUTOSCROLL_TRIGGER_MARGIN)
            }
            AutoscrollDirection::None => 0.0,
        };
        let penetration = depth / AUTOSCROLL_TRIGGER_MARGIN;

        let step = autoscroll_speed(penetration) * ticks as f32;
        let delta = match session.autoscroll {
            AutoscrollDirection::Up => -step,
            _ => step,
        };

        let max_offset = (self.measured_size.height - self.viewport_size.height).max(0.0);
        let target = (self.content_offset.y + delta).clamp(0.0, max_offset);
        let applied = target - self.content_offset.y;
        if applied == 0.0 {
            return None;
        }

        // The container scrolls underneath; the visual follows so it
        // appears glued to the pointer.
        session.visual = session.visual.offset(0.0, applied);
        let offset = Point::new(self.content_offset.x, target);
        self.set_content_offset(offset);
        Some(offset)
    }

    fn clear_dragging_flag(&mut self, locator: ItemLocator) {
        if let Some(section) = self.section_state_mut(locator.section)
            && let Some(item) = section.items.get_mut(locator.item)
        {
            item.dragging = false;
        }
    }
}

/// Update the autoscroll direction with timer lifecycle semantics:
/// unchanged direction is a no-op, `None` cancels the timer, and a new
/// direction replaces it.
fn set_autoscroll(session: &mut DragSession, direction: AutoscrollDirection, now: Instant) {
    if session.autoscroll == direction {
        return;
    }
    session.autoscroll = direction;
    match direction {
        AutoscrollDirection::None => session.timer.stop(),
        _ => {
            session.timer.start(now);
            tracing::trace!(target: "trellis::drag", ?direction, "autoscroll engaged");
        }
    }
}

fn clamp_point(point: Point, bounds: Rect) -> Point {
    Point::new(
        point.x.min(bounds.right()).max(bounds.left()),
        point.y.min(bounds.bottom()).max(bounds.top()),
    )
}
