//! Core value types for the Trellis layout engine.
//!
//! This crate provides the foundational pieces the engine crate builds on:
//!
//! - **Geometry**: points, sizes, rectangles, edge insets, and colors,
//!   plus pixel-grid rounding so hairlines land on device pixels
//! - **Timing**: a polled repeating timer with an explicit start/stop
//!   lifecycle, used to drive edge autoscroll during drag-reorder
//!
//! Everything here is a plain value type with no interior mutability: the
//! engine is single-threaded by contract, and all shared state lives in
//! the engine crate under a single owner.

pub mod geometry;
pub mod timer;

pub use geometry::{Color, EdgeInsets, Point, Rect, Size, hairline, snap};
pub use timer::{IntervalTimer, TimerError, TimerResult};
