//! Declarative per-section layout metrics.
//!
//! Metrics describe *what a section looks like* — column count, row
//! height policy, separators, insets, and supplement descriptors — without
//! reference to any particular content. The model supplies a
//! [`MetricsSnapshot`] per rebuild; the engine treats it as immutable for
//! the lifetime of that build.
//!
//! All types here are serde-derived so hosts can load section styling
//! from configuration.
//!
//! # Example
//!
//! ```
//! use trellis::metrics::{RowHeight, SectionMetrics, SupplementMetrics};
//!
//! let metrics = SectionMetrics::new()
//!     .with_columns(3)
//!     .with_row_height(RowHeight::Fixed(44.0))
//!     .with_supplement(SupplementMetrics::header().with_height(50.0).with_pinnable(true));
//! assert_eq!(metrics.columns, 3);
//! ```

use serde::{Deserialize, Serialize};
use trellis_core::{Color, EdgeInsets};

/// The row height used when the model supplies no metrics.
pub const DEFAULT_ROW_HEIGHT: f32 = 44.0;

/// How a section determines the height of its item rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RowHeight {
    /// Every row has this height, regardless of item content.
    Fixed(f32),
    /// Row height is the maximum measured item height across the row.
    Measured,
}

impl Default for RowHeight {
    fn default() -> Self {
        Self::Fixed(DEFAULT_ROW_HEIGHT)
    }
}

/// Which hairline separators a section draws.
///
/// These flags indicate which boundaries receive a separator record.
/// Separators are pure decorations: they never affect the layout offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SeparatorOptions(u8);

impl SeparatorOptions {
    /// No separators.
    pub const NONE: Self = Self(0);
    /// A hairline between consecutive item rows.
    pub const ROWS: Self = Self(1 << 0);
    /// A hairline between columns within a row.
    pub const COLUMNS: Self = Self(1 << 1);
    /// A hairline above the first row.
    pub const BEFORE_SECTION: Self = Self(1 << 2);
    /// A hairline below the last row.
    pub const AFTER_SECTION: Self = Self(1 << 3);
    /// A hairline below the last row of the final section.
    pub const AFTER_LAST_SECTION: Self = Self(1 << 4);
    /// Hairlines below headers and above footers.
    pub const SUPPLEMENTS: Self = Self(1 << 5);
    /// Every separator.
    pub const ALL: Self = Self(
        Self::ROWS.0
            | Self::COLUMNS.0
            | Self::BEFORE_SECTION.0
            | Self::AFTER_SECTION.0
            | Self::AFTER_LAST_SECTION.0
            | Self::SUPPLEMENTS.0,
    );

    /// Returns true if this set contains all flags in `other`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// The union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for SeparatorOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Separator flags together with their visual style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparatorStyle {
    /// Which boundaries draw a separator.
    pub options: SeparatorOptions,
    /// Separator color.
    pub color: Color,
    /// Leading/trailing insets applied to horizontal separators.
    pub insets: EdgeInsets,
}

impl Default for SeparatorStyle {
    fn default() -> Self {
        Self {
            options: SeparatorOptions::NONE,
            color: Color::from_rgb8(200, 199, 204),
            insets: EdgeInsets::ZERO,
        }
    }
}

impl SeparatorStyle {
    /// Style with the given flags and default color.
    pub fn new(options: SeparatorOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Set the separator color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the horizontal separator insets.
    pub fn with_insets(mut self, insets: EdgeInsets) -> Self {
        self.insets = insets;
        self
    }
}

/// Whether a supplement is a header or a footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SupplementKind {
    /// Laid out above the section's items.
    #[default]
    Header,
    /// Laid out below the section's items.
    Footer,
}

/// Describes one header or footer supplement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupplementMetrics {
    /// Header or footer.
    pub kind: SupplementKind,
    /// Fixed height. `None` asks the model to measure.
    pub height: Option<f32>,
    /// Padding applied inside the supplement's frame.
    pub padding: EdgeInsets,
    /// Whether the supplement may pin to the viewport edge while its
    /// section is in view.
    pub pinnable: bool,
    /// Whether the supplement stays visible while the section shows its
    /// placeholder instead of items.
    pub visible_while_placeholder: bool,
    /// Whether the supplement is hidden outright.
    pub hidden: bool,
    /// Background color.
    pub background: Option<Color>,
    /// Background color while selected/highlighted.
    pub selected_background: Option<Color>,
}

impl SupplementMetrics {
    /// A header supplement with measured height.
    pub fn header() -> Self {
        Self {
            kind: SupplementKind::Header,
            ..Default::default()
        }
    }

    /// A footer supplement with measured height.
    pub fn footer() -> Self {
        Self {
            kind: SupplementKind::Footer,
            ..Default::default()
        }
    }

    /// Set a fixed height.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set the inner padding.
    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    /// Set pin eligibility.
    pub fn with_pinnable(mut self, pinnable: bool) -> Self {
        self.pinnable = pinnable;
        self
    }

    /// Set visibility during placeholder display.
    pub fn with_visible_while_placeholder(mut self, visible: bool) -> Self {
        self.visible_while_placeholder = visible;
        self
    }

    /// Set the hidden flag.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}

/// Declarative configuration for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMetrics {
    /// Number of item columns. Values below 1 are treated as 1.
    pub columns: usize,
    /// Row height policy.
    pub row_height: RowHeight,
    /// Separator flags and style.
    pub separators: SeparatorStyle,
    /// Insets around the item area (headers and footers span full width).
    pub insets: EdgeInsets,
    /// Ordered supplement descriptors.
    pub supplements: Vec<SupplementMetrics>,
    /// Show a placeholder instead of items. When both a placeholder and
    /// items are declared, the placeholder wins.
    pub has_placeholder: bool,
    /// Backdrop color for the section's aggregate frame.
    pub background: Option<Color>,
}

impl Default for SectionMetrics {
    fn default() -> Self {
        Self {
            columns: 1,
            row_height: RowHeight::default(),
            separators: SeparatorStyle::default(),
            insets: EdgeInsets::ZERO,
            supplements: Vec::new(),
            has_placeholder: false,
            background: None,
        }
    }
}

impl SectionMetrics {
    /// Metrics with all defaults: one column, default fixed row height,
    /// no separators, no supplements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column count (clamped to at least 1 at use sites).
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Set the row height policy.
    pub fn with_row_height(mut self, row_height: RowHeight) -> Self {
        self.row_height = row_height;
        self
    }

    /// Set the separator style.
    pub fn with_separators(mut self, separators: SeparatorStyle) -> Self {
        self.separators = separators;
        self
    }

    /// Set the item-area insets.
    pub fn with_insets(mut self, insets: EdgeInsets) -> Self {
        self.insets = insets;
        self
    }

    /// Append a supplement descriptor.
    pub fn with_supplement(mut self, supplement: SupplementMetrics) -> Self {
        self.supplements.push(supplement);
        self
    }

    /// Set the placeholder flag.
    pub fn with_placeholder(mut self, placeholder: bool) -> Self {
        self.has_placeholder = placeholder;
        self
    }

    /// Set the section background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// The effective column count (never below 1).
    #[inline]
    pub fn effective_columns(&self) -> usize {
        self.columns.max(1)
    }
}

/// The metrics the model supplies for one rebuild.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Metrics for the global pseudo-section, if any.
    pub global: Option<SectionMetrics>,
    /// Metrics per real section, in section order. Missing entries fall
    /// back to [`SectionMetrics::default`].
    pub sections: Vec<SectionMetrics>,
}

impl MetricsSnapshot {
    /// An empty snapshot (every section falls back to defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global-section metrics.
    pub fn with_global(mut self, metrics: SectionMetrics) -> Self {
        self.global = Some(metrics);
        self
    }

    /// Append metrics for the next real section.
    pub fn with_section(mut self, metrics: SectionMetrics) -> Self {
        self.sections.push(metrics);
        self
    }

    /// Metrics for a real section index, cloned, with defaults for
    /// missing entries.
    pub fn section(&self, index: usize) -> SectionMetrics {
        self.sections.get(index).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_flags() {
        let style = SeparatorOptions::ROWS | SeparatorOptions::SUPPLEMENTS;
        assert!(style.contains(SeparatorOptions::ROWS));
        assert!(style.contains(SeparatorOptions::SUPPLEMENTS));
        assert!(!style.contains(SeparatorOptions::COLUMNS));
        assert!(SeparatorOptions::ALL.contains(style));
        assert!(!SeparatorOptions::NONE.contains(SeparatorOptions::ROWS));
    }

    #[test]
    fn test_effective_columns_clamps() {
        assert_eq!(SectionMetrics::new().with_columns(0).effective_columns(), 1);
        assert_eq!(SectionMetrics::new().with_columns(3).effective_columns(), 3);
    }

    #[test]
    fn test_default_row_height() {
        assert_eq!(RowHeight::default(), RowHeight::Fixed(DEFAULT_ROW_HEIGHT));
    }

    #[test]
    fn test_builder_chain() {
        let metrics = SectionMetrics::new()
            .with_columns(2)
            .with_row_height(RowHeight::Measured)
            .with_separators(SeparatorStyle::new(SeparatorOptions::ROWS))
            .with_supplement(SupplementMetrics::header().with_height(50.0))
            .with_supplement(SupplementMetrics::footer());

        assert_eq!(metrics.supplements.len(), 2);
        assert_eq!(metrics.supplements[0].height, Some(50.0));
        assert_eq!(metrics.supplements[1].kind, SupplementKind::Footer);
        assert_eq!(metrics.row_height, RowHeight::Measured);
    }

    #[test]
    fn test_snapshot_fallback() {
        let snapshot = MetricsSnapshot::new().with_section(SectionMetrics::new().with_columns(4));
        assert_eq!(snapshot.section(0).columns, 4);
        // Out-of-range sections fall back to defaults.
        assert_eq!(snapshot.section(7), SectionMetrics::default());
    }
}
