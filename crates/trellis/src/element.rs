//! Element addressing for layout attributes.
//!
//! Every element the engine places — cells, headers, footers, separators,
//! backgrounds — is addressed by a small Copy value key with structural
//! equality. [`ItemLocator`] names a position; [`ElementKey`] adds the
//! element kind discriminator and is the key type of the attribute store.
//!
//! # Index Validity
//!
//! Locators are positional and should be used immediately: after content
//! modifications (insertions, deletions, moves) a previously obtained
//! locator may name a different element or none at all. Lookups with a
//! stale locator resolve to `None`, never an error.

use serde::{Deserialize, Serialize};

/// Identifies a section, including the distinguished global pseudo-section.
///
/// The global section precedes all real sections, has no items of its own,
/// and hosts application-wide supplements (for example a persistent pinned
/// header). `Global` orders before every real section.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SectionIndex {
    /// The global pseudo-section.
    Global,
    /// A real section at the given index.
    Section(usize),
}

impl SectionIndex {
    /// Returns the real section index, or `None` for the global section.
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Global => None,
            Self::Section(index) => Some(index),
        }
    }

    /// Returns `true` for the global pseudo-section.
    #[inline]
    pub fn is_global(self) -> bool {
        matches!(self, Self::Global)
    }
}

impl From<usize> for SectionIndex {
    fn from(index: usize) -> Self {
        Self::Section(index)
    }
}

/// Addresses an element position: a section plus an item ordinal.
///
/// For supplements and decorations the `item` field is the ordinal within
/// that element kind (first header, second header, ...), not an item index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ItemLocator {
    /// The enclosing section.
    pub section: SectionIndex,
    /// The item ordinal within the section.
    pub item: usize,
}

impl ItemLocator {
    /// Create a locator for an item in a real section.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self {
            section: SectionIndex::Section(section),
            item,
        }
    }

    /// Create a locator within the global pseudo-section.
    #[inline]
    pub const fn global(item: usize) -> Self {
        Self {
            section: SectionIndex::Global,
            item,
        }
    }

    /// Create a locator from a [`SectionIndex`].
    #[inline]
    pub const fn in_section(section: SectionIndex, item: usize) -> Self {
        Self { section, item }
    }
}

/// Discriminates the kinds of elements the engine places.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ElementKind {
    /// An ordinary content cell.
    Cell,
    /// A header supplement.
    Header,
    /// A footer supplement.
    Footer,
    /// The placeholder shown instead of a section's items.
    Placeholder,
    /// A horizontal hairline between (or around) item rows.
    RowSeparator,
    /// A vertical hairline between columns.
    ColumnSeparator,
    /// The hairline below a section's headers.
    HeaderSeparator,
    /// The hairline above a section's footers.
    FooterSeparator,
    /// The backdrop behind a whole section.
    SectionBackground,
}

impl ElementKind {
    /// Returns `true` for the decoration kinds the engine synthesizes
    /// itself (separators and backgrounds), as opposed to content the
    /// model supplies.
    #[inline]
    pub fn is_decoration(self) -> bool {
        matches!(
            self,
            Self::RowSeparator
                | Self::ColumnSeparator
                | Self::HeaderSeparator
                | Self::FooterSeparator
                | Self::SectionBackground
        )
    }

    /// Returns `true` for header and footer supplements.
    #[inline]
    pub fn is_supplement(self) -> bool {
        matches!(self, Self::Header | Self::Footer)
    }
}

/// The attribute-store key: a locator plus an element kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ElementKey {
    /// Where the element lives.
    pub locator: ItemLocator,
    /// What the element is.
    pub kind: ElementKind,
}

impl ElementKey {
    /// Create a key.
    #[inline]
    pub const fn new(locator: ItemLocator, kind: ElementKind) -> Self {
        Self { locator, kind }
    }

    /// The key for an ordinary cell.
    #[inline]
    pub const fn cell(locator: ItemLocator) -> Self {
        Self::new(locator, ElementKind::Cell)
    }

    /// The key for a header supplement.
    #[inline]
    pub const fn header(section: SectionIndex, ordinal: usize) -> Self {
        Self::new(ItemLocator::in_section(section, ordinal), ElementKind::Header)
    }

    /// The key for a footer supplement.
    #[inline]
    pub const fn footer(section: SectionIndex, ordinal: usize) -> Self {
        Self::new(ItemLocator::in_section(section, ordinal), ElementKind::Footer)
    }
}
