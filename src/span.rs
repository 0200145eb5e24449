/// A solid vertical interval `[min, max)` within one heightfield column,
/// measured in cell-height units from the bottom of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Height of the floor, inclusive.
    pub min: u16,
    /// Height of the ceiling, exclusive. Always greater than `min`.
    pub max: u16,
    /// Area classification of the surface at the top of the span.
    pub area: AreaType,
}

impl Span {
    /// Creates a new span.
    #[inline]
    pub fn new(min: u16, max: u16, area: AreaType) -> Self {
        Self { min, max, area }
    }
}

/// Area type ID carried by a [`Span`].
///
/// The numeric value doubles as the merge priority: when overlapping spans
/// with different area types merge, higher values win. [`AreaType::NOT_WALKABLE`]
/// is zero and so always loses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaType(pub u8);

impl AreaType {
    /// The area type 0. Spans with this area type are not walkable.
    pub const NOT_WALKABLE: Self = Self(0);
    /// Default area type for walkable surfaces. The highest possible priority.
    pub const DEFAULT_WALKABLE: Self = Self(u8::MAX);

    /// Whether this area type marks a surface an agent may stand on.
    #[inline]
    pub fn is_walkable(self) -> bool {
        self != Self::NOT_WALKABLE
    }
}
