//! The heightfield module contains the types and functions for working with
//! [`Heightfield`]s.
//!
//! A heightfield is a grid of columns on the xz-plane, where each column
//! holds the sorted solid y-intervals that intersect it.

use glam::Vec3A;
use thiserror::Error;

use crate::{cell::Cell, math::Aabb3d, span::Span};

/// A solid heightfield: a dense grid of [`Cell`] columns, each listing the
/// solid [`Span`]s that intersect it.
///
/// Build with [`HeightfieldBuilder`]. Populate with
/// [`rasterize_triangle`](Self::rasterize_triangle) or the batch entry
/// points, then run the walkability filters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Heightfield {
    /// The width of the heightfield along the x-axis in cell units
    width: u32,
    /// The height of the heightfield along the y-axis in cell units
    height: u32,
    /// The length of the heightfield along the z-axis in cell units
    length: u32,
    /// The AABB of the heightfield, with `max` snapped up to whole cells
    aabb: Aabb3d,
    /// The size of each cell on the xz-plane
    cell_size: f32,
    /// The size of each cell along the y-axis
    cell_height: f32,
    /// The columns of the heightfield in `length * width` order
    pub(crate) cells: Vec<Cell>,
}

impl Heightfield {
    /// The width of the heightfield along the x-axis in cell units.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the heightfield along the y-axis in cell units.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The length of the heightfield along the z-axis in cell units.
    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// The AABB of the heightfield. Its `max` corner is snapped up from the
    /// input bounds so that the grid covers whole cells.
    #[inline]
    pub fn aabb(&self) -> Aabb3d {
        self.aabb
    }

    /// The size of each cell on the xz-plane.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The size of each cell along the y-axis.
    #[inline]
    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// The number of walkable spans across all columns.
    pub fn span_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|cell| cell.spans())
            .filter(|span| span.area.is_walkable())
            .count()
    }

    /// The column at `(x, z)`, or `None` when the coordinates are out of
    /// bounds.
    #[inline]
    pub fn cell_at(&self, x: u32, z: u32) -> Option<&Cell> {
        (x < self.width && z < self.length).then(|| &self.cells[self.cell_index(x, z)])
    }

    /// Iterates all columns in row-major order, z outermost, together with
    /// their grid coordinates.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> + '_ {
        self.cells.iter().enumerate().map(|(i, cell)| {
            let x = i as u32 % self.width;
            let z = i as u32 / self.width;
            ((x, z), cell)
        })
    }

    /// Inserts a span into the column at `(x, z)`, merging it with any
    /// overlapping or touching spans per the rules on [`Cell`].
    pub fn add_span(&mut self, x: u32, z: u32, span: Span) -> Result<(), SpanInsertionError> {
        if x >= self.width || z >= self.length {
            return Err(SpanInsertionError::ColumnOutOfBounds { x, z });
        }
        if span.min >= span.max || span.max as u32 > self.height {
            return Err(SpanInsertionError::SpanOutOfRange {
                min: span.min,
                max: span.max,
                height: self.height,
            });
        }
        let index = self.cell_index(x, z);
        self.cells[index].add_span(span);
        Ok(())
    }

    #[inline]
    pub(crate) fn cell_index(&self, x: u32, z: u32) -> usize {
        z as usize * self.width as usize + x as usize
    }
}

/// A builder for [`Heightfield`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightfieldBuilder {
    /// The world-space bounds the grid has to cover
    pub aabb: Aabb3d,
    /// The size of each cell on the xz-plane
    pub cell_size: f32,
    /// The size of each cell along the y-axis
    pub cell_height: f32,
}

impl HeightfieldBuilder {
    /// Builds the heightfield with all columns empty.
    ///
    /// Grid dimensions are the input extents divided by the cell sizes,
    /// rounded up and at least 1; the AABB's `max` corner is then snapped up
    /// so the grid covers whole cells.
    pub fn build(self) -> Result<Heightfield, HeightfieldBuilderError> {
        let Aabb3d { min, max } = self.aabb;
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(HeightfieldBuilderError::InvertedBounds { min, max });
        }
        if !(self.cell_size > 0.0) {
            return Err(HeightfieldBuilderError::InvalidCellSize {
                cell_size: self.cell_size,
            });
        }
        if !(self.cell_height > 0.0) {
            return Err(HeightfieldBuilderError::InvalidCellHeight {
                cell_height: self.cell_height,
            });
        }

        let width = (((max.x - min.x) / self.cell_size).ceil() as u32).max(1);
        let height = (((max.y - min.y) / self.cell_height).ceil() as u32).max(1);
        let length = (((max.z - min.z) / self.cell_size).ceil() as u32).max(1);

        let cell_count = width as u128 * length as u128;
        if cell_count > usize::MAX as u128 {
            return Err(HeightfieldBuilderError::GridTooLarge { width, length });
        }

        let max = min
            + Vec3A::new(
                width as f32 * self.cell_size,
                height as f32 * self.cell_height,
                length as f32 * self.cell_size,
            );

        Ok(Heightfield {
            width,
            height,
            length,
            aabb: Aabb3d { min, max },
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            cells: vec![Cell::default(); cell_count as usize],
        })
    }
}

/// Errors that can occur when building a [`Heightfield`] with
/// [`HeightfieldBuilder::build`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeightfieldBuilderError {
    /// Happens when a component of the minimum bound exceeds the maximum.
    #[error("heightfield bounds are inverted: min {min} exceeds max {max}")]
    InvertedBounds {
        /// The minimum corner of the offending AABB
        min: Vec3A,
        /// The maximum corner of the offending AABB
        max: Vec3A,
    },
    /// Happens when the xz-plane cell size is zero, negative, or NaN.
    #[error("cell size must be positive, got {cell_size}")]
    InvalidCellSize {
        /// The offending cell size
        cell_size: f32,
    },
    /// Happens when the y-axis cell size is zero, negative, or NaN.
    #[error("cell height must be positive, got {cell_height}")]
    InvalidCellHeight {
        /// The offending cell height
        cell_height: f32,
    },
    /// Happens when the column count overflows the address space.
    #[error("grid of {width}x{length} columns is too large")]
    GridTooLarge {
        /// The width of the heightfield along the x-axis in cell units
        width: u32,
        /// The length of the heightfield along the z-axis in cell units
        length: u32,
    },
}

/// Errors that can occur when inserting a span into a [`Heightfield`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanInsertionError {
    /// Happens when the column coordinates are out of bounds.
    #[error("column ({x}, {z}) is out of bounds")]
    ColumnOutOfBounds {
        /// The x-coordinate of the column
        x: u32,
        /// The z-coordinate of the column
        z: u32,
    },
    /// Happens when the span is empty or pokes out of the top of the field.
    #[error("span [{min}, {max}) does not fit a field of height {height}")]
    SpanOutOfRange {
        /// The floor of the offending span
        min: u16,
        /// The ceiling of the offending span
        max: u16,
        /// The height of the field in cell units
        height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::AreaType;

    fn builder() -> HeightfieldBuilder {
        HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3A::ZERO, Vec3A::new(10.0, 4.0, 5.0)),
            cell_size: 1.0,
            cell_height: 0.5,
        }
    }

    #[test]
    fn dimensions_round_up_and_bounds_snap() {
        let heightfield = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3A::ZERO, Vec3A::new(2.5, 1.1, 0.2)),
            cell_size: 1.0,
            cell_height: 0.5,
        }
        .build()
        .unwrap();
        assert_eq!(heightfield.width(), 3);
        assert_eq!(heightfield.height(), 3);
        assert_eq!(heightfield.length(), 1);
        assert_eq!(heightfield.aabb().max, Vec3A::new(3.0, 1.5, 1.0));
    }

    #[test]
    fn degenerate_bounds_still_yield_one_cell() {
        let heightfield = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3A::ZERO, Vec3A::ZERO),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap();
        assert_eq!(heightfield.width(), 1);
        assert_eq!(heightfield.height(), 1);
        assert_eq!(heightfield.length(), 1);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let result = HeightfieldBuilder {
            aabb: Aabb3d::new(Vec3A::ONE, Vec3A::ZERO),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build();
        assert!(matches!(
            result,
            Err(HeightfieldBuilderError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn non_positive_cell_sizes_are_rejected() {
        let mut invalid = builder();
        invalid.cell_size = 0.0;
        assert!(matches!(
            invalid.build(),
            Err(HeightfieldBuilderError::InvalidCellSize { .. })
        ));

        let mut invalid = builder();
        invalid.cell_height = -1.0;
        assert!(matches!(
            invalid.build(),
            Err(HeightfieldBuilderError::InvalidCellHeight { .. })
        ));
    }

    #[test]
    fn add_span_rejects_out_of_bounds_columns() {
        let mut heightfield = builder().build().unwrap();
        let span = Span::new(0, 1, AreaType::DEFAULT_WALKABLE);
        assert_eq!(
            heightfield.add_span(10, 0, span),
            Err(SpanInsertionError::ColumnOutOfBounds { x: 10, z: 0 })
        );
        assert_eq!(
            heightfield.add_span(0, 5, span),
            Err(SpanInsertionError::ColumnOutOfBounds { x: 0, z: 5 })
        );
        assert!(heightfield.add_span(9, 4, span).is_ok());
    }

    #[test]
    fn add_span_rejects_malformed_spans() {
        let mut heightfield = builder().build().unwrap();
        let empty = Span::new(3, 3, AreaType::DEFAULT_WALKABLE);
        assert!(matches!(
            heightfield.add_span(0, 0, empty),
            Err(SpanInsertionError::SpanOutOfRange { .. })
        ));
        let too_tall = Span::new(0, 9, AreaType::DEFAULT_WALKABLE);
        assert!(matches!(
            heightfield.add_span(0, 0, too_tall),
            Err(SpanInsertionError::SpanOutOfRange { .. })
        ));
    }

    #[test]
    fn span_count_ignores_unwalkable_spans() {
        let mut heightfield = builder().build().unwrap();
        heightfield
            .add_span(0, 0, Span::new(0, 1, AreaType::DEFAULT_WALKABLE))
            .unwrap();
        heightfield
            .add_span(1, 0, Span::new(0, 1, AreaType::NOT_WALKABLE))
            .unwrap();
        heightfield
            .add_span(2, 3, Span::new(2, 4, AreaType(7)))
            .unwrap();
        assert_eq!(heightfield.span_count(), 2);
    }

    #[test]
    fn cells_iterate_row_major_z_outermost() {
        let heightfield = builder().build().unwrap();
        let coords: Vec<_> = heightfield.cells().map(|(coords, _)| coords).collect();
        assert_eq!(coords.len(), 50);
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[1], (1, 0));
        assert_eq!(coords[10], (0, 1));
        assert_eq!(coords[49], (9, 4));
    }
}
