//! Walkability filters that relabel spans after rasterization.
//!
//! All three filters only flip area types; span boundaries never move. Each
//! filter is idempotent, but they are not independent: running
//! [`filter_low_hanging_walkable_obstacles`](Heightfield::filter_low_hanging_walkable_obstacles)
//! after [`filter_ledge_spans`](Heightfield::filter_ledge_spans) can win back
//! spans the ledge filter culled, so pick an order deliberately.

use crate::{
    heightfield::Heightfield,
    math::{dir_offset_x, dir_offset_z},
    span::AreaType,
};

/// Stands in for an unobstructed ceiling when a span is the top of its
/// column.
const MAX_HEIGHT: i32 = u16::MAX as i32;

impl Heightfield {
    /// Relabels unwalkable spans as walkable where they sit on a walkable
    /// span like a step: the tops differ by less than `walkable_climb`.
    ///
    /// This fuses curbs and stair noses onto the surface below them. The
    /// relabeled span takes over the area of the span it fuses onto, and
    /// counts as walkable for the next span up, so a whole stair chain
    /// resolves in one pass.
    pub fn filter_low_hanging_walkable_obstacles(&mut self, walkable_climb: u16) {
        let walkable_climb = walkable_climb as i32;
        for cell in &mut self.cells {
            let mut previous_area = AreaType::NOT_WALKABLE;
            let mut previous_max = 0_i32;
            let mut previous_was_walkable = false;

            for span in cell.spans_mut() {
                if !span.area.is_walkable()
                    && previous_was_walkable
                    && (span.max as i32 - previous_max).abs() < walkable_climb
                {
                    span.area = previous_area;
                }
                previous_area = span.area;
                previous_max = span.max as i32;
                previous_was_walkable = span.area.is_walkable();
            }
        }
    }

    /// Culls walkable spans without enough headroom: when the gap between a
    /// span's ceiling and the next span's floor is `walkable_height` or
    /// less, the lower span becomes unwalkable.
    ///
    /// The top span of each column keeps its area; nothing obstructs it from
    /// above.
    pub fn filter_walkable_low_height_spans(&mut self, walkable_height: u16) {
        let walkable_height = walkable_height as i32;
        for cell in &mut self.cells {
            let spans = cell.spans_mut();
            for i in 1..spans.len() {
                let clearance = spans[i].min as i32 - spans[i - 1].max as i32;
                if clearance <= walkable_height {
                    spans[i - 1].area = AreaType::NOT_WALKABLE;
                }
            }
        }
    }

    /// Culls walkable spans that sit on a ledge.
    ///
    /// A span is a ledge when stepping to one of its four neighbour columns
    /// drops further than `walkable_climb`, or when the neighbour floors it
    /// can step onto span a vertical range wider than `walkable_climb`
    /// (a too-steep slope). Only gaps taller than `walkable_height` count as
    /// reachable neighbour floors. Columns at the edge of the field count as
    /// a drop, as do empty neighbour columns, via a virtual floor
    /// `walkable_climb` below the field bottom.
    pub fn filter_ledge_spans(&mut self, walkable_height: u16, walkable_climb: u16) {
        let walkable_height = walkable_height as i32;
        let walkable_climb = walkable_climb as i32;
        let width = self.width() as i32;
        let length = self.length() as i32;

        for z in 0..length {
            for x in 0..width {
                let cell_index = self.cell_index(x as u32, z as u32);
                for i in 0..self.cells[cell_index].spans().len() {
                    let span = self.cells[cell_index].spans()[i];
                    if !span.area.is_walkable() {
                        continue;
                    }

                    // The floor we stand on and the ceiling above it.
                    let bottom = span.max as i32;
                    let top = self.cells[cell_index]
                        .spans()
                        .get(i + 1)
                        .map(|next| next.min as i32)
                        .unwrap_or(MAX_HEIGHT);

                    // The deepest drop to any neighbour, and the range of
                    // neighbour floors we could step onto.
                    let mut min_neighbor_height = MAX_HEIGHT;
                    let mut accessible_min = bottom;
                    let mut accessible_max = bottom;

                    for direction in 0..4 {
                        let neighbor_x = x + dir_offset_x(direction);
                        let neighbor_z = z + dir_offset_z(direction);
                        if neighbor_x < 0
                            || neighbor_z < 0
                            || neighbor_x >= width
                            || neighbor_z >= length
                        {
                            min_neighbor_height =
                                min_neighbor_height.min(-walkable_climb - bottom);
                            continue;
                        }

                        let neighbor_index =
                            self.cell_index(neighbor_x as u32, neighbor_z as u32);
                        let neighbor_spans = self.cells[neighbor_index].spans();

                        // Virtual floor below the neighbour's first span,
                        // standing in for the ground at the field bottom.
                        let mut neighbor_bottom = -walkable_climb;
                        let mut neighbor_top = neighbor_spans
                            .first()
                            .map(|first| first.min as i32)
                            .unwrap_or(MAX_HEIGHT);
                        if top.min(neighbor_top) - bottom.max(neighbor_bottom) > walkable_height
                        {
                            min_neighbor_height =
                                min_neighbor_height.min(neighbor_bottom - bottom);
                            if (neighbor_bottom - bottom).abs() <= walkable_climb {
                                accessible_min = accessible_min.min(neighbor_bottom);
                                accessible_max = accessible_max.max(neighbor_bottom);
                            }
                        }

                        for j in 0..neighbor_spans.len() {
                            neighbor_bottom = neighbor_spans[j].max as i32;
                            neighbor_top = neighbor_spans
                                .get(j + 1)
                                .map(|next| next.min as i32)
                                .unwrap_or(MAX_HEIGHT);
                            // Only floors with enough clearance over the
                            // shared vertical range are reachable at all.
                            if top.min(neighbor_top) - bottom.max(neighbor_bottom)
                                > walkable_height
                            {
                                min_neighbor_height =
                                    min_neighbor_height.min(neighbor_bottom - bottom);
                                if (neighbor_bottom - bottom).abs() <= walkable_climb {
                                    accessible_min = accessible_min.min(neighbor_bottom);
                                    accessible_max = accessible_max.max(neighbor_bottom);
                                }
                            }
                        }
                    }

                    if min_neighbor_height < -walkable_climb {
                        // A drop too deep to climb back from.
                        self.cells[cell_index].spans_mut()[i].area = AreaType::NOT_WALKABLE;
                    } else if accessible_max - accessible_min > walkable_climb {
                        // The accessible floors around us form too steep a
                        // slope.
                        self.cells[cell_index].spans_mut()[i].area = AreaType::NOT_WALKABLE;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        heightfield::{Heightfield, HeightfieldBuilder},
        math::Aabb3d,
        span::Span,
    };
    use glam::Vec3A;

    fn field(width: u32, length: u32) -> Heightfield {
        HeightfieldBuilder {
            aabb: Aabb3d::new(
                Vec3A::ZERO,
                Vec3A::new(width as f32, 32.0, length as f32),
            ),
            cell_size: 1.0,
            cell_height: 1.0,
        }
        .build()
        .unwrap()
    }

    fn walkable(min: u16, max: u16) -> Span {
        Span::new(min, max, AreaType::DEFAULT_WALKABLE)
    }

    fn unwalkable(min: u16, max: u16) -> Span {
        Span::new(min, max, AreaType::NOT_WALKABLE)
    }

    fn areas(heightfield: &Heightfield, x: u32, z: u32) -> Vec<AreaType> {
        heightfield
            .cell_at(x, z)
            .unwrap()
            .spans()
            .iter()
            .map(|span| span.area)
            .collect()
    }

    #[test]
    fn low_hanging_obstacle_fuses_onto_the_span_below() {
        let mut heightfield = field(1, 1);
        heightfield.add_span(0, 0, walkable(0, 5)).unwrap();
        heightfield.add_span(0, 0, unwalkable(6, 7)).unwrap();

        heightfield.filter_low_hanging_walkable_obstacles(3);
        assert_eq!(
            areas(&heightfield, 0, 0),
            vec![AreaType::DEFAULT_WALKABLE, AreaType::DEFAULT_WALKABLE]
        );
    }

    #[test]
    fn low_hanging_obstacle_needs_a_walkable_base() {
        let mut heightfield = field(1, 1);
        heightfield.add_span(0, 0, unwalkable(0, 5)).unwrap();
        heightfield.add_span(0, 0, unwalkable(6, 7)).unwrap();

        heightfield.filter_low_hanging_walkable_obstacles(3);
        assert_eq!(
            areas(&heightfield, 0, 0),
            vec![AreaType::NOT_WALKABLE, AreaType::NOT_WALKABLE]
        );
    }

    #[test]
    fn low_hanging_obstacle_out_of_climbing_range_stays() {
        let mut heightfield = field(1, 1);
        heightfield.add_span(0, 0, walkable(0, 5)).unwrap();
        heightfield.add_span(0, 0, unwalkable(7, 8)).unwrap();

        heightfield.filter_low_hanging_walkable_obstacles(3);
        assert_eq!(
            areas(&heightfield, 0, 0),
            vec![AreaType::DEFAULT_WALKABLE, AreaType::NOT_WALKABLE]
        );
    }

    #[test]
    fn low_hanging_stair_chain_resolves_in_one_pass() {
        let mut heightfield = field(1, 1);
        heightfield.add_span(0, 0, walkable(0, 5)).unwrap();
        heightfield.add_span(0, 0, unwalkable(6, 7)).unwrap();
        heightfield.add_span(0, 0, unwalkable(8, 9)).unwrap();

        let mut once = heightfield.clone();
        once.filter_low_hanging_walkable_obstacles(3);
        assert_eq!(
            areas(&once, 0, 0),
            vec![
                AreaType::DEFAULT_WALKABLE,
                AreaType::DEFAULT_WALKABLE,
                AreaType::DEFAULT_WALKABLE
            ]
        );

        let mut twice = once.clone();
        twice.filter_low_hanging_walkable_obstacles(3);
        assert_eq!(once, twice);
    }

    #[test]
    fn low_height_span_is_culled() {
        let mut heightfield = field(1, 1);
        heightfield.add_span(0, 0, walkable(0, 2)).unwrap();
        heightfield.add_span(0, 0, walkable(3, 5)).unwrap();

        heightfield.filter_walkable_low_height_spans(1);
        assert_eq!(
            areas(&heightfield, 0, 0),
            vec![AreaType::NOT_WALKABLE, AreaType::DEFAULT_WALKABLE]
        );
    }

    #[test]
    fn tall_gap_keeps_both_spans_walkable() {
        let mut heightfield = field(1, 1);
        heightfield.add_span(0, 0, walkable(0, 2)).unwrap();
        heightfield.add_span(0, 0, walkable(10, 12)).unwrap();

        heightfield.filter_walkable_low_height_spans(1);
        assert_eq!(
            areas(&heightfield, 0, 0),
            vec![AreaType::DEFAULT_WALKABLE, AreaType::DEFAULT_WALKABLE]
        );
    }

    #[test]
    fn ledge_span_at_the_field_edge_is_culled() {
        let mut heightfield = field(2, 1);
        heightfield.add_span(0, 0, walkable(0, 4)).unwrap();

        heightfield.filter_ledge_spans(2, 1);
        assert_eq!(areas(&heightfield, 0, 0), vec![AreaType::NOT_WALKABLE]);
    }

    #[test]
    fn interior_plateau_survives_the_ledge_filter() {
        // A 3x3 field where every column carries the same span; the centre
        // column has no drop anywhere, the rim does.
        let mut heightfield = field(3, 3);
        for z in 0..3 {
            for x in 0..3 {
                heightfield.add_span(x, z, walkable(0, 4)).unwrap();
            }
        }

        heightfield.filter_ledge_spans(2, 1);
        assert_eq!(areas(&heightfield, 1, 1), vec![AreaType::DEFAULT_WALKABLE]);
        assert_eq!(areas(&heightfield, 0, 0), vec![AreaType::NOT_WALKABLE]);
        assert_eq!(areas(&heightfield, 2, 1), vec![AreaType::NOT_WALKABLE]);
    }

    #[test]
    fn climbable_step_is_not_a_ledge() {
        // The centre column sits one unit above its neighbours, within
        // climbing range.
        let mut heightfield = field(3, 3);
        for z in 0..3 {
            for x in 0..3 {
                let max = if (x, z) == (1, 1) { 5 } else { 4 };
                heightfield.add_span(x, z, walkable(0, max)).unwrap();
            }
        }

        heightfield.filter_ledge_spans(2, 1);
        assert_eq!(areas(&heightfield, 1, 1), vec![AreaType::DEFAULT_WALKABLE]);
    }

    #[test]
    fn steep_slope_across_neighbours_is_culled() {
        // The centre column's east and west floors are each within climbing
        // range, but together they span twice the climb: a slope too steep
        // to keep.
        let mut heightfield = field(3, 3);
        for z in 0..3 {
            for x in 0..3 {
                heightfield
                    .add_span(x, z, walkable(0, 2 + 2 * x as u16))
                    .unwrap();
            }
        }

        heightfield.filter_ledge_spans(2, 2);
        assert_eq!(areas(&heightfield, 1, 1), vec![AreaType::NOT_WALKABLE]);
    }

    #[test]
    fn ledge_filter_is_idempotent() {
        let mut heightfield = field(3, 3);
        for z in 0..3 {
            for x in 0..3 {
                heightfield
                    .add_span(x, z, walkable(0, 1 + x as u16 + z as u16))
                    .unwrap();
            }
        }

        let mut once = heightfield.clone();
        once.filter_ledge_spans(2, 1);
        let mut twice = once.clone();
        twice.filter_ledge_spans(2, 1);
        assert_eq!(once, twice);
    }
}
