use crate::span::Span;

/// One `(x, z)` column of the heightfield: its solid spans from bottom to top.
///
/// The span list is always sorted by `min` and pairwise disjoint; insertion
/// merges overlapping or touching spans, so no two stored spans share a
/// boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    spans: Vec<Span>,
}

impl Cell {
    /// The spans of the column, sorted by `min` ascending.
    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether the column contains no solid spans.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Filters may relabel areas in place but never move span boundaries.
    #[inline]
    pub(crate) fn spans_mut(&mut self) -> &mut [Span] {
        &mut self.spans
    }

    /// Inserts a span, merging it with every existing span it overlaps or
    /// touches.
    ///
    /// When two spans merge, the area of the one that forms the top of the
    /// union wins; on an exact tie the higher-priority area wins, and the
    /// inserted span wins over an equal-priority existing one.
    pub(crate) fn add_span(&mut self, span: Span) {
        // Spans are disjoint and sorted, so `max` is ascending too.
        // First contact from below: the first span whose ceiling reaches the
        // new span's floor.
        let start = self.spans.partition_point(|existing| existing.max < span.min);
        if start == self.spans.len() || self.spans[start].min > span.max {
            self.spans.insert(start, span);
            return;
        }

        // Absorb the run of overlapping or touching spans left to right.
        let mut merged = span;
        let mut end = start;
        while end < self.spans.len() && self.spans[end].min <= merged.max {
            let existing = self.spans[end];
            if !(merged.max >= existing.max && merged.area >= existing.area) {
                merged.area = existing.area;
            }
            merged.min = merged.min.min(existing.min);
            merged.max = merged.max.max(existing.max);
            end += 1;
        }
        self.spans[start] = merged;
        self.spans.drain(start + 1..end);
    }
}
