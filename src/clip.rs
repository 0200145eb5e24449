//! Convex polygon clipping against the axis-aligned cell planes.

use glam::Vec3A;

/// The most vertices a triangle can accumulate while being clipped against
/// the four planes of a cell footprint.
pub(crate) const MAX_CLIP_VERTS: usize = 7;

/// Clips the convex polygon `input` against the half-plane
/// `ax * x + az * z + d >= 0`, writing the result to `out` and returning the
/// new vertex count.
///
/// Only the x- and z-coordinates decide which side a vertex is on; y is
/// linearly interpolated on crossing edges. A vertex exactly on the plane
/// counts as inside.
pub(crate) fn clip_poly(
    input: &[Vec3A],
    out: &mut [Vec3A; MAX_CLIP_VERTS],
    ax: f32,
    az: f32,
    d: f32,
) -> usize {
    debug_assert!(input.len() < MAX_CLIP_VERTS);

    let mut dist = [0.0_f32; MAX_CLIP_VERTS];
    for (i, vert) in input.iter().enumerate() {
        dist[i] = ax * vert.x + az * vert.z + d;
    }

    let mut count = 0;
    for i in 0..input.len() {
        let j = (i + 1) % input.len();
        if dist[i] >= 0.0 {
            out[count] = input[i];
            count += 1;
        }
        if (dist[i] > 0.0 && dist[j] < 0.0) || (dist[i] < 0.0 && dist[j] > 0.0) {
            // Keep this operand order; it stays sign-stable when one
            // distance is zero.
            let t = dist[i] / (dist[i] - dist[j]);
            out[count] = input[i] + (input[j] - input[i]) * t;
            count += 1;
        }
    }
    count
}
