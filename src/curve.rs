//! Space-filling curve addressing for the atlas.
//!
//! Maps a placement distance to a grid cell on a Hilbert-style curve. The
//! mapping has no fixed order: it peels two bits per step until the distance
//! is exhausted, so the same function addresses a 1×1 grid, a 2×2 grid, and
//! every larger power-of-two grid. Distances below `4^k` always land inside
//! the `2^k × 2^k` square, which is what lets the atlas grow without moving
//! anything already placed.

/// Map distance `d` along the curve to `(x, y)` grid coordinates.
pub fn distance_to_coord(d: u64) -> (u64, u64) {
    let mut d = d;
    let (mut x, mut y) = (0u64, 0u64);
    let mut scale = 1u64;
    let mut odd_steps = false;

    while d > 0 {
        let ry = (d >> 1) & 1;
        let rx = ry ^ (d & 1);

        if rx == 0 {
            if ry == 1 {
                x = scale - 1 - x;
                y = scale - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }

        x += scale * rx;
        y += scale * ry;

        scale <<= 1;
        d >>= 2;
        odd_steps = !odd_steps;
    }

    if odd_steps {
        (x, y)
    } else {
        (y, x)
    }
}

/// Smallest power-of-two grid side whose area exceeds `d`.
pub fn side_for_distance(d: u64) -> u64 {
    let mut side = 1u64;
    while side * side <= d {
        side <<= 1;
    }
    side
}
