use rand::{Rng, RngExt};

// Draws allowed per item before the spacing constraint is given up on.
// Overlap after that is accepted; the round never blocks on placement.
pub const PLACEMENT_ATTEMPTS: u32 = 200;

/// Pairwise center distance must exceed `size * overlap_factor`.
pub const DEFAULT_OVERLAP_FACTOR: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub size: f64,
    pub padding: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline(always)]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

// Sampling interval for one axis. Degenerate areas (dimension smaller than
// footprint plus both pads) collapse to the low edge instead of panicking.
#[inline(always)]
fn axis_range(dimension: f64, footprint: Footprint) -> (f64, f64) {
    let low = footprint.padding;
    let high = dimension - footprint.size - footprint.padding;
    if high > low { (low, high) } else { (low, low) }
}

#[inline(always)]
fn sample<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low { rng.random_range(low..high) } else { low }
}

/// Places `count` item positions inside `area` by bounded rejection
/// sampling: each item gets up to [`PLACEMENT_ATTEMPTS`] uniform draws, and
/// the first draw clearing the minimum spacing against everything already
/// placed wins. When the attempt cap runs out the last draw stands, overlap
/// and all. Always returns exactly `count` positions.
pub fn place_items<R: Rng>(
    rng: &mut R,
    area: PlayArea,
    footprint: Footprint,
    overlap_factor: f64,
    count: usize,
) -> Vec<Position> {
    let min_spacing = footprint.size * overlap_factor;
    let (x_low, x_high) = axis_range(area.width, footprint);
    let (y_low, y_high) = axis_range(area.height, footprint);

    let mut positions: Vec<Position> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut candidate = Position { x: x_low, y: y_low };
        for _ in 0..PLACEMENT_ATTEMPTS {
            candidate = Position {
                x: sample(rng, x_low, x_high),
                y: sample(rng, y_low, y_high),
            };
            if positions
                .iter()
                .all(|p| p.distance_to(candidate) > min_spacing)
            {
                break;
            }
        }
        positions.push(candidate);
    }
    positions
}
