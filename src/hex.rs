//! Axial hex coordinates and the traversals built on them.
//!
//! Coordinates are stored as `(r, q)` with the implicit cube axis `z = -r - q`.
//! Distances and rounding are done in cube space.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Unit offsets for directions `0..=5`.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord { r: 0, q: -1 },
    HexCoord { r: 1, q: -1 },
    HexCoord { r: 1, q: 0 },
    HexCoord { r: 0, q: 1 },
    HexCoord { r: -1, q: 1 },
    HexCoord { r: -1, q: 0 },
];

/// Direction taken to step from one ring onto the start of the next.
const RING_ENTRY: usize = 4;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoord {
    pub r: i32,
    pub q: i32,
}

impl HexCoord {
    pub const ORIGIN: Self = Self { r: 0, q: 0 };

    pub const fn new(r: i32, q: i32) -> Self {
        Self { r, q }
    }

    /// Third cube axis.
    pub const fn z(self) -> i32 {
        -self.r - self.q
    }

    /// Offset for `dir`; anything outside `0..=5` is the zero offset.
    pub fn direction(dir: usize) -> Self {
        DIRECTIONS.get(dir).copied().unwrap_or(Self::ORIGIN)
    }

    pub fn neighbour(self, dir: usize) -> Self {
        self + Self::direction(dir)
    }

    /// All six neighbours in direction order.
    pub fn neighbours(self) -> [Self; 6] {
        DIRECTIONS.map(|offset| self + offset)
    }

    pub fn distance(self, other: Self) -> u32 {
        let dr = (self.r - other.r).unsigned_abs();
        let dq = (self.q - other.q).unsigned_abs();
        let dz = (self.z() - other.z()).unsigned_abs();
        dr.max(dq).max(dz)
    }

    /// Centre of the hex on a cartesian plane where every hex is a 2x2 cell.
    pub fn center(self) -> (i32, i32) {
        (2 * self.r, self.z() - self.q)
    }

    /// Nearest hex to a (possibly fractional) cartesian centre position.
    pub fn from_center(x: f64, y: f64) -> Self {
        let r = x / 2.0;
        let q = (-y - r) / 2.0;
        Self::round(r, q)
    }

    /// Cube rounding of fractional axial coordinates.
    pub fn round(r: f64, q: f64) -> Self {
        let z = -r - q;
        let mut rr = r.round();
        let mut rq = q.round();
        let rz = z.round();

        let r_diff = (rr - r).abs();
        let q_diff = (rq - q).abs();
        let z_diff = (rz - z).abs();

        if r_diff > q_diff && r_diff > z_diff {
            rr = -rq - rz;
        } else if q_diff > z_diff {
            rq = -rr - rz;
        }

        Self::new(rr as i32, rq as i32)
    }

    /// Blend between `self` and `other`, rounding each axial component on its own.
    ///
    /// Rounding is half away from zero. The result is not guaranteed to lie on
    /// a straight hex line for arbitrary `t`.
    pub fn interpolate(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: i32, b: i32| (a as f64 * (1.0 - t) + b as f64 * t).round() as i32;
        Self::new(lerp(self.r, other.r), lerp(self.q, other.q))
    }
}

impl Add for HexCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.r + other.r, self.q + other.q)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.r, self.q, self.z())
    }
}

/// `distance(a, b) + 1` coordinates sampled along the line from `a` to `b`,
/// both endpoints included.
pub fn coords_in_between(a: HexCoord, b: HexCoord) -> Vec<HexCoord> {
    let dist = a.distance(b);
    if dist == 0 {
        return vec![a];
    }
    (0..=dist)
        .map(|step| a.interpolate(b, step as f64 / dist as f64))
        .collect()
}

/// Number of hexes within `radius` of a centre.
pub const fn hex_count(radius: u32) -> usize {
    let r = radius as usize;
    3 * r * r + 3 * r + 1
}

/// Where a coordinate sits in a spiral walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiralStep {
    /// Ring index, equal to the distance from the spiral's start.
    pub ring: u32,
    /// Side of the ring being walked, `0..=5`.
    pub side: usize,
    /// Position along that side, `0..ring`.
    pub step: u32,
}

impl SpiralStep {
    const CENTRE: Self = Self {
        ring: 0,
        side: 0,
        step: 0,
    };
}

/// Iterator over every hex within `radius` of `start`, ring by ring.
///
/// Ring `k` is entered through direction 4 from the end of ring `k - 1`, then
/// its six sides are walked in direction order, `k` hexes per side.
#[derive(Debug, Clone)]
pub struct Spiral {
    current: HexCoord,
    radius: u32,
    ring: u32,
    side: usize,
    step: u32,
    started: bool,
    finished: bool,
}

impl Spiral {
    pub fn new(start: HexCoord, radius: u32) -> Self {
        Self {
            current: start,
            radius,
            ring: 0,
            side: 0,
            step: 0,
            started: false,
            finished: false,
        }
    }
}

impl Iterator for Spiral {
    type Item = (HexCoord, SpiralStep);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            let item = (self.current, SpiralStep::CENTRE);
            if self.radius == 0 {
                self.finished = true;
            } else {
                self.ring = 1;
                self.current = self.current.neighbour(RING_ENTRY);
            }
            return Some(item);
        }

        let item = (
            self.current,
            SpiralStep {
                ring: self.ring,
                side: self.side,
                step: self.step,
            },
        );
        self.current = self.current.neighbour(self.side);
        self.step += 1;
        if self.step == self.ring {
            self.step = 0;
            self.side += 1;
            if self.side == DIRECTIONS.len() {
                self.side = 0;
                self.ring += 1;
                if self.ring > self.radius {
                    self.finished = true;
                } else {
                    self.current = self.current.neighbour(RING_ENTRY);
                }
            }
        }
        Some(item)
    }
}

pub fn spiral(start: HexCoord, radius: u32) -> Spiral {
    Spiral::new(start, radius)
}

/// Calls `visit` once for every hex within `radius` of `start`, in spiral order.
pub fn ring_traverse<F>(start: HexCoord, radius: u32, mut visit: F)
where
    F: FnMut(HexCoord, SpiralStep),
{
    for (coords, step) in spiral(start, radius) {
        visit(coords, step);
    }
}

/// Spiral traversal that threads the results gathered so far into each visit.
pub fn ring_collect<T, F>(start: HexCoord, radius: u32, mut visit: F) -> Vec<T>
where
    F: FnMut(HexCoord, SpiralStep, &[T]) -> T,
{
    let mut memory = Vec::with_capacity(hex_count(radius));
    for (coords, step) in spiral(start, radius) {
        let value = visit(coords, step, &memory);
        memory.push(value);
    }
    memory
}
