use serde::{Deserialize, Serialize};

/// 2D point with f32 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale both coordinates independently
    pub fn scale(self, h: f32, v: f32) -> Self {
        Self {
            x: self.x * h,
            y: self.y * v,
        }
    }
}

/// A straight line between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y
    }

    pub fn is_vertical(&self) -> bool {
        self.from.x == self.to.x
    }

    pub(crate) fn scale(self, h: f32, v: f32) -> Self {
        Self {
            from: self.from.scale(h, v),
            to: self.to.scale(h, v),
        }
    }
}

/// A polyline through pre-sampled points, so that every backend draws the same curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcPath {
    pub points: Vec<Point>,
    pub dashed: bool,
}
