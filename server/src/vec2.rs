/// 2D vector utilities for the arena plane.

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shorthand constructor
pub fn vec2(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

/// Vector length
pub fn length(v: Vec2) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Normalize vector to unit length
pub fn normalize(v: Vec2) -> Vec2 {
    let len = length(v);
    if len < 1e-10 {
        return Vec2::new(1.0, 0.0);
    }
    Vec2::new(v.x / len, v.y / len)
}

/// Scale vector by scalar
pub fn scale(v: Vec2, s: f64) -> Vec2 {
    Vec2::new(v.x * s, v.y * s)
}

/// Add two vectors
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x + b.x, a.y + b.y)
}

/// Euclidean distance between two points
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}
