use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its top-left (x1, y1) and bottom-right (x2, y2) corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(_x1: i32, _y1: i32, _x2: i32, _y2: i32) -> Self {
        Rect {
            x1: _x1,
            y1: _y1,
            x2: _x2,
            y2: _y2,
        }
    }
    /// Horizontal extent, zero for inverted rectangles. Any pair of `i32` corners fits
    pub fn width(&self) -> u32 {
        span(self.x1, self.x2)
    }
    pub fn height(&self) -> u32 {
        span(self.y1, self.y2)
    }
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
    pub fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }
}

impl From<[i32; 4]> for Rect {
    fn from(v: [i32; 4]) -> Self {
        Rect::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rect> for [i32; 4] {
    fn from(r: Rect) -> Self {
        [r.x1, r.y1, r.x2, r.y2]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(_x: i32, _y: i32) -> Self {
        Point { x: _x, y: _y }
    }
}

fn span(from: i32, to: i32) -> u32 {
    i64::max(to as i64 - from as i64, 0) as u32
}

/// Intersection over union of two rectangles. Returns 0.0 when both are empty
pub fn iou(r1: &Rect, r2: &Rect) -> f32 {
    let x_left = i32::max(r1.x1, r2.x1);
    let y_top = i32::max(r1.y1, r2.y1);
    let x_right = i32::min(r1.x2, r2.x2);
    let y_bottom = i32::min(r1.y2, r2.y2);
    if x_right <= x_left || y_bottom <= y_top {
        return 0.0;
    }
    let intersection = span(x_left, x_right) as u64 * span(y_top, y_bottom) as u64;
    let union = r1.area() as u128 + r2.area() as u128 - intersection as u128;
    if union == 0 {
        return 0.0;
    }
    (intersection as f64 / union as f64) as f32
}
