use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self { Self { width, height } }

    /// A size with no area cannot be used to place a window.
    pub fn is_degenerate(&self) -> bool { self.width <= 0 || self.height <= 0 }
}

/// Integer rectangle in screen coordinates, origin at the top left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self { Self { x, y, width, height } }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn max_x(&self) -> i32 { self.x + self.width }

    pub fn max_y(&self) -> i32 { self.y + self.height }

    pub fn top_left(&self) -> Point { self.origin() }

    pub fn top_right(&self) -> Point { Point::new(self.max_x(), self.y) }

    pub fn center(&self) -> Point { Point::new(self.x + self.width / 2, self.y + self.height / 2) }

    pub fn is_empty(&self) -> bool { self.size().is_degenerate() }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Points on the right and bottom edges count as inside, so the top-right
    /// corner of a window flush with a screen edge is still visible.
    pub fn contains(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.x
            && point.x <= self.max_x()
            && point.y >= self.y
            && point.y <= self.max_y()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        if max_x <= x || max_y <= y {
            return None;
        }
        Some(Rect::new(x, y, max_x - x, max_y - y))
    }

    /// Moves the rectangle, keeping its size, so that it lies inside `bounds`
    /// wherever possible. A rectangle larger than `bounds` is pinned to the
    /// bounds' top-left corner on that axis.
    pub fn translated_into(&self, bounds: &Rect) -> Rect {
        fn fit(pos: i32, len: i32, start: i32, extent: i32) -> i32 {
            if len >= extent {
                start
            } else {
                pos.clamp(start, start + extent - len)
            }
        }
        Rect::new(
            fit(self.x, self.width, bounds.x, bounds.width),
            fit(self.y, self.height, bounds.y, bounds.height),
            self.width,
            self.height,
        )
    }

    pub fn centered_in(&self, frame: &Rect) -> Rect {
        Rect::new(
            frame.x + (frame.width - self.width) / 2,
            frame.y + (frame.height - self.height) / 2,
            self.width,
            self.height,
        )
    }

    pub fn distance_sq_to(&self, point: Point) -> i64 {
        let c = self.center();
        let dx = (c.x - point.x) as i64;
        let dy = (c.y - point.y) as i64;
        dx * dx + dy * dy
    }
}
