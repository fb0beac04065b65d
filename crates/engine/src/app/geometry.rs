use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Largest absolute world coordinate accepted from saves and layouts.
pub const MAX_WORLD_COORD: f32 = 1.0e6;

/// World-space vector in pixels. Positive `y` points down the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or zero when the input is zero.
    pub fn normalized_or_zero(self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        let length = self.length();
        if !length.is_finite() || length == 0.0 {
            return Self::ZERO;
        }
        Self {
            x: self.x / length,
            y: self.y / length,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn is_within_world(self) -> bool {
        self.is_finite() && self.x.abs() <= MAX_WORLD_COORD && self.y.abs() <= MAX_WORLD_COORD
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Axis-aligned integer rectangle in world pixels.
///
/// `x`/`y` is the top-left corner; `right()`/`bottom()` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from a float position plus a fixed pixel offset.
    /// Coordinates truncate toward zero and saturate at the `i32` range.
    pub fn from_position(
        position: Vec2,
        offset_x: i32,
        offset_y: i32,
        width: i32,
        height: i32,
    ) -> Self {
        Self {
            x: (position.x as i32).saturating_add(offset_x),
            y: (position.y as i32).saturating_add(offset_y),
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x as f32 + self.width as f32 * 0.5,
            y: self.y as f32 + self.height as f32 * 0.5,
        }
    }

    /// Strict overlap. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.x < self.right()
            && self.x < other.right()
            && other.y < self.bottom()
            && self.y < other.bottom()
    }

    /// Closed overlap. Shared edges and corners count as contact.
    pub fn touches(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.x <= self.right()
            && self.x <= other.right()
            && other.y <= self.bottom()
            && self.y <= other.bottom()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x as f32
            && point.x < self.right() as f32
            && point.y >= self.y as f32
            && point.y < self.bottom() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_or_zero_handles_zero_vector() {
        assert_eq!(Vec2::ZERO.normalized_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn normalized_or_zero_produces_unit_length() {
        let unit = Vec2::new(3.0, -4.0).normalized_or_zero();
        assert!((unit.length() - 1.0).abs() < 0.0001);
        assert!((unit.x - 0.6).abs() < 0.0001);
        assert!((unit.y + 0.8).abs() < 0.0001);
    }

    #[test]
    fn from_position_truncates_toward_zero() {
        let rect = Rect::from_position(Vec2::new(10.9, -3.7), 8, 16, 16, 16);
        assert_eq!(rect, Rect::new(18, 13, 16, 16));
    }

    #[test]
    fn intersects_excludes_shared_edges() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(16, 0, 16, 16);
        let c = Rect::new(15, 15, 4, 4);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn touches_includes_shared_edges() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(16, 0, 16, 16);
        let far = Rect::new(17, 0, 16, 16);
        assert!(a.touches(&b));
        assert!(!a.touches(&far));
    }

    #[test]
    fn far_positions_saturate_instead_of_overflowing() {
        let rect = Rect::from_position(Vec2::new(3.0e9, -3.0e9), 8, -16, 16, 16);
        assert_eq!(rect.x, i32::MAX);
        assert_eq!(rect.y, i32::MIN);
        assert_eq!(rect.right(), i32::MAX);

        let near_origin = Rect::new(0, 0, 16, 16);
        assert!(!rect.intersects(&near_origin));
        assert!(!rect.touches(&near_origin));
    }

    #[test]
    fn world_limit_rejects_far_and_non_finite_positions() {
        assert!(Vec2::new(-MAX_WORLD_COORD, MAX_WORLD_COORD).is_within_world());
        assert!(!Vec2::new(3.0e9, 0.0).is_within_world());
        assert!(!Vec2::new(0.0, f32::NAN).is_within_world());
    }

    #[test]
    fn empty_rect_never_overlaps() {
        let empty = Rect::new(0, 0, 0, 10);
        let a = Rect::new(-5, -5, 20, 20);
        assert!(!empty.intersects(&a));
        assert!(!empty.touches(&a));
    }
}
