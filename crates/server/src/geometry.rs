//! Geometry primitives.

use glam::Vec2;

/// Axis-aligned rectangle stored by center and size.
///
/// Half extents and edges are cached and recomputed on every change, so
/// queries never derive them. Y grows upward: `top` is `y + half_height`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    half_width: f32,
    half_height: f32,
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut rect = Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        };
        rect.recompute();
        rect
    }

    /// Square of side `side` centered on `center`.
    #[inline]
    pub fn square(center: Vec2, side: f32) -> Self {
        Self::new(center.x, center.y, side, side)
    }

    fn recompute(&mut self) {
        self.half_width = self.width / 2.0;
        self.half_height = self.height / 2.0;
        self.left = self.x - self.half_width;
        self.right = self.x + self.half_width;
        self.top = self.y + self.half_height;
        self.bottom = self.y - self.half_height;
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x;
        self.y = center.y;
        self.recompute();
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.recompute();
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.left
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.right
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.top
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    /// True if `other` lies entirely within `self` (shared edges count).
    #[inline]
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.bottom >= self.bottom
            && other.top <= self.top
    }

    /// Separating-axis overlap test. Touching edges count as intersecting.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        (self.x - other.x).abs() <= self.half_width + other.half_width
            && (self.y - other.y).abs() <= self.half_height + other.half_height
    }

    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.bottom && point.y <= self.top
    }

    /// Clamp a point so it lies at least `margin` inside the rectangle.
    ///
    /// Returns the clamped point and which axes had to be clamped.
    pub fn clamp_point(&self, point: Vec2, margin: f32) -> (Vec2, bool, bool) {
        let margin_x = margin.min(self.half_width);
        let margin_y = margin.min(self.half_height);
        let x = point.x.clamp(self.left + margin_x, self.right - margin_x);
        let y = point.y.clamp(self.bottom + margin_y, self.top - margin_y);
        (Vec2::new(x, y), x != point.x, y != point.y)
    }

    /// One of the four equal quadrants: 0 = north-east, 1 = north-west,
    /// 2 = south-west, 3 = south-east.
    pub fn quadrant(&self, index: usize) -> Rect {
        let qw = self.half_width / 2.0;
        let qh = self.half_height / 2.0;
        let (dx, dy) = match index {
            0 => (qw, qh),
            1 => (-qw, qh),
            2 => (-qw, -qh),
            _ => (qw, -qh),
        };
        Rect::new(self.x + dx, self.y + dy, self.half_width, self.half_height)
    }
}
