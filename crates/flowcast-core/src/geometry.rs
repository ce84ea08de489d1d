#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixel space (origin top-left, y down).

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// An axis-aligned rectangle for node boxes and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Grow the rectangle by `margin` on every side.
    #[must_use]
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            (self.width + 2.0 * margin).max(0.0),
            (self.height + 2.0 * margin).max(0.0),
        )
    }
}

/// A cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBezier {
    #[must_use]
    pub const fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Flow-diagram S-curve: both control points sit at the horizontal
    /// midpoint, each held at its own endpoint's y, so the curve leaves and
    /// enters horizontally.
    #[must_use]
    pub fn s_curve(start: Point, end: Point) -> Self {
        let mid_x = (start.x + end.x) / 2.0;
        Self::new(
            start,
            Point::new(mid_x, start.y),
            Point::new(mid_x, end.y),
            end,
        )
    }

    /// Evaluate the curve at `t` (clamped to `[0, 1]`) by De Casteljau
    /// subdivision.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let a = self.p0.lerp(self.p1, t);
        let b = self.p1.lerp(self.p2, t);
        let c = self.p2.lerp(self.p3, t);
        let d = a.lerp(b, t);
        let e = b.lerp(c, t);
        d.lerp(e, t)
    }

    /// First derivative at `t` (not normalized).
    #[must_use]
    pub fn tangent_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let k0 = 3.0 * u * u;
        let k1 = 6.0 * u * t;
        let k2 = 3.0 * t * t;
        Point::new(
            k0 * (self.p1.x - self.p0.x) + k1 * (self.p2.x - self.p1.x) + k2 * (self.p3.x - self.p2.x),
            k0 * (self.p1.y - self.p0.y) + k1 * (self.p2.y - self.p1.y) + k2 * (self.p3.y - self.p2.y),
        )
    }

    /// Unit normal at `t` (tangent rotated 90° clockwise in screen space).
    ///
    /// Degenerate curves (zero-length tangent) report a straight-down normal.
    #[must_use]
    pub fn normal_at(&self, t: f64) -> Point {
        let d = self.tangent_at(t);
        let len = d.x.hypot(d.y);
        if len <= f64::EPSILON || !len.is_finite() {
            return Point::new(0.0, 1.0);
        }
        Point::new(-d.y / len, d.x / len)
    }

    /// SVG path data (`M … C …`) with two-decimal precision.
    #[must_use]
    pub fn svg_path(&self) -> String {
        let mut out = String::with_capacity(64);
        let _ = write!(
            out,
            "M{},{} C{},{} {},{} {},{}",
            fmt_coord(self.p0.x),
            fmt_coord(self.p0.y),
            fmt_coord(self.p1.x),
            fmt_coord(self.p1.y),
            fmt_coord(self.p2.x),
            fmt_coord(self.p2.y),
            fmt_coord(self.p3.x),
            fmt_coord(self.p3.y),
        );
        out
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
#[must_use]
pub fn fmt_coord(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 100.0).round() / 100.0;
    let mut s = format!("{rounded:.2}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn s_curve_is_flat_at_both_ends() {
        let c = CubicBezier::s_curve(Point::new(10.0, 20.0), Point::new(110.0, 80.0));
        assert_eq!(c.p1, Point::new(60.0, 20.0));
        assert_eq!(c.p2, Point::new(60.0, 80.0));
        let t0 = c.tangent_at(0.0);
        let t1 = c.tangent_at(1.0);
        assert!(approx(t0.y, 0.0));
        assert!(approx(t1.y, 0.0));
        assert!(t0.x > 0.0 && t1.x > 0.0);
    }

    #[test]
    fn point_at_hits_endpoints_and_midpoint() {
        let c = CubicBezier::s_curve(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(c.point_at(0.0), c.p0);
        assert_eq!(c.point_at(1.0), c.p3);
        let mid = c.point_at(0.5);
        assert!(approx(mid.x, 50.0));
        assert!(approx(mid.y, 50.0));
    }

    #[test]
    fn point_at_clamps_parameter() {
        let c = CubicBezier::s_curve(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(c.point_at(-3.0), c.p0);
        assert_eq!(c.point_at(4.0), c.p3);
    }

    #[test]
    fn normal_is_unit_and_perpendicular() {
        let c = CubicBezier::s_curve(Point::new(0.0, 0.0), Point::new(200.0, 120.0));
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            let n = c.normal_at(t);
            let d = c.tangent_at(t);
            assert!(approx(n.x.hypot(n.y), 1.0));
            assert!((n.x * d.x + n.y * d.y).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_curve_has_fallback_normal() {
        let p = Point::new(5.0, 5.0);
        let c = CubicBezier::new(p, p, p, p);
        assert_eq!(c.normal_at(0.3), Point::new(0.0, 1.0));
    }

    #[test]
    fn svg_path_formats_compactly() {
        let c = CubicBezier::s_curve(Point::new(0.0, 10.5), Point::new(100.0, 33.333));
        assert_eq!(c.svg_path(), "M0,10.5 C50,10.5 50,33.33 100,33.33");
    }

    #[test]
    fn fmt_coord_normalizes_negative_zero_and_nan() {
        assert_eq!(fmt_coord(-0.001), "0");
        assert_eq!(fmt_coord(f64::NAN), "0");
        assert_eq!(fmt_coord(-12.5), "-12.5");
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(15.0, 12.0)));
        assert!(r.inflate(1.0).contains(Point::new(15.0, 12.0)));
    }
}
