//! Small fixed-size vector helpers on `[f64; 3]`.
//!
//! Coordinates of lower space dimension are zero-padded to three components,
//! so every formula can be written once in 3D arithmetic.

/// A point or vector, zero-padded to three components.
pub type Point = [f64; 3];

pub const ZERO: Point = [0.0; 3];
pub const EPS: f64 = 1e-12;

#[inline]
pub fn add(a: Point, b: Point) -> Point {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Point, b: Point) -> Point {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Point, s: f64) -> Point {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn neg(a: Point) -> Point {
    [-a[0], -a[1], -a[2]]
}

#[inline]
pub fn dot(a: Point, b: Point) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Point, b: Point) -> Point {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Point) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn midpoint(a: Point, b: Point) -> Point {
    scale(add(a, b), 0.5)
}

/// Unit vector along `a`, or zero when `a` is (numerically) null.
pub fn unit_or_zero(a: Point) -> Point {
    let n = norm(a);
    if n > EPS { scale(a, 1.0 / n) } else { ZERO }
}

pub fn is_zero(a: Point) -> bool {
    a == ZERO
}

/// Arithmetic mean of a set of points; zero for an empty set.
pub fn average(points: &[Point]) -> Point {
    if points.is_empty() {
        return ZERO;
    }
    let sum = points.iter().fold(ZERO, |acc, &p| add(acc, p));
    scale(sum, 1.0 / points.len() as f64)
}

/// Pad a coordinate slice of length 1..=3 to a [`Point`].
pub fn pad(coords: &[f64]) -> Point {
    let mut p = ZERO;
    for (dst, &src) in p.iter_mut().zip(coords) {
        *dst = src;
    }
    p
}

/// Signed volume of the tetrahedron `(a, b, c, d)`.
#[inline]
pub fn tet_volume(a: Point, b: Point, c: Point, d: Point) -> f64 {
    dot(cross(sub(b, a), sub(c, a)), sub(d, a)) / 6.0
}
