// ------------------------------------------------------------
// Planar rigid-body helpers
// ------------------------------------------------------------

use std::f64::consts::FRAC_PI_2;

// World or local point (x, y).
pub type Point = (f64, f64);

// Rods point "up" at zero angle.
pub const UPRIGHT_OFFSET: f64 = FRAC_PI_2;

// Standard 2-D rotation about the origin.
pub fn rotate(x: f64, y: f64, theta: f64) -> Point {
    let (s, c) = theta.sin_cos();
    (x * c - y * s, x * s + y * c)
}

pub fn translate(p: Point, by: Point) -> Point {
    (p.0 + by.0, p.1 + by.1)
}

// Rotate about the local origin, then move the origin to `pivot`.
pub fn place(p: Point, theta: f64, pivot: Point) -> Point {
    translate(rotate(p.0, p.1, theta), pivot)
}

// Rod outline in local coordinates: pivot at the origin, tip at (L, 0).
pub fn rod_outline(length: f64, width: f64) -> Vec<Point> {
    let hw = 0.5 * width;
    vec![(0.0, -hw), (0.0, hw), (length, hw), (length, -hw)]
}

// Cart outline centred on the local origin.
pub fn cart_outline(length: f64, width: f64) -> Vec<Point> {
    let hl = 0.5 * length;
    let hw = 0.5 * width;
    vec![(-hl, -hw), (-hl, hw), (hl, hw), (hl, -hw)]
}
