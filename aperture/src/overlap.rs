//! Exact overlap areas between axis-aligned boxes and circles or ellipses.
//!
//! Both shapes are centred on the origin. The box is treated as a polygon and
//! clipped against the disc edge by edge: each edge contributes the signed
//! area of the triangle (origin, edge) intersected with the disc, which is a
//! mix of plain triangles and circular sectors. An ellipse is first mapped to
//! the unit disc, turning the box into a parallelogram, and the area is scaled
//! back by `a·b`.

#[derive(Debug, Clone, Copy)]
struct Point {
    x: f64,
    y: f64,
}

impl Point {
    fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }

    fn norm2(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

/// Signed area of triangle (origin, p, q) ∩ disc of radius `r`.
fn triangle_disc_area(p: Point, q: Point, r: f64) -> f64 {
    let r2 = r * r;
    let d = Point::new(q.x - p.x, q.y - p.y);
    let dd = d.norm2();
    if dd == 0.0 {
        return 0.0;
    }

    // Crossings of the segment with the circle: |p + t·d|² = r²
    let half_b = p.dot(d);
    let c = p.norm2() - r2;
    let disc = half_b * half_b - dd * c;

    let mut ts = [0.0, 1.0, 1.0, 1.0];
    let mut count = 1;
    if disc > 0.0 {
        let root = disc.sqrt();
        for t in [(-half_b - root) / dd, (-half_b + root) / dd] {
            if t > 0.0 && t < 1.0 {
                ts[count] = t;
                count += 1;
            }
        }
    }
    ts[count] = 1.0;

    let mut area = 0.0;
    for pair in ts[..=count].windows(2) {
        let a = p.lerp(q, pair[0]);
        let b = p.lerp(q, pair[1]);
        let mid = p.lerp(q, 0.5 * (pair[0] + pair[1]));
        // Strict: a tangent edge touches the circle only at its midpoint
        if mid.norm2() < r2 {
            area += 0.5 * a.cross(b);
        } else {
            area += 0.5 * r2 * a.cross(b).atan2(a.dot(b));
        }
    }
    area
}

/// Area of a polygon ∩ disc of radius `r` centred on the origin.
fn polygon_disc_area(vertices: &[Point], r: f64) -> f64 {
    let n = vertices.len();
    let area: f64 = (0..n)
        .map(|i| triangle_disc_area(vertices[i], vertices[(i + 1) % n], r))
        .sum();
    area.abs()
}

/// Area of `[x0, x1] × [y0, y1]` covered by the circle of radius `r`.
pub fn circle_overlap(x0: f64, y0: f64, x1: f64, y1: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    let r2 = r * r;

    // Farthest corner inside: the whole box is covered
    let far_x = x0.abs().max(x1.abs());
    let far_y = y0.abs().max(y1.abs());
    if far_x * far_x + far_y * far_y <= r2 {
        return (x1 - x0) * (y1 - y0);
    }

    // Nearest point of the box outside: nothing is covered
    let near_x = if x0 > 0.0 { x0 } else if x1 < 0.0 { -x1 } else { 0.0 };
    let near_y = if y0 > 0.0 { y0 } else if y1 < 0.0 { -y1 } else { 0.0 };
    if near_x * near_x + near_y * near_y >= r2 {
        return 0.0;
    }

    let corners = [
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ];
    polygon_disc_area(&corners, r).min((x1 - x0) * (y1 - y0))
}

/// Area of `[x0, x1] × [y0, y1]` covered by the ellipse with semi-axes `a`, `b`
/// whose major axis is rotated by `theta` counter-clockwise from +x.
pub fn ellipse_overlap(x0: f64, y0: f64, x1: f64, y1: f64, a: f64, b: f64, theta: f64) -> f64 {
    if a <= 0.0 || b <= 0.0 {
        return 0.0;
    }

    let (sin_t, cos_t) = theta.sin_cos();
    let to_unit = |x: f64, y: f64| {
        Point::new(
            (x * cos_t + y * sin_t) / a,
            (-x * sin_t + y * cos_t) / b,
        )
    };

    let corners = [
        to_unit(x0, y0),
        to_unit(x1, y0),
        to_unit(x1, y1),
        to_unit(x0, y1),
    ];

    // Entirely inside the ellipse
    if corners.iter().all(|p| p.norm2() <= 1.0) {
        return (x1 - x0) * (y1 - y0);
    }

    (polygon_disc_area(&corners, 1.0) * a * b).min((x1 - x0) * (y1 - y0))
}
