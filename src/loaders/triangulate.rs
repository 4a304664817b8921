//! Polygon triangulation by ear clipping
//!
//! Holes are first bridged into the outer contour with a pair of coincident
//! edges, which leaves a single simple polygon to clip.

use cgmath::Vector2;

const EPSILON: f32 = 1e-10;

/// Shoelace area; positive for counter-clockwise contours.
pub fn signed_area(contour: &[Vector2<f32>]) -> f32 {
    let n = contour.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let (p, q) = (contour[i], contour[(i + 1) % n]);
        twice_area += p.x * q.y - q.x * p.y;
    }
    twice_area * 0.5
}

pub fn is_clockwise(contour: &[Vector2<f32>]) -> bool {
    signed_area(contour) < 0.0
}

/// Even-odd containment test.
pub fn point_in_polygon(point: Vector2<f32>, polygon: &[Vector2<f32>]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn cross(o: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn same_point(a: Vector2<f32>, b: Vector2<f32>) -> bool {
    (a.x - b.x).abs() < 1e-7 && (a.y - b.y).abs() < 1e-7
}

/// Closed triangle test for a counter-clockwise triangle.
fn in_triangle(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> bool {
    cross(a, b, p) >= -EPSILON && cross(b, c, p) >= -EPSILON && cross(c, a, p) >= -EPSILON
}

/// Whether segments `p1-p2` and `q1-q2` cross at a point interior to both.
fn segments_cross(p1: Vector2<f32>, p2: Vector2<f32>, q1: Vector2<f32>, q2: Vector2<f32>) -> bool {
    if same_point(p1, q1) || same_point(p1, q2) || same_point(p2, q1) || same_point(p2, q2) {
        return false;
    }
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn ring_edges(ring: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

/// Triangulates a polygon with holes.
///
/// Returns every input point (outer contour first, then each hole in order)
/// and counter-clockwise triangles indexing into them. The outer contour may
/// have either winding.
pub fn triangulate(
    outer: &[Vector2<f32>],
    holes: &[Vec<Vector2<f32>>],
) -> (Vec<Vector2<f32>>, Vec<[u32; 3]>) {
    let mut points: Vec<Vector2<f32>> = Vec::with_capacity(
        outer.len() + holes.iter().map(Vec::len).sum::<usize>(),
    );

    // Outer ring counter-clockwise, hole rings clockwise
    let mut ring: Vec<usize> = (0..outer.len()).collect();
    points.extend_from_slice(outer);
    if is_clockwise(outer) {
        ring.reverse();
    }

    let mut hole_rings: Vec<Vec<usize>> = Vec::with_capacity(holes.len());
    for hole in holes.iter().filter(|h| h.len() > 2) {
        let start = points.len();
        points.extend_from_slice(hole);
        let mut hole_ring: Vec<usize> = (start..points.len()).collect();
        if !is_clockwise(hole) {
            hole_ring.reverse();
        }
        hole_rings.push(hole_ring);
    }

    // Rightmost holes first, so bridges never have to pass another hole
    let rightmost = |r: &Vec<usize>| {
        r.iter()
            .map(|&i| points[i].x)
            .fold(f32::MIN, f32::max)
    };
    hole_rings.sort_by(|a, b| rightmost(b).total_cmp(&rightmost(a)));

    for (n, hole_ring) in hole_rings.iter().enumerate() {
        match bridge(&points, &ring, hole_ring, &hole_rings[n + 1..]) {
            Some(merged) => ring = merged,
            None => log::warn!("Could not bridge a hole into its outline, hole ignored"),
        }
    }

    let triangles = clip_ears(&points, ring);
    (points, triangles)
}

/// Splices `hole` into `ring` through the closest mutually visible vertices.
fn bridge(
    points: &[Vector2<f32>],
    ring: &[usize],
    hole: &[usize],
    other_holes: &[Vec<usize>],
) -> Option<Vec<usize>> {
    let (hole_pos, &m) = hole
        .iter()
        .enumerate()
        .max_by(|a, b| points[*a.1].x.total_cmp(&points[*b.1].x))?;
    let mp = points[m];

    let mut candidates: Vec<usize> = (0..ring.len()).collect();
    candidates.sort_by(|&a, &b| {
        let da = (points[ring[a]] - mp).x.powi(2) + (points[ring[a]] - mp).y.powi(2);
        let db = (points[ring[b]] - mp).x.powi(2) + (points[ring[b]] - mp).y.powi(2);
        da.total_cmp(&db)
    });

    let hole_points: Vec<Vector2<f32>> = hole.iter().map(|&i| points[i]).collect();

    let ring_pos = candidates.into_iter().find(|&pos| {
        let p = points[ring[pos]];
        let blocked = ring_edges(ring)
            .chain(ring_edges(hole))
            .chain(other_holes.iter().flat_map(|h| ring_edges(h)))
            .any(|(a, b)| segments_cross(mp, p, points[a], points[b]));
        !blocked && !point_in_polygon((mp + p) * 0.5, &hole_points)
    })?;

    let mut merged = Vec::with_capacity(ring.len() + hole.len() + 2);
    merged.extend_from_slice(&ring[..=ring_pos]);
    merged.extend(hole[hole_pos..].iter().chain(&hole[..=hole_pos]).copied());
    merged.extend_from_slice(&ring[ring_pos..]);
    Some(merged)
}

fn clip_ears(points: &[Vector2<f32>], mut ring: Vec<usize>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let mut clipped = false;

        for i in 0..n {
            let (ia, ib, ic) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let (a, b, c) = (points[ia], points[ib], points[ic]);
            let turn = cross(a, b, c);

            if turn.abs() <= EPSILON {
                // Collinear or doubled-back vertex: remove without a triangle
                ring.remove(i);
                clipped = true;
                break;
            }
            if turn < 0.0 {
                continue;
            }

            let occupied = ring.iter().any(|&j| {
                let p = points[j];
                !same_point(p, a) && !same_point(p, b) && !same_point(p, c) && in_triangle(p, a, b, c)
            });
            if occupied {
                continue;
            }

            triangles.push([ia as u32, ib as u32, ic as u32]);
            ring.remove(i);
            clipped = true;
            break;
        }

        if !clipped {
            log::warn!(
                "Ear clipping stalled with {} vertices left, outline is not simple",
                ring.len()
            );
            return triangles;
        }
    }

    if ring.len() == 3 {
        let (a, b, c) = (points[ring[0]], points[ring[1]], points[ring[2]]);
        if cross(a, b, c) > EPSILON {
            triangles.push([ring[0] as u32, ring[1] as u32, ring[2] as u32]);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Vec<Vector2<f32>> {
        vec![
            Vector2::new(min, min),
            Vector2::new(max, min),
            Vector2::new(max, max),
            Vector2::new(min, max),
        ]
    }

    fn covered_area(points: &[Vector2<f32>], triangles: &[[u32; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| {
                let (a, b, c) = (points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]);
                cross(a, b, c) * 0.5
            })
            .sum()
    }

    #[test]
    fn test_signed_area_sign_follows_winding() {
        let ccw = square(0.0, 2.0);
        let mut cw = ccw.clone();
        cw.reverse();
        assert_eq!(signed_area(&ccw), 4.0);
        assert_eq!(signed_area(&cw), -4.0);
        assert!(is_clockwise(&cw));
    }

    #[test]
    fn test_square_becomes_two_triangles() {
        let (points, triangles) = triangulate(&square(0.0, 1.0), &[]);
        assert_eq!(triangles.len(), 2);
        assert!((covered_area(&points, &triangles) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hole_area_is_excluded() {
        let (points, triangles) = triangulate(&square(0.0, 10.0), &[square(3.0, 7.0)]);
        assert!((covered_area(&points, &triangles) - 84.0).abs() < 1e-3);
        // every triangle is counter-clockwise and none sits inside the hole
        for t in &triangles {
            let (a, b, c) = (points[t[0] as usize], points[t[1] as usize], points[t[2] as usize]);
            assert!(cross(a, b, c) > 0.0);
            let centroid = (a + b + c) / 3.0;
            assert!(!point_in_polygon(centroid, &square(3.0, 7.0)));
        }
    }

    #[test]
    fn test_two_holes() {
        let holes = vec![square(1.0, 3.0), square(6.0, 8.0)];
        let (points, triangles) = triangulate(&square(0.0, 10.0), &holes);
        assert!((covered_area(&points, &triangles) - 92.0).abs() < 1e-3);
    }

    #[test]
    fn test_clockwise_outer_is_accepted() {
        let mut outer = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 4.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(0.0, 4.0),
        ];
        let expected = signed_area(&outer);
        outer.reverse();
        let (points, triangles) = triangulate(&outer, &[]);
        assert!((covered_area(&points, &triangles) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_point_in_polygon() {
        let poly = square(0.0, 1.0);
        assert!(point_in_polygon(Vector2::new(0.5, 0.5), &poly));
        assert!(!point_in_polygon(Vector2::new(1.5, 0.5), &poly));
    }
}
