//! Extruded text meshes
//!
//! Each shape becomes a solid slab: a front cap at `z = depth`, a back cap at
//! `z = 0` and flat-shaded walls around every contour. No bevel.

use cgmath::{InnerSpace, Vector2};

use crate::gfx::geometry::GeometryData;

use super::{
    font::{Font, Shape},
    triangulate::{is_clockwise, triangulate},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Em height in world units
    pub size: f32,
    /// Extrusion along +Z
    pub depth: f32,
    pub curve_segments: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 100.0,
            depth: 50.0,
            curve_segments: 12,
        }
    }
}

/// Lays out and extrudes `text` with `font`.
pub fn generate_text(font: &Font, text: &str, options: &TextOptions) -> GeometryData {
    let shapes = font.generate_shapes(text, options.size, options.curve_segments);
    extrude_shapes(&shapes, options.depth)
}

pub fn extrude_shapes(shapes: &[Shape], depth: f32) -> GeometryData {
    let mut geometry = GeometryData::new();
    for shape in shapes {
        extrude_shape(&mut geometry, shape, depth);
    }
    geometry
}

fn extrude_shape(geometry: &mut GeometryData, shape: &Shape, depth: f32) {
    if shape.outer.len() < 3 {
        return;
    }

    // Outline counter-clockwise, holes clockwise
    let mut outer = shape.outer.clone();
    if is_clockwise(&outer) {
        outer.reverse();
    }
    let holes: Vec<Vec<Vector2<f32>>> = shape
        .holes
        .iter()
        .filter(|h| h.len() > 2)
        .map(|h| {
            let mut hole = h.clone();
            if !is_clockwise(&hole) {
                hole.reverse();
            }
            hole
        })
        .collect();

    let (points, triangles) = triangulate(&outer, &holes);

    // Front cap
    let front = geometry.vertex_count() as u32;
    for p in &points {
        geometry.push_vertex([p.x, p.y, depth], [0.0, 0.0, 1.0], [p.x, p.y]);
    }
    for t in &triangles {
        geometry.push_triangle(front + t[0], front + t[1], front + t[2]);
    }

    // Back cap, wound the other way
    let back = geometry.vertex_count() as u32;
    for p in &points {
        geometry.push_vertex([p.x, p.y, 0.0], [0.0, 0.0, -1.0], [p.x, p.y]);
    }
    for t in &triangles {
        geometry.push_triangle(back + t[0], back + t[2], back + t[1]);
    }

    for contour in std::iter::once(&outer).chain(holes.iter()) {
        extrude_walls(geometry, contour, depth);
    }
}

fn extrude_walls(geometry: &mut GeometryData, contour: &[Vector2<f32>], depth: f32) {
    let mut along = 0.0f32;
    for i in 0..contour.len() {
        let (p0, p1) = (contour[i], contour[(i + 1) % contour.len()]);
        let edge = p1 - p0;
        let length = edge.magnitude();
        if length <= f32::EPSILON {
            continue;
        }

        // Right of the direction of travel points out of the solid for
        // counter-clockwise outlines and clockwise holes alike
        let n = [edge.y / length, -edge.x / length, 0.0];
        let (u0, u1) = (along, along + length);
        along = u1;

        let a = geometry.push_vertex([p0.x, p0.y, 0.0], n, [u0, 0.0]);
        let b = geometry.push_vertex([p1.x, p1.y, 0.0], n, [u1, 0.0]);
        let c = geometry.push_vertex([p1.x, p1.y, depth], n, [u1, depth]);
        let d = geometry.push_vertex([p0.x, p0.y, depth], n, [u0, depth]);
        geometry.push_triangle(a, b, c);
        geometry.push_triangle(a, c, d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn square_with_hole() -> Shape {
        let sq = |min: f32, max: f32| {
            vec![
                Vector2::new(min, min),
                Vector2::new(min, max),
                Vector2::new(max, max),
                Vector2::new(max, min),
            ]
        };
        Shape {
            outer: sq(0.0, 4.0),
            holes: vec![sq(1.0, 3.0)],
        }
    }

    fn triangle_normal(g: &GeometryData, tri: &[u32]) -> Vector3<f32> {
        let p = |i: u32| Vector3::from(g.vertices[i as usize]);
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        (b - a).cross(c - a)
    }

    #[test]
    fn test_caps_face_outwards() {
        let g = extrude_shapes(&[square_with_hole()], 0.5);
        let mut front = 0.0;
        let mut back = 0.0;
        for tri in g.indices.chunks_exact(3) {
            let z: Vec<f32> = tri.iter().map(|&i| g.vertices[i as usize][2]).collect();
            let n = triangle_normal(&g, tri);
            if z.iter().all(|&z| z == 0.5) {
                assert!(n.z > 0.0);
                front += n.z * 0.5;
            } else if z.iter().all(|&z| z == 0.0) {
                assert!(n.z < 0.0);
                back -= n.z * 0.5;
            }
        }
        assert!((front - 12.0).abs() < 1e-4);
        assert!((back - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_walls_face_away_from_solid() {
        let g = extrude_shapes(&[square_with_hole()], 0.5);
        for tri in g.indices.chunks_exact(3) {
            let n = triangle_normal(&g, tri);
            if n.z.abs() > 1e-6 {
                continue;
            }
            let centre = tri
                .iter()
                .map(|&i| Vector3::from(g.vertices[i as usize]))
                .fold(Vector3::new(0.0, 0.0, 0.0), |acc, v| acc + v / 3.0);
            let out = Vector2::new(centre.x - 2.0, centre.y - 2.0);
            let on_hole = centre.x > 0.9 && centre.x < 3.1 && centre.y > 0.9 && centre.y < 3.1;
            let dot = n.x * out.x + n.y * out.y;
            if on_hole {
                assert!(dot < 0.0, "hole wall should face the hole centre");
            } else {
                assert!(dot > 0.0, "outer wall should face away");
            }
        }
    }

    #[test]
    fn test_wall_count() {
        let g = extrude_shapes(&[square_with_hole()], 0.5);
        // 8 contour edges, one quad each
        let walls = g
            .indices
            .chunks_exact(3)
            .filter(|tri| triangle_normal(&g, tri).z.abs() < 1e-6)
            .count();
        assert_eq!(walls, 16);
    }
}
