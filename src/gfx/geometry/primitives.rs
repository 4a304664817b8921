//! # Primitive Shape Generation
//!
//! This module contains functions to generate the primitive shapes used by
//! the diorama. All shapes are generated with proper normals and texture
//! coordinates.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a box centred at the origin with one subdivision per face.
///
/// Faces are emitted in `+x, -x, +y, -y, +z, -z` order and each face gets its
/// own material group, so a six-material list can texture every side.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    // (u axis, v axis, w axis, u dir, v dir, plane width, plane height, plane depth)
    let faces: [(usize, usize, usize, f32, f32, f32, f32, f32); 6] = [
        (2, 1, 0, -1.0, -1.0, depth, height, width),  // px
        (2, 1, 0, 1.0, -1.0, depth, height, -width),  // nx
        (0, 2, 1, 1.0, 1.0, width, depth, height),    // py
        (0, 2, 1, 1.0, -1.0, width, depth, -height),  // ny
        (0, 1, 2, 1.0, -1.0, width, height, depth),   // pz
        (0, 1, 2, -1.0, -1.0, width, height, -depth), // nz
    ];

    for (material_index, &(u, v, w, udir, vdir, plane_w, plane_h, plane_d)) in
        faces.iter().enumerate()
    {
        let group_start = data.indices.len() as u32;
        let first = data.vertices.len() as u32;

        for iy in 0..=1u32 {
            let y = iy as f32 * plane_h - plane_h * 0.5;
            for ix in 0..=1u32 {
                let x = ix as f32 * plane_w - plane_w * 0.5;

                let mut position = [0.0; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[w] = plane_d * 0.5;

                let mut normal = [0.0; 3];
                normal[w] = if plane_d > 0.0 { 1.0 } else { -1.0 };

                data.push_vertex(position, normal, [ix as f32, 1.0 - iy as f32]);
            }
        }

        // 2x2 vertex grid: a = (0,0), b = (0,1), c = (1,1), d = (1,0)
        let a = first;
        let b = first + 2;
        let c = first + 3;
        let d = first + 1;
        data.push_triangle(a, b, d);
        data.push_triangle(b, c, d);

        data.add_group(group_start, 6, material_index);
    }

    data
}

/// Generate a capped cylinder along the Y axis
///
/// # Arguments
/// * `radius_top` - Radius at `+height/2`; zero produces a cone tip
/// * `radius_bottom` - Radius at `-height/2`
/// * `height` - Height of the cylinder (along Y)
/// * `radial_segments` - Number of segments around the circumference
///
/// The seam sits on `+z` and the angle increases towards `+x`.
pub fn generate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = radial_segments.max(3);
    let half_height = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;

    // Side: a single ring of quads between the top (row 0) and bottom (row 1)
    let mut rows = [Vec::new(), Vec::new()];
    for (row_index, row) in rows.iter_mut().enumerate() {
        let v = row_index as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;

        for x in 0..=segs {
            let u = x as f32 / segs as f32;
            let theta = u * 2.0 * PI;
            let (sin_t, cos_t) = theta.sin_cos();

            let length = (sin_t * sin_t + slope * slope + cos_t * cos_t).sqrt();
            let normal = [sin_t / length, slope / length, cos_t / length];

            row.push(data.push_vertex(
                [radius * sin_t, -v * height + half_height, radius * cos_t],
                normal,
                [u, 1.0 - v],
            ));
        }
    }

    for x in 0..segs as usize {
        let a = rows[0][x];
        let b = rows[1][x];
        let c = rows[1][x + 1];
        let d = rows[0][x + 1];

        if radius_top > 0.0 {
            data.push_triangle(a, b, d);
        }
        if radius_bottom > 0.0 {
            data.push_triangle(b, c, d);
        }
    }

    if radius_top > 0.0 {
        generate_cap(&mut data, radius_top, half_height, segs, true);
    }
    if radius_bottom > 0.0 {
        generate_cap(&mut data, radius_bottom, half_height, segs, false);
    }

    data
}

/// Generate a cone along the Y axis with its tip at `+height/2`
pub fn generate_cone(radius: f32, height: f32, radial_segments: u32) -> GeometryData {
    generate_cylinder(0.0, radius, height, radial_segments)
}

fn generate_cap(data: &mut GeometryData, radius: f32, half_height: f32, segs: u32, top: bool) {
    let sign = if top { 1.0 } else { -1.0 };
    let normal = [0.0, sign, 0.0];

    // One centre vertex per segment keeps the UV seam clean
    let centre_start = data.vertices.len() as u32;
    for _ in 0..segs {
        data.push_vertex([0.0, half_height * sign, 0.0], normal, [0.5, 0.5]);
    }

    let ring_start = data.vertices.len() as u32;
    for x in 0..=segs {
        let theta = x as f32 / segs as f32 * 2.0 * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        data.push_vertex(
            [radius * sin_t, half_height * sign, radius * cos_t],
            normal,
            [cos_t * 0.5 + 0.5, sin_t * 0.5 * sign + 0.5],
        );
    }

    for x in 0..segs {
        let centre = centre_start + x;
        let i = ring_start + x;
        if top {
            data.push_triangle(i, i + 1, centre);
        } else {
            data.push_triangle(i + 1, i, centre);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(data: &GeometryData, triangle: usize) -> [f32; 3] {
        let idx = &data.indices[triangle * 3..triangle * 3 + 3];
        let (v0, v1, v2) = (
            data.vertices[idx[0] as usize],
            data.vertices[idx[1] as usize],
            data.vertices[idx[2] as usize],
        );
        let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    fn centroid(data: &GeometryData, triangle: usize) -> [f32; 3] {
        let idx = &data.indices[triangle * 3..triangle * 3 + 3];
        let mut c = [0.0; 3];
        for &i in idx {
            for axis in 0..3 {
                c[axis] += data.vertices[i as usize][axis] / 3.0;
            }
        }
        c
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_box_generation() {
        let data = generate_box(2.0, 4.0, 6.0);
        assert_eq!(data.vertex_count(), 24);
        assert_eq!(data.indices.len(), 36);
        assert_eq!(data.triangle_count(), 12);

        let order: Vec<usize> = data.groups.iter().map(|g| g.material_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        assert!(data.groups.iter().all(|g| g.count == 6));
    }

    #[test]
    fn test_box_faces_point_outward_in_group_order() {
        let data = generate_box(2.0, 2.0, 2.0);
        let expected = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];

        for (group, axis) in data.groups.iter().zip(expected.iter()) {
            let first_triangle = group.start as usize / 3;
            for t in first_triangle..first_triangle + 2 {
                assert!(dot(triangle_normal(&data, t), *axis) > 0.0);
            }
            let vertex = data.indices[group.start as usize] as usize;
            assert_eq!(data.normals[vertex], *axis);
        }
    }

    #[test]
    fn test_cylinder_counts() {
        let n = 8;
        let data = generate_cylinder(12.0, 12.0, 1.2, n);
        assert_eq!(data.vertex_count() as u32, 6 * n + 4);
        assert_eq!(data.indices.len() as u32, 12 * n);
        assert_eq!(data.vertices.len(), data.normals.len());
        assert_eq!(data.vertices.len(), data.tex_coords.len());
    }

    #[test]
    fn test_cylinder_spans_height_and_radius() {
        let data = generate_cylinder(5.0, 5.0, 4.0, 64);
        let (min, max) = data.bounding_box().unwrap();
        assert!((min[1] + 2.0).abs() < 1e-5);
        assert!((max[1] - 2.0).abs() < 1e-5);
        assert!((max[0] - 5.0).abs() < 1e-3);
        assert!((max[2] - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_cylinder_triangles_face_outward() {
        let data = generate_cylinder(1.0, 1.0, 2.0, 16);
        for t in 0..data.triangle_count() {
            let c = centroid(&data, t);
            let n = triangle_normal(&data, t);
            // Every face of a convex solid centred on the origin faces away from it
            assert!(dot(c, n) > 0.0, "triangle {} faces inward", t);
        }
    }

    #[test]
    fn test_cone_has_tip_and_base_only() {
        let n = 64;
        let data = generate_cone(0.05, 0.1, n);
        assert_eq!(data.vertex_count() as u32, 4 * n + 3);
        assert_eq!(data.indices.len() as u32, 6 * n);

        let (_, max) = data.bounding_box().unwrap();
        assert!((max[1] - 0.05).abs() < 1e-6);
        for t in 0..data.triangle_count() {
            let n = triangle_normal(&data, t);
            let c = centroid(&data, t);
            assert!(dot(c, n) > 0.0);
        }
    }

    #[test]
    fn test_segments_are_clamped() {
        let data = generate_cylinder(1.0, 1.0, 1.0, 1);
        assert_eq!(data.vertex_count(), 6 * 3 + 4);
    }
}
