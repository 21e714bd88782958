//! Subdivided icosahedron, the base surface of the blob planet.
//!
//! Each of the 20 faces is split into `(detail + 1)²` triangles and every vertex is
//! pushed out to the sphere. Triangles do not share vertices, matching a flat
//! non-indexed layout; indices are sequential.

use glam::Vec3;

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub positions: Vec<Vec3>,
    /// Unit outward normals, one per position.
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Build a sphere of `radius` from an icosahedron subdivided `detail` times per edge.
pub fn icosphere(radius: f32, detail: u32) -> SphereMesh {
    let corners = icosahedron_vertices();
    let cols = detail as usize + 1;
    let mut positions = Vec::with_capacity(20 * cols * cols * 3);

    for face in ICOSAHEDRON_FACES {
        let (a, b, c) = (corners[face[0]], corners[face[1]], corners[face[2]]);

        // Grid of points across the face; row i has cols - i + 1 entries.
        let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let f = i as f32 / cols as f32;
            let aj = a.lerp(c, f);
            let bj = b.lerp(c, f);
            let rows = cols - i;
            let row = (0..=rows)
                .map(|j| {
                    if rows == 0 {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    }
                })
                .collect();
            grid.push(row);
        }

        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                if j % 2 == 0 {
                    positions.extend([grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
                } else {
                    positions.extend([grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
                }
            }
        }
    }

    let normals: Vec<Vec3> = positions.iter().map(|p| p.normalize()).collect();
    let positions = normals.iter().map(|n| *n * radius).collect();
    let indices = (0..normals.len() as u32).collect();

    SphereMesh {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_count_grows_with_detail() {
        assert_eq!(icosphere(1.0, 0).triangle_count(), 20);
        assert_eq!(icosphere(1.0, 1).triangle_count(), 80);
        assert_eq!(icosphere(8.0, 4).triangle_count(), 500);
    }

    #[test]
    fn every_vertex_sits_on_the_sphere() {
        let sphere = icosphere(8.0, 4);
        for (p, n) in sphere.positions.iter().zip(&sphere.normals) {
            assert!((p.length() - 8.0).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((*p / 8.0).abs_diff_eq(*n, 1e-5));
        }
    }

    #[test]
    fn faces_wind_outwards() {
        let sphere = icosphere(1.0, 2);
        for tri in sphere.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| sphere.positions[tri[i] as usize]);
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }
}
