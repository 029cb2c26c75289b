//! A model made of one or more named surfaces sharing one appearance.

use crate::mesh::{MeshData, MeshVertex};

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceData {
    pub name: String,
    pub mesh: MeshData,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelData {
    pub surfaces: Vec<SurfaceData>,
}

impl ModelData {
    pub fn new(surfaces: Vec<SurfaceData>) -> Self {
        Self { surfaces }
    }

    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.mesh.indices.len() / 3).sum()
    }

    /// Bounds over every surface.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        self.surfaces
            .iter()
            .filter_map(|s| s.mesh.bounds())
            .reduce(|(lo, hi), (l, h)| {
                (
                    [lo[0].min(l[0]), lo[1].min(l[1]), lo[2].min(l[2])],
                    [hi[0].max(h[0]), hi[1].max(h[1]), hi[2].max(h[2])],
                )
            })
    }

    /// Stand-in shown when the model file can't be loaded: a shoe-box sized
    /// block with one face per surface so per-surface binding stays visible.
    pub fn placeholder() -> Self {
        let (hx, hy, hz) = (1.0f32, 0.45f32, 0.4f32);
        // (name, normal, u axis, v axis)
        let faces: [(&str, [f32; 3], [f32; 3], [f32; 3]); 6] = [
            ("front", [0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ("back", [0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ("top", [0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ("bottom", [0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ("left", [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ("right", [1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ];
        let half = [hx, hy, hz];

        let surfaces = faces
            .iter()
            .map(|&(name, n, u, v)| {
                let corner = |su: f32, sv: f32| -> [f32; 3] {
                    let mut p = [0.0; 3];
                    for i in 0..3 {
                        p[i] = (n[i] + u[i] * su + v[i] * sv) * half[i];
                    }
                    p
                };
                let vertices = vec![
                    MeshVertex::new(corner(-1.0, -1.0), n, [0.0, 1.0]),
                    MeshVertex::new(corner(1.0, -1.0), n, [1.0, 1.0]),
                    MeshVertex::new(corner(1.0, 1.0), n, [1.0, 0.0]),
                    MeshVertex::new(corner(-1.0, 1.0), n, [0.0, 0.0]),
                ];
                SurfaceData {
                    name: name.to_string(),
                    mesh: MeshData::new(vertices, vec![0, 1, 2, 0, 2, 3]),
                }
            })
            .collect();

        Self::new(surfaces)
    }
}
