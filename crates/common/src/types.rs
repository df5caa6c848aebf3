use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Lighting model evaluated by the fragment stage for one model instance.
///
/// The discriminant is the integer sent to the shader as `lightingID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LightingModel {
    Lambertian = 0,
    Phong = 1,
    CookTorrance = 2,
    Blinn = 3,
}

impl LightingModel {
    /// Draw order of the four instances: top-left, top-right, bottom-left, bottom-right.
    pub const ALL: [LightingModel; 4] = [
        LightingModel::Lambertian,
        LightingModel::Phong,
        LightingModel::CookTorrance,
        LightingModel::Blinn,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            LightingModel::Lambertian => "Lambertian",
            LightingModel::Phong => "Phong",
            LightingModel::CookTorrance => "Cook-Torrance",
            LightingModel::Blinn => "Blinn",
        }
    }
}

impl std::fmt::Display for LightingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Discrete camera movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Index of a mesh in a model's mesh table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(pub u32);

impl MeshId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Triangle mesh in model space. Opaque to the render core; only backends read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Area-weighted vertex normals accumulated from the triangle faces.
    pub fn generate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let (Some(pa), Some(pb), Some(pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let face = (*pb - *pa).cross(*pc - *pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighting_ids_match_draw_order() {
        let ids: Vec<i32> = LightingModel::ALL.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(LightingModel::from_id(2), Some(LightingModel::CookTorrance));
        assert_eq!(LightingModel::from_id(7), None);
    }

    #[test]
    fn append_rebases_indices() {
        let tri = MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            indices: vec![0, 1, 2],
        };
        let mut mesh = tri.clone();
        mesh.append(tri);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn generated_normals_face_out_of_ccw_triangle() {
        let mut mesh = MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: Vec::new(),
            indices: vec![0, 1, 2],
        };
        mesh.generate_normals();
        assert_eq!(mesh.normals.len(), 3);
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }
}
