use glam::{Mat4, Vec3};
use shadebench_common::{MeshData, MeshId};
use shadebench_render::{HierarchicalModel, Part, PartAnimation};

/// Axis-aligned box centred on the origin, one quad per face with flat normals.
pub fn box_mesh(half_extents: Vec3) -> MeshData {
    let Vec3 { x, y, z } = half_extents;
    #[rustfmt::skip]
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        // +Z face
        (Vec3::Z, [Vec3::new(-x, -y, z), Vec3::new(x, -y, z), Vec3::new(x, y, z), Vec3::new(-x, y, z)]),
        // -Z face
        (Vec3::NEG_Z, [Vec3::new(x, -y, -z), Vec3::new(-x, -y, -z), Vec3::new(-x, y, -z), Vec3::new(x, y, -z)]),
        // +X face
        (Vec3::X, [Vec3::new(x, -y, z), Vec3::new(x, -y, -z), Vec3::new(x, y, -z), Vec3::new(x, y, z)]),
        // -X face
        (Vec3::NEG_X, [Vec3::new(-x, -y, -z), Vec3::new(-x, -y, z), Vec3::new(-x, y, z), Vec3::new(-x, y, -z)]),
        // +Y face
        (Vec3::Y, [Vec3::new(-x, y, z), Vec3::new(x, y, z), Vec3::new(x, y, -z), Vec3::new(-x, y, -z)]),
        // -Y face
        (Vec3::NEG_Y, [Vec3::new(-x, -y, -z), Vec3::new(x, -y, -z), Vec3::new(x, -y, z), Vec3::new(-x, -y, z)]),
    ];

    let mut mesh = MeshData::default();
    for (normal, corners) in faces {
        let base = mesh.positions.len() as u32;
        mesh.positions.extend(corners);
        mesh.normals.extend([normal; 4]);
        mesh.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

/// Built-in propeller plane, nose along +Z, used when no model file is configured.
///
/// The propeller spins about the nose axis; every other part is rigid.
pub fn procedural_plane() -> HierarchicalModel {
    let meshes = vec![
        box_mesh(Vec3::new(0.35, 0.35, 1.6)),  // fuselage
        box_mesh(Vec3::new(2.4, 0.06, 0.45)),  // wings
        box_mesh(Vec3::new(0.9, 0.05, 0.25)),  // tailplane
        box_mesh(Vec3::new(0.05, 0.4, 0.25)),  // fin
        box_mesh(Vec3::new(0.12, 0.12, 0.1)),  // hub
        box_mesh(Vec3::new(0.9, 0.08, 0.025)), // blades
    ];

    let propeller = Part::new("propeller")
        .with_mesh(MeshId(4))
        .with_offset(Mat4::from_translation(Vec3::new(0.0, 0.0, 1.7)))
        .animated(PartAnimation::about(Vec3::Z))
        .with_child(
            Part::new("propeller_blades")
                .with_mesh(MeshId(5))
                .with_offset(Mat4::from_translation(Vec3::new(0.0, 0.0, 0.05))),
        );

    let tail = Part::new("tailplane")
        .with_mesh(MeshId(2))
        .with_offset(Mat4::from_translation(Vec3::new(0.0, 0.15, -1.4)))
        .with_child(
            Part::new("fin")
                .with_mesh(MeshId(3))
                .with_offset(Mat4::from_translation(Vec3::new(0.0, 0.4, 0.0))),
        );

    let root = Part::new("fuselage")
        .with_mesh(MeshId(0))
        .with_child(
            Part::new("wings")
                .with_mesh(MeshId(1))
                .with_offset(Mat4::from_translation(Vec3::new(0.0, 0.05, 0.3))),
        )
        .with_child(tail)
        .with_child(propeller);

    HierarchicalModel::new("procedural_plane", meshes, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_24_vertices_and_12_triangles() {
        let mesh = box_mesh(Vec3::ONE);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.normals.len(), 24);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn box_faces_wind_counter_clockwise_outward() {
        let mesh = box_mesh(Vec3::new(1.0, 2.0, 3.0));
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.positions[i as usize]);
            let face = (b - a).cross(c - a).normalize();
            assert!((face - mesh.normals[tri[0] as usize]).length() < 1e-5);
        }
    }

    #[test]
    fn plane_has_one_spinning_subtree() {
        let model = procedural_plane();
        assert_eq!(model.part_count(), 6);
        assert_eq!(model.animated_part_count(), 1);
        assert_eq!(model.meshes().len(), 6);

        let names: Vec<&str> = model
            .world_transforms(Mat4::IDENTITY, 0.0)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec![
                "fuselage",
                "wings",
                "tailplane",
                "fin",
                "propeller",
                "propeller_blades"
            ]
        );
    }

    #[test]
    fn blades_follow_propeller_spin() {
        let model = procedural_plane();
        let at = |angle: f32| {
            let transforms = model.world_transforms(Mat4::IDENTITY, angle);
            transforms[5].1.transform_point3(Vec3::X)
        };
        let rest = at(0.0);
        let quarter = at(90.0);
        assert!((rest - Vec3::new(1.0, 0.0, 1.75)).length() < 1e-5);
        assert!((quarter - Vec3::new(0.0, 1.0, 1.75)).length() < 1e-5);
    }
}
