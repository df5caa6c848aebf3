use crate::shader::{ShaderProgram, uniforms};
use glam::{Mat4, Vec3};
use shadebench_common::{MeshData, MeshId};

/// Marks a part as spinning on its own, independent of its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartAnimation {
    /// Unit axis in the part's local space.
    pub axis: Vec3,
}

impl PartAnimation {
    pub fn about(axis: Vec3) -> Self {
        Self {
            axis: axis.try_normalize().unwrap_or(Vec3::Z),
        }
    }

    pub fn rotation(&self, angle_deg: f32) -> Mat4 {
        Mat4::from_axis_angle(self.axis, angle_deg.to_radians())
    }
}

/// One rigid part of a [`HierarchicalModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub mesh: Option<MeshId>,
    /// Transform relative to the parent part.
    pub offset: Mat4,
    pub animation: Option<PartAnimation>,
    pub children: Vec<Part>,
}

impl Part {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            offset: Mat4::IDENTITY,
            animation: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_offset(mut self, offset: Mat4) -> Self {
        self.offset = offset;
        self
    }

    pub fn animated(mut self, animation: PartAnimation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_child(mut self, child: Part) -> Self {
        self.children.push(child);
        self
    }

    /// `parent × offset`, times the animated rotation for animated parts.
    pub fn world_transform(&self, parent: Mat4, animated_angle: f32) -> Mat4 {
        let local = parent * self.offset;
        match &self.animation {
            Some(animation) => local * animation.rotation(animated_angle),
            None => local,
        }
    }

    fn visit<'a>(&'a self, parent: Mat4, angle: f32, f: &mut impl FnMut(&'a Part, Mat4)) {
        let world = self.world_transform(parent, angle);
        f(self, world);
        for child in &self.children {
            child.visit(world, angle, f);
        }
    }
}

/// Immutable mesh table plus the part tree that places the meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalModel {
    pub name: String,
    meshes: Vec<MeshData>,
    root: Part,
}

impl HierarchicalModel {
    pub fn new(name: impl Into<String>, meshes: Vec<MeshData>, root: Part) -> Self {
        Self {
            name: name.into(),
            meshes,
            root,
        }
    }

    pub fn root(&self) -> &Part {
        &self.root
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.index())
    }

    pub fn part_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(Mat4::IDENTITY, 0.0, &mut |_, _| count += 1);
        count
    }

    pub fn animated_part_count(&self) -> usize {
        let mut count = 0;
        self.root.visit(Mat4::IDENTITY, 0.0, &mut |part, _| {
            if part.animation.is_some() {
                count += 1;
            }
        });
        count
    }

    /// World transform of every part in draw order.
    pub fn world_transforms(&self, parent: Mat4, animated_angle: f32) -> Vec<(&str, Mat4)> {
        let mut out = Vec::new();
        self.root.visit(parent, animated_angle, &mut |part, world| {
            out.push((part.name.as_str(), world));
        });
        out
    }

    /// Draw every part, root first, children after in stored order.
    ///
    /// Each part's world transform is written to the `model` uniform before
    /// its mesh is drawn. `animated_angle` is in degrees and only affects
    /// animated parts.
    pub fn draw_hierarchy<S: ShaderProgram + ?Sized>(
        &self,
        shader: &mut S,
        parent: Mat4,
        animated_angle: f32,
    ) {
        self.root.visit(parent, animated_angle, &mut |part, world| {
            shader.set_mat4(uniforms::MODEL, world);
            if let Some(mesh) = part.mesh {
                shader.draw_mesh(mesh);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::FrameRecorder;

    fn approx_eq(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    fn plane() -> HierarchicalModel {
        let propeller = Part::new("propeller")
            .with_mesh(MeshId(1))
            .with_offset(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)))
            .animated(PartAnimation::about(Vec3::Z));
        let wing = Part::new("wing")
            .with_mesh(MeshId(2))
            .with_offset(Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0)));
        let root = Part::new("body")
            .with_mesh(MeshId(0))
            .with_child(propeller)
            .with_child(wing);
        HierarchicalModel::new("plane", vec![MeshData::default(); 3], root)
    }

    #[test]
    fn animated_part_composes_parent_offset_rotation() {
        let parent = Mat4::from_translation(Vec3::new(3.0, -1.0, 0.0))
            * Mat4::from_rotation_y(0.7);
        let offset = Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0));
        let part = Part::new("propeller")
            .with_offset(offset)
            .animated(PartAnimation::about(Vec3::Z));
        let expected = parent * offset * Mat4::from_rotation_z(90f32.to_radians());
        assert!(approx_eq(part.world_transform(parent, 90.0), expected));
    }

    #[test]
    fn static_part_ignores_animated_angle() {
        let parent = Mat4::from_rotation_x(0.3);
        let offset = Mat4::from_translation(Vec3::ONE);
        let part = Part::new("wing").with_offset(offset);
        for angle in [0.0, 45.0, 123.0, 359.0] {
            assert_eq!(part.world_transform(parent, angle), parent * offset);
        }
    }

    #[test]
    fn children_inherit_animated_parent() {
        let spinner = Part::new("hub")
            .animated(PartAnimation::about(Vec3::Y))
            .with_child(Part::new("blade").with_offset(Mat4::from_translation(Vec3::X)));
        let model = HierarchicalModel::new("m", Vec::new(), spinner);
        let transforms = model.world_transforms(Mat4::IDENTITY, 180.0);
        let blade_origin = transforms[1].1.transform_point3(Vec3::ZERO);
        assert!((blade_origin - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn draws_in_preorder_with_world_transforms() {
        let model = plane();
        let parent = Mat4::from_translation(Vec3::new(-3.5, 2.0, 0.0));
        let mut rec = FrameRecorder::new();
        rec.use_program();
        model.draw_hierarchy(&mut rec, parent, 30.0);
        let frame = rec.finish();

        let meshes: Vec<MeshId> = frame.draws.iter().map(|d| d.mesh).collect();
        assert_eq!(meshes, vec![MeshId(0), MeshId(1), MeshId(2)]);

        let expected = model.world_transforms(parent, 30.0);
        for (draw, (_, world)) in frame.draws.iter().zip(expected) {
            assert!(approx_eq(draw.model, world));
        }
        assert!(approx_eq(frame.draws[0].model, parent));
    }

    #[test]
    fn meshless_parts_are_traversed_but_not_drawn() {
        let root = Part::new("root")
            .with_offset(Mat4::from_translation(Vec3::Y))
            .with_child(Part::new("leaf").with_mesh(MeshId(0)));
        let model = HierarchicalModel::new("m", vec![MeshData::default()], root);
        let mut rec = FrameRecorder::new();
        rec.use_program();
        model.draw_hierarchy(&mut rec, Mat4::IDENTITY, 0.0);
        let frame = rec.finish();
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(frame.draws[0].model, Mat4::from_translation(Vec3::Y));
    }

    #[test]
    fn counts_parts() {
        let model = plane();
        assert_eq!(model.part_count(), 3);
        assert_eq!(model.animated_part_count(), 1);
        assert!(model.mesh(MeshId(2)).is_some());
        assert!(model.mesh(MeshId(3)).is_none());
    }
}
