//! Model loading for the demo.
//!
//! glTF/GLB files are imported into a [`HierarchicalModel`]: every node
//! becomes a part whose offset is the node's local matrix, and all triangle
//! primitives of a node merge into one mesh. Nodes whose names match one of
//! the configured animated-part names spin independently at draw time.

pub mod procedural;

use glam::{Mat4, Vec3};
use shadebench_common::{DemoConfig, MeshData, MeshId};
use shadebench_render::{HierarchicalModel, Part, PartAnimation};
use std::path::{Path, PathBuf};

pub use procedural::{box_mesh, procedural_plane};

/// Errors from model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("missing position data for node {0}")]
    MissingPositions(String),
    #[error("model has no scene or the scene has no nodes")]
    EmptyScene,
}

/// How nodes are marked as independently animated.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Case-insensitive name fragments; a node matching any of them spins.
    pub animated_parts: Vec<String>,
    pub animation_axis: Vec3,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            animated_parts: vec!["propeller".to_string()],
            animation_axis: Vec3::Z,
        }
    }
}

impl From<&DemoConfig> for LoadOptions {
    fn from(config: &DemoConfig) -> Self {
        Self {
            animated_parts: config.animated_parts.clone(),
            animation_axis: config.animation_axis,
        }
    }
}

impl LoadOptions {
    fn is_animated(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.animated_parts
            .iter()
            .filter(|fragment| !fragment.is_empty())
            .any(|fragment| name.contains(&fragment.to_lowercase()))
    }
}

/// Load the configured model, or the built-in plane when none is configured.
pub fn load_configured(config: &DemoConfig) -> Result<HierarchicalModel, AssetError> {
    match &config.model {
        Some(path) => load_model(path, &LoadOptions::from(config)),
        None => {
            tracing::info!("no model configured, using built-in procedural plane");
            Ok(procedural_plane())
        }
    }
}

/// Import a glTF or GLB file.
pub fn load_model(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<HierarchicalModel, AssetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let (document, buffers, _images) = gltf::import(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string();
    let model = build_model(name, &document, &buffers, options)?;

    tracing::info!(
        path = %path.display(),
        parts = model.part_count(),
        meshes = model.meshes().len(),
        animated = model.animated_part_count(),
        "loaded model"
    );
    if model.animated_part_count() == 0 {
        tracing::warn!(
            patterns = ?options.animated_parts,
            "no node matched an animated part name; nothing will spin"
        );
    }
    Ok(model)
}

/// Import a glTF document held in memory (GLB or self-contained JSON).
pub fn load_model_from_slice(
    name: &str,
    data: &[u8],
    options: &LoadOptions,
) -> Result<HierarchicalModel, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(data)?;
    build_model(name.to_string(), &document, &buffers, options)
}

fn build_model(
    name: String,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    options: &LoadOptions,
) -> Result<HierarchicalModel, AssetError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::EmptyScene)?;

    let mut meshes = Vec::new();
    let mut roots = Vec::new();
    for node in scene.nodes() {
        roots.push(process_node(&node, buffers, options, false, &mut meshes)?);
    }

    let root = match roots.len() {
        0 => return Err(AssetError::EmptyScene),
        1 => roots.remove(0),
        _ => {
            let mut root = Part::new(scene.name().unwrap_or("root"));
            root.children = roots;
            root
        }
    };
    Ok(HierarchicalModel::new(name, meshes, root))
}

/// Convert a node and its children into parts, pushing meshes as they are found.
///
/// Descendants of an animated part already inherit its spin, so they are
/// never marked animated themselves.
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    options: &LoadOptions,
    ancestor_animated: bool,
    meshes: &mut Vec<MeshData>,
) -> Result<Part, AssetError> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));

    let mut part = Part::new(name.clone())
        .with_offset(Mat4::from_cols_array_2d(&node.transform().matrix()));
    let animated = !ancestor_animated && options.is_animated(&name);
    if animated {
        part = part.animated(PartAnimation::about(options.animation_axis));
    }

    if let Some(mesh) = node.mesh() {
        let mut data = MeshData::default();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(node = %name, mode = ?primitive.mode(), "skipping non-triangle primitive");
                continue;
            }
            data.append(extract_primitive(&primitive, buffers, &name)?);
        }
        if !data.is_empty() {
            part.mesh = Some(MeshId(meshes.len() as u32));
            meshes.push(data);
        }
    }

    for child in node.children() {
        part.children
            .push(process_node(
                &child,
                buffers,
                options,
                ancestor_animated || animated,
                meshes,
            )?);
    }
    Ok(part)
}

fn extract_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    node: &str,
) -> Result<MeshData, AssetError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b[..]));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| AssetError::MissingPositions(node.to_string()))?
        .map(Vec3::from)
        .collect();

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let normals: Option<Vec<Vec3>> = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from).collect());

    let mut data = MeshData {
        positions,
        normals: Vec::new(),
        indices,
    };
    match normals {
        Some(normals) if normals.len() == data.positions.len() => data.normals = normals,
        _ => data.generate_normals(),
    }
    Ok(data)
}

pub fn crate_info() -> &'static str {
    "shadebench-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle shared by a body node and a translated propeller child.
    fn write_gltf(dir: &Path) -> PathBuf {
        let mut bin = Vec::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]);
        std::fs::write(dir.join("tri.bin"), &bin).unwrap();

        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "Body", "mesh": 0, "children": [1] }},
    {{ "name": "Propeller_Front", "mesh": 0, "translation": [0.0, 0.0, 2.0] }}
  ],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}] }}],
  "buffers": [{{ "uri": "tri.bin", "byteLength": {len} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
            len = bin.len()
        );
        let path = dir.join("plane.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn loads_node_hierarchy() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gltf(dir.path());
        let model = load_model(&path, &LoadOptions::default()).unwrap();

        assert_eq!(model.name, "plane");
        assert_eq!(model.part_count(), 2);
        assert_eq!(model.animated_part_count(), 1);
        assert_eq!(model.meshes().len(), 2);

        let root = model.root();
        assert_eq!(root.name, "Body");
        assert!(root.animation.is_none());
        let prop = &root.children[0];
        assert!(prop.animation.is_some());
        assert_eq!(
            prop.offset.transform_point3(Vec3::ZERO),
            Vec3::new(0.0, 0.0, 2.0)
        );
    }

    #[test]
    fn generates_normals_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gltf(dir.path());
        let model = load_model(&path, &LoadOptions::default()).unwrap();
        let mesh = model.mesh(MeshId(0)).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.normals.len(), 3);
        assert!((mesh.normals[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn animated_names_are_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gltf(dir.path());
        let options = LoadOptions {
            animated_parts: vec!["BODY".into()],
            animation_axis: Vec3::Y,
        };
        let model = load_model(&path, &options).unwrap();
        assert_eq!(
            model.root().animation,
            Some(PartAnimation::about(Vec3::Y))
        );
        assert!(model.root().children[0].animation.is_none());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_model("/definitely/not/here.glb", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gltf");
        std::fs::write(&path, "this is not gltf").unwrap();
        let err = load_model(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }

    #[test]
    fn document_without_scene_is_empty() {
        let json = r#"{ "asset": { "version": "2.0" } }"#;
        let err =
            load_model_from_slice("empty", json.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, AssetError::EmptyScene));
    }

    #[test]
    fn configured_without_model_uses_procedural_plane() {
        let model = load_configured(&DemoConfig::default()).unwrap();
        assert_eq!(model.name, "procedural_plane");
        assert_eq!(model.animated_part_count(), 1);
    }

    #[test]
    fn matching_children_of_animated_part_do_not_spin_twice() {
        let json = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "Body", "children": [1] },
    { "name": "Propeller", "children": [2] },
    { "name": "Propeller_Blade", "translation": [1.0, 0.0, 0.0] }
  ]
}"#;
        let model =
            load_model_from_slice("plane", json.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(model.part_count(), 3);
        assert_eq!(model.animated_part_count(), 1);

        let transforms = model.world_transforms(Mat4::IDENTITY, 90.0);
        let (name, blade) = transforms[2];
        assert_eq!(name, "Propeller_Blade");
        let x_axis = blade.transform_vector3(Vec3::X);
        assert!((x_axis - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let options = LoadOptions {
            animated_parts: vec![String::new()],
            animation_axis: Vec3::Z,
        };
        assert!(!options.is_animated("anything"));
        assert!(LoadOptions::default().is_animated("Left_PROPELLER.001"));
    }
}
