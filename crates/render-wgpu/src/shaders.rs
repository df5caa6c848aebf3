/// WGSL shader drawing model parts under one of four lighting models.
///
/// `lighting_id` selects the model per instance: 0 Lambertian, 1 Phong,
/// 2 Cook-Torrance, 3 Blinn. `material` packs roughness, specular exponent
/// and Fresnel reflectance.
pub const LIGHTING_SHADER: &str = r#"
const PI: f32 = 3.14159265;

struct Globals {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    view_pos: vec4<f32>,
    ambient: vec4<f32>,
    light_colour: vec4<f32>,
    object_colour: vec4<f32>,
    material: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) normal_0: vec4<f32>,
    @location(7) normal_1: vec4<f32>,
    @location(8) normal_2: vec4<f32>,
    @location(9) light_pos: vec4<f32>,
    @location(10) lighting_id: u32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) light_pos: vec3<f32>,
    @location(3) @interpolate(flat) lighting_id: u32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let normal_matrix = mat3x3<f32>(
        instance.normal_0.xyz,
        instance.normal_1.xyz,
        instance.normal_2.xyz,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = globals.projection * globals.view * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(normal_matrix * vertex.normal);
    out.light_pos = instance.light_pos.xyz;
    out.lighting_id = instance.lighting_id;
    return out;
}

fn phong_specular(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>) -> f32 {
    let r = reflect(-l, n);
    return pow(max(dot(r, v), 0.0), globals.material.y);
}

fn blinn_specular(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>) -> f32 {
    let h = normalize(l + v);
    return pow(max(dot(n, h), 0.0), globals.material.y);
}

// Beckmann distribution, Schlick Fresnel, Cook-Torrance geometric attenuation.
fn cook_torrance_specular(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>) -> f32 {
    let h = normalize(l + v);
    let n_dot_l = max(dot(n, l), 1e-4);
    let n_dot_v = max(dot(n, v), 1e-4);
    let n_dot_h = max(dot(n, h), 1e-4);
    let v_dot_h = max(dot(v, h), 1e-4);

    let m = max(globals.material.x, 0.01);
    let m2 = m * m;
    let nh2 = n_dot_h * n_dot_h;
    let d = exp((nh2 - 1.0) / (m2 * nh2)) / (PI * m2 * nh2 * nh2);

    let f0 = globals.material.z;
    let f = f0 + (1.0 - f0) * pow(1.0 - v_dot_h, 5.0);

    let g = min(1.0, min(2.0 * n_dot_h * n_dot_v / v_dot_h, 2.0 * n_dot_h * n_dot_l / v_dot_h));

    return d * f * g / (4.0 * n_dot_v * n_dot_l);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let l = normalize(in.light_pos - in.world_pos);
    let v = normalize(globals.view_pos.xyz - in.world_pos);
    let n_dot_l = max(dot(n, l), 0.0);

    let light = globals.light_colour.rgb;
    let object = globals.object_colour.rgb;
    let diffuse = n_dot_l * light;

    var specular = 0.0;
    if n_dot_l > 0.0 {
        switch in.lighting_id {
            case 1u: {
                specular = phong_specular(n, l, v);
            }
            case 2u: {
                specular = cook_torrance_specular(n, l, v) * n_dot_l;
            }
            case 3u: {
                specular = blinn_specular(n, l, v);
            }
            default: {}
        }
    }

    let colour = (globals.ambient.rgb + diffuse) * object + specular * light;
    return vec4<f32>(colour, 1.0);
}
"#;
