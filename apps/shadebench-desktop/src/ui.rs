use egui::Context as EguiContext;
use glam::Vec3;
use shadebench_common::params::{
    AMBIENT_RANGE, FRESNEL_RANGE, LIGHT_OFFSET_RANGE, ROUGHNESS_RANGE, SPECULAR_EXPONENT_RANGE,
};
use shadebench_common::{LightingModel, RenderParams};
use shadebench_render::RenderLoop;

const QUADRANTS: [&str; 4] = ["top left", "top right", "bottom left", "bottom right"];

/// Shader parameter panel. Edits land in `render_loop.params` and take
/// effect on the next frame.
pub fn draw_panel(
    ctx: &EguiContext,
    visible: bool,
    render_loop: &mut RenderLoop,
    defaults: &RenderParams,
    model_name: &str,
) {
    if !visible {
        return;
    }

    egui::Window::new("Shader parameters")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            let params = &mut render_loop.params;
            ui.add(
                egui::Slider::new(&mut params.specular_exponent, SPECULAR_EXPONENT_RANGE)
                    .text("Specular exponent"),
            );
            ui.add(egui::Slider::new(&mut params.roughness, ROUGHNESS_RANGE).text("Roughness"));
            ui.add(
                egui::Slider::new(&mut params.fresnel_reflectance, FRESNEL_RANGE)
                    .text("Fresnel reflectance"),
            );
            ui.add(egui::Slider::new(&mut params.ambient, AMBIENT_RANGE).text("Ambient"));
            ui.add(
                egui::Slider::new(&mut params.light_offset, LIGHT_OFFSET_RANGE)
                    .text("Light offset"),
            );

            ui.horizontal(|ui| {
                colour_edit(ui, "Light", &mut params.light_colour);
                colour_edit(ui, "Object", &mut params.object_colour);
            });

            if ui.button("Reset").clicked() {
                *params = *defaults;
                tracing::debug!("shader parameters reset");
            }

            ui.separator();
            for (model, quadrant) in LightingModel::ALL.iter().zip(QUADRANTS) {
                ui.label(format!("{quadrant}: {model}"));
            }

            ui.separator();
            let camera = &render_loop.camera;
            ui.label(format!("Model: {model_name}"));
            ui.label(format!(
                "Camera: ({:.1}, {:.1}, {:.1})  yaw {:.0}  pitch {:.0}  fov {:.0}",
                camera.position.x,
                camera.position.y,
                camera.position.z,
                camera.yaw(),
                camera.pitch(),
                camera.zoom()
            ));
            let dt = render_loop.clock().delta();
            if dt > 0.0 {
                ui.label(format!("{:.0} fps ({:.2} ms)", 1.0 / dt, dt * 1000.0));
            }
            ui.small("WASD: move | Q/E: down/up | Esc: quit | F1: panel");
        });
}

fn colour_edit(ui: &mut egui::Ui, label: &str, colour: &mut Vec3) {
    let mut rgb = colour.to_array();
    ui.label(label);
    if ui.color_edit_button_rgb(&mut rgb).changed() {
        *colour = Vec3::from_array(rgb);
    }
}
