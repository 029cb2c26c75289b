//! egui side of the selection panel and the UI render pass.

use std::time::Instant;

use corelib::selection::SelectionPanel;
use corelib::{Appearance, ColorValue, LoadStatus};

/// What the user clicked this frame. Indices point into the catalogs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    Texture(usize),
    Color(usize),
    Reset,
}

fn swatch(color: ColorValue) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

/// Dark text on light swatches, light text on dark ones.
fn label_color(color: ColorValue) -> egui::Color32 {
    let luma = 0.299 * color.r as f32 + 0.587 * color.g as f32 + 0.114 * color.b as f32;
    if luma > 140.0 {
        egui::Color32::BLACK
    } else {
        egui::Color32::WHITE
    }
}

pub fn draw_panel<I>(
    ctx: &egui::Context,
    panel: &SelectionPanel,
    appearance: &Appearance<I>,
    status: LoadStatus,
) -> Option<PanelAction> {
    let mut action = None;

    egui::SidePanel::right("materials")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Textures");
            for (i, option) in panel.catalog().textures().iter().enumerate() {
                let selected = panel.is_texture_highlighted(i, appearance);
                if ui
                    .selectable_label(selected, option.display_name.as_str())
                    .clicked()
                {
                    action = Some(PanelAction::Texture(i));
                }
            }

            ui.separator();
            ui.heading("Colors");
            ui.horizontal_wrapped(|ui| {
                for (i, option) in panel.catalog().colors().iter().enumerate() {
                    let selected = panel.is_color_highlighted(i, appearance);
                    let text = egui::RichText::new(&option.display_name)
                        .color(label_color(option.color_value));
                    let button = egui::Button::new(text)
                        .fill(swatch(option.color_value))
                        .selected(selected);
                    if ui
                        .add(button)
                        .on_hover_text(option.color_value.to_string())
                        .clicked()
                    {
                        action = Some(PanelAction::Color(i));
                    }
                }
            });

            ui.separator();
            if SelectionPanel::loading_indicator_visible(status) {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading texture…");
                });
            } else if status == LoadStatus::Failed {
                ui.colored_label(
                    egui::Color32::from_rgb(230, 120, 90),
                    "Texture unavailable",
                );
            }

            if ui.button("Reset").clicked() {
                action = Some(PanelAction::Reset);
            }
        });

    action
}

pub fn draw_fps(ctx: &egui::Context, fps: f32) {
    egui::Area::new(egui::Id::new("fps"))
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {fps:.1}"));
        });
}

/// Averages frame rate over half-second windows.
pub struct FpsCounter {
    frames: u32,
    since: Instant,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn tick(&mut self) -> f32 {
        self.frames += 1;
        let elapsed = self.since.elapsed().as_secs_f32();
        if elapsed >= 0.5 {
            self.fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.since = Instant::now();
        }
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the egui paint jobs on top of the already rendered scene.
pub fn render_egui(
    renderer: &egui_wgpu::Renderer,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    paint_jobs: &[egui::ClippedPrimitive],
    screen_descriptor: &egui_wgpu::ScreenDescriptor,
) {
    let mut render_pass = encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
        .forget_lifetime();

    renderer.render(&mut render_pass, paint_jobs, screen_descriptor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_contrasts_with_swatch() {
        assert_eq!(label_color(ColorValue::from_hex(0xFFFFFF)), egui::Color32::BLACK);
        assert_eq!(label_color(ColorValue::from_hex(0x000000)), egui::Color32::WHITE);
        assert_eq!(label_color(ColorValue::from_hex(0x0000FF)), egui::Color32::WHITE);
    }

    #[test]
    fn panel_reports_no_action_without_input() {
        let ctx = egui::Context::default();
        let panel = SelectionPanel::default();
        let appearance: Appearance<()> = Appearance::Tinted(ColorValue::from_hex(0xFF0000));
        let mut action = Some(PanelAction::Reset);
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            action = draw_panel(ctx, &panel, &appearance, LoadStatus::Loading);
        });
        assert_eq!(action, None);
    }
}
