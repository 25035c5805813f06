//! Egui control panel for the galaxy parameters.
//!
//! Edits go into a draft. The panel only reports a change once the edit is
//! finished (slider released, color popup closed, text entry done), so a drag
//! across a slider regenerates once rather than every frame.

use glam::Vec3;

use crate::params::{
    ParameterSet, BRANCHES_RANGE, COUNT_RANGE, RADIUS_RANGE, RANDOMNESS_RANGE, RAND_POWER_RANGE,
    SIZE_RANGE, SPIN_RANGE,
};
use crate::scene::SceneEvent;

/// Side panel holding the editable parameter draft.
pub struct ControlPanel {
    draft: ParameterSet,
    pending: bool,
}

impl ControlPanel {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            draft: params.clamped(),
            pending: false,
        }
    }

    /// Parameters as currently shown, including unfinished edits.
    pub fn draft(&self) -> &ParameterSet {
        &self.draft
    }

    /// Draw the panel. Returns an event when an edit has just finished.
    pub fn show(&mut self, ctx: &egui::Context, point_count: u32, fps: f32) -> Option<SceneEvent> {
        let mut force = false;

        egui::Window::new("Galaxy")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                let d = &mut self.draft;
                let mut changed = false;

                changed |= ui
                    .add(
                        egui::Slider::new(&mut d.count, COUNT_RANGE)
                            .text("count")
                            .step_by(100.0)
                            .logarithmic(true),
                    )
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut d.size, SIZE_RANGE).text("size").step_by(0.001))
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut d.radius, RADIUS_RANGE)
                            .text("radius")
                            .step_by(0.01),
                    )
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut d.branches, BRANCHES_RANGE).text("branches"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut d.spin, SPIN_RANGE).text("spin").step_by(0.001))
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut d.randomness, RANDOMNESS_RANGE)
                            .text("randomness")
                            .step_by(0.001),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut d.rand_power, RAND_POWER_RANGE)
                            .text("randPower")
                            .step_by(0.001),
                    )
                    .changed();

                ui.separator();
                changed |= color_row(ui, "insideColor", &mut d.inside_color);
                changed |= color_row(ui, "outsideColor", &mut d.outside_color);

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Regenerate").clicked() {
                        force = true;
                    }
                    if ui.button("Reset").clicked() {
                        *d = ParameterSet::default();
                        force = true;
                    }
                });

                ui.separator();
                ui.label(format!("points: {point_count}"));
                ui.label(format!("fps: {fps:.0}"));

                if changed {
                    self.pending = true;
                }
            });

        if force {
            self.pending = true;
            return self.commit(false);
        }
        self.commit(is_interacting(ctx))
    }

    /// Emit the draft if it has unreported edits and nothing is held.
    fn commit(&mut self, interacting: bool) -> Option<SceneEvent> {
        if !self.pending || interacting {
            return None;
        }
        self.pending = false;
        self.draft = self.draft.clamped();
        Some(SceneEvent::ParameterChanged(self.draft.clone()))
    }
}

/// An edit is still in progress while a button is held, a popup (color
/// picker) is open, or a text field has focus.
fn is_interacting(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.pointer.any_down())
        || ctx.memory(|m| m.any_popup_open())
        || ctx.wants_keyboard_input()
}

fn color_row(ui: &mut egui::Ui, label: &str, color: &mut Vec3) -> bool {
    let mut srgb = to_srgb_u8(*color);
    let changed = ui
        .horizontal(|ui| {
            let response = egui::color_picker::color_edit_button_srgb(ui, &mut srgb);
            ui.label(label);
            response.changed()
        })
        .inner;
    if changed {
        *color = from_srgb_u8(srgb);
    }
    changed
}

fn to_srgb_u8(color: Vec3) -> [u8; 3] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8]
}

fn from_srgb_u8(c: [u8; 3]) -> Vec3 {
    Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::rgb_from_hex;

    #[test]
    fn test_no_event_without_edit() {
        let mut panel = ControlPanel::new(ParameterSet::default());
        assert_eq!(panel.commit(false), None);
    }

    #[test]
    fn test_commit_waits_for_interaction_end() {
        let mut panel = ControlPanel::new(ParameterSet::default());
        panel.draft.spin = 2.5;
        panel.pending = true;

        assert_eq!(panel.commit(true), None);
        assert_eq!(panel.commit(true), None);

        let Some(SceneEvent::ParameterChanged(params)) = panel.commit(false) else {
            panic!("expected a parameter change");
        };
        assert_eq!(params.spin, 2.5);

        // Reported once only.
        assert_eq!(panel.commit(false), None);
    }

    #[test]
    fn test_commit_clamps_draft() {
        let mut panel = ControlPanel::new(ParameterSet::default());
        panel.draft.branches = 50;
        panel.pending = true;

        let Some(SceneEvent::ParameterChanged(params)) = panel.commit(false) else {
            panic!("expected a parameter change");
        };
        assert_eq!(params.branches, *BRANCHES_RANGE.end());
        assert_eq!(panel.draft().branches, *BRANCHES_RANGE.end());
    }

    #[test]
    fn test_idle_frame_emits_nothing() {
        let ctx = egui::Context::default();
        let mut panel = ControlPanel::new(ParameterSet::default());

        let mut event = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            event = panel.show(ctx, 100_000, 60.0);
        });
        assert_eq!(event, None);
    }

    fn run_frame(
        ctx: &egui::Context,
        panel: &mut ControlPanel,
        events: Vec<egui::Event>,
    ) -> Option<SceneEvent> {
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(1280.0, 720.0),
            )),
            events,
            ..Default::default()
        };
        let mut event = None;
        let _ = ctx.run(input, |ctx| {
            event = panel.show(ctx, 0, 0.0);
        });
        event
    }

    fn button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_held_pointer_defers_commit_until_release() {
        let ctx = egui::Context::default();
        let mut panel = ControlPanel::new(ParameterSet::default());
        assert_eq!(run_frame(&ctx, &mut panel, vec![]), None);

        // An edit is in progress while the button is down.
        panel.draft.spin = 1.5;
        panel.pending = true;

        let start = egui::pos2(1000.0, 600.0);
        let press = vec![egui::Event::PointerMoved(start), button(start, true)];
        assert_eq!(run_frame(&ctx, &mut panel, press), None);

        let end = egui::pos2(1040.0, 600.0);
        let drag = vec![egui::Event::PointerMoved(end)];
        assert_eq!(run_frame(&ctx, &mut panel, drag), None);

        let release = vec![button(end, false)];
        let Some(SceneEvent::ParameterChanged(params)) = run_frame(&ctx, &mut panel, release)
        else {
            panic!("release should report the edit");
        };
        assert_eq!(params.spin, 1.5);

        assert_eq!(run_frame(&ctx, &mut panel, vec![]), None);
    }

    #[test]
    fn test_srgb_conversion_preserves_hex() {
        for hex in [0xff5588, 0x1b3984, 0x000000, 0xffffff] {
            let color = rgb_from_hex(hex);
            assert_eq!(from_srgb_u8(to_srgb_u8(color)), color);
        }
    }
}
