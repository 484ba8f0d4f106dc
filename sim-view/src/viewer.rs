//! Interactive viewer for the particle simulation built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] and its
//! editable [`Config`] and implements [`eframe::App`] to render and
//! control the simulation through an egui UI. The simulation itself is
//! only ever read from here, except for stepping and click spawning.

use crate::preset::{self, BACKGROUND, BLOB_INNER, BLOB_STROKE, DOT, DOT_FILL};
use eframe::App;
use glam::Vec2;
use particle_sim_core::{
    config::Config,
    error::SimError,
    grid::BucketOffsetPolicy,
    scene::{self, BlobSpec},
    simulation::Simulation,
    types::Color,
};
use rand::rng;
use std::time::Instant;

/// What a click in the central panel spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnTool {
    Blob,
    Dot,
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render outlines, springs and dots.
///
/// ### Fields
/// - `sim` - The running simulation.
/// - `cfg` - Config draft edited in the side panel; applied on reset.
/// - `rng` - Random number generator used for scene building and spawning.
/// - `tool` - Current click tool.
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time between the last two steps (for display only).
/// - `last_step_cost` - Wall time spent inside the last step (seconds).
pub struct Viewer {
    sim: Simulation,
    cfg: Config,

    rng: rand::rngs::ThreadRng,
    tool: SpawnTool,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
    last_step_cost: f64,
}

fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

impl Viewer {
    /// Creates a viewer running the default scene with [`Config::default`].
    ///
    /// ### Returns
    /// The viewer, or the [`SimError`] raised while building the scene.
    pub fn new() -> Result<Self, SimError> {
        let mut rng = rng();
        let cfg = Config::default();
        let sim = preset::build(cfg, &mut rng)?;

        Ok(Self {
            sim,
            cfg,
            rng,
            tool: SpawnTool::Blob,
            running: true,
            zoom: 0.6,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
            last_step_cost: 0.0,
        })
    }

    /// Rebuilds the default scene from the current config draft.
    ///
    /// If the draft is invalid the old simulation is kept and a warning is
    /// logged. Auto-running is stopped either way.
    fn reset(&mut self) {
        match preset::build(self.cfg, &mut self.rng) {
            Ok(sim) => self.sim = sim,
            Err(err) => log::warn!("keeping current scene, config rejected: {err}"),
        }
        self.running = false;
    }

    /// Removes every particle, spring and blob; interactions stay
    /// registered so spawned content still behaves.
    fn clear(&mut self) {
        self.sim.clear();
    }

    /// Advances the simulation by a single tick and records its cost.
    fn step_once(&mut self) {
        let started = Instant::now();
        self.sim.step();
        self.last_step_cost = started.elapsed().as_secs_f64();
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The world's center is mapped to the center of `rect`, scaled by
    /// `zoom` and offset by `pan`. World y grows downwards, like the screen.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let rel = (p - self.sim.config().world_size / 2.0) * self.zoom;
        egui::pos2(center.x + rel.x + self.pan.x, center.y + rel.y + self.pan.y)
    }

    /// Converts a screen-space position back to world-space; the inverse of
    /// [`Viewer::world_to_screen`] up to rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (p.y - center.y - self.pan.y) / self.zoom;
        Vec2::new(x, y) + self.sim.config().world_size / 2.0
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, counts, tick).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let fps = if self.last_step_dt > 0.0 {
                    1.0 / self.last_step_dt
                } else {
                    0.0
                };
                ui.label(format!("{fps:.0} steps/s"));
                ui.label(format!("step cost = {:.2} ms", self.last_step_cost * 1000.0));
                ui.separator();
                ui.label(format!("tick = {}", self.sim.tick()));
                ui.label(format!("springs = {}", self.sim.springs().len()));
                ui.label(format!("particles = {}", self.sim.particles().len()));
            });
        });
    }

    /// Builds the right-hand panel for the config draft.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");
                ui.label("Applied on reset.");

                ui.separator();
                ui.label("World");
                Self::labeled_drag_f32(
                    ui,
                    "width:",
                    &mut self.cfg.world_size.x,
                    100.0..=10000.0,
                    10.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "height:",
                    &mut self.cfg.world_size.y,
                    100.0..=10000.0,
                    10.0,
                );

                ui.separator();
                ui.label("Grid");
                Self::labeled_drag_f32(ui, "cell_size:", &mut self.cfg.cell_size, 1.0..=1000.0, 1.0);
                ui.radio_value(
                    &mut self.cfg.bucket_policy,
                    BucketOffsetPolicy::FirstOccurrence,
                    "first occurrence",
                );
                ui.radio_value(
                    &mut self.cfg.bucket_policy,
                    BucketOffsetPolicy::MinimumIndex,
                    "minimum index",
                );

                ui.separator();
                ui.label("Integration");
                Self::labeled_drag_f32(ui, "damping:", &mut self.cfg.damping, 0.01..=0.99, 0.01);

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
            });
    }

    /// Builds the small floating toolbar for choosing the spawn tool.
    fn ui_toolbar(&mut self, ctx: &egui::Context) {
        egui::Area::new("toolbar".into())
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 100.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            ui.selectable_value(&mut self.tool, SpawnTool::Blob, "◯ Blob");
                            ui.selectable_value(&mut self.tool, SpawnTool::Dot, "• Dot");
                        });
                    });
            });
    }

    /// Spawns whatever the current tool makes at `center`.
    fn spawn_at(&mut self, center: Vec2) {
        match self.tool {
            SpawnTool::Blob => {
                let spec = BlobSpec {
                    cilia_color: BLOB_STROKE,
                    ..BlobSpec::random(center, &mut self.rng)
                };
                if let Err(err) = scene::spawn_blob(&mut self.sim, &spec) {
                    log::warn!("failed to spawn blob: {err}");
                }
            }
            SpawnTool::Dot => {
                self.sim.add_particle(center, DOT, true);
            }
        }
    }

    /// Draws blob outlines, visible springs and visible particles.
    fn paint_scene(&self, painter: &egui::Painter, rect: egui::Rect) {
        painter.rect_filled(rect, 0.0, color32(BACKGROUND));

        // Deformed blobs are often concave, so rims are stroked as closed
        // paths rather than filled.
        let rim = egui::Stroke::new((5.0 * self.zoom).max(1.0), color32(BLOB_STROKE));
        let inner = egui::Stroke::new((2.0 * self.zoom).max(0.5), color32(BLOB_INNER));
        for id in 0..self.sim.outlines().len() {
            let points: Vec<egui::Pos2> = self
                .sim
                .outline_points(id)
                .map(|p| self.world_to_screen(p, rect))
                .collect();
            painter.add(egui::Shape::closed_line(points.clone(), rim));
            painter.add(egui::Shape::closed_line(points, inner));
        }

        for spring in self.sim.springs().iter().filter(|s| s.visible) {
            let (a, b) = self.sim.spring_endpoints(spring);
            painter.line_segment(
                [self.world_to_screen(a, rect), self.world_to_screen(b, rect)],
                egui::Stroke::new((5.0 * self.zoom).max(1.0), color32(spring.color)),
            );
        }

        let r = (5.0 * self.zoom).max(1.5);
        for p in self.sim.particles().iter().filter(|p| p.visible) {
            painter.circle_filled(self.world_to_screen(p.pos, rect), r, color32(DOT_FILL));
        }
    }

    /// Builds the central panel where the scene is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            if response.clicked()
                && let Some(p) = response.hover_pos()
            {
                let center = self.screen_to_world(p, rect);
                self.spawn_at(center);
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Step before drawing so the frame shows fully updated positions.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }

            self.paint_scene(&painter, rect);
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_toolbar(ctx);
    }
}
