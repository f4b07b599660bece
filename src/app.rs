//! Floating status widget — egui/eframe application.
//!
//! The widget is a thin viewer over engine state: every frame it reads the
//! [`StatusSnapshot`] and the shared waveform window, both of which the
//! session engine updates, and renders whatever phase they describe.  Its
//! only outputs are [`SessionEvent::Toggle`] and [`SessionEvent::Cancel`]
//! posted on the engine queue when the user clicks the buttons; the hotkeys
//! arrive at the engine without passing through the UI at all.
//!
//! # Widget states
//!
//! | Phase | Visual |
//! |-------|--------|
//! | `Idle` | Hotkey hint, plus the last transcript or error if any |
//! | `Recording` | Waveform bars + elapsed timer — red indicator |
//! | `Transcribing` | Spinner + "Transcribing..." |

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::audio::SharedWaveform;
use crate::config::AppConfig;
use crate::session::{SessionEvent, SessionPhase, SharedStatus, StatusSnapshot};

/// eframe application — the floating dictation widget.
pub struct VoiceclipApp {
    /// Engine state published after every transition.
    status: SharedStatus,
    /// Rolling amplitude window fed by the engine during recording.
    waveform: SharedWaveform,
    /// Posts `Toggle`/`Cancel` onto the engine queue.
    events: mpsc::Sender<SessionEvent>,
    /// Read-only after startup.
    config: AppConfig,
    /// Spinner animation phase, advanced each frame.
    spinner_phase: f32,
    /// Whether the settings summary is expanded.
    show_settings: bool,
}

impl VoiceclipApp {
    pub fn new(
        status: SharedStatus,
        waveform: SharedWaveform,
        events: mpsc::Sender<SessionEvent>,
        config: AppConfig,
    ) -> Self {
        Self {
            status,
            waveform,
            events,
            config,
            spinner_phase: 0.0,
            show_settings: false,
        }
    }

    fn snapshot(&self) -> StatusSnapshot {
        self.status.lock().unwrap().clone()
    }

    fn send(&self, event: SessionEvent) {
        if self.events.try_send(event).is_err() {
            log::warn!("ui: engine queue full or closed");
        }
    }

    // ── Window sizing ────────────────────────────────────────────────────

    fn update_window_size(&self, ctx: &egui::Context, phase: SessionPhase) {
        let size = match phase {
            SessionPhase::Idle => egui::vec2(300.0, 80.0),
            SessionPhase::Recording => egui::vec2(300.0, 88.0),
            SessionPhase::Transcribing => egui::vec2(300.0, 65.0),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(size));
    }

    // ── Title bar ─────────────────────────────────────────────────────────

    /// Draggable title bar: status dot, title, settings/close controls.
    fn draw_title_bar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, phase: SessionPhase) {
        ui.horizontal(|ui| {
            let icon = match phase {
                SessionPhase::Idle => "  ",
                SessionPhase::Recording => "* ",
                SessionPhase::Transcribing => ". ",
            };
            ui.label(egui::RichText::new(icon).color(phase_color(phase)));

            let title_resp = ui.label(
                egui::RichText::new("Voiceclip")
                    .color(egui::Color32::from_rgb(200, 200, 200))
                    .size(13.0),
            );
            if title_resp.is_pointer_button_down_on() {
                if let Some(outer_rect) = ctx.input(|i| i.viewport().outer_rect) {
                    let delta = ctx.input(|i| i.pointer.delta());
                    ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(
                        outer_rect.min + delta,
                    ));
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(
                        egui::Button::new(
                            egui::RichText::new("x")
                                .color(egui::Color32::from_rgb(200, 100, 100))
                                .size(12.0),
                        )
                        .frame(false),
                    )
                    .clicked()
                {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                if ui
                    .add(
                        egui::Button::new(
                            egui::RichText::new("=")
                                .color(egui::Color32::from_rgb(150, 150, 150))
                                .size(12.0),
                        )
                        .frame(false),
                    )
                    .clicked()
                {
                    self.show_settings = !self.show_settings;
                }
            });
        });
    }

    // ── Phase panels ──────────────────────────────────────────────────────

    /// Idle: hotkey hint plus the outcome of the previous session.
    fn draw_idle(&self, ui: &mut egui::Ui, snapshot: &StatusSnapshot) {
        ui.add_space(4.0);

        if let Some(error) = &snapshot.error {
            ui.label(
                egui::RichText::new(error.as_str())
                    .color(egui::Color32::from_rgb(255, 136, 68))
                    .size(11.0),
            );
        } else if let Some(text) = &snapshot.last_text {
            ui.label(
                egui::RichText::new(text.as_str())
                    .color(egui::Color32::from_rgb(80, 200, 120))
                    .size(12.0),
            );
        }

        ui.add_space(2.0);
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new(format!("Press {} to dictate", self.config.hotkey.toggle_key))
                    .color(egui::Color32::from_rgb(120, 120, 120))
                    .size(13.0),
            );
        });
    }

    /// Recording: waveform, elapsed timer, cancel hint.
    fn draw_recording(&self, ui: &mut egui::Ui, snapshot: &StatusSnapshot) {
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Recording")
                    .color(egui::Color32::from_rgb(255, 80, 80))
                    .size(12.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!("{:.1}s", snapshot.recording_secs))
                        .color(egui::Color32::from_rgb(255, 140, 140))
                        .size(12.0),
                );
            });
        });

        ui.add_space(4.0);
        self.draw_waveform(ui);

        ui.add_space(2.0);
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new(format!(
                    "{} to finish, {} to discard",
                    self.config.hotkey.toggle_key, self.config.hotkey.cancel_key
                ))
                .color(egui::Color32::from_rgb(160, 160, 160))
                .size(10.0),
            );
        });
    }

    /// Transcribing: spinner, label, cancel button.
    fn draw_transcribing(&self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("{} Transcribing...", self.spinner_char()))
                    .color(egui::Color32::from_rgb(68, 136, 255))
                    .size(13.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new(egui::RichText::new("Cancel").size(11.0)))
                    .clicked()
                {
                    self.send(SessionEvent::Cancel);
                }
            });
        });
    }

    /// Settings summary (read-only).
    fn draw_settings(&self, ui: &mut egui::Ui) {
        let dim = egui::Color32::from_rgb(140, 140, 140);
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(format!("  Engine: {:?}", self.config.engine.backend))
                .color(dim)
                .size(11.0),
        );
        ui.label(
            egui::RichText::new(format!("  Language: {}", self.config.language))
                .color(dim)
                .size(11.0),
        );
        ui.label(
            egui::RichText::new(format!(
                "  Hotkeys: {} / {}",
                self.config.hotkey.toggle_key, self.config.hotkey.cancel_key
            ))
            .color(dim)
            .size(11.0),
        );
    }

    // ── Waveform ──────────────────────────────────────────────────────────

    /// Amplitude bar chart for the Recording phase, oldest bar on the left.
    fn draw_waveform(&self, ui: &mut egui::Ui) {
        let bars = self.waveform.lock().unwrap().snapshot();

        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), 28.0),
            egui::Sense::hover(),
        );

        let painter = ui.painter();
        let num_bars = bars.len().max(1);
        let bar_width = rect.width() / num_bars as f32;

        for (i, &amplitude) in bars.iter().enumerate() {
            let x = rect.left() + i as f32 * bar_width;
            let bar_height = (amplitude * rect.height()).max(2.0);
            let center_y = rect.center().y;

            painter.rect_filled(
                egui::Rect::from_center_size(
                    egui::pos2(x + bar_width / 2.0, center_y),
                    egui::vec2((bar_width * 0.65).max(1.0), bar_height),
                ),
                1.0,
                egui::Color32::from_rgb(80, 200, 120),
            );
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn spinner_char(&self) -> char {
        let chars = ['|', '/', '-', '\\'];
        chars[(self.spinner_phase as usize) % chars.len()]
    }
}

/// Accent colour for the title-bar status dot.
fn phase_color(phase: SessionPhase) -> egui::Color32 {
    match phase {
        SessionPhase::Idle => egui::Color32::from_rgb(100, 100, 100),
        SessionPhase::Recording => egui::Color32::from_rgb(255, 68, 68),
        SessionPhase::Transcribing => egui::Color32::from_rgb(68, 136, 255),
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for VoiceclipApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot = self.snapshot();

        self.spinner_phase += 0.08;
        if self.spinner_phase >= 4.0 {
            self.spinner_phase = 0.0;
        }

        // The engine mutates shared state off the UI thread, so animated
        // phases poll it by repainting on a timer.
        match snapshot.phase {
            SessionPhase::Recording => ctx.request_repaint_after(Duration::from_millis(33)),
            SessionPhase::Transcribing => ctx.request_repaint_after(Duration::from_millis(66)),
            SessionPhase::Idle => ctx.request_repaint_after(Duration::from_millis(250)),
        }

        self.update_window_size(ctx, snapshot.phase);

        let frame = egui::Frame::new()
            .fill(egui::Color32::from_rgba_premultiplied(30, 30, 30, 220))
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::same(8));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            self.draw_title_bar(ui, ctx, snapshot.phase);

            if self.show_settings {
                ui.separator();
                self.draw_settings(ui);
                return;
            }

            ui.separator();

            match snapshot.phase {
                SessionPhase::Idle => self.draw_idle(ui, &snapshot),
                SessionPhase::Recording => self.draw_recording(ui, &snapshot),
                SessionPhase::Transcribing => self.draw_transcribing(ui),
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // The engine loop ends when it sees this.
        let _ = self.events.try_send(SessionEvent::Shutdown);
        log::info!("widget closing");
    }
}
