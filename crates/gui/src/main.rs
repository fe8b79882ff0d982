use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use pidf::{Gains, Timing};
use serde::Deserialize;
use sim::{ClosedLoop, LoopConfig, Scenario};
use std::fs;

const AXES: usize = 3;
const AXIS_NAMES: [&str; AXES] = ["roll", "pitch", "yaw"];

#[derive(Clone, Debug)]
struct Sample {
    t: f64,
    setpoint: [f64; AXES],
    measurement: [f64; AXES],
    output: [f64; AXES],
}

/// One line of the `pidf-sim` JSONL trace. Non-finite values are written as
/// `null`.
#[derive(Debug, Deserialize)]
struct CliLine {
    t_s: f64,
    setpoint: [Option<f64>; AXES],
    measurement: [Option<f64>; AXES],
    output: [Option<f64>; AXES],
}

fn nan_if_null(v: [Option<f64>; AXES]) -> [f64; AXES] {
    v.map(|x| x.unwrap_or(f64::NAN))
}

struct App {
    // Settings
    scenario: Scenario,
    seconds: f64,
    ts_ms: f64,
    tf: f64,
    gains: [Gains; AXES],
    setpoints: [f64; AXES],
    seed: u64,

    // Live simulation state
    running: bool,
    max_steps: u64,
    lp: Option<ClosedLoop<AXES>>,
    timing_error: Option<String>,

    // Data shown in plots
    samples: Vec<Sample>,

    // Replay
    replay_loaded: bool,
    replay_path: String,
    replay_all: Vec<Sample>,
    replay_pos: usize,
    replay_playing: bool,
    replay_speed: usize, // samples per frame
    last_error: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        let mut app = Self {
            scenario: Scenario::Step,
            seconds: 20.0,
            ts_ms: 10.0,
            tf: 0.05,
            gains: [
                Gains::new(2.0, 2.0, 0.05),
                Gains::new(2.0, 2.0, 0.05),
                Gains::new(1.0, 0.5, 0.0),
            ],
            setpoints: [0.2, -0.1, 0.5],
            seed: 12345,

            running: false,
            max_steps: 0,
            lp: None,
            timing_error: None,

            samples: Vec::new(),

            replay_loaded: false,
            replay_path: "out/step.jsonl".to_string(),
            replay_all: Vec::new(),
            replay_pos: 0,
            replay_playing: false,
            replay_speed: 50,
            last_error: None,
        };

        app.reset_live();
        app
    }
}

impl App {
    fn clear_replay(&mut self) {
        self.replay_loaded = false;
        self.replay_all.clear();
        self.replay_pos = 0;
        self.replay_playing = false;
        self.last_error = None;
    }

    fn reset_live(&mut self) {
        self.running = false;
        self.samples.clear();

        let timing = match Timing::new(self.ts_ms / 1000.0, self.tf) {
            Ok(t) => t,
            Err(e) => {
                self.timing_error = Some(e.to_string());
                self.lp = None;
                return;
            }
        };
        self.timing_error = None;
        self.max_steps = (self.seconds / timing.ts()).ceil() as u64;

        let mut cfg = LoopConfig::<AXES>::new(timing, self.seed);
        for (i, ch) in cfg.channels.iter_mut().enumerate() {
            ch.gains = self.gains[i];
            ch.setpoint = self.setpoints[i];
        }
        self.scenario.configure(&mut cfg);
        self.lp = Some(ClosedLoop::new(&cfg));
    }

    fn reset(&mut self) {
        self.clear_replay();
        self.reset_live();
    }

    /// Push edited gains and setpoints into the running loop without
    /// clearing its history.
    fn retune_live(&mut self) {
        if let Some(lp) = self.lp.as_mut() {
            for i in 0..AXES {
                lp.set_gains(i, self.gains[i]);
                lp.set_setpoint(i, self.setpoints[i]);
            }
        }
    }

    fn load_jsonl(&mut self, path: &str) {
        self.last_error = None;

        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                self.last_error = Some(format!("Failed to read {path}: {e}"));
                return;
            }
        };

        let mut loaded: Vec<Sample> = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let row: CliLine = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(e) => {
                    self.last_error = Some(format!("JSON parse error at line {}: {}", i + 1, e));
                    return;
                }
            };

            loaded.push(Sample {
                t: row.t_s,
                setpoint: nan_if_null(row.setpoint),
                measurement: nan_if_null(row.measurement),
                output: nan_if_null(row.output),
            });
        }

        if loaded.is_empty() {
            self.last_error = Some(format!("No samples found in {path}"));
            return;
        }

        // Enter replay mode
        self.running = false;
        self.clear_replay();
        self.replay_loaded = true;
        self.replay_all = loaded;

        // Start with an initial chunk so the plot isn't empty
        self.samples.clear();
        let initial = self.replay_speed.min(self.replay_all.len()).max(1);
        self.samples.extend_from_slice(&self.replay_all[..initial]);
        self.replay_pos = initial;
    }

    fn replay_advance(&mut self, n: usize) {
        if self.replay_pos >= self.replay_all.len() {
            self.replay_playing = false;
            return;
        }
        let end = (self.replay_pos + n.max(1)).min(self.replay_all.len());
        self.samples
            .extend_from_slice(&self.replay_all[self.replay_pos..end]);
        self.replay_pos = end;

        if self.replay_pos >= self.replay_all.len() {
            self.replay_playing = false;
        }
    }

    fn replay_tick(&mut self) {
        if self.replay_loaded && self.replay_playing {
            self.replay_advance(self.replay_speed);
        }
    }

    fn step_once_live(&mut self) {
        let Some(lp) = self.lp.as_mut() else {
            self.running = false;
            return;
        };
        if lp.step_count() >= self.max_steps {
            self.running = false;
            return;
        }

        let s = lp.tick();
        self.scenario.update(lp, self.seconds);

        self.samples.push(Sample {
            t: s.t,
            setpoint: s.setpoint,
            measurement: s.measurement,
            output: s.output,
        });
    }

    fn settings_panel(&mut self, ui: &mut egui::Ui) {
        let live_enabled = !self.replay_loaded;

        ui.label("Scenario");
        let mut scenario_new = self.scenario;
        ui.add_enabled_ui(live_enabled, |ui| {
            egui::ComboBox::from_id_salt("scenario")
                .selected_text(self.scenario.label())
                .show_ui(ui, |ui| {
                    for s in Scenario::ALL {
                        ui.selectable_value(&mut scenario_new, s, s.label());
                    }
                });
        });
        if scenario_new != self.scenario {
            self.scenario = scenario_new;
            self.reset_live();
        }

        ui.separator();
        ui.label("Timing and run");
        let mut timing_changed = false;
        ui.add_enabled_ui(live_enabled, |ui| {
            timing_changed |= ui
                .add(egui::DragValue::new(&mut self.ts_ms).speed(0.1).prefix("T_s (ms): "))
                .changed();
            timing_changed |= ui
                .add(egui::DragValue::new(&mut self.tf).speed(0.001).prefix("T_f (s): "))
                .changed();
            timing_changed |= ui
                .add(egui::Slider::new(&mut self.seconds, 5.0..=120.0).text("seconds"))
                .changed();
            timing_changed |= ui
                .add(egui::DragValue::new(&mut self.seed).prefix("seed: "))
                .changed();
        });
        if timing_changed {
            self.reset_live();
        }
        if let Some(err) = &self.timing_error {
            ui.colored_label(egui::Color32::RED, err);
        }

        ui.separator();
        ui.label("Gains");
        let mut gains_changed = false;
        ui.add_enabled_ui(live_enabled, |ui| {
            for (i, name) in AXIS_NAMES.iter().enumerate() {
                ui.collapsing(*name, |ui| {
                    let g = &mut self.gains[i];
                    gains_changed |= ui
                        .add(egui::Slider::new(&mut g.kp, 0.0..=10.0).text("K_p"))
                        .changed();
                    gains_changed |= ui
                        .add(egui::Slider::new(&mut g.ki, 0.0..=10.0).text("K_i"))
                        .changed();
                    gains_changed |= ui
                        .add(egui::Slider::new(&mut g.kd, 0.0..=1.0).text("K_d"))
                        .changed();
                    gains_changed |= ui
                        .add(egui::Slider::new(&mut self.setpoints[i], -1.0..=1.0).text("setpoint"))
                        .changed();
                });
            }
        });
        if gains_changed {
            self.retune_live();
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Reset").clicked() {
                self.reset();
            }

            let can_run = live_enabled && self.lp.is_some();
            let run_label = if self.running { "Pause" } else { "Run" };
            if ui.add_enabled(can_run, egui::Button::new(run_label)).clicked() {
                if !self.running && self.lp.as_ref().map_or(0, |lp| lp.step_count()) >= self.max_steps {
                    self.reset_live();
                }
                self.running = !self.running;
            }

            if ui.add_enabled(can_run, egui::Button::new("Step")).clicked() {
                self.step_once_live();
            }
        });
    }

    fn replay_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.label("Replay (JSONL from pidf-sim)");
        ui.horizontal(|ui| {
            ui.label("path:");
            ui.text_edit_singleline(&mut self.replay_path);
        });

        ui.horizontal(|ui| {
            if ui.button("Load").clicked() {
                let p = self.replay_path.clone();
                self.load_jsonl(&p);
            }

            if ui
                .button(if self.replay_playing {
                    "Pause replay"
                } else {
                    "Play replay"
                })
                .clicked()
                && self.replay_loaded
            {
                self.replay_playing = !self.replay_playing;
                ctx.request_repaint();
            }

            if ui.button("Step replay").clicked() && self.replay_loaded {
                self.replay_advance(1);
            }
        });

        ui.add(
            egui::Slider::new(&mut self.replay_speed, 1..=500)
                .text("replay speed (samples/frame)"),
        );

        if self.replay_loaded {
            ui.small(format!(
                "Loaded: {}/{} samples",
                self.samples.len(),
                self.replay_all.len()
            ));
        } else {
            ui.small("No replay loaded.");
        }

        if let Some(err) = &self.last_error {
            ui.separator();
            ui.colored_label(egui::Color32::RED, err);
        }
    }
}

fn axis_points(samples: &[Sample], f: impl Fn(&Sample) -> f64) -> PlotPoints {
    samples.iter().map(|s| [s.t, f(s)]).collect()
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.replay_tick();
        if self.replay_playing {
            ctx.request_repaint();
        }

        let mode_txt = if self.replay_loaded { "REPLAY" } else { "LIVE" };

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("PIDF Loop");
                ui.separator();
                ui.label(format!("MODE: {mode_txt}"));
                if let Some(s) = self.samples.last() {
                    ui.separator();
                    ui.label(format!("t = {:.2}s", s.t));
                }
            });
        });

        egui::SidePanel::left("left")
            .resizable(false)
            .show(ctx, |ui| {
                self.settings_panel(ui);
                ui.separator();
                self.replay_panel(ui, ctx);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.running && !self.replay_loaded {
                for _ in 0..5 {
                    if !self.running {
                        break;
                    }
                    self.step_once_live();
                }
                ctx.request_repaint();
            }

            if self.samples.is_empty() {
                ui.label("No data yet. Run LIVE or Load a REPLAY file.");
                return;
            }

            ui.heading("Measurement vs setpoint");
            Plot::new("measurement_plot").height(260.0).show(ui, |plot_ui| {
                for (i, name) in AXIS_NAMES.iter().enumerate() {
                    plot_ui.line(
                        Line::new(axis_points(&self.samples, |s| s.measurement[i]))
                            .name(format!("{name} measured")),
                    );
                    plot_ui.line(
                        Line::new(axis_points(&self.samples, |s| s.setpoint[i]))
                            .name(format!("{name} setpoint")),
                    );
                }
            });

            ui.heading("Controller output");
            Plot::new("output_plot").height(200.0).show(ui, |plot_ui| {
                for (i, name) in AXIS_NAMES.iter().enumerate() {
                    plot_ui.line(
                        Line::new(axis_points(&self.samples, |s| s.output[i])).name(*name),
                    );
                }
            });

            ui.separator();
            if let Some(last) = self.samples.last() {
                let mut txt = format!("t={:.2}s", last.t);
                for (i, name) in AXIS_NAMES.iter().enumerate() {
                    txt.push_str(&format!(
                        "  {name}: y={:.3} u={:.3}",
                        last.measurement[i], last.output[i]
                    ));
                }
                ui.label(txt);
            }
        });
    }
}

fn main() -> eframe::Result<()> {
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "PIDF Loop",
        native_options,
        Box::new(|_cc| Ok(Box::new(App::default()))),
    )
}
