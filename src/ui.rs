use egui_macroquad::egui;
use egui_plot::{Line, Plot, PlotPoints};
use flappy_evo::simulation::events::{ControlEvent, Enhancement, EventQueue};
use flappy_evo::simulation::history::History;
use flappy_evo::simulation::params::{MAX_POPULATION, MAX_SPEED, MIN_POPULATION, Params};
use flappy_evo::simulation::world::{Mode, WorldSnapshot};

pub struct UIState {
    pub stats_panel_width: f32,
    pub draw_all_birds: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            stats_panel_width: 280.0,
            draw_all_birds: true,
        }
    }

    /// Flips between drawing the whole flock and only the best bird.
    /// Only training has a flock to thin out.
    pub fn toggle_draw_all(&mut self, mode: Mode) {
        if mode == Mode::Training {
            self.draw_all_birds = !self.draw_all_birds;
        }
    }
}

pub fn draw_ui(
    state: &mut UIState,
    snapshot: &WorldSnapshot,
    params: &Params,
    history: &History,
    saved_brain: bool,
    queue: &mut EventQueue,
) {
    egui_macroquad::ui(|egui_ctx| {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::from_rgb(240, 240, 240));
        egui_ctx.set_visuals(visuals);

        egui::SidePanel::right("stats_panel")
            .exact_width(state.stats_panel_width)
            .resizable(false)
            .show(egui_ctx, |ui| {
                ui.heading("Neuroevolution");
                ui.separator();

                draw_controls(ui, state, snapshot, saved_brain, queue);

                ui.separator();
                draw_stats(ui, snapshot);

                ui.separator();
                draw_tunables(ui, snapshot, params, queue);

                ui.separator();
                ui.heading("Best Score per Generation");
                draw_history_plot(ui, history);
            });
    });
}

fn draw_controls(
    ui: &mut egui::Ui,
    state: &mut UIState,
    snapshot: &WorldSnapshot,
    saved_brain: bool,
    queue: &mut EventQueue,
) {
    let idle = matches!(snapshot.mode, Mode::Idle | Mode::Finished);
    let training = snapshot.mode == Mode::Training;

    ui.horizontal(|ui| {
        if ui.add_enabled(idle, egui::Button::new("Train")).clicked() {
            queue.push(ControlEvent::StartTraining {
                force_restart: false,
            });
        }
        if ui
            .add_enabled(training, egui::Button::new("Restart"))
            .clicked()
        {
            queue.push(ControlEvent::StartTraining {
                force_restart: true,
            });
        }
    });

    ui.horizontal(|ui| {
        if ui.add_enabled(training, egui::Button::new("Save Best")).clicked() {
            queue.push(ControlEvent::SaveBest);
        }
        if ui
            .add_enabled(saved_brain, egui::Button::new("Race AI"))
            .clicked()
        {
            queue.push(ControlEvent::StartMatch);
        }
    });

    let mut draw_all = state.draw_all_birds;
    if ui
        .add_enabled(training, egui::Checkbox::new(&mut draw_all, "Draw all birds"))
        .changed()
    {
        state.toggle_draw_all(snapshot.mode);
    }
}

fn draw_stats(ui: &mut egui::Ui, snapshot: &WorldSnapshot) {
    match snapshot.mode {
        Mode::Training => {
            ui.label(format!("Generation: {}", snapshot.generation));
            ui.label(format!("Alive: {}/{}", snapshot.alive, snapshot.population));
            ui.label(format!("Best Score: {}", snapshot.best_score));
            ui.label(format!("Mutation Rate: {:.2}", snapshot.mutation_rate));
            ui.label(format!("Tick: {}", snapshot.tick));
        }
        Mode::PlayerVsAi | Mode::Finished => {
            for bird in &snapshot.birds {
                let name = if bird.human { "Player" } else { "AI" };
                let state = if bird.lost { " (crashed)" } else { "" };
                ui.label(format!("{name}: {}{state}", bird.score));
            }
        }
        Mode::Idle => {
            ui.label("Press T to train or P to race a saved AI");
        }
    }
}

fn draw_tunables(
    ui: &mut egui::Ui,
    snapshot: &WorldSnapshot,
    params: &Params,
    queue: &mut EventQueue,
) {
    let tunable = snapshot.mode != Mode::PlayerVsAi;

    let mut population = params.population_size;
    if ui
        .add_enabled(
            tunable,
            egui::Slider::new(&mut population, MIN_POPULATION..=MAX_POPULATION)
                .step_by(10.0)
                .text("Population"),
        )
        .changed()
    {
        let delta = population as i64 - params.population_size as i64;
        queue.push(ControlEvent::AdjustPopulation(delta as i32));
    }

    let mut mutation_rate = params.mutation_rate;
    if ui
        .add_enabled(
            tunable,
            egui::Slider::new(&mut mutation_rate, 0.0..=1.0)
                .step_by(0.01)
                .text("Mutation"),
        )
        .changed()
    {
        queue.push(ControlEvent::AdjustMutationRate(
            mutation_rate - params.mutation_rate,
        ));
    }

    let mut speed = params.simulation_speed;
    if ui
        .add(egui::Slider::new(&mut speed, 1..=MAX_SPEED).text("Speed"))
        .changed()
    {
        let delta = i64::from(speed) - i64::from(params.simulation_speed);
        queue.push(ControlEvent::AdjustSpeed(delta as i32));
    }

    ui.separator();
    ui.label("Enhancements");
    let toggles = [
        (params.enhanced_fitness, Enhancement::EnhancedFitness, "Pipe bonus fitness"),
        (params.elitism, Enhancement::Elitism, "Elitism"),
        (params.adaptive_mutation, Enhancement::AdaptiveMutation, "Adaptive mutation"),
    ];
    for (mut enabled, enhancement, label) in toggles {
        if ui
            .add_enabled(tunable, egui::Checkbox::new(&mut enabled, label))
            .changed()
        {
            queue.push(ControlEvent::Toggle(enhancement));
        }
    }
}

fn draw_history_plot(ui: &mut egui::Ui, history: &History) {
    if history.records().is_empty() {
        ui.label("Collecting data...");
        return;
    }

    let points: PlotPoints = history
        .records()
        .iter()
        .map(|r| [f64::from(r.generation), f64::from(r.best_score)])
        .collect();
    let line = Line::new(points);

    Plot::new("best_score_plot")
        .height(150.0)
        .show_axes([true, true])
        .label_formatter(|_name, value| {
            format!("Generation: {:.0}\nBest Score: {:.0}", value.x, value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

pub fn process_egui() {
    egui_macroquad::draw();
}
