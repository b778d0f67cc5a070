use flappy_evo::simulation::events::{self, ControlEvent, EventQueue};
use flappy_evo::simulation::params::Params;
use flappy_evo::simulation::world::{Mode, World};
use macroquad::prelude::*;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod graphics;
mod ui;

const CONFIG_PATH: &str = "flappy_evo.json";

fn window_conf() -> Conf {
    Conf {
        window_title: "Flappy Evo".to_owned(),
        window_width: 700,
        window_height: 600,
        ..Default::default()
    }
}

fn load_params() -> Params {
    if !Path::new(CONFIG_PATH).exists() {
        return Params::default();
    }
    match Params::load_from_file(CONFIG_PATH) {
        Ok(params) => {
            info!(path = CONFIG_PATH, "loaded parameters");
            params
        }
        Err(err) => {
            warn!(%err, path = CONFIG_PATH, "falling back to default parameters");
            Params::default()
        }
    }
}

fn collect_keyboard(queue: &mut EventQueue, ui_state: &mut ui::UIState, mode: Mode) {
    let bindings = [
        (KeyCode::Space, ControlEvent::PrimaryAction),
        (
            KeyCode::T,
            ControlEvent::StartTraining {
                force_restart: false,
            },
        ),
        (
            KeyCode::R,
            ControlEvent::StartTraining {
                force_restart: true,
            },
        ),
        (KeyCode::P, ControlEvent::StartMatch),
        (KeyCode::S, ControlEvent::SaveBest),
        (KeyCode::Key1, ControlEvent::AdjustSpeed(-1)),
        (KeyCode::Key2, ControlEvent::AdjustSpeed(1)),
        (KeyCode::Up, ControlEvent::AdjustPopulation(10)),
        (KeyCode::Down, ControlEvent::AdjustPopulation(-10)),
        (KeyCode::Right, ControlEvent::AdjustMutationRate(0.01)),
        (KeyCode::Left, ControlEvent::AdjustMutationRate(-0.01)),
    ];

    for (key, event) in bindings {
        if is_key_pressed(key) {
            queue.push(event);
        }
    }

    if is_key_pressed(KeyCode::D) {
        ui_state.toggle_draw_all(mode);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut world = World::new(load_params());
    let mut queue = EventQueue::new();
    let mut ui_state = ui::UIState::new();

    info!(
        population = world.params.population_size,
        seed = world.params.seed,
        "starting flappy evo"
    );

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let view = graphics::Viewport::fit(&world.params, ui_state.stats_panel_width);

        collect_keyboard(&mut queue, &mut ui_state, world.mode);
        if is_mouse_button_pressed(MouseButton::Left)
            && view.contains(&world.params, mouse_position())
        {
            queue.push(ControlEvent::PrimaryAction);
        }

        let snapshot = world.snapshot();
        let saved_brain = snapshot.mode != Mode::PlayerVsAi && world.saved_brain_available();
        ui::draw_ui(
            &mut ui_state,
            &snapshot,
            &world.params,
            &world.history,
            saved_brain,
            &mut queue,
        );

        events::apply_events(&mut world, &mut queue);
        world.step_frame();

        clear_background(DARKGRAY);
        let snapshot = world.snapshot();
        graphics::draw_world(&snapshot, &world.params, &view, ui_state.draw_all_birds);
        ui::process_egui();

        next_frame().await;
    }
}
