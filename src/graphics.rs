use flappy_evo::simulation::params::Params;
use flappy_evo::simulation::world::{BirdView, Mode, Winner, WorldSnapshot};
use macroquad::prelude::*;

/// Maps playfield coordinates onto the part of the window left of the panel.
pub struct Viewport {
    scale: f32,
}

impl Viewport {
    pub fn fit(params: &Params, panel_width: f32) -> Self {
        let scale_x = (screen_width() - panel_width).max(1.0) / params.world_width;
        let scale_y = screen_height() / params.world_height;
        Self {
            scale: scale_x.min(scale_y),
        }
    }

    /// Whether a window position falls inside the playfield.
    pub fn contains(&self, params: &Params, (x, y): (f32, f32)) -> bool {
        x >= 0.0
            && y >= 0.0
            && x <= params.world_width.to_screen(self)
            && y <= params.world_height.to_screen(self)
    }
}

trait ToScreen {
    fn to_screen(&self, view: &Viewport) -> f32;
}

impl ToScreen for f32 {
    fn to_screen(&self, view: &Viewport) -> f32 {
        self * view.scale
    }
}

fn rect(x: f32, y: f32, w: f32, h: f32, view: &Viewport, color: Color) {
    draw_rectangle(
        x.to_screen(view),
        y.to_screen(view),
        w.to_screen(view),
        h.to_screen(view),
        color,
    );
}

fn centered_text(text: &str, center_x: f32, center_y: f32, font_size: f32, color: Color) {
    let size = measure_text(text, None, font_size as _, 1.0);
    draw_text(
        text,
        center_x - size.width / 2.0,
        center_y + size.height / 2.0,
        font_size,
        color,
    );
}

pub fn draw_world(snapshot: &WorldSnapshot, params: &Params, view: &Viewport, draw_all: bool) {
    rect(
        0.0,
        0.0,
        params.world_width,
        params.world_height,
        view,
        Color::from_rgba(135, 206, 235, 255),
    );

    let pipe_color = Color::from_rgba(34, 139, 34, 255);
    for pipe in &snapshot.pipes {
        rect(pipe.x, 0.0, pipe.width, pipe.gap_top, view, pipe_color);
        rect(
            pipe.x,
            pipe.gap_bottom,
            pipe.width,
            params.world_height - pipe.gap_bottom,
            view,
            pipe_color,
        );
    }

    match snapshot.mode {
        Mode::Training => draw_population(snapshot, view, draw_all),
        Mode::PlayerVsAi | Mode::Finished => {
            for bird in &snapshot.birds {
                let (color, label) = if bird.human {
                    (Color::from_rgba(251, 191, 36, 255), "PLAYER")
                } else {
                    (Color::from_rgba(59, 130, 246, 255), "AI")
                };
                draw_bird(bird, view, color, Some(label));
            }
        }
        Mode::Idle => {}
    }

    rect(
        0.0,
        params.ground_y(),
        params.world_width,
        params.ground_height,
        view,
        Color::from_rgba(222, 184, 135, 255),
    );

    draw_overlay(snapshot, params, view);
}

fn draw_population(snapshot: &WorldSnapshot, view: &Viewport, draw_all: bool) {
    for bird in &snapshot.birds {
        let is_best = snapshot.best_bird == Some(bird.id);
        if is_best {
            continue;
        }
        if draw_all {
            draw_bird(bird, view, Color::from_rgba(59, 130, 246, 100), None);
        }
    }

    // best bird on top
    if let Some(best) = snapshot
        .birds
        .iter()
        .find(|bird| snapshot.best_bird == Some(bird.id))
    {
        draw_bird(best, view, Color::from_rgba(251, 191, 36, 255), Some("BEST"));
    }
}

fn draw_bird(bird: &BirdView, view: &Viewport, color: Color, label: Option<&str>) {
    rect(bird.x, bird.y, bird.width, bird.height, view, color);

    if let Some(label) = label {
        centered_text(
            label,
            (bird.x + bird.width / 2.0).to_screen(view),
            (bird.y + bird.height / 2.0).to_screen(view),
            14.0,
            BLACK,
        );
    }
}

fn draw_overlay(snapshot: &WorldSnapshot, params: &Params, view: &Viewport) {
    let (title, subtitle, color) = match (snapshot.mode, snapshot.winner) {
        (Mode::Idle, _) => ("NEUROEVOLUTION", "Press T to train or P to race a saved AI", WHITE),
        (Mode::Finished, Some(Winner::Player)) => {
            ("PLAYER WINS!", "Space to play again", Color::from_rgba(251, 191, 36, 255))
        }
        (Mode::Finished, Some(Winner::Ai)) => {
            ("AI WINS!", "Space to play again", Color::from_rgba(59, 130, 246, 255))
        }
        (Mode::Finished, _) => ("DRAW!", "Space to play again", WHITE),
        _ => return,
    };

    rect(
        0.0,
        0.0,
        params.world_width,
        params.world_height,
        view,
        Color::from_rgba(0, 0, 0, 150),
    );

    let center_x = (params.world_width / 2.0).to_screen(view);
    let center_y = (params.world_height / 2.0).to_screen(view);
    centered_text(title, center_x, center_y - 50.0, 40.0, color);
    centered_text(subtitle, center_x, center_y + 10.0, 20.0, WHITE);
}
