//! PASTURE: a third-person character sandbox
//!
//! Component entities, an FSM-driven locomotion graph with animation
//! crossfades, and a capsule-vs-level physics controller, wrapped in a
//! minimal macroquad loop with debug rendering. The simulation core
//! lives in `sim/`; this file only owns the window, the frame clock, and
//! the camera.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod input;
mod settings;
mod sim;

use macroquad::prelude::*;

use input::KeyboardInput;
use settings::PlayerSettings;
use sim::animation::AnimationSet;
use sim::{CharacterController, Entity, EntityManager, Message, ModelHandle, Motion, StaticVolume};

/// Half-extent of the demo arena floor.
const ARENA_SIZE: f32 = 20.0;

/// Never integrate more than a 30 Hz frame's worth of time at once, no
/// matter how long the renderer stalled.
const MAX_FRAME_DT: f32 = 1.0 / 30.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("PASTURE v{VERSION}"),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Stand-in clip lengths for the debug character. A real asset pipeline
/// reads these from the loaded clips; the simulation only needs durations.
fn demo_animations() -> AnimationSet {
    AnimationSet::new(|motion| match motion {
        Motion::Idle => 5.4,
        Motion::Walk => 1.0,
        Motion::WalkBack => 1.1,
        Motion::Run => 0.66,
        Motion::Jump => 1.25,
    })
}

fn spawn_player(manager: &mut EntityManager, settings: &PlayerSettings) {
    let mut controller =
        CharacterController::new(settings.clone(), Box::new(KeyboardInput::new()));
    controller.place_at(vec3(0.0, 2.0, 0.0));

    // The demo has no async asset pipeline, so both providers complete
    // immediately; the controller does not care either way.
    controller.animations_ready(demo_animations());
    controller.collision_ready(Box::new(StaticVolume::arena(0.0, ARENA_SIZE)));

    let mut player = Entity::new();
    player.add_component(Box::new(controller));
    player.broadcast(Message::CharacterLoaded {
        root: ModelHandle(1),
    });
    manager.add_named(player, "player");
}

fn draw_player(entity: &Entity) {
    let Some(controller) = entity.component_as::<CharacterController>(CharacterController::NAME)
    else {
        return;
    };

    let capsule = controller.capsule();
    let color = if controller.is_grounded() { SKYBLUE } else { ORANGE };
    draw_sphere(capsule.start, capsule.radius, None, color);
    draw_sphere(capsule.end, capsule.radius, None, color);
    draw_line_3d(capsule.start, capsule.end, DARKBLUE);

    // Facing indicator.
    let facing = entity.rotation() * Vec3::Z;
    draw_line_3d(capsule.end, capsule.end + facing, RED);
}

fn draw_arena() {
    draw_grid(40, 1.0, DARKGRAY, GRAY);
    let corners = [
        vec3(-ARENA_SIZE, 0.0, -ARENA_SIZE),
        vec3(ARENA_SIZE, 0.0, -ARENA_SIZE),
        vec3(ARENA_SIZE, 0.0, ARENA_SIZE),
        vec3(-ARENA_SIZE, 0.0, ARENA_SIZE),
    ];
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        draw_line_3d(a, b, DARKGRAY);
        draw_line_3d(a + vec3(0.0, 2.0, 0.0), b + vec3(0.0, 2.0, 0.0), DARKGRAY);
        draw_line_3d(a, a + vec3(0.0, 2.0, 0.0), DARKGRAY);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let settings = match PlayerSettings::load("assets/player.ron") {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("player settings not loaded ({err}), using defaults");
            PlayerSettings::default()
        }
    };

    let mut manager = EntityManager::new();
    spawn_player(&mut manager, &settings);

    let mut camera_position = vec3(6.0, 5.0, -6.0);

    loop {
        let dt = get_frame_time().min(MAX_FRAME_DT);
        manager.update(dt);

        // The camera reads the player transform after the tick; it is a
        // consumer of the simulation, not part of it.
        let player = manager.get("player").expect("player entity");
        let player_position = player.position();
        let behind = player.rotation() * vec3(0.0, 0.0, -1.0);
        let camera_goal = player_position + behind * 7.0 + vec3(0.0, 4.0, 0.0);
        camera_position = camera_position.lerp(camera_goal, 1.0 - 0.001f32.powf(dt));

        clear_background(Color::from_rgba(240, 244, 248, 255));
        set_camera(&Camera3D {
            position: camera_position,
            up: Vec3::Y,
            target: player_position + vec3(0.0, 1.0, 0.0),
            ..Default::default()
        });

        draw_arena();
        draw_player(player);

        set_default_camera();
        let controller = player
            .component_as::<CharacterController>(CharacterController::NAME)
            .expect("player controller");
        let state = controller.motion().map_or("loading", Motion::label);
        draw_text(
            &format!(
                "state: {state}   grounded: {}   fps: {}",
                controller.is_grounded(),
                get_fps()
            ),
            20.0,
            30.0,
            24.0,
            BLACK,
        );
        draw_text(
            "WASD move (shift = walk), space jump",
            20.0,
            56.0,
            20.0,
            DARKGRAY,
        );

        next_frame().await
    }
}
