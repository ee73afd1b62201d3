//! Client - Windowed arena with keyboard/mouse control
//!
//! WASD move, mouse look, Space jump, LMB attack, RMB teleport to the looked-at
//! ground, F3 toggles the attack sphere gizmo. Click to grab the cursor.

mod camera;
mod input;
mod world;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use shared::{
    combat::draw_attack_hit_sphere,
    config::{load_arena_config, load_controller_config},
    ArenaPlugin,
};
use std::path::PathBuf;

/// Config directory - for bundled apps, next to the executable
fn get_asset_path() -> PathBuf {
    if let Ok(dir) = std::env::var("SANDBOX_ASSETS") {
        return PathBuf::from(dir);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let bundled_assets = exe_dir.join("assets");
            if bundled_assets.exists() {
                return bundled_assets;
            }
        }
    }
    PathBuf::from("assets")
}

fn main() -> AppExit {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Controller Arena".to_string(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    }));

    let asset_path = get_asset_path();
    info!("Using configs at: {:?}", asset_path);
    let controller = match load_controller_config(asset_path.join("controller.ron")) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return AppExit::error();
        }
    };
    let arena = match load_arena_config(asset_path.join("arena.ron")) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return AppExit::error();
        }
    };

    app.insert_resource(controller)
        .insert_resource(arena)
        .add_plugins(ArenaPlugin)
        .add_plugins(input::ControllerInputPlugin)
        .add_systems(Startup, (camera::spawn_camera, world::spawn_lighting))
        .add_systems(
            Update,
            (
                world::attach_box_meshes,
                world::attach_target_meshes,
                world::attach_trigger_meshes,
                camera::follow_pivot,
                draw_attack_hit_sphere,
            ),
        );

    app.run()
}
