//! Sandbox - Headless Bevy app that replays a scripted input timeline
//!
//! Loads `controller.ron`, `arena.ron` and `script.ron` from `SANDBOX_ASSETS`
//! (default `assets`), runs the controller against the arena at the fixed tick
//! rate and logs a summary when the script ends.

mod script;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use shared::{
    config::{load_arena_config, load_controller_config, load_ron},
    tick_duration, ArenaConfig, ArenaPlugin, AttackResolved, ConfigError, ControllerConfig,
    ControllerInput, MotionState, PlayerController, TriggerCrossed,
};
use std::path::{Path, PathBuf};

use script::{InputScript, ScriptPlayer};

/// Counters reported at the end of the run
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
struct RunSummary {
    attacks: usize,
    hits: usize,
    removed: usize,
    config_errors: usize,
    triggers_entered: usize,
    triggers_exited: usize,
}

fn assets_dir() -> PathBuf {
    std::env::var("SANDBOX_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("assets"))
}

/// Read and validate the three sandbox files
fn load_sandbox(
    dir: &Path,
) -> Result<(ControllerConfig, ArenaConfig, InputScript), ConfigError> {
    let controller = load_controller_config(dir.join("controller.ron"))?;
    let arena = load_arena_config(dir.join("arena.ron"))?;
    let script: InputScript = load_ron(dir.join("script.ron"))?;
    Ok((controller, arena, script))
}

/// Feed this frame's scripted samples to the controllers; exit when the script ends
fn drive_script(
    mut player: ResMut<ScriptPlayer>,
    mut inputs: MessageWriter<ControllerInput>,
    summary: Res<RunSummary>,
    controllers: Query<(&Name, &Transform, &MotionState), With<PlayerController>>,
    mut app_exit: MessageWriter<AppExit>,
) {
    if !player.is_finished() {
        for action in player.next_frame().into_iter().flatten() {
            inputs.write(ControllerInput(action));
        }
        return;
    }

    info!("Script finished after {} frames", player.frames_played());
    for (name, transform, state) in controllers.iter() {
        info!(
            "{name}: position {}, grounded {}",
            transform.translation, state.grounded
        );
    }
    info!(
        "Attacks {}, hits {}, targets removed {}, config errors {}, triggers entered {} / exited {}",
        summary.attacks,
        summary.hits,
        summary.removed,
        summary.config_errors,
        summary.triggers_entered,
        summary.triggers_exited
    );
    app_exit.write(AppExit::Success);
}

fn record_attacks(mut resolved: MessageReader<AttackResolved>, mut summary: ResMut<RunSummary>) {
    for attack in resolved.read() {
        summary.attacks += 1;
        summary.hits += attack.hits;
        summary.removed += attack.removed;
        summary.config_errors += attack.misconfigured;
    }
}

fn record_triggers(mut crossings: MessageReader<TriggerCrossed>, mut summary: ResMut<RunSummary>) {
    for crossing in crossings.read() {
        if crossing.entered {
            summary.triggers_entered += 1;
        } else {
            summary.triggers_exited += 1;
        }
    }
}

fn main() -> AppExit {
    let mut app = App::new();

    // Headless plugins (no rendering), one frame per fixed tick
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());

    let dir = assets_dir();
    let (controller, arena, script) = match load_sandbox(&dir) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("{err}");
            return AppExit::error();
        }
    };
    info!(
        "Loaded sandbox from {:?}: {} script steps ({} frames)",
        dir,
        script.steps.len(),
        script.total_frames()
    );

    app.insert_resource(controller)
        .insert_resource(arena)
        .insert_resource(ScriptPlayer::new(script))
        .init_resource::<RunSummary>()
        .add_plugins(ArenaPlugin)
        .add_systems(PreUpdate, drive_script)
        .add_systems(Update, (record_attacks, record_triggers));

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;
    use script::ScriptStep;

    #[test]
    fn shipped_sandbox_files_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets");
        let (_, _, script) = load_sandbox(&dir).expect("sandbox files load");
        assert!(script.total_frames() > 0);
    }

    #[test]
    fn exits_once_the_script_is_played() {
        let mut world = World::new();
        world.init_resource::<Messages<ControllerInput>>();
        world.init_resource::<Messages<AppExit>>();
        world.init_resource::<RunSummary>();
        world.insert_resource(ScriptPlayer::new(InputScript {
            steps: vec![ScriptStep {
                frames: 2,
                ..default()
            }],
        }));

        for _ in 0..2 {
            world.run_system_once(drive_script).expect("script runs");
        }
        assert!(world.resource::<ScriptPlayer>().is_finished());
        assert!(world.resource::<Messages<AppExit>>().is_empty());
        // Move and look on each scripted frame.
        assert_eq!(world.resource::<Messages<ControllerInput>>().len(), 4);

        world.run_system_once(drive_script).expect("script runs");
        assert_eq!(world.resource::<Messages<AppExit>>().len(), 1);
    }
}
