//! Keyboard/mouse to controller input
//!
//! Axes are sampled every frame; buttons are sent on press and release only.

use bevy::input::mouse::MouseMotion;
use bevy::input::InputSystems;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use shared::{AttackDebugDraw, ButtonSample, ControllerAction, ControllerInput};

/// Device sampling, cursor grab and the debug toggle
pub struct ControllerInputPlugin;

impl Plugin for ControllerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            // Sample before grabbing: the click that locks the cursor must not attack.
            (send_controller_input, grab_cursor)
                .chain()
                .after(InputSystems),
        )
        .add_systems(Update, toggle_attack_debug);
    }
}

/// Mouse pixels to look-axis units
pub const MOUSE_LOOK_SCALE: f32 = 0.1;

/// WASD as a move axis (x = strafe right, y = forward). Not normalized.
pub fn move_axis(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    axis
}

/// Press/release sample for a button this frame, if its level changed
fn button_edge<T>(input: &ButtonInput<T>, button: T) -> Option<ButtonSample>
where
    T: Copy + Eq + std::hash::Hash + Send + Sync + 'static,
{
    if input.just_pressed(button) {
        Some(ButtonSample::PRESSED)
    } else if input.just_released(button) {
        Some(ButtonSample::RELEASED)
    } else {
        None
    }
}

fn cursor_locked(cursor: &Query<&CursorOptions, With<PrimaryWindow>>) -> bool {
    cursor
        .single()
        .is_ok_and(|c| c.grab_mode == CursorGrabMode::Locked)
}

/// Sample devices and write this frame's controller input
pub fn send_controller_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    cursor: Query<&CursorOptions, With<PrimaryWindow>>,
    mut inputs: MessageWriter<ControllerInput>,
) {
    let locked = cursor_locked(&cursor);

    let mut delta = Vec2::ZERO;
    for motion in mouse_motion.read() {
        delta += motion.delta;
    }
    // Screen y grows downward; look up is positive.
    let look = if locked {
        Vec2::new(delta.x, -delta.y) * MOUSE_LOOK_SCALE
    } else {
        Vec2::ZERO
    };

    inputs.write(ControllerInput(ControllerAction::Move(move_axis(&keyboard))));
    inputs.write(ControllerInput(ControllerAction::Look(look)));

    if let Some(sample) = button_edge(&keyboard, KeyCode::Space) {
        inputs.write(ControllerInput(ControllerAction::Jump(sample)));
    }

    // Buttons only count while the cursor is captured.
    if !locked {
        return;
    }
    if let Some(sample) = button_edge(&mouse_button, MouseButton::Left) {
        inputs.write(ControllerInput(ControllerAction::Fire(sample)));
    }
    if let Some(sample) = button_edge(&mouse_button, MouseButton::Right) {
        inputs.write(ControllerInput(ControllerAction::Fire2(sample)));
    }
}

/// Lock and hide the cursor on click; Escape releases it
pub fn grab_cursor(
    mut cursor_opts: Query<&mut CursorOptions, With<PrimaryWindow>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    let Ok(mut cursor) = cursor_opts.single_mut() else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    }
}

/// Toggle attack sphere debug drawing with F3
pub fn toggle_attack_debug(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_draw: ResMut<AttackDebugDraw>,
) {
    if keyboard.just_pressed(KeyCode::F3) {
        debug_draw.0 = !debug_draw.0;
        info!("Attack debug draw: {}", if debug_draw.0 { "ON" } else { "OFF" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;

    fn input_app() -> (App, Entity) {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<AttackDebugDraw>()
            .add_message::<MouseMotion>()
            .add_message::<ControllerInput>()
            .add_plugins(ControllerInputPlugin);
        let window = app
            .world_mut()
            .spawn((PrimaryWindow, CursorOptions::default()))
            .id();
        (app, window)
    }

    /// Run one frame and return the fire samples it produced
    fn fire_samples(app: &mut App) -> Vec<ButtonSample> {
        app.update();
        app.world_mut()
            .resource_mut::<Messages<ControllerInput>>()
            .drain()
            .filter_map(|ControllerInput(action)| match action {
                ControllerAction::Fire(sample) => Some(sample),
                _ => None,
            })
            .collect()
    }

    fn mouse(app: &mut App) -> Mut<'_, ButtonInput<MouseButton>> {
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>()
    }

    #[test]
    fn grabbing_click_does_not_attack() {
        let (mut app, window) = input_app();

        mouse(&mut app).press(MouseButton::Left);
        assert!(fire_samples(&mut app).is_empty());
        let cursor = app.world().get::<CursorOptions>(window).expect("cursor options");
        assert_eq!(cursor.grab_mode, CursorGrabMode::Locked);

        // Still held: no edge.
        mouse(&mut app).clear();
        assert!(fire_samples(&mut app).is_empty());

        mouse(&mut app).clear();
        mouse(&mut app).release(MouseButton::Left);
        assert_eq!(fire_samples(&mut app), vec![ButtonSample::RELEASED]);

        mouse(&mut app).clear();
        mouse(&mut app).press(MouseButton::Left);
        assert_eq!(fire_samples(&mut app), vec![ButtonSample::PRESSED]);
    }

    #[test]
    fn escape_releases_cursor_and_mutes_buttons() {
        let (mut app, window) = input_app();
        mouse(&mut app).press(MouseButton::Left);
        fire_samples(&mut app);

        mouse(&mut app).clear();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        fire_samples(&mut app);
        let cursor = app.world().get::<CursorOptions>(window).expect("cursor options");
        assert_eq!(cursor.grab_mode, CursorGrabMode::None);

        mouse(&mut app).release(MouseButton::Left);
        assert!(fire_samples(&mut app).is_empty());
    }

    #[test]
    fn wasd_maps_to_unnormalized_axis() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyW);
        keyboard.press(KeyCode::KeyD);
        assert_eq!(move_axis(&keyboard), Vec2::new(1.0, 1.0));

        keyboard.press(KeyCode::KeyS);
        assert_eq!(move_axis(&keyboard), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn button_edges_follow_press_and_release() {
        let mut mouse = ButtonInput::<MouseButton>::default();
        assert_eq!(button_edge(&mouse, MouseButton::Left), None);

        mouse.press(MouseButton::Left);
        assert_eq!(button_edge(&mouse, MouseButton::Left), Some(ButtonSample::PRESSED));

        mouse.clear();
        assert_eq!(button_edge(&mouse, MouseButton::Left), None);

        mouse.release(MouseButton::Left);
        assert_eq!(button_edge(&mouse, MouseButton::Left), Some(ButtonSample::RELEASED));
    }
}
