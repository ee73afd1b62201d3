//! Fixed-step character motion.
//!
//! - Accelerates along the body's forward/right axes from the move axis
//! - Damps the whole velocity vector
//! - Pins vertical velocity while grounded (plus jump impulse), applies gravity otherwise
//! - Hands the result to the movement service, which resolves collisions and reports grounding
//!
//! Runs at a fixed timestep (see [`crate::FIXED_TIMESTEP_HZ`]).

use bevy::prelude::*;

use crate::{
    backend::{MoveReport, MovementService},
    components::{CharacterBody, ControllerTuning, MotionState},
    input::InputFrame,
    player::GROUNDED_VERTICAL_VELOCITY,
};

/// Update `state.velocity` for one fixed step.
///
/// `forward`/`right` are the body's current world axes. `state.grounded` is the
/// flag reported by the previous sweep.
pub fn integrate_velocity(
    input: &InputFrame,
    tuning: &ControllerTuning,
    forward: Vec3,
    right: Vec3,
    state: &mut MotionState,
    dt: f32,
) {
    // --- Ground-plane acceleration ---
    let ground_accel = input.move_axis * dt * tuning.acceleration;
    state.velocity += forward * ground_accel.y;
    state.velocity += right * ground_accel.x;

    // --- Damping ---
    state.velocity -= state.velocity * tuning.damping;

    // --- Vertical ---
    if state.grounded {
        state.velocity.y = GROUNDED_VERTICAL_VELOCITY;
        if input.jump_held {
            state.velocity.y += tuning.jump_thrust;
        }
    } else {
        state.velocity.y -= tuning.gravity * dt;
    }
}

/// Step one controller a fixed tick: integrate, sweep, record grounding.
#[allow(clippy::too_many_arguments)]
pub fn step_character<M: MovementService + ?Sized>(
    movement: &mut M,
    body: Entity,
    input: &InputFrame,
    tuning: &ControllerTuning,
    shape: &CharacterBody,
    transform: &mut Transform,
    state: &mut MotionState,
    dt: f32,
) -> MoveReport {
    let forward = *transform.forward();
    let right = *transform.right();

    integrate_velocity(input, tuning, forward, right, state, dt);

    let report = movement.move_and_collide(body, transform, shape, state.velocity);
    state.grounded = report.grounded;
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    fn still() -> ControllerTuning {
        ControllerTuning {
            acceleration: 10.0,
            damping: 0.0,
            gravity: 9.0,
            jump_thrust: 3.0,
            ..default()
        }
    }

    fn facing_z() -> Transform {
        Transform::IDENTITY.looking_to(Vec3::Z, Vec3::Y)
    }

    /// Applies motion verbatim and reports a fixed grounded flag.
    struct FlatMover {
        grounded: bool,
        moves: Vec<Vec3>,
    }

    impl MovementService for FlatMover {
        fn move_and_collide(
            &mut self,
            _body: Entity,
            transform: &mut Transform,
            _shape: &CharacterBody,
            motion: Vec3,
        ) -> MoveReport {
            transform.translation += motion;
            self.moves.push(motion);
            MoveReport {
                grounded: self.grounded,
            }
        }

        fn set_collision_enabled(&mut self, _body: Entity, _enabled: bool) {}
    }

    #[test]
    fn full_forward_adds_accel_times_dt_per_step() {
        let transform = facing_z();
        let input = InputFrame {
            move_axis: Vec2::new(0.0, 1.0),
            ..default()
        };
        let mut state = MotionState::default();
        let tuning = still();

        let mut last_z = 0.0;
        for _ in 0..5 {
            integrate_velocity(
                &input,
                &tuning,
                *transform.forward(),
                *transform.right(),
                &mut state,
                DT,
            );
            assert!((state.velocity.z - last_z - 0.2).abs() < 1e-5);
            last_z = state.velocity.z;
        }
    }

    #[test]
    fn strafe_uses_right_axis() {
        let transform = facing_z();
        let input = InputFrame {
            move_axis: Vec2::new(1.0, 0.0),
            ..default()
        };
        let mut state = MotionState::default();
        integrate_velocity(
            &input,
            &still(),
            *transform.forward(),
            *transform.right(),
            &mut state,
            DT,
        );
        let expected = *transform.right() * 0.2;
        assert!((state.velocity.x - expected.x).abs() < 1e-5);
        assert!(state.velocity.z.abs() < 1e-5);
    }

    #[test]
    fn grounded_pins_vertical_velocity() {
        let mut state = MotionState {
            velocity: Vec3::new(0.0, 5.0, 0.0),
            grounded: true,
        };
        integrate_velocity(
            &InputFrame::default(),
            &still(),
            Vec3::NEG_Z,
            Vec3::X,
            &mut state,
            DT,
        );
        assert_eq!(state.velocity.y, GROUNDED_VERTICAL_VELOCITY);
    }

    #[test]
    fn grounded_jump_adds_thrust_to_pin() {
        let mut state = MotionState {
            velocity: Vec3::new(0.0, -7.0, 0.0),
            grounded: true,
        };
        let input = InputFrame {
            jump_held: true,
            ..default()
        };
        let tuning = still();
        integrate_velocity(&input, &tuning, Vec3::NEG_Z, Vec3::X, &mut state, DT);
        assert_eq!(
            state.velocity.y,
            GROUNDED_VERTICAL_VELOCITY + tuning.jump_thrust
        );
    }

    #[test]
    fn airborne_falls_by_gravity_dt_each_step() {
        let tuning = still();
        let mut state = MotionState {
            velocity: Vec3::new(0.0, 1.0, 0.0),
            grounded: false,
        };
        // Jump held in the air does nothing.
        let input = InputFrame {
            jump_held: true,
            ..default()
        };
        let mut previous = state.velocity.y;
        for _ in 0..10 {
            integrate_velocity(&input, &tuning, Vec3::NEG_Z, Vec3::X, &mut state, DT);
            assert!(state.velocity.y < previous);
            assert!((previous - state.velocity.y - tuning.gravity * DT).abs() < 1e-5);
            previous = state.velocity.y;
        }
    }

    #[test]
    fn damping_removes_fraction_of_velocity() {
        let tuning = ControllerTuning {
            damping: 0.25,
            gravity: 0.0,
            ..still()
        };
        let mut state = MotionState {
            velocity: Vec3::new(4.0, 0.0, -8.0),
            grounded: false,
        };
        integrate_velocity(
            &InputFrame::default(),
            &tuning,
            Vec3::NEG_Z,
            Vec3::X,
            &mut state,
            DT,
        );
        assert!((state.velocity - Vec3::new(3.0, 0.0, -6.0)).length() < 1e-5);
    }

    #[test]
    fn step_passes_velocity_and_records_grounding() {
        let mut mover = FlatMover {
            grounded: true,
            moves: Vec::new(),
        };
        let mut transform = facing_z();
        let mut state = MotionState::default();
        let input = InputFrame {
            move_axis: Vec2::new(0.0, 1.0),
            ..default()
        };

        let report = step_character(
            &mut mover,
            Entity::PLACEHOLDER,
            &input,
            &still(),
            &CharacterBody::default(),
            &mut transform,
            &mut state,
            DT,
        );

        assert!(report.grounded);
        assert!(state.grounded);
        assert_eq!(mover.moves, vec![state.velocity]);
        assert!((transform.translation - state.velocity).length() < 1e-6);

        // Next step sees the grounded flag and pins vertical velocity.
        step_character(
            &mut mover,
            Entity::PLACEHOLDER,
            &InputFrame::default(),
            &still(),
            &CharacterBody::default(),
            &mut transform,
            &mut state,
            DT,
        );
        assert_eq!(state.velocity.y, GROUNDED_VERTICAL_VELOCITY);
    }
}
