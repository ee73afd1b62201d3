//! Scripted input timeline.
//!
//! A script is a list of steps, each holding a set of input levels for a number
//! of frames. Button level changes become press/release samples; the axes are
//! re-sent every frame like a polled device would.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{ButtonSample, ControllerAction};

/// Input levels held for `frames` frames
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ScriptStep {
    pub frames: u32,
    pub move_axis: [f32; 2],
    pub look_axis: [f32; 2],
    pub jump: bool,
    pub fire: bool,
    pub fire2: bool,
}

impl Default for ScriptStep {
    fn default() -> Self {
        Self {
            frames: 1,
            move_axis: [0.0; 2],
            look_axis: [0.0; 2],
            jump: false,
            fire: false,
            fire2: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct InputScript {
    pub steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn total_frames(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.frames)).sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ButtonLevels {
    jump: bool,
    fire: bool,
    fire2: bool,
}

fn edge(was: bool, now: bool) -> Option<ButtonSample> {
    match (was, now) {
        (false, true) => Some(ButtonSample::PRESSED),
        (true, false) => Some(ButtonSample::RELEASED),
        _ => None,
    }
}

/// Plays an [`InputScript`] back one frame at a time
#[derive(Resource, Debug)]
pub struct ScriptPlayer {
    script: InputScript,
    step: usize,
    frame_in_step: u32,
    levels: ButtonLevels,
    frames_played: u64,
}

impl ScriptPlayer {
    pub fn new(script: InputScript) -> Self {
        Self {
            script,
            step: 0,
            frame_in_step: 0,
            levels: ButtonLevels::default(),
            frames_played: 0,
        }
    }

    pub fn frames_played(&self) -> u64 {
        self.frames_played
    }

    pub fn is_finished(&self) -> bool {
        self.current_step().is_none()
    }

    fn current_step(&self) -> Option<&ScriptStep> {
        // Zero-length steps are skipped by `advance`, except at the very start.
        self.script.steps[self.step.min(self.script.steps.len())..]
            .iter()
            .find(|s| s.frames > 0)
    }

    fn advance(&mut self) {
        self.frame_in_step += 1;
        while let Some(step) = self.script.steps.get(self.step) {
            if self.frame_in_step < step.frames {
                break;
            }
            self.step += 1;
            self.frame_in_step = 0;
        }
    }

    /// Samples for the next frame, or `None` once the script has ended.
    pub fn next_frame(&mut self) -> Option<Vec<ControllerAction>> {
        // Skip leading zero-length steps.
        while self.script.steps.get(self.step).is_some_and(|s| s.frames == 0) {
            self.step += 1;
        }
        let step = self.script.steps.get(self.step)?.clone();

        let mut actions = vec![
            ControllerAction::Move(Vec2::from_array(step.move_axis)),
            ControllerAction::Look(Vec2::from_array(step.look_axis)),
        ];

        let now = ButtonLevels {
            jump: step.jump,
            fire: step.fire,
            fire2: step.fire2,
        };
        if let Some(sample) = edge(self.levels.jump, now.jump) {
            actions.push(ControllerAction::Jump(sample));
        }
        if let Some(sample) = edge(self.levels.fire, now.fire) {
            actions.push(ControllerAction::Fire(sample));
        }
        if let Some(sample) = edge(self.levels.fire2, now.fire2) {
            actions.push(ControllerAction::Fire2(sample));
        }
        self.levels = now;

        self.frames_played += 1;
        self.advance();
        Some(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_count(actions: &[ControllerAction], sample: ButtonSample) -> usize {
        actions
            .iter()
            .filter(|a| **a == ControllerAction::Fire(sample))
            .count()
    }

    #[test]
    fn held_button_emits_one_press_and_one_release() {
        let mut player = ScriptPlayer::new(InputScript {
            steps: vec![
                ScriptStep {
                    frames: 5,
                    fire: true,
                    ..default()
                },
                ScriptStep {
                    frames: 2,
                    ..default()
                },
            ],
        });

        let mut frames = Vec::new();
        while let Some(actions) = player.next_frame() {
            frames.push(actions);
        }

        assert_eq!(frames.len(), 7);
        let all: Vec<ControllerAction> = frames.concat();
        assert_eq!(fire_count(&all, ButtonSample::PRESSED), 1);
        assert_eq!(fire_count(&all, ButtonSample::RELEASED), 1);
        assert_eq!(fire_count(&frames[0], ButtonSample::PRESSED), 1);
        assert_eq!(fire_count(&frames[5], ButtonSample::RELEASED), 1);
        assert!(player.is_finished());
    }

    #[test]
    fn axes_are_sent_every_frame() {
        let mut player = ScriptPlayer::new(InputScript {
            steps: vec![ScriptStep {
                frames: 3,
                move_axis: [0.0, 1.0],
                look_axis: [0.5, 0.0],
                ..default()
            }],
        });

        for _ in 0..3 {
            let actions = player.next_frame().expect("frame");
            assert!(actions.contains(&ControllerAction::Move(Vec2::new(0.0, 1.0))));
            assert!(actions.contains(&ControllerAction::Look(Vec2::new(0.5, 0.0))));
        }
        assert!(player.next_frame().is_none());
        assert_eq!(player.frames_played(), 3);
    }

    #[test]
    fn button_held_across_steps_is_not_repressed() {
        let mut player = ScriptPlayer::new(InputScript {
            steps: vec![
                ScriptStep {
                    frames: 1,
                    fire2: true,
                    ..default()
                },
                ScriptStep {
                    frames: 1,
                    fire2: true,
                    move_axis: [1.0, 0.0],
                    ..default()
                },
            ],
        });

        let first = player.next_frame().expect("frame");
        let second = player.next_frame().expect("frame");
        assert!(first.contains(&ControllerAction::Fire2(ButtonSample::PRESSED)));
        assert!(!second
            .iter()
            .any(|a| matches!(a, ControllerAction::Fire2(_))));
    }

    #[test]
    fn zero_length_steps_are_skipped() {
        let script = InputScript {
            steps: vec![
                ScriptStep {
                    frames: 0,
                    ..default()
                },
                ScriptStep {
                    frames: 2,
                    jump: true,
                    ..default()
                },
                ScriptStep {
                    frames: 0,
                    ..default()
                },
            ],
        };
        assert_eq!(script.total_frames(), 2);

        let mut player = ScriptPlayer::new(script);
        let first = player.next_frame().expect("frame");
        assert!(first.contains(&ControllerAction::Jump(ButtonSample::PRESSED)));
        assert!(player.next_frame().is_some());
        assert!(player.next_frame().is_none());
    }

    #[test]
    fn script_parses_from_ron() {
        let text = "(steps: [(frames: 10, move_axis: (0.0, 1.0)), (fire: true)])";
        let script: InputScript = ron::from_str(text).expect("parses");
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[1].frames, 1);
        assert!(script.steps[1].fire);
    }
}
