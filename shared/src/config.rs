//! RON configuration for the controller and the arena.
//!
//! Files are plain RON documents; every field has a default, so a file only needs
//! to list what it changes.

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

use crate::{
    combat::damage::ENEMY_KIND,
    components::{AttackParams, CharacterBody, CollisionLayers, ControllerTuning, SurfaceTag},
    error::ConfigError,
    player::{CAMERA_PIVOT_OFFSET, SPAWN_POSITION},
};

/// Everything needed to spawn one controller
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    pub tuning: ControllerTuning,
    pub attack: AttackParams,
    pub body: CharacterBody,
    pub pivot_offset: [f32; 3],
    pub spawn_position: [f32; 3],
    /// Initial facing, clockwise from -Z (radians)
    pub spawn_yaw: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tuning: ControllerTuning::default(),
            attack: AttackParams::default(),
            body: CharacterBody::default(),
            pivot_offset: CAMERA_PIVOT_OFFSET,
            spawn_position: SPAWN_POSITION,
            spawn_yaw: 0.0,
        }
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl ControllerConfig {
    /// Reject values the controller cannot work with.
    /// Tuning that is merely unusual (huge acceleration, negative gravity) is allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("tuning.damping", self.tuning.damping, 0.0, 1.0)?;
        check_range("tuning.teleport_range", self.tuning.teleport_range, 0.0, f32::MAX)?;
        check_range("attack.radius", self.attack.radius, 0.0, f32::MAX)?;
        check_range("body.radius", self.body.radius, f32::EPSILON, f32::MAX)?;
        check_range("body.height", self.body.height, f32::EPSILON, f32::MAX)?;
        Ok(())
    }
}

/// Static box in the arena
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BoxSpec {
    pub name: String,
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
    pub surface: SurfaceTag,
    pub layers: CollisionLayers,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self {
            name: "Box".to_string(),
            center: [0.0; 3],
            half_extents: [0.5; 3],
            surface: SurfaceTag::Ground,
            layers: CollisionLayers::DEFAULT,
        }
    }
}

/// Damageable target. `kind: None` spawns a target with no damage handler.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TargetSpec {
    pub name: String,
    pub kind: Option<String>,
    pub position: [f32; 3],
    pub radius: f32,
    pub health: f32,
    pub layers: CollisionLayers,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            name: "Enemy".to_string(),
            kind: Some(ENEMY_KIND.to_string()),
            position: [0.0; 3],
            radius: 0.5,
            health: 100.0,
            layers: CollisionLayers::ENEMY,
        }
    }
}

/// Trigger volume sinking at a constant speed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DrifterSpec {
    pub name: String,
    pub position: [f32; 3],
    pub half_extents: [f32; 3],
    pub speed: f32,
}

impl Default for DrifterSpec {
    fn default() -> Self {
        Self {
            name: "Drifter".to_string(),
            position: [0.0; 3],
            half_extents: [1.0; 3],
            speed: 0.5,
        }
    }
}

/// Extra enemies placed at random (seeded) positions
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ScatterSpec {
    pub count: usize,
    pub seed: u64,
    /// Half-size of the square area around the origin
    pub extent: f32,
    /// Height of the target centres
    pub height: f32,
    pub template: TargetSpec,
}

impl Default for ScatterSpec {
    fn default() -> Self {
        Self {
            count: 0,
            seed: 0,
            extent: 10.0,
            height: 0.5,
            template: TargetSpec::default(),
        }
    }
}

/// Arena layout
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct ArenaConfig {
    pub boxes: Vec<BoxSpec>,
    pub targets: Vec<TargetSpec>,
    pub drifters: Vec<DrifterSpec>,
    pub scatter: Option<ScatterSpec>,
}

impl ArenaConfig {
    /// Explicit targets followed by the scattered ones
    pub fn all_targets(&self) -> Vec<TargetSpec> {
        let mut targets = self.targets.clone();
        if let Some(scatter) = &self.scatter {
            targets.extend(scatter.generate());
        }
        targets
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for target in self.all_targets() {
            check_range("targets.radius", target.radius, 0.0, f32::MAX)?;
        }
        for drifter in &self.drifters {
            check_range("drifters.speed", drifter.speed, f32::MIN, f32::MAX)?;
        }
        Ok(())
    }
}

impl ScatterSpec {
    /// Same seed, same positions
    pub fn generate(&self) -> Vec<TargetSpec> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let extent = self.extent.abs().max(f32::EPSILON);
        (0..self.count)
            .map(|i| TargetSpec {
                name: format!("{} {}", self.template.name, i + 1),
                position: [
                    rng.gen_range(-extent..extent),
                    self.height,
                    rng.gen_range(-extent..extent),
                ],
                ..self.template.clone()
            })
            .collect()
    }
}

/// Parse a RON document; `path` is only used for error reporting.
pub fn parse_ron<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T, ConfigError> {
    ron::from_str(text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read and parse a RON file.
pub fn load_ron<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_ron(&text, path)
}

pub fn load_controller_config(path: impl AsRef<Path>) -> Result<ControllerConfig, ConfigError> {
    let config: ControllerConfig = load_ron(path)?;
    config.validate()?;
    Ok(config)
}

pub fn load_arena_config(path: impl AsRef<Path>) -> Result<ArenaConfig, ConfigError> {
    let config: ArenaConfig = load_ron(path)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> &'static Path {
        Path::new("test.ron")
    }

    #[test]
    fn shipped_assets_load_and_validate() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets");

        let controller =
            load_controller_config(assets.join("controller.ron")).expect("controller.ron loads");
        assert!(controller.tuning.pitch_limit > 0.0);

        let arena = load_arena_config(assets.join("arena.ron")).expect("arena.ron loads");
        assert!(arena.boxes.iter().any(|b| b.surface == SurfaceTag::Ground));
        assert!(arena
            .all_targets()
            .iter()
            .any(|t| t.kind.as_deref() == Some(ENEMY_KIND)));
    }

    #[test]
    fn partial_controller_file_keeps_defaults() {
        let config: ControllerConfig =
            parse_ron("(tuning: (acceleration: 10.0, damping: 0.0))", here()).expect("parses");
        assert_eq!(config.tuning.acceleration, 10.0);
        assert_eq!(config.tuning.damping, 0.0);
        assert_eq!(config.tuning.gravity, ControllerTuning::default().gravity);
        assert_eq!(config.attack, AttackParams::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn damping_above_one_is_rejected() {
        let config: ControllerConfig =
            parse_ron("(tuning: (damping: 1.5))", here()).expect("parses");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "tuning.damping",
                ..
            })
        ));
    }

    #[test]
    fn negative_attack_radius_is_rejected() {
        let config: ControllerConfig =
            parse_ron("(attack: (radius: -1.0))", here()).expect("parses");
        assert!(config.validate().is_err());
    }

    #[test]
    fn layers_are_plain_masks() {
        let config: ControllerConfig =
            parse_ron("(attack: (targets: 6))", here()).expect("parses");
        assert!(config.attack.targets.intersects(CollisionLayers::ENEMY));
        assert!(config.attack.targets.intersects(CollisionLayers::PLAYER));
    }

    #[test]
    fn malformed_file_reports_path() {
        let err = parse_ron::<ControllerConfig>("(tuning: ", here()).expect_err("bad ron");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, here()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_controller_config("does/not/exist.ron").expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn arena_parses_boxes_targets_and_drifters() {
        let text = r#"(
            boxes: [(name: "Ground", center: (0.0, -0.5, 0.0), half_extents: (20.0, 0.5, 20.0))],
            targets: [
                (name: "Grunt", position: (0.0, 0.5, -3.0)),
                (name: "Crate", kind: None, layers: 4),
            ],
            drifters: [(name: "Sinker", position: (4.0, 6.0, 0.0), speed: 1.0)],
        )"#;
        let arena: ArenaConfig = parse_ron(text, here()).expect("parses");
        assert_eq!(arena.boxes[0].surface, SurfaceTag::Ground);
        assert_eq!(arena.targets[0].kind.as_deref(), Some(ENEMY_KIND));
        assert_eq!(arena.targets[1].kind, None);
        assert_eq!(arena.drifters[0].speed, 1.0);
        assert!(arena.validate().is_ok());
    }

    #[test]
    fn scatter_is_deterministic_and_in_bounds() {
        let scatter = ScatterSpec {
            count: 8,
            seed: 42,
            extent: 5.0,
            height: 0.5,
            template: TargetSpec::default(),
        };
        let first = scatter.generate();
        let second = scatter.generate();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
        for target in &first {
            assert!(target.position[0].abs() <= 5.0);
            assert!(target.position[2].abs() <= 5.0);
            assert_eq!(target.position[1], 0.5);
        }
        assert_eq!(first[0].name, "Enemy 1");
    }
}
