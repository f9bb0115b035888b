use glam::Vec2;
use serde::{Deserialize, Serialize};
use squash_common::Color;
use std::path::Path;

use crate::body::Body;
use crate::config::{ConfigError, SimConfig};

/// Errors from loading or validating a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported scene format: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("body {index}: {reason}")]
    InvalidBody { index: usize, reason: String },
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Initial configuration of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub position: Vec2,
    pub half_extents: Vec2,
    /// Zero (the default) makes the body a wall.
    #[serde(default)]
    pub mass: f32,
    #[serde(default)]
    pub velocity: Vec2,
    /// Dynamic bodies without an explicit acceleration fall with the scene
    /// gravity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Vec2>,
    #[serde(default)]
    pub color: Color,
}

impl BodySpec {
    pub fn ball(position: Vec2, radius: f32, mass: f32, color: Color) -> Self {
        Self {
            position,
            half_extents: Vec2::splat(radius),
            mass,
            velocity: Vec2::ZERO,
            acceleration: None,
            color,
        }
    }

    pub fn wall(position: Vec2, half_extents: Vec2, color: Color) -> Self {
        Self {
            position,
            half_extents,
            mass: 0.0,
            velocity: Vec2::ZERO,
            acceleration: None,
            color,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    fn validate(&self, index: usize) -> Result<(), SceneError> {
        let invalid = |reason: String| SceneError::InvalidBody { index, reason };
        if !(self.half_extents.x > 0.0 && self.half_extents.y > 0.0)
            || !self.half_extents.is_finite()
        {
            return Err(invalid(format!(
                "half extents must be positive and finite, got {:?}",
                self.half_extents
            )));
        }
        if !(self.mass >= 0.0 && self.mass.is_finite()) {
            return Err(invalid(format!(
                "mass must be non-negative and finite, got {}",
                self.mass
            )));
        }
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(invalid("position and velocity must be finite".into()));
        }
        if self.acceleration.is_some_and(|a| !a.is_finite()) {
            return Err(invalid("acceleration must be finite".into()));
        }
        Ok(())
    }

    fn to_body(self, gravity: Vec2) -> Body {
        let acceleration = match self.acceleration {
            Some(a) => a,
            None if self.mass > 0.0 => gravity,
            None => Vec2::ZERO,
        };
        Body {
            position: self.position,
            velocity: self.velocity,
            acceleration,
            half_extents: self.half_extents,
            mass: self.mass,
            squeeze: 1.0,
            squeeze_timer: 0,
            color: self.color,
        }
    }
}

/// Everything needed to build a world: step tunables and the ordered body list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub config: SimConfig,
    pub bodies: Vec<BodySpec>,
}

impl Scene {
    /// Four balls dropping into a box framed by the screen edges.
    ///
    /// Walls are 40 px thick and centered on each edge, so 20 px of each
    /// shows on screen.
    pub fn demo(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let (half_w, half_h) = ((width / 2) as f32, (height / 2) as f32);
        let launch = Vec2::new(2.0, 1.0);

        let bodies = vec![
            BodySpec::ball(Vec2::new(25.0, 25.0), 10.0, 1.0, Color::RED).with_velocity(launch),
            BodySpec::ball(Vec2::new(50.0, 50.0), 20.0, 2.0, Color::GREEN).with_velocity(launch),
            BodySpec::ball(Vec2::new(75.0, 75.0), 15.0, 1.5, Color::BLUE).with_velocity(launch),
            BodySpec::ball(Vec2::new(100.0, 100.0), 30.0, 3.0, Color::RED).with_velocity(launch),
            BodySpec::wall(Vec2::new(half_w, 0.0), Vec2::new(half_w, 20.0), Color::BLACK),
            BodySpec::wall(Vec2::new(half_w, h), Vec2::new(half_w, 20.0), Color::BLACK),
            BodySpec::wall(Vec2::new(0.0, half_h), Vec2::new(20.0, half_h), Color::BLACK),
            BodySpec::wall(Vec2::new(w, half_h), Vec2::new(20.0, half_h), Color::BLACK),
        ];

        Self {
            config: SimConfig::default(),
            bodies,
        }
    }

    /// Materialize the body list, in order.
    pub fn bodies(&self) -> Vec<Body> {
        self.bodies
            .iter()
            .map(|spec| spec.to_body(self.config.gravity))
            .collect()
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        self.config.validate()?;
        for (index, spec) in self.bodies.iter().enumerate() {
            spec.validate(index)?;
        }
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_yaml::from_str(s)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn from_json_str(s: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(s)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_yaml_string(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a scene file, picking the format from the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;
        let scene = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            _ => return Err(SceneError::UnsupportedFormat(ext)),
        };
        tracing::info!(
            path = %path.display(),
            bodies = scene.bodies.len(),
            "scene loaded"
        );
        Ok(scene)
    }
}
