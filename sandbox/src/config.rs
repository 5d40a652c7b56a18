// Copyright 2025 the vantage authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sandbox configuration, loaded from a JSON file with per-field defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which demo scene to start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneSelection {
    /// The drifting star-field.
    Starfield,
    /// Shadow-mapped shapes.
    Shadow,
    /// Textured quads.
    Quads,
}

/// A simulated window resize at a fixed frame, to exercise the reload path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// The frame number at which the resize fires.
    pub at_frame: u64,
    /// The new output width.
    pub width: u32,
    /// The new output height.
    pub height: u32,
}

/// Post-processing toggles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PostConfig {
    /// Enables the SMAA stage.
    #[serde(default = "default_true")]
    pub smaa: bool,
    /// Enables the color-grading stage.
    #[serde(default = "default_true")]
    pub color_grading: bool,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            smaa: true,
            color_grading: true,
        }
    }
}

/// The sandbox run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Output height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Number of frames in flight (uniform-buffer slots per scene).
    #[serde(default = "default_frames_in_flight")]
    pub frames_in_flight: u32,
    /// Number of frames to simulate before exiting.
    #[serde(default = "default_frames")]
    pub frames: u64,
    /// The scene to run.
    #[serde(default = "default_scene")]
    pub scene: SceneSelection,
    /// Deterministic seed for scene content.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Optional simulated resize.
    #[serde(default)]
    pub resize: Option<ResizeConfig>,
    /// Optional simulated shader hot-reload at a fixed frame.
    #[serde(default)]
    pub reload_shaders_at: Option<u64>,
    /// Post-processing toggles.
    #[serde(default)]
    pub post: PostConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frames_in_flight: default_frames_in_flight(),
            frames: default_frames(),
            scene: default_scene(),
            seed: default_seed(),
            resize: None,
            reload_shaders_at: None,
            post: PostConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_frames_in_flight() -> u32 {
    3
}

fn default_frames() -> u64 {
    120
}

fn default_scene() -> SceneSelection {
    SceneSelection::Starfield
}

fn default_seed() -> u64 {
    42
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.width, 1280);
        assert_eq!(config.frames_in_flight, 3);
        assert_eq!(config.scene, SceneSelection::Starfield);
        assert!(config.post.smaa);
    }

    #[test]
    fn partial_override() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "scene": "shadow", "post": { "smaa": false }, "resize": { "at_frame": 10, "width": 640, "height": 480 } }"#,
        )
        .unwrap();
        assert_eq!(config.scene, SceneSelection::Shadow);
        assert!(!config.post.smaa);
        assert!(config.post.color_grading);
        assert_eq!(config.resize.unwrap().at_frame, 10);
    }
}
