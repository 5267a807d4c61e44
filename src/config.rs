use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cgmath::Vector3 as Vec3;
use serde::Deserialize;

use crate::error::{Result, SceneError};

/// 超采样倍数上限
pub const MAX_SSAA: usize = 16;

/// 场景配置；JSON 中缺省的字段取默认值
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    /// 超采样倍数，1 表示不做
    pub ssaa: usize,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub clear_color: [f32; 3],
    pub textures: TextureConfig,
    pub map_seed: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub spot_position: [f32; 3],
    pub spot_direction: [f32; 3],
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// 地板和球；未配置或读取失败时用棋盘格
    pub texture0: Option<PathBuf>,
    /// 可选的第二张纹理，球会与 texture0 混合
    pub texture1: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            ssaa: 1,
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            clear_color: [0.15, 0.15, 0.7],
            textures: TextureConfig::default(),
            map_seed: 2024,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, -7.0],
            target: [0.0, 0.0, 100.0],
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 6.0, 0.0],
            spot_position: [0.0, 4.0, 0.0],
            spot_direction: [0.0, -1.0, 0.0],
            color: [1.0, 1.0, 1.0],
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config: SceneConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| SceneError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("读取配置 {}", path.display());
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(json).map_err(|source| SceneError::Config {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidConfig(format!(
                "window size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if self.ssaa == 0 || self.ssaa > MAX_SSAA {
            return Err(SceneError::InvalidConfig(format!(
                "ssaa factor {} must be between 1 and {MAX_SSAA}",
                self.ssaa
            )));
        }
        let pixels = self
            .width
            .checked_mul(self.ssaa)
            .zip(self.height.checked_mul(self.ssaa))
            .and_then(|(w, h)| w.checked_mul(h));
        if pixels.is_none() {
            return Err(SceneError::InvalidConfig(format!(
                "render size {}x{} at ssaa x{} is too large",
                self.width, self.height, self.ssaa
            )));
        }
        if self.light.spot_direction.iter().all(|&c| c == 0.0) {
            return Err(SceneError::InvalidConfig("spotlight direction must be non-zero".into()));
        }
        if self.camera.position == self.camera.target {
            return Err(SceneError::InvalidConfig(
                "camera position and target must differ".into(),
            ));
        }
        Ok(())
    }

    /// 实际渲染分辨率（含超采样）
    pub fn render_size(&self) -> (usize, usize) {
        (self.width * self.ssaa, self.height * self.ssaa)
    }

    pub fn clear_color(&self) -> Vec3<f32> {
        self.clear_color.into()
    }

    pub fn light_color(&self) -> Vec3<f32> {
        self.light.color.into()
    }
}
