use std::path::PathBuf;

/// 场景与渲染过程中可能出现的错误
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// 配置文件无法解析
    #[error("config parse error for {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    /// 只有 0 号和 1 号纹理槽
    #[error("texture slot {0} does not exist (expected 0 or 1)")]
    TextureSlot(usize),

    #[error("block position ({x}, {y}, {z}) is outside the map")]
    BlockOutOfRange { x: i32, y: i32, z: i32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SceneError>;
