//! CPU 软光栅化的小型 3D 场景：天空盒、地板、球、灯光标记、乌龟模型和方块地图。

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod mesh;
pub mod rasterizer;
pub mod renderer;
pub mod scene;
pub mod shape;
pub mod texture;
pub mod transform;
pub mod vertex;

pub use app::App;
pub use config::SceneConfig;
pub use error::{Result, SceneError};
pub use renderer::{CullMode, FrameStats, Renderer, TextureMode};
pub use shape::Shape;
pub use transform::Transform;
