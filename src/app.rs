use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cgmath::Vector3 as Vec3;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::error::Result;
use crate::framebuffer::{self, FrameBuffer};
use crate::renderer::{FrameStats, FrameUniforms, Lighting, Renderer};
use crate::scene::{AnimationState, RenderToggles, VoxelMap, World};
use crate::texture::Texture;

/// 无窗口渲染时每帧固定推进的时间
pub const HEADLESS_STEP: f32 = 1.0 / 30.0;
const LIGHT_STEP: f32 = 0.2;

const GRASS_A: [u8; 4] = [74, 140, 52, 255];
const GRASS_B: [u8; 4] = [58, 112, 40, 255];
const DETAIL_A: [u8; 4] = [240, 220, 120, 200];
const DETAIL_B: [u8; 4] = [200, 90, 60, 0];

/// 每帧驱动：动画 -> 灯光 -> 上传 uniform -> 绘制整个场景
pub struct App {
    pub world: World,
    pub animation: AnimationState,
    pub toggles: RenderToggles,
    renderer: Renderer,
    config: SceneConfig,
    /// 点光源的基准位置；x 方向的扫动叠加在上面
    light_base: Vec3<f32>,
    spot_pos: Vec3<f32>,
    spot_dir: Vec3<f32>,
    clear_color: u32,
    start: Instant,
}

impl App {
    pub fn new(config: SceneConfig) -> Result<Self> {
        config.validate()?;
        let (render_w, render_h) = config.render_size();

        let texture0 = Arc::new(Texture::load_or_checker(
            config.textures.texture0.as_deref(),
            GRASS_A,
            GRASS_B,
        ));
        let texture1 = config
            .textures
            .texture1
            .as_deref()
            .map(|path| Arc::new(Texture::load_or_checker(Some(path), DETAIL_A, DETAIL_B)));

        let camera = Camera::new(
            config.camera.position.into(),
            config.camera.target.into(),
            config.width as f32 / config.height as f32,
        );
        let world = World::new(
            camera,
            VoxelMap::generate(config.map_seed),
            config.light_color(),
            texture0,
            texture1,
        )?;
        log::info!(
            "场景初始化完成：{}x{}（SSAA x{}），{} 个方块",
            config.width,
            config.height,
            config.ssaa,
            world.map.len()
        );

        Ok(Self {
            world,
            animation: AnimationState::new(),
            toggles: RenderToggles::default(),
            renderer: Renderer::new(render_w, render_h),
            light_base: config.light.position.into(),
            spot_pos: config.light.spot_position.into(),
            spot_dir: config.light.spot_direction.into(),
            clear_color: framebuffer::pack_color(config.clear_color()),
            config,
            start: Instant::now(),
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn lighting(&self) -> Lighting {
        Lighting {
            light_pos: self.light_base + Vec3::new(self.animation.light_x, 0.0, 0.0),
            spot_pos: self.spot_pos,
            spot_dir: self.spot_dir,
        }
    }

    /// 以真实经过的时间渲染一帧
    pub fn tick(&mut self) -> FrameStats {
        let seconds = self.start.elapsed().as_secs_f32();
        self.render_at(seconds)
    }

    /// 以给定时间渲染一帧
    pub fn render_at(&mut self, seconds: f32) -> FrameStats {
        let frame_start = Instant::now();

        self.animation.update(seconds);
        self.world.pose = self.animation.pose;
        let lighting = self.lighting();
        self.world
            .update_lights(lighting.light_pos, lighting.spot_pos, lighting.spot_dir);

        let camera = &self.world.camera;
        let frame = FrameUniforms {
            view: *camera.view_matrix(),
            projection: *camera.projection_matrix(),
            camera_pos: camera.position,
            lighting,
            lights_on: self.toggles.lights,
        };
        self.renderer.begin_frame(self.clear_color, frame);
        self.world.render(&mut self.renderer, &self.toggles);
        let stats = self.renderer.finish_frame();

        let ms = frame_start.elapsed().as_secs_f32() * 1000.0;
        log::trace!("ms: {ms:.1} fps: {:.1}", 1000.0 / ms.max(f32::EPSILON));
        stats
    }

    /// 降采样后的最终画面
    pub fn output(&self) -> FrameBuffer {
        self.renderer.framebuffer().ssaa(self.config.ssaa)
    }

    /// 固定时间步长逐帧渲染，输出 frame_000.png 等
    pub fn run_headless(&mut self, frames: usize, out_dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(out_dir)?;
        let mut written = Vec::with_capacity(frames);
        for i in 0..frames {
            let stats = self.render_at(i as f32 * HEADLESS_STEP);
            let path = out_dir.join(format!("frame_{i:03}.png"));
            self.output().save_to_image(&path)?;
            log::debug!("第 {i} 帧 -> {}，{} 个片元", path.display(), stats.fragments_shaded);
            written.push(path);
        }
        log::info!("已渲染 {frames} 帧到 {}", out_dir.display());
        Ok(written)
    }

    pub fn run_window(&mut self) -> Result<()> {
        let (w, h) = (self.config.width, self.config.height);
        let mut window = Window::new("blocky-world", w, h, WindowOptions::default())?;
        window.limit_update_rate(Some(Duration::from_micros(16_600)));
        log::info!("WASD 移动，Q/E 转向，鼠标拖拽观察，N 法线，L 灯光，F/R 放置/移除方块");

        while window.is_open() && !window.is_key_down(Key::Escape) {
            self.handle_input(&window);
            self.tick();
            let frame = self.output();
            window.update_with_buffer(&frame.data, frame.width, frame.height)?;
        }
        Ok(())
    }

    fn handle_input(&mut self, window: &Window) {
        let camera = &mut self.world.camera;
        if window.is_key_down(Key::W) {
            camera.move_forward();
        }
        if window.is_key_down(Key::S) {
            camera.move_backward();
        }
        if window.is_key_down(Key::A) {
            camera.move_left();
        }
        if window.is_key_down(Key::D) {
            camera.move_right();
        }
        if window.is_key_down(Key::Q) {
            camera.turn_left();
        }
        if window.is_key_down(Key::E) {
            camera.turn_right();
        }

        if window.get_mouse_down(MouseButton::Left) {
            if !camera.is_dragging() {
                camera.begin_drag();
            }
            if let Some((x, y)) = window.get_mouse_pos(MouseMode::Pass) {
                camera.drag_to(x, y);
            }
        } else if camera.is_dragging() {
            camera.end_drag();
        }

        let axis = |neg: Key, pos: Key| {
            let mut v = 0.0;
            if window.is_key_down(neg) {
                v -= LIGHT_STEP;
            }
            if window.is_key_down(pos) {
                v += LIGHT_STEP;
            }
            v
        };
        self.light_base += Vec3::new(
            axis(Key::Left, Key::Right),
            axis(Key::PageDown, Key::PageUp),
            axis(Key::Down, Key::Up),
        );
        // L 留给灯光开关，聚光灯用小键盘
        self.spot_pos += Vec3::new(
            axis(Key::NumPad4, Key::NumPad6),
            axis(Key::NumPad3, Key::NumPad9),
            axis(Key::NumPad2, Key::NumPad8),
        );

        let pressed = |key: Key| window.is_key_pressed(key, KeyRepeat::No);
        if pressed(Key::N) {
            self.toggles.normals = !self.toggles.normals;
            log::info!("法线可视化: {}", self.toggles.normals);
        }
        if pressed(Key::L) {
            self.toggles.lights = !self.toggles.lights;
            log::info!("灯光: {}", self.toggles.lights);
        }
        if pressed(Key::Space) {
            self.animation.toggle_joints();
        }
        if pressed(Key::LeftShift) || pressed(Key::RightShift) {
            self.animation.toggle_neck();
        }
        if pressed(Key::F) {
            if let Err(err) = self.world.place_block_in_front() {
                log::warn!("无法放置方块: {err}");
            }
        }
        if pressed(Key::R) {
            if let Err(err) = self.world.remove_block_in_front() {
                log::warn!("无法移除方块: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SceneConfig {
        SceneConfig {
            width: 48,
            height: 32,
            ssaa: 2,
            textures: Default::default(),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn light_sweep_is_added_to_base_position() {
        let mut app = App::new(small_config()).unwrap();
        app.render_at(0.0);
        assert_eq!(app.lighting().light_pos, Vec3::new(0.0, 6.0, 0.0));
        app.render_at(std::f32::consts::PI * 2.0);
        let x = app.lighting().light_pos.x;
        assert!((x - 10.0).abs() < 1e-3);
    }

    #[test]
    fn frame_renders_at_configured_size() {
        let mut app = App::new(small_config()).unwrap();
        let stats = app.render_at(0.0);
        assert!(stats.draw_calls > 28);
        assert!(stats.fragments_shaded > 0);
        let out = app.output();
        assert_eq!((out.width, out.height), (48, 32));
        assert_eq!(app.renderer().framebuffer().width, 96);
    }

    #[test]
    fn headless_frames_are_reproducible() {
        let dir = std::env::temp_dir().join(format!("blocky-world-app-{}", std::process::id()));
        let mut a = App::new(small_config()).unwrap();
        let paths = a.run_headless(2, &dir).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("frame_001.png"));
        assert!(paths.iter().all(|p| p.exists()));
        let first = a.output();

        let mut b = App::new(small_config()).unwrap();
        b.render_at(HEADLESS_STEP);
        assert_eq!(b.output().data, first.data);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn invalid_config_is_rejected() {
        for ssaa in [0, 1 << 30] {
            let config = SceneConfig {
                ssaa,
                ..small_config()
            };
            assert!(App::new(config).is_err());
        }
    }
}
