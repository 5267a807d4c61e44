pub mod clip;
pub mod fragment_shader;
pub mod vertex_shader;

use std::sync::Arc;

use cgmath::{
    InnerSpace, Matrix4 as Mat4, SquareMatrix, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4,
};
use rayon::prelude::*;

use crate::framebuffer::{self, Band, FrameBuffer};
use crate::mesh::Mesh;
use crate::rasterizer;
use crate::texture::Texture;
use crate::transform::Transform;
use crate::vertex::{ClipSpaceVertex, RasterPoint, RasterTriangle};

use self::clip::{Clipper, NearPlaneClipper};
use self::fragment_shader::{FragmentData, FragmentShader, SceneShader};
use self::vertex_shader::{DefaultVertexShader, VertexShader, VertexShaderUniforms};

/// 每个并行任务负责的行数
const BAND_ROWS: usize = 16;

pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// 片元着色器里的整数开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureMode {
    /// -3
    Normal,
    /// -2
    #[default]
    Color,
    /// -1
    Uv,
    /// 0
    Texture0,
    /// 1
    Texture1,
    /// 2: mix(t0.rgb, t1.rgb, t1.a)
    Blend,
    Unknown(i32),
}

impl From<i32> for TextureMode {
    fn from(value: i32) -> Self {
        match value {
            -3 => TextureMode::Normal,
            -2 => TextureMode::Color,
            -1 => TextureMode::Uv,
            0 => TextureMode::Texture0,
            1 => TextureMode::Texture1,
            2 => TextureMode::Blend,
            other => TextureMode::Unknown(other),
        }
    }
}

impl From<TextureMode> for i32 {
    fn from(mode: TextureMode) -> Self {
        match mode {
            TextureMode::Normal => -3,
            TextureMode::Color => -2,
            TextureMode::Uv => -1,
            TextureMode::Texture0 => 0,
            TextureMode::Texture1 => 1,
            TextureMode::Blend => 2,
            TextureMode::Unknown(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    /// 剔除背面（逆时针为正面）
    #[default]
    Back,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub light_pos: Vec3<f32>,
    pub spot_pos: Vec3<f32>,
    pub spot_dir: Vec3<f32>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            light_pos: Vec3::new(0.0, 6.0, 0.0),
            spot_pos: Vec3::new(0.0, 4.0, 0.0),
            spot_dir: Vec3::new(0.0, -1.0, 0.0),
        }
    }
}

/// 每帧上传一次的 uniform
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub view: Transform,
    pub projection: Transform,
    pub camera_pos: Vec3<f32>,
    pub lighting: Lighting,
    pub lights_on: bool,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Transform::identity(),
            projection: Transform::identity(),
            camera_pos: Vec3::new(0.0, 0.0, 0.0),
            lighting: Lighting::default(),
            lights_on: true,
        }
    }
}

/// 每次绘制调用上传的 uniform
#[derive(Debug, Clone)]
pub struct DrawUniforms {
    pub model: Transform,
    pub normal_matrix: Mat4<f32>,
    pub color: Vec4<f32>,
    pub texture_mode: TextureMode,
    pub specular: bool,
    pub texture0: Option<Arc<Texture>>,
    pub texture1: Option<Arc<Texture>>,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            model: Transform::identity(),
            normal_matrix: Mat4::identity(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            texture_mode: TextureMode::Color,
            specular: true,
            texture0: None,
            texture1: None,
        }
    }
}

impl DrawUniforms {
    pub fn texture(&self, slot: usize) -> Option<&Texture> {
        match slot {
            0 => self.texture0.as_deref(),
            1 => self.texture1.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub triangles_submitted: usize,
    /// 背面或零面积
    pub triangles_culled: usize,
    /// 完全落在近平面之后
    pub triangles_clipped: usize,
    pub triangles_rasterized: usize,
    pub fragments_shaded: usize,
}

pub struct Renderer {
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) viewport: Viewport,
    frame: FrameUniforms,
    draws: Vec<DrawUniforms>,
    queue: Vec<RasterTriangle>,
    stats: FrameStats,
}

impl Renderer {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            framebuffer: FrameBuffer::new(w, h),
            viewport: Viewport {
                x: 0,
                y: 0,
                w: w as i32,
                h: h as i32,
            },
            frame: FrameUniforms::default(),
            draws: Vec::new(),
            queue: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn frame_uniforms(&self) -> &FrameUniforms {
        &self.frame
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// 清屏并上传本帧 uniform；聚光灯方向在这里归一化
    pub fn begin_frame(&mut self, clear_color: u32, mut frame: FrameUniforms) {
        let dir = frame.lighting.spot_dir;
        frame.lighting.spot_dir = if dir.magnitude2() > f32::EPSILON {
            dir.normalize()
        } else {
            Vec3::new(0.0, -1.0, 0.0)
        };
        self.frame = frame;
        self.framebuffer.clear(clear_color);
        self.draws.clear();
        self.queue.clear();
        self.stats = FrameStats::default();
    }

    /// 一次绘制调用：顶点着色 -> 近平面裁剪 -> 视口变换 -> 背面剔除 -> 入队
    pub fn draw(&mut self, uniforms: DrawUniforms, mesh: &Mesh, cull: CullMode) {
        let draw_idx = self.draws.len();
        let mvp_matrix = self.frame.projection.mat * self.frame.view.mat * uniforms.model.mat;
        let vs_uniforms = VertexShaderUniforms {
            model_matrix: &uniforms.model.mat,
            mvp_matrix: &mvp_matrix,
            normal_matrix: &uniforms.normal_matrix,
        };
        let vertex_shader = DefaultVertexShader;
        let clipper = NearPlaneClipper;

        self.stats.draw_calls += 1;
        for triangle in &mesh.triangles {
            self.stats.triangles_submitted += 1;
            let clip_space_triangle = vertex_shader.shade_triangle(triangle, &vs_uniforms);
            let clipped = clipper.clip_triangle(&clip_space_triangle);
            if clipped.is_empty() {
                self.stats.triangles_clipped += 1;
                continue;
            }
            for clipped_triangle in clipped {
                let raster_triangle = self.viewport_transform(&clipped_triangle, draw_idx);
                let area = raster_triangle.signed_area();
                let visible = match cull {
                    // y 轴向下后，逆时针三角形的有向面积为负
                    CullMode::Back => area < 0.0,
                    CullMode::None => area != 0.0,
                };
                if !visible || !area.is_finite() {
                    self.stats.triangles_culled += 1;
                    continue;
                }
                self.queue.push(raster_triangle);
            }
        }
        self.draws.push(uniforms);
    }

    fn viewport_transform(
        &self,
        clip_triangle: &[ClipSpaceVertex; 3],
        draw: usize,
    ) -> RasterTriangle {
        let vertices = clip_triangle.map(|clip_v| {
            let w = clip_v.position.w;
            let ndc = clip_v.position / w;

            let screen_x = (ndc.x + 1.0) * 0.5 * self.viewport.w as f32 + self.viewport.x as f32;
            let screen_y = self.viewport.h as f32 - (ndc.y + 1.0) * 0.5 * self.viewport.h as f32
                + self.viewport.y as f32;

            RasterPoint {
                pos: Vec2::new(screen_x, screen_y),
                z: (ndc.z + 1.0) * 0.5,
                inv_w: 1.0 / w,
                world_pos: clip_v.world_pos,
                normal: clip_v.normal,
                uv: clip_v.uv,
            }
        });
        RasterTriangle { vertices, draw }
    }

    /// 并行光栅化本帧所有排队的三角形，返回统计信息
    pub fn finish_frame(&mut self) -> FrameStats {
        let shader = SceneShader::new(&self.frame);
        let queue = &self.queue;
        let draws = &self.draws;

        let fragments: usize = self
            .framebuffer
            .bands_mut(BAND_ROWS)
            .into_par_iter()
            .map(|mut band| rasterize_band(&mut band, queue, draws, &shader))
            .sum();

        let (w, h) = (self.framebuffer.width as i32, self.framebuffer.height as i32);
        self.stats.triangles_rasterized = self
            .queue
            .iter()
            .filter(|triangle| touches_screen(triangle, w, h))
            .count();
        self.stats.fragments_shaded = fragments;
        log::debug!("帧统计: {:?}", self.stats);
        self.stats
    }
}

// 包围盒与画面没有交集的三角形不计入光栅化数
fn touches_screen(triangle: &RasterTriangle, width: i32, height: i32) -> bool {
    let points = &triangle.vertices;
    let screen = [points[0].pos, points[1].pos, points[2].pos];
    let (min_x, min_y, max_x, max_y) = rasterizer::get_box(&screen);
    min_x <= width - 1 && max_x >= 0 && min_y <= height - 1 && max_y >= 0
}

// 条带内按提交顺序处理三角形，结果与串行一致
fn rasterize_band(
    band: &mut Band,
    queue: &[RasterTriangle],
    draws: &[DrawUniforms],
    shader: &dyn FragmentShader,
) -> usize {
    let band_min_y = band.y0 as i32;
    let band_max_y = (band.y0 + band.rows()) as i32 - 1;
    let max_x = band.width as i32 - 1;
    let mut shaded = 0;

    for triangle in queue {
        let points = &triangle.vertices;
        let screen = [points[0].pos, points[1].pos, points[2].pos];
        let (min_x, min_y, bmax_x, bmax_y) = rasterizer::get_box(&screen);
        let (min_x, min_y) = (min_x.max(0), min_y.max(band_min_y));
        let (bmax_x, bmax_y) = (bmax_x.min(max_x), bmax_y.min(band_max_y));
        if min_x > bmax_x || min_y > bmax_y {
            continue;
        }
        let draw = &draws[triangle.draw];

        for y in min_y..=bmax_y {
            for x in min_x..=bmax_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if !rasterizer::is_inside_triangle(&screen, &p) {
                    continue;
                }
                let Some(bary) = rasterizer::get_barycentric_coords(&screen, &p) else {
                    continue;
                };
                let depth = rasterizer::interpolate_depth(points, bary);
                // 先做深度测试，被挡住的片元不着色
                if !(0.0..1.0).contains(&depth) || !band.depth_test(x as usize, y as usize, depth) {
                    continue;
                }

                let w = rasterizer::perspective_weights(points, bary);
                let fragment_data = FragmentData {
                    world_pos: rasterizer::interpolate_vec3(points.map(|p| p.world_pos), w),
                    normal: rasterizer::interpolate_vec3(points.map(|p| p.normal), w),
                    uv: rasterizer::interpolate_vec2(points.map(|p| p.uv), w),
                    draw,
                };
                let color = framebuffer::pack_color(shader.shade(&fragment_data));
                band.put_pixel(x as usize, y as usize, color, depth);
                shaded += 1;
            }
        }
    }
    shaded
}
