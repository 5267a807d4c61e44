use std::sync::Arc;

use cgmath::{InnerSpace, Vector3 as Vec3};

use super::turtle::{Turtle, TurtlePose};
use super::voxel_map::{BLOCK_SIZE, BlockPos, MAP_DEPTH, MAP_HEIGHT, MAP_WIDTH, VoxelMap};
use crate::camera::Camera;
use crate::error::Result;
use crate::renderer::{Renderer, TextureMode};
use crate::shape::Shape;
use crate::texture::Texture;
use crate::transform::Transform;

const MARKER_SCALE: f32 = -0.3;

/// 键盘切换的渲染开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderToggles {
    /// 天空、地板、球改用法线可视化
    pub normals: bool,
    pub lights: bool,
}

impl Default for RenderToggles {
    fn default() -> Self {
        Self {
            normals: false,
            lights: true,
        }
    }
}

pub struct World {
    pub camera: Camera,
    pub map: VoxelMap,
    pub turtle: Turtle,
    pub pose: TurtlePose,
    sky: Shape,
    floor: Shape,
    sphere: Shape,
    light_marker: Shape,
    spot_marker: Shape,
    /// 球在没有法线可视化时使用的模式
    sphere_mode: TextureMode,
}

fn marker_matrix(p: Vec3<f32>) -> Transform {
    let mut m = Transform::identity();
    m.translate(p.x, p.y, p.z)
        .scale(MARKER_SCALE, MARKER_SCALE, MARKER_SCALE)
        .translate(-0.5, -0.5, -0.5);
    m
}

impl World {
    /// texture1 存在时球改用双纹理混合
    pub fn new(
        camera: Camera,
        map: VoxelMap,
        light_color: Vec3<f32>,
        texture0: Arc<Texture>,
        texture1: Option<Arc<Texture>>,
    ) -> Result<Self> {
        let mut sky_m = Transform::identity();
        sky_m
            .scale(50.0, 50.0, 50.0)
            .scale(-1.0, -1.0, -1.0)
            .translate(-0.5, -0.5, -0.5);
        let sky = Shape::cube()
            .with_color(0.4, 0.4, 1.0)
            .with_matrix(sky_m)
            .with_specular(false);

        let mut floor_m = Transform::identity();
        floor_m
            .translate(0.0, -0.5, 0.0)
            .scale(40.0, 0.0, 40.0)
            .translate(-0.5, 0.0, -0.5);
        let mut floor = Shape::cube()
            .with_color(1.0, 0.0, 0.0)
            .with_matrix(floor_m)
            .with_texture_mode(TextureMode::Texture0);
        floor.set_texture(0, Arc::clone(&texture0))?;

        let mut sphere_m = Transform::identity();
        sphere_m.translate(2.0, 1.5, 2.0);
        let mut sphere = Shape::sphere().with_matrix(sphere_m);
        sphere.set_texture(0, texture0)?;
        let sphere_mode = match texture1 {
            Some(tex) => {
                sphere.set_texture(1, tex)?;
                TextureMode::Blend
            }
            None => TextureMode::Texture0,
        };
        sphere.texture_mode = sphere_mode;

        let marker = Shape::cube().with_color(light_color.x, light_color.y, light_color.z);

        Ok(Self {
            camera,
            map,
            turtle: Turtle::new(Vec3::new(0.0, -0.2, 0.0)),
            pose: TurtlePose::default(),
            sky,
            floor,
            sphere,
            light_marker: marker.clone(),
            spot_marker: marker,
            sphere_mode,
        })
    }

    pub fn update_lights(
        &mut self,
        light_pos: Vec3<f32>,
        spot_pos: Vec3<f32>,
        spot_dir: Vec3<f32>,
    ) {
        self.light_marker.matrix = marker_matrix(light_pos);
        self.spot_marker.matrix = marker_matrix(spot_pos);
        log::trace!("灯光 {light_pos:?}，聚光灯 {spot_pos:?} -> {spot_dir:?}");
    }

    /// 每帧都重建整个层级，不做脏标记
    pub fn render(&mut self, renderer: &mut Renderer, toggles: &RenderToggles) {
        let debug = |mode: TextureMode| {
            if toggles.normals {
                TextureMode::Normal
            } else {
                mode
            }
        };
        self.sky.texture_mode = debug(TextureMode::Color);
        self.floor.texture_mode = debug(TextureMode::Texture0);
        self.sphere.texture_mode = debug(self.sphere_mode);

        self.light_marker.render(renderer);
        self.spot_marker.render(renderer);
        for block in self.map.shapes() {
            block.render(renderer);
        }
        self.sky.render(renderer);
        self.floor.render(renderer);
        for part in self.turtle.shapes(&self.pose) {
            part.render(renderer);
        }
        self.sphere.render(renderer);
    }

    /// 相机前方一个单位处对应的网格坐标，已夹到地图范围内
    pub fn nearest_block_position(&self) -> BlockPos {
        let eye = self.camera.position;
        let d = self.camera.target - eye;
        let dir = if d.magnitude2() > f32::EPSILON {
            d.normalize()
        } else {
            Vec3::new(0.0, 0.0, 0.0)
        };
        let target = eye + dir;
        // 与 Math.round 一致：.5 向上取整
        let snap = |v: f32| (v / BLOCK_SIZE + 0.5).floor() as i32;
        let clamp = |v: i32, n: usize| v.clamp(0, n as i32 - 1);
        BlockPos::new(
            clamp(snap(target.x) + MAP_WIDTH as i32 / 2, MAP_WIDTH),
            clamp(snap(target.y), MAP_HEIGHT),
            clamp(snap(target.z) + MAP_DEPTH as i32 / 2, MAP_DEPTH),
        )
    }

    pub fn place_block_in_front(&mut self) -> Result<BlockPos> {
        let pos = self.nearest_block_position();
        self.map.place_block(pos)?;
        log::info!("放置方块 {pos:?}");
        Ok(pos)
    }

    pub fn remove_block_in_front(&mut self) -> Result<Option<BlockPos>> {
        let pos = self.nearest_block_position();
        if self.map.remove_block(pos)? {
            log::info!("移除方块 {pos:?}");
            Ok(Some(pos))
        } else {
            Ok(None)
        }
    }

    pub fn sky(&self) -> &Shape {
        &self.sky
    }

    pub fn floor(&self) -> &Shape {
        &self.floor
    }

    pub fn sphere(&self) -> &Shape {
        &self.sphere
    }

    pub fn light_marker(&self) -> &Shape {
        &self.light_marker
    }

    pub fn spot_marker(&self) -> &Shape {
        &self.spot_marker
    }
}
