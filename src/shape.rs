use std::sync::Arc;

use cgmath::Vector4 as Vec4;

use crate::error::{Result, SceneError};
use crate::mesh::{self, Mesh};
use crate::renderer::{CullMode, DrawUniforms, Renderer, TextureMode};
use crate::texture::Texture;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Cube,
    Sphere,
    Cylinder(u32),
    Triangle,
}

/// 可绘制对象：共享的网格 + 自己的模型矩阵和材质开关
#[derive(Debug, Clone)]
pub struct Shape {
    pub kind: ShapeKind,
    mesh: Arc<Mesh>,
    pub matrix: Transform,
    pub color: Vec4<f32>,
    pub texture_mode: TextureMode,
    pub specular: bool,
    pub cull: CullMode,
    textures: [Option<Arc<Texture>>; 2],
}

impl Shape {
    fn with_mesh(kind: ShapeKind, mesh: Arc<Mesh>) -> Self {
        Self {
            kind,
            mesh,
            matrix: Transform::identity(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            texture_mode: TextureMode::Color,
            specular: true,
            cull: CullMode::Back,
            textures: [None, None],
        }
    }

    pub fn cube() -> Self {
        Self::with_mesh(ShapeKind::Cube, mesh::cube())
    }

    pub fn sphere() -> Self {
        Self::with_mesh(ShapeKind::Sphere, mesh::sphere())
    }

    pub fn cylinder(segments: u32) -> Self {
        Self::with_mesh(ShapeKind::Cylinder(segments), mesh::cylinder(segments))
    }

    /// 单个三角形没有背面，默认双面绘制
    pub fn triangle() -> Self {
        let mut shape = Self::with_mesh(ShapeKind::Triangle, mesh::triangle());
        shape.cull = CullMode::None;
        shape
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn with_matrix(mut self, matrix: Transform) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = Vec4::new(r, g, b, 1.0);
        self
    }

    pub fn with_texture_mode(mut self, mode: TextureMode) -> Self {
        self.texture_mode = mode;
        self
    }

    pub fn with_specular(mut self, specular: bool) -> Self {
        self.specular = specular;
        self
    }

    /// 只有 0、1 两个纹理槽
    pub fn set_texture(&mut self, slot: usize, texture: Arc<Texture>) -> Result<()> {
        let entry = self
            .textures
            .get_mut(slot)
            .ok_or(SceneError::TextureSlot(slot))?;
        *entry = Some(texture);
        Ok(())
    }

    pub fn texture(&self, slot: usize) -> Option<&Arc<Texture>> {
        self.textures.get(slot).and_then(Option::as_ref)
    }

    pub fn uniforms(&self) -> DrawUniforms {
        DrawUniforms {
            model: self.matrix,
            normal_matrix: self.matrix.normal_matrix(),
            color: self.color,
            texture_mode: self.texture_mode,
            specular: self.specular,
            texture0: self.textures[0].clone(),
            texture1: self.textures[1].clone(),
        }
    }

    pub fn render(&self, renderer: &mut Renderer) {
        renderer.draw(self.uniforms(), &self.mesh, self.cull);
    }
}
