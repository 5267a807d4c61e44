use cgmath::{InnerSpace, Matrix4 as Mat4};

use crate::vertex::{ClipSpaceVertex, Triangle};

pub struct VertexShaderUniforms<'a> {
    pub model_matrix: &'a Mat4<f32>,
    pub mvp_matrix: &'a Mat4<f32>,
    pub normal_matrix: &'a Mat4<f32>,
}

pub trait VertexShader {
    // 模型空间三角形 -> 裁剪空间三角形
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3];
}

/// 输出世界空间位置和经过法线矩阵变换的法线。
///
/// 法线不是原样透传的：带负缩放的天空盒和灯光标记在法线可视化模式下
/// 显示的是翻转后的朝内法线，颜色与直接输出模型空间法线时不同。
pub struct DefaultVertexShader;

impl VertexShader for DefaultVertexShader {
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3] {
        triangle.vertices.map(|v| {
            let normal = (*uniforms.normal_matrix * v.normal.extend(0.0)).truncate();
            ClipSpaceVertex {
                position: *uniforms.mvp_matrix * v.pos.extend(1.0),
                world_pos: (*uniforms.model_matrix * v.pos.extend(1.0)).truncate(),
                normal: if normal.magnitude2() > f32::EPSILON {
                    normal.normalize()
                } else {
                    v.normal
                },
                uv: v.uv,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use crate::vertex::Vertex;
    use cgmath::{SquareMatrix, Vector3 as Vec3, Vector4 as Vec4};

    fn shade(model: &Transform, v: Vertex) -> ClipSpaceVertex {
        let normal_matrix = model.normal_matrix();
        let mvp = Mat4::identity() * model.mat;
        let uniforms = VertexShaderUniforms {
            model_matrix: &model.mat,
            mvp_matrix: &mvp,
            normal_matrix: &normal_matrix,
        };
        DefaultVertexShader.shade_triangle(&Triangle::new(v, v, v), &uniforms)[0]
    }

    #[test]
    fn outputs_world_position_and_rotated_normal() {
        let mut model = Transform::identity();
        model.translate(1.0, 0.0, 0.0).rotate(90.0, 0.0, 1.0, 0.0);
        let v = Vertex::new([0.0, 0.0, 1.0], [0.5, 0.5], [0.0, 0.0, 1.0]);
        let out = shade(&model, v);
        assert!((out.world_pos - Vec3::new(2.0, 0.0, 0.0)).magnitude() < 1e-5);
        assert!((out.normal - Vec3::new(1.0, 0.0, 0.0)).magnitude() < 1e-5);
        assert!((out.position - Vec4::new(2.0, 0.0, 0.0, 1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn negative_scale_flips_normal() {
        let mut model = Transform::identity();
        model.scale(-1.0, -1.0, -1.0);
        let v = Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, -1.0]);
        let out = shade(&model, v);
        assert!((out.normal - Vec3::new(0.0, 0.0, 1.0)).magnitude() < 1e-5);
    }
}
