use cgmath::{InnerSpace, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4};

use crate::renderer::{DrawUniforms, FrameUniforms, TextureMode};

/// 点光源和聚光灯共用的高光指数
pub const SHININESS: f32 = 100.0;
pub const AMBIENT: f32 = 0.3;
pub const DIFFUSE: f32 = 0.7;
/// 聚光灯硬截止半角（度）
pub const SPOT_CUTOFF_DEG: f32 = 20.0;
pub const SPOT_INTENSITY: f32 = 0.6;
pub const SPOT_FALLOFF: f32 = 0.05;
pub const ERROR_COLOR: Vec3<f32> = Vec3 {
    x: 1.0,
    y: 0.2,
    z: 0.2,
};

#[derive(Debug)]
pub struct FragmentData<'a> {
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub uv: Vec2<f32>,
    pub draw: &'a DrawUniforms,
}

pub trait FragmentShader: Sync {
    // 插值后的片元数据 -> [0,1] 颜色
    fn shade(&self, data: &FragmentData) -> Vec3<f32>;
}

/// 整个场景唯一的着色程序：纹理模式开关 + Phong 点光源 + 硬边聚光灯
pub struct SceneShader {
    pub camera_pos: Vec3<f32>,
    pub light_pos: Vec3<f32>,
    pub spot_pos: Vec3<f32>,
    pub spot_dir: Vec3<f32>,
    pub lights_on: bool,
    spot_cos_cutoff: f32,
}

impl SceneShader {
    pub fn new(frame: &FrameUniforms) -> Self {
        Self {
            camera_pos: frame.camera_pos,
            light_pos: frame.lighting.light_pos,
            spot_pos: frame.lighting.spot_pos,
            spot_dir: safe_normalize(frame.lighting.spot_dir),
            lights_on: frame.lights_on,
            spot_cos_cutoff: SPOT_CUTOFF_DEG.to_radians().cos(),
        }
    }

    /// 纹理模式开关选出的基础色
    pub fn base_color(data: &FragmentData) -> Vec4<f32> {
        let draw = data.draw;
        let sample = |slot: usize| match draw.texture(slot) {
            Some(tex) => tex.sample(data.uv),
            // 没有绑定纹理时退回纯色
            None => draw.color,
        };
        match draw.texture_mode {
            TextureMode::Normal => {
                let n = (safe_normalize(data.normal) + Vec3::new(1.0, 1.0, 1.0)) * 0.5;
                n.extend(1.0)
            }
            TextureMode::Color => draw.color,
            TextureMode::Uv => Vec4::new(data.uv.x, data.uv.y, 1.0, 1.0),
            TextureMode::Texture0 => sample(0),
            TextureMode::Texture1 => sample(1),
            TextureMode::Blend => {
                let c0 = sample(0);
                let c1 = sample(1);
                let rgb = c0.truncate() + (c1.truncate() - c0.truncate()) * c1.w;
                rgb.extend(1.0)
            }
            TextureMode::Unknown(_) => ERROR_COLOR.extend(1.0),
        }
    }

    fn lit(&self, base: Vec3<f32>, data: &FragmentData) -> Vec3<f32> {
        let n = safe_normalize(data.normal);
        let e = safe_normalize(self.camera_pos - data.world_pos);
        let specular_on = data.draw.specular;

        // 点光源
        let l = safe_normalize(self.light_pos - data.world_pos);
        let n_dot_l = n.dot(l).max(0.0);
        let specular = if specular_on {
            e.dot(reflect(-l, n)).max(0.0).powf(SHININESS)
        } else {
            0.0
        };
        let diffuse = base * n_dot_l * DIFFUSE;
        let ambient = base * AMBIENT;
        let mut result = diffuse + ambient + Vec3::new(specular, specular, specular);

        // 聚光灯
        let to_spot = self.spot_pos - data.world_pos;
        let w = safe_normalize(to_spot);
        if (-w).dot(self.spot_dir) > self.spot_cos_cutoff {
            let r = to_spot.magnitude();
            let spot_n_dot_l = n.dot(w).max(0.0);
            let spot_specular = if specular_on {
                e.dot(reflect(-w, n)).max(0.0).powf(SHININESS)
            } else {
                0.0
            };
            let intensity = SPOT_INTENSITY / (1.0 + SPOT_FALLOFF * r * r);
            result += base * spot_n_dot_l * intensity;
            result += Vec3::new(spot_specular, spot_specular, spot_specular);
        }
        result
    }
}

impl FragmentShader for SceneShader {
    fn shade(&self, data: &FragmentData) -> Vec3<f32> {
        let base = Self::base_color(data).truncate();
        let color = if self.lights_on {
            self.lit(base, data)
        } else {
            base
        };
        color.map(|c| c.clamp(0.0, 1.0))
    }
}

pub fn reflect(i: Vec3<f32>, n: Vec3<f32>) -> Vec3<f32> {
    i - n * (2.0 * n.dot(i))
}

pub fn safe_normalize(v: Vec3<f32>) -> Vec3<f32> {
    if v.magnitude2() <= f32::EPSILON * f32::EPSILON {
        Vec3::new(0.0, 0.0, 0.0)
    } else {
        v.normalize()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::renderer::Lighting;
    use crate::texture::Texture;
    use crate::transform::Transform;

    fn frame(lights_on: bool) -> FrameUniforms {
        FrameUniforms {
            view: Transform::identity(),
            projection: Transform::identity(),
            camera_pos: Vec3::new(0.0, 10.0, 0.0),
            lighting: Lighting {
                light_pos: Vec3::new(0.0, 6.0, 0.0),
                // 聚光灯挪远，避免干扰点光源的断言
                spot_pos: Vec3::new(100.0, 4.0, 0.0),
                spot_dir: Vec3::new(0.0, -1.0, 0.0),
            },
            lights_on,
        }
    }

    fn draw(mode: TextureMode) -> DrawUniforms {
        DrawUniforms {
            color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            texture_mode: mode,
            specular: false,
            ..DrawUniforms::default()
        }
    }

    fn fragment<'a>(draw: &'a DrawUniforms, normal: Vec3<f32>) -> FragmentData<'a> {
        FragmentData {
            world_pos: Vec3::new(0.0, 0.0, 0.0),
            normal,
            uv: Vec2::new(0.25, 0.75),
            draw,
        }
    }

    fn close(a: Vec3<f32>, b: Vec3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn texture_mode_switch_without_lights() {
        let shader = SceneShader::new(&frame(false));
        let up = Vec3::new(0.0, 1.0, 0.0);

        let d = draw(TextureMode::Color);
        assert!(close(shader.shade(&fragment(&d, up)), Vec3::new(0.5, 0.5, 0.5)));

        let d = draw(TextureMode::Uv);
        assert!(close(shader.shade(&fragment(&d, up)), Vec3::new(0.25, 0.75, 1.0)));

        let d = draw(TextureMode::Normal);
        assert!(close(shader.shade(&fragment(&d, up)), Vec3::new(0.5, 1.0, 0.5)));

        let d = draw(TextureMode::from(7));
        assert!(close(shader.shade(&fragment(&d, up)), ERROR_COLOR));
    }

    #[test]
    fn blend_mixes_by_second_texture_alpha() {
        let shader = SceneShader::new(&frame(false));
        let mut d = draw(TextureMode::Blend);
        d.texture0 = Some(Arc::new(Texture::checker(2, 1, [255, 0, 0, 255], [255, 0, 0, 255])));
        d.texture1 = Some(Arc::new(Texture::checker(2, 1, [0, 0, 255, 0], [0, 0, 255, 0])));
        let c = shader.shade(&fragment(&d, Vec3::new(0.0, 1.0, 0.0)));
        // alpha = 0 -> 完全是 texture0
        assert!(close(c, Vec3::new(1.0, 0.0, 0.0)));

        d.texture1 = Some(Arc::new(Texture::checker(2, 1, [0, 0, 255, 255], [0, 0, 255, 255])));
        let c = shader.shade(&fragment(&d, Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(c, Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn missing_texture_falls_back_to_color() {
        let shader = SceneShader::new(&frame(false));
        let d = draw(TextureMode::Texture1);
        let c = shader.shade(&fragment(&d, Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(c, Vec3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn point_light_ambient_and_diffuse() {
        let shader = SceneShader::new(&frame(true));
        let d = draw(TextureMode::Color);
        // 正对光源：ambient 0.3 + diffuse 0.7
        let lit = shader.shade(&fragment(&d, Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(lit, Vec3::new(0.5, 0.5, 0.5)));
        // 背对光源：只剩环境光
        let dark = shader.shade(&fragment(&d, Vec3::new(0.0, -1.0, 0.0)));
        assert!(close(dark, Vec3::new(0.15, 0.15, 0.15)));
    }

    #[test]
    fn specular_highlight_only_when_enabled() {
        let shader = SceneShader::new(&frame(true));
        let mut d = draw(TextureMode::Color);
        d.color = Vec4::new(0.2, 0.2, 0.2, 1.0);
        let plain = shader.shade(&fragment(&d, Vec3::new(0.0, 1.0, 0.0)));
        d.specular = true;
        // 相机、光源都在正上方，反射方向正好指向相机
        let shiny = shader.shade(&fragment(&d, Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(plain, Vec3::new(0.2, 0.2, 0.2)));
        assert!(close(shiny, Vec3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn spotlight_has_hard_cutoff() {
        let mut f = frame(true);
        f.lighting.light_pos = Vec3::new(0.0, -100.0, 0.0);
        f.lighting.spot_pos = Vec3::new(0.0, 4.0, 0.0);
        let shader = SceneShader::new(&f);
        let d = draw(TextureMode::Color);
        let up = Vec3::new(0.0, 1.0, 0.0);

        let inside = shader.shade(&fragment(&d, up));
        let expected = 0.15 + 0.5 * 0.6 / (1.0 + 0.05 * 16.0);
        assert!(close(inside, Vec3::new(expected, expected, expected)));

        // tan(20°) * 4 ≈ 1.46，x = 2 已在锥外
        let outside = FragmentData {
            world_pos: Vec3::new(2.0, 0.0, 0.0),
            ..fragment(&d, up)
        };
        assert!(close(shader.shade(&outside), Vec3::new(0.15, 0.15, 0.15)));
    }

    #[test]
    fn reflect_mirrors_about_normal() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }
}
