use cgmath::{InnerSpace, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4};

/// 模型空间顶点：位置 + UV + 法线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Vec3<f32>,
    pub uv: Vec2<f32>,
    pub normal: Vec3<f32>,
}

impl Vertex {
    pub fn new(pos: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            pos: pos.into(),
            uv: uv.into(),
            normal: normal.into(),
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex {
            pos: Vec3::new(0.0, 0.0, 0.0),
            uv: Vec2::new(0.0, 0.0),
            normal: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// 几何法线（按 v0->v1->v2 逆时针方向）
    pub fn get_normal(&self) -> Vec3<f32> {
        let edge1 = self.vertices[1].pos - self.vertices[0].pos;
        let edge2 = self.vertices[2].pos - self.vertices[0].pos;
        let n = edge1.cross(edge2);
        if n.magnitude2() <= f32::EPSILON * f32::EPSILON {
            return Vec3::new(0.0, 0.0, 0.0);
        }
        n.normalize()
    }
}

/// 顶点着色器输出
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSpaceVertex {
    pub position: Vec4<f32>,
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub uv: Vec2<f32>,
}

impl ClipSpaceVertex {
    pub fn lerp(&self, other: &ClipSpaceVertex, t: f32) -> ClipSpaceVertex {
        ClipSpaceVertex {
            position: self.position + (other.position - self.position) * t,
            world_pos: self.world_pos + (other.world_pos - self.world_pos) * t,
            normal: self.normal + (other.normal - self.normal) * t,
            uv: self.uv + (other.uv - self.uv) * t,
        }
    }
}

/// 光栅化阶段的屏幕空间点
#[derive(Debug, Clone, Copy)]
pub struct RasterPoint {
    pub pos: Vec2<f32>,
    pub z: f32,
    /// 1/w，用于透视校正插值
    pub inv_w: f32,
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub uv: Vec2<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct RasterTriangle {
    pub vertices: [RasterPoint; 3],
    /// 所属绘制调用的下标
    pub draw: usize,
}

impl RasterTriangle {
    /// 屏幕空间有向面积的两倍（y 轴向下，逆时针为负）
    pub fn signed_area(&self) -> f32 {
        let [a, b, c] = [
            self.vertices[0].pos,
            self.vertices[1].pos,
            self.vertices[2].pos,
        ];
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }
}
