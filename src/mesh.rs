use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::vertex::{Triangle, Vertex};

/// 一组静态三角形，生成一次后通过 Arc 共享
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

const SPHERE_STEPS: usize = 25;
const MIN_CYLINDER_SEGMENTS: u32 = 3;

static CUBE: LazyLock<Arc<Mesh>> = LazyLock::new(|| Arc::new(build_cube()));
static SPHERE: LazyLock<Arc<Mesh>> = LazyLock::new(|| Arc::new(build_sphere()));
static TRIANGLE: LazyLock<Arc<Mesh>> = LazyLock::new(|| Arc::new(build_triangle()));
static CYLINDERS: LazyLock<Mutex<HashMap<u32, Arc<Mesh>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

pub fn cube() -> Arc<Mesh> {
    Arc::clone(&CUBE)
}

pub fn sphere() -> Arc<Mesh> {
    Arc::clone(&SPHERE)
}

pub fn triangle() -> Arc<Mesh> {
    Arc::clone(&TRIANGLE)
}

/// 按分段数缓存；少于 3 段按 3 段处理
pub fn cylinder(segments: u32) -> Arc<Mesh> {
    let segments = segments.max(MIN_CYLINDER_SEGMENTS);
    let mut cache = CYLINDERS.lock();
    Arc::clone(
        cache
            .entry(segments)
            .or_insert_with(|| Arc::new(build_cylinder(segments))),
    )
}

fn quad(out: &mut Vec<Triangle>, p: [[f32; 3]; 4], uv: [[f32; 2]; 4], n: [f32; 3]) {
    // p0 p1 p2 p3 按逆时针（从外侧看）排列
    let v: [Vertex; 4] = std::array::from_fn(|i| Vertex::new(p[i], uv[i], n));
    out.push(Triangle::new(v[0], v[1], v[2]));
    out.push(Triangle::new(v[0], v[2], v[3]));
}

/// [0,1]^3 单位立方体，每个面两个三角形，法线朝外
#[rustfmt::skip]
fn build_cube() -> Mesh {
    let mut t = Vec::with_capacity(12);
    // 前 (z = 0)
    quad(&mut t,
        [[0.,0.,0.], [0.,1.,0.], [1.,1.,0.], [1.,0.,0.]],
        [[1.,0.], [1.,1.], [0.,1.], [0.,0.]],
        [0.,0.,-1.]);
    // 上 (y = 1)
    quad(&mut t,
        [[0.,1.,0.], [0.,1.,1.], [1.,1.,1.], [1.,1.,0.]],
        [[0.,0.], [1.,0.], [1.,1.], [0.,1.]],
        [0.,1.,0.]);
    // 后 (z = 1)
    quad(&mut t,
        [[0.,0.,1.], [1.,0.,1.], [1.,1.,1.], [0.,1.,1.]],
        [[0.,0.], [1.,0.], [1.,1.], [0.,1.]],
        [0.,0.,1.]);
    // 下 (y = 0)
    quad(&mut t,
        [[0.,0.,0.], [1.,0.,0.], [1.,0.,1.], [0.,0.,1.]],
        [[0.,0.], [1.,0.], [1.,1.], [0.,1.]],
        [0.,-1.,0.]);
    // 左 (x = 0)
    quad(&mut t,
        [[0.,0.,0.], [0.,0.,1.], [0.,1.,1.], [0.,1.,0.]],
        [[0.,0.], [1.,0.], [1.,1.], [0.,1.]],
        [-1.,0.,0.]);
    // 右 (x = 1)
    quad(&mut t,
        [[1.,0.,0.], [1.,1.,0.], [1.,1.,1.], [1.,0.,1.]],
        [[0.,0.], [0.,1.], [1.,1.], [1.,0.]],
        [1.,0.,0.]);
    Mesh { triangles: t }
}

/// 单位球：极角和方位角步长都是 π/25，法线即位置
fn build_sphere() -> Mesh {
    let d = PI / SPHERE_STEPS as f32;
    let mut triangles = Vec::with_capacity(SPHERE_STEPS * SPHERE_STEPS * 4);

    let point = |t: f32, r: f32| [t.sin() * r.cos(), t.sin() * r.sin(), t.cos()];
    let uv = |t: f32, r: f32| [t / PI, r / (2.0 * PI)];

    for i in 0..SPHERE_STEPS {
        for j in 0..SPHERE_STEPS * 2 {
            let t = i as f32 * d;
            let r = j as f32 * d;
            let corners = [(t, r), (t + d, r), (t, r + d), (t + d, r + d)];
            let [v1, v2, v3, v4] = corners.map(|(t, r)| {
                let p = point(t, r);
                Vertex::new(p, uv(t, r), p)
            });
            triangles.push(Triangle::new(v1, v2, v4));
            triangles.push(Triangle::new(v1, v4, v3));
        }
    }
    Mesh { triangles }
}

/// 半径 0.5、y ∈ [-0.5, 0.5] 的圆柱，带上下底
fn build_cylinder(segments: u32) -> Mesh {
    let radius = 0.5;
    let (top_y, bottom_y) = (0.5, -0.5);
    let mut triangles = Vec::with_capacity(segments as usize * 4);

    let ring = |i: u32| {
        let angle = i as f32 / segments as f32 * PI * 2.0;
        (angle.cos(), angle.sin())
    };
    let cap_uv = |c: f32, s: f32| [c * radius + 0.5, s * radius + 0.5];

    let top_center = Vertex::new([0.0, top_y, 0.0], [0.5, 0.5], [0.0, 1.0, 0.0]);
    let bottom_center = Vertex::new([0.0, bottom_y, 0.0], [0.5, 0.5], [0.0, -1.0, 0.0]);

    for i in 0..segments {
        let (c0, s0) = ring(i);
        let (c1, s1) = ring(i + 1);
        let (x0, z0) = (c0 * radius, s0 * radius);
        let (x1, z1) = (c1 * radius, s1 * radius);

        // 顶面
        triangles.push(Triangle::new(
            top_center,
            Vertex::new([x1, top_y, z1], cap_uv(c1, s1), [0.0, 1.0, 0.0]),
            Vertex::new([x0, top_y, z0], cap_uv(c0, s0), [0.0, 1.0, 0.0]),
        ));
        // 底面
        triangles.push(Triangle::new(
            bottom_center,
            Vertex::new([x0, bottom_y, z0], cap_uv(c0, s0), [0.0, -1.0, 0.0]),
            Vertex::new([x1, bottom_y, z1], cap_uv(c1, s1), [0.0, -1.0, 0.0]),
        ));

        // 侧面
        let u0 = i as f32 / segments as f32;
        let u1 = (i + 1) as f32 / segments as f32;
        let top0 = Vertex::new([x0, top_y, z0], [u0, 1.0], [c0, 0.0, s0]);
        let top1 = Vertex::new([x1, top_y, z1], [u1, 1.0], [c1, 0.0, s1]);
        let bot0 = Vertex::new([x0, bottom_y, z0], [u0, 0.0], [c0, 0.0, s0]);
        let bot1 = Vertex::new([x1, bottom_y, z1], [u1, 0.0], [c1, 0.0, s1]);
        triangles.push(Triangle::new(top0, top1, bot0));
        triangles.push(Triangle::new(bot0, top1, bot1));
    }
    Mesh { triangles }
}

/// z = 0 平面上的单个三角形
fn build_triangle() -> Mesh {
    let n = [0.0, 0.0, 1.0];
    Mesh {
        triangles: vec![Triangle::new(
            Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0], n),
            Vertex::new([0.5, -0.5, 0.0], [1.0, 0.0], n),
            Vertex::new([0.0, 0.5, 0.0], [0.5, 1.0], n),
        )],
    }
}
