use cgmath::{Vector2 as Vec2, Vector3 as Vec3, dot};

use crate::vertex::RasterPoint;

/// 重心坐标 (w0, w1, w2)，分别对应 vertices[0..3]；退化三角形返回 None
pub fn get_barycentric_coords(vertices: &[Vec2<f32>; 3], p: &Vec2<f32>) -> Option<(f32, f32, f32)> {
    let v0 = vertices[1] - vertices[0];
    let v1 = vertices[2] - vertices[0];
    let v2 = *p - vertices[0];

    let d00 = dot(v0, v0);
    let d01 = dot(v0, v1);
    let d11 = dot(v1, v1);
    let d20 = dot(v2, v0);
    let d21 = dot(v2, v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-12 {
        return None;
    }

    let w1 = (d11 * d20 - d01 * d21) / denom;
    let w2 = (d00 * d21 - d01 * d20) / denom;
    Some((1.0 - w1 - w2, w1, w2))
}

/// 屏幕空间下 NDC 深度可以直接线性插值
pub fn interpolate_depth(points: &[RasterPoint; 3], bary: (f32, f32, f32)) -> f32 {
    let (w0, w1, w2) = bary;
    points[0].z * w0 + points[1].z * w1 + points[2].z * w2
}

/// 把屏幕空间重心坐标换算成透视校正后的权重
pub fn perspective_weights(points: &[RasterPoint; 3], bary: (f32, f32, f32)) -> (f32, f32, f32) {
    let a = bary.0 * points[0].inv_w;
    let b = bary.1 * points[1].inv_w;
    let c = bary.2 * points[2].inv_w;
    let sum = a + b + c;
    if sum.abs() < f32::EPSILON {
        return bary;
    }
    (a / sum, b / sum, c / sum)
}

pub fn interpolate_vec3(values: [Vec3<f32>; 3], w: (f32, f32, f32)) -> Vec3<f32> {
    values[0] * w.0 + values[1] * w.1 + values[2] * w.2
}

pub fn interpolate_vec2(values: [Vec2<f32>; 3], w: (f32, f32, f32)) -> Vec2<f32> {
    values[0] * w.0 + values[1] * w.1 + values[2] * w.2
}

pub fn get_box(vertices: &[Vec2<f32>; 3]) -> (i32, i32, i32, i32) {
    let mut min_x = vertices[0].x;
    let mut max_x = vertices[0].x;
    let mut min_y = vertices[0].y;
    let mut max_y = vertices[0].y;

    for v in vertices.iter().skip(1) {
        min_x = min_x.min(v.x);
        max_x = max_x.max(v.x);
        min_y = min_y.min(v.y);
        max_y = max_y.max(v.y);
    }

    (
        min_x.floor() as i32,
        min_y.floor() as i32,
        max_x.ceil() as i32,
        max_y.ceil() as i32,
    )
}

pub fn is_inside_triangle(vertices: &[Vec2<f32>; 3], p: &Vec2<f32>) -> bool {
    let v0 = vertices[1] - vertices[0];
    let v1 = vertices[2] - vertices[1];
    let v2 = vertices[0] - vertices[2];

    let p0 = *p - vertices[0];
    let p1 = *p - vertices[1];
    let p2 = *p - vertices[2];

    let cross0 = v0.x * p0.y - v0.y * p0.x;
    let cross1 = v1.x * p1.y - v1.y * p1.x;
    let cross2 = v2.x * p2.y - v2.y * p2.x;

    (cross0 >= 0.0 && cross1 >= 0.0 && cross2 >= 0.0)
        || (cross0 <= 0.0 && cross1 <= 0.0 && cross2 <= 0.0)
}
