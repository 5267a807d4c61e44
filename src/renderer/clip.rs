use crate::vertex::ClipSpaceVertex;

pub trait Clipper {
    // 输入一个裁剪空间三角形，输出裁剪后的零个、一个或多个三角形
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]>;
}

/// 只对近平面 (z >= -w) 做 Sutherland–Hodgman 裁剪，其余方向交给包围盒和深度测试
pub struct NearPlaneClipper;

impl NearPlaneClipper {
    fn distance(v: &ClipSpaceVertex) -> f32 {
        v.position.z + v.position.w
    }
}

impl Clipper for NearPlaneClipper {
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]> {
        let d = triangle.map(|v| Self::distance(&v));
        if d.iter().all(|&d| d >= 0.0) {
            return vec![*triangle];
        }
        if d.iter().all(|&d| d < 0.0) {
            return vec![];
        }

        // 最多 4 个顶点
        let mut polygon: Vec<ClipSpaceVertex> = Vec::with_capacity(4);
        for i in 0..3 {
            let j = (i + 1) % 3;
            let (a, b) = (&triangle[i], &triangle[j]);
            let (da, db) = (d[i], d[j]);
            if da >= 0.0 {
                polygon.push(*a);
            }
            if (da >= 0.0) != (db >= 0.0) {
                let t = da / (da - db);
                polygon.push(a.lerp(b, t));
            }
        }

        // 扇形三角化，保持原有环绕方向
        (1..polygon.len().saturating_sub(1))
            .map(|k| [polygon[0], polygon[k], polygon[k + 1]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4};

    fn v(x: f32, z: f32, w: f32) -> ClipSpaceVertex {
        ClipSpaceVertex {
            position: Vec4::new(x, 0.0, z, w),
            world_pos: Vec3::new(x, 0.0, z),
            normal: Vec3::new(0.0, 1.0, 0.0),
            uv: Vec2::new(0.0, 0.0),
        }
    }

    #[test]
    fn keeps_triangles_in_front() {
        let tri = [v(0.0, 0.5, 1.0), v(1.0, 0.5, 1.0), v(0.0, 0.8, 2.0)];
        assert_eq!(NearPlaneClipper.clip_triangle(&tri), vec![tri]);
    }

    #[test]
    fn drops_triangles_behind() {
        let tri = [v(0.0, -2.0, 1.0), v(1.0, -2.0, 1.0), v(0.0, -3.0, 1.0)];
        assert!(NearPlaneClipper.clip_triangle(&tri).is_empty());
    }

    #[test]
    fn one_vertex_behind_yields_two_triangles() {
        let tri = [v(0.0, -2.0, 1.0), v(1.0, 0.0, 1.0), v(-1.0, 0.0, 1.0)];
        let out = NearPlaneClipper.clip_triangle(&tri);
        assert_eq!(out.len(), 2);
        for t in &out {
            for vert in t {
                assert!(vert.position.z + vert.position.w >= -1e-5);
            }
        }
    }

    #[test]
    fn two_vertices_behind_yields_one_triangle() {
        let tri = [v(0.0, 0.0, 1.0), v(1.0, -3.0, 1.0), v(-1.0, -3.0, 1.0)];
        let out = NearPlaneClipper.clip_triangle(&tri);
        assert_eq!(out.len(), 1);
        // 交点恰好落在近平面上
        assert!((out[0][1].position.z + out[0][1].position.w).abs() < 1e-5);
    }
}
