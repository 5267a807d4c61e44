use std::path::Path;

use cgmath::Vector3 as Vec3;

use crate::error::Result;

/// 深度缓冲的清除值（NDC 深度映射到 [0, 1] 后的最远处）
pub const FAR_DEPTH: f32 = 1.0;

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
    pub depth: Vec<f32>,
}

/// 帧缓冲中连续的若干行，可以交给不同线程各自光栅化
pub struct Band<'a> {
    pub y0: usize,
    pub width: usize,
    pub data: &'a mut [u32],
    pub depth: &'a mut [f32],
}

impl Band<'_> {
    pub fn rows(&self) -> usize {
        self.data.len() / self.width
    }

    /// 使用全局坐标；超出本条带的像素直接忽略
    pub fn depth_test(&self, x: usize, y: usize, depth: f32) -> bool {
        if x >= self.width || y < self.y0 || y >= self.y0 + self.rows() {
            return false;
        }
        depth < self.depth[(y - self.y0) * self.width + x]
    }

    pub fn put_pixel(&mut self, x: usize, y: usize, color: u32, depth: f32) {
        if self.depth_test(x, y, depth) {
            let idx = (y - self.y0) * self.width + x;
            self.data[idx] = color;
            self.depth[idx] = depth;
        }
    }
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            data: vec![0; width * height],
            depth: vec![FAR_DEPTH; width * height],
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.data.fill(color);
        self.depth.fill(FAR_DEPTH);
    }

    pub fn put_pixel(&mut self, x: usize, y: usize, color: u32, depth: f32) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if depth < self.depth[idx] {
                self.data[idx] = color;
                self.depth[idx] = depth;
            }
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// 按 `rows` 行一组切分成互不重叠的条带
    pub fn bands_mut(&mut self, rows: usize) -> Vec<Band<'_>> {
        let width = self.width;
        let chunk = width * rows.max(1);
        if chunk == 0 {
            return Vec::new();
        }
        self.data
            .chunks_mut(chunk)
            .zip(self.depth.chunks_mut(chunk))
            .enumerate()
            .map(|(i, (data, depth))| Band {
                y0: i * rows.max(1),
                width,
                data,
                depth,
            })
            .collect()
    }

    pub fn ssaa(&self, factor: usize) -> Self {
        if factor <= 1 {
            return self.clone();
        }
        let new_width = self.width / factor;
        let new_height = self.height / factor;
        let mut new_data = vec![0; new_width * new_height];
        let count = (factor * factor) as u32;

        for y in 0..new_height {
            for x in 0..new_width {
                let mut a = 0u32;
                let mut r = 0u32;
                let mut g = 0u32;
                let mut b = 0u32;

                for dy in 0..factor {
                    for dx in 0..factor {
                        let src_idx = (y * factor + dy) * self.width + x * factor + dx;
                        let color = self.data[src_idx];
                        a += (color >> 24) & 0xFF;
                        r += (color >> 16) & 0xFF;
                        g += (color >> 8) & 0xFF;
                        b += color & 0xFF;
                    }
                }

                new_data[y * new_width + x] =
                    (a / count) << 24 | (r / count) << 16 | (g / count) << 8 | (b / count);
            }
        }

        Self {
            width: new_width,
            height: new_height,
            data: new_data,
            // 降采样后的深度不再使用
            depth: vec![FAR_DEPTH; new_width * new_height],
        }
    }

    pub fn save_to_image(&self, path: &Path) -> Result<()> {
        use image::{ImageBuffer, Rgba};

        let mut img = ImageBuffer::new(self.width as u32, self.height as u32);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.data[y * self.width + x];
                let a = ((color >> 24) & 0xFF) as u8;
                let r = ((color >> 16) & 0xFF) as u8;
                let g = ((color >> 8) & 0xFF) as u8;
                let b = (color & 0xFF) as u8;
                img.put_pixel(x as u32, y as u32, Rgba([r, g, b, a]));
            }
        }
        img.save(path)?;
        Ok(())
    }
}

/// [0,1] 浮点颜色 -> 0xAARRGGBB
pub fn pack_color(color: Vec3<f32>) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0).round() as u32;
    0xFF000000 | r << 16 | g << 8 | b
}

pub fn unpack_color(color: u32) -> Vec3<f32> {
    Vec3::new(
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_keeps_nearest() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.clear(0xFF000000);
        fb.put_pixel(1, 1, 0xFFFF0000, 0.5);
        fb.put_pixel(1, 1, 0xFF00FF00, 0.7);
        assert_eq!(fb.pixel(1, 1), Some(0xFFFF0000));
        fb.put_pixel(1, 1, 0xFF0000FF, 0.2);
        assert_eq!(fb.pixel(1, 1), Some(0xFF0000FF));
        // 与清除值相等的深度不会写入
        fb.put_pixel(2, 2, 0xFFFFFFFF, FAR_DEPTH);
        assert_eq!(fb.pixel(2, 2), Some(0xFF000000));
    }

    #[test]
    fn bands_cover_every_row_once() {
        let mut fb = FrameBuffer::new(3, 10);
        let bands = fb.bands_mut(4);
        let rows: Vec<(usize, usize)> = bands.iter().map(|b| (b.y0, b.rows())).collect();
        assert_eq!(rows, vec![(0, 4), (4, 4), (8, 2)]);
    }

    #[test]
    fn band_writes_land_in_global_coordinates() {
        let mut fb = FrameBuffer::new(3, 6);
        fb.clear(0);
        {
            let mut bands = fb.bands_mut(2);
            bands[1].put_pixel(2, 3, 7, 0.1);
            // 不属于这个条带
            bands[1].put_pixel(2, 5, 9, 0.1);
        }
        assert_eq!(fb.pixel(2, 3), Some(7));
        assert_eq!(fb.pixel(2, 5), Some(0));
    }

    #[test]
    fn ssaa_averages_blocks() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.data = vec![0xFF000000, 0xFFFFFFFF, 0xFFFFFFFF, 0xFF000000];
        let small = fb.ssaa(2);
        assert_eq!((small.width, small.height), (1, 1));
        assert_eq!(small.data[0], 0xFF7F7F7F);
    }

    #[test]
    fn pack_and_unpack_colors() {
        assert_eq!(pack_color(Vec3::new(1.0, 0.0, 2.0)), 0xFFFF00FF);
        let c = unpack_color(0xFF8000FF);
        assert!((c.x - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 1.0);
    }
}
