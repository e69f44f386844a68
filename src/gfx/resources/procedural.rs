//! Procedurally generated window textures
//!
//! The window panel swaps between a daytime sky and closed wooden shutters
//! depending on whether the directional lamp is on. Both images are rasterized
//! on the CPU at 512x512 and uploaded like any other texture. Row 0 is the top
//! of the image, which puts the sun in the upper part of the window once the
//! quad's texture coordinates are applied.

use rand::Rng;

use super::texture_resource::TexturePixels;

const TEXTURE_SIZE: u32 = 512;

const SUN_GOLD: [f32; 3] = [255.0, 215.0, 0.0];
const CLOUD_WHITE: [f32; 3] = [255.0, 255.0, 255.0];

const SHUTTER_BACKGROUND: [f32; 3] = [44.0, 24.0, 16.0];
const SLAT_FACE: [f32; 3] = [139.0, 69.0, 19.0];
const SLAT_SHADOW: [f32; 3] = [101.0, 67.0, 33.0];
const SLAT_HIGHLIGHT: [f32; 3] = [160.0, 82.0, 45.0];
const SLAT_COUNT: u32 = 16;
const SPECKLE_COUNT: u32 = 200;

/// Gradient stops for the sky backdrop, from the top of the image down
const SKY_STOPS: [(f32, [f32; 3]); 4] = [
    (0.0, [135.0, 206.0, 235.0]),
    (0.3, [152.0, 216.0, 232.0]),
    (0.7, [176.0, 224.0, 230.0]),
    (1.0, [240.0, 248.0, 255.0]),
];

/// Daytime sky: vertical gradient, four clouds, and a sun with rays
pub fn sky_texture() -> TexturePixels {
    let mut canvas = Canvas::new(TEXTURE_SIZE, TEXTURE_SIZE);

    for y in 0..TEXTURE_SIZE {
        let t = (y as f32 + 0.5) / TEXTURE_SIZE as f32;
        let color = sky_gradient(t);
        canvas.fill_rect(0.0, y as f32, TEXTURE_SIZE as f32, 1.0, color, 1.0);
    }

    canvas.fill_cloud(80.0, 150.0, 60.0);
    canvas.fill_cloud(280.0, 180.0, 45.0);
    canvas.fill_cloud(150.0, 250.0, 35.0);
    canvas.fill_cloud(350.0, 220.0, 40.0);

    canvas.fill_circle(450.0, 400.0, 35.0, SUN_GOLD, 1.0);

    for i in 0..12 {
        let angle = (i as f32 * std::f32::consts::PI * 2.0) / 12.0;
        let (sin, cos) = angle.sin_cos();
        canvas.stroke_line(
            450.0 + cos * 45.0,
            400.0 + sin * 45.0,
            450.0 + cos * 70.0,
            400.0 + sin * 70.0,
            4.0,
            SUN_GOLD,
            0.7,
        );
    }

    canvas.into_pixels()
}

/// Closed wooden shutters: horizontal slats over a dark background with a
/// random grain speckle pass
pub fn shutter_texture() -> TexturePixels {
    shutter_texture_with_rng(&mut rand::rng())
}

pub fn shutter_texture_with_rng(rng: &mut impl Rng) -> TexturePixels {
    let mut canvas = Canvas::new(TEXTURE_SIZE, TEXTURE_SIZE);
    let size = TEXTURE_SIZE as f32;

    canvas.fill_rect(0.0, 0.0, size, size, SHUTTER_BACKGROUND, 1.0);

    let slat_height = size / SLAT_COUNT as f32;
    for i in 0..SLAT_COUNT {
        let y = i as f32 * slat_height;
        canvas.fill_rect(0.0, y, size, slat_height - 2.0, SLAT_FACE, 1.0);
        canvas.fill_rect(0.0, y + slat_height - 6.0, size, 4.0, SLAT_SHADOW, 1.0);
        canvas.fill_rect(0.0, y, size, 2.0, SLAT_HIGHLIGHT, 1.0);
    }

    for _ in 0..SPECKLE_COUNT {
        let color = [
            100.0 + rng.random::<f32>() * 50.0,
            30.0 + rng.random::<f32>() * 20.0,
            10.0 + rng.random::<f32>() * 10.0,
        ];
        let x = rng.random::<f32>() * size;
        let y = rng.random::<f32>() * size;
        let height = rng.random::<f32>() * 20.0;
        canvas.fill_rect(x, y, 2.0, height, color, 0.3);
    }

    canvas.into_pixels()
}

fn sky_gradient(t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    for window in SKY_STOPS.windows(2) {
        let (t0, c0) = window[0];
        let (t1, c1) = window[1];
        if t <= t1 {
            let u = (t - t0) / (t1 - t0);
            return [
                c0[0] + (c1[0] - c0[0]) * u,
                c0[1] + (c1[1] - c0[1]) * u,
                c0[2] + (c1[2] - c0[2]) * u,
            ];
        }
    }
    SKY_STOPS[SKY_STOPS.len() - 1].1
}

/// Software raster target with source-over blending
struct Canvas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; (width * height * 4) as usize],
        }
    }

    fn into_pixels(self) -> TexturePixels {
        TexturePixels::new(self.width, self.height, self.rgba)
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: [f32; 3], alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let index = ((y as u32 * self.width + x as u32) * 4) as usize;
        for channel in 0..3 {
            let dst = self.rgba[index + channel] as f32;
            let out = color[channel] * alpha + dst * (1.0 - alpha);
            self.rgba[index + channel] = out.round().clamp(0.0, 255.0) as u8;
        }
        let dst_alpha = self.rgba[index + 3] as f32 / 255.0;
        let out_alpha = alpha + dst_alpha * (1.0 - alpha);
        self.rgba[index + 3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Fills pixels whose centers fall inside the rectangle
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 3], alpha: f32) {
        let x_start = (x - 0.5).ceil() as i64;
        let x_end = (x + w - 0.5).ceil() as i64;
        let y_start = (y - 0.5).ceil() as i64;
        let y_end = (y + h - 0.5).ceil() as i64;
        for py in y_start..y_end {
            for px in x_start..x_end {
                self.blend_pixel(px, py, color, alpha);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: [f32; 3], alpha: f32) {
        let x_start = (cx - radius).floor() as i64;
        let x_end = (cx + radius).ceil() as i64;
        let y_start = (cy - radius).floor() as i64;
        let y_end = (cy + radius).ceil() as i64;
        for py in y_start..=y_end {
            for px in x_start..=x_end {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= radius * radius {
                    self.blend_pixel(px, py, color, alpha);
                }
            }
        }
    }

    /// Fills the union of the four overlapping puffs in a single pass so the
    /// translucent color is applied exactly once per pixel
    fn fill_cloud(&mut self, cx: f32, cy: f32, size: f32) {
        let puffs = [
            (cx, cy, size),
            (cx + size * 0.6, cy, size * 0.8),
            (cx - size * 0.6, cy, size * 0.8),
            (cx, cy - size * 0.6, size * 0.8),
        ];
        let reach = size * 1.6;
        let x_start = (cx - reach).floor() as i64;
        let x_end = (cx + reach).ceil() as i64;
        let y_start = (cy - reach).floor() as i64;
        let y_end = (cy + reach).ceil() as i64;
        for py in y_start..=y_end {
            for px in x_start..=x_end {
                let inside = puffs.iter().any(|&(x, y, r)| {
                    let dx = px as f32 + 0.5 - x;
                    let dy = py as f32 + 0.5 - y;
                    dx * dx + dy * dy <= r * r
                });
                if inside {
                    self.blend_pixel(px, py, CLOUD_WHITE, 0.8);
                }
            }
        }
    }

    /// Strokes a line segment with butt caps
    #[allow(clippy::too_many_arguments)]
    fn stroke_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: [f32; 3],
        alpha: f32,
    ) {
        let half_width = width / 2.0;
        let dx = x2 - x1;
        let dy = y2 - y1;
        let length_sq = dx * dx + dy * dy;
        if length_sq == 0.0 {
            return;
        }
        let pad = half_width + 1.0;
        let x_start = (x1.min(x2) - pad).floor() as i64;
        let x_end = (x1.max(x2) + pad).ceil() as i64;
        let y_start = (y1.min(y2) - pad).floor() as i64;
        let y_end = (y1.max(y2) + pad).ceil() as i64;
        for py in y_start..=y_end {
            for px in x_start..=x_end {
                let fx = px as f32 + 0.5;
                let fy = py as f32 + 0.5;
                let t = ((fx - x1) * dx + (fy - y1) * dy) / length_sq;
                if !(0.0..=1.0).contains(&t) {
                    continue;
                }
                let nearest_x = x1 + t * dx;
                let nearest_y = y1 + t * dy;
                let dist_x = fx - nearest_x;
                let dist_y = fy - nearest_y;
                if dist_x * dist_x + dist_y * dist_y <= half_width * half_width {
                    self.blend_pixel(px, py, color, alpha);
                }
            }
        }
    }
}
