//! RGB frame rendering for LunarLander using plotters

use anyhow::{Result, anyhow};
use plotters::prelude::*;

use super::{H, LunarLander, SCALE, W};
use crate::env::Render;

const SKY: RGBColor = RGBColor(0, 0, 0);
const GROUND: RGBColor = RGBColor(255, 255, 255);
const HULL_FILL: RGBColor = RGBColor(128, 102, 230);
const HULL_EDGE: RGBColor = RGBColor(77, 77, 128);
const FLAG_POLE: RGBColor = RGBColor(255, 255, 255);
const FLAG: RGBColor = RGBColor(204, 204, 0);
const FLAME: RGBColor = RGBColor(255, 140, 40);

/// Maps world coordinates onto a `width x height` pixel grid
struct Viewport {
    sx: f32,
    sy: f32,
    height: u32,
}

impl Viewport {
    fn new(width: u32, height: u32) -> Self {
        Self { sx: width as f32 / W, sy: height as f32 / H, height }
    }

    fn px(&self, (x, y): (f32, f32)) -> (i32, i32) {
        ((x * self.sx).round() as i32, (self.height as f32 - y * self.sy).round() as i32)
    }
}

impl Render for LunarLander {
    fn render_rgb(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        let view = Viewport::new(width, height);

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&GROUND).map_err(|e| anyhow!("render failed: {}", e))?;

            // Sky is everything above the terrain polyline
            let t = &self.terrain;
            for i in 0..t.chunk_x.len() - 1 {
                let quad = vec![
                    view.px((t.chunk_x[i], t.chunk_y[i])),
                    view.px((t.chunk_x[i + 1], t.chunk_y[i + 1])),
                    view.px((t.chunk_x[i + 1], H)),
                    view.px((t.chunk_x[i], H)),
                ];
                root.draw(&Polygon::new(quad, SKY.filled()))
                    .map_err(|e| anyhow!("render failed: {}", e))?;
            }

            for x in [t.helipad_x1, t.helipad_x2] {
                let base = view.px((x, t.helipad_y));
                let top = view.px((x, t.helipad_y + 50.0 / SCALE));
                root.draw(&PathElement::new(vec![base, top], FLAG_POLE.stroke_width(1)))
                    .map_err(|e| anyhow!("render failed: {}", e))?;
                let flag = vec![
                    top,
                    view.px((x, t.helipad_y + 40.0 / SCALE)),
                    view.px((x + 25.0 / SCALE, t.helipad_y + 45.0 / SCALE)),
                ];
                root.draw(&Polygon::new(flag, FLAG.filled()))
                    .map_err(|e| anyhow!("render failed: {}", e))?;
            }

            if self.firing.main > 0.0 {
                let (ox, oy) = self.to_world_offset((0.0, -(10.0 + 12.0 * self.firing.main) / SCALE));
                let nozzle_l = self.to_world_offset((-4.0 / SCALE, -10.0 / SCALE));
                let nozzle_r = self.to_world_offset((4.0 / SCALE, -10.0 / SCALE));
                let flame = vec![
                    view.px((self.x + nozzle_l.0, self.y + nozzle_l.1)),
                    view.px((self.x + nozzle_r.0, self.y + nozzle_r.1)),
                    view.px((self.x + ox, self.y + oy)),
                ];
                root.draw(&Polygon::new(flame, FLAME.filled()))
                    .map_err(|e| anyhow!("render failed: {}", e))?;
            }
            if self.firing.side != 0.0 {
                // The left engine (negative) sits on the right of the hull and pushes left
                let side = -self.firing.side.signum();
                let nozzle = self.to_world_offset((side * 17.0 / SCALE, 14.0 / SCALE));
                let plume = self.to_world_offset((
                    side * (17.0 + 10.0 * self.firing.side.abs()) / SCALE,
                    14.0 / SCALE,
                ));
                root.draw(&PathElement::new(
                    vec![
                        view.px((self.x + nozzle.0, self.y + nozzle.1)),
                        view.px((self.x + plume.0, self.y + plume.1)),
                    ],
                    FLAME.stroke_width(3),
                ))
                .map_err(|e| anyhow!("render failed: {}", e))?;
            }

            let hull: Vec<(i32, i32)> = self.hull_points().into_iter().map(|p| view.px(p)).collect();
            for (i, (tx, ty)) in self.leg_tip_offsets().into_iter().enumerate() {
                let corner = hull[if i == 0 { 3 } else { 2 }];
                let color = if self.legs_contact[i] { FLAG } else { HULL_EDGE };
                root.draw(&PathElement::new(
                    vec![corner, view.px((self.x + tx, self.y + ty))],
                    color.stroke_width(2),
                ))
                .map_err(|e| anyhow!("render failed: {}", e))?;
            }
            root.draw(&Polygon::new(hull.clone(), HULL_FILL.filled()))
                .map_err(|e| anyhow!("render failed: {}", e))?;
            let mut outline = hull;
            outline.push(outline[0]);
            root.draw(&PathElement::new(outline, HULL_EDGE.stroke_width(1)))
                .map_err(|e| anyhow!("render failed: {}", e))?;

            root.present().map_err(|e| anyhow!("render failed: {}", e))?;
        }

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    #[test]
    fn test_frame_size() {
        let mut env = LunarLander::new();
        env.reset().unwrap();
        let frame = env.render_rgb(120, 80).unwrap();
        assert_eq!(frame.len(), 120 * 80 * 3);
    }

    #[test]
    fn test_frame_shows_sky_and_lander() {
        let mut env = LunarLander::new();
        env.reset().unwrap();
        env.y = H / 2.0;
        let (w, h) = (300u32, 200u32);
        let frame = env.render_rgb(w, h).unwrap();

        let pixel = |x: u32, y: u32| {
            let i = ((y * w + x) * 3) as usize;
            (frame[i], frame[i + 1], frame[i + 2])
        };

        // Top-left corner is sky, bottom row is ground
        assert_eq!(pixel(1, 1), (0, 0, 0));
        assert_eq!(pixel(w / 2, h - 1), (255, 255, 255));

        let has_hull = frame.chunks(3).any(|p| p == [128, 102, 230]);
        assert!(has_hull, "hull colour should appear in the frame");
    }
}
