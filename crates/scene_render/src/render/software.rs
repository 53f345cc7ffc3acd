//! Flat-shaded software rasterizer
//!
//! A z-buffered triangle and line rasterizer that keeps the tool
//! usable without a GPU. It deliberately does no texture mapping and
//! no per-pixel shading beyond a hemisphere term: semantic frames
//! need exact flat colors, and photometric frames only need to be
//! recognizable. Frames clear to black, which is also the reserved
//! background value for index-encoded output.

use crate::camera::CameraDescriptor;
use crate::foundation::math::{Mat4, Vec4};
use crate::scene::{NodeKind, SceneContainer};

use super::{
    Material, Mesh, MeshTopology, PixelBuffer, RenderError, RenderFlags, RenderSettings, Renderer,
};

/// A vertex projected into screen space
#[derive(Debug, Clone, Copy)]
struct Projected {
    x: f32,
    y: f32,
    depth: f32,
}

/// The built-in CPU renderer
#[derive(Debug)]
pub struct SoftwareRenderer {
    settings: RenderSettings,
    depth: Vec<f32>,
}

impl SoftwareRenderer {
    /// Create a renderer for the given output settings
    pub fn new(settings: RenderSettings) -> Self {
        let depth = vec![f32::INFINITY; (settings.width * settings.height) as usize];
        Self { settings, depth }
    }

    /// Output settings this renderer was created with
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Project a model-space vertex to screen space
    ///
    /// Returns `None` for vertices on or behind the camera plane; a
    /// primitive with any such vertex is skipped rather than clipped.
    fn project(&self, mvp: &Mat4, position: [f32; 3]) -> Option<Projected> {
        let clip = mvp * Vec4::new(position[0], position[1], position[2], 1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc_x = clip.x * inv_w;
        let ndc_y = clip.y * inv_w;
        let depth = clip.z * inv_w;
        if !(0.0..=1.0).contains(&depth) {
            return None;
        }
        Some(Projected {
            x: (ndc_x + 1.0) * 0.5 * self.settings.width as f32,
            y: (1.0 - ndc_y) * 0.5 * self.settings.height as f32,
            depth,
        })
    }

    fn shade(&self, material: &Material, normal: [f32; 3], scene: &SceneContainer) -> [u8; 4] {
        if material.unlit {
            return to_rgba(material.base_color);
        }

        let mut color = material.base_color;
        if let Some(texture) = &material.texture {
            let avg = texture.average_rgb();
            for (c, a) in color.iter_mut().zip(avg) {
                *c *= a;
            }
        }

        if self.settings.flags.contains(RenderFlags::LIGHTS) {
            if let Some(light) = scene.light() {
                // Hemisphere blend on the world-up component of the
                // flat normal.
                let weight = 0.5 * (normal[1] + 1.0);
                for ((c, sky), ground) in color
                    .iter_mut()
                    .zip(light.sky_color)
                    .zip(light.ground_color)
                {
                    *c *= ground + (sky - ground) * weight;
                }
            }
        }

        if self.settings.flags.contains(RenderFlags::AMBIENT_OCCLUSION) {
            // Crude ambient term: upward-facing surfaces receive more
            // ambient light than vertical ones.
            let ambient = 0.6 + 0.4 * normal[1].clamp(0.0, 1.0);
            for c in color.iter_mut() {
                *c *= ambient;
            }
        }

        to_rgba(color)
    }

    fn raster_mesh(
        &mut self,
        frame: &mut PixelBuffer,
        mesh: &Mesh,
        material: &Material,
        world: &Mat4,
        view_proj: &Mat4,
        scene: &SceneContainer,
    ) {
        let mvp = view_proj * world;
        match mesh.topology {
            MeshTopology::Triangles => {
                for tri in mesh.indices.chunks_exact(3) {
                    let a = &mesh.vertices[tri[0] as usize];
                    let b = &mesh.vertices[tri[1] as usize];
                    let c = &mesh.vertices[tri[2] as usize];

                    let (Some(pa), Some(pb), Some(pc)) = (
                        self.project(&mvp, a.position),
                        self.project(&mvp, b.position),
                        self.project(&mvp, c.position),
                    ) else {
                        continue;
                    };

                    let color = self.shade(material, a.normal, scene);
                    self.fill_triangle(frame, pa, pb, pc, color);
                }
            }
            MeshTopology::Lines => {
                let color = to_rgba(material.base_color);
                for seg in mesh.indices.chunks_exact(2) {
                    let a = &mesh.vertices[seg[0] as usize];
                    let b = &mesh.vertices[seg[1] as usize];

                    let (Some(pa), Some(pb)) = (
                        self.project(&mvp, a.position),
                        self.project(&mvp, b.position),
                    ) else {
                        continue;
                    };

                    self.draw_line(frame, pa, pb, color);
                }
            }
        }
    }

    fn fill_triangle(
        &mut self,
        frame: &mut PixelBuffer,
        a: Projected,
        b: Projected,
        c: Projected,
        color: [u8; 4],
    ) {
        let area = edge(a, b, c.x, c.y);
        if area.abs() < 1e-6 {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil() as i64)
            .clamp(0, i64::from(self.settings.width) - 1) as u32;
        let max_y = (a.y.max(b.y).max(c.y).ceil() as i64)
            .clamp(0, i64::from(self.settings.height) - 1) as u32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                let slot = (y * self.settings.width + x) as usize;
                if depth < self.depth[slot] {
                    self.depth[slot] = depth;
                    frame.put(x, y, color);
                }
            }
        }
    }

    fn draw_line(&mut self, frame: &mut PixelBuffer, a: Projected, b: Projected, color: [u8; 4]) {
        let mut x0 = a.x.round() as i64;
        let mut y0 = a.y.round() as i64;
        let x1 = b.x.round() as i64;
        let y1 = b.y.round() as i64;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let steps = dx.max(-dy).max(1) as f32;
        let mut step = 0.0f32;

        loop {
            if x0 >= 0
                && y0 >= 0
                && x0 < i64::from(self.settings.width)
                && y0 < i64::from(self.settings.height)
            {
                let t = step / steps;
                // Small bias so wireframes win ties against the
                // surfaces they sit on.
                let depth = a.depth + (b.depth - a.depth) * t - 1e-4;
                let slot = (y0 as u32 * self.settings.width + x0 as u32) as usize;
                if depth < self.depth[slot] {
                    self.depth[slot] = depth;
                    frame.put(x0 as u32, y0 as u32, color);
                }
            }

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1.0;
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn render(
        &mut self,
        scene: &SceneContainer,
        camera: &CameraDescriptor,
    ) -> Result<PixelBuffer, RenderError> {
        if camera.direction.norm() < 1e-6 {
            return Err(RenderError::Camera("zero view direction".to_string()));
        }
        if camera.direction.cross(&camera.up).norm() < 1e-6 {
            return Err(RenderError::Camera(
                "view direction parallel to up".to_string(),
            ));
        }

        let view_proj = camera.projection_matrix() * camera.view_matrix();
        let mut frame = PixelBuffer::filled(self.settings.width, self.settings.height, BACKGROUND);
        self.depth.fill(f32::INFINITY);

        // Nodes are walked in insertion order; the depth buffer makes
        // the order irrelevant to the output.
        for (_, node) in scene.iter() {
            let world = node.world_transform;
            match &node.kind {
                NodeKind::Object { mesh, material, .. } => {
                    self.raster_mesh(&mut frame, mesh, material, &world, &view_proj, scene);
                }
                NodeKind::Frustum { mesh, material } => {
                    self.raster_mesh(&mut frame, mesh, material, &world, &view_proj, scene);
                }
                _ => {}
            }
        }

        Ok(frame)
    }
}

/// Background clear color; decodes to semantic index 0
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

fn edge(a: Projected, b: Projected, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn to_rgba(color: [f32; 3]) -> [u8; 4] {
    [
        (color[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        255,
    ]
}
