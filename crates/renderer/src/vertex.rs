//! Vertex and instance formats shared by the pipelines.

use bytemuck::{Pod, Zeroable};

use crate::font::{glyph_cell, ATLAS_COLS, ATLAS_ROWS, GLYPH_H, GLYPH_W};

/// Lit-mesh vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Star point: a bare world position, uploaded straight from the star field.
pub fn star_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

/// Per-instance model matrix and linear colour for the lit pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix columns.
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceData {
    pub fn new(model: [[f32; 4]; 4], color: [f32; 4]) -> Self {
        Self { model, color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const COLUMN: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: COLUMN,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: COLUMN * 2,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: COLUMN * 3,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: COLUMN * 4,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Vertex for screen-space text / UI overlay.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OverlayVertex {
    /// NDC position (x, y) in -1..1
    pub position: [f32; 2],
    /// UV into font atlas (negative x = solid color quad)
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl OverlayVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Builds overlay quads in pixel coordinates (origin top-left).
pub struct OverlayTextBuilder {
    pub vertices: Vec<OverlayVertex>,
    pub indices: Vec<u32>,
    screen_w: f32,
    screen_h: f32,
}

impl OverlayTextBuilder {
    pub fn new(screen_w: f32, screen_h: f32) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            screen_w: screen_w.max(1.0),
            screen_h: screen_h.max(1.0),
        }
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.screen_w, self.screen_h)
    }

    /// Convert pixel coords to NDC.
    fn px_to_ndc(&self, px: f32, py: f32) -> [f32; 2] {
        [
            (px / self.screen_w) * 2.0 - 1.0,
            1.0 - (py / self.screen_h) * 2.0,
        ]
    }

    fn push_quad(&mut self, x: f32, y: f32, w: f32, h: f32, uv: [[f32; 2]; 2], color: [f32; 4]) {
        let tl = self.px_to_ndc(x, y);
        let br = self.px_to_ndc(x + w, y + h);
        let [[u0, v0], [u1, v1]] = uv;
        let base = self.vertices.len() as u32;
        self.vertices.extend([
            OverlayVertex { position: [tl[0], tl[1]], tex_coords: [u0, v0], color },
            OverlayVertex { position: [br[0], tl[1]], tex_coords: [u1, v0], color },
            OverlayVertex { position: [br[0], br[1]], tex_coords: [u1, v1], color },
            OverlayVertex { position: [tl[0], br[1]], tex_coords: [u0, v1], color },
        ]);
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Solid-colour rectangle. Coordinates in pixels.
    pub fn add_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        self.push_quad(x, y, w, h, [[-1.0, -1.0], [-1.0, -1.0]], color);
    }

    /// Pixel size of `text` at `scale` (scale 1 = 6x8 pixels per glyph).
    pub fn text_size(text: &str, scale: f32) -> (f32, f32) {
        (
            text.chars().count() as f32 * GLYPH_W as f32 * scale,
            GLYPH_H as f32 * scale,
        )
    }

    /// Text with its top-left corner at (x, y). Characters outside the font leave a gap.
    pub fn add_text(&mut self, x: f32, y: f32, text: &str, scale: f32, color: [f32; 4]) {
        let gw = GLYPH_W as f32 * scale;
        let gh = GLYPH_H as f32 * scale;
        let mut cx = x;
        for ch in text.chars() {
            if let Some((col, row)) = glyph_cell(ch) {
                let (col, row) = (col as f32, row as f32);
                let (cols, rows) = (ATLAS_COLS as f32, ATLAS_ROWS as f32);
                let uv = [[col / cols, row / rows], [(col + 1.0) / cols, (row + 1.0) / rows]];
                self.push_quad(cx, y, gw, gh, uv, color);
            }
            cx += gw;
        }
    }

    /// Text horizontally centred on `center_x`.
    pub fn add_text_centered(&mut self, center_x: f32, y: f32, text: &str, scale: f32, color: [f32; 4]) {
        let (w, _) = Self::text_size(text, scale);
        self.add_text(center_x - w / 2.0, y, text, scale, color);
    }

    /// Text whose right edge sits at `right_x`.
    pub fn add_text_right(&mut self, right_x: f32, y: f32, text: &str, scale: f32, color: [f32; 4]) {
        let (w, _) = Self::text_size(text, scale);
        self.add_text(right_x - w, y, text, scale, color);
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_covers_the_whole_screen_in_ndc() {
        let mut builder = OverlayTextBuilder::new(800.0, 600.0);
        builder.add_rect(0.0, 0.0, 800.0, 600.0, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(builder.vertices[0].position, [-1.0, 1.0]);
        assert_eq!(builder.vertices[2].position, [1.0, -1.0]);
        assert!(builder.vertices.iter().all(|v| v.tex_coords[0] < 0.0));
    }

    #[test]
    fn unsupported_characters_leave_gaps() {
        let mut builder = OverlayTextBuilder::new(800.0, 600.0);
        builder.add_text(0.0, 0.0, "a b", 2.0, [1.0; 4]);
        assert_eq!(builder.indices.len(), 3 * 6);
        // Space is a glyph cell too, just blank.
        let mut missing = OverlayTextBuilder::new(800.0, 600.0);
        missing.add_text(0.0, 0.0, "a\u{2603}b", 2.0, [1.0; 4]);
        assert_eq!(missing.indices.len(), 2 * 6);
    }

    #[test]
    fn centred_text_is_symmetric() {
        let mut builder = OverlayTextBuilder::new(800.0, 600.0);
        builder.add_text_centered(400.0, 100.0, "HELLO", 1.0, [1.0; 4]);
        let left = builder.vertices.first().unwrap().position[0];
        let right = builder.vertices[builder.vertices.len() - 3].position[0];
        assert!((left + right).abs() < 1e-5);
    }

    #[test]
    fn text_size_counts_characters_not_bytes() {
        assert_eq!(OverlayTextBuilder::text_size("abc", 2.0), (36.0, 16.0));
        assert_eq!(OverlayTextBuilder::text_size("é", 1.0), (6.0, 8.0));
    }
}
