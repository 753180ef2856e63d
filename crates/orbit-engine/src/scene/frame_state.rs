use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

/// Radius of the offset's circular path, in clip-space units.
pub const ORBIT_RADIUS: f32 = 0.3;

/// One triangle corner: clip-space position + RGBA color, interleaved.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color: color.to_array(),
        }
    }

    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4  // color
    ];

    /// Interleaved layout, stride 24 bytes.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new(0.0, 0.5, Color::RED),
    Vertex::new(-0.5, -0.5, Color::GREEN),
    Vertex::new(0.5, -0.5, Color::BLUE),
];

/// Global translation applied to every vertex.
///
/// Padded to 16 bytes to match the uniform block layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct UniformOffset {
    pub offset: [f32; 2],
    pub _pad: [f32; 2],
}

impl UniformOffset {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            offset: [x, y],
            _pad: [0.0; 2],
        }
    }
}

/// Fixed vertex data plus the time-driven uniform.
///
/// Holds no per-frame state: the uniform is a pure function of time.
#[derive(Debug, Clone)]
pub struct FrameState {
    vertices: [Vertex; 3],
}

impl FrameState {
    pub fn new() -> Self {
        Self { vertices: TRIANGLE }
    }

    pub fn vertices(&self) -> &[Vertex; 3] {
        &self.vertices
    }

    /// Offset at `t` seconds on the monotonic frame clock.
    pub fn uniform_at(&self, t: f64) -> UniformOffset {
        let radius = ORBIT_RADIUS as f64;
        UniformOffset::new((radius * t.sin()) as f32, (radius * t.cos()) as f32)
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < EPS && (a[1] - b[1]).abs() < EPS
    }

    // ── uniform ───────────────────────────────────────────────────────────

    #[test]
    fn uniform_follows_sin_cos() {
        let state = FrameState::new();
        for t in [0.0, 0.5, 1.0, 2.75, 10.0, 1234.5] {
            let u = state.uniform_at(t);
            let expected = [(0.3 * t.sin()) as f32, (0.3 * t.cos()) as f32];
            assert!(approx(u.offset, expected), "t={t}: {:?}", u.offset);
            assert_eq!(u._pad, [0.0, 0.0]);
        }
    }

    #[test]
    fn uniform_at_zero_starts_at_top() {
        // sin(0) = 0, cos(0) = 1.
        let u = FrameState::new().uniform_at(0.0);
        assert!(approx(u.offset, [0.0, 0.3]));
    }

    #[test]
    fn uniform_at_quarter_turn() {
        let u = FrameState::new().uniform_at(std::f64::consts::FRAC_PI_2);
        assert!(approx(u.offset, [0.3, 0.0]));
    }

    #[test]
    fn uniform_magnitude_is_bounded() {
        let state = FrameState::new();
        let mut t = 0.0;
        while t < 50.0 {
            let [x, y] = state.uniform_at(t).offset;
            assert!((x * x + y * y).sqrt() <= ORBIT_RADIUS + EPS);
            t += 0.37;
        }
    }

    #[test]
    fn uniform_is_deterministic() {
        let state = FrameState::new();
        assert_eq!(state.uniform_at(3.3), state.uniform_at(3.3));
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn uniform_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<UniformOffset>(), 16);
    }

    #[test]
    fn vertex_layout_is_interleaved_24_bytes() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);

        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x2);

        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].offset, 8);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn triangle_is_fixed() {
        let state = FrameState::new();
        assert_eq!(state.vertices(), &TRIANGLE);
        assert_eq!(state.vertices()[0].position, [0.0, 0.5]);
        assert_eq!(state.vertices()[1].color, [0.0, 1.0, 0.0, 1.0]);
    }
}
