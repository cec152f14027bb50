//! Quad commands handed to a batch renderer

/// RGBA color, 0.0-1.0 per channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One textured quad: a UV rectangle in the atlas drawn into a pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCommand {
    /// Top-left UV coordinate (normalized 0-1)
    pub uv_min: [f32; 2],
    /// Bottom-right UV coordinate (normalized 0-1)
    pub uv_max: [f32; 2],
    /// Top-left destination corner in pixels
    pub dest_min: [f32; 2],
    /// Bottom-right destination corner in pixels
    pub dest_max: [f32; 2],
    /// Vertex tint
    pub color: Color,
}

/// Receives quads from a draw call, typically a batching session already
/// bound to the entry's texture
pub trait QuadSink {
    fn push_quad(&mut self, quad: QuadCommand);
}

impl QuadSink for Vec<QuadCommand> {
    fn push_quad(&mut self, quad: QuadCommand) {
        self.push(quad);
    }
}

impl<S: QuadSink + ?Sized> QuadSink for &mut S {
    fn push_quad(&mut self, quad: QuadCommand) {
        (**self).push_quad(quad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(color: Color) -> QuadCommand {
        QuadCommand {
            uv_min: [0.0, 0.0],
            uv_max: [0.5, 0.25],
            dest_min: [10.0, 20.0],
            dest_max: [26.0, 40.0],
            color,
        }
    }

    #[test]
    fn test_default_color_is_opaque_white() {
        assert_eq!(Color::default(), Color::WHITE);
        assert_eq!(Color::BLACK, Color::rgba(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_sink_through_mutable_reference() {
        fn fill(mut sink: impl QuadSink) {
            sink.push_quad(quad(Color::WHITE));
            sink.push_quad(quad(Color::BLACK));
        }

        let mut quads: Vec<QuadCommand> = Vec::new();
        fill(&mut quads);
        assert_eq!(quads, vec![quad(Color::WHITE), quad(Color::BLACK)]);
    }
}
