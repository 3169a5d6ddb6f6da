use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use crate::components::line::LineComponent;

/// One world-space line segment for the browser renderer.
/// Must match the TypeScript protocol: 9 floats = 36 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LineInstance {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub width: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LineInstance {
    pub const FLOATS: usize = 9;
}

/// Per-frame list of line segments.
pub struct LineBuffer {
    pub lines: Vec<LineInstance>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
        }
    }

    /// Drop lines past `max`.
    pub fn truncate(&mut self, max: usize) {
        self.lines.truncate(max);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn push(&mut self, line: LineInstance) {
        self.lines.push(line);
    }

    /// Push every segment of `line`, mapping its local points through `to_world`.
    pub fn push_polyline(&mut self, line: &LineComponent, to_world: impl Fn(Vec2) -> Vec2) {
        for (from, to) in line.segments() {
            let (from, to) = (to_world(from), to_world(to));
            self.lines.push(LineInstance {
                x0: from.x,
                y0: from.y,
                x1: to.x,
                y1: to.y,
                width: line.width,
                r: line.color.r,
                g: line.color.g,
                b: line.color.b,
                a: line.color.a,
            });
        }
    }

    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Raw pointer to line data for SharedArrayBuffer reads.
    pub fn lines_ptr(&self) -> *const f32 {
        self.lines.as_ptr() as *const f32
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Color;

    #[test]
    fn line_instance_is_9_floats() {
        assert_eq!(std::mem::size_of::<LineInstance>(), LineInstance::FLOATS * 4);
    }

    #[test]
    fn polyline_is_offset_into_world() {
        let mut line = LineComponent::new(3.0, Color::RED);
        line.set_segment(Vec2::ZERO, Vec2::new(10.0, 0.0));

        let mut buf = LineBuffer::new();
        buf.push_polyline(&line, |p| p + Vec2::new(100.0, 50.0));

        assert_eq!(buf.line_count(), 1);
        let l = buf.lines[0];
        assert_eq!((l.x0, l.y0, l.x1, l.y1), (100.0, 50.0, 110.0, 50.0));
        assert_eq!((l.r, l.g, l.b, l.a), (1.0, 0.0, 0.0, 1.0));
        assert_eq!(l.width, 3.0);
    }
}
