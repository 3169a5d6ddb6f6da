use glam::Vec2;
use crate::api::types::Color;

/// A polyline drawn in its owner's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LineComponent {
    pub points: Vec<Vec2>,
    pub width: f32,
    pub color: Color,
    pub antialiased: bool,
}

impl LineComponent {
    pub fn new(width: f32, color: Color) -> Self {
        Self {
            points: Vec::new(),
            width,
            color,
            antialiased: true,
        }
    }

    /// Replace the polyline with a single segment.
    pub fn set_segment(&mut self, from: Vec2, to: Vec2) {
        self.points.clear();
        self.points.push(from);
        self.points.push(to);
    }

    /// Last point of the polyline, if any.
    pub fn end(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    /// Iterate consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}
