use bevy::prelude::*;

/// Opaque surface colliders outline their shapes onto.
pub trait DebugDraw {
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn draw_rect(&mut self, center: Vec2, size: Vec2, color: Color);
}

impl DebugDraw for Gizmos<'_, '_> {
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circle_2d(center, radius, color);
    }

    fn draw_rect(&mut self, center: Vec2, size: Vec2, color: Color) {
        self.rect_2d(center, 0.0, size, color);
    }
}
