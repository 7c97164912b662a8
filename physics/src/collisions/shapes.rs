use bevy::prelude::*;
use common::FRect;

#[derive(Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub enum ShapeType {
    #[default]
    None,
    Circle {
        radius: f32,
    },
    Box {
        width: f32,
        height: f32,
    },
}

/// Shape of a collider together with its cached world-space placement.
///
/// `position` is the owning entity's position; `center` and `bounds` already
/// include the collider's local offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct Shape {
    pub shape_type: ShapeType,
    pub position: Vec2,
    pub bounds: FRect,
    pub center: Vec2,
}

#[inline]
fn calc_bounds(shape_type: ShapeType, center: Vec2) -> FRect {
    match shape_type {
        ShapeType::None => FRect::new(center.x, center.y, 0.0, 0.0),
        ShapeType::Circle { radius } => {
            FRect::from_center(center, Vec2::splat(radius * 2.0))
        }
        ShapeType::Box { width, height } => FRect::from_center(center, Vec2::new(width, height)),
    }
}

impl Shape {
    pub fn new(shape_type: ShapeType) -> Self {
        let mut shape = Self {
            shape_type,
            ..default()
        };
        shape.recalculate(Vec2::ZERO);
        shape
    }

    pub(crate) fn recalculate(&mut self, local_offset: Vec2) {
        self.center = self.position + local_offset;
        self.bounds = calc_bounds(self.shape_type, self.center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_bounds_surround_center() {
        let mut shape = Shape::new(ShapeType::Circle { radius: 5.0 });
        shape.position = Vec2::new(10.0, 10.0);
        shape.recalculate(Vec2::new(0.0, 2.0));

        assert_eq!(shape.center, Vec2::new(10.0, 12.0));
        assert_eq!(shape.bounds, FRect::new(5.0, 7.0, 10.0, 10.0));
    }

    #[test]
    fn box_bounds_are_centered() {
        let shape = Shape::new(ShapeType::Box {
            width: 8.0,
            height: 4.0,
        });

        assert_eq!(shape.center, Vec2::ZERO);
        assert_eq!(shape.bounds, FRect::new(-4.0, -2.0, 8.0, 4.0));
    }

    #[test]
    fn empty_shape_has_point_bounds() {
        let mut shape = Shape::new(ShapeType::None);
        shape.position = Vec2::new(3.0, -1.0);
        shape.recalculate(Vec2::ZERO);

        assert_eq!(shape.bounds, FRect::new(3.0, -1.0, 0.0, 0.0));
    }
}
