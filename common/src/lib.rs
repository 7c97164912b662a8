use bevy::prelude::*;

pub mod math;

/// Describes a 2D-rectangle with {x,y} being the top-left corner of the rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct FRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle of the given size centered on `center`.
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    pub fn location(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.x <= point.x
            && point.x < (self.x + self.width)
            && self.y <= point.y
            && point.y < (self.y + self.height)
    }

    /// Touching edges count as an overlap, so zero-sized rectangles
    /// sitting on a border are still reported by broadphase queries.
    pub fn intersects(&self, other: FRect) -> bool {
        other.left() <= self.right()
            && self.left() <= other.right()
            && other.top() <= self.bottom()
            && self.top() <= other.bottom()
    }

    pub fn union(&self, other: &FRect) -> FRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);

        FRect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    pub fn union_vec2(&self, vec: &Vec2) -> FRect {
        let rect = FRect::new(vec.x, vec.y, 0.0, 0.0);
        self.union(&rect)
    }
}
