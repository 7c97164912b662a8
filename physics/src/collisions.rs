use bevy::prelude::*;
use colliders::Collider;

pub mod collider_list;
pub mod colliders;
pub mod shapes;
pub mod spatial_hash;

pub const ALL_LAYERS: i32 = -1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct ColliderId(pub u32);

/// The broad-phase colliders are registered with so that they take part in
/// collision queries.
///
/// Both calls are made at most once per state change by [`Collider`]: a
/// collider is never registered twice in a row nor unregistered while it is
/// not registered. Implementations may still tolerate duplicates.
pub trait PhysicsSystem {
    /// Inserts the collider using its [`Collider::registered_bounds`].
    fn register_collider(&mut self, collider: &Collider);
    fn unregister_collider(&mut self, collider: &Collider);
}

#[cfg(test)]
pub(crate) mod test_utils {
    use bevy::{prelude::*, utils::HashSet};

    use super::{colliders::Collider, ColliderId, PhysicsSystem};
    use crate::debug::DebugDraw;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum PhysicsCall {
        Register(ColliderId),
        Unregister(ColliderId),
    }

    /// Physics double that records every call in order.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingPhysics {
        pub calls: Vec<PhysicsCall>,
        pub registered: HashSet<ColliderId>,
    }

    impl RecordingPhysics {
        pub fn take_calls(&mut self) -> Vec<PhysicsCall> {
            std::mem::take(&mut self.calls)
        }

        pub fn is_registered(&self, id: ColliderId) -> bool {
            self.registered.contains(&id)
        }
    }

    impl PhysicsSystem for RecordingPhysics {
        fn register_collider(&mut self, collider: &Collider) {
            self.calls.push(PhysicsCall::Register(collider.id()));
            self.registered.insert(collider.id());
        }

        fn unregister_collider(&mut self, collider: &Collider) {
            self.calls.push(PhysicsCall::Unregister(collider.id()));
            self.registered.remove(&collider.id());
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub(crate) enum DrawCall {
        Circle { center: Vec2, radius: f32 },
        Rect { center: Vec2, size: Vec2 },
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub calls: Vec<DrawCall>,
        pub colors: Vec<Color>,
    }

    impl DebugDraw for RecordingSurface {
        fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.calls.push(DrawCall::Circle { center, radius });
            self.colors.push(color);
        }

        fn draw_rect(&mut self, center: Vec2, size: Vec2, color: Color) {
            self.calls.push(DrawCall::Rect { center, size });
            self.colors.push(color);
        }
    }
}
