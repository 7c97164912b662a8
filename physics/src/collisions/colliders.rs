use std::sync::atomic::{AtomicU32, Ordering};

use bevy::{
    color::palettes::css::{RED, YELLOW},
    prelude::*,
};
use common::FRect;

use super::{
    shapes::{Shape, ShapeType},
    ColliderId, PhysicsSystem, ALL_LAYERS,
};
use crate::debug::DebugDraw;

static COLLIDER_ID_GEN: AtomicU32 = AtomicU32::new(0);

const SOLID_COLOR: Srgba = RED;
const TRIGGER_COLOR: Srgba = YELLOW;

/// A shape attached to an entity through its [`ColliderList`].
///
/// The collider remembers whether it is registered with the physics system
/// and which bounds it was registered with, so the registration primitives are
/// safe to call repeatedly. Everything the physics system records about a
/// registered collider (shape, offset, layer) only changes through setters
/// that move the registration along.
///
/// [`ColliderList`]: super::collider_list::ColliderList
#[derive(Debug, Reflect)]
pub struct Collider {
    id: ColliderId,
    entity: Option<Entity>,
    shape: Shape,
    pub is_trigger: bool,
    local_offset: Vec2,
    physics_layer: i32,
    collides_with_layers: i32,
    registered_bounds: FRect,
    is_registered: bool,
    is_parent_entity_added_to_scene: bool,
}

impl Collider {
    pub fn new(shape_type: ShapeType) -> Self {
        let id = ColliderId(COLLIDER_ID_GEN.fetch_add(1, Ordering::SeqCst));

        Self {
            id,
            entity: None,
            shape: Shape::new(shape_type),
            is_trigger: false,
            local_offset: Vec2::ZERO,
            physics_layer: 1 << 0,
            collides_with_layers: ALL_LAYERS,
            registered_bounds: FRect::default(),
            is_registered: false,
            is_parent_entity_added_to_scene: false,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(ShapeType::Circle { radius })
    }

    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(ShapeType::Box { width, height })
    }

    pub fn with_offset(mut self, local_offset: Vec2) -> Self {
        self.local_offset = local_offset;
        self.shape.recalculate(local_offset);
        self
    }

    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    pub fn with_layers(mut self, physics_layer: i32, collides_with_layers: i32) -> Self {
        self.physics_layer = physics_layer;
        self.collides_with_layers = collides_with_layers;
        self
    }

    pub fn id(&self) -> ColliderId {
        self.id
    }

    /// The entity whose list currently holds this collider, `None` once removed.
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn physics_layer(&self) -> i32 {
        self.physics_layer
    }

    pub fn collides_with_layers(&self) -> i32 {
        self.collides_with_layers
    }

    pub fn bounds(&self) -> FRect {
        self.shape.bounds
    }

    pub fn center(&self) -> Vec2 {
        self.shape.center
    }

    pub fn position(&self) -> Vec2 {
        self.shape.position
    }

    pub fn local_offset(&self) -> Vec2 {
        self.local_offset
    }

    pub fn absolute_position(&self) -> Vec2 {
        self.shape.position + self.local_offset
    }

    pub fn is_registered(&self) -> bool {
        self.is_registered
    }

    pub fn registered_bounds(&self) -> FRect {
        self.registered_bounds
    }

    pub fn is_parent_entity_added_to_scene(&self) -> bool {
        self.is_parent_entity_added_to_scene
    }

    pub fn set_physics_layer(&mut self, physics_layer: i32, physics: &mut impl PhysicsSystem) {
        self.physics_layer = physics_layer;
        self.refresh_registration(physics);
    }

    /// Not recorded by the physics system, so no re-registration is needed.
    pub fn set_collides_with_layers(&mut self, collides_with_layers: i32) {
        self.collides_with_layers = collides_with_layers;
    }

    pub fn set_shape_type(&mut self, shape_type: ShapeType, physics: &mut impl PhysicsSystem) {
        self.shape.shape_type = shape_type;
        self.shape.recalculate(self.local_offset);
        self.refresh_registration(physics);
    }

    pub fn set_local_offset(&mut self, local_offset: Vec2, physics: &mut impl PhysicsSystem) {
        self.local_offset = local_offset;
        self.shape.recalculate(local_offset);
        self.refresh_registration(physics);
    }

    pub(crate) fn set_entity(&mut self, entity: Entity) {
        self.entity = Some(entity);
    }

    pub(crate) fn clear_entity(&mut self) {
        self.entity = None;
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.shape.position = position;
        self.shape.recalculate(self.local_offset);
    }

    /// Registers with the physics system. Does nothing while the parent entity
    /// is outside the scene or when already registered.
    pub fn register_with_physics_system(&mut self, physics: &mut impl PhysicsSystem) {
        if self.is_parent_entity_added_to_scene && !self.is_registered {
            self.registered_bounds = self.bounds();
            physics.register_collider(self);
            self.is_registered = true;
            trace!("registered collider {:?} at {:?}", self.id, self.registered_bounds);
        }
    }

    pub fn unregister_with_physics_system(&mut self, physics: &mut impl PhysicsSystem) {
        if self.is_registered {
            physics.unregister_collider(self);
            self.is_registered = false;
            trace!("unregistered collider {:?}", self.id);
        }
    }

    pub fn on_entity_added_to_scene(&mut self) {
        self.is_parent_entity_added_to_scene = true;
    }

    /// A collider outside of a scene can't stay in the physics system.
    pub fn on_entity_removed_from_scene(&mut self, physics: &mut impl PhysicsSystem) {
        self.unregister_with_physics_system(physics);
        self.is_parent_entity_added_to_scene = false;
    }

    /// Recomputes the cached bounds and moves the registration along with them.
    pub fn on_entity_position_changed(
        &mut self,
        position: Vec2,
        physics: &mut impl PhysicsSystem,
    ) {
        self.set_position(position);

        if self.registered_bounds != self.bounds() {
            self.refresh_registration(physics);
        }
    }

    /// Replaces the physics system's record of a registered collider with its
    /// current state.
    fn refresh_registration(&mut self, physics: &mut impl PhysicsSystem) {
        if self.is_registered {
            physics.unregister_collider(self);
            self.registered_bounds = self.bounds();
            physics.register_collider(self);
        }
    }

    pub fn debug_render(&self, surface: &mut impl DebugDraw) {
        let color = if self.is_trigger {
            TRIGGER_COLOR
        } else {
            SOLID_COLOR
        };

        match self.shape.shape_type {
            ShapeType::None => {}
            ShapeType::Circle { radius } => {
                surface.draw_circle(self.center(), radius, color.into());
            }
            ShapeType::Box { width, height } => {
                surface.draw_rect(self.center(), Vec2::new(width, height), color.into());
            }
        }
    }
}
