use std::ops::Index;

use bevy::prelude::*;
use thiserror::Error;

use super::{colliders::Collider, ColliderId, PhysicsSystem};
use crate::debug::DebugDraw;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ColliderListError {
    #[error("Collider {0:?} is not in the ColliderList")]
    NotFound(ColliderId),
    #[error("Index {index} is out of bounds for a ColliderList of {len} colliders")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// The colliders attached to a single entity, in insertion order.
///
/// Index 0 is the main collider. Every member has its `entity` set to the
/// owner, and a member is registered with the physics system exactly while the
/// owner is both in the scene and enabled. The list mirrors those two owner
/// facts from the lifecycle hooks below; the owning entity layer is expected
/// to call them (see [`PhysicsPlugin`](crate::plugin::PhysicsPlugin)).
///
/// Mutating the list while iterating it is rejected by the borrow checker:
/// fan-outs take `&mut self` and colliders hold no way back to their list.
#[derive(Debug, Component, Reflect)]
pub struct ColliderList {
    owner: Entity,
    colliders: Vec<Collider>,
    owner_position: Vec2,
    owner_in_scene: bool,
    owner_enabled: bool,
}

impl ColliderList {
    pub fn new(owner: Entity) -> Self {
        Self {
            owner,
            colliders: Vec::new(),
            owner_position: Vec2::ZERO,
            owner_in_scene: false,
            owner_enabled: true,
        }
    }

    /// Adds a collider before the owner enters the scene. Nothing can be
    /// registered at that point, so no physics system is needed.
    ///
    /// # Panics
    ///
    /// Panics if the owner is already in the scene, use [`ColliderList::add`].
    pub fn with(mut self, mut collider: Collider) -> Self {
        assert!(
            !self.owner_in_scene,
            "ColliderList::with called on a list whose owner {:?} is already in the scene",
            self.owner
        );

        self.stamp(&mut collider);
        self.colliders.push(collider);
        self
    }

    /// Adds the collider, registering it if the owner is enabled and in the
    /// scene, and returns it for further configuration.
    pub fn add(
        &mut self,
        mut collider: Collider,
        physics: &mut impl PhysicsSystem,
    ) -> &mut Collider {
        self.stamp(&mut collider);
        if self.owner_enabled {
            collider.register_with_physics_system(physics);
        }

        self.colliders.push(collider);
        let index = self.colliders.len() - 1;
        &mut self.colliders[index]
    }

    /// Removes the collider, unregistering it and clearing its entity.
    ///
    /// # Panics
    ///
    /// Panics if the collider is not in the list. The list is left untouched.
    pub fn remove(&mut self, id: ColliderId, physics: &mut impl PhysicsSystem) -> Collider {
        self.try_remove(id, physics).unwrap_or_else(|err| panic!("{err}"))
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds. The list is left untouched.
    pub fn remove_at(&mut self, index: usize, physics: &mut impl PhysicsSystem) -> Collider {
        self.try_remove_at(index, physics).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_remove(
        &mut self,
        id: ColliderId,
        physics: &mut impl PhysicsSystem,
    ) -> Result<Collider, ColliderListError> {
        let index = self.position(id).ok_or(ColliderListError::NotFound(id))?;
        self.try_remove_at(index, physics)
    }

    pub fn try_remove_at(
        &mut self,
        index: usize,
        physics: &mut impl PhysicsSystem,
    ) -> Result<Collider, ColliderListError> {
        let len = self.colliders.len();
        let Some(collider) = self.colliders.get_mut(index) else {
            return Err(ColliderListError::IndexOutOfBounds { index, len });
        };

        collider.on_entity_removed_from_scene(physics);
        collider.clear_entity();

        Ok(self.colliders.remove(index))
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn owner_position(&self) -> Vec2 {
        self.owner_position
    }

    pub fn is_owner_in_scene(&self) -> bool {
        self.owner_in_scene
    }

    pub fn is_owner_enabled(&self) -> bool {
        self.owner_enabled
    }

    /// The first collider added that has not been removed since.
    pub fn main_collider(&self) -> Option<&Collider> {
        self.colliders.first()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Collider> {
        self.colliders.get(index)
    }

    pub fn get_by_id(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id() == id)
    }

    /// Changes to a member that the physics system records go through the
    /// collider setters, which take the physics system to stay in sync.
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.iter_mut().find(|c| c.id() == id)
    }

    pub fn position(&self, id: ColliderId) -> Option<usize> {
        self.colliders.iter().position(|c| c.id() == id)
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Collider> {
        self.colliders.iter()
    }

    pub fn on_entity_added_to_scene(&mut self) {
        self.owner_in_scene = true;
        for collider in &mut self.colliders {
            collider.on_entity_added_to_scene();
        }
        debug!("entity {:?} added to scene with {} colliders", self.owner, self.len());
    }

    pub fn on_entity_removed_from_scene(&mut self, physics: &mut impl PhysicsSystem) {
        for collider in &mut self.colliders {
            collider.on_entity_removed_from_scene(physics);
        }
        self.owner_in_scene = false;
        debug!("entity {:?} removed from scene", self.owner);
    }

    pub fn on_entity_position_changed(
        &mut self,
        position: Vec2,
        physics: &mut impl PhysicsSystem,
    ) {
        self.owner_position = position;
        for collider in &mut self.colliders {
            collider.on_entity_position_changed(position, physics);
        }
    }

    pub fn on_entity_enabled(&mut self, physics: &mut impl PhysicsSystem) {
        self.owner_enabled = true;
        self.register_all_colliders_with_physics_system(physics);
    }

    pub fn on_entity_disabled(&mut self, physics: &mut impl PhysicsSystem) {
        self.owner_enabled = false;
        self.unregister_all_colliders_with_physics_system(physics);
    }

    pub fn debug_render(&self, surface: &mut impl DebugDraw) {
        for collider in &self.colliders {
            collider.debug_render(surface);
        }
    }

    pub fn register_all_colliders_with_physics_system(
        &mut self,
        physics: &mut impl PhysicsSystem,
    ) {
        for collider in &mut self.colliders {
            collider.register_with_physics_system(physics);
        }
    }

    pub fn unregister_all_colliders_with_physics_system(
        &mut self,
        physics: &mut impl PhysicsSystem,
    ) {
        for collider in &mut self.colliders {
            collider.unregister_with_physics_system(physics);
        }
    }

    fn stamp(&self, collider: &mut Collider) {
        debug_assert!(
            collider.entity().is_none(),
            "Collider {:?} already belongs to {:?}",
            collider.id(),
            collider.entity()
        );

        collider.set_entity(self.owner);
        collider.set_position(self.owner_position);
        if self.owner_in_scene {
            collider.on_entity_added_to_scene();
        }
    }
}

impl Index<usize> for ColliderList {
    type Output = Collider;

    fn index(&self, index: usize) -> &Self::Output {
        &self.colliders[index]
    }
}

impl<'a> IntoIterator for &'a ColliderList {
    type Item = &'a Collider;
    type IntoIter = std::slice::Iter<'a, Collider>;

    fn into_iter(self) -> Self::IntoIter {
        self.colliders.iter()
    }
}
