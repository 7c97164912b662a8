use bevy::{ecs::system::EntityCommands, gizmos::config::GizmoConfigStore, prelude::*};

use crate::{
    collisions::{collider_list::ColliderList, colliders::Collider, spatial_hash::SpatialHash},
    config::PhysicsConfig,
};

/// Marks an entity as disabled. Its colliders stay in its [`ColliderList`]
/// but are taken out of the spatial hash until the marker is removed.
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
pub struct Inactive;

/// Keeps every [`ColliderList`] in the world in sync with the [`SpatialHash`].
///
/// Entity lifecycle mapping:
/// - inserting a `ColliderList` adds the entity to the scene, and registers
///   its colliders unless the entity is [`Inactive`]
/// - removing the list or despawning the entity removes it from the scene,
///   which unregisters every collider
/// - inserting or removing [`Inactive`] disables or enables the entity
/// - a changed `Transform` moves the colliders
#[derive(Default)]
pub struct PhysicsPlugin {
    pub config: PhysicsConfig,
}

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SpatialHash::new(self.config.cell_size))
            .insert_resource(self.config.clone())
            .register_type::<ColliderList>()
            .register_type::<Inactive>()
            .add_systems(PostUpdate, sync_collider_positions)
            .observe(on_collider_list_inserted)
            .observe(on_collider_list_removed)
            .observe(on_entity_disabled)
            .observe(on_entity_enabled);

        if self.config.debug_draw {
            app.add_systems(
                Update,
                debug_draw.run_if(resource_exists::<GizmoConfigStore>),
            );
        }
    }
}

pub trait ColliderListCommands {
    /// Inserts a [`ColliderList`] owned by this entity holding `colliders`.
    fn insert_colliders(&mut self, colliders: impl IntoIterator<Item = Collider>) -> &mut Self;
}

impl ColliderListCommands for EntityCommands<'_> {
    fn insert_colliders(&mut self, colliders: impl IntoIterator<Item = Collider>) -> &mut Self {
        let list = colliders
            .into_iter()
            .fold(ColliderList::new(self.id()), ColliderList::with);

        self.insert(list)
    }
}

fn on_collider_list_inserted(
    trigger: Trigger<OnInsert, ColliderList>,
    mut spatial_hash: ResMut<SpatialHash>,
    mut query: Query<(&mut ColliderList, Option<&Transform>, Has<Inactive>)>,
) {
    let entity = trigger.entity();
    let Ok((mut list, transform, inactive)) = query.get_mut(entity) else {
        return;
    };

    // A replaced list is dropped without any removal hook firing.
    let stale: Vec<_> = spatial_hash
        .colliders_owned_by(entity)
        .filter(|id| !list.contains(*id))
        .collect();
    for id in stale {
        warn!("collider {:?} of {:?} outlived its ColliderList", id, entity);
        spatial_hash.remove_by_id(id);
    }

    if list.owner() != entity {
        error!(
            "ColliderList owned by {:?} was inserted on {:?}, its colliders stay unregistered",
            list.owner(),
            entity
        );
        return;
    }
    if list.is_owner_in_scene() {
        return;
    }

    if let Some(transform) = transform {
        list.on_entity_position_changed(transform.translation.xy(), &mut *spatial_hash);
    }
    list.on_entity_added_to_scene();

    if inactive {
        list.on_entity_disabled(&mut *spatial_hash);
    } else {
        list.on_entity_enabled(&mut *spatial_hash);
    }
}

fn on_collider_list_removed(
    trigger: Trigger<OnRemove, ColliderList>,
    mut spatial_hash: ResMut<SpatialHash>,
    mut query: Query<&mut ColliderList>,
) {
    if let Ok(mut list) = query.get_mut(trigger.entity()) {
        list.on_entity_removed_from_scene(&mut *spatial_hash);
    }
}

fn on_entity_disabled(
    trigger: Trigger<OnAdd, Inactive>,
    mut spatial_hash: ResMut<SpatialHash>,
    mut query: Query<&mut ColliderList>,
) {
    if let Ok(mut list) = query.get_mut(trigger.entity()) {
        debug!("entity {:?} disabled", trigger.entity());
        list.on_entity_disabled(&mut *spatial_hash);
    }
}

fn on_entity_enabled(
    trigger: Trigger<OnRemove, Inactive>,
    mut spatial_hash: ResMut<SpatialHash>,
    mut query: Query<&mut ColliderList>,
) {
    if let Ok(mut list) = query.get_mut(trigger.entity()) {
        debug!("entity {:?} enabled", trigger.entity());
        list.on_entity_enabled(&mut *spatial_hash);
    }
}

fn sync_collider_positions(
    mut spatial_hash: ResMut<SpatialHash>,
    mut query: Query<(&mut ColliderList, &Transform), Changed<Transform>>,
) {
    for (mut list, transform) in &mut query {
        let position = transform.translation.xy();
        if list.owner_position() != position {
            list.on_entity_position_changed(position, &mut *spatial_hash);
        }
    }
}

fn debug_draw(mut gizmos: Gizmos, query: Query<&ColliderList>) {
    for list in &query {
        list.debug_render(&mut gizmos);
    }
}
