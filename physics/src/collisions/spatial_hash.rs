use bevy::{
    prelude::*,
    utils::{HashMap, HashSet},
};
use common::{
    math::{floor_to_int, is_flag_set},
    FRect,
};

use super::{colliders::Collider, ColliderId, PhysicsSystem};

pub type ColliderSet = HashSet<ColliderId>;

/// Upper limit on the cells a single rectangle may be bucketed into.
pub const MAX_CELLS_PER_RECT: i64 = 1 << 16;

/// What the spatial hash remembers about a registered collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Registration {
    pub entity: Option<Entity>,
    pub bounds: FRect,
    pub physics_layer: i32,
}

/// Uniform grid broad-phase. Every registered collider is stored in each cell
/// its registered bounds overlap.
#[derive(Debug, Resource)]
pub struct SpatialHash {
    cell_size: i32,
    inverse_cell_size: f32,
    cell_map: IntIntMap,
    registrations: HashMap<ColliderId, Registration>,
    /// Registered colliders whose bounds are kept out of the grid.
    oversized: ColliderSet,
    pub grid_bounds: FRect,
}

impl SpatialHash {
    pub fn new(cell_size: i32) -> Self {
        assert!(cell_size > 0, "spatial hash cell size must be positive, got {cell_size}");

        Self {
            cell_size,
            inverse_cell_size: 1.0 / cell_size as f32,
            cell_map: IntIntMap::default(),
            registrations: HashMap::default(),
            oversized: ColliderSet::default(),
            grid_bounds: FRect::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn register(&mut self, collider: &Collider) {
        let id = collider.id();
        if self.registrations.contains_key(&id) {
            warn!("collider {:?} registered twice, replacing its previous entry", id);
            self.remove_by_id(id);
        }

        let bounds = collider.registered_bounds();

        if let Some(cells) = self.cell_range(bounds) {
            if !self.grid_bounds.contains(cells.min) {
                self.grid_bounds = self.grid_bounds.union_vec2(&cells.min);
            }
            if !self.grid_bounds.contains(cells.max) {
                self.grid_bounds = self.grid_bounds.union_vec2(&cells.max);
            }

            for (x, y) in cells.iter() {
                self.cell_map.get_or_insert(x, y).insert(id);
            }
        } else {
            error!(
                "collider {:?} has bounds {:?} that can't be bucketed, keeping it out of the grid",
                id, bounds
            );
            self.oversized.insert(id);
        }

        self.registrations.insert(
            id,
            Registration {
                entity: collider.entity(),
                bounds,
                physics_layer: collider.physics_layer(),
            },
        );
    }

    pub fn remove(&mut self, collider: &Collider) {
        self.remove_by_id(collider.id());
    }

    /// Removes the collider from every cell it was registered in, using the
    /// bounds recorded at registration time.
    pub fn remove_by_id(&mut self, id: ColliderId) {
        let Some(registration) = self.registrations.remove(&id) else {
            error!("removing collider {:?} that is not registered in the spatial hash", id);
            return;
        };

        let Some(cells) = self.cell_range(registration.bounds) else {
            self.oversized.remove(&id);
            return;
        };

        for (x, y) in cells.iter() {
            if let Some(c) = self.cell_map.get_mut(x, y) {
                c.remove(&id);
                if c.is_empty() {
                    self.cell_map.remove(x, y);
                }
            } else {
                error!(
                    "removing collider {:?} from a cell that it is not present in",
                    id
                );
            }
        }
    }

    pub fn is_registered(&self, id: ColliderId) -> bool {
        self.registrations.contains_key(&id)
    }

    pub fn registration(&self, id: ColliderId) -> Option<&Registration> {
        self.registrations.get(&id)
    }

    pub fn owner_of(&self, id: ColliderId) -> Option<Entity> {
        self.registrations.get(&id).and_then(|r| r.entity)
    }

    /// Ids of every collider registered on behalf of `entity`.
    pub fn colliders_owned_by(&self, entity: Entity) -> impl Iterator<Item = ColliderId> + '_ {
        self.registrations
            .iter()
            .filter(move |(_, r)| r.entity == Some(entity))
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Candidate colliders around `bounds`. A query too large to walk cell by
    /// cell returns every registered collider.
    pub fn get_nearby_bounds(&self, bounds: FRect) -> HashSet<ColliderId> {
        let Some(cells) = self.cell_range(bounds) else {
            return self.get_all();
        };

        let mut result: HashSet<ColliderId> = self.oversized.iter().copied().collect();
        for (x, y) in cells.iter() {
            if let Some(cell) = self.cell_map.get(x, y) {
                result.extend(cell);
            }
        }

        result
    }

    /// Colliders whose registered bounds overlap `bounds` and whose layer is
    /// part of `layer_mask`.
    pub fn aabb_broadphase(
        &self,
        bounds: FRect,
        excluding_collider: Option<ColliderId>,
        layer_mask: i32,
    ) -> HashSet<ColliderId> {
        self.get_nearby_bounds(bounds)
            .into_iter()
            .filter(|id| Some(*id) != excluding_collider)
            .filter(|id| {
                self.registrations.get(id).is_some_and(|r| {
                    is_flag_set(layer_mask, r.physics_layer) && r.bounds.intersects(bounds)
                })
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.cell_map.clear();
        self.registrations.clear();
        self.oversized.clear();
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn inverse_cell_size(&self) -> f32 {
        self.inverse_cell_size
    }

    pub fn get_all(&self) -> HashSet<ColliderId> {
        self.registrations.keys().copied().collect()
    }

    /// Cells covered by `bounds`, or `None` when the bounds are not finite or
    /// span more than [`MAX_CELLS_PER_RECT`] cells.
    fn cell_range(&self, bounds: FRect) -> Option<CellRange> {
        let edges = [bounds.x, bounds.y, bounds.right(), bounds.bottom()];
        if !edges.iter().all(|edge| edge.is_finite()) {
            return None;
        }

        let min = self.cell_coords(bounds.x, bounds.y);
        let max = self.cell_coords(bounds.right(), bounds.bottom());

        let columns = max.x as i64 - min.x as i64 + 1;
        let rows = max.y as i64 - min.y as i64 + 1;
        (columns * rows <= MAX_CELLS_PER_RECT).then_some(CellRange { min, max })
    }

    fn cell_coords(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            floor_to_int(x * self.inverse_cell_size) as f32,
            floor_to_int(y * self.inverse_cell_size) as f32,
        )
    }
}

impl PhysicsSystem for SpatialHash {
    fn register_collider(&mut self, collider: &Collider) {
        self.register(collider);
    }

    fn unregister_collider(&mut self, collider: &Collider) {
        self.remove(collider);
    }
}

#[derive(Debug, Clone, Copy)]
struct CellRange {
    min: Vec2,
    max: Vec2,
}

impl CellRange {
    fn iter(self) -> impl Iterator<Item = (i32, i32)> {
        let (x1, y1) = (self.min.x as i32, self.min.y as i32);
        let (x2, y2) = (self.max.x as i32, self.max.y as i32);
        (x1..=x2).flat_map(move |x| (y1..=y2).map(move |y| (x, y)))
    }
}

#[derive(Debug, Default)]
struct IntIntMap {
    pub store: HashMap<i64, ColliderSet>,
}

fn get_key(x: i32, y: i32) -> i64 {
    let shl = (x as i64).overflowing_shl(32);
    shl.0 | ((y as u32) as i64)
}

impl IntIntMap {
    pub fn get(&self, x: i32, y: i32) -> Option<&ColliderSet> {
        self.store.get(&get_key(x, y))
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut ColliderSet> {
        self.store.get_mut(&get_key(x, y))
    }

    pub fn get_or_insert(&mut self, x: i32, y: i32) -> &mut ColliderSet {
        self.store.entry(get_key(x, y)).or_default()
    }

    pub fn remove(&mut self, x: i32, y: i32) {
        self.store.remove(&get_key(x, y));
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collisions::ALL_LAYERS;

    fn placed(collider: Collider, position: Vec2) -> Collider {
        let mut collider = collider;
        collider.set_entity(Entity::from_raw(1));
        collider.on_entity_added_to_scene();
        collider.set_position(position);
        collider
    }

    #[test]
    fn register_fills_every_overlapped_cell() {
        let mut hash = SpatialHash::new(10);
        let mut collider = placed(Collider::rect(20.0, 20.0), Vec2::new(10.0, 10.0));
        collider.register_with_physics_system(&mut hash);

        assert!(hash.is_registered(collider.id()));
        assert_eq!(hash.owner_of(collider.id()), Some(Entity::from_raw(1)));
        // bounds 0..20 touch cells 0, 1 and 2 on each axis
        assert_eq!(hash.cell_map.store.len(), 9);
    }

    #[test]
    fn remove_uses_registered_bounds() {
        let mut hash = SpatialHash::new(10);
        let mut collider = placed(Collider::circle(2.0), Vec2::new(5.0, 5.0));
        collider.register_with_physics_system(&mut hash);

        // bounds drift without telling the hash
        collider.set_position(Vec2::new(500.0, 500.0));
        collider.unregister_with_physics_system(&mut hash);

        assert!(hash.is_empty());
        assert!(hash.cell_map.store.is_empty());
    }

    #[test]
    fn duplicate_registration_replaces_entry() {
        let mut hash = SpatialHash::new(10);
        let collider = placed(Collider::circle(2.0), Vec2::new(5.0, 5.0));

        hash.register(&collider);
        hash.register(&collider);

        assert_eq!(hash.len(), 1);
        hash.remove(&collider);
        assert!(hash.is_empty());
        assert!(hash.cell_map.store.is_empty());
    }

    #[test]
    fn removing_unknown_collider_is_ignored() {
        let mut hash = SpatialHash::new(10);
        let other = placed(Collider::circle(1.0), Vec2::ZERO);
        let mut collider = placed(Collider::circle(1.0), Vec2::ZERO);
        collider.register_with_physics_system(&mut hash);

        hash.remove(&other);

        assert!(hash.is_registered(collider.id()));
    }

    #[test]
    fn broadphase_filters_by_bounds_layer_and_exclusion() {
        let mut hash = SpatialHash::new(50);
        let mut near = placed(Collider::circle(5.0), Vec2::new(10.0, 10.0));
        let mut far = placed(Collider::circle(5.0), Vec2::new(40.0, 40.0));
        let mut other_layer = placed(
            Collider::circle(5.0).with_layers(1 << 3, ALL_LAYERS),
            Vec2::new(12.0, 12.0),
        );
        for collider in [&mut near, &mut far, &mut other_layer] {
            collider.register_with_physics_system(&mut hash);
        }

        let query = FRect::new(0.0, 0.0, 20.0, 20.0);

        let all = hash.aabb_broadphase(query, None, ALL_LAYERS);
        assert!(all.contains(&near.id()));
        assert!(all.contains(&other_layer.id()));
        assert!(!all.contains(&far.id()));

        let first_layer = hash.aabb_broadphase(query, None, 1 << 0);
        assert_eq!(first_layer.len(), 1);
        assert!(first_layer.contains(&near.id()));

        let excluding = hash.aabb_broadphase(query, Some(near.id()), ALL_LAYERS);
        assert!(!excluding.contains(&near.id()));
    }

    #[test]
    fn negative_coordinates_map_to_distinct_cells() {
        let mut hash = SpatialHash::new(10);
        let mut left = placed(Collider::circle(1.0), Vec2::new(-15.0, 5.0));
        let mut right = placed(Collider::circle(1.0), Vec2::new(15.0, 5.0));
        left.register_with_physics_system(&mut hash);
        right.register_with_physics_system(&mut hash);

        let nearby = hash.get_nearby_bounds(FRect::new(-16.0, 4.0, 2.0, 2.0));

        assert!(nearby.contains(&left.id()));
        assert!(!nearby.contains(&right.id()));
    }

    #[test]
    fn unbounded_collider_stays_out_of_the_grid() {
        let mut hash = SpatialHash::new(10);
        let mut collider = placed(Collider::circle(f32::INFINITY), Vec2::ZERO);

        collider.register_with_physics_system(&mut hash);
        assert!(hash.is_registered(collider.id()));
        assert!(hash.cell_map.store.is_empty());

        collider.unregister_with_physics_system(&mut hash);
        assert!(hash.is_empty());
        assert!(hash.oversized.is_empty());
    }

    #[test]
    fn huge_collider_is_still_found_by_queries() {
        let mut hash = SpatialHash::new(10);
        let mut huge = placed(Collider::rect(1.0e9, 1.0e9), Vec2::ZERO);
        let mut small = placed(Collider::circle(1.0), Vec2::new(500.0, 500.0));
        huge.register_with_physics_system(&mut hash);
        small.register_with_physics_system(&mut hash);

        assert!(hash.cell_map.store.len() <= 4);
        let found = hash.aabb_broadphase(FRect::new(0.0, 0.0, 5.0, 5.0), None, ALL_LAYERS);
        assert!(found.contains(&huge.id()));
        assert!(!found.contains(&small.id()));

        let everywhere = hash.get_nearby_bounds(FRect::new(
            f32::NEG_INFINITY,
            0.0,
            f32::INFINITY,
            1.0,
        ));
        assert_eq!(everywhere.len(), 2);

        huge.unregister_with_physics_system(&mut hash);
        assert_eq!(hash.len(), 1);
        assert!(hash.oversized.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut hash = SpatialHash::new(10);
        let mut collider = placed(Collider::circle(1.0), Vec2::ZERO);
        collider.register_with_physics_system(&mut hash);

        hash.clear();

        assert!(hash.is_empty());
        assert!(hash.get_all().is_empty());
    }
}
