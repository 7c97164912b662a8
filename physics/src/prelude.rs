pub use crate::collisions::collider_list::{ColliderList, ColliderListError};
pub use crate::collisions::colliders::Collider;
pub use crate::collisions::shapes::{Shape, ShapeType};
pub use crate::collisions::spatial_hash::{Registration, SpatialHash};
pub use crate::collisions::{ColliderId, PhysicsSystem, ALL_LAYERS};
pub use crate::config::{PhysicsConfig, PhysicsConfigError};
pub use crate::debug::DebugDraw;
pub use crate::plugin::{ColliderListCommands, Inactive, PhysicsPlugin};
