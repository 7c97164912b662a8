use bevy::{
    log::{Level, LogPlugin},
    prelude::*,
};
use common::FRect;
use physics::prelude::*;

const CONFIG_PATH: &str = "config/physics.json";
const FRAMES: u32 = 8;

#[derive(Debug, Default, Resource)]
struct FrameCount(u32);

/// The entity walked through its whole lifecycle.
#[derive(Component)]
struct Probe;

fn main() {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        LogPlugin {
            level: Level::DEBUG,
            filter: "wgpu=error,naga=warn".into(),
            ..default()
        },
    ));

    let config = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = match PhysicsConfig::load(&config) {
        Ok(config) => config,
        Err(err) => {
            warn!("{err}, falling back to default physics config");
            PhysicsConfig::default()
        }
    };
    info!("spatial hash cell size: {}", config.cell_size);

    app.add_plugins(PhysicsPlugin { config })
        .init_resource::<FrameCount>()
        .add_systems(Startup, spawn_scene)
        .add_systems(Update, drive_probe)
        .add_systems(Last, report);

    app.finish();
    app.cleanup();
    for _ in 0..FRAMES {
        app.update();
    }
}

fn spawn_scene(mut commands: Commands) {
    commands
        .spawn((Probe, Transform::from_xyz(40.0, 40.0, 0.0)))
        .insert_colliders([
            Collider::rect(32.0, 32.0),
            Collider::circle(12.0).with_offset(Vec2::new(0.0, 20.0)),
        ]);

    commands
        .spawn(Transform::from_xyz(-200.0, 0.0, 0.0))
        .insert_colliders([Collider::rect(400.0, 16.0).with_layers(1 << 1, ALL_LAYERS)]);
}

fn drive_probe(
    mut commands: Commands,
    mut frame: ResMut<FrameCount>,
    mut spatial_hash: ResMut<SpatialHash>,
    mut probes: Query<(Entity, &mut Transform, &mut ColliderList), With<Probe>>,
) {
    frame.0 += 1;

    let Ok((entity, mut transform, mut colliders)) = probes.get_single_mut() else {
        return;
    };

    match frame.0 {
        2 => {
            transform.translation.x += 250.0;
            info!("moving probe to {}", transform.translation.xy());
        }
        3 => {
            info!("disabling probe");
            commands.entity(entity).insert(Inactive);
        }
        4 => {
            info!("enabling probe");
            commands.entity(entity).remove::<Inactive>();
        }
        5 => {
            let sensor = colliders
                .add(Collider::circle(48.0).with_trigger(true), &mut *spatial_hash)
                .id();
            info!("added sensor {:?}", sensor);
        }
        6 => {
            let removed = colliders.remove_at(0, &mut *spatial_hash);
            info!(
                "removed main collider {:?}, main is now {:?}",
                removed.id(),
                colliders.main_collider().map(Collider::id)
            );
        }
        7 => {
            info!("despawning probe");
            commands.entity(entity).despawn();
        }
        _ => {}
    }
}

fn report(
    frame: Res<FrameCount>,
    spatial_hash: Res<SpatialHash>,
    probes: Query<&ColliderList, With<Probe>>,
) {
    let around_origin = spatial_hash.aabb_broadphase(
        FRect::new(-500.0, -500.0, 1000.0, 1000.0),
        None,
        ALL_LAYERS,
    );
    info!(
        frame = frame.0,
        registered = spatial_hash.len(),
        near_origin = around_origin.len(),
        "physics state"
    );

    for colliders in &probes {
        colliders.debug_render(&mut LogSurface);
    }
}

/// Writes debug shapes to the log instead of the screen.
struct LogSurface;

impl DebugDraw for LogSurface {
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        debug!("circle at {center} r={radius} {color:?}");
    }

    fn draw_rect(&mut self, center: Vec2, size: Vec2, color: Color) {
        debug!("rect at {center} size={size} {color:?}");
    }
}
