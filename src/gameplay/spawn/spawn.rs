use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::core::components::{Accent, ColorDamp, Connector, ConnectorVisual, Crystal, PaletteSlot};
use crate::core::config::SceneConfig;
use crate::rendering::materials::{connector_material, crystal_material};
use crate::rendering::palette::{parse_color, AccentIndex, MaterialDescriptor, Palette};

/// Built-in stand-in for the connector glTF, sized in the same raw units as the asset
/// (roughly 20 units long) so the configured scale applies unchanged.
const FALLBACK_CAPSULE_RADIUS: f32 = 7.0;
const FALLBACK_CAPSULE_LENGTH: f32 = 20.0;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct ConnectorSpawnSet;

pub struct ConnectorSpawnPlugin;

impl Plugin for ConnectorSpawnPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SpawnRng>() {
            app.insert_resource(SpawnRng::seeded(None));
        }
        app.add_systems(
            Startup,
            (load_connector_mesh, spawn_connectors)
                .chain()
                .in_set(ConnectorSpawnSet),
        );
    }
}

/// Geometry shared by every connector body.
#[derive(Resource, Debug, Clone)]
pub struct ConnectorMesh(pub Handle<Mesh>);

/// Source of spawn positions. Seeded runs place bodies identically.
#[derive(Resource)]
pub struct SpawnRng(pub StdRng);

impl SpawnRng {
    pub fn seeded(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self(StdRng::seed_from_u64(s)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

/// Uniform point in the axis-aligned cube of edge `spread` centered on the origin.
pub fn random_spread_position(rng: &mut impl Rng, spread: f32) -> Vec3 {
    if spread <= 0.0 {
        return Vec3::ZERO;
    }
    let h = spread * 0.5;
    Vec3::new(
        rng.gen_range(-h..=h),
        rng.gen_range(-h..=h),
        rng.gen_range(-h..=h),
    )
}

fn visual_transform(scale: f32, rotation: [f32; 3]) -> Transform {
    Transform::from_rotation(Quat::from_euler(
        EulerRot::XYZ,
        rotation[0],
        rotation[1],
        rotation[2],
    ))
    .with_scale(Vec3::splat(scale))
}

fn connector_body(position: Vec3, cfg: &SceneConfig) -> impl Bundle {
    (
        Connector,
        RigidBody::Dynamic,
        Damping {
            linear_damping: cfg.physics.linear_damping,
            angular_damping: cfg.physics.angular_damping,
        },
        ExternalImpulse::default(),
        Transform::from_translation(position),
        Visibility::default(),
    )
}

fn load_connector_mesh(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    cfg: Res<SceneConfig>,
) {
    let handle = match &cfg.connectors.mesh {
        Some(path) => {
            info!(target: "spawn", "loading connector mesh {path} (mesh {})", cfg.connectors.mesh_index);
            asset_server.load(
                GltfAssetLabel::Primitive {
                    mesh: cfg.connectors.mesh_index,
                    primitive: 0,
                }
                .from_asset(path.clone()),
            )
        }
        None => meshes.add(Capsule3d::new(FALLBACK_CAPSULE_RADIUS, FALLBACK_CAPSULE_LENGTH)),
    };
    commands.insert_resource(ConnectorMesh(handle));
}

/// Spawns one palette connector: a dynamic body with a hull-collider visual child.
/// The hull is computed once the mesh asset is available.
pub fn spawn_slot_connector(
    commands: &mut Commands,
    mesh: &Handle<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    cfg: &SceneConfig,
    slot: usize,
    descriptor: &MaterialDescriptor,
    position: Vec3,
) -> Entity {
    let material = materials.add(connector_material(descriptor, &cfg.connectors));
    let mut body = commands.spawn((
        Name::new(format!("Connector[{slot}]")),
        connector_body(position, cfg),
        PaletteSlot(slot),
    ));
    if descriptor.accent {
        body.insert(Accent);
    }
    body.with_children(|parent| {
        parent.spawn((
            ConnectorVisual,
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material),
            visual_transform(cfg.connectors.scale, cfg.connectors.rotation),
            AsyncCollider(ComputedColliderShape::ConvexHull),
            Friction::coefficient(cfg.physics.friction),
            ColorDamp::new(descriptor.color),
        ));
    });
    body.id()
}

pub fn spawn_crystal(
    commands: &mut Commands,
    mesh: &Handle<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    cfg: &SceneConfig,
) -> Entity {
    let c = &cfg.crystal;
    let material = crystal_material(c);
    let tint = material.base_color;
    let material = materials.add(material);
    let light_color = parse_color(&c.light_color).unwrap_or(Color::WHITE);
    commands
        .spawn((
            Name::new("Crystal"),
            connector_body(Vec3::from_array(c.position), cfg),
            Crystal,
        ))
        .with_children(|parent| {
            parent.spawn((
                ConnectorVisual,
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material),
                visual_transform(c.scale, cfg.connectors.rotation),
                AsyncCollider(ComputedColliderShape::ConvexHull),
                Friction::coefficient(cfg.physics.friction),
                ColorDamp::new(tint),
            ));
            parent.spawn((
                PointLight {
                    color: light_color,
                    intensity: c.light_intensity * cfg.lighting.lumens_per_unit,
                    range: c.light_range,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::default(),
            ));
        })
        .id()
}

/// Spawns one connector per palette slot at random positions.
pub fn spawn_palette_connectors(
    commands: &mut Commands,
    mesh: &Handle<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    cfg: &SceneConfig,
    descriptors: &[MaterialDescriptor],
    rng: &mut impl Rng,
) {
    for (slot, descriptor) in descriptors.iter().enumerate() {
        let position = random_spread_position(rng, cfg.connectors.spawn_spread);
        spawn_slot_connector(commands, mesh, materials, cfg, slot, descriptor, position);
    }
}

fn spawn_connectors(
    mut commands: Commands,
    mesh: Res<ConnectorMesh>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<SceneConfig>,
    palette: Res<Palette>,
    accent: Res<AccentIndex>,
    mut rng: ResMut<SpawnRng>,
) {
    let descriptors = palette.shuffle(accent.0);
    spawn_palette_connectors(
        &mut commands,
        &mesh.0,
        &mut materials,
        &cfg,
        &descriptors,
        &mut rng.0,
    );
    if cfg.crystal.enabled {
        spawn_crystal(&mut commands, &mesh.0, &mut materials, &cfg);
    }
    info!(
        target: "spawn",
        "spawned {} connectors (crystal: {})",
        descriptors.len(),
        cfg.crystal.enabled
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn spread_positions_stay_in_cube() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_spread_position(&mut rng, 10.0);
            assert!(p.abs().max_element() <= 5.0, "{p:?}");
        }
        assert_eq!(random_spread_position(&mut rng, 0.0), Vec3::ZERO);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = SpawnRng::seeded(Some(42));
        let mut b = SpawnRng::seeded(Some(42));
        for _ in 0..10 {
            assert_eq!(
                random_spread_position(&mut a.0, 10.0),
                random_spread_position(&mut b.0, 10.0)
            );
        }
    }

    #[test]
    fn slot_connector_has_body_and_hull_child() {
        let mut app = App::new();
        app.init_resource::<Assets<StandardMaterial>>()
            .init_resource::<Assets<Mesh>>();
        let mesh = app
            .world_mut()
            .resource_mut::<Assets<Mesh>>()
            .add(Capsule3d::default());
        let cfg = SceneConfig::default();
        let descriptor = Palette::default().shuffle(0)[6];
        let world = app.world_mut();
        let entity = world
            .run_system_once(
                move |mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>| {
                    spawn_slot_connector(
                        &mut commands,
                        &mesh,
                        &mut materials,
                        &cfg,
                        6,
                        &descriptor,
                        Vec3::new(1.0, 2.0, 3.0),
                    )
                },
            )
            .unwrap();
        let world = app.world();
        assert!(matches!(world.get::<RigidBody>(entity), Some(RigidBody::Dynamic)));
        assert_eq!(world.get::<PaletteSlot>(entity), Some(&PaletteSlot(6)));
        assert!(world.get::<Accent>(entity).is_some());
        let damping = world.get::<Damping>(entity).unwrap();
        assert_eq!(damping.linear_damping, 4.0);
        assert_eq!(damping.angular_damping, 1.0);
        let children = world.get::<Children>(entity).unwrap();
        assert_eq!(children.len(), 1);
        let visual = children[0];
        assert!(world.get::<AsyncCollider>(visual).is_some());
        assert_eq!(world.get::<Friction>(visual).unwrap().coefficient, 0.2);
        assert_eq!(world.get::<ColorDamp>(visual).unwrap().target, descriptor.color);
    }
}
