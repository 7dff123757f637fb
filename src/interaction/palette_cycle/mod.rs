//! Click -> next accent color -> descriptors reassigned to connectors by slot.

use bevy::prelude::*;

use crate::core::components::{Accent, ColorDamp, Connector, PaletteSlot};
use crate::core::config::SceneConfig;
use crate::core::system::system_order::InputSet;
use crate::gameplay::spawn::{spawn_palette_connectors, ConnectorMesh, SpawnRng};
use crate::rendering::palette::{AccentChanged, AccentIndex, MaterialDescriptor, Palette};

pub struct PaletteCyclePlugin;

impl Plugin for PaletteCyclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AccentIndex>()
            .add_event::<AccentChanged>()
            .add_systems(
                Update,
                (advance_accent_on_click, apply_accent_change)
                    .chain()
                    .in_set(InputSet),
            );
    }
}

/// Any primary click (mouse release or touch end) anywhere in the window advances the accent.
pub fn advance_accent_on_click(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    touches: Option<Res<Touches>>,
    palette: Res<Palette>,
    mut accent: ResMut<AccentIndex>,
    mut changed: EventWriter<AccentChanged>,
) {
    let clicked = buttons.is_some_and(|b| b.just_released(MouseButton::Left))
        || touches.is_some_and(|t| t.iter_just_released().next().is_some());
    if !clicked {
        return;
    }
    let index = accent.advance(palette.accent_count());
    info!(target: "palette", "accent -> {index}");
    changed.write(AccentChanged { index });
}

/// Re-derives descriptors for the newest accent and either retints connectors in place
/// (identity kept per slot) or respawns them, per `connectors.respawn_on_click`.
/// A slot count that no longer matches the palette (config reload) always respawns.
pub fn apply_accent_change(
    mut commands: Commands,
    mut events: EventReader<AccentChanged>,
    palette: Res<Palette>,
    cfg: Res<SceneConfig>,
    bodies: Query<(Entity, &PaletteSlot, Option<&Children>), With<Connector>>,
    mut visuals: Query<(&mut ColorDamp, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mesh: Option<Res<ConnectorMesh>>,
    rng: Option<ResMut<SpawnRng>>,
) {
    let Some(latest) = events.read().last().copied() else {
        return;
    };
    let descriptors = palette.shuffle(latest.index);
    let slots_match = bodies.iter().count() == descriptors.len();

    if cfg.connectors.respawn_on_click || !slots_match {
        let (Some(mesh), Some(mut rng)) = (mesh, rng) else {
            warn!(target: "palette", "respawn requested before connector mesh is ready");
            return;
        };
        for (entity, _, _) in bodies.iter() {
            commands.entity(entity).despawn();
        }
        spawn_palette_connectors(
            &mut commands,
            &mesh.0,
            &mut materials,
            &cfg,
            &descriptors,
            &mut rng.0,
        );
        return;
    }

    for (entity, slot, children) in bodies.iter() {
        let Some(descriptor) = descriptors.get(slot.0) else {
            continue;
        };
        retint(
            &mut commands,
            entity,
            descriptor,
            children.map(|c| &**c).unwrap_or(&[]),
            &mut visuals,
            &mut materials,
        );
    }
}

fn retint(
    commands: &mut Commands,
    body: Entity,
    descriptor: &MaterialDescriptor,
    children: &[Entity],
    visuals: &mut Query<(&mut ColorDamp, &MeshMaterial3d<StandardMaterial>)>,
    materials: &mut Assets<StandardMaterial>,
) {
    if descriptor.accent {
        commands.entity(body).insert(Accent);
    } else {
        commands.entity(body).remove::<Accent>();
    }
    for &child in children {
        let Ok((mut damp, handle)) = visuals.get_mut(child) else {
            continue;
        };
        damp.target = descriptor.color;
        if let Some(mat) = materials.get_mut(&handle.0) {
            mat.perceptual_roughness = descriptor.roughness;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::Crystal;
    use crate::gameplay::spawn::spawn_crystal;
    use bevy::ecs::system::RunSystemOnce;

    fn click_app() -> App {
        let mut app = App::new();
        app.init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<Touches>()
            .init_resource::<Palette>()
            .init_resource::<AccentIndex>()
            .add_event::<AccentChanged>()
            .add_systems(Update, advance_accent_on_click);
        app
    }

    fn click(app: &mut App) {
        {
            let mut input = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
            input.clear();
            input.press(MouseButton::Left);
            input.release(MouseButton::Left);
        }
        app.update();
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .clear();
    }

    #[test]
    fn three_clicks_select_fourth_accent() {
        let mut app = click_app();
        for _ in 0..3 {
            click(&mut app);
        }
        assert_eq!(app.world().resource::<AccentIndex>().0, 3);
        let palette = app.world().resource::<Palette>();
        assert_eq!(palette.accent_color(3), palette.accents[3]);
    }

    #[test]
    fn accent_follows_click_count_mod_len() {
        let mut app = click_app();
        let len = app.world().resource::<Palette>().accent_count();
        for k in 1..=9 {
            click(&mut app);
            assert_eq!(app.world().resource::<AccentIndex>().0, k % len);
        }
    }

    #[test]
    fn no_click_no_change() {
        let mut app = click_app();
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        assert_eq!(app.world().resource::<AccentIndex>().0, 0);
    }

    #[test]
    fn retint_keeps_identity_and_updates_targets() {
        let mut app = App::new();
        app.init_resource::<Palette>()
            .init_resource::<Assets<StandardMaterial>>()
            .insert_resource(SceneConfig::default())
            .add_event::<AccentChanged>()
            .add_systems(Update, apply_accent_change);

        let palette = app.world().resource::<Palette>().clone();
        let start = palette.shuffle(0);
        let mut bodies = Vec::new();
        let mut handles = Vec::new();
        for (slot, d) in start.iter().enumerate() {
            let handle = app
                .world_mut()
                .resource_mut::<Assets<StandardMaterial>>()
                .add(StandardMaterial::default());
            let body = app
                .world_mut()
                .spawn((Connector, PaletteSlot(slot)))
                .with_children(|p| {
                    p.spawn((ColorDamp::new(d.color), MeshMaterial3d(handle.clone())));
                })
                .id();
            bodies.push(body);
            handles.push(handle);
        }

        app.world_mut().send_event(AccentChanged { index: 2 });
        app.update();

        let next = palette.shuffle(2);
        for (slot, body) in bodies.iter().enumerate() {
            let world = app.world();
            assert!(world.entities().contains(*body), "body {slot} despawned");
            let child = world.get::<Children>(*body).unwrap()[0];
            assert_eq!(world.get::<ColorDamp>(child).unwrap().target, next[slot].color);
            assert_eq!(world.get::<Accent>(*body).is_some(), next[slot].accent);
            let mat = world
                .resource::<Assets<StandardMaterial>>()
                .get(&handles[slot])
                .unwrap();
            assert_eq!(mat.perceptual_roughness, next[slot].roughness);
        }
        assert_eq!(next[6].color, palette.accents[2]);
    }

    /// App with the respawn-capable change handler, a seeded RNG and a shared mesh,
    /// plus `slots` palette connectors and the crystal already spawned.
    fn respawn_app(cfg: SceneConfig, slots: usize) -> (App, Vec<(Entity, Entity)>, Entity) {
        let mut app = App::new();
        app.init_resource::<Palette>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<Assets<Mesh>>()
            .insert_resource(cfg)
            .insert_resource(SpawnRng::seeded(Some(11)))
            .add_event::<AccentChanged>()
            .add_systems(Update, apply_accent_change);
        let mesh = app
            .world_mut()
            .resource_mut::<Assets<Mesh>>()
            .add(Capsule3d::default());
        app.insert_resource(ConnectorMesh(mesh.clone()));

        let world = app.world_mut();
        world
            .run_system_once(
                move |mut commands: Commands,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      palette: Res<Palette>,
                      cfg: Res<SceneConfig>,
                      mut rng: ResMut<SpawnRng>| {
                    let descriptors: Vec<_> =
                        palette.shuffle(0).into_iter().take(slots).collect();
                    spawn_palette_connectors(
                        &mut commands,
                        &mesh,
                        &mut materials,
                        &cfg,
                        &descriptors,
                        &mut rng.0,
                    );
                    spawn_crystal(&mut commands, &mesh, &mut materials, &cfg);
                },
            )
            .unwrap();

        let world = app.world_mut();
        let bodies = world
            .query_filtered::<(Entity, &Children), With<PaletteSlot>>()
            .iter(world)
            .map(|(body, children)| (body, children[0]))
            .collect();
        let crystal = world
            .query_filtered::<Entity, With<Crystal>>()
            .single(world)
            .unwrap();
        (app, bodies, crystal)
    }

    fn crystal_target(app: &mut App, crystal: Entity) -> Color {
        let world = app.world();
        let visual = world.get::<Children>(crystal).unwrap()[0];
        world.get::<ColorDamp>(visual).unwrap().target
    }

    fn accent_targets(app: &mut App) -> Vec<Color> {
        let world = app.world_mut();
        let mut q = world.query_filtered::<&Children, (With<PaletteSlot>, With<Accent>)>();
        let visuals: Vec<Entity> = q.iter(world).map(|c| c[0]).collect();
        visuals
            .into_iter()
            .map(|v| world.get::<ColorDamp>(v).unwrap().target)
            .collect()
    }

    fn slot_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world
            .query_filtered::<(), (With<Connector>, With<PaletteSlot>)>()
            .iter(world)
            .count()
    }

    #[test]
    fn respawn_mode_replaces_slots_and_keeps_crystal() {
        let mut cfg = SceneConfig::default();
        cfg.connectors.respawn_on_click = true;
        let (mut app, old, crystal) = respawn_app(cfg, 9);
        assert_eq!(old.len(), 9);
        let crystal_before = crystal_target(&mut app, crystal);

        app.world_mut().send_event(AccentChanged { index: 3 });
        app.update();

        for (body, visual) in &old {
            assert!(!app.world().entities().contains(*body), "old body {body} survived");
            assert!(!app.world().entities().contains(*visual), "old visual {visual} survived");
        }
        assert_eq!(slot_count(&mut app), 9);

        let accent = app.world().resource::<Palette>().accents[3];
        let targets = accent_targets(&mut app);
        assert_eq!(targets.len(), 3);
        assert!(targets.iter().all(|t| *t == accent));

        assert!(app.world().entities().contains(crystal));
        assert!(app.world().get::<PaletteSlot>(crystal).is_none());
        assert_eq!(crystal_target(&mut app, crystal), crystal_before);
    }

    #[test]
    fn slot_count_mismatch_respawns_even_when_retinting() {
        let (mut app, old, crystal) = respawn_app(SceneConfig::default(), 5);
        assert_eq!(slot_count(&mut app), 5);

        app.world_mut().send_event(AccentChanged { index: 1 });
        app.update();

        assert!(old.iter().all(|(b, _)| !app.world().entities().contains(*b)));
        assert_eq!(slot_count(&mut app), 9);
        assert!(app.world().entities().contains(crystal));
    }
}
