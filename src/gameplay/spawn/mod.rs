pub mod spawn;

pub use spawn::{
    random_spread_position, spawn_crystal, spawn_palette_connectors, spawn_slot_connector,
    ConnectorMesh, ConnectorSpawnPlugin, ConnectorSpawnSet, SpawnRng,
};
