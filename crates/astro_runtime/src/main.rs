//! Astro Runtime
//!
//! Boots the handle layer, populates a small universe and checks that it
//! survives a save/load cycle.
//!
//! Usage: `astro [settings.json] [save.json]`

use anyhow::{ensure, Context, Result};
use astro_core::{
    DataNode, DocumentError, EntityType, Persist, Rid, RidList, RidNames, RidRegistry,
    SlotAllocator,
};
use astro_services::Settings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Clone, PartialEq)]
struct Ship {
    name: String,
    cargo: i64,
}

impl Persist for Ship {
    fn encode(&self, node: &mut DataNode) {
        node.set("name", self.name.as_str());
        node.set_i("cargo", self.cargo);
    }

    fn decode(&mut self, node: &DataNode) -> Result<(), DocumentError> {
        self.name = node.require("name")?.to_owned();
        self.cargo = node.get_i_or("cargo", 0);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Task {
    assignees: RidList,
    reward: i64,
}

impl Persist for Task {
    fn encode(&self, node: &mut DataNode) {
        self.assignees.serialize_into(node, "assignees");
        node.set_i("reward", self.reward);
    }

    fn decode(&mut self, node: &DataNode) -> Result<(), DocumentError> {
        self.assignees.deserialize_from(node, "assignees")?;
        self.reward = node.require_i("reward")?;
        Ok(())
    }
}

struct GameState {
    ships: SlotAllocator<Ship>,
    tasks: SlotAllocator<Task>,
    names: RidNames,
}

impl GameState {
    fn new(settings: &Settings) -> Self {
        Self {
            ships: SlotAllocator::with_config(
                EntityType::SHIP,
                settings.allocator(EntityType::SHIP),
            ),
            tasks: SlotAllocator::with_config(
                EntityType::TASK,
                settings.allocator(EntityType::TASK),
            ),
            names: RidNames::new(),
        }
    }

    fn populate(&mut self) -> Result<()> {
        let mut fleet = Vec::new();
        for i in 0..12 {
            let (rid, ship) = self.ships.allocate()?;
            ship.name = format!("hauler-{i}");
            ship.cargo = i * 10;
            fleet.push(rid);
        }
        self.names.insert("flagship", fleet[0]);

        for chunk in fleet.chunks(4) {
            let (_, task) = self.tasks.allocate()?;
            task.assignees.extend(chunk.iter().copied());
            task.reward = 100 * chunk.len() as i64;
        }

        // Scrap a few ships; the tasks keep their now-stale handles.
        for &rid in fleet.iter().skip(1).step_by(3) {
            self.ships.free(rid);
        }
        Ok(())
    }

    fn save(&self) -> DataNode {
        let mut doc = DataNode::new();
        self.ships.serialize_into(&mut doc, "ships");
        self.tasks.serialize_into(&mut doc, "tasks");
        self.names.serialize_into(&mut doc, "names");
        doc
    }

    fn load(&mut self, doc: &DataNode) -> Result<()> {
        let ships = self.ships.deserialize_from(doc, "ships")?;
        let tasks = self.tasks.deserialize_from(doc, "tasks")?;
        self.names.deserialize_from(doc, "names")?;
        tracing::info!(ships, tasks, "state restored");
        Ok(())
    }

    fn stale_assignees(&self) -> Result<usize> {
        let mut registry = RidRegistry::new();
        registry.register(&self.ships).register(&self.tasks);

        let mut stale = 0;
        for (_, task) in self.tasks.iter() {
            for rid in &task.assignees {
                if !registry.is_valid_typed(rid, EntityType::SHIP)? {
                    stale += 1;
                }
            }
        }
        Ok(stale)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Astro v{}", astro_core::VERSION);

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().unwrap_or_else(|| "settings.json".to_owned());
    let save_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("astro-save.json"));

    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {settings_path}"))?;

    let mut state = GameState::new(&settings);
    state.populate()?;
    tracing::info!(
        ships = state.ships.len(),
        tasks = state.tasks.len(),
        stale = state.stale_assignees()?,
        "universe populated"
    );

    astro_services::write_save(&save_path, &state.save())
        .with_context(|| format!("writing {}", save_path.display()))?;
    let doc = astro_services::read_save(&save_path)
        .with_context(|| format!("reading {}", save_path.display()))?;

    let mut loaded = GameState::new(&settings);
    loaded.load(&doc)?;

    ensure!(
        loaded.ships.iter().eq(state.ships.iter()),
        "ships changed across save/load"
    );
    ensure!(
        loaded.tasks.iter().eq(state.tasks.iter()),
        "tasks changed across save/load"
    );
    let flagship = loaded.names.get("flagship");
    ensure!(flagship != Rid::INVALID, "flagship name lost");

    tracing::info!(
        %flagship,
        stale = loaded.stale_assignees()?,
        "save/load round trip verified"
    );
    Ok(())
}
