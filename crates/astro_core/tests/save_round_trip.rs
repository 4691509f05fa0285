//! Save and reload a small universe through JSON text and check that every
//! cross-reference still resolves.

use astro_core::{
    DataNode, DocumentError, EntityType, Persist, Rid, RidList, RidNames, RidRegistry,
    SlotAllocator,
};

#[derive(Default, Debug, Clone, PartialEq)]
struct Ship {
    name: String,
    hull: f64,
    location: Rid,
}

impl Persist for Ship {
    fn encode(&self, node: &mut DataNode) {
        node.set("name", self.name.as_str());
        node.set_f("hull", self.hull);
        node.set_i("location", self.location.raw() as i64);
    }

    fn decode(&mut self, node: &DataNode) -> Result<(), DocumentError> {
        self.name = node.require("name")?.to_owned();
        self.hull = node.get_f_or("hull", 1.0);
        self.location = Rid::from_raw(node.require_i("location")? as u32);
        Ok(())
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
struct Planet {
    name: String,
    docked: RidList,
}

impl Persist for Planet {
    fn encode(&self, node: &mut DataNode) {
        node.set("name", self.name.as_str());
        self.docked.serialize_into(node, "docked");
    }

    fn decode(&mut self, node: &DataNode) -> Result<(), DocumentError> {
        self.name = node.require("name")?.to_owned();
        self.docked.deserialize_from(node, "docked")
    }
}

struct Universe {
    planets: SlotAllocator<Planet>,
    ships: SlotAllocator<Ship>,
    names: RidNames,
}

impl Universe {
    fn empty() -> Self {
        Self {
            planets: SlotAllocator::new(EntityType::PLANET),
            ships: SlotAllocator::new(EntityType::SHIP),
            names: RidNames::new(),
        }
    }

    fn save(&self) -> DataNode {
        let mut doc = DataNode::new();
        self.planets.serialize_into(&mut doc, "planets");
        self.ships.serialize_into(&mut doc, "ships");
        self.names.serialize_into(&mut doc, "names");
        doc
    }

    fn load(&mut self, doc: &DataNode) -> Result<(), Box<dyn std::error::Error>> {
        self.planets.deserialize_from(doc, "planets")?;
        self.ships.deserialize_from(doc, "ships")?;
        self.names.deserialize_from(doc, "names")?;
        Ok(())
    }
}

fn populated() -> Universe {
    let mut universe = Universe::empty();

    let mut planet_rids = Vec::new();
    for name in ["Earth", "Mars", "Ceres"] {
        let (rid, planet) = universe.planets.allocate().unwrap();
        planet.name = name.to_owned();
        planet_rids.push(rid);
    }
    universe.names.insert("home", planet_rids[0]);

    let mut ship_rids = Vec::new();
    for i in 0..50 {
        let location = planet_rids[i % planet_rids.len()];
        let (rid, ship) = universe.ships.allocate().unwrap();
        ship.name = format!("ship-{i}");
        ship.hull = 1.0 - i as f64 / 64.0;
        ship.location = location;
        ship_rids.push(rid);
    }
    for &i in &[5usize, 6, 33, 49] {
        universe.ships.free(ship_rids[i]);
    }
    // Forced placement well past the current capacity.
    let far = Rid::new(300, EntityType::SHIP);
    assert!(universe.ships.allocate_at(far));
    universe.ships.get_mut(far).unwrap().name = "derelict".to_owned();
    universe.names.insert("flagship", ship_rids[0]);

    for (rid, ship) in universe.ships.iter() {
        let planet = universe.planets.get_mut(ship.location).unwrap();
        planet.docked.append(rid);
    }
    // A stale reference survives the round trip unchanged.
    universe.planets.get_mut(planet_rids[2]).unwrap().docked.append(ship_rids[6]);

    universe
}

#[test]
fn universe_round_trips_through_json() {
    let universe = populated();
    let text = universe.save().to_json().unwrap();

    let mut loaded = Universe::empty();
    loaded.load(&DataNode::from_json(&text).unwrap()).unwrap();

    assert_eq!(loaded.planets.len(), universe.planets.len());
    assert_eq!(loaded.ships.len(), universe.ships.len());
    for (rid, ship) in universe.ships.iter() {
        assert_eq!(loaded.ships.get(rid), Some(ship));
    }
    for (rid, planet) in universe.planets.iter() {
        assert_eq!(loaded.planets.get(rid), Some(planet));
    }
    assert_eq!(loaded.names, universe.names);
    loaded.ships.debug_validate_invariants();
}

#[test]
fn loaded_references_resolve() {
    let universe = populated();
    let doc = universe.save();

    let mut loaded = Universe::empty();
    loaded.load(&doc).unwrap();

    let mut registry = RidRegistry::new();
    registry.register(&loaded.planets).register(&loaded.ships);

    assert_eq!(registry.is_valid(loaded.names.get("home")), Ok(true));
    assert_eq!(
        registry.is_valid_typed(loaded.names.get("flagship"), EntityType::SHIP),
        Ok(true)
    );

    let mut stale = 0;
    for (_, planet) in loaded.planets.iter() {
        for rid in &planet.docked {
            if registry.is_valid(rid).unwrap() {
                let ship = loaded.ships.get(rid).unwrap();
                assert_eq!(ship.location.entity_type(), EntityType::PLANET);
            } else {
                stale += 1;
            }
        }
    }
    assert_eq!(stale, 1);

    assert!(registry.is_valid(Rid::new(0, EntityType::QUEST)).is_err());
}

#[test]
fn allocation_after_load_fills_gaps_first() {
    let universe = populated();
    let doc = universe.save();

    let mut loaded = Universe::empty();
    loaded.load(&doc).unwrap();

    let live_before = loaded.ships.len();
    let mut fresh = Vec::new();
    for _ in 0..4 {
        fresh.push(loaded.ships.allocate_rid().unwrap());
    }
    assert_eq!(loaded.ships.len(), live_before + 4);
    assert!(fresh.iter().all(|rid| rid.index() < 300));
    for rid in &fresh {
        assert!(!universe.ships.contains(*rid));
    }
}
