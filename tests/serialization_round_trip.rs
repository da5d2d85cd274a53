use packed_ecs::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct Position {
    x: i32,
    y: i32,
}

impl Component for Position {
    fn save(&self) -> String {
        format!("{} {}", self.x, self.y)
    }

    fn load(&mut self, data: &str) {
        let mut fields = data.split_whitespace();
        self.x = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
        self.y = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Sprite(String);

impl Component for Sprite {
    fn save(&self) -> String {
        self.0.clone()
    }

    fn load(&mut self, data: &str) {
        self.0 = data.to_owned();
    }
}

fn registry() -> Arc<ComponentRegistry> {
    let registry = Arc::new(ComponentRegistry::new());
    registry.register::<Position>("Position");
    registry.register::<Sprite>("Sprite");
    registry
}

#[test]
fn test_entity_round_trip() {
    let mut world = World::with_registry(registry());
    let e = world
        .spawn()
        .assign(Position { x: 3, y: 4 })
        .assign(Sprite("a.png".into()))
        .id();

    let lines = world.entity(e).serialize();
    assert_eq!(lines, vec!["Position 3 4".to_string(), "Sprite a.png".to_string()]);

    let fresh = world.spawn().deserialize_all(&lines).id();
    assert_eq!(world.entity(fresh).serialize(), lines);
    assert_eq!(world.get::<Position>(fresh), Some(&Position { x: 3, y: 4 }));
}

#[test]
fn test_data_with_spaces_survives() {
    let mut world = World::with_registry(registry());
    let e = world.spawn().assign(Sprite("my sprite.png".into())).id();
    let lines = world.entity(e).serialize();

    let other = world.create();
    world.deserialize_line(other, &lines[0]);
    assert_eq!(world.get::<Sprite>(other), Some(&Sprite("my sprite.png".into())));
}

#[test]
fn test_world_json_round_trip() {
    let registry = registry();
    let mut world = World::with_registry(registry.clone());
    world.spawn_named("hero").assign(Position { x: 1, y: 1 });
    world.spawn().assign(Sprite("tree.png".into()));

    let json = world.to_json_pretty().unwrap();
    let restored = World::from_json(registry, &json).unwrap();

    assert_eq!(restored.to_snapshot(), world.to_snapshot());
    let hero = restored.entity_id_by_name("hero").unwrap();
    assert_eq!(restored.get::<Position>(hero), Some(&Position { x: 1, y: 1 }));
}

#[test]
fn test_unknown_snapshot_component_is_skipped() {
    let json = r#"{"version":1,"entities":[{"components":["Position 2 2","Ghost boo"]}]}"#;
    let world = World::from_json(registry(), json).unwrap();
    let id = world.entity_ids()[0];
    assert_eq!(world.component_count(id), 1);
}
