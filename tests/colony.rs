use std::sync::Arc;

use hexterra::{
    catalog::{BuildingCatalog, BuildingType, BASE_BUILDING},
    colony::Colony,
    config::GeneratorConfig,
    generator::WorldGenerator,
    hex::HexCoord,
    map::TileMap,
    resources::{Resource, ResourceVector},
    terrain::Terrain,
    tile::{ColonyId, InfraKind},
};

fn generated_map() -> TileMap {
    let mut config = GeneratorConfig::standard().with_radius(10);
    config.ridges.density = 0.0;
    let (map, _) = WorldGenerator::standard(config, 2137)
        .generate()
        .expect("generation succeeds");
    map
}

fn money(amount: i64) -> ResourceVector {
    ResourceVector::of(&[(Resource::Money, amount)])
}

#[test]
fn base_is_free_and_tick_adds_its_output() {
    let mut map = generated_map();
    let catalog = Arc::new(BuildingCatalog::standard());
    let mut colony = Colony::found(
        ColonyId(0),
        Arc::clone(&catalog),
        &mut map,
        HexCoord::ORIGIN,
        money(1000),
    )
    .expect("colony founds");

    assert_eq!(colony.resources(), money(1000));
    let base = map.at(HexCoord::ORIGIN).expect("origin exists");
    assert!(base.is_occupied());

    let before = colony.resources();
    colony.tick(&map);
    let production = catalog
        .by_name(BASE_BUILDING)
        .expect("standard base")
        .produces();
    assert_eq!(colony.resources(), before + production);

    let fab = catalog.id_of("electronics_fab").expect("standard fab");
    let before = colony.resources();
    assert!(!colony.add_building(&mut map, HexCoord::new(2, -1), fab));
    assert_eq!(colony.resources(), before);
}

#[test]
fn first_placed_building_keeps_the_scarce_water() {
    let land = Terrain::ALL.to_vec();
    let catalog = Arc::new(BuildingCatalog::new([
        BuildingType::new(
            BASE_BUILDING,
            ResourceVector::ZERO,
            ResourceVector::of(&[(Resource::Water, 12)]),
            ResourceVector::ZERO,
            0,
            land.clone(),
        ),
        BuildingType::new(
            "a",
            money(1),
            ResourceVector::of(&[(Resource::Food, 3)]),
            ResourceVector::of(&[(Resource::Water, 8)]),
            0,
            land.clone(),
        ),
        BuildingType::new(
            "b",
            money(1),
            ResourceVector::of(&[(Resource::Spices, 2)]),
            ResourceVector::of(&[(Resource::Water, 8)]),
            0,
            land,
        ),
    ]));
    let mut map = generated_map();
    let start = money(10_000)
        .with(Resource::Steel, 100)
        .with(Resource::Concrete, 100);
    let mut colony = Colony::found(ColonyId(0), Arc::clone(&catalog), &mut map, HexCoord::ORIGIN, start)
        .expect("colony founds");
    let a = catalog.id_of("a").expect("a");
    let b = catalog.id_of("b").expect("b");
    assert!(colony.add_building(&mut map, HexCoord::new(1, 0), a));
    assert!(colony.add_building(&mut map, HexCoord::new(-1, 0), b));

    let report = colony.tick(&map);
    let buildings = colony.buildings();
    assert!(buildings[1].active, "a was placed first");
    assert!(!buildings[2].active, "b starves");
    assert_eq!(
        report.balance,
        ResourceVector::of(&[(Resource::Water, 4), (Resource::Food, 3)])
    );
}

#[test]
fn infrastructure_changes_are_visible_on_the_shared_map() {
    let mut map = generated_map();
    let mut colony = Colony::found(
        ColonyId(3),
        Arc::new(BuildingCatalog::standard()),
        &mut map,
        HexCoord::ORIGIN,
        money(500).with(Resource::Steel, 50),
    )
    .expect("colony founds");
    let coords = HexCoord::new(0, 3);
    assert!(colony.add_infrastructure(&mut map, coords, InfraKind::Wires));
    let tile = map.at(coords).expect("tile exists");
    assert!(tile.has_infra(InfraKind::Wires));
    assert_eq!(tile.owner, Some(ColonyId(3)));
    assert!(colony.owns(map.id_of(coords).expect("tile exists")));
}
