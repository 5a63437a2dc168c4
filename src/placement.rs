//! Placement rules checked before an action reaches a colony.

use crate::catalog::BuildingType;
use crate::error::ActionError;
use crate::hex::{spiral, HexCoord};
use crate::map::{TileId, TileMap};
use crate::tile::{InfraKind, Tile};

fn check_site(tile: &Tile, building: &BuildingType) -> Result<(), ActionError> {
    if tile.is_occupied() {
        return Err(ActionError::Occupied(tile.coords));
    }
    if !building.allows(tile.terrain) {
        return Err(ActionError::TerrainNotAllowed {
            building: building.name().to_string(),
            terrain: tile.terrain,
        });
    }
    if let Some(deposit) = building.requires_deposit() {
        if !tile.deposits.has(deposit) {
            return Err(ActionError::MissingDeposit {
                building: building.name().to_string(),
                deposit,
            });
        }
    }
    Ok(())
}

/// Tile exists, is free, has allowed terrain and any required deposit.
pub fn validate_building(
    map: &TileMap,
    coords: HexCoord,
    building: &BuildingType,
) -> Result<TileId, ActionError> {
    let id = map.id_of(coords).ok_or(ActionError::UnknownTile(coords))?;
    let tile = map.get(id).ok_or(ActionError::UnknownTile(coords))?;
    check_site(tile, building)?;
    Ok(id)
}

pub fn validate_infrastructure(
    map: &TileMap,
    coords: HexCoord,
    kind: InfraKind,
) -> Result<TileId, ActionError> {
    let id = map.id_of(coords).ok_or(ActionError::UnknownTile(coords))?;
    match map.get(id) {
        Some(tile) if tile.has_infra(kind) => Err(ActionError::AlreadyPresent { coords, kind }),
        Some(_) => Ok(id),
        None => Err(ActionError::UnknownTile(coords)),
    }
}

/// Closest valid site for `building` within `radius` of `origin`, searched
/// ring by ring.
pub fn nearest_site(
    map: &TileMap,
    building: &BuildingType,
    origin: HexCoord,
    radius: u32,
) -> Option<HexCoord> {
    spiral(origin, radius)
        .map(|(coords, _)| coords)
        .find(|coords| {
            map.at(*coords)
                .is_some_and(|tile| check_site(tile, building).is_ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingCatalog;
    use crate::generator::hexagonal_shape;
    use crate::terrain::Terrain;
    use crate::tile::{BuildingId, ColonyId, Deposit};

    fn map() -> TileMap {
        hexagonal_shape(3, Terrain::Sand).unwrap()
    }

    #[test]
    fn off_map_is_unknown() {
        let catalog = BuildingCatalog::standard();
        let solar = catalog.by_name("solar_array").unwrap();
        let far = HexCoord::new(10, 0);
        assert_eq!(
            validate_building(&map(), far, solar),
            Err(ActionError::UnknownTile(far))
        );
    }

    #[test]
    fn terrain_and_deposit_rules_apply() {
        let catalog = BuildingCatalog::standard();
        let mut map = map();
        let spot = HexCoord::new(1, 1);

        let spice = catalog.by_name("spice_farm").unwrap();
        assert!(matches!(
            validate_building(&map, spot, spice),
            Err(ActionError::TerrainNotAllowed { terrain: Terrain::Sand, .. })
        ));

        let glassworks = catalog.by_name("glassworks").unwrap();
        assert!(matches!(
            validate_building(&map, spot, glassworks),
            Err(ActionError::MissingDeposit { deposit: Deposit::Silica, .. })
        ));
        map.at_mut(spot).unwrap().deposits.set(Deposit::Silica, true);
        assert!(validate_building(&map, spot, glassworks).is_ok());
    }

    #[test]
    fn occupied_tile_is_refused() {
        let catalog = BuildingCatalog::standard();
        let mut map = map();
        map.at_mut(HexCoord::ORIGIN).unwrap().building = Some(BuildingId {
            colony: ColonyId(0),
            index: 0,
        });
        let solar = catalog.by_name("solar_array").unwrap();
        assert_eq!(
            validate_building(&map, HexCoord::ORIGIN, solar),
            Err(ActionError::Occupied(HexCoord::ORIGIN))
        );
        assert_eq!(
            nearest_site(&map, solar, HexCoord::ORIGIN, 3),
            Some(HexCoord::ORIGIN.neighbour(4))
        );
    }

    #[test]
    fn infrastructure_is_not_laid_twice() {
        let mut map = map();
        let spot = HexCoord::new(0, 2);
        assert!(validate_infrastructure(&map, spot, InfraKind::Pipes).is_ok());
        map.at_mut(spot).unwrap().infrastructure.set(InfraKind::Pipes, true);
        assert_eq!(
            validate_infrastructure(&map, spot, InfraKind::Pipes),
            Err(ActionError::AlreadyPresent { coords: spot, kind: InfraKind::Pipes })
        );
    }

    #[test]
    fn no_site_when_nothing_qualifies() {
        let catalog = BuildingCatalog::standard();
        let mine = catalog.by_name("mine").unwrap();
        assert_eq!(nearest_site(&map(), mine, HexCoord::ORIGIN, 3), None);
    }
}
