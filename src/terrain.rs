use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed catalog of terrain kinds a tile can carry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Generic default every map starts from.
    #[default]
    Sand,
    Soil,
    Rough,
    Rocky,
    /// Ridge terrain carved by the generator.
    Mountain,
    Water,
    Ice,
}

impl Terrain {
    pub const ALL: [Terrain; 7] = [
        Terrain::Sand,
        Terrain::Soil,
        Terrain::Rough,
        Terrain::Rocky,
        Terrain::Mountain,
        Terrain::Water,
        Terrain::Ice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Sand => "sand",
            Terrain::Soil => "soil",
            Terrain::Rough => "rough",
            Terrain::Rocky => "rocky",
            Terrain::Mountain => "mountain",
            Terrain::Water => "water",
            Terrain::Ice => "ice",
        }
    }

    pub fn is_liquid_or_frozen(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Ice)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sand_is_the_default_and_serializes_by_name() {
        assert_eq!(Terrain::default(), Terrain::Sand);
        for terrain in Terrain::ALL {
            let yaml = serde_yaml::to_string(&terrain).unwrap();
            assert_eq!(yaml.trim(), terrain.name());
        }
    }
}
