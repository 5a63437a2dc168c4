//! Resource vectors: the unit of cost, production, consumption and balance.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Money,
    Energy,
    Water,
    Food,
    Concrete,
    Steel,
    Minerals,
    Glass,
    Electronics,
    Spices,
}

impl Resource {
    pub const COUNT: usize = 10;

    pub const ALL: [Resource; Resource::COUNT] = [
        Resource::Money,
        Resource::Energy,
        Resource::Water,
        Resource::Food,
        Resource::Concrete,
        Resource::Steel,
        Resource::Minerals,
        Resource::Glass,
        Resource::Electronics,
        Resource::Spices,
    ];

    /// Goods moved in bulk; buildings handling them need tunnels.
    pub const BULK: [Resource; 5] = [
        Resource::Food,
        Resource::Concrete,
        Resource::Steel,
        Resource::Minerals,
        Resource::Glass,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Money => "money",
            Resource::Energy => "energy",
            Resource::Water => "water",
            Resource::Food => "food",
            Resource::Concrete => "concrete",
            Resource::Steel => "steel",
            Resource::Minerals => "minerals",
            Resource::Glass => "glass",
            Resource::Electronics => "electronics",
            Resource::Spices => "spices",
        }
    }
}

/// Fixed set of resource amounts; unset fields are zero.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Resource, i64>",
    into = "BTreeMap<Resource, i64>"
)]
pub struct ResourceVector([i64; Resource::COUNT]);

impl ResourceVector {
    pub const ZERO: Self = Self([0; Resource::COUNT]);

    pub fn of(amounts: &[(Resource, i64)]) -> Self {
        let mut vector = Self::ZERO;
        for &(resource, amount) in amounts {
            vector[resource] += amount;
        }
        vector
    }

    pub fn get(&self, resource: Resource) -> i64 {
        self.0[resource.index()]
    }

    pub fn with(mut self, resource: Resource, amount: i64) -> Self {
        self[resource] = amount;
        self
    }

    /// True when any field is strictly negative.
    pub fn deficit(&self) -> bool {
        self.0.iter().any(|amount| *amount < 0)
    }

    pub fn deficits(&self) -> Vec<Resource> {
        self.iter()
            .filter(|(_, amount)| *amount < 0)
            .map(|(resource, _)| resource)
            .collect()
    }

    /// True when `resource` is non-zero.
    pub fn touches(&self, resource: Resource) -> bool {
        self.get(resource) != 0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|amount| *amount == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, i64)> + '_ {
        Resource::ALL.into_iter().map(|resource| (resource, self.get(resource)))
    }

    pub fn non_zero(&self) -> impl Iterator<Item = (Resource, i64)> + '_ {
        self.iter().filter(|(_, amount)| *amount != 0)
    }
}

impl Index<Resource> for ResourceVector {
    type Output = i64;

    fn index(&self, resource: Resource) -> &i64 {
        &self.0[resource.index()]
    }
}

impl IndexMut<Resource> for ResourceVector {
    fn index_mut(&mut self, resource: Resource) -> &mut i64 {
        &mut self.0[resource.index()]
    }
}

impl Add for ResourceVector {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for ResourceVector {
    fn add_assign(&mut self, other: Self) {
        for (lhs, rhs) in self.0.iter_mut().zip(other.0) {
            *lhs += rhs;
        }
    }
}

impl Sub for ResourceVector {
    type Output = Self;

    fn sub(mut self, other: Self) -> Self {
        self -= other;
        self
    }
}

impl SubAssign for ResourceVector {
    fn sub_assign(&mut self, other: Self) {
        for (lhs, rhs) in self.0.iter_mut().zip(other.0) {
            *lhs -= rhs;
        }
    }
}

impl From<BTreeMap<Resource, i64>> for ResourceVector {
    fn from(amounts: BTreeMap<Resource, i64>) -> Self {
        let mut vector = Self::ZERO;
        for (resource, amount) in amounts {
            vector[resource] = amount;
        }
        vector
    }
}

impl From<ResourceVector> for BTreeMap<Resource, i64> {
    fn from(vector: ResourceVector) -> Self {
        vector.non_zero().collect()
    }
}

impl fmt::Debug for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.non_zero().map(|(r, amount)| (r.name(), amount)))
            .finish()
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (resource, amount) in self.non_zero() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}: {amount}", resource.name())?;
            first = false;
        }
        if first {
            f.write_str("nothing")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_sub_round_trips() {
        let a = ResourceVector::of(&[(Resource::Money, 1000), (Resource::Steel, -4)]);
        let b = ResourceVector::of(&[(Resource::Energy, 37), (Resource::Money, 12)]);
        assert_eq!(a + b - b, a);
        assert_eq!(a - b + b, a);
    }

    #[test]
    fn disjoint_fields_combine_with_zero_defaults() {
        let a = ResourceVector::of(&[(Resource::Water, 5)]);
        let b = ResourceVector::of(&[(Resource::Food, 3)]);
        let sum = a + b;
        assert_eq!(sum.get(Resource::Water), 5);
        assert_eq!(sum.get(Resource::Food), 3);
        assert_eq!(sum.get(Resource::Money), 0);
        let diff = a - b;
        assert_eq!(diff.get(Resource::Food), -3);
    }

    #[test]
    fn deficit_iff_some_field_negative() {
        assert!(!ResourceVector::ZERO.deficit());
        let ok = ResourceVector::of(&[(Resource::Money, 10)]);
        assert!(!ok.deficit());
        let short = ok - ResourceVector::of(&[(Resource::Glass, 1)]);
        assert!(short.deficit());
        assert_eq!(short.deficits(), vec![Resource::Glass]);
    }

    #[test]
    fn of_accumulates_repeated_entries() {
        let v = ResourceVector::of(&[(Resource::Money, 3), (Resource::Money, 4)]);
        assert_eq!(v[Resource::Money], 7);
    }

    #[test]
    fn serializes_as_sparse_map() {
        let v = ResourceVector::of(&[(Resource::Money, 1000), (Resource::Concrete, 50)]);
        let yaml = serde_yaml::to_string(&v).unwrap();
        assert!(yaml.contains("money: 1000"));
        assert!(!yaml.contains("energy"));
        let back: ResourceVector = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, v);
    }
}
