// Copyright © 2021-2023 HQS Quantum Simulations GmbH. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the
// License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either
// express or implied. See the License for the specific language governing permissions and
// limitations under the License.

use crate::ContraqtionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The orbital region an index runs over, encoded as a bitset.
///
/// Composite regions are unions of the primitive bits, so that the lattice meet of two
/// regions is the bitwise AND of their encodings. The base regions of the single-reference
/// orbital partitioning are provided as associated constants.
///
/// # Example
///
/// ```rust
/// use contraqtion::indices::SpaceType;
///
/// let meet = SpaceType::OCCUPIED.intersection(SpaceType::COMPLETE);
/// assert_eq!(meet, SpaceType::OCCUPIED);
/// assert!(SpaceType::OCCUPIED.intersection(SpaceType::UNOCCUPIED).is_empty());
/// ```
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct SpaceType(u32);

impl SpaceType {
    /// Occupied orbitals excluded from the correlation treatment.
    pub const FROZEN_OCCUPIED: SpaceType = SpaceType(0b0000_0001);
    /// Occupied orbitals inside the active correlation window.
    pub const ACTIVE_OCCUPIED: SpaceType = SpaceType(0b0000_0010);
    /// All occupied orbitals.
    pub const OCCUPIED: SpaceType = SpaceType(0b0000_0011);
    /// Unoccupied orbitals inside the active correlation window.
    pub const ACTIVE_UNOCCUPIED: SpaceType = SpaceType(0b0000_0100);
    /// Unoccupied orbitals outside the active correlation window.
    pub const INACTIVE_UNOCCUPIED: SpaceType = SpaceType(0b0000_1000);
    /// All unoccupied orbitals.
    pub const UNOCCUPIED: SpaceType = SpaceType(0b0000_1100);
    /// The union of all occupied and unoccupied orbitals.
    pub const COMPLETE: SpaceType = SpaceType(0b0000_1111);

    /// Returns the lattice meet of self and other.
    ///
    /// # Arguments
    ///
    /// * `other` - The SpaceType to intersect with.
    ///
    /// # Returns
    ///
    /// * `SpaceType` - The intersection; may be empty.
    pub fn intersection(self, other: SpaceType) -> SpaceType {
        SpaceType(self.0 & other.0)
    }

    /// Returns true if the region contains no orbitals.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if other is a (non-strict) subregion of self.
    ///
    /// # Arguments
    ///
    /// * `other` - The SpaceType to compare against.
    ///
    /// # Returns
    ///
    /// * `bool` - Whether self includes other.
    pub fn includes(self, other: SpaceType) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw bit encoding of the region.
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Spin quantum numbers attached to an index space.
///
/// `Unpolarized` is the top of the quantum-number lattice: it intersects with every
/// polarization, while `Alpha` and `Beta` are mutually disjoint.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum QuantumNumbers {
    /// No spin projection attached.
    #[default]
    Unpolarized,
    /// Spin-up projection.
    Alpha,
    /// Spin-down projection.
    Beta,
}

impl QuantumNumbers {
    /// Returns the lattice meet of self and other, or None for disjoint polarizations.
    pub fn intersection(self, other: QuantumNumbers) -> Option<QuantumNumbers> {
        match (self, other) {
            (QuantumNumbers::Unpolarized, x) => Some(x),
            (x, QuantumNumbers::Unpolarized) => Some(x),
            (x, y) if x == y => Some(x),
            _ => None,
        }
    }
}

/// Implements the fmt function (Display trait) of QuantumNumbers.
///
impl fmt::Display for QuantumNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantumNumbers::Unpolarized => write!(f, ""),
            QuantumNumbers::Alpha => write!(f, "↑"),
            QuantumNumbers::Beta => write!(f, "↓"),
        }
    }
}

/// A typed index region: an orbital region plus spin quantum numbers.
///
/// An IndexSpace does not know its dimension. Dimensions are supplied to the optimizer as a
/// callable oracle so that different physical regimes (more virtual than occupied orbitals,
/// or the reverse) can be explored without rebuilding the space model.
///
/// # Example
///
/// ```rust
/// use contraqtion::indices::{IndexSpace, QuantumNumbers};
///
/// let occ = IndexSpace::occupied();
/// let occ_a = occ.with_qns(QuantumNumbers::Alpha);
/// assert_ne!(occ.color(), occ_a.color());
/// ```
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct IndexSpace {
    /// The orbital region of the space.
    space_type: SpaceType,
    /// The spin quantum numbers of the space.
    qns: QuantumNumbers,
}

impl IndexSpace {
    /// Creates a new IndexSpace.
    ///
    /// # Arguments
    ///
    /// * `space_type` - The orbital region of the space.
    /// * `qns` - The spin quantum numbers of the space.
    ///
    /// # Returns
    ///
    /// * `IndexSpace` - The new IndexSpace.
    pub fn new(space_type: SpaceType, qns: QuantumNumbers) -> Self {
        Self { space_type, qns }
    }

    /// The unpolarized occupied space.
    pub fn occupied() -> Self {
        Self::new(SpaceType::OCCUPIED, QuantumNumbers::Unpolarized)
    }

    /// The unpolarized active occupied space.
    pub fn active_occupied() -> Self {
        Self::new(SpaceType::ACTIVE_OCCUPIED, QuantumNumbers::Unpolarized)
    }

    /// The unpolarized unoccupied space.
    pub fn unoccupied() -> Self {
        Self::new(SpaceType::UNOCCUPIED, QuantumNumbers::Unpolarized)
    }

    /// The unpolarized active unoccupied space.
    pub fn active_unoccupied() -> Self {
        Self::new(SpaceType::ACTIVE_UNOCCUPIED, QuantumNumbers::Unpolarized)
    }

    /// The unpolarized complete space.
    pub fn complete() -> Self {
        Self::new(SpaceType::COMPLETE, QuantumNumbers::Unpolarized)
    }

    /// Returns a copy of self with the given spin quantum numbers.
    pub fn with_qns(self, qns: QuantumNumbers) -> Self {
        Self::new(self.space_type, qns)
    }

    /// Returns the orbital region of the space.
    pub fn space_type(&self) -> SpaceType {
        self.space_type
    }

    /// Returns the spin quantum numbers of the space.
    pub fn qns(&self) -> QuantumNumbers {
        self.qns
    }

    /// Returns the stable integer color of the space.
    ///
    /// The color combines the orbital region and the spin quantum numbers and is used as a
    /// hash input when coloring network graphs.
    ///
    /// # Returns
    ///
    /// * `u64` - The color of the space.
    pub fn color(&self) -> u64 {
        ((self.space_type.0 as u64) << 2) | self.qns as u64
    }

    /// Returns the lattice meet of self and other.
    ///
    /// # Arguments
    ///
    /// * `other` - The IndexSpace to intersect with.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexSpace)` - The intersection of the two spaces.
    /// * `Err(ContraqtionError::DisjointSpaces)` - The two spaces have an empty intersection.
    pub fn intersection(&self, other: &IndexSpace) -> Result<IndexSpace, ContraqtionError> {
        let space_type = self.space_type.intersection(other.space_type);
        let qns = self.qns.intersection(other.qns);
        match (space_type.is_empty(), qns) {
            (false, Some(qns)) => Ok(IndexSpace::new(space_type, qns)),
            _ => Err(ContraqtionError::DisjointSpaces {
                left: self.color(),
                right: other.color(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meet_follows_the_lattice() {
        let occ = IndexSpace::occupied();
        let act = IndexSpace::active_occupied();
        assert_eq!(occ.intersection(&act).unwrap(), act);
        assert_eq!(
            IndexSpace::complete().intersection(&occ).unwrap(),
            occ
        );
        assert!(occ.intersection(&IndexSpace::unoccupied()).is_err());
    }

    #[test]
    fn qns_meet() {
        let a = QuantumNumbers::Alpha;
        assert_eq!(QuantumNumbers::Unpolarized.intersection(a), Some(a));
        assert_eq!(a.intersection(QuantumNumbers::Beta), None);
    }

    #[test]
    fn colors_are_distinct() {
        let spaces = [
            IndexSpace::occupied(),
            IndexSpace::active_occupied(),
            IndexSpace::unoccupied(),
            IndexSpace::active_unoccupied(),
            IndexSpace::complete(),
            IndexSpace::occupied().with_qns(QuantumNumbers::Alpha),
            IndexSpace::occupied().with_qns(QuantumNumbers::Beta),
        ];
        for (i, left) in spaces.iter().enumerate() {
            for right in spaces.iter().skip(i + 1) {
                assert_ne!(left.color(), right.color());
            }
        }
    }
}
