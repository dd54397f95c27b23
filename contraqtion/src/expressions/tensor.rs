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

use crate::indices::Index;
use crate::{scalar_from_integer, ContraqtionError, HermitianConjugate, Scalar, StructuralHash};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tinyvec::TinyVec;

/// Permutational symmetry of the index slots within the bra and within the ket of a tensor.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum Symmetry {
    /// Exchanging two bra (or two ket) slots changes the sign.
    Antisymmetric,
    /// Exchanging two bra (or two ket) slots leaves the tensor unchanged.
    Symmetric,
    /// The slots carry no permutational symmetry.
    #[default]
    Nonsymmetric,
}

/// Creates a Symmetry from an &str representation.
///
/// # Arguments
///
/// * `s` - The string (&str) to be converted to a Symmetry.
///
/// # Returns
///
/// * `Ok(Self)` - The Symmetry of the input string.
/// * `Err(ContraqtionError::IncorrectSymmetryEntry)` - The symmetry tag is not in [\"A\", \"S\", \"N\"].
///
impl FromStr for Symmetry {
    type Err = ContraqtionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Symmetry::Antisymmetric),
            "S" => Ok(Symmetry::Symmetric),
            "N" => Ok(Symmetry::Nonsymmetric),
            _ => Err(ContraqtionError::IncorrectSymmetryEntry {
                symmetry: s.to_string(),
            }),
        }
    }
}

/// Implements the fmt function (Display trait) of Symmetry.
///
impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symmetry::Antisymmetric => write!(f, "A"),
            Symmetry::Symmetric => write!(f, "S"),
            Symmetry::Nonsymmetric => write!(f, "N"),
        }
    }
}

/// Symmetry of a tensor under the exchange of its full bra with its full ket.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum BraKetSymmetry {
    /// The tensor is invariant under bra-ket exchange.
    Symmetric,
    /// Bra-ket exchange conjugates the tensor.
    Conjugate,
    /// The tensor carries no bra-ket symmetry.
    #[default]
    Nonsymmetric,
}

/// Creates a BraKetSymmetry from an &str representation.
///
/// # Arguments
///
/// * `s` - The string (&str) to be converted to a BraKetSymmetry.
///
/// # Returns
///
/// * `Ok(Self)` - The BraKetSymmetry of the input string.
/// * `Err(ContraqtionError::IncorrectSymmetryEntry)` - The symmetry tag is not in [\"BS\", \"BC\", \"BN\"].
///
impl FromStr for BraKetSymmetry {
    type Err = ContraqtionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BS" => Ok(BraKetSymmetry::Symmetric),
            "BC" => Ok(BraKetSymmetry::Conjugate),
            "BN" => Ok(BraKetSymmetry::Nonsymmetric),
            _ => Err(ContraqtionError::IncorrectSymmetryEntry {
                symmetry: s.to_string(),
            }),
        }
    }
}

/// Implements the fmt function (Display trait) of BraKetSymmetry.
///
impl fmt::Display for BraKetSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BraKetSymmetry::Symmetric => write!(f, "BS"),
            BraKetSymmetry::Conjugate => write!(f, "BC"),
            BraKetSymmetry::Nonsymmetric => write!(f, "BN"),
        }
    }
}

/// Symmetry of a tensor under the simultaneous exchange of its k-th bra and k-th ket slot
/// with its l-th bra and l-th ket slot.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum ParticleSymmetry {
    /// The tensor is invariant under particle exchange.
    Symmetric,
    /// The tensor carries no particle symmetry.
    #[default]
    Nonsymmetric,
}

/// Creates a ParticleSymmetry from an &str representation.
///
/// # Arguments
///
/// * `s` - The string (&str) to be converted to a ParticleSymmetry.
///
/// # Returns
///
/// * `Ok(Self)` - The ParticleSymmetry of the input string.
/// * `Err(ContraqtionError::IncorrectSymmetryEntry)` - The symmetry tag is not in [\"PS\", \"PN\"].
///
impl FromStr for ParticleSymmetry {
    type Err = ContraqtionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PS" => Ok(ParticleSymmetry::Symmetric),
            "PN" => Ok(ParticleSymmetry::Nonsymmetric),
            _ => Err(ContraqtionError::IncorrectSymmetryEntry {
                symmetry: s.to_string(),
            }),
        }
    }
}

/// Implements the fmt function (Display trait) of ParticleSymmetry.
///
impl fmt::Display for ParticleSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleSymmetry::Symmetric => write!(f, "PS"),
            ParticleSymmetry::Nonsymmetric => write!(f, "PN"),
        }
    }
}

/// A tensor with named bra, ket and auxiliary index slots.
///
/// The bra and ket slot sequences are conjugate under the hermitian adjoint; auxiliary
/// slots are neutral. Permutational, bra-ket and particle symmetry tags describe which slot
/// exchanges leave the tensor invariant; they drive both slot canonicalization and the
/// group colors of the tensor-network graph.
///
/// # Example
///
/// ```rust
/// use contraqtion::expressions::{Symmetry, Tensor};
///
/// let g: Tensor = "g[i_1,i_2;a_1,a_2]:A".parse().unwrap();
/// assert_eq!(g.bra_rank(), 2);
/// assert_eq!(g.symmetry(), Symmetry::Antisymmetric);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tensor {
    /// The label of the tensor.
    label: String,
    /// The ordered bra index slots.
    bra: TinyVec<[Index; 2]>,
    /// The ordered ket index slots.
    ket: TinyVec<[Index; 2]>,
    /// The ordered auxiliary index slots.
    aux: TinyVec<[Index; 2]>,
    /// The permutational symmetry of the bra and ket slots.
    symmetry: Symmetry,
    /// The bra-ket exchange symmetry.
    braket_symmetry: BraKetSymmetry,
    /// The particle exchange symmetry.
    particle_symmetry: ParticleSymmetry,
}

impl Tensor {
    /// Creates a new Tensor without auxiliary slots and without symmetries.
    ///
    /// # Arguments
    ///
    /// * `label` - The label of the tensor.
    /// * `bra` - The bra index slots.
    /// * `ket` - The ket index slots.
    ///
    /// # Returns
    ///
    /// * `Ok(Tensor)` - The new Tensor.
    /// * `Err(ContraqtionError::FromStringFailed)` - The label is empty or not alphanumeric.
    pub fn new(
        label: impl Into<String>,
        bra: impl IntoIterator<Item = Index>,
        ket: impl IntoIterator<Item = Index>,
    ) -> Result<Self, ContraqtionError> {
        let label: String = label.into();
        if label.is_empty() || !label.chars().all(|c| c.is_alphanumeric()) {
            return Err(ContraqtionError::FromStringFailed {
                msg: format!("tensor label {label:?} must be non-empty and alphanumeric"),
            });
        }
        Ok(Self {
            label,
            bra: bra.into_iter().collect(),
            ket: ket.into_iter().collect(),
            aux: TinyVec::default(),
            symmetry: Symmetry::default(),
            braket_symmetry: BraKetSymmetry::default(),
            particle_symmetry: ParticleSymmetry::default(),
        })
    }

    /// Returns a copy of self with the given auxiliary slots.
    pub fn with_aux(mut self, aux: impl IntoIterator<Item = Index>) -> Self {
        self.aux = aux.into_iter().collect();
        self
    }

    /// Returns a copy of self with the given permutational symmetry.
    pub fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Returns a copy of self with the given bra-ket symmetry.
    pub fn with_braket_symmetry(mut self, braket_symmetry: BraKetSymmetry) -> Self {
        self.braket_symmetry = braket_symmetry;
        self
    }

    /// Returns a copy of self with the given particle symmetry.
    pub fn with_particle_symmetry(mut self, particle_symmetry: ParticleSymmetry) -> Self {
        self.particle_symmetry = particle_symmetry;
        self
    }

    /// Returns the label of the tensor.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the ordered bra index slots.
    pub fn bra(&self) -> &[Index] {
        &self.bra
    }

    /// Returns the ordered ket index slots.
    pub fn ket(&self) -> &[Index] {
        &self.ket
    }

    /// Returns the ordered auxiliary index slots.
    pub fn aux(&self) -> &[Index] {
        &self.aux
    }

    /// Returns the number of bra slots.
    pub fn bra_rank(&self) -> usize {
        self.bra.len()
    }

    /// Returns the number of ket slots.
    pub fn ket_rank(&self) -> usize {
        self.ket.len()
    }

    /// Returns the number of auxiliary slots.
    pub fn aux_rank(&self) -> usize {
        self.aux.len()
    }

    /// Returns the permutational symmetry of the bra and ket slots.
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Returns the bra-ket exchange symmetry.
    pub fn braket_symmetry(&self) -> BraKetSymmetry {
        self.braket_symmetry
    }

    /// Returns the particle exchange symmetry.
    pub fn particle_symmetry(&self) -> ParticleSymmetry {
        self.particle_symmetry
    }

    /// Iterates over the bra and ket slots.
    pub fn braket(&self) -> impl Iterator<Item = &Index> {
        self.bra.iter().chain(self.ket.iter())
    }

    /// Iterates over all index slots, auxiliary slots included.
    pub fn indices(&self) -> impl Iterator<Item = &Index> {
        self.bra.iter().chain(self.ket.iter()).chain(self.aux.iter())
    }

    /// Applies an index renaming to every slot.
    ///
    /// # Arguments
    ///
    /// * `renaming` - The map of old to new indices.
    pub fn substitute_indices(&mut self, renaming: &IndexMap<Index, Index>) {
        for slot in self
            .bra
            .iter_mut()
            .chain(self.ket.iter_mut())
            .chain(self.aux.iter_mut())
        {
            *slot = slot.substitute(renaming);
        }
    }

    /// Brings the index slots into canonical order as far as the symmetry tags permit.
    ///
    /// Bra and ket slots of a symmetric or antisymmetric tensor are sorted by label; for an
    /// antisymmetric tensor an odd sorting permutation produces a sign. A bra-ket symmetric
    /// tensor additionally exchanges bra and ket when the ket sequence orders before the
    /// bra sequence.
    ///
    /// # Returns
    ///
    /// * `Option<Scalar>` - The sign picked up by the reordering, or None when no impure
    ///   prefactor was produced.
    pub fn canonicalize_slots(&mut self) -> Option<Scalar> {
        let mut parity = 0usize;
        match self.symmetry {
            Symmetry::Antisymmetric => {
                parity += sort_with_parity(&mut self.bra);
                parity += sort_with_parity(&mut self.ket);
            }
            Symmetry::Symmetric => {
                self.bra.sort();
                self.ket.sort();
            }
            Symmetry::Nonsymmetric => {}
        }
        if self.braket_symmetry == BraKetSymmetry::Symmetric
            && self.ket.as_slice() < self.bra.as_slice()
        {
            std::mem::swap(&mut self.bra, &mut self.ket);
        }
        if parity % 2 != 0 {
            Some(scalar_from_integer(-1))
        } else {
            None
        }
    }
}

impl StructuralHash for Tensor {}

impl HermitianConjugate for Tensor {
    /// Returns the hermitian conjugate of the tensor.
    ///
    /// The bra and ket slot sequences are exchanged; auxiliary slots and the symmetry tags
    /// are unchanged.
    ///
    /// # Returns
    ///
    /// * `Tensor` - The hermitian conjugate of self.
    fn hermitian_conjugate(&self) -> Self {
        let mut conjugated = self.clone();
        std::mem::swap(&mut conjugated.bra, &mut conjugated.ket);
        conjugated
    }
}

/// Sorts slots by label and returns the number of transpositions applied.
fn sort_with_parity(slots: &mut TinyVec<[Index; 2]>) -> usize {
    let mut swaps = 0usize;
    for current in 1..slots.len() {
        let mut position = current;
        while position > 0 && slots[position] < slots[position - 1] {
            slots.swap(position, position - 1);
            swaps += 1;
            position -= 1;
        }
    }
    swaps
}

/// Implements the fmt function (Display trait) of Tensor.
///
/// The string form is `label[bra;ket]` or `label[bra;ket;aux]` with comma-separated index
/// labels, followed by the non-default symmetry tags, e.g. `g[i_1,i_2;a_1,a_2]:A:BC`.
impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |slots: &[Index]| {
            slots
                .iter()
                .map(|index| index.to_string())
                .collect::<Vec<String>>()
                .join(",")
        };
        write!(f, "{}[{};{}", self.label, join(&self.bra), join(&self.ket))?;
        if !self.aux.is_empty() {
            write!(f, ";{}", join(&self.aux))?;
        }
        write!(f, "]")?;
        if self.symmetry != Symmetry::Nonsymmetric {
            write!(f, ":{}", self.symmetry)?;
        }
        if self.braket_symmetry != BraKetSymmetry::Nonsymmetric {
            write!(f, ":{}", self.braket_symmetry)?;
        }
        if self.particle_symmetry != ParticleSymmetry::Nonsymmetric {
            write!(f, ":{}", self.particle_symmetry)?;
        }
        Ok(())
    }
}

/// Creates a Tensor from an &str representation.
///
/// # Arguments
///
/// * `s` - The string (&str) to be converted to a Tensor, e.g. `t[i_1;a_1]` or
///   `g[i_1,i_2;a_1,a_2]:A:PS`.
///
/// # Returns
///
/// * `Ok(Self)` - The Tensor of the input string.
/// * `Err(ContraqtionError::FromStringFailed)` - The string is not a valid tensor form.
/// * `Err(ContraqtionError::IncorrectSymmetryEntry)` - A trailing symmetry tag is unknown.
///
impl FromStr for Tensor {
    type Err = ContraqtionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let open = s
            .find('[')
            .ok_or_else(|| ContraqtionError::FromStringFailed {
                msg: format!("tensor form {s} has no slot list"),
            })?;
        let close = s
            .rfind(']')
            .ok_or_else(|| ContraqtionError::FromStringFailed {
                msg: format!("tensor form {s} has no closing bracket"),
            })?;
        if close < open {
            return Err(ContraqtionError::FromStringFailed {
                msg: format!("tensor form {s} has mismatched brackets"),
            });
        }

        // split on top-level commas only, proto-index lists carry their own commas
        let parse_slots = |part: &str| -> Result<Vec<Index>, ContraqtionError> {
            let mut labels: Vec<&str> = Vec::new();
            let mut depth = 0usize;
            let mut start = 0usize;
            for (position, character) in part.char_indices() {
                match character {
                    '<' => depth += 1,
                    '>' => depth = depth.saturating_sub(1),
                    ',' if depth == 0 => {
                        labels.push(&part[start..position]);
                        start = position + 1;
                    }
                    _ => {}
                }
            }
            if !part.is_empty() {
                labels.push(&part[start..]);
            }
            labels
                .into_iter()
                .map(|label| label.trim().parse())
                .collect()
        };

        let groups: Vec<&str> = s[open + 1..close].split(';').collect();
        let (bra, ket, aux) = match groups.as_slice() {
            [bra, ket] => (parse_slots(bra)?, parse_slots(ket)?, Vec::new()),
            [bra, ket, aux] => (parse_slots(bra)?, parse_slots(ket)?, parse_slots(aux)?),
            _ => {
                return Err(ContraqtionError::FromStringFailed {
                    msg: format!("tensor form {s} must have two or three slot groups"),
                })
            }
        };

        let mut tensor = Tensor::new(&s[..open], bra, ket)?.with_aux(aux);
        for tag in s[close + 1..].split(':').filter(|tag| !tag.is_empty()) {
            if let Ok(symmetry) = tag.parse::<Symmetry>() {
                tensor = tensor.with_symmetry(symmetry);
            } else if let Ok(braket_symmetry) = tag.parse::<BraKetSymmetry>() {
                tensor = tensor.with_braket_symmetry(braket_symmetry);
            } else {
                tensor = tensor.with_particle_symmetry(tag.parse::<ParticleSymmetry>()?);
            }
        }
        Ok(tensor)
    }
}
