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

use super::{IndexConventions, IndexSpace, QuantumNumbers};
use crate::{hash_combine, ContraqtionError, StructuralHash};
use indexmap::IndexMap;
use serde::{
    de::{Error, SeqAccess, Visitor},
    ser::SerializeTuple,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An abstract index label typed by an [IndexSpace].
///
/// An Index is a textual base with a numeric subscript (`i_3`), an optional list of
/// proto-indices that the index depends on (`a_1<i_1,i_2>`) and a reference to the space it
/// runs over. Indices are the vertices of tensor networks: an index appearing in exactly one
/// tensor slot of a product is free (external), one appearing in exactly two slots is summed
/// over.
///
/// Two indices compare equal if and only if their labels and proto-indices are equal; the
/// label order is total and stable and is used as the tie-break in all index set operations.
/// The space of an index is fixed at construction.
///
/// # Example
///
/// ```rust
/// use contraqtion::indices::Index;
///
/// let i1: Index = "i_1".parse().unwrap();
/// let i2: Index = "i_2".parse().unwrap();
/// assert!(i1 < i2);
/// assert_eq!(i1.space(), &contraqtion::indices::IndexSpace::occupied());
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, Default)]
pub struct Index {
    /// The alphabetic base of the label.
    base: String,
    /// The numeric subscript of the label.
    ordinal: u32,
    /// The space the index runs over.
    space: IndexSpace,
    /// The proto-indices the index depends on.
    protos: Vec<Index>,
}

impl Index {
    /// Creates a new Index without proto-indices.
    ///
    /// # Arguments
    ///
    /// * `base` - The alphabetic base of the label.
    /// * `ordinal` - The numeric subscript of the label.
    /// * `space` - The space the index runs over.
    ///
    /// # Returns
    ///
    /// * `Ok(Index)` - The new Index.
    /// * `Err(ContraqtionError::InvalidIndexLabel)` - The base is empty or not alphabetic.
    pub fn new(
        base: impl Into<String>,
        ordinal: u32,
        space: IndexSpace,
    ) -> Result<Self, ContraqtionError> {
        Self::with_protos(base, ordinal, space, [])
    }

    /// Creates a new Index with proto-indices.
    ///
    /// # Arguments
    ///
    /// * `base` - The alphabetic base of the label.
    /// * `ordinal` - The numeric subscript of the label.
    /// * `space` - The space the index runs over.
    /// * `protos` - The proto-indices the index depends on.
    ///
    /// # Returns
    ///
    /// * `Ok(Index)` - The new Index.
    /// * `Err(ContraqtionError::InvalidIndexLabel)` - The base is empty or not alphabetic.
    pub fn with_protos(
        base: impl Into<String>,
        ordinal: u32,
        space: IndexSpace,
        protos: impl IntoIterator<Item = Index>,
    ) -> Result<Self, ContraqtionError> {
        let base: String = base.into();
        if base.is_empty() || !base.chars().all(|c| c.is_alphabetic()) {
            return Err(ContraqtionError::InvalidIndexLabel { base });
        }
        Ok(Self {
            base,
            ordinal,
            space,
            protos: protos.into_iter().collect(),
        })
    }

    /// Returns the alphabetic base of the label.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the numeric subscript of the label.
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Returns the space the index runs over.
    pub fn space(&self) -> &IndexSpace {
        &self.space
    }

    /// Returns the proto-indices the index depends on.
    pub fn protos(&self) -> &[Index] {
        &self.protos
    }

    /// Returns the label of the index without its proto-indices.
    ///
    /// # Returns
    ///
    /// * `String` - The label in `base_N` form, with a spin marker when polarized.
    pub fn label(&self) -> String {
        format!("{}_{}{}", self.base, self.ordinal, self.space.qns())
    }

    /// Returns the color of the index used in graph canonicalization.
    ///
    /// The color of an index is the color of its space, combined with the colors of its
    /// proto-indices when present.
    ///
    /// # Returns
    ///
    /// * `u64` - The color of the index.
    pub fn color(&self) -> u64 {
        if self.protos.is_empty() {
            self.space.color()
        } else {
            hash_combine(self.space.color(), proto_indices_color(&self.protos))
        }
    }

    /// Compares two indices by label.
    ///
    /// The order is total: first the base, then the numeric subscript, then the
    /// proto-indices, and finally the space color. `i_2` sorts before `i_10`.
    ///
    /// # Arguments
    ///
    /// * `other` - The Index to compare against.
    ///
    /// # Returns
    ///
    /// * `Ordering` - The relative order of the two labels.
    pub fn label_cmp(&self, other: &Index) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| self.ordinal.cmp(&other.ordinal))
            .then_with(|| {
                for (left, right) in self.protos.iter().zip(other.protos.iter()) {
                    let ord = left.label_cmp(right);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                self.protos.len().cmp(&other.protos.len())
            })
            .then_with(|| self.space.color().cmp(&other.space.color()))
    }

    /// Applies an index renaming to self.
    ///
    /// If the map contains self as a key, the mapped index is returned; otherwise the
    /// renaming is applied to the proto-indices.
    ///
    /// # Arguments
    ///
    /// * `renaming` - The map of old to new indices.
    ///
    /// # Returns
    ///
    /// * `Index` - The renamed Index.
    pub fn substitute(&self, renaming: &IndexMap<Index, Index>) -> Index {
        if let Some(new) = renaming.get(self) {
            return new.clone();
        }
        if self.protos.is_empty() {
            return self.clone();
        }
        Index {
            base: self.base.clone(),
            ordinal: self.ordinal,
            space: self.space,
            protos: self
                .protos
                .iter()
                .map(|proto| proto.substitute(renaming))
                .collect(),
        }
    }
}

impl StructuralHash for Index {}

/// Returns the combined color of a proto-index bundle.
pub fn proto_indices_color(protos: &[Index]) -> u64 {
    protos
        .iter()
        .fold(0x5a17_b1e5_0f0a_11ed, |acc, proto| {
            hash_combine(acc, proto.color())
        })
}

impl PartialOrd for Index {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Index {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label_cmp(other)
    }
}

/// Implements the fmt function (Display trait) of Index.
///
impl fmt::Display for Index {
    /// Formats the Index using the given formatter.
    ///
    /// # Arguments
    ///
    /// * `f` - The formatter to use.
    ///
    /// # Returns
    ///
    /// * `std::fmt::Result` - The formatted Index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if !self.protos.is_empty() {
            write!(f, "<")?;
            for (position, proto) in self.protos.iter().enumerate() {
                if position > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{proto}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Creates an Index from an &str representation.
///
/// The space of the index is resolved from the label base using the current
/// [IndexConventions]; a spin marker (`↑`, `↓`) selects the polarized subspace.
///
/// # Arguments
///
/// * `s` - The string (&str) to be converted to an Index, e.g. `i_3`, `a1`, `a_1<i_1>`.
///
/// # Returns
///
/// * `Ok(Self)` - The Index of the input string.
/// * `Err(ContraqtionError::FromStringFailed)` - The string is not a valid index label.
///
impl FromStr for Index {
    type Err = ContraqtionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &IndexConventions::current())
    }
}

fn parse_label(s: &str, conventions: &IndexConventions) -> Result<Index, ContraqtionError> {
    let (core, protos) = match s.find('<') {
        Some(position) => {
            if !s.ends_with('>') {
                return Err(ContraqtionError::FromStringFailed {
                    msg: format!("unterminated proto-index list in {s}"),
                });
            }
            let inner = &s[position + '<'.len_utf8()..s.len() - '>'.len_utf8()];
            let protos = split_protos(inner)
                .into_iter()
                .map(|proto| parse_label(proto, conventions))
                .collect::<Result<Vec<Index>, ContraqtionError>>()?;
            (&s[..position], protos)
        }
        None => (s, Vec::new()),
    };

    let (core, qns) = match core.strip_suffix('↑') {
        Some(stripped) => (stripped, QuantumNumbers::Alpha),
        None => match core.strip_suffix('↓') {
            Some(stripped) => (stripped, QuantumNumbers::Beta),
            None => (core, QuantumNumbers::Unpolarized),
        },
    };

    let digits_at = core
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ContraqtionError::FromStringFailed {
            msg: format!("index label {s} has no numeric subscript"),
        })?;
    let base = core[..digits_at].trim_end_matches('_');
    let ordinal: u32 =
        core[digits_at..]
            .parse()
            .map_err(|_| ContraqtionError::FromStringFailed {
                msg: format!("index label {s} has a malformed numeric subscript"),
            })?;
    let space = conventions
        .resolve(base)
        .ok_or_else(|| ContraqtionError::FromStringFailed {
            msg: format!("no index space registered for label base {base}"),
        })?
        .with_qns(qns);
    Index::with_protos(base, ordinal, space, protos)
}

/// Splits a proto-index list on top-level commas, leaving nested lists intact.
fn split_protos(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (position, character) in inner.char_indices() {
        match character {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..position]);
                start = position + 1;
            }
            _ => {}
        }
    }
    if !inner.is_empty() {
        parts.push(&inner[start..]);
    }
    parts
}

#[cfg(feature = "json_schema")]
impl schemars::JsonSchema for Index {
    fn schema_name() -> String {
        "contraqtion::indices::Index".to_string()
    }
    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let tmp_schema = gen.subschema_for::<String>();
        let mut obj = tmp_schema.into_object();
        let meta = obj.metadata();
        meta.description = Some("Represents an abstract tensor index by a label base with a numeric subscript, an optional spin marker and an optional proto-index list. E.g. i_3, a_1<i_1,i_2>.".to_string());

        schemars::schema::Schema::Object(obj)
    }
}

/// Implementing serde serialization writing directly to string.
///
impl Serialize for Index {
    /// Serialization function for Index according to string type.
    ///
    /// # Arguments
    ///
    /// * `self` - Index to be serialized.
    /// * `serializer` - Serializer used for serialization.
    ///
    /// # Returns
    ///
    /// `S::Ok` - Serialized instance of Index.
    /// `S::Error` - Error in the serialization process.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let readable = serializer.is_human_readable();
        if readable {
            serializer.serialize_str(&self.to_string())
        } else {
            let mut tuple = serializer.serialize_tuple(4)?;
            tuple.serialize_element(&self.base)?;
            tuple.serialize_element(&self.ordinal)?;
            tuple.serialize_element(&self.space)?;
            tuple.serialize_element(&self.protos)?;
            tuple.end()
        }
    }
}

/// Deserializing directly from string.
///
impl<'de> Deserialize<'de> for Index {
    /// Deserialization function for Index.
    ///
    /// # Arguments
    ///
    /// * `self` - Serialized instance of Index to be deserialized.
    /// * `deserializer` - Deserializer used for deserialization.
    ///
    /// # Returns
    ///
    /// `Index` - Deserialized instance of Index.
    /// `D::Error` - Error in the deserialization process.
    fn deserialize<D>(deserializer: D) -> Result<Index, D::Error>
    where
        D: Deserializer<'de>,
    {
        let human_readable = deserializer.is_human_readable();
        if human_readable {
            struct TemporaryVisitor;
            impl<'de> Visitor<'de> for TemporaryVisitor {
                type Value = Index;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("String")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    Index::from_str(v).map_err(|err| E::custom(format!("{:?}", err)))
                }

                fn visit_borrowed_str<E>(self, v: &'de str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    Index::from_str(v).map_err(|err| E::custom(format!("{:?}", err)))
                }
            }

            deserializer.deserialize_str(TemporaryVisitor)
        } else {
            struct IndexVisitor;
            impl<'de> serde::de::Visitor<'de> for IndexVisitor {
                type Value = Index;
                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    std::fmt::Formatter::write_str(
                        formatter,
                        "Tuple of label base, subscript, space and proto-indices",
                    )
                }
                fn visit_seq<M>(self, mut access: M) -> Result<Self::Value, M::Error>
                where
                    M: SeqAccess<'de>,
                {
                    let base: String = match access.next_element()? {
                        Some(x) => x,
                        None => {
                            return Err(M::Error::custom("Missing label base".to_string()));
                        }
                    };
                    let ordinal: u32 = match access.next_element()? {
                        Some(x) => x,
                        None => {
                            return Err(M::Error::custom("Missing numeric subscript".to_string()));
                        }
                    };
                    let space: IndexSpace = match access.next_element()? {
                        Some(x) => x,
                        None => {
                            return Err(M::Error::custom("Missing index space".to_string()));
                        }
                    };
                    let protos: Vec<Index> = match access.next_element()? {
                        Some(x) => x,
                        None => {
                            return Err(M::Error::custom("Missing proto-indices".to_string()));
                        }
                    };

                    Index::with_protos(base, ordinal, space, protos).map_err(M::Error::custom)
                }
            }
            let index_visitor = IndexVisitor;

            deserializer.deserialize_tuple(4, index_visitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscript_order_is_numeric() {
        let i2: Index = "i_2".parse().unwrap();
        let i10: Index = "i_10".parse().unwrap();
        assert_eq!(i2.label_cmp(&i10), Ordering::Less);
    }

    #[test]
    fn proto_round_trip() {
        let index: Index = "a_1<i_1,i_2>".parse().unwrap();
        assert_eq!(index.protos().len(), 2);
        assert_eq!(index.to_string(), "a_1<i_1,i_2>");
        assert_eq!(index, index.to_string().parse().unwrap());
    }

    #[test]
    fn proto_changes_color() {
        let bare: Index = "a_1".parse().unwrap();
        let with_proto: Index = "a_1<i_1>".parse().unwrap();
        assert_ne!(bare.color(), with_proto.color());
    }
}
