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

use super::{IndexSpace, SpaceType};
use crate::ContraqtionError;
use indexmap::IndexMap;
use std::cell::RefCell;

thread_local! {
    static CONVENTIONS_STACK: RefCell<Vec<IndexConventions>> = const { RefCell::new(Vec::new()) };
}

/// Label conventions mapping index label bases to index spaces.
///
/// The conventions resolve the space of an index parsed from a literal label, and choose the
/// canonical label base used when summation indices are renamed into canonical form. The
/// default conventions follow the usual single-reference naming:
///
/// * `i j k l o` - occupied
/// * `m n` - active occupied
/// * `a b c d v` - unoccupied
/// * `e f` - active unoccupied
/// * `p q r s` - complete
///
/// All core functions accept conventions explicitly. A thread-local stack of conventions
/// provides the current default used by `FromStr`; [IndexConventions::register] installs a
/// set of conventions as the current default and returns a guard that restores the previous
/// default when dropped, on every exit path.
///
/// # Example
///
/// ```rust
/// use contraqtion::indices::{Index, IndexConventions, IndexSpace, SpaceType};
///
/// let mut conventions = IndexConventions::new();
/// conventions.add_base("w", IndexSpace::complete());
/// let _guard = conventions.register();
/// let w: Index = "w_1".parse().unwrap();
/// assert_eq!(w.space().space_type(), SpaceType::COMPLETE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConventions {
    /// Label bases and the spaces they resolve to, in registration order.
    bases: IndexMap<String, IndexSpace>,
    /// The canonical label base per orbital region, used for dummy renaming.
    canonical: IndexMap<SpaceType, String>,
}

impl IndexConventions {
    /// Creates an empty set of conventions.
    pub fn new() -> Self {
        Self {
            bases: IndexMap::new(),
            canonical: IndexMap::new(),
        }
    }

    /// Adds a label base resolving to the given space.
    ///
    /// The first base added for an orbital region becomes the canonical base used when
    /// renaming summation indices of that region.
    ///
    /// # Arguments
    ///
    /// * `base` - The label base to register.
    /// * `space` - The space the base resolves to.
    pub fn add_base(&mut self, base: impl Into<String>, space: IndexSpace) {
        let base: String = base.into();
        self.canonical
            .entry(space.space_type())
            .or_insert_with(|| base.clone());
        self.bases.insert(base, space);
    }

    /// Resolves a label base to its space.
    ///
    /// # Arguments
    ///
    /// * `base` - The label base to resolve.
    ///
    /// # Returns
    ///
    /// * `Option<IndexSpace>` - The space of the base, or None for unregistered bases.
    pub fn resolve(&self, base: &str) -> Option<IndexSpace> {
        self.bases.get(base).copied()
    }

    /// Returns the canonical label base for a space.
    ///
    /// # Arguments
    ///
    /// * `space` - The space to look up.
    ///
    /// # Returns
    ///
    /// * `Ok(&str)` - The canonical label base of the space.
    /// * `Err(ContraqtionError::UnregisteredSpace)` - No base is registered for the space.
    pub fn canonical_base(&self, space: &IndexSpace) -> Result<&str, ContraqtionError> {
        self.canonical
            .get(&space.space_type())
            .map(|base| base.as_str())
            .ok_or(ContraqtionError::UnregisteredSpace {
                color: space.color(),
            })
    }

    /// Returns the current default conventions.
    ///
    /// The current default is the most recently registered set of conventions on this
    /// thread, or [IndexConventions::default] when none is registered.
    pub fn current() -> IndexConventions {
        CONVENTIONS_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .cloned()
                .unwrap_or_else(IndexConventions::default)
        })
    }

    /// Installs self as the current default conventions of this thread.
    ///
    /// # Returns
    ///
    /// * `ConventionsGuard` - Guard restoring the previous default when dropped.
    #[must_use]
    pub fn register(self) -> ConventionsGuard {
        CONVENTIONS_STACK.with(|stack| stack.borrow_mut().push(self));
        ConventionsGuard { _private: () }
    }
}

impl Default for IndexConventions {
    /// Returns the conventions of the usual single-reference orbital naming.
    fn default() -> Self {
        let mut conventions = IndexConventions::new();
        for base in ["i", "j", "k", "l", "o"] {
            conventions.add_base(base, IndexSpace::occupied());
        }
        for base in ["m", "n"] {
            conventions.add_base(base, IndexSpace::active_occupied());
        }
        for base in ["a", "b", "c", "d", "v"] {
            conventions.add_base(base, IndexSpace::unoccupied());
        }
        for base in ["e", "f"] {
            conventions.add_base(base, IndexSpace::active_unoccupied());
        }
        for base in ["p", "q", "r", "s"] {
            conventions.add_base(base, IndexSpace::complete());
        }
        conventions
    }
}

/// Guard returned by [IndexConventions::register].
///
/// Dropping the guard restores the previously current conventions.
#[derive(Debug)]
pub struct ConventionsGuard {
    _private: (),
}

impl Drop for ConventionsGuard {
    fn drop(&mut self) {
        CONVENTIONS_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
