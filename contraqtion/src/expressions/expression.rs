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

use super::{Flatten, Product, Sum, Tensor};
use crate::{HermitianConjugate, Scalar, StructuralHash};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A named symbolic scalar.
///
/// Variables stand for scalar quantities whose value is not known symbolically (orbital
/// energies, amplitudes folded into scalars and the like). The hermitian adjoint toggles
/// the conjugation flag, so conjugation is an involution.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Variable {
    /// The name of the variable.
    name: String,
    /// Whether the variable is complex conjugated.
    conjugated: bool,
}

impl Variable {
    /// Creates a new unconjugated Variable.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conjugated: false,
        }
    }

    /// Returns the name of the variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the variable is complex conjugated.
    pub fn conjugated(&self) -> bool {
        self.conjugated
    }
}

impl HermitianConjugate for Variable {
    /// Returns the complex conjugate of the variable.
    fn hermitian_conjugate(&self) -> Self {
        Self {
            name: self.name.clone(),
            conjugated: !self.conjugated,
        }
    }
}

/// Implements the fmt function (Display trait) of Variable.
///
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conjugated {
            write!(f, "{}^*", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A symbolic expression: the closed variant over all node types of the algebra.
///
/// Expressions are immutable after construction except through explicit cloning-with-edits
/// or a canonicalization pass replacing an expression in its holder. Every expression has a
/// structural hash depending only on its semantic content; a Product with a unit prefactor
/// and a single factor hashes and compares equal to that factor.
///
/// # Example
///
/// ```rust
/// use contraqtion::expressions::{Expression, Tensor};
///
/// let t: Tensor = "t[i_1;a_1]".parse().unwrap();
/// let product = Expression::product_of([t.clone().into(), t.into()]);
/// assert!(product.is_product());
/// ```
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub enum Expression {
    /// An exact complex-rational scalar.
    Constant(Scalar),
    /// A named symbolic scalar.
    Variable(Variable),
    /// A tensor with named index slots.
    Tensor(Tensor),
    /// An ordered sum of expressions.
    Sum(Sum),
    /// A scalar prefactor with an ordered sequence of factors.
    Product(Product),
}

impl Expression {
    /// Returns the name of the expression variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Constant(_) => "Constant",
            Expression::Variable(_) => "Variable",
            Expression::Tensor(_) => "Tensor",
            Expression::Sum(_) => "Sum",
            Expression::Product(_) => "Product",
        }
    }

    /// Returns true if the expression is a Constant.
    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    /// Returns true if the expression is a Variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Expression::Variable(_))
    }

    /// Returns true if the expression is a Tensor.
    pub fn is_tensor(&self) -> bool {
        matches!(self, Expression::Tensor(_))
    }

    /// Returns true if the expression is a Sum.
    pub fn is_sum(&self) -> bool {
        matches!(self, Expression::Sum(_))
    }

    /// Returns true if the expression is a Product.
    pub fn is_product(&self) -> bool {
        matches!(self, Expression::Product(_))
    }

    /// Returns the contained scalar for a Constant.
    pub fn as_constant(&self) -> Option<&Scalar> {
        match self {
            Expression::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    /// Returns the contained Variable.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Expression::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Returns the contained Tensor.
    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Expression::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    /// Returns the contained Sum.
    pub fn as_sum(&self) -> Option<&Sum> {
        match self {
            Expression::Sum(sum) => Some(sum),
            _ => None,
        }
    }

    /// Returns the contained Product.
    pub fn as_product(&self) -> Option<&Product> {
        match self {
            Expression::Product(product) => Some(product),
            _ => None,
        }
    }

    /// Returns true if the expression is semantically zero.
    ///
    /// A zero Constant and an empty Sum are zero, as is a Product with a zero prefactor.
    pub fn is_zero(&self) -> bool {
        match self {
            Expression::Constant(constant) => constant.is_zero(),
            Expression::Sum(sum) => sum.is_empty(),
            Expression::Product(product) => product.scalar().is_zero(),
            _ => false,
        }
    }

    /// Returns true if the expression is semantically one.
    ///
    /// A unit Constant and an empty Product with a unit prefactor are one.
    pub fn is_one(&self) -> bool {
        match self {
            Expression::Constant(constant) => constant.is_one(),
            Expression::Product(product) => product.is_empty() && product.scalar().is_one(),
            _ => false,
        }
    }

    /// Creates a flattened Product expression from an iterator of factors.
    ///
    /// # Arguments
    ///
    /// * `factors` - The factors of the product.
    pub fn product_of(factors: impl IntoIterator<Item = Expression>) -> Expression {
        Expression::Product(Product::from_factors(Scalar::one(), factors, Flatten::Yes))
    }

    /// Creates a flattened Sum expression from an iterator of summands.
    ///
    /// # Arguments
    ///
    /// * `summands` - The summands of the sum.
    pub fn sum_of(summands: impl IntoIterator<Item = Expression>) -> Expression {
        Expression::Sum(Sum::from_summands(summands))
    }

    /// Visits self and all subexpressions in pre-order, children left to right.
    ///
    /// Mutation during a visit is forbidden by construction: the visitor receives shared
    /// references.
    ///
    /// # Arguments
    ///
    /// * `visitor` - The function to call on every visited expression.
    pub fn visit<'a, F>(&'a self, visitor: &mut F)
    where
        F: FnMut(&'a Expression),
    {
        visitor(self);
        match self {
            Expression::Sum(sum) => {
                for summand in sum.summands() {
                    summand.visit(visitor);
                }
            }
            Expression::Product(product) => {
                for factor in product.factors() {
                    factor.visit(visitor);
                }
            }
            _ => {}
        }
    }
}

impl StructuralHash for Expression {}

impl HermitianConjugate for Expression {
    /// Returns the hermitian adjoint of the expression.
    ///
    /// Constants are complex conjugated, variables toggle their conjugation flag, tensors
    /// exchange bra and ket. The adjoint of a product conjugates the prefactor and the
    /// factors and reverses the factor order; the adjoint of a sum is the sum of adjoints.
    ///
    /// # Returns
    ///
    /// * `Expression` - The hermitian adjoint of self.
    fn hermitian_conjugate(&self) -> Self {
        match self {
            Expression::Constant(constant) => Expression::Constant(constant.conj()),
            Expression::Variable(variable) => {
                Expression::Variable(variable.hermitian_conjugate())
            }
            Expression::Tensor(tensor) => Expression::Tensor(tensor.hermitian_conjugate()),
            Expression::Sum(sum) => Expression::Sum(Sum::from_summands(
                sum.summands()
                    .iter()
                    .map(|summand| summand.hermitian_conjugate()),
            )),
            Expression::Product(product) => {
                Expression::Product(Product::from_factors(
                    product.scalar().conj(),
                    product
                        .factors()
                        .iter()
                        .rev()
                        .map(|factor| factor.hermitian_conjugate()),
                    Flatten::No,
                ))
            }
        }
    }
}

/// Structural equality honoring the trivial-product invariant.
///
/// A Product with a unit prefactor and a single factor compares equal to that factor.
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        if let Expression::Product(product) = self {
            if let Some(inner) = product.trivial_factor() {
                return inner == other;
            }
        }
        if let Expression::Product(product) = other {
            if let Some(inner) = product.trivial_factor() {
                return self == inner;
            }
        }
        match (self, other) {
            (Expression::Constant(left), Expression::Constant(right)) => left == right,
            (Expression::Variable(left), Expression::Variable(right)) => left == right,
            (Expression::Tensor(left), Expression::Tensor(right)) => left == right,
            (Expression::Sum(left), Expression::Sum(right)) => left == right,
            (Expression::Product(left), Expression::Product(right)) => left == right,
            _ => false,
        }
    }
}

/// Structural hash honoring the trivial-product invariant.
impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Expression::Constant(constant) => {
                state.write_u8(0);
                constant.hash(state);
            }
            Expression::Variable(variable) => {
                state.write_u8(1);
                variable.hash(state);
            }
            Expression::Tensor(tensor) => {
                state.write_u8(2);
                tensor.hash(state);
            }
            Expression::Sum(sum) => {
                state.write_u8(3);
                sum.hash(state);
            }
            Expression::Product(product) => match product.trivial_factor() {
                Some(inner) => inner.hash(state),
                None => {
                    state.write_u8(4);
                    product.hash(state);
                }
            },
        }
    }
}

impl From<Scalar> for Expression {
    fn from(scalar: Scalar) -> Self {
        Expression::Constant(scalar)
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::Variable(variable)
    }
}

impl From<Tensor> for Expression {
    fn from(tensor: Tensor) -> Self {
        Expression::Tensor(tensor)
    }
}

impl From<Sum> for Expression {
    fn from(sum: Sum) -> Self {
        Expression::Sum(sum)
    }
}

impl From<Product> for Expression {
    fn from(product: Product) -> Self {
        Expression::Product(product)
    }
}

/// Formats a scalar without trailing unit denominators.
fn format_scalar(scalar: &Scalar) -> String {
    if scalar.im.is_zero() {
        format!("{}", scalar.re)
    } else if scalar.re.is_zero() {
        format!("{}i", scalar.im)
    } else {
        format!("({}+{}i)", scalar.re, scalar.im)
    }
}

/// Implements the fmt function (Display trait) of Expression.
///
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(constant) => write!(f, "{}", format_scalar(constant)),
            Expression::Variable(variable) => write!(f, "{variable}"),
            Expression::Tensor(tensor) => write!(f, "{tensor}"),
            Expression::Sum(sum) => {
                for (position, summand) in sum.summands().iter().enumerate() {
                    if position > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{summand}")?;
                }
                Ok(())
            }
            Expression::Product(product) => {
                let mut separate = false;
                if !product.scalar().is_one() || product.is_empty() {
                    write!(f, "{}", format_scalar(&product.scalar()))?;
                    separate = true;
                }
                for factor in product.factors() {
                    if separate {
                        write!(f, " * ")?;
                    }
                    separate = true;
                    match factor {
                        Expression::Sum(_) | Expression::Product(_) => write!(f, "({factor})")?,
                        factor => write!(f, "{factor}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar_from_integer;

    #[test]
    fn trivial_product_equals_its_factor() {
        let tensor: Expression = "t[i_1;a_1]".parse::<Tensor>().unwrap().into();
        let product = Expression::Product(Product::from_factors(
            Scalar::one(),
            [tensor.clone()],
            Flatten::Yes,
        ));
        assert_eq!(product, tensor);
        assert_eq!(product.structural_hash(), tensor.structural_hash());
    }

    #[test]
    fn adjoint_is_an_involution() {
        let product = Expression::product_of([
            Expression::from(scalar_from_integer(2)),
            Expression::from(Variable::new("x")),
            "t[i_1;a_1]".parse::<Tensor>().unwrap().into(),
        ]);
        assert_eq!(
            product
                .hermitian_conjugate()
                .hermitian_conjugate()
                .structural_hash(),
            // the double adjoint restores the factor order
            Expression::product_of([
                Expression::from(scalar_from_integer(2)),
                Expression::from(Variable::new("x")),
                "t[i_1;a_1]".parse::<Tensor>().unwrap().into(),
            ])
            .structural_hash()
        );
    }

    #[test]
    fn visit_is_preorder() {
        let sum = Expression::sum_of([
            "t[i_1;a_1]".parse::<Tensor>().unwrap().into(),
            "u[i_2;a_2]".parse::<Tensor>().unwrap().into(),
        ]);
        let mut kinds = Vec::new();
        sum.visit(&mut |expression| kinds.push(expression.kind_name()));
        assert_eq!(kinds, vec!["Sum", "Tensor", "Tensor"]);
    }
}
