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

//! Integration test for public API of the contraction-order optimizer

use contraqtion::optimize::{common_indices, contraction_cost, diff_indices};
use contraqtion::prelude::*;
use test_case::test_case;

fn tensor(form: &str) -> Expression {
    form.parse::<Tensor>().unwrap().into()
}

/// Ten occupied orbitals, a hundred of everything else.
fn dims(index: &Index) -> u64 {
    if index.space().space_type() == SpaceType::OCCUPIED {
        10
    } else {
        100
    }
}

fn network(forms: &[&str]) -> TensorNetwork {
    let factors: Vec<Expression> = forms.iter().map(|form| tensor(form)).collect();
    TensorNetwork::new(&factors).unwrap()
}

/// Replays a reverse-Polish plan, returning its total operation count.
fn plan_cost<F>(net: &TensorNetwork, plan: &[i32], index_dimension: &F) -> f64
where
    F: Fn(&Index) -> u64,
{
    let mut stack: Vec<Vec<Index>> = Vec::new();
    let mut total = 0.0;
    for &step in plan {
        if step == CONTRACT {
            let right = stack.pop().expect("malformed plan");
            let left = stack.pop().expect("malformed plan");
            let commons = common_indices(&left, &right);
            let diffs = diff_indices(&left, &right);
            total += contraction_cost(index_dimension, &commons, &diffs).unwrap();
            stack.push(diffs);
        } else {
            let mut slots: Vec<Index> = net.tensors()[step as usize]
                .indices()
                .cloned()
                .collect();
            slots.sort();
            stack.push(slots);
        }
    }
    assert_eq!(stack.len(), 1, "malformed plan");
    total
}

/// Minimum cost over every binary contraction tree, by exhaustive pairing.
fn brute_force_cost<F>(factor_indices: Vec<Vec<Index>>, index_dimension: &F) -> f64
where
    F: Fn(&Index) -> u64,
{
    if factor_indices.len() < 2 {
        return 0.0;
    }
    let mut best = f64::INFINITY;
    for left in 0..factor_indices.len() {
        for right in left + 1..factor_indices.len() {
            let commons = common_indices(&factor_indices[left], &factor_indices[right]);
            let diffs = diff_indices(&factor_indices[left], &factor_indices[right]);
            let step = contraction_cost(index_dimension, &commons, &diffs).unwrap();
            let mut remaining: Vec<Vec<Index>> = Vec::with_capacity(factor_indices.len() - 1);
            for (position, indices) in factor_indices.iter().enumerate() {
                if position != left && position != right {
                    remaining.push(indices.clone());
                }
            }
            remaining.push(diffs);
            best = best.min(step + brute_force_cost(remaining, index_dimension));
        }
    }
    best
}

fn sorted_factor_indices(net: &TensorNetwork) -> Vec<Vec<Index>> {
    net.tensors()
        .iter()
        .map(|tensor| {
            let mut slots: Vec<Index> = tensor.indices().cloned().collect();
            slots.sort();
            slots
        })
        .collect()
}

#[test]
fn plan_for_an_empty_network_is_empty() {
    let net = TensorNetwork::from_tensors(Vec::<Tensor>::new()).unwrap();
    assert_eq!(single_term_opt(&net, &dims).unwrap(), Vec::<i32>::new());
}

#[test_case(&["t[o_1;v_1]"], &[0]; "single factor")]
#[test_case(&["t[o_1;v_1]", "f[v_1;o_1]"], &[0, 1, -1]; "two factors")]
fn base_case_plans(forms: &[&str], expected: &[i32]) {
    let net = network(forms);
    assert_eq!(single_term_opt(&net, &dims).unwrap(), expected.to_vec());
}

#[test]
fn two_factor_contraction_cost() {
    // scenario: T[o1,o2;v1,v2] * G[v1,v2;o1,o2]
    let net = network(&["t[o_1,o_2;v_1,v_2]", "g[v_1,v_2;o_1,o_2]"]);
    let plan = single_term_opt(&net, &dims).unwrap();
    assert_eq!(plan, vec![0, 1, -1]);
    // every distinct index of the pair is counted once: 10^2 for the occupied pair,
    // 100^2 for the virtual pair
    assert_eq!(plan_cost(&net, &plan, &dims), 1e6);
}

#[test]
fn chain_prefers_the_cheap_association() {
    // A[o1,v1] * B[v1,o2] * C[o2,v2]: contracting A with B first is cheaper
    let net = network(&["a[o_1;v_1]", "b[v_1;o_2]", "c[o_2;v_2]"]);
    let plan = single_term_opt(&net, &dims).unwrap();
    assert_eq!(plan, vec![0, 1, -1, 2, -1]);
    let cost = plan_cost(&net, &plan, &dims);
    assert_eq!(cost, brute_force_cost(sorted_factor_indices(&net), &dims));
}

#[test]
fn ties_keep_the_user_order() {
    // a chain of identically-shaped factors with identical contracted dimensions:
    // several trees tie, the winner keeps factor 0 as the leftmost leaf
    let net = network(&[
        "t0[o_1;o_2]",
        "t1[o_2;o_3]",
        "t2[o_3;o_4]",
        "t3[o_4;o_5]",
    ]);
    let plan = single_term_opt(&net, &dims).unwrap();
    assert_eq!(plan[0], 0);
    assert_eq!(plan.iter().filter(|&&step| step == CONTRACT).count(), 3);
    for position in 0..4i32 {
        assert_eq!(
            plan.iter().filter(|&&step| step == position).count(),
            1,
            "factor {position} must appear exactly once"
        );
    }
    // re-running yields the byte-identical plan
    assert_eq!(plan, single_term_opt(&net, &dims).unwrap());
}

#[test_case(&["t[o_1;v_1]", "f[v_1;o_2]", "u[o_2;v_2]", "g[v_2;o_1]"]; "ring of four")]
#[test_case(&["g[v_3,v_4;v_1,v_2]", "t[v_1,v_2;o_1,o_2]", "u[o_1;v_3]", "w[o_2;v_4]"]; "ladder")]
#[test_case(&["a[o_1;v_1]", "b[v_1;o_2]", "c[o_2;v_2]", "d[v_2;o_3]", "e2[o_3;v_3]"]; "chain of five")]
#[test_case(&["g[v_1,v_2;o_1,o_2]", "t1[o_1;v_3]", "t2[o_2;v_4]", "u[v_3,v_4;o_3,o_4]", "w[o_3;v_1]", "x[o_4;v_2]"]; "doubles-like six")]
fn plans_are_optimal(forms: &[&str]) {
    let net = network(forms);
    let plan = single_term_opt(&net, &dims).unwrap();
    assert_eq!(
        plan_cost(&net, &plan, &dims),
        brute_force_cost(sorted_factor_indices(&net), &dims)
    );
}

#[test]
fn optimality_holds_in_the_opposite_regime() {
    // more occupied than virtual orbitals
    let inverted = |index: &Index| {
        if index.space().space_type() == SpaceType::OCCUPIED {
            100
        } else {
            10
        }
    };
    let net = network(&["a[o_1;v_1]", "b[v_1;o_2]", "c[o_2;v_2]"]);
    let plan = single_term_opt(&net, &inverted).unwrap();
    assert_eq!(
        plan_cost(&net, &plan, &inverted),
        brute_force_cost(sorted_factor_indices(&net), &inverted)
    );
}

#[test]
fn optimize_parenthesizes_a_product() {
    let product = Expression::product_of([
        tensor("a[o_1;v_1]"),
        tensor("b[v_1;o_2]"),
        tensor("c[o_2;v_2]"),
    ]);
    let optimized = optimize(&product, &dims).unwrap();
    let outer = optimized.as_product().expect("product expected");
    assert_eq!(outer.len(), 2);
    let inner = outer.factors()[0].as_product().expect("nested product expected");
    assert_eq!(inner.factors()[0], tensor("a[o_1;v_1]"));
    assert_eq!(inner.factors()[1], tensor("b[v_1;o_2]"));
    assert_eq!(outer.factors()[1], tensor("c[o_2;v_2]"));
}

#[test]
fn scalars_and_variables_are_prepended() {
    // scenario: 3 * x * T1 * T2 * T3
    let product = Expression::product_of([
        Expression::from(scalar_from_integer(3)),
        Expression::from(Variable::new("x")),
        tensor("a[o_1;v_1]"),
        tensor("b[v_1;o_2]"),
        tensor("c[o_2;v_2]"),
    ]);
    let optimized = optimize(&product, &dims).unwrap();
    let outer = optimized.as_product().expect("product expected");
    assert_eq!(outer.scalar(), scalar_from_integer(3));
    assert!(outer.factors()[0].is_variable());
    assert!(outer.factors()[1].is_product());
    assert!(outer.factors()[2].is_tensor());
}

#[test]
fn short_products_are_returned_unchanged() {
    let product = Expression::product_of([
        Expression::from(scalar_from_integer(2)),
        tensor("t[o_1,o_2;v_1,v_2]"),
        tensor("g[v_1,v_2;o_1,o_2]"),
    ]);
    let optimized = optimize(&product, &dims).unwrap();
    let outer = optimized.as_product().expect("product expected");
    assert_eq!(outer.scalar(), scalar_from_integer(2));
    assert_eq!(outer.len(), 2);
    assert_eq!(outer.factors(), product.as_product().unwrap().factors());
}

#[test]
fn single_tensor_optimizes_to_a_clone() {
    let expression = tensor("t[o_1,o_2;v_1,v_2]");
    let optimized = optimize(&expression, &dims).unwrap();
    assert_eq!(optimized, expression);
    assert_eq!(optimized.structural_hash(), expression.structural_hash());
}

#[test]
fn sums_recurse_into_their_summands() {
    let first = Expression::product_of([
        tensor("a[o_1;v_1]"),
        tensor("b[v_1;o_2]"),
        tensor("c[o_2;v_2]"),
    ]);
    let second = Expression::product_of([
        tensor("t[o_3;v_3]"),
        tensor("f[v_3;o_4]"),
        tensor("u[o_4;v_4]"),
    ]);
    let sum = Expression::sum_of([first.clone(), second.clone()]);
    let optimized = optimize(&sum, &dims).unwrap();
    let summands = optimized.as_sum().expect("sum expected");
    assert_eq!(summands.len(), 2);
    // no shared intermediates: the reorderer keeps the original order, and every summand
    // hashes like its independent optimization
    assert_eq!(
        summands.get(0).unwrap().structural_hash(),
        optimize(&first, &dims).unwrap().structural_hash()
    );
    assert_eq!(
        summands.get(1).unwrap().structural_hash(),
        optimize(&second, &dims).unwrap().structural_hash()
    );
}

#[test]
fn reorder_groups_summands_sharing_intermediates() {
    // terms 0 and 2 share the contraction a*b, term 1 is unrelated
    let shared_first = Expression::product_of([
        tensor("a[o_1;v_1]"),
        tensor("b[v_1;o_2]"),
        tensor("c[o_2;v_2]"),
    ]);
    let unrelated = Expression::product_of([
        tensor("t[o_3;v_3]"),
        tensor("f[v_3;o_4]"),
        tensor("u[o_4;v_4]"),
    ]);
    let shared_second = Expression::product_of([
        tensor("a[o_1;v_1]"),
        tensor("b[v_1;o_2]"),
        tensor("d[o_2;v_2]"),
    ]);
    let sum = Expression::sum_of([shared_first, unrelated.clone(), shared_second]);
    let optimized = optimize(&sum, &dims).unwrap();
    let summands = optimized.as_sum().expect("sum expected");
    assert_eq!(summands.len(), 3);
    // the unrelated term moves behind the cluster of two
    assert_eq!(
        summands.get(2).unwrap().structural_hash(),
        optimize(&unrelated, &dims).unwrap().structural_hash()
    );
}

#[test]
fn optimization_is_idempotent() {
    let product = Expression::product_of([
        Expression::from(Variable::new("x")),
        tensor("a[o_1;v_1]"),
        tensor("b[v_1;o_2]"),
        tensor("c[o_2;v_2]"),
    ]);
    let once = optimize(&product, &dims).unwrap();
    let twice = optimize(&once, &dims).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.structural_hash(), twice.structural_hash());
}

#[test]
fn optimization_preserves_the_canonical_form() {
    let product = Expression::product_of([
        tensor("g[v_3,v_4;v_1,v_2]"),
        tensor("t[v_1,v_2;o_1,o_2]"),
        tensor("u[o_1;v_3]"),
    ]);
    let canonical = canonicalize(&product).unwrap();
    let optimized = optimize(&canonical, &dims).unwrap();
    // flattening the binary parenthesization recovers the canonical original
    assert_eq!(canonicalize(&optimized).unwrap(), canonical);
}

#[test]
fn optimization_is_deterministic() {
    let product = Expression::product_of([
        tensor("g[v_3,v_4;v_1,v_2]"),
        tensor("t[v_1,v_2;o_1,o_2]"),
        tensor("u[o_1;v_3]"),
        tensor("w[o_2;v_4]"),
    ]);
    let first = optimize(&product, &dims).unwrap();
    let second = optimize(&product, &dims).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test_case("Constant"; "constant")]
#[test_case("Variable"; "variable")]
fn scalar_atoms_are_unsupported(kind: &str) {
    let expression = match kind {
        "Constant" => Expression::from(scalar_from_integer(3)),
        _ => Expression::from(Variable::new("x")),
    };
    let error = optimize(&expression, &dims).unwrap_err();
    assert_eq!(
        error,
        ContraqtionError::UnsupportedExpression {
            kind: kind.to_string()
        }
    );
}

#[test]
fn missing_dimensions_surface() {
    let broken = |index: &Index| {
        if index.base() == "v" {
            0
        } else {
            10
        }
    };
    let product = Expression::product_of([
        tensor("a[o_1;v_1]"),
        tensor("b[v_1;o_2]"),
        tensor("c[o_2;v_2]"),
    ]);
    let error = optimize(&product, &broken).unwrap_err();
    assert!(matches!(error, ContraqtionError::MissingDimension { .. }));
}

#[test]
fn diagonal_products_are_rejected() {
    let product = Expression::product_of([
        tensor("a[o_1;v_1]"),
        tensor("b[o_1;v_2]"),
        tensor("c[o_1;v_3]"),
    ]);
    let error = optimize(&product, &dims).unwrap_err();
    assert_eq!(
        error,
        ContraqtionError::IndexMultiplicityExceeded {
            index: "o_1".to_string(),
            count: 3,
        }
    );
}
