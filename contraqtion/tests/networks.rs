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

//! Integration test for public API of tensor networks

use contraqtion::prelude::*;
use test_case::test_case;

fn tensor(form: &str) -> Tensor {
    form.parse().unwrap()
}

#[test]
fn external_and_summation_indices() {
    let network = TensorNetwork::from_tensors([
        tensor("g[v_3,v_4;v_1,v_2]"),
        tensor("t[v_1,v_2;o_1,o_2]"),
    ])
    .unwrap();
    let externals: Vec<String> = network
        .external_indices()
        .iter()
        .map(|index| index.to_string())
        .collect();
    let dummies: Vec<String> = network
        .summation_indices()
        .iter()
        .map(|index| index.to_string())
        .collect();
    assert_eq!(externals, vec!["o_1", "o_2", "v_3", "v_4"]);
    assert_eq!(dummies, vec!["v_1", "v_2"]);
}

#[test_case(3; "three slots")]
#[test_case(4; "four slots")]
fn multiplicity_above_two_is_rejected(count: usize) {
    let tensors: Vec<Tensor> = (0..count)
        .map(|position| {
            format!("t{position}[i_1;a_{}]", position + 1)
                .parse()
                .unwrap()
        })
        .collect();
    let error = TensorNetwork::from_tensors(tensors).unwrap_err();
    assert_eq!(
        error,
        ContraqtionError::IndexMultiplicityExceeded {
            index: "i_1".to_string(),
            count,
        }
    );
}

#[test]
fn non_tensor_factors_are_rejected() {
    let factors = [
        Expression::from(Variable::new("x")),
        tensor("t[i_1;a_1]").into(),
    ];
    let error = TensorNetwork::new(&factors).unwrap_err();
    assert_eq!(
        error,
        ContraqtionError::NonTensorNetworkFactor {
            kind: "Variable".to_string()
        }
    );
}

#[test]
fn canonical_renaming_only_touches_summation_indices() {
    let conventions = IndexConventions::default();
    let network = TensorNetwork::from_tensors([
        tensor("t[i_1;a_7]"),
        tensor("f[a_7;i_9]"),
    ])
    .unwrap();
    let renaming = network.canonical_index_renaming(&conventions).unwrap();
    assert_eq!(renaming.len(), 1);
    let (old, new) = renaming.first().unwrap();
    assert_eq!(old.to_string(), "a_7");
    assert_eq!(new.to_string(), "a_1");
}

#[test]
fn canonical_renaming_skips_past_external_ordinals() {
    let conventions = IndexConventions::default();
    let network = TensorNetwork::from_tensors([
        tensor("t[i_1;i_7]"),
        tensor("f[i_7;i_2]"),
    ])
    .unwrap();
    let renaming = network.canonical_index_renaming(&conventions).unwrap();
    assert_eq!(renaming.len(), 1);
    let (old, new) = renaming.first().unwrap();
    assert_eq!(old.to_string(), "i_7");
    // externals i_1 and i_2 exist, so the dummy lands past them
    assert_eq!(new.to_string(), "i_3");
}

#[test]
fn canonicalized_networks_agree_for_relabeled_dummies() {
    let conventions = IndexConventions::default();
    let mut left = TensorNetwork::from_tensors([
        tensor("g[v_5,v_8;v_1,v_2]"),
        tensor("t[v_1,v_2;o_3,o_4]"),
        tensor("u[o_3,o_4;o_1,o_2]"),
    ])
    .unwrap();
    let mut right = TensorNetwork::from_tensors([
        tensor("g[v_5,v_8;v_9,v_12]"),
        tensor("t[v_9,v_12;o_7,o_8]"),
        tensor("u[o_7,o_8;o_1,o_2]"),
    ])
    .unwrap();
    left.canonicalize_indices(&conventions).unwrap();
    right.canonicalize_indices(&conventions).unwrap();
    assert_eq!(left, right);
}

#[test]
fn fingerprint_is_stable_under_relabeling_and_reordering() {
    let base = TensorNetwork::from_tensors([
        tensor("t[i_1;a_9]"),
        tensor("f[a_9;i_2]"),
    ])
    .unwrap();
    let relabeled = TensorNetwork::from_tensors([
        tensor("t[i_1;a_4]"),
        tensor("f[a_4;i_2]"),
    ])
    .unwrap();
    let reordered = TensorNetwork::from_tensors([
        tensor("f[a_9;i_2]"),
        tensor("t[i_1;a_9]"),
    ])
    .unwrap();
    assert_eq!(base.fingerprint().unwrap(), relabeled.fingerprint().unwrap());
    assert_eq!(base.fingerprint().unwrap(), reordered.fingerprint().unwrap());
}

#[test]
fn fingerprint_distinguishes_different_connectivity() {
    let chain = TensorNetwork::from_tensors([
        tensor("t[i_1;a_1]"),
        tensor("f[a_1;i_2]"),
    ])
    .unwrap();
    let disconnected = TensorNetwork::from_tensors([
        tensor("t[i_1;a_1]"),
        tensor("f[a_2;i_2]"),
    ])
    .unwrap();
    assert_ne!(
        chain.fingerprint().unwrap(),
        disconnected.fingerprint().unwrap()
    );
}

#[test]
fn braket_symmetric_slot_exchange_collapses() {
    // for a bra-ket symmetric tensor the two slot bundles are exchangeable, so the
    // transposed tensor canonicalizes onto the same form
    let conventions = IndexConventions::default();
    let mut forward =
        TensorNetwork::from_tensors([tensor("h[p_1;p_2]:BS"), tensor("d[p_2;p_1]")]).unwrap();
    let mut backward =
        TensorNetwork::from_tensors([tensor("h[p_2;p_1]:BS"), tensor("d[p_2;p_1]")]).unwrap();
    forward.canonicalize_indices(&conventions).unwrap();
    backward.canonicalize_indices(&conventions).unwrap();
    assert_eq!(
        forward.fingerprint().unwrap(),
        backward.fingerprint().unwrap()
    );
}

#[test]
fn serde_round_trip() {
    let network = TensorNetwork::from_tensors([
        tensor("t[i_1;a_1]"),
        tensor("f[a_1;i_2]"),
    ])
    .unwrap();
    let serialized = serde_json::to_string(&network).unwrap();
    let deserialized: TensorNetwork = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, network);

    let binary = bincode::serialize(&network).unwrap();
    let deserialized: TensorNetwork = bincode::deserialize(&binary).unwrap();
    assert_eq!(deserialized, network);
}
