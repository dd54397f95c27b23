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

use contraqtion::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn doubles_like_network() -> TensorNetwork {
    TensorNetwork::from_tensors([
        "g[v_1,v_2;o_1,o_2]".parse::<Tensor>().unwrap(),
        "t1[o_1;v_3]".parse::<Tensor>().unwrap(),
        "t2[o_2;v_4]".parse::<Tensor>().unwrap(),
        "u[v_3,v_4;o_3,o_4]".parse::<Tensor>().unwrap(),
        "w[o_3,o_4;v_1,v_2]".parse::<Tensor>().unwrap(),
    ])
    .unwrap()
}

fn dims(index: &Index) -> u64 {
    if index.space().space_type() == SpaceType::OCCUPIED {
        10
    } else {
        100
    }
}

fn bench_single_term_opt(c: &mut Criterion) {
    let network = doubles_like_network();
    c.bench_function("single_term_opt doubles-like", |bencher| {
        bencher.iter(|| single_term_opt(black_box(&network), &dims).unwrap())
    });
}

fn bench_optimize(c: &mut Criterion) {
    let product = Expression::product_of(
        doubles_like_network()
            .tensors()
            .iter()
            .cloned()
            .map(Expression::from),
    );
    c.bench_function("optimize doubles-like", |bencher| {
        bencher.iter(|| optimize(black_box(&product), &dims).unwrap())
    });
}

criterion_group!(benches, bench_single_term_opt, bench_optimize);
criterion_main!(benches);
