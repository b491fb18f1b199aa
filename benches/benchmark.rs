use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use good_qp::matrix::{dense_from_row_major, dense_to_csc, from_triplets, identity, lower_to_upper};
use good_qp::{available_backends, solve_problem, QuadraticProgram, SolverOptions};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("dense to csc conversion of a 1000x1000 matrix", |b| {
        let n = 1000;
        let values: Vec<f64> = (0..n * n)
            .map(|i| if i % 3 == 0 { (i % 11) as f64 } else { 0. })
            .collect();
        let dense = dense_from_row_major(n, n, &values).unwrap();
        b.iter(|| dense_to_csc(black_box(&dense)))
    });

    c.bench_function("csc to upper triangle of a 1000x1000 matrix", |b| {
        let n = 1000;
        let triplets = (0..n).flat_map(|i| (0..=i).step_by(7).map(move |j| (i, j, 1.)));
        let lower = from_triplets(n, n, triplets).unwrap();
        b.iter(|| lower_to_upper(black_box(&lower)))
    });

    let n = 200;
    let triplets = (0..n - 1).flat_map(|i| vec![(i, i, 1.), (i, i + 1, -1.)]);
    let g = from_triplets(n - 1, n, triplets).unwrap();
    let problem = QuadraticProgram::new(identity(n), vec![0.; n])
        .inequalities(g, vec![-1.; n - 1])
        .lower_bounds(vec![-1000.; n]);
    for solver in available_backends() {
        c.bench_function(&format!("{}: chain of {} variables", solver, n), |b| {
            let options = SolverOptions::default();
            b.iter(|| solve_problem(black_box(&problem), solver, &options).unwrap())
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
