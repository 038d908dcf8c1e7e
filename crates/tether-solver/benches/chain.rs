//! Solver benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tether_core::{Strength, Variable};
use tether_solver::Solver;

fn build_chain(n: usize) -> (Solver, Vec<Variable>) {
    let mut solver = Solver::new();
    let vars: Vec<Variable> = (0..n).map(|_| Variable::new()).collect();
    for &v in &vars {
        solver.add_var(v).unwrap();
    }
    for pair in vars.windows(2) {
        solver.add_constraint((pair[1] - pair[0]).equals(10.0)).unwrap();
    }
    (solver, vars)
}

fn chain_build(c: &mut Criterion) {
    c.bench_function("chain_build_50", |b| b.iter(|| build_chain(black_box(50))));
}

fn chain_edit(c: &mut Criterion) {
    c.bench_function("chain_edit_50", |b| {
        b.iter(|| {
            let (mut solver, vars) = build_chain(black_box(50));
            solver.add_edit_var(vars[0], Strength::STRONG).unwrap();
            solver.begin_edit().unwrap();
            solver.suggest_value(vars[0], 42.0).unwrap();
            solver.resolve().unwrap();
            solver.suggest_value(vars[0], -17.0).unwrap();
            solver.resolve().unwrap();
            solver.end_edit().unwrap();
            black_box(solver.get_value(vars[vars.len() - 1]))
        })
    });
}

criterion_group!(benches, chain_build, chain_edit);
criterion_main!(benches);
