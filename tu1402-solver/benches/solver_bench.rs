//! Benchmarks for the benchmark-structure solver

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tu1402_solver::prelude::*;

fn create_girder(n_elements: usize) -> Model {
    let mut model = Model::new();

    model.add_material("Steel", Material::steel()).unwrap();
    model
        .add_section("Girder", Section::rectangular(0.1, 0.25))
        .unwrap();

    let span = 6.0;
    for i in 0..=n_elements {
        let x = span * (i as f64) / (n_elements as f64);
        model
            .add_node(&format!("N{}", i), Node::new(x, 0.0))
            .unwrap();
    }
    for i in 0..n_elements {
        model
            .add_element(
                &format!("E{}", i),
                BeamElement::new(&format!("N{}", i), &format!("N{}", i + 1), "Steel", "Girder"),
            )
            .unwrap();
    }

    model.add_support("N0", Support::pinned()).unwrap();
    model
        .add_support(&format!("N{}", n_elements), Support::roller())
        .unwrap();
    model
        .add_load(Load::constant(
            &format!("N{}", n_elements / 2),
            Dof::Uy,
            -10_000.0,
        ))
        .unwrap();

    model
}

fn benchmark_static(c: &mut Criterion) {
    for &n in &[30usize, 120, 480] {
        c.bench_function(&format!("static_{}_elements", n), |b| {
            let model = create_girder(n);
            b.iter(|| {
                let results = StaticAnalysis::run(&model).unwrap();
                black_box(&results);
            })
        });
    }
}

fn benchmark_modal(c: &mut Criterion) {
    for &n in &[30usize, 60, 120] {
        c.bench_function(&format!("modal_10_modes_{}_elements", n), |b| {
            let model = create_girder(n);
            let analysis = ModalAnalysis::new().with_modes(10);
            b.iter(|| {
                let results = analysis.run(&model).unwrap();
                black_box(&results);
            })
        });
    }
}

fn benchmark_dynamics(c: &mut Criterion) {
    c.bench_function("dynamics_1s_30_elements", |b| {
        let model = create_girder(30);
        let analysis = DynamicAnalysis::new().with_period(1.0).with_step(1.0e-3);
        b.iter(|| {
            let results = analysis.run(&model).unwrap();
            black_box(&results);
        })
    });
}

criterion_group!(benches, benchmark_static, benchmark_modal, benchmark_dynamics);
criterion_main!(benches);
