use criterion::{black_box, Criterion};
use gradlet_tensor::{no_grad, Tensor};

const SIZES: [(usize, &str); 2] = [(100, "small"), (10000, "large")];

pub fn basic(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("autograd/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(50);

    for (size, label) in SIZES {
        group.bench_function(format!("forward_backward/{}", label), |b| {
            b.iter(|| {
                let x = Tensor::rand_with_spec(&[size], true).unwrap();
                let y = x.mul(&x).unwrap().add(1.0).unwrap().sqrt().unwrap().sum().unwrap();
                y.backward().unwrap();
                black_box(x.grad().unwrap())
            })
        });

        // same expression without recording a graph
        group.bench_function(format!("forward_no_grad/{}", label), |b| {
            b.iter(|| {
                let x = Tensor::rand_with_spec(&[size], true).unwrap();
                no_grad(|| black_box(x.mul(&x).unwrap().add(1.0).unwrap().sqrt().unwrap().sum().unwrap()))
            })
        });
    }

    group.finish();
}
