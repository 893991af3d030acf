use criterion::{black_box, Criterion};
use gradlet_tensor::Tensor;

const SIZES: [(usize, &str); 3] = [(16, "small"), (64, "medium"), (128, "large")];

pub fn basic(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("matmul/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(50);

    for (n, label) in SIZES {
        let a = Tensor::rand(&[n, n]).unwrap();
        let b = Tensor::rand(&[n, n]).unwrap();
        group.bench_function(format!("mm/{}", label), |bencher| {
            bencher.iter(|| black_box(a.mm(&b)).unwrap())
        });
    }

    group.finish();
}
