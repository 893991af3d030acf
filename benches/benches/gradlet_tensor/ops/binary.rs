use criterion::{black_box, Criterion};
use gradlet_core::error::Result;
use gradlet_tensor::Tensor;

// Constants for benchmark data sizes
const SIZES: [(usize, &str); 3] = [(100, "small"), (5000, "medium"), (10000, "large")];

fn bench_binary_op<F>(b: &mut criterion::Bencher, size: usize, op_fn: F)
where
    F: Fn(&Tensor, &Tensor) -> Result<Tensor>,
{
    let x_data: Vec<f64> = (0..size).map(|i| i as f64).collect();
    let y_data: Vec<f64> = (0..size).map(|i| i as f64 + 1.0).collect();

    b.iter(|| {
        let x = Tensor::new(x_data.clone()).unwrap();
        let y = Tensor::new(y_data.clone()).unwrap();

        black_box(op_fn(&x, &y)).unwrap()
    })
}

pub fn basic(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("binary/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(50);

    for (size, label) in SIZES {
        group.bench_function(format!("add/{}", label), |b| bench_binary_op(b, size, |x, y| x.add(y)));
        group.bench_function(format!("mul/{}", label), |b| bench_binary_op(b, size, |x, y| x.mul(y)));
        group.bench_function(format!("div/{}", label), |b| bench_binary_op(b, size, |x, y| x.div(y)));
        group.bench_function(format!("add_scalar/{}", label), |b| {
            bench_binary_op(b, size, |x, _| x.add(2.0))
        });
    }

    group.finish();
}
