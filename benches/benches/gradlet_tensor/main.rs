mod ops;

criterion::criterion_main!(ops::benches);
