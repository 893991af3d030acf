mod autograd;
mod binary;
mod matmul;

use criterion::criterion_group;

criterion_group!(benches, binary::basic, matmul::basic, autograd::basic);
