//! Benchmark harness for the gradlet workspace. See `benches/`.
