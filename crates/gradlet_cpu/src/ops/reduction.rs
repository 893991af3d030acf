use crate::utils::compute_factors;
use rayon::prelude::*;

pub fn sum(input: &[f64]) -> f64 {
    input.par_iter().sum()
}

/// Largest element, or `None` for an empty slice. NaN propagates.
pub fn max(input: &[f64]) -> Option<f64> {
    input.par_iter().copied().reduce_with(|a, b| if a.is_nan() || a >= b { a } else { b })
}

/// Sums `input` (shape `dims`) down to `target`, the shape it was broadcast
/// from. `target` may have lower rank; missing leading dimensions and
/// dimensions of extent 1 are reduced.
pub fn sum_to_shape(input: &[f64], dims: &[usize], target: &[usize]) -> Vec<f64> {
    let target_size: usize = target.iter().product();
    if dims == target {
        return input.to_vec();
    }

    let rank_diff = dims.len() - target.len();
    // Output strides aligned to `dims`; reduced dimensions read stride 0.
    let mut target_strides = vec![0; dims.len()];
    let mut acc = 1;
    for d in (0..target.len()).rev() {
        if target[d] != 1 {
            target_strides[rank_diff + d] = acc;
        }
        acc *= target[d];
    }

    let factors = compute_factors(dims);
    let mut out = vec![0.0; target_size];
    for (i, &value) in input.iter().enumerate() {
        let mut rem = i;
        let mut offset = 0;
        for (factor, stride) in factors.iter().zip(target_strides.iter()) {
            offset += (rem / factor) * stride;
            rem %= factor;
        }
        out[offset] += value;
    }
    out
}
