/// `factors[d]` is the number of output elements spanned by one step along `d`.
#[inline(always)]
pub fn compute_factors(dims: &[usize]) -> Vec<usize> {
    let num_dims = dims.len();
    let mut factors = vec![1; num_dims];
    for d in (0..num_dims).rev() {
        if d + 1 < num_dims {
            factors[d] = factors[d + 1] * dims[d + 1];
        }
    }
    factors
}

/// Maps a flat output index to an input offset through `strides`.
#[inline(always)]
pub fn compute_offset(i: usize, factors: &[usize], strides: &[usize]) -> usize {
    let mut offset = 0;
    let mut rem = i;
    for (factor, stride) in factors.iter().zip(strides.iter()) {
        let digit = rem / factor;
        offset += digit * stride;
        rem %= factor;
    }
    offset
}

#[inline(always)]
pub fn is_contiguous(dims: &[usize], strides: &[usize]) -> bool {
    let mut acc = 1;
    for d in (0..dims.len()).rev() {
        if dims[d] != 1 && strides[d] != acc {
            return false;
        }
        acc *= dims[d];
    }
    true
}
