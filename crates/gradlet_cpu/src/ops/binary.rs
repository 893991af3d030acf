use crate::utils::{compute_factors, compute_offset, is_contiguous};
use rayon::prelude::*;

/// Applies `op` element by element over `dims`.
///
/// `lhs` and `rhs` are read through their own strides, so a zero stride
/// repeats an element along that dimension (broadcasting). `out` is written
/// contiguously and must hold `dims.iter().product()` elements.
pub fn binary_map<F>(
    dims: &[usize],
    lhs: &[f64],
    lhs_strides: &[usize],
    rhs: &[f64],
    rhs_strides: &[usize],
    out: &mut [f64],
    op: F,
) where
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    let lhs_cont = is_contiguous(dims, lhs_strides) && lhs.len() == out.len();
    let rhs_cont = is_contiguous(dims, rhs_strides) && rhs.len() == out.len();

    if lhs_cont && rhs_cont {
        out.par_iter_mut()
            .zip(lhs.par_iter().zip(rhs.par_iter()))
            .for_each(|(o, (&a, &b))| *o = op(a, b));
        return;
    }

    let factors = compute_factors(dims);
    out.par_iter_mut().enumerate().for_each(|(i, o)| {
        let lhs_idx = if lhs_cont { i } else { compute_offset(i, &factors, lhs_strides) };
        let rhs_idx = if rhs_cont { i } else { compute_offset(i, &factors, rhs_strides) };
        *o = op(lhs[lhs_idx], rhs[rhs_idx]);
    });
}

macro_rules! binary_op {
    ($name:ident, $op:expr) => {
        pub fn $name(
            dims: &[usize],
            lhs: &[f64],
            lhs_strides: &[usize],
            rhs: &[f64],
            rhs_strides: &[usize],
            out: &mut [f64],
        ) {
            binary_map(dims, lhs, lhs_strides, rhs, rhs_strides, out, $op)
        }

        paste::paste! {
            /// Same-shape variant without stride bookkeeping.
            pub fn [<$name _contiguous>](lhs: &[f64], rhs: &[f64], out: &mut [f64]) {
                let op = $op;
                out.par_iter_mut()
                    .zip(lhs.par_iter().zip(rhs.par_iter()))
                    .for_each(|(o, (&a, &b))| *o = op(a, b));
            }
        }
    };
}

binary_op!(add, |a: f64, b: f64| a + b);
binary_op!(sub, |a: f64, b: f64| a - b);
binary_op!(mul, |a: f64, b: f64| a * b);
binary_op!(div, |a: f64, b: f64| a / b);
binary_op!(pow, |a: f64, b: f64| a.powf(b));
