use rayon::prelude::*;

/// `out[m, n] = lhs[m, k] @ rhs[k, n]`, all row-major and contiguous.
pub fn matmul(lhs: &[f64], rhs: &[f64], m: usize, k: usize, n: usize, out: &mut [f64]) {
    debug_assert_eq!(lhs.len(), m * k);
    debug_assert_eq!(rhs.len(), k * n);
    debug_assert_eq!(out.len(), m * n);

    out.par_chunks_mut(n.max(1)).enumerate().for_each(|(row, out_row)| {
        out_row.iter_mut().for_each(|o| *o = 0.0);
        let lhs_row = &lhs[row * k..(row + 1) * k];
        for (p, &a) in lhs_row.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            let rhs_row = &rhs[p * n..(p + 1) * n];
            for (o, &b) in out_row.iter_mut().zip(rhs_row.iter()) {
                *o += a * b;
            }
        }
    });
}

/// Transposes a `rows x cols` matrix into `out` (`cols x rows`).
pub fn transpose(input: &[f64], rows: usize, cols: usize, out: &mut [f64]) {
    debug_assert_eq!(input.len(), rows * cols);
    debug_assert_eq!(out.len(), rows * cols);

    out.par_chunks_mut(rows.max(1)).enumerate().for_each(|(c, out_row)| {
        for (r, o) in out_row.iter_mut().enumerate() {
            *o = input[r * cols + c];
        }
    });
}
