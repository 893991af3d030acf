use gradlet_core::error::{Error, Result};

/// Numpy-style broadcast of two shapes. Rank-0 shapes broadcast against
/// anything.
pub fn compute_broadcast_shape(lhs_shape: &[usize], rhs_shape: &[usize]) -> Result<Vec<usize>> {
    if lhs_shape.is_empty() {
        return Ok(rhs_shape.to_vec());
    }
    if rhs_shape.is_empty() {
        return Ok(lhs_shape.to_vec());
    }

    let max_rank = lhs_shape.len().max(rhs_shape.len());
    let padded_lhs = pad_shape(lhs_shape, max_rank);
    let padded_rhs = pad_shape(rhs_shape, max_rank);

    padded_lhs
        .iter()
        .zip(padded_rhs.iter())
        .enumerate()
        .map(|(i, (&dim1, &dim2))| {
            if dim1 != 1 && dim2 != 1 && dim1 != dim2 {
                return Err(Error::InvalidShape {
                    message: format!("cannot broadcast shapes {:?} and {:?} at dimension {}", lhs_shape, rhs_shape, i),
                });
            }
            Ok(dim1.max(dim2))
        })
        .collect()
}

/// Left-pads `shape` with ones up to `target_rank`.
pub fn pad_shape(shape: &[usize], target_rank: usize) -> Vec<usize> {
    let mut padded = vec![1; target_rank.saturating_sub(shape.len())];
    padded.extend(shape);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_shapes() {
        assert_eq!(compute_broadcast_shape(&[2, 3], &[3]).unwrap(), vec![2, 3]);
        assert_eq!(compute_broadcast_shape(&[4, 1], &[1, 5]).unwrap(), vec![4, 5]);
        assert_eq!(compute_broadcast_shape(&[], &[2, 2]).unwrap(), vec![2, 2]);
        assert!(compute_broadcast_shape(&[2, 3], &[4]).is_err());
    }
}
