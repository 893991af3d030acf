use crate::error::{Error, Result};

/// Shape and row-major strides of a contiguous tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl Layout {
    pub fn from_shape(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: Self::compute_strides(shape),
        }
    }

    /// Like [`from_shape`](Self::from_shape), but rejects zero-extent dimensions.
    pub fn try_from_shape(shape: &[usize]) -> Result<Self> {
        Self::validate_shape(shape)?;
        Ok(Self::from_shape(shape))
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
    pub fn dim_size(&self, dim: usize) -> Option<usize> {
        self.shape.get(dim).copied()
    }
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn view(&mut self, new_shape: &[usize]) -> Result<()> {
        Self::validate_shape(new_shape)?;

        let old_size = self.size();
        let new_size = Self::compute_size(new_shape);

        if old_size != new_size {
            return Err(Error::ShapeMismatch {
                expected: old_size,
                got: new_size,
                msg: format!("cannot view shape {:?} as {:?}", self.shape, new_shape),
            });
        }

        self.shape = new_shape.to_vec();
        self.strides = Self::compute_strides(new_shape);

        Ok(())
    }

    // helper

    pub fn validate_shape(shape: &[usize]) -> Result<()> {
        if let Some(dim) = shape.iter().position(|&d| d == 0) {
            return Err(Error::InvalidShape {
                message: format!("dimension {} of shape {:?} has zero extent", dim, shape),
            });
        }
        Ok(())
    }

    pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
        // Handle scalar case (empty shape)
        if shape.is_empty() {
            return vec![];
        }

        let mut strides = vec![1; shape.len()];
        for i in (0..shape.len() - 1).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    pub fn compute_size(shape: &[usize]) -> usize {
        shape.iter().product()
    }

    /// Strides that read this layout as if it had `target` shape, with zero
    /// strides along broadcast dimensions.
    pub fn broadcast_strides(&self, target: &[usize]) -> Result<Vec<usize>> {
        if target.len() < self.ndim() {
            return Err(Error::InvalidShape {
                message: format!("cannot broadcast {:?} to lower rank shape {:?}", self.shape, target),
            });
        }

        let rank_diff = target.len() - self.ndim();
        let mut strides = vec![0; target.len()];
        for (i, (&dim, &stride)) in self.shape.iter().zip(self.strides.iter()).enumerate() {
            let target_dim = target[rank_diff + i];
            if dim == target_dim {
                strides[rank_diff + i] = stride;
            } else if dim != 1 {
                return Err(Error::InvalidShape {
                    message: format!("cannot broadcast {:?} to {:?} at dimension {}", self.shape, target, i),
                });
            }
        }

        Ok(strides)
    }
}
