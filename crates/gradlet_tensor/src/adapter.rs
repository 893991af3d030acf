use gradlet_core::{
    error::{Error, Result},
    layout::Layout,
};

/// Numeric data nested to an arbitrary depth, as read back from a literal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "persist", derive(serde::Serialize, serde::Deserialize), serde(untagged))]
pub enum NestedData {
    Number(f64),
    List(Vec<NestedData>),
}

/// Collects a nested literal into a shape and row-major data.
///
/// The first path to a scalar fixes the rank. Every later list must match the
/// recorded extent at its depth and every scalar must sit at the same depth.
#[derive(Debug, Default)]
pub struct Flattener {
    shape: Vec<usize>,
    leaf_depth: Option<usize>,
    data: Vec<f64>,
}

impl Flattener {
    pub fn enter_list(&mut self, depth: usize, len: usize) -> Result<()> {
        if let Some(&extent) = self.shape.get(depth) {
            if extent != len {
                return Err(Error::InvalidShape {
                    message: format!(
                        "ragged nested data: expected {} elements at depth {}, got {}",
                        extent, depth, len
                    ),
                });
            }
            return Ok(());
        }

        if self.leaf_depth.is_some() {
            return Err(Error::InvalidShape {
                message: format!("nested data mixes numbers and lists at depth {}", depth),
            });
        }
        self.shape.push(len);
        Ok(())
    }

    pub fn push_scalar(&mut self, depth: usize, value: f64) -> Result<()> {
        match self.leaf_depth {
            None if depth == self.shape.len() => self.leaf_depth = Some(depth),
            Some(d) if d == depth => {}
            _ => {
                return Err(Error::InvalidShape {
                    message: format!("nested data mixes numbers and lists at depth {}", depth),
                })
            }
        }
        self.data.push(value);
        Ok(())
    }

    pub fn finish(self) -> Result<(Vec<usize>, Vec<f64>)> {
        Layout::validate_shape(&self.shape)?;
        Ok((self.shape, self.data))
    }
}

pub trait TensorAdapter: Sized {
    fn flatten_into(self, flattener: &mut Flattener, depth: usize) -> Result<()>;

    /// Returns the inferred shape and the row-major data.
    fn flatten(self) -> Result<(Vec<usize>, Vec<f64>)> {
        let mut flattener = Flattener::default();
        self.flatten_into(&mut flattener, 0)?;
        flattener.finish()
    }
}

macro_rules! impl_scalar_adapter {
    ($($t:ty),* $(,)?) => {
        $(
            impl TensorAdapter for $t {
                fn flatten_into(self, flattener: &mut Flattener, depth: usize) -> Result<()> {
                    flattener.push_scalar(depth, self as f64)
                }
            }
        )*
    };
}

impl_scalar_adapter!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl TensorAdapter for bool {
    fn flatten_into(self, flattener: &mut Flattener, depth: usize) -> Result<()> {
        flattener.push_scalar(depth, if self { 1.0 } else { 0.0 })
    }
}

impl<T: TensorAdapter> TensorAdapter for Vec<T> {
    fn flatten_into(self, flattener: &mut Flattener, depth: usize) -> Result<()> {
        flattener.enter_list(depth, self.len())?;
        for item in self {
            item.flatten_into(flattener, depth + 1)?;
        }
        Ok(())
    }
}

impl<T: TensorAdapter, const N: usize> TensorAdapter for [T; N] {
    fn flatten_into(self, flattener: &mut Flattener, depth: usize) -> Result<()> {
        flattener.enter_list(depth, N)?;
        for item in self {
            item.flatten_into(flattener, depth + 1)?;
        }
        Ok(())
    }
}

impl<T: TensorAdapter + Clone> TensorAdapter for &[T] {
    fn flatten_into(self, flattener: &mut Flattener, depth: usize) -> Result<()> {
        flattener.enter_list(depth, self.len())?;
        for item in self {
            item.clone().flatten_into(flattener, depth + 1)?;
        }
        Ok(())
    }
}

impl TensorAdapter for NestedData {
    fn flatten_into(self, flattener: &mut Flattener, depth: usize) -> Result<()> {
        match self {
            NestedData::Number(value) => flattener.push_scalar(depth, value),
            NestedData::List(items) => items.flatten_into(flattener, depth),
        }
    }
}
