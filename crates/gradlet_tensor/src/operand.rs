use crate::Tensor;
use std::slice;

/// An argument at an operation boundary: a tensor or a plain number.
///
/// A number behaves as a rank-0 operand that broadcasts against any shape.
#[derive(Clone, Debug)]
pub enum Operand {
    Tensor(Tensor),
    Number(f64),
}

impl Operand {
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Tensor(_) => "Tensor",
            Operand::Number(_) => "number",
        }
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Operand::Tensor(t) => Some(t),
            Operand::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Tensor(_) => None,
            Operand::Number(n) => Some(*n),
        }
    }

    pub fn requires_grad(&self) -> bool {
        self.as_tensor().is_some_and(Tensor::requires_grad)
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Operand::Tensor(t) => t.shape(),
            Operand::Number(_) => &[],
        }
    }

    pub fn data(&self) -> &[f64] {
        match self {
            Operand::Tensor(t) => t.data(),
            Operand::Number(n) => slice::from_ref(n),
        }
    }
}

impl From<Tensor> for Operand {
    fn from(tensor: Tensor) -> Self {
        Operand::Tensor(tensor)
    }
}

impl From<&Tensor> for Operand {
    fn from(tensor: &Tensor) -> Self {
        Operand::Tensor(tensor.clone())
    }
}

macro_rules! impl_operand_from_number {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Operand {
                fn from(value: $t) -> Self {
                    Operand::Number(value as f64)
                }
            }
        )*
    };
}

impl_operand_from_number!(f64, f32, i32, i64, u32, u64, usize);
