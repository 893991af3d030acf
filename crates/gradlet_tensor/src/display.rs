use crate::Tensor;
use std::fmt;

fn display_tensor_data(f: &mut fmt::Formatter<'_>, data: &[f64], shape: &[usize]) -> fmt::Result {
    match shape.len() {
        0 => write!(f, "{:.4}", data[0]),
        1 => {
            write!(f, "[")?;
            for (i, val) in data.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?
                }
                write!(f, "{:.4}", val)?;
            }
            write!(f, "]")
        }
        _ => {
            let sub_size = data.len() / shape[0];
            write!(f, "[")?;
            for (i, chunk) in data.chunks(sub_size).enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                display_tensor_data(f, chunk, &shape[1..])?;
            }
            write!(f, "]")
        }
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_tensor_data(f, self.data(), self.shape())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor(shape={:?}, data=", self.shape())?;
        display_tensor_data(f, self.data(), self.shape())?;
        write!(f, ", requires_grad={}", self.requires_grad())?;
        if let Some(info) = self.grad_fn() {
            write!(f, ", grad_fn={}", info.op_name)?;
        }
        write!(f, ")")
    }
}
