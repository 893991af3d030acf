use crate::{
    autograd::{apply, Forward, Function},
    operand::Operand,
    ops::saved_at,
    Tensor,
};
use gradlet_core::error::Result;
use gradlet_cpu::ops::unary;

fn unary_forward(input: &Operand, kernel: fn(&[f64], &mut [f64])) -> Result<Forward> {
    let mut out = vec![0.0; input.data().len()];
    kernel(input.data(), &mut out);
    Forward::new(out, input.shape())
}

macro_rules! unary_function {
    ($ty:ident, $name:literal, $kernel:path, saved: [$($pos:literal),*], |$saved:ident, $g:ident| $grad:expr) => {
        pub(crate) struct $ty;

        impl Function for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn arity(&self) -> usize {
                1
            }

            fn saved_positions(&self) -> &'static [usize] {
                &[$($pos),*]
            }

            fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
                unary_forward(&inputs[0], $kernel)
            }

            fn backward(&self, $saved: &[Option<Tensor>], $g: &Tensor) -> Result<Vec<Option<Tensor>>> {
                Ok(vec![Some($grad)])
            }
        }
    };
}

// d sqrt(x) = 1 / (2 sqrt(x))
unary_function!(Sqrt, "sqrt", unary::sqrt, saved: [0], |saved, g| {
    let x = saved_at("sqrt", saved, 0)?;
    g.div(x.sqrt()?.mul(2.0)?)?
});
unary_function!(Exp, "exp", unary::exp, saved: [0], |saved, g| {
    let x = saved_at("exp", saved, 0)?;
    g.mul(x.exp()?)?
});
unary_function!(Log, "log", unary::log, saved: [0], |saved, g| {
    let x = saved_at("log", saved, 0)?;
    g.div(x)?
});
unary_function!(Neg, "neg", unary::neg, saved: [], |_saved, g| g.neg()?);

impl Tensor {
    pub fn sqrt(&self) -> Result<Tensor> {
        apply(Sqrt, &[Operand::from(self)])
    }

    pub fn exp(&self) -> Result<Tensor> {
        apply(Exp, &[Operand::from(self)])
    }

    /// Natural logarithm.
    pub fn log(&self) -> Result<Tensor> {
        apply(Log, &[Operand::from(self)])
    }

    pub fn neg(&self) -> Result<Tensor> {
        apply(Neg, &[Operand::from(self)])
    }
}
