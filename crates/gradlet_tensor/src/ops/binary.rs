use crate::{
    autograd::{apply, Forward, Function},
    operand::Operand,
    ops::saved_at,
    utils::broadcast::compute_broadcast_shape,
    Tensor,
};
use gradlet_core::{error::Result, layout::Layout};
use gradlet_cpu::ops::binary;

/// A strided kernel paired with its same-shape fast path.
#[derive(Clone, Copy)]
pub(crate) struct BinaryKernel {
    strided: fn(&[usize], &[f64], &[usize], &[f64], &[usize], &mut [f64]),
    contiguous: fn(&[f64], &[f64], &mut [f64]),
}

pub(crate) const ADD: BinaryKernel = BinaryKernel {
    strided: binary::add,
    contiguous: binary::add_contiguous,
};
pub(crate) const SUB: BinaryKernel = BinaryKernel {
    strided: binary::sub,
    contiguous: binary::sub_contiguous,
};
pub(crate) const MUL: BinaryKernel = BinaryKernel {
    strided: binary::mul,
    contiguous: binary::mul_contiguous,
};
pub(crate) const DIV: BinaryKernel = BinaryKernel {
    strided: binary::div,
    contiguous: binary::div_contiguous,
};
pub(crate) const POW: BinaryKernel = BinaryKernel {
    strided: binary::pow,
    contiguous: binary::pow_contiguous,
};

/// Broadcasts `lhs` against `rhs` and runs `kernel` over the result shape.
/// Operands of identical shape skip the stride computation.
pub(crate) fn broadcast_binary(
    lhs: (&[f64], &[usize]),
    rhs: (&[f64], &[usize]),
    kernel: BinaryKernel,
) -> Result<Forward> {
    let (lhs_data, lhs_shape) = lhs;
    let (rhs_data, rhs_shape) = rhs;

    if lhs_shape == rhs_shape {
        let mut out = vec![0.0; Layout::compute_size(lhs_shape)];
        (kernel.contiguous)(lhs_data, rhs_data, &mut out);
        return Forward::new(out, lhs_shape);
    }

    let shape = compute_broadcast_shape(lhs_shape, rhs_shape)?;
    let lhs_strides = Layout::from_shape(lhs_shape).broadcast_strides(&shape)?;
    let rhs_strides = Layout::from_shape(rhs_shape).broadcast_strides(&shape)?;

    let mut out = vec![0.0; Layout::compute_size(&shape)];
    (kernel.strided)(&shape, lhs_data, &lhs_strides, rhs_data, &rhs_strides, &mut out);

    Forward::new(out, &shape)
}

/// What a binary op remembers about its operands between forward and
/// backward. A number on the right has no shape and is kept by value.
#[derive(Default)]
pub(crate) struct BinaryOperands {
    lhs_shape: Vec<usize>,
    rhs_shape: Option<Vec<usize>>,
    rhs_number: Option<f64>,
}

impl BinaryOperands {
    fn record(&mut self, inputs: &[Operand]) {
        self.lhs_shape = inputs[0].shape().to_vec();
        match &inputs[1] {
            Operand::Tensor(t) => self.rhs_shape = Some(t.shape().to_vec()),
            Operand::Number(n) => self.rhs_number = Some(*n),
        }
    }

    fn forward(&mut self, inputs: &[Operand], kernel: BinaryKernel) -> Result<Forward> {
        self.record(inputs);
        broadcast_binary(
            (inputs[0].data(), inputs[0].shape()),
            (inputs[1].data(), inputs[1].shape()),
            kernel,
        )
    }

    fn rhs(&self, op: &'static str, saved: &[Option<Tensor>]) -> Result<Operand> {
        match self.rhs_number {
            Some(n) => Ok(Operand::Number(n)),
            None => Ok(Operand::Tensor(saved_at(op, saved, 1)?.clone())),
        }
    }

    fn lhs_grad(&self, grad: Tensor) -> Result<Option<Tensor>> {
        grad.sum_to_shape(&self.lhs_shape).map(Some)
    }

    /// Reduces `grad` to the right operand's shape, or drops it for a number.
    fn rhs_grad<F>(&self, grad: F) -> Result<Option<Tensor>>
    where
        F: FnOnce() -> Result<Tensor>,
    {
        match &self.rhs_shape {
            Some(shape) => grad()?.sum_to_shape(shape).map(Some),
            None => Ok(None),
        }
    }
}

macro_rules! binary_function {
    ($ty:ident, $name:literal, $kernel:expr, saved: [$($pos:literal),*]) => {
        #[derive(Default)]
        pub(crate) struct $ty {
            operands: BinaryOperands,
        }

        impl $ty {
            const NAME: &'static str = $name;
        }

        impl Function for $ty {
            fn name(&self) -> &'static str {
                Self::NAME
            }

            fn arity(&self) -> usize {
                2
            }

            fn accepts_number(&self, position: usize) -> bool {
                position == 1
            }

            fn saved_positions(&self) -> &'static [usize] {
                &[$($pos),*]
            }

            fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
                self.operands.forward(inputs, $kernel)
            }

            fn backward(&self, saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
                self.gradients(saved, grad_output)
            }
        }
    };
}

binary_function!(Add, "add", ADD, saved: []);
binary_function!(Sub, "sub", SUB, saved: []);
binary_function!(Mul, "mul", MUL, saved: [0, 1]);
binary_function!(Div, "div", DIV, saved: [0, 1]);
binary_function!(Pow, "pow", POW, saved: [0, 1]);

impl Add {
    fn gradients(&self, _saved: &[Option<Tensor>], g: &Tensor) -> Result<Vec<Option<Tensor>>> {
        Ok(vec![
            self.operands.lhs_grad(g.clone())?,
            self.operands.rhs_grad(|| Ok(g.clone()))?,
        ])
    }
}

impl Sub {
    fn gradients(&self, _saved: &[Option<Tensor>], g: &Tensor) -> Result<Vec<Option<Tensor>>> {
        Ok(vec![self.operands.lhs_grad(g.clone())?, self.operands.rhs_grad(|| g.neg())?])
    }
}

impl Mul {
    fn gradients(&self, saved: &[Option<Tensor>], g: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let lhs = saved_at(Self::NAME, saved, 0)?;
        let rhs = self.operands.rhs(Self::NAME, saved)?;

        Ok(vec![
            self.operands.lhs_grad(g.mul(rhs)?)?,
            self.operands.rhs_grad(|| g.mul(lhs))?,
        ])
    }
}

impl Div {
    fn gradients(&self, saved: &[Option<Tensor>], g: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let lhs = saved_at(Self::NAME, saved, 0)?;
        let rhs = self.operands.rhs(Self::NAME, saved)?;

        // d(l/r)/dr = -l / r^2
        Ok(vec![
            self.operands.lhs_grad(g.div(rhs)?)?,
            self.operands.rhs_grad(|| {
                let rhs = saved_at(Self::NAME, saved, 1)?;
                g.mul(lhs)?.div(rhs.mul(rhs)?)?.neg()
            })?,
        ])
    }
}

impl Pow {
    fn gradients(&self, saved: &[Option<Tensor>], g: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let base = saved_at(Self::NAME, saved, 0)?;
        let exponent = self.operands.rhs(Self::NAME, saved)?;

        // d(b^e)/db = e * b^(e - 1)
        let exponent_minus_one = match &exponent {
            Operand::Number(n) => Operand::Number(n - 1.0),
            Operand::Tensor(t) => Operand::Tensor(t.sub(1.0)?),
        };
        let grad_base = g.mul(base.pow(exponent_minus_one)?)?.mul(exponent.clone())?;

        // d(b^e)/de = b^e * ln(b)
        Ok(vec![
            self.operands.lhs_grad(grad_base)?,
            self.operands.rhs_grad(|| g.mul(base.pow(exponent)?)?.mul(base.log()?))?,
        ])
    }
}

macro_rules! binary_method {
    ($($name:ident => $ty:ident),* $(,)?) => {
        impl Tensor {
            $(
                pub fn $name(&self, rhs: impl Into<Operand>) -> Result<Tensor> {
                    apply($ty::default(), &[Operand::from(self), rhs.into()])
                }
            )*
        }
    };
}

binary_method! {
    add => Add,
    sub => Sub,
    mul => Mul,
    div => Div,
    pow => Pow,
}
