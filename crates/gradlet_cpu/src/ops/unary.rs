use rayon::prelude::*;

pub fn unary_map<F>(input: &[f64], out: &mut [f64], op: F)
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    out.par_iter_mut().zip(input.par_iter()).for_each(|(o, &x)| *o = op(x));
}

macro_rules! unary_op {
    ($($name:ident => $op:expr),* $(,)?) => {
        $(
            pub fn $name(input: &[f64], out: &mut [f64]) {
                unary_map(input, out, $op)
            }
        )*
    };
}

unary_op! {
    sqrt => f64::sqrt,
    exp => f64::exp,
    log => f64::ln,
    neg => |x: f64| -x,
}

pub fn fill(out: &mut [f64], value: f64) {
    out.par_iter_mut().for_each(|o| *o = value);
}
