use crate::{adapter::TensorAdapter, Tensor};
use gradlet_core::{
    error::{Error, Result},
    layout::Layout,
};
use gradlet_cpu::ops::unary::fill;
use rand_distr::{Distribution, Uniform};
use std::f64::consts::PI;

impl Tensor {
    pub fn new<T>(data: T) -> Result<Self>
    where
        T: TensorAdapter,
    {
        Self::new_with_spec(data, false)
    }

    pub fn new_with_spec<T>(data: T, requires_grad: bool) -> Result<Self>
    where
        T: TensorAdapter,
    {
        let (shape, data) = data.flatten()?;
        Self::from_flatten_vec_with_spec(data, &shape, requires_grad)
    }

    pub fn from_flatten_vec(data: Vec<f64>, shape: &[usize]) -> Result<Self> {
        Self::from_flatten_vec_with_spec(data, shape, false)
    }

    pub fn from_flatten_vec_with_spec(data: Vec<f64>, shape: &[usize], requires_grad: bool) -> Result<Self> {
        let layout = Layout::try_from_shape(shape)?;
        if data.len() != layout.size() {
            return Err(Error::ShapeMismatch {
                expected: layout.size(),
                got: data.len(),
                msg: format!("data length does not match shape {:?}", shape),
            });
        }

        Ok(Self::from_parts(data, layout, requires_grad))
    }

    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::zeros_with_spec(shape, false)
    }

    pub fn zeros_with_spec(shape: &[usize], requires_grad: bool) -> Result<Self> {
        Self::full_with_spec(shape, 0.0, requires_grad)
    }

    pub fn zeros_like(src: &Tensor) -> Result<Self> {
        Self::zeros_with_spec(src.shape(), false)
    }

    pub fn zeros_like_with_spec(src: &Tensor, requires_grad: bool) -> Result<Self> {
        Self::zeros_with_spec(src.shape(), requires_grad)
    }

    pub fn ones(shape: &[usize]) -> Result<Self> {
        Self::ones_with_spec(shape, false)
    }

    pub fn ones_with_spec(shape: &[usize], requires_grad: bool) -> Result<Self> {
        Self::full_with_spec(shape, 1.0, requires_grad)
    }

    pub fn ones_like(src: &Tensor) -> Result<Self> {
        Self::ones_with_spec(src.shape(), false)
    }

    pub fn ones_like_with_spec(src: &Tensor, requires_grad: bool) -> Result<Self> {
        Self::ones_with_spec(src.shape(), requires_grad)
    }

    pub fn full(shape: &[usize], value: f64) -> Result<Self> {
        Self::full_with_spec(shape, value, false)
    }

    pub fn full_like(src: &Tensor, value: f64) -> Result<Self> {
        Self::full_with_spec(src.shape(), value, false)
    }

    pub fn full_with_spec(shape: &[usize], value: f64, requires_grad: bool) -> Result<Self> {
        let layout = Layout::try_from_shape(shape)?;
        let mut data = vec![0.0; layout.size()];
        fill(&mut data, value);

        Ok(Self::from_parts(data, layout, requires_grad))
    }

    /// Samples uniformly from `[0, 1)`.
    pub fn rand(shape: &[usize]) -> Result<Self> {
        Self::rand_with_spec(shape, false)
    }

    pub fn rand_with_spec(shape: &[usize], requires_grad: bool) -> Result<Self> {
        let layout = Layout::try_from_shape(shape)?;
        let data = uniform_samples(layout.size());

        Ok(Self::from_parts(data, layout, requires_grad))
    }

    /// Samples from the standard normal distribution.
    pub fn randn(shape: &[usize]) -> Result<Self> {
        Self::randn_with_spec(shape, false)
    }

    pub fn randn_with_spec(shape: &[usize], requires_grad: bool) -> Result<Self> {
        Self::normal_with_spec(shape, 0.0, 1.0, requires_grad)
    }

    pub fn normal(shape: &[usize], mean: f64, std: f64) -> Result<Self> {
        Self::normal_with_spec(shape, mean, std, false)
    }

    /// Box–Muller transform over pairs of uniform samples in `[0, 1)`.
    pub fn normal_with_spec(shape: &[usize], mean: f64, std: f64, requires_grad: bool) -> Result<Self> {
        if !std.is_finite() || std < 0.0 || !mean.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "normal distribution needs a finite mean and a finite non-negative std, got mean={} std={}",
                mean, std
            )));
        }

        let layout = Layout::try_from_shape(shape)?;
        let u1 = uniform_samples(layout.size());
        let u2 = uniform_samples(layout.size());
        let data = u1
            .into_iter()
            .zip(u2)
            .map(|(a, b)| {
                // 1 - a lies in (0, 1], keeping ln finite
                let z = (-2.0 * (1.0 - a).ln()).sqrt() * (2.0 * PI * b).cos();
                mean + std * z
            })
            .collect();

        Ok(Self::from_parts(data, layout, requires_grad))
    }

    /// `steps` evenly spaced values over the inclusive interval
    /// `[start, end]`. A single step yields `start`.
    pub fn linspace(start: f64, end: f64, steps: usize) -> Result<Self> {
        Self::linspace_with_spec(start, end, steps, false)
    }

    pub fn linspace_with_spec(start: f64, end: f64, steps: usize, requires_grad: bool) -> Result<Self> {
        let data = match steps {
            0 => return Err(Error::InvalidArgument("linspace requires at least one step".into())),
            1 => vec![start],
            _ => {
                // the upper half counts back from `end` so both bounds are exact
                let step = (end - start) / (steps - 1) as f64;
                let half = steps / 2;
                (0..steps)
                    .map(|i| {
                        if i < half {
                            start + i as f64 * step
                        } else {
                            end - (steps - 1 - i) as f64 * step
                        }
                    })
                    .collect()
            }
        };

        Ok(Self::from_parts(data, Layout::from_shape(&[steps]), requires_grad))
    }
}

fn uniform_samples(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    let uniform = Uniform::new(0.0, 1.0);
    (0..n).map(|_| uniform.sample(&mut rng)).collect()
}
