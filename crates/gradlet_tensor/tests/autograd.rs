mod utils;

use gradlet_core::{
    context::{enter_task, with_task, TaskId},
    error::{Error, Result},
};
use gradlet_tensor::{
    apply, is_grad_enabled, no_grad, no_grad_mode, Forward, Function, Operand, Tensor,
};
use std::panic::{self, AssertUnwindSafe};
use utils::{assert_close, grad_of, setup_grad_tensor, setup_tensor};

#[test]
fn tracked_output_has_graph_node() -> Result<()> {
    let a = setup_grad_tensor(vec![1.0, 2.0])?;
    let b = setup_tensor(vec![3.0, 4.0])?;

    let c = a.mul(&b)?;
    assert!(c.requires_grad());
    assert!(!c.is_leaf());

    let info = c.grad_fn().expect("tracked output should expose its node");
    assert_eq!(info.op_name, "mul");
    assert_eq!(info.inputs, vec![Some(a.id()), Some(b.id())]);
    assert_eq!(info.saved, vec![a.id(), b.id()]);
    assert_eq!(info.grad_inputs, vec![a.id()]);

    Ok(())
}

#[test]
fn untracked_when_no_input_requires_grad() -> Result<()> {
    let a = setup_tensor(vec![1.0, 2.0])?;
    let c = a.add(&a)?;
    assert!(!c.requires_grad());
    assert!(c.is_leaf());
    Ok(())
}

#[test]
fn nodes_save_only_what_backward_reads() -> Result<()> {
    let a = setup_grad_tensor(vec![4.0, 9.0])?;
    let b = setup_grad_tensor(vec![1.0, 2.0])?;

    assert!(a.add(&b)?.grad_fn().map(|n| n.saved).unwrap_or_default().is_empty());
    assert!(a.sub(&b)?.grad_fn().map(|n| n.saved).unwrap_or_default().is_empty());
    assert!(a.view(&[2, 1])?.grad_fn().map(|n| n.saved).unwrap_or_default().is_empty());
    assert_eq!(a.sqrt()?.grad_fn().map(|n| n.saved), Some(vec![a.id()]));

    let t1 = setup_grad_tensor(vec![1.0, 1.0])?;
    let fused = a.addcdiv(&t1, &b, 1.0)?;
    assert_eq!(fused.grad_fn().map(|n| n.saved), Some(vec![t1.id(), b.id()]));

    Ok(())
}

#[test]
fn no_grad_produces_leaves() -> Result<()> {
    let a = setup_grad_tensor(vec![1.0, 2.0])?;
    let b = setup_tensor(vec![3.0, 4.0])?;

    let c = no_grad(|| a.mul(&b))?;
    assert!(!c.requires_grad());
    assert!(c.is_leaf());
    assert!(c.grad_fn().is_none());
    assert!(is_grad_enabled());

    let d = a.mul(&b)?;
    assert!(d.requires_grad());

    Ok(())
}

#[test]
fn no_grad_macro_scopes_to_block() -> Result<()> {
    let a = setup_grad_tensor(vec![1.0])?;
    {
        gradlet_tensor::no_grad!();
        assert!(!is_grad_enabled());
        assert!(!a.exp()?.requires_grad());
    }
    assert!(is_grad_enabled());
    assert!(a.exp()?.requires_grad());
    Ok(())
}

#[test]
fn nested_no_grad_keeps_outer_scope() -> Result<()> {
    let a = setup_grad_tensor(vec![1.0])?;
    no_grad(|| -> Result<()> {
        no_grad(|| assert!(!is_grad_enabled()));
        assert!(!is_grad_enabled());
        assert!(!a.neg()?.requires_grad());
        Ok(())
    })?;
    assert!(is_grad_enabled());
    Ok(())
}

#[test]
fn no_grad_is_released_on_error_and_panic() -> Result<()> {
    let a = setup_grad_tensor(vec![1.0, 2.0])?;
    let b = setup_tensor(vec![1.0, 2.0, 3.0])?;

    let failed = no_grad(|| a.add(&b));
    assert!(failed.is_err());
    assert!(is_grad_enabled());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        no_grad(|| panic!("boom"));
    }));
    assert!(outcome.is_err());
    assert!(is_grad_enabled());

    Ok(())
}

#[test]
fn interleaved_tasks_keep_their_own_suppression() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    let quiet = TaskId::new();
    let busy = TaskId::new();

    let guard = with_task(quiet, no_grad_mode);

    for _ in 0..3 {
        let q = with_task(quiet, || x.mul(2.0))?;
        let b = with_task(busy, || x.mul(2.0))?;
        let q2 = {
            let _task = enter_task(quiet);
            x.add(1.0)?
        };

        assert!(!q.requires_grad() && q.is_leaf());
        assert!(!q2.requires_grad());
        assert!(b.requires_grad() && !b.is_leaf());
    }

    // the calling task itself was never suppressed
    assert!(x.mul(2.0)?.requires_grad());

    drop(guard);
    assert!(with_task(quiet, || x.mul(2.0))?.requires_grad());

    Ok(())
}

#[test]
fn suppression_does_not_leak_across_threads() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    let _guard = no_grad_mode();
    assert!(!x.mul(3.0)?.requires_grad());

    let handle = std::thread::spawn(move || x.mul(3.0).map(|y| y.requires_grad()));
    assert!(handle.join().expect("worker panicked")?);
    Ok(())
}

#[test]
fn backward_through_chain() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0, 3.0])?;
    let y = x.mul(&x)?.sum()?;
    y.backward()?;

    assert_close(&grad_of(&x)?, &[2.0, 4.0, 6.0]);
    Ok(())
}

#[test]
fn backward_sums_broadcast_gradients() -> Result<()> {
    let a = setup_grad_tensor(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
    let b = setup_grad_tensor(vec![1.0, 1.0, 1.0])?;
    a.add(&b)?.sum()?.backward()?;

    assert_close(&grad_of(&a)?, &[1.0; 6]);
    assert_close(&grad_of(&b)?, &[2.0, 2.0, 2.0]);
    assert_eq!(b.grad()?.map(|g| g.shape().to_vec()), Some(vec![3]));
    Ok(())
}

#[test]
fn backward_with_number_operand() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0, 3.0])?;
    x.mul(3.0)?.sub(1.0)?.sum()?.backward()?;
    assert_close(&grad_of(&x)?, &[3.0, 3.0, 3.0]);
    Ok(())
}

#[test]
fn div_and_pow_gradients() -> Result<()> {
    let x = setup_grad_tensor(vec![2.0, 4.0])?;
    let y = setup_grad_tensor(vec![1.0, 2.0])?;
    x.div(&y)?.sum()?.backward()?;
    assert_close(&grad_of(&x)?, &[1.0, 0.5]);
    assert_close(&grad_of(&y)?, &[-2.0, -1.0]);

    let base = setup_grad_tensor(vec![2.0, 3.0])?;
    base.pow(2.0)?.sum()?.backward()?;
    assert_close(&grad_of(&base)?, &[4.0, 6.0]);

    let b = setup_grad_tensor(vec![2.0])?;
    let e = setup_grad_tensor(vec![3.0])?;
    b.pow(&e)?.sum()?.backward()?;
    assert_close(&grad_of(&b)?, &[12.0]);
    assert_close(&grad_of(&e)?, &[8.0 * 2f64.ln()]);
    Ok(())
}

#[test]
fn mm_gradients() -> Result<()> {
    let a = setup_grad_tensor(vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0]])?;
    let b = setup_grad_tensor(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])?;
    a.mm(&b)?.sum()?.backward()?;

    assert_close(&grad_of(&a)?, &[3.0, 7.0, 11.0, 3.0, 7.0, 11.0]);
    assert_close(&grad_of(&b)?, &[2.0; 6]);
    Ok(())
}

#[test]
fn unary_gradients() -> Result<()> {
    let x = setup_grad_tensor(vec![4.0, 9.0])?;
    x.sqrt()?.sum()?.backward()?;
    assert_close(&grad_of(&x)?, &[0.25, 1.0 / 6.0]);

    let y = setup_grad_tensor(vec![0.0, 1.0])?;
    y.exp()?.sum()?.backward()?;
    assert_close(&grad_of(&y)?, &[1.0, 1f64.exp()]);

    let z = setup_grad_tensor(vec![2.0, 4.0])?;
    z.log()?.neg()?.sum()?.backward()?;
    assert_close(&grad_of(&z)?, &[-0.5, -0.25]);
    Ok(())
}

#[test]
fn view_gradient_keeps_input_shape() -> Result<()> {
    let x = setup_grad_tensor(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
    x.view(&[3, 2])?.mul(2.0)?.sum()?.backward()?;

    let grad = x.grad()?.expect("gradient");
    assert_eq!(grad.shape(), &[2, 3]);
    assert_close(grad.data(), &[2.0; 6]);
    Ok(())
}

#[test]
fn addcdiv_gradients() -> Result<()> {
    let input = setup_grad_tensor(vec![1.0, 1.0])?;
    let t1 = setup_grad_tensor(vec![2.0, 4.0])?;
    let t2 = setup_grad_tensor(vec![1.0, 2.0])?;
    input.addcdiv(&t1, &t2, 0.5)?.sum()?.backward()?;

    assert_close(&grad_of(&input)?, &[1.0, 1.0]);
    assert_close(&grad_of(&t1)?, &[0.5, 0.25]);
    assert_close(&grad_of(&t2)?, &[-1.0, -0.5]);
    Ok(())
}

#[test]
fn shared_subexpression_accumulates() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    let y = x.mul(2.0)?;
    y.add(&y)?.sum()?.backward()?;
    assert_close(&grad_of(&x)?, &[4.0, 4.0]);
    Ok(())
}

#[test]
fn gradients_accumulate_across_passes() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    x.mul(3.0)?.sum()?.backward()?;
    x.mul(3.0)?.sum()?.backward()?;
    assert_close(&grad_of(&x)?, &[6.0, 6.0]);

    x.zero_grad()?;
    assert_close(&grad_of(&x)?, &[0.0, 0.0]);
    Ok(())
}

#[test]
fn released_graph_cannot_be_walked_twice() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    let y = x.mul(&x)?.sum()?;
    y.backward()?;
    assert!(matches!(y.backward(), Err(Error::InvalidState(_))));
    assert!(y.grad_fn().is_none());
    Ok(())
}

#[test]
fn retained_graph_can_be_walked_again() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    let y = x.mul(&x)?.sum()?;
    let seed = Tensor::ones_like(&y)?;

    y.backward_with(&seed, true)?;
    y.backward_with(&seed, false)?;
    assert_close(&grad_of(&x)?, &[4.0, 8.0]);
    Ok(())
}

#[test]
fn backward_checks_preconditions() -> Result<()> {
    let plain = setup_tensor(vec![1.0])?;
    assert!(matches!(plain.backward(), Err(Error::InvalidState(_))));

    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    let y = x.mul(2.0)?;
    let wrong_seed = Tensor::ones(&[3])?;
    assert!(matches!(y.backward_with(&wrong_seed, true), Err(Error::DimensionMismatch { .. })));
    Ok(())
}

#[test]
fn requires_grad_flag_rules() -> Result<()> {
    let mut x = setup_grad_tensor(vec![1.0])?;
    let mut y = x.mul(2.0)?;
    assert!(matches!(y.set_requires_grad(false), Err(Error::InvalidState(_))));

    x.set_requires_grad(false)?;
    assert!(!x.requires_grad());
    assert!(!x.mul(2.0)?.requires_grad());
    Ok(())
}

#[test]
fn backward_on_leaf_seeds_its_gradient() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    x.backward()?;
    assert_close(&grad_of(&x)?, &[1.0, 1.0]);
    Ok(())
}

/// x^3, written against the public protocol.
struct Cube;

impl Function for Cube {
    fn name(&self) -> &'static str {
        "cube"
    }

    fn arity(&self) -> usize {
        1
    }

    fn saved_positions(&self) -> &'static [usize] {
        &[0]
    }

    fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
        let data = inputs[0].data().iter().map(|v| v * v * v).collect();
        Forward::new(data, inputs[0].shape())
    }

    fn backward(&self, saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let x = saved[0].as_ref().expect("input is saved");
        Ok(vec![Some(grad_output.mul(&x.mul(x)?.mul(3.0)?)?)])
    }
}

#[test]
fn custom_function_plugs_into_graph() -> Result<()> {
    let x = setup_grad_tensor(vec![1.0, 2.0])?;
    let y = apply(Cube, &[Operand::from(&x)])?;
    assert_close(y.data(), &[1.0, 8.0]);
    assert_eq!(y.grad_fn().map(|n| n.op_name), Some("cube"));

    y.sum()?.backward()?;
    assert_close(&grad_of(&x)?, &[3.0, 12.0]);

    let untracked = no_grad(|| apply(Cube, &[Operand::from(&x)]))?;
    assert!(untracked.is_leaf());
    Ok(())
}

#[test]
fn apply_validates_inputs() -> Result<()> {
    let x = setup_tensor(vec![1.0])?;
    assert!(matches!(apply(Cube, &[]), Err(Error::InvalidArgument(_))));
    assert!(matches!(
        apply(Cube, &[Operand::Number(2.0)]),
        Err(Error::TypeMismatch { op: "cube", position: 1, .. })
    ));
    assert!(apply(Cube, &[Operand::from(x)]).is_ok());
    Ok(())
}
