use gradlet_cpu::ops::{binary, matmul, reduction, unary};

#[test]
fn add_contiguous() {
    let mut out = vec![0.0; 3];
    binary::add(&[3], &[1.0, 2.0, 3.0], &[1], &[10.0, 20.0, 30.0], &[1], &mut out);

    assert_eq!(out, vec![11.0, 22.0, 33.0]);
}

#[test]
fn mul_broadcast_row() {
    // [2, 3] * [3]
    let mut out = vec![0.0; 6];
    binary::mul(
        &[2, 3],
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        &[3, 1],
        &[1.0, 10.0, 100.0],
        &[0, 1],
        &mut out,
    );

    assert_eq!(out, vec![1.0, 20.0, 300.0, 4.0, 50.0, 600.0]);
}

#[test]
fn sub_scalar_rhs() {
    let mut out = vec![0.0; 4];
    binary::sub(&[2, 2], &[5.0, 6.0, 7.0, 8.0], &[2, 1], &[1.0], &[0, 0], &mut out);

    assert_eq!(out, vec![4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn pow_contiguous() {
    let mut out = vec![0.0; 3];
    binary::pow_contiguous(&[2.0, 3.0, 4.0], &[2.0, 2.0, 0.5], &mut out);

    assert_eq!(out, vec![4.0, 9.0, 2.0]);
}

#[test]
fn unary_ops() {
    let mut out = vec![0.0; 3];
    unary::sqrt(&[1.0, 4.0, 9.0], &mut out);
    assert_eq!(out, vec![1.0, 2.0, 3.0]);

    unary::neg(&[1.0, -4.0, 0.0], &mut out);
    assert_eq!(out, vec![-1.0, 4.0, -0.0]);
}

#[test]
fn matmul_2x3_3x2() {
    let lhs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let rhs = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
    let mut out = vec![0.0; 4];
    matmul::matmul(&lhs, &rhs, 2, 3, 2, &mut out);

    assert_eq!(out, vec![58.0, 64.0, 139.0, 154.0]);
}

#[test]
fn transpose_2x3() {
    let mut out = vec![0.0; 6];
    matmul::transpose(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3, &mut out);

    assert_eq!(out, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn reductions() {
    assert_eq!(reduction::sum(&[1.0, 2.0, 3.5]), 6.5);
    assert_eq!(reduction::max(&[1.0, 7.0, 3.5]), Some(7.0));
    assert_eq!(reduction::max(&[]), None);
}

#[test]
fn sum_to_shape() {
    let input = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

    assert_eq!(reduction::sum_to_shape(&input, &[2, 3], &[3]), vec![5.0, 7.0, 9.0]);
    assert_eq!(reduction::sum_to_shape(&input, &[2, 3], &[2, 1]), vec![6.0, 15.0]);
    assert_eq!(reduction::sum_to_shape(&input, &[2, 3], &[]), vec![21.0]);
    assert_eq!(reduction::sum_to_shape(&input, &[2, 3], &[2, 3]), input.to_vec());
}
