use crate::all::*;

use nalgebra::{SMatrix, SVector};

// Poses are 4x4 rigid transforms `[R t; 0 1]` mapping world points into the camera frame.
// Points are homogeneous `Vector4d` so that points at infinity (w = 0) can be projected.

// The order of quaternion entries in a Vector4d is: w, x, y, z.
pub fn to_rotation_matrix(q: Vector4d) -> Matrix3d {
  Matrix3d::new(
    q[0]*q[0] + q[1]*q[1] - q[2]*q[2] - q[3]*q[3], 2.*q[1]*q[2] - 2.*q[0]*q[3], 2.*q[1]*q[3] + 2.*q[0]*q[2],
    2.*q[1]*q[2] + 2.*q[0]*q[3], q[0]*q[0] - q[1]*q[1] + q[2]*q[2] - q[3]*q[3], 2.*q[2]*q[3] - 2.*q[0]*q[1],
    2.*q[1]*q[3] - 2.*q[0]*q[2], 2.*q[2]*q[3] + 2.*q[0]*q[1], q[0]*q[0] - q[1]*q[1] - q[2]*q[2] + q[3]*q[3],
  )
}

pub fn to_pose(R: &Matrix3d, t: &Vector3d) -> Matrix4d {
  let mut T = Matrix4d::identity();
  T.fixed_slice_mut::<3, 3>(0, 0).copy_from(R);
  T.fixed_slice_mut::<3, 1>(0, 3).copy_from(t);
  T
}

pub fn rotation(T: &Matrix4d) -> Matrix3d {
  T.fixed_slice::<3, 3>(0, 0).into_owned()
}

pub fn translation(T: &Matrix4d) -> Vector3d {
  T.fixed_slice::<3, 1>(0, 3).into_owned()
}

pub fn transform_3d(T: &Matrix4d, x: &Vector3d) -> Vector3d {
  T.fixed_slice::<3, 3>(0, 0) * x + T.fixed_slice::<3, 1>(0, 3)
}

// Transform of a homogeneous point, keeping only the xyz part of the result.
pub fn transform_homogeneous(T: &Matrix4d, x: &Vector4d) -> Vector3d {
  T.fixed_slice::<3, 4>(0, 0) * x
}

// Assumes `T` is rigid, which avoids a general 4x4 inversion.
pub fn inverse_rigid(T: &Matrix4d) -> Matrix4d {
  let Rt = rotation(T).transpose();
  let t = translation(T);
  to_pose(&Rt, &(-Rt * t))
}

// Derivative of `A * b` wrt the entries of `A` (M x N) stacked column-major.
// Entry `A[(i, j)]` is column `j * M + i` of the result. `MN` must equal `M * N`.
pub fn jacobian_ab_wrt_a<const M: usize, const N: usize, const MN: usize>(
  b: &SVector<f64, N>,
) -> SMatrix<f64, M, MN> {
  debug_assert_eq!(MN, M * N);
  let mut J = SMatrix::<f64, M, MN>::zeros();
  for j in 0..N {
    for i in 0..M {
      J[(i, j * M + i)] = b[j];
    }
  }
  J
}
