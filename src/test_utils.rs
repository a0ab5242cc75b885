// Helpers shared by the unit tests of the camera models.

use crate::all::*;

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub fn seeded_rng() -> Xoshiro256PlusPlus {
  Xoshiro256PlusPlus::seed_from_u64(0x5eed)
}

pub fn random_pose(rng: &mut Xoshiro256PlusPlus) -> Matrix4d {
  let q = Vector4d::new(
    1.,
    rng.gen_range(-0.3..0.3),
    rng.gen_range(-0.3..0.3),
    rng.gen_range(-0.3..0.3),
  ).normalize();
  let t = Vector3d::new(
    rng.gen_range(-1.0..1.0),
    rng.gen_range(-1.0..1.0),
    rng.gen_range(-1.0..1.0),
  );
  to_pose(&to_rotation_matrix(q), &t)
}

// Homogeneous world point whose camera frame coordinates lie well inside a ~90 degree cone.
pub fn random_point_in_front(rng: &mut Xoshiro256PlusPlus, pose: &Matrix4d) -> Vector4d {
  let z = rng.gen_range(2.0..6.0);
  let Xc = Vector3d::new(z * rng.gen_range(-0.5..0.5), z * rng.gen_range(-0.5..0.5), z);
  let X = transform_3d(&inverse_rigid(pose), &Xc);
  Vector4d::new(X[0], X[1], X[2], 1.)
}

// Central differences of `f` around `x`.
pub fn numeric_jacobian<F: Fn(&Vectord) -> Vectord>(f: F, x: &Vectord) -> Matrixd {
  let m = f(x).len();
  let mut J = Matrixd::zeros(m, x.len());
  for k in 0..x.len() {
    let h = 1e-6 * x[k].abs().max(1.);
    let mut a = x.clone();
    let mut b = x.clone();
    a[k] += h;
    b[k] -= h;
    J.set_column(k, &((f(&a) - f(&b)) / (2. * h)));
  }
  J
}

pub fn numeric_jacobian_2d<F: Fn(&Vector2d) -> Vector3d>(f: F, p: &Vector2d) -> Matrix32d {
  let J = numeric_jacobian(
    |x| {
      let y = f(&Vector2d::new(x[0], x[1]));
      Vectord::from_vec(vec![y[0], y[1], y[2]])
    },
    &Vectord::from_vec(vec![p[0], p[1]]),
  );
  Matrix32d::from_iterator(J.iter().cloned())
}

fn to_dynamic(J: &[f64], ncols: usize) -> Matrixd {
  Matrixd::from_column_slice(2, ncols, J)
}

fn pixel(v: Vector2d) -> Vectord {
  Vectord::from_vec(vec![v[0], v[1]])
}

fn assert_jacobian_eq(analytic: &Matrixd, numeric: &Matrixd) {
  assert_eq!(analytic.shape(), numeric.shape());
  assert_relative_eq!(analytic, numeric, epsilon = 1e-4, max_relative = 1e-5);
}

// Checks every analytic Jacobian of `project()` against central differences.
pub fn check_project_derivatives(model: &dyn IntrinsicModel, pose: &Matrix4d, X: &Vector4d) {
  let T = Vectord::from_vec(pose.as_slice().to_vec());
  let to_matrix = |t: &Vectord| Matrix4d::from_column_slice(t.as_slice());

  let numeric = numeric_jacobian(|t| pixel(model.project(&to_matrix(t), X, true)), &T);
  assert_jacobian_eq(&to_dynamic(model.d_project_d_pose(pose, X).as_slice(), 16), &numeric);

  let numeric = numeric_jacobian(
    |t| pixel(model.project(&(to_matrix(t) * pose), X, true)),
    &Vectord::from_vec(Matrix4d::identity().as_slice().to_vec()),
  );
  assert_jacobian_eq(&to_dynamic(model.d_project_d_pose_left(pose, X).as_slice(), 16), &numeric);

  let R = Vectord::from_vec(rotation(pose).as_slice().to_vec());
  let numeric = numeric_jacobian(
    |r| {
      let mut T = *pose;
      T.fixed_slice_mut::<3, 3>(0, 0).copy_from(&Matrix3d::from_column_slice(r.as_slice()));
      pixel(model.project(&T, X, true))
    },
    &R,
  );
  assert_jacobian_eq(&to_dynamic(model.d_project_d_rotation(pose, X).as_slice(), 9), &numeric);

  let P = Vectord::from_vec(X.as_slice().to_vec());
  let numeric = numeric_jacobian(
    |p| pixel(model.project(pose, &Vector4d::from_column_slice(p.as_slice()), true)),
    &P,
  );
  assert_jacobian_eq(&to_dynamic(model.d_project_d_point(pose, X).as_slice(), 4), &numeric);
  assert_jacobian_eq(
    &to_dynamic(model.d_project_d_point3(pose, X).as_slice(), 3),
    &numeric.columns(0, 3).into_owned(),
  );

  let params = Vectord::from_vec(model.params());
  let numeric = numeric_jacobian(
    |p| {
      let mut m = model.clone_box();
      m.update_from_params(p.as_slice()).unwrap();
      pixel(m.project(pose, X, true))
    },
    &params,
  );
  let n = model.params_size();
  assert_jacobian_eq(&to_dynamic(model.d_project_d_params(pose, X).as_slice(), n), &numeric);

  let n_disto = model.distortion_params_size();
  assert_jacobian_eq(
    &to_dynamic(model.d_project_d_disto(pose, X).as_slice(), n_disto),
    &numeric.columns(n - n_disto, n_disto).into_owned(),
  );
  if !model.is_ratio_locked() {
    assert_jacobian_eq(
      &to_dynamic(model.d_project_d_scale(pose, X).as_slice(), 2),
      &numeric.columns(0, 2).into_owned(),
    );
    assert_jacobian_eq(
      &to_dynamic(model.d_project_d_principal_point(pose, X).as_slice(), 2),
      &numeric.columns(2, 2).into_owned(),
    );
  }
}
