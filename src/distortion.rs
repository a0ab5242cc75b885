use crate::all::*;

// Nonlinear correction between ideal and distorted points on the normalized camera plane.
// Owned by exactly one intrinsic; `clone_box()` gives clones their own copy.
pub trait Distortion: Debug + Send + Sync {
  fn name(&self) -> &'static str;

  fn parameters(&self) -> &[f64];

  // Fails without changing anything if the length is wrong.
  fn set_parameters(&mut self, params: &[f64]) -> Result<()>;

  fn add_distortion(&self, p: &Vector2d) -> Vector2d;

  // Approximate inverse of `add_distortion()`.
  fn remove_distortion(&self, p: &Vector2d) -> Vector2d;

  fn d_add_distortion_d_point(&self, p: &Vector2d) -> Matrix2d;

  // 2 x `parameters().len()`.
  fn d_add_distortion_d_params(&self, p: &Vector2d) -> Matrix2Xd;

  fn clone_box(&self) -> Box<dyn Distortion>;

  // Derivatives of the inverse follow from the implicit function theorem
  // around the undistorted point.
  fn d_remove_distortion_d_point(&self, p: &Vector2d) -> Matrix2d {
    let u = self.remove_distortion(p);
    self.d_add_distortion_d_point(&u).try_inverse().unwrap_or_else(Matrix2d::identity)
  }

  fn d_remove_distortion_d_params(&self, p: &Vector2d) -> Matrix2Xd {
    let u = self.remove_distortion(p);
    let d_point = self.d_add_distortion_d_point(&u);
    let d_params = self.d_add_distortion_d_params(&u);
    match d_point.try_inverse() {
      Some(inv) => -(inv * d_params),
      None => Matrix2Xd::zeros(self.parameters().len()),
    }
  }
}

impl Clone for Box<dyn Distortion> {
  fn clone(&self) -> Box<dyn Distortion> {
    self.clone_box()
  }
}

pub fn check_params_len(name: &str, params: &[f64], expected: usize) -> Result<()> {
  if params.len() != expected {
    bail!("{} expects {} parameters, got {}.", name, expected, params.len());
  }
  Ok(())
}

// Solves `add_distortion(x) = dist` with Newton's method on the closed form Jacobian.
pub fn remove_distortion_newton(
  distortion: &dyn Distortion,
  dist: &Vector2d,
  settings: &NewtonSettings,
) -> Vector2d {
  let mut point = *dist;
  for _ in 0..settings.max_iterations {
    let residual = dist - distortion.add_distortion(&point);
    let delta = match distortion.d_add_distortion_d_point(&point).try_inverse() {
      Some(inv) => inv * residual,
      None => {
        debug!("Singular {} Jacobian at {:?}.", distortion.name(), point);
        return point;
      },
    };
    point += delta;
    if !point.iter().all(|x| x.is_finite()) {
      debug!("{} inverse diverged for {:?}.", distortion.name(), dist);
      return *dist;
    }
    if delta.norm() < settings.threshold { return point }
  }
  debug!("{} inverse did not converge for {:?}.", distortion.name(), dist);
  point
}

pub fn distortion_from_name(name: &str, params: &[f64]) -> Result<Box<dyn Distortion>> {
  let mut distortion: Box<dyn Distortion> = match name {
    "radialk3" => Box::new(DistortionRadialK3::default()),
    "fisheye4" => Box::new(DistortionFisheye::default()),
    _ => bail!("Unknown distortion model {}.", name),
  };
  distortion.set_parameters(params)?;
  Ok(distortion)
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn test_distortion_from_name() {
    let d = distortion_from_name("radialk3", &[0.1, 0.01, 0.001]).unwrap();
    assert_eq!(d.name(), "radialk3");
    assert_eq!(d.parameters(), &[0.1, 0.01, 0.001]);
    assert!(distortion_from_name("radialk3", &[0.1]).is_err());
    assert!(distortion_from_name("brown", &[]).is_err());
    let d = distortion_from_name("fisheye4", &[0.1, 0.0, 0.0, 0.0]).unwrap();
    assert_eq!(d.name(), "fisheye4");
  }

  #[test]
  fn test_boxed_clone_is_independent() {
    let mut d = distortion_from_name("radialk3", &[0.1, 0.01, 0.001]).unwrap();
    let c = d.clone();
    d.set_parameters(&[0.5, 0., 0.]).unwrap();
    assert_eq!(c.parameters(), &[0.1, 0.01, 0.001]);
  }

  #[test]
  fn test_inverse_derivatives() {
    let d = distortion_from_name("radialk3", &[-0.28, 0.07, 0.0002]).unwrap();
    let p = Vector2d::new(0.3, -0.2);
    let h = 1e-6;
    let mut num = Matrix2d::zeros();
    for i in 0..2 {
      let mut a = p;
      let mut b = p;
      a[i] += h;
      b[i] -= h;
      num.set_column(i, &((d.remove_distortion(&a) - d.remove_distortion(&b)) / (2. * h)));
    }
    assert_relative_eq!(d.d_remove_distortion_d_point(&p), num, epsilon = 1e-6);

    let params = d.parameters().to_vec();
    let analytic = d.d_remove_distortion_d_params(&p);
    for k in 0..params.len() {
      let mut a = d.clone();
      let mut b = d.clone();
      let mut pa = params.clone();
      let mut pb = params.clone();
      pa[k] += h;
      pb[k] -= h;
      a.set_parameters(&pa).unwrap();
      b.set_parameters(&pb).unwrap();
      let col = (a.remove_distortion(&p) - b.remove_distortion(&p)) / (2. * h);
      assert_relative_eq!(analytic[(0, k)], col[0], epsilon = 1e-6);
      assert_relative_eq!(analytic[(1, k)], col[1], epsilon = 1e-6);
    }
  }
}
