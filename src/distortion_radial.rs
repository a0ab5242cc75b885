// Radial distortion with three coefficients, the radial part of the OpenCV model:
//   p_d = p * (1 + k1 r^2 + k2 r^4 + k3 r^6),  r = |p|

use crate::all::*;

#[derive(Clone, Debug, PartialEq)]
pub struct DistortionRadialK3 {
  coefficients: Vec<f64>,
  settings: NewtonSettings,
}

impl DistortionRadialK3 {
  pub fn new(k1: f64, k2: f64, k3: f64) -> DistortionRadialK3 {
    DistortionRadialK3 {
      coefficients: vec![k1, k2, k3],
      settings: NewtonSettings::from_parameter_set(),
    }
  }

  fn distort(&self, p: &Vector2d, compute_derivative: bool) -> (Vector2d, Option<Matrix2d>) {
    let c = &self.coefficients;
    let x = p[0];
    let y = p[1];
    let r2 = x * x + y * y;
    let theta = 1. + r2 * (c[0] + r2 * (c[1] + r2 * c[2]));
    let dtheta = c[0] + r2 * (c[1] * 2. + r2 * c[2] * 3.);
    let dp = if compute_derivative {
      Some(Matrix2d::new(
        theta + x * dtheta * 2. * x, x * dtheta * 2. * y,
        y * dtheta * 2. * x, theta + y * dtheta * 2. * y
      ))
    }
    else {
      None
    };
    (Vector2d::new(x * theta, y * theta), dp)
  }
}

impl Default for DistortionRadialK3 {
  fn default() -> DistortionRadialK3 {
    DistortionRadialK3::new(0., 0., 0.)
  }
}

impl Distortion for DistortionRadialK3 {
  fn name(&self) -> &'static str { "radialk3" }

  fn parameters(&self) -> &[f64] {
    &self.coefficients
  }

  fn set_parameters(&mut self, params: &[f64]) -> Result<()> {
    check_params_len(self.name(), params, 3)?;
    self.coefficients.copy_from_slice(params);
    Ok(())
  }

  fn add_distortion(&self, p: &Vector2d) -> Vector2d {
    self.distort(p, false).0
  }

  fn remove_distortion(&self, p: &Vector2d) -> Vector2d {
    remove_distortion_newton(self, p, &self.settings)
  }

  fn d_add_distortion_d_point(&self, p: &Vector2d) -> Matrix2d {
    self.distort(p, true).1.unwrap_or_else(Matrix2d::identity)
  }

  fn d_add_distortion_d_params(&self, p: &Vector2d) -> Matrix2Xd {
    let r2 = p.norm_squared();
    let r4 = r2 * r2;
    let r6 = r4 * r2;
    Matrix2Xd::from_columns(&[p * r2, p * r4, p * r6])
  }

  fn clone_box(&self) -> Box<dyn Distortion> {
    Box::new(self.clone())
  }
}
