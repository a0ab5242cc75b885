// Fisheye distortion as a polynomial in the incidence angle (Kannala-Brandt, OpenCV fisheye):
//   theta = atan(r)
//   theta_d = theta * (1 + k1 theta^2 + k2 theta^4 + k3 theta^6 + k4 theta^8)
//   p_d = p * theta_d / r

use crate::all::*;

// Below this radius the model is the identity to first order.
const SMALL_RADIUS: f64 = 1e-8;

#[derive(Clone, Debug, PartialEq)]
pub struct DistortionFisheye {
  coefficients: Vec<f64>,
  settings: NewtonSettings,
}

impl DistortionFisheye {
  pub fn new(k1: f64, k2: f64, k3: f64, k4: f64) -> DistortionFisheye {
    DistortionFisheye {
      coefficients: vec![k1, k2, k3, k4],
      settings: NewtonSettings::from_parameter_set(),
    }
  }

  // Returns theta_d and its derivative wrt theta.
  fn theta_d(&self, theta: f64) -> (f64, f64) {
    let k = &self.coefficients;
    let t2 = theta * theta;
    let poly = 1. + t2 * (k[0] + t2 * (k[1] + t2 * (k[2] + t2 * k[3])));
    let dpoly = 1. + t2 * (3. * k[0] + t2 * (5. * k[1] + t2 * (7. * k[2] + t2 * 9. * k[3])));
    (theta * poly, dpoly)
  }
}

impl Default for DistortionFisheye {
  fn default() -> DistortionFisheye {
    DistortionFisheye::new(0., 0., 0., 0.)
  }
}

impl Distortion for DistortionFisheye {
  fn name(&self) -> &'static str { "fisheye4" }

  fn parameters(&self) -> &[f64] {
    &self.coefficients
  }

  fn set_parameters(&mut self, params: &[f64]) -> Result<()> {
    check_params_len(self.name(), params, 4)?;
    self.coefficients.copy_from_slice(params);
    Ok(())
  }

  fn add_distortion(&self, p: &Vector2d) -> Vector2d {
    let r = p.norm();
    if r < SMALL_RADIUS { return *p }
    let (theta_d, _) = self.theta_d(r.atan());
    p * (theta_d / r)
  }

  fn remove_distortion(&self, p: &Vector2d) -> Vector2d {
    remove_distortion_newton(self, p, &self.settings)
  }

  fn d_add_distortion_d_point(&self, p: &Vector2d) -> Matrix2d {
    let r = p.norm();
    if r < SMALL_RADIUS { return Matrix2d::identity() }
    let theta = r.atan();
    let (theta_d, dtheta_d) = self.theta_d(theta);
    let dtheta_dr = 1. / (1. + r * r);
    let s = theta_d / r;
    let ds_dr = (dtheta_d * dtheta_dr * r - theta_d) / (r * r);
    Matrix2d::identity() * s + p * p.transpose() * (ds_dr / r)
  }

  fn d_add_distortion_d_params(&self, p: &Vector2d) -> Matrix2Xd {
    let r = p.norm();
    if r < SMALL_RADIUS { return Matrix2Xd::zeros(4) }
    let theta = r.atan();
    let t2 = theta * theta;
    let t3 = t2 * theta;
    let u = p / r;
    Matrix2Xd::from_columns(&[
      u * t3,
      u * (t3 * t2),
      u * (t3 * t2 * t2),
      u * (t3 * t2 * t2 * t2),
    ])
  }

  fn clone_box(&self) -> Box<dyn Distortion> {
    Box::new(self.clone())
  }
}
