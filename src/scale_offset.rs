use crate::all::*;

// Affine map between the normalized camera plane and pixels:
//   pixel = scale ⊙ p + offset
// where `scale` holds the per-axis focal lengths in pixels and `offset` the principal point.
//
// Flattened parameter layout: `[scale_x, scale_y, offset_x, offset_y]`, or
// `[scale_x, offset_x, offset_y]` when the scale ratio is locked.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleOffset {
  pub scale: Vector2d,
  pub offset: Vector2d,
  // Scale before any refinement, rescaled along with `scale`. Defines the locked ratio.
  pub initial_scale: Vector2d,
  pub ratio_locked: bool,
}

impl ScaleOffset {
  pub fn new(scale: Vector2d, offset: Vector2d) -> ScaleOffset {
    ScaleOffset {
      scale,
      offset,
      initial_scale: scale,
      ratio_locked: false,
    }
  }

  pub fn is_valid(&self) -> bool {
    self.scale[0] != 0. && self.scale[1] != 0.
  }

  pub fn cam2ima(&self, p: &Vector2d) -> Vector2d {
    self.scale.component_mul(p) + self.offset
  }

  pub fn ima2cam(&self, p: &Vector2d) -> Vector2d {
    (p - self.offset).component_div(&self.scale)
  }

  pub fn d_cam2ima_d_point(&self) -> Matrix2d {
    Matrix2d::from_diagonal(&self.scale)
  }

  pub fn d_cam2ima_d_scale(&self, p: &Vector2d) -> Matrix2d {
    Matrix2d::from_diagonal(p)
  }

  pub fn d_cam2ima_d_principal_point(&self) -> Matrix2d {
    Matrix2d::identity()
  }

  pub fn d_ima2cam_d_point(&self) -> Matrix2d {
    Matrix2d::new(
      1. / self.scale[0], 0.,
      0., 1. / self.scale[1],
    )
  }

  pub fn d_ima2cam_d_scale(&self, p: &Vector2d) -> Matrix2d {
    let d = p - self.offset;
    Matrix2d::new(
      -d[0] / (self.scale[0] * self.scale[0]), 0.,
      0., -d[1] / (self.scale[1] * self.scale[1]),
    )
  }

  pub fn d_ima2cam_d_principal_point(&self) -> Matrix2d {
    -self.d_ima2cam_d_point()
  }

  // y/x ratio enforced while the ratio is locked.
  pub fn locked_ratio(&self) -> f64 {
    let s = self.initial_scale;
    if s[0] > 0. && s[1] > 0. { s[1] / s[0] } else { 1. }
  }

  pub fn scale_params_size(&self) -> usize {
    if self.ratio_locked { 1 } else { 2 }
  }

  pub fn params_size(&self) -> usize {
    self.scale_params_size() + 2
  }

  pub fn params(&self) -> Vec<f64> {
    let mut params = Vec::with_capacity(self.params_size());
    params.push(self.scale[0]);
    if !self.ratio_locked {
      params.push(self.scale[1]);
    }
    params.push(self.offset[0]);
    params.push(self.offset[1]);
    params
  }

  // Reads `params_size()` leading values. Callers check the length first so that a
  // rejected vector never leaves the model half updated.
  pub fn apply_params(&mut self, params: &[f64]) {
    debug_assert!(params.len() >= self.params_size());
    let n = self.scale_params_size();
    self.scale = if self.ratio_locked {
      Vector2d::new(params[0], params[0] * self.locked_ratio())
    }
    else {
      Vector2d::new(params[0], params[1])
    };
    self.offset = Vector2d::new(params[n], params[n + 1]);
  }

  pub fn rescale(&mut self, factor_w: f64, factor_h: f64) {
    let factor = Vector2d::new(factor_w, factor_h);
    self.scale.component_mul_assign(&factor);
    self.offset.component_mul_assign(&factor);
    self.initial_scale.component_mul_assign(&factor);
  }
}

impl Default for ScaleOffset {
  fn default() -> ScaleOffset {
    ScaleOffset::new(Vector2d::new(1., 1.), Vector2d::zeros())
  }
}
