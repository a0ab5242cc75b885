use crate::all::*;

// Pixel-space correction: maps raw (distorted) pixels directly to ideal pixels.
// Some pipelines calibrate this instead of, or on top of, a `Distortion` on the camera plane.
pub trait Undistortion: Debug + Send + Sync {
  fn name(&self) -> &'static str;

  fn parameters(&self) -> &[f64];

  fn set_parameters(&mut self, params: &[f64]) -> Result<()>;

  // Image size in pixels the model was calibrated for.
  fn size(&self) -> Vector2d;

  // Distortion center relative to the image center, in pixels.
  fn offset(&self) -> Vector2d;

  fn set_offset(&mut self, offset: Vector2d);

  // Raw pixel to ideal pixel.
  fn undistort(&self, p: &Vector2d) -> Vector2d;

  // Ideal pixel to raw pixel, approximate inverse of `undistort()`.
  fn inverse(&self, p: &Vector2d) -> Vector2d;

  fn d_undistort_d_point(&self, p: &Vector2d) -> Matrix2d;

  fn d_undistort_d_params(&self, p: &Vector2d) -> Matrix2Xd;

  // Follows a resize of the image.
  fn rescale(&mut self, factor_w: f64, factor_h: f64);

  fn clone_box(&self) -> Box<dyn Undistortion>;
}

impl Clone for Box<dyn Undistortion> {
  fn clone(&self) -> Box<dyn Undistortion> {
    self.clone_box()
  }
}

// Radial model in pixel space. Coordinates are normalized by half the image diagonal
// around the distortion center so the coefficients do not depend on the resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct UndistortionRadialK3 {
  size: Vector2d,
  offset: Vector2d,
  radial: DistortionRadialK3,
}

impl UndistortionRadialK3 {
  pub fn new(width: u32, height: u32) -> UndistortionRadialK3 {
    UndistortionRadialK3 {
      size: Vector2d::new(width as f64, height as f64),
      offset: Vector2d::zeros(),
      radial: DistortionRadialK3::default(),
    }
  }

  fn center(&self) -> Vector2d {
    self.size * 0.5 + self.offset
  }

  fn half_diagonal(&self) -> f64 {
    0.5 * self.size.norm()
  }

  fn normalize(&self, p: &Vector2d) -> Vector2d {
    (p - self.center()) / self.half_diagonal()
  }

  fn denormalize(&self, q: &Vector2d) -> Vector2d {
    q * self.half_diagonal() + self.center()
  }
}

impl Undistortion for UndistortionRadialK3 {
  fn name(&self) -> &'static str { "radialk3" }

  fn parameters(&self) -> &[f64] {
    self.radial.parameters()
  }

  fn set_parameters(&mut self, params: &[f64]) -> Result<()> {
    self.radial.set_parameters(params)
  }

  fn size(&self) -> Vector2d { self.size }

  fn offset(&self) -> Vector2d { self.offset }

  fn set_offset(&mut self, offset: Vector2d) {
    self.offset = offset;
  }

  fn undistort(&self, p: &Vector2d) -> Vector2d {
    self.denormalize(&self.radial.add_distortion(&self.normalize(p)))
  }

  fn inverse(&self, p: &Vector2d) -> Vector2d {
    self.denormalize(&self.radial.remove_distortion(&self.normalize(p)))
  }

  // The normalization scale cancels out.
  fn d_undistort_d_point(&self, p: &Vector2d) -> Matrix2d {
    self.radial.d_add_distortion_d_point(&self.normalize(p))
  }

  fn d_undistort_d_params(&self, p: &Vector2d) -> Matrix2Xd {
    self.radial.d_add_distortion_d_params(&self.normalize(p)) * self.half_diagonal()
  }

  fn rescale(&mut self, factor_w: f64, factor_h: f64) {
    let factor = Vector2d::new(factor_w, factor_h);
    self.size.component_mul_assign(&factor);
    self.offset.component_mul_assign(&factor);
  }

  fn clone_box(&self) -> Box<dyn Undistortion> {
    Box::new(self.clone())
  }
}
