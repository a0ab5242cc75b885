use crate::all::*;

// Below this distance from the optical axis the projection uses its first order limit.
const SMALL_RADIUS: f64 = 1e-12;
const SMALL_ANGLE: f64 = 1e-8;

// Equidistant fisheye law: the angle from the optical axis maps linearly to the radius on
// the normalized camera plane. The field-stop circle (pixels) bounds the illuminated region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquidistantLaw {
  pub circle_center: Vector2d,
  pub circle_radius: f64,
}

pub type Equidistant = Intrinsic<EquidistantLaw>;

impl EquidistantLaw {
  // Circle inscribed in the image.
  pub fn inscribed(base: &IntrinsicBase) -> EquidistantLaw {
    EquidistantLaw {
      circle_center: base.image_center(),
      circle_radius: base.w.min(base.h) as f64 * 0.5,
    }
  }

  fn fov(&self, base: &IntrinsicBase, scale_offset: &ScaleOffset) -> f64 {
    let image_size = base.w.max(base.h) as f64;
    if image_size <= 0. || base.sensor_width <= 0. { return 0. }
    let focal_length_mm = scale_offset.scale[0] * base.sensor_width / image_size;
    if focal_length_mm <= 0. { return 0. }
    base.sensor_width.min(base.sensor_height) / focal_length_mm
  }
}

impl ProjectionLaw for EquidistantLaw {
  const KIND: IntrinsicKind = IntrinsicKind::Equidistant;

  fn project_point(&self, X: &Vector3d) -> Vector2d {
    let rho = X[0].hypot(X[1]);
    let theta = rho.atan2(X[2]);
    if rho < SMALL_RADIUS {
      if X[2] > 0. {
        return Vector2d::new(X[0] / X[2], X[1] / X[2]);
      }
      return Vector2d::new(theta, 0.);
    }
    Vector2d::new(X[0], X[1]) * (theta / rho)
  }

  fn d_project_point_d_point(&self, X: &Vector3d) -> Matrix23d {
    let (x, y, z) = (X[0], X[1], X[2]);
    let rho = x.hypot(y);
    if rho < SMALL_RADIUS {
      if z <= 0. { return Matrix23d::zeros() }
      let iz = 1. / z;
      return matrix!(
        iz, 0., -x * iz * iz;
        0., iz, -y * iz * iz;
      );
    }
    let theta = rho.atan2(z);
    let n2 = rho * rho + z * z;
    let s = theta / rho;
    let ds_drho = (z * rho / n2 - theta) / (rho * rho);
    let q = Vector2d::new(x, y);
    let d_q = Matrix2d::identity() * s + q * q.transpose() * (ds_drho / rho);
    let d_z = q * (-1. / n2);
    matrix!(
      d_q[(0, 0)], d_q[(0, 1)], d_z[0];
      d_q[(1, 0)], d_q[(1, 1)], d_z[1];
    )
  }

  fn to_unit_sphere(&self, p: &Vector2d) -> Vector3d {
    let theta = p.norm();
    let c = if theta < SMALL_ANGLE { 1. - theta * theta / 6. } else { theta.sin() / theta };
    Vector3d::new(c * p[0], c * p[1], theta.cos())
  }

  fn d_to_unit_sphere_d_point(&self, p: &Vector2d) -> Matrix32d {
    let theta = p.norm();
    let (c, dc_dtheta_over_theta) = if theta < SMALL_ANGLE {
      (1. - theta * theta / 6., -1. / 3.)
    }
    else {
      let (sin, cos) = theta.sin_cos();
      (sin / theta, (theta * cos - sin) / (theta * theta * theta))
    };
    let d_xy = Matrix2d::identity() * c + p * p.transpose() * dc_dtheta_over_theta;
    matrix!(
      d_xy[(0, 0)], d_xy[(0, 1)];
      d_xy[(1, 0)], d_xy[(1, 1)];
      -c * p[0], -c * p[1];
    )
  }

  fn is_visible_ray(&self, ray: &Vector3d) -> bool {
    let rho = ray[0].hypot(ray[1]);
    if rho == 0. && ray[2] == 0. { return false }
    rho.atan2(ray[2]) <= std::f64::consts::FRAC_PI_2
  }

  fn horizontal_fov(&self, base: &IntrinsicBase, scale_offset: &ScaleOffset) -> f64 {
    self.fov(base, scale_offset)
  }

  fn vertical_fov(&self, base: &IntrinsicBase, scale_offset: &ScaleOffset) -> f64 {
    self.fov(base, scale_offset)
  }

  fn is_visible_pixel(&self, pixel: &Vector2d) -> bool {
    (pixel - self.circle_center).norm() <= self.circle_radius
  }

  fn is_valid(&self) -> bool {
    self.circle_radius > 0.
  }

  fn hash_values(&self) -> Vec<f64> {
    vec![self.circle_center[0], self.circle_center[1], self.circle_radius]
  }
}

impl Equidistant {
  // Single focal length shared by both axes, field stop inscribed in the image.
  pub fn new(w: u32, h: u32, focal_length_pix: f64, offset_x: f64, offset_y: f64) -> Equidistant {
    let base = IntrinsicBase::new(w, h);
    let law = EquidistantLaw::inscribed(&base);
    Intrinsic::from_parts(
      base,
      ScaleOffset::new(
        Vector2d::new(focal_length_pix, focal_length_pix),
        Vector2d::new(offset_x, offset_y),
      ),
      law,
    )
  }

  pub fn with_circle_radius(
    w: u32,
    h: u32,
    focal_length_pix: f64,
    offset_x: f64,
    offset_y: f64,
    circle_radius: f64,
  ) -> Equidistant {
    let mut intrinsic = Equidistant::new(w, h, focal_length_pix, offset_x, offset_y);
    intrinsic.law.circle_radius = circle_radius;
    intrinsic
  }

  pub fn circle_radius(&self) -> f64 { self.law.circle_radius }
  pub fn set_circle_radius(&mut self, radius: f64) { self.law.circle_radius = radius }
  pub fn circle_center_x(&self) -> f64 { self.law.circle_center[0] }
  pub fn circle_center_y(&self) -> f64 { self.law.circle_center[1] }
  pub fn set_circle_center_x(&mut self, x: f64) { self.law.circle_center[0] = x }
  pub fn set_circle_center_y(&mut self, y: f64) { self.law.circle_center[1] = y }
  pub fn circle_center(&self) -> Vector2d { self.law.circle_center }
  pub fn set_circle_center(&mut self, center: Vector2d) { self.law.circle_center = center }
}

impl Default for Equidistant {
  fn default() -> Equidistant {
    Equidistant::new(1, 1, 1., 0., 0.)
  }
}
