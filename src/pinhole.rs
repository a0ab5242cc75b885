use crate::all::*;

// Rectilinear perspective projection: divide by depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PinholeLaw;

pub type Pinhole = Intrinsic<PinholeLaw>;

// Field of view along one axis from the equivalent focal length in millimeters.
fn pinhole_fov(sensor: f64, focal_length_pix: f64, image_size: u32) -> f64 {
  let focal_length_mm = sensor * focal_length_pix / image_size as f64;
  if focal_length_mm <= 0. { return 0. }
  2. * (sensor / (2. * focal_length_mm)).atan()
}

impl ProjectionLaw for PinholeLaw {
  const KIND: IntrinsicKind = IntrinsicKind::Pinhole;

  // Points with non-positive depth still produce a value, `is_visible_ray()` rejects them.
  fn project_point(&self, X: &Vector3d) -> Vector2d {
    Vector2d::new(X[0] / X[2], X[1] / X[2])
  }

  fn d_project_point_d_point(&self, X: &Vector3d) -> Matrix23d {
    let iz = 1. / X[2];
    matrix!(
      iz, 0., -X[0] * iz * iz;
      0., iz, -X[1] * iz * iz;
    )
  }

  fn to_unit_sphere(&self, p: &Vector2d) -> Vector3d {
    Vector3d::new(p[0], p[1], 1.).normalize()
  }

  fn d_to_unit_sphere_d_point(&self, p: &Vector2d) -> Matrix32d {
    let v = Vector3d::new(p[0], p[1], 1.);
    let n = v.norm();
    let u = v / n;
    let d_u_d_v = (Matrix3d::identity() - u * u.transpose()) / n;
    d_u_d_v.fixed_slice::<3, 2>(0, 0).into_owned()
  }

  fn is_visible_ray(&self, ray: &Vector3d) -> bool {
    ray[2] > 0.
  }

  fn horizontal_fov(&self, base: &IntrinsicBase, scale_offset: &ScaleOffset) -> f64 {
    pinhole_fov(base.sensor_width, scale_offset.scale[0], base.w)
  }

  fn vertical_fov(&self, base: &IntrinsicBase, scale_offset: &ScaleOffset) -> f64 {
    pinhole_fov(base.sensor_height, scale_offset.scale[1], base.h)
  }
}

impl Pinhole {
  pub fn new(
    w: u32,
    h: u32,
    focal_length_pix_x: f64,
    focal_length_pix_y: f64,
    offset_x: f64,
    offset_y: f64,
  ) -> Pinhole {
    Intrinsic::from_parts(
      IntrinsicBase::new(w, h),
      ScaleOffset::new(
        Vector2d::new(focal_length_pix_x, focal_length_pix_y),
        Vector2d::new(offset_x, offset_y),
      ),
      PinholeLaw,
    )
  }

  pub fn from_k(w: u32, h: u32, K: &Matrix3d) -> Pinhole {
    Pinhole::new(w, h, K[(0, 0)], K[(1, 1)], K[(0, 2)], K[(1, 2)])
  }

  // Camera matrix.
  pub fn k(&self) -> Matrix3d {
    let s = &self.scale_offset;
    Matrix3d::new(
      s.scale[0], 0., s.offset[0],
      0., s.scale[1], s.offset[1],
      0., 0., 1.,
    )
  }

  pub fn set_k(&mut self, focal_length_pix_x: f64, focal_length_pix_y: f64, ppx: f64, ppy: f64) {
    self.scale_offset.scale = Vector2d::new(focal_length_pix_x, focal_length_pix_y);
    self.scale_offset.offset = Vector2d::new(ppx, ppy);
  }

  // `K [R | t]`, the 3x4 projection matrix equivalent to `project()` without distortion.
  pub fn projective_equivalent(&self, pose: &Matrix4d) -> Matrix34d {
    self.k() * pose.fixed_slice::<3, 4>(0, 0)
  }
}

impl Default for Pinhole {
  fn default() -> Pinhole {
    Pinhole::new(1, 1, 1., 1., 0., 0.)
  }
}
