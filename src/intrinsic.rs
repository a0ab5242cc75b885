use crate::all::*;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// Radii below this are skipped when probing the distortion ratio.
const MIN_PROBE_RADIUS: f64 = 1e-6;

// Model specific part of an intrinsic: how camera frame points reach the normalized camera
// plane and how rays come back from it. Everything else (image geometry, scale and offset,
// distortion, parameter vector) is shared and lives in `Intrinsic`.
pub trait ProjectionLaw: Clone + Debug + PartialEq + Send + Sync + 'static {
  const KIND: IntrinsicKind;

  // Camera frame point to the normalized camera plane, before distortion.
  fn project_point(&self, X: &Vector3d) -> Vector2d;

  fn d_project_point_d_point(&self, X: &Vector3d) -> Matrix23d;

  // Normalized camera plane point (undistorted) to a unit ray in the camera frame.
  fn to_unit_sphere(&self, p: &Vector2d) -> Vector3d;

  fn d_to_unit_sphere_d_point(&self, p: &Vector2d) -> Matrix32d;

  fn is_visible_ray(&self, ray: &Vector3d) -> bool;

  fn horizontal_fov(&self, base: &IntrinsicBase, scale_offset: &ScaleOffset) -> f64;

  fn vertical_fov(&self, base: &IntrinsicBase, scale_offset: &ScaleOffset) -> f64;

  // Checked on top of the image bounds.
  fn is_visible_pixel(&self, _pixel: &Vector2d) -> bool { true }

  fn is_valid(&self) -> bool { true }

  // Model state that is not part of the parameter vector.
  fn hash_values(&self) -> Vec<f64> { vec![] }
}

// Camera intrinsic: image geometry, the affine scale/offset map, optional distortion
// objects and a projection law.
#[derive(Clone, Debug)]
pub struct Intrinsic<L: ProjectionLaw> {
  pub(crate) base: IntrinsicBase,
  pub(crate) scale_offset: ScaleOffset,
  pub(crate) distortion: Option<Box<dyn Distortion>>,
  pub(crate) undistortion: Option<Box<dyn Undistortion>>,
  pub(crate) law: L,
  // Read from `PARAMETER_SET` once, when the intrinsic is built.
  max_distortion_samples: usize,
}

impl<L: ProjectionLaw> Intrinsic<L> {
  pub fn from_parts(
    base: IntrinsicBase,
    scale_offset: ScaleOffset,
    law: L,
  ) -> Intrinsic<L> {
    Intrinsic {
      base,
      scale_offset,
      distortion: None,
      undistortion: None,
      law,
      max_distortion_samples: max_distortion_samples(),
    }
  }

  pub fn with_distortion(mut self, distortion: Box<dyn Distortion>) -> Intrinsic<L> {
    self.distortion = Some(distortion);
    self
  }

  pub fn with_undistortion(mut self, undistortion: Box<dyn Undistortion>) -> Intrinsic<L> {
    self.undistortion = Some(undistortion);
    self
  }

  pub fn law(&self) -> &L {
    &self.law
  }

  pub fn set_distortion(&mut self, distortion: Option<Box<dyn Distortion>>) {
    self.distortion = distortion;
  }

  pub fn set_undistortion(&mut self, undistortion: Option<Box<dyn Undistortion>>) {
    self.undistortion = undistortion;
  }

  // Sets distortion parameter `i` to `f(i)` for every parameter.
  pub fn set_distortion_params_fn<F: FnMut(usize) -> f64>(&mut self, f: F) -> Result<()> {
    match &mut self.distortion {
      Some(distortion) => {
        let params: Vec<f64> = (0..distortion.parameters().len()).map(f).collect();
        distortion.set_parameters(&params)
      },
      None => Ok(()),
    }
  }

  // Derivative of the pixel wrt the camera frame point, distortion included.
  fn d_pixel_d_camera_point(&self, X: &Vector3d) -> Matrix23d {
    let P = self.law.project_point(X);
    self.scale_offset.d_cam2ima_d_point()
      * self.d_add_disto_d_point(&P)
      * self.law.d_project_point_d_point(X)
  }

  fn distorted_camera_point(&self, pose: &Matrix4d, pt: &Vector4d) -> (Vector2d, Vector2d) {
    let X = transform_homogeneous(pose, pt);
    let P = self.law.project_point(&X);
    (P, self.add_distortion(&P))
  }
}

impl<L: ProjectionLaw> PartialEq for Intrinsic<L> {
  fn eq(&self, other: &Intrinsic<L>) -> bool {
    let same_distortion = match (&self.distortion, &other.distortion) {
      (Some(a), Some(b)) => a.name() == b.name() && a.parameters() == b.parameters(),
      (None, None) => true,
      _ => false,
    };
    let same_undistortion = match (&self.undistortion, &other.undistortion) {
      (Some(a), Some(b)) => a.name() == b.name() && a.parameters() == b.parameters(),
      (None, None) => true,
      _ => false,
    };
    self.base == other.base
      && self.scale_offset == other.scale_offset
      && self.law == other.law
      && same_distortion
      && same_undistortion
  }
}

// Uniform interface of every camera model, usable as `Box<dyn IntrinsicModel>`.
//
// Projection and derivative methods only read the model and may run concurrently on a shared
// instance. Setters must not overlap with them.
pub trait IntrinsicModel: Debug + Send + Sync {
  fn kind(&self) -> IntrinsicKind;

  fn type_str(&self) -> &'static str {
    self.kind().as_str()
  }

  fn is_valid(&self) -> bool;

  // Deep copy, distortion objects included.
  fn clone_box(&self) -> Box<dyn IntrinsicModel>;

  // Image geometry.
  fn w(&self) -> u32;
  fn h(&self) -> u32;
  fn sensor_width(&self) -> f64;
  fn sensor_height(&self) -> f64;
  fn set_width(&mut self, w: u32);
  fn set_height(&mut self, h: u32);
  fn set_sensor_width(&mut self, width: f64);
  fn set_sensor_height(&mut self, height: f64);
  fn serial_number(&self) -> &str;
  fn set_serial_number(&mut self, serial_number: String);

  // Optimizer bookkeeping. A locked intrinsic rejects parameter vector updates.
  fn lock(&mut self);
  fn unlock(&mut self);
  fn is_locked(&self) -> bool;
  fn state(&self) -> EstimatorParameterState;
  fn set_state(&mut self, state: EstimatorParameterState);
  fn initialize_state(&mut self);
  fn initialization_mode(&self) -> InitializationMode;
  fn set_initialization_mode(&mut self, mode: InitializationMode);
  fn distortion_initialization_mode(&self) -> InitializationMode;
  fn set_distortion_initialization_mode(&mut self, mode: InitializationMode);

  // Combines type, image size and parameters.
  fn hash_value(&self) -> u64;

  // Scale and offset.
  fn scale(&self) -> Vector2d;
  fn set_scale(&mut self, scale: Vector2d);
  fn offset(&self) -> Vector2d;
  fn set_offset(&mut self, offset: Vector2d);
  fn principal_point(&self) -> Vector2d;
  fn focal_length_pix_x(&self) -> f64;
  fn focal_length_pix_y(&self) -> f64;
  fn initial_scale(&self) -> Vector2d;
  fn set_initial_scale(&mut self, initial_scale: Vector2d);
  fn is_ratio_locked(&self) -> bool;
  fn set_ratio_locked(&mut self, locked: bool);
  fn cam2ima(&self, p: &Vector2d) -> Vector2d;
  fn ima2cam(&self, p: &Vector2d) -> Vector2d;
  fn d_cam2ima_d_point(&self) -> Matrix2d;
  fn d_cam2ima_d_scale(&self, p: &Vector2d) -> Matrix2d;
  fn d_cam2ima_d_principal_point(&self) -> Matrix2d;
  fn d_ima2cam_d_point(&self) -> Matrix2d;
  fn d_ima2cam_d_scale(&self, p: &Vector2d) -> Matrix2d;
  fn d_ima2cam_d_principal_point(&self) -> Matrix2d;
  fn image_plane_to_camera_plane_error(&self, value: f64) -> f64;

  // Must be called whenever the backing image is resized. Does not touch model specific
  // state such as the equidistant field-stop circle.
  fn rescale(&mut self, factor_w: f64, factor_h: f64);

  // Distortion.
  fn has_distortion(&self) -> bool;
  fn distortion(&self) -> Option<&dyn Distortion>;
  fn undistortion(&self) -> Option<&dyn Undistortion>;
  fn add_distortion(&self, p: &Vector2d) -> Vector2d;
  fn remove_distortion(&self, p: &Vector2d) -> Vector2d;
  // Raw pixel to ideal pixel.
  fn get_ud_pixel(&self, p: &Vector2d) -> Vector2d;
  // Ideal pixel to raw pixel.
  fn get_d_pixel(&self, p: &Vector2d) -> Vector2d;
  fn distortion_params(&self) -> Vec<f64>;
  fn distortion_params_size(&self) -> usize;
  fn set_distortion_params(&mut self, params: &[f64]) -> Result<()>;
  fn d_add_disto_d_point(&self, p: &Vector2d) -> Matrix2d;
  fn d_remove_disto_d_point(&self, p: &Vector2d) -> Matrix2d;
  fn d_add_disto_d_disto(&self, p: &Vector2d) -> Matrix2Xd;
  fn d_remove_disto_d_disto(&self, p: &Vector2d) -> Matrix2Xd;
  fn get_maximal_distortion(&self, min_radius: f64, max_radius: f64) -> f64;

  // Flat parameter vector: scale (1 or 2 values), offset (2 values), distortion parameters.
  fn params(&self) -> Vec<f64>;
  fn params_size(&self) -> usize;
  // Fails without changing the model on a length mismatch or when locked.
  fn update_from_params(&mut self, params: &[f64]) -> Result<()>;
  // Like `update_from_params()` but reads layouts written by older versions.
  fn import_from_params(&mut self, params: &[f64], version: Version) -> Result<()>;

  // Projection of a homogeneous world point through `pose` (world to camera).
  fn project(&self, pose: &Matrix4d, pt: &Vector4d, apply_distortion: bool) -> Vector2d;
  // World point at distance `depth` along the ray of `pixel`.
  fn backproject(
    &self,
    pixel: &Vector2d,
    apply_undistortion: bool,
    pose: &Matrix4d,
    depth: f64,
  ) -> Vector3d;
  fn residual(&self, pose: &Matrix4d, X: &Vector4d, x: &Vector2d) -> Vector2d;
  fn residuals(&self, pose: &Matrix4d, X: &Matrix3Xd, x: &Matrix2Xd) -> Matrix2Xd;
  fn to_unit_sphere(&self, p: &Vector2d) -> Vector3d;
  fn d_to_unit_sphere_d_point(&self, p: &Vector2d) -> Matrix32d;
  fn is_visible(&self, pixel: &Vector2d) -> bool;
  fn is_visible_ray(&self, ray: &Vector3d) -> bool;
  fn horizontal_fov(&self) -> f64;
  fn vertical_fov(&self) -> f64;

  // Jacobians of `project(pose, pt, true)`. Rotation and pose entries are column-major.
  fn d_project_d_rotation(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix29d;
  fn d_project_d_pose(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix216d;
  // Wrt a transform applied on the left of `pose`, evaluated at identity.
  fn d_project_d_pose_left(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix216d;
  fn d_project_d_point(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix24d;
  fn d_project_d_point3(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix23d;
  fn d_project_d_disto(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix2Xd;
  fn d_project_d_scale(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix2d;
  fn d_project_d_principal_point(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix2d;
  // Columns follow the layout of `params()`.
  fn d_project_d_params(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix2Xd;
}

impl Clone for Box<dyn IntrinsicModel> {
  fn clone(&self) -> Box<dyn IntrinsicModel> {
    self.clone_box()
  }
}

impl<L: ProjectionLaw> IntrinsicModel for Intrinsic<L> {
  fn kind(&self) -> IntrinsicKind { L::KIND }

  fn is_valid(&self) -> bool {
    self.base.is_valid() && self.scale_offset.is_valid() && self.law.is_valid()
  }

  fn clone_box(&self) -> Box<dyn IntrinsicModel> {
    Box::new(self.clone())
  }

  fn w(&self) -> u32 { self.base.w }
  fn h(&self) -> u32 { self.base.h }
  fn sensor_width(&self) -> f64 { self.base.sensor_width }
  fn sensor_height(&self) -> f64 { self.base.sensor_height }
  fn set_width(&mut self, w: u32) { self.base.w = w }
  fn set_height(&mut self, h: u32) { self.base.h = h }
  fn set_sensor_width(&mut self, width: f64) { self.base.sensor_width = width }
  fn set_sensor_height(&mut self, height: f64) { self.base.sensor_height = height }
  fn serial_number(&self) -> &str { &self.base.serial_number }
  fn set_serial_number(&mut self, serial_number: String) { self.base.serial_number = serial_number }

  fn lock(&mut self) { self.base.locked = true }
  fn unlock(&mut self) { self.base.locked = false }
  fn is_locked(&self) -> bool { self.base.locked }
  fn state(&self) -> EstimatorParameterState { self.base.state }
  fn set_state(&mut self, state: EstimatorParameterState) { self.base.state = state }
  fn initialize_state(&mut self) { self.base.initialize_state() }
  fn initialization_mode(&self) -> InitializationMode { self.base.initialization_mode }
  fn set_initialization_mode(&mut self, mode: InitializationMode) {
    self.base.initialization_mode = mode;
  }
  fn distortion_initialization_mode(&self) -> InitializationMode {
    self.base.distortion_initialization_mode
  }
  fn set_distortion_initialization_mode(&mut self, mode: InitializationMode) {
    self.base.distortion_initialization_mode = mode;
  }

  fn hash_value(&self) -> u64 {
    let mut hasher = DefaultHasher::new();
    self.kind().id().hash(&mut hasher);
    self.base.w.hash(&mut hasher);
    self.base.h.hash(&mut hasher);
    for v in self.params().iter().chain(self.law.hash_values().iter()) {
      // Equal models compare 0 and -0 equal, so hash them alike.
      (v + 0.).to_bits().hash(&mut hasher);
    }
    if let Some(distortion) = &self.distortion {
      distortion.name().hash(&mut hasher);
    }
    hasher.finish()
  }

  fn scale(&self) -> Vector2d { self.scale_offset.scale }
  fn set_scale(&mut self, scale: Vector2d) { self.scale_offset.scale = scale }
  fn offset(&self) -> Vector2d { self.scale_offset.offset }
  fn set_offset(&mut self, offset: Vector2d) { self.scale_offset.offset = offset }
  fn principal_point(&self) -> Vector2d { self.scale_offset.offset }
  fn focal_length_pix_x(&self) -> f64 { self.scale_offset.scale[0] }
  fn focal_length_pix_y(&self) -> f64 { self.scale_offset.scale[1] }
  fn initial_scale(&self) -> Vector2d { self.scale_offset.initial_scale }
  fn set_initial_scale(&mut self, initial_scale: Vector2d) {
    self.scale_offset.initial_scale = initial_scale;
  }
  fn is_ratio_locked(&self) -> bool { self.scale_offset.ratio_locked }
  fn set_ratio_locked(&mut self, locked: bool) { self.scale_offset.ratio_locked = locked }
  fn cam2ima(&self, p: &Vector2d) -> Vector2d { self.scale_offset.cam2ima(p) }
  fn ima2cam(&self, p: &Vector2d) -> Vector2d { self.scale_offset.ima2cam(p) }
  fn d_cam2ima_d_point(&self) -> Matrix2d { self.scale_offset.d_cam2ima_d_point() }
  fn d_cam2ima_d_scale(&self, p: &Vector2d) -> Matrix2d { self.scale_offset.d_cam2ima_d_scale(p) }
  fn d_cam2ima_d_principal_point(&self) -> Matrix2d {
    self.scale_offset.d_cam2ima_d_principal_point()
  }
  fn d_ima2cam_d_point(&self) -> Matrix2d { self.scale_offset.d_ima2cam_d_point() }
  fn d_ima2cam_d_scale(&self, p: &Vector2d) -> Matrix2d { self.scale_offset.d_ima2cam_d_scale(p) }
  fn d_ima2cam_d_principal_point(&self) -> Matrix2d {
    self.scale_offset.d_ima2cam_d_principal_point()
  }

  fn image_plane_to_camera_plane_error(&self, value: f64) -> f64 {
    value / self.scale_offset.scale[0]
  }

  fn rescale(&mut self, factor_w: f64, factor_h: f64) {
    debug!("Rescaling {} intrinsic {}x{} by ({}, {}).",
      self.kind(), self.base.w, self.base.h, factor_w, factor_h);
    self.base.rescale(factor_w, factor_h);
    self.scale_offset.rescale(factor_w, factor_h);
    if let Some(undistortion) = &mut self.undistortion {
      undistortion.rescale(factor_w, factor_h);
    }
  }

  fn has_distortion(&self) -> bool {
    self.distortion.is_some()
  }

  fn distortion(&self) -> Option<&dyn Distortion> {
    self.distortion.as_deref()
  }

  fn undistortion(&self) -> Option<&dyn Undistortion> {
    self.undistortion.as_deref()
  }

  fn add_distortion(&self, p: &Vector2d) -> Vector2d {
    match &self.distortion {
      Some(distortion) => distortion.add_distortion(p),
      None => *p,
    }
  }

  fn remove_distortion(&self, p: &Vector2d) -> Vector2d {
    match &self.distortion {
      Some(distortion) => distortion.remove_distortion(p),
      None => *p,
    }
  }

  fn get_ud_pixel(&self, p: &Vector2d) -> Vector2d {
    match &self.undistortion {
      Some(undistortion) => undistortion.undistort(p),
      None => self.cam2ima(&self.remove_distortion(&self.ima2cam(p))),
    }
  }

  fn get_d_pixel(&self, p: &Vector2d) -> Vector2d {
    match &self.undistortion {
      Some(undistortion) => undistortion.inverse(p),
      None => self.cam2ima(&self.add_distortion(&self.ima2cam(p))),
    }
  }

  fn distortion_params(&self) -> Vec<f64> {
    self.distortion.as_ref().map(|d| d.parameters().to_vec()).unwrap_or_default()
  }

  fn distortion_params_size(&self) -> usize {
    self.distortion.as_ref().map(|d| d.parameters().len()).unwrap_or(0)
  }

  fn set_distortion_params(&mut self, params: &[f64]) -> Result<()> {
    match &mut self.distortion {
      Some(distortion) => distortion.set_parameters(params),
      None if params.is_empty() => Ok(()),
      None => bail!("No distortion attached, cannot set {} parameters.", params.len()),
    }
  }

  fn d_add_disto_d_point(&self, p: &Vector2d) -> Matrix2d {
    match &self.distortion {
      Some(distortion) => distortion.d_add_distortion_d_point(p),
      None => Matrix2d::identity(),
    }
  }

  fn d_remove_disto_d_point(&self, p: &Vector2d) -> Matrix2d {
    match &self.distortion {
      Some(distortion) => distortion.d_remove_distortion_d_point(p),
      None => Matrix2d::identity(),
    }
  }

  fn d_add_disto_d_disto(&self, p: &Vector2d) -> Matrix2Xd {
    match &self.distortion {
      Some(distortion) => distortion.d_add_distortion_d_params(p),
      None => Matrix2Xd::zeros(0),
    }
  }

  fn d_remove_disto_d_disto(&self, p: &Vector2d) -> Matrix2Xd {
    match &self.distortion {
      Some(distortion) => distortion.d_remove_distortion_d_params(p),
      None => Matrix2Xd::zeros(0),
    }
  }

  // Largest ratio of distorted to undistorted radius over evenly spaced radii.
  fn get_maximal_distortion(&self, min_radius: f64, max_radius: f64) -> f64 {
    let distortion = match &self.distortion {
      Some(distortion) => distortion,
      None => return 1.,
    };
    let lo = min_radius.max(MIN_PROBE_RADIUS);
    let hi = max_radius.max(lo);
    let samples = self.max_distortion_samples.max(2);
    let mut max_ratio = f64::NEG_INFINITY;
    for i in 0..samples {
      let r = lo + (hi - lo) * i as f64 / (samples - 1) as f64;
      let ratio = distortion.add_distortion(&Vector2d::new(r, 0.)).norm() / r;
      if ratio > max_ratio { max_ratio = ratio }
    }
    max_ratio
  }

  fn params(&self) -> Vec<f64> {
    let mut params = self.scale_offset.params();
    params.extend(self.distortion_params());
    params
  }

  fn params_size(&self) -> usize {
    self.scale_offset.params_size() + self.distortion_params_size()
  }

  fn update_from_params(&mut self, params: &[f64]) -> Result<()> {
    if self.base.locked {
      warn!("Rejected parameter update of a locked {} intrinsic.", self.kind());
      bail!("The {} intrinsic is locked.", self.kind());
    }
    if params.len() != self.params_size() {
      warn!("Rejected {} parameters for a {} intrinsic with {}.",
        params.len(), self.kind(), self.params_size());
      bail!("The {} intrinsic has {} parameters, got {}.",
        self.kind(), self.params_size(), params.len());
    }
    let n = self.scale_offset.params_size();
    if let Some(distortion) = &mut self.distortion {
      distortion.set_parameters(&params[n..])?;
    }
    self.scale_offset.apply_params(&params[..n]);
    Ok(())
  }

  fn import_from_params(&mut self, params: &[f64], version: Version) -> Result<()> {
    if version >= SEPARATE_SCALES_VERSION || self.scale_offset.ratio_locked {
      return self.update_from_params(params)
        .context(format!("Failed to import parameters of version {}.", version));
    }
    // Older layout: [focal, ppx, ppy, distortion...].
    if params.is_empty() {
      bail!("Empty parameter vector of version {}.", version);
    }
    let mut expanded = Vec::with_capacity(params.len() + 1);
    expanded.push(params[0]);
    expanded.extend_from_slice(params);
    self.update_from_params(&expanded)
      .context(format!("Failed to import parameters of version {}.", version))
  }

  fn project(&self, pose: &Matrix4d, pt: &Vector4d, apply_distortion: bool) -> Vector2d {
    let X = transform_homogeneous(pose, pt);
    let P = self.law.project_point(&X);
    if apply_distortion {
      self.cam2ima(&self.add_distortion(&P))
    }
    else {
      self.cam2ima(&P)
    }
  }

  fn backproject(
    &self,
    pixel: &Vector2d,
    apply_undistortion: bool,
    pose: &Matrix4d,
    depth: f64,
  ) -> Vector3d {
    let p = if apply_undistortion { self.get_ud_pixel(pixel) } else { *pixel };
    let ray = self.law.to_unit_sphere(&self.ima2cam(&p));
    transform_3d(&inverse_rigid(pose), &(ray * depth))
  }

  fn residual(&self, pose: &Matrix4d, X: &Vector4d, x: &Vector2d) -> Vector2d {
    self.project(pose, X, true) - x
  }

  fn residuals(&self, pose: &Matrix4d, X: &Matrix3Xd, x: &Matrix2Xd) -> Matrix2Xd {
    assert_eq!(X.ncols(), x.ncols());
    let mut r = Matrix2Xd::zeros(X.ncols());
    for i in 0..X.ncols() {
      let Xi = Vector4d::new(X[(0, i)], X[(1, i)], X[(2, i)], 1.);
      let xi = Vector2d::new(x[(0, i)], x[(1, i)]);
      r.set_column(i, &self.residual(pose, &Xi, &xi));
    }
    r
  }

  fn to_unit_sphere(&self, p: &Vector2d) -> Vector3d {
    self.law.to_unit_sphere(p)
  }

  fn d_to_unit_sphere_d_point(&self, p: &Vector2d) -> Matrix32d {
    self.law.d_to_unit_sphere_d_point(p)
  }

  fn is_visible(&self, pixel: &Vector2d) -> bool {
    self.base.contains(pixel) && self.law.is_visible_pixel(pixel)
  }

  fn is_visible_ray(&self, ray: &Vector3d) -> bool {
    self.law.is_visible_ray(ray)
  }

  fn horizontal_fov(&self) -> f64 {
    self.law.horizontal_fov(&self.base, &self.scale_offset)
  }

  fn vertical_fov(&self) -> f64 {
    self.law.vertical_fov(&self.base, &self.scale_offset)
  }

  fn d_project_d_rotation(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix29d {
    let X = transform_homogeneous(pose, pt);
    let d_X_d_R = jacobian_ab_wrt_a::<3, 3, 9>(&pt.xyz());
    self.d_pixel_d_camera_point(&X) * d_X_d_R
  }

  fn d_project_d_pose(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix216d {
    let X = transform_homogeneous(pose, pt);
    let d_X_d_T = jacobian_ab_wrt_a::<4, 4, 16>(pt);
    self.d_pixel_d_camera_point(&X) * d_X_d_T.fixed_slice::<3, 16>(0, 0)
  }

  fn d_project_d_pose_left(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix216d {
    let TX = pose * pt;
    let d_X_d_T = jacobian_ab_wrt_a::<4, 4, 16>(&TX);
    self.d_pixel_d_camera_point(&TX.xyz()) * d_X_d_T.fixed_slice::<3, 16>(0, 0)
  }

  fn d_project_d_point(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix24d {
    let X = transform_homogeneous(pose, pt);
    self.d_pixel_d_camera_point(&X) * pose.fixed_slice::<3, 4>(0, 0)
  }

  fn d_project_d_point3(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix23d {
    let X = transform_homogeneous(pose, pt);
    self.d_pixel_d_camera_point(&X) * pose.fixed_slice::<3, 3>(0, 0)
  }

  fn d_project_d_disto(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix2Xd {
    let (P, _) = self.distorted_camera_point(pose, pt);
    self.scale_offset.d_cam2ima_d_point() * self.d_add_disto_d_disto(&P)
  }

  fn d_project_d_scale(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix2d {
    let (_, P_d) = self.distorted_camera_point(pose, pt);
    self.scale_offset.d_cam2ima_d_scale(&P_d)
  }

  fn d_project_d_principal_point(&self, _pose: &Matrix4d, _pt: &Vector4d) -> Matrix2d {
    self.scale_offset.d_cam2ima_d_principal_point()
  }

  fn d_project_d_params(&self, pose: &Matrix4d, pt: &Vector4d) -> Matrix2Xd {
    let d_scale = self.d_project_d_scale(pose, pt);
    let d_pp = self.d_project_d_principal_point(pose, pt);
    let d_disto = self.d_project_d_disto(pose, pt);
    let mut J = Matrix2Xd::zeros(self.params_size());
    let mut col = 0;
    if self.scale_offset.ratio_locked {
      // scale_y follows scale_x through the locked ratio.
      let ratio = self.scale_offset.locked_ratio();
      J.set_column(col, &(d_scale.column(0) + d_scale.column(1) * ratio));
      col += 1;
    }
    else {
      for i in 0..2 {
        J.set_column(col, &d_scale.column(i));
        col += 1;
      }
    }
    for i in 0..2 {
      J.set_column(col, &d_pp.column(i));
      col += 1;
    }
    for i in 0..d_disto.ncols() {
      J.set_column(col, &d_disto.column(i));
      col += 1;
    }
    J
  }
}
