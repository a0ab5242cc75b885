use crate::all::*;

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SENSOR_WIDTH: f64 = 36.;
pub const DEFAULT_SENSOR_HEIGHT: f64 = 24.;

// Stable model identity, also used as the serialized type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum IntrinsicKind {
  Pinhole = 1 << 1,
  Equidistant = 1 << 10,
}

impl IntrinsicKind {
  pub fn id(&self) -> u32 {
    *self as u32
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      IntrinsicKind::Pinhole => "pinhole",
      IntrinsicKind::Equidistant => "equidistant",
    }
  }

  pub fn from_id(id: u32) -> Result<IntrinsicKind> {
    match id {
      2 => Ok(IntrinsicKind::Pinhole),
      1024 => Ok(IntrinsicKind::Equidistant),
      _ => bail!("Unknown intrinsic type id {}.", id),
    }
  }
}

impl fmt::Display for IntrinsicKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for IntrinsicKind {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<IntrinsicKind> {
    match s {
      "pinhole" => Ok(IntrinsicKind::Pinhole),
      "equidistant" => Ok(IntrinsicKind::Equidistant),
      _ => bail!("Unknown camera model {}.", s),
    }
  }
}

// How an optimizer should treat the parameters of an intrinsic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EstimatorParameterState {
  Refined,
  Constant,
  Ignored,
}

// Where the initial parameter values came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitializationMode {
  Unknown,
  Calibrated,
  Estimated,
  Computed,
  Guessed,
  None,
}

// Image and sensor geometry plus the bookkeeping every intrinsic carries.
#[derive(Clone, Debug, PartialEq)]
pub struct IntrinsicBase {
  pub w: u32,
  pub h: u32,
  // Millimeters. Only used to report field of view.
  pub sensor_width: f64,
  pub sensor_height: f64,
  pub serial_number: String,
  pub locked: bool,
  pub state: EstimatorParameterState,
  pub initialization_mode: InitializationMode,
  pub distortion_initialization_mode: InitializationMode,
}

impl IntrinsicBase {
  pub fn new(w: u32, h: u32) -> IntrinsicBase {
    IntrinsicBase {
      w,
      h,
      sensor_width: DEFAULT_SENSOR_WIDTH,
      sensor_height: DEFAULT_SENSOR_HEIGHT,
      serial_number: String::new(),
      locked: false,
      state: EstimatorParameterState::Refined,
      initialization_mode: InitializationMode::None,
      distortion_initialization_mode: InitializationMode::None,
    }
  }

  pub fn is_valid(&self) -> bool {
    self.w > 0 && self.h > 0
  }

  pub fn image_center(&self) -> Vector2d {
    Vector2d::new(self.w as f64 * 0.5, self.h as f64 * 0.5)
  }

  // Pixel inside the image bounds.
  pub fn contains(&self, pixel: &Vector2d) -> bool {
    pixel[0] >= 0. && pixel[1] >= 0.
      && pixel[0] < self.w as f64 && pixel[1] < self.h as f64
  }

  pub fn initialize_state(&mut self) {
    self.state = if self.locked {
      EstimatorParameterState::Constant
    }
    else {
      EstimatorParameterState::Refined
    };
  }

  pub fn rescale(&mut self, factor_w: f64, factor_h: f64) {
    self.w = (self.w as f64 * factor_w).round() as u32;
    self.h = (self.h as f64 * factor_h).round() as u32;
  }
}

impl Default for IntrinsicBase {
  fn default() -> IntrinsicBase {
    IntrinsicBase::new(1, 1)
  }
}
