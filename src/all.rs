// NOTE This kind of import-all file isn't a common Rust idiom.

pub use crate::{
  camera_setup::*,
  distortion::*,
  distortion_fisheye::*,
  distortion_radial::*,
  equidistant::*,
  intrinsic::*,
  intrinsic_base::*,
  math::*,
  parameters::*,
  pinhole::*,
  scale_offset::*,
  types::*,
  undistortion::*,
  version::*,
};

pub use {
  std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
  },
  log::{debug, error, info, warn, LevelFilter},
  nalgebra::{dmatrix, dvector, matrix, vector, DMatrix, DVector},
  anyhow::{anyhow, bail, Context as AnyhowContext, Result},
};
