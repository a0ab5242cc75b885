use crate::all::*;

lazy_static! {
  pub static ref PARAMETER_SET: Mutex<ParameterSet> = Mutex::new(ParameterSet::default());
}

const DEFAULT_UNDISTORT_MAX_ITERATIONS: usize = 20;
const DEFAULT_UNDISTORT_THRESHOLD: f64 = 1e-12;
const DEFAULT_MAX_DISTORTION_SAMPLES: usize = 1000;

// Numerical tuning shared by all camera models. Models copy the values they need
// when constructed so that projection never locks the mutex.
#[derive(Clone, Debug)]
#[derive(clap::Parser)]
pub struct ParameterSet {
  // Newton iterations used to invert distortion functions.
  #[clap(long, default_value_t = DEFAULT_UNDISTORT_MAX_ITERATIONS)]
  pub undistort_max_iterations: usize,
  // Stop the Newton iteration once the update step is shorter than this.
  #[clap(long, default_value_t = DEFAULT_UNDISTORT_THRESHOLD)]
  pub undistort_threshold: f64,

  // Radii sampled by `get_maximal_distortion()`.
  #[clap(long, default_value_t = DEFAULT_MAX_DISTORTION_SAMPLES)]
  pub max_distortion_samples: usize,
}

impl Default for ParameterSet {
  fn default() -> ParameterSet {
    ParameterSet {
      undistort_max_iterations: DEFAULT_UNDISTORT_MAX_ITERATIONS,
      undistort_threshold: DEFAULT_UNDISTORT_THRESHOLD,
      max_distortion_samples: DEFAULT_MAX_DISTORTION_SAMPLES,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonSettings {
  pub max_iterations: usize,
  pub threshold: f64,
}

impl NewtonSettings {
  pub fn from_parameter_set() -> NewtonSettings {
    let p = parameter_set();
    NewtonSettings {
      max_iterations: p.undistort_max_iterations,
      threshold: p.undistort_threshold,
    }
  }
}

// Poisoning is ignored, the set only holds plain values.
pub fn parameter_set() -> MutexGuard<'static, ParameterSet> {
  PARAMETER_SET.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn max_distortion_samples() -> usize {
  let p = parameter_set();
  p.max_distortion_samples
}
