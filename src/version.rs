use crate::all::*;

use std::fmt;
use std::str::FromStr;

// Version of a serialized parameter vector layout. Ordered field by field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
  pub major: u32,
  pub minor: u32,
  pub patch: u32,
}

impl Version {
  pub const fn new(major: u32, minor: u32, patch: u32) -> Version {
    Version { major, minor, patch }
  }
}

// Layout written by `params()` of this crate.
pub const CURRENT_PARAMS_VERSION: Version = Version::new(1, 2, 0);

// Before this version a single focal length was stored instead of one scale per axis.
pub const SEPARATE_SCALES_VERSION: Version = Version::new(1, 2, 0);

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
  }
}

impl FromStr for Version {
  type Err = anyhow::Error;

  // Accepts "major", "major.minor" or "major.minor.patch".
  fn from_str(s: &str) -> Result<Version> {
    let mut v = [0u32; 3];
    let mut n = 0;
    for token in s.trim().split('.') {
      if n == 3 { bail!("Too many components in version string {}.", s) }
      v[n] = token.parse()
        .context(format!("Failed to parse version string {}.", s))?;
      n += 1;
    }
    Ok(Version::new(v[0], v[1], v[2]))
  }
}
