use crate::all::*;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct DistortionSetup {
  #[serde(rename = "type")]
  pub kind: String,
  pub params: Vec<f64>,
}

#[derive(Deserialize)]
#[allow(non_snake_case)]
pub struct CameraSetup {
  pub model: String,
  pub width: u32,
  pub height: u32,
  pub focalLengthX: f64,
  pub focalLengthY: Option<f64>,
  pub principalPointX: f64,
  pub principalPointY: f64,
  pub sensorWidth: Option<f64>,
  pub sensorHeight: Option<f64>,
  pub serialNumber: Option<String>,
  // Field stop, equidistant only.
  pub circleRadius: Option<f64>,
  pub circleCenterX: Option<f64>,
  pub circleCenterY: Option<f64>,
  pub distortion: Option<DistortionSetup>,
  #[serde(default)]
  pub locked: bool,
}

#[derive(Deserialize)]
pub struct CameraSetupRoot {
  pub cameras: Vec<CameraSetup>,
}

pub struct Camera {
  pub intrinsic: Box<dyn IntrinsicModel>,
}

const MAX_PARENT_DIRECTORY_HEIGHT: usize = 1;
const SETUP_FILE_NAME: &'static str = "calibration.json";

impl Camera {
  // Looks for the setup file in `path` and its parent directories.
  pub fn load(path: &Path) -> Result<Vec<Camera>> {
    let mut dir = Some(path);
    for _ in 0..(MAX_PARENT_DIRECTORY_HEIGHT + 1) {
      let d = match dir {
        Some(d) => d,
        None => break,
      };
      let setup_path = d.join(SETUP_FILE_NAME);
      if setup_path.exists() {
        return parse_setup(&setup_path);
      }
      dir = d.parent();
    }
    bail!("Failed to find a {} near {}.", SETUP_FILE_NAME, path.display());
  }
}

pub fn parse_setup(path: &Path) -> Result<Vec<Camera>> {
  let s = std::fs::read_to_string(path)
    .context(format!("Failed to read file {}.", path.display()))?;
  let cameras = parse_setup_str(&s)
    .context(format!("Failed to parse {}.", path.display()))?;
  info!("Loaded {} camera(s) from {}.", cameras.len(), path.display());
  Ok(cameras)
}

pub fn parse_setup_str(s: &str) -> Result<Vec<Camera>> {
  let root: CameraSetupRoot = serde_json::from_str(s)?;
  root.cameras.into_iter()
    .enumerate()
    .map(|(i, x)| convert_setup(x).context(format!("Invalid camera {}.", i)))
    .collect::<Result<Vec<_>>>()
}

fn convert_setup(d: CameraSetup) -> Result<Camera> {
  let kind: IntrinsicKind = d.model.parse()?;
  let focal_length_y = d.focalLengthY.unwrap_or(d.focalLengthX);
  let intrinsic = match kind {
    IntrinsicKind::Pinhole => {
      if d.circleRadius.is_some() || d.circleCenterX.is_some() || d.circleCenterY.is_some() {
        bail!("Field stop circle given for a pinhole camera.");
      }
      let intrinsic = Pinhole::new(
        d.width, d.height, d.focalLengthX, focal_length_y, d.principalPointX, d.principalPointY);
      finish_setup(intrinsic, &d)?
    },
    IntrinsicKind::Equidistant => {
      let mut intrinsic = Equidistant::new(
        d.width, d.height, d.focalLengthX, d.principalPointX, d.principalPointY);
      intrinsic.set_scale(Vector2d::new(d.focalLengthX, focal_length_y));
      intrinsic.set_initial_scale(Vector2d::new(d.focalLengthX, focal_length_y));
      if let Some(radius) = d.circleRadius { intrinsic.set_circle_radius(radius) }
      if let Some(x) = d.circleCenterX { intrinsic.set_circle_center_x(x) }
      if let Some(y) = d.circleCenterY { intrinsic.set_circle_center_y(y) }
      finish_setup(intrinsic, &d)?
    },
  };
  Ok(Camera { intrinsic })
}

fn finish_setup<L: ProjectionLaw>(
  mut intrinsic: Intrinsic<L>,
  d: &CameraSetup,
) -> Result<Box<dyn IntrinsicModel>> {
  if let Some(w) = d.sensorWidth { intrinsic.set_sensor_width(w) }
  if let Some(h) = d.sensorHeight { intrinsic.set_sensor_height(h) }
  if let Some(serial_number) = &d.serialNumber {
    intrinsic.set_serial_number(serial_number.clone());
  }
  if let Some(distortion) = &d.distortion {
    intrinsic.set_distortion(Some(distortion_from_name(&distortion.kind, &distortion.params)?));
    intrinsic.set_distortion_initialization_mode(InitializationMode::Calibrated);
  }
  intrinsic.set_initialization_mode(InitializationMode::Calibrated);
  if d.locked {
    intrinsic.lock();
  }
  intrinsic.initialize_state();
  if !intrinsic.is_valid() {
    bail!("Invalid {} intrinsic {}x{}.", intrinsic.kind(), intrinsic.w(), intrinsic.h());
  }
  Ok(Box::new(intrinsic))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SETUP: &str = r#"{
    "cameras": [
      {
        "model": "pinhole",
        "width": 752, "height": 480,
        "focalLengthX": 458.654, "focalLengthY": 457.296,
        "principalPointX": 367.215, "principalPointY": 248.375,
        "distortion": { "type": "radialk3", "params": [-0.28340811, 0.07395907, 0.00019359] },
        "serialNumber": "cam0",
        "locked": true
      },
      {
        "model": "equidistant",
        "width": 1000, "height": 800,
        "focalLengthX": 300.0,
        "principalPointX": 500.0, "principalPointY": 400.0,
        "sensorWidth": 6.4, "sensorHeight": 4.8,
        "circleRadius": 380.0,
        "distortion": { "type": "fisheye4", "params": [0.01, 0.0, 0.0, 0.0] }
      }
    ]
  }"#;

  #[test]
  fn test_parse_setup() {
    let cameras = parse_setup_str(SETUP).unwrap();
    assert_eq!(cameras.len(), 2);

    let c = &cameras[0].intrinsic;
    assert_eq!(c.kind(), IntrinsicKind::Pinhole);
    assert_eq!((c.w(), c.h()), (752, 480));
    assert_eq!(c.scale(), Vector2d::new(458.654, 457.296));
    assert_eq!(c.principal_point(), Vector2d::new(367.215, 248.375));
    assert_eq!(c.distortion_params(), vec![-0.28340811, 0.07395907, 0.00019359]);
    assert_eq!(c.serial_number(), "cam0");
    assert!(c.is_locked());
    assert_eq!(c.state(), EstimatorParameterState::Constant);
    assert_eq!(c.sensor_width(), DEFAULT_SENSOR_WIDTH);

    let c = &cameras[1].intrinsic;
    assert_eq!(c.kind(), IntrinsicKind::Equidistant);
    assert_eq!(c.scale(), Vector2d::new(300., 300.));
    assert_eq!(c.sensor_width(), 6.4);
    assert_eq!(c.distortion().map(|d| d.name()), Some("fisheye4"));
    assert!(!c.is_locked());
    assert_eq!(c.initialization_mode(), InitializationMode::Calibrated);
    // Circle radius 380 around the image center.
    assert!(c.is_visible(&Vector2d::new(500., 25.)));
    assert!(!c.is_visible(&Vector2d::new(500., 15.)));
  }

  #[test]
  fn test_parse_setup_errors() {
    assert!(parse_setup_str("{}").is_err());
    let bad_model = SETUP.replace("\"pinhole\"", "\"orthographic\"");
    assert!(parse_setup_str(&bad_model).is_err());
    let bad_distortion = SETUP.replace("[0.01, 0.0, 0.0, 0.0]", "[0.01]");
    assert!(parse_setup_str(&bad_distortion).is_err());
    let invalid = SETUP.replace("\"focalLengthX\": 300.0", "\"focalLengthX\": 0.0");
    assert!(parse_setup_str(&invalid).is_err());
    let circle_on_pinhole = r#"{ "cameras": [ { "model": "pinhole", "width": 10, "height": 10,
      "focalLengthX": 5.0, "principalPointX": 5.0, "principalPointY": 5.0,
      "circleRadius": 3.0 } ] }"#;
    assert!(parse_setup_str(circle_on_pinhole).is_err());
  }

  #[test]
  fn test_load_from_parent_directory() {
    let root = std::env::temp_dir().join(format!("intrinsics-setup-{}", std::process::id()));
    let child = root.join("video");
    std::fs::create_dir_all(&child).unwrap();
    std::fs::write(root.join(SETUP_FILE_NAME), SETUP).unwrap();
    let cameras = Camera::load(&child).unwrap();
    assert_eq!(cameras.len(), 2);
    assert_eq!(cameras[1].intrinsic.type_str(), "equidistant");
    std::fs::remove_dir_all(&root).unwrap();
  }

  #[test]
  fn test_load_missing_setup() {
    let dir = std::env::temp_dir().join("intrinsics-no-such-directory").join("sub");
    assert!(Camera::load(&dir).is_err());
  }
}
