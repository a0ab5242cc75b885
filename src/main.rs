use intrinsics::all::*;
use intrinsics::util;

use clap::Parser;

#[derive(Parser)]
struct Args {
  // Folder containing `calibration.json`, or a subfolder of it.
  #[clap(short)]
  input_folder: String,
  #[clap(flatten)]
  parameters: ParameterSet,
}

fn handle_error(err: &anyhow::Error) {
  for (i, e) in err.chain().enumerate() {
    println!("  {}: {}", i + 1, e);
  }
}

fn main() {
  if let Err(err) = run() {
    handle_error(&err);
    std::process::exit(1);
  }
}

fn run() -> Result<()> {
  let args = Args::parse();
  env_logger::Builder::new()
    .filter_level(LevelFilter::Info)
    .parse_default_env()
    .format(util::format_log)
    .init();
  *parameter_set() = args.parameters;

  let input_folder_path = Path::new(&args.input_folder);
  let cameras = Camera::load(input_folder_path)?;
  for (i, camera) in cameras.iter().enumerate() {
    report(i, camera.intrinsic.as_ref());
  }
  Ok(())
}

fn report(i: usize, intrinsic: &dyn IntrinsicModel) {
  info!("Camera {}: {} {}x{}, valid: {}, locked: {}.",
    i, intrinsic.kind(), intrinsic.w(), intrinsic.h(), intrinsic.is_valid(), intrinsic.is_locked());
  info!("  FOV {:.4} x {:.4} rad, params {:?}.",
    intrinsic.horizontal_fov(), intrinsic.vertical_fov(), intrinsic.params());
  if intrinsic.has_distortion() {
    // Normalized radius of the image corner farthest from the principal point.
    let max_radius = [(0., 0.), (intrinsic.w() as f64, 0.), (0., intrinsic.h() as f64),
      (intrinsic.w() as f64, intrinsic.h() as f64)]
      .iter()
      .map(|&(x, y)| intrinsic.ima2cam(&Vector2d::new(x, y)).norm())
      .fold(0., f64::max);
    info!("  Maximal distortion {:.6} up to radius {:.4}.",
      intrinsic.get_maximal_distortion(0., max_radius), max_radius);
  }
}
