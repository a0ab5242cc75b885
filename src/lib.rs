#![allow(non_snake_case)]

pub mod all;
pub mod camera_setup;
pub mod distortion;
pub mod distortion_fisheye;
pub mod distortion_radial;
pub mod equidistant;
pub mod intrinsic;
pub mod intrinsic_base;
pub mod math;
pub mod parameters;
pub mod pinhole;
pub mod scale_offset;
pub mod types;
pub mod undistortion;
pub mod util;
pub mod version;

#[cfg(test)]
mod test_utils;

#[macro_use] extern crate lazy_static;
