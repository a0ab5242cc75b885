// use crate::all::*;

// Eigen-like aliases.
pub type Vector2d = nalgebra::Vector2::<f64>;
pub type Vector3d = nalgebra::Vector3::<f64>;
pub type Vector4d = nalgebra::Vector4::<f64>;
pub type Vectord = nalgebra::DVector::<f64>;
pub type Matrix2d = nalgebra::Matrix2::<f64>;
pub type Matrix3d = nalgebra::Matrix3::<f64>;
pub type Matrix4d = nalgebra::Matrix4::<f64>;
pub type Matrixd = nalgebra::DMatrix::<f64>;

// Jacobian shapes, rows x cols.
pub type Matrix23d = nalgebra::Matrix2x3::<f64>;
pub type Matrix24d = nalgebra::Matrix2x4::<f64>;
pub type Matrix32d = nalgebra::Matrix3x2::<f64>;
pub type Matrix34d = nalgebra::Matrix3x4::<f64>;
pub type Matrix29d = nalgebra::SMatrix::<f64, 2, 9>;
pub type Matrix216d = nalgebra::SMatrix::<f64, 2, 16>;
pub type Matrix39d = nalgebra::SMatrix::<f64, 3, 9>;
pub type Matrix2Xd = nalgebra::Matrix2xX::<f64>;
pub type Matrix3Xd = nalgebra::Matrix3xX::<f64>;
