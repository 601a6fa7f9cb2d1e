pub mod cpt;
pub mod reshape;
pub mod wide;

pub use cpt::{CptCapture, CptTrial};
pub use wide::WideLog;
