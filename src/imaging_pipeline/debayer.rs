//! Demosaicing of the white-light camera's Bayer stream

pub mod cpu_debayer;
pub mod types;


pub use cpu_debayer::CpuDebayer;
pub use types::{BayerPattern, DebayerConfig};
