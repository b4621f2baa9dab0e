//! WL/NIR overlay composition

pub mod blend;


pub use blend::{Compositor, DEFAULT_OPACITY};
