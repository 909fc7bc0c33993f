pub mod generate;

pub use generate::{alternating, interleave, rms, sine, temp_path};
