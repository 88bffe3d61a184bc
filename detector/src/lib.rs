//! Pixel classification for oil-colour detection.
//!
//! Frames of packed RGB565 samples are widened to 24-bit colour and
//! matched exactly against two fixed palettes. Which palettes count is
//! controlled by a process-wide [`ModeRegister`].

pub mod color;
pub mod mode;
pub mod palette;
pub mod scanner;

pub use color::{Rgb565, Rgb888};
pub use mode::{DetectionMode, ModeRegister};
pub use palette::Palette;
pub use scanner::{Classifier, DetectionResult};
