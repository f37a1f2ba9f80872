//! Raster scan geometry and waveform compilation.

mod geometry;
mod waveform;

pub use geometry::ScanGeometry;
pub use waveform::{WaveformBuffer, WaveformCompiler};
