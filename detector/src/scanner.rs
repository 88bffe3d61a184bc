use oilcam_common::frame::{Frame, SAMPLE_WIDTH};
use serde::Serialize;
use tracing::debug;

use crate::color::{Rgb565, Rgb888};
use crate::mode::{DetectionMode, ModeRegister};
use crate::palette::Palette;

/// Per-frame match counts, serialized as the `/detect` response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    #[serde(rename = "good_oil")]
    pub good: u64,
    #[serde(rename = "bad_oil")]
    pub bad: u64,
}

/// Classifies samples against a good and a bad palette.
#[derive(Debug, Clone)]
pub struct Classifier {
    good: Palette,
    bad: Palette,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Palette::good_oil(), Palette::bad_oil())
    }
}

impl Classifier {
    pub fn new(good: Palette, bad: Palette) -> Self {
        Self { good, bad }
    }

    /// A disabled category never matches, whatever the palette holds.
    #[inline]
    pub fn matches_good(&self, mode: DetectionMode, color: Rgb888) -> bool {
        mode.good_enabled() && self.good.contains(color)
    }

    #[inline]
    pub fn matches_bad(&self, mode: DetectionMode, color: Rgb888) -> bool {
        mode.bad_enabled() && self.bad.contains(color)
    }

    /// Count matches over every whole sample in `buf` under a fixed mode.
    ///
    /// Both palettes are tested for every sample; a colour present in both
    /// increments both counters.
    pub fn scan(&self, buf: &[u8], mode: DetectionMode) -> DetectionResult {
        let mut result = DetectionResult::default();
        if mode == DetectionMode::Disabled {
            return result;
        }
        for chunk in buf.chunks_exact(SAMPLE_WIDTH) {
            let color = Rgb565::from_le_bytes([chunk[0], chunk[1]]).quantize();
            if self.matches_good(mode, color) {
                result.good += 1;
            }
            if self.matches_bad(mode, color) {
                result.bad += 1;
            }
        }
        result
    }

    /// Scan a captured frame, reading the shared mode once up front.
    ///
    /// A mode switch that lands mid-scan applies to the next frame.
    pub fn scan_frame(&self, frame: &Frame, register: &ModeRegister) -> DetectionResult {
        let mode = register.get();
        let result = self.scan(frame.as_bytes(), mode);
        debug!(
            seq = frame.seq,
            samples = frame.sample_count(),
            %mode,
            good = result.good,
            bad = result.bad,
            "frame scanned"
        );
        result
    }

    pub fn good_palette(&self) -> &Palette {
        &self.good
    }

    pub fn bad_palette(&self) -> &Palette {
        &self.bad
    }
}
