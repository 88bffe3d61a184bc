use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Which palettes a scan counts.
///
/// `All` is only ever the start-up state: selectors switch between the
/// three exclusive modes and none of them restores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    #[default]
    All,
    GoodOnly,
    BadOnly,
    Disabled,
}

impl DetectionMode {
    /// Map an `oil=` query value to a mode.
    ///
    /// Only the exact strings `good` and `bad` are recognised; anything
    /// else, including the empty string, disables detection.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "good" => Self::GoodOnly,
            "bad" => Self::BadOnly,
            _ => Self::Disabled,
        }
    }

    pub fn good_enabled(self) -> bool {
        matches!(self, Self::All | Self::GoodOnly)
    }

    pub fn bad_enabled(self) -> bool {
        matches!(self, Self::All | Self::BadOnly)
    }

    fn to_bits(self) -> u8 {
        match self {
            Self::All => 0,
            Self::GoodOnly => 1,
            Self::BadOnly => 2,
            Self::Disabled => 3,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::All,
            1 => Self::GoodOnly,
            2 => Self::BadOnly,
            _ => Self::Disabled,
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::GoodOnly => "good",
            Self::BadOnly => "bad",
            Self::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// Shared detection mode, written by the control endpoint and read by scans.
///
/// Both flags live in one atomic byte so a reader never sees half of a
/// mode switch.
#[derive(Debug, Default)]
pub struct ModeRegister {
    bits: AtomicU8,
}

impl ModeRegister {
    pub fn new(mode: DetectionMode) -> Self {
        Self {
            bits: AtomicU8::new(mode.to_bits()),
        }
    }

    pub fn get(&self) -> DetectionMode {
        DetectionMode::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, mode: DetectionMode) {
        self.bits.store(mode.to_bits(), Ordering::Release);
    }

    /// Apply an `oil=` selector and return the mode now in effect.
    pub fn apply_selector(&self, selector: &str) -> DetectionMode {
        let mode = DetectionMode::from_selector(selector);
        self.set(mode);
        mode
    }
}
