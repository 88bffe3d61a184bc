use std::collections::HashSet;

use crate::color::Rgb888;

/// Fresh cooking oils: golden, yellow and greenish tones.
pub const GOOD_OIL_COLORS: [(Rgb888, &str); 11] = [
    (Rgb888::new(0xB5A642), "olive oil (extra virgin)"),
    (Rgb888::new(0xE1C16E), "olive oil (refined)"),
    (Rgb888::new(0xF3D673), "vegetable oil"),
    (Rgb888::new(0xF4E3B2), "canola oil"),
    (Rgb888::new(0xF7D86F), "sunflower oil"),
    (Rgb888::new(0xF6C453), "corn oil"),
    (Rgb888::new(0xEEC373), "peanut oil"),
    (Rgb888::new(0xD9A441), "sesame oil (light)"),
    (Rgb888::new(0xFFD700), "palm oil (refined)"),
    (Rgb888::new(0x6A8A2F), "avocado oil"),
    (Rgb888::new(0xC0D860), "grapeseed oil"),
];

/// Degraded oils, from burnt to lightly used.
pub const BAD_OIL_COLORS: [(Rgb888, &str); 4] = [
    (Rgb888::new(0x5A3E2B), "burnt oil"),
    (Rgb888::new(0xA35C2B), "heavily used oil"),
    (Rgb888::new(0xC68942), "moderately used oil"),
    (Rgb888::new(0xE1B96A), "lightly used oil"),
];

/// A fixed set of reference colours for one classification category.
///
/// Membership is exact equality on the 24-bit value; there is no
/// nearest-colour tolerance.
#[derive(Debug, Clone)]
pub struct Palette {
    name: &'static str,
    colors: HashSet<Rgb888>,
}

impl Palette {
    pub fn new(name: &'static str, colors: impl IntoIterator<Item = Rgb888>) -> Self {
        Self {
            name,
            colors: colors.into_iter().collect(),
        }
    }

    pub fn good_oil() -> Self {
        Self::new("good", GOOD_OIL_COLORS.iter().map(|(c, _)| *c))
    }

    pub fn bad_oil() -> Self {
        Self::new("bad", BAD_OIL_COLORS.iter().map(|(c, _)| *c))
    }

    #[inline]
    pub fn contains(&self, color: Rgb888) -> bool {
        self.colors.contains(&color)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Entries no quantized RGB565 sample can produce, in ascending order.
    ///
    /// Quantization zero-fills the low bits of every channel, so a colour
    /// with any of those bits set is never matched.
    pub fn unreachable(&self) -> Vec<Rgb888> {
        let mut colors: Vec<_> = self
            .colors
            .iter()
            .copied()
            .filter(|c| c.r() & 0x07 != 0 || c.g() & 0x03 != 0 || c.b() & 0x07 != 0)
            .collect();
        colors.sort();
        colors
    }
}
