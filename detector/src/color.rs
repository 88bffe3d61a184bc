use std::fmt;

/// A packed 5-6-5 sample as delivered by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb565(pub u16);

/// A 24-bit colour, `0x00RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb888(u32);

impl Rgb565 {
    /// Decode one sample from the frame buffer's native byte order.
    #[inline]
    pub fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    /// Pack an 8-bit-per-channel colour, truncating the low bits.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Widen to 8 bits per channel.
    ///
    /// Each field is shifted into the top of its byte and the low bits are
    /// left zero. Palette matching is exact, so this must stay bit-exact:
    /// `0xFFFF` widens to `0xF8FCF8`, not `0xFFFFFF`.
    #[inline]
    pub fn quantize(self) -> Rgb888 {
        let s = self.0 as u32;
        let r = (s >> 8) & 0xF8;
        let g = (s >> 3) & 0xFC;
        let b = (s << 3) & 0xF8;
        Rgb888((r << 16) | (g << 8) | b)
    }

    pub fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

impl Rgb888 {
    /// Build from a `0xRRGGBB` literal. Bits above 24 are dropped.
    pub const fn new(hex: u32) -> Self {
        Self(hex & 0x00FF_FFFF)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Rgb888 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}
