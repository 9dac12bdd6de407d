use rand::Rng;
use std::fmt;

/// Colour of the elapsed-time label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelColor {
    #[default]
    Default,
    Flash(Rgb),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_u24(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::from_u24(rng.gen_range(0..0xFF_FFFF))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// True when the minute part (within the hour) is non-zero and equals the
/// second part, e.g. 1:01, 2:02 ... 59:59.
pub fn is_flash_second(elapsed_secs: i64) -> bool {
    if elapsed_secs < 0 {
        return false;
    }
    let minutes = (elapsed_secs % 3600) / 60;
    let seconds = elapsed_secs % 60;
    minutes > 0 && minutes == seconds
}

/// Label colour for a clock tick at `elapsed_secs`
pub fn label_color<R: Rng>(elapsed_secs: i64, rng: &mut R) -> LabelColor {
    if is_flash_second(elapsed_secs) {
        LabelColor::Flash(Rgb::random(rng))
    } else {
        LabelColor::Default
    }
}
