use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Sequential colour ramps for the charts
// ---------------------------------------------------------------------------

/// A sequential colour ramp defined by a few sRGB stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Dark purple → teal → yellow.
    Viridis,
    /// Deep blue → magenta → yellow.
    Plasma,
}

impl Ramp {
    fn stops(self) -> [[u8; 3]; 3] {
        match self {
            Ramp::Viridis => [[0x44, 0x01, 0x54], [0x21, 0x91, 0x8c], [0xfd, 0xe7, 0x25]],
            Ramp::Plasma => [[0x0d, 0x08, 0x87], [0xcc, 0x47, 0x78], [0xf0, 0xf9, 0x21]],
        }
    }

    /// Colour at position `t` in `[0, 1]`, interpolated in linear RGB.
    pub fn at(self, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let stops = self.stops().map(|[r, g, b]| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        });
        let (from, to, local) = if t <= 0.5 {
            (stops[0], stops[1], t * 2.0)
        } else {
            (stops[1], stops[2], (t - 0.5) * 2.0)
        };
        let rgb: Srgb<u8> = Srgb::from_linear(from.mix(to, local));
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }
}

/// `n` colours evenly spread along `ramp`, first bar darkest.
pub fn generate_palette(ramp: Ramp, n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![ramp.at(0.0)],
        _ => (0..n)
            .map(|i| ramp.at(i as f32 / (n - 1) as f32))
            .collect(),
    }
}
