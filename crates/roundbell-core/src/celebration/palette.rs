use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xRRGGBB` literal.
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const PALETTES: [[u32; 5]; 15] = [
    [0xf43f5e, 0xec4899, 0xd946ef, 0xa855f7, 0x8b5cf6],
    [0x3b82f6, 0x06b6d4, 0x14b8a6, 0x22c55e, 0x84cc16],
    [0xf59e0b, 0xf97316, 0xef4444, 0xeab308, 0xfbbf24],
    [0x8b5cf6, 0x6366f1, 0x3b82f6, 0x06b6d4, 0x0ea5e9],
    [0x22c55e, 0x10b981, 0x14b8a6, 0x06b6d4, 0x0284c7],
    [0xf43f5e, 0xfb923c, 0xfacc15, 0x4ade80, 0x60a5fa],
    [0xe879f9, 0xc084fc, 0x818cf8, 0x60a5fa, 0x38bdf8],
    [0xfbbf24, 0xfb923c, 0xf87171, 0xfca5a5, 0xfdba74],
    [0x34d399, 0x2dd4bf, 0x22d3ee, 0x38bdf8, 0x60a5fa],
    [0xf472b6, 0xfb7185, 0xfda4af, 0xfecdd3, 0xe879f9],
    [0xa78bfa, 0x7c3aed, 0x6d28d9, 0x8b5cf6, 0xc084fc],
    [0xfcd34d, 0xfbbf24, 0xf59e0b, 0xd97706, 0xb45309],
    [0x4ade80, 0x22c55e, 0x16a34a, 0xa3e635, 0x84cc16],
    [0xfb923c, 0xf97316, 0xea580c, 0xfbbf24, 0xf59e0b],
    [0x38bdf8, 0x0ea5e9, 0x0284c7, 0x7dd3fc, 0xbae6fd],
];

/// Ordered colour list particles draw from. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Falls back to white when `colors` is empty.
    pub fn new(colors: Vec<Rgb>) -> Self {
        if colors.is_empty() {
            return Self {
                colors: vec![Rgb::new(255, 255, 255)],
            };
        }
        Self { colors }
    }

    /// Palette for a completed round, cycling through the table.
    pub fn for_round(round: u32) -> Self {
        let row = &PALETTES[round_index(round, PALETTES.len())];
        Self::new(row.iter().map(|&c| Rgb::from_u32(c)).collect())
    }

    /// Every palette flattened, for the finale.
    pub fn everything() -> Self {
        Self::new(
            PALETTES
                .iter()
                .flatten()
                .map(|&c| Rgb::from_u32(c))
                .collect(),
        )
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Leading colour, used for the headline text.
    pub fn accent(&self) -> Rgb {
        self.colors[0]
    }

    pub fn pick<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        self.colors[rng.gen_range(0..self.colors.len())]
    }
}

const MESSAGES: [&str; 15] = [
    "Round Complete!",
    "Keep It Up!",
    "Great Work!",
    "Crushing It!",
    "Stay Strong!",
    "Beast Mode!",
    "On Fire!",
    "Unstoppable!",
    "Power Up!",
    "Level Up!",
    "Nailed It!",
    "Champion!",
    "Let's Go!",
    "No Stopping!",
    "Pure Energy!",
];

pub fn round_message(round: u32) -> &'static str {
    MESSAGES[round_index(round, MESSAGES.len())]
}

/// `(round - 1) mod len`, treating round 0 like round 1.
pub(crate) fn round_index(round: u32, len: usize) -> usize {
    (round.max(1) - 1) as usize % len
}
