/// Opaque white RGBA.
pub const PAPER: [u8; 4] = [255, 255, 255, 255];
/// Opaque black RGBA.
pub const INK: [u8; 4] = [0, 0, 0, 255];

/// Uniform RGBA frame.
pub fn canvas_rgba(width: usize, height: usize, color: [u8; 4]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    color.repeat(width * height)
}

/// Paint the half-open rectangle `[x0, x1) × [y0, y1)`.
pub fn fill_rect(
    data: &mut [u8],
    width: usize,
    (x0, y0): (usize, usize),
    (x1, y1): (usize, usize),
    color: [u8; 4],
) {
    for y in y0..y1 {
        for x in x0..x1 {
            let i = (y * width + x) * 4;
            data[i..i + 4].copy_from_slice(&color);
        }
    }
}

/// Full-height ink bar covering columns `[x0, x1)` on paper.
pub fn vertical_bar(width: usize, height: usize, x0: usize, x1: usize) -> Vec<u8> {
    let mut data = canvas_rgba(width, height, PAPER);
    fill_rect(&mut data, width, (x0, 0), (x1, height), INK);
    data
}

/// A line of blocky glyphs: stems, bars and dots of a few stroke widths.
pub fn glyph_line(width: usize, height: usize) -> Vec<u8> {
    assert!(width >= 96 && height >= 40, "glyph line needs 96x40 pixels");
    let mut data = canvas_rgba(width, height, PAPER);
    // "I"
    fill_rect(&mut data, width, (8, 8), (12, 32), INK);
    // "L"
    fill_rect(&mut data, width, (20, 8), (24, 32), INK);
    fill_rect(&mut data, width, (20, 28), (34, 32), INK);
    // "T"
    fill_rect(&mut data, width, (40, 8), (56, 12), INK);
    fill_rect(&mut data, width, (46, 12), (50, 32), INK);
    // "i" with its dot
    fill_rect(&mut data, width, (64, 16), (68, 32), INK);
    fill_rect(&mut data, width, (64, 9), (68, 13), INK);
    // heavy "l"
    fill_rect(&mut data, width, (76, 6), (83, 34), INK);
    data
}

/// Deterministic pseudo-random sequence (64-bit LCG).
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}
