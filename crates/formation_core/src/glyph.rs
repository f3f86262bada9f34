//! 5x7 bitmap font for glyph formations.
//!
//! Each glyph is seven rows, top to bottom; bit 4 of a row is the leftmost
//! column.

pub const GLYPH_COLS: usize = 5;
pub const GLYPH_ROWS: usize = 7;

const DIGITS: [[u8; GLYPH_ROWS]; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
];

const LETTERS: [[u8; GLYPH_ROWS]; 26] = [
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

/// Row bitmap for an ASCII letter or digit (case-insensitive).
pub fn bitmap(c: char) -> Option<&'static [u8; GLYPH_ROWS]> {
    let c = c.to_ascii_uppercase();
    match c {
        '0'..='9' => DIGITS.get(c as usize - '0' as usize),
        'A'..='Z' => LETTERS.get(c as usize - 'A' as usize),
        _ => None,
    }
}

/// Lit `(row, col)` cells of a glyph in row-major order.
pub fn lit_cells(c: char) -> Vec<(usize, usize)> {
    let Some(rows) = bitmap(c) else {
        return Vec::new();
    };
    let mut cells = Vec::new();
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_COLS {
            if bits & (1 << (GLYPH_COLS - 1 - col)) != 0 {
                cells.push((row, col));
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alphanumeric_has_lit_cells() {
        for c in ('0'..='9').chain('A'..='Z') {
            assert!(!lit_cells(c).is_empty(), "glyph {c} is blank");
        }
    }

    #[test]
    fn rows_fit_in_five_columns() {
        for rows in DIGITS.iter().chain(LETTERS.iter()) {
            assert!(rows.iter().all(|r| *r < 0x20));
        }
    }

    #[test]
    fn lowercase_maps_to_uppercase() {
        assert_eq!(bitmap('q'), bitmap('Q'));
        assert!(bitmap('#').is_none());
    }

    #[test]
    fn letter_l_is_left_column_and_base() {
        let cells = lit_cells('L');
        assert_eq!(cells.len(), 6 + 5);
        assert!(cells.contains(&(0, 0)));
        assert!(cells.contains(&(6, 4)));
    }
}
