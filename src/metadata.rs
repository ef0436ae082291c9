use std::fmt::{Display, Error, Formatter};
use std::ops::{Deref, Not};

use crate::codec::Mode;
use crate::error::{QRError, QRResult};

// Color of a module
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Color {
    Light,
    Dark,
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl Color {
    pub fn select<T>(self, dark: T, light: T) -> T {
        match self {
            Self::Dark => dark,
            Self::Light => light,
        }
    }
}

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    /// Maps the FFI integer convention (0=L, 1=M, 2=Q, 3=H) to a level,
    /// falling back to M for out-of-range values like the original engine.
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::L,
            2 => Self::Q,
            3 => Self::H,
            _ => Self::M,
        }
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        f.write_str(match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        })
    }
}

// Symbol version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct Version(u8);

impl Version {
    pub fn new(v: usize) -> QRResult<Self> {
        if (1..=40).contains(&v) {
            Ok(Self(v as u8))
        } else {
            Err(QRError::InvalidInput)
        }
    }

    pub const fn width(self) -> i16 {
        self.0 as i16 * 4 + 17
    }

    pub fn total_codewords(self) -> usize {
        TOTAL_CODEWORDS[self.0 as usize - 1]
    }

    pub fn ecc_per_block(self, ecl: ECLevel) -> usize {
        BLOCK_STRUCTURE[self.0 as usize - 1][ecl as usize].0
    }

    /// Block split as (block1 size, block1 count, block2 size, block2 count).
    /// Block2 sizes are always block1 size + 1 when present.
    pub fn data_codewords_per_block(self, ecl: ECLevel) -> (usize, usize, usize, usize) {
        let (_, c1, s1, c2, s2) = BLOCK_STRUCTURE[self.0 as usize - 1][ecl as usize];
        (s1, c1, s2, c2)
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        let (_, c1, s1, c2, s2) = BLOCK_STRUCTURE[self.0 as usize - 1][ecl as usize];
        c1 * s1 + c2 * s2
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        self.data_codewords(ecl) << 3
    }

    pub fn alignment_pattern(self) -> &'static [i16] {
        ALIGNMENT_PATTERN_POSITIONS[self.0 as usize - 1]
    }

    /// Leftover bits in the encoding region after all codewords are placed.
    pub fn remainder_bits(self) -> usize {
        match self.0 {
            2..=6 => 7,
            14..=20 | 28..=34 => 3,
            21..=27 => 4,
            _ => 0,
        }
    }

    pub const fn mode_bits(self) -> usize {
        4
    }

    pub fn char_cnt_bits(self, mode: Mode) -> usize {
        match self.0 {
            1..=9 => match mode {
                Mode::Numeric => 10,
                Mode::Alphanumeric => 9,
                Mode::Byte => 8,
                Mode::Kanji => 8,
            },
            10..=26 => match mode {
                Mode::Numeric => 12,
                Mode::Alphanumeric => 11,
                Mode::Byte => 16,
                Mode::Kanji => 10,
            },
            _ => match mode {
                Mode::Numeric => 14,
                Mode::Alphanumeric => 13,
                Mode::Byte => 16,
                Mode::Kanji => 12,
            },
        }
    }

    /// 18-bit version information (6 data bits + 12-bit BCH remainder),
    /// present for versions 7 and above.
    pub fn info(self) -> u32 {
        debug_assert!(self.0 >= 7, "Version info only exists for version >= 7");

        let data = (self.0 as u32) << 12;
        data | bch_residue(data, VERSION_INFO_GENERATOR)
    }
}

impl Deref for Version {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.0)
    }
}

// Format information
//------------------------------------------------------------------------------

pub const FORMAT_INFO_BIT_LEN: usize = 15;
pub const VERSION_INFO_BIT_LEN: usize = 18;

static FORMAT_INFO_GENERATOR: u32 = 0b101_0011_0111;
static VERSION_INFO_GENERATOR: u32 = 0b1_1111_0010_0101;
static FORMAT_INFO_MASK: u32 = 0b101_0100_0001_0010;

/// 15-bit format information: 2 EC-level bits and 3 mask bits protected by a
/// 10-bit BCH remainder, XORed with the standard masking constant.
pub fn format_info(ecl: ECLevel, mask_pattern: u8) -> u32 {
    debug_assert!(mask_pattern < 8, "Invalid masking pattern");

    let data = ((ecl as u32 ^ 1) << 3 | mask_pattern as u32) << 10;
    (data | bch_residue(data, FORMAT_INFO_GENERATOR)) ^ FORMAT_INFO_MASK
}

// Polynomial remainder over GF(2), dividend and generator as bit patterns
fn bch_residue(mut dividend: u32, generator: u32) -> u32 {
    let glen = 32 - generator.leading_zeros();
    while 32 - dividend.leading_zeros() >= glen {
        dividend ^= generator << (32 - dividend.leading_zeros() - glen);
    }
    dividend
}

// Global constants
//------------------------------------------------------------------------------

static TOTAL_CODEWORDS: [usize; 40] = [
    26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991,
    1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761,
    2876, 3034, 3196, 3362, 3532, 3706,
];

// Per version and EC level: (ec codewords per block, block1 count, block1
// data codewords, block2 count, block2 data codewords)
static BLOCK_STRUCTURE: [[(usize, usize, usize, usize, usize); 4]; 40] = [
    [(7, 1, 19, 0, 0), (10, 1, 16, 0, 0), (13, 1, 13, 0, 0), (17, 1, 9, 0, 0)],
    [(10, 1, 34, 0, 0), (16, 1, 28, 0, 0), (22, 1, 22, 0, 0), (28, 1, 16, 0, 0)],
    [(15, 1, 55, 0, 0), (26, 1, 44, 0, 0), (18, 2, 17, 0, 0), (22, 2, 13, 0, 0)],
    [(20, 1, 80, 0, 0), (18, 2, 32, 0, 0), (26, 2, 24, 0, 0), (16, 4, 9, 0, 0)],
    [(26, 1, 108, 0, 0), (24, 2, 43, 0, 0), (18, 2, 15, 2, 16), (22, 2, 11, 2, 12)],
    [(18, 2, 68, 0, 0), (16, 4, 27, 0, 0), (24, 4, 19, 0, 0), (28, 4, 15, 0, 0)],
    [(20, 2, 78, 0, 0), (18, 4, 31, 0, 0), (18, 2, 14, 4, 15), (26, 4, 13, 1, 14)],
    [(24, 2, 97, 0, 0), (22, 2, 38, 2, 39), (22, 4, 18, 2, 19), (26, 4, 14, 2, 15)],
    [(30, 2, 116, 0, 0), (22, 3, 36, 2, 37), (20, 4, 16, 4, 17), (24, 4, 12, 4, 13)],
    [(18, 2, 68, 2, 69), (26, 4, 43, 1, 44), (24, 6, 19, 2, 20), (28, 6, 15, 2, 16)],
    [(20, 4, 81, 0, 0), (30, 1, 50, 4, 51), (28, 4, 22, 4, 23), (24, 3, 12, 8, 13)],
    [(24, 2, 92, 2, 93), (22, 6, 36, 2, 37), (26, 4, 20, 6, 21), (28, 7, 14, 4, 15)],
    [(26, 4, 107, 0, 0), (22, 8, 37, 1, 38), (24, 8, 20, 4, 21), (22, 12, 11, 4, 12)],
    [(30, 3, 115, 1, 116), (24, 4, 40, 5, 41), (20, 11, 16, 5, 17), (24, 11, 12, 5, 13)],
    [(22, 5, 87, 1, 88), (24, 5, 41, 5, 42), (30, 5, 24, 7, 25), (24, 11, 12, 7, 13)],
    [(24, 5, 98, 1, 99), (28, 7, 45, 3, 46), (24, 15, 19, 2, 20), (30, 3, 15, 13, 16)],
    [(28, 1, 107, 5, 108), (28, 10, 46, 1, 47), (28, 1, 22, 15, 23), (28, 2, 14, 17, 15)],
    [(30, 5, 120, 1, 121), (26, 9, 43, 4, 44), (28, 17, 22, 1, 23), (28, 2, 14, 19, 15)],
    [(28, 3, 113, 4, 114), (26, 3, 44, 11, 45), (26, 17, 21, 4, 22), (26, 9, 13, 16, 14)],
    [(28, 3, 107, 5, 108), (26, 3, 41, 13, 42), (30, 15, 24, 5, 25), (28, 15, 15, 10, 16)],
    [(28, 4, 116, 4, 117), (26, 17, 42, 0, 0), (28, 17, 22, 6, 23), (30, 19, 16, 6, 17)],
    [(28, 2, 111, 7, 112), (28, 17, 46, 0, 0), (30, 7, 24, 16, 25), (24, 34, 13, 0, 0)],
    [(30, 4, 121, 5, 122), (28, 4, 47, 14, 48), (30, 11, 24, 14, 25), (30, 16, 15, 14, 16)],
    [(30, 6, 117, 4, 118), (28, 6, 45, 14, 46), (30, 11, 24, 16, 25), (30, 30, 16, 2, 17)],
    [(26, 8, 106, 4, 107), (28, 8, 47, 13, 48), (30, 7, 24, 22, 25), (30, 22, 15, 13, 16)],
    [(28, 10, 114, 2, 115), (28, 19, 46, 4, 47), (28, 28, 22, 6, 23), (30, 33, 16, 4, 17)],
    [(30, 8, 122, 4, 123), (28, 22, 45, 3, 46), (30, 8, 23, 26, 24), (30, 12, 15, 28, 16)],
    [(30, 3, 117, 10, 118), (28, 3, 45, 23, 46), (30, 4, 24, 31, 25), (30, 11, 15, 31, 16)],
    [(30, 7, 116, 7, 117), (28, 21, 45, 7, 46), (30, 1, 23, 37, 24), (30, 19, 15, 26, 16)],
    [(30, 5, 115, 10, 116), (28, 19, 47, 10, 48), (30, 15, 24, 25, 25), (30, 23, 15, 25, 16)],
    [(30, 13, 115, 3, 116), (28, 2, 46, 29, 47), (30, 42, 24, 1, 25), (30, 23, 15, 28, 16)],
    [(30, 17, 115, 0, 0), (28, 10, 46, 23, 47), (30, 10, 24, 35, 25), (30, 19, 15, 35, 16)],
    [(30, 17, 115, 1, 116), (28, 14, 46, 21, 47), (30, 29, 24, 19, 25), (30, 11, 15, 46, 16)],
    [(30, 13, 115, 6, 116), (28, 14, 46, 23, 47), (30, 44, 24, 7, 25), (30, 59, 16, 1, 17)],
    [(30, 12, 121, 7, 122), (28, 12, 47, 26, 48), (30, 39, 24, 14, 25), (30, 22, 15, 41, 16)],
    [(30, 6, 121, 14, 122), (28, 6, 47, 34, 48), (30, 46, 24, 10, 25), (30, 2, 15, 64, 16)],
    [(30, 17, 122, 4, 123), (28, 29, 46, 14, 47), (30, 49, 24, 10, 25), (30, 24, 15, 46, 16)],
    [(30, 4, 122, 18, 123), (28, 13, 46, 32, 47), (30, 48, 24, 14, 25), (30, 42, 15, 32, 16)],
    [(30, 20, 117, 4, 118), (28, 40, 47, 7, 48), (30, 43, 24, 22, 25), (30, 10, 15, 67, 16)],
    [(30, 19, 118, 6, 119), (28, 18, 47, 31, 48), (30, 34, 24, 34, 25), (30, 20, 15, 61, 16)],
];

static ALIGNMENT_PATTERN_POSITIONS: [&[i16]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

#[cfg(test)]
mod metadata_tests {
    use test_case::test_case;

    use super::{format_info, ECLevel, Version};

    #[test]
    fn test_width() {
        assert_eq!(Version::new(1).unwrap().width(), 21);
        assert_eq!(Version::new(7).unwrap().width(), 45);
        assert_eq!(Version::new(40).unwrap().width(), 177);
    }

    #[test]
    fn test_invalid_version() {
        assert!(Version::new(0).is_err());
        assert!(Version::new(41).is_err());
    }

    // Every block split must exactly fill the symbol's codeword capacity
    #[test]
    fn test_block_structure_fills_capacity() {
        for v in 1..=40 {
            let ver = Version::new(v).unwrap();
            for ecl in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
                let (s1, c1, s2, c2) = ver.data_codewords_per_block(ecl);
                let data = c1 * s1 + c2 * s2;
                let ec = (c1 + c2) * ver.ecc_per_block(ecl);
                assert_eq!(
                    data + ec,
                    ver.total_codewords(),
                    "Version {v} level {ecl} doesn't fill capacity"
                );
                if c2 > 0 {
                    assert_eq!(s2, s1 + 1, "Version {v} level {ecl} block2 size mismatch");
                }
            }
        }
    }

    #[test]
    fn test_alignment_positions_span_grid() {
        for v in 2..=40 {
            let ver = Version::new(v).unwrap();
            let poses = ver.alignment_pattern();
            assert_eq!(poses[0], 6);
            assert_eq!(*poses.last().unwrap(), ver.width() - 7);
        }
    }

    #[test_case(ECLevel::M, 0, 0b101010000010010; "m0")]
    #[test_case(ECLevel::L, 0, 0b111011111000100; "l0")]
    #[test_case(ECLevel::H, 7, 0b000100000111011; "h7")]
    #[test_case(ECLevel::Q, 5, 0b010000110000011; "q5")]
    fn test_format_info(ecl: ECLevel, mask: u8, expected: u32) {
        assert_eq!(format_info(ecl, mask), expected);
    }

    #[test]
    fn test_version_info() {
        assert_eq!(Version::new(7).unwrap().info(), 0x07C94);
        assert_eq!(Version::new(17).unwrap().info(), 0x1145D);
        assert_eq!(Version::new(40).unwrap().info(), 0x28C69);
    }

    #[test]
    fn test_data_bit_capacity() {
        let ver = Version::new(1).unwrap();
        assert_eq!(ver.data_bit_capacity(ECLevel::L), 152);
        assert_eq!(ver.data_bit_capacity(ECLevel::H), 72);
        let ver = Version::new(40).unwrap();
        assert_eq!(ver.data_bit_capacity(ECLevel::L), 23648);
    }
}
