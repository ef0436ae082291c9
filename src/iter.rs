use crate::metadata::Version;

// Iterator for placing data in encoding region of QR
//------------------------------------------------------------------------------

pub struct EncRegionIter {
    r: i16,
    c: i16,
    width: i16,
    vert_timing_col: i16,
}

impl EncRegionIter {
    pub const fn new(version: Version) -> Self {
        let w = version.width();
        Self { r: w - 1, c: w - 1, width: w, vert_timing_col: 6 }
    }
}

impl Iterator for EncRegionIter {
    type Item = (i16, i16);
    fn next(&mut self) -> Option<Self::Item> {
        let adjusted_col = if self.c <= self.vert_timing_col { self.c + 1 } else { self.c };
        if self.c < 0 {
            return None;
        }
        let res = (self.r, self.c);
        let col_type = (self.width - adjusted_col) % 4;
        match col_type {
            2 if self.r > 0 => {
                self.r -= 1;
                self.c += 1;
            }
            0 if self.r < self.width - 1 => {
                self.r += 1;
                self.c += 1;
            }
            0 | 2 if self.c == self.vert_timing_col + 1 => {
                self.c -= 2;
            }
            _ => {
                self.c -= 1;
            }
        }
        Some(res)
    }
}

#[cfg(test)]
mod iter_tests {
    use super::EncRegionIter;
    use crate::metadata::{ECLevel, Version};
    use crate::qr::{Module, QR};

    #[test]
    fn test_enc_region_starts_bottom_right() {
        let ver = Version::new(1).unwrap();
        let mut coords = EncRegionIter::new(ver);
        assert_eq!(coords.next(), Some((20, 20)));
        assert_eq!(coords.next(), Some((20, 19)));
        assert_eq!(coords.next(), Some((19, 20)));
        assert_eq!(coords.next(), Some((19, 19)));
    }

    #[test]
    fn test_enc_region_skips_vertical_timing_column() {
        for v in [1, 7, 40] {
            let ver = Version::new(v).unwrap();
            assert!(EncRegionIter::new(ver).all(|(_, c)| c != 6));
        }
    }

    // After function patterns and info areas are drawn, the remaining cells
    // visited by the iterator are exactly the encoding region
    #[test]
    fn test_enc_region_size() {
        for v in 1..=40 {
            let ver = Version::new(v).unwrap();
            let mut qr = QR::new(ver, ECLevel::L);
            qr.draw_all_function_patterns();
            qr.reserve_format_area();
            qr.draw_version_info();
            let empty = EncRegionIter::new(ver)
                .filter(|&(r, c)| matches!(qr.get(r, c), Module::Empty))
                .count();
            let exp = ver.total_codewords() * 8 + ver.remainder_bits();
            assert_eq!(empty, exp, "Encoding region mismatch for version {v}");
        }
    }
}
