use std::cmp::Ordering;
use std::mem::swap;

use crate::bits::BitStream;
use crate::error::{QRError, QRResult};
use crate::metadata::{ECLevel, Version};

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
}

impl PartialOrd for Mode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mode {
    fn cmp(&self, other: &Self) -> Ordering {
        match (*self, *other) {
            (a, b) if a == b => Ordering::Equal,
            (Self::Numeric, _) | (_, Self::Kanji) => Ordering::Less,
            (_, Self::Numeric) | (Self::Kanji, _) => Ordering::Greater,
            (Self::Alphanumeric, _) => Ordering::Less,
            (_, Self::Alphanumeric) => Ordering::Greater,
            _ => unreachable!("Unhandled mode comparison"),
        }
    }
}

impl Mode {
    #[inline]
    fn numeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Numeric.contains(char), "Invalid numeric data: {char}");
        (char - b'0') as u16
    }

    #[inline]
    fn alphanumeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Alphanumeric.contains(char), "Invalid alphanumeric data: {char}");
        match char {
            b'0'..=b'9' => (char - b'0') as u16,
            b'A'..=b'Z' => (char - b'A' + 10) as u16,
            b' ' => 36,
            b'$' => 37,
            b'%' => 38,
            b'*' => 39,
            b'+' => 40,
            b'-' => 41,
            b'.' => 42,
            b'/' => 43,
            b':' => 44,
            _ => unreachable!("Invalid alphanumeric {char}"),
        }
    }

    // 13-bit value for a Shift JIS double-byte character
    #[inline]
    fn kanji_value(hi: u8, lo: u8) -> u16 {
        let word = ((hi as u16) << 8) | lo as u16;
        debug_assert!(is_kanji_pair(hi, lo), "Invalid kanji pair: {word:#06x}");

        let adjusted = if word < 0xE040 { word - 0x8140 } else { word - 0xC140 };
        (adjusted >> 8) * 0xC0 + (adjusted & 0xFF)
    }

    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let len = data.len();
        match self {
            Self::Numeric => {
                debug_assert!(len <= 3, "Data is too long for numeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 10 + Self::numeric_digit(*b))
            }
            Self::Alphanumeric => {
                debug_assert!(len <= 2, "Data is too long for alphanumeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 45 + Self::alphanumeric_digit(*b))
            }
            Self::Byte => {
                debug_assert!(len == 1, "Data is too long for byte conversion: {len}");
                data[0] as u16
            }
            Self::Kanji => {
                debug_assert!(len == 2, "Kanji chunks are double-byte: {len}");
                Self::kanji_value(data[0], data[1])
            }
        }
    }

    pub fn contains(&self, byte: u8) -> bool {
        match self {
            Self::Numeric => byte.is_ascii_digit(),
            Self::Alphanumeric => {
                matches!(byte, b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':')
            }
            Self::Byte => true,
            // Kanji eligibility is judged on byte pairs, not single bytes
            Self::Kanji => false,
        }
    }

    pub fn encoded_len(&self, len: usize) -> usize {
        match *self {
            Self::Numeric => (len * 10).div_ceil(3),
            Self::Alphanumeric => (len * 11).div_ceil(2),
            Self::Byte => len * 8,
            Self::Kanji => (len / 2) * 13,
        }
    }

    /// Character count as written in the segment header. Kanji characters
    /// span two bytes of raw data.
    pub fn char_count(&self, byte_len: usize) -> usize {
        match self {
            Self::Kanji => byte_len / 2,
            _ => byte_len,
        }
    }
}

/// Valid Shift JIS double-byte range per the QR standard:
/// 0x8140-0x9FFC and 0xE040-0xEBBF, low byte never 0x7F.
pub fn is_kanji_pair(hi: u8, lo: u8) -> bool {
    let word = ((hi as u16) << 8) | lo as u16;
    lo != 0x7F && ((0x8140..=0x9FFC).contains(&word) || (0xE040..=0xEBBF).contains(&word))
}

// Segment
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub mode: Mode,
    pub mode_bits: usize, // Bit len of mode indicator
    pub len_bits: usize,  // Bit len of char count
    pub data: &'a [u8],   // Reference to raw data
}

impl<'a> Segment<'a> {
    pub fn new(mode: Mode, mode_bits: usize, len_bits: usize, data: &'a [u8]) -> Self {
        Self { mode, mode_bits, len_bits, data }
    }

    pub fn bit_len(&self) -> usize {
        let encoded_bits = self.mode.encoded_len(self.data.len());
        self.mode_bits + self.len_bits + encoded_bits
    }
}

// Encoder
//------------------------------------------------------------------------------

/// Segments data optimally into the smallest version that fits it at the
/// requested EC level, then packs header, payload, terminator and padding
/// into the version's full data-bit capacity.
pub fn encode(data: &[u8], ecl: ECLevel) -> QRResult<(BitStream, Version)> {
    let (ver, segs) = find_optimal_version_and_segments(data, ecl)?;
    let mut bs = BitStream::new(ver.data_bit_capacity(ecl));
    for seg in segs {
        writer::push_segment(seg, &mut bs);
    }
    writer::push_terminator(&mut bs);
    writer::pad_remaining_capacity(&mut bs);
    Ok((bs, ver))
}

pub fn encode_with_version(data: &[u8], ecl: ECLevel, ver: Version) -> QRResult<BitStream> {
    let bcap = ver.data_bit_capacity(ecl);
    let segs = compute_optimal_segments(data, ver);
    let sz: usize = segs.iter().map(|s| s.bit_len()).sum();
    if sz > bcap {
        return Err(QRError::DataTooLarge);
    }
    let mut bs = BitStream::new(bcap);
    for seg in segs {
        writer::push_segment(seg, &mut bs);
    }
    writer::push_terminator(&mut bs);
    writer::pad_remaining_capacity(&mut bs);
    Ok(bs)
}

fn find_optimal_version_and_segments(
    data: &[u8],
    ecl: ECLevel,
) -> QRResult<(Version, Vec<Segment>)> {
    debug_assert!(!data.is_empty(), "Empty data");

    let mut segs = vec![];
    let mut sz = 0;
    for v in 1..=40 {
        let ver = Version::new(v).expect("Version 1-40 is always valid");
        let bcap = ver.data_bit_capacity(ecl);
        // Char count widths change at versions 10 and 27, invalidating
        // previously computed segments
        if v == 1 || v == 10 || v == 27 {
            segs = compute_optimal_segments(data, ver);
            sz = segs.iter().map(|s| s.bit_len()).sum();
        }
        if sz <= bcap {
            return Ok((ver, segs));
        }
    }
    Err(QRError::DataTooLarge)
}

/// Carves maximal Shift JIS kanji pair runs into kanji segments where the
/// 13-bit pair encoding beats byte mode, and runs the mode dynamic program
/// over everything else.
pub(crate) fn compute_optimal_segments<'a>(data: &'a [u8], ver: Version) -> Vec<Segment<'a>> {
    debug_assert!(!data.is_empty(), "Empty data");

    let len = data.len();
    let mut segs = vec![];
    let mut start = 0;
    let mut i = 0;
    while i + 1 < len {
        if !is_kanji_pair(data[i], data[i + 1]) {
            i += 1;
            continue;
        }
        let run_start = i;
        while i + 1 < len && is_kanji_pair(data[i], data[i + 1]) {
            i += 2;
        }
        let pairs = (i - run_start) / 2;
        if kanji_run_pays_off(pairs, ver) {
            if start < run_start {
                segs.extend(compute_text_segments(&data[start..run_start], ver));
            }
            let mode_bits = ver.mode_bits();
            let len_bits = ver.char_cnt_bits(Mode::Kanji);
            segs.push(Segment::new(Mode::Kanji, mode_bits, len_bits, &data[run_start..i]));
            start = i;
        }
    }
    if start < len {
        segs.extend(compute_text_segments(&data[start..], ver));
    }
    segs
}

// Kanji saves 3 bits per pair over byte mode but costs its own header and
// potentially an extra byte-segment header for the split
fn kanji_run_pays_off(pairs: usize, ver: Version) -> bool {
    let header_bits = 2 * ver.mode_bits()
        + ver.char_cnt_bits(Mode::Kanji)
        + ver.char_cnt_bits(Mode::Byte);
    pairs * 3 > header_bits
}

// Dynamic programming over numeric/alphanumeric/byte with costs in 1/6 bits
fn compute_text_segments<'a>(data: &'a [u8], ver: Version) -> Vec<Segment<'a>> {
    debug_assert!(!data.is_empty(), "Empty data");

    let len = data.len();
    let mut prev_cost = [0usize; 3];
    MODES.iter().enumerate().for_each(|(i, &m)| prev_cost[i] = (4 + ver.char_cnt_bits(m)) * 6);
    let mut cur_cost = [usize::MAX; 3];
    let mut min_path = vec![[usize::MAX; 3]; len];
    for (i, b) in data.iter().enumerate() {
        for (j, to_mode) in MODES.iter().enumerate() {
            if !to_mode.contains(*b) {
                continue;
            }
            let encoded_char_size = match to_mode {
                Mode::Numeric => 20,
                Mode::Alphanumeric => 33,
                Mode::Byte => 48,
                Mode::Kanji => unreachable!("Kanji is carved out before the DP"),
            };
            for (k, from_mode) in MODES.iter().enumerate() {
                if prev_cost[k] == usize::MAX {
                    continue;
                }
                let mut cost = 0;
                if to_mode != from_mode {
                    cost += (prev_cost[k] + 5) / 6 * 6;
                    cost += (4 + ver.char_cnt_bits(*to_mode)) * 6;
                } else {
                    cost += prev_cost[k];
                }
                cost += encoded_char_size;
                if cost < cur_cost[j] {
                    cur_cost[j] = cost;
                    min_path[i][j] = k;
                }
            }
        }
        swap(&mut prev_cost, &mut cur_cost);
        cur_cost.fill(usize::MAX);
    }

    let char_modes = trace_optimal_modes(min_path, prev_cost);
    build_segments(ver, char_modes, data)
}

// Backtrack min_path and identify optimal char mode
fn trace_optimal_modes(min_path: Vec<[usize; 3]>, prev_cost: [usize; 3]) -> Vec<Mode> {
    let len = min_path.len();
    let mut mode_index = 0;
    for i in 1..3 {
        if prev_cost[i] < prev_cost[mode_index] {
            mode_index = i;
        }
    }
    (0..len)
        .rev()
        .scan(mode_index, |mi, i| {
            let old_mi = *mi;
            *mi = min_path[i][*mi];
            Some(MODES[old_mi])
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect()
}

// Merge consecutive chars of the same mode into segments
fn build_segments<'a>(ver: Version, char_modes: Vec<Mode>, data: &'a [u8]) -> Vec<Segment<'a>> {
    let len = data.len();
    let mut segs: Vec<Segment> = vec![];
    let mut seg_start = 0;
    let mut seg_mode = char_modes[0];
    for (i, &m) in char_modes.iter().enumerate().skip(1) {
        if seg_mode != m {
            let mode_bits = ver.mode_bits();
            let len_bits = ver.char_cnt_bits(seg_mode);
            segs.push(Segment::new(seg_mode, mode_bits, len_bits, &data[seg_start..i]));
            seg_mode = m;
            seg_start = i;
        }
    }
    let mode_bits = ver.mode_bits();
    let len_bits = ver.char_cnt_bits(seg_mode);
    segs.push(Segment::new(seg_mode, mode_bits, len_bits, &data[seg_start..len]));

    segs
}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(crate) mod writer {
    use super::{Mode, Segment, PADDING_CODEWORDS};
    use crate::bits::BitStream;

    pub fn push_segment(seg: Segment, out: &mut BitStream) {
        push_header(&seg, out);
        match seg.mode {
            Mode::Numeric => push_numeric_data(seg.data, out),
            Mode::Alphanumeric => push_alphanumeric_data(seg.data, out),
            Mode::Byte => push_byte_data(seg.data, out),
            Mode::Kanji => push_kanji_data(seg.data, out),
        }
    }

    fn push_header(seg: &Segment, out: &mut BitStream) {
        out.push_bits(seg.mode as u8, seg.mode_bits);
        let char_cnt = seg.mode.char_count(seg.data.len());
        debug_assert!(
            char_cnt < (1 << seg.len_bits),
            "Char count exceeds bit length: Char count {char_cnt}, Char count bits {}",
            seg.len_bits
        );
        out.push_bits(char_cnt as u16, seg.len_bits);
    }

    fn push_numeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(3) {
            let len = (chunk.len() * 10 + 2) / 3;
            let bits = Mode::Numeric.encode_chunk(chunk);
            out.push_bits(bits, len);
        }
    }

    fn push_alphanumeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(2) {
            let len = (chunk.len() * 11 + 1) / 2;
            let bits = Mode::Alphanumeric.encode_chunk(chunk);
            out.push_bits(bits, len);
        }
    }

    fn push_byte_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(1) {
            let bits = Mode::Byte.encode_chunk(chunk);
            out.push_bits(bits, 8);
        }
    }

    fn push_kanji_data(data: &[u8], out: &mut BitStream) {
        debug_assert!(data.len() & 1 == 0, "Kanji data must be pairs of bytes");

        for chunk in data.chunks(2) {
            let bits = Mode::Kanji.encode_chunk(chunk);
            out.push_bits(bits, 13);
        }
    }

    pub fn push_terminator(out: &mut BitStream) {
        let bit_len = out.len();
        let bit_capacity = out.capacity();
        if bit_len < bit_capacity {
            let term_len = std::cmp::min(4, bit_capacity - bit_len);
            out.push_bits(0u8, term_len);
        }
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) {
        push_padding_bits(out);
        push_padding_codewords(out);
    }

    fn push_padding_bits(out: &mut BitStream) {
        let offset = out.len() & 7;
        if offset > 0 {
            let padding_bits_len = 8 - offset;
            out.push_bits(0u8, padding_bits_len);
        }
    }

    fn push_padding_codewords(out: &mut BitStream) {
        let offset = out.len() & 7;
        debug_assert!(
            offset == 0,
            "Bit offset should be zero before padding codewords: {}",
            offset
        );

        let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
            out.push_bits(pc, 8);
        });
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

pub static MODES: [Mode; 3] = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte];
