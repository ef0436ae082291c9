use crate::metadata::{ECLevel, Version};

// GF(256) arithmetic
//------------------------------------------------------------------------------

// Field tables for the QR polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D)
struct GfTables {
    exp: [u8; 255],
    log: [u8; 256],
}

const fn build_gf_tables() -> GfTables {
    let mut exp = [0u8; 255];
    let mut log = [0u8; 256];
    let mut x: usize = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= 0x11D;
        }
        i += 1;
    }
    GfTables { exp, log }
}

const GF: GfTables = build_gf_tables();

fn gf_mul(x: u8, y: u8) -> u8 {
    if x == 0 || y == 0 {
        return 0;
    }
    let mut log_sum = GF.log[x as usize] as usize + GF.log[y as usize] as usize;
    if log_sum >= 255 {
        log_sum -= 255;
    }
    GF.exp[log_sum]
}

/// Generator polynomial Π (x - α^i) for i in 0..ec_len, returned as
/// log-domain coefficients with the leading term omitted.
fn generator_poly(ec_len: usize) -> Vec<u8> {
    debug_assert!((7..=30).contains(&ec_len), "Invalid EC codeword count: {ec_len}");

    let mut poly: Vec<u8> = vec![1];
    for i in 0..ec_len {
        let a = GF.exp[i];
        let mut next = vec![0u8; poly.len() + 1];
        for (j, &c) in poly.iter().enumerate() {
            next[j] ^= c;
            next[j + 1] ^= gf_mul(c, a);
        }
        poly = next;
    }
    // Generator coefficients are never zero so the log lookup is total
    poly[1..].iter().map(|&c| GF.log[c as usize]).collect()
}

// ECC: Error Correction Codeword generator
//------------------------------------------------------------------------------

pub fn ecc(data: &[u8], version: Version, ec_level: ECLevel) -> (Vec<&[u8]>, Vec<Vec<u8>>) {
    let data_blocks = blockify(data, version, ec_level);

    let ecc_size_per_block = version.ecc_per_block(ec_level);
    let gen_poly = generator_poly(ecc_size_per_block);
    let ecc_blocks =
        data_blocks.iter().map(|b| ecc_per_block(b, &gen_poly)).collect::<Vec<_>>();

    (data_blocks, ecc_blocks)
}

pub fn blockify(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
    let (block1_size, block1_count, block2_size, block2_count) =
        version.data_codewords_per_block(ec_level);

    let total_blocks = block1_count + block2_count;
    let total_block1_size = block1_size * block1_count;
    let total_size = total_block1_size + block2_size * block2_count;

    debug_assert!(
        total_size == data.len(),
        "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
        data.len(),
        total_size
    );

    let mut data_blocks = Vec::with_capacity(total_blocks);
    data_blocks.extend(data[..total_block1_size].chunks(block1_size));
    if block2_size > 0 {
        data_blocks.extend(data[total_block1_size..].chunks(block2_size));
    }
    data_blocks
}

// Performs polynomial long division with data polynomial(num)
// and generator polynomial(den) to compute remainder polynomial,
// the coefficients of which are the ecc
fn ecc_per_block(block: &[u8], gen_poly: &[u8]) -> Vec<u8> {
    let len = block.len();
    let ecc_count = gen_poly.len();

    let mut res = block.to_vec();
    res.resize(len + ecc_count, 0);

    for i in 0..len {
        let lead_coeff = res[i] as usize;
        if lead_coeff == 0 {
            continue;
        }

        let log_lead_coeff = GF.log[lead_coeff] as usize;
        for (u, v) in res[i + 1..].iter_mut().zip(gen_poly.iter()) {
            let mut log_sum = *v as usize + log_lead_coeff;
            debug_assert!(log_sum < 510, "Log sum has crossed 510: {log_sum}");
            if log_sum >= 255 {
                log_sum -= 255;
            }
            *u ^= GF.exp[log_sum];
        }
    }

    res.split_off(len)
}

// Interleaving
//------------------------------------------------------------------------------

/// Splits data codewords into blocks, computes per-block ECC and interleaves
/// both column-wise into the final codeword sequence.
pub fn assemble_codewords(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<u8> {
    let (data_blocks, ecc_blocks) = ecc(data, version, ec_level);

    let mut out = Vec::with_capacity(version.total_codewords());
    let max_len = data_blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    for i in 0..max_len {
        for block in &data_blocks {
            if i < block.len() {
                out.push(block[i]);
            }
        }
    }
    let ec_len = version.ecc_per_block(ec_level);
    for i in 0..ec_len {
        for block in &ecc_blocks {
            out.push(block[i]);
        }
    }

    debug_assert!(
        out.len() == version.total_codewords(),
        "Interleaved codewords don't fill the symbol: Len {}, Capacity {}",
        out.len(),
        version.total_codewords()
    );

    out
}

#[cfg(test)]
mod ec_tests {
    use super::{assemble_codewords, ecc, ecc_per_block, generator_poly, GF};
    use crate::metadata::{ECLevel, Version};

    #[test]
    fn test_gf_tables() {
        assert_eq!(GF.exp[0], 1);
        assert_eq!(GF.exp[1], 2);
        assert_eq!(GF.exp[8], 29);
        assert_eq!(GF.log[1], 0);
        assert_eq!(GF.log[2], 1);
        assert_eq!(GF.log[29], 8);
    }

    #[test]
    fn test_generator_poly() {
        assert_eq!(generator_poly(7), vec![87, 229, 146, 149, 238, 102, 21]);
        assert_eq!(generator_poly(10), vec![251, 67, 46, 61, 118, 70, 64, 94, 32, 45]);
    }

    #[test]
    fn test_poly_mod_1() {
        let res = ecc_per_block(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11", &generator_poly(10));
        assert_eq!(&*res, b"\xc4#'w\xeb\xd7\xe7\xe2]\x17");
    }

    #[test]
    fn test_poly_mod_2() {
        let res = ecc_per_block(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec", &generator_poly(13));
        assert_eq!(&*res, b"\xa8H\x16R\xd96\x9c\x00.\x0f\xb4z\x10");
    }

    #[test]
    fn test_poly_mod_3() {
        let res = ecc_per_block(b"CUF\x86W&U\xc2w2\x06\x12\x06g&", &generator_poly(18));
        assert_eq!(&*res, b"\xd5\xc7\x0b-s\xf7\xf1\xdf\xe5\xf8\x9au\x9aoV\xa1o'");
    }

    #[test]
    fn test_add_ec_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let expected_ecc = [b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17"];
        let (_, ecc) = ecc(msg, Version::new(1).unwrap(), ECLevel::M);
        assert_eq!(&*ecc, expected_ecc);
    }

    #[test]
    fn test_add_ec_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let (_, ecc) = ecc(msg, Version::new(5).unwrap(), ECLevel::Q);
        assert_eq!(&*ecc, &expected_ec[..]);
    }

    // Single-block symbols interleave to data followed by ecc
    #[test]
    fn test_assemble_single_block() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec";
        let out = assemble_codewords(msg, Version::new(1).unwrap(), ECLevel::Q);
        assert_eq!(out.len(), 26);
        assert_eq!(&out[..13], msg);
        assert_eq!(&out[13..], b"\xa8H\x16R\xd96\x9c\x00.\x0f\xb4z\x10");
    }

    #[test]
    fn test_assemble_interleaved_blocks() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let ver = Version::new(5).unwrap();
        let out = assemble_codewords(msg, ver, ECLevel::Q);
        assert_eq!(out.len(), ver.total_codewords());
        // Blocks are 15, 15, 16, 16 data codewords; column-wise pick order
        assert_eq!(&out[..4], &[msg[0], msg[15], msg[30], msg[46]]);
        assert_eq!(&out[4..8], &[msg[1], msg[16], msg[31], msg[47]]);
        // 16th column only exists in the two longer blocks
        assert_eq!(&out[60..62], &[msg[45], msg[61]]);
        // EC section starts right after, first byte of each ec block
        assert_eq!(&out[62..66], &[0xD5, 0x57, 0x94, 0xEB]);
    }
}
