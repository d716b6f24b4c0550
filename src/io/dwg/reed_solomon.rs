//! Reed-Solomon forward error correction for R2007 files.
//!
//! Two fixed-rate codes over GF(2^8) protect R2007 data:
//!
//! - **(255,239)**, 8 correctable symbols, for the file header and the
//!   system pages (page map and section map).
//! - **(255,251)**, 2 correctable symbols, for encoded section pages.
//!
//! Codewords are interleaved: byte `i` of codeword `k` lives at offset
//! `k + i * blocks` of the raw stream. Inside a de-interleaved codeword
//! the data bytes come first and the parity bytes last.
//!
//! A codeword that cannot be corrected is passed through unchanged and
//! counted, so callers can report it and carry on.

use once_cell::sync::Lazy;

/// Codeword length in bytes.
pub const CODEWORD_SIZE: usize = 255;

/// The (255,239) code used for headers and system pages.
pub static RS_239: Lazy<ReedSolomon> = Lazy::new(|| ReedSolomon::new(0x169, 239));

/// The (255,251) code used for section data pages.
pub static RS_251: Lazy<ReedSolomon> = Lazy::new(|| ReedSolomon::new(0x11D, 251));

/// A systematic Reed-Solomon code over GF(2^8) with roots α^1..α^(n-k).
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    data_len: usize,
    parity_len: usize,
    exp: [u8; 512],
    log: [u8; 256],
    /// Generator coefficients, index = power of x, monic.
    generator: Vec<u8>,
}

/// Result of decoding an interleaved stream.
#[derive(Debug, Clone, Default)]
pub struct DecodeOutcome {
    pub data: Vec<u8>,
    /// Symbols corrected across all codewords.
    pub corrected: usize,
    /// Codewords passed through uncorrected.
    pub failed_blocks: usize,
}

impl ReedSolomon {
    /// Build a code for the given primitive polynomial (with the x^8 bit)
    /// and data length.
    pub fn new(primitive: u16, data_len: usize) -> Self {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for i in 0..255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= primitive;
            }
        }
        for i in 255..512 {
            exp[i] = exp[i - 255];
        }

        let mut rs = Self {
            data_len,
            parity_len: CODEWORD_SIZE - data_len,
            exp,
            log,
            generator: vec![1],
        };

        let mut generator = vec![1u8];
        for root in 1..=rs.parity_len {
            let alpha = rs.exp[root];
            let mut next = vec![0u8; generator.len() + 1];
            for (i, &g) in generator.iter().enumerate() {
                next[i + 1] ^= g;
                next[i] ^= rs.mul(g, alpha);
            }
            generator = next;
        }
        rs.generator = generator;
        rs
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub fn parity_len(&self) -> usize {
        self.parity_len
    }

    /// Symbols a codeword can have wrong and still be corrected.
    pub fn capacity(&self) -> usize {
        self.parity_len / 2
    }

    #[inline]
    fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
        }
    }

    #[inline]
    fn div(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[(self.log[a as usize] as usize + 255 - self.log[b as usize] as usize) % 255]
        }
    }

    #[inline]
    fn alpha_pow(&self, e: usize) -> u8 {
        self.exp[e % 255]
    }

    fn eval(&self, poly: &[u8], x: u8) -> u8 {
        poly.iter().rev().fold(0u8, |acc, &c| self.mul(acc, x) ^ c)
    }

    /// Build a codeword `[data, parity]` from up to `data_len` bytes.
    pub fn encode(&self, data: &[u8]) -> [u8; CODEWORD_SIZE] {
        let np = self.parity_len;
        let mut rem = [0u8; CODEWORD_SIZE];
        for (i, &b) in data.iter().take(self.data_len).enumerate() {
            rem[np + i] = b;
        }
        for p in (np..CODEWORD_SIZE).rev() {
            let coef = rem[p];
            if coef != 0 {
                for (j, &g) in self.generator.iter().enumerate() {
                    rem[p - np + j] ^= self.mul(coef, g);
                }
            }
        }

        let mut out = [0u8; CODEWORD_SIZE];
        for (i, &b) in data.iter().take(self.data_len).enumerate() {
            out[i] = b;
        }
        out[self.data_len..].copy_from_slice(&rem[..np]);
        out
    }

    /// Correct one codeword in place. Returns the number of corrected
    /// symbols, or `None` when the errors exceed the code's capacity.
    pub fn decode_block(&self, block: &mut [u8; CODEWORD_SIZE]) -> Option<usize> {
        let np = self.parity_len;

        // Coefficient of x^p, parity in the low powers.
        let mut poly = [0u8; CODEWORD_SIZE];
        poly[np..].copy_from_slice(&block[..self.data_len]);
        poly[..np].copy_from_slice(&block[self.data_len..]);

        let syndromes: Vec<u8> = (1..=np)
            .map(|j| self.eval(&poly, self.alpha_pow(j)))
            .collect();
        if syndromes.iter().all(|&s| s == 0) {
            return Some(0);
        }

        let locator = self.berlekamp_massey(&syndromes);
        let degree = locator.len() - 1;
        if degree == 0 || degree > self.capacity() {
            return None;
        }

        // Chien search: position p is wrong when Λ(α^-p) = 0.
        let positions: Vec<usize> = (0..CODEWORD_SIZE)
            .filter(|&p| self.eval(&locator, self.alpha_pow(255 - p)) == 0)
            .collect();
        if positions.len() != degree {
            return None;
        }

        // Ω(x) = S(x)Λ(x) mod x^np
        let mut omega = vec![0u8; np];
        for (i, &s) in syndromes.iter().enumerate() {
            for (j, &l) in locator.iter().enumerate() {
                if i + j < np {
                    omega[i + j] ^= self.mul(s, l);
                }
            }
        }
        // Formal derivative keeps the odd terms.
        let derivative: Vec<u8> = locator
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| if i % 2 == 1 { c } else { 0 })
            .collect();

        for &p in &positions {
            let x_inv = self.alpha_pow(255 - p);
            let denom = self.eval(&derivative, x_inv);
            if denom == 0 {
                return None;
            }
            let magnitude = self.div(self.eval(&omega, x_inv), denom);
            poly[p] ^= magnitude;
        }

        block[..self.data_len].copy_from_slice(&poly[np..]);
        block[self.data_len..].copy_from_slice(&poly[..np]);
        Some(positions.len())
    }

    fn berlekamp_massey(&self, syndromes: &[u8]) -> Vec<u8> {
        let mut c = vec![1u8];
        let mut b = vec![1u8];
        let mut l = 0usize;
        let mut m = 1usize;
        let mut last = 1u8;

        for n in 0..syndromes.len() {
            let mut d = syndromes[n];
            for i in 1..=l.min(c.len() - 1) {
                d ^= self.mul(c[i], syndromes[n - i]);
            }
            if d == 0 {
                m += 1;
                continue;
            }
            let coef = self.div(d, last);
            let mut next = c.clone();
            if next.len() < b.len() + m {
                next.resize(b.len() + m, 0);
            }
            for (i, &bv) in b.iter().enumerate() {
                next[i + m] ^= self.mul(coef, bv);
            }
            if 2 * l <= n {
                b = c;
                l = n + 1 - l;
                last = d;
                m = 1;
            } else {
                m += 1;
            }
            c = next;
        }

        c.resize(l + 1, 0);
        c
    }

    /// De-interleave and correct `blocks` codewords from `input`.
    ///
    /// Missing input bytes read as zero. The output holds
    /// `blocks * data_len` bytes.
    pub fn decode_interleaved(&self, input: &[u8], blocks: usize) -> DecodeOutcome {
        let mut outcome = DecodeOutcome {
            data: Vec::with_capacity(blocks * self.data_len),
            ..DecodeOutcome::default()
        };
        let mut codeword = [0u8; CODEWORD_SIZE];
        for k in 0..blocks {
            for (i, byte) in codeword.iter_mut().enumerate() {
                *byte = input.get(k + i * blocks).copied().unwrap_or(0);
            }
            match self.decode_block(&mut codeword) {
                Some(n) => outcome.corrected += n,
                None => outcome.failed_blocks += 1,
            }
            outcome.data.extend_from_slice(&codeword[..self.data_len]);
        }
        outcome
    }
}

/// `decode_interleaved` with the (255,239) code.
pub fn decode_239i(input: &[u8], blocks: usize) -> DecodeOutcome {
    RS_239.decode_interleaved(input, blocks)
}

/// `decode_interleaved` with the (255,251) code.
pub fn decode_251i(input: &[u8], blocks: usize) -> DecodeOutcome {
    RS_251.decode_interleaved(input, blocks)
}
