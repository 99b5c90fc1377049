/*
 * // Copyright (c) Radzivon Bartoshyk 11/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */

//! Real/complex conversions at the X axis. A real-input line transforms as a
//! full complex line and keeps only the `len/2 + 1` non-redundant bins; a
//! half-spectrum line is rebuilt to full length by conjugate symmetry before
//! the inverse transform. Both sides of the pipeline and the serial oracle
//! share this convention, so arbitrary (non-Hermitian) spectra stay
//! comparable between them.

use num_complex::Complex;
use num_traits::Float;

/// Non-redundant bin count of a real transform of length `len`.
#[inline(always)]
pub(crate) fn half_spectrum_len(len: usize) -> usize {
    len / 2 + 1
}

/// Rebuilds the redundant half of a Hermitian line in place: positions
/// `[half, len)` become conjugates of their mirrored counterparts in
/// `[1, half)`. The first `half` entries must already be populated.
pub(crate) fn hermitian_extend<T: Float>(line: &mut [Complex<T>], half: usize) {
    let len = line.len();
    for m in half..len {
        line[m] = line[len - m].conj();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::make_line_fft;
    use crate::FftDirection;
    use rand::Rng;

    #[test]
    fn test_half_spectrum_len() {
        assert_eq!(half_spectrum_len(1), 1);
        assert_eq!(half_spectrum_len(4), 3);
        assert_eq!(half_spectrum_len(5), 3);
        assert_eq!(half_spectrum_len(8), 5);
    }

    #[test]
    fn test_hermitian_extend_mirrors_and_conjugates() {
        let mut line = vec![Complex::new(0.0f64, 0.0); 6];
        for (i, v) in line.iter_mut().take(4).enumerate() {
            *v = Complex::new(i as f64, (i + 1) as f64);
        }
        hermitian_extend(&mut line, 4);
        assert_eq!(line[4], Complex::new(2.0, -3.0));
        assert_eq!(line[5], Complex::new(1.0, -2.0));
    }

    #[test]
    fn test_real_line_round_trips_through_half_spectrum() {
        for len in [2usize, 4, 6, 8, 16] {
            let half = half_spectrum_len(len);
            let reals: Vec<f64> = (0..len).map(|_| rand::rng().random()).collect();

            let mut line: Vec<Complex<f64>> =
                reals.iter().map(|&r| Complex::new(r, 0.0)).collect();
            make_line_fft::<f64>(len, FftDirection::Forward)
                .unwrap()
                .execute(&mut line)
                .unwrap();

            // Keep only the non-redundant bins, rebuild, invert.
            let mut spectrum = vec![Complex::new(0.0f64, 0.0); len];
            spectrum[..half].copy_from_slice(&line[..half]);
            hermitian_extend(&mut spectrum, half);
            make_line_fft::<f64>(len, FftDirection::Inverse)
                .unwrap()
                .execute(&mut spectrum)
                .unwrap();

            for (orig, got) in reals.iter().zip(spectrum.iter()) {
                assert!((orig - got.re / len as f64).abs() < 1e-9, "len {len}");
                assert!((got.im / len as f64).abs() < 1e-9, "len {len}");
            }
        }
    }
}
