/*
 * // Copyright (c) Radzivon Bartoshyk 10/2025. All rights reserved.
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
use crate::complex_fma::c_mul_add_fast;
use crate::err::try_vec;
use crate::traits::FftSample;
use crate::util::compute_twiddle;
use crate::{FftDirection, FftExecutor, PencilFftError};
use num_complex::Complex;
use num_traits::AsPrimitive;

/// Naive O(n²) transform, the correctness-reference fallback for line
/// lengths that are not a power of two.
pub(crate) struct Dft<T> {
    execution_length: usize,
    twiddles: Vec<Complex<T>>,
    direction: FftDirection,
}

impl<T: FftSample> Dft<T>
where
    f64: AsPrimitive<T>,
{
    pub fn new(size: usize, fft_direction: FftDirection) -> Result<Dft<T>, PencilFftError> {
        let mut twiddles = try_vec![Complex::<T>::default(); size];
        for (k, dst) in twiddles.iter_mut().enumerate() {
            *dst = compute_twiddle(k, size, fft_direction);
        }
        Ok(Dft {
            execution_length: size,
            twiddles,
            direction: fft_direction,
        })
    }
}

impl<T: FftSample> FftExecutor<T> for Dft<T>
where
    f64: AsPrimitive<T>,
{
    fn execute(&self, in_place: &mut [Complex<T>]) -> Result<(), PencilFftError> {
        if in_place.len() % self.execution_length != 0 {
            return Err(PencilFftError::InvalidInPlaceLength(
                self.execution_length,
                in_place.len(),
            ));
        }

        let mut output = try_vec![Complex::<T>::default(); self.execution_length];

        for chunk in in_place.chunks_exact_mut(self.execution_length) {
            for (k, dst) in output.iter_mut().enumerate() {
                let mut sum = Complex::<T>::new(0f64.as_(), 0f64.as_());
                let mut twiddle_idx = 0usize;
                for src in chunk.iter() {
                    let w = unsafe { *self.twiddles.get_unchecked(twiddle_idx) };
                    sum = c_mul_add_fast(*src, w, sum);
                    twiddle_idx += k;
                    if twiddle_idx >= self.twiddles.len() {
                        twiddle_idx -= self.twiddles.len();
                    }
                }
                *dst = sum;
            }

            chunk.copy_from_slice(&output);
        }
        Ok(())
    }

    fn direction(&self) -> FftDirection {
        self.direction
    }

    fn length(&self) -> usize {
        self.execution_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_dft_round_trip() {
        for size in [1usize, 3, 5, 6, 7, 12] {
            let mut input = vec![Complex::<f64>::default(); size];
            for z in input.iter_mut() {
                *z = Complex {
                    re: rand::rng().random(),
                    im: rand::rng().random(),
                };
            }
            let src = input.to_vec();
            let forward = Dft::new(size, FftDirection::Forward).unwrap();
            let inverse = Dft::new(size, FftDirection::Inverse).unwrap();
            forward.execute(&mut input).unwrap();
            inverse.execute(&mut input).unwrap();

            input = input
                .iter()
                .map(|&x| x * (1.0 / size as f64))
                .collect();

            input.iter().zip(src.iter()).for_each(|(a, b)| {
                assert!(
                    (a.re - b.re).abs() < 1e-9,
                    "a_re {} != b_re {} for size {}",
                    a.re,
                    b.re,
                    size
                );
                assert!(
                    (a.im - b.im).abs() < 1e-9,
                    "a_im {} != b_im {} for size {}",
                    a.im,
                    b.im,
                    size
                );
            });
        }
    }

    #[test]
    fn test_dft_dc_bin_is_plain_sum() {
        let size = 6usize;
        let mut input: Vec<Complex<f64>> =
            (0..size).map(|i| Complex::new(i as f64, 0.0)).collect();
        let expected: f64 = (0..size).map(|i| i as f64).sum();
        let forward = Dft::new(size, FftDirection::Forward).unwrap();
        forward.execute(&mut input).unwrap();
        assert!((input[0].re - expected).abs() < 1e-9);
        assert!(input[0].im.abs() < 1e-9);
    }
}
