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
use crate::complex_fma::c_mul_fast;
use crate::err::try_vec;
use crate::traits::{FftSample, FftTrigonometry};
use crate::util::{bit_reverse_indices, permute_inplace};
use crate::{FftDirection, FftExecutor, PencilFftError};
use num_complex::Complex;
use num_traits::AsPrimitive;

/// Power-of-two decimation-in-time kernel, the default 1-D line transform.
pub(crate) struct Radix2<T> {
    twiddles: Vec<Complex<T>>,
    permutations: Vec<usize>,
    execution_length: usize,
    direction: FftDirection,
}

impl<T: FftSample> Radix2<T>
where
    f64: AsPrimitive<T>,
    usize: AsPrimitive<T>,
{
    pub fn new(size: usize, fft_direction: FftDirection) -> Result<Radix2<T>, PencilFftError> {
        assert!(size.is_power_of_two(), "Input length must be a power of 2");

        let mut twiddles = try_vec![Complex::<T>::default(); size - 1];
        let mut cursor = 0usize;
        let mut len = 2usize;
        while len <= size {
            let half = len / 2;
            let theta = -2.0f64 / len as f64;
            let (t_sin, t_cos) = theta.sincos_pi();

            let twiddle = match fft_direction {
                FftDirection::Forward => Complex {
                    re: t_cos,
                    im: t_sin,
                },
                FftDirection::Inverse => (Complex {
                    re: t_cos,
                    im: t_sin,
                })
                .conj(),
            };

            let mut w = Complex::new(1.0f64, 0.0f64);
            for _ in 0..half {
                twiddles[cursor] = Complex {
                    re: w.re.as_(),
                    im: w.im.as_(),
                };
                cursor += 1;
                w = w * twiddle;
            }
            len *= 2;
        }

        let rev = bit_reverse_indices(size);

        Ok(Radix2 {
            permutations: rev,
            execution_length: size,
            twiddles,
            direction: fft_direction,
        })
    }
}

impl<T: FftSample> FftExecutor<T> for Radix2<T>
where
    f64: AsPrimitive<T>,
{
    fn execute(&self, in_place: &mut [Complex<T>]) -> Result<(), PencilFftError> {
        if self.execution_length != in_place.len() {
            return Err(PencilFftError::InvalidInPlaceLength(
                self.execution_length,
                in_place.len(),
            ));
        }

        permute_inplace(in_place, &self.permutations);

        let mut len = 2;

        unsafe {
            let mut m_twiddles = self.twiddles.as_slice();
            while len <= self.execution_length {
                let half = len / 2;
                for data in in_place.chunks_exact_mut(len) {
                    for j in 0..half {
                        let u = *data.get_unchecked(j);
                        let tw = *m_twiddles.get_unchecked(j);
                        let t = c_mul_fast(tw, *data.get_unchecked(j + half));
                        *data.get_unchecked_mut(j) = u + t;
                        *data.get_unchecked_mut(j + half) = u - t;
                    }
                }

                len *= 2;
                m_twiddles = &m_twiddles[half..];
            }
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
