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
use crate::dft::Dft;
use crate::radix2::Radix2;
use crate::traits::FftSample;
use crate::{FftDirection, FftExecutor, PencilFftError};
use num_traits::AsPrimitive;

/// 1-D line-transform strategy: radix-2 for power-of-two lengths, naive DFT
/// otherwise. A vendor device kernel replaces this behind [`FftExecutor`].
pub(crate) fn make_line_fft<T: FftSample>(
    n: usize,
    fft_direction: FftDirection,
) -> Result<Box<dyn FftExecutor<T> + Send + Sync>, PencilFftError>
where
    f64: AsPrimitive<T>,
    usize: AsPrimitive<T>,
{
    if n == 0 {
        return Err(PencilFftError::InvalidConfiguration(
            "zero-length line transform",
        ));
    }
    if n > 1 && n.is_power_of_two() {
        Radix2::new(n, fft_direction)
            .map(|x| Box::new(x) as Box<dyn FftExecutor<T> + Send + Sync>)
    } else {
        Dft::new(n, fft_direction).map(|x| Box::new(x) as Box<dyn FftExecutor<T> + Send + Sync>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn test_strategy_covers_all_lengths() {
        for n in [1usize, 2, 3, 4, 6, 8, 10, 16] {
            let fft = make_line_fft::<f64>(n, FftDirection::Forward).unwrap();
            assert_eq!(fft.length(), n);
            assert_eq!(fft.direction(), FftDirection::Forward);
            let mut data = vec![Complex::new(1.0f64, 0.0); n];
            fft.execute(&mut data).unwrap();
            assert!((data[0].re - n as f64).abs() < 1e-9);
        }
        assert!(make_line_fft::<f64>(0, FftDirection::Forward).is_err());
    }
}
