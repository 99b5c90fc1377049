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

//! Adapter between the scalar stage buffers and the 1-D line kernels. A
//! stage block is `[rows, line, batch, multiplicity]` scalars with the
//! transform axis fastest; each logical line is gathered into a contiguous
//! complex scratch, handed to the kernel, and scattered back out with the
//! stage's output multiplicity. Also hosts the dense single-rank 3-D
//! transform the correctness oracle runs on the root.

use crate::err::try_vec;
use crate::factory::make_line_fft;
use crate::layout::TransformKind;
use crate::r2c::{half_spectrum_len, hermitian_extend};
use crate::traits::FftSample;
use crate::{FftDirection, FftExecutor, PencilFftError};
use num_complex::Complex;
use num_traits::AsPrimitive;

/// One pipeline stage's line transform: how many logical elements to gather
/// from the input side, the kernel's execution length, and how many elements
/// to scatter to the output side. The three differ only at the X axis, where
/// real/complex conversion truncates or rebuilds the Hermitian half.
pub(crate) struct StageKernel<T> {
    fft: Box<dyn FftExecutor<T> + Send + Sync>,
    gather_len: usize,
    execute_len: usize,
    scatter_len: usize,
    rebuild_hermitian: bool,
}

impl<T: FftSample> StageKernel<T>
where
    f64: AsPrimitive<T>,
    usize: AsPrimitive<T>,
{
    pub fn c2c(len: usize, direction: FftDirection) -> Result<StageKernel<T>, PencilFftError> {
        Ok(StageKernel {
            fft: make_line_fft(len, direction)?,
            gather_len: len,
            execute_len: len,
            scatter_len: len,
            rebuild_hermitian: false,
        })
    }

    /// Forward real line of length `real_len`, keeping the non-redundant bins.
    pub fn r2c(real_len: usize) -> Result<StageKernel<T>, PencilFftError> {
        Ok(StageKernel {
            fft: make_line_fft(real_len, FftDirection::Forward)?,
            gather_len: real_len,
            execute_len: real_len,
            scatter_len: half_spectrum_len(real_len),
            rebuild_hermitian: false,
        })
    }

    /// Inverse half-spectrum line, producing `real_len` real samples.
    pub fn c2r(real_len: usize) -> Result<StageKernel<T>, PencilFftError> {
        Ok(StageKernel {
            fft: make_line_fft(real_len, FftDirection::Inverse)?,
            gather_len: half_spectrum_len(real_len),
            execute_len: real_len,
            scatter_len: real_len,
            rebuild_hermitian: true,
        })
    }
}

/// Transforms every line of a stage block. `src` is
/// `[rows, gather_len, batch, ci]` scalars, `dst` is
/// `[rows, scatter_len, batch, co]`; `line` must hold `execute_len` complex
/// values. `src` and `dst` must be distinct buffers.
#[allow(clippy::too_many_arguments)]
pub(crate) fn transform_lines<T: FftSample>(
    kernel: &StageKernel<T>,
    src: &[T],
    dst: &mut [T],
    rows: usize,
    batch: usize,
    ci: usize,
    co: usize,
    line: &mut [Complex<T>],
) -> Result<(), PencilFftError> {
    let g = kernel.gather_len;
    let x = kernel.execute_len;
    let s = kernel.scatter_len;
    debug_assert!(line.len() >= x);
    debug_assert!(src.len() >= rows * g * batch * ci);
    debug_assert!(dst.len() >= rows * s * batch * co);

    let zero = T::default();
    for r in 0..rows {
        for b in 0..batch {
            for (i, v) in line.iter_mut().take(g).enumerate() {
                let offset = ((r * g + i) * batch + b) * ci;
                let re = src[offset];
                let im = if ci == 2 { src[offset + 1] } else { zero };
                *v = Complex::new(re, im);
            }
            if kernel.rebuild_hermitian {
                hermitian_extend(&mut line[..x], g);
            }
            kernel.fft.execute(&mut line[..x])?;
            for (i, v) in line.iter().take(s).enumerate() {
                let offset = ((r * s + i) * batch + b) * co;
                dst[offset] = v.re;
                if co == 2 {
                    dst[offset + 1] = v.im;
                }
            }
        }
    }
    Ok(())
}

/// Dense single-rank 3-D transform over `[nk, nn, m_in, batch]` complex
/// values into `[nk, nn, m_out, batch]`, axis order matching the pipeline:
/// X, Y, Z on the forward path, Z, Y, X on the inverse. The oracle runs this
/// once on the root as the global reference.
#[allow(clippy::too_many_arguments)]
pub(crate) fn reference_fft3<T: FftSample>(
    kind: TransformKind,
    direction: FftDirection,
    nk: usize,
    nn: usize,
    m_in: usize,
    m_out: usize,
    batch: usize,
    src: &[Complex<T>],
    dst: &mut [Complex<T>],
) -> Result<(), PencilFftError>
where
    f64: AsPrimitive<T>,
    usize: AsPrimitive<T>,
{
    if src.len() < nk * nn * m_in * batch {
        return Err(PencilFftError::InvalidInputLength(
            nk * nn * m_in * batch,
            src.len(),
        ));
    }
    if dst.len() < nk * nn * m_out * batch {
        return Err(PencilFftError::InvalidOutputLength(
            nk * nn * m_out * batch,
            dst.len(),
        ));
    }

    let m_exec = match kind {
        TransformKind::ComplexToReal => m_out,
        _ => m_in,
    };
    let mut line = try_vec![Complex::<T>::default(); m_exec.max(nn).max(nk)];

    match direction {
        FftDirection::Forward => {
            // X lines first (real conversion truncates here), then Y, then Z.
            let fft_m = make_line_fft::<T>(m_exec, direction)?;
            for k in 0..nk {
                for j in 0..nn {
                    for b in 0..batch {
                        for i in 0..m_in {
                            line[i] = src[((k * nn + j) * m_in + i) * batch + b];
                        }
                        fft_m.execute(&mut line[..m_exec])?;
                        for i in 0..m_out {
                            dst[((k * nn + j) * m_out + i) * batch + b] = line[i];
                        }
                    }
                }
            }
            let fft_n = make_line_fft::<T>(nn, direction)?;
            for k in 0..nk {
                for i in 0..m_out {
                    for b in 0..batch {
                        for j in 0..nn {
                            line[j] = dst[((k * nn + j) * m_out + i) * batch + b];
                        }
                        fft_n.execute(&mut line[..nn])?;
                        for j in 0..nn {
                            dst[((k * nn + j) * m_out + i) * batch + b] = line[j];
                        }
                    }
                }
            }
            let fft_k = make_line_fft::<T>(nk, direction)?;
            for j in 0..nn {
                for i in 0..m_out {
                    for b in 0..batch {
                        for k in 0..nk {
                            line[k] = dst[((k * nn + j) * m_out + i) * batch + b];
                        }
                        fft_k.execute(&mut line[..nk])?;
                        for k in 0..nk {
                            dst[((k * nn + j) * m_out + i) * batch + b] = line[k];
                        }
                    }
                }
            }
        }
        FftDirection::Inverse => {
            // Z lines first, then Y, both at the input X extent; the X pass
            // rebuilds the Hermitian half last, mirroring the pipeline.
            let mut work = try_vec![Complex::<T>::default(); nk * nn * m_in * batch];
            let fft_k = make_line_fft::<T>(nk, direction)?;
            for j in 0..nn {
                for i in 0..m_in {
                    for b in 0..batch {
                        for k in 0..nk {
                            line[k] = src[((k * nn + j) * m_in + i) * batch + b];
                        }
                        fft_k.execute(&mut line[..nk])?;
                        for k in 0..nk {
                            work[((k * nn + j) * m_in + i) * batch + b] = line[k];
                        }
                    }
                }
            }
            let fft_n = make_line_fft::<T>(nn, direction)?;
            for k in 0..nk {
                for i in 0..m_in {
                    for b in 0..batch {
                        for j in 0..nn {
                            line[j] = work[((k * nn + j) * m_in + i) * batch + b];
                        }
                        fft_n.execute(&mut line[..nn])?;
                        for j in 0..nn {
                            work[((k * nn + j) * m_in + i) * batch + b] = line[j];
                        }
                    }
                }
            }
            let fft_m = make_line_fft::<T>(m_exec, direction)?;
            let rebuild = matches!(kind, TransformKind::ComplexToReal);
            for k in 0..nk {
                for j in 0..nn {
                    for b in 0..batch {
                        for i in 0..m_in {
                            line[i] = work[((k * nn + j) * m_in + i) * batch + b];
                        }
                        if rebuild {
                            hermitian_extend(&mut line[..m_exec], m_in);
                        }
                        fft_m.execute(&mut line[..m_exec])?;
                        for i in 0..m_out {
                            dst[((k * nn + j) * m_out + i) * batch + b] = line[i];
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_transform_lines_r2c_dc_is_row_sum() {
        let kernel = StageKernel::<f64>::r2c(4).unwrap();
        let rows = 2usize;
        let batch = 2usize;
        let src: Vec<f64> = (0..rows * 4 * batch).map(|v| v as f64).collect();
        let mut dst = vec![0.0f64; rows * 3 * batch * 2];
        let mut line = vec![Complex::default(); 4];
        transform_lines(&kernel, &src, &mut dst, rows, batch, 1, 2, &mut line).unwrap();
        for r in 0..rows {
            for b in 0..batch {
                let expected: f64 = (0..4).map(|i| ((r * 4 + i) * batch + b) as f64).sum();
                let dc = dst[((r * 3) * batch + b) * 2];
                assert!((dc - expected).abs() < 1e-9, "row {r} batch {b}");
                assert!(dst[((r * 3) * batch + b) * 2 + 1].abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_transform_lines_c2r_inverts_r2c() {
        let len = 8usize;
        let rows = 3usize;
        let fwd = StageKernel::<f64>::r2c(len).unwrap();
        let inv = StageKernel::<f64>::c2r(len).unwrap();
        let mut src = vec![0.0f64; rows * len];
        for z in src.iter_mut() {
            *z = rand::rng().random();
        }
        let half = half_spectrum_len(len);
        let mut spectrum = vec![0.0f64; rows * half * 2];
        let mut back = vec![0.0f64; rows * len];
        let mut line = vec![Complex::default(); len];
        transform_lines(&fwd, &src, &mut spectrum, rows, 1, 1, 2, &mut line).unwrap();
        transform_lines(&inv, &spectrum, &mut back, rows, 1, 2, 1, &mut line).unwrap();
        for (orig, got) in src.iter().zip(back.iter()) {
            assert!((orig - got / len as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reference_fft3_c2c_round_trip() {
        let (nk, nn, nm, batch) = (4usize, 3usize, 4usize, 2usize);
        let total = nk * nn * nm * batch;
        let mut src = vec![Complex::<f64>::default(); total];
        for z in src.iter_mut() {
            *z = Complex::new(rand::rng().random(), rand::rng().random());
        }
        let mut spectral = vec![Complex::<f64>::default(); total];
        let mut back = vec![Complex::<f64>::default(); total];
        reference_fft3(
            TransformKind::ComplexToComplex,
            FftDirection::Forward,
            nk,
            nn,
            nm,
            nm,
            batch,
            &src,
            &mut spectral,
        )
        .unwrap();
        reference_fft3(
            TransformKind::ComplexToComplex,
            FftDirection::Inverse,
            nk,
            nn,
            nm,
            nm,
            batch,
            &spectral,
            &mut back,
        )
        .unwrap();
        let scale = (nk * nn * nm) as f64;
        for (a, b) in src.iter().zip(back.iter()) {
            assert!((a.re - b.re / scale).abs() < 1e-8);
            assert!((a.im - b.im / scale).abs() < 1e-8);
        }
    }

    #[test]
    fn test_reference_fft3_r2c_then_c2r_round_trip() {
        let (nk, nn, nm, batch) = (4usize, 4usize, 8usize, 1usize);
        let half = half_spectrum_len(nm);
        let mut src = vec![Complex::<f64>::default(); nk * nn * nm * batch];
        for z in src.iter_mut() {
            *z = Complex::new(rand::rng().random(), 0.0);
        }
        let mut spectral = vec![Complex::<f64>::default(); nk * nn * half * batch];
        let mut back = vec![Complex::<f64>::default(); nk * nn * nm * batch];
        reference_fft3(
            TransformKind::RealToComplex,
            FftDirection::Forward,
            nk,
            nn,
            nm,
            half,
            batch,
            &src,
            &mut spectral,
        )
        .unwrap();
        reference_fft3(
            TransformKind::ComplexToReal,
            FftDirection::Inverse,
            nk,
            nn,
            half,
            nm,
            batch,
            &spectral,
            &mut back,
        )
        .unwrap();
        let scale = (nk * nn * nm) as f64;
        for (a, b) in src.iter().zip(back.iter()) {
            assert!((a.re - b.re / scale).abs() < 1e-8);
            assert!((b.im / scale).abs() < 1e-8);
        }
    }
}
