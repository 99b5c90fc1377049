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

//! The stage sequencer. One plan serves both directions of one
//! `(p, M, N, K, batch, embedded, complex)` configuration: sizes are given
//! in real space, so a forward plan's output layout is exactly the matching
//! inverse plan's input layout. The plan owns its two work buffers and the
//! line scratch; executions ping-pong between them, handing ownership by
//! buffer swap rather than pointer games, and the caller provides the input
//! and output blocks. One execution at a time per plan.

use crate::comm::Communicator;
use crate::embed::embed_axis;
use crate::err::try_vec;
use crate::exchange::{
    chunk_distributed_axis, collect_axis_masked, exchange_pencils, stitch_collected_axis,
};
use crate::layout::{PencilLayout, TransformKind};
use crate::local_fft::{transform_lines, StageKernel};
use crate::permute::{permute3, permute3_into, Block3};
use crate::traits::FftSample;
use crate::{FftDirection, PencilFftError};
use num_complex::Complex;
use num_traits::AsPrimitive;

pub struct PencilPlan<T: FftSample> {
    forward: PencilLayout,
    inverse: PencilLayout,
    work_a: Vec<T>,
    work_b: Vec<T>,
    line: Vec<Complex<T>>,
    fwd_x: StageKernel<T>,
    fwd_y: StageKernel<T>,
    fwd_z: StageKernel<T>,
    inv_z: StageKernel<T>,
    inv_y: StageKernel<T>,
    inv_x: StageKernel<T>,
}

impl<T: FftSample> PencilPlan<T>
where
    f64: AsPrimitive<T>,
    usize: AsPrimitive<T>,
{
    /// Builds the layouts for both directions, the per-axis line kernels and
    /// the persistent work buffers. All configuration errors surface here;
    /// execution never re-validates sizes it can reject now.
    pub fn create(
        ranks: usize,
        m: usize,
        n: usize,
        k: usize,
        batch: usize,
        embedded: bool,
        complex_input: bool,
    ) -> Result<PencilPlan<T>, PencilFftError> {
        let forward = PencilLayout::describe(
            ranks,
            m,
            n,
            k,
            batch,
            embedded,
            TransformKind::classify(complex_input, FftDirection::Forward),
            FftDirection::Forward,
        )?;
        let inverse = PencilLayout::describe(
            ranks,
            m,
            n,
            k,
            batch,
            embedded,
            TransformKind::classify(complex_input, FftDirection::Inverse),
            FftDirection::Inverse,
        )?;

        let fwd_x = match forward.kind {
            TransformKind::RealToComplex => StageKernel::r2c(forward.m_embedded)?,
            _ => StageKernel::c2c(forward.m_embedded, FftDirection::Forward)?,
        };
        let fwd_y = StageKernel::c2c(forward.n_embedded, FftDirection::Forward)?;
        let fwd_z = StageKernel::c2c(forward.k_embedded, FftDirection::Forward)?;
        let inv_z = StageKernel::c2c(inverse.k_embedded, FftDirection::Inverse)?;
        let inv_y = StageKernel::c2c(inverse.n_embedded, FftDirection::Inverse)?;
        let inv_x = match inverse.kind {
            TransformKind::ComplexToReal => StageKernel::c2r(inverse.m_embedded)?,
            _ => StageKernel::c2c(inverse.m_embedded, FftDirection::Inverse)?,
        };

        let work = forward.work_scalars().max(inverse.work_scalars());
        let work_a = try_vec![T::default(); work];
        let work_b = try_vec![T::default(); work];
        let line_len = forward
            .m_embedded
            .max(forward.n_embedded)
            .max(forward.k_embedded);
        let line = try_vec![Complex::<T>::default(); line_len];

        Ok(PencilPlan {
            forward,
            inverse,
            work_a,
            work_b,
            line,
            fwd_x,
            fwd_y,
            fwd_z,
            inv_z,
            inv_y,
            inv_x,
        })
    }

    pub fn layout(&self, direction: FftDirection) -> &PencilLayout {
        match direction {
            FftDirection::Forward => &self.forward,
            FftDirection::Inverse => &self.inverse,
        }
    }

    pub fn input_scalars(&self, direction: FftDirection) -> usize {
        self.layout(direction).input_scalars()
    }

    pub fn output_scalars(&self, direction: FftDirection) -> usize {
        self.layout(direction).output_scalars()
    }

    /// Runs the whole pipeline on this rank's block. Every rank of the
    /// communicator must call this with the same direction; the all-to-all
    /// inside is the single synchronization point.
    pub fn execute<C: Communicator<T>>(
        &mut self,
        comm: &C,
        input: &[T],
        output: &mut [T],
        direction: FftDirection,
    ) -> Result<(), PencilFftError> {
        let layout = self.layout(direction);
        if comm.size() != layout.ranks {
            return Err(PencilFftError::InvalidConfiguration(
                "communicator size does not match the plan",
            ));
        }
        if input.len() != layout.input_scalars() {
            return Err(PencilFftError::InvalidInputLength(
                layout.input_scalars(),
                input.len(),
            ));
        }
        if output.len() != layout.output_scalars() {
            return Err(PencilFftError::InvalidOutputLength(
                layout.output_scalars(),
                output.len(),
            ));
        }
        match direction {
            FftDirection::Forward => self.execute_forward(comm, input, output),
            FftDirection::Inverse => self.execute_inverse(comm, input, output),
        }
    }

    fn execute_forward<C: Communicator<T>>(
        &mut self,
        comm: &C,
        input: &[T],
        output: &mut [T],
    ) -> Result<(), PencilFftError> {
        let PencilPlan {
            forward: l,
            work_a,
            work_b,
            line,
            fwd_x,
            fwd_y,
            fwd_z,
            ..
        } = self;
        let (batch, ci, co, p) = (l.batch, l.ci, l.co, l.ranks);
        let (kt, mt) = (l.k_tile, l.m_tile);
        let (ne, ms) = (l.n_embedded, l.m_spectral);
        let (m, n, k) = (l.m, l.n, l.k);

        // [kt, N, M] -> [kt, N, M*e]
        if l.e == 2 {
            embed_axis(input, work_a, kt * n, m, batch * ci);
        } else {
            work_a[..input.len()].copy_from_slice(input);
        }

        // X lines: [kt, N, Me] -> [kt, N, Ms]
        transform_lines(fwd_x, work_a, work_b, kt * n, batch, ci, co, line)?;

        // Chunk by target rank: [kt, N, Ms] -> [p*mt, kt, N], zero padding
        // past Ms.
        permute3_into(
            work_b,
            Block3 {
                extents: [kt, n, ms],
                inner: batch * co,
            },
            [2, 0, 1],
            [p * mt, kt, n],
            work_a,
        );

        let chunk = l.exchange_chunk_scalars();
        exchange_pencils(comm, &work_a[..p * chunk], &mut work_b[..p * chunk], chunk)?;

        // [src, mt, kt, N] -> [mt, K, N]
        stitch_collected_axis(work_b, p, mt, kt, n * batch * co, work_a);

        // [mt, K, N] -> [mt, K, N*e]
        if l.e == 2 {
            embed_axis(work_a, work_b, mt * k, n, batch * co);
        } else {
            let len = mt * k * n * batch * co;
            work_b[..len].copy_from_slice(&work_a[..len]);
        }

        // Y lines in the collected pencil.
        transform_lines(fwd_y, work_b, work_a, mt * k, batch, co, co, line)?;

        // [mt, K, Ne] -> [Ne, mt, K]
        permute3(
            work_a,
            Block3 {
                extents: [mt, k, ne],
                inner: batch * co,
            },
            [2, 0, 1],
            work_b,
        );

        // [Ne, mt, K] -> [Ne, mt, K*e]
        if l.e == 2 {
            embed_axis(work_b, work_a, ne * mt, k, batch * co);
        } else {
            let len = ne * mt * k * batch * co;
            work_a[..len].copy_from_slice(&work_b[..len]);
        }

        // Z lines straight into the caller's output block.
        transform_lines(fwd_z, work_a, output, ne * mt, batch, co, co, line)?;
        Ok(())
    }

    fn execute_inverse<C: Communicator<T>>(
        &mut self,
        comm: &C,
        input: &[T],
        output: &mut [T],
    ) -> Result<(), PencilFftError> {
        let PencilPlan {
            inverse: l,
            work_a,
            work_b,
            line,
            inv_z,
            inv_y,
            inv_x,
            ..
        } = self;
        let (batch, ci, co, p) = (l.batch, l.ci, l.co, l.ranks);
        let (kt, mt) = (l.k_tile, l.m_tile);
        let (ne, ke, ms) = (l.n_embedded, l.k_embedded, l.m_spectral);

        // Z lines on the spectral input: [Ne, mt, Ke].
        transform_lines(inv_z, input, work_a, ne * mt, batch, ci, ci, line)?;

        // [Ne, mt, Ke] -> [mt, Ke, Ne]
        permute3(
            work_a,
            Block3 {
                extents: [ne, mt, ke],
                inner: batch * ci,
            },
            [1, 2, 0],
            work_b,
        );

        // Y lines.
        transform_lines(inv_y, work_b, work_a, mt * ke, batch, ci, ci, line)?;

        // [mt, Ke, Ne] -> [dst, mt, kt, Ne], chunk by target rank.
        chunk_distributed_axis(work_a, p, mt, kt, ne * batch * ci, work_b);

        let chunk = l.exchange_chunk_scalars();
        exchange_pencils(comm, &work_b[..p * chunk], &mut work_a[..p * chunk], chunk)?;

        // [src, mt, kt, Ne] -> [kt, Ne, Ms], dropping rank padding.
        collect_axis_masked(work_a, p, mt, ms, kt, ne, batch * ci, work_b);

        // X lines rebuild the physical extent: [kt, Ne, Me].
        transform_lines(inv_x, work_b, output, kt * ne, batch, ci, co, line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::ThreadGroup;
    use rand::Rng;

    fn run_ranks<F>(ranks: usize, f: F)
    where
        F: Fn(ThreadGroup<f64>) + Send + Sync,
    {
        let groups = ThreadGroup::split(ranks);
        std::thread::scope(|scope| {
            for comm in groups {
                scope.spawn(|| f(comm));
            }
        });
    }

    #[test]
    fn test_forward_impulse_lands_in_dc_bin() {
        // M=N=K=4, batch=1, p=2, real forward: a single unit impulse makes
        // every spectral bin's real part 1; the DC bin on rank 0 is checked.
        run_ranks(2, |comm| {
            let mut plan = PencilPlan::<f64>::create(2, 4, 4, 4, 1, false, false).unwrap();
            let mut input = vec![0.0f64; plan.input_scalars(FftDirection::Forward)];
            if comm.rank() == 0 {
                input[0] = 1.0;
            }
            let mut output = vec![0.0f64; plan.output_scalars(FftDirection::Forward)];
            plan.execute(&comm, &input, &mut output, FftDirection::Forward)
                .unwrap();
            if comm.rank() == 0 {
                assert!((output[0] - 1.0).abs() < 1e-8, "dc re {}", output[0]);
                assert!(output[1].abs() < 1e-8, "dc im {}", output[1]);
            }
        });
    }

    #[test]
    fn test_inverse_impulse_fills_constant_per_batch() {
        // M=N=K=4, batch=2, p=2: a DC impulse of amplitude M*N*K*(b+1)
        // inverse-transforms (unnormalized) to that constant everywhere.
        run_ranks(2, |comm| {
            let mut plan = PencilPlan::<f64>::create(2, 4, 4, 4, 2, false, false).unwrap();
            let inv = plan.layout(FftDirection::Inverse).clone();
            let mut input = vec![0.0f64; plan.input_scalars(FftDirection::Inverse)];
            if comm.rank() == 0 {
                for b in 0..inv.batch {
                    input[b * inv.ci] = (4 * 4 * 4 * (b + 1)) as f64;
                }
            }
            let mut output = vec![0.0f64; plan.output_scalars(FftDirection::Inverse)];
            plan.execute(&comm, &input, &mut output, FftDirection::Inverse)
                .unwrap();
            for (i, v) in output.iter().enumerate() {
                let b = i % inv.batch;
                let expected = (4 * 4 * 4 * (b + 1)) as f64;
                assert!(
                    (v - expected).abs() < 1e-8,
                    "rank {} element {i} was {v}, expected {expected}",
                    comm.rank()
                );
            }
        });
    }

    #[test]
    fn test_c2c_forward_inverse_round_trip() {
        run_ranks(2, |comm| {
            let (m, n, k, batch) = (4usize, 6usize, 4usize, 2usize);
            let mut plan = PencilPlan::<f64>::create(2, m, n, k, batch, false, true).unwrap();
            let mut input = vec![0.0f64; plan.input_scalars(FftDirection::Forward)];
            for z in input.iter_mut() {
                *z = rand::rng().random();
            }
            let mut spectral = vec![0.0f64; plan.output_scalars(FftDirection::Forward)];
            plan.execute(&comm, &input, &mut spectral, FftDirection::Forward)
                .unwrap();
            let mut back = vec![0.0f64; plan.output_scalars(FftDirection::Inverse)];
            plan.execute(&comm, &spectral, &mut back, FftDirection::Inverse)
                .unwrap();
            // Unnormalized in both directions: the round trip scales by the
            // global logical volume, and the Z-distributed layouts coincide.
            let scale = (m * n * k) as f64;
            for (orig, got) in input.iter().zip(back.iter()) {
                assert!(
                    (orig - got / scale).abs() < 1e-8,
                    "rank {}: {orig} vs {}",
                    comm.rank(),
                    got / scale
                );
            }
        });
    }

    #[test]
    fn test_embedded_c2c_round_trip() {
        run_ranks(2, |comm| {
            let (m, n, k, batch) = (4usize, 4usize, 4usize, 1usize);
            let mut plan = PencilPlan::<f64>::create(2, m, n, k, batch, true, true).unwrap();
            let fwd = plan.layout(FftDirection::Forward).clone();
            let mut input = vec![0.0f64; plan.input_scalars(FftDirection::Forward)];
            for z in input.iter_mut() {
                *z = rand::rng().random();
            }
            let mut spectral = vec![0.0f64; plan.output_scalars(FftDirection::Forward)];
            plan.execute(&comm, &input, &mut spectral, FftDirection::Forward)
                .unwrap();
            let mut back = vec![0.0f64; plan.output_scalars(FftDirection::Inverse)];
            plan.execute(&comm, &spectral, &mut back, FftDirection::Inverse)
                .unwrap();
            // The inverse lands in the doubled space [Ke/p, Ne, Me] with the
            // original core centered in every embedded axis. For p=2, K=4
            // each rank's output core overlaps exactly its own input slab,
            // so the check stays local.
            let scale = (fwd.m_embedded * fwd.n_embedded * fwd.k_embedded) as f64;
            let (kt_out, ne, me) = (k * 2 / 2, n * 2, m * 2);
            let kt_in = k / 2;
            let rank = comm.rank();
            for k0 in 0..kt_out {
                let kg = rank * kt_out + k0;
                for j in 0..ne {
                    for i in 0..me {
                        let got_re = back[((k0 * ne + j) * me + i) * 2] / scale;
                        let got_im = back[((k0 * ne + j) * me + i) * 2 + 1] / scale;
                        let inside = (k / 2..3 * k / 2).contains(&kg)
                            && (n / 2..3 * n / 2).contains(&j)
                            && (m / 2..3 * m / 2).contains(&i);
                        if inside {
                            let (ks, js, is) = (kg - k / 2, j - n / 2, i - m / 2);
                            assert_eq!(ks / kt_in, rank);
                            let src = ((ks - rank * kt_in) * n + js) * m + is;
                            assert!(
                                (got_re - input[src * 2]).abs() < 1e-8,
                                "core mismatch at ({kg},{j},{i})"
                            );
                            assert!((got_im - input[src * 2 + 1]).abs() < 1e-8);
                        } else {
                            assert!(
                                got_re.abs() < 1e-8 && got_im.abs() < 1e-8,
                                "padding region not zero at ({kg},{j},{i})"
                            );
                        }
                    }
                }
            }
        });
    }

    #[test]
    fn test_execute_validates_communicator_and_lengths() {
        run_ranks(1, |comm| {
            let mut plan = PencilPlan::<f64>::create(2, 4, 4, 4, 1, false, true).unwrap();
            let input = vec![0.0f64; plan.input_scalars(FftDirection::Forward)];
            let mut output = vec![0.0f64; plan.output_scalars(FftDirection::Forward)];
            let got = plan.execute(&comm, &input, &mut output, FftDirection::Forward);
            assert!(matches!(
                got,
                Err(PencilFftError::InvalidConfiguration(_))
            ));

            let mut plan = PencilPlan::<f64>::create(1, 4, 4, 4, 1, false, true).unwrap();
            let short = vec![0.0f64; 3];
            let got = plan.execute(&comm, &short, &mut output, FftDirection::Forward);
            assert!(matches!(got, Err(PencilFftError::InvalidInputLength(_, _))));
        });
    }

    #[test]
    fn test_forward_impulse_single_precision() {
        let comm = ThreadGroup::<f32>::split(1).pop().unwrap();
        let mut plan = PencilPlan::<f32>::create(1, 4, 4, 4, 1, false, false).unwrap();
        let mut input = vec![0.0f32; plan.input_scalars(FftDirection::Forward)];
        input[0] = 1.0;
        let mut output = vec![0.0f32; plan.output_scalars(FftDirection::Forward)];
        plan.execute(&comm, &input, &mut output, FftDirection::Forward)
            .unwrap();
        assert!((output[0] - 1.0).abs() < 1e-4);
        assert!(output[1].abs() < 1e-4);
    }

    #[test]
    fn test_plan_rejects_indivisible_k() {
        let got = PencilPlan::<f64>::create(3, 4, 4, 4, 1, false, true);
        assert!(matches!(got, Err(PencilFftError::UnsupportedSize(4, 3))));
    }

    #[test]
    fn test_repeat_execution_is_bit_identical() {
        run_ranks(2, |comm| {
            let mut plan = PencilPlan::<f64>::create(2, 4, 4, 4, 1, false, true).unwrap();
            let mut input = vec![0.0f64; plan.input_scalars(FftDirection::Forward)];
            for z in input.iter_mut() {
                *z = rand::rng().random();
            }
            let mut first = vec![0.0f64; plan.output_scalars(FftDirection::Forward)];
            let mut second = vec![0.0f64; plan.output_scalars(FftDirection::Forward)];
            plan.execute(&comm, &input, &mut first, FftDirection::Forward)
                .unwrap();
            plan.execute(&comm, &input, &mut second, FftDirection::Forward)
                .unwrap();
            let a: Vec<u64> = first.iter().map(|v| v.to_bits()).collect();
            let b: Vec<u64> = second.iter().map(|v| v.to_bits()).collect();
            assert_eq!(a, b);
        });
    }
}
