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
use crate::{FftDirection, PencilFftError};
use num_integer::Integer;

#[inline(always)]
pub(crate) fn ceil_div(a: usize, b: usize) -> usize {
    Integer::div_ceil(&a, &b)
}

/// X is the fastest spatial axis (extent `M`), Y the middle (`N`),
/// Z the slowest (`K`). Matches the `[K, N, M]` global tensor ordering.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransformKind {
    RealToComplex,
    ComplexToReal,
    ComplexToComplex,
}

impl TransformKind {
    pub fn classify(is_complex: bool, direction: FftDirection) -> TransformKind {
        if is_complex {
            TransformKind::ComplexToComplex
        } else {
            match direction {
                FftDirection::Forward => TransformKind::RealToComplex,
                FftDirection::Inverse => TransformKind::ComplexToReal,
            }
        }
    }

    /// Scalars stored per logical input element.
    pub fn multiplicity_in(self) -> usize {
        match self {
            TransformKind::RealToComplex => 1,
            TransformKind::ComplexToReal => 2,
            TransformKind::ComplexToComplex => 2,
        }
    }

    /// Scalars stored per logical output element.
    pub fn multiplicity_out(self) -> usize {
        match self {
            TransformKind::RealToComplex => 2,
            TransformKind::ComplexToReal => 1,
            TransformKind::ComplexToComplex => 2,
        }
    }
}

/// One ordered layout state of the pipeline: axis order (slowest to fastest),
/// global extent per axis, which axis is block-distributed and how many
/// scalars each logical element stores.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StageExtents {
    pub axes: [(Axis, usize); 3],
    pub distributed: Axis,
    pub multiplicity: usize,
}

impl StageExtents {
    pub fn global_extent(&self, axis: Axis) -> usize {
        self.axes
            .iter()
            .find(|(a, _)| *a == axis)
            .map(|(_, ext)| *ext)
            .unwrap_or(0)
    }

    /// Uniform per-rank capacity along the distributed axis.
    pub fn tile(&self, ranks: usize) -> usize {
        ceil_div(self.global_extent(self.distributed), ranks)
    }

    /// Valid (non-padding) extent this rank owns along the distributed axis.
    /// Ranks past the end of the axis own zero valid positions.
    pub fn local_extent(&self, ranks: usize, rank: usize) -> usize {
        let global = self.global_extent(self.distributed);
        let tile = ceil_div(global, ranks);
        let lo = (rank * tile).min(global);
        let hi = ((rank + 1) * tile).min(global);
        hi - lo
    }

    /// Total local scalar capacity, padding included.
    pub fn local_scalars(&self, ranks: usize, batch: usize) -> usize {
        let mut total = batch * self.multiplicity;
        for &(axis, extent) in self.axes.iter() {
            total *= if axis == self.distributed {
                self.tile(ranks)
            } else {
                extent
            };
        }
        total
    }

    /// Logical (non-padding) element count across all ranks, batch included.
    pub fn logical_elements(&self, batch: usize) -> usize {
        self.axes.iter().map(|&(_, ext)| ext).product::<usize>() * batch
    }
}

/// Immutable per-direction layout record: every stage's extents, complex
/// multiplicities and buffer sizes for one
/// `(M, N, K, batch, p, embedded, kind)` configuration. Owns no data.
#[derive(Debug, Clone)]
pub struct PencilLayout {
    pub ranks: usize,
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub batch: usize,
    pub embedded: bool,
    pub kind: TransformKind,
    pub direction: FftDirection,
    /// Embedding factor, 2 when zero-padded to double extent, otherwise 1.
    pub e: usize,
    pub ci: usize,
    pub co: usize,
    pub m_embedded: usize,
    pub n_embedded: usize,
    pub k_embedded: usize,
    /// Extent of the X axis on the spectral side: `M*e/2 + 1` when a real
    /// side is involved (Hermitian truncation), `M*e` for complex-complex.
    pub m_spectral: usize,
    /// `ceil(m_spectral / ranks)`: per-rank X capacity after the exchange.
    pub m_tile: usize,
    /// Per-rank Z extent: `K/p` on the spatial side, `K*e/p` on the
    /// spectral side. Exact by the divisibility contract.
    pub k_tile: usize,
    stages: Vec<StageExtents>,
}

impl PencilLayout {
    /// Computes every stage layout for one transform configuration.
    ///
    /// Fails with `InvalidConfiguration` for empty extents, zero ranks or a
    /// kind/direction pairing that is not executable, and with
    /// `UnsupportedSize` when `K` does not divide across the ranks (the
    /// remainder policy for the distributed spatial axis is deliberately
    /// unsupported rather than half-handled).
    pub fn describe(
        ranks: usize,
        m: usize,
        n: usize,
        k: usize,
        batch: usize,
        embedded: bool,
        kind: TransformKind,
        direction: FftDirection,
    ) -> Result<PencilLayout, PencilFftError> {
        if ranks == 0 {
            return Err(PencilFftError::InvalidConfiguration(
                "process count must be positive",
            ));
        }
        if m == 0 || n == 0 || k == 0 {
            return Err(PencilFftError::InvalidConfiguration(
                "tensor extents must be positive",
            ));
        }
        if batch == 0 {
            return Err(PencilFftError::InvalidConfiguration(
                "batch must be positive",
            ));
        }
        match (kind, direction) {
            (TransformKind::RealToComplex, FftDirection::Inverse) => {
                return Err(PencilFftError::InvalidConfiguration(
                    "real-to-complex is a forward-only transform",
                ));
            }
            (TransformKind::ComplexToReal, FftDirection::Forward) => {
                return Err(PencilFftError::InvalidConfiguration(
                    "complex-to-real is an inverse-only transform",
                ));
            }
            _ => {}
        }
        if k % ranks != 0 {
            return Err(PencilFftError::UnsupportedSize(k, ranks));
        }

        let e = if embedded { 2 } else { 1 };
        let ci = kind.multiplicity_in();
        let co = kind.multiplicity_out();
        let me = m * e;
        let ne = n * e;
        let ke = k * e;
        let m_spectral = match kind {
            TransformKind::ComplexToComplex => me,
            _ => me / 2 + 1,
        };
        let m_tile = ceil_div(m_spectral, ranks);
        let k_tile = match direction {
            FftDirection::Forward => k / ranks,
            FftDirection::Inverse => ke / ranks,
        };

        let stages = match direction {
            FftDirection::Forward => vec![
                // Z-distributed spatial input, core extents.
                StageExtents {
                    axes: [(Axis::Z, k), (Axis::Y, n), (Axis::X, m)],
                    distributed: Axis::Z,
                    multiplicity: ci,
                },
                // X axis embedded.
                StageExtents {
                    axes: [(Axis::Z, k), (Axis::Y, n), (Axis::X, me)],
                    distributed: Axis::Z,
                    multiplicity: ci,
                },
                // After the X-line transform: spectral X extent.
                StageExtents {
                    axes: [(Axis::Z, k), (Axis::Y, n), (Axis::X, m_spectral)],
                    distributed: Axis::Z,
                    multiplicity: co,
                },
                // Packed for the exchange: X outermost, chunked by target rank.
                StageExtents {
                    axes: [(Axis::X, m_spectral), (Axis::Z, k), (Axis::Y, n)],
                    distributed: Axis::Z,
                    multiplicity: co,
                },
                // After the exchange: X-distributed, Z collected.
                StageExtents {
                    axes: [(Axis::X, m_spectral), (Axis::Z, k), (Axis::Y, n)],
                    distributed: Axis::X,
                    multiplicity: co,
                },
                // Y axis embedded.
                StageExtents {
                    axes: [(Axis::X, m_spectral), (Axis::Z, k), (Axis::Y, ne)],
                    distributed: Axis::X,
                    multiplicity: co,
                },
                // Y transformed, Z rotated to the fast position.
                StageExtents {
                    axes: [(Axis::Y, ne), (Axis::X, m_spectral), (Axis::Z, k)],
                    distributed: Axis::X,
                    multiplicity: co,
                },
                // Z axis embedded and transformed: X-distributed spectral output.
                StageExtents {
                    axes: [(Axis::Y, ne), (Axis::X, m_spectral), (Axis::Z, ke)],
                    distributed: Axis::X,
                    multiplicity: co,
                },
            ],
            FftDirection::Inverse => vec![
                // X-distributed spectral input, already in the embedded space.
                StageExtents {
                    axes: [(Axis::Y, ne), (Axis::X, m_spectral), (Axis::Z, ke)],
                    distributed: Axis::X,
                    multiplicity: ci,
                },
                // Z transformed, Y rotated to the fast position.
                StageExtents {
                    axes: [(Axis::X, m_spectral), (Axis::Z, ke), (Axis::Y, ne)],
                    distributed: Axis::X,
                    multiplicity: ci,
                },
                // Packed for the exchange: Z outermost, chunked by target rank.
                StageExtents {
                    axes: [(Axis::Z, ke), (Axis::X, m_spectral), (Axis::Y, ne)],
                    distributed: Axis::X,
                    multiplicity: ci,
                },
                // After the exchange: Z-distributed, X still rank-striped.
                StageExtents {
                    axes: [(Axis::Z, ke), (Axis::X, m_spectral), (Axis::Y, ne)],
                    distributed: Axis::Z,
                    multiplicity: ci,
                },
                // X collected to the fast position, rank padding dropped.
                StageExtents {
                    axes: [(Axis::Z, ke), (Axis::Y, ne), (Axis::X, m_spectral)],
                    distributed: Axis::Z,
                    multiplicity: ci,
                },
                // After the X-line transform: Z-distributed spatial output in
                // the full embedded extent.
                StageExtents {
                    axes: [(Axis::Z, ke), (Axis::Y, ne), (Axis::X, me)],
                    distributed: Axis::Z,
                    multiplicity: co,
                },
            ],
        };

        Ok(PencilLayout {
            ranks,
            m,
            n,
            k,
            batch,
            embedded,
            kind,
            direction,
            e,
            ci,
            co,
            m_embedded: me,
            n_embedded: ne,
            k_embedded: ke,
            m_spectral,
            m_tile,
            k_tile,
            stages,
        })
    }

    pub fn stages(&self) -> &[StageExtents] {
        &self.stages
    }

    /// Scalar count of the caller-provided input block on any rank.
    pub fn input_scalars(&self) -> usize {
        match self.direction {
            FftDirection::Forward => self.k_tile * self.n * self.m * self.batch * self.ci,
            FftDirection::Inverse => {
                self.n_embedded * self.m_tile * self.k_embedded * self.batch * self.ci
            }
        }
    }

    /// Scalar count of the caller-provided output block on any rank.
    pub fn output_scalars(&self) -> usize {
        match self.direction {
            FftDirection::Forward => {
                self.n_embedded * self.m_tile * self.k_embedded * self.batch * self.co
            }
            FftDirection::Inverse => {
                self.k_tile * self.n_embedded * self.m_embedded * self.batch * self.co
            }
        }
    }

    /// Uniform per-destination-rank chunk of the all-to-all, in scalars.
    /// Short chunks on the trailing rank are padded up to this size.
    pub fn exchange_chunk_scalars(&self) -> usize {
        match self.direction {
            FftDirection::Forward => self.m_tile * self.k_tile * self.n * self.batch * self.co,
            FftDirection::Inverse => {
                self.m_tile * self.k_tile * self.n_embedded * self.batch * self.ci
            }
        }
    }

    /// Capacity each of the two pipeline work buffers must hold.
    pub fn work_scalars(&self) -> usize {
        let b = self.batch;
        match self.direction {
            FftDirection::Forward => {
                let embed_x = self.k_tile * self.n * self.m_embedded * b * self.ci;
                let lines_x = self.k_tile * self.n * self.m_spectral * b * self.co;
                let packed = self.ranks * self.exchange_chunk_scalars();
                let collected = self.m_tile * self.k * self.n * b * self.co;
                let embed_y = self.m_tile * self.k * self.n_embedded * b * self.co;
                let rotated = self.n_embedded * self.m_tile * self.k * b * self.co;
                let embed_z = self.output_scalars();
                embed_x
                    .max(lines_x)
                    .max(packed)
                    .max(collected)
                    .max(embed_y)
                    .max(rotated)
                    .max(embed_z)
            }
            FftDirection::Inverse => {
                let lines_z = self.input_scalars();
                let rotated = self.m_tile * self.k_embedded * self.n_embedded * b * self.ci;
                let packed = self.ranks * self.exchange_chunk_scalars();
                let collected = self.k_tile * self.n_embedded * self.m_spectral * b * self.ci;
                lines_z.max(rotated).max(packed).max(collected)
            }
        }
    }

    /// Valid X extent this rank owns after the exchange (forward) or on the
    /// spectral input (inverse). Zero for ranks past the end of the axis.
    pub fn m_local(&self, rank: usize) -> usize {
        let lo = (rank * self.m_tile).min(self.m_spectral);
        let hi = ((rank + 1) * self.m_tile).min(self.m_spectral);
        hi - lo
    }
}
