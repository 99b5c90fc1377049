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

//! Local axis reordering between two stage layouts. One shared row-major
//! stride routine serves every permute in the pipeline; no stage hand-inlines
//! its own offset formula.

/// A local three-axis block, extents slowest to fastest, plus the contiguous
/// scalar run per logical element (batch times complex multiplicity).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Block3 {
    pub extents: [usize; 3],
    pub inner: usize,
}

impl Block3 {
    pub(crate) fn scalars(&self) -> usize {
        self.extents[0] * self.extents[1] * self.extents[2] * self.inner
    }

    /// Row-major strides in scalars.
    pub(crate) fn strides(&self) -> [usize; 3] {
        [
            self.extents[1] * self.extents[2] * self.inner,
            self.extents[2] * self.inner,
            self.inner,
        ]
    }
}

/// Reorders `src` so destination axis `j` is source axis `perm[j]`, writing a
/// destination block whose extents are `dst_extents` (each at least the
/// permuted source extent). Destination positions with no source counterpart
/// are zero-filled, never read from `src`.
pub(crate) fn permute3_into<T: Copy + Default>(
    src: &[T],
    shape: Block3,
    perm: [usize; 3],
    dst_extents: [usize; 3],
    dst: &mut [T],
) {
    let inner = shape.inner;
    let src_strides = shape.strides();
    let permuted = [
        shape.extents[perm[0]],
        shape.extents[perm[1]],
        shape.extents[perm[2]],
    ];
    debug_assert!(dst_extents[0] >= permuted[0]);
    debug_assert!(dst_extents[1] >= permuted[1]);
    debug_assert!(dst_extents[2] >= permuted[2]);
    debug_assert!(src.len() >= shape.scalars());
    debug_assert!(dst.len() >= dst_extents[0] * dst_extents[1] * dst_extents[2] * inner);

    let dst_strides = [
        dst_extents[1] * dst_extents[2] * inner,
        dst_extents[2] * inner,
        inner,
    ];

    for a in 0..dst_extents[0] {
        for b in 0..dst_extents[1] {
            for c in 0..dst_extents[2] {
                let dst_offset = a * dst_strides[0] + b * dst_strides[1] + c * dst_strides[2];
                if a < permuted[0] && b < permuted[1] && c < permuted[2] {
                    let mut src_idx = [0usize; 3];
                    src_idx[perm[0]] = a;
                    src_idx[perm[1]] = b;
                    src_idx[perm[2]] = c;
                    let src_offset = src_idx[0] * src_strides[0]
                        + src_idx[1] * src_strides[1]
                        + src_idx[2] * src_strides[2];
                    dst[dst_offset..dst_offset + inner]
                        .copy_from_slice(&src[src_offset..src_offset + inner]);
                } else {
                    for v in dst[dst_offset..dst_offset + inner].iter_mut() {
                        *v = T::default();
                    }
                }
            }
        }
    }
}

/// Plain permute with no padding: destination extents are exactly the
/// permuted source extents.
pub(crate) fn permute3<T: Copy + Default>(src: &[T], shape: Block3, perm: [usize; 3], dst: &mut [T]) {
    let permuted = [
        shape.extents[perm[0]],
        shape.extents[perm[1]],
        shape.extents[perm[2]],
    ];
    permute3_into(src, shape, perm, permuted, dst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn inverse(perm: [usize; 3]) -> [usize; 3] {
        let mut inv = [0usize; 3];
        for (j, &p) in perm.iter().enumerate() {
            inv[p] = j;
        }
        inv
    }

    #[test]
    fn test_permute_round_trip_is_bijective() {
        let perms: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for perm in perms {
            for inner in [1usize, 2, 4] {
                let shape = Block3 {
                    extents: [3, 4, 5],
                    inner,
                };
                let mut src = vec![0.0f64; shape.scalars()];
                for z in src.iter_mut() {
                    *z = rand::rng().random();
                }
                let mut mid = vec![0.0f64; shape.scalars()];
                let mut back = vec![0.0f64; shape.scalars()];
                permute3(&src, shape, perm, &mut mid);
                let mid_shape = Block3 {
                    extents: [
                        shape.extents[perm[0]],
                        shape.extents[perm[1]],
                        shape.extents[perm[2]],
                    ],
                    inner,
                };
                permute3(&mid, mid_shape, inverse(perm), &mut back);
                assert_eq!(src, back, "perm {perm:?} inner {inner} did not invert");
            }
        }
    }

    #[test]
    fn test_permute_moves_fastest_axis_to_front() {
        // [2, 2, 3] with the fast axis rotated outermost, the layout used to
        // stage the pre-exchange chunks.
        let shape = Block3 {
            extents: [2, 2, 3],
            inner: 1,
        };
        let src: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let mut dst = vec![0.0f64; 12];
        permute3(&src, shape, [2, 0, 1], &mut dst);
        // dst[c][a][b] = src[a][b][c]
        for a in 0..2 {
            for b in 0..2 {
                for c in 0..3 {
                    assert_eq!(dst[(c * 2 + a) * 2 + b], src[(a * 2 + b) * 3 + c]);
                }
            }
        }
    }

    #[test]
    fn test_padded_permute_zero_fills_and_never_reads_padding() {
        let shape = Block3 {
            extents: [2, 2, 3],
            inner: 2,
        };
        let mut src = vec![0.0f64; shape.scalars()];
        for z in src.iter_mut() {
            *z = 1.0 + rand::rng().random::<f64>();
        }
        // Pad the leading destination axis from 3 to 4, as the exchange does
        // when the spectral extent does not divide across ranks.
        let mut dst = vec![f64::NAN; 4 * 2 * 2 * 2];
        permute3_into(&src, shape, [2, 0, 1], [4, 2, 2], &mut dst);
        for a in 0..4usize {
            for b in 0..2 {
                for c in 0..2 {
                    for x in 0..2 {
                        let v = dst[((a * 2 + b) * 2 + c) * 2 + x];
                        if a < 3 {
                            assert!(v >= 1.0);
                        } else {
                            assert_eq!(v, 0.0, "padding position not synthesized as zero");
                        }
                    }
                }
            }
        }
    }
}
