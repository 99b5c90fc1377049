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

//! Redistributes a tensor between a Z-block and an X-block distribution with
//! one uniform-chunk all-to-all, plus the local reshapes on either side of
//! it. The sender packs `p` contiguous chunks (chunk `j` destined for rank
//! `j`); the receiver stitches the `p` received chunks back into one block,
//! masking the positions that were only rank padding.

use crate::comm::Communicator;
use crate::PencilFftError;

/// One collective exchange. `send` and `recv` hold `size * chunk` scalars.
/// A single-rank group needs no redistribution, so the engine degenerates to
/// a copy and never touches the transport.
pub(crate) fn exchange_pencils<T: Copy, C: Communicator<T>>(
    comm: &C,
    send: &[T],
    recv: &mut [T],
    chunk: usize,
) -> Result<(), PencilFftError> {
    let total = chunk * comm.size();
    if send.len() < total {
        return Err(PencilFftError::InvalidInputLength(total, send.len()));
    }
    if recv.len() < total {
        return Err(PencilFftError::InvalidOutputLength(total, recv.len()));
    }
    if comm.size() == 1 {
        recv[..chunk].copy_from_slice(&send[..chunk]);
        return Ok(());
    }
    comm.all_to_all(send, recv, chunk)
}

/// Post-exchange reshape on the forward path:
/// `[parts, a, b_tile, rest]` becomes `[a, parts*b_tile, rest]`, stitching
/// the per-source tiles of the collected axis into one contiguous extent.
pub(crate) fn stitch_collected_axis<T: Copy>(
    src: &[T],
    parts: usize,
    a: usize,
    b_tile: usize,
    rest: usize,
    dst: &mut [T],
) {
    debug_assert!(src.len() >= parts * a * b_tile * rest);
    debug_assert!(dst.len() >= a * parts * b_tile * rest);
    for s in 0..parts {
        for a0 in 0..a {
            for b0 in 0..b_tile {
                let src_offset = ((s * a + a0) * b_tile + b0) * rest;
                let dst_offset = ((a0 * parts + s) * b_tile + b0) * rest;
                dst[dst_offset..dst_offset + rest]
                    .copy_from_slice(&src[src_offset..src_offset + rest]);
            }
        }
    }
}

/// Pre-exchange reshape on the inverse path, the exact mirror of
/// [`stitch_collected_axis`]: `[a, parts*b_tile, rest]` becomes
/// `[parts, a, b_tile, rest]` so chunk `j` is contiguous and destined for
/// rank `j`.
pub(crate) fn chunk_distributed_axis<T: Copy>(
    src: &[T],
    parts: usize,
    a: usize,
    b_tile: usize,
    rest: usize,
    dst: &mut [T],
) {
    debug_assert!(src.len() >= a * parts * b_tile * rest);
    debug_assert!(dst.len() >= parts * a * b_tile * rest);
    for s in 0..parts {
        for a0 in 0..a {
            for b0 in 0..b_tile {
                let src_offset = ((a0 * parts + s) * b_tile + b0) * rest;
                let dst_offset = ((s * a + a0) * b_tile + b0) * rest;
                dst[dst_offset..dst_offset + rest]
                    .copy_from_slice(&src[src_offset..src_offset + rest]);
            }
        }
    }
}

/// Post-exchange reshape on the inverse path: the received
/// `[parts, m_tile, k_tile, cols, inner]` block becomes
/// `[k_tile, cols, m_valid, inner]`, rotating the collected X axis to the
/// fast position and dropping the rank-padding rows `s*m_tile + m0 >=
/// m_valid` that the uniform chunk size forced the exchange to carry.
#[allow(clippy::too_many_arguments)]
pub(crate) fn collect_axis_masked<T: Copy>(
    src: &[T],
    parts: usize,
    m_tile: usize,
    m_valid: usize,
    k_tile: usize,
    cols: usize,
    inner: usize,
    dst: &mut [T],
) {
    debug_assert!(src.len() >= parts * m_tile * k_tile * cols * inner);
    debug_assert!(dst.len() >= k_tile * cols * m_valid * inner);
    for s in 0..parts {
        for m0 in 0..m_tile {
            let m = s * m_tile + m0;
            if m >= m_valid {
                continue;
            }
            for k0 in 0..k_tile {
                for j in 0..cols {
                    let src_offset = (((s * m_tile + m0) * k_tile + k0) * cols + j) * inner;
                    let dst_offset = ((k0 * cols + j) * m_valid + m) * inner;
                    dst[dst_offset..dst_offset + inner]
                        .copy_from_slice(&src[src_offset..src_offset + inner]);
                }
            }
        }
    }
}
