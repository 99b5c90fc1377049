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

//! Zero-pads the fastest logical axis of a block into a doubled-extent axis,
//! or slices the core back out. The core of extent `X` lands at offset `X/2`
//! in C integer-division terms, so an odd core takes `floor(X/2)` leading and
//! `ceil(X/2)` trailing padding. Values are copied, never recomputed, so a
//! truncation after an embedding is bit-exact.

/// `src` is `[outer, core, inner]` scalars, `dst` is `[outer, 2*core, inner]`.
/// `inner` is the contiguous scalar run per logical element (batch times
/// complex multiplicity).
pub(crate) fn embed_axis<T: Copy + Default>(
    src: &[T],
    dst: &mut [T],
    outer: usize,
    core: usize,
    inner: usize,
) {
    let doubled = core * 2;
    let lead = core / 2;
    debug_assert!(src.len() >= outer * core * inner);
    debug_assert!(dst.len() >= outer * doubled * inner);

    for o in 0..outer {
        let src_row = &src[o * core * inner..(o + 1) * core * inner];
        let dst_row = &mut dst[o * doubled * inner..(o + 1) * doubled * inner];
        for v in dst_row[..lead * inner].iter_mut() {
            *v = T::default();
        }
        dst_row[lead * inner..(lead + core) * inner].copy_from_slice(src_row);
        for v in dst_row[(lead + core) * inner..].iter_mut() {
            *v = T::default();
        }
    }
}

/// Exact inverse slice of [`embed_axis`]: `src` is `[outer, 2*core, inner]`,
/// `dst` is `[outer, core, inner]`. The inverse pipeline leaves its result
/// in the doubled space, so this is the consumer-side extraction step.
#[allow(unused)]
pub(crate) fn truncate_axis<T: Copy>(
    src: &[T],
    dst: &mut [T],
    outer: usize,
    core: usize,
    inner: usize,
) {
    let doubled = core * 2;
    let lead = core / 2;
    debug_assert!(src.len() >= outer * doubled * inner);
    debug_assert!(dst.len() >= outer * core * inner);

    for o in 0..outer {
        let src_row = &src[o * doubled * inner..(o + 1) * doubled * inner];
        let dst_row = &mut dst[o * core * inner..(o + 1) * core * inner];
        dst_row.copy_from_slice(&src_row[lead * inner..(lead + core) * inner]);
    }
}
