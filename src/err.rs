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
use std::error::Error;
use std::fmt::Formatter;

#[derive(Clone, Debug)]
pub enum PencilFftError {
    OutOfMemory(usize),
    /// Sizes, rank count or kind/direction combination rejected at plan creation.
    InvalidConfiguration(&'static str),
    /// Extent/rank-count pair outside the supported envelope, e.g. `K % p != 0`.
    UnsupportedSize(usize, usize),
    /// The all-to-all or gather primitive failed. Fatal, no retry.
    CollectiveFailure(&'static str),
    /// The local-transform collaborator reported an error.
    ExternalKernelFailure(&'static str),
    InvalidInputLength(usize, usize),
    InvalidOutputLength(usize, usize),
    InvalidInPlaceLength(usize, usize),
}

impl Error for PencilFftError {}

impl std::fmt::Display for PencilFftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PencilFftError::OutOfMemory(length) => {
                f.write_fmt(format_args!("Cannot allocate {length} elements to vector"))
            }
            PencilFftError::InvalidConfiguration(what) => {
                f.write_fmt(format_args!("Invalid plan configuration: {what}"))
            }
            PencilFftError::UnsupportedSize(extent, ranks) => f.write_fmt(format_args!(
                "Extent {extent} is not divisible across {ranks} ranks; this decomposition is not supported"
            )),
            PencilFftError::CollectiveFailure(what) => {
                f.write_fmt(format_args!("Collective exchange failed: {what}"))
            }
            PencilFftError::ExternalKernelFailure(what) => {
                f.write_fmt(format_args!("Local transform kernel failed: {what}"))
            }
            PencilFftError::InvalidInputLength(s0, s1) => f.write_fmt(format_args!(
                "Input length expected to be {s0}, but it was {s1}"
            )),
            PencilFftError::InvalidOutputLength(s0, s1) => f.write_fmt(format_args!(
                "Output length expected to be {s0}, but it was {s1}"
            )),
            PencilFftError::InvalidInPlaceLength(s0, s1) => f.write_fmt(format_args!(
                "In-place length expected to be {s0}, but it was {s1}"
            )),
        }
    }
}

macro_rules! try_vec {
    () => {
        Vec::new()
    };
    ($elem:expr; $n:expr) => {{
        let mut v = Vec::new();
        v.try_reserve_exact($n)
            .map_err(|_| crate::err::PencilFftError::OutOfMemory($n))?;
        v.resize($n, $elem);
        v
    }};
}

pub(crate) use try_vec;
