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
mod comm;
mod complex_fma;
mod dft;
mod embed;
mod err;
mod exchange;
mod factory;
mod layout;
mod local_fft;
mod oracle;
mod permute;
mod plan;
mod r2c;
mod radix2;
mod traits;
mod util;

pub use comm::{Communicator, ThreadGroup};
pub use err::PencilFftError;
pub use layout::{Axis, PencilLayout, StageExtents, TransformKind};
pub use oracle::{impulse_check, local_compare_check, OracleOutcome};
pub use plan::PencilPlan;
pub use traits::FftSample;

use num_complex::Complex;

/// The local 1-D line transform seam. The in-crate radix-2 and DFT kernels
/// are correctness references; a vendor device FFT drops in behind this
/// trait without touching the layout engine.
pub trait FftExecutor<T> {
    fn execute(&self, in_place: &mut [Complex<T>]) -> Result<(), PencilFftError>;
    fn direction(&self) -> FftDirection;
    fn length(&self) -> usize;
}

pub struct PencilFft {}

impl PencilFft {
    /// Plans a distributed 3-D transform over `ranks` processes. Sizes are
    /// given in real space, so one plan serves the forward and the inverse
    /// direction alike.
    pub fn plan_f32(
        ranks: usize,
        m: usize,
        n: usize,
        k: usize,
        batch: usize,
        embedded: bool,
        complex_input: bool,
    ) -> Result<PencilPlan<f32>, PencilFftError> {
        PencilPlan::create(ranks, m, n, k, batch, embedded, complex_input)
    }

    pub fn plan_f64(
        ranks: usize,
        m: usize,
        n: usize,
        k: usize,
        batch: usize,
        embedded: bool,
        complex_input: bool,
    ) -> Result<PencilPlan<f64>, PencilFftError> {
        PencilPlan::create(ranks, m, n, k, batch, embedded, complex_input)
    }
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum FftDirection {
    Forward,
    Inverse,
}
