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
use crate::PencilFftError;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier};

/// Collective transport and process bootstrap, the seam a real MPI (or NCCL)
/// binding implements out of tree. Every method is a full-group operation:
/// all ranks must call it, in the same order.
pub trait Communicator<T> {
    fn size(&self) -> usize;
    fn rank(&self) -> usize;

    /// One uniform-chunk all-to-all. `send` and `recv` both hold
    /// `size * chunk` scalars; chunk `j` of `send` goes to rank `j`, chunk
    /// `j` of `recv` arrives from rank `j`.
    fn all_to_all(&self, send: &[T], recv: &mut [T], chunk: usize) -> Result<(), PencilFftError>;

    /// Gathers equal-length blocks to `root`, rank order. `recv` must be
    /// `Some` on the root with room for `size * send.len()` scalars.
    fn gather(
        &self,
        send: &[T],
        recv: Option<&mut [T]>,
        root: usize,
    ) -> Result<(), PencilFftError>;

    /// Elementwise global sum, result replicated on every rank.
    fn all_reduce_sum(&self, values: &mut [T]) -> Result<(), PencilFftError>;

    fn barrier(&self) -> Result<(), PencilFftError>;
}

/// In-process rank group: every rank is a thread, linked by one channel per
/// directed pair. Collectives run pairwise rounds, rank exchanging with
/// `(rank + step) % size` so no two pairs collide in a round. Backs the test
/// suite and the demo driver; a production deployment substitutes an MPI
/// adapter behind [`Communicator`].
pub struct ThreadGroup<T> {
    rank: usize,
    size: usize,
    senders: Vec<Sender<Vec<T>>>,
    receivers: Vec<Receiver<Vec<T>>>,
    barrier: Arc<Barrier>,
}

impl<T: Send> ThreadGroup<T> {
    /// Creates the whole group at once; hand one element to each rank thread.
    pub fn split(size: usize) -> Vec<ThreadGroup<T>> {
        assert!(size > 0, "rank group must not be empty");
        let barrier = Arc::new(Barrier::new(size));

        let mut senders_from: Vec<Vec<Sender<Vec<T>>>> = Vec::with_capacity(size);
        let mut receivers_at: Vec<Vec<Option<Receiver<Vec<T>>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();
        for src in 0..size {
            let mut row = Vec::with_capacity(size);
            for dst in 0..size {
                let (tx, rx) = channel();
                row.push(tx);
                receivers_at[dst][src] = Some(rx);
            }
            senders_from.push(row);
        }

        senders_from
            .into_iter()
            .zip(receivers_at)
            .enumerate()
            .map(|(rank, (senders, receivers))| ThreadGroup {
                rank,
                size,
                senders,
                receivers: receivers.into_iter().map(|r| r.unwrap()).collect(),
                barrier: Arc::clone(&barrier),
            })
            .collect()
    }

    fn send_to(&self, dst: usize, data: Vec<T>) -> Result<(), PencilFftError> {
        self.senders[dst]
            .send(data)
            .map_err(|_| PencilFftError::CollectiveFailure("peer rank hung up"))
    }

    fn recv_from(&self, src: usize) -> Result<Vec<T>, PencilFftError> {
        self.receivers[src]
            .recv()
            .map_err(|_| PencilFftError::CollectiveFailure("peer rank hung up"))
    }
}

impl<T> Communicator<T> for ThreadGroup<T>
where
    T: Copy + Send + std::ops::AddAssign,
{
    fn size(&self) -> usize {
        self.size
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn all_to_all(&self, send: &[T], recv: &mut [T], chunk: usize) -> Result<(), PencilFftError> {
        let total = chunk * self.size;
        if send.len() < total {
            return Err(PencilFftError::InvalidInputLength(total, send.len()));
        }
        if recv.len() < total {
            return Err(PencilFftError::InvalidOutputLength(total, recv.len()));
        }

        let own = self.rank * chunk;
        recv[own..own + chunk].copy_from_slice(&send[own..own + chunk]);

        for step in 1..self.size {
            let to = (self.rank + step) % self.size;
            let from = (self.rank + self.size - step) % self.size;
            self.send_to(to, send[to * chunk..(to + 1) * chunk].to_vec())?;
            let data = self.recv_from(from)?;
            if data.len() != chunk {
                return Err(PencilFftError::CollectiveFailure(
                    "received chunk of unexpected size",
                ));
            }
            recv[from * chunk..(from + 1) * chunk].copy_from_slice(&data);
        }
        Ok(())
    }

    fn gather(
        &self,
        send: &[T],
        recv: Option<&mut [T]>,
        root: usize,
    ) -> Result<(), PencilFftError> {
        let block = send.len();
        if self.rank == root {
            let recv = recv.ok_or(PencilFftError::CollectiveFailure(
                "gather root needs a receive buffer",
            ))?;
            if recv.len() < block * self.size {
                return Err(PencilFftError::InvalidOutputLength(
                    block * self.size,
                    recv.len(),
                ));
            }
            recv[root * block..(root + 1) * block].copy_from_slice(send);
            for src in 0..self.size {
                if src == root {
                    continue;
                }
                let data = self.recv_from(src)?;
                if data.len() != block {
                    return Err(PencilFftError::CollectiveFailure(
                        "gathered block of unexpected size",
                    ));
                }
                recv[src * block..(src + 1) * block].copy_from_slice(&data);
            }
        } else {
            self.send_to(root, send.to_vec())?;
        }
        Ok(())
    }

    fn all_reduce_sum(&self, values: &mut [T]) -> Result<(), PencilFftError> {
        if self.rank == 0 {
            for src in 1..self.size {
                let data = self.recv_from(src)?;
                if data.len() != values.len() {
                    return Err(PencilFftError::CollectiveFailure(
                        "reduced block of unexpected size",
                    ));
                }
                for (acc, v) in values.iter_mut().zip(data) {
                    *acc += v;
                }
            }
            for dst in 1..self.size {
                self.send_to(dst, values.to_vec())?;
            }
        } else {
            self.send_to(0, values.to_vec())?;
            let data = self.recv_from(0)?;
            values.copy_from_slice(&data);
        }
        Ok(())
    }

    fn barrier(&self) -> Result<(), PencilFftError> {
        self.barrier.wait();
        Ok(())
    }
}
