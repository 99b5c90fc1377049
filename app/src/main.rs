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

//! Worked-example driver: runs one distributed 3-D transform over an
//! in-process rank group and prints a CSV result line. Check modes: 0 none,
//! 1 impulse (first element closed form), 2 full local compare on the root.

use pencilfft::{
    impulse_check, local_compare_check, Communicator, FftDirection, OracleOutcome, PencilFft,
    ThreadGroup,
};
use rand::Rng;
use std::time::Instant;

struct Config {
    m: usize,
    n: usize,
    k: usize,
    batch: usize,
    embedded: bool,
    forward: bool,
    complex: bool,
    check: usize,
    ranks: usize,
}

fn usage() -> ! {
    eprintln!(
        "usage: pencilfft-demo <M> <N> <K> <batch> <embedded> <forward> <complex> <check> <ranks>"
    );
    std::process::exit(1);
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 10 {
        usage();
    }
    let num = |i: usize| args[i].parse::<usize>().unwrap_or_else(|_| usage());
    Config {
        m: num(1),
        n: num(2),
        k: num(3),
        batch: num(4),
        embedded: num(5) > 0,
        forward: num(6) > 0,
        complex: num(7) > 0,
        check: num(8),
        ranks: num(9),
    }
}

fn verdict_tag(outcome: OracleOutcome) -> &'static str {
    match outcome {
        OracleOutcome::Passed => "1",
        OracleOutcome::Failed => "0",
        OracleOutcome::Skipped => "X",
    }
}

fn run_rank(comm: ThreadGroup<f64>, cfg: &Config) {
    let mut plan = PencilFft::plan_f64(
        cfg.ranks,
        cfg.m,
        cfg.n,
        cfg.k,
        cfg.batch,
        cfg.embedded,
        cfg.complex,
    )
    .unwrap_or_else(|e| {
        eprintln!("plan creation failed: {e}");
        std::process::exit(2);
    });
    let direction = if cfg.forward {
        FftDirection::Forward
    } else {
        FftDirection::Inverse
    };

    let (elapsed, verdict) = if cfg.check == 1 {
        let start = Instant::now();
        let outcome = impulse_check(&mut plan, &comm, direction).expect("impulse check failed");
        (start.elapsed().as_secs_f64(), verdict_tag(outcome))
    } else {
        let mut input = vec![0.0f64; plan.input_scalars(direction)];
        for z in input.iter_mut() {
            *z = rand::rng().random();
        }
        let mut output = vec![0.0f64; plan.output_scalars(direction)];
        let start = Instant::now();
        plan.execute(&comm, &input, &mut output, direction)
            .expect("execution failed");
        let elapsed = start.elapsed().as_secs_f64();
        let verdict = if cfg.check == 2 {
            let outcome = local_compare_check(&plan, &comm, &input, &output, direction)
                .expect("local compare failed");
            verdict_tag(outcome)
        } else {
            "-"
        };
        (elapsed, verdict)
    };

    if comm.rank() == 0 {
        println!(
            "{},{},{},{},{},{},{},{},{},{:.6},{}",
            cfg.m,
            cfg.n,
            cfg.k,
            cfg.batch,
            cfg.ranks,
            if cfg.embedded { "embedded" } else { "" },
            if cfg.forward { "fwd" } else { "inv" },
            if cfg.complex { "complex" } else { "real" },
            match cfg.check {
                1 => "first_elem",
                2 => "local",
                _ => "none",
            },
            elapsed,
            verdict
        );
    }
}

fn main() {
    let cfg = parse_args();
    let groups = ThreadGroup::<f64>::split(cfg.ranks);
    std::thread::scope(|scope| {
        for comm in groups {
            scope.spawn(|| run_rank(comm, &cfg));
        }
    });
}
