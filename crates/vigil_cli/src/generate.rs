//! `vigil generate`: write sine or threshold-vector reference files.

use vigil_bench::datagen::{sine_q31, threshold_vectors};
use vigil_bench::{write_reference, Radix};

use crate::{GenerateKind, GlobalArgs};

/// Runs the `vigil generate` command.
pub fn run(kind: &GenerateKind, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (out, samples, hex) = match kind {
        GenerateKind::Sine {
            out,
            rate,
            frequency,
            seconds,
            hex,
        } => (out, sine_q31(*rate, *frequency, *seconds), *hex),
        GenerateKind::Thresholds {
            out,
            threshold,
            rounds,
            seed,
            hex,
        } => {
            let threshold = match threshold {
                Some(t) => *t,
                None => global.bench_config()?.threshold.value,
            };
            (out, threshold_vectors(threshold.signed(), *rounds, *seed), *hex)
        }
    };
    let radix = if hex { Radix::Hex } else { Radix::Decimal };
    write_reference(out, &samples, radix)?;
    if !global.quiet {
        eprintln!("   Wrote {} sample(s) to {}", samples.len(), out.display());
    }
    Ok(0)
}
