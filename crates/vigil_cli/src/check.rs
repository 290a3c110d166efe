//! `vigil check`: load a reference file and count samples over thresholds.

use vigil_bench::{load_reference, Comparison, ReferenceData, ThresholdSet};

use crate::{CheckArgs, GlobalArgs};

/// Runs the `vigil check` command.
///
/// Exits with 1 when the file holds no valid sample.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = global.bench_config()?;
    let data = load_reference(&args.file)?;

    let thresholds = if args.threshold.is_empty() {
        vec![config.threshold.value]
    } else {
        args.threshold.clone()
    };
    let comparison = if args.unsigned {
        Comparison::Unsigned
    } else {
        config.threshold.comparison
    };
    let set = ThresholdSet::with_comparison(thresholds, comparison);

    if !global.quiet {
        eprintln!("   Checking {}", args.file.display());
        for skipped in &data.skipped {
            eprintln!(
                "warning: line {}: skipped '{}': {}",
                skipped.line, skipped.text, skipped.reason
            );
        }
    }
    for line in summarize(&data, &set) {
        println!("{line}");
    }
    Ok(if data.is_empty() { 1 } else { 0 })
}

fn summarize(data: &ReferenceData, set: &ThresholdSet) -> Vec<String> {
    let mut lines = vec![format!(
        "{} sample(s), {} line(s) skipped, {} comparison",
        data.len(),
        data.skipped.len(),
        set.comparison()
    )];
    for (threshold, count) in set.thresholds().iter().zip(set.count_over(&data.samples)) {
        lines.push(format!(
            "above {threshold} ({}): {count}",
            threshold.to_hex()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vigil_bench::parse_reference;
    use vigil_common::Sample;

    #[test]
    fn summary_counts_per_threshold() {
        let data = parse_reference("-5\n0\n150\nbogus\n250\n0xFFFFFFFF\n");
        let set = ThresholdSet::new([100, 200].map(Sample::from_signed));
        let lines = summarize(&data, &set);
        assert_eq!(lines[0], "5 sample(s), 1 line(s) skipped, signed comparison");
        assert_eq!(lines[1], "above 100 (0x00000064): 2");
        assert_eq!(lines[2], "above 200 (0x000000C8): 1");
    }

    #[test]
    fn unsigned_counts_negative_words_high() {
        let data = parse_reference("-1\n1\n");
        let set = ThresholdSet::with_comparison([Sample::from_signed(0)], Comparison::Unsigned);
        assert_eq!(summarize(&data, &set)[1], "above 0 (0x00000000): 2");
    }

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn empty_file_exits_nonzero() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("empty.csv");
        std::fs::write(&file, "\n\n").unwrap();
        let args = CheckArgs {
            file,
            threshold: vec![Sample::from_signed(0)],
            unsigned: false,
        };
        assert_eq!(run(&args, &global()).unwrap(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let args = CheckArgs {
            file: PathBuf::from("/nonexistent/vigil/data.csv"),
            threshold: Vec::new(),
            unsigned: false,
        };
        let err = run(&args, &global()).unwrap_err();
        assert!(err.to_string().contains("data.csv"));
    }
}
