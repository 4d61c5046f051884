//! Shear - CLI entry point
//!
//! Splits one delimited file, or every file in a directory, into
//! size-capped parts. Progress goes to stderr; the `--json` flag prints the
//! machine-readable report on stdout.

mod data;
mod error;
mod estimate;
mod partition;
mod serializer;
mod split;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use data::human_bytes;
use split::{split_to_max_size, SplitOptions, SplitReport};

/// Shear - split oversized delimited datasets into size-capped parts
#[derive(FromArgs)]
struct Args {
    /// path to the input file, or a directory to process in batch
    #[argh(positional)]
    input: String,

    /// max size per output file in MB (default: 5)
    #[argh(option, short = 'm', default = "5")]
    max_mb: u64,

    /// rows sampled to estimate bytes per row (default: 5000)
    #[argh(option, default = "5000")]
    sample_rows: usize,

    /// output directory (default: {input_stem}_split next to the input)
    #[argh(option, short = 'o')]
    output_dir: Option<String>,

    /// base name for output parts (default: input file stem)
    #[argh(option)]
    base_name: Option<String>,

    /// field delimiter, a single ASCII character (default: ';')
    #[argh(option, short = 'd', default = "String::from(\";\")")]
    delimiter: String,

    /// print the report as JSON on stdout
    #[argh(switch)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();

    if args.max_mb == 0 {
        bail!("--max-mb must be at least 1");
    }
    let delimiter = parse_delimiter(&args.delimiter)?;

    let mut options = SplitOptions::default()
        .max_mb(args.max_mb)
        .sample_rows(args.sample_rows)
        .delimiter(delimiter);
    if let Some(ref dir) = args.output_dir {
        options = options.output_dir(dir);
    }
    if let Some(ref name) = args.base_name {
        options = options.base_name(name.clone());
    }

    let input = Path::new(&args.input);
    let reports = if input.is_dir() {
        run_batch(input, &options)?
    } else {
        let report = run_single(input, &options)?;
        vec![(input.to_path_buf(), report)]
    };

    if args.json {
        let all: Vec<&SplitReport> = reports.iter().map(|(_, r)| r).collect();
        if all.len() == 1 {
            println!("{}", serde_json::to_string_pretty(all[0])?);
        } else {
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    Ok(())
}

/// Split one file and print a human summary on stderr.
fn run_single(input: &Path, options: &SplitOptions) -> Result<SplitReport> {
    eprintln!("📂 Splitting {}...", input.display());
    let report = split_to_max_size(input, options)
        .with_context(|| format!("Failed to split {}", input.display()))?;

    if report.parts.is_empty() {
        eprintln!("✓ {} has no data rows; nothing written", input.display());
        return Ok(report);
    }

    eprintln!(
        "✓ {} rows into {} parts (cap {})",
        report.total_rows,
        report.parts.len(),
        human_bytes(options.max_mb * 1024 * 1024),
    );
    for part in &report.parts {
        if part.oversized {
            eprintln!(
                "  ⚠ {} — {} rows, {} (single row over the cap)",
                part.path.display(),
                part.rows,
                human_bytes(part.bytes),
            );
        } else {
            eprintln!(
                "    {} — {} rows, {}",
                part.path.display(),
                part.rows,
                human_bytes(part.bytes),
            );
        }
    }

    Ok(report)
}

/// Split every regular file in `dir`, in name order, into one shared output
/// directory (default: a `{dir_name}_split` sibling).
fn run_batch(dir: &Path, options: &SplitOptions) -> Result<Vec<(PathBuf, SplitReport)>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("No files found in {}", dir.display());
    }

    let output_dir = match &options.output_dir {
        Some(d) => d.clone(),
        None => {
            let name = dir
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "batch".to_string());
            dir.parent()
                .unwrap_or_else(|| Path::new(""))
                .join(format!("{name}_split"))
        }
    };

    eprintln!(
        "📂 Batch: {} files from {} into {}",
        files.len(),
        dir.display(),
        output_dir.display()
    );

    let mut reports = Vec::new();
    for file in files {
        // A forced base name gets the file stem appended per input;
        // identical part paths across inputs would overwrite each other in
        // the shared output directory.
        let mut file_options = options.clone().output_dir(output_dir.clone());
        if let Some(base) = &options.base_name {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            file_options = file_options.base_name(format!("{base}_{stem}"));
        }
        let report = run_single(&file, &file_options)?;
        reports.push((file, report));
    }

    eprintln!("✅ Batch complete ({} files)", reports.len());
    Ok(reports)
}

fn parse_delimiter(s: &str) -> Result<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        bail!("delimiter must be a single ASCII character, got {s:?}");
    }
    Ok(bytes[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn test_batch_forced_base_name_keeps_inputs_apart() {
        let dir = tempfile::TempDir::new().unwrap();
        let inputs = dir.path().join("in");
        std::fs::create_dir(&inputs).unwrap();
        std::fs::write(inputs.join("a.csv"), "h\nalpha\n").unwrap();
        std::fs::write(inputs.join("b.csv"), "h\nbeta\n").unwrap();

        let options = SplitOptions::default()
            .output_dir(dir.path().join("out"))
            .base_name("export");
        let reports = run_batch(&inputs, &options).unwrap();

        assert_eq!(reports.len(), 2);
        let paths: Vec<PathBuf> = reports.iter().flat_map(|(_, r)| r.paths()).collect();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("export_a_part_001.csv"));
        assert!(paths[1].ends_with("export_b_part_001.csv"));

        // Both inputs' rows survive in their own parts.
        let a = std::fs::read_to_string(&paths[0]).unwrap();
        let b = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(a.contains("alpha"));
        assert!(b.contains("beta"));
    }
}
