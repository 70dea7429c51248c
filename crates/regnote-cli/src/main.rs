//! regnote - Annotate diagnostic logs with register descriptions
//!
//! This tool extracts ENGIO, ADTG and CMOS register definitions from the
//! firmware source table, merges the hand-maintained override file, and
//! appends a comment to every log line that mentions a known register.

use anyhow::{Context, Result};
use clap::Parser;
use regnote_core::{
    load_source_file, merge_override_file, Annotator, AnnotatorConfig, MergeStats, RegisterMaps,
    DEFAULT_MIN_WIDTH, DEFAULT_OVERRIDE_FILE, DEFAULT_SOURCE_FILE,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, Level};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
This tool looks for ADTG, CMOS and ENGIO registers in a log file, and adds comments
The registers are identified from adtg_gui.c (it parses the source code)
Usage: regnote input.log > output.log";

/// Exit status when no log file is given, matching clap's usage errors
const EXIT_USAGE: i32 = 2;

/// Annotate diagnostic logs with ENGIO, ADTG and CMOS register descriptions
#[derive(Parser, Debug)]
#[command(name = "regnote")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log file to annotate
    log: Option<PathBuf>,

    /// Firmware source holding the register definition table
    #[arg(short, long, default_value = DEFAULT_SOURCE_FILE)]
    source: PathBuf,

    /// Hand-maintained ENGIO descriptions (`0xADDRESS description` per line)
    #[arg(short = 'r', long, default_value = DEFAULT_OVERRIDE_FILE)]
    overrides: PathBuf,

    /// Column the comment block starts at
    #[arg(short, long, default_value_t = DEFAULT_MIN_WIDTH)]
    width: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Counters reported once the log has been written
#[derive(Debug, Default)]
struct RunSummary {
    engio: usize,
    adtg: usize,
    cmos: usize,
    merge: MergeStats,
    lines_read: usize,
    lines_annotated: usize,
}

impl RunSummary {
    fn record_maps(&mut self, maps: &RegisterMaps) {
        self.engio = maps.engio.len();
        self.adtg = maps.adtg.len();
        self.cmos = maps.cmos.len();
    }

    fn print_summary(&self) {
        info!("Registers: {} ENGIO, {} ADTG, {} CMOS", self.engio, self.adtg, self.cmos);
        info!(
            "Overrides: {} inserted, {} concatenated, {} unchanged",
            self.merge.inserted,
            self.merge.concatenated,
            self.merge.unchanged
        );
        info!("Summary: {} lines read, {} annotated", self.lines_read, self.lines_annotated);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let log = match log_path(&cli, &mut io::stderr()) {
        Ok(log) => log,
        Err(status) => std::process::exit(status),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = run(&cli, log, &mut out)?;
    out.flush().context("Failed to write annotated output")?;

    summary.print_summary();
    Ok(())
}

/// Returns the log to annotate, or prints the usage text and returns the
/// exit status when none was given.
fn log_path<'a, W: Write>(cli: &'a Cli, err: &mut W) -> std::result::Result<&'a Path, i32> {
    match cli.log.as_deref() {
        Some(log) => Ok(log),
        None => {
            // Nothing useful to do if stderr itself is gone.
            let _ = writeln!(err, "{}", USAGE);
            Err(EXIT_USAGE)
        }
    }
}

/// Builds the register database, then annotates `log` into `out`.
///
/// All three inputs are opened before the first output line is written.
fn run<W: Write>(cli: &Cli, log: &Path, out: &mut W) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    debug!("Parsing register definitions from {}", cli.source.display());
    let mut maps = load_source_file(&cli.source).with_context(|| {
        format!(
            "Failed to load register definitions: {}",
            cli.source.display()
        )
    })?;

    debug!("Merging overrides from {}", cli.overrides.display());
    summary.merge = merge_override_file(&mut maps, &cli.overrides)
        .with_context(|| format!("Failed to load overrides: {}", cli.overrides.display()))?;
    summary.record_maps(&maps);
    for entry in maps.entries() {
        trace!("{} {:#x}: {}", entry.namespace, entry.address, entry.description);
    }

    let file =
        File::open(log).with_context(|| format!("Failed to read log file: {}", log.display()))?;

    let config = AnnotatorConfig::new().min_width(cli.width);
    let annotator = Annotator::with_config(&maps, config);

    for line in BufReader::new(file).split(b'\n') {
        let raw = line.with_context(|| format!("Failed to read log file: {}", log.display()))?;

        let annotated = annotator
            .write_annotated(out, &raw)
            .context("Failed to write annotated output")?;

        summary.lines_read += 1;
        if annotated {
            summary.lines_annotated += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const SOURCE: &str = r#"
static struct known_reg known_regs[] = {
    {DST_CMOS,      6, 0, "ISO 50 or timing related"},
    {DST_ADTG, 0x8880, 0, "Black level"},
    {0xC0F0,   0x8014, 0, "DARK_LIMIT_14_12"},
};
"#;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(overrides: &str, log: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("adtg_gui.c"), SOURCE).unwrap();
            fs::write(dir.path().join("regs.txt"), overrides).unwrap();
            fs::write(dir.path().join("input.log"), log).unwrap();
            Self { dir }
        }

        fn cli(&self) -> Cli {
            let dir = self.dir.path().display().to_string();
            Cli::try_parse_from([
                "regnote".to_string(),
                format!("{}/input.log", dir),
                "--source".to_string(),
                format!("{}/adtg_gui.c", dir),
                "--overrides".to_string(),
                format!("{}/regs.txt", dir),
            ])
            .unwrap()
        }

        fn run(&self) -> Result<(String, RunSummary)> {
            let cli = self.cli();
            let mut out = Vec::new();
            let log = cli.log.clone().unwrap();
            let summary = run(&cli, &log, &mut out)?;
            Ok((String::from_utf8(out).unwrap(), summary))
        }
    }

    #[test]
    fn test_end_to_end() {
        let log = "boot\r\n...C0F08014...\nADTG:[0x8880] <- 0x7ff\n";
        let fixture = Fixture::new("0xC0F08014 DARK_LIMIT_0xC0F08014\n0xC0F06800 RAW_LINES\n", log);

        let (output, summary) = fixture.run().unwrap();
        let lines: Vec<_> = output.split('\n').collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "boot\r");
        assert_eq!(lines[3], "");
        assert_eq!(
            lines[1],
            format!(
                "{:<80} ; c0f08014: DARK_LIMIT; DARK_LIMIT_14_12",
                "...C0F08014..."
            )
        );
        assert!(lines[2].ends_with(" ; ADTG[8880]: Black level"));

        assert_eq!(summary.lines_read, 3);
        assert_eq!(summary.lines_annotated, 2);
        assert_eq!(summary.engio, 2);
        assert_eq!(summary.merge.inserted, 1);
        assert_eq!(summary.merge.concatenated, 1);
    }

    #[test]
    fn test_crlf_log_without_matches_is_unchanged() {
        let fixture = Fixture::new("", "boot\r\nidle\r\n");

        let (output, summary) = fixture.run().unwrap();

        assert_eq!(output, "boot\r\nidle\r\n");
        assert_eq!(summary.lines_read, 2);
        assert_eq!(summary.lines_annotated, 0);
    }

    #[test]
    fn test_crlf_annotated_line_keeps_crlf() {
        let fixture = Fixture::new("", "C0F08014\r\n");

        let (output, _) = fixture.run().unwrap();

        assert_eq!(
            output,
            format!("{:<80} ; c0f08014: DARK_LIMIT_14_12\r\n", "C0F08014")
        );
    }

    #[test]
    fn test_missing_override_file_is_fatal() {
        let fixture = Fixture::new("", "C0F08014\n");
        fs::remove_file(fixture.dir.path().join("regs.txt")).unwrap();

        let err = fixture.run().unwrap_err();
        assert!(err.to_string().contains("Failed to load overrides"));
    }

    #[test]
    fn test_missing_log_file_is_fatal() {
        let fixture = Fixture::new("", "");
        fs::remove_file(fixture.dir.path().join("input.log")).unwrap();

        let err = fixture.run().unwrap_err();
        assert!(err.to_string().contains("Failed to read log file"));
    }

    #[test]
    fn test_defaults_and_missing_log_argument() {
        let cli = Cli::try_parse_from(["regnote"]).unwrap();
        assert!(cli.log.is_none());
        assert_eq!(cli.source, PathBuf::from("adtg_gui.c"));
        assert_eq!(cli.overrides, PathBuf::from("regs.txt"));
        assert_eq!(cli.width, 80);
    }

    #[test]
    fn test_no_log_prints_usage_and_fails() {
        let cli = Cli::try_parse_from(["regnote"]).unwrap();
        let mut err = Vec::new();

        assert_eq!(log_path(&cli, &mut err), Err(EXIT_USAGE));
        assert_eq!(EXIT_USAGE, 2);

        let message = String::from_utf8(err).unwrap();
        assert!(message.contains("Usage: regnote input.log > output.log"));
    }

    #[test]
    fn test_log_argument_is_returned() {
        let cli = Cli::try_parse_from(["regnote", "input.log"]).unwrap();
        let mut err = Vec::new();

        assert_eq!(log_path(&cli, &mut err), Ok(Path::new("input.log")));
        assert!(err.is_empty());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
