// Command-line front end for bindelta.
//
// Subcommands map one-to-one onto the library: `diff` computes a delta
// document, `patch` applies one, `inspect` lists its commands and
// `config` prints the effective defaults.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::delta::apply;
use crate::delta::format::{DeltaDocument, FORMAT_VERSION};
use crate::engine;
use crate::hash::config::{
    self, DeltaConfig, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, MIN_MATCH, MatchBackend,
};
use crate::io as files;

const DEFAULT_LEVEL: u32 = 1;
const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Binary delta tool: block matching refined by suffix-array search.
#[derive(Parser, Debug)]
#[command(
    name = "bindelta",
    version,
    about = "Binary delta (diff/patch) tool",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compute a delta turning BASE into TARGET.
    Diff(DiffArgs),
    /// Rebuild a target from BASE and a delta document.
    Patch(PatchArgs),
    /// List the commands of a delta document.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    SuffixArray,
    SuffixAutomaton,
}

impl From<BackendArg> for MatchBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::SuffixArray => MatchBackend::SuffixArray,
            BackendArg::SuffixAutomaton => MatchBackend::SuffixAutomaton,
        }
    }
}

#[derive(Args, Debug)]
struct DiffTuningArgs {
    /// Delta level (0 = block matching only, 1 = with refinement).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(0..=1), default_value_t = DEFAULT_LEVEL)]
    level: u32,

    /// Fixed block size (supports K/M/G suffix; default depends on base size).
    #[arg(long = "block-size", value_parser = parse_byte_size)]
    block_size: Option<u64>,

    /// Refinement matches must be longer than this many bytes.
    #[arg(long = "min-match", default_value_t = MIN_MATCH)]
    min_match: usize,

    /// Longest-match structure used for refinement.
    #[arg(long, value_enum, default_value_t = BackendArg::SuffixArray)]
    backend: BackendArg,

    /// Index base blocks on a single thread.
    #[arg(long = "no-parallel")]
    no_parallel: bool,
}

impl DiffTuningArgs {
    fn to_config(&self) -> Result<DeltaConfig, String> {
        let block_size = match self.block_size {
            Some(0) => return Err("block size must be non-zero".into()),
            Some(size) => Some(
                usize::try_from(size).map_err(|_| format!("block size {size} is too large"))?,
            ),
            None => None,
        };
        Ok(DeltaConfig {
            block_size,
            min_match: self.min_match,
            parallel_index: !self.no_parallel,
            backend: self.backend.into(),
            ..config::config_for_level(self.level)
        })
    }
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Base file the delta copies from.
    #[arg(long, short = 'b', value_hint = ValueHint::FilePath)]
    base: PathBuf,

    /// Target file the delta rebuilds.
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,

    /// Delta output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    delta: Option<PathBuf>,

    #[command(flatten)]
    tuning: DiffTuningArgs,
}

#[derive(Args, Debug)]
struct PatchArgs {
    /// Base file the delta was computed against.
    #[arg(long, short = 'b', value_hint = ValueHint::FilePath)]
    base: PathBuf,

    /// Delta document.
    #[arg(value_hint = ValueHint::FilePath)]
    delta: PathBuf,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Delta document.
    #[arg(value_hint = ValueHint::FilePath)]
    delta: PathBuf,
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Copy)]
struct Globals {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

impl Globals {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            force: cli.force,
            quiet: cli.quiet,
            verbose: cli.verbose.min(2),
            json_output: cli.json_output,
        }
    }

    fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            _ => "debug",
        }
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("bindelta".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let globals = Globals::from_cli(&cli);
        let _ = globals.log_filter();
        if let Cmd::Diff(args) = &cli.command {
            let _ = args.tuning.to_config();
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn refuse_overwrite(path: &Path, globals: Globals) -> bool {
    if path.exists() && !globals.force {
        eprintln!(
            "bindelta: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return true;
    }
    false
}

fn print_json(value: &serde_json::Value) {
    eprintln!("{value:#}");
}

fn write_listing<W: Write>(out: &mut W, doc: &DeltaDocument) -> io::Result<()> {
    writeln!(out, "VERSION:       {}", doc.version)?;
    writeln!(out, "BASE LENGTH:   {}", doc.base_len)?;
    writeln!(out, "TARGET LENGTH: {}", doc.target_len)?;
    writeln!(out, "COMMANDS:      {}", doc.delta().len())?;
    let mut target_pos = 0u64;
    for (i, cmd) in doc.delta().iter().enumerate() {
        writeln!(out, "  {i:6}  {target_pos:10}  {cmd}")?;
        target_pos += u64::from(cmd.len());
    }
    out.flush()
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    let defaults = DeltaConfig::default();
    eprintln!("bindelta version {version}");

    let adler32 = cfg!(feature = "adler32") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("ADLER32_SIMD={adler32}");
    eprintln!("PARALLEL_INDEX={parallel}");
    eprintln!("FORMAT_VERSION={FORMAT_VERSION}");
    eprintln!("DEFAULT_LEVEL={DEFAULT_LEVEL}");
    eprintln!("DEFAULT_PROFILE={}", defaults.name);
    eprintln!("DEFAULT_BACKEND={}", defaults.backend.name());
    eprintln!("MIN_MATCH={MIN_MATCH}");
    eprintln!("MIN_BLOCK_SIZE={MIN_BLOCK_SIZE}");
    eprintln!("MAX_BLOCK_SIZE={MAX_BLOCK_SIZE}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Diff command
// ---------------------------------------------------------------------------

fn cmd_diff(args: &DiffArgs, globals: Globals) -> i32 {
    let config = match args.tuning.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("bindelta: {e}");
            return 1;
        }
    };

    let Some(delta_path) = &args.delta else {
        return diff_to_stdout(args, &config, globals);
    };
    if refuse_overwrite(delta_path, globals) {
        return 1;
    }

    let stats = match files::diff_files(&args.base, &args.target, delta_path, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bindelta: diff error: {e}");
            return 1;
        }
    };

    if globals.verbose > 0 && !globals.quiet {
        eprintln!(
            "bindelta: diff: base size: {}, target size: {}, delta size: {}, commands: {}",
            stats.base_size, stats.target_size, stats.delta_size, stats.delta.commands
        );
    }
    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "diff",
            "profile": config.name,
            "backend": config.backend.name(),
            "base_size": stats.base_size,
            "target_size": stats.target_size,
            "delta_size": stats.delta_size,
            "base_sha256": hex::encode(stats.base_sha256),
            "target_sha256": hex::encode(stats.target_sha256),
            "stats": stats.delta,
        }));
    }
    0
}

fn diff_to_stdout(args: &DiffArgs, config: &DeltaConfig, globals: Globals) -> i32 {
    let (base, target) = match (
        files::load_diff_input(&args.base),
        files::load_diff_input(&args.target),
    ) {
        (Ok(b), Ok(t)) => (b, t),
        (Err(e @ files::IoError::InputTooLarge { .. }), _)
        | (_, Err(e @ files::IoError::InputTooLarge { .. })) => {
            eprintln!("bindelta: {e}");
            return 1;
        }
        (Err(e), _) => {
            eprintln!("bindelta: base file: {}: {e}", args.base.display());
            return 1;
        }
        (_, Err(e)) => {
            eprintln!("bindelta: target file: {}: {e}", args.target.display());
            return 1;
        }
    };

    let (delta, stats) = engine::calculate_delta_with_stats(&base, &target, config);
    let doc = DeltaDocument::new(base.len() as u64, delta);
    let writer = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
    if let Err(e) = doc.write_to(writer) {
        eprintln!("bindelta: write error: {e}");
        return 1;
    }

    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "diff",
            "profile": config.name,
            "backend": config.backend.name(),
            "stats": stats,
        }));
    }
    0
}

// ---------------------------------------------------------------------------
// Patch command
// ---------------------------------------------------------------------------

fn cmd_patch(args: &PatchArgs, globals: Globals) -> i32 {
    let Some(output_path) = &args.output else {
        return patch_to_stdout(args, globals);
    };
    if refuse_overwrite(output_path, globals) {
        return 1;
    }

    let stats = match files::patch_file(&args.base, &args.delta, output_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bindelta: patch error: {e}");
            return 1;
        }
    };

    if globals.verbose > 0 && !globals.quiet {
        eprintln!(
            "bindelta: patch: output size: {}, commands: {}",
            stats.output_size, stats.commands
        );
    }
    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "patch",
            "base_size": stats.base_size,
            "delta_size": stats.delta_size,
            "output_size": stats.output_size,
            "commands": stats.commands,
            "output_sha256": hex::encode(stats.output_sha256),
        }));
    }
    0
}

fn patch_to_stdout(args: &PatchArgs, globals: Globals) -> i32 {
    let base = match files::load_binary_file(&args.base) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("bindelta: base file: {}: {e}", args.base.display());
            return 1;
        }
    };
    let doc = match files::load_delta(&args.delta) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("bindelta: delta file: {}: {e}", args.delta.display());
            return 1;
        }
    };

    let output = match apply::apply_delta(&base, doc.delta().commands()) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("bindelta: patch error: {e}");
            return 1;
        }
    };
    if let Err(e) = doc.verify_output(&output) {
        eprintln!("bindelta: patch error: {e}");
        return 1;
    }

    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(&output).and_then(|()| stdout.flush()) {
        eprintln!("bindelta: write error: {e}");
        return 1;
    }

    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "patch",
            "output_size": output.len(),
            "commands": doc.delta().len(),
        }));
    }
    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(args: &InspectArgs, globals: Globals) -> i32 {
    let doc = match files::load_delta(&args.delta) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("bindelta: delta file: {}: {e}", args.delta.display());
            return 1;
        }
    };
    let delta = doc.delta();

    if !globals.quiet {
        let mut out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
        if let Err(e) = write_listing(&mut out, &doc) {
            eprintln!("bindelta: write error: {e}");
            return 1;
        }
    }

    if globals.json_output {
        print_json(&serde_json::json!({
            "command": "inspect",
            "version": doc.version,
            "base_len": doc.base_len,
            "target_len": doc.target_len,
            "commands": delta.len(),
            "copy_commands": delta.iter().filter(|c| c.is_copy()).count(),
            "literal_commands": delta.iter().filter(|c| c.is_literal()).count(),
            "copy_bytes": delta.copy_bytes(),
            "literal_bytes": delta.literal_bytes(),
            "canonical": delta.is_canonical(),
        }));
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let globals = Globals::from_cli(&cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(globals.log_filter()))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match &cli.command {
        Cmd::Diff(args) => cmd_diff(args, globals),
        Cmd::Patch(args) => cmd_patch(args, globals),
        Cmd::Inspect(args) => cmd_inspect(args, globals),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let argv: Vec<String> = std::iter::once("bindelta".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        Cli::try_parse_from(argv).expect("cli parse failed")
    }

    #[test]
    fn parse_byte_size_suffixes() {
        assert_eq!(parse_byte_size("1").unwrap(), 1);
        assert_eq!(parse_byte_size("2K").unwrap(), 2 * 1024);
        assert_eq!(parse_byte_size("3m").unwrap(), 3 * 1024 * 1024);
        assert_eq!(parse_byte_size("4G").unwrap(), 4 * 1024 * 1024 * 1024);
        assert!(parse_byte_size("").is_err());
        assert!(parse_byte_size("12x").is_err());
    }

    #[test]
    fn diff_subcommand_maps_to_config() {
        let cli = parse(&[
            "diff",
            "--base",
            "base.bin",
            "--block-size",
            "2K",
            "--min-match",
            "8",
            "--backend",
            "suffix-automaton",
            "--no-parallel",
            "target.bin",
            "out.json",
        ]);
        let Cmd::Diff(args) = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(args.base, PathBuf::from("base.bin"));
        assert_eq!(args.target, PathBuf::from("target.bin"));
        assert_eq!(args.delta, Some(PathBuf::from("out.json")));

        let config = args.tuning.to_config().unwrap();
        assert_eq!(config.block_size, Some(2048));
        assert_eq!(config.min_match, 8);
        assert_eq!(config.backend, MatchBackend::SuffixAutomaton);
        assert!(!config.parallel_index);
        assert!(config.refine);
    }

    #[test]
    fn level_zero_disables_refinement() {
        let cli = parse(&["diff", "-b", "b", "-l", "0", "t"]);
        let Cmd::Diff(args) = cli.command else {
            panic!("expected diff");
        };
        assert!(args.delta.is_none());
        let config = args.tuning.to_config().unwrap();
        assert!(!config.refine);
        assert_eq!(config.name, "fast");
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let cli = parse(&["diff", "-b", "b", "--block-size", "0", "t"]);
        let Cmd::Diff(args) = cli.command else {
            panic!("expected diff");
        };
        assert!(args.tuning.to_config().is_err());
    }

    #[test]
    fn patch_subcommand_maps() {
        let cli = parse(&["--force", "patch", "--base", "b", "d.json", "out.bin"]);
        assert!(cli.force);
        let Cmd::Patch(args) = cli.command else {
            panic!("expected patch");
        };
        assert_eq!(args.base, PathBuf::from("b"));
        assert_eq!(args.delta, PathBuf::from("d.json"));
        assert_eq!(args.output, Some(PathBuf::from("out.bin")));
    }

    #[test]
    fn verbosity_sets_log_filter() {
        assert_eq!(Globals::from_cli(&parse(&["config"])).log_filter(), "warn");
        assert_eq!(Globals::from_cli(&parse(&["-v", "config"])).log_filter(), "info");
        let loud = Globals::from_cli(&parse(&["-v", "-v", "-v", "config"]));
        assert_eq!(loud.verbose, 2);
        assert_eq!(loud.log_filter(), "debug");
        assert_eq!(Globals::from_cli(&parse(&["-q", "config"])).log_filter(), "error");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let argv = ["bindelta", "-q", "-v", "config"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn inspect_and_config_parse() {
        assert!(matches!(parse(&["inspect", "d.json"]).command, Cmd::Inspect(_)));
        assert!(matches!(parse(&["--json", "config"]).command, Cmd::Config));
    }

    #[test]
    fn listing_shows_target_positions() {
        let delta = crate::delta::Delta::from_commands(vec![
            crate::delta::Command::copy(0, 3),
            crate::delta::Command::literal(b"xy".to_vec()),
            crate::delta::Command::copy(3, 4),
        ]);
        let doc = DeltaDocument::new(7, delta);
        let mut out = Vec::new();
        write_listing(&mut out, &doc).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("TARGET LENGTH: 9"));
        assert!(text.contains("COMMANDS:      3"));
        assert!(text.contains("         5  COPY offset=3 length=4"));
        assert!(text.contains("LITERAL length=2 data=[2 bytes]"));
    }

    #[test]
    fn fuzz_entry_tolerates_garbage() {
        fuzz_try_parse_args(&["diff".into(), "--block-size".into(), "zz".into()]);
        fuzz_try_parse_args(&[]);
    }
}
