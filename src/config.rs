use std::env;
use std::path::PathBuf;

pub const DEFAULT_ARCHIVE_DIR: &str = "archive";
pub const DEFAULT_OUTPUT_DIR: &str = "clean";
pub const DEFAULT_SAMPLE_PAIRS: usize = 10;
const MAX_SAMPLE_PAIRS: usize = 100;

pub const USAGE: &str = "valuation_prep\n\n\
USAGE:\n  valuation_prep [--archive DIR] [--out DIR] [--sample-pairs N]\n\n\
OPTIONS:\n  \
--archive DIR       input CSV directory (env: CLEAN_ARCHIVE_DIR, default archive)\n  \
--out DIR           output CSV directory (env: CLEAN_OUTPUT_DIR, default clean)\n  \
--sample-pairs N    mismatched name pairs to print, 0-100 (env: CLEAN_SAMPLE_PAIRS, default 10)\n  \
-h, --help          print this help\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub archive_dir: PathBuf,
    pub output_dir: PathBuf,
    pub sample_pairs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_dir: PathBuf::from(DEFAULT_ARCHIVE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            sample_pairs: DEFAULT_SAMPLE_PAIRS,
        }
    }
}

impl Config {
    /// Arguments win over environment variables, which win over defaults.
    /// `args` excludes the program name.
    pub fn from_env_and_args(args: &[String]) -> Self {
        Self::resolve(args, |key| env::var(key).ok())
    }

    pub fn resolve(args: &[String], lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let archive_dir = arg_value(args, "--archive")
            .or_else(|| opt("CLEAN_ARCHIVE_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_DIR));
        let output_dir = arg_value(args, "--out")
            .or_else(|| opt("CLEAN_OUTPUT_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let sample_pairs = arg_value(args, "--sample-pairs")
            .or_else(|| opt("CLEAN_SAMPLE_PAIRS"))
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_SAMPLE_PAIRS)
            .min(MAX_SAMPLE_PAIRS);

        Self {
            archive_dir,
            output_dir,
            sample_pairs,
        }
    }
}

pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "--help" || arg == "-h")
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
