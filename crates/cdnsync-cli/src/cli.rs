//! CLI argument parsing using clap.

use cdnsync_core::UpdateConfig;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cdnsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate library metadata and file maps
    Check(CheckArgs),
    /// Test whether paths stay inside a root directory
    Contains(ContainsArgs),
    /// Import one downloaded tarball into the catalog
    Import(ImportArgs),
    /// Import new versions of catalog libraries from a mirror
    Update(UpdateArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Library metadata files to check
    #[arg(value_name = "PACKAGE_JSON", required = true)]
    pub packages: Vec<PathBuf>,
}

#[derive(clap::Args)]
pub struct ContainsArgs {
    /// Absolute directory the candidates must stay inside
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Paths to test; relative paths are resolved against ROOT
    #[arg(value_name = "CANDIDATE")]
    pub candidates: Vec<String>,
}

/// Options shared by the commands that import files.
#[derive(clap::Args)]
pub struct ImportOptions {
    /// Scratch directory for unpacked tarballs
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Skip source files whose path contains PATTERN (can be repeated)
    #[arg(long = "skip", value_name = "PATTERN")]
    pub skip: Vec<String>,

    /// Only check paths lexically, without resolving symlinks on disk
    #[arg(long)]
    pub no_canonicalize: bool,

    /// Ignore the npmFileMap shipped inside the package
    #[arg(long)]
    pub ignore_packaged_map: bool,
}

impl ImportOptions {
    /// Applies the flags on top of `config`.
    pub fn apply(&self, config: &mut UpdateConfig) {
        if let Some(temp_dir) = &self.temp_dir {
            config.temp_dir.clone_from(temp_dir);
        }
        config.skip_patterns.extend(self.skip.iter().cloned());
        config.canonicalize = !self.no_canonicalize;
        config.prefer_packaged_file_map = !self.ignore_packaged_map;
    }
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// Path to the downloaded .tgz
    #[arg(value_name = "TARBALL")]
    pub tarball: PathBuf,

    /// The library's package.json in the catalog
    #[arg(short, long, value_name = "PACKAGE_JSON")]
    pub package: PathBuf,

    /// Version being imported
    #[arg(long = "version", value_name = "VERSION")]
    pub release: String,

    /// Catalog directory (default: two levels above PACKAGE_JSON)
    #[arg(long, value_name = "DIR")]
    pub libs_dir: Option<PathBuf>,

    #[command(flatten)]
    pub options: ImportOptions,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    /// Glob over library directory names
    #[arg(value_name = "PATTERN", default_value = "*")]
    pub pattern: String,

    /// Local npm mirror laid out as <npmName>/<version>.tgz
    #[arg(short, long, value_name = "DIR")]
    pub mirror: PathBuf,

    /// Catalog directory
    #[arg(long, value_name = "DIR", default_value = "ajax/libs")]
    pub libs_dir: PathBuf,

    /// Number of libraries updated in parallel
    #[arg(long, value_name = "N", default_value = "4")]
    pub jobs: usize,

    #[command(flatten)]
    pub options: ImportOptions,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
