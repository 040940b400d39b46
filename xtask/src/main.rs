use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tileworld")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy and the test suite
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, including the redis backend
    Clippy,
    /// Run all tests against the in-memory store
    Test,
    /// Run the store and kernel tests against a live Redis server
    TestRedis {
        /// Server to test against
        #[arg(long, env = "TILEWORLD_REDIS_URL", default_value = DEFAULT_REDIS_URL)]
        url: String,
    },
    /// Run the region and object query benchmarks
    Bench,
    /// Build rustdoc for the workspace
    Doc,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::TestRedis { url } => run_redis_tests(&url)?,
        Commands::Bench => run_bench()?,
        Commands::Doc => cargo("doc", &["doc", "--workspace", "--no-deps"], &[])?,
    }

    Ok(())
}

/// Run `cargo <args>` with extra environment, failing on a non-zero exit.
fn cargo(step: &str, args: &[&str], envs: &[(&str, &str)]) -> Result<()> {
    println!("==> Running cargo {step}");
    let status = Command::new("cargo")
        .args(args)
        .envs(envs.iter().copied())
        .status()?;
    if !status.success() {
        anyhow::bail!("cargo {step} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("fmt", &["fmt", "--all", "--", "--check"], &[])
}

fn run_clippy() -> Result<()> {
    cargo(
        "clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--features",
            "tileworld-store/redis",
            "--",
            "-D",
            "warnings",
        ],
        &[],
    )
}

fn run_tests() -> Result<()> {
    cargo("test", &["test", "--workspace"], &[])
}

fn run_redis_tests(url: &str) -> Result<()> {
    cargo(
        "test (redis)",
        &[
            "test",
            "-p",
            "tileworld-store",
            "--features",
            "redis",
            "--",
            "--include-ignored",
        ],
        &[("TILEWORLD_REDIS_URL", url)],
    )
}

fn run_bench() -> Result<()> {
    cargo(
        "bench",
        &["bench", "-p", "tileworld-regions", "-p", "tileworld-kernel"],
        &[],
    )
}
