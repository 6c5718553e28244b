use clap::{ArgAction, Args, Parser, Subcommand};
use drmock_build::DrMockConfig;
use drmock_core::Access;
use drmock_driver::{compiler_flags, Driver, GenerateRequest};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drmock-gen")]
#[command(author, version, about = "Generate C++ mock classes for DrMock")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a mock header for a class
    Generate(GenerateArgs),

    /// Print the scanned AST of a header
    Dump {
        /// Header to translate
        input: PathBuf,

        /// Path of the libclang shared library
        #[arg(long)]
        libclang: Option<PathBuf>,

        /// Compiler flags passed to libclang
        #[arg(last = true)]
        flags: Vec<String>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Header declaring the class to mock
    input: PathBuf,

    /// Regex matched against the start of class names
    class: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name of the mock class (default: <Class><mock_suffix>)
    #[arg(long)]
    mock_name: Option<String>,

    /// Access specifiers to mock, comma separated (default: public)
    #[arg(long, value_delimiter = ',')]
    access: Vec<Access>,

    /// Configuration file (default: drmock.toml next to the input or above)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path of the libclang shared library
    #[arg(long)]
    libclang: Option<PathBuf>,

    /// Compiler flags passed to libclang
    #[arg(last = true)]
    flags: Vec<String>,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate(args) => generate(args)?,

        Commands::Dump {
            input,
            libclang,
            flags,
        } => {
            let driver = match libclang {
                Some(path) => Driver::with_library(path)?,
                None => Driver::new()?,
            };
            let ast = driver.translate_file(&input, &flags)?;
            print!("{}", ast.translation_unit.dump());
        }
    }

    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), &args.input)?;

    let mut request = GenerateRequest::from_config(args.class, &config)?;
    if let Some(name) = args.mock_name {
        request = request.with_mock_name(name);
    }
    if !args.access.is_empty() {
        request = request.with_access(args.access);
    }
    let mut flags = compiler_flags(&config.compiler, &args.input)?;
    flags.extend(args.flags);
    request = request.with_flags(flags);

    let driver = match args.libclang {
        Some(path) => Driver::with_library(path)?,
        None => Driver::from_config(&config.compiler)?,
    };
    let mock = driver.generate_file(&args.input, &request)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &mock.header)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            info!(mock = %mock.mock_name, path = %path.display(), "wrote mock header");
        }
        None => print!("{}", mock.header),
    }
    Ok(())
}

/// The explicit config file, else a discovered `drmock.toml`, else defaults.
fn load_config(explicit: Option<&Path>, input: &Path) -> Result<DrMockConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let input = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());
            input.parent().and_then(DrMockConfig::discover)
        }
    };
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Ok(DrMockConfig::from_file(&path)?)
        }
        None => Ok(DrMockConfig::default()),
    }
}

/// Filter from `DRMOCK_LOG`, then `RUST_LOG`, else from the verbosity flag.
fn init_tracing(verbose: u8) {
    let filter = match std::env::var("DRMOCK_LOG").or_else(|_| std::env::var("RUST_LOG")) {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "drmock-gen",
            "generate",
            "Foo.h",
            "Foo$",
            "-o",
            "FooMock.h",
            "--access",
            "public,protected",
            "-v",
            "--",
            "-std=c++17",
            "-Iinclude",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Generate(args) = cli.command else {
            panic!("Expected generate");
        };
        assert_eq!(args.input, PathBuf::from("Foo.h"));
        assert_eq!(args.class, "Foo$");
        assert_eq!(args.output, Some(PathBuf::from("FooMock.h")));
        assert_eq!(args.access, vec![Access::Public, Access::Protected]);
        assert_eq!(args.flags, vec!["-std=c++17", "-Iinclude"]);
    }

    #[test]
    fn test_parse_rejects_unknown_access() {
        let parsed = Cli::try_parse_from([
            "drmock-gen",
            "generate",
            "Foo.h",
            "Foo",
            "--access",
            "friend",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_load_config() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let input = dir.join("Foo.h");
        std::fs::write(&input, "").unwrap();
        std::fs::write(dir.join("drmock.toml"), "[generator]\nmock_suffix = \"Fake\"\n").unwrap();

        let config = load_config(None, &input).unwrap();
        assert_eq!(config.generator.mock_suffix, "Fake");

        let explicit = dir.join("other.toml");
        std::fs::write(&explicit, "").unwrap();
        let config = load_config(Some(&explicit), &input).unwrap();
        assert_eq!(config.generator.mock_suffix, "Mock");
    }
}
