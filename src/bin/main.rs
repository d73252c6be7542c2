use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use abistub::classfile::defs::access_flags::ACC_STATIC;
use abistub::{read_class, stub_class_with_config, stub_tree, Config, MethodBodyStyle};

#[derive(Parser)]
#[command(name = "abistub")]
#[command(about = "Derive ABI stubs from compiled JVM classes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stub a .class file or every .class file under a directory
    Stub {
        /// Input .class file or directory
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file or directory (default: `<INPUT>.stub`)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Also stub anonymous and local classes when walking a directory
        #[arg(long)]
        keep_anonymous: bool,

        /// Emit methods without a Code attribute
        #[arg(long)]
        omit_bodies: bool,

        /// Skip the structural verifier
        #[arg(long)]
        no_verify: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the retained structure of a .class file
    Dump {
        /// Input .class file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Stub { verbose: true, .. });
    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match &cli.command {
        Commands::Stub { input, output, keep_anonymous, omit_bodies, no_verify, .. } => {
            let config = Config {
                method_bodies: if *omit_bodies { MethodBodyStyle::Omit } else { MethodBodyStyle::ThrowNull },
                verify: !*no_verify,
                skip_anonymous_and_local: !*keep_anonymous,
            };
            stub_path(input, output.as_deref(), &config)?;
        }
        Commands::Dump { input } => {
            dump_file(input)?;
        }
    }

    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".stub");
    PathBuf::from(name)
}

fn stub_path(input: &Path, output: Option<&Path>, config: &Config) -> Result<()> {
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));
    if input.is_dir() {
        let summary = stub_tree(input, &output, config)
            .with_context(|| format!("failed to stub {}", input.display()))?;
        println!("{} stubs written to {} ({} skipped)", summary.written, output.display(), summary.skipped);
        return Ok(());
    }

    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let stub = stub_class_with_config(&bytes, config).with_context(|| format!("failed to stub {}", input.display()))?;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output, stub).with_context(|| format!("failed to write {}", output.display()))?;
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}

fn dump_file(input: &Path) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let class = read_class(&bytes).with_context(|| format!("failed to read class {}", input.display()))?;

    let version = class.version();
    println!("class {} (version {}.{}, access 0x{:04x})", class.name(), version.major, version.minor, class.access());
    if let Some(super_name) = class.super_name() {
        println!("  extends {}", super_name);
    }
    for interface in class.interfaces() {
        println!("  implements {}", interface);
    }
    if let Some(outer) = class.outer_class() {
        match (&outer.method_name, &outer.method_descriptor) {
            (Some(name), Some(descriptor)) => println!("  enclosed in {}.{}{}", outer.owner, name, descriptor),
            _ => println!("  enclosed in {}", outer.owner),
        }
    }
    for inner in class.inner_classes() {
        println!(
            "  inner {} outer={} simple={} access 0x{:04x}",
            inner.name,
            inner.outer_name.as_deref().unwrap_or("-"),
            inner.inner_name.as_deref().unwrap_or("-"),
            inner.access
        );
    }
    for annotation in class.annotations() {
        println!("  @{}", annotation.descriptor());
    }
    for field in class.fields() {
        println!("  field {} {} (access 0x{:04x})", field.name, field.descriptor, field.access);
    }
    for method in class.methods() {
        let kind = if method.access & ACC_STATIC != 0 { "static method" } else { "method" };
        println!("  {} {}{} (access 0x{:04x})", kind, method.name, method.descriptor, method.access);
    }
    if class.is_anonymous_or_local() {
        println!("  (anonymous or local)");
    }
    Ok(())
}
