use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, LevelFilter};
use minang_cli::config::Config;
use minang_cli::eval::{EvalOptions, Evaluator, Scoping};
use minang_cli::{logger, repl, StdioSink};
use minang_codegen::{generate, generate_module, generate_with_runtime};
use minang_parse::parse_str;

/// Maximum source file size in bytes (1MB)
const MAX_SOURCE_SIZE: usize = 1_000_000;

#[derive(Parser, Debug)]
#[command(name = "minang")]
#[command(about = "MinangScript: a small scripting language with Minangkabau keywords")]
#[command(version)]
struct Cli {
    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: ~/.minangscript/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a MinangScript program
    Run {
        /// Path to .minang source file
        file: String,

        /// Resolve names in the innermost call frame only
        #[arg(long)]
        lexical_scope: bool,
    },

    /// Transpile a program to JavaScript
    Build {
        /// Path to .minang source file
        input: String,

        /// Path of the JavaScript file to write
        output: String,

        /// Wrap the output in a strict-mode module with this name
        #[arg(long, conflicts_with = "runtime")]
        module: Option<String>,

        /// Prepend the runtime helper library
        #[arg(long)]
        runtime: bool,
    },

    /// Parse a source file and dump the AST
    Parse {
        /// Path to .minang source file
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// Print the token stream of a source file
    Tokens {
        /// Path to .minang source file
        file: String,
    },

    /// Check a source file for lexical and syntax errors
    Check {
        /// Path to .minang source file
        file: String,
    },

    /// Start an interactive session
    Repl,

    /// Create a new project directory with a sample program
    New {
        /// Project directory to create
        project: String,
    },

    /// Show or change the configuration
    Config {
        /// Write the default configuration
        #[arg(long)]
        init: bool,

        /// Set the interface language (en, id, auto)
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum Format {
    Pretty,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::default_path);
    let config = config_path
        .as_deref()
        .map(Config::load)
        .unwrap_or_default();

    let base = std::env::var("MINANG_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or_else(|| config.level_filter());
    logger::init(logger::level_from_verbosity(base, cli.verbose))?;
    debug!(target: "minang::cli", "config: {:?}", config_path);

    let outcome = match cli.command {
        Commands::Run {
            file,
            lexical_scope,
        } => {
            let mut options = config.eval_options();
            if lexical_scope {
                options.scoping = Scoping::Lexical;
            }
            cmd_run(&file, options)
        }

        Commands::Build {
            input,
            output,
            module,
            runtime,
        } => cmd_build(&input, &output, module.as_deref(), runtime),

        Commands::Parse { file, format } => cmd_parse(&file, format),

        Commands::Tokens { file } => cmd_tokens(&file),

        Commands::Check { file } => cmd_check(&file),

        Commands::Repl => cmd_repl(config.eval_options()),

        Commands::New { project } => cmd_new(Path::new(&project)),

        Commands::Config { init, language } => {
            cmd_config(config, config_path.as_deref(), init, language.as_deref())
        }
    };

    if let Err(e) = outcome {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn read_source(path: &str) -> Result<String> {
    let src =
        std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path))?;

    if src.len() > MAX_SOURCE_SIZE {
        return Err(anyhow!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        ));
    }
    Ok(src)
}

fn cmd_run(file: &str, options: EvalOptions) -> Result<()> {
    let src = read_source(file)?;
    let program = parse_str(file, &src)?;
    info!(target: "minang::cli", "running {} ({} statements)", file, program.body.len());
    let mut evaluator = Evaluator::with_sink(StdioSink, options);
    evaluator.execute(&program)?;
    Ok(())
}

fn cmd_build(input: &str, output: &str, module: Option<&str>, runtime: bool) -> Result<()> {
    let src = read_source(input)?;
    let program = parse_str(input, &src)?;

    let js = match module {
        Some(name) => generate_module(&program, name)?,
        None if runtime => generate_with_runtime(&program)?,
        None => generate(&program)? + "\n",
    };

    std::fs::write(output, &js).with_context(|| format!("cannot write '{}'", output))?;
    info!(target: "minang::cli", "wrote {} bytes to {}", js.len(), output);
    println!("Built {} -> {}", input, output);
    Ok(())
}

fn cmd_parse(file: &str, format: Format) -> Result<()> {
    let src = read_source(file)?;
    let program = parse_str(file, &src)?;

    match format {
        Format::Pretty => println!("{:#?}", program),
        Format::Json => println!("{}", serde_json::to_string_pretty(&program)?),
    }
    Ok(())
}

fn cmd_tokens(file: &str) -> Result<()> {
    let src = read_source(file)?;
    for tok in minang_parse::tokenize(&src)? {
        println!("{}", tok);
    }
    Ok(())
}

fn cmd_check(file: &str) -> Result<()> {
    let src = read_source(file)?;
    let program = parse_str(file, &src)?;
    println!("{}: ok ({} statements)", file, program.body.len());
    Ok(())
}

fn cmd_repl(options: EvalOptions) -> Result<()> {
    let mut evaluator = Evaluator::with_sink(StdioSink, options);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    repl::run(stdin.lock(), &mut stdout, &mut evaluator)?;
    Ok(())
}

const SAMPLE_PROGRAM: &str = r#"// Salamat datang di MinangScript!

cetak "Salamat datang ka " + "{project}"

buek namo = "MinangScript"
ambiak versi = "{version}"
tagak filosofi = "Gotong Royong"

karojo sambutan(nama) {
    jadi "Salamat datang, " + nama + "! Mari bergotong royong."
}

cetak sambutan(namo)
"#;

fn cmd_new(dir: &Path) -> Result<()> {
    let main_file = dir.join("main.minang");
    if main_file.exists() {
        return Err(anyhow!("{} already exists", main_file.display()));
    }
    std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let project = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("proyek"));
    let sample = SAMPLE_PROGRAM
        .replace("{project}", &project)
        .replace("{version}", env!("CARGO_PKG_VERSION"));
    std::fs::write(&main_file, sample)?;

    println!("Created project {}", dir.display());
    println!("Run it with: minang run {}", main_file.display());
    Ok(())
}

fn cmd_config(
    mut config: Config,
    path: Option<&Path>,
    init: bool,
    language: Option<&str>,
) -> Result<()> {
    if init {
        config = Config::default();
    }
    if let Some(lang) = language {
        config.set_language(lang)?;
    }
    if init || language.is_some() {
        let path = path.ok_or_else(|| anyhow!("no config path: set HOME or pass --config"))?;
        config.save(path)?;
        println!("Saved {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
