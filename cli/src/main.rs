mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use blocks::scene::{SceneError, SceneParser};
use engine::{Clock, EngineConfig, ManualClock, RunSummary, Stage, SystemClock};

const SUBCOMMANDS: &[&str] = &["run", "test", "help"];

#[derive(Parser)]
#[command(name = "blockstage", version, about = "Headless block-program stage")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scene until every sprite finishes
    Run(RunArgs),

    /// Run .test.toml scene tests
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Scene file (TOML) to load
    file: String,

    /// Parse only, don't run (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the loaded scene
    #[arg(long)]
    dump: bool,

    /// List sprites and their programs
    #[arg(long)]
    list_sprites: bool,

    /// Stop the run after this many milliseconds of stage time
    #[arg(long, default_value_t = 60_000)]
    limit_ms: u64,

    /// Run against the wall clock instead of simulated time
    #[arg(long)]
    realtime: bool,

    /// Don't print the final stage
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or a directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    init_logging();

    // `blockstage scene.toml` is shorthand for `blockstage run scene.toml`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().skip(1).position(|a| !a.starts_with('-')) {
        if !SUBCOMMANDS.contains(&args[pos + 1].as_str()) {
            args.insert(pos + 1, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Run(run_args) => do_run(run_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// Logs go to stderr so stdout carries only the stage report. `RUST_LOG`
/// overrides the default `warn` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn do_run(args: RunArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let scene = match SceneParser::new(source.clone(), file_id).parse() {
        Ok(scene) => scene,
        Err(errors) => {
            emit_diagnostics(&writer, &config, &files, &errors);
            process::exit(1);
        }
    };
    emit_diagnostics(&writer, &config, &files, &scene.warnings);
    debug!(file = %args.file, sprites = scene.sprites.len(), "scene loaded");

    let engine_config = match EngineConfig::from_scene_source(&source, file_id) {
        Ok(c) => c,
        Err(error) => {
            emit_diagnostics(&writer, &config, &files, &[error]);
            process::exit(1);
        }
    };

    if args.check {
        eprintln!("ok: {} loaded successfully", args.file);
        return;
    }

    if args.dump {
        println!("{:#?}", scene);
        return;
    }

    if args.list_sprites {
        for sprite in &scene.sprites {
            println!("{} {} ({})", sprite.costume, sprite.name, sprite.id);
            for line in sprite.program.to_string().lines() {
                println!("  {}", line);
            }
        }
        return;
    }

    if args.realtime {
        let mut stage = Stage::from_scene(SystemClock::new(), engine_config, scene);
        let summary = engine::run_realtime(&mut stage, args.limit_ms);
        if !args.quiet {
            print_report(&stage, &summary);
        }
    } else {
        let mut stage = Stage::from_scene(ManualClock::new(), engine_config, scene);
        let summary = engine::run_until_idle(&mut stage, args.limit_ms);
        if !args.quiet {
            print_report(&stage, &summary);
        }
    }
}

fn print_report<C: Clock>(stage: &Stage<C>, summary: &RunSummary) {
    for sprite in stage.sprites() {
        println!("{}", sprite);
    }
    println!(
        "{} after {} ticks ({} ms, {} swaps)",
        if summary.completed {
            "finished"
        } else {
            "stopped at time limit"
        },
        summary.ticks,
        summary.elapsed,
        summary.swaps
    );
}

fn emit_diagnostics(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    diagnostics: &[SceneError],
) {
    for diag in diagnostics {
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diag.to_diagnostic());
    }
}
