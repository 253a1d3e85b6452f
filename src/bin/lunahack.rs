//! lunahack CLI binary

use clap::Parser;
use console::style;
use lunahack::{FailurePolicy, LunaError, SessionOptions, exit_codes::*, run_session};
use std::{panic, path::PathBuf, process};

const VERSION: &str = lunahack::version::VERSION;

#[derive(Parser, Debug)]
#[command(
    version = VERSION,
    about = "Unpack a 3DS cartridge image, hand it to an external editor, and repack it"
)]
struct Args {
    /// Image to process (defaults to scanning the working directory)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Fail the pipeline on the first packer error instead of the
    /// legacy fire-and-forget behavior
    #[arg(long)]
    strict: bool,

    /// Remove the extraction tree at session end instead of keeping
    /// it as a cache for future sessions
    #[arg(long)]
    no_cache: bool,

    /// Keep the working tree at session end
    #[arg(long)]
    keep_working: bool,

    /// Packer binary (default: 3dstool)
    #[arg(long)]
    packer: Option<String>,

    /// Editor binary (default: pk3DS)
    #[arg(long)]
    editor: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    // Set up panic handler to return specific exit code
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        process::exit(EXIT_PANIC);
    }));

    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    let args = Args::parse();

    lunahack::logger::init(args.log_level.as_deref());

    println!(
        "{} {}",
        style("lunahack").cyan().bold(),
        lunahack::version::full_version()
    );

    let options = SessionOptions {
        image: args.image,
        policy: if args.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Permissive
        },
        packer: args.packer,
        editor: args.editor,
        no_cache: args.no_cache,
        keep_working: args.keep_working,
    };

    match run_session(options) {
        Ok(output) => {
            println!(
                "{} modded ROM written to '{}'",
                style("Done:").green().bold(),
                output.display()
            );
            EXIT_SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", style("Error:").red().bold());
            match err {
                LunaError::NoImages => EXIT_NO_IMAGES,
                LunaError::Aborted => EXIT_ABORTED,
                LunaError::Tool { .. } => EXIT_TOOL_ERROR,
                LunaError::Io(_) => EXIT_IO_ERROR,
                LunaError::Prompt(_) => EXIT_PROMPT_ERROR,
                LunaError::Generic(_) => EXIT_ERROR,
            }
        }
    }
}
