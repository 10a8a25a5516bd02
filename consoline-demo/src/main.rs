use std::cell::Cell;
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use termion::raw::IntoRawMode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use consoline::accumulator::IndentRules;
use consoline::event_source::{channel, pump};
use consoline::style::{parse_color, Color};
use consoline::surface::{IoSurface, StdoutWrapper};
use consoline::SessionBuilder;

mod calc;
mod syntax;

use calc::{Calc, Variables};
use syntax::{CalcCompleter, CalcHighlighter};

const BANNER: &str = "consoline calculator, type exit() to quit";

#[derive(Parser, Debug)]
#[command(version, about = "Interactive calculator console")]
struct Args {
    /// Prompt for a fresh statement
    #[arg(long, default_value = ">>> ")]
    prompt: String,

    /// Prompt for continuation lines
    #[arg(long, default_value = "... ")]
    continuation: String,

    /// Prompt color, a name like `cyan` or `#rrggbb`
    #[arg(long, default_value = "green", value_parser = parse_color)]
    prompt_color: Color,

    /// Text printed at start and after every screen clear
    #[arg(long, default_value = BANNER)]
    banner: String,

    #[arg(long)]
    no_banner: bool,

    /// Script executed before the first prompt
    #[arg(long)]
    startup: Option<PathBuf>,

    /// Show what the startup script prints
    #[arg(long)]
    show_startup_output: bool,

    /// Run the startup script and exit without reading input
    #[arg(long)]
    readonly: bool,

    /// How long to wait after Escape for the rest of a key sequence
    #[arg(long, default_value_t = 30)]
    escape_timeout_ms: u64,

    /// Columns per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Tab inserts indentation when there is nothing to complete
    #[arg(long)]
    tab_indent: bool,

    #[arg(long)]
    no_bell: bool,

    /// Write logs here, filtered by RUST_LOG
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn configure_logging(path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    let file = File::create(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()?;

    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let (cols, rows) = termion::terminal_size().unwrap_or((80, 24));
    debug!(rows, cols, "terminal size");

    let variables = Variables::default();
    let quit = Rc::new(Cell::new(false));

    let mut builder = SessionBuilder::new()
        .with_prompt(args.prompt, args.continuation)
        .with_prompt_color(args.prompt_color)
        .readonly(args.readonly)
        .with_escape_timeout(Duration::from_millis(args.escape_timeout_ms))
        .with_indent(IndentRules {
            unit: args.indent,
            ..IndentRules::default()
        })
        .tab_inserts_indent(args.tab_indent)
        .audible_bell(!args.no_bell);

    if !args.no_banner {
        builder = builder.with_banner(args.banner);
    }
    if let Some(path) = &args.startup {
        builder = builder.with_startup_script(std::fs::read_to_string(path)?, args.show_startup_output);
    }

    let (tx, rx) = channel();
    let surface = IoSurface::new(StdoutWrapper::new(), rows as usize, cols as usize);
    let mut session = builder
        .with_completer(CalcCompleter::new(variables.clone()))
        .with_highlighter(CalcHighlighter)
        .build(surface, Calc::new(variables, quit.clone()), rx);

    if args.readonly {
        session.run().await?;
        return Ok(());
    }

    let _raw = std::io::stdout().into_raw_mode()?;
    tokio::spawn(pump(tokio::io::stdin(), tx));

    session.start()?;

    while !quit.get() {
        match session.step().await {
            Ok(()) => (),
            Err(consoline::Error::Closed) => break,
            Err(err) => return Err(err.into()),
        }
    }

    info!("session finished");

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(err) = configure_logging(path) {
            eprintln!("cannot log to {}: {}", path.display(), err);
        }
    }

    let code = match run(args).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("\r\n{}", err);
            1
        }
    };

    // The stdin reader blocks on a thread the runtime would wait for
    std::process::exit(code);
}
