use clap::{Parser, ValueEnum};
use contract_gen::pipeline::{self, EngineKind};
use std::path::PathBuf;
use std::process::ExitCode;

/// Render a bilingual ground-transport contract PDF from a trip record
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path of the JSON trip record
    input: PathBuf,

    /// Path the finished PDF is written to; its file name becomes the
    /// hosted name encoded in the locator code
    output: PathBuf,

    /// Directory holding templates/, backgrounds/, and optional fonts/
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Layout engine to render with
    #[arg(long, value_enum, default_value_t = Engine::Markup)]
    engine: Engine,
}

#[derive(Clone, Copy, ValueEnum)]
enum Engine {
    Markup,
    Canvas,
}

impl From<Engine> for EngineKind {
    fn from(engine: Engine) -> EngineKind {
        match engine {
            Engine::Markup => EngineKind::Markup,
            Engine::Canvas => EngineKind::Canvas,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match pipeline::generate(
        &cli.input,
        &cli.output,
        &cli.assets,
        cli.engine.into(),
        |name| std::env::var(name).ok(),
    ) {
        Ok(filename) => {
            println!("{filename}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
