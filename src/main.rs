use anyhow::Result;

use zip_market_score::cli::{Cli, Command};
use zip_market_score::{
    handle_analyze, handle_completions, handle_preprocess, handle_report, handle_run, handle_score,
    interpret, load_config,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    if let Command::Completions { shell } = &cli.command {
        return handle_completions(*shell);
    }

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Preprocess {
            input,
            output,
            state,
            from,
            to,
            strict,
        } => handle_preprocess(config, input, output, state.as_deref(), *from, *to, *strict),
        Command::Score {
            input,
            output,
            base_ltv,
            fallback,
        } => handle_score(config, input, output, *base_ltv, *fallback),
        Command::Analyze {
            input,
            output,
            target,
            importance,
        } => handle_analyze(config, input, output, target.as_deref(), *importance),
        Command::Report {
            input,
            output_dir,
            column,
        } => handle_report(config, input, output_dir, column),
        Command::Run {
            input,
            output_dir,
            raw,
        } => handle_run(config, input, output_dir, *raw),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
