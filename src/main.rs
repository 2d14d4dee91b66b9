mod cli;

use clap::{CommandFactory, Parser};
use cli::{Args, Command, Shell};
use querylens::config::Config;
use querylens::context_map::get_context_map;
use querylens::dialect::{dialect_names, try_language_setting};
use querylens::error::{QueryLensError, Result};
use querylens::format::format_keyword_case;
use querylens::highlighter::SqlHighlighter;
use querylens::lexer::tokenize;
use querylens::lineage::get_lineage_with_default_schema;
use querylens::lint::{KnownTables, lint_query};
use querylens::logging;
use querylens::range::{
    get_query_as_explain, get_selected_query, get_statement_ranges, get_statements,
};
use querylens::table_cache::global_missing_table_cache;
use serde::Serialize;
use std::error::Error as StdError;
use std::fs;
use std::io;
use std::process::ExitCode;
use tracing::debug;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn read_query(args: &Args) -> Result<String> {
    match &args.file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(io::read_to_string(io::stdin())?),
    }
}

fn print_completions(shell: Shell) {
    use clap_complete::{generate, shells};

    let mut cmd = Args::command();
    let out = &mut io::stdout();
    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, "querylens", out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, "querylens", out),
        Shell::Fish => generate(shells::Fish, &mut cmd, "querylens", out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, "querylens", out),
        Shell::Elvish => generate(shells::Elvish, &mut cmd, "querylens", out),
    }
}

/// Run one analysis command over `query`, returning what to print
fn execute(command: &Command, query: &str, dialect: &str, config: &Config) -> Result<String> {
    match command {
        Command::Tokens => to_json(&tokenize(query, dialect)),
        Command::Lineage { default_schema } => {
            let schema = default_schema.as_deref().unwrap_or(&config.default_schema);
            to_json(&get_lineage_with_default_schema(query, dialect, schema))
        }
        Command::Context => to_json(&get_context_map(query, dialect)),
        Command::Ranges(selection) => {
            to_json(&get_statement_ranges(query, selection.range().as_ref(), dialect))
        }
        Command::Selected(selection) => Ok(get_selected_query(query, selection.range().as_ref())),
        Command::Explain => Ok(get_query_as_explain(query, dialect)),
        Command::Statements => to_json(&get_statements(query, dialect)),
        Command::Format { case } => {
            let case = case.unwrap_or(config.keyword_case);
            Ok(format_keyword_case(query, dialect, case))
        }
        Command::Highlight => Ok(SqlHighlighter::new(dialect).highlight(query)),
        Command::Lint { tables, default_schema } => {
            let known = KnownTables::parse(&fs::read_to_string(tables)?);
            let schema = default_schema.as_deref().unwrap_or(&config.default_schema);
            let findings = lint_query(query, dialect, schema, &known, global_missing_table_cache());
            to_json(&findings)
        }
        Command::Dialects => to_json(&dialect_names()),
    }
}

fn run(args: Args) -> std::result::Result<(), Box<dyn StdError>> {
    if let Some(shell) = args.completions {
        print_completions(shell);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let _log_guard = logging::init(&config.logging)?;

    let Some(command) = &args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let dialect_name = args.dialect.as_deref().unwrap_or(&config.default_dialect);
    let dialect = try_language_setting(dialect_name)?.name;
    debug!("Running {:?} with dialect {}", command, dialect);

    let query = if *command == Command::Dialects {
        String::new()
    } else {
        read_query(&args)?
    };
    println!("{}", execute(command, &query, dialect, &config)?);
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<QueryLensError>() {
                Some(err) => eprintln!("Error: {}", err.user_message()),
                None => eprintln!("Error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}
