// SPDX-License-Identifier: MIT
//
// tim — compile terminal markup to ANSI on the command line.
//
// This is the thin binary over the workspace crates:
//
//   tim-markup → tokenizer, tag resolution, macros, compiler, parse cache
//   tim-color  → color model, terminal capability detection, degradation
//
// Input flows straight through:
//
//   args or stdin → MarkupContext::parse → StyledText → stdout
//                                              │
//                                              └→ diagnostics → stderr (-d)
//
// The context detects the terminal's color system from the environment
// (TIM_COLORSYS, NO_COLOR, COLORTERM, TERM) unless -c pins one, so the same
// markup degrades sensibly on dumber terminals.

use std::env;
use std::io::{self, Read, Write};
use std::process;

use tim_color::ColorSystem;
use tim_markup::{escape, MarkupContext};

// ─── Command line ───────────────────────────────────────────────────────────

const USAGE: &str = "\
usage: tim [options] [markup ...]

Compiles tim markup ([bold 141]like this[/]) to ANSI escape sequences.
Markup arguments are joined with spaces; with none, standard input is
read to the end and compiled as one document.

options:
  -p, --plain              print the visible text, markup stripped
  -t, --tokens             print the token stream, one token per line
  -e, --escape             escape markup instead of compiling it
  -c, --color-system SYS   force a color system: no|16|256|true
  -d, --diagnostics        report parse diagnostics on stderr
  -n                       omit the trailing newline
  -h, --help               show this help
  -V, --version            show the version";

/// Which form of the parse result goes to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Output {
    #[default]
    Ansi,
    Plain,
    Tokens,
}

#[derive(Debug, PartialEq, Eq, Default)]
struct Cli {
    output: Output,
    /// `-e`: print `escape(input)` and skip compilation entirely.
    escape_only: bool,
    color_system: Option<ColorSystem>,
    diagnostics: bool,
    no_newline: bool,
    markup: Vec<String>,
}

#[derive(Debug)]
enum Parsed {
    Run(Cli),
    Help,
    Version,
}

/// Parses arguments (program name already skipped). Flag order is free;
/// `--` ends flag parsing so markup may start with `-`.
fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Parsed, String> {
    let mut cli = Cli::default();
    let mut positional_only = false;

    while let Some(arg) = args.next() {
        if positional_only || !arg.starts_with('-') || arg == "-" {
            cli.markup.push(arg);
            continue;
        }

        match arg.as_str() {
            "--" => positional_only = true,
            "-p" | "--plain" => cli.output = Output::Plain,
            "-t" | "--tokens" => cli.output = Output::Tokens,
            "-e" | "--escape" => cli.escape_only = true,
            "-d" | "--diagnostics" => cli.diagnostics = true,
            "-n" => cli.no_newline = true,
            "-h" | "--help" => return Ok(Parsed::Help),
            "-V" | "--version" => return Ok(Parsed::Version),
            "-c" | "--color-system" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --color-system".to_owned())?;
                let system = value.parse::<ColorSystem>().map_err(|e| e.to_string())?;
                cli.color_system = Some(system);
            }
            _ => return Err(format!("unknown option {arg:?} (try --help)")),
        }
    }

    Ok(Parsed::Run(cli))
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let parsed = parse_args(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("tim: {err}");
        process::exit(1);
    });

    let cli = match parsed {
        Parsed::Run(cli) => cli,
        Parsed::Help => {
            println!("{USAGE}");
            return;
        }
        Parsed::Version => {
            println!("tim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    let input = if cli.markup.is_empty() {
        read_stdin()
    } else {
        cli.markup.join(" ")
    };

    if cli.escape_only {
        emit(&escape(&input), cli.no_newline);
        return;
    }

    let ctx = match cli.color_system {
        Some(system) => MarkupContext::with_color_system(system),
        None => MarkupContext::new(),
    };

    let styled = ctx.parse(&input);

    if cli.diagnostics {
        for diagnostic in &styled.diagnostics {
            eprintln!("tim: {diagnostic}");
        }
    }

    match cli.output {
        Output::Ansi => emit(&styled.ansi, cli.no_newline),
        Output::Plain => emit(&styled.plain, cli.no_newline),
        Output::Tokens => {
            let lines: Vec<String> = styled.tokens.iter().map(ToString::to_string).collect();
            emit(&lines.join("\n"), cli.no_newline);
        }
    }
}

/// Reads standard input to the end. One trailing newline belongs to the
/// pipe, not the markup, and is dropped.
fn read_stdin() -> String {
    let mut buffer = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut buffer) {
        eprintln!("tim: {err}");
        process::exit(1);
    }
    if buffer.ends_with('\n') {
        buffer.pop();
    }
    buffer
}

fn emit(text: &str, no_newline: bool) {
    let mut stdout = io::stdout().lock();
    let result = if no_newline {
        stdout.write_all(text.as_bytes())
    } else {
        writeln!(stdout, "{text}")
    };
    if let Err(err) = result {
        eprintln!("tim: {err}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
