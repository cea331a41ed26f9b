use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

/// Compiler for the oblik object language.
#[derive(Parser, Debug)]
#[command(name = "oblik", version, about)]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Write the generated IR here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// When to color diagnostics.
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorMode,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum ColorMode {
    /// Color when stderr is a terminal.
    #[default]
    Auto,
    On,
    Off,
}

impl ColorMode {
    fn should_colorize(self) -> bool {
        match self {
            ColorMode::On => true,
            ColorMode::Off => false,
            ColorMode::Auto => std::io::stderr().is_terminal(),
        }
    }
}

const EXIT_USAGE: i32 = 1;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            let _ = err.print();
            exit(code);
        }
    };

    let path = cli.input.display().to_string();

    let bytes = match fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("oblik: {path}: {err}");
            exit(EXIT_USAGE);
        }
    };

    let source = match String::from_utf8(bytes) {
        Ok(source) => source,
        Err(err) => {
            let offset = err.utf8_error().valid_up_to();
            eprintln!("oblik: {path}: invalid UTF-8 at byte {offset}");
            exit(oblik_lib::Stage::Lex.exit_code());
        }
    };

    match oblik_lib::compile_to_ir(&source) {
        Ok(ir) => {
            let result = match &cli.output {
                Some(output) => fs::write(output, ir),
                None => {
                    print!("{ir}");
                    Ok(())
                }
            };
            if let Err(err) = result {
                eprintln!("oblik: {path}: {err}");
                exit(EXIT_USAGE);
            }
        }
        Err(diagnostic) => {
            let rendered = diagnostic
                .printer(&source, &path)
                .colored(cli.color.should_colorize())
                .render();
            eprintln!("{rendered}");
            exit(diagnostic.stage.exit_code());
        }
    }
}
