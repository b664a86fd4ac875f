//! Command-line parsing and execution for the `jsonnet` binary.

use crate::error::DriverError;
use crate::session::Session;
use jsonnet_eval::{EvalConfig, ExtVar};
use std::fs;
use std::io;
use std::path::PathBuf;

/// File name given to `-e` snippets.
pub const SNIPPET_NAME: &str = "<cmdline>";

/// File name given to code read from standard input.
pub const STDIN_NAME: &str = "<stdin>";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Single,
    /// Write each top-level field to a file in this directory.
    Multi(PathBuf),
    /// Emit the top-level array as a YAML document stream.
    Stream,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// Path of the input file, or the code itself with `exec`.
    pub input: String,
    pub exec: bool,
    pub jpaths: Vec<PathBuf>,
    pub ext_vars: Vec<(String, ExtVar)>,
    pub mode: OutputMode,
    pub config: EvalConfig,
    pub output_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Run(Options),
    Help,
    Version,
}

/// Parse the arguments following the program name.
pub fn parse_args(args: &[String]) -> Result<Command, DriverError> {
    let mut exec = false;
    let mut input = None;
    let mut jpaths = Vec::new();
    let mut ext_vars = Vec::new();
    let mut mode = OutputMode::Single;
    let mut config = EvalConfig::default();
    let mut output_file = None;

    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        if arg == "--" {
            for arg in rest.by_ref() {
                input = set_input(input, arg)?;
            }
            break;
        }
        // `--flag=value` and `--flag value` are equivalent.
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if arg.starts_with("--") => (flag, Some(value.to_owned())),
            _ => (arg.as_str(), None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| rest.next().cloned())
                .ok_or_else(|| DriverError::usage(format!("{name} requires an argument")))
        };
        match flag {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--version" => return Ok(Command::Version),
            "-e" | "--exec" => exec = true,
            "-J" | "--jpath" => jpaths.push(PathBuf::from(value(flag)?)),
            "-V" | "--ext-str" => {
                let (name, text) = ext_binding(&value(flag)?)?;
                ext_vars.push((name, ExtVar::Str(text)));
            }
            "--ext-code" => {
                let (name, code) = ext_binding(&value(flag)?)?;
                ext_vars.push((name, ExtVar::Code(code)));
            }
            "-m" | "--multi" => mode = OutputMode::Multi(PathBuf::from(value(flag)?)),
            "-y" | "--yaml-stream" => mode = OutputMode::Stream,
            "-S" | "--string" => config.string_output = true,
            "-s" | "--max-stack" => {
                config.max_stack = parse_number(flag, &value(flag)?)?;
                if config.max_stack == 0 {
                    return Err(DriverError::usage("Invalid --max-stack value: 0"));
                }
            }
            "--gc-min-objects" => config.gc_min_objects = parse_number(flag, &value(flag)?)?,
            "--gc-growth-trigger" => {
                let text = value(flag)?;
                config.gc_growth_trigger = text
                    .parse::<f64>()
                    .ok()
                    .filter(|trigger| *trigger >= 1.0)
                    .ok_or_else(|| DriverError::usage(format!("Invalid {flag} value: {text}")))?;
            }
            "-o" | "--output-file" => output_file = Some(PathBuf::from(value(flag)?)),
            _ if flag.starts_with('-') && flag != "-" => {
                return Err(DriverError::usage(format!("Unknown option: {arg}")));
            }
            _ => input = set_input(input, arg)?,
        }
    }

    let input = input.ok_or_else(|| DriverError::usage("must give filename"))?;
    Ok(Command::Run(Options {
        input,
        exec,
        jpaths,
        ext_vars,
        mode,
        config,
        output_file,
    }))
}

fn set_input(current: Option<String>, arg: &str) -> Result<Option<String>, DriverError> {
    match current {
        Some(first) => Err(DriverError::usage(format!(
            "only one filename is allowed, got {first} and {arg}"
        ))),
        None => Ok(Some(arg.to_owned())),
    }
}

fn parse_number(flag: &str, text: &str) -> Result<usize, DriverError> {
    text.parse()
        .map_err(|_| DriverError::usage(format!("Invalid {flag} value: {text}")))
}

/// Split `name=value`; a bare `name` takes its value from the environment.
fn ext_binding(spec: &str) -> Result<(String, String), DriverError> {
    if let Some((name, value)) = spec.split_once('=') {
        return Ok((name.to_owned(), value.to_owned()));
    }
    match std::env::var(spec) {
        Ok(value) => Ok((spec.to_owned(), value)),
        Err(_) => Err(DriverError::usage(format!(
            "Environment variable {spec} was undefined."
        ))),
    }
}

/// Build a session from `options`.
pub fn session(options: &Options) -> Session {
    let mut session = Session::new(options.config.clone());
    for dir in &options.jpaths {
        session.add_jpath(dir.clone());
    }
    for (name, value) in &options.ext_vars {
        session.set_ext_var(name.clone(), value.clone());
    }
    session
}

/// Evaluate per `options`, returning the text for standard output. In multi
/// mode the documents are written to files and the text lists their paths.
pub fn execute(options: &Options) -> Result<String, DriverError> {
    let session = session(options);
    let (file, source) = if options.exec {
        (SNIPPET_NAME.to_owned(), options.input.clone())
    } else if options.input == "-" {
        let source = io::read_to_string(io::stdin()).map_err(|source| DriverError::Read {
            path: PathBuf::from(STDIN_NAME),
            source,
        })?;
        (STDIN_NAME.to_owned(), source)
    } else {
        let path = PathBuf::from(&options.input);
        let source = fs::read_to_string(&path).map_err(|source| DriverError::Read { path, source })?;
        (options.input.clone(), source)
    };

    match &options.mode {
        OutputMode::Single => {
            let mut out = session.evaluate_snippet(&file, &source)?;
            out.push('\n');
            Ok(out)
        }
        OutputMode::Stream => {
            let documents = session.evaluate_stream(&file, &source)?;
            let mut out = String::new();
            for document in &documents {
                out.push_str("---\n");
                out.push_str(document);
                out.push('\n');
            }
            if !documents.is_empty() {
                out.push_str("...\n");
            }
            Ok(out)
        }
        OutputMode::Multi(dir) => {
            let documents = session.evaluate_multi(&file, &source)?;
            let mut listing = String::new();
            for (name, document) in documents {
                let path = dir.join(&name);
                let mut content = document;
                content.push('\n');
                fs::write(&path, content).map_err(|source| DriverError::Write {
                    path: path.clone(),
                    source,
                })?;
                listing.push_str(&path.to_string_lossy());
                listing.push('\n');
            }
            Ok(listing)
        }
    }
}

/// Send `text` to the output file if one was given, else to stdout.
pub fn emit(options: &Options, text: &str) -> Result<(), DriverError> {
    match &options.output_file {
        Some(path) => fs::write(path, text).map_err(|source| DriverError::Write {
            path: path.clone(),
            source,
        }),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

pub const USAGE: &str = "\
Jsonnet commandline interpreter

Usage: jsonnet [options] <filename>

Available options:
  -h / --help                This message
  -e / --exec                Treat filename as code
  -J / --jpath <dir>         Specify an additional library search dir
  -V / --ext-str <var>[=<val>]
                             Provide 'external' variable as string. If <val>
                             is omitted, get from environment var <var>
  --ext-code <var>[=<code>]  Provide 'external' variable as Jsonnet code
  -m / --multi <dir>         Write multiple files to the directory, list files
                             on stdout
  -y / --yaml-stream         Write output as a YAML stream of JSON documents
  -S / --string              Expect a string, manifest as plain text
  -s / --max-stack <n>       Number of allowed stack frames
  --gc-min-objects <n>       Do not run garbage collector until this many
  --gc-growth-trigger <n>    Run garbage collector after this amount of
                             object growth
  -o / --output-file <file>  Write to the output file rather than stdout
  -v / --version             Print version

In all cases:
  <filename> can be - (stdin)
  The -- option suppresses option processing for subsequent arguments.
";
