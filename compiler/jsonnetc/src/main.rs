//! `jsonnet` command-line interpreter.

use jsonnetc::cli::{self, Command};

fn main() {
    jsonnetc::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        eprint!("{}", cli::USAGE);
        std::process::exit(1);
    }

    let options = match cli::parse_args(&args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            print!("{}", cli::USAGE);
            return;
        }
        Ok(Command::Version) => {
            println!("Jsonnet commandline interpreter {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!();
            eprint!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    let result = cli::execute(&options).and_then(|text| cli::emit(&options, &text));
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
