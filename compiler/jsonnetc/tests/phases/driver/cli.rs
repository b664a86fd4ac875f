//! Command-line parsing and end-to-end runs.

use jsonnetc::cli::{execute, parse_args, Command, Options, OutputMode};
use jsonnetc::{DriverError, ExtVar};
use std::fs;
use std::path::PathBuf;

use crate::common::{args, path_arg, source_tree};

fn options(list: &[&str]) -> Options {
    match parse_args(&args(list)).unwrap() {
        Command::Run(options) => options,
        other => panic!("expected a run command, got {other:?}"),
    }
}

fn usage_error(list: &[&str]) -> String {
    match parse_args(&args(list)) {
        Err(err @ DriverError::Usage(_)) => err.to_string(),
        other => panic!("expected a usage error, got {other:?}"),
    }
}

mod parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let parsed = options(&["main.jsonnet"]);
        assert_eq!(parsed.input, "main.jsonnet");
        assert!(!parsed.exec);
        assert_eq!(parsed.mode, OutputMode::Single);
        assert_eq!(parsed.config.max_stack, 500);
        assert_eq!(parsed.output_file, None);
    }

    #[test]
    fn all_flags() {
        let parsed = options(&[
            "-J", "lib", "--jpath=vendor", "-V", "a=1", "--ext-code", "b=[2]", "-s", "40",
            "--gc-min-objects", "10", "--gc-growth-trigger=3.5", "-S", "-o", "out.json", "-e", "{}",
        ]);
        assert!(parsed.exec);
        assert_eq!(parsed.input, "{}");
        assert_eq!(parsed.jpaths, vec![PathBuf::from("lib"), PathBuf::from("vendor")]);
        assert_eq!(
            parsed.ext_vars,
            vec![("a".to_owned(), ExtVar::Str("1".into())), ("b".to_owned(), ExtVar::Code("[2]".into()))]
        );
        assert_eq!(parsed.config.max_stack, 40);
        assert_eq!(parsed.config.gc_min_objects, 10);
        assert!((parsed.config.gc_growth_trigger - 3.5).abs() < f64::EPSILON);
        assert!(parsed.config.string_output);
        assert_eq!(parsed.output_file, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn output_modes() {
        assert_eq!(options(&["-m", "out", "f"]).mode, OutputMode::Multi(PathBuf::from("out")));
        assert_eq!(options(&["-y", "f"]).mode, OutputMode::Stream);
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), Command::Help);
        assert_eq!(parse_args(&args(&["f", "--version"])).unwrap(), Command::Version);
    }

    #[test]
    fn double_dash_ends_options() {
        assert_eq!(options(&["--", "-weird.jsonnet"]).input, "-weird.jsonnet");
    }

    #[test]
    fn usage_errors() {
        assert_eq!(usage_error(&[]), "ERROR: must give filename");
        assert_eq!(usage_error(&["-J"]), "ERROR: -J requires an argument");
        assert_eq!(usage_error(&["--bogus", "f"]), "ERROR: Unknown option: --bogus");
        assert_eq!(usage_error(&["-s", "x", "f"]), "ERROR: Invalid -s value: x");
        assert_eq!(usage_error(&["a", "b"]), "ERROR: only one filename is allowed, got a and b");
        assert_eq!(usage_error(&["-V", "JSONNETC_TEST_SURELY_UNSET", "f"]), "ERROR: Environment variable JSONNETC_TEST_SURELY_UNSET was undefined.");
    }
}

mod running {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_document_ends_with_newline() {
        assert_eq!(execute(&options(&["-e", "[1, 2]"])).unwrap(), "[\n   1,\n   2\n]\n");
    }

    #[test]
    fn string_output() {
        assert_eq!(execute(&options(&["-S", "-e", "'a' + 'b'"])).unwrap(), "ab\n");
    }

    #[test]
    fn ext_vars_reach_the_program() {
        let out = execute(&options(&["-V", "who=you", "--ext-code", "n=1 + 1", "-e", "[std.extVar('who'), std.extVar('n')]"])).unwrap();
        assert_eq!(out, "[\n   \"you\",\n   2\n]\n");
    }

    #[test]
    fn yaml_stream() {
        assert_eq!(execute(&options(&["-y", "-e", "[1, {}]"])).unwrap(), "---\n1\n---\n{ }\n...\n");
        assert_eq!(execute(&options(&["-y", "-e", "[]"])).unwrap(), "");
    }

    #[test]
    fn multi_writes_files_and_lists_them() {
        let tree = source_tree(&[("main.jsonnet", "{ 'x.json': { a: 1 }, 'y.json': 'text' }")]);
        let out_dir = tree.path().join("out");
        fs::create_dir(&out_dir).unwrap();
        let parsed = options(&["-m", &path_arg(&out_dir), &path_arg(&tree.path().join("main.jsonnet"))]);
        let listing = execute(&parsed).unwrap();
        let x = out_dir.join("x.json");
        let y = out_dir.join("y.json");
        assert_eq!(listing, format!("{}\n{}\n", path_arg(&x), path_arg(&y)));
        assert_eq!(fs::read_to_string(x).unwrap(), "{\n   \"a\": 1\n}\n");
        assert_eq!(fs::read_to_string(y).unwrap(), "\"text\"\n");
    }

    #[test]
    fn jpath_flag() {
        let tree = source_tree(&[("lib/v.libsonnet", "7")]);
        let lib = path_arg(&tree.path().join("lib"));
        assert_eq!(execute(&options(&["-J", &lib, "-e", "import 'v.libsonnet'"])).unwrap(), "7\n");
    }

    #[test]
    fn tail_recursion_with_small_stack() {
        let source = "local f(x) = if x == 0 then 0 else f(x - 1); f(100000)";
        assert_eq!(execute(&options(&["-s", "500", "-e", source])).unwrap(), "0\n");
    }

    #[test]
    fn failures_render_with_trace() {
        let err = execute(&options(&["-e", "{ assert self.a > 0 : 'bad', a: -1 }"])).unwrap_err();
        assert!(err.to_string().starts_with("RUNTIME ERROR: bad\n"), "{err}");
    }

    #[test]
    fn snippets_are_named_cmdline() {
        let err = execute(&options(&["-e", "error 'x'"])).unwrap_err();
        assert!(err.to_string().contains("\t<cmdline>:1:1"), "{err}");
    }
}
