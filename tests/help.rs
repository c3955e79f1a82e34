#![cfg(feature = "help")]
use argslot::ArgParser;
use expect_test::{Expect, expect};

#[track_caller]
fn assert_help(parser: &ArgParser<'_>, expect: Expect) {
    expect.assert_eq(&parser.help_description());
}

fn wc() -> ArgParser<'static> {
    let mut p = ArgParser::new("wc");
    p.add_help(('h', "help"), "Count lines in files.").unwrap();
    p.add_flag(('l', "lines"), "Print line counts").unwrap();
    p.add_int_argument("limit", "Stop after this many files").unwrap().default_value(10);
    p.add_string_argument(('f', "file"), "Input files").unwrap().multi_value(1).positional();
    p
}

#[test]
fn full() {
    assert_help(
        &wc(),
        expect![[r#"
            wc
            Count lines in files.

            -l,  --lines,  Print line counts
                 --limit=<int>,  Stop after this many files [default = 10]
            -f,  --file=<string>,  Input files [positional] [repeated, min args = 1]

            -h, --help Display this help and exit
        "#]],
    );
}

#[test]
fn without_help_slot() {
    let mut p = ArgParser::new("cp");
    p.add_flag(('r', "recursive"), "Copy directories").unwrap().default_value(false);
    p.add_string_argument("src", "Source").unwrap().positional();
    p.add_string_argument("dst", "Destination").unwrap().positional();
    p.add_int_argument("jobs", "Worker count").unwrap().multi_value(0);

    assert_help(
        &p,
        expect![[r#"
            cp
            No description specified
            -r,  --recursive,  Copy directories [default = false]
                 --src=<string>,  Source [positional]
                 --dst=<string>,  Destination [positional]
                 --jobs=<int>,  Worker count [repeated, min args = 1]

        "#]],
    );
}

#[test]
fn help_without_short_name() {
    let mut p = ArgParser::new("tool");
    p.add_help("help", "").unwrap();
    p.add_string_argument(('o', "output"), "").unwrap().default_value("out.txt".into());

    assert_help(
        &p,
        expect![[r#"
            tool

            -o,  --output=<string>,   [default = out.txt]

                --help Display this help and exit
        "#]],
    );
}

#[test]
fn unaffected_by_parse() {
    let mut p = wc();
    let before = p.help_description();
    p.parse_from(["wc", "--limit", "3", "-l", "x"]).unwrap();
    assert_eq!(p.help_description(), before);
}
