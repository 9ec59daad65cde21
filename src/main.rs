use anyhow::{Context, Result};
use jsonlite::{dump, parse_file_with_options, ParseOptions, Parser, ReaderSource};
use log::info;
use std::fs::File;
use std::io::{self, stdin, stdout, Write};
use std::path::Path;

#[macro_use]
extern crate clap;
use clap::{App, ArgMatches};

const FAIL_FILES: usize = 33;
const PASS_FILES: usize = 3;

fn main() -> Result<()> {
    env_logger::init();
    let yaml = load_yaml!("main.yml");
    let matches = App::from_yaml(yaml).get_matches();
    match matches.subcommand() {
        ("check", Some(m)) => {
            let dir = m.value_of_os("dir").context("missing directory")?;
            let options = parse_options(m)?;
            let stdout = stdout();
            check_dir(&mut stdout.lock(), Path::new(dir), options)?;
        }
        ("format", Some(m)) => format(m)?,
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}

fn parse_options(m: &ArgMatches) -> Result<ParseOptions> {
    if m.is_present("max_depth") {
        let max_depth = value_t!(m, "max_depth", usize)?;
        Ok(ParseOptions { max_depth })
    } else {
        Ok(ParseOptions::default())
    }
}

fn format(m: &ArgMatches) -> Result<()> {
    let indent = value_t!(m, "indent", usize)?;
    let options = parse_options(m)?;
    if let Some(path) = m.value_of_os("json_file") {
        let path = Path::new(path);
        let value = parse_file_with_options(path, options)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let result = dump(&value, indent)?;
        if m.is_present("in_place") {
            let mut f = File::create(path)?;
            writeln!(f, "{}", result)?;
            info!("rewrote {}", path.display());
        } else {
            println!("{}", result);
        }
    } else {
        let stdin = stdin();
        let reader = stdin.lock();
        let value = Parser::with_options(ReaderSource::new(reader), options)
            .parse()
            .context("failed to parse stdin")?;
        println!("{}", dump(&value, indent)?);
    }
    Ok(())
}

/// Runs every checker file in `dir`. Individual failures are reported, never
/// returned; only a broken `out` is an error.
fn check_dir<W: Write>(out: &mut W, dir: &Path, options: ParseOptions) -> io::Result<()> {
    writeln!(
        out,
        "============CHECK fail1.json ~ fail{}.json============",
        FAIL_FILES
    )?;
    for i in 1..=FAIL_FILES {
        check(out, &dir.join(format!("fail{}.json", i)), options)?;
    }
    writeln!(
        out,
        "============CHECK pass1.json ~ pass{}.json============",
        PASS_FILES
    )?;
    for i in 1..=PASS_FILES {
        check(out, &dir.join(format!("pass{}.json", i)), options)?;
    }
    Ok(())
}

fn check<W: Write>(out: &mut W, path: &Path, options: ParseOptions) -> io::Result<bool> {
    if let Err(e) = parse_file_with_options(path, options) {
        writeln!(out, "check failed: {}: {}", path.display(), e)?;
        return Ok(false);
    }
    writeln!(out, "check pass {}", path.display())?;
    match path.file_name().and_then(|n| n.to_str()) {
        Some("fail1.json") => writeln!(out, "(Now it can be any JSON value)")?,
        Some("fail18.json") => writeln!(out, "(We have no maximum nesting depth limit)")?,
        _ => {}
    }
    Ok(true)
}
