mod json;
mod render;

use std::{
    env::args,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Context};
use ungrammar::{Grammar, LineMap, Span, Token};

struct Options {
    path: PathBuf,
    do_tokens: bool,
    do_json: bool,
    lenient: bool,
    quiet: bool,
}

impl Options {
    fn from_args(args: impl Iterator<Item = String>) -> anyhow::Result<Options> {
        let mut do_tokens = false;
        let mut do_json = false;
        let mut lenient = false;
        let mut quiet = false;
        let mut files = Vec::new();

        for arg in args {
            match arg.as_str() {
                "--tokens" => do_tokens = true,
                "--json" => do_json = true,
                "--lenient" => lenient = true,
                "--quiet" => quiet = true,
                flag if flag.len() > 1 && flag.starts_with('-') => {
                    bail!("Unknown flag `{flag}`")
                }
                _ => files.push(arg),
            }
        }

        let path = match files.len() {
            0 => bail!("No file provided"),
            1 => files.remove(0),
            _ => bail!("Only one file may be provided"),
        };

        Ok(Options {
            path: path.into(),
            do_tokens,
            do_json,
            lenient,
            quiet,
        })
    }
}

fn init_logger() -> anyhow::Result<()> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_owned());
    let level = log::LevelFilter::from_str(&level)
        .with_context(|| format!("Invalid RUST_LOG level `{level}`"))?;

    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    )
    .context("Failed to initialize logger")
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut src = String::new();
        std::io::stdin()
            .read_to_string(&mut src)
            .context("Failed to read stdin")?;
        return Ok(src);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read `{}`", path.display()))
}

/// `path:line:col: message`, one-based like compiler diagnostics.
fn diagnostic(
    path: &Path,
    src: &str,
    span: Option<Span>,
    message: impl std::fmt::Display,
) -> String {
    let path = path.display();
    let offset = span.map_or(src.len().try_into().unwrap_or(u32::MAX), Span::start);
    let pos = LineMap::new(src).offset_to_pos(src, offset);
    format!("{path}:{}:{}: {message}", pos.line + 1, pos.character + 1)
}

fn print_tokens(src: &str, tokens: &[Token]) {
    for token in tokens {
        let text = token.span.as_str(src).unwrap_or_default();
        let kind = format!("{:?}", token.kind);
        println!("{kind:<10} {:<8} {text}", token.span.to_string());
    }
}

fn run() -> anyhow::Result<()> {
    let options = Options::from_args(args().skip(1))?;
    let src = read_source(&options.path)?;
    log::debug!("read {} bytes from {}", src.len(), options.path.display());

    let tokens = if options.lenient {
        ungrammar::tokenize(&src)
    } else {
        ungrammar::tokenize_strict(&src)
            .map_err(|e| anyhow::anyhow!(diagnostic(&options.path, &src, Some(e.span()), e)))?
    };

    if options.do_tokens {
        print_tokens(&src, &tokens);
    }

    let grammar: Grammar = ungrammar::parse(tokens)
        .map_err(|e| anyhow::anyhow!(diagnostic(&options.path, &src, e.span(), e)))?;

    if options.quiet {
        return Ok(());
    }

    if options.do_json {
        let json = serde_json::to_string_pretty(&json::JsonGrammar::new(&grammar))?;
        println!("{json}");
    } else {
        let mut out = String::new();
        render::display_grammar(&mut out, &grammar)?;
        print!("{out}");
    }

    Ok(())
}

fn main() {
    if let Err(err) = init_logger() {
        eprintln!("{err:#}");
    }
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> anyhow::Result<Options> {
        Options::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_options() {
        let o = options(&["--json", "grammar.ungram", "--lenient"]).unwrap();
        assert_eq!(o.path, PathBuf::from("grammar.ungram"));
        assert!(o.do_json && o.lenient);
        assert!(!o.do_tokens && !o.quiet);

        assert!(options(&["-"]).is_ok());
        assert!(options(&[]).is_err());
        assert!(options(&["a", "b"]).is_err());
        assert!(options(&["--bogus", "a"]).is_err());
    }

    #[test]
    fn test_diagnostic() {
        let src = "A = 'a'\nB = ('b'";
        let path = Path::new("g.ungram");
        let err = ungrammar::parse(ungrammar::tokenize(src)).unwrap_err();
        assert_eq!(
            diagnostic(path, src, err.span(), &err),
            "g.ungram:2:9: unexpected end of input, expected `)`"
        );

        let src = "A = 'a'\n= B";
        let err = ungrammar::parse(ungrammar::tokenize(src)).unwrap_err();
        assert_eq!(
            diagnostic(path, src, err.span(), &err),
            "g.ungram:2:1: unexpected `=`, expected identifier"
        );

        let err = ungrammar::tokenize_strict("A = 1").unwrap_err();
        assert_eq!(
            diagnostic(path, "A = 1", Some(err.span()), &err),
            "g.ungram:1:5: unexpected character '1'"
        );
    }
}
