//! Headless shell around the large-file subsystem.
//!
//! `app <path> [--lines START..END] [--save-copy DEST] [--config FILE]`
//!
//! Loads `path` the same way the editor does, reports progress as the UI loop
//! would, prints the requested lines and optionally writes the buffered
//! document to `DEST`. Set `RUST_LOG=debug` for loader internals.

/// One UI frame; the loop drains the event queue once per frame.
const FRAME: std::time::Duration = std::time::Duration::from_millis(16);
const DEFAULT_LINES: std::ops::Range<usize> = 0..20;

struct Args {
    path: std::path::PathBuf,
    lines: std::ops::Range<usize>,
    save_copy: Option<std::path::PathBuf>,
    config: Option<std::path::PathBuf>,
}

fn parse_range(value: &str) -> Option<std::ops::Range<usize>> {
    let (start, end) = value.split_once("..")?;

    Some(start.parse().ok()?..end.parse().ok()?)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut path = None;
    let mut lines = DEFAULT_LINES;
    let mut save_copy = None;
    let mut config = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lines" => {
                let value = args.next().ok_or("--lines needs START..END")?;
                lines = parse_range(&value).ok_or_else(|| format!("bad line range `{value}`"))?;
            }
            "--save-copy" => save_copy = Some(args.next().ok_or("--save-copy needs a path")?.into()),
            "--config" => config = Some(args.next().ok_or("--config needs a path")?.into()),
            _ if path.is_none() => path = Some(std::path::PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument `{arg}`")),
        }
    }

    Ok(Args {
        path: path.ok_or("usage: app <path> [--lines START..END] [--save-copy DEST] [--config FILE]")?,
        lines,
        save_copy,
        config,
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => editor_state::config::Config::load(path)?,
        None => editor_state::config::Config::default(),
    };
    let mut doc = editor_state::document::Document::new(config);
    let strategy = doc.load(&args.path)?;

    eprintln!("opening {} ({strategy:?})", args.path.display());

    let mut last_percent = None;

    while doc.state().is_loading() {
        for update in doc.poll() {
            match update {
                editor_state::document::SessionUpdate::IndexProgress { percent }
                | editor_state::document::SessionUpdate::Chunk(editor_core::events::ChunkEvent {
                    percent,
                    ..
                }) => {
                    if last_percent != Some(percent) {
                        eprint!("\r{percent:>3}%");
                        last_percent = Some(percent);
                    }
                }
                editor_state::document::SessionUpdate::Ready { line_count } => {
                    eprintln!("\rready: {line_count} lines");
                }
                editor_state::document::SessionUpdate::Failed { reason } => {
                    eprintln!();
                    return Err(reason.into());
                }
            }
        }

        std::thread::sleep(FRAME);
    }

    let line_count = doc.line_count().unwrap_or(0);

    for line_idx in args.lines.start.min(line_count)..args.lines.end.min(line_count) {
        println!("{:>6} {}", line_idx + 1, doc.get_line(line_idx)?);
    }

    if let Some(dest) = &args.save_copy {
        doc.save_as(dest)?;
        eprintln!("saved to {}", dest.display());
    }

    doc.close();

    Ok(())
}

pub fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = parse_args(std::env::args().skip(1))
        .map_err(Into::into)
        .and_then(run);

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "app failed");
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_defaults() {
        let parsed = args(&["file.txt"]).unwrap();

        assert_eq!(parsed.path, std::path::PathBuf::from("file.txt"));
        assert_eq!(parsed.lines, DEFAULT_LINES);
        assert!(parsed.save_copy.is_none());
    }

    #[test]
    fn test_parse_options() {
        let parsed = args(&["--lines", "5..9", "file.txt", "--save-copy", "out.txt"]).unwrap();

        assert_eq!(parsed.lines, 5..9);
        assert_eq!(parsed.save_copy, Some("out.txt".into()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["a", "b"]).is_err());
        assert!(args(&["a", "--lines", "x..y"]).is_err());
    }
}
