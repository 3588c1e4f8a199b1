//! mdpane - Command Line Entry Point
//!
//! Renders markdown files with the same pipeline the surface uses for its
//! preview pane.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use mdpane::config::load_config;
use mdpane::error::{Error, Result};
use mdpane::export::{generate_html_document, generate_html_fragment, ExportOptions};
use mdpane::markdown::get_highlighter;
use mdpane::state::is_markdown_path;

#[derive(Debug, Parser)]
#[command(name = "mdpane", version, about = "Markdown preview rendering")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a markdown file to HTML
    Render {
        /// Markdown file to render; `-` reads standard input
        input: PathBuf,

        /// Write the HTML here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit only the rendered body, without a surrounding document
        #[arg(long)]
        fragment: bool,

        /// Syntax theme for page colors and code blocks
        #[arg(long)]
        theme: Option<String>,

        /// Document title; defaults to the input file name
        #[arg(long)]
        title: Option<String>,
    },
    /// List the languages code blocks can be highlighted as
    Languages,
    /// List the available syntax themes
    Themes,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("mdpane: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render {
            input,
            output,
            fragment,
            theme,
            title,
        } => render(input, output, fragment, theme, title),
        Command::Languages => {
            for language in get_highlighter().languages() {
                println!("{}", language);
            }
            Ok(())
        }
        Command::Themes => {
            for theme in get_highlighter().available_themes() {
                println!("{}", theme);
            }
            Ok(())
        }
    }
}

fn render(
    input: PathBuf,
    output: Option<PathBuf>,
    fragment: bool,
    theme: Option<String>,
    title: Option<String>,
) -> Result<()> {
    if let Some(output) = &output {
        check_output(&input, output)?;
    }
    let markdown = read_input(&input)?;

    let html = if fragment {
        generate_html_fragment(&markdown)
    } else {
        let settings = load_config();
        let mut options = ExportOptions::from_settings(&settings);
        if let Some(theme) = theme {
            options = options.with_syntax_theme(theme);
        }
        options.title = title.or_else(|| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| *s != "-")
                .map(str::to_string)
        });
        generate_html_document(&markdown, &options)
    };

    match output {
        Some(path) => {
            std::fs::write(&path, html).map_err(|e| Error::FileWrite {
                path: path.clone(),
                source: e,
            })?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}

/// Refuse to write the HTML over the markdown it was rendered from.
fn check_output(input: &Path, output: &Path) -> Result<()> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(Error::Application(format!(
            "refusing to overwrite input file '{}'",
            input.display()
        )));
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    if !is_markdown_path(input) {
        warn!("{} does not look like a markdown file", input.display());
    }
    std::fs::read_to_string(input).map_err(|e| Error::FileRead {
        path: input.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_output_rejects_input_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "# Notes").unwrap();

        let err = check_output(&input, &input).unwrap_err();
        assert!(matches!(err, Error::Application(_)));
        assert!(err.to_string().contains("notes.md"));

        let aliased = dir.path().join(".").join("notes.md");
        assert!(check_output(&input, &aliased).is_err());
    }

    #[test]
    fn test_check_output_accepts_new_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "# Notes").unwrap();
        assert!(check_output(&input, &dir.path().join("notes.html")).is_ok());
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::parse_from(["mdpane", "render", "in.md", "-o", "out.html", "--fragment"]);
        match cli.command {
            Command::Render {
                input,
                output,
                fragment,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in.md"));
                assert_eq!(output, Some(PathBuf::from("out.html")));
                assert!(fragment);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
