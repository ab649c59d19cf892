use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use richtext::{Config, ContentValue, Error, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "richtext")]
#[command(about = "Render CMS rich-text JSON to HTML, Typst, SVG or PDF")]
struct Cli {
    /// Input JSON file, or `-` for stdin
    input: PathBuf,

    /// Output file (text formats default to stdout, PDF to the input name with .pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// TOML config file
    #[arg(short, long, default_value = "richtext.toml")]
    config: PathBuf,

    /// Base URL for relative media paths (overrides config and environment)
    #[arg(long)]
    media_base: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Typst,
    Text,
    Tree,
    Svg,
    Pdf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    // Logs go to stderr so stdout stays clean for rendered output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;
    config.apply_env();
    if let Some(base) = &cli.media_base {
        config.media.base_url = base.clone();
    }
    debug!(media_base = %config.media.base_url, "config loaded");

    let content = read_content(&cli.input)?;

    match cli.format {
        Format::Html => emit_text(cli, &richtext::content_to_html_with_config(&content, &config)),
        Format::Typst => emit_text(cli, &richtext::content_to_typst_with_config(&content, &config)),
        Format::Text => {
            let text = richtext::render_with_config(&content, &config)
                .map(|output| output.plain_text())
                .unwrap_or_default();
            emit_text(cli, &text)
        }
        Format::Tree => {
            let output = richtext::render_with_config(&content, &config);
            emit_text(cli, &serde_json::to_string_pretty(&output)?)
        }
        Format::Svg => {
            let doc = richtext::content_to_svg_with_config(&content, &config)?;
            info!(
                pages = doc.pages.len(),
                width_pt = doc.width_pt,
                height_pt = doc.height_pt,
                "rendered svg"
            );
            match &cli.output {
                Some(path) => write_svg_pages(path, &doc.pages),
                None => emit_text(cli, &doc.pages.join("\n")),
            }
        }
        Format::Pdf => {
            let output = match &cli.output {
                Some(path) => path.clone(),
                None if is_stdin(&cli.input) => return Err(Error::MissingOutput),
                None => cli.input.with_extension("pdf"),
            };
            let pdf_bytes = richtext::content_to_pdf_with_config(&content, &config)?;
            write_file(&output, &pdf_bytes)?;
            println!("Created {}", output.display());
            Ok(())
        }
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_content(input: &Path) -> Result<ContentValue> {
    let json = if is_stdin(input) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| Error::Io {
                path: input.to_path_buf(),
                source,
            })?;
        buf
    } else {
        fs::read_to_string(input).map_err(|source| Error::Io {
            path: input.to_path_buf(),
            source,
        })?
    };
    richtext::parse_json(&json)
}

fn emit_text(cli: &Cli, text: &str) -> Result<()> {
    match &cli.output {
        Some(path) => write_file(path, text.as_bytes()),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .map_err(|source| Error::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                })
        }
    }
}

/// One page writes to `path`; more pages write `stem-1.svg`, `stem-2.svg`, ...
fn write_svg_pages(path: &Path, pages: &[String]) -> Result<()> {
    if let [page] = pages {
        return write_file(path, page.as_bytes());
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    for (i, page) in pages.iter().enumerate() {
        let page_path = path.with_file_name(format!("{}-{}.svg", stem, i + 1));
        write_file(&page_path, page.as_bytes())?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}
