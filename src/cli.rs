use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser};
use exn::ResultExt;
use headless_pdf_config::Config;
use headless_pdf_render::{Chrome, ConversionRequest, ConversionResult, PdfConverter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Parser, Debug)]
#[command(name = "headless-pdf", version, about = "Convert HTML to PDF with a headless Chrome/Chromium")]
pub struct Args {
    /// HTML file to convert. HTML is read from stdin when omitted.
    pub input: Option<PathBuf>,

    /// Where to write the PDF (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional configuration file (TOML, YAML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chrome/Chromium executable; overrides configuration and discovery.
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Directory for intermediate files.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the intermediate .html/.pdf files.
    #[arg(long)]
    pub keep: bool,

    /// Use the blocking converter (on a worker thread) instead of the async one.
    #[arg(long)]
    pub sync: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub async fn run(args: Args) -> Result<()> {
    run_with(args, tokio::io::stdin(), tokio::io::stdout()).await
}

async fn run_with<R, W>(args: Args, mut stdin: R, mut stdout: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let config = Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let mut options = config.converter_options();
    options.keep_artifacts |= args.keep;
    let converter = PdfConverter::with_chrome(resolve_chrome(args.chrome.as_deref(), &config)?).with_options(options);
    let output_dir = resolve_output_dir(args.output_dir.as_deref(), &config);

    let request = match args.input {
        Some(path) => ConversionRequest::file(output_dir, path),
        None => {
            let mut bytes = Vec::new();
            stdin.read_to_end(&mut bytes).await.or_raise(|| ErrorKind::Stdin)?;
            ConversionRequest::html(output_dir, decode_html(bytes))
        },
    };

    let result = if args.sync {
        // The blocking converter must not stall the runtime's worker threads.
        tokio::task::spawn_blocking(move || converter.convert(&request))
            .await
            .unwrap_or_else(|e| ConversionResult::failed(format!("an error occurred: {e}")))
    } else {
        converter.convert_async(&request).await
    };
    let pdf = match result.data {
        Some(pdf) if result.success => pdf,
        _ => exn::bail!(ErrorKind::Conversion(result.message)),
    };

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, &pdf).await.or_raise(|| ErrorKind::Output)?;
            tracing::info!(path = %path.display(), bytes = pdf.len(), "PDF written");
        },
        None => {
            stdout.write_all(&pdf).await.or_raise(|| ErrorKind::Output)?;
            stdout.flush().await.or_raise(|| ErrorKind::Output)?;
        },
    }
    Ok(())
}

/// Prints the failure (if any) to stderr and picks the process exit code.
pub fn report(result: Result<()>) -> ExitCode {
    let Err(err) = result else {
        return ExitCode::SUCCESS;
    };
    match &*err {
        ErrorKind::Conversion(message) => eprintln!("{message}"),
        // Show the whole error tree: the cause is usually one level down.
        _ => eprintln!("{err:?}"),
    }
    ExitCode::FAILURE
}

/// Chrome reads the page as UTF-8; invalid sequences become U+FFFD.
fn decode_html(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        tracing::warn!(valid_up_to = e.utf8_error().valid_up_to(), "HTML on stdin is not valid UTF-8");
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })
}

/// Command-line flag, then configuration, then whatever is installed.
fn resolve_chrome(flag: Option<&Path>, config: &Config) -> Result<Chrome> {
    if let Some(path) = flag.or(config.chrome.as_deref()) {
        return Ok(Chrome::binary(path));
    }
    Chrome::discover().or_raise(|| ErrorKind::Renderer)
}

fn resolve_output_dir(flag: Option<&Path>, config: &Config) -> PathBuf {
    flag.or(config.output_dir.as_deref()).map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir)
}
