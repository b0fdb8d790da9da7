use crate::artifacts::{ArtifactName, Artifacts};
use crate::error::{ErrorKind, Result};
use crate::models::{ConversionRequest, ConversionResult, Input};
use crate::wait::{wait_for_file, wait_for_file_async};
use crate::PdfConverter;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// How often a blocking wait checks whether Chrome has exited when a process
/// timeout is configured.
const PROCESS_POLL_INTERVAL: Duration = Duration::from_millis(50);

impl PdfConverter {
    /// Converts HTML text, blocking until Chrome exits.
    pub fn convert_text(&self, output_dir: impl Into<PathBuf>, html: impl Into<String>) -> ConversionResult {
        self.convert(&ConversionRequest::html(output_dir, html))
    }

    /// Converts an HTML file on disk, blocking until Chrome exits.
    pub fn convert_file(&self, output_dir: impl Into<PathBuf>, html_file: impl Into<PathBuf>) -> ConversionResult {
        self.convert(&ConversionRequest::file(output_dir, html_file))
    }

    pub async fn convert_text_async(&self, output_dir: impl Into<PathBuf>, html: impl Into<String>) -> ConversionResult {
        self.convert_async(&ConversionRequest::html(output_dir, html)).await
    }

    pub async fn convert_file_async(
        &self,
        output_dir: impl Into<PathBuf>,
        html_file: impl Into<PathBuf>,
    ) -> ConversionResult {
        self.convert_async(&ConversionRequest::file(output_dir, html_file)).await
    }

    /// Runs a conversion and folds any error into the returned result.
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        Self::report(self.try_convert(request))
    }

    pub async fn convert_async(&self, request: &ConversionRequest) -> ConversionResult {
        Self::report(self.try_convert_async(request).await)
    }

    /// Runs a conversion, returning the PDF bytes or a structured error.
    #[instrument(skip_all, fields(chrome = %self.chrome.describe()))]
    pub fn try_convert(&self, request: &ConversionRequest) -> Result<Vec<u8>> {
        Self::check_output_dir(&request.output_dir)?;
        let name = ArtifactName::generate();
        let mut artifacts = Artifacts::new(self.options.keep_artifacts);
        let input = match &request.input {
            Input::Html(html) => {
                let (mut file, path) = artifacts.create_html(&request.output_dir, &name)?;
                file.write_all(html.as_bytes()).map_err(ErrorKind::Io)?;
                path
            },
            Input::File(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::InputNotFound(path.clone()));
                }
                path.clone()
            },
        };
        let output = artifacts.expect_pdf(&request.output_dir, &name)?;
        tracing::debug!(id = %name, input = %input.display(), output = %output.display(), "Rendering HTML to PDF");

        let status = self.run(self.command(&input, &output))?;
        Self::log_exit(status);

        if !wait_for_file(&output, &self.options.poll) {
            exn::bail!(ErrorKind::PdfNotFound(output));
        }
        let bytes = std::fs::read(&output).map_err(ErrorKind::Io)?;
        tracing::info!(id = %name, bytes = bytes.len(), "PDF generated");
        Ok(bytes)
    }

    /// Async counterpart of [`try_convert`](Self::try_convert). Dropping the
    /// future kills Chrome and removes the intermediate files.
    #[instrument(skip_all, fields(chrome = %self.chrome.describe()))]
    pub async fn try_convert_async(&self, request: &ConversionRequest) -> Result<Vec<u8>> {
        Self::check_output_dir_async(&request.output_dir).await?;
        let name = ArtifactName::generate();
        let mut artifacts = Artifacts::new(self.options.keep_artifacts);
        let input = match &request.input {
            Input::Html(html) => {
                let (file, path) = artifacts.create_html(&request.output_dir, &name)?;
                let mut file = tokio::fs::File::from_std(file);
                file.write_all(html.as_bytes()).await.map_err(ErrorKind::Io)?;
                // Tokio files write in the background; make sure Chrome reads everything.
                file.flush().await.map_err(ErrorKind::Io)?;
                path
            },
            Input::File(path) => {
                let is_file = tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file());
                if !is_file {
                    exn::bail!(ErrorKind::InputNotFound(path.clone()));
                }
                path.clone()
            },
        };
        let output = artifacts.expect_pdf(&request.output_dir, &name)?;
        tracing::debug!(id = %name, input = %input.display(), output = %output.display(), "Rendering HTML to PDF");

        let status = self.run_async(self.command(&input, &output)).await?;
        Self::log_exit(status);

        if !wait_for_file_async(&output, &self.options.poll).await {
            exn::bail!(ErrorKind::PdfNotFound(output));
        }
        let bytes = tokio::fs::read(&output).await.map_err(ErrorKind::Io)?;
        tracing::info!(id = %name, bytes = bytes.len(), "PDF generated");
        Ok(bytes)
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = self.chrome.print_command(input, output, &self.options.extra_args);
        command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        command
    }

    fn run(&self, mut command: Command) -> Result<ExitStatus> {
        let mut child = command.spawn().map_err(ErrorKind::Launch)?;
        match self.options.process_timeout {
            None => Ok(child.wait().map_err(ErrorKind::Io)?),
            Some(timeout) => Self::wait_with_timeout(&mut child, timeout),
        }
    }

    async fn run_async(&self, command: Command) -> Result<ExitStatus> {
        let mut command = tokio::process::Command::from(command);
        command.kill_on_drop(true);
        let mut child = command.spawn().map_err(ErrorKind::Launch)?;
        let Some(timeout) = self.options.process_timeout else {
            return Ok(child.wait().await.map_err(ErrorKind::Io)?);
        };
        let waited = tokio::time::timeout(timeout, child.wait()).await;
        match waited {
            Ok(status) => Ok(status.map_err(ErrorKind::Io)?),
            Err(_) => {
                // Chrome may exit between the timeout and the kill; either way it's gone.
                _ = child.kill().await;
                exn::bail!(ErrorKind::ChromeTimeout(timeout));
            },
        }
    }

    fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(ErrorKind::Io)? {
                return Ok(status);
            }
            if started.elapsed() >= timeout {
                _ = child.kill();
                // Reap the process so it doesn't linger as a zombie.
                _ = child.wait();
                exn::bail!(ErrorKind::ChromeTimeout(timeout));
            }
            std::thread::sleep(PROCESS_POLL_INTERVAL.min(timeout));
        }
    }

    fn check_output_dir(dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            exn::bail!(ErrorKind::InvalidOutputDir(dir.to_path_buf()));
        }
        Ok(())
    }

    async fn check_output_dir_async(dir: &Path) -> Result<()> {
        if !tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir()) {
            exn::bail!(ErrorKind::InvalidOutputDir(dir.to_path_buf()));
        }
        Ok(())
    }

    fn log_exit(status: ExitStatus) {
        if status.success() {
            tracing::debug!(%status, "Chrome exited");
        } else {
            // Chrome's exit code is unreliable; the PDF appearing on disk is what counts.
            tracing::warn!(%status, "Chrome exited unsuccessfully; checking for output anyway");
        }
    }

    fn report(result: Result<Vec<u8>>) -> ConversionResult {
        if let Err(err) = &result {
            tracing::warn!(error = ?err, "PDF conversion failed");
        }
        result.into()
    }
}
