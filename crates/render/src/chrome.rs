use crate::error::{ErrorKind, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Flags passed on every invocation, ahead of `--print-to-pdf`.
const HEADLESS_FLAGS: [&str; 2] = ["--headless", "--disable-gpu"];
/// Flags suppressing the header/footer Chrome prints on each page.
const NO_HEADER_FOOTER_FLAGS: [&str; 2] = ["--no-pdf-header-footer", "--print-to-pdf-no-footer"];

/// Represents a Chrome/Chromium executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chrome {
    /// A directly executable binary.
    Binary { path: PathBuf },
    /// A Flatpak-installed application.
    Flatpak { app_id: String },
}
impl Chrome {
    /// A renderer at an explicit, caller-configured path.
    pub fn binary(path: impl Into<PathBuf>) -> Self {
        Self::Binary { path: path.into() }
    }

    pub fn discover() -> Result<Self> {
        // Check for direct executables
        // TODO: What are the executable names on Windows? macOS?
        let executables = ["google-chrome", "chromium", "chromium-browser", "chrome"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(chrome = %path.display(), "Discovered Chrome executable in PATH");
                return Ok(Self::Binary { path });
            }
        }
        tracing::info!("Chrome executable not found in PATH");
        if let Ok(flatpak) = which::which("flatpak") {
            tracing::trace!(flatpak = %flatpak.display(), "Discovered Flatpak on system; searching installed apps");
            // Check Flatpak installations
            let flatpak_apps = ["com.google.Chrome", "org.chromium.Chromium"];
            for app_id in flatpak_apps {
                if Command::new(&flatpak).args(["info", app_id]).output().is_ok_and(|o| o.status.success()) {
                    return Ok(Self::Flatpak { app_id: app_id.to_string() });
                }
            }
        } else {
            tracing::info!("Flatpak not found; skipping containerized Chrome checks.");
        }
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    /// Builds the command that prints `input` to `output` as a PDF.
    ///
    /// Every path is its own argv entry, so nothing needs shell quoting.
    pub(crate) fn print_command(&self, input: &Path, output: &Path, extra_args: &[String]) -> Command {
        let mut command = match self {
            Self::Binary { path } => Command::new(path),
            Self::Flatpak { app_id } => {
                let mut command = Command::new("flatpak");
                command.args(["run", app_id.as_str()]);
                command
            },
        };
        command.args(Self::print_args(input, output, extra_args));
        command
    }

    fn print_args(input: &Path, output: &Path, extra_args: &[String]) -> Vec<OsString> {
        let mut print_to_pdf = OsString::from("--print-to-pdf=");
        print_to_pdf.push(output);
        let mut args: Vec<OsString> = HEADLESS_FLAGS.iter().map(OsString::from).collect();
        args.push(print_to_pdf);
        args.extend(NO_HEADER_FOOTER_FLAGS.iter().map(OsString::from));
        args.extend(extra_args.iter().map(OsString::from));
        args.push(input.as_os_str().to_os_string());
        args
    }

    /// Human-readable name for log fields.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Binary { path } => path.display().to_string(),
            Self::Flatpak { app_id } => format!("flatpak:{app_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(command: &Command) -> Vec<String> {
        command.get_args().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn binary_command_has_fixed_flags_then_input() {
        let chrome = Chrome::binary("/opt/chrome/chrome");
        let command = chrome.print_command(Path::new("/out/in put.html"), Path::new("/out/abc.pdf"), &[]);
        assert_eq!(command.get_program(), "/opt/chrome/chrome");
        assert_eq!(
            args_of(&command),
            [
                "--headless",
                "--disable-gpu",
                "--print-to-pdf=/out/abc.pdf",
                "--no-pdf-header-footer",
                "--print-to-pdf-no-footer",
                "/out/in put.html",
            ]
        );
    }

    #[test]
    fn extra_args_precede_input() {
        let chrome = Chrome::binary("chrome");
        let extra = vec!["--no-sandbox".to_string()];
        let command = chrome.print_command(Path::new("in.html"), Path::new("out.pdf"), &extra);
        let args = args_of(&command);
        assert_eq!(args[args.len() - 2], "--no-sandbox");
        assert_eq!(args.last().map(String::as_str), Some("in.html"));
    }

    #[test]
    fn flatpak_command_runs_app() {
        let chrome = Chrome::Flatpak { app_id: "org.chromium.Chromium".into() };
        let command = chrome.print_command(Path::new("in.html"), Path::new("out.pdf"), &[]);
        assert_eq!(command.get_program(), "flatpak");
        assert_eq!(args_of(&command)[..3], ["run", "org.chromium.Chromium", "--headless"]);
        assert_eq!(chrome.describe(), "flatpak:org.chromium.Chromium");
    }
}
