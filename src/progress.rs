/// Fetch progress reporting.
///
/// Animated spinner on a TTY, plain stderr lines otherwise.
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use std::time::Duration;

pub struct FetchProgress {
    spinner: Option<ProgressBar>,
}

impl FetchProgress {
    /// Starts reporting a fetch for `identifier`.
    pub fn start(identifier: &str) -> Self {
        let message = format!("Fetching posts for @{}", identifier);

        if std::io::stderr().is_terminal() {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(message);
            spinner.enable_steady_tick(Duration::from_millis(100));
            FetchProgress {
                spinner: Some(spinner),
            }
        } else {
            eprintln!("📥 {}", message);
            FetchProgress { spinner: None }
        }
    }

    /// Stops the spinner and prints the outcome line.
    pub fn finish(self, outcome: &str) {
        match self.spinner {
            Some(spinner) => spinner.finish_with_message(outcome.to_string()),
            None => eprintln!("{}", outcome),
        }
    }
}
