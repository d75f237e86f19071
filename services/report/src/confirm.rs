use std::io::{self, BufRead, Write};
use std::path::Path;

/// Overwrite gate for the canonical report file. Injected so the report
/// pipeline stays testable and non-interactive callers can bypass the
/// prompt entirely.
pub trait OverwritePolicy {
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

/// Always proceed. Used with `--yes` and by the scheduled/dashboard path.
pub struct AlwaysAllow;

impl OverwritePolicy for AlwaysAllow {
    fn confirm_overwrite(&self, _path: &Path) -> bool {
        true
    }
}

/// Ask on stdin; anything but y/yes declines.
pub struct PromptStdin;

impl OverwritePolicy for PromptStdin {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        print!("Overwrite {}? [y/N] ", path.display());
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
