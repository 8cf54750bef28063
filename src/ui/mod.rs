//! Terminal widgets shared by the chat loop and `configure`.

use anyhow::Result;
use inquire::InquireError;

mod spinner;
mod theme;

pub use spinner::Spinner;
pub use theme::Style;

/// The answer to an interactive prompt, or `None` if the user backed out
/// with Escape or Ctrl+C.
///
/// Any other prompt failure (no TTY, I/O) is still an error.
pub fn answered<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(answer) => Ok(Some(answer)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
