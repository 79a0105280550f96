//! Piped stdin input source.

use std::sync::Arc;

use clap::ArgMatches;

use crate::collector::InputCollector;
use crate::env::{RealStdin, StdinReader};
use crate::InputError;

/// Reads the whole of stdin when it is piped.
///
/// When stdin is a terminal the source passes, so an interactive session
/// never blocks waiting for input nobody is going to type. Pipeline mode
/// feeds the text this source returns into the JSON binding reader.
///
/// # Example
///
/// ```ignore
/// use cmdshim_input::{InputChain, StdinSource};
///
/// // echo '{"ApiId":"abc"}' | shimdemo --pipeline graph get-api
/// let documents = InputChain::<String>::new()
///     .try_source(StdinSource::new())
///     .resolve(&matches)?;
/// ```
pub struct StdinSource<R: StdinReader + ?Sized = RealStdin> {
    reader: Arc<R>,
}

impl<R: StdinReader + ?Sized> Clone for StdinSource<R> {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
        }
    }
}

impl StdinSource<RealStdin> {
    /// Read from the process stdin.
    pub fn new() -> Self {
        Self::with_reader(RealStdin)
    }
}

impl Default for StdinSource<RealStdin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: StdinReader> StdinSource<R> {
    /// Read through a custom reader.
    pub fn with_reader(reader: R) -> Self {
        Self::shared(Arc::new(reader))
    }
}

impl<R: StdinReader + ?Sized> StdinSource<R> {
    /// Read through a reader shared with other parts of the application.
    pub fn shared(reader: Arc<R>) -> Self {
        Self { reader }
    }
}

impl<R: StdinReader + ?Sized + 'static> InputCollector<String> for StdinSource<R> {
    fn name(&self) -> &'static str {
        "stdin"
    }

    fn is_available(&self, _matches: &ArgMatches) -> bool {
        !self.reader.is_terminal()
    }

    fn collect(&self, _matches: &ArgMatches) -> Result<Option<String>, InputError> {
        read_if_piped(self.reader.as_ref())
    }
}

/// Read all of `reader` if it is piped and holds something besides whitespace.
///
/// The returned text is trimmed.
pub fn read_if_piped<R: StdinReader + ?Sized>(reader: &R) -> Result<Option<String>, InputError> {
    if reader.is_terminal() {
        return Ok(None);
    }

    let content = reader.read_to_string().map_err(InputError::StdinFailed)?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
