//! Extraction of output tokens from build-engine progress lines.
//!
//! The line format is owned by the build engine and undocumented, so all of
//! the string scraping lives behind [`ActionLineParser`].

/// Framing marker separating a progress counter from the action text.
pub const PROGRESS_DELIMITER: &str = "] ";

/// Command word ninja prints in front of stamp outputs in verbose mode.
const STAMP_COMMAND_PREFIX: &str = "touch ";

/// Pulls the output token out of one line of a staleness report.
pub trait ActionLineParser {
    /// The token to look up in the registry, or `None` to ignore the line.
    fn output_token<'a>(&self, line: &'a str) -> Option<&'a str>;
}

/// Parser for `ninja -n -v` output such as `[3/10] touch obj/pkg/foo.stamp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NinjaLineParser;

impl ActionLineParser for NinjaLineParser {
    fn output_token<'a>(&self, line: &'a str) -> Option<&'a str> {
        let idx = line.rfind(PROGRESS_DELIMITER)?;
        let token = &line[idx + PROGRESS_DELIMITER.len()..];
        let token = token.strip_prefix(STAMP_COMMAND_PREFIX).unwrap_or(token);
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}
