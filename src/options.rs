//! Leniency switches consumed by the parser.

/// Configuration for [`RawHttp`](crate::RawHttp).
///
/// The default instance is lenient: it tolerates the deviations commonly
/// found in hand-written and legacy HTTP traffic. [`RawHttpOptions::strict`]
/// turns every switch off, accepting only messages that follow RFC 7230
/// framing to the letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHttpOptions {
    /// A bare LF terminates a metadata line; otherwise only CRLF does.
    pub allow_new_line_without_return: bool,

    /// Empty line(s) before the start-line are skipped rather than treated
    /// as an empty start-line.
    pub ignore_leading_empty_line: bool,

    /// A start-line with only two whitespace-separated tokens is accepted
    /// and assigned HTTP/1.1.
    pub insert_http_version_if_missing: bool,

    /// A request without a Host header is accepted when its request-target
    /// carries an authority, by synthesizing the header from the URI host.
    pub insert_host_header_if_missing: bool,
}

impl Default for RawHttpOptions {
    fn default() -> Self {
        Self {
            allow_new_line_without_return: true,
            ignore_leading_empty_line: true,
            insert_http_version_if_missing: true,
            insert_host_header_if_missing: true,
        }
    }
}

impl RawHttpOptions {
    /// All leniency switches off.
    pub fn strict() -> Self {
        Self {
            allow_new_line_without_return: false,
            ignore_leading_empty_line: false,
            insert_http_version_if_missing: false,
            insert_host_header_if_missing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_lenient() {
        let options = RawHttpOptions::default();
        assert!(options.allow_new_line_without_return);
        assert!(options.ignore_leading_empty_line);
        assert!(options.insert_http_version_if_missing);
        assert!(options.insert_host_header_if_missing);
    }

    #[test]
    fn strict_turns_everything_off() {
        let options = RawHttpOptions::strict();
        assert!(!options.allow_new_line_without_return);
        assert!(!options.ignore_leading_empty_line);
        assert!(!options.insert_http_version_if_missing);
        assert!(!options.insert_host_header_if_missing);
    }
}
