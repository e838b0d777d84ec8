//! Control/data line classification.

use super::RSYNC_HEADER;

/// A response split into control lines and data lines, each in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLines {
    /// Lines starting with `@RSYNCD:`.
    pub control: Vec<String>,
    /// Every other line (MOTD or content).
    pub data: Vec<String>,
}

/// Split a raw response into control and data lines.
///
/// The whole buffer is trimmed, then split on `\n`. Individual lines are kept
/// as they are. An absent or blank buffer yields no lines at all.
pub fn parse_lines(raw: Option<&str>) -> ParsedLines {
    let mut parsed = ParsedLines::default();

    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return parsed;
    };

    for line in raw.split('\n') {
        if line.starts_with(RSYNC_HEADER) {
            parsed.control.push(line.to_string());
        } else {
            parsed.data.push(line.to_string());
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(parse_lines(None), ParsedLines::default());
        assert_eq!(parse_lines(Some("")), ParsedLines::default());
        assert_eq!(parse_lines(Some(" \n\t\n")), ParsedLines::default());
    }

    #[test]
    fn test_only_control_lines() {
        let parsed = parse_lines(Some("@RSYNCD: 30\n@RSYNCD: OK\n"));
        assert_eq!(parsed.control, vec!["@RSYNCD: 30", "@RSYNCD: OK"]);
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_only_data_lines() {
        let parsed = parse_lines(Some("Welcome\nto the mirror\n"));
        assert!(parsed.control.is_empty());
        assert_eq!(parsed.data, vec!["Welcome", "to the mirror"]);
    }

    #[test]
    fn test_mixed_keeps_order_and_inner_lines() {
        let parsed = parse_lines(Some("\n  Hello\n@RSYNCD: 31.0\n\n  indented \nbye  \n"));
        assert_eq!(parsed.control, vec!["@RSYNCD: 31.0"]);
        assert_eq!(parsed.data, vec!["Hello", "", "  indented ", "bye"]);
    }

    #[test]
    fn test_is_pure() {
        let input = Some("motd\n@RSYNCD: 30\n");
        assert_eq!(parse_lines(input), parse_lines(input));
    }
}
