//! Module containing the preprocessing of VM source code into the lines that hold commands

/// Line of source code containing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Line number (1-based) in the unit source
    pub number: usize,
    /// Text of the command, without comments or surrounding whitespace
    pub text: &'a str,
    /// Character offset of the start of `text` in the unit source
    pub offset: usize,
}

/// Marker starting a comment that extends to the end of the line
const COMMENT: &str = "//";

/// Splits VM source code into the lines containing commands. Comments and surrounding whitespace
/// are removed, and blank lines are skipped
///
/// # Parameters
///
/// * `src`: source code of a translation unit
pub fn lines(src: &str) -> impl Iterator<Item = Line<'_>> {
    src.split_inclusive('\n')
        .scan(0, |start, raw| {
            let offset = *start;
            *start += raw.chars().count();
            Some((offset, raw))
        })
        .enumerate()
        .filter_map(|(i, (offset, raw))| {
            let code = raw.find(COMMENT).map_or(raw, |end| &raw[..end]);
            let text = code.trim();
            if text.is_empty() {
                return None;
            }
            let leading = code.len() - code.trim_start().len();
            Some(Line {
                number: i + 1,
                text,
                offset: offset + code[..leading].chars().count(),
            })
        })
}
