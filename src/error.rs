/*
 * Copyright 2018-2024 Felix Garcia Carballeira, Alejandro Calderon Mateos, Diego Camarmas Alonso,
 * Álvaro Guerrero Espinosa
 *
 * This file is part of CREATOR.
 *
 * CREATOR is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Lesser General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * CREATOR is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public License
 * along with CREATOR.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Module containing the definition of the translation errors
//!
//! The main type is [`Error`]

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use num_bigint::BigUint;

use std::fmt;

use crate::parser::{Opcode, Segment};
use crate::span::Span;

mod utils;
use utils::{get_similar, Colored, DisplayList, OperandNum};

/// Broad classification of the errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The command is syntactically invalid
    Parse,
    /// The command is well formed but can't be translated
    Semantic,
    /// The label allocator ran out of labels
    Exhaustion,
}

/// Error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    UnexpectedCharacter(Option<char>),
    UnknownCommand(String),
    IncorrectOperandNumber {
        command: Opcode,
        expected: usize,
        found: usize,
    },
    ExpectedInteger(String),
    ExpectedSymbol(String),
    IntegerOutOfRange(BigUint, u16),
    InvalidSymbol(String),
    UnknownSegment(String),
    PopConstant,
    AddressOutOfRange {
        segment: Segment,
        index: u16,
    },
    NotAPointer(Segment),
    LabelsExhausted,
    ReservedSymbol(String),
    InvalidUnitName(String),
}

/// Information about the error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    /// Location in the unit source that produced the error
    pub span: Span,
    /// Type of the error
    pub kind: Box<Kind>,
}

/// Translation error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// Name of the translation unit containing the error
    pub unit: String,
    /// Line number (1-based) of the command that produced the error
    pub line: usize,
    /// Information about the error
    pub error: Data,
}

impl Kind {
    /// Adds a span to the error kind, promoting it to an [`Data`]
    ///
    /// # Parameters
    ///
    /// * `span`: location in the unit source that caused the error
    #[must_use]
    pub fn add_span(self, span: Span) -> Data {
        Data {
            span,
            kind: Box::new(self),
        }
    }

    /// Gets the category of this error
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::UnexpectedCharacter(..)
            | Self::UnknownCommand(..)
            | Self::IncorrectOperandNumber { .. }
            | Self::ExpectedInteger(..)
            | Self::ExpectedSymbol(..)
            | Self::IntegerOutOfRange(..)
            | Self::InvalidSymbol(..)
            | Self::InvalidUnitName(..) => Category::Parse,
            Self::UnknownSegment(..)
            | Self::PopConstant
            | Self::AddressOutOfRange { .. }
            | Self::NotAPointer(..)
            | Self::ReservedSymbol(..) => Category::Semantic,
            Self::LabelsExhausted => Category::Exhaustion,
        }
    }

    /// Gets the numeric error code of this error
    const fn error_code(&self) -> u32 {
        match self {
            Self::UnexpectedCharacter(..) => 1,
            Self::UnknownCommand(..) => 2,
            Self::IncorrectOperandNumber { .. } => 3,
            Self::ExpectedInteger(..) => 4,
            Self::ExpectedSymbol(..) => 5,
            Self::IntegerOutOfRange(..) => 6,
            Self::InvalidSymbol(..) => 7,
            Self::UnknownSegment(..) => 8,
            Self::PopConstant => 9,
            Self::AddressOutOfRange { .. } => 10,
            Self::LabelsExhausted => 11,
            Self::NotAPointer(..) => 12,
            Self::ReservedSymbol(..) => 13,
            Self::InvalidUnitName(..) => 14,
        }
    }

    /// Gets a note with extra information about the error if available
    fn note(&self) -> Option<String> {
        Some(match self {
            Self::IntegerOutOfRange(_, max) => format!("Allowed range is [0, {max}]"),
            Self::InvalidSymbol(..) | Self::InvalidUnitName(..) => {
                "Symbols can contain letters, digits, `_`, `.`, `$` and `:`, and can't start \
                 with a digit"
                    .into()
            }
            Self::ReservedSymbol(..) => {
                "The stack pointer, segment pointers, scratch cells and static variables can't \
                 be used as labels"
                    .into()
            }
            Self::PopConstant => "The constant segment is read-only".into(),
            Self::NotAPointer(..) => {
                "Function calls save and restore the base addresses of the argument, local, \
                 this and that segments"
                    .into()
            }
            _ => return None,
        })
    }

    /// Gets a hint about how to fix the error if available
    fn hint(&self, color: bool) -> Option<String> {
        Some(match self {
            Self::UnknownCommand(s) => {
                let names = get_similar(s, Opcode::ALL.iter().map(|op| op.name()));
                format!("Did you mean {}?", DisplayList::non_empty(names, color)?)
            }
            Self::UnknownSegment(s) => {
                let names = get_similar(s, Segment::ALL.iter().map(|seg| seg.name()));
                format!("Did you mean {}?", DisplayList::non_empty(names, color)?)
            }
            Self::IncorrectOperandNumber {
                expected, found, ..
            } => {
                let (msg, n) = if expected > found {
                    ("adding the missing", expected - found)
                } else {
                    ("removing the extra", found - expected)
                };
                let color = color.then_some(Color::Green);
                format!("Consider {msg} {}", OperandNum(n, color))
            }
            _ => return None,
        })
    }

    /// Gets the label text describing the error
    fn label(&self, color: bool) -> String {
        let red = color.then_some(Color::Red);
        match self {
            Self::UnexpectedCharacter(..) => "Unexpected character".into(),
            Self::UnknownCommand(..) => "Unknown command".into(),
            Self::IncorrectOperandNumber { found, .. } => {
                format!("This command has {}", OperandNum(*found, red))
            }
            Self::ExpectedInteger(..) => "Expected an integer".into(),
            Self::ExpectedSymbol(..) => "Expected a symbol".into(),
            Self::IntegerOutOfRange(val, _) => {
                format!("This integer has value {}", Colored(val, red))
            }
            Self::InvalidSymbol(..) => "Invalid symbol".into(),
            Self::UnknownSegment(..) => "Unknown segment".into(),
            Self::PopConstant => "Can't pop into this segment".into(),
            Self::AddressOutOfRange { .. } => "This element isn't addressable".into(),
            Self::NotAPointer(..) => "While translating this command".into(),
            Self::LabelsExhausted => "While generating labels for this command".into(),
            Self::ReservedSymbol(..) => "This symbol is already in use".into(),
            Self::InvalidUnitName(..) => "In this unit".into(),
        }
    }

    /// Gets the error message of this error
    fn msg(&self, color: bool) -> String {
        let red = color.then_some(Color::Red);
        let blue = color.then_some(Color::BrightBlue);
        match self {
            Self::UnexpectedCharacter(Some(c)) => {
                format!("Unexpected character {}", Colored(c, red))
            }
            Self::UnexpectedCharacter(None) => "Unexpected end of line".into(),
            Self::UnknownCommand(s) => format!("Command {} isn't defined", Colored(s, red)),
            Self::IncorrectOperandNumber {
                command,
                expected,
                found,
            } => format!(
                "Incorrect amount of operands for {}, expected {} but found {}",
                Colored(command.name(), blue),
                Colored(expected, blue),
                Colored(found, red),
            ),
            Self::ExpectedInteger(s) => format!(
                "Expected a non-negative integer but found {}",
                Colored(s, red)
            ),
            Self::ExpectedSymbol(s) => format!("Expected a symbol but found {}", Colored(s, red)),
            Self::IntegerOutOfRange(val, _) => {
                format!("Value {} is outside of the valid range", Colored(val, red))
            }
            Self::InvalidSymbol(s) => format!("Symbol {} isn't valid", Colored(s, red)),
            Self::UnknownSegment(s) => format!("Segment {} isn't defined", Colored(s, red)),
            Self::PopConstant => format!(
                "Can't pop into the {} segment",
                Colored(Segment::Constant.name(), red)
            ),
            Self::AddressOutOfRange { segment, index } => format!(
                "Element {} of segment {} is outside of the addressable memory",
                Colored(index, red),
                Colored(segment.name(), blue),
            ),
            Self::NotAPointer(segment) => format!(
                "Segment {} must be addressed through a pointer in the target",
                Colored(segment.name(), red)
            ),
            Self::LabelsExhausted => "Ran out of unique labels".into(),
            Self::ReservedSymbol(s) => format!(
                "Symbol {} is reserved and can't be declared",
                Colored(s, red)
            ),
            Self::InvalidUnitName(s) => {
                format!("Unit name {} isn't a valid symbol", Colored(s, red))
            }
        }
    }
}

impl Data {
    /// Attaches the location of the command that produced the error, promoting it to an
    /// [`Error`]
    ///
    /// # Parameters
    ///
    /// * `unit`: name of the translation unit
    /// * `line`: line number of the command
    #[must_use]
    pub fn locate(self, unit: &str, line: usize) -> Error {
        Error {
            unit: unit.to_owned(),
            line,
            error: self,
        }
    }
}

impl Error {
    /// Gets the type of the error
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.error.kind
    }

    /// Gets the category of the error
    #[must_use]
    pub fn category(&self) -> Category {
        self.error.kind.category()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = &self.error.kind;
        write!(
            f,
            "{}:{}: error[E{:02}]: {}",
            self.unit,
            self.line,
            kind.error_code(),
            kind.msg(false)
        )
    }
}

impl std::error::Error for Error {}

impl crate::RenderError for Error {
    fn format(self, filename: &str, src: &str, mut buffer: &mut Vec<u8>, color: bool) {
        let span = self.error.span.clone();
        let kind = self.error.kind;
        let mut report = Report::build(ReportKind::Error, (filename, span.clone()))
            .with_config(Config::default().with_color(color))
            .with_code(format!("E{:02}", kind.error_code()))
            .with_message(kind.msg(color))
            .with_label(
                Label::new((filename, span))
                    .with_message(kind.label(color))
                    .with_color(Color::Red),
            );
        if let Some(note) = kind.note() {
            report.set_note(note);
        }
        if let Some(hint) = kind.hint(color) {
            report.set_help(hint);
        }
        report
            .finish()
            .write((filename, Source::from(src)), &mut buffer)
            .expect("Writing to an in-memory vector shouldn't fail");
    }
}

/// Trait for promoting an error [`Kind`] wrapped in a [`Result`] to an [`Data`]
pub(crate) trait SpannedErr {
    /// Type wrapped in the Ok variant
    type T;

    /// Adds a span to the error kind, promoting it to an [`Data`]
    ///
    /// # Parameters
    ///
    /// * `span`: location in the unit source that caused the error
    fn add_span(self, span: &Span) -> Result<Self::T, Data>;
}

impl<T> SpannedErr for Result<T, Kind> {
    type T = T;
    fn add_span(self, span: &Span) -> Result<T, Data> {
        self.map_err(|e| e.add_span(span.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::RenderError as _;

    #[test]
    fn categories() {
        assert_eq!(Kind::UnknownCommand("x".into()).category(), Category::Parse);
        assert_eq!(Kind::ExpectedInteger("x".into()).category(), Category::Parse);
        assert_eq!(Kind::PopConstant.category(), Category::Semantic);
        assert_eq!(Kind::UnknownSegment("x".into()).category(), Category::Semantic);
        assert_eq!(Kind::NotAPointer(Segment::Temp).category(), Category::Semantic);
        assert_eq!(Kind::LabelsExhausted.category(), Category::Exhaustion);
        assert_eq!(Kind::ReservedSymbol("SP".into()).category(), Category::Semantic);
        assert_eq!(Kind::InvalidUnitName("a-b".into()).category(), Category::Parse);
    }

    #[test]
    fn display() {
        let err = Kind::UnknownSegment("locl".into())
            .add_span(5..9)
            .locate("Main", 12);
        assert_eq!(
            err.to_string(),
            "Main:12: error[E08]: Segment `locl` isn't defined"
        );
        assert_eq!(err.category(), Category::Semantic);
    }

    #[test]
    fn hints() {
        let hint = Kind::UnknownCommand("pussh".into()).hint(false);
        assert_eq!(hint, Some("Did you mean `push`?".into()));
        let hint = Kind::UnknownSegment("locl".into()).hint(false);
        assert_eq!(hint, Some("Did you mean `local`?".into()));
        let hint = Kind::IncorrectOperandNumber {
            command: Opcode::Push,
            expected: 2,
            found: 1,
        }
        .hint(false);
        assert_eq!(hint, Some("Consider adding the missing `1` operand".into()));
        assert_eq!(Kind::UnknownCommand("qwertyuiop".into()).hint(false), None);
    }

    #[test]
    fn render() {
        let src = "push constant 1\npop constant 0\n";
        let err = Kind::PopConstant.add_span(16..30).locate("Main", 2);
        let rendered = err.render("Main.vm", src, false);
        assert!(rendered.contains("E09"), "{rendered}");
        assert!(rendered.contains("Can't pop into the `constant` segment"), "{rendered}");
        assert!(rendered.contains("Main.vm"), "{rendered}");
    }
}
