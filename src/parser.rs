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

//! Module containing the definition of the VM command parser
//!
//! Contains the definition of the commands, with the entry point for parsing being the
//! [`parse_line()`] function

use chumsky::Parser as _;
use num_traits::ToPrimitive;
use once_cell::sync::Lazy;
use regex::Regex;

use std::fmt;

use crate::error::{Data as ErrorData, Kind as ErrorKind};
use crate::span::{shift, Spanned};

mod lexer;
pub use lexer::Token;

/// Largest integer that can be loaded with a single `@value` instruction
pub const MAX_LITERAL: u16 = 0x7FFF;

/// Memory segments addressable by `push`/`pop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Argument,
    Local,
    This,
    That,
    Pointer,
    Temp,
    Constant,
    Static,
}

impl Segment {
    /// All the segments, in declaration order
    pub const ALL: [Self; 8] = [
        Self::Argument,
        Self::Local,
        Self::This,
        Self::That,
        Self::Pointer,
        Self::Temp,
        Self::Constant,
        Self::Static,
    ];

    /// Gets the name used for this segment in the source code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Argument => "argument",
            Self::Local => "local",
            Self::This => "this",
            Self::That => "that",
            Self::Pointer => "pointer",
            Self::Temp => "temp",
            Self::Constant => "constant",
            Self::Static => "static",
        }
    }

    /// Finds the segment with the given name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|seg| seg.name() == name)
    }
}

/// Operation codes of the VM language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Push,
    Pop,
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    Label,
    Goto,
    IfGoto,
    Function,
    Call,
    Return,
}

impl Opcode {
    /// All the operation codes, in declaration order
    pub const ALL: [Self; 17] = [
        Self::Push,
        Self::Pop,
        Self::Add,
        Self::Sub,
        Self::Neg,
        Self::Eq,
        Self::Gt,
        Self::Lt,
        Self::And,
        Self::Or,
        Self::Not,
        Self::Label,
        Self::Goto,
        Self::IfGoto,
        Self::Function,
        Self::Call,
        Self::Return,
    ];

    /// Gets the name used for this command in the source code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Label => "label",
            Self::Goto => "goto",
            Self::IfGoto => "if-goto",
            Self::Function => "function",
            Self::Call => "call",
            Self::Return => "return",
        }
    }

    /// Gets the amount of operands the command takes
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Push | Self::Pop | Self::Function | Self::Call => 2,
            Self::Label | Self::Goto | Self::IfGoto => 1,
            Self::Add
            | Self::Sub
            | Self::Neg
            | Self::Eq
            | Self::Gt
            | Self::Lt
            | Self::And
            | Self::Or
            | Self::Not
            | Self::Return => 0,
        }
    }

    /// Finds the operation code with the given name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// VM command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push(Segment, u16),
    Pop(Segment, u16),
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Command {
    /// Gets the operation code of the command
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Push(..) => Opcode::Push,
            Self::Pop(..) => Opcode::Pop,
            Self::Add => Opcode::Add,
            Self::Sub => Opcode::Sub,
            Self::Neg => Opcode::Neg,
            Self::Eq => Opcode::Eq,
            Self::Gt => Opcode::Gt,
            Self::Lt => Opcode::Lt,
            Self::And => Opcode::And,
            Self::Or => Opcode::Or,
            Self::Not => Opcode::Not,
            Self::Label(..) => Opcode::Label,
            Self::Goto(..) => Opcode::Goto,
            Self::IfGoto(..) => Opcode::IfGoto,
            Self::Function { .. } => Opcode::Function,
            Self::Call { .. } => Opcode::Call,
            Self::Return => Opcode::Return,
        }
    }

    /// Gets the symbol this command declares in the output program, if any
    #[must_use]
    pub fn declared_symbol(&self) -> Option<&str> {
        match self {
            Self::Label(name) | Self::Function { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode().name();
        match self {
            Self::Push(seg, i) | Self::Pop(seg, i) => write!(f, "{op} {} {i}", seg.name()),
            Self::Label(name) | Self::Goto(name) | Self::IfGoto(name) => write!(f, "{op} {name}"),
            Self::Function { name, locals: n } | Self::Call { name, args: n } => {
                write!(f, "{op} {name} {n}")
            }
            _ => write!(f, "{op}"),
        }
    }
}

/// Checks if a string can be used as a symbol in the output program
#[must_use]
pub fn is_symbol(s: &str) -> bool {
    static SYMBOL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Za-z_.$:][A-Za-z0-9_.$:]*$").expect("This shouldn't fail"));
    SYMBOL.is_match(s)
}

/// Validates that a symbol can be used as a label in the output program
fn symbol((token, span): &Spanned<Token>) -> Result<String, ErrorData> {
    match token {
        Token::Symbol(s) if is_symbol(s) => Ok(s.clone()),
        Token::Symbol(s) => Err(ErrorKind::InvalidSymbol(s.clone()).add_span(span.clone())),
        Token::Integer(_) => {
            Err(ErrorKind::ExpectedSymbol(token.to_string()).add_span(span.clone()))
        }
    }
}

/// Converts an integer operand, checking that it can be used as a literal
fn integer((token, span): &Spanned<Token>) -> Result<u16, ErrorData> {
    match token {
        Token::Integer(value) => value
            .to_u16()
            .filter(|&x| x <= MAX_LITERAL)
            .ok_or_else(|| {
                ErrorKind::IntegerOutOfRange(value.clone(), MAX_LITERAL).add_span(span.clone())
            }),
        Token::Symbol(s) => Err(ErrorKind::ExpectedInteger(s.clone()).add_span(span.clone())),
    }
}

/// Converts a segment name operand
fn segment((token, span): &Spanned<Token>) -> Result<Segment, ErrorData> {
    let name = token.to_string();
    Segment::from_name(&name).ok_or_else(|| ErrorKind::UnknownSegment(name).add_span(span.clone()))
}

/// Parses a single comment-free, non-empty source line into a command
///
/// # Parameters
///
/// * `line`: text of the line
/// * `offset`: character offset of the start of the line in the unit source, used to make the
///   spans relative to the whole unit
///
/// # Errors
///
/// Errors if the line contains invalid characters, the command doesn't exist, or its operands
/// don't match the shape expected by the command
pub fn parse_line(line: &str, offset: usize) -> Result<Spanned<Command>, ErrorData> {
    let line_span = shift(0..line.chars().count(), offset);
    let tokens = lexer::lexer().parse(line).map_err(|errs| {
        let (found, span) = errs
            .into_iter()
            .next()
            .map_or((None, line_span.end..line_span.end), |e| {
                (e.found().copied(), shift(e.span(), offset))
            });
        ErrorKind::UnexpectedCharacter(found).add_span(span)
    })?;
    let mut tokens = tokens
        .into_iter()
        .map(|(token, span)| (token, shift(span, offset)));

    let Some((name, name_span)) = tokens.next() else {
        return Err(ErrorKind::UnexpectedCharacter(None).add_span(line_span));
    };
    let opcode = match &name {
        Token::Symbol(name) => Opcode::from_name(name),
        Token::Integer(_) => None,
    }
    .ok_or_else(|| ErrorKind::UnknownCommand(name.to_string()).add_span(name_span))?;
    let operands: Vec<_> = tokens.collect();

    let command = match (opcode, operands.as_slice()) {
        (Opcode::Push, [seg, i]) => Command::Push(segment(seg)?, integer(i)?),
        (Opcode::Pop, [seg, i]) => Command::Pop(segment(seg)?, integer(i)?),
        (Opcode::Add, []) => Command::Add,
        (Opcode::Sub, []) => Command::Sub,
        (Opcode::Neg, []) => Command::Neg,
        (Opcode::Eq, []) => Command::Eq,
        (Opcode::Gt, []) => Command::Gt,
        (Opcode::Lt, []) => Command::Lt,
        (Opcode::And, []) => Command::And,
        (Opcode::Or, []) => Command::Or,
        (Opcode::Not, []) => Command::Not,
        (Opcode::Label, [name]) => Command::Label(symbol(name)?),
        (Opcode::Goto, [name]) => Command::Goto(symbol(name)?),
        (Opcode::IfGoto, [name]) => Command::IfGoto(symbol(name)?),
        (Opcode::Function, [name, n]) => Command::Function {
            name: symbol(name)?,
            locals: integer(n)?,
        },
        (Opcode::Call, [name, n]) => Command::Call {
            name: symbol(name)?,
            args: integer(n)?,
        },
        (Opcode::Return, []) => Command::Return,
        (command, operands) => {
            let expected = command.arity();
            // Point at the extra operands if there are any, or at the whole command otherwise
            let span = match operands.get(expected..) {
                Some([(_, first), .., (_, last)]) => first.start..last.end,
                Some([(_, only)]) => only.clone(),
                _ => line_span,
            };
            return Err(ErrorKind::IncorrectOperandNumber {
                command,
                expected,
                found: operands.len(),
            }
            .add_span(span));
        }
    };
    Ok((command, line_span))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::Span;
    use num_bigint::BigUint;

    fn parse(src: &str) -> Result<Command, ErrorData> {
        parse_line(src, 0).map(|(command, _)| command)
    }

    fn err(src: &str) -> (ErrorKind, Span) {
        let err = parse_line(src, 0).unwrap_err();
        (*err.kind, err.span)
    }

    #[test]
    fn stack_commands() {
        assert_eq!(parse("push constant 7"), Ok(Command::Push(Segment::Constant, 7)));
        assert_eq!(parse("push argument 2"), Ok(Command::Push(Segment::Argument, 2)));
        assert_eq!(parse("pop local 0"), Ok(Command::Pop(Segment::Local, 0)));
        assert_eq!(parse("pop static 32767"), Ok(Command::Pop(Segment::Static, 32767)));
        // Rejected later, when translating
        assert_eq!(parse("pop constant 3"), Ok(Command::Pop(Segment::Constant, 3)));
    }

    #[test]
    fn arithmetic_commands() {
        let commands = [
            ("add", Command::Add),
            ("sub", Command::Sub),
            ("neg", Command::Neg),
            ("eq", Command::Eq),
            ("gt", Command::Gt),
            ("lt", Command::Lt),
            ("and", Command::And),
            ("or", Command::Or),
            ("not", Command::Not),
            ("return", Command::Return),
        ];
        for (src, command) in commands {
            assert_eq!(parse(src), Ok(command), "`{src}`");
        }
    }

    #[test]
    fn control_commands() {
        assert_eq!(parse("label LOOP"), Ok(Command::Label("LOOP".into())));
        assert_eq!(parse("goto Main.end$2"), Ok(Command::Goto("Main.end$2".into())));
        assert_eq!(parse("if-goto IF_TRUE0"), Ok(Command::IfGoto("IF_TRUE0".into())));
        assert_eq!(
            parse("function Math.multiply 2"),
            Ok(Command::Function {
                name: "Math.multiply".into(),
                locals: 2
            })
        );
        assert_eq!(
            parse("call Math.multiply 2"),
            Ok(Command::Call {
                name: "Math.multiply".into(),
                args: 2
            })
        );
    }

    #[test]
    fn spans() {
        assert_eq!(
            parse_line("push  local 3", 20),
            Ok((Command::Push(Segment::Local, 3), 20..33))
        );
        let err = parse_line("pop locl 1", 10).unwrap_err();
        assert_eq!(err.span, 14..18);
    }

    #[test]
    fn unknown_command() {
        assert_eq!(err("pussh constant 1"), (ErrorKind::UnknownCommand("pussh".into()), 0..5));
        assert_eq!(err("12 add"), (ErrorKind::UnknownCommand("12".into()), 0..2));
    }

    #[test]
    fn operand_number() {
        let arity = |command, expected, found| ErrorKind::IncorrectOperandNumber {
            command,
            expected,
            found,
        };
        assert_eq!(err("push constant"), (arity(Opcode::Push, 2, 1), 0..13));
        assert_eq!(err("add 1"), (arity(Opcode::Add, 0, 1), 4..5));
        assert_eq!(err("label a b c"), (arity(Opcode::Label, 1, 3), 8..11));
        assert_eq!(err("return x"), (arity(Opcode::Return, 0, 1), 7..8));
        assert_eq!(err("call f"), (arity(Opcode::Call, 2, 1), 0..6));
    }

    #[test]
    fn operand_types() {
        assert_eq!(
            err("push constant x"),
            (ErrorKind::ExpectedInteger("x".into()), 14..15)
        );
        assert_eq!(
            err("function f n"),
            (ErrorKind::ExpectedInteger("n".into()), 11..12)
        );
        assert_eq!(err("goto 12"), (ErrorKind::ExpectedSymbol("12".into()), 5..7));
        assert_eq!(
            err("label a-b"),
            (ErrorKind::InvalidSymbol("a-b".into()), 6..9)
        );
        assert_eq!(err("push temp1 1"), (ErrorKind::UnknownSegment("temp1".into()), 5..10));
        assert_eq!(err("push 3 1"), (ErrorKind::UnknownSegment("3".into()), 5..6));
    }

    #[test]
    fn integer_range() {
        assert_eq!(
            err("push constant 32768"),
            (
                ErrorKind::IntegerOutOfRange(32768u16.into(), MAX_LITERAL),
                14..19
            )
        );
        let big: BigUint = "99999999999999999999".parse().unwrap();
        assert_eq!(
            err("call f 99999999999999999999"),
            (ErrorKind::IntegerOutOfRange(big, MAX_LITERAL), 7..27)
        );
    }

    #[test]
    fn invalid_characters() {
        assert_eq!(
            err("push constant -1"),
            (ErrorKind::UnexpectedCharacter(Some('-')), 14..15)
        );
        assert_eq!(err(""), (ErrorKind::UnexpectedCharacter(None), 0..0));
    }

    #[test]
    fn display() {
        for src in [
            "push constant 7",
            "pop that 2",
            "add",
            "if-goto LOOP",
            "function Main.main 3",
            "call Main.fib 1",
            "return",
        ] {
            let command = parse(src).unwrap();
            assert_eq!(command.to_string(), src);
        }
    }

    #[test]
    fn declared_symbols() {
        assert_eq!(parse("label X").unwrap().declared_symbol(), Some("X"));
        assert_eq!(parse("function f 0").unwrap().declared_symbol(), Some("f"));
        assert_eq!(parse("goto X").unwrap().declared_symbol(), None);
        assert_eq!(parse("call f 0").unwrap().declared_symbol(), None);
    }

    #[test]
    fn symbols() {
        for s in ["Main", "Sys.init", "_x", "$tmp", "a:b", "Main.v2"] {
            assert!(is_symbol(s), "{s}");
        }
        for s in ["", "1abc", "my-prog", "a b", "é"] {
            assert!(!is_symbol(s), "{s}");
        }
    }
}
