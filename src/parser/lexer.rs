use chumsky::prelude::*;
use num_bigint::BigUint;
use std::fmt;

use crate::span::Spanned;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Token {
    Integer(BigUint),
    Symbol(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Symbol(s) => write!(f, "{s}"),
        }
    }
}

/// Checks if a character can start a symbol
const fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '$' | ':')
}

/// Checks if a character can be used after the first character of a symbol. Dashes are accepted
/// so command names such as `if-goto` lex as a single token
const fn is_symbol_char(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit() || c == '-'
}

#[must_use]
pub fn lexer() -> impl Parser<char, Vec<Spanned<Token>>, Error = Simple<char>> {
    // Non-negative decimal integers, with arbitrary precision so the range can be checked later
    let integer = text::digits(10)
        .try_map(|digits: String, span| {
            digits
                .parse::<BigUint>()
                .map(Token::Integer)
                .map_err(|e| Simple::custom(span, e.to_string()))
        })
        .labelled("integer");

    // Command names, segment names, labels and function names
    let symbol = filter(|c: &char| is_symbol_start(*c))
        .chain(filter(|c: &char| is_symbol_char(*c)).repeated())
        .collect::<String>()
        .map(Token::Symbol)
        .labelled("symbol");

    // Operands must be separated by at least one whitespace character
    let separator = filter(|c: &char| c.is_whitespace()).repeated().at_least(1);

    integer
        .or(symbol)
        .map_with_span(|tok, span| (tok, span))
        .separated_by(separator)
        .padded()
        .then_ignore(end())
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(src: &str) -> Result<Vec<Spanned<Token>>, Vec<Simple<char>>> {
        lexer().parse(src)
    }

    fn sym(s: &str) -> Token {
        Token::Symbol(s.into())
    }

    #[test]
    fn tokens() {
        assert_eq!(
            lex("push constant 7"),
            Ok(vec![
                (sym("push"), 0..4),
                (sym("constant"), 5..13),
                (Token::Integer(7u8.into()), 14..15),
            ])
        );
        assert_eq!(lex("if-goto LOOP$1"), Ok(vec![(sym("if-goto"), 0..7), (sym("LOOP$1"), 8..14)]));
        assert_eq!(
            lex("call  Math.multiply\t2"),
            Ok(vec![
                (sym("call"), 0..4),
                (sym("Math.multiply"), 6..19),
                (Token::Integer(2u8.into()), 20..21),
            ])
        );
        assert_eq!(lex("add"), Ok(vec![(sym("add"), 0..3)]));
        assert_eq!(lex(""), Ok(vec![]));
    }

    #[test]
    fn big_integers() {
        let big: BigUint = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(
            lex("123456789012345678901234567890"),
            Ok(vec![(Token::Integer(big), 0..30)])
        );
        assert_eq!(lex("007"), Ok(vec![(Token::Integer(7u8.into()), 0..3)]));
    }

    #[test]
    fn errors() {
        let err = |src| lex(src).unwrap_err()[0].clone();
        let e = err("push constant -1");
        assert_eq!(e.span(), 14..15);
        assert_eq!(e.found(), Some(&'-'));
        let e = err("push local 12a");
        assert_eq!(e.span(), 13..14);
        assert_eq!(e.found(), Some(&'a'));
        assert_eq!(err("label #x").found(), Some(&'#'));
    }
}
