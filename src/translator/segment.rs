//! Module containing the resolution of segment elements to effective addresses

use crate::error::Kind as ErrorKind;
use crate::parser::{Segment, MAX_LITERAL};
use crate::target::{Addressing, Target};

/// Location of a segment element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location<'a> {
    /// Literal value with no memory backing it
    Literal(u16),
    /// Element at `*pointer + index`
    Indirect { pointer: &'a str, index: u16 },
    /// Element at a constant address
    Absolute(u16),
    /// Element at the address of a symbol
    Symbol(String),
}

/// Separator between the unit name and the index in static variable symbols
const STATIC_INFIX: &str = "_static_";

/// Gets the symbol of a static variable
fn static_symbol(unit: &str, index: u16) -> String {
    format!("{unit}{STATIC_INFIX}{index}")
}

/// Checks if a symbol has the form of a static variable of the given unit
pub fn is_static_symbol(symbol: &str, unit: &str) -> bool {
    symbol
        .strip_prefix(unit)
        .and_then(|rest| rest.strip_prefix(STATIC_INFIX))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Gets the location of an element of a segment
///
/// # Parameters
///
/// * `target`: description of the target machine
/// * `unit`: name of the current translation unit, used to scope static variables
/// * `segment`: segment of the element
/// * `index`: index of the element in the segment
///
/// # Errors
///
/// Returns a [`ErrorKind::AddressOutOfRange`] if the element of a fixed segment can't be addressed
/// with a literal
pub fn resolve<'a>(
    target: &Target<'a>,
    unit: &str,
    segment: Segment,
    index: u16,
) -> Result<Location<'a>, ErrorKind> {
    Ok(match segment {
        Segment::Constant => Location::Literal(index),
        Segment::Static => Location::Symbol(static_symbol(unit, index)),
        _ => match target.addressing(segment) {
            Some(Addressing::Indirect(pointer)) => Location::Indirect { pointer, index },
            Some(Addressing::Fixed(base)) => base
                .checked_add(index)
                .filter(|&address| address <= MAX_LITERAL)
                .map(Location::Absolute)
                .ok_or(ErrorKind::AddressOutOfRange { segment, index })?,
            None => unreachable!("Segment {segment:?} should be in the addressing table"),
        },
    })
}
