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

//! Module containing utilities for rendering translation errors

use ariadne::{Color, Fmt};

use std::collections::BTreeSet;
use std::fmt;

/// Wrapper to display elements with an optional color. Uncolored elements are quoted with
/// backticks instead
pub struct Colored<T>(pub T, pub Option<Color>);

impl<T: fmt::Display> fmt::Display for Colored<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(color) = self.1 {
            write!(f, "{}", (&self.0).fg(color))
        } else {
            write!(f, "`{}`", self.0)
        }
    }
}

/// Wrapper for a list of names displayed as `a, b, or c`
pub struct DisplayList<'a> {
    /// Names to display, sorted
    pub values: Vec<&'a str>,
    /// Whether to display the names with colors or not
    pub color: bool,
}

impl<'a> DisplayList<'a> {
    /// Creates a new [`DisplayList`], checking that it isn't empty
    pub fn non_empty(values: Vec<&'a str>, color: bool) -> Option<Self> {
        (!values.is_empty()).then_some(Self { values, color })
    }
}

impl fmt::Display for DisplayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((last, rest)) = self.values.split_last() else {
            return Ok(());
        };
        let color = self.color.then_some(Color::Green);
        let comma = if self.values.len() > 2 { "," } else { "" };
        for x in rest {
            write!(f, "{}{comma} ", Colored(x, color))?;
        }
        if !rest.is_empty() {
            write!(f, "or ")?;
        }
        write!(f, "{}", Colored(last, color))
    }
}

/// Wrapper to display an amount of operands
pub struct OperandNum(pub usize, pub Option<Color>);

impl fmt::Display for OperandNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = if self.0 == 1 { "" } else { "s" };
        write!(f, "{} operand{}", Colored(self.0, self.1), s)
    }
}

/// Gets the names from a list that are the most similar to the given name, sorted
/// alphabetically. Names too different from the target aren't returned
///
/// # Parameters
///
/// * `target`: target name to match against
/// * `names`: iterator of possible names
pub fn get_similar<'a>(target: &str, names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let names: BTreeSet<_> = names.collect();
    let distances: Vec<_> = names
        .into_iter()
        .map(|name| (name, edit_distance::edit_distance(name, target)))
        .collect();
    distances
        .iter()
        .map(|&(_, d)| d)
        .min()
        .filter(|&min| min <= std::cmp::max(target.len() / 3, 1))
        .map(|min| {
            distances
                .iter()
                .filter(|&&(_, d)| d == min)
                .map(|&(name, _)| name)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn similar() {
        let names = ["push", "pop", "goto", "if-goto", "label"];
        assert_eq!(get_similar("psh", names.into_iter()), vec!["push"]);
        assert_eq!(get_similar("ifgoto", names.into_iter()), vec!["if-goto"]);
        assert_eq!(get_similar("po", names.into_iter()), vec!["pop"]);
        assert_eq!(get_similar("xyzzy", names.into_iter()), Vec::<&str>::new());
    }

    #[test]
    fn list() {
        let display = |values: Vec<&str>| {
            DisplayList::non_empty(values, false).map(|list| list.to_string())
        };
        assert_eq!(display(vec![]), None);
        assert_eq!(display(vec!["a"]), Some("`a`".into()));
        assert_eq!(display(vec!["a", "b"]), Some("`a` or `b`".into()));
        assert_eq!(display(vec!["a", "b", "c"]), Some("`a`, `b`, or `c`".into()));
    }

    #[test]
    fn operand_num() {
        assert_eq!(OperandNum(1, None).to_string(), "`1` operand");
        assert_eq!(OperandNum(2, None).to_string(), "`2` operands");
    }
}
