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

//! Module containing the specification of the target machine description
//!
//! The entry point for the specification is the [`Target`] struct. The default description of the
//! Hack machine is available as [`Target::HACK`]

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;

use crate::parser::Segment;

/// Target machine description
#[derive(Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct Target<'a> {
    /// Name of the target machine
    pub name: &'a str,
    /// Symbol of the memory cell holding the stack pointer
    pub stack_pointer: &'a str,
    /// Addressing mode of each addressable memory segment
    #[serde(borrow)]
    pub segments: Segments<'a>,
    /// Memory cells free to be used as temporary storage by the generated code
    #[serde(borrow)]
    pub scratch: Scratch<'a>,
    /// Program startup configuration
    #[serde(borrow)]
    pub bootstrap: Bootstrap<'a>,
}

/// Segment addressing table
#[derive(Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments<'a> {
    #[serde(borrow)]
    pub argument: Addressing<'a>,
    #[serde(borrow)]
    pub local: Addressing<'a>,
    #[serde(borrow)]
    pub this: Addressing<'a>,
    #[serde(borrow)]
    pub that: Addressing<'a>,
    #[serde(borrow)]
    pub pointer: Addressing<'a>,
    #[serde(borrow)]
    pub temp: Addressing<'a>,
}

/// Way of computing the effective address of a segment element
#[derive(Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Addressing<'a> {
    /// The base address is stored in the memory cell with the given symbol:
    /// `address = *pointer + index`
    Indirect(&'a str),
    /// The base address is a constant: `address = base + index`
    Fixed(u16),
}

/// Temporary memory cells
#[derive(Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scratch<'a> {
    /// Cell holding the frame base during a function return, and the target address of indirect
    /// pops
    pub frame: &'a str,
    /// Cell holding the return address during a function return
    pub return_address: &'a str,
}

/// Startup code configuration
#[derive(Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bootstrap<'a> {
    /// Initial value of the stack pointer
    pub stack_base: u16,
    /// Function called at startup
    pub entry: &'a str,
}

impl Target<'static> {
    /// Description of the Hack machine
    pub const HACK: Self = Self {
        name: "hack",
        stack_pointer: "SP",
        segments: Segments {
            argument: Addressing::Indirect("ARG"),
            local: Addressing::Indirect("LCL"),
            this: Addressing::Indirect("THIS"),
            that: Addressing::Indirect("THAT"),
            pointer: Addressing::Fixed(3),
            temp: Addressing::Fixed(5),
        },
        scratch: Scratch {
            frame: "R13",
            return_address: "R14",
        },
        bootstrap: Bootstrap {
            stack_base: 256,
            entry: "Sys.init",
        },
    };
}

impl Default for Target<'static> {
    fn default() -> Self {
        Self::HACK
    }
}

impl<'a> Target<'a> {
    /// Generate a `JSON` schema
    ///
    /// # Panics
    ///
    /// Panics if the data can't be serialized. This should never happen
    #[must_use]
    pub fn schema() -> String {
        let schema = schema_for!(Target);
        serde_json::to_string_pretty(&schema)
            .expect("Input is known and fixed, so it shouldn't error out")
    }

    /// Load a target description from `JSON`
    ///
    /// # Parameters
    ///
    /// * `src`: `JSON` data to deserialize
    ///
    /// # Errors
    ///
    /// Errors if the input `JSON` data is invalid, either because it's ill-formatted or because it
    /// doesn't conform to the schema
    pub fn from_json(src: &'a str) -> serde_json::Result<Self> {
        serde_json::from_str(src)
    }

    /// Gets the addressing mode of a segment. Returns [`None`] for the segments that aren't backed
    /// by the addressing table (`constant` and `static`)
    ///
    /// # Parameters
    ///
    /// * `segment`: segment to search for
    #[must_use]
    pub const fn addressing(&self, segment: Segment) -> Option<Addressing<'a>> {
        let segments = &self.segments;
        Some(match segment {
            Segment::Argument => segments.argument,
            Segment::Local => segments.local,
            Segment::This => segments.this,
            Segment::That => segments.that,
            Segment::Pointer => segments.pointer,
            Segment::Temp => segments.temp,
            Segment::Constant | Segment::Static => return None,
        })
    }

    /// Checks if a symbol names one of the memory cells used by the generated code: the stack
    /// pointer, the segment pointers or the scratch cells
    ///
    /// # Parameters
    ///
    /// * `symbol`: symbol to check
    #[must_use]
    pub fn is_reserved(&self, symbol: &str) -> bool {
        let segments = &self.segments;
        let pointers = [
            segments.argument,
            segments.local,
            segments.this,
            segments.that,
            segments.pointer,
            segments.temp,
        ]
        .into_iter()
        .filter_map(|addressing| match addressing {
            Addressing::Indirect(pointer) => Some(pointer),
            Addressing::Fixed(_) => None,
        });
        [
            self.stack_pointer,
            self.scratch.frame,
            self.scratch.return_address,
        ]
        .into_iter()
        .chain(pointers)
        .any(|cell| cell == symbol)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const JSON: &str = r#"{
        "name": "custom",
        "stack_pointer": "STACK",
        "segments": {
            "argument": {"indirect": "A0"},
            "local": {"indirect": "L0"},
            "this": {"indirect": "T0"},
            "that": {"indirect": "T1"},
            "pointer": {"fixed": 10},
            "temp": {"fixed": 20}
        },
        "scratch": {"frame": "S0", "return_address": "S1"},
        "bootstrap": {"stack_base": 1024, "entry": "Main.main"}
    }"#;

    #[test]
    fn hack() {
        let hack = Target::HACK;
        assert_eq!(hack.addressing(Segment::Local), Some(Addressing::Indirect("LCL")));
        assert_eq!(hack.addressing(Segment::Argument), Some(Addressing::Indirect("ARG")));
        assert_eq!(hack.addressing(Segment::This), Some(Addressing::Indirect("THIS")));
        assert_eq!(hack.addressing(Segment::That), Some(Addressing::Indirect("THAT")));
        assert_eq!(hack.addressing(Segment::Pointer), Some(Addressing::Fixed(3)));
        assert_eq!(hack.addressing(Segment::Temp), Some(Addressing::Fixed(5)));
        assert_eq!(hack.addressing(Segment::Constant), None);
        assert_eq!(hack.addressing(Segment::Static), None);
        assert_eq!(Target::default(), hack);
    }

    #[test]
    fn from_json() {
        let target = Target::from_json(JSON).expect("the description should be valid");
        assert_eq!(target.name, "custom");
        assert_eq!(target.stack_pointer, "STACK");
        assert_eq!(target.addressing(Segment::That), Some(Addressing::Indirect("T1")));
        assert_eq!(target.addressing(Segment::Temp), Some(Addressing::Fixed(20)));
        assert_eq!(target.scratch.return_address, "S1");
        assert_eq!(target.bootstrap.stack_base, 1024);
        assert_eq!(target.bootstrap.entry, "Main.main");
    }

    #[test]
    fn from_json_invalid() {
        assert!(Target::from_json("{}").is_err());
        assert!(Target::from_json(&JSON.replace("fixed\": 10", "offset\": 10")).is_err());
    }

    #[test]
    fn reserved() {
        for symbol in ["SP", "LCL", "ARG", "THIS", "THAT", "R13", "R14"] {
            assert!(Target::HACK.is_reserved(symbol), "{symbol}");
        }
        assert!(!Target::HACK.is_reserved("LOOP"));
        assert!(!Target::HACK.is_reserved("sp"));
        let target = Target::from_json(JSON).unwrap();
        assert!(target.is_reserved("STACK"));
        assert!(target.is_reserved("T1"));
        assert!(target.is_reserved("S1"));
        assert!(!target.is_reserved("SP"));
    }

    #[test]
    fn schema() {
        let schema = Target::schema();
        assert!(schema.contains("stack_pointer"));
        assert!(schema.contains("indirect"));
    }
}
