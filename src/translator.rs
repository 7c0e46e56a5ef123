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

//! Module containing the translation of VM commands to Hack assembly
//!
//! The entry point for translating whole programs is the [`translate()`] function, while single
//! commands can be translated with [`Translator::translate()`]

use num_bigint::BigUint;

use crate::error::{Error, Kind as ErrorKind, SpannedErr as _};
use crate::parser::{is_symbol, parse_line, Command, Segment, MAX_LITERAL};
use crate::source;
use crate::span::Spanned;
use crate::target::{Addressing, Target};

pub mod asm;
use asm::{Block, Instruction, Jump};

mod context;
pub use context::TranslationContext;

mod label;
pub use label::Allocator as LabelAllocator;

mod segment;
use segment::{is_static_symbol, resolve, Location};

#[cfg(test)]
mod emulator;

/// Amount of cells in a saved frame below the callee's local segment: return address and the
/// four segment pointers
const FRAME_SIZE: u16 = 5;

/// Instruction shorthands
fn at(symbol: impl Into<String>) -> Instruction {
    Instruction::at(symbol)
}

const fn set(dest: &'static str, comp: &'static str) -> Instruction {
    Instruction::assign(dest, comp)
}

/// Code generator for a target machine
#[derive(Debug, Clone, Copy)]
pub struct Translator<'t, 'a> {
    target: &'t Target<'a>,
}

impl<'t, 'a> Translator<'t, 'a> {
    /// Creates a new `Translator` for the given target machine
    #[must_use]
    pub const fn new(target: &'t Target<'a>) -> Self {
        Self { target }
    }

    /// Translates a single command
    ///
    /// # Parameters
    ///
    /// * `command`: command to translate
    /// * `ctx`: state of the current job. Its current unit and line should be set to the ones of
    ///   the command
    ///
    /// # Errors
    ///
    /// Errors if the command can't be translated, or if there are no labels left for it
    pub fn translate(
        &self,
        command: &Command,
        ctx: &mut TranslationContext,
    ) -> Result<Block, ErrorKind> {
        log::trace!("{}:{}: {command}", ctx.unit(), ctx.line());
        Ok(match command {
            Command::Push(segment, index) => self.push(*segment, *index, ctx.unit())?,
            Command::Pop(segment, index) => self.pop(*segment, *index, ctx.unit())?,
            Command::Add => self.binary("D+M"),
            Command::Sub => self.binary("M-D"),
            Command::And => self.binary("D&M"),
            Command::Or => self.binary("D|M"),
            Command::Neg => self.unary("-M"),
            Command::Not => self.unary("!M"),
            Command::Eq => self.compare("eq", Jump::Eq, ctx)?,
            Command::Gt => self.compare("gt", Jump::Gt, ctx)?,
            Command::Lt => self.compare("lt", Jump::Lt, ctx)?,
            Command::Label(name) => {
                self.check_declaration(name, &[ctx.unit()])?;
                ctx.declare_label(name);
                Block::from_iter([Instruction::label(name.as_str())])
            }
            Command::Goto(name) => {
                Block::from_iter([at(name), Instruction::jump("0", Jump::Always)])
            }
            Command::IfGoto(name) => self.if_goto(name),
            Command::Function { name, locals } => {
                self.check_declaration(name, &[ctx.unit()])?;
                self.function(name, *locals, ctx)?
            }
            Command::Call { name, args } => self.call(name, *args, ctx)?,
            Command::Return => self.ret()?,
        })
    }

    /// Generates the startup code: initializes the stack pointer and calls the entry function
    ///
    /// # Errors
    ///
    /// Errors if the stack base can't be loaded as a literal, or if there are no labels left
    pub fn bootstrap(&self, ctx: &mut TranslationContext) -> Result<Block, ErrorKind> {
        let bootstrap = self.target.bootstrap;
        log::debug!(
            "Generating bootstrap code (SP = {}, entry = {})",
            bootstrap.stack_base,
            bootstrap.entry
        );
        if bootstrap.stack_base > MAX_LITERAL {
            return Err(ErrorKind::IntegerOutOfRange(
                BigUint::from(bootstrap.stack_base),
                MAX_LITERAL,
            ));
        }
        let mut block = Block::from_iter([
            Instruction::Literal(bootstrap.stack_base),
            set("D", "A"),
            at(self.target.stack_pointer),
            set("M", "D"),
        ]);
        block.extend(self.call(bootstrap.entry, 0, ctx)?);
        Ok(block)
    }

    /// Checks that a label or function name declared by the user doesn't clash with the symbols
    /// of the memory cells used by the generated code
    ///
    /// # Parameters
    ///
    /// * `symbol`: declared name
    /// * `units`: names of the units whose static variables are present in the output program
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::ReservedSymbol`] if the name is already in use
    pub fn check_declaration(&self, symbol: &str, units: &[&str]) -> Result<(), ErrorKind> {
        if self.target.is_reserved(symbol)
            || units.iter().any(|unit| is_static_symbol(symbol, unit))
        {
            return Err(ErrorKind::ReservedSymbol(symbol.to_owned()));
        }
        Ok(())
    }

    /// Gets the symbol of the pointer cell of a segment used by the calling convention
    fn pointer(&self, segment: Segment) -> Result<&'a str, ErrorKind> {
        match self.target.addressing(segment) {
            Some(Addressing::Indirect(pointer)) => Ok(pointer),
            _ => Err(ErrorKind::NotAPointer(segment)),
        }
    }

    /// Appends the code to push the value in `D` to the stack
    fn push_d(&self, block: &mut Block) {
        block.extend([
            at(self.target.stack_pointer),
            set("M", "M+1"),
            set("A", "M-1"),
            set("M", "D"),
        ]);
    }

    /// Appends the code to pop the top of the stack to `D`, leaving its address in `A`
    fn pop_d(&self, block: &mut Block) {
        block.extend([at(self.target.stack_pointer), set("AM", "M-1"), set("D", "M")]);
    }

    fn push(&self, segment: Segment, index: u16, unit: &str) -> Result<Block, ErrorKind> {
        let mut block = Block::new();
        match resolve(self.target, unit, segment, index)? {
            Location::Literal(value) => block.extend([Instruction::Literal(value), set("D", "A")]),
            Location::Indirect { pointer, index: 0 } => {
                block.extend([at(pointer), set("A", "M"), set("D", "M")]);
            }
            Location::Indirect { pointer, index } => block.extend([
                at(pointer),
                set("D", "M"),
                Instruction::Literal(index),
                set("A", "D+A"),
                set("D", "M"),
            ]),
            Location::Absolute(address) => {
                block.extend([Instruction::Literal(address), set("D", "M")]);
            }
            Location::Symbol(symbol) => block.extend([at(symbol), set("D", "M")]),
        }
        self.push_d(&mut block);
        Ok(block)
    }

    fn pop(&self, segment: Segment, index: u16, unit: &str) -> Result<Block, ErrorKind> {
        let mut block = Block::new();
        match resolve(self.target, unit, segment, index)? {
            Location::Literal(_) => return Err(ErrorKind::PopConstant),
            Location::Indirect { pointer, index: 0 } => {
                self.pop_d(&mut block);
                block.extend([at(pointer), set("A", "M"), set("M", "D")]);
            }
            Location::Indirect { pointer, index } => {
                // The address is computed before popping, as it needs the D register
                let scratch = self.target.scratch.frame;
                block.extend([
                    at(pointer),
                    set("D", "M"),
                    Instruction::Literal(index),
                    set("D", "D+A"),
                    at(scratch),
                    set("M", "D"),
                ]);
                self.pop_d(&mut block);
                block.extend([at(scratch), set("A", "M"), set("M", "D")]);
            }
            Location::Absolute(address) => {
                self.pop_d(&mut block);
                block.extend([Instruction::Literal(address), set("M", "D")]);
            }
            Location::Symbol(symbol) => {
                self.pop_d(&mut block);
                block.extend([at(symbol), set("M", "D")]);
            }
        }
        Ok(block)
    }

    /// Replaces the 2 values on top of the stack, `x` and `y`, with `x op y`
    fn binary(&self, comp: &'static str) -> Block {
        let mut block = Block::new();
        self.pop_d(&mut block);
        block.extend([set("A", "A-1"), set("M", comp)]);
        block
    }

    /// Replaces the value on top of the stack, `x`, with `op x`
    fn unary(&self, comp: &'static str) -> Block {
        Block::from_iter([at(self.target.stack_pointer), set("A", "M-1"), set("M", comp)])
    }

    /// Replaces the 2 values on top of the stack, `x` and `y`, with the boolean result of
    /// comparing `x - y` against 0
    fn compare(
        &self,
        name: &str,
        jump: Jump,
        ctx: &mut TranslationContext,
    ) -> Result<Block, ErrorKind> {
        let when_true = ctx.unique_label(name)?;
        let end = ctx.unique_label(&format!("not{name}"))?;
        let sp = self.target.stack_pointer;
        let mut block = Block::new();
        self.pop_d(&mut block);
        block.extend([
            set("A", "A-1"),
            set("D", "M-D"),
            at(when_true.as_str()),
            Instruction::jump("D", jump),
            at(sp),
            set("A", "M-1"),
            set("M", "0"),
            at(end.as_str()),
            Instruction::jump("0", Jump::Always),
            Instruction::label(when_true),
            at(sp),
            set("A", "M-1"),
            set("M", "-1"),
            Instruction::label(end),
        ]);
        Ok(block)
    }

    fn if_goto(&self, label: &str) -> Block {
        let mut block = Block::new();
        self.pop_d(&mut block);
        block.extend([at(label), Instruction::jump("D", Jump::Ne)]);
        block
    }

    fn function(
        &self,
        name: &str,
        locals: u16,
        ctx: &mut TranslationContext,
    ) -> Result<Block, ErrorKind> {
        ctx.declare_label(name);
        let mut block = Block::from_iter([Instruction::label(name)]);
        for _ in 0..locals {
            block.extend(self.push(Segment::Constant, 0, ctx.unit())?);
        }
        Ok(block)
    }

    fn call(
        &self,
        name: &str,
        args: u16,
        ctx: &mut TranslationContext,
    ) -> Result<Block, ErrorKind> {
        let local = self.pointer(Segment::Local)?;
        let argument = self.pointer(Segment::Argument)?;
        let saved = [
            local,
            argument,
            self.pointer(Segment::This)?,
            self.pointer(Segment::That)?,
        ];
        let offset = args
            .checked_add(FRAME_SIZE)
            .filter(|&x| x <= MAX_LITERAL)
            .ok_or_else(|| {
                ErrorKind::IntegerOutOfRange(BigUint::from(args), MAX_LITERAL - FRAME_SIZE)
            })?;
        let return_address = ctx.unique_label("return")?;
        let sp = self.target.stack_pointer;

        let mut block = Block::from_iter([at(return_address.as_str()), set("D", "A")]);
        self.push_d(&mut block);
        for pointer in saved {
            block.extend([at(pointer), set("D", "M")]);
            self.push_d(&mut block);
        }
        block.extend([
            // ARG = SP - args - 5
            at(sp),
            set("D", "M"),
            Instruction::Literal(offset),
            set("D", "D-A"),
            at(argument),
            set("M", "D"),
            // LCL = SP
            at(sp),
            set("D", "M"),
            at(local),
            set("M", "D"),
            at(name),
            Instruction::jump("0", Jump::Always),
            Instruction::label(return_address),
        ]);
        Ok(block)
    }

    fn ret(&self) -> Result<Block, ErrorKind> {
        let local = self.pointer(Segment::Local)?;
        let argument = self.pointer(Segment::Argument)?;
        let restored = [
            self.pointer(Segment::That)?,
            self.pointer(Segment::This)?,
            argument,
            local,
        ];
        let frame = self.target.scratch.frame;
        let return_address = self.target.scratch.return_address;
        let sp = self.target.stack_pointer;

        let mut block = Block::from_iter([
            // frame = LCL
            at(local),
            set("D", "M"),
            at(frame),
            set("M", "D"),
            // The return address is read first, as the return value may overwrite it when there
            // are no arguments
            Instruction::Literal(FRAME_SIZE),
            set("A", "D-A"),
            set("D", "M"),
            at(return_address),
            set("M", "D"),
        ]);
        // *ARG = pop()
        self.pop_d(&mut block);
        block.extend([
            at(argument),
            set("A", "M"),
            set("M", "D"),
            // SP = ARG + 1
            at(argument),
            set("D", "M+1"),
            at(sp),
            set("M", "D"),
        ]);
        for pointer in restored {
            block.extend([at(frame), set("AM", "M-1"), set("D", "M"), at(pointer), set("M", "D")]);
        }
        block.extend([at(return_address), set("A", "M"), Instruction::jump("0", Jump::Always)]);
        Ok(block)
    }
}

/// Source code of a translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit<'a> {
    /// Name of the unit, used to scope its static variables
    pub name: &'a str,
    /// VM source code
    pub src: &'a str,
}

/// Translation job settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Prepend the startup code to the output
    pub bootstrap: bool,
    /// Precede the code of each command with a comment containing the command
    pub annotate: bool,
}

/// Parsed translation unit
struct ParsedUnit<'a> {
    name: &'a str,
    /// Commands with their source line numbers
    commands: Vec<(usize, Spanned<Command>)>,
}

/// Parses all the commands of a translation unit
fn parse_unit<'a>(unit: &Unit<'a>) -> Result<ParsedUnit<'a>, Error> {
    // The unit name is used as a prefix of static variables and synthesized labels
    if !is_symbol(unit.name) {
        return Err(ErrorKind::InvalidUnitName(unit.name.to_owned())
            .add_span(0..0)
            .locate(unit.name, 0));
    }
    let commands = source::lines(unit.src)
        .map(|line| {
            parse_line(line.text, line.offset)
                .map(|command| (line.number, command))
                .map_err(|e| e.locate(unit.name, line.number))
        })
        .collect::<Result<_, _>>()?;
    Ok(ParsedUnit {
        name: unit.name,
        commands,
    })
}

/// Translates a whole program made of one or more units into a list of instruction blocks, one
/// per command (plus the startup code first, if enabled)
///
/// # Parameters
///
/// * `target`: description of the target machine
/// * `units`: translation units, in the order they should appear in the output
/// * `options`: settings of the translation
///
/// # Errors
///
/// Errors if any unit has a syntactical or semantical error. No output is produced in that case
pub fn translate_blocks(
    target: &Target,
    units: &[Unit],
    options: Options,
) -> Result<Vec<Block>, Error> {
    let units = units.iter().map(parse_unit).collect::<Result<Vec<_>, _>>()?;
    let translator = Translator::new(target);
    let mut ctx = TranslationContext::new();

    // User labels are registered upfront so that labels synthesized before their declaration
    // can't collide with them
    let names: Vec<_> = units.iter().map(|unit| unit.name).collect();
    for unit in &units {
        for (line, (command, span)) in &unit.commands {
            if let Some(symbol) = command.declared_symbol() {
                translator
                    .check_declaration(symbol, &names)
                    .add_span(span)
                    .map_err(|e| e.locate(unit.name, *line))?;
                ctx.declare_label(symbol);
            }
        }
    }

    let mut blocks = Vec::new();
    if options.bootstrap {
        ctx.begin_unit("Bootstrap");
        let block = translator
            .bootstrap(&mut ctx)
            .map_err(|e| e.add_span(0..0).locate("Bootstrap", 0))?;
        blocks.push(block);
    }
    for unit in units {
        log::debug!(
            "Translating unit `{}` ({} commands)",
            unit.name,
            unit.commands.len()
        );
        ctx.begin_unit(unit.name);
        for (line, (command, span)) in unit.commands {
            ctx.set_line(line);
            let mut block = Block::new();
            if options.annotate {
                block.push(Instruction::Comment(command.to_string()));
            }
            block.extend(
                translator
                    .translate(&command, &mut ctx)
                    .add_span(&span)
                    .map_err(|e| e.locate(unit.name, line))?,
            );
            blocks.push(block);
        }
    }
    Ok(blocks)
}

/// Translates a whole program made of one or more units into Hack assembly. The code of each
/// command is terminated by a line break
///
/// # Parameters
///
/// * `target`: description of the target machine
/// * `units`: translation units, in the order they should appear in the output
/// * `options`: settings of the translation
///
/// # Errors
///
/// Errors if any unit has a syntactical or semantical error. No output is produced in that case
pub fn translate(target: &Target, units: &[Unit], options: Options) -> Result<String, Error> {
    let blocks = translate_blocks(target, units, options)?;
    let mut output = String::new();
    for block in blocks {
        output.push_str(&block.to_string());
        output.push('\n');
    }
    Ok(output)
}
