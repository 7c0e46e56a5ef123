//! Module containing the definition of the generated Hack assembly instructions

use std::fmt;

/// Jump condition, comparing the computed value against 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Gt,
    Eq,
    Lt,
    Ne,
    /// Unconditional jump
    Always,
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gt => "JGT",
            Self::Eq => "JEQ",
            Self::Lt => "JLT",
            Self::Ne => "JNE",
            Self::Always => "JMP",
        })
    }
}

/// Hack assembly instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `@symbol`
    Symbol(String),
    /// `@value`
    Literal(u16),
    /// `dest=comp;jump`, with both `dest` and `jump` being optional
    Compute {
        dest: Option<&'static str>,
        comp: &'static str,
        jump: Option<Jump>,
    },
    /// `(symbol)`
    Label(String),
    /// `// text`
    Comment(String),
}

impl Instruction {
    /// Creates a new `@symbol` instruction
    pub fn at(symbol: impl Into<String>) -> Self {
        Self::Symbol(symbol.into())
    }

    /// Creates a new `dest=comp` instruction
    #[must_use]
    pub const fn assign(dest: &'static str, comp: &'static str) -> Self {
        Self::Compute {
            dest: Some(dest),
            comp,
            jump: None,
        }
    }

    /// Creates a new `comp;jump` instruction
    #[must_use]
    pub const fn jump(comp: &'static str, jump: Jump) -> Self {
        Self::Compute {
            dest: None,
            comp,
            jump: Some(jump),
        }
    }

    /// Creates a new `(symbol)` label declaration
    pub fn label(symbol: impl Into<String>) -> Self {
        Self::Label(symbol.into())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(s) => write!(f, "@{s}"),
            Self::Literal(x) => write!(f, "@{x}"),
            Self::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{dest}=")?;
                }
                write!(f, "{comp}")?;
                if let Some(jump) = jump {
                    write!(f, ";{jump}")?;
                }
                Ok(())
            }
            Self::Label(s) => write!(f, "({s})"),
            Self::Comment(s) => write!(f, "// {s}"),
        }
    }
}

/// Ordered sequence of instructions generated for a single command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block(Vec<Instruction>);

impl Block {
    /// Creates a new empty `Block`
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an instruction to the end of the block
    pub fn push(&mut self, instruction: Instruction) {
        self.0.push(instruction);
    }

    /// Gets the instructions of the block
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.0
    }

    /// Gets the amount of instructions in the block
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the block has no instructions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<Instruction> for Block {
    fn extend<T: IntoIterator<Item = Instruction>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<Instruction> for Block {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Block {
    type Item = Instruction;
    type IntoIter = std::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut instructions = self.0.iter();
        if let Some(first) = instructions.next() {
            write!(f, "{first}")?;
        }
        for instruction in instructions {
            write!(f, "\n{instruction}")?;
        }
        Ok(())
    }
}
