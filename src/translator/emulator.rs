//! Minimal Hack CPU used to execute the generated code in tests

use std::collections::HashMap;

use super::asm::{Instruction, Jump};

/// Executable instruction, with all its symbols resolved
#[derive(Debug, Clone, Copy)]
enum Op {
    Load(i16),
    Compute {
        dest: Option<&'static str>,
        comp: &'static str,
        jump: Option<Jump>,
    },
}

/// Hack CPU with its RAM and a loaded program
pub struct Cpu {
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
    program: Vec<Op>,
    labels: HashMap<String, usize>,
    symbols: HashMap<String, u16>,
}

/// Address of the first variable allocated by the assembler
const FIRST_VARIABLE: u16 = 16;

impl Cpu {
    /// Assembles a program and loads it
    pub fn new(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let instructions: Vec<_> = instructions.into_iter().collect();
        let pointers = [("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4)];
        let mut symbols: HashMap<String, u16> = pointers
            .into_iter()
            .map(|(name, addr)| (name.to_owned(), addr))
            .chain((0..16).map(|i| (format!("R{i}"), i)))
            .collect();

        let mut labels = HashMap::new();
        let mut pc = 0;
        for instruction in &instructions {
            match instruction {
                Instruction::Label(name) => {
                    let previous = labels.insert(name.clone(), pc);
                    assert!(previous.is_none(), "duplicate label `{name}`");
                }
                Instruction::Comment(_) => {}
                _ => pc += 1,
            }
        }

        let mut next_variable = FIRST_VARIABLE;
        let mut program = Vec::new();
        for instruction in instructions {
            program.push(match instruction {
                Instruction::Literal(x) => Op::Load(x as i16),
                Instruction::Symbol(name) => {
                    let value = if let Some(&pc) = labels.get(&name) {
                        pc as u16
                    } else {
                        *symbols.entry(name).or_insert_with(|| {
                            next_variable += 1;
                            next_variable - 1
                        })
                    };
                    Op::Load(value as i16)
                }
                Instruction::Compute { dest, comp, jump } => Op::Compute { dest, comp, jump },
                Instruction::Label(_) | Instruction::Comment(_) => continue,
            });
        }

        Self {
            ram: vec![0; 1 << 16],
            a: 0,
            d: 0,
            pc: 0,
            program,
            labels,
            symbols,
        }
    }

    /// Gets the address of a label
    pub fn label(&self, name: &str) -> usize {
        self.labels[name]
    }

    /// Gets the address assigned to a variable
    pub fn variable(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    /// Gets the value stored in a predefined cell
    pub fn get(&self, name: &str) -> i16 {
        self.ram[usize::from(self.symbols[name])]
    }

    /// Sets the value stored in a predefined cell
    pub fn set(&mut self, name: &str, value: i16) {
        let addr = usize::from(self.symbols[name]);
        self.ram[addr] = value;
    }

    /// Gets the stack contents between the given base address and the stack pointer
    pub fn stack(&self, base: usize) -> &[i16] {
        &self.ram[base..self.get("SP") as usize]
    }

    fn m(&self) -> usize {
        usize::from(self.a as u16)
    }

    fn eval(&self, comp: &str) -> i16 {
        let (a, d, m) = (self.a, self.d, self.ram[self.m()]);
        match comp {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => d,
            "A" => a,
            "M" => m,
            "!D" => !d,
            "!A" => !a,
            "!M" => !m,
            "-D" => d.wrapping_neg(),
            "-A" => a.wrapping_neg(),
            "-M" => m.wrapping_neg(),
            "D+1" => d.wrapping_add(1),
            "A+1" => a.wrapping_add(1),
            "M+1" => m.wrapping_add(1),
            "D-1" => d.wrapping_sub(1),
            "A-1" => a.wrapping_sub(1),
            "M-1" => m.wrapping_sub(1),
            "D+A" => d.wrapping_add(a),
            "D+M" => d.wrapping_add(m),
            "D-A" => d.wrapping_sub(a),
            "D-M" => d.wrapping_sub(m),
            "A-D" => a.wrapping_sub(d),
            "M-D" => m.wrapping_sub(d),
            "D&A" => d & a,
            "D&M" => d & m,
            "D|A" => d | a,
            "D|M" => d | m,
            _ => panic!("invalid computation `{comp}`"),
        }
    }

    /// Executes a single instruction
    pub fn step(&mut self) {
        match self.program[self.pc] {
            Op::Load(value) => {
                self.a = value;
                self.pc += 1;
            }
            Op::Compute { dest, comp, jump } => {
                let value = self.eval(comp);
                let target = self.m();
                let dest = dest.unwrap_or_default();
                if dest.contains('M') {
                    self.ram[target] = value;
                }
                if dest.contains('A') {
                    self.a = value;
                }
                if dest.contains('D') {
                    self.d = value;
                }
                let taken = jump.is_some_and(|jump| match jump {
                    Jump::Gt => value > 0,
                    Jump::Eq => value == 0,
                    Jump::Lt => value < 0,
                    Jump::Ne => value != 0,
                    Jump::Always => true,
                });
                self.pc = if taken { target } else { self.pc + 1 };
            }
        }
    }

    /// Runs the program until it reaches its end
    pub fn run(&mut self, max_steps: usize) {
        for _ in 0..max_steps {
            if self.pc >= self.program.len() {
                return;
            }
            self.step();
        }
        panic!("program didn't finish after {max_steps} steps");
    }

    /// Runs the program until it reaches the given label
    pub fn run_until(&mut self, label: &str, max_steps: usize) {
        let stop = self.label(label);
        for _ in 0..max_steps {
            if self.pc == stop {
                return;
            }
            self.step();
        }
        panic!("program didn't reach `{label}` after {max_steps} steps");
    }
}
