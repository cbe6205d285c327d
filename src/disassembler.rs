/*
 * Copyright 2018 Ian Johnson
 *
 * This is free software, distributed under the MIT license.  A copy of the
 * license can be found in the LICENSE file in the project root, or at
 * https://opensource.org/licenses/MIT.
 */

//! The Chip-8 disassembler.
//!
//! The disassembler shares the opcode decoding tables with the interpreter,
//! so the two always agree about what an opcode means.  The canonical
//! textual format is deliberately plain: lowercase mnemonics, register
//! operands as `vx`, byte constants as two hex digits, addresses as three
//! and sprite heights as one, with no prefixes.  Test harnesses consume
//! this format byte for byte.

use std::io::{BufWriter, Read, Write};

use failure::{Error, ResultExt};

use instruction::{Instruction, Opcode};

/// Returns the canonical mnemonic for the given opcode.
///
/// This is a total function: opcodes outside the instruction table render
/// as `unknown (xxxx)`, with the opcode in four lowercase hex digits.  The
/// never-executable `0nnn` machine routine opcodes render the same way.
///
/// # Examples
///
/// ```
/// use chip8_vm::{disassemble, Opcode};
///
/// assert_eq!(disassemble(Opcode(0x8126)), "shr v1, v2");
/// assert_eq!(disassemble(Opcode(0x8009)), "unknown (8009)");
/// ```
pub fn disassemble(opcode: Opcode) -> String {
    match Instruction::from_opcode(opcode) {
        Ok(Instruction::Halt) | Err(_) => format!("unknown ({:04x})", opcode.0),
        Ok(instr) => instr.to_string(),
    }
}

/// A disassembler for a complete program image.
pub struct Disassembler {
    /// The program being disassembled.
    prog: Vec<u8>,
}

impl Disassembler {
    /// Creates a new disassembler from the given program data.
    pub fn new<R: Read>(input: &mut R) -> Result<Self, Error> {
        let mut prog = Vec::new();
        input
            .read_to_end(&mut prog)
            .context("could not read program")?;
        Ok(Disassembler { prog })
    }

    /// Dumps the disassembly of the program to the given output, one
    /// instruction per line.
    ///
    /// A trailing odd byte is dumped as `db xx`.
    pub fn dump<W: Write>(&self, output: &mut W) -> Result<(), Error> {
        let mut output = BufWriter::new(output);

        for chunk in self.prog.chunks(2) {
            if chunk.len() == 1 {
                write!(output, "db {:02x}\n", chunk[0])?;
                continue;
            }
            let opcode = Opcode::from_bytes(chunk[0], chunk[1]);
            write!(output, "{}\n", disassemble(opcode))?;
        }

        Ok(())
    }
}
