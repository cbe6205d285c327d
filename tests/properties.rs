/*
 * Copyright 2018 Ian Johnson
 *
 * This is free software, distributed under the MIT license.  A copy of the
 * license can be found in the LICENSE file in the project root, or at
 * https://opensource.org/licenses/MIT.
 */

//! Property tests for the interpreter and disassembler invariants.

extern crate chip8_vm;
#[macro_use]
extern crate proptest;

use proptest::prelude::*;

use chip8_vm::{disassemble, Address, Interpreter, Opcode, Register, State};

/// Returns a fresh interpreter with the given opcode as its whole program.
fn interpreter_with(op: u16) -> Interpreter {
    let mut interp = Interpreter::new();
    interp.load(&[(op >> 8) as u8, op as u8]).unwrap();
    interp
}

/// Loads the given program into a fresh interpreter and steps it until it
/// halts.
fn run(program: &[u8]) -> Interpreter {
    let mut interp = Interpreter::new();
    interp.load(program).unwrap();
    for _ in 0..10_000 {
        if !interp.step().unwrap() {
            return interp;
        }
    }
    panic!("program did not halt");
}

proptest! {
    /// Every ALU instruction leaves the program counter two past where it
    /// was.
    #[test]
    fn alu_advances_pc_by_two(
        x in 0u8..16,
        y in 0u8..16,
        n in prop_oneof![0u8..8, Just(0xEu8)],
        vx in any::<u8>(),
        vy in any::<u8>(),
    ) {
        let op = 0x8000 | (x as u16) << 8 | (y as u16) << 4 | n as u16;
        let mut interp = interpreter_with(op);
        interp.set_register(Register::from_byte(x), vx);
        interp.set_register(Register::from_byte(y), vy);

        prop_assert!(interp.step().unwrap());
        prop_assert_eq!(interp.pc(), Address::new(0x202));
    }

    /// The logical operations clear `VF` no matter what it held before.
    #[test]
    fn logical_ops_clear_vf(
        x in 0u8..16,
        y in 0u8..16,
        n in 1u8..4,
        vx in any::<u8>(),
        vy in any::<u8>(),
        vf in any::<u8>(),
    ) {
        let op = 0x8000 | (x as u16) << 8 | (y as u16) << 4 | n as u16;
        let mut interp = interpreter_with(op);
        interp.set_register(Register::from_byte(x), vx);
        interp.set_register(Register::from_byte(y), vy);
        interp.set_register(Register::VF, vf);

        interp.step().unwrap();
        prop_assert_eq!(interp.register(Register::VF), 0);
    }

    /// The carry flag of `ADD Vx, Vy` always ends up in `VF`, even when the
    /// destination register is `VF` itself.
    #[test]
    fn add_flag_ends_up_in_vf(
        x in 0u8..16,
        y in 0u8..16,
        vx in any::<u8>(),
        vy in any::<u8>(),
    ) {
        let op = 0x8004 | (x as u16) << 8 | (y as u16) << 4;
        let mut interp = interpreter_with(op);
        interp.set_register(Register::from_byte(x), vx);
        interp.set_register(Register::from_byte(y), vy);

        let rx = interp.register(Register::from_byte(x));
        let ry = interp.register(Register::from_byte(y));
        let carry = rx as u16 + ry as u16 > 0xFF;

        interp.step().unwrap();
        prop_assert_eq!(interp.register(Register::VF), carry as u8);
    }

    /// `LD [I], Vx` and `LD Vx, [I]` leave `I` pointing `x + 1` bytes past
    /// where it started.
    #[test]
    fn reg_dump_advances_i(
        x in 0u8..16,
        i0 in 0u16..0x1000,
        load in any::<bool>(),
    ) {
        let kk = if load { 0x65 } else { 0x55 };
        let op = 0xF000 | (x as u16) << 8 | kk;
        let mut interp = interpreter_with(op);
        interp.set_i(Address::new(i0));

        prop_assert!(interp.step().unwrap());
        prop_assert_eq!(interp.i(), Address::new(i0) + (x as u16 + 1));
    }

    /// After `CLS` the framebuffer reads all zeros no matter what was drawn
    /// before.
    #[test]
    fn cls_clears_display(x in any::<u8>(), y in any::<u8>()) {
        let interp = run(&[
            0x60, x,    // LD V0, x
            0x61, y,    // LD V1, y
            0xA2, 0x0C, // LD I, 0x20C
            0xD0, 0x18, // DRW V0, V1, 8
            0x00, 0xE0, // CLS
            0x00, 0x00, // HALT
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // sprite data
        ]);

        let mut state = State::new();
        interp.snapshot(&mut state);
        prop_assert!(state.display.iter().all(|row| row.iter().all(|&p| p == 0)));
    }

    /// The disassembler is total, and everything it does not recognize uses
    /// the `unknown` form.
    #[test]
    fn disassemble_total(op in any::<u16>()) {
        let text = disassemble(Opcode(op));
        prop_assert!(!text.is_empty());
        if text.starts_with("unknown") {
            prop_assert_eq!(text, format!("unknown ({:04x})", op));
        }
    }
}
