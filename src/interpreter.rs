// Copyright 2018 Ian Johnson

// This file is part of Chip-8.

// Chip-8 is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Chip-8 is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Chip-8.  If not, see <http://www.gnu.org/licenses/>.

//! The Chip-8 interpreter.
//!
//! The interpreter owns the entire machine state and is driven from outside
//! through three kinds of entry point: `step` executes one instruction,
//! `clock` advances the delay and sound timers one 60 Hz tick, and
//! `key_down`/`key_up` deliver keypad events.  The interpreter is
//! single-threaded; a host that drives it from several threads must
//! serialize the calls itself (or wrap the interpreter in a mutex, since no
//! entry point blocks).

use std::default::Default;
use std::num::Wrapping;
use std::u8;

use failure::Error;
use rand;

use display::{self, FONT_HEIGHT, FONT_SPRITES};
use input::{self, Key};
use instruction::{Address, Instruction, Opcode};
use Register;
use MEM_SIZE;
use PROG_SIZE;
use PROG_START;
use timer::Timers;

/// The number of entries in the call stack.
pub const STACK_SIZE: usize = 16;

/// An error relating to the interpreter.
#[derive(Debug, Fail)]
pub enum InterpreterError {
    #[fail(display = "no subroutine to return from")] NotInSubroutine,
    #[fail(display = "call stack limit of {} entries exceeded", _0)] StackOverflow(usize),
    #[fail(display = "program size {} exceeds the {} bytes of program memory", _0, _1)]
    ProgramTooLarge(usize, usize),
}

/// The execution mode of the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Executing instructions normally.
    Running,
    /// Waiting for a key release to store in the given register.
    WaitingKey(Register),
    /// Stopped by `HALT`; sticky until `reset`.
    Halted,
}

/// A by-value snapshot of the complete machine state.
///
/// Snapshots are plain data: the display is a copy, not a view into the
/// interpreter, so a host can hold on to one for as long as it likes.
pub struct State {
    /// The memory contents.
    pub mem: [u8; MEM_SIZE],
    /// The general-purpose registers `V0`-`VF`.
    pub v: [u8; 16],
    /// The register `I`.
    pub i: u16,
    /// The call stack.  Only the first `sp` entries are meaningful.
    pub stack: [u16; STACK_SIZE],
    /// The index of the next free call stack slot.
    pub sp: u8,
    /// The delay timer.
    pub dt: u8,
    /// The sound timer.
    pub st: u8,
    /// The program counter.
    pub pc: u16,
    /// The display contents.
    pub display: display::Pixels,
    /// The keypad state (`true` means "pressed").
    pub keys: [bool; input::N_KEYS],
}

impl State {
    /// Returns a new, zeroed state.
    pub fn new() -> Self {
        State {
            mem: [0; MEM_SIZE],
            v: [0; 16],
            i: 0,
            stack: [0; STACK_SIZE],
            sp: 0,
            dt: 0,
            st: 0,
            pc: 0,
            display: [[0; display::WIDTH]; display::HEIGHT],
            keys: [false; input::N_KEYS],
        }
    }

    /// Returns the opcode at the program counter.
    pub fn instruction(&self) -> Opcode {
        let pc = Address::new(self.pc);
        Opcode::from_bytes(self.mem[pc.addr()], self.mem[(pc + 1).addr()])
    }
}

impl Default for State {
    fn default() -> Self {
        State::new()
    }
}

/// The interpreter.
pub struct Interpreter {
    /// The internal memory.
    mem: [u8; MEM_SIZE],
    /// The display buffer.
    display: display::Buffer,
    /// The input state.
    input: input::State,
    /// The general-purpose registers `V0`-`VF`.
    regs: [Wrapping<u8>; 16],
    /// The special register `I`.
    reg_i: Address,
    /// The delay and sound timers.
    timers: Timers,
    /// The program counter.
    pc: Address,
    /// The call stack (for returning from subroutines).
    call_stack: Vec<Address>,
    /// The execution mode.
    mode: Mode,
    /// The host-supplied random source used by `RND`.
    rng: Option<Box<FnMut() -> u32>>,
    /// The host-supplied callback fired when the sound timer expires.
    sound: Option<Box<FnMut()>>,
}

impl Interpreter {
    /// Returns a new interpreter with the font table loaded and the program
    /// counter at the program start address.
    pub fn new() -> Self {
        let mut interpreter = Interpreter {
            mem: [0; MEM_SIZE],
            display: display::Buffer::new(),
            input: input::State::new(),
            regs: [Wrapping(0); 16],
            reg_i: Address::new(0),
            timers: Timers::new(),
            pc: Address::new(PROG_START as u16),
            call_stack: Vec::with_capacity(STACK_SIZE),
            mode: Mode::Running,
            rng: None,
            sound: None,
        };
        interpreter.load_font();
        interpreter
    }

    /// Restores the interpreter to its power-on state.
    ///
    /// Everything except the font table is zeroed, so any loaded program
    /// must be loaded again.  The installed host callbacks are kept.
    pub fn reset(&mut self) {
        self.mem = [0; MEM_SIZE];
        self.display.clear();
        self.input = input::State::new();
        self.regs = [Wrapping(0); 16];
        self.reg_i = Address::new(0);
        self.timers = Timers::new();
        self.pc = Address::new(PROG_START as u16);
        self.call_stack.clear();
        self.mode = Mode::Running;
        self.load_font();
    }

    /// Copies the given program into memory at the program start address.
    pub fn load(&mut self, program: &[u8]) -> Result<(), Error> {
        if program.len() > PROG_SIZE {
            return Err(InterpreterError::ProgramTooLarge(program.len(), PROG_SIZE).into());
        }
        self.mem[PROG_START..PROG_START + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Installs the random source used by the `RND` instruction.
    ///
    /// If no source is installed, a uniform 32-bit source is used.
    pub fn set_rng(&mut self, rng: Box<FnMut() -> u32>) {
        self.rng = Some(rng);
    }

    /// Installs the callback fired when the sound timer expires.
    pub fn set_sound(&mut self, sound: Box<FnMut()>) {
        self.sound = Some(sound);
    }

    /// Returns the value of register `I`.
    pub fn i(&self) -> Address {
        self.reg_i
    }

    /// Sets the value of register `I`.
    pub fn set_i(&mut self, val: Address) {
        self.reg_i = val;
    }

    /// Returns the value of the delay timer.
    pub fn dt(&self) -> u8 {
        self.timers.dt()
    }

    /// Sets the value of the delay timer.
    pub fn set_dt(&mut self, val: u8) {
        self.timers.set_dt(val);
    }

    /// Returns the value of the sound timer.
    pub fn st(&self) -> u8 {
        self.timers.st()
    }

    /// Sets the value of the sound timer.
    pub fn set_st(&mut self, val: u8) {
        self.timers.set_st(val);
    }

    /// Returns the value of the program counter.
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Returns the value in the given register.
    pub fn register(&self, reg: Register) -> u8 {
        self.regs[reg as usize].0
    }

    /// Sets the given register to the given value.
    pub fn set_register(&mut self, reg: Register, val: u8) {
        self.regs[reg as usize].0 = val
    }

    /// Copies the current contents of the display into the given buffer.
    pub fn display(&self, out: &mut display::Pixels) {
        *out = *self.display.data();
    }

    /// Copies the complete machine state into the given snapshot.
    pub fn snapshot(&self, out: &mut State) {
        out.mem.copy_from_slice(&self.mem);
        for (dest, src) in out.v.iter_mut().zip(self.regs.iter()) {
            *dest = src.0;
        }
        out.i = self.reg_i.as_u16();
        out.stack = [0; STACK_SIZE];
        for (dest, src) in out.stack.iter_mut().zip(self.call_stack.iter()) {
            *dest = src.as_u16();
        }
        out.sp = self.call_stack.len() as u8;
        out.dt = self.timers.dt();
        out.st = self.timers.st();
        out.pc = self.pc.as_u16();
        out.display = *self.display.data();
        out.keys = *self.input.keys();
    }

    /// Returns the instruction at the program counter.
    pub fn current_instruction(&self) -> Result<Instruction, Error> {
        Ok(Instruction::from_opcode(self.current_opcode())?)
    }

    /// Returns the opcode at the program counter.
    pub fn current_opcode(&self) -> Opcode {
        Opcode::from_bytes(self.read_mem(self.pc), self.read_mem(self.pc + 1))
    }

    /// Presses the given key (only the lowest four bits are significant).
    pub fn key_down(&mut self, key: u8) {
        self.input.press(Key::from_byte(key));
    }

    /// Releases the given key (only the lowest four bits are significant).
    ///
    /// A pending wait-for-key is resolved here, on the release edge: the
    /// released key is stored in the target register and the program
    /// resumes.  A key that was already held when the wait began does not
    /// satisfy it.
    pub fn key_up(&mut self, key: u8) {
        let key = Key::from_byte(key);
        self.input.release(key);

        if let Mode::WaitingKey(reg) = self.mode {
            self.set_register(reg, key as u8);
            self.mode = Mode::Running;
            self.pc = self.pc + 2;
        }
    }

    /// Advances the delay and sound timers one 60 Hz tick.
    ///
    /// The sound callback is invoked (synchronously, before this method
    /// returns) exactly once when the sound timer goes from 1 to 0.
    pub fn clock(&mut self) {
        if self.timers.tick() {
            if let Some(ref mut sound) = self.sound {
                sound();
            }
        }
    }

    /// Performs a single execution step.
    ///
    /// Returns `false` once the interpreter has halted; further calls keep
    /// returning `false` until `reset`.  While a wait-for-key is pending
    /// this is a no-op returning `true`.  On an invalid opcode an error is
    /// returned and the program counter is left pointing at the offending
    /// instruction.
    pub fn step(&mut self) -> Result<bool, Error> {
        match self.mode {
            Mode::Halted => return Ok(false),
            Mode::WaitingKey(_) => return Ok(true),
            Mode::Running => {}
        }

        let instr = self.current_instruction()?;
        self.execute(instr)
    }

    /// Executes the given instruction in the current interpreter context.
    ///
    /// The interpreter will behave as if the given instruction were executed
    /// at the current program location in memory.
    fn execute(&mut self, ins: Instruction) -> Result<bool, Error> {
        use self::Instruction::*;

        match ins {
            Halt => {
                debug!("halted at {}", self.pc);
                self.mode = Mode::Halted;
                return Ok(false);
            }
            Cls => self.display.clear(),
            Ret => {
                self.pc = self.call_stack
                    .pop()
                    .ok_or(InterpreterError::NotInSubroutine)?
            }
            Jp(addr) => {
                self.pc = addr;
                return Ok(true);
            }
            Call(addr) => {
                if self.call_stack.len() == STACK_SIZE {
                    return Err(InterpreterError::StackOverflow(STACK_SIZE).into());
                }
                self.call_stack.push(self.pc);
                self.pc = addr;
                return Ok(true);
            }
            SeByte(reg, b) => if self.register(reg) == b {
                self.pc = self.pc + 4;
                return Ok(true);
            },
            SneByte(reg, b) => if self.register(reg) != b {
                self.pc = self.pc + 4;
                return Ok(true);
            },
            SeReg(reg1, reg2) => if self.register(reg1) == self.register(reg2) {
                self.pc = self.pc + 4;
                return Ok(true);
            },
            LdByte(reg, b) => self.set_register(reg, b),
            AddByte(reg, b) => self.regs[reg as usize] += Wrapping(b),
            LdReg(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.set_register(reg1, r2);
            }
            Or(reg1, reg2) => {
                let val = self.register(reg1) | self.register(reg2);
                self.set_register(reg1, val);
                self.set_register(Register::VF, 0);
            }
            And(reg1, reg2) => {
                let val = self.register(reg1) & self.register(reg2);
                self.set_register(reg1, val);
                self.set_register(Register::VF, 0);
            }
            Xor(reg1, reg2) => {
                let val = self.register(reg1) ^ self.register(reg2);
                self.set_register(reg1, val);
                self.set_register(Register::VF, 0);
            }
            AddReg(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.add(reg1, r2);
            }
            Sub(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.sub(reg1, r2);
            }
            Shr(reg1, reg2) => self.shr(reg1, reg2),
            Subn(reg1, reg2) => {
                let r2 = self.register(reg2);
                self.subn(reg1, r2);
            }
            Shl(reg1, reg2) => self.shl(reg1, reg2),
            SneReg(reg1, reg2) => if self.register(reg1) != self.register(reg2) {
                self.pc = self.pc + 4;
                return Ok(true);
            },
            LdI(addr) => self.reg_i = addr,
            JpV0(addr) => {
                self.pc = addr + self.register(Register::V0) as u16;
                return Ok(true);
            }
            Rnd(reg, b) => {
                let r = match self.rng {
                    Some(ref mut rng) => rng(),
                    None => rand::random::<u32>(),
                };
                self.set_register(reg, r as u8 & b);
            }
            Drw(reg1, reg2, n) => self.drw(reg1, reg2, n),
            Skp(reg) => if self.input.is_pressed(Key::from_byte(self.register(reg))) {
                self.pc = self.pc + 4;
                return Ok(true);
            },
            Sknp(reg) => if !self.input.is_pressed(Key::from_byte(self.register(reg))) {
                self.pc = self.pc + 4;
                return Ok(true);
            },
            LdRegDt(reg) => {
                let dt = self.dt();
                self.set_register(reg, dt);
            }
            LdKey(reg) => {
                self.mode = Mode::WaitingKey(reg);
                return Ok(true);
            }
            LdDtReg(reg) => {
                let r = self.register(reg);
                self.set_dt(r);
            }
            LdSt(reg) => {
                let r = self.register(reg);
                self.set_st(r);
            }
            AddI(reg) => {
                self.reg_i = self.reg_i + self.register(reg) as u16;
            }
            LdF(reg) => {
                let digit = self.register(reg) & 0xF;
                self.reg_i = Address::new(FONT_HEIGHT as u16 * digit as u16);
            }
            LdB(reg) => self.ld_b(reg),
            LdDerefIReg(reg) => self.ld_deref_i_reg(reg),
            LdRegDerefI(reg) => self.ld_reg_deref_i(reg),
        }

        self.pc = self.pc + 2;
        Ok(true)
    }

    /// Reads the byte of memory at the given address.
    fn read_mem(&self, addr: Address) -> u8 {
        self.mem[addr.addr()]
    }

    /// Writes the byte of memory at the given address.
    fn write_mem(&mut self, addr: Address, val: u8) {
        self.mem[addr.addr()] = val;
    }

    /// Copies the font glyphs to the bottom of memory.
    fn load_font(&mut self) {
        for (i, sprite) in FONT_SPRITES.iter().enumerate() {
            let start = i * FONT_HEIGHT;
            self.mem[start..start + sprite.len()].copy_from_slice(sprite);
        }
    }

    /// Adds the given byte to the given register, setting `VF` to 1 on carry
    /// or 0 otherwise.
    ///
    /// `VF` is committed after the sum, so when the destination is `VF`
    /// itself the flag wins.
    fn add(&mut self, reg: Register, val: u8) {
        let carry = val > u8::MAX - self.register(reg);
        self.regs[reg as usize] += Wrapping(val);
        self.set_register(Register::VF, if carry { 1 } else { 0 });
    }

    /// Subtracts the given byte from the given register, setting `VF` to 0
    /// on borrow or 1 otherwise.
    fn sub(&mut self, reg: Register, val: u8) {
        let no_borrow = self.register(reg) >= val;
        self.regs[reg as usize] -= Wrapping(val);
        self.set_register(Register::VF, if no_borrow { 1 } else { 0 });
    }

    /// Sets `reg` to `val - reg`, setting `VF` to 0 on borrow or 1
    /// otherwise.
    fn subn(&mut self, reg: Register, val: u8) {
        let no_borrow = val >= self.register(reg);
        self.regs[reg as usize] = Wrapping(val) - self.regs[reg as usize];
        self.set_register(Register::VF, if no_borrow { 1 } else { 0 });
    }

    /// Sets `reg1` to `reg2 >> 1`, setting `VF` to the old lowest bit.
    fn shr(&mut self, reg1: Register, reg2: Register) {
        let src = self.register(reg2);
        self.set_register(reg1, src >> 1);
        self.set_register(Register::VF, src & 1);
    }

    /// Sets `reg1` to `reg2 << 1`, setting `VF` to the old highest bit.
    fn shl(&mut self, reg1: Register, reg2: Register) {
        let src = self.register(reg2);
        self.set_register(reg1, src << 1);
        self.set_register(Register::VF, src >> 7);
    }

    /// Implements the `DRW` operation.
    ///
    /// The sprite origin wraps around the screen edges; the sprite pixels
    /// themselves clip.
    fn drw(&mut self, reg1: Register, reg2: Register, n: u8) {
        let mut sprite = [0; 16];
        for (dy, row) in sprite[..n as usize].iter_mut().enumerate() {
            *row = self.read_mem(self.reg_i + dy as u16);
        }

        let x = self.register(reg1) as usize;
        let y = self.register(reg2) as usize;
        let collision = self.display.draw_sprite(&sprite[..n as usize], x, y);
        self.set_register(Register::VF, if collision { 1 } else { 0 });
    }

    /// Implements the `LD B, Vx` operation.
    fn ld_b(&mut self, reg: Register) {
        let val = self.register(reg);
        let addr = self.reg_i;
        self.write_mem(addr, val / 100);
        self.write_mem(addr + 1, val / 10 % 10);
        self.write_mem(addr + 2, val % 10);
    }

    /// Implements the `LD [I], Vx` operation.
    ///
    /// `I` is left pointing one past the last byte written.
    fn ld_deref_i_reg(&mut self, reg: Register) {
        for n in 0..reg as usize + 1 {
            let val = self.regs[n].0;
            self.write_mem(self.reg_i, val);
            self.reg_i = self.reg_i + 1;
        }
    }

    /// Implements the `LD Vx, [I]` operation.
    ///
    /// `I` is left pointing one past the last byte read.
    fn ld_reg_deref_i(&mut self, reg: Register) {
        for n in 0..reg as usize + 1 {
            self.regs[n] = Wrapping(self.read_mem(self.reg_i));
            self.reg_i = self.reg_i + 1;
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
