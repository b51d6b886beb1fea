mod addressing_mode;
mod bus;
mod dma;
mod instruction;
mod interrupt;
mod opcode;
mod operand;
mod register;
mod status;

use std::collections::HashMap;

use interrupt::Interrupt;
use operand::Operand;
use register::Register;

pub use addressing_mode::AddressingMode;
pub use bus::{Bus, RamBus16kb};
pub use dma::{ActiveDMA, DMAStatus, DMA};
pub use instruction::Instruction;
pub use interrupt::{IRQ_VECTOR_ADDRESS, NMI_VECTOR_ADDRESS, RESET_VECTOR_ADDRESS};
pub use opcode::Opcode;
pub use status::{Status, StatusFlag};

const STACK_START_ADDRESS: u16 = 0x0100;

/// `MOS6502` emulates the functionality of the MOS Technology 6502 microprocessor.
///
/// It owns only its own register state; memory lives behind the `Bus` passed into `reset`,
/// `tick`, `nmi` and `irq`, never retained between calls.
#[derive(Debug)]
pub struct MOS6502 {
    /// The accumulator. It has many uses including:
    ///
    /// - transferring data from memory to the accumulator
    /// - transferring data from the accumulator to memory
    /// - performing operations such as AND/OR and testing the results of those operations
    /// - temporary storage for intermediate results, e.g. when adding two numbers together
    pub a: u8,

    /// An 8-bit index register. It is mainly used to hold counters or offsets for accessing memory.
    pub x: u8,

    /// An 8-bit index register. It is mainly used to hold counters or offsets for accessing memory.
    pub y: u8,

    pub p: Status,

    /// `pc` is the program counter. It points to the address of the instruction about to be
    /// fetched.
    pub pc: u16,

    /// `sp` is the stack pointer. It points to the top of the 256 byte call stack in memory.
    ///
    /// The 6502 uses a _descending_ stack, so pushing decrements `sp` and pulling increments it.
    /// The stack always lives in `0x0100..=0x01FF`, which is why `sp` is only 8 bits wide.
    pub sp: u8,

    /// Set by `nmi()`. Edge-triggered: servicing the interrupt clears it automatically.
    nmi_pending: bool,

    /// Set by `irq()`. Level-triggered: stays set until the caller explicitly lowers the line,
    /// and is re-serviced at every instruction boundary while it's set and `InterruptDisable` is
    /// clear.
    irq_asserted: bool,

    /// The total number of cycles that have elapsed since the CPU started running.
    pub elapsed_cycles: u64,

    /// The number of cycles left to wait before the next instruction (or interrupt, or DMA step)
    /// can run.
    pub wait_cycles: u32,

    /// The 6502 has no direct memory access capability of its own, but it's a common
    /// requirement for systems built around it (e.g. the NES's OAM DMA).
    dma: HashMap<u16, DMA>,

    /// The DMA transfer currently in progress, if any.
    active_dma: Option<ActiveDMA>,
}

impl MOS6502 {
    pub fn new() -> MOS6502 {
        MOS6502 {
            a: 0,
            x: 0,
            y: 0,

            p: Status::default(),

            pc: 0,
            sp: 0,

            nmi_pending: false,
            irq_asserted: false,

            elapsed_cycles: 0,
            wait_cycles: 0,

            dma: HashMap::new(),
            active_dma: None,
        }
    }

    pub fn with_dma(mut self, dma: DMA) -> MOS6502 {
        self.dma.insert(dma.trigger_address, dma);
        self
    }

    /// Simulates the `RESET` input line: loads `PC` from the reset vector and disables IRQs.
    ///
    /// Like a real reset sequence this doesn't happen instantaneously - it costs the usual 7
    /// cycles, drained by subsequent calls to `tick`.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.interrupt(bus, Interrupt::RESET);
        self.wait_cycles += 6;
        self.elapsed_cycles += 1;
    }

    /// Raises the non-maskable interrupt line. Edge-triggered: the CPU services it once, at the
    /// next instruction boundary, regardless of `InterruptDisable`.
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Sets the maskable interrupt line. Level-triggered: while `asserted` is `true` and
    /// `InterruptDisable` is clear, the CPU re-services it at every instruction boundary.
    pub fn irq(&mut self, asserted: bool) {
        self.irq_asserted = asserted;
    }

    /// Advance the CPU by a single clock cycle.
    ///
    /// Most cycles just drain `wait_cycles`, the cost of whatever is currently in flight
    /// (an instruction, an interrupt sequence, or a DMA transfer). Only when nothing is in
    /// flight does this fetch, decode and begin executing the next instruction.
    pub fn tick(&mut self, bus: &mut impl Bus) {
        if self.wait_cycles > 0 {
            self.wait_cycles -= 1;
            self.elapsed_cycles += 1;
            return;
        }

        if self.step_active_dma(bus) == DMAStatus::Active {
            self.elapsed_cycles += 1;
            return;
        }

        if self.service_interrupts(bus) {
            self.elapsed_cycles += 1;
            return;
        }

        let opcode_byte = bus.read_u8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        let instruction = Instruction::decode(opcode_byte);

        self.wait_cycles += (instruction.cycles as u32) - 1;
        self.execute(bus, instruction);

        self.elapsed_cycles += 1;
    }

    /// Cycle one instruction plus however many cycles it takes to execute it. Used for testing.
    pub fn cycle_to_next_instruction(&mut self, bus: &mut impl Bus) {
        loop {
            self.tick(bus);

            if self.wait_cycles == 0 {
                return;
            }
        }
    }

    /// Cycle the CPU until the next fetched opcode is `BRK`. Used for testing programs that run
    /// off the end of their own code into zeroed (and therefore `BRK`-decoding) memory.
    pub fn cycle_until_brk(&mut self, bus: &mut impl Bus) {
        loop {
            self.tick(bus);

            if self.next_instruction(bus).opcode == Opcode::BRK {
                return;
            }
        }
    }

    pub fn next_instruction(&self, bus: &impl Bus) -> Instruction {
        Instruction::decode(bus.read_u8(self.pc))
    }

    fn step_active_dma(&mut self, bus: &mut impl Bus) -> DMAStatus {
        if let Some(active_dma) = &mut self.active_dma {
            let source_address = active_dma.start_address + active_dma.bytes_transferred;
            let target_address = active_dma.target_address;
            active_dma.bytes_transferred += 1;

            if active_dma.bytes_transferred >= active_dma.bytes_to_transfer {
                self.active_dma = None;
            }

            // DMA ignores the usual CPU bus timings - it just reads and writes directly.
            let byte = bus.read_u8(source_address);
            bus.write_u8(target_address, byte);

            // We only need one extra wait cycle for the write since the read is part of this one.
            self.wait_cycles += 1;

            DMAStatus::Active
        } else {
            DMAStatus::Inactive
        }
    }

    fn service_interrupts(&mut self, bus: &mut impl Bus) -> bool {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(bus, Interrupt::NMI);
            self.wait_cycles += 6;
            true
        } else if self.irq_asserted && !self.p.get(StatusFlag::InterruptDisable) {
            self.interrupt(bus, Interrupt::IRQ);
            self.wait_cycles += 6;
            true
        } else {
            false
        }
    }

    /// Pushes `PC` and `P` to the stack (except for `RESET`, which only pretends to), loads `PC`
    /// from the interrupt's vector, and sets `InterruptDisable`.
    fn interrupt(&mut self, bus: &mut impl Bus, interrupt: Interrupt) {
        if interrupt != Interrupt::RESET {
            self.push_stack_u16(bus, self.pc);

            let mut status = self.p;
            status.set(StatusFlag::Break, interrupt == Interrupt::BRK);
            status.set(StatusFlag::Unused, true);
            self.push_stack_u8(bus, status.0);
        } else {
            // RESET decrements the stack pointer three times without writing anything to it.
            self.sp = self.sp.wrapping_sub(3);
        }

        self.p.set(StatusFlag::InterruptDisable, true);
        self.pc = bus.read_u16(interrupt.vector_address());
    }

    fn execute(&mut self, bus: &mut impl Bus, instruction: Instruction) {
        let operand = instruction.addressing_mode.fetch(self, bus);

        if operand.page_boundary_crossed && Self::is_read_class(instruction.opcode) {
            self.wait_cycles += 1;
        }

        match instruction.opcode {
            Opcode::LDA => self.op_load(bus, Register::A, operand),
            Opcode::LDX => self.op_load(bus, Register::X, operand),
            Opcode::LDY => self.op_load(bus, Register::Y, operand),
            Opcode::STA => self.op_store(bus, Register::A, operand),
            Opcode::STX => self.op_store(bus, Register::X, operand),
            Opcode::STY => self.op_store(bus, Register::Y, operand),
            Opcode::TAX => self.op_transfer(Register::A, Register::X),
            Opcode::TAY => self.op_transfer(Register::A, Register::Y),
            Opcode::TXA => self.op_transfer(Register::X, Register::A),
            Opcode::TYA => self.op_transfer(Register::Y, Register::A),

            Opcode::TSX => self.op_transfer(Register::SP, Register::X),
            Opcode::TXS => self.op_transfer(Register::X, Register::SP),
            Opcode::PHA => self.op_push_stack(bus, Register::A),
            Opcode::PHP => self.op_push_stack(bus, Register::P),
            Opcode::PLA => self.op_pull_stack(bus, Register::A),
            Opcode::PLP => self.op_pull_stack(bus, Register::P),

            Opcode::AND => self.op_logical(bus, operand, |a, b| a & b),
            Opcode::EOR => self.op_logical(bus, operand, |a, b| a ^ b),
            Opcode::ORA => self.op_logical(bus, operand, |a, b| a | b),
            Opcode::BIT => self.op_bit(bus, operand),

            Opcode::ADC => self.op_add(bus, operand),
            Opcode::SBC => self.op_sub(bus, operand),
            Opcode::CMP => self.op_compare(bus, Register::A, operand),
            Opcode::CPX => self.op_compare(bus, Register::X, operand),
            Opcode::CPY => self.op_compare(bus, Register::Y, operand),

            Opcode::INC => { operand.modify(self, bus, |v| v.wrapping_add(1)); }
            Opcode::INX => self.modify_register(Register::X, |v| v.wrapping_add(1)),
            Opcode::INY => self.modify_register(Register::Y, |v| v.wrapping_add(1)),
            Opcode::DEC => { operand.modify(self, bus, |v| v.wrapping_sub(1)); }
            Opcode::DEX => self.modify_register(Register::X, |v| v.wrapping_sub(1)),
            Opcode::DEY => self.modify_register(Register::Y, |v| v.wrapping_sub(1)),

            Opcode::ASL => { self.op_shift_left(bus, operand); }
            Opcode::LSR => { self.op_shift_right(bus, operand); }
            Opcode::ROL => { self.op_rotate_left(bus, operand); }
            Opcode::ROR => { self.op_rotate_right(bus, operand); }

            Opcode::JMP => self.pc = operand.address(),
            Opcode::JSR => self.op_jump_subroutine(bus, operand),
            Opcode::RTS => self.op_return(bus),

            Opcode::BCC => self.op_branch_if(operand, !self.p.get(StatusFlag::Carry)),
            Opcode::BCS => self.op_branch_if(operand, self.p.get(StatusFlag::Carry)),
            Opcode::BEQ => self.op_branch_if(operand, self.p.get(StatusFlag::Zero)),
            Opcode::BNE => self.op_branch_if(operand, !self.p.get(StatusFlag::Zero)),
            Opcode::BMI => self.op_branch_if(operand, self.p.get(StatusFlag::Negative)),
            Opcode::BPL => self.op_branch_if(operand, !self.p.get(StatusFlag::Negative)),
            Opcode::BVS => self.op_branch_if(operand, self.p.get(StatusFlag::Overflow)),
            Opcode::BVC => self.op_branch_if(operand, !self.p.get(StatusFlag::Overflow)),

            Opcode::CLC => self.p.set(StatusFlag::Carry, false),
            Opcode::CLD => self.p.set(StatusFlag::DecimalMode, false),
            Opcode::CLI => self.p.set(StatusFlag::InterruptDisable, false),
            Opcode::CLV => self.p.set(StatusFlag::Overflow, false),
            Opcode::SEC => self.p.set(StatusFlag::Carry, true),
            Opcode::SED => self.p.set(StatusFlag::DecimalMode, true),
            Opcode::SEI => self.p.set(StatusFlag::InterruptDisable, true),

            Opcode::BRK => self.op_break(bus),
            Opcode::NOP => {}
            Opcode::Unknown => {}
            Opcode::RTI => self.op_return_from_interrupt(bus),
        }
    }

    /// The instructions whose indexed addressing modes charge an extra cycle only when
    /// resolving the address actually crosses a page boundary. Every other opcode's cost is
    /// exactly the static table's `cycles`, win or lose.
    fn is_read_class(opcode: Opcode) -> bool {
        matches!(
            opcode,
            Opcode::LDA
                | Opcode::LDX
                | Opcode::LDY
                | Opcode::AND
                | Opcode::ORA
                | Opcode::EOR
                | Opcode::ADC
                | Opcode::SBC
                | Opcode::CMP
        )
    }

    fn read_register(&self, register: Register) -> u8 {
        match register {
            Register::A => self.a,
            Register::X => self.x,
            Register::Y => self.y,
            Register::P => self.p.0,
            Register::SP => self.sp,
        }
    }

    /// Write a value to a register, updating `Zero`/`Negative` unless the target is `P` or `SP`.
    fn write_register(&mut self, register: Register, value: u8) {
        match register {
            Register::A => self.a = value,
            Register::X => self.x = value,
            Register::Y => self.y = value,
            Register::P => self.p.0 = value,
            Register::SP => self.sp = value,
        }

        if register != Register::P && register != Register::SP {
            self.p.set(StatusFlag::Zero, value == 0);
            self.p.set(StatusFlag::Negative, value & 0b1000_0000 > 0);
        }

        // `P` has no storage for `Break` or `Unused` - `Break` only ever exists in a byte pushed
        // to the stack, and `Unused` is hardwired to 1.
        if register == Register::P {
            self.p.set(StatusFlag::Break, false);
            self.p.set(StatusFlag::Unused, true);
        }
    }

    fn modify_register(&mut self, register: Register, f: impl FnOnce(u8) -> u8) {
        let value = self.read_register(register);
        self.write_register(register, f(value));
    }

    fn write_u8(&mut self, bus: &mut impl Bus, address: u16, value: u8) {
        if let Some(dma) = self.dma.get(&address) {
            self.active_dma = Some(ActiveDMA::from_dma(dma, (value as u16) << 8));

            // Writing to the DMA trigger port normally costs 1 cycle, plus one more if the CPU
            // happens to be on an odd elapsed-cycle count. In hardware this comes from the `rdy`
            // pin; we just charge the equivalent number of wait cycles directly.
            self.wait_cycles += 1;
            if self.elapsed_cycles % 2 != 0 {
                self.wait_cycles += 1;
            }
        } else {
            bus.write_u8(address, value);
        }
    }

    fn push_stack_u8(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write_u8(STACK_START_ADDRESS + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull_stack_u8(&mut self, bus: &impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read_u8(STACK_START_ADDRESS + self.sp as u16)
    }

    fn push_stack_u16(&mut self, bus: &mut impl Bus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        // Addresses are pushed high byte first.
        self.push_stack_u8(bus, hi);
        self.push_stack_u8(bus, lo);
    }

    fn pull_stack_u16(&mut self, bus: &impl Bus) -> u16 {
        let lo = self.pull_stack_u8(bus);
        let hi = self.pull_stack_u8(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn op_load(&mut self, bus: &impl Bus, register: Register, operand: Operand) {
        let value = operand.read(self, bus);
        self.write_register(register, value);
    }

    fn op_store(&mut self, bus: &mut impl Bus, register: Register, operand: Operand) {
        let value = self.read_register(register);
        operand.write(self, bus, value);
    }

    /// Copy the contents of `source` into `target`.
    fn op_transfer(&mut self, source: Register, target: Register) {
        let value = self.read_register(source);
        self.write_register(target, value);
    }

    fn op_push_stack(&mut self, bus: &mut impl Bus, source: Register) {
        let mut value = self.read_register(source);

        // Pushing `P` (via `PHP` or a hardware interrupt's own push) always sets `Break` and
        // `Unused` in the byte that lands on the stack, regardless of their live value in `P`.
        if source == Register::P {
            let mut status = Status(value);
            status.set(StatusFlag::Break, true);
            status.set(StatusFlag::Unused, true);
            value = status.0;
        }

        self.push_stack_u8(bus, value);
    }

    fn op_pull_stack(&mut self, bus: &impl Bus, target: Register) {
        let value = self.pull_stack_u8(bus);
        self.write_register(target, value);
    }

    fn op_jump_subroutine(&mut self, bus: &mut impl Bus, operand: Operand) {
        let address = operand.address();

        // `JSR` pushes the address of the last byte of itself, not the address of the next
        // instruction - `RTS` corrects for this by adding 1 back.
        let return_address = self.pc.wrapping_sub(1);
        self.push_stack_u16(bus, return_address);

        self.pc = address;
    }

    /// `BRK` reads (and discards) a signature byte after its own opcode before pushing - real
    /// silicon does this so a software handler can distinguish a deliberate `BRK` from a
    /// hardware `IRQ` by checking the return address. Push that adjusted `PC`, then run the
    /// usual interrupt sequence.
    fn op_break(&mut self, bus: &mut impl Bus) {
        self.pc = self.pc.wrapping_add(1);
        self.interrupt(bus, Interrupt::BRK);
    }

    fn op_return(&mut self, bus: &impl Bus) {
        let address = self.pull_stack_u16(bus);
        self.pc = address.wrapping_add(1);
    }

    fn op_return_from_interrupt(&mut self, bus: &impl Bus) {
        let p = self.pull_stack_u8(bus);
        let pc = self.pull_stack_u16(bus);

        self.write_register(Register::P, p);
        self.pc = pc;
    }

    fn op_branch_if(&mut self, operand: Operand, condition: bool) {
        if condition {
            let crossed = operand.page_boundary_crossed;
            self.pc = operand.address();
            self.wait_cycles += 1;

            if crossed {
                self.wait_cycles += 1;
            }
        }
    }

    fn op_logical(&mut self, bus: &impl Bus, operand: Operand, f: fn(u8, u8) -> u8) {
        let value = operand.read(self, bus);
        let result = f(self.a, value);
        self.write_register(Register::A, result);
    }

    fn op_bit(&mut self, bus: &impl Bus, operand: Operand) {
        let value = operand.read(self, bus);
        let result = value & self.a;

        self.p.set(StatusFlag::Zero, result == 0);
        self.p.set(StatusFlag::Overflow, value & 0b0100_0000 > 0);
        self.p.set(StatusFlag::Negative, value & 0b1000_0000 > 0);
    }

    fn op_add(&mut self, bus: &impl Bus, operand: Operand) {
        let rhs = operand.read(self, bus);

        if self.p.get(StatusFlag::DecimalMode) {
            self.add_decimal(rhs);
        } else {
            self.add_binary(rhs);
        }
    }

    fn add_binary(&mut self, rhs: u8) {
        let lhs = self.a;
        let carry_in: u8 = self.p.get(StatusFlag::Carry).into();

        let (partial, overflow_a) = lhs.overflowing_add(rhs);
        let (result, overflow_b) = partial.overflowing_add(carry_in);
        self.p.set(StatusFlag::Carry, overflow_a || overflow_b);

        // Signed overflow happens when `lhs` and `rhs` share a sign but the result doesn't:
        // `Positive + Positive = Negative` or `Negative + Negative = Positive`.
        let lhs_sign = lhs & 0b1000_0000;
        let rhs_sign = rhs & 0b1000_0000;
        let result_sign = result & 0b1000_0000;
        self.p.set(StatusFlag::Overflow, (lhs_sign == rhs_sign) && (lhs_sign != result_sign));

        self.write_register(Register::A, result);
    }

    /// BCD-adjusted `ADC`. Matches the documented NMOS decimal-mode quirk where `Zero`,
    /// `Overflow` and `Negative` reflect the *uncorrected binary* sum, while `Carry` and the
    /// written value reflect the BCD-corrected one.
    fn add_decimal(&mut self, rhs: u8) {
        let lhs = self.a;
        let carry_in: u8 = self.p.get(StatusFlag::Carry).into();

        let binary_result = lhs.wrapping_add(rhs).wrapping_add(carry_in);
        self.p.set(StatusFlag::Zero, binary_result == 0);
        self.p.set(StatusFlag::Negative, binary_result & 0b1000_0000 > 0);

        let lhs_sign = lhs & 0b1000_0000;
        let rhs_sign = rhs & 0b1000_0000;
        self.p.set(
            StatusFlag::Overflow,
            (lhs_sign == rhs_sign) && (lhs_sign != (binary_result & 0b1000_0000)),
        );

        let mut lo = (lhs & 0x0F).wrapping_add(rhs & 0x0F).wrapping_add(carry_in);
        if lo > 9 {
            lo = lo.wrapping_add(6);
        }
        let carry_mid: u8 = if lo > 0x0F { 1 } else { 0 };

        let mut hi = (lhs >> 4).wrapping_add(rhs >> 4).wrapping_add(carry_mid);
        let carry_out = hi > 9;
        if carry_out {
            hi = hi.wrapping_add(6);
        }

        self.p.set(StatusFlag::Carry, carry_out);
        self.a = ((hi & 0x0F) << 4) | (lo & 0x0F);
    }

    fn op_sub(&mut self, bus: &impl Bus, operand: Operand) {
        let rhs = operand.read(self, bus);

        if self.p.get(StatusFlag::DecimalMode) {
            self.sub_decimal(rhs);
        } else {
            self.sub_binary(rhs);
        }
    }

    fn sub_binary(&mut self, rhs: u8) {
        let lhs = self.a;
        let carry_in: u8 = self.p.get(StatusFlag::Carry).into();
        let borrow = 1 - carry_in;

        let (partial, overflow_a) = lhs.overflowing_sub(rhs);
        let (result, overflow_b) = partial.overflowing_sub(borrow);
        self.p.set(StatusFlag::Carry, !(overflow_a || overflow_b));

        // Subtraction overflows when `lhs` and `rhs` differ in sign and `lhs` and the result do
        // too.
        let lhs_sign = lhs & 0b1000_0000;
        let rhs_sign = rhs & 0b1000_0000;
        let result_sign = result & 0b1000_0000;
        self.p.set(StatusFlag::Overflow, (lhs_sign != rhs_sign) && (lhs_sign != result_sign));

        self.write_register(Register::A, result);
    }

    /// BCD-adjusted `SBC`, mirroring the same binary-flags-but-decimal-result quirk as
    /// `add_decimal`.
    fn sub_decimal(&mut self, rhs: u8) {
        let lhs = self.a;
        let carry_in: u8 = self.p.get(StatusFlag::Carry).into();
        let borrow = 1 - carry_in;

        let (partial, overflow_a) = lhs.overflowing_sub(rhs);
        let (binary_result, overflow_b) = partial.overflowing_sub(borrow);
        self.p.set(StatusFlag::Carry, !(overflow_a || overflow_b));
        self.p.set(StatusFlag::Zero, binary_result == 0);
        self.p.set(StatusFlag::Negative, binary_result & 0b1000_0000 > 0);

        let lhs_sign = lhs & 0b1000_0000;
        let rhs_sign = rhs & 0b1000_0000;
        self.p.set(
            StatusFlag::Overflow,
            (lhs_sign != rhs_sign) && (lhs_sign != (binary_result & 0b1000_0000)),
        );

        let mut lo = (lhs as i16 & 0x0F) - (rhs as i16 & 0x0F) - (borrow as i16);
        if lo < 0 {
            lo -= 6;
        }

        let mut hi = (lhs as i16 >> 4) - (rhs as i16 >> 4) - if lo < 0 { 1 } else { 0 };
        if hi < 0 {
            hi -= 6;
        }

        self.a = (((hi << 4) & 0xF0) | (lo & 0x0F)) as u8;
    }

    fn op_compare(&mut self, bus: &impl Bus, register: Register, operand: Operand) {
        let register_value = self.read_register(register);
        let value = operand.read(self, bus);
        let result = register_value.wrapping_sub(value);

        // Compare behaves like a subtraction that doesn't write its result anywhere - these
        // flags describe `register - value`.
        self.p.set(StatusFlag::Carry, register_value >= value);
        self.p.set(StatusFlag::Zero, result == 0);
        self.p.set(StatusFlag::Negative, result & 0b1000_0000 > 0);
    }

    fn op_shift_left(&mut self, bus: &mut impl Bus, operand: Operand) -> u8 {
        let (input, output) = operand.modify(self, bus, |value| value.wrapping_shl(1));
        self.p.set(StatusFlag::Carry, input & 0b1000_0000 > 0);
        output
    }

    fn op_shift_right(&mut self, bus: &mut impl Bus, operand: Operand) -> u8 {
        let (input, output) = operand.modify(self, bus, |value| value.wrapping_shr(1));
        self.p.set(StatusFlag::Carry, input & 0b0000_0001 > 0);
        output
    }

    fn op_rotate_left(&mut self, bus: &mut impl Bus, operand: Operand) -> u8 {
        let carry_in = u8::from(self.p.get(StatusFlag::Carry));
        let (input, output) = operand.modify(self, bus, |value| value.wrapping_shl(1) | carry_in);
        self.p.set(StatusFlag::Carry, input & 0b1000_0000 > 0);
        output
    }

    fn op_rotate_right(&mut self, bus: &mut impl Bus, operand: Operand) -> u8 {
        let carry_in = u8::from(self.p.get(StatusFlag::Carry)) << 7;
        let (input, output) = operand.modify(self, bus, |value| value.wrapping_shr(1) | carry_in);
        self.p.set(StatusFlag::Carry, input & 0b0000_0001 > 0);
        output
    }
}

impl Default for MOS6502 {
    fn default() -> MOS6502 {
        MOS6502::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::bus::RamBus16kb;

    /// When the `MOS6502` resets it should start the program counter at the address stored in
    /// `0xFFFC`.
    #[test]
    pub fn program_counter_is_initialized_correctly() {
        let mut bus = RamBus16kb::new();
        bus.write_u16(0xFFFC, 0xFF00);

        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus);

        assert_eq!(cpu.pc, 0xFF00);
    }

    #[test]
    pub fn op_load_immediate() {
        let program = vec![
            0xA9, 0xBB, // LDA #$BB
            0xA2, 0x55, // LDX #$55
            0xA0, 0x25, // LDY #$25
        ];
        let mut bus = RamBus16kb::new().with_program(program);

        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_until_brk(&mut bus);

        assert_eq!(cpu.a, 0xBB);
        assert_eq!(cpu.x, 0x55);
        assert_eq!(cpu.y, 0x25);
    }

    #[test]
    pub fn op_store_zero_page() {
        let program = vec![
            0xA9, 0xBE, // LDA #$BE
            0xA2, 0x40, // LDX #$40
            0xA0, 0xFF, // LDY #$FF
            0x85, 0x00, // STA $00
            0x86, 0x01, // STX $01
            0x84, 0x02, // STY $02
        ];
        let mut bus = RamBus16kb::new().with_program(program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_until_brk(&mut bus);

        assert_eq!(bus.memory[0x00], 0xBE);
        assert_eq!(bus.memory[0x01], 0x40);
        assert_eq!(bus.memory[0x02], 0xFF);
    }

    /// Pushing a 16 bit address on the stack is a bit fiddly. This test checks that `JSR` and
    /// `RTS` write exactly the right bytes to the stack, in the right order.
    #[test]
    pub fn op_jump_subroutine_and_return() {
        let main_program = vec![
            0xA2, 0xFF, // 0xF000: LDX #$FF
            0x9A,       // 0xF002: TXS
            0xA9, 0xBB, // 0xF003: LDA #$BB
            0x20, 0x00, 0x02, // 0xF005: JSR $0200
            0xA2, 0xBE, // 0xF008: LDX #$BE
        ];

        let sub_program = vec![
            0xA9, 0xFF, // 0x0200: LDA #$FF
            0x60,       // 0x0202: RTS
        ];

        let mut bus = RamBus16kb::new()
            .with_memory_at(0xF000, main_program)
            .with_memory_at(0x0200, sub_program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);

        // Pretend we already ran the reset sequence and were placed at 0xF000.
        cpu.pc = 0xF000;
        cpu.wait_cycles = 0;

        cpu.cycle_to_next_instruction(&mut bus); // LDX #$FF
        cpu.cycle_to_next_instruction(&mut bus); // TXS
        cpu.cycle_to_next_instruction(&mut bus); // LDA #$BB
        assert_eq!(cpu.a, 0xBB);
        assert_eq!(cpu.sp, 0xFF);

        // We expect the stack to contain [0xF0, 0x07] - 0x07 rather than 0x08 because `JSR`
        // pushes the current address minus 1.
        assert_eq!(cpu.pc, 0xF005);
        cpu.cycle_to_next_instruction(&mut bus); // JSR $0200
        assert_eq!(cpu.pc, 0x0200);
        assert_eq!(bus.memory[0x01FF], 0xF0);
        assert_eq!(bus.memory[0x01FE], 0x07);

        // We expect to jump back to 0xF008 because `RTS` adds 1 to the address it pulls.
        cpu.cycle_to_next_instruction(&mut bus); // LDA #$FF
        cpu.cycle_to_next_instruction(&mut bus); // RTS
        assert_eq!(cpu.a, 0xFF);
        assert_eq!(cpu.pc, 0xF008);

        cpu.cycle_to_next_instruction(&mut bus); // LDX #$BE
        assert_eq!(cpu.x, 0xBE);
    }

    #[test]
    pub fn op_push_pop() {
        let program = vec![
            0xA2, 0xFF, // LDX #$FF
            0x9A,       // TXS
            0xA9, 0xE0, // LDA #$E0
            0x48,       // PHA
            0xA9, 0xBB, // LDA #$BB
            0x48,       // PHA
            0x8A,       // TXA
            0x48,       // PHA
            0xA9, 0x00, // LDA #$00
            0x68,       // PLA
            0x68,       // PLA
            0x68,       // PLA
        ];

        let mut bus = RamBus16kb::new().with_program(program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // drain the reset sequence

        cpu.cycle_to_next_instruction(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus);
        assert_eq!(cpu.sp, 0xFF);

        cpu.cycle_to_next_instruction(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus);
        assert_eq!(cpu.sp, 0xFE);
        assert_eq!(bus.memory[0x01FF], 0xE0);

        cpu.cycle_to_next_instruction(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus);
        assert_eq!(cpu.sp, 0xFD);
        assert_eq!(bus.memory[0x01FE], 0xBB);

        cpu.cycle_to_next_instruction(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus);
        assert_eq!(cpu.sp, 0xFC);
        assert_eq!(bus.memory[0x01FD], 0xFF);

        cpu.cycle_to_next_instruction(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus);
        assert_eq!(cpu.sp, 0xFD);
        assert_eq!(cpu.a, 0xFF);

        cpu.cycle_to_next_instruction(&mut bus);
        assert_eq!(cpu.sp, 0xFE);
        assert_eq!(cpu.a, 0xBB);

        cpu.cycle_to_next_instruction(&mut bus);
        assert_eq!(cpu.sp, 0xFF);
        assert_eq!(cpu.a, 0xE0);
    }

    #[test]
    pub fn adc_sets_overflow_on_signed_overflow() {
        let program = vec![
            0xA9, 0x7F, // LDA #$7F  (127)
            0x69, 0x01, // ADC #$01 -> 128, signed overflow
        ];
        let mut bus = RamBus16kb::new().with_program(program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_until_brk(&mut bus);

        assert_eq!(cpu.a, 0x80);
        assert!(cpu.p.get(StatusFlag::Overflow));
        assert!(cpu.p.get(StatusFlag::Negative));
        assert!(!cpu.p.get(StatusFlag::Carry));
    }

    #[test]
    pub fn adc_decimal_mode_adds_bcd_operands() {
        let program = vec![
            0xF8,       // SED
            0xA9, 0x58, // LDA #$58  (58 in BCD)
            0x69, 0x46, // ADC #$46  (46 in BCD) -> 104 -> wraps to 04 with carry set
        ];
        let mut bus = RamBus16kb::new().with_program(program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_until_brk(&mut bus);

        assert_eq!(cpu.a, 0x04);
        assert!(cpu.p.get(StatusFlag::Carry));
    }

    #[test]
    pub fn sbc_decimal_mode_subtracts_bcd_operands() {
        let program = vec![
            0xF8,       // SED
            0x38,       // SEC (no borrow)
            0xA9, 0x42, // LDA #$42 (42 in BCD)
            0xE9, 0x15, // SBC #$15 (15 in BCD) -> 27
        ];
        let mut bus = RamBus16kb::new().with_program(program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_until_brk(&mut bus);

        assert_eq!(cpu.a, 0x27);
        assert!(cpu.p.get(StatusFlag::Carry));
    }

    #[test]
    pub fn absolute_x_read_charges_an_extra_cycle_only_when_crossing_a_page() {
        let same_page_program = vec![
            0xA2, 0x01, // LDX #$01
            0xBD, 0x00, 0x00, // LDA $0000,X (no page cross)
        ];
        let mut bus = RamBus16kb::new().with_program(same_page_program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // LDX
        let cycles_before = cpu.elapsed_cycles;
        cpu.cycle_to_next_instruction(&mut bus); // LDA (no cross: 4 cycles)
        assert_eq!(cpu.elapsed_cycles - cycles_before, 4);

        let crossing_program = vec![
            0xA2, 0x01, // LDX #$01
            0xBD, 0xFF, 0x00, // LDA $00FF,X (crosses into page 1)
        ];
        let mut bus = RamBus16kb::new().with_program(crossing_program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // LDX
        let cycles_before = cpu.elapsed_cycles;
        cpu.cycle_to_next_instruction(&mut bus); // LDA (crosses: 5 cycles)
        assert_eq!(cpu.elapsed_cycles - cycles_before, 5);
    }

    #[test]
    pub fn store_absolute_x_never_charges_the_page_cross_penalty() {
        let program = vec![
            0xA2, 0x01,       // LDX #$01
            0xA9, 0x42,       // LDA #$42
            0x9D, 0xFF, 0x00, // STA $00FF,X (crosses, but store cost is flat)
        ];
        let mut bus = RamBus16kb::new().with_program(program);
        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // LDX
        cpu.cycle_to_next_instruction(&mut bus); // LDA
        let cycles_before = cpu.elapsed_cycles;
        cpu.cycle_to_next_instruction(&mut bus); // STA: always 5 cycles
        assert_eq!(cpu.elapsed_cycles - cycles_before, 5);
        assert_eq!(bus.memory[0x0100], 0x42);
    }

    #[test]
    pub fn brk_pushes_pc_plus_two_and_sets_break_and_unused_on_the_pushed_status() {
        let program = vec![0x00, 0xEA]; // BRK, NOP (the NOP is BRK's discarded signature byte)
        let mut bus = RamBus16kb::new().with_program(program);
        bus.write_u16(IRQ_VECTOR_ADDRESS, 0xE000);

        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // drain reset

        let brk_address = cpu.pc;
        cpu.cycle_to_next_instruction(&mut bus); // BRK

        assert_eq!(cpu.pc, 0xE000);
        assert!(cpu.p.get(StatusFlag::InterruptDisable));

        let pushed_status = bus.memory[(STACK_START_ADDRESS + cpu.sp.wrapping_add(1) as u16) as usize];
        assert!(Status(pushed_status).get(StatusFlag::Break));
        assert!(Status(pushed_status).get(StatusFlag::Unused));

        let pushed_pc_lo = bus.memory[(STACK_START_ADDRESS + cpu.sp.wrapping_add(2) as u16) as usize];
        let pushed_pc_hi = bus.memory[(STACK_START_ADDRESS + cpu.sp.wrapping_add(3) as u16) as usize];
        let pushed_pc = u16::from_le_bytes([pushed_pc_lo, pushed_pc_hi]);
        assert_eq!(pushed_pc, brk_address.wrapping_add(2));
    }

    #[test]
    pub fn nmi_takes_priority_over_a_simultaneously_pending_irq() {
        let mut bus = RamBus16kb::new()
            .with_program(vec![0xEA]) // NOP, just something to run off of
            .with_nmi_vector_address(0xF000);
        bus.write_u16(IRQ_VECTOR_ADDRESS, 0xE000);

        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // drain reset

        cpu.nmi();
        cpu.irq(true);
        cpu.cycle_to_next_instruction(&mut bus);

        assert_eq!(cpu.pc, 0xF000);
    }

    #[test]
    pub fn irq_is_ignored_while_interrupt_disable_is_set() {
        let mut bus = RamBus16kb::new().with_program(vec![0x78, 0xEA]); // SEI, NOP
        bus.write_u16(IRQ_VECTOR_ADDRESS, 0xE000);

        let mut cpu = MOS6502::new();
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // drain reset
        cpu.cycle_to_next_instruction(&mut bus); // SEI

        cpu.irq(true);
        cpu.cycle_to_next_instruction(&mut bus); // NOP should still run, not the IRQ vector

        assert_ne!(cpu.pc, 0xE000);
    }

    /// When the NES executes DMA starting on an odd elapsed-cycle count, starting the transfer
    /// costs an extra cycle.
    #[test]
    pub fn nes_style_ppu_dma_on_odd_cycle() {
        let program = vec![
            0xA2, 0x02,       // LDX #$02
            0x8E, 0x14, 0x40, // STX $4014 (triggers DMA from $0200)
            0xA9, 0xE0,       // LDA #$E0
        ];

        let oam_data: Vec<u8> = (0..=255).collect();

        let mut bus = RamBus16kb::new()
            .with_program(program)
            .with_memory_at(0x0200, oam_data.clone());

        let nes_dma = DMA {
            trigger_address: 0x4014,
            target_address: 0x2004,
            bytes_to_transfer: 256,
        };

        let mut cpu = MOS6502::new().with_dma(nes_dma);
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // drain reset

        cpu.cycle_to_next_instruction(&mut bus); // LDX
        cpu.cycle_to_next_instruction(&mut bus); // STX (triggers DMA)

        // +7 reset, +2 LDX, +4 STX, +2 odd-cycle DMA start
        assert_eq!(cpu.elapsed_cycles, 15);

        for byte in oam_data {
            cpu.tick(&mut bus);
            cpu.tick(&mut bus);
            assert_eq!(bus.memory[0x2004], byte);
        }

        // +512 for the DMA transfer itself
        assert_eq!(cpu.elapsed_cycles, 514 + 13);

        cpu.cycle_to_next_instruction(&mut bus); // LDA #$E0, resumes normally
        assert_eq!(cpu.a, 0xE0);
    }

    #[test]
    pub fn nes_style_ppu_dma_on_even_cycle() {
        let program = vec![
            0xA2, 0x02,       // LDX #$02    (+2)
            0xA4, 0x00,       // LDY $00     (+3, makes the cycle count even)
            0x8E, 0x14, 0x40, // STX $4014   (+4, +1 for the even-cycle DMA start)
        ];

        let mut bus = RamBus16kb::new().with_program(program);

        let nes_dma = DMA {
            trigger_address: 0x4014,
            target_address: 0x2004,
            bytes_to_transfer: 256,
        };

        let mut cpu = MOS6502::new().with_dma(nes_dma);
        cpu.reset(&mut bus);
        cpu.cycle_to_next_instruction(&mut bus); // drain reset

        cpu.cycle_to_next_instruction(&mut bus); // LDX
        cpu.cycle_to_next_instruction(&mut bus); // LDY
        cpu.cycle_to_next_instruction(&mut bus); // STX

        assert_eq!(cpu.elapsed_cycles, 17);
    }
}
