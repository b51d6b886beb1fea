use super::{MOS6502, Bus};
use super::register::Register;
use super::status::StatusFlag;

/// The value, register or memory location targeted by a resolved `AddressingMode`.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum OperandTarget {
    /// Addressing modes like `Implied` don't target anything; reads return `0` and are
    /// discarded.
    Implied,

    /// The operand targets the accumulator directly, e.g. `ROL A`.
    Accumulator,

    /// The operand is a literal value taken from the instruction stream, e.g. `LDA #$AA`.
    Immediate(u8),

    /// The operand is a fully resolved memory address.
    Memory(u16),
}

/// A fully realized operand produced by `AddressingMode::fetch`.
///
/// `Operand` can be read, written and modified uniformly across every addressing mode; the
/// command implementations on `MOS6502` don't need to know which addressing mode produced it.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Operand {
    pub target: OperandTarget,

    /// True if resolving this operand's address crossed a page boundary. Only meaningful for
    /// `AbsoluteX`, `AbsoluteY`, `IndirectIndexed` and `Relative` - read-class instructions using
    /// those modes charge an extra cycle when this is set.
    pub page_boundary_crossed: bool,
}

impl Operand {
    /// The resolved memory address of this operand.
    ///
    /// Only valid for `OperandTarget::Memory` - every opcode that calls this (`JMP`, `JSR`, the
    /// branches) is only ever paired with addressing modes that produce a memory target.
    pub fn address(&self) -> u16 {
        match self.target {
            OperandTarget::Memory(address) => address,
            _ => unreachable!("operand has no memory address: {:?}", self.target),
        }
    }

    pub fn read(&self, cpu: &MOS6502, bus: &impl Bus) -> u8 {
        match self.target {
            OperandTarget::Implied => 0,
            OperandTarget::Accumulator => cpu.a,
            OperandTarget::Immediate(value) => value,
            OperandTarget::Memory(address) => bus.read_u8(address),
        }
    }

    pub fn write(&self, cpu: &mut MOS6502, bus: &mut impl Bus, value: u8) {
        match self.target {
            OperandTarget::Accumulator => cpu.write_register(Register::A, value),
            OperandTarget::Memory(address) => cpu.write_u8(bus, address, value),
            OperandTarget::Implied | OperandTarget::Immediate(_) => {
                unreachable!("operand is not writable: {:?}", self.target)
            }
        }
    }

    /// Read-modify-write: read the current value, apply `f`, write the result back.
    ///
    /// On real hardware a memory read-modify-write writes the unmodified value back to memory
    /// before writing the final result; we replicate that so any bus-side observer (like a
    /// memory-mapped DMA trigger) sees the same two writes real silicon would perform.
    ///
    /// `Zero` and `Negative` are updated from the output even when the target is memory, since
    /// `INC`/`DEC`/the shifts all affect those flags regardless of target.
    pub fn modify(&self, cpu: &mut MOS6502, bus: &mut impl Bus, f: impl FnOnce(u8) -> u8) -> (u8, u8) {
        let input = self.read(cpu, bus);
        let output = f(input);

        match self.target {
            OperandTarget::Accumulator => cpu.write_register(Register::A, output),
            OperandTarget::Memory(address) => {
                cpu.write_u8(bus, address, input);
                cpu.write_u8(bus, address, output);
            }
            OperandTarget::Implied | OperandTarget::Immediate(_) => {
                unreachable!("operand is not modifiable: {:?}", self.target)
            }
        }

        cpu.p.set(StatusFlag::Zero, output == 0);
        cpu.p.set(StatusFlag::Negative, output & 0b1000_0000 > 0);

        (input, output)
    }
}
