use super::addressing_mode::AddressingMode;
use super::opcode::Opcode;

/// A fully decoded 6502 instruction: the `Opcode` to execute, the `AddressingMode` to resolve
/// its operand with, and the base cost (in bytes and cycles) of the instruction as documented
/// for the NMOS 6502.
///
/// `cycles` is the *base* cost. A handful of read-class instructions (`LDA`, `LDX`, `LDY`,
/// `AND`, `ORA`, `EOR`, `ADC`, `SBC`, `CMP`) using `AbsoluteX`, `AbsoluteY` or `IndirectIndexed`
/// charge one extra cycle on top of this when resolving their operand crosses a page boundary;
/// every other addressing mode's cost is exactly `cycles` regardless of what address it
/// resolves to.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub addressing_mode: AddressingMode,
    pub cycles: u8,
    pub bytes: u8,
}

impl Instruction {
    const fn new(opcode: Opcode, addressing_mode: AddressingMode, cycles: u8, bytes: u8) -> Instruction {
        Instruction { opcode, addressing_mode, cycles, bytes }
    }

    /// Every byte value decodes to *some* instruction - undocumented opcodes decode to
    /// `Opcode::Unknown`, a one-byte, one-cycle no-op, so the CPU never has to reject a byte.
    pub fn decode(byte: u8) -> Instruction {
        INSTRUCTIONS[byte as usize]
    }
}

const UNKNOWN: Instruction = Instruction::new(Opcode::Unknown, AddressingMode::Implied, 1, 1);

use AddressingMode::*;
use Opcode::*;

/// Instruction table for every official 6502 opcode, indexed by opcode byte.
///
/// Every byte not assigned a documented instruction decodes to `UNKNOWN`.
static INSTRUCTIONS: [Instruction; 256] = [
    /*0x00*/ Instruction::new(BRK, Implied, 7, 1),
    /*0x01*/ Instruction::new(ORA, IndexedIndirect, 6, 2),
    /*0x02*/ UNKNOWN,
    /*0x03*/ UNKNOWN,
    /*0x04*/ UNKNOWN,
    /*0x05*/ Instruction::new(ORA, ZeroPage, 3, 2),
    /*0x06*/ Instruction::new(ASL, ZeroPage, 5, 2),
    /*0x07*/ UNKNOWN,
    /*0x08*/ Instruction::new(PHP, Implied, 3, 1),
    /*0x09*/ Instruction::new(ORA, Immediate, 2, 2),
    /*0x0A*/ Instruction::new(ASL, Accumulator, 2, 1),
    /*0x0B*/ UNKNOWN,
    /*0x0C*/ UNKNOWN,
    /*0x0D*/ Instruction::new(ORA, Absolute, 4, 3),
    /*0x0E*/ Instruction::new(ASL, Absolute, 6, 3),
    /*0x0F*/ UNKNOWN,

    /*0x10*/ Instruction::new(BPL, Relative, 2, 2),
    /*0x11*/ Instruction::new(ORA, IndirectIndexed, 5, 2),
    /*0x12*/ UNKNOWN,
    /*0x13*/ UNKNOWN,
    /*0x14*/ UNKNOWN,
    /*0x15*/ Instruction::new(ORA, ZeroPageX, 4, 2),
    /*0x16*/ Instruction::new(ASL, ZeroPageX, 6, 2),
    /*0x17*/ UNKNOWN,
    /*0x18*/ Instruction::new(CLC, Implied, 2, 1),
    /*0x19*/ Instruction::new(ORA, AbsoluteY, 4, 3),
    /*0x1A*/ UNKNOWN,
    /*0x1B*/ UNKNOWN,
    /*0x1C*/ UNKNOWN,
    /*0x1D*/ Instruction::new(ORA, AbsoluteX, 4, 3),
    /*0x1E*/ Instruction::new(ASL, AbsoluteX, 7, 3),
    /*0x1F*/ UNKNOWN,

    /*0x20*/ Instruction::new(JSR, Absolute, 6, 3),
    /*0x21*/ Instruction::new(AND, IndexedIndirect, 6, 2),
    /*0x22*/ UNKNOWN,
    /*0x23*/ UNKNOWN,
    /*0x24*/ Instruction::new(BIT, ZeroPage, 3, 2),
    /*0x25*/ Instruction::new(AND, ZeroPage, 3, 2),
    /*0x26*/ Instruction::new(ROL, ZeroPage, 5, 2),
    /*0x27*/ UNKNOWN,
    /*0x28*/ Instruction::new(PLP, Implied, 4, 1),
    /*0x29*/ Instruction::new(AND, Immediate, 2, 2),
    /*0x2A*/ Instruction::new(ROL, Accumulator, 2, 1),
    /*0x2B*/ UNKNOWN,
    /*0x2C*/ Instruction::new(BIT, Absolute, 4, 3),
    /*0x2D*/ Instruction::new(AND, Absolute, 4, 3),
    /*0x2E*/ Instruction::new(ROL, Absolute, 6, 3),
    /*0x2F*/ UNKNOWN,

    /*0x30*/ Instruction::new(BMI, Relative, 2, 2),
    /*0x31*/ Instruction::new(AND, IndirectIndexed, 5, 2),
    /*0x32*/ UNKNOWN,
    /*0x33*/ UNKNOWN,
    /*0x34*/ UNKNOWN,
    /*0x35*/ Instruction::new(AND, ZeroPageX, 4, 2),
    /*0x36*/ Instruction::new(ROL, ZeroPageX, 6, 2),
    /*0x37*/ UNKNOWN,
    /*0x38*/ Instruction::new(SEC, Implied, 2, 1),
    /*0x39*/ Instruction::new(AND, AbsoluteY, 4, 3),
    /*0x3A*/ UNKNOWN,
    /*0x3B*/ UNKNOWN,
    /*0x3C*/ UNKNOWN,
    /*0x3D*/ Instruction::new(AND, AbsoluteX, 4, 3),
    /*0x3E*/ Instruction::new(ROL, AbsoluteX, 7, 3),
    /*0x3F*/ UNKNOWN,

    /*0x40*/ Instruction::new(RTI, Implied, 6, 1),
    /*0x41*/ Instruction::new(EOR, IndexedIndirect, 6, 2),
    /*0x42*/ UNKNOWN,
    /*0x43*/ UNKNOWN,
    /*0x44*/ UNKNOWN,
    /*0x45*/ Instruction::new(EOR, ZeroPage, 3, 2),
    /*0x46*/ Instruction::new(LSR, ZeroPage, 5, 2),
    /*0x47*/ UNKNOWN,
    /*0x48*/ Instruction::new(PHA, Implied, 3, 1),
    /*0x49*/ Instruction::new(EOR, Immediate, 2, 2),
    /*0x4A*/ Instruction::new(LSR, Accumulator, 2, 1),
    /*0x4B*/ UNKNOWN,
    /*0x4C*/ Instruction::new(JMP, Absolute, 3, 3),
    /*0x4D*/ Instruction::new(EOR, Absolute, 4, 3),
    /*0x4E*/ Instruction::new(LSR, Absolute, 6, 3),
    /*0x4F*/ UNKNOWN,

    /*0x50*/ Instruction::new(BVC, Relative, 2, 2),
    /*0x51*/ Instruction::new(EOR, IndirectIndexed, 5, 2),
    /*0x52*/ UNKNOWN,
    /*0x53*/ UNKNOWN,
    /*0x54*/ UNKNOWN,
    /*0x55*/ Instruction::new(EOR, ZeroPageX, 4, 2),
    /*0x56*/ Instruction::new(LSR, ZeroPageX, 6, 2),
    /*0x57*/ UNKNOWN,
    /*0x58*/ Instruction::new(CLI, Implied, 2, 1),
    /*0x59*/ Instruction::new(EOR, AbsoluteY, 4, 3),
    /*0x5A*/ UNKNOWN,
    /*0x5B*/ UNKNOWN,
    /*0x5C*/ UNKNOWN,
    /*0x5D*/ Instruction::new(EOR, AbsoluteX, 4, 3),
    /*0x5E*/ Instruction::new(LSR, AbsoluteX, 7, 3),
    /*0x5F*/ UNKNOWN,

    /*0x60*/ Instruction::new(RTS, Implied, 6, 1),
    /*0x61*/ Instruction::new(ADC, IndexedIndirect, 6, 2),
    /*0x62*/ UNKNOWN,
    /*0x63*/ UNKNOWN,
    /*0x64*/ UNKNOWN,
    /*0x65*/ Instruction::new(ADC, ZeroPage, 3, 2),
    /*0x66*/ Instruction::new(ROR, ZeroPage, 5, 2),
    /*0x67*/ UNKNOWN,
    /*0x68*/ Instruction::new(PLA, Implied, 4, 1),
    /*0x69*/ Instruction::new(ADC, Immediate, 2, 2),
    /*0x6A*/ Instruction::new(ROR, Accumulator, 2, 1),
    /*0x6B*/ UNKNOWN,
    /*0x6C*/ Instruction::new(JMP, Indirect, 5, 3),
    /*0x6D*/ Instruction::new(ADC, Absolute, 4, 3),
    /*0x6E*/ Instruction::new(ROR, Absolute, 6, 3),
    /*0x6F*/ UNKNOWN,

    /*0x70*/ Instruction::new(BVS, Relative, 2, 2),
    /*0x71*/ Instruction::new(ADC, IndirectIndexed, 5, 2),
    /*0x72*/ UNKNOWN,
    /*0x73*/ UNKNOWN,
    /*0x74*/ UNKNOWN,
    /*0x75*/ Instruction::new(ADC, ZeroPageX, 4, 2),
    /*0x76*/ Instruction::new(ROR, ZeroPageX, 6, 2),
    /*0x77*/ UNKNOWN,
    /*0x78*/ Instruction::new(SEI, Implied, 2, 1),
    /*0x79*/ Instruction::new(ADC, AbsoluteY, 4, 3),
    /*0x7A*/ UNKNOWN,
    /*0x7B*/ UNKNOWN,
    /*0x7C*/ UNKNOWN,
    /*0x7D*/ Instruction::new(ADC, AbsoluteX, 4, 3),
    /*0x7E*/ Instruction::new(ROR, AbsoluteX, 7, 3),
    /*0x7F*/ UNKNOWN,

    /*0x80*/ UNKNOWN,
    /*0x81*/ Instruction::new(STA, IndexedIndirect, 6, 2),
    /*0x82*/ UNKNOWN,
    /*0x83*/ UNKNOWN,
    /*0x84*/ Instruction::new(STY, ZeroPage, 3, 2),
    /*0x85*/ Instruction::new(STA, ZeroPage, 3, 2),
    /*0x86*/ Instruction::new(STX, ZeroPage, 3, 2),
    /*0x87*/ UNKNOWN,
    /*0x88*/ Instruction::new(DEY, Implied, 2, 1),
    /*0x89*/ UNKNOWN,
    /*0x8A*/ Instruction::new(TXA, Implied, 2, 1),
    /*0x8B*/ UNKNOWN,
    /*0x8C*/ Instruction::new(STY, Absolute, 4, 3),
    /*0x8D*/ Instruction::new(STA, Absolute, 4, 3),
    /*0x8E*/ Instruction::new(STX, Absolute, 4, 3),
    /*0x8F*/ UNKNOWN,

    /*0x90*/ Instruction::new(BCC, Relative, 2, 2),
    /*0x91*/ Instruction::new(STA, IndirectIndexed, 6, 2),
    /*0x92*/ UNKNOWN,
    /*0x93*/ UNKNOWN,
    /*0x94*/ Instruction::new(STY, ZeroPageX, 4, 2),
    /*0x95*/ Instruction::new(STA, ZeroPageX, 4, 2),
    /*0x96*/ Instruction::new(STX, ZeroPageY, 4, 2),
    /*0x97*/ UNKNOWN,
    /*0x98*/ Instruction::new(TYA, Implied, 2, 1),
    /*0x99*/ Instruction::new(STA, AbsoluteY, 5, 3),
    /*0x9A*/ Instruction::new(TXS, Implied, 2, 1),
    /*0x9B*/ UNKNOWN,
    /*0x9C*/ UNKNOWN,
    /*0x9D*/ Instruction::new(STA, AbsoluteX, 5, 3),
    /*0x9E*/ UNKNOWN,
    /*0x9F*/ UNKNOWN,

    /*0xA0*/ Instruction::new(LDY, Immediate, 2, 2),
    /*0xA1*/ Instruction::new(LDA, IndexedIndirect, 6, 2),
    /*0xA2*/ Instruction::new(LDX, Immediate, 2, 2),
    /*0xA3*/ UNKNOWN,
    /*0xA4*/ Instruction::new(LDY, ZeroPage, 3, 2),
    /*0xA5*/ Instruction::new(LDA, ZeroPage, 3, 2),
    /*0xA6*/ Instruction::new(LDX, ZeroPage, 3, 2),
    /*0xA7*/ UNKNOWN,
    /*0xA8*/ Instruction::new(TAY, Implied, 2, 1),
    /*0xA9*/ Instruction::new(LDA, Immediate, 2, 2),
    /*0xAA*/ Instruction::new(TAX, Implied, 2, 1),
    /*0xAB*/ UNKNOWN,
    /*0xAC*/ Instruction::new(LDY, Absolute, 4, 3),
    /*0xAD*/ Instruction::new(LDA, Absolute, 4, 3),
    /*0xAE*/ Instruction::new(LDX, Absolute, 4, 3),
    /*0xAF*/ UNKNOWN,

    /*0xB0*/ Instruction::new(BCS, Relative, 2, 2),
    /*0xB1*/ Instruction::new(LDA, IndirectIndexed, 5, 2),
    /*0xB2*/ UNKNOWN,
    /*0xB3*/ UNKNOWN,
    /*0xB4*/ Instruction::new(LDY, ZeroPageX, 4, 2),
    /*0xB5*/ Instruction::new(LDA, ZeroPageX, 4, 2),
    /*0xB6*/ Instruction::new(LDX, ZeroPageY, 4, 2),
    /*0xB7*/ UNKNOWN,
    /*0xB8*/ Instruction::new(CLV, Implied, 2, 1),
    /*0xB9*/ Instruction::new(LDA, AbsoluteY, 4, 3),
    /*0xBA*/ Instruction::new(TSX, Implied, 2, 1),
    /*0xBB*/ UNKNOWN,
    /*0xBC*/ Instruction::new(LDY, AbsoluteX, 4, 3),
    /*0xBD*/ Instruction::new(LDA, AbsoluteX, 4, 3),
    /*0xBE*/ Instruction::new(LDX, AbsoluteY, 4, 3),
    /*0xBF*/ UNKNOWN,

    /*0xC0*/ Instruction::new(CPY, Immediate, 2, 2),
    /*0xC1*/ Instruction::new(CMP, IndexedIndirect, 6, 2),
    /*0xC2*/ UNKNOWN,
    /*0xC3*/ UNKNOWN,
    /*0xC4*/ Instruction::new(CPY, ZeroPage, 3, 2),
    /*0xC5*/ Instruction::new(CMP, ZeroPage, 3, 2),
    /*0xC6*/ Instruction::new(DEC, ZeroPage, 5, 2),
    /*0xC7*/ UNKNOWN,
    /*0xC8*/ Instruction::new(INY, Implied, 2, 1),
    /*0xC9*/ Instruction::new(CMP, Immediate, 2, 2),
    /*0xCA*/ Instruction::new(DEX, Implied, 2, 1),
    /*0xCB*/ UNKNOWN,
    /*0xCC*/ Instruction::new(CPY, Absolute, 4, 3),
    /*0xCD*/ Instruction::new(CMP, Absolute, 4, 3),
    /*0xCE*/ Instruction::new(DEC, Absolute, 6, 3),
    /*0xCF*/ UNKNOWN,

    /*0xD0*/ Instruction::new(BNE, Relative, 2, 2),
    /*0xD1*/ Instruction::new(CMP, IndirectIndexed, 5, 2),
    /*0xD2*/ UNKNOWN,
    /*0xD3*/ UNKNOWN,
    /*0xD4*/ UNKNOWN,
    /*0xD5*/ Instruction::new(CMP, ZeroPageX, 4, 2),
    /*0xD6*/ Instruction::new(DEC, ZeroPageX, 6, 2),
    /*0xD7*/ UNKNOWN,
    /*0xD8*/ Instruction::new(CLD, Implied, 2, 1),
    /*0xD9*/ Instruction::new(CMP, AbsoluteY, 4, 3),
    /*0xDA*/ UNKNOWN,
    /*0xDB*/ UNKNOWN,
    /*0xDC*/ UNKNOWN,
    /*0xDD*/ Instruction::new(CMP, AbsoluteX, 4, 3),
    /*0xDE*/ Instruction::new(DEC, AbsoluteX, 7, 3),
    /*0xDF*/ UNKNOWN,

    /*0xE0*/ Instruction::new(CPX, Immediate, 2, 2),
    /*0xE1*/ Instruction::new(SBC, IndexedIndirect, 6, 2),
    /*0xE2*/ UNKNOWN,
    /*0xE3*/ UNKNOWN,
    /*0xE4*/ Instruction::new(CPX, ZeroPage, 3, 2),
    /*0xE5*/ Instruction::new(SBC, ZeroPage, 3, 2),
    /*0xE6*/ Instruction::new(INC, ZeroPage, 5, 2),
    /*0xE7*/ UNKNOWN,
    /*0xE8*/ Instruction::new(INX, Implied, 2, 1),
    /*0xE9*/ Instruction::new(SBC, Immediate, 2, 2),
    /*0xEA*/ Instruction::new(NOP, Implied, 2, 1),
    /*0xEB*/ UNKNOWN,
    /*0xEC*/ Instruction::new(CPX, Absolute, 4, 3),
    /*0xED*/ Instruction::new(SBC, Absolute, 4, 3),
    /*0xEE*/ Instruction::new(INC, Absolute, 6, 3),
    /*0xEF*/ UNKNOWN,

    /*0xF0*/ Instruction::new(BEQ, Relative, 2, 2),
    /*0xF1*/ Instruction::new(SBC, IndirectIndexed, 5, 2),
    /*0xF2*/ UNKNOWN,
    /*0xF3*/ UNKNOWN,
    /*0xF4*/ UNKNOWN,
    /*0xF5*/ Instruction::new(SBC, ZeroPageX, 4, 2),
    /*0xF6*/ Instruction::new(INC, ZeroPageX, 6, 2),
    /*0xF7*/ UNKNOWN,
    /*0xF8*/ Instruction::new(SED, Implied, 2, 1),
    /*0xF9*/ Instruction::new(SBC, AbsoluteY, 4, 3),
    /*0xFA*/ UNKNOWN,
    /*0xFB*/ UNKNOWN,
    /*0xFC*/ UNKNOWN,
    /*0xFD*/ Instruction::new(SBC, AbsoluteX, 4, 3),
    /*0xFE*/ Instruction::new(INC, AbsoluteX, 7, 3),
    /*0xFF*/ UNKNOWN,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn every_byte_decodes_to_something() {
        for byte in 0..=255u8 {
            let instruction = Instruction::decode(byte);
            assert!(instruction.bytes >= 1);
            assert!(instruction.cycles >= 1);
        }
    }

    #[test]
    pub fn undocumented_bytes_decode_to_unknown() {
        for &byte in &[0x02u8, 0x12, 0x9E, 0xFF] {
            assert_eq!(Instruction::decode(byte).opcode, Opcode::Unknown);
        }
    }

    #[test]
    pub fn lda_immediate_is_two_bytes_two_cycles() {
        let instruction = Instruction::decode(0xA9);
        assert_eq!(instruction.opcode, Opcode::LDA);
        assert_eq!(instruction.addressing_mode, AddressingMode::Immediate);
        assert_eq!(instruction.bytes, 2);
        assert_eq!(instruction.cycles, 2);
    }

    #[test]
    pub fn jmp_indirect_reads_the_pointer_with_the_hardware_bug_intact() {
        let instruction = Instruction::decode(0x6C);
        assert_eq!(instruction.opcode, Opcode::JMP);
        assert_eq!(instruction.addressing_mode, AddressingMode::Indirect);
    }

    #[test]
    pub fn store_absolute_x_has_a_flat_cost_unlike_the_equivalent_load() {
        let sta_abs_x = Instruction::decode(0x9D);
        let lda_abs_x = Instruction::decode(0xBD);

        assert_eq!(sta_abs_x.cycles, 5);
        assert_eq!(lda_abs_x.cycles, 4);
    }
}
