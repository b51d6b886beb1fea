mod mos6502;

pub use mos6502::{
    MOS6502,
    Bus,
    RamBus16kb,
    DMA,
    ActiveDMA,
    DMAStatus,
    Status,
    StatusFlag,
    Opcode,
    AddressingMode,
    Instruction,
    NMI_VECTOR_ADDRESS,
    IRQ_VECTOR_ADDRESS,
    RESET_VECTOR_ADDRESS,
};
