/// Identifies one of the 6502's 8-bit registers for the generic read/write/transfer helpers on
/// `MOS6502`.
///
/// `PC` isn't included since it's 16-bit and never the target of `TAX`/`STA`-style instructions.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Register {
    A,
    X,
    Y,
    P,
    SP,
}
