/// Status represents the processor status flags, `p` on the `MOS6502`
///
/// Each bit in `p` has a different meaning:
///
/// ```text
/// +---+---+---+---+---+---+---+---+
/// | N | V |   | B | D | I | Z | C |
/// +---+---+---+---+---+---+---+---+
///   |   |   |   |   |   |   |   |
///   |   |   |   |   |   |   |   \-------- CARRY
///   |   |   |   |   |   |   |
///   |   |   |   |   |   |   \------------ ZERO RESULT
///   |   |   |   |   |   |
///   |   |   |   |   |   \---------------- INTERRUPT DISABLE
///   |   |   |   |   |
///   |   |   |   |   \-------------------- DECIMAL MODE
///   |   |   |   |
///   |   |   |   \------------------------ BREAK COMMAND
///   |   |   |
///   |   |   \---------------------------- EXPANSION
///   |   |
///   |   \-------------------------------- OVERFLOW
///   |
///   \------------------------------------ NEGATIVE RESULT
/// ```
///
/// Flag descriptions:
///
/// - `C` is the carry flag, modified by arithmetic and shift/rotate operations. It's used as the
///   "ninth bit" for many arithmetic operations.
/// - `Z` is automatically set during any movement or calculation when the 8 bits of the
///   resulting operation are 0.
/// - `I` is the interrupt disable flag. When set it disables the effect of the IRQ line.
/// - `D` is the decimal mode flag. On the 6502 it makes `ADC`/`SBC` operate on the decimal (BCD)
///   representation of their operands.
/// - `B` is only ever set by the processor itself, to distinguish a `BRK`-triggered interrupt
///   from a real interrupt. It's always 0 in `P` but exists as the value pushed to the stack by
///   `BRK`/`PHP`.
/// - ` ` is the expansion bit. It's unused and always set to 1.
/// - `V` is set when addition/subtraction signed-overflows.
/// - `N` is set after all data movements or arithmetic; true when the resultant value's high bit
///   is set.
///
/// Gotchas:
///
/// - `B` doesn't exist as actual storage in `P`. It's only ever set in the byte pushed to the
///   stack from `BRK` or `PHP`.
/// - `B` is ignored when pulling a byte from the stack into `P`.
/// - ` ` (unused) is _always_ set to 1.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Status(pub u8);

impl Status {
    pub fn get(&self, flag: StatusFlag) -> bool {
        let bit = flag as u8;

        (self.0 & (1 << bit)) != 0
    }

    pub fn set(&mut self, flag: StatusFlag, value: bool) {
        let bit = flag as u8;
        if value {
            self.0 |= 1 << bit;
        } else {
            self.0 &= !(1 << bit);
        }
    }

    pub fn with(&mut self, flag: StatusFlag, value: bool) -> &mut Self {
        self.set(flag, value);
        self
    }
}

impl Default for Status {
    /// The reset value of `P`: `Unused` is always set, every other flag clear except
    /// `InterruptDisable`, which the reset sequence sets explicitly anyway.
    fn default() -> Status {
        Status(0b0010_0000)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum StatusFlag {
    Carry = 0,
    Zero = 1,
    InterruptDisable = 2,
    DecimalMode = 3,
    Break = 4,
    Unused = 5,
    Overflow = 6,
    Negative = 7,
}

impl StatusFlag {
    pub fn variants() -> impl Iterator<Item = StatusFlag> {
        [
            StatusFlag::Carry,
            StatusFlag::Zero,
            StatusFlag::InterruptDisable,
            StatusFlag::DecimalMode,
            StatusFlag::Break,
            StatusFlag::Unused,
            StatusFlag::Overflow,
            StatusFlag::Negative,
        ]
        .iter()
        .copied()
    }
}
