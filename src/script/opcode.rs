//! Script opcode table
//!
//! The `define_opcodes!` invocation below is the single source of truth for
//! byte values and mnemonics. It generates:
//! - The [`Opcode`] enum
//! - Byte decoding ([`Opcode::from_byte`]) and encoding ([`Opcode::to_byte`])
//! - Mnemonics for [`fmt::Display`]
//!
//! Three variants have no fixed byte: [`Opcode::Special`] is a direct push of
//! 1-75 bytes whose opcode byte is the payload length, [`Opcode::RawData`]
//! carries captured bytes that are re-emitted without any opcode byte, and
//! [`Opcode::BadOperation`] keeps unassigned bytes so they round-trip.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{OP_16_BYTE, OP_1_BYTE};

macro_rules! define_opcodes {
    ($( $(#[$doc:meta])* $name:ident = $byte:literal, $text:literal; )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Opcode {
            $( $(#[$doc])* $name, )*
            /// Direct push of 1-75 bytes; the opcode byte is the length
            Special,
            /// Opaque bytes captured from an unparseable script
            RawData,
            /// Byte value with no assigned operation
            BadOperation(u8),
        }

        impl Opcode {
            /// Classify a raw opcode byte.
            pub fn from_byte(byte: u8) -> Opcode {
                match byte {
                    $( $byte => Opcode::$name, )*
                    0x01..=0x4b => Opcode::Special,
                    other => Opcode::BadOperation(other),
                }
            }

            /// Fixed byte value, `None` for [`Opcode::Special`] and [`Opcode::RawData`].
            pub fn to_byte(self) -> Option<u8> {
                match self {
                    $( Opcode::$name => Some($byte), )*
                    Opcode::BadOperation(byte) => Some(byte),
                    Opcode::Special | Opcode::RawData => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( Opcode::$name => $text, )*
                    Opcode::Special => "special",
                    Opcode::RawData => "raw_data",
                    Opcode::BadOperation(_) => "bad_operation",
                }
            }
        }
    };
}

define_opcodes! {
    // =========================
    // Push value
    // =========================
    /// OP_0 / OP_FALSE: push an empty array
    Zero = 0x00, "zero";
    /// Next byte is the payload length
    PushData1 = 0x4c, "pushdata1";
    /// Next 2 bytes (little-endian) are the payload length
    PushData2 = 0x4d, "pushdata2";
    /// Next 4 bytes (little-endian) are the payload length
    PushData4 = 0x4e, "pushdata4";
    Negative1 = 0x4f, "-1";
    Reserved = 0x50, "reserved";
    Op1 = 0x51, "1";
    Op2 = 0x52, "2";
    Op3 = 0x53, "3";
    Op4 = 0x54, "4";
    Op5 = 0x55, "5";
    Op6 = 0x56, "6";
    Op7 = 0x57, "7";
    Op8 = 0x58, "8";
    Op9 = 0x59, "9";
    Op10 = 0x5a, "10";
    Op11 = 0x5b, "11";
    Op12 = 0x5c, "12";
    Op13 = 0x5d, "13";
    Op14 = 0x5e, "14";
    Op15 = 0x5f, "15";
    Op16 = 0x60, "16";

    // =========================
    // Flow control
    // =========================
    Nop = 0x61, "nop";
    Ver = 0x62, "ver";
    If = 0x63, "if";
    NotIf = 0x64, "notif";
    VerIf = 0x65, "verif";
    VerNotIf = 0x66, "vernotif";
    Else = 0x67, "else";
    EndIf = 0x68, "endif";
    Verify = 0x69, "verify";
    Return = 0x6a, "return";

    // =========================
    // Stack
    // =========================
    ToAltStack = 0x6b, "toaltstack";
    FromAltStack = 0x6c, "fromaltstack";
    Drop2 = 0x6d, "2drop";
    Dup2 = 0x6e, "2dup";
    Dup3 = 0x6f, "3dup";
    Over2 = 0x70, "2over";
    Rot2 = 0x71, "2rot";
    Swap2 = 0x72, "2swap";
    IfDup = 0x73, "ifdup";
    Depth = 0x74, "depth";
    Drop = 0x75, "drop";
    Dup = 0x76, "dup";
    Nip = 0x77, "nip";
    Over = 0x78, "over";
    Pick = 0x79, "pick";
    Roll = 0x7a, "roll";
    Rot = 0x7b, "rot";
    Swap = 0x7c, "swap";
    Tuck = 0x7d, "tuck";

    // =========================
    // Splice
    // =========================
    Cat = 0x7e, "cat";
    Substr = 0x7f, "substr";
    Left = 0x80, "left";
    Right = 0x81, "right";
    Size = 0x82, "size";

    // =========================
    // Bitwise logic
    // =========================
    Invert = 0x83, "invert";
    And = 0x84, "and";
    Or = 0x85, "or";
    Xor = 0x86, "xor";
    Equal = 0x87, "equal";
    EqualVerify = 0x88, "equalverify";
    Reserved1 = 0x89, "reserved1";
    Reserved2 = 0x8a, "reserved2";

    // =========================
    // Arithmetic
    // =========================
    Add1 = 0x8b, "1add";
    Sub1 = 0x8c, "1sub";
    Mul2 = 0x8d, "2mul";
    Div2 = 0x8e, "2div";
    Negate = 0x8f, "negate";
    Abs = 0x90, "abs";
    Not = 0x91, "not";
    NonZero = 0x92, "0notequal";
    Add = 0x93, "add";
    Sub = 0x94, "sub";
    Mul = 0x95, "mul";
    Div = 0x96, "div";
    Mod = 0x97, "mod";
    LShift = 0x98, "lshift";
    RShift = 0x99, "rshift";
    BoolAnd = 0x9a, "booland";
    BoolOr = 0x9b, "boolor";
    NumEqual = 0x9c, "numequal";
    NumEqualVerify = 0x9d, "numequalverify";
    NumNotEqual = 0x9e, "numnotequal";
    LessThan = 0x9f, "lessthan";
    GreaterThan = 0xa0, "greaterthan";
    LessThanOrEqual = 0xa1, "lessthanorequal";
    GreaterThanOrEqual = 0xa2, "greaterthanorequal";
    Min = 0xa3, "min";
    Max = 0xa4, "max";
    Within = 0xa5, "within";

    // =========================
    // Crypto
    // =========================
    Ripemd160 = 0xa6, "ripemd160";
    Sha1 = 0xa7, "sha1";
    Sha256 = 0xa8, "sha256";
    Hash160 = 0xa9, "hash160";
    Hash256 = 0xaa, "hash256";
    CodeSeparator = 0xab, "codeseparator";
    CheckSig = 0xac, "checksig";
    CheckSigVerify = 0xad, "checksigverify";
    CheckMultisig = 0xae, "checkmultisig";
    CheckMultisigVerify = 0xaf, "checkmultisigverify";

    // =========================
    // Expansion
    // =========================
    Nop1 = 0xb0, "nop1";
    /// BIP65, formerly NOP2
    CheckLocktimeVerify = 0xb1, "checklocktimeverify";
    Nop3 = 0xb2, "nop3";
    Nop4 = 0xb3, "nop4";
    Nop5 = 0xb4, "nop5";
    Nop6 = 0xb5, "nop6";
    Nop7 = 0xb6, "nop7";
    Nop8 = 0xb7, "nop8";
    Nop9 = 0xb8, "nop9";
    Nop10 = 0xb9, "nop10";
}

impl Opcode {
    /// Codes followed by a length-prefixed payload on the wire
    pub fn must_read_data(self) -> bool {
        matches!(
            self,
            Opcode::Special | Opcode::PushData1 | Opcode::PushData2 | Opcode::PushData4
        )
    }

    /// Width of the explicit length field that follows the opcode byte
    pub fn length_prefix_size(self) -> u64 {
        match self {
            Opcode::PushData1 => 1,
            Opcode::PushData2 => 2,
            Opcode::PushData4 => 4,
            _ => 0,
        }
    }

    /// Push family: zero, direct and extended pushes, -1 and OP_1..OP_16
    pub fn is_push(self) -> bool {
        match self {
            Opcode::Zero
            | Opcode::Special
            | Opcode::PushData1
            | Opcode::PushData2
            | Opcode::PushData4
            | Opcode::Negative1 => true,
            other => other.small_number().is_some(),
        }
    }

    /// Value N for OP_1..OP_16
    pub fn small_number(self) -> Option<u8> {
        match self {
            Opcode::BadOperation(_) => None,
            other => match other.to_byte() {
                Some(byte @ OP_1_BYTE..=OP_16_BYTE) => Some(byte - OP_1_BYTE + 1),
                _ => None,
            },
        }
    }

    /// OP_N for N in 1..=16
    pub fn from_small_number(value: u8) -> Option<Opcode> {
        match value {
            1..=16 => Some(Opcode::from_byte(OP_1_BYTE + value - 1)),
            _ => None,
        }
    }
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Zero
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::BadOperation(byte) => write!(f, "bad_operation<0x{:02x}>", byte),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_byte_round_trips() {
        for byte in 0u8..=255 {
            let code = Opcode::from_byte(byte);
            match code {
                Opcode::Special => assert!((1..=75).contains(&byte)),
                other => assert_eq!(other.to_byte(), Some(byte), "byte {:#04x}", byte),
            }
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(Opcode::from_byte(0x00), Opcode::Zero);
        assert_eq!(Opcode::from_byte(0x01), Opcode::Special);
        assert_eq!(Opcode::from_byte(0x4b), Opcode::Special);
        assert_eq!(Opcode::from_byte(0x4c), Opcode::PushData1);
        assert_eq!(Opcode::from_byte(0xb9), Opcode::Nop10);
        assert_eq!(Opcode::from_byte(0xba), Opcode::BadOperation(0xba));
        assert_eq!(Opcode::from_byte(0xff), Opcode::BadOperation(0xff));
    }

    #[test]
    fn test_is_push() {
        assert!(Opcode::Zero.is_push());
        assert!(Opcode::Special.is_push());
        assert!(Opcode::PushData4.is_push());
        assert!(Opcode::Negative1.is_push());
        assert!(Opcode::Op1.is_push());
        assert!(Opcode::Op16.is_push());
        assert!(!Opcode::Reserved.is_push());
        assert!(!Opcode::Nop.is_push());
        assert!(!Opcode::Dup.is_push());
        assert!(!Opcode::RawData.is_push());
        assert!(!Opcode::BadOperation(0xff).is_push());
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(Opcode::Op1.small_number(), Some(1));
        assert_eq!(Opcode::Op16.small_number(), Some(16));
        assert_eq!(Opcode::Zero.small_number(), None);
        assert_eq!(Opcode::from_small_number(3), Some(Opcode::Op3));
        assert_eq!(Opcode::from_small_number(0), None);
        assert_eq!(Opcode::from_small_number(17), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Opcode::CheckSig.to_string(), "checksig");
        assert_eq!(Opcode::Op2.to_string(), "2");
        assert_eq!(Opcode::BadOperation(0xba).to_string(), "bad_operation<0xba>");
    }
}
