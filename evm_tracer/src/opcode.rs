use std::fmt::Display;

/// The four CALL-family instructions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// The two CREATE-family instructions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CreateKind {
    Create,
    Create2,
}

/// An EVM instruction, as far as context tracking is concerned.
///
/// Only the instructions spawning a child context are given their own
/// variant. Every other byte is carried verbatim in [`OpCode::Other`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OpCode {
    Call(CallKind),
    Create(CreateKind),
    Other(u8),
}

impl OpCode {
    pub const STOP: Self = Self::Other(0x00);
    pub const CALL: Self = Self::Call(CallKind::Call);
    pub const CALLCODE: Self = Self::Call(CallKind::CallCode);
    pub const DELEGATECALL: Self = Self::Call(CallKind::DelegateCall);
    pub const STATICCALL: Self = Self::Call(CallKind::StaticCall);
    pub const CREATE: Self = Self::Create(CreateKind::Create);
    pub const CREATE2: Self = Self::Create(CreateKind::Create2);

    pub const fn from_byte(opcode: u8) -> Self {
        match opcode {
            0xf0 => Self::CREATE,
            0xf1 => Self::CALL,
            0xf2 => Self::CALLCODE,
            0xf4 => Self::DELEGATECALL,
            0xf5 => Self::CREATE2,
            0xfa => Self::STATICCALL,
            _ => Self::Other(opcode),
        }
    }

    pub const fn byte(self) -> u8 {
        match self {
            Self::Create(CreateKind::Create) => 0xf0,
            Self::Call(CallKind::Call) => 0xf1,
            Self::Call(CallKind::CallCode) => 0xf2,
            Self::Call(CallKind::DelegateCall) => 0xf4,
            Self::Create(CreateKind::Create2) => 0xf5,
            Self::Call(CallKind::StaticCall) => 0xfa,
            Self::Other(opcode) => opcode,
        }
    }

    pub const fn is_call(self) -> bool {
        matches!(self, Self::Call(_))
    }

    pub const fn is_create(self) -> bool {
        matches!(self, Self::Create(_))
    }

    /// Whether this instruction pops a value operand from the stack.
    pub const fn call_can_transfer_value(self) -> bool {
        matches!(self, Self::Call(CallKind::Call | CallKind::CallCode))
    }
}

impl Default for OpCode {
    fn default() -> Self {
        Self::STOP
    }
}

impl From<u8> for OpCode {
    fn from(opcode: u8) -> Self {
        Self::from_byte(opcode)
    }
}

impl From<OpCode> for u8 {
    fn from(opcode: OpCode) -> Self {
        opcode.byte()
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call(CallKind::Call) => write!(f, "CALL"),
            Self::Call(CallKind::CallCode) => write!(f, "CALLCODE"),
            Self::Call(CallKind::DelegateCall) => write!(f, "DELEGATECALL"),
            Self::Call(CallKind::StaticCall) => write!(f, "STATICCALL"),
            Self::Create(CreateKind::Create) => write!(f, "CREATE"),
            Self::Create(CreateKind::Create2) => write!(f, "CREATE2"),
            Self::Other(opcode) => write!(f, "{:#04x}", opcode),
        }
    }
}
