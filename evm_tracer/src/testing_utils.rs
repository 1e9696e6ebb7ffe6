//! A set of utility functions to be used by `evm_tracer` unit and
//! integration tests.

use bytes::Bytes;
use env_logger::{try_init_from_env, Env, DEFAULT_FILTER_ENV};
use ethereum_types::{Address, U256};

use crate::callstack::{CallFrameType, CallStack, FrameId, FrameSpec};
use crate::types::MemoryRange;

pub fn init_logger() {
    let _ = try_init_from_env(Env::default().filter_or(DEFAULT_FILTER_ENV, "info"));
}

/// Returns the address whose last byte is `n`, all others being zero.
pub fn address(n: u8) -> Address {
    Address::from_low_u64_be(n as u64)
}

/// Spec of a plain message call into `to`, running `to`'s own code.
pub fn message_call(context_number: usize, to: Address) -> FrameSpec {
    FrameSpec {
        frame_type: CallFrameType::MessageCall,
        context_number,
        account_address: to,
        byte_code_address: to,
        call_data_range: MemoryRange::new(
            context_number,
            0,
            4,
            Bytes::from_static(b"\xde\xad\xbe\xef"),
        ),
        return_at_range: MemoryRange::new(context_number, 32, 32, Bytes::new()),
        ..Default::default()
    }
}

/// Spec of a contract deployment at `address`, transferring `value`.
pub fn deployment(context_number: usize, address: Address, value: U256) -> FrameSpec {
    FrameSpec {
        frame_type: CallFrameType::Deployment,
        context_number,
        is_deployment: true,
        value,
        account_address: address,
        account_deployment_number: 1,
        byte_code_address: address,
        byte_code_deployment_number: 1,
        ..Default::default()
    }
}

/// A call stack holding a fresh transaction, sent from `address(0xee)` to
/// `address(0x01)` with call data `0xca11`. Returns the stack and the id of
/// its root frame.
pub fn new_transaction_stack() -> (CallStack, FrameId) {
    let mut stack = CallStack::new();
    let root = stack
        .new_transaction(
            address(0xee),
            Bytes::from_static(b"\xca\x11"),
            1,
            FrameSpec {
                context_number: 1,
                account_address: address(0x01),
                byte_code_address: address(0x01),
                caller_address: address(0xee),
                ..Default::default()
            },
        )
        .expect("a new call stack is empty");
    (stack, root)
}
