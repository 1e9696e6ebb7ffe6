//! Execution-context tracking for the arithmetization of EVM transactions.
//!
//! A zk-EVM trace must know, for every instruction, which execution context
//! it ran in, and whether that context is ultimately rolled back. It must
//! also justify, to the unit of gas, how much each CALL or CREATE charged
//! upfront and forwarded to its child. This crate maintains both pieces of
//! information alongside the interpreter:
//!
//! - the [`CallStack`] owns one [`CallFrame`] per execution context of a
//!   transaction, links them into a tree, and cascades reverts from a frame
//!   to all of its descendants;
//! - [`StpCall`] computes the upfront gas cost, the out-of-gas verdict, the
//!   gas paid out of pocket and the stipend of a CALL or CREATE family
//!   instruction.
//!
//! The hub driving the interpreter calls into both, in the order the
//! interpreter emits its events:
//!
//! ```
//! use bytes::Bytes;
//! use ethereum_types::{Address, U256};
//! use evm_tracer::{CallStack, FrameSpec, OpCode, StpCall, StpInputs, TracerConfig};
//!
//! let config = TracerConfig::default();
//! let mut stack = CallStack::new();
//! let root = stack.new_transaction(
//!     Address::repeat_byte(0xee),
//!     Bytes::new(),
//!     1,
//!     FrameSpec::default(),
//! )?;
//!
//! // The root frame hits a CALL with 100k gas left.
//! let stp = StpCall::new(
//!     &config.gas_schedule,
//!     &StpInputs {
//!         opcode: OpCode::CALL,
//!         gas_actual: 100_000,
//!         gas: U256::MAX,
//!         callee_warm: true,
//!         ..Default::default()
//!     },
//! )?;
//! assert!(!stp.out_of_gas_exception);
//!
//! if !stack.is_at_depth_limit(config.max_call_depth) {
//!     let callee = stack.enter(FrameSpec {
//!         context_number: 2,
//!         gas_stipend: stp.stipend,
//!         ..Default::default()
//!     })?;
//!     // The callee reverts, and so does the root later on.
//!     stack.revert_current(5)?;
//!     stack.exit()?;
//!     stack.revert_current(9)?;
//!     assert_eq!(stack.get_by_id(callee)?.revert_stamp(), Some(5));
//! }
//! assert_eq!(stack.get_by_id(root)?.revert_stamp(), Some(9));
//! # Ok::<(), evm_tracer::TracerError>(())
//! ```

pub mod account;
pub mod callstack;
pub mod config;
pub mod error;
pub mod gas;
pub mod opcode;
pub mod testing_utils;
pub mod types;

pub use account::AccountSnapshot;
pub use callstack::{CallFrame, CallFrameType, CallStack, FrameId, FrameSpec};
pub use config::TracerConfig;
pub use error::{TracerError, TracerResult};
pub use gas::{GasSchedule, StpCall, StpColumns, StpInputs};
pub use opcode::{CallKind, CreateKind, OpCode};
pub use types::{MemoryRange, Range};
