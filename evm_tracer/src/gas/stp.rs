//! Upfront gas, out-of-pocket gas and stipend of CALL and CREATE family
//! instructions.
//!
//! Both families charge some gas synchronously, before the child context
//! starts executing, and then forward at most all but one 64th of what
//! remains (EIP-150). The trace records the four resulting quantities so
//! that the constraints can check them against the gas columns of the
//! caller and of the callee.

use ethereum_types::U256;
use log::debug;
use zk_tracer_common::{u256_hi, u256_lo};

use super::schedule::GasSchedule;
use crate::account::AccountSnapshot;
use crate::error::{TracerError, TracerResult};
use crate::opcode::{CallKind, OpCode};

/// Returns the largest amount of gas that may be forwarded to a child
/// context, the caller retaining `floor(gas / 64)`.
pub const fn all_but_one_64th(gas: u64) -> u64 {
    gas - (gas >> 6)
}

/// Returns the upfront cost to record and whether it exceeds `gas_actual`.
/// A cost that does not fit a `u64` is recorded as `u64::MAX`, and is
/// always out of gas.
fn charge(gas_actual: u64, upfront: Option<u64>) -> (u64, bool) {
    match upfront {
        Some(cost) => (cost, gas_actual < cost),
        None => (u64::MAX, true),
    }
}

/// What the interpreter knows about a CALL or CREATE instruction right
/// before it is charged.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StpInputs {
    pub opcode: OpCode,
    /// Gas remaining before the instruction is charged.
    pub gas_actual: u64,
    pub memory_expansion_gas: u64,
    /// The gas operand of a CALL, as popped from the stack.
    pub gas: U256,
    /// The value operand. Ignored by DELEGATECALL and STATICCALL.
    pub value: U256,
    /// The callee account, `None` if absent from the state.
    pub callee: Option<AccountSnapshot>,
    pub callee_warm: bool,
}

/// Result of the gas accounting of a single CALL or CREATE instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StpCall {
    pub opcode: OpCode,
    pub gas_actual: u64,
    pub memory_expansion_gas: u64,
    /// The gas operand actually used; zero for CREATEs.
    pub gas: U256,
    /// The value actually transferred.
    pub value: U256,
    pub exists: bool,
    pub warm: bool,
    pub account_creation_triggered: bool,
    pub upfront_gas_cost: u64,
    pub out_of_gas_exception: bool,
    pub gas_paid_out_of_pocket: u64,
    pub stipend: u64,
}

impl StpCall {
    /// Computes the gas accounting of `inputs.opcode`, which must be a CALL
    /// or CREATE family instruction.
    pub fn new(schedule: &GasSchedule, inputs: &StpInputs) -> TracerResult<Self> {
        let stp = match inputs.opcode {
            OpCode::Call(kind) => Self::for_call(schedule, kind, inputs),
            OpCode::Create(_) => Self::for_create(schedule, inputs),
            OpCode::Other(opcode) => {
                log::warn!("STP triggered for opcode {:#04x}", opcode);
                return Err(TracerError::NotStpInstruction(opcode));
            }
        };

        debug!(
            "STP {}: gas_actual={}, upfront={}, oogx={}, paid={}, stipend={}",
            stp.opcode,
            stp.gas_actual,
            stp.upfront_gas_cost,
            stp.out_of_gas_exception,
            stp.gas_paid_out_of_pocket,
            stp.stipend
        );

        Ok(stp)
    }

    fn for_call(schedule: &GasSchedule, kind: CallKind, inputs: &StpInputs) -> Self {
        let value = if inputs.opcode.call_can_transfer_value() {
            inputs.value
        } else {
            U256::zero()
        };
        let exists = match kind {
            CallKind::Call | CallKind::StaticCall => {
                inputs.callee.is_some_and(|account| !account.is_empty())
            }
            // The account that matters is the caller's own, which exists.
            // TODO: read the existence of the current account instead, once the
            // hub checks it for CALLCODE and DELEGATECALL.
            CallKind::CallCode | CallKind::DelegateCall => true,
        };
        let warm = inputs.callee_warm;
        let nonzero_value = !value.is_zero();
        let account_creation_triggered = kind == CallKind::Call && nonzero_value && !exists;

        let upfront = [
            schedule.account_access(warm),
            if nonzero_value { schedule.call_value } else { 0 },
            if account_creation_triggered {
                schedule.new_account
            } else {
                0
            },
        ]
        .into_iter()
        .try_fold(inputs.memory_expansion_gas, u64::checked_add);
        let (upfront_gas_cost, out_of_gas_exception) = charge(inputs.gas_actual, upfront);
        let (gas_paid_out_of_pocket, stipend) = if out_of_gas_exception {
            (0, 0)
        } else {
            let max_gas_allowance = all_but_one_64th(inputs.gas_actual - upfront_gas_cost);
            // The operand is a full word and may exceed any `u64`.
            let paid = if inputs.gas > U256::from(max_gas_allowance) {
                max_gas_allowance
            } else {
                inputs.gas.low_u64()
            };
            let stipend = if nonzero_value {
                schedule.call_stipend
            } else {
                0
            };
            (paid, stipend)
        };

        Self {
            opcode: inputs.opcode,
            gas_actual: inputs.gas_actual,
            memory_expansion_gas: inputs.memory_expansion_gas,
            gas: inputs.gas,
            value,
            exists,
            warm,
            account_creation_triggered,
            upfront_gas_cost,
            out_of_gas_exception,
            gas_paid_out_of_pocket,
            stipend,
        }
    }

    fn for_create(schedule: &GasSchedule, inputs: &StpInputs) -> Self {
        let (upfront_gas_cost, out_of_gas_exception) = charge(
            inputs.gas_actual,
            schedule.create.checked_add(inputs.memory_expansion_gas),
        );
        let gas_paid_out_of_pocket = if out_of_gas_exception {
            0
        } else {
            all_but_one_64th(inputs.gas_actual - upfront_gas_cost)
        };

        Self {
            opcode: inputs.opcode,
            gas_actual: inputs.gas_actual,
            memory_expansion_gas: inputs.memory_expansion_gas,
            gas: U256::zero(),
            value: inputs.value,
            exists: false,
            warm: false,
            account_creation_triggered: false,
            upfront_gas_cost,
            out_of_gas_exception,
            gas_paid_out_of_pocket,
            stipend: 0,
        }
    }

    /// Gas the child context starts with, if it gets to start at all.
    pub const fn child_gas(&self) -> Option<u64> {
        if self.out_of_gas_exception {
            None
        } else {
            Some(self.gas_paid_out_of_pocket.saturating_add(self.stipend))
        }
    }

    /// The values this instruction contributes to the STP trace columns.
    pub fn columns(&self) -> StpColumns {
        StpColumns {
            flag: true,
            instruction: self.opcode.byte(),
            gas_hi: u256_hi(self.gas),
            gas_lo: u256_lo(self.gas),
            value_hi: u256_hi(self.value),
            value_lo: u256_lo(self.value),
            exists: self.exists,
            warmth: self.warm,
            oogx: self.out_of_gas_exception,
            gas_mxp: self.memory_expansion_gas,
            gas_upfront_gas_cost: self.upfront_gas_cost,
            gas_paid_out_of_pocket: self.gas_paid_out_of_pocket,
            gas_stipend: self.stipend,
        }
    }
}

/// Column values of an STP lookup, with words split in 128-bit halves.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StpColumns {
    pub flag: bool,
    pub instruction: u8,
    pub gas_hi: u128,
    pub gas_lo: u128,
    pub value_hi: u128,
    pub value_lo: u128,
    pub exists: bool,
    pub warmth: bool,
    pub oogx: bool,
    pub gas_mxp: u64,
    pub gas_upfront_gas_cost: u64,
    pub gas_paid_out_of_pocket: u64,
    pub gas_stipend: u64,
}
