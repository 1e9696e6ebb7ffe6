use bytes::Bytes;
use ethereum_types::{Address, U256};
use log::warn;
use once_cell::unsync::OnceCell;
use zk_tracer_common::address_to_u256;

use super::FrameId;
use crate::error::{TracerError, TracerResult};
use crate::opcode::OpCode;
use crate::types::MemoryRange;

/// The role of an execution context within a transaction.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CallFrameType {
    /// Holds the transaction's call data. Never executes.
    TransactionCallDataHolder,
    /// The context the transaction itself executes in.
    Root,
    #[default]
    MessageCall,
    Deployment,
    /// Holds the output of a precompile call. Never executes.
    PrecompileReturnData,
}

/// What the caller knows about a context about to be spawned. The call
/// stack completes it with identity and linkage into a [`CallFrame`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FrameSpec {
    pub frame_type: CallFrameType,
    pub context_number: usize,
    /// Whether the executing code is initcode.
    pub is_deployment: bool,
    pub value: U256,
    pub gas_stipend: u64,
    pub account_address: Address,
    pub account_deployment_number: usize,
    pub byte_code_address: Address,
    pub byte_code_deployment_number: usize,
    pub code: Bytes,
    pub caller_address: Address,
    pub call_data_range: MemoryRange,
    pub return_at_range: MemoryRange,
}

/// A single execution context of a transaction.
///
/// Identity and linkage are owned by the [`CallStack`](super::CallStack):
/// they can be read from here but only the stack mutates them, as it does
/// for the revert markers.
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub(super) id: FrameId,
    context_number: usize,
    pub(super) parent_id: Option<FrameId>,
    pub(super) child_frame_ids: Vec<FrameId>,
    depth: usize,
    frame_type: CallFrameType,
    is_deployment: bool,

    value: U256,
    gas_stipend: u64,

    // account whose storage and balance are accessible
    account_address: Address,
    account_deployment_number: usize,
    e_address: OnceCell<U256>,

    // byte code running in this frame
    byte_code_address: Address,
    byte_code_deployment_number: usize,
    e_code_address: OnceCell<U256>,
    code: Bytes,

    caller_address: Address,

    pc: usize,
    opcode: OpCode,

    call_data_range: MemoryRange,
    return_at_range: MemoryRange,
    return_data_range: MemoryRange,
    output_data_range: MemoryRange,

    execution_paused: bool,
    last_valid_gas_next: u64,

    pub(super) self_reverts: bool,
    pub(super) gets_reverted: bool,
    pub(super) revert_stamp: Option<usize>,
}

impl CallFrame {
    pub(super) fn new(
        id: FrameId,
        parent_id: Option<FrameId>,
        depth: usize,
        spec: FrameSpec,
    ) -> Self {
        Self {
            id,
            context_number: spec.context_number,
            parent_id,
            child_frame_ids: vec![],
            depth,
            frame_type: spec.frame_type,
            is_deployment: spec.is_deployment || spec.frame_type == CallFrameType::Deployment,
            value: spec.value,
            gas_stipend: spec.gas_stipend,
            account_address: spec.account_address,
            account_deployment_number: spec.account_deployment_number,
            e_address: OnceCell::new(),
            byte_code_address: spec.byte_code_address,
            byte_code_deployment_number: spec.byte_code_deployment_number,
            e_code_address: OnceCell::new(),
            code: spec.code,
            caller_address: spec.caller_address,
            pc: 0,
            opcode: OpCode::STOP,
            call_data_range: spec.call_data_range,
            return_at_range: spec.return_at_range,
            return_data_range: MemoryRange::EMPTY,
            output_data_range: MemoryRange::EMPTY,
            execution_paused: false,
            last_valid_gas_next: 0,
            self_reverts: false,
            gets_reverted: false,
            revert_stamp: None,
        }
    }

    pub const fn id(&self) -> FrameId {
        self.id
    }

    pub const fn context_number(&self) -> usize {
        self.context_number
    }

    pub const fn parent_id(&self) -> Option<FrameId> {
        self.parent_id
    }

    pub fn child_frame_ids(&self) -> &[FrameId] {
        &self.child_frame_ids
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub const fn frame_type(&self) -> CallFrameType {
        self.frame_type
    }

    pub fn is_root(&self) -> bool {
        self.frame_type == CallFrameType::Root
    }

    pub const fn is_deployment(&self) -> bool {
        self.is_deployment
    }

    pub const fn is_message_call(&self) -> bool {
        !self.is_deployment
    }

    pub const fn value(&self) -> U256 {
        self.value
    }

    pub const fn gas_stipend(&self) -> u64 {
        self.gas_stipend
    }

    pub const fn account_address(&self) -> Address {
        self.account_address
    }

    pub const fn account_deployment_number(&self) -> usize {
        self.account_deployment_number
    }

    pub const fn byte_code_address(&self) -> Address {
        self.byte_code_address
    }

    pub const fn byte_code_deployment_number(&self) -> usize {
        self.byte_code_deployment_number
    }

    pub const fn code(&self) -> &Bytes {
        &self.code
    }

    pub const fn caller_address(&self) -> Address {
        self.caller_address
    }

    /// The account address of this frame, as an EVM word.
    pub fn address_as_eword(&self) -> U256 {
        *self
            .e_address
            .get_or_init(|| address_to_u256(self.account_address))
    }

    /// The address of the code executing in this frame, as an EVM word.
    pub fn code_address_as_eword(&self) -> U256 {
        *self
            .e_code_address
            .get_or_init(|| address_to_u256(self.byte_code_address))
    }

    /// If any, returns the id of the latest callee of this frame.
    pub fn last_callee(&self) -> Option<FrameId> {
        self.child_frame_ids.last().copied()
    }

    pub const fn pc(&self) -> usize {
        self.pc
    }

    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    pub const fn opcode(&self) -> OpCode {
        self.opcode
    }

    pub fn set_opcode(&mut self, opcode: OpCode) {
        self.opcode = opcode;
    }

    pub const fn call_data_range(&self) -> &MemoryRange {
        &self.call_data_range
    }

    pub const fn return_at_range(&self) -> &MemoryRange {
        &self.return_at_range
    }

    pub const fn return_data_range(&self) -> &MemoryRange {
        &self.return_data_range
    }

    /// Records the return data of the latest callee.
    pub fn set_return_data_range(&mut self, range: MemoryRange) {
        self.return_data_range = range;
    }

    pub fn squash_return_data(&mut self) {
        self.return_data_range = MemoryRange::EMPTY;
    }

    pub const fn output_data_range(&self) -> &MemoryRange {
        &self.output_data_range
    }

    /// Records the data this frame returns, at exit time.
    pub fn set_output_data_range(&mut self, range: MemoryRange) {
        self.output_data_range = range;
    }

    pub const fn execution_paused(&self) -> bool {
        self.execution_paused
    }

    pub fn pause(&mut self) -> TracerResult<()> {
        if self.execution_paused {
            warn!("Frame {} paused twice", self.id);
            return Err(TracerError::AlreadyPaused(self.id));
        }
        self.execution_paused = true;
        Ok(())
    }

    pub fn unpause(&mut self) -> TracerResult<()> {
        if !self.execution_paused {
            warn!("Frame {} unpaused while running", self.id);
            return Err(TracerError::NotPaused(self.id));
        }
        self.execution_paused = false;
        Ok(())
    }

    pub const fn last_valid_gas_next(&self) -> u64 {
        self.last_valid_gas_next
    }

    /// Saves the gas left after the current instruction, to be restored when
    /// execution resumes in this frame.
    pub fn remember_gas_next_before_pausing(&mut self, gas_next: u64) {
        self.last_valid_gas_next = gas_next;
    }

    pub const fn self_reverts(&self) -> bool {
        self.self_reverts
    }

    pub const fn gets_reverted(&self) -> bool {
        self.gets_reverted
    }

    /// The stamp of the revert rolling back this frame, if any.
    pub const fn revert_stamp(&self) -> Option<usize> {
        self.revert_stamp
    }

    pub const fn will_revert(&self) -> bool {
        self.self_reverts || self.gets_reverted
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    fn frame(spec: FrameSpec) -> CallFrame {
        CallFrame::new(0, None, 0, spec)
    }

    #[test]
    fn fresh_frame() {
        let frame = frame(FrameSpec {
            context_number: 5,
            ..Default::default()
        });

        assert_eq!(frame.context_number(), 5);
        assert_eq!(frame.parent_id(), None);
        assert_eq!(frame.last_callee(), None);
        assert!(frame.is_message_call());
        assert!(!frame.is_root());
        assert!(!frame.will_revert());
        assert_eq!(frame.revert_stamp(), None);
        assert_eq!(frame.opcode(), OpCode::STOP);
        assert!(frame.return_data_range().is_empty());
    }

    #[test]
    fn deployment_type_implies_deployment() {
        let frame = frame(FrameSpec {
            frame_type: CallFrameType::Deployment,
            ..Default::default()
        });

        assert!(frame.is_deployment());
        assert!(!frame.is_message_call());
    }

    #[test]
    fn eword_views_are_memoized() {
        let account = Address::from(hex!("00000000000000000000000000000000000000aa"));
        let code = Address::from(hex!("ff00000000000000000000000000000000000001"));
        let frame = frame(FrameSpec {
            account_address: account,
            byte_code_address: code,
            ..Default::default()
        });

        assert_eq!(frame.address_as_eword(), U256::from(0xaa));
        assert_eq!(frame.address_as_eword(), frame.address_as_eword());
        assert_eq!(
            frame.code_address_as_eword(),
            (U256::from(0xff) << 152) + U256::one()
        );
        assert_eq!(frame.e_code_address.get(), Some(&frame.code_address_as_eword()));

        // A snapshot carries the cached views along.
        let snapshot = frame.clone();
        assert_eq!(snapshot.e_address.get(), Some(&U256::from(0xaa)));
    }

    #[test]
    fn pause_state_machine() {
        let mut frame = frame(FrameSpec::default());

        assert_eq!(frame.unpause(), Err(TracerError::NotPaused(0)));
        frame.pause().unwrap();
        assert!(frame.execution_paused());
        assert_eq!(frame.pause(), Err(TracerError::AlreadyPaused(0)));
        frame.unpause().unwrap();
        assert!(!frame.execution_paused());
        frame.pause().unwrap();
    }

    #[test]
    fn per_instruction_updates() {
        let mut frame = frame(FrameSpec::default());

        frame.set_pc(42);
        frame.set_opcode(OpCode::CALL);
        frame.remember_gas_next_before_pausing(21_000);
        frame.set_return_data_range(MemoryRange::whole(2, Bytes::from_static(b"ok")));
        frame.set_output_data_range(MemoryRange::new(0, 0, 32, Bytes::new()));

        assert_eq!(frame.pc(), 42);
        assert_eq!(frame.opcode(), OpCode::CALL);
        assert_eq!(frame.last_valid_gas_next(), 21_000);
        assert_eq!(frame.return_data_range().range.size, 2);
        assert_eq!(frame.output_data_range().range.size, 32);

        frame.squash_return_data();
        assert_eq!(frame.return_data_range(), &MemoryRange::EMPTY);
    }
}
