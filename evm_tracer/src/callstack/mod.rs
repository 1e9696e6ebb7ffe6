//! The call tree of a transaction, kept in lock-step with the interpreter.
//!
//! Every execution context spawned while running a transaction gets a
//! [`CallFrame`], stored in an arena owned by a [`CallStack`]. Frames refer
//! to one another through their [`FrameId`], which is their index in the
//! arena. Frames are never removed: once the transaction has been run, the
//! whole tree is read back to emit the trace.
//!
//! Whether a context is ultimately rolled back is only known once its
//! outermost reverting ancestor halts. Reverts are thus recorded on the
//! reverting frame and cascaded to all of its descendants at that moment,
//! see [`CallStack::set_revert_stamps`].

use std::fmt::Display;

use bytes::Bytes;
use ethereum_types::Address;
use itertools::Itertools;
use log::{debug, trace, warn};

use crate::error::{TracerError, TracerResult};
use crate::types::MemoryRange;

mod frame;

pub use frame::{CallFrame, CallFrameType, FrameSpec};

/// Index of a frame in its [`CallStack`].
pub type FrameId = usize;

/// The EVM limit on nested contexts.
pub const MAX_CALLSTACK_SIZE: usize = 1024;

/// Owner of all the [`CallFrame`]s of a single transaction.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    /// The frame currently executing.
    current: Option<FrameId>,
    /// The frame holding the transaction call data.
    mantle: Option<FrameId>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the frames of a new transaction: one holding its call data,
    /// and the root context it executes in. The root becomes current and its
    /// id is returned.
    pub fn new_transaction(
        &mut self,
        origin: Address,
        call_data: Bytes,
        context_number: usize,
        root: FrameSpec,
    ) -> TracerResult<FrameId> {
        if !self.frames.is_empty() {
            warn!("New transaction on a call stack of {} frames", self.len());
            return Err(TracerError::CallStackNotEmpty(self.len()));
        }

        let mantle = self.push_frame(
            None,
            0,
            FrameSpec {
                frame_type: CallFrameType::TransactionCallDataHolder,
                context_number,
                account_address: origin,
                call_data_range: MemoryRange::whole(context_number, call_data),
                ..Default::default()
            },
        );
        self.mantle = Some(mantle);

        let root = self.push_frame(
            None,
            0,
            FrameSpec {
                frame_type: CallFrameType::Root,
                ..root
            },
        );
        self.current = Some(root);
        debug!("Entered root frame {}", root);

        Ok(root)
    }

    /// Allocates a new frame as the latest child of `parent_id`.
    ///
    /// The call depth limit is not checked here; see
    /// [`is_at_depth_limit`](Self::is_at_depth_limit).
    pub fn create(&mut self, parent_id: FrameId, spec: FrameSpec) -> TracerResult<FrameId> {
        let Some(parent) = self.frames.get(parent_id) else {
            warn!("Frame creation under unexisting parent {}", parent_id);
            return Err(TracerError::MissingParent(parent_id));
        };
        let depth = parent.depth() + 1;

        let id = self.push_frame(Some(parent_id), depth, spec);
        self.frames[parent_id].child_frame_ids.push(id);
        debug!(
            "Created {:?} frame {} under {} at depth {}",
            self.frames[id].frame_type(),
            id,
            parent_id,
            depth
        );

        Ok(id)
    }

    fn push_frame(
        &mut self,
        parent_id: Option<FrameId>,
        depth: usize,
        spec: FrameSpec,
    ) -> FrameId {
        let id = self.frames.len();
        self.frames.push(CallFrame::new(id, parent_id, depth, spec));
        id
    }

    /// Creates a child of the current frame and makes it current.
    pub fn enter(&mut self, spec: FrameSpec) -> TracerResult<FrameId> {
        let parent_id = self.current_id()?;
        let id = self.create(parent_id, spec)?;
        self.current = Some(id);
        Ok(id)
    }

    /// Returns execution to the parent of the current frame, and returns the
    /// parent's id.
    pub fn exit(&mut self) -> TracerResult<FrameId> {
        let current = self.current()?;
        let Some(parent_id) = current.parent_id() else {
            warn!("Exit from parentless frame {}", current.id());
            return Err(TracerError::ExitFromRoot(current.id()));
        };
        debug!("Exited frame {} back to {}", current.id(), parent_id);
        self.current = Some(parent_id);
        Ok(parent_id)
    }

    /// Records the output of a precompile called from the current frame, as
    /// a child frame that is not entered.
    pub fn new_precompile_result(
        &mut self,
        context_number: usize,
        result: Bytes,
        precompile_address: Address,
    ) -> TracerResult<FrameId> {
        let current_id = self.current_id()?;
        let spec = FrameSpec {
            frame_type: CallFrameType::PrecompileReturnData,
            context_number,
            account_address: precompile_address,
            byte_code_address: precompile_address,
            caller_address: self.current()?.account_address(),
            ..Default::default()
        };

        let id = self.create(current_id, spec)?;
        self.frames[id].set_output_data_range(MemoryRange::whole(context_number, result));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames, by increasing id.
    pub fn frames(&self) -> &[CallFrame] {
        &self.frames
    }

    pub fn get_by_id(&self, id: FrameId) -> TracerResult<&CallFrame> {
        self.frames.get(id).ok_or(TracerError::UnknownFrame(id))
    }

    pub fn get_by_id_mut(&mut self, id: FrameId) -> TracerResult<&mut CallFrame> {
        self.frames.get_mut(id).ok_or(TracerError::UnknownFrame(id))
    }

    pub fn current_id(&self) -> TracerResult<FrameId> {
        self.current.ok_or(TracerError::NoCurrentFrame)
    }

    pub fn current(&self) -> TracerResult<&CallFrame> {
        self.get_by_id(self.current_id()?)
    }

    pub fn current_mut(&mut self) -> TracerResult<&mut CallFrame> {
        self.get_by_id_mut(self.current_id()?)
    }

    pub fn maybe_current(&self) -> Option<&CallFrame> {
        self.current.and_then(|id| self.frames.get(id))
    }

    /// The caller of the current frame, if any.
    pub fn parent(&self) -> Option<&CallFrame> {
        self.maybe_current()
            .and_then(CallFrame::parent_id)
            .and_then(|id| self.frames.get(id))
    }

    /// The frame holding the transaction call data.
    pub fn mantle(&self) -> Option<&CallFrame> {
        self.mantle.and_then(|id| self.frames.get(id))
    }

    /// Depth of the current frame, 0 if there is none.
    pub fn depth(&self) -> usize {
        self.maybe_current().map_or(0, CallFrame::depth)
    }

    /// Whether the current frame is too deep to spawn a child context.
    pub fn is_at_depth_limit(&self, max_call_depth: usize) -> bool {
        self.depth() >= max_call_depth
    }

    pub fn pause_current_frame(&mut self) -> TracerResult<()> {
        self.current_mut()?.pause()
    }

    pub fn unpause_current_frame(&mut self) -> TracerResult<()> {
        self.current_mut()?.unpause()
    }

    /// Returns the ids of all descendants of `id`, in depth-first pre-order.
    pub fn descendants(&self, id: FrameId) -> TracerResult<Vec<FrameId>> {
        let mut pending = self.get_by_id(id)?.child_frame_ids.clone();
        pending.reverse();

        let mut descendants = Vec::with_capacity(pending.len());
        while let Some(child_id) = pending.pop() {
            descendants.push(child_id);
            pending.extend(self.frames[child_id].child_frame_ids.iter().rev());
        }
        Ok(descendants)
    }

    /// Marks frame `id` as self-reverting at `stamp`, and all of its
    /// descendants as reverted by it.
    ///
    /// A descendant that already self-reverted keeps its own stamp. A frame
    /// may only self-revert once.
    pub fn set_revert_stamps(&mut self, id: FrameId, stamp: usize) -> TracerResult<()> {
        let frame = self.get_by_id_mut(id)?;
        if frame.self_reverts {
            let existing = frame.revert_stamp.unwrap_or_default();
            warn!(
                "Frame {} already reverts at {}, can't revert again at {}",
                id, existing, stamp
            );
            return Err(TracerError::DoubleSelfRevert {
                frame: id,
                existing,
                attempted: stamp,
            });
        }
        frame.self_reverts = true;
        frame.revert_stamp = Some(stamp);

        for child_id in self.descendants(id)? {
            let child = &mut self.frames[child_id];
            child.gets_reverted = true;
            if !child.self_reverts {
                child.revert_stamp = Some(stamp);
            }
            trace!(
                "Frame {} reverted by {} (stamp: {:?})",
                child_id,
                id,
                child.revert_stamp
            );
        }

        debug!("Frame {} self-reverts at {}", id, stamp);
        Ok(())
    }

    /// Marks the current frame as self-reverting at `stamp`.
    pub fn revert_current(&mut self, stamp: usize) -> TracerResult<()> {
        let id = self.current_id()?;
        self.set_revert_stamps(id, stamp)
    }

    fn fmt_frame(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        id: FrameId,
        indent: usize,
    ) -> std::fmt::Result {
        let frame = &self.frames[id];
        let marker = if self.current == Some(id) { "*" } else { " " };
        writeln!(
            f,
            "{}{}{} {:?} @ {:?} (code: {:?}, ctx: {}){}",
            "  ".repeat(indent),
            marker,
            id,
            frame.frame_type(),
            frame.account_address(),
            frame.byte_code_address(),
            frame.context_number(),
            match (frame.self_reverts(), frame.gets_reverted()) {
                (false, false) => String::new(),
                _ => format!(
                    " [reverts: self={}, inherited={}, stamp={}]",
                    frame.self_reverts(),
                    frame.gets_reverted(),
                    frame
                        .revert_stamp()
                        .map_or_else(|| "-".to_string(), |s| s.to_string())
                ),
            }
        )?;
        for &child_id in frame.child_frame_ids() {
            self.fmt_frame(f, child_id, indent + 1)?;
        }
        Ok(())
    }
}

impl Display for CallStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let roots = self
            .frames
            .iter()
            .filter(|frame| frame.parent_id().is_none())
            .map(CallFrame::id)
            .collect_vec();
        writeln!(
            f,
            "CallStack ({} frames, roots: {})",
            self.len(),
            roots.iter().join(", ")
        )?;
        for id in roots {
            self.fmt_frame(f, id, 1)?;
        }
        Ok(())
    }
}
