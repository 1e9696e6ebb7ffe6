//! Errors raised when the tracer's view of execution diverges from the
//! interpreter's.
//!
//! None of these are EVM exceptions: an out-of-gas call or a cold access is
//! reported through plain flags on [`StpCall`](crate::gas::StpCall). A
//! [`TracerError`] means that any further trace row would be unsound.

use thiserror::Error;

use crate::callstack::FrameId;

/// Stores the result of call stack and gas operations. Returns a
/// [`TracerError`] upon failure.
pub type TracerResult<T> = Result<T, TracerError>;

/// An error type for tracer invariant violations.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum TracerError {
    /// A context attempted to self-revert a second time.
    #[error("a context can not self-revert twice, frame {frame} already reverts at {existing}, can't revert again at {attempted}")]
    DoubleSelfRevert {
        frame: FrameId,
        existing: usize,
        attempted: usize,
    },

    /// The frame was paused while already paused.
    #[error("frame {0} is already paused")]
    AlreadyPaused(FrameId),

    /// The frame was unpaused while running.
    #[error("frame {0} is not paused")]
    NotPaused(FrameId),

    /// The gas accountant was invoked for an instruction outside of the CALL
    /// and CREATE families.
    #[error("STP computation triggered for a non CALL/CREATE instruction (opcode: {0:#04x})")]
    NotStpInstruction(u8),

    /// A frame was created under a parent that does not exist.
    #[error("attempted to create a frame under an unexisting parent (parent: {0})")]
    MissingParent(FrameId),

    /// A lookup referenced an id that was never allocated.
    #[error("no frame with id {0} in the call stack")]
    UnknownFrame(FrameId),

    /// An operation required a current frame on an empty call stack.
    #[error("the call stack holds no current frame")]
    NoCurrentFrame,

    /// The current frame has no parent to return to.
    #[error("can not exit frame {0}, it has no parent")]
    ExitFromRoot(FrameId),

    /// A transaction was started on a call stack that already holds frames.
    #[error("the call stack already holds {0} frames")]
    CallStackNotEmpty(usize),
}
