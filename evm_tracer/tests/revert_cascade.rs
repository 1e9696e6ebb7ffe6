use std::collections::HashMap;

use ethereum_types::U256;
use evm_tracer::testing_utils::{
    address, deployment, init_logger, message_call, new_transaction_stack,
};
use evm_tracer::{CallStack, FrameId, TracerError};
use rstest::rstest;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct RevertState {
    self_reverts: bool,
    gets_reverted: bool,
    stamp: Option<usize>,
}

/// Recursive model of the cascade: every descendant gets reverted, and
/// takes the stamp unless it self-reverted already.
fn model_revert(
    children: &HashMap<FrameId, Vec<FrameId>>,
    states: &mut HashMap<FrameId, RevertState>,
    id: FrameId,
    stamp: usize,
) {
    let state = states.entry(id).or_default();
    assert!(!state.self_reverts);
    state.self_reverts = true;
    state.stamp = Some(stamp);

    fn cascade(
        children: &HashMap<FrameId, Vec<FrameId>>,
        states: &mut HashMap<FrameId, RevertState>,
        id: FrameId,
        stamp: usize,
    ) {
        for &child in children.get(&id).into_iter().flatten() {
            let state = states.entry(child).or_default();
            state.gets_reverted = true;
            if !state.self_reverts {
                state.stamp = Some(stamp);
            }
            cascade(children, states, child, stamp);
        }
    }
    cascade(children, states, id, stamp);
}

fn snapshot(stack: &CallStack) -> HashMap<FrameId, RevertState> {
    stack
        .frames()
        .iter()
        .map(|frame| {
            (
                frame.id(),
                RevertState {
                    self_reverts: frame.self_reverts(),
                    gets_reverted: frame.gets_reverted(),
                    stamp: frame.revert_stamp(),
                },
            )
        })
        .collect()
}

/// Builds a tree of `width`-ary nodes, `levels` deep below the root, by
/// entering and exiting frames as an interpreter would.
fn build_tree(width: usize, levels: usize) -> (CallStack, FrameId) {
    fn spawn(stack: &mut CallStack, width: usize, levels: usize, next_context: &mut usize) {
        if levels == 0 {
            return;
        }
        for _ in 0..width {
            *next_context += 1;
            let spec = if *next_context % 3 == 0 {
                deployment(*next_context, address(*next_context as u8), U256::one())
            } else {
                message_call(*next_context, address(*next_context as u8))
            };
            stack.enter(spec).unwrap();
            spawn(stack, width, levels - 1, next_context);
            stack.exit().unwrap();
        }
    }

    let (mut stack, root) = new_transaction_stack();
    let mut next_context = 1;
    spawn(&mut stack, width, levels, &mut next_context);
    (stack, root)
}

#[test]
fn cascade_on_a_chain() {
    init_logger();

    let (mut stack, root) = new_transaction_stack();
    let a = stack.enter(message_call(2, address(0xa))).unwrap();
    let b = stack.enter(message_call(3, address(0xb))).unwrap();
    let c = stack.enter(message_call(4, address(0xc))).unwrap();

    stack.set_revert_stamps(a, 7).unwrap();

    let root = stack.get_by_id(root).unwrap();
    assert!(!root.self_reverts() && !root.gets_reverted());
    let a = stack.get_by_id(a).unwrap();
    assert!(a.self_reverts());
    assert_eq!(a.revert_stamp(), Some(7));
    for id in [b, c] {
        let frame = stack.get_by_id(id).unwrap();
        assert!(frame.gets_reverted());
        assert_eq!(frame.revert_stamp(), Some(7));
    }
}

#[test]
fn inner_revert_survives_outer_revert() {
    init_logger();

    let (mut stack, _) = new_transaction_stack();
    let a = stack.enter(message_call(2, address(0xa))).unwrap();
    let b = stack.enter(message_call(3, address(0xb))).unwrap();

    stack.revert_current(3).unwrap();
    stack.exit().unwrap();
    stack.revert_current(7).unwrap();

    let b = stack.get_by_id(b).unwrap();
    assert!(b.gets_reverted());
    assert_eq!(b.revert_stamp(), Some(3));
    assert_eq!(stack.get_by_id(a).unwrap().revert_stamp(), Some(7));
}

#[rstest]
#[case(1, 6)]
#[case(2, 4)]
#[case(3, 3)]
#[case(5, 2)]
fn cascade_matches_recursive_model(#[case] width: usize, #[case] levels: usize) {
    init_logger();

    let (mut stack, root) = build_tree(width, levels);
    let children: HashMap<FrameId, Vec<FrameId>> = stack
        .frames()
        .iter()
        .map(|frame| (frame.id(), frame.child_frame_ids().to_vec()))
        .collect();
    let mut model = snapshot(&stack);

    // Revert deepest frames first, as halting contexts would, skipping some.
    let mut order = stack.descendants(root).unwrap();
    order.reverse();
    order.push(root);
    for (stamp, id) in order.into_iter().enumerate() {
        if id % 4 == 1 {
            continue;
        }
        stack.set_revert_stamps(id, stamp + 100).unwrap();
        model_revert(&children, &mut model, id, stamp + 100);
    }

    assert_eq!(snapshot(&stack), model);
}

#[test]
fn every_descendant_is_reverted() {
    init_logger();

    let (mut stack, root) = build_tree(3, 3);
    let first_child = stack.get_by_id(root).unwrap().child_frame_ids()[0];

    stack.set_revert_stamps(first_child, 42).unwrap();

    let descendants = stack.descendants(first_child).unwrap();
    assert_eq!(descendants.len(), 3 + 9);
    for id in descendants {
        let frame = stack.get_by_id(id).unwrap();
        assert!(frame.will_revert());
        assert_eq!(frame.revert_stamp(), Some(42));
    }
    for &sibling in &stack.get_by_id(root).unwrap().child_frame_ids()[1..] {
        assert!(!stack.get_by_id(sibling).unwrap().will_revert());
    }
}

#[test]
fn self_revert_is_monotonic() {
    init_logger();

    let (mut stack, root) = build_tree(2, 2);
    stack.set_revert_stamps(root, 1).unwrap();

    for frame in stack.frames().iter().filter(|f| f.id() != 0) {
        assert!(frame.will_revert(), "frame {}", frame.id());
    }
    assert_eq!(
        stack.set_revert_stamps(root, 2),
        Err(TracerError::DoubleSelfRevert {
            frame: root,
            existing: 1,
            attempted: 2,
        })
    );
    // The mantle is not part of the call tree.
    assert!(!stack.mantle().unwrap().will_revert());
}
