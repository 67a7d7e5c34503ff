//! Model-based test for the transactional ring buffer.
//!
//! Runs random sequences of staged batches (committed or aborted) and
//! reads against a queue-of-committed-bytes model. Batches are capped
//! so staged plus committed bytes stay below capacity, which keeps the
//! model exact; the boundary behavior at exactly-full is covered by
//! the deterministic unit tests in `src/ring.rs`.

use std::collections::VecDeque;

use ferrolink_core::RingBuffer;
use proptest::prelude::*;

const CAP: usize = 32;

#[derive(Debug, Clone)]
enum Op {
    /// Stage a batch of bytes, then commit or abort it.
    Batch { bytes: Vec<u8>, commit: bool },
    /// Pop up to this many bytes.
    Pop(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (prop::collection::vec(any::<u8>(), 0..10), any::<bool>())
            .prop_map(|(bytes, commit)| Op::Batch { bytes, commit }),
        (0usize..12).prop_map(Op::Pop),
    ]
}

proptest! {
    #[test]
    fn matches_queue_model(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut ring = RingBuffer::<CAP>::new();
        let mut committed: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Batch { bytes, commit } => {
                    let mut staged = 0usize;
                    for byte in bytes {
                        // keep staged + committed strictly below capacity
                        if committed.len() + staged >= CAP - 1 {
                            break;
                        }
                        prop_assert!(ring.write_tentative(byte));
                        staged += 1;
                        if commit {
                            committed.push_back(byte);
                        }
                    }
                    if commit {
                        ring.commit();
                    } else {
                        ring.reset_tentative();
                    }
                }
                Op::Pop(count) => {
                    for _ in 0..count {
                        match committed.pop_front() {
                            Some(expected) => {
                                prop_assert_eq!(ring.pop(), Some(expected))
                            }
                            None => prop_assert_eq!(ring.pop(), None),
                        }
                    }
                }
            }

            prop_assert_eq!(ring.len(), committed.len());
            prop_assert_eq!(ring.is_empty(), committed.is_empty());
        }

        // drain whatever is left
        while let Some(expected) = committed.pop_front() {
            prop_assert_eq!(ring.pop(), Some(expected));
        }
        prop_assert_eq!(ring.pop(), None);
    }
}
