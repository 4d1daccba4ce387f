//! Runs recursive front-end work on a thread whose stack is sized from the nesting
//! limit.
//!
//! Parsing, lowering, building, printing and dropping a tree all recurse once per
//! nesting level. The limit bounds the number of levels; this bounds the bytes.

use log::{trace, warn};
use std::{panic, thread};

const BASE_STACK: usize = 4 * 1024 * 1024;

/// Stack reserved per nesting level. Unoptimised pest frames take about a third
/// of this per parenthesised level.
const STACK_PER_LEVEL: usize = 64 * 1024;

pub fn stack_size_for(levels: usize) -> usize {
    BASE_STACK.saturating_add(levels.saturating_mul(STACK_PER_LEVEL))
}

/// Runs `work` on a scoped thread with room for `levels` nesting levels and returns
/// its result. A panic in `work` resumes on the caller. If the thread cannot be
/// created, `work` runs on the current thread instead.
pub fn with_nesting_stack<T, F>(levels: usize, work: F) -> T
where
    F: Fn() -> T + Sync,
    T: Send,
{
    let size = stack_size_for(levels);
    trace!("running on a {} byte stack for {} levels", size, levels);

    let joined = thread::scope(|scope| {
        thread::Builder::new()
            .name("cool-front-end".into())
            .stack_size(size)
            .spawn_scoped(scope, || work())
            .map(|handle| handle.join())
    });

    match joined {
        Ok(Ok(value)) => value,
        Ok(Err(payload)) => panic::resume_unwind(payload),
        Err(error) => {
            warn!(
                "cannot reserve a {} byte stack ({}); continuing on the current thread",
                size, error
            );
            work()
        }
    }
}
