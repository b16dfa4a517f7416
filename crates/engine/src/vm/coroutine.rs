/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! Cooperative coroutines. Every [Thread] owns its own value stack, call
//! stack and catch stack -- resuming one is just switching which thread
//! the interpreter is currently driving, not copying frames in and out of
//! a shared native stack the way a single-OS-stack engine has to. The
//! state machine below still mirrors the generator lifecycle states a
//! stack-copying engine tracks (start / suspended / running / done); we
//! just don't need the heap-snapshot step to get there.

use crate::vm::code_block::CodeBlock;
use crate::vm::environment::Environment;
use crate::vm::frame::{Activation, CallStack, CatchStack, ValueStack};
use crate::vm::value::Value;
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ThreadState {
    /// Created but never resumed; its call stack holds exactly the
    /// initial activation, parked at instruction 0.
    Inactive,
    /// Currently the thread the interpreter is driving.
    Running,
    /// Suspended at a `Yield`, waiting for `resume`.
    Yielded,
    /// Returned, threw uncaught, or was resumed after being terminated --
    /// any further resume is a `TypeError` at the call site.
    Terminated,
}

pub struct Thread {
    pub state: ThreadState,
    pub value_stack: ValueStack,
    pub call_stack: CallStack,
    pub catch_stack: CatchStack,
    /// The thread that resumed this one, if any; `yield`/`return`/an
    /// uncaught throw all hand control back here.
    pub resumer: Option<ThreadId>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ThreadId(pub u32);

impl Thread {
    /// Builds a thread parked at its first instruction. A thread's
    /// argument is never bound here -- it only ever arrives through the
    /// first `resume()` call the scheduler makes against it, the same way
    /// every later resume value arrives; the initial register window
    /// starts `undefined` like any other.
    pub fn new(template: Arc<CodeBlock>, this: Value) -> Self {
        Self::with_capacities(template, this, 256, 32, 16)
    }

    pub fn with_capacities(
        template: Arc<CodeBlock>,
        this: Value,
        value_stack_capacity: usize,
        call_stack_capacity: usize,
        catch_stack_capacity: usize,
    ) -> Self {
        let mut value_stack = ValueStack::with_capacity(value_stack_capacity);
        let base = value_stack.reserve(template.num_registers as usize);
        let env = Environment::new_declarative(None, 0);
        let mut call_stack = CallStack::with_capacity(call_stack_capacity);
        call_stack.activations.push(Activation {
            template,
            base,
            ip: 0,
            env,
            this,
            is_constructor: false,
            caller_dst: None,
            catch_stack_base: 0,
            pending: None,
            resume_dst: None,
        });
        Self {
            state: ThreadState::Inactive,
            value_stack,
            call_stack,
            catch_stack: CatchStack::with_capacity(catch_stack_capacity),
            resumer: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ThreadState::Terminated
    }
}

/// Outcome of driving a thread until it next needs a scheduling decision:
/// either it yielded a value back to its resumer, or it ran to
/// completion (by returning, or by an error the scheduler must propagate
/// to whoever resumed it).
pub enum Resumption {
    Yielded(Value),
    Returned(Value),
    Threw(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::code_block::CodeBlockBuilder;
    use crate::gc::Handle;

    fn empty_template() -> Arc<CodeBlock> {
        let builder = CodeBlockBuilder::new(Handle::from_raw(0), "<test>");
        Arc::new(builder.build())
    }

    #[test]
    fn new_thread_starts_inactive_with_one_activation() {
        let thread = Thread::new(empty_template(), Value::undefined());
        assert_eq!(thread.state, ThreadState::Inactive);
        assert_eq!(thread.call_stack.depth(), 1);
        assert!(!thread.is_done());
    }

    #[test]
    fn initial_register_window_starts_undefined_until_the_first_resume() {
        let mut builder = CodeBlockBuilder::new(Handle::from_raw(0), "<test>");
        builder.set_params(2);
        builder.reserve_registers(2);
        let thread = Thread::new(Arc::new(builder.build()), Value::undefined());
        let base = thread.call_stack.top().base;
        assert!(thread.value_stack.get(base, 0).is_undefined());
        assert!(thread.value_stack.get(base, 1).is_undefined());
    }
}
