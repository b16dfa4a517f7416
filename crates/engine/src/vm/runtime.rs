/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! The heap-global state every activation implicitly shares: the symbol
//! table, the coroutine scheduler, and the embedding-supplied collaborator
//! (`Host`, combining the object model, error construction and the GC
//! acquire/release hooks). Nothing in [crate::vm::interpreter] reaches for
//! process-wide mutable statics -- it all hangs off one `Runtime`, so two
//! runtimes never contend and a test can spin up as many as it likes.

use crate::options::Options;
use crate::vm::code_block::CodeBlock;
use crate::vm::coroutine::{Resumption, Thread, ThreadId, ThreadState};
use crate::vm::interpreter::{self, Host};
use crate::vm::symbol_table::SymbolTable;
use crate::vm::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Runtime<H: Host> {
    pub symbols: SymbolTable,
    pub host: H,
    options: Options,
    threads: HashMap<ThreadId, Thread>,
    next_thread_id: u32,
    /// Stack of threads currently resuming one another, innermost last.
    /// `Thread.yield` and an uncaught throw both hand control back to
    /// whoever is on top once the current thread pops off.
    active: Vec<ThreadId>,
}

impl<H: Host> Runtime<H> {
    pub fn new(host: H) -> Self {
        Self::with_options(host, Options::default())
    }

    pub fn with_options(host: H, options: Options) -> Self {
        Self {
            symbols: SymbolTable::new(),
            host,
            options,
            threads: HashMap::new(),
            next_thread_id: 0,
            active: Vec::new(),
        }
    }

    pub fn spawn_thread(&mut self, template: Arc<CodeBlock>, this: Value) -> ThreadId {
        let id = ThreadId(self.next_thread_id);
        self.next_thread_id += 1;
        let thread = Thread::with_capacities(
            template,
            this,
            self.options.initial_value_stack_capacity,
            self.options.initial_call_stack_capacity,
            self.options.initial_catch_stack_capacity,
        );
        self.threads.insert(id, thread);
        id
    }

    /// Runs a freshly compiled top-level program to completion, as a
    /// throwaway thread with no resumer. This is the entry point a direct
    /// `eval` or a module's top-level script uses.
    pub fn run_program(&mut self, template: Arc<CodeBlock>) -> Result<Value, Value> {
        if self.options.dump_bytecode {
            eprintln!("{}", template.display());
        }
        let id = self.spawn_thread(template, Value::undefined());
        match self.drive(id, Value::undefined()) {
            Resumption::Returned(v) => Ok(v),
            Resumption::Threw(v) => Err(v),
            Resumption::Yielded(_) => {
                panic!("top-level program yielded outside of a generator context")
            }
        }
    }

    /// Resumes `id` with `value` as the result of its last `yield`
    /// expression (or as the thread's initial arguments, the first time).
    /// Fails with a `TypeError`-shaped value if the thread already ran to
    /// completion -- constructed through `Host::make_error`, the same as
    /// the interpreter's own errors, so the embedding can't tell the two
    /// apart by shape.
    pub fn resume(&mut self, id: ThreadId, value: Value) -> Resumption {
        let already_done = self
            .threads
            .get(&id)
            .map(|t| t.is_done())
            .unwrap_or(true);
        if already_done {
            let msg = "cannot resume a terminated thread";
            let err = self.host.make_error(crate::vm::error::ErrorKind::Type, msg, "");
            return Resumption::Threw(err);
        }
        self.drive(id, value)
    }

    /// `Thread.resume`'s `iserror` case: instead of delivering `value` as
    /// the result of the resumee's last `yield`, raises it as a throw at
    /// that same suspension point (or, for a thread never yet resumed, as
    /// an immediate uncaught throw -- there is no suspension point to
    /// inject into yet).
    pub fn resume_with_error(&mut self, id: ThreadId, value: Value) -> Resumption {
        let already_done = self
            .threads
            .get(&id)
            .map(|t| t.is_done())
            .unwrap_or(true);
        if already_done {
            let msg = "cannot resume a terminated thread";
            let err = self.host.make_error(crate::vm::error::ErrorKind::Type, msg, "");
            return Resumption::Threw(err);
        }
        self.active.push(id);
        let thread = self.threads.get_mut(&id).expect("unknown thread id");
        let outcome = interpreter::throw_into(thread, &mut self.host, value);
        self.active.pop();
        outcome
    }

    fn drive(&mut self, id: ThreadId, resume_value: Value) -> Resumption {
        self.active.push(id);
        let thread = self.threads.get_mut(&id).expect("unknown thread id");

        match thread.state {
            ThreadState::Inactive => {
                // The thread's stored initial function is never called
                // with arguments bound at spawn time -- the first
                // `resume()`'s value is its sole argument, delivered here
                // exactly once, the same way every later resume value is
                // delivered into a `Yield`'s recorded register.
                let activation = thread.call_stack.top();
                if activation.template.param_count > 0 {
                    let base = activation.base;
                    thread.value_stack.set(base, 0, resume_value);
                }
            }
            ThreadState::Yielded => {
                // The value passed to `resume()` becomes the result of the
                // suspended `Thread.yield(...)` expression: write it into the
                // register `Op::Yield` recorded before suspending.
                let activation = thread.call_stack.top_mut();
                if let Some(dst) = activation.resume_dst.take() {
                    let base = activation.base;
                    thread.value_stack.set(base, dst, resume_value);
                }
            }
            ThreadState::Running | ThreadState::Terminated => {}
        }

        let outcome = interpreter::run(thread, &mut self.host);
        self.active.pop();
        outcome
    }

    pub fn thread_state(&self, id: ThreadId) -> Option<ThreadState> {
        self.threads.get(&id).map(|t| t.state)
    }

    pub fn current_thread(&self) -> Option<ThreadId> {
        self.active.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::{Handle, Heap};
    use crate::vm::code_block::{CodeBlockBuilder, Op};
    use crate::vm::error::{ErrorFactory, ErrorKind};
    use crate::vm::object_model::{ObjectModel, ToPrimitiveHint};
    use crate::vm::symbol_table::Symbol;

    /// Minimal object model good enough to drive arithmetic-only
    /// programs through the scheduler; property access and calls are
    /// left unimplemented since these tests never reach them.
    struct StubHost;

    impl Heap for StubHost {
        fn acquire(&mut self, _value: Value) {}
        fn release(&mut self, _value: Value) {}
    }

    impl ErrorFactory for StubHost {
        fn make_error(&mut self, kind: ErrorKind, message: &str, _stack_trace: &str) -> Value {
            let _ = (kind, message);
            Value::null()
        }
    }

    impl ObjectModel for StubHost {
        fn get_by_id(&mut self, _t: Value, _n: Symbol) -> Result<Value, Value> {
            unimplemented!()
        }
        fn put_by_id(&mut self, _t: Value, _n: Symbol, _v: Value) -> Result<(), Value> {
            unimplemented!()
        }
        fn delete_by_id(&mut self, _t: Value, _n: Symbol) -> Result<bool, Value> {
            unimplemented!()
        }
        fn get_by_val(&mut self, _t: Value, _k: Value) -> Result<Value, Value> {
            unimplemented!()
        }
        fn put_by_val(&mut self, _t: Value, _k: Value, _v: Value) -> Result<(), Value> {
            unimplemented!()
        }
        fn delete_by_val(&mut self, _t: Value, _k: Value) -> Result<bool, Value> {
            unimplemented!()
        }
        fn has_property(&mut self, _t: Value, _n: Symbol) -> Result<bool, Value> {
            unimplemented!()
        }
        fn instance_of(&mut self, _v: Value, _c: Value) -> Result<bool, Value> {
            unimplemented!()
        }
        fn get_global(&mut self, _n: Symbol) -> Result<Value, Value> {
            unimplemented!()
        }
        fn set_global(&mut self, _n: Symbol, _v: Value) -> Result<(), Value> {
            unimplemented!()
        }
        fn to_primitive(&mut self, v: Value, _h: ToPrimitiveHint) -> Result<Value, Value> {
            Ok(v)
        }
        fn to_number(&mut self, _v: Value) -> Result<f64, Value> {
            Ok(f64::NAN)
        }
        fn to_string(&mut self, _v: Value) -> Result<Handle, Value> {
            unimplemented!()
        }
        fn type_of(&mut self, _v: Value) -> &'static str {
            "object"
        }
        fn string_from_static(&mut self, _s: &'static str) -> Handle {
            Handle::from_raw(0)
        }
        fn concat_strings(&mut self, _a: Handle, _b: Handle) -> Handle {
            unimplemented!()
        }
        fn intern_string(&mut self, _s: Handle) -> Symbol {
            unimplemented!()
        }
        fn is_falsy_handle(&mut self, _h: Handle) -> bool {
            false
        }
        fn strict_equal(&mut self, a: Value, b: Value) -> bool {
            a.is_int32() && b.is_int32() && a.as_int32() == b.as_int32()
        }
        fn abstract_equal(&mut self, a: Value, b: Value) -> Result<bool, Value> {
            Ok(self.strict_equal(a, b))
        }
        fn call(&mut self, _c: Value, _t: Value, _a: &[Value]) -> Result<Value, Value> {
            unimplemented!()
        }
        fn construct(&mut self, _c: Value, _a: &[Value]) -> Result<Value, Value> {
            unimplemented!()
        }
        fn is_callable(&mut self, _v: Value) -> bool {
            false
        }
        fn is_constructor(&mut self, _v: Value) -> bool {
            false
        }
        fn new_object(&mut self) -> Value {
            unimplemented!()
        }
        fn new_array(&mut self, _e: &[Value]) -> Value {
            unimplemented!()
        }
    }

    fn program(ops: Vec<Op>, registers: u16) -> Arc<CodeBlock> {
        let mut builder = CodeBlockBuilder::new(Handle::from_raw(0), "<test>");
        builder.reserve_registers(registers);
        for op in ops {
            builder.emit(op);
        }
        Arc::new(builder.build())
    }

    #[test]
    fn run_program_returns_simple_arithmetic() {
        let mut rt = Runtime::new(StubHost);
        let template = program(
            vec![
                Op::LoadInt { dst: 0, value: 2 },
                Op::LoadInt { dst: 1, value: 3 },
                Op::Add { dst: 2, lhs: 0, rhs: 1 },
                Op::Return { value: 2 },
            ],
            3,
        );
        let result = rt.run_program(template).unwrap();
        assert!(result.is_int32());
        assert_eq!(result.as_int32(), 5);
    }

    #[test]
    fn uncaught_throw_surfaces_as_err() {
        let mut rt = Runtime::new(StubHost);
        let template = program(
            vec![Op::LoadInt { dst: 0, value: 1 }, Op::Throw { value: 0 }],
            1,
        );
        let err = rt.run_program(template).unwrap_err();
        assert!(err.is_int32());
        assert_eq!(err.as_int32(), 1);
    }

    #[test]
    fn try_finally_runs_finally_before_propagating_return() {
        use crate::vm::code_block::{CatchEntry, CatchKind};
        // equivalent to: function f() { try { return 1; } finally { sideEffect = 2; } }
        let mut builder = CodeBlockBuilder::new(Handle::from_raw(0), "<test>");
        builder.reserve_registers(2);
        builder.push_catch(CatchEntry {
            start: 0,
            end: 1,
            handler: 2,
            scope_depth: 0,
            kind: CatchKind::Finally,
        });
        builder.emit(Op::PushCatch { handler: 2, binding: 0 }); // 0
        builder.emit(Op::LoadInt { dst: 0, value: 1 });
        builder.emit(Op::Return { value: 0 }); // 1: triggers finally via propagate()
        builder.emit(Op::LoadInt { dst: 1, value: 2 }); // 2: finally body
        builder.emit(Op::EndFinally); // 3: resumes the pending Return(1)
        let template = Arc::new(builder.build());

        let mut rt = Runtime::new(StubHost);
        let result = rt.run_program(template).unwrap();
        assert_eq!(result.as_int32(), 1);
    }

    #[test]
    fn coroutine_yield_then_resume_round_trips_through_the_register() {
        // equivalent to: function(x) { return Thread.yield(x + 1); }
        let mut builder = CodeBlockBuilder::new(Handle::from_raw(0), "<test>");
        builder.set_params(1);
        builder.reserve_registers(4);
        builder.emit(Op::LoadInt { dst: 1, value: 1 });
        builder.emit(Op::Add { dst: 2, lhs: 0, rhs: 1 });
        builder.emit(Op::Yield { dst: 3, value: 2 });
        builder.emit(Op::Return { value: 3 });
        let template = Arc::new(builder.build());

        let mut rt = Runtime::new(StubHost);
        let id = rt.spawn_thread(template, Value::undefined());

        // The thread never receives `10` at spawn time -- it is the
        // value of this very first `resume()` call that becomes `x`.
        match rt.resume(id, Value::int32(10)) {
            Resumption::Yielded(v) => assert_eq!(v.as_int32(), 11),
            _ => panic!("expected the thread to yield first"),
        }
        match rt.resume(id, Value::int32(100)) {
            Resumption::Returned(v) => assert_eq!(v.as_int32(), 100),
            _ => panic!("expected the thread to return the resumed value"),
        }
        assert_eq!(rt.thread_state(id), Some(ThreadState::Terminated));
    }

    #[test]
    fn resume_with_error_raises_a_throw_at_the_yield_site() {
        // equivalent to: function(x) { try { Thread.yield(x); return 1; } catch (e) { return e; } }
        use crate::vm::code_block::{CatchEntry, CatchKind};
        let mut builder = CodeBlockBuilder::new(Handle::from_raw(0), "<test>");
        builder.set_params(1);
        builder.reserve_registers(2);
        builder.push_catch(CatchEntry {
            start: 0,
            end: 1,
            handler: 3,
            scope_depth: 0,
            kind: CatchKind::Catch { binding: 1 },
        });
        builder.emit(Op::PushCatch { handler: 3, binding: 1 }); // 0
        builder.emit(Op::Yield { dst: 1, value: 0 }); // 1: suspend, awaiting resume
        builder.emit(Op::Return { value: 1 }); // 2: ordinary-resume path, unused here
        builder.emit(Op::Return { value: 1 }); // 3: catch handler returns the caught value
        let template = Arc::new(builder.build());

        let mut rt = Runtime::new(StubHost);
        let id = rt.spawn_thread(template, Value::undefined());
        match rt.resume(id, Value::int32(10)) {
            Resumption::Yielded(v) => assert_eq!(v.as_int32(), 10),
            _ => panic!("expected the thread to yield first"),
        }
        match rt.resume_with_error(id, Value::int32(99)) {
            Resumption::Returned(v) => assert_eq!(v.as_int32(), 99),
            _ => panic!("expected the catch handler to observe the injected throw"),
        }
    }
}
