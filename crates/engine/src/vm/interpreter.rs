/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! The register-machine dispatch loop and the non-local transfer handler
//! that walks the catch stack on return/throw/break/continue. Every
//! opcode that can allocate or call back into the object model is
//! expected to invalidate any cached register-window base the caller was
//! holding; we re-read `activation.base` off the call stack after every
//! such call rather than caching it across the match arm.

use crate::gc::Heap;
use crate::vm::code_block::{CatchKind, Op};
use crate::vm::coroutine::{Resumption, Thread, ThreadState};
use crate::vm::environment::{resolve_depth, Environment};
use crate::vm::error::{format_stack_trace, ErrorFactory, ErrorKind, TraceFrame};
use crate::vm::frame::{CatchScope, PendingTransfer};
use crate::vm::object_model::{ObjectModel, ToPrimitiveHint};
use crate::vm::value::Value;

/// What a single opcode (or a whole run of them) produced: either normal
/// fall-through, or one of the non-local completions ECMAScript defines.
/// `Throw` is a completion like any other here, not a side channel --
/// that is the generalization this core makes over a host language whose
/// only non-local-transfer primitive is a C `longjmp`.
pub enum Transfer {
    Normal,
    Return(Value),
    Throw(Value),
    Break(u32),
    Continue(u32),
    Yield(Value),
}

/// Host hooks the dispatch loop needs beyond the object model: building
/// interpreter-raised errors and (optionally) polling for interruption.
pub trait Host: ObjectModel + ErrorFactory + Heap {
    /// Called roughly every 64Ki instructions; returning `Err` aborts
    /// execution with the given value as if it had been thrown at the
    /// current instruction.
    fn poll_interrupt(&mut self) -> Result<(), Value> {
        Ok(())
    }
}

impl<T: ObjectModel + ErrorFactory + Heap> Host for T {}

/// Drives `thread` until it yields, returns, or throws uncaught.
pub fn run(thread: &mut Thread, host: &mut dyn Host) -> Resumption {
    thread.state = ThreadState::Running;
    drive(thread, host)
}

/// Resumes a thread by raising `value` as a throw at its current
/// suspension point instead of letting it fall through normally --
/// `Thread.resume`'s `iserror` case, which injects an error into the
/// resumee rather than delivering an ordinary resume value.
pub fn throw_into(thread: &mut Thread, host: &mut dyn Host, value: Value) -> Resumption {
    thread.state = ThreadState::Running;
    match propagate(thread, Transfer::Throw(value)) {
        PropagateOutcome::Continue => drive(thread, host),
        PropagateOutcome::ThreadDone(Transfer::Throw(v)) => {
            thread.state = ThreadState::Terminated;
            Resumption::Threw(v)
        }
        PropagateOutcome::ThreadDone(_) => {
            unreachable!("propagate(Transfer::Throw(_)) only ever resolves to Continue or ThreadDone(Throw)")
        }
    }
}

fn drive(thread: &mut Thread, host: &mut dyn Host) -> Resumption {
    loop {
        match step_activation(thread, host) {
            Transfer::Normal => continue,
            Transfer::Return(v) => {
                thread.state = ThreadState::Terminated;
                return Resumption::Returned(v);
            }
            Transfer::Throw(v) => {
                thread.state = ThreadState::Terminated;
                return Resumption::Threw(v);
            }
            Transfer::Yield(v) => {
                thread.state = ThreadState::Yielded;
                return Resumption::Yielded(v);
            }
            Transfer::Break(_) | Transfer::Continue(_) => {
                unreachable!("propagate() always resolves break/continue to a jump or a finally re-entry")
            }
        }
    }
}

/// Executes bytecode until the *whole thread* completes or yields,
/// handling cross-activation call/return/throw internally. Returns the
/// transfer the thread as a whole produced.
fn step_activation(thread: &mut Thread, host: &mut dyn Host) -> Transfer {
    loop {
        let raw = match eval_one(thread, host) {
            Ok(t) => t,
            Err(thrown) => Transfer::Throw(thrown),
        };
        match propagate(thread, raw) {
            PropagateOutcome::Continue => continue,
            PropagateOutcome::ThreadDone(t) => return t,
        }
    }
}

enum PropagateOutcome {
    Continue,
    ThreadDone(Transfer),
}

/// The non-local transfer handler: walks the catch stack belonging to
/// the active activation looking for a handler that intercepts this kind
/// of completion, running finally blocks along the way. Once the catch
/// stack for an activation is exhausted, a throw or return crosses into
/// the caller; break/continue never do -- their label always lives in
/// the same activation, so exhausting the catch stack just means the
/// jump to their target is finally unobstructed.
fn propagate(thread: &mut Thread, transfer: Transfer) -> PropagateOutcome {
    let transfer = match transfer {
        Transfer::Normal => return PropagateOutcome::Continue,
        other => other,
    };

    // Yield only ever arrives here from a deliberate Yield opcode and
    // never needs to cross a finally -- suspending preserves every live
    // scope exactly as it stood.
    if let Transfer::Yield(v) = transfer {
        return PropagateOutcome::ThreadDone(Transfer::Yield(v));
    }

    let activation_base = thread.call_stack.top().catch_stack_base;
    while thread.catch_stack.len() > activation_base {
        let scope = thread.catch_stack.scopes.pop().unwrap();
        match (&scope.kind, &transfer) {
            (CatchKind::Catch { binding }, Transfer::Throw(value)) => {
                enter_handler(thread, &scope, Some((*binding, *value)));
                return PropagateOutcome::Continue;
            }
            (CatchKind::Catch { .. }, _) => {
                // Doesn't intercept return/break/continue; keep unwinding.
                continue;
            }
            (CatchKind::Finally, _) => {
                let pending = to_pending(&transfer);
                thread.call_stack.top_mut().pending = Some(pending);
                enter_handler(thread, &scope, None);
                return PropagateOutcome::Continue;
            }
        }
    }

    // Nothing in this activation's catch table wants it. Throw/return
    // cross the call boundary into the caller; break/continue never do
    // -- their target is always an address inside this same activation,
    // so once no further finally stands between the transfer and its
    // label this is just a jump.
    match transfer {
        Transfer::Throw(value) => pop_activation_on_throw(thread, value),
        Transfer::Return(value) => pop_activation_on_return(thread, value),
        Transfer::Break(target) | Transfer::Continue(target) => {
            thread.call_stack.top_mut().ip = target;
            PropagateOutcome::Continue
        }
        Transfer::Yield(_) | Transfer::Normal => unreachable!(),
    }
}

fn to_pending(transfer: &Transfer) -> PendingTransfer {
    match transfer {
        Transfer::Return(v) => PendingTransfer::Return(*v),
        Transfer::Throw(v) => PendingTransfer::Throw(*v),
        Transfer::Break(t) => PendingTransfer::Break(*t),
        Transfer::Continue(t) => PendingTransfer::Continue(*t),
        Transfer::Normal | Transfer::Yield(_) => unreachable!(),
    }
}

fn enter_handler(thread: &mut Thread, scope: &CatchScope, bind: Option<(u16, Value)>) {
    let activation = thread.call_stack.top_mut();
    thread
        .value_stack
        .truncate(activation.base + scope.value_stack_depth as usize);
    activation.ip = scope.handler_pc;
    restore_env_depth(activation, scope.scope_depth);
    if let Some((reg, value)) = bind {
        thread.value_stack.set(activation.base, reg, value);
    }
}

/// Pops `activation.env` back to the lexical nesting depth active when the
/// handler's `PushCatch` ran, undoing any `PushScope` the protected region
/// entered before the transfer fired -- otherwise `GetVar`/`SetVar` inside
/// the handler would resolve `depth` against scopes the handler can no
/// longer see.
fn restore_env_depth(activation: &mut crate::vm::frame::Activation, target_depth: u16) {
    let current_depth = environment_chain_depth(&activation.env);
    if current_depth > target_depth {
        activation.env = resolve_depth(&activation.env, current_depth - target_depth);
    }
}

fn environment_chain_depth(env: &crate::vm::environment::EnvironmentRef) -> u16 {
    let mut depth = 0;
    let mut current = env.clone();
    while let Some(parent) = current.borrow().parent().cloned() {
        depth += 1;
        current = parent;
    }
    depth
}

fn pop_activation_on_throw(thread: &mut Thread, value: Value) -> PropagateOutcome {
    let finished = thread.call_stack.activations.pop().unwrap();
    thread.value_stack.truncate(finished.base);
    thread.catch_stack.truncate(finished.catch_stack_base);
    if thread.call_stack.activations.is_empty() {
        PropagateOutcome::ThreadDone(Transfer::Throw(value))
    } else {
        propagate(thread, Transfer::Throw(value))
    }
}

fn pop_activation_on_return(thread: &mut Thread, value: Value) -> PropagateOutcome {
    let finished = thread.call_stack.activations.pop().unwrap();
    thread.value_stack.truncate(finished.base);
    thread.catch_stack.truncate(finished.catch_stack_base);
    if thread.call_stack.activations.is_empty() {
        return PropagateOutcome::ThreadDone(Transfer::Return(value));
    }
    if let Some(dst) = finished.caller_dst {
        let caller = thread.call_stack.top();
        thread.value_stack.set(caller.base, dst, value);
    }
    PropagateOutcome::Continue
}

/// Runs a short burst of bytecode (ideally just long enough to produce a
/// `Transfer`, at most one opcode per call to keep the invalidation
/// discipline simple) in the topmost activation.
fn eval_one(thread: &mut Thread, host: &mut dyn Host) -> Result<Transfer, Value> {
    loop {
        let activation_index = thread.call_stack.activations.len() - 1;
        let (template, base, ip) = {
            let a = &thread.call_stack.activations[activation_index];
            (a.template.clone(), a.base, a.ip)
        };

        if template.take_interrupt_tick() {
            host.poll_interrupt()?;
        }

        let op = template.code[ip as usize];
        thread.call_stack.activations[activation_index].ip = ip + 1;

        macro_rules! reg {
            ($r:expr) => {
                thread.value_stack.get(base, $r)
            };
        }
        macro_rules! set {
            ($r:expr, $v:expr) => {
                thread.value_stack.set(base, $r, $v)
            };
        }

        match op {
            Op::Nop => {}
            Op::LoadConst { dst, constant } => {
                let handle = template.load_literal(constant);
                set!(dst, Value::handle(handle));
            }
            Op::LoadInt { dst, value } => set!(dst, Value::int32(value)),
            Op::LoadTrue { dst } => set!(dst, Value::boolean(true)),
            Op::LoadFalse { dst } => set!(dst, Value::boolean(false)),
            Op::LoadNull { dst } => set!(dst, Value::null()),
            Op::LoadUndefined { dst } => set!(dst, Value::undefined()),
            Op::Move { dst, src } => set!(dst, reg!(src)),

            Op::Add { dst, lhs, rhs } => {
                let result = numeric_add(reg!(lhs), reg!(rhs), host)?;
                set!(dst, result);
            }
            Op::Sub { dst, lhs, rhs } => {
                let result = numeric_binop(reg!(lhs), reg!(rhs), host, |a, b| a - b)?;
                set!(dst, result);
            }
            Op::Mul { dst, lhs, rhs } => {
                let result = numeric_binop(reg!(lhs), reg!(rhs), host, |a, b| a * b)?;
                set!(dst, result);
            }
            Op::Div { dst, lhs, rhs } => {
                let result = numeric_binop(reg!(lhs), reg!(rhs), host, |a, b| a / b)?;
                set!(dst, result);
            }
            Op::Rem { dst, lhs, rhs } => {
                let result = numeric_binop(reg!(lhs), reg!(rhs), host, |a, b| a % b)?;
                set!(dst, result);
            }
            Op::Shl { dst, lhs, rhs } => {
                let result = int_binop(reg!(lhs), reg!(rhs), host, |a, b| a.wrapping_shl(b & 31))?;
                set!(dst, result);
            }
            Op::Shr { dst, lhs, rhs } => {
                let result = int_binop(reg!(lhs), reg!(rhs), host, |a, b| a.wrapping_shr(b & 31))?;
                set!(dst, result);
            }
            Op::UShr { dst, lhs, rhs } => {
                let l = to_number(reg!(lhs), host)?;
                let r = to_number(reg!(rhs), host)?;
                let l = Value::to_uint32_from_number(l);
                let r = Value::to_uint32_from_number(r) & 31;
                set!(dst, Value::number((l >> r) as f64));
            }
            Op::BitAnd { dst, lhs, rhs } => {
                let result = int_binop(reg!(lhs), reg!(rhs), host, |a, b| a & b)?;
                set!(dst, result);
            }
            Op::BitOr { dst, lhs, rhs } => {
                let result = int_binop(reg!(lhs), reg!(rhs), host, |a, b| a | b)?;
                set!(dst, result);
            }
            Op::BitXor { dst, lhs, rhs } => {
                let result = int_binop(reg!(lhs), reg!(rhs), host, |a, b| a ^ b)?;
                set!(dst, result);
            }
            Op::In { dst, lhs, rhs } => {
                let sym = value_to_property_key(reg!(lhs), host)?;
                let found = host.has_property(reg!(rhs), sym)?;
                set!(dst, Value::boolean(found));
            }
            Op::InstanceOf { dst, lhs, rhs } => {
                let found = host.instance_of(reg!(lhs), reg!(rhs))?;
                set!(dst, Value::boolean(found));
            }

            Op::Eq { dst, lhs, rhs } => {
                let result = host.abstract_equal(reg!(lhs), reg!(rhs))?;
                set!(dst, Value::boolean(result));
            }
            Op::Neq { dst, lhs, rhs } => {
                let result = host.abstract_equal(reg!(lhs), reg!(rhs))?;
                set!(dst, Value::boolean(!result));
            }
            Op::StrictEq { dst, lhs, rhs } => {
                set!(dst, Value::boolean(host.strict_equal(reg!(lhs), reg!(rhs))));
            }
            Op::StrictNeq { dst, lhs, rhs } => {
                set!(dst, Value::boolean(!host.strict_equal(reg!(lhs), reg!(rhs))));
            }
            Op::Less { dst, lhs, rhs } => {
                let result = compare(reg!(lhs), reg!(rhs), host)?;
                set!(dst, Value::boolean(matches!(result, Some(std::cmp::Ordering::Less))));
            }
            Op::LessEq { dst, lhs, rhs } => {
                let result = compare(reg!(lhs), reg!(rhs), host)?;
                set!(dst, Value::boolean(matches!(
                    result,
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                )));
            }
            Op::Greater { dst, lhs, rhs } => {
                let result = compare(reg!(lhs), reg!(rhs), host)?;
                set!(dst, Value::boolean(matches!(result, Some(std::cmp::Ordering::Greater))));
            }
            Op::GreaterEq { dst, lhs, rhs } => {
                let result = compare(reg!(lhs), reg!(rhs), host)?;
                set!(dst, Value::boolean(matches!(
                    result,
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                )));
            }

            Op::TypeOf { dst, src } => {
                let ty = host.type_of(reg!(src));
                let handle = host.string_from_static(ty);
                set!(dst, Value::handle(handle));
            }
            Op::Not { dst, src } => {
                let b = reg!(src).to_boolean(|h| host.is_falsy_handle(h));
                set!(dst, Value::boolean(!b));
            }
            Op::Neg { dst, src } => {
                let n = to_number(reg!(src), host)?;
                set!(dst, Value::number(-n));
            }
            Op::Pos { dst, src } => {
                let n = to_number(reg!(src), host)?;
                set!(dst, Value::number(n));
            }
            Op::BitNot { dst, src } => {
                let n = to_number(reg!(src), host)?;
                set!(dst, Value::number(!Value::to_int32_from_number(n) as f64));
            }
            Op::Inc { dst, src } => {
                let n = to_number(reg!(src), host)?;
                set!(dst, Value::number(n + 1.0));
            }
            Op::Dec { dst, src } => {
                let n = to_number(reg!(src), host)?;
                set!(dst, Value::number(n - 1.0));
            }

            Op::GetById { dst, base: b, name, feedback: _ } => {
                let sym = template.property_key(name);
                let result = host.get_by_id(reg!(b), sym)?;
                set!(dst, result);
            }
            Op::PutById { base: b, name, value, feedback: _ } => {
                let sym = template.property_key(name);
                host.put_by_id(reg!(b), sym, reg!(value))?;
            }
            Op::DeleteById { dst, base: b, name } => {
                let sym = template.property_key(name);
                let result = host.delete_by_id(reg!(b), sym)?;
                set!(dst, Value::boolean(result));
            }
            Op::GetByVal { dst, base: b, key } => {
                let result = host.get_by_val(reg!(b), reg!(key))?;
                set!(dst, result);
            }
            Op::PutByVal { base: b, key, value } => {
                host.put_by_val(reg!(b), reg!(key), reg!(value))?;
            }
            Op::DeleteByVal { dst, base: b, key } => {
                let result = host.delete_by_val(reg!(b), reg!(key))?;
                set!(dst, Value::boolean(result));
            }

            Op::GetGlobal { dst, name } => {
                let sym = template.property_key(name);
                let result = host.get_global(sym)?;
                set!(dst, result);
            }
            Op::SetGlobal { name, value } => {
                let sym = template.property_key(name);
                host.set_global(sym, reg!(value))?;
            }
            Op::GetVar { dst, slot, depth } => {
                let env = thread.call_stack.activations[activation_index].env.clone();
                let owner = resolve_depth(&env, depth);
                let value = owner.borrow().get_local(slot);
                set!(dst, value);
            }
            Op::SetVar { slot, depth, value } => {
                let env = thread.call_stack.activations[activation_index].env.clone();
                let owner = resolve_depth(&env, depth);
                let v = reg!(value);
                if !owner.borrow_mut().set_local(slot, v, host) {
                    let msg = "Assignment to constant variable.";
                    let trace = capture_trace(thread);
                    return Err(host.make_error(ErrorKind::Type, msg, &trace));
                }
            }
            Op::DeclareLet { slot, value } => {
                let env = thread.call_stack.activations[activation_index].env.clone();
                env.borrow_mut().declare(slot, reg!(value), true, host);
            }
            Op::DeclareConst { slot, value } => {
                let env = thread.call_stack.activations[activation_index].env.clone();
                env.borrow_mut().declare(slot, reg!(value), false, host);
            }
            Op::PushScope { size } => {
                let parent = thread.call_stack.activations[activation_index].env.clone();
                thread.call_stack.activations[activation_index].env =
                    Environment::new_declarative(Some(parent), size);
            }
            Op::PopScope => {
                let parent = thread.call_stack.activations[activation_index]
                    .env
                    .borrow()
                    .parent()
                    .cloned()
                    .expect("PopScope with no parent environment");
                thread.call_stack.activations[activation_index].env = parent;
            }

            Op::NewObject { dst } => set!(dst, host.new_object()),
            Op::NewArray { dst, first, count } => {
                let elements = thread.value_stack.slice(base, first, count).to_vec();
                set!(dst, host.new_array(&elements));
            }
            Op::NewFunction { .. } => {
                // Closure creation binds a template to the current
                // environment; left to the object model, which owns the
                // function object shape.
                unimplemented!("function-object creation is an object-model operation")
            }
            Op::Spread { dst, src } => set!(dst, reg!(src)),

            Op::Jump { target } => {
                thread.call_stack.activations[activation_index].ip = target;
            }
            Op::JumpIfTrue { cond, target } => {
                if reg!(cond).to_boolean(|h| host.is_falsy_handle(h)) {
                    thread.call_stack.activations[activation_index].ip = target;
                }
            }
            Op::JumpIfFalse { cond, target } => {
                if !reg!(cond).to_boolean(|h| host.is_falsy_handle(h)) {
                    thread.call_stack.activations[activation_index].ip = target;
                }
            }
            Op::JumpIfNullish { cond, target } => {
                if reg!(cond).is_nullish() {
                    thread.call_stack.activations[activation_index].ip = target;
                }
            }
            Op::Break { target } => return Ok(Transfer::Break(target)),
            Op::Continue { target } => return Ok(Transfer::Continue(target)),

            Op::Call { dst, callee, this, first_arg, argc } => {
                let callee_val = reg!(callee);
                if !host.is_callable(callee_val) {
                    let trace = capture_trace(thread);
                    return Err(host.make_error(ErrorKind::Type, "value is not callable", &trace));
                }
                let args = thread.value_stack.slice(base, first_arg, argc).to_vec();
                let result = host.call(callee_val, reg!(this), &args)?;
                set!(dst, result);
            }
            Op::Construct { dst, callee, first_arg, argc } => {
                let callee_val = reg!(callee);
                if !host.is_constructor(callee_val) {
                    let trace = capture_trace(thread);
                    return Err(host.make_error(ErrorKind::Type, "value is not a constructor", &trace));
                }
                let args = thread.value_stack.slice(base, first_arg, argc).to_vec();
                let result = host.construct(callee_val, &args)?;
                set!(dst, result);
            }
            Op::Return { value } => return Ok(Transfer::Return(reg!(value))),
            Op::ReturnUndefined => return Ok(Transfer::Return(Value::undefined())),

            Op::PushCatch { handler, binding } => {
                let entry = template.catch_for(ip);
                let kind = match entry.map(|e| e.kind) {
                    Some(k) => k,
                    None => CatchKind::Catch { binding },
                };
                let scope_depth = entry.map(|e| e.scope_depth).unwrap_or(0);
                let depth = (thread.value_stack.len() - base) as u16;
                thread.catch_stack.scopes.push(CatchScope {
                    handler_pc: handler,
                    kind,
                    scope_depth,
                    value_stack_depth: depth,
                });
            }
            Op::PopCatch => {
                thread.catch_stack.scopes.pop();
            }
            Op::Throw { value } => return Ok(Transfer::Throw(reg!(value))),
            Op::EndFinally => {
                let pending = thread.call_stack.activations[activation_index].pending.take();
                match pending {
                    Some(PendingTransfer::Return(v)) => return Ok(Transfer::Return(v)),
                    Some(PendingTransfer::Throw(v)) => return Ok(Transfer::Throw(v)),
                    Some(PendingTransfer::Break(t)) => return Ok(Transfer::Break(t)),
                    Some(PendingTransfer::Continue(t)) => return Ok(Transfer::Continue(t)),
                    None => {}
                }
            }

            Op::Yield { dst, value } => {
                thread.call_stack.activations[activation_index].resume_dst = Some(dst);
                return Ok(Transfer::Yield(reg!(value)));
            }

            Op::End => return Ok(Transfer::Return(Value::undefined())),
        }
    }
}

/// Walks the live call stack, innermost activation first, into the
/// formatted trace an interpreter-raised error carries. Each template only
/// knows its own `source_name` (the function's display name is otherwise
/// an object-model string handle, not worth a host round-trip just for
/// diagnostics), so that name does double duty for both trace columns.
fn capture_trace(thread: &Thread) -> String {
    let frames: Vec<TraceFrame> = thread
        .call_stack
        .activations
        .iter()
        .rev()
        .map(|a| TraceFrame {
            function_name: a.template.source_name.clone(),
            source_name: a.template.source_name.clone(),
            line: a.template.line_for(a.ip),
        })
        .collect();
    format_stack_trace(&frames)
}

fn numeric_add(a: Value, b: Value, host: &mut dyn Host) -> Result<Value, Value> {
    if a.is_int32() && b.is_int32() {
        if let Some(sum) = a.as_int32().checked_add(b.as_int32()) {
            return Ok(Value::int32(sum));
        }
    }
    if a.is_number() && b.is_number() {
        return Ok(Value::number(a.to_f64() + b.to_f64()));
    }
    let pa = host.to_primitive(a, ToPrimitiveHint::Default)?;
    let pb = host.to_primitive(b, ToPrimitiveHint::Default)?;
    if pa.is_handle() || pb.is_handle() {
        // Per the abstract Add algorithm, if either primitive is a string
        // the whole operation is string concatenation.
        let sa = host.to_string(pa)?;
        let sb = host.to_string(pb)?;
        return Ok(Value::handle(host.concat_strings(sa, sb)));
    }
    let na = host.to_number(pa)?;
    let nb = host.to_number(pb)?;
    Ok(Value::number(na + nb))
}

fn numeric_binop(
    a: Value,
    b: Value,
    host: &mut dyn Host,
    f: impl FnOnce(f64, f64) -> f64,
) -> Result<Value, Value> {
    let na = to_number(a, host)?;
    let nb = to_number(b, host)?;
    Ok(Value::number(f(na, nb)))
}

fn int_binop(
    a: Value,
    b: Value,
    host: &mut dyn Host,
    f: impl FnOnce(i32, i32) -> i32,
) -> Result<Value, Value> {
    let na = to_number(a, host)?;
    let nb = to_number(b, host)?;
    let ia = Value::to_int32_from_number(na);
    let ib = Value::to_int32_from_number(nb);
    Ok(Value::number(f(ia, ib) as f64))
}

fn to_number(v: Value, host: &mut dyn Host) -> Result<f64, Value> {
    if v.is_number() {
        return Ok(v.to_f64());
    }
    if v.is_bool() {
        return Ok(if v.as_bool() { 1.0 } else { 0.0 });
    }
    if v.is_null() {
        return Ok(0.0);
    }
    if v.is_undefined() {
        return Ok(f64::NAN);
    }
    host.to_number(v)
}

fn compare(a: Value, b: Value, host: &mut dyn Host) -> Result<Option<std::cmp::Ordering>, Value> {
    let pa = host.to_primitive(a, ToPrimitiveHint::Number)?;
    let pb = host.to_primitive(b, ToPrimitiveHint::Number)?;
    let na = to_number(pa, host)?;
    let nb = to_number(pb, host)?;
    Ok(na.partial_cmp(&nb))
}

/// `In` (`"x" in obj`) is the one place a property key can be produced
/// from an arbitrary run-time value rather than a compiler-resolved
/// constant; delegated to the object model, which owns the interner.
fn value_to_property_key(
    v: Value,
    host: &mut dyn Host,
) -> Result<crate::vm::symbol_table::Symbol, Value> {
    if v.is_int32() && v.as_int32() >= 0 {
        return Ok(crate::vm::symbol_table::Symbol::Index(v.as_int32() as u32));
    }
    let handle = host.to_string(v)?;
    Ok(host.intern_string(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::{Handle as GcHandle, Heap};
    use crate::vm::code_block::{CatchEntry, CodeBlock, CodeBlockBuilder};
    use crate::vm::frame::Activation;
    use crate::vm::symbol_table::Symbol;
    use std::sync::Arc;

    struct StubHost;

    impl Heap for StubHost {
        fn acquire(&mut self, _value: Value) {}
        fn release(&mut self, _value: Value) {}
    }

    impl ErrorFactory for StubHost {
        fn make_error(&mut self, _kind: ErrorKind, _message: &str, _stack_trace: &str) -> Value {
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
        fn to_string(&mut self, _v: Value) -> Result<GcHandle, Value> {
            unimplemented!()
        }
        fn type_of(&mut self, _v: Value) -> &'static str {
            "object"
        }
        fn string_from_static(&mut self, _s: &'static str) -> GcHandle {
            GcHandle::from_raw(0)
        }
        fn concat_strings(&mut self, _a: GcHandle, _b: GcHandle) -> GcHandle {
            unimplemented!()
        }
        fn intern_string(&mut self, _s: GcHandle) -> Symbol {
            unimplemented!()
        }
        fn is_falsy_handle(&mut self, _h: GcHandle) -> bool {
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

    fn leaf_activation(
        template: Arc<CodeBlock>,
        value_stack: &mut crate::vm::frame::ValueStack,
        catch_stack_base: usize,
    ) -> Activation {
        let base = value_stack.reserve(template.num_registers as usize);
        Activation {
            template,
            base,
            ip: 0,
            env: Environment::new_declarative(None, 0),
            this: Value::undefined(),
            is_constructor: false,
            caller_dst: None,
            catch_stack_base,
            pending: None,
            resume_dst: None,
        }
    }

    /// Two activations on one thread, an outer `catch` guarding the whole
    /// frame and an inner frame that throws immediately: the throw must
    /// cross the call boundary (`pop_activation_on_throw`) and land in
    /// the outer handler, not escape the thread.
    #[test]
    fn throw_across_two_frames_is_caught_in_the_outer_catch() {
        let mut outer_builder = CodeBlockBuilder::new(GcHandle::from_raw(0), "<outer>");
        outer_builder.reserve_registers(1);
        outer_builder.emit(Op::Return { value: 0 }); // handler target: bound value in reg 0
        let outer_template = Arc::new(outer_builder.build());

        let mut inner_builder = CodeBlockBuilder::new(GcHandle::from_raw(1), "<inner>");
        inner_builder.reserve_registers(1);
        inner_builder.emit(Op::LoadInt { dst: 0, value: 42 });
        inner_builder.emit(Op::Throw { value: 0 });
        let inner_template = Arc::new(inner_builder.build());

        let mut thread = Thread::new(outer_template.clone(), Value::undefined());
        thread.call_stack.activations.clear();
        thread.value_stack.truncate(0);

        let outer = leaf_activation(outer_template, &mut thread.value_stack, 0);
        thread.call_stack.activations.push(outer);
        thread.catch_stack.scopes.push(CatchScope {
            handler_pc: 0,
            kind: CatchKind::Catch { binding: 0 },
            scope_depth: 0,
            // The outer activation's whole register file (1 slot) is
            // already reserved at call setup, so this is the depth a real
            // `Op::PushCatch` would have recorded for it.
            value_stack_depth: 1,
        });

        let inner = leaf_activation(inner_template, &mut thread.value_stack, 1);
        thread.call_stack.activations.push(inner);

        let mut host = StubHost;
        match run(&mut thread, &mut host) {
            Resumption::Returned(v) => assert_eq!(v.as_int32(), 42),
            _ => panic!("expected the outer catch to turn the throw into a return"),
        }
    }

    /// A `finally` sitting between a labeled loop and the loop's own exit
    /// target intercepts the `break`, runs, and `EndFinally` re-raises the
    /// stashed `Break` so it still reaches the loop's exit jump. Drives the
    /// real `Op::Break` opcode through `eval_one`/`run`, not `propagate()`
    /// directly, so this exercises actual bytecode dispatch.
    #[test]
    fn labeled_break_runs_finally_before_leaving_the_loop() {
        let mut builder = CodeBlockBuilder::new(GcHandle::from_raw(0), "<loop>");
        builder.reserve_registers(2);
        builder.push_catch(CatchEntry {
            start: 0,
            end: 1,
            handler: 2,
            scope_depth: 0,
            kind: CatchKind::Finally,
        });
        builder.emit(Op::PushCatch { handler: 2, binding: 0 }); // 0: enter the protected region
        builder.emit(Op::Break { target: 5 }); // 1: the `break` site
        builder.emit(Op::LoadInt { dst: 1, value: 7 }); // 2: finally body runs first
        builder.emit(Op::EndFinally); // 3: re-raises the stashed Break
        builder.emit(Op::LoadInt { dst: 0, value: 0 }); // 4: loop exit target (unreached directly)
        builder.emit(Op::Return { value: 1 }); // 5: observes the finally body ran
        let template = Arc::new(builder.build());

        let mut thread = Thread::new(template, Value::undefined());
        let mut host = StubHost;
        match run(&mut thread, &mut host) {
            Resumption::Returned(v) => assert_eq!(v.as_int32(), 7),
            _ => panic!("expected the finally body to have run before the break resumed"),
        }
    }

    /// A `catch` handler wrapping a block that pushed its own lexical
    /// scope must see `activation.env` restored to the depth active when
    /// `PushCatch` ran, not the deeper scope the throw unwound out of --
    /// otherwise a `GetVar`/`SetVar` with a statically-computed `depth`
    /// inside the handler would resolve against the wrong environment.
    /// A host that records whatever stack trace an interpreter-raised
    /// error was constructed with, so a test can assert the dispatch loop
    /// actually captured one instead of passing an empty string.
    struct TraceCapturingHost {
        last_trace: String,
    }

    impl Heap for TraceCapturingHost {
        fn acquire(&mut self, _value: Value) {}
        fn release(&mut self, _value: Value) {}
    }

    impl ErrorFactory for TraceCapturingHost {
        fn make_error(&mut self, _kind: ErrorKind, _message: &str, stack_trace: &str) -> Value {
            self.last_trace = stack_trace.to_string();
            Value::null()
        }
    }

    impl ObjectModel for TraceCapturingHost {
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
        fn to_string(&mut self, _v: Value) -> Result<GcHandle, Value> {
            unimplemented!()
        }
        fn type_of(&mut self, _v: Value) -> &'static str {
            "object"
        }
        fn string_from_static(&mut self, _s: &'static str) -> GcHandle {
            GcHandle::from_raw(0)
        }
        fn concat_strings(&mut self, _a: GcHandle, _b: GcHandle) -> GcHandle {
            unimplemented!()
        }
        fn intern_string(&mut self, _s: GcHandle) -> Symbol {
            unimplemented!()
        }
        fn is_falsy_handle(&mut self, _h: GcHandle) -> bool {
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

    #[test]
    fn calling_a_non_callable_value_raises_with_a_non_empty_stack_trace() {
        let mut builder = CodeBlockBuilder::new(GcHandle::from_raw(0), "<call-site>");
        builder.reserve_registers(1);
        builder.emit(Op::LoadUndefined { dst: 0 });
        builder.emit(Op::Call { dst: 0, callee: 0, this: 0, first_arg: 0, argc: 0 });
        let template = Arc::new(builder.build());

        let mut thread = Thread::new(template, Value::undefined());
        let mut host = TraceCapturingHost { last_trace: String::new() };
        match run(&mut thread, &mut host) {
            Resumption::Threw(_) => {}
            _ => panic!("expected calling undefined to throw"),
        }
        assert!(host.last_trace.contains("<call-site>"));
    }

    #[test]
    fn catch_handler_restores_the_environment_depth_active_at_push_catch() {
        let mut builder = CodeBlockBuilder::new(GcHandle::from_raw(0), "<scoped-catch>");
        builder.reserve_registers(2);
        builder.push_catch(CatchEntry {
            start: 1,
            end: 2,
            handler: 5,
            // The environment chain is 1 deep (one PushScope) at the
            // moment PushCatch runs.
            scope_depth: 1,
            kind: CatchKind::Catch { binding: 0 },
        });
        builder.emit(Op::PushScope { size: 1 }); // 0: depth 1, active when PushCatch runs
        builder.emit(Op::PushCatch { handler: 5, binding: 0 }); // 1
        builder.emit(Op::PushScope { size: 1 }); // 2: a nested block, depth 2
        builder.emit(Op::LoadInt { dst: 1, value: 9 }); // 3
        builder.emit(Op::Throw { value: 1 }); // 4: unwinds out of the depth-2 scope
        builder.emit(Op::DeclareLet { slot: 0, value: 0 }); // 5: handler; must run at depth 1
        builder.emit(Op::GetVar { dst: 1, slot: 0, depth: 0 }); // 6: reads back what it just declared
        builder.emit(Op::Return { value: 1 }); // 7
        let template = Arc::new(builder.build());

        let mut thread = Thread::new(template, Value::undefined());
        let mut host = StubHost;
        match run(&mut thread, &mut host) {
            Resumption::Returned(v) => assert_eq!(v.as_int32(), 9),
            _ => panic!("expected the catch handler to run at the restored environment depth"),
        }
    }
}
