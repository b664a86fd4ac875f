//! The explicit frame stack.
//!
//! Jsonnet recursion never recurses on the host stack: every suspended
//! evaluation is a [`Frame`] here. Only Call frames count toward the depth
//! limit and appear in stack traces.

use crate::errors::{RuntimeError, RuntimeErrorKind, TraceFrame};
use crate::frame::{Frame, FrameKind};
use crate::heap::{ClosureBody, Heap, HeapEntity, HeapId};
use crate::value::BindingFrame;
use jsonnet_ir::{LocationRange, Name, StringInterner};

pub(crate) struct Stack {
    frames: Vec<Frame>,
    calls: usize,
    limit: usize,
}

impl Stack {
    pub fn new(limit: usize) -> Self {
        Stack {
            frames: Vec::new(),
            calls: 0,
            limit,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Number of Call frames.
    #[inline]
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn push(&mut self, frame: Frame) {
        if frame.is_call() {
            self.calls += 1;
        }
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        if let Some(frame) = self.frames.pop() {
            if frame.is_call() {
                self.calls -= 1;
            }
        }
    }

    /// Drop every frame.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.calls = 0;
    }

    /// # Panics
    /// Panics on an empty stack; the evaluator never resumes without a frame.
    pub fn top(&self) -> &Frame {
        match self.frames.last() {
            Some(frame) => frame,
            None => empty_stack(),
        }
    }

    /// # Panics
    /// Panics on an empty stack.
    pub fn top_mut(&mut self) -> &mut Frame {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => empty_stack(),
        }
    }

    /// Push a Call frame, first dropping a caller that is in tail position.
    pub fn new_call(
        &mut self,
        loc: LocationRange,
        context: HeapId,
        self_: Option<HeapId>,
        offset: u32,
        bindings: BindingFrame,
    ) -> Result<(), RuntimeErrorKind> {
        self.tail_call_trim();
        if self.calls >= self.limit {
            return Err(RuntimeErrorKind::StackOverflow);
        }
        let mut frame = Frame::at(FrameKind::Call, loc);
        frame.context = Some(context);
        frame.self_ = self_;
        frame.offset = offset;
        frame.bindings = bindings;
        self.push(frame);
        Ok(())
    }

    /// If the top of the stack is an eligible Call frame with only Local
    /// frames above it, remove all of them.
    pub fn tail_call_trim(&mut self) {
        for i in (0..self.frames.len()).rev() {
            let frame = &self.frames[i];
            match frame.kind {
                FrameKind::Local => {}
                FrameKind::Call => {
                    if frame.tail_call && frame.thunks.is_empty() {
                        self.frames.truncate(i);
                        self.calls -= 1;
                    }
                    return;
                }
                _ => return,
            }
        }
    }

    /// Find the thunk bound to `name`, searching no further than the
    /// innermost Call frame.
    pub fn lookup_var(&self, name: Name) -> Option<HeapId> {
        for frame in self.frames.iter().rev() {
            if let Some(&thunk) = frame.bindings.get(&name) {
                return Some(thunk);
            }
            if frame.is_call() {
                break;
            }
        }
        None
    }

    /// `self` and super offset of the innermost Call frame.
    pub fn self_binding(&self) -> (Option<HeapId>, u32) {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.is_call())
            .map_or((None, 0), |frame| (frame.self_, frame.offset))
    }

    pub fn already_running_invariants(&self, object: HeapId) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.kind == FrameKind::Invariants && frame.self_ == Some(object))
    }

    /// Push every heap handle held by a live frame.
    pub fn roots(&self, out: &mut Vec<HeapId>) {
        for frame in &self.frames {
            frame.roots(out);
        }
    }

    /// Build an error at `loc` with a trace of every Call frame, innermost
    /// first.
    pub fn make_error(
        &self,
        loc: LocationRange,
        kind: RuntimeErrorKind,
        heap: &Heap,
        interner: &StringInterner,
    ) -> RuntimeError {
        let mut trace = vec![TraceFrame {
            location: loc.display(interner).to_string(),
            name: String::new(),
        }];
        for (i, frame) in self.frames.iter().enumerate().rev() {
            if !frame.is_call() {
                continue;
            }
            if let Some(context) = frame.context {
                if let Some(last) = trace.last_mut() {
                    last.name = self.context_name(i, context, heap, interner);
                }
            }
            if frame.loc.is_set() || !interner.lookup(frame.loc.file).is_empty() {
                trace.push(TraceFrame {
                    location: frame.loc.display(interner).to_string(),
                    name: String::new(),
                });
            }
        }
        RuntimeError::new(kind, trace)
    }

    /// Describe the entity run by the Call frame at `index`, naming it after
    /// the nearest binding below that frame currently holding it.
    fn context_name(
        &self,
        index: usize,
        context: HeapId,
        heap: &Heap,
        interner: &StringInterner,
    ) -> String {
        let mut binding = None;
        for frame in self.frames[..index].iter().rev() {
            for (&name, &thunk) in &frame.bindings {
                let holds_context = heap
                    .thunk(thunk)
                    .value()
                    .and_then(|value| value.heap_id())
                    == Some(context);
                if holds_context {
                    binding = Some(name);
                }
            }
            if frame.is_call() {
                break;
            }
        }
        let name = binding.map_or("anonymous", |name| interner.lookup(name));

        match heap.get(context) {
            HeapEntity::Object(_) => format!("object <{name}>"),
            HeapEntity::Thunk(thunk) => thunk
                .name
                .map(|n| format!("thunk <{}>", interner.lookup(n)))
                .unwrap_or_default(),
            HeapEntity::Closure(closure) => match &closure.body {
                ClosureBody::Expr(_) => format!("function <{name}>"),
                ClosureBody::Builtin(builtin) => format!("builtin function <{}>", builtin.name()),
                ClosureBody::Native(native) => format!("builtin function <{native}>"),
            },
            HeapEntity::String(_) | HeapEntity::Array(_) => String::new(),
        }
    }
}

#[cold]
#[inline(never)]
fn empty_stack() -> ! {
    panic!("evaluator resumed with an empty frame stack")
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
