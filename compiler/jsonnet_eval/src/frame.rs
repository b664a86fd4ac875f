//! Suspension points of the evaluator.

use crate::heap::{HeapId, SimpleField};
use crate::value::{BindingFrame, Value};
use jsonnet_ir::core::Expr;
use jsonnet_ir::{LocationRange, Name};
use rustc_hash::FxHashMap;

/// What a frame is waiting for. Every kind except [`FrameKind::Call`] is
/// bookkeeping for resuming a partially evaluated node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FrameKind {
    /// Evaluating the target of a call.
    ApplyTarget,
    /// Evaluating the left operand of a binary operator.
    BinaryLeft,
    /// Evaluating the right operand; `val` holds the left.
    BinaryRight,
    /// Forcing the arguments of a builtin; `val` holds the closure.
    BuiltinForceThunks,
    /// Running the user predicate of `std.filter`; `val` is the predicate,
    /// `val2` the array, `thunks` the kept elements.
    BuiltinFilter,
    /// A function, thunk or object field body. Counts toward the depth limit.
    Call,
    /// Evaluating the argument of `error`.
    Error,
    /// Evaluating a condition.
    If,
    /// Evaluating the target of an index; `val` will hold it.
    IndexTarget,
    /// Evaluating the index itself.
    IndexIndex,
    /// Evaluating the string in `e in super`.
    InSuperElement,
    /// Running the asserts of `self_`, one thunk at a time.
    Invariants,
    /// Scope of a `local`; transparent to tail calls.
    Local,
    /// Evaluating field names of an object literal in order.
    Object,
    /// Evaluating the array of an object comprehension.
    ObjectCompArray,
    /// Evaluating the field name for each comprehension element.
    ObjectCompElement,
    /// Converting `val`/`val2` to strings for `+`.
    StringConcat,
    /// Evaluating the index of `super[e]`.
    SuperIndex,
    /// Evaluating the operand of a unary operator.
    Unary,
}

#[derive(Debug)]
pub(crate) struct Frame {
    pub kind: FrameKind,
    /// Node that pushed the frame.
    pub ast: Option<Expr>,
    pub loc: LocationRange,
    /// Call frame whose caller may be dropped by a call in tail position.
    pub tail_call: bool,
    pub val: Value,
    pub val2: Value,
    /// Cursor into the node's fields, an array, or `thunks`.
    pub element_id: usize,
    /// Comprehension field name to element thunk.
    pub elements: FxHashMap<Name, HeapId>,
    pub thunks: Vec<HeapId>,
    /// Thunk, closure or object this Call frame is running.
    pub context: Option<HeapId>,
    pub self_: Option<HeapId>,
    pub offset: u32,
    pub bindings: BindingFrame,
    /// Fields of the object literal under construction.
    pub object_fields: FxHashMap<Name, SimpleField>,
}

impl Frame {
    pub fn new(kind: FrameKind, ast: &Expr) -> Self {
        let mut frame = Frame::at(kind, ast.loc);
        frame.ast = Some(ast.clone());
        frame
    }

    pub fn at(kind: FrameKind, loc: LocationRange) -> Self {
        Frame {
            kind,
            ast: None,
            loc,
            tail_call: false,
            val: Value::Null,
            val2: Value::Null,
            element_id: 0,
            elements: FxHashMap::default(),
            thunks: Vec::new(),
            context: None,
            self_: None,
            offset: 0,
            bindings: BindingFrame::new(),
            object_fields: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn is_call(&self) -> bool {
        self.kind == FrameKind::Call
    }

    /// Push every heap handle this frame keeps alive.
    pub fn roots(&self, out: &mut Vec<HeapId>) {
        out.extend(self.val.heap_id());
        out.extend(self.val2.heap_id());
        out.extend(self.elements.values().copied());
        out.extend_from_slice(&self.thunks);
        out.extend(self.context);
        out.extend(self.self_);
        out.extend(self.bindings.values().copied());
    }
}
