//! The object model: leaves of an extension tree, field lookup with `super`
//! offsets, visibility, and invariants.
//!
//! An object is a binary tree of [`Object::Extended`] nodes over leaf
//! objects. Leaves are numbered right to left: leaf 0 is the rightmost and
//! wins every lookup. A Call frame running a field body records the number
//! of the leaf that defined it, so `super` inside that body starts the
//! search one leaf further left.

use super::{Evaluator, Step};
use crate::errors::{EvalError, RuntimeErrorKind};
use crate::frame::{Frame, FrameKind};
use crate::heap::{HeapId, Object, Thunk};
use jsonnet_ir::core::Expr;
use jsonnet_ir::{LocationRange, Name, Visibility};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

type Leaves = SmallVec<[HeapId; 4]>;

impl Evaluator<'_> {
    /// Leaf objects of `object`, rightmost first.
    pub(super) fn leaves(&self, object: HeapId) -> Leaves {
        let mut leaves = Leaves::new();
        let mut pending: Leaves = SmallVec::from_elem(object, 1);
        while let Some(id) = pending.pop() {
            match self.heap.object(id) {
                Object::Extended { left, right } => {
                    pending.push(*left);
                    pending.push(*right);
                }
                Object::Simple { .. } | Object::Comprehension { .. } => leaves.push(id),
            }
        }
        leaves
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "leaf counts are bounded by the number of heap entities"
    )]
    pub(super) fn count_leaves(&self, object: HeapId) -> u32 {
        self.leaves(object).len() as u32
    }

    /// First leaf at or after `start` defining `name`, with its number.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "leaf counts are bounded by the number of heap entities"
    )]
    pub(super) fn find_field(&self, object: HeapId, name: Name, start: u32) -> Option<(HeapId, u32)> {
        self.leaves(object)
            .into_iter()
            .enumerate()
            .skip(start as usize)
            .find(|&(_, leaf)| match self.heap.object(leaf) {
                Object::Simple { fields, .. } => fields.contains_key(&name),
                Object::Comprehension { comp_values, .. } => comp_values.contains_key(&name),
                Object::Extended { .. } => false,
            })
            .map(|(index, leaf)| (leaf, index as u32))
    }

    /// Field names of `object`, hidden ones only if `include_hidden`.
    ///
    /// A field's visibility is the first explicit one found scanning from
    /// the right; a field that is inherited all the way down is visible.
    /// Comprehension fields are visible.
    pub(super) fn object_fields(&self, object: HeapId, include_hidden: bool) -> Vec<Name> {
        let mut visibility: FxHashMap<Name, Visibility> = FxHashMap::default();
        let mut order = Vec::new();
        let mut note = |name: Name, vis: Visibility| {
            if let Some(seen) = visibility.get_mut(&name) {
                if *seen == Visibility::Inherit {
                    *seen = vis;
                }
            } else {
                visibility.insert(name, vis);
                order.push(name);
            }
        };
        for leaf in self.leaves(object) {
            match self.heap.object(leaf) {
                Object::Simple { fields, .. } => {
                    for (&name, field) in fields {
                        note(name, field.visibility);
                    }
                }
                Object::Comprehension { comp_values, .. } => {
                    for &name in comp_values.keys() {
                        note(name, Visibility::Visible);
                    }
                }
                Object::Extended { .. } => {}
            }
        }
        order
            .into_iter()
            .filter(|name| include_hidden || visibility[name] != Visibility::Hidden)
            .collect()
    }

    /// One pending thunk per `assert` in any leaf, each bound to `object` as
    /// `self` with its leaf's number as the super offset.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "leaf counts are bounded by the number of heap entities"
    )]
    pub(super) fn object_invariants(&mut self, object: HeapId) -> Vec<HeapId> {
        let mut thunks = Vec::new();
        for (index, leaf) in self.leaves(object).into_iter().enumerate() {
            let Object::Simple { upvalues, asserts, .. } = self.heap.object(leaf) else {
                continue;
            };
            if asserts.is_empty() {
                continue;
            }
            let pending: Vec<(Expr, _)> = asserts.iter().map(|a| (a.clone(), upvalues.clone())).collect();
            for (assert, upvalues) in pending {
                let thunk = Thunk::pending(Some(self.names.object_assert), Some(object), index as u32, assert)
                    .with_upvalues(upvalues);
                thunks.push(self.heap.alloc_thunk(thunk));
            }
        }
        thunks
    }

    /// Push the Call frame for field `name` of `object`, searching from leaf
    /// `offset`, and return the body to evaluate in it.
    pub(super) fn object_index(
        &mut self,
        loc: LocationRange,
        object: HeapId,
        name: Name,
        offset: u32,
    ) -> Result<Expr, EvalError> {
        let Some((leaf, found_at)) = self.find_field(object, name, offset) else {
            return Err(self.error(
                loc,
                RuntimeErrorKind::FieldNotFound {
                    field: self.interner.lookup(name).to_owned(),
                },
            ));
        };
        let (body, bindings) = match self.heap.object(leaf) {
            Object::Simple { upvalues, fields, .. } => (fields[&name].body.clone(), upvalues.clone()),
            Object::Comprehension {
                upvalues,
                value,
                id,
                comp_values,
            } => {
                let mut bindings = upvalues.clone();
                bindings.insert(*id, comp_values[&name]);
                (value.clone(), bindings)
            }
            Object::Extended { .. } => unreachable_leaf(),
        };
        self.push_call(loc, object, Some(object), found_at, bindings)?;
        Ok(body)
    }

    /// Run every assert of `object` to completion on a nested trampoline,
    /// unless they are already running further down the stack.
    pub(super) fn run_invariants(&mut self, loc: LocationRange, object: HeapId) -> Result<(), EvalError> {
        if self.stack.already_running_invariants(object) {
            return Ok(());
        }
        let thunks = self.object_invariants(object);
        let Some(&first) = thunks.first() else {
            return Ok(());
        };
        let initial = self.stack.len();
        let mut frame = Frame::at(FrameKind::Invariants, loc);
        frame.self_ = Some(object);
        frame.thunks = thunks;
        frame.element_id = 1;
        self.stack.push(frame);
        let step: Step = self.enter_thunk(loc, first)?;
        self.run(step, initial)
    }
}

#[cold]
#[inline(never)]
fn unreachable_leaf() -> ! {
    panic!("extended object returned as a leaf")
}
