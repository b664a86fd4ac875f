//! Arena heap with mark-sweep collection.
//!
//! Entities live in slots addressed by [`HeapId`]. A slot carries a
//! generation that is bumped when its entity is freed, so a handle that
//! outlives its entity is detected instead of silently aliasing the slot's
//! next occupant. Marks are epoch stamps: a cycle bumps the epoch, stamps
//! everything reachable from the roots, and frees every slot whose stamp is
//! older.
//!
//! Collection only happens when the evaluator asks for it, at points where
//! every live handle is reachable from the roots it supplies.

use crate::value::{BindingFrame, Value};
use jsonnet_ir::builtins::Builtin;
use jsonnet_ir::core::{Expr, Param};
use jsonnet_ir::{Name, Visibility};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Handle to a heap entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeapId {
    index: u32,
    generation: u32,
}

/// Everything that can live on the heap.
#[derive(Debug)]
pub enum HeapEntity {
    /// Code points, so indexing and `length` are constant time.
    String(Box<[char]>),
    /// Elements are thunks.
    Array(Vec<HeapId>),
    Closure(Closure),
    Object(Object),
    Thunk(Thunk),
}

impl HeapEntity {
    /// Push every handle this entity refers to.
    fn trace(&self, out: &mut Vec<HeapId>) {
        match self {
            HeapEntity::String(_) => {}
            HeapEntity::Array(elements) => out.extend_from_slice(elements),
            HeapEntity::Closure(closure) => {
                out.extend(closure.upvalues.values().copied());
                out.extend(closure.self_);
            }
            HeapEntity::Object(Object::Simple { upvalues, .. }) => {
                out.extend(upvalues.values().copied());
            }
            HeapEntity::Object(Object::Comprehension {
                upvalues,
                comp_values,
                ..
            }) => {
                out.extend(upvalues.values().copied());
                out.extend(comp_values.values().copied());
            }
            HeapEntity::Object(Object::Extended { left, right }) => {
                out.push(*left);
                out.push(*right);
            }
            HeapEntity::Thunk(thunk) => match &thunk.state {
                ThunkState::Pending(pending) => {
                    out.extend(pending.upvalues.values().copied());
                    out.extend(pending.self_);
                }
                ThunkState::Filled(value) => out.extend(value.heap_id()),
            },
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            HeapEntity::String(_) => "string",
            HeapEntity::Array(_) => "array",
            HeapEntity::Closure(_) => "closure",
            HeapEntity::Object(_) => "object",
            HeapEntity::Thunk(_) => "thunk",
        }
    }
}

/// A function value.
#[derive(Debug)]
pub struct Closure {
    pub upvalues: BindingFrame,
    pub self_: Option<HeapId>,
    pub offset: u32,
    pub params: Rc<[Param]>,
    pub body: ClosureBody,
}

#[derive(Debug, Clone)]
pub enum ClosureBody {
    Expr(Expr),
    Builtin(Builtin),
    /// Host function registered under this name.
    Native(Rc<str>),
}

/// A field of a simple object.
#[derive(Debug, Clone)]
pub struct SimpleField {
    pub visibility: Visibility,
    pub body: Expr,
}

/// Objects form a binary tree of extensions over leaf objects.
#[derive(Debug)]
pub enum Object {
    /// Literal object; field bodies are evaluated on each access.
    Simple {
        upvalues: BindingFrame,
        fields: FxHashMap<Name, SimpleField>,
        asserts: Vec<Expr>,
    },
    /// `{[k]: value for id in arr}`: every field evaluates `value` with `id`
    /// bound to that field's element thunk.
    Comprehension {
        upvalues: BindingFrame,
        value: Expr,
        id: Name,
        comp_values: FxHashMap<Name, HeapId>,
    },
    /// `left + right`; `right` takes precedence.
    Extended { left: HeapId, right: HeapId },
}

/// A delayed computation, filled at most once.
#[derive(Debug)]
pub struct Thunk {
    /// Shown in stack traces; `None` for builtin arguments and roots.
    pub name: Option<Name>,
    state: ThunkState,
}

#[derive(Debug)]
pub enum ThunkState {
    Pending(PendingThunk),
    Filled(Value),
}

/// Environment of a thunk that has not run yet.
#[derive(Debug, Clone)]
pub struct PendingThunk {
    pub self_: Option<HeapId>,
    pub offset: u32,
    pub upvalues: BindingFrame,
    pub body: Expr,
}

impl Thunk {
    pub fn pending(name: Option<Name>, self_: Option<HeapId>, offset: u32, body: Expr) -> Self {
        Thunk {
            name,
            state: ThunkState::Pending(PendingThunk {
                self_,
                offset,
                upvalues: BindingFrame::new(),
                body,
            }),
        }
    }

    pub fn filled(name: Option<Name>, value: Value) -> Self {
        Thunk {
            name,
            state: ThunkState::Filled(value),
        }
    }

    #[must_use]
    pub fn with_upvalues(mut self, upvalues: BindingFrame) -> Self {
        self.set_upvalues(upvalues);
        self
    }

    pub fn state(&self) -> &ThunkState {
        &self.state
    }

    /// Cached value, once filled.
    pub fn value(&self) -> Option<Value> {
        match self.state {
            ThunkState::Filled(value) => Some(value),
            ThunkState::Pending(_) => None,
        }
    }

    pub fn pending_state(&self) -> Option<&PendingThunk> {
        match &self.state {
            ThunkState::Pending(pending) => Some(pending),
            ThunkState::Filled(_) => None,
        }
    }

    /// Body still to run, if the thunk is pending.
    pub fn body(&self) -> Option<&Expr> {
        self.pending_state().map(|p| &p.body)
    }

    pub fn set_upvalues(&mut self, upvalues: BindingFrame) {
        if let ThunkState::Pending(pending) = &mut self.state {
            pending.upvalues = upvalues;
        }
    }

    /// Cache `value` and drop the environment. A thunk that is already
    /// filled keeps its first value.
    pub fn fill(&mut self, value: Value) {
        if let ThunkState::Pending(_) = self.state {
            self.state = ThunkState::Filled(value);
        }
    }
}

struct Slot {
    generation: u32,
    mark: u32,
    entity: Option<HeapEntity>,
}

/// Slot arena plus collector state.
pub struct Heap {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    worklist: Vec<HeapId>,
    epoch: u32,
    live: usize,
    last_live: usize,
    min_objects: usize,
    growth_trigger: f64,
    cycles: u64,
}

impl Heap {
    pub fn new(min_objects: usize, growth_trigger: f64) -> Self {
        Heap {
            slots: Vec::new(),
            free_list: Vec::new(),
            worklist: Vec::new(),
            epoch: 0,
            live: 0,
            last_live: 0,
            min_objects,
            growth_trigger,
            cycles: 0,
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot indices are bounded by addressable memory well below u32::MAX entities"
    )]
    pub fn allocate(&mut self, entity: HeapEntity) -> HeapId {
        let index = match self.free_list.pop() {
            Some(index) => index as usize,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    mark: self.epoch,
                    entity: None,
                });
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.entity = Some(entity);
        slot.mark = self.epoch;
        self.live += 1;
        HeapId {
            index: index as u32,
            generation: slot.generation,
        }
    }

    /// Whether `id` still names a live entity.
    pub fn contains(&self, id: HeapId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.entity.is_some())
    }

    /// # Panics
    /// Panics on a stale handle: the collector freed something still in use.
    pub fn get(&self, id: HeapId) -> &HeapEntity {
        match self.slots.get(id.index as usize) {
            Some(Slot {
                generation,
                entity: Some(entity),
                ..
            }) if *generation == id.generation => entity,
            _ => stale(id),
        }
    }

    /// # Panics
    /// Panics on a stale handle.
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapEntity {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot {
                generation,
                entity: Some(entity),
                ..
            }) if *generation == id.generation => entity,
            _ => stale(id),
        }
    }

    pub fn string(&self, id: HeapId) -> &[char] {
        match self.get(id) {
            HeapEntity::String(chars) => chars,
            other => mismatch("string", other),
        }
    }

    pub fn array(&self, id: HeapId) -> &[HeapId] {
        match self.get(id) {
            HeapEntity::Array(elements) => elements,
            other => mismatch("array", other),
        }
    }

    pub fn closure(&self, id: HeapId) -> &Closure {
        match self.get(id) {
            HeapEntity::Closure(closure) => closure,
            other => mismatch("closure", other),
        }
    }

    pub fn object(&self, id: HeapId) -> &Object {
        match self.get(id) {
            HeapEntity::Object(object) => object,
            other => mismatch("object", other),
        }
    }

    pub fn thunk(&self, id: HeapId) -> &Thunk {
        match self.get(id) {
            HeapEntity::Thunk(thunk) => thunk,
            other => mismatch("thunk", other),
        }
    }

    pub fn thunk_mut(&mut self, id: HeapId) -> &mut Thunk {
        match self.get_mut(id) {
            HeapEntity::Thunk(thunk) => thunk,
            other => mismatch("thunk", other),
        }
    }

    pub fn alloc_string(&mut self, s: &str) -> Value {
        Value::String(self.allocate(HeapEntity::String(s.chars().collect())))
    }

    pub fn alloc_chars(&mut self, chars: Vec<char>) -> Value {
        Value::String(self.allocate(HeapEntity::String(chars.into_boxed_slice())))
    }

    pub fn alloc_array(&mut self, elements: Vec<HeapId>) -> Value {
        Value::Array(self.allocate(HeapEntity::Array(elements)))
    }

    pub fn alloc_object(&mut self, object: Object) -> Value {
        Value::Object(self.allocate(HeapEntity::Object(object)))
    }

    pub fn alloc_closure(&mut self, closure: Closure) -> Value {
        Value::Function(self.allocate(HeapEntity::Closure(closure)))
    }

    pub fn alloc_thunk(&mut self, thunk: Thunk) -> HeapId {
        self.allocate(HeapEntity::Thunk(thunk))
    }

    /// Number of live entities.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of completed collection cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the heap has grown enough since the last cycle to collect.
    pub fn should_collect(&self) -> bool {
        #[expect(clippy::cast_precision_loss, reason = "heuristic comparison")]
        let (live, last) = (self.live as f64, self.last_live as f64);
        self.live > self.min_objects && live > self.growth_trigger * last
    }

    /// Free everything not reachable from `roots`. Returns the number of
    /// entities freed.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot indices were u32 when allocated"
    )]
    pub fn collect(&mut self, roots: &[HeapId]) -> usize {
        debug_assert!(
            roots.iter().all(|&root| self.contains(root)),
            "collection roots must be live"
        );
        self.epoch = self.epoch.wrapping_add(1);
        let epoch = self.epoch;

        self.worklist.clear();
        self.worklist.extend_from_slice(roots);
        while let Some(id) = self.worklist.pop() {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if slot.generation != id.generation || slot.mark == epoch {
                continue;
            }
            let Some(entity) = &slot.entity else {
                continue;
            };
            slot.mark = epoch;
            entity.trace(&mut self.worklist);
        }

        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entity.is_some() && slot.mark != epoch {
                slot.entity = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(index as u32);
                freed += 1;
            }
        }

        self.live -= freed;
        self.last_live = self.live;
        self.cycles += 1;
        freed
    }
}

#[cold]
#[inline(never)]
fn stale(id: HeapId) -> ! {
    panic!("stale heap handle {id:?}: entity was collected while still referenced")
}

#[cold]
#[inline(never)]
fn mismatch(expected: &str, found: &HeapEntity) -> ! {
    panic!("heap entity is a {}, expected a {expected}", found.kind_name())
}
