use crate::{
    foundation::core::{Canvas, Point},
    scene::model::{ObjectId, ObjectKind, SceneObject},
};

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug)]
struct Entry {
    object: SceneObject,
    seq: u64,
}

/// Arena of scene objects with a derived z-order.
///
/// The order is recomputed from `(layer, mask side, insertion seq)` after every mutation, so it
/// never depends on the sequence of calls that produced the current state.
#[derive(Debug)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<ObjectId>,
    next_seq: u64,
    active: Option<ObjectId>,
    surface: Canvas,
}

/// Immutable copy of the scene for UI layers and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSnapshot {
    /// Editing surface size.
    pub surface: Canvas,
    /// Objects bottom to top.
    pub objects: Vec<(ObjectId, SceneObject)>,
    /// Selected object.
    pub active: Option<ObjectId>,
}

impl SceneSnapshot {
    /// Number of objects of `kind`.
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|(_, o)| o.kind() == kind).count()
    }
}

impl Scene {
    /// Empty scene on a surface of `surface` size.
    pub fn new(surface: Canvas) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            next_seq: 0,
            active: None,
            surface,
        }
    }

    /// Editing surface size.
    pub fn surface(&self) -> Canvas {
        self.surface
    }

    /// Resize the editing surface. Objects are not rescaled.
    pub fn set_surface(&mut self, surface: Canvas) {
        self.surface = surface;
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` when the scene holds nothing.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert an object and return its handle.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = Some(Entry { object, seq });
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = entry;
                ObjectId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                ObjectId {
                    index,
                    generation: 0,
                }
            }
        };
        self.reorder();
        id
    }

    /// Remove and return an object; stale handles return `None`.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let slot = self.slot_mut(id)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        if self.active == Some(id) {
            self.active = None;
        }
        self.reorder();
        Some(entry.object)
    }

    /// Remove every object matching `pred`; returns how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&SceneObject) -> bool) -> usize {
        let doomed: Vec<ObjectId> = self
            .iter_ordered()
            .filter(|(_, o)| pred(o))
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            self.remove(*id);
        }
        doomed.len()
    }

    /// Look up an object.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref().map(|e| &e.object)
    }

    /// Replace an object's value, keeping its identity and insertion rank.
    pub fn replace(&mut self, id: ObjectId, object: SceneObject) -> bool {
        self.update(id, |o| *o = object)
    }

    /// Mutate an object in place; returns `false` for stale handles.
    pub fn update(&mut self, id: ObjectId, f: impl FnOnce(&mut SceneObject)) -> bool {
        let Some(entry) = self.slot_mut(id).and_then(|s| s.entry.as_mut()) else {
            return false;
        };
        f(&mut entry.object);
        let selectable = entry.object.is_selectable();
        if self.active == Some(id) && !selectable {
            self.active = None;
        }
        self.reorder();
        true
    }

    /// Handles bottom to top.
    pub fn z_order(&self) -> &[ObjectId] {
        &self.order
    }

    /// Objects bottom to top.
    pub fn iter_ordered(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.get(id).map(|o| (id, o)))
    }

    /// First object of `kind` in z-order.
    pub fn first_of_kind(&self, kind: ObjectKind) -> Option<(ObjectId, &SceneObject)> {
        self.iter_ordered().find(|(_, o)| o.kind() == kind)
    }

    /// Select `id`, or clear the selection with `None`.
    ///
    /// Non-selectable or stale handles leave the selection unchanged and return `false`.
    pub fn set_active(&mut self, id: Option<ObjectId>) -> bool {
        match id {
            None => {
                self.active = None;
                true
            }
            Some(id) => match self.get(id) {
                Some(o) if o.is_selectable() => {
                    self.active = Some(id);
                    true
                }
                _ => false,
            },
        }
    }

    /// Selected handle.
    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    /// Selected object.
    pub fn active_object(&self) -> Option<(ObjectId, &SceneObject)> {
        let id = self.active?;
        self.get(id).map(|o| (id, o))
    }

    /// Topmost selectable object under `p`.
    pub fn hit_test(&self, p: Point) -> Option<ObjectId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.get(id).is_some_and(|o| o.is_selectable() && o.hit_test(p)))
    }

    /// Deep copy of the current state.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            surface: self.surface,
            objects: self.iter_ordered().map(|(id, o)| (id, o.clone())).collect(),
            active: self.active,
        }
    }

    fn slot_mut(&mut self, id: ObjectId) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(id.index as usize)?;
        (slot.generation == id.generation).then_some(slot)
    }

    fn reorder(&mut self) {
        let mut keyed: Vec<_> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let e = slot.entry.as_ref()?;
                let id = ObjectId {
                    index: index as u32,
                    generation: slot.generation,
                };
                Some(((e.object.layer(), e.object.mask_side(), e.seq), id))
            })
            .collect();
        keyed.sort_by_key(|(k, _)| *k);
        self.order = keyed.into_iter().map(|(_, id)| id).collect();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
