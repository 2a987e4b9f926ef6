//! Arena that owns every object.
//!
//! Objects are addressed by [`ObjectId`] and live as long as the heap. The
//! back-reference of each object is an optional id into the same arena, so
//! sharing a parent or pointing back into one's own ancestry never creates
//! an ownership cycle.

use crate::chain::ancestors;
use crate::object::{BoundMethod, ObjectId, ProtoObject, Value};
use tracing::trace;

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<ProtoObject>,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            objects: Vec::new(),
        }
    }

    /// Allocates an empty object delegating to `proto`.
    pub fn alloc(&mut self, proto: Option<ObjectId>) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(ProtoObject::new(proto));
        trace!(object = %id, proto = ?proto, "allocated object");
        id
    }

    /// Allocates an empty labelled object delegating to `proto`.
    pub fn alloc_labelled(&mut self, label: &str, proto: Option<ObjectId>) -> ObjectId {
        let id = self.alloc(proto);
        self.objects[id.0].label = Some(label.to_string());
        id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the object behind `id`.
    ///
    /// # Panics
    /// Panics if `id` was minted by a different heap and is out of range.
    pub fn get(&self, id: ObjectId) -> &ProtoObject {
        &self.objects[id.0]
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut ProtoObject {
        &mut self.objects[id.0]
    }

    /// Reads the back-reference of `id`.
    pub fn proto_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.get(id).proto
    }

    /// Replaces the back-reference of `id`. Any target is accepted,
    /// including `id` itself or one of its descendants.
    pub fn set_proto(&mut self, id: ObjectId, proto: Option<ObjectId>) {
        trace!(object = %id, proto = ?proto, "set back-reference");
        self.get_mut(id).proto = proto;
    }

    /// Attribute defined directly on `id`, ignoring delegation.
    pub fn own(&self, id: ObjectId, name: &str) -> Option<&Value> {
        self.get(id).get(name)
    }

    pub fn set_attr(&mut self, id: ObjectId, name: impl Into<String>, value: Value) {
        self.get_mut(id).set(name.into(), value);
    }

    /// Delegating lookup: the first object from `id` outward that defines
    /// `name`, together with the value found there.
    pub fn lookup(&self, id: ObjectId, name: &str) -> Option<(ObjectId, &Value)> {
        ancestors(self, id).find_map(|owner| self.own(owner, name).map(|value| (owner, value)))
    }

    /// Looks `name` up from `receiver` and binds it when it is callable.
    pub fn bind(&self, receiver: ObjectId, name: &str) -> Option<BoundMethod> {
        let (owner, value) = self.lookup(receiver, name)?;
        BoundMethod::from_value(receiver, owner, name, value)
    }

    pub fn label(&self, id: ObjectId) -> String {
        match &self.get(id).label {
            Some(label) => label.clone(),
            None => id.to_string(),
        }
    }

    /// Names an object unless it already has a name.
    pub fn label_if_unnamed(&mut self, id: ObjectId, label: &str) {
        let object = self.get_mut(id);
        if object.label.is_none() {
            object.label = Some(label.to_string());
        }
    }

    /// Renders a value using object labels instead of raw ids.
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Object(id) => self.label(*id),
            Value::List(values) => {
                let items: Vec<String> = values
                    .iter()
                    .map(|value| match value {
                        Value::String(text) => format!("'{}'", text),
                        _ => self.describe(value),
                    })
                    .collect();
                format!("[{}]", items.join(", "))
            }
            Value::BoundMethod(bound) => format!(
                "<bound method {}.{} of {}>",
                self.label(bound.owner),
                bound.name,
                self.label(bound.receiver)
            ),
            other => other.to_string(),
        }
    }
}
