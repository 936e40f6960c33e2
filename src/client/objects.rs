//! Two-phase object reads.
//!
//! Phase 1 lists the matching objects; phase 2 reads every declared category
//! of every object in one batch; the category entries are then merged into
//! their owning objects.

use std::collections::HashMap;

use tracing::{debug, warn};

use idoit_protocol::ops::{CategoryRead, ObjectsRead};
use idoit_protocol::{Batch, BatchResponse, IdoitCategory, IdoitObject, ObjectId};

use super::rpc::{IdoitError, IdoitResult};
use super::session::IdoitSession;

/// Batch key prefix reserved for category reads.
pub const CATEGORY_KEY_PREFIX: &str = "category";

/// Reads typed objects with their categories through a session.
pub struct ObjectsReader<'a> {
    session: &'a IdoitSession,
}

impl<'a> ObjectsReader<'a> {
    pub fn new(session: &'a IdoitSession) -> Self {
        Self { session }
    }

    /// All objects of type `T`.
    pub fn read_type<T: IdoitObject>(&self) -> IdoitResult<Vec<T>> {
        self.read(&ObjectsRead::of_type::<T>())
    }

    /// Objects matching `request`, instantiated as `T`.
    ///
    /// The request must name an object type, either `T::TYPE_NAME` (see
    /// [`ObjectsRead::of_type`]) or a numeric type id, which the server
    /// resolves and which is not checked here. A different type constant is
    /// rejected. Any failure in either phase aborts the whole read.
    pub fn read<T: IdoitObject>(&self, request: &ObjectsRead) -> IdoitResult<Vec<T>> {
        check_type::<T>(request.type_name())?;

        let mut objects = self.read_objects::<T>(request)?;
        let categories = self.read_categories(&objects)?;
        attach_categories(&mut objects, categories);

        Ok(objects.into_values())
    }

    fn read_objects<T: IdoitObject>(&self, request: &ObjectsRead) -> IdoitResult<IdentityMap<T>> {
        let descriptors = self.session.send(request)?;

        let mut objects = IdentityMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            objects.insert(T::with_id(descriptor.id));
        }

        debug!(objects = objects.len(), type_name = T::TYPE_NAME, "read objects");
        Ok(objects)
    }

    fn read_categories<T: IdoitObject>(
        &self,
        objects: &IdentityMap<T>,
    ) -> IdoitResult<BatchResponse<Vec<T::Category>>> {
        let mut batch = Batch::new();
        for object in objects.values() {
            for &class in T::CATEGORIES {
                let read = CategoryRead::<T::Category>::new(object.id(), class);
                batch.add_with_prefix(CATEGORY_KEY_PREFIX, read)?;
            }
        }

        self.session.send_batch(&batch)
    }
}

/// The filter type must be present and must not name another type constant.
fn check_type<T: IdoitObject>(type_name: Option<&str>) -> IdoitResult<()> {
    match type_name {
        None => Err(IdoitError::InvalidArgument(
            "Request needs to specify a filter type".to_string(),
        )),
        Some(name) if name == T::TYPE_NAME || name.parse::<u64>().is_ok() => Ok(()),
        Some(name) => Err(IdoitError::InvalidArgument(format!(
            "Filter type '{}' does not match object type '{}'",
            name,
            T::TYPE_NAME
        ))),
    }
}

/// Attach each entry to the object it names. Entries whose owner was not
/// part of phase 1 are dropped.
fn attach_categories<T: IdoitObject>(
    objects: &mut IdentityMap<T>,
    categories: BatchResponse<Vec<T::Category>>,
) {
    for (key, entries) in categories {
        for entry in entries {
            let owner = entry.object_id();
            match objects.get_mut(owner) {
                Some(object) => object.set_category(entry),
                None => warn!(
                    key = %key,
                    object_id = %owner,
                    "dropping category entry for object outside the result set"
                ),
            }
        }
    }
}

/// Objects keyed by id, in first-seen order. A repeated id replaces the
/// earlier object in place.
struct IdentityMap<T> {
    objects: Vec<T>,
    index: HashMap<ObjectId, usize>,
}

impl<T: IdoitObject> IdentityMap<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, object: T) {
        match self.index.get(&object.id()) {
            Some(&position) => self.objects[position] = object,
            None => {
                self.index.insert(object.id(), self.objects.len());
                self.objects.push(object);
            }
        }
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        let position = *self.index.get(&id)?;
        self.objects.get_mut(position)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.objects.iter()
    }

    fn len(&self) -> usize {
        self.objects.len()
    }

    fn into_values(self) -> Vec<T> {
        self.objects
    }
}
