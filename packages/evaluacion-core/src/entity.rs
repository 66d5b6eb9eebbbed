//! The Evaluacion entity and its identity-based equality.

use std::any::Any;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single evaluation status record.
///
/// Wire format keeps the field names verbatim:
/// ```json
/// { "id": 1, "status_evaluacion": 2 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluacion {
    /// Store-assigned identifier; `None` until the record is first saved
    #[serde(default)]
    pub id: Option<u64>,
    /// Evaluation status code
    #[serde(default)]
    pub status_evaluacion: Option<i32>,
}

impl Evaluacion {
    /// Creates an unsaved record with the given status.
    pub fn new(status_evaluacion: i32) -> Self {
        Self {
            id: None,
            status_evaluacion: Some(status_evaluacion),
        }
    }

    /// Sets the status, returning the record for chaining.
    pub fn status_evaluacion(mut self, status_evaluacion: i32) -> Self {
        self.status_evaluacion = Some(status_evaluacion);
        self
    }

    /// Sets the id, returning the record for chaining.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns true when both records carry the same, present id.
    ///
    /// Other fields are ignored. A record without an id is only ever
    /// equal to itself (the same reference).
    pub fn same_identity(&self, other: &Evaluacion) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Dynamic equality check: `None` and values of any other type are
    /// never equal to a record.
    pub fn equals(&self, other: Option<&dyn Any>) -> bool {
        other
            .and_then(|o| o.downcast_ref::<Evaluacion>())
            .is_some_and(|o| self.same_identity(o))
    }
}

impl PartialEq for Evaluacion {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Hash for Evaluacion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
