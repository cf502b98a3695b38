//! Wire-level shapes for the two managed entities.
//!
//! These are the values exchanged over `/api/marcas` and `/api/modelos`, held
//! by the update workflow's form and rendered by the CLI. Persistence rows
//! live in [`crate::entities`] and convert into these shapes.

pub mod marca;
pub mod modelo;

pub use marca::{add_marca_to_collection_if_missing, get_marca_identifier, Marca};
pub use modelo::{get_modelo_identifier, Modelo};

/// Anything that carries an optional database identifier.
pub trait Identifiable {
    fn identifier(&self) -> Option<i64>;
}

/// Merges `candidate` into `collection` unless an entry with the same
/// identifier is already present.
///
/// The existing entry always wins; it is never overwritten. A candidate with
/// no identifier cannot be matched against anything, so it is appended every
/// time. `None` leaves the collection untouched.
pub fn add_to_collection_if_missing<T>(mut collection: Vec<T>, candidate: Option<&T>) -> Vec<T>
where
    T: Identifiable + Clone,
{
    let Some(candidate) = candidate else {
        return collection;
    };

    let already_present = match candidate.identifier() {
        Some(id) => collection
            .iter()
            .any(|existing| existing.identifier() == Some(id)),
        None => false,
    };

    if !already_present {
        collection.push(candidate.clone());
    }
    collection
}
