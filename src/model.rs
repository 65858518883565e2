//! Identity shared by every entity in a topology or traffic trace.

/// Anything that carries an opaque string id
pub trait Identified {
    fn id(&self) -> &str;
}
