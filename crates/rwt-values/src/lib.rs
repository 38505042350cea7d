#![forbid(unsafe_code)]

//! Value snapshot model.
//!
//! A snapshot ("value") is a plain serializable record of one widget's
//! remote-visible state. There is one value type per widget kind, all
//! carrying the common identity fields. Values are written only by the
//! owning widget's mutators (through a builder) and read only by the
//! serializer; nothing else touches them.

pub mod builder;
pub mod resource;
pub mod value;

pub use builder::ValueBuilder;
pub use resource::{FontSpec, ForeignResource, Image, Resource};
pub use value::{
    Alignment, ButtonValue, CompositeValue, ControlValue, LabelValue, SelectionRange, TextValue,
    Value,
};
