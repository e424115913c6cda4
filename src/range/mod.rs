//! Range algebra and lazily indexed views
//!
//! This module contains the slice arithmetic used to address naming sequences.

pub mod descriptor;
mod view;

pub use descriptor::{
    EFFECTIVELY_UNBOUNDED, RangeDescriptor, compose, contains, count, normalize, to_raw_index,
};
pub use view::{Generator, Iter, LazyIndexableView, Producer};
