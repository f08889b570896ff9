//! Internal data structures.
//!
//! Exposes a [`Slab`] used by the runtime to store spawned futures with
//! stable, reusable indices.

mod slab;

pub(crate) use slab::Slab;
