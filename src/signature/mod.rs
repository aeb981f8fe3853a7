//! Function signatures for the methods of the catalog.
//!
//! Every method that has compiled code gets a function at its runtime address, named
//! `<type full name>.<method name>`, and a signature that spells out the calling convention
//! of the runtime: an optional hidden return slot, the context pointer, the instance
//! pointer of non-static methods, then the declared parameters. Register and stack
//! placement is left to the target.

mod builder;

pub use builder::{
    SignatureBuilder, SignatureReport, CONTEXT_PARAM, MAX_DIRECT_RETURN_SIZE, RETURN_SLOT_PARAM,
    THIS_PARAM,
};
