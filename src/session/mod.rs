//! Two-phase editing workflow.

pub mod editor;
/// Phase state and the locked background snapshot.
pub mod phase;
