// RedBlue managers
// Managers own mutable application state.

pub mod credential_store;
