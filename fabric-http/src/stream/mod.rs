//! Stream processors for the server side of the adapter.

pub mod source_input;
