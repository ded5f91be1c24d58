//! Stage progress reporters

pub mod reporter;
