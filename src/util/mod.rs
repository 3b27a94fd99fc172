//! Parsing helpers shared by the model layer.

pub mod form;
pub mod parse;
pub mod record;
