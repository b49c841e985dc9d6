mod backend;
mod parse;
mod sql_writer;
mod statement;

pub use backend::*;
pub use sql_writer::*;
pub use statement::*;
