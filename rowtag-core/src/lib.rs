mod as_value;
mod backend;
mod column_type;
mod config;
mod entity;
mod error;
mod mapper;
mod materialize;
mod metadata;
mod registry;
mod shape;
mod sql_writer;
mod tag;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use backend::*;
pub use column_type::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use mapper::*;
pub use materialize::*;
pub use metadata::*;
pub use registry::*;
pub use shape::*;
pub use sql_writer::*;
pub use tag::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
