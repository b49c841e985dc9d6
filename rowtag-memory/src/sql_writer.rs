use rowtag_core::SqlWriter;

/// The memory backend reads back the default rendering unchanged.
#[derive(Default, Debug, Clone, Copy)]
pub struct MemorySqlWriter;

impl SqlWriter for MemorySqlWriter {}
