/// Per operation logging switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub insert: bool,
    pub update: bool,
    pub delete: bool,
    pub select: bool,
    pub register: bool,
}

impl LogConfig {
    /// Every operation muted.
    pub fn silent() -> Self {
        Self {
            insert: false,
            update: false,
            delete: false,
            select: false,
            register: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            insert: true,
            update: true,
            delete: true,
            select: true,
            register: true,
        }
    }
}

/// Configuration of a [`crate::Mapper`].
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Prefix of every table reference, rendered as `schema.table`. Empty for none.
    pub schema: String,
    pub log: LogConfig,
}

impl MapperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}
