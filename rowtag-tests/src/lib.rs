mod items;
mod memberships;
mod readings;

pub use items::Item;
pub use memberships::Membership;
pub use readings::Reading;

use items::items;
use log::LevelFilter;
use memberships::memberships;
use readings::readings;
use rowtag::{Backend, Entity, Mapper, ResultShape};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite against `backend`.
pub fn execute_tests<B: Backend>(backend: &mut B) {
    items(backend);
    memberships(backend);
    readings(backend);
}

/// Delete every row of the table mapped by `E`.
pub(crate) fn clear<E: Entity, B: Backend>(mapper: &Mapper, backend: &mut B) {
    let rows = mapper
        .select::<E, B>(ResultShape::SliceOfVal, backend, "", &[])
        .expect("Failed to select the existing rows")
        .into_values()
        .expect("Expected a slice of values");
    for row in rows {
        mapper
            .delete(&row, backend)
            .expect("Failed to delete an existing row");
    }
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
