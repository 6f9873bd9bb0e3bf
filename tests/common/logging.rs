use std::{io, sync::Once};

use log::LevelFilter;

static LOGGER_INIT: Once = Once::new();

// Set up a logger that prints this crate's log messages with level `level` and above, prefixed with
// the name of the test that emitted them.
pub(crate) fn setup_logger(level: LevelFilter) {
    LOGGER_INIT.call_once(|| {
        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{}][{}] {}",
                    std::thread::current().name().unwrap_or("unnamed"),
                    record.level(),
                    message
                ))
            })
            .level(LevelFilter::Off)
            .level_for("signed_kvstore", level)
            .chain(io::stdout())
            .apply()
            .unwrap();
    })
}
