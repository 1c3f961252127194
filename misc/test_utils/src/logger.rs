use std::{env, io::Write, sync::Once};

use env_logger::{fmt::Formatter, Builder as EnvLoggerBuilder};
use log::{LevelFilter, Record};

static TEST_LOGGING_INIT: Once = Once::new();

/// Initializes test logging once per process, honoring `RUST_LOG`. Safe to
/// call from every test.
pub fn init_logger() {
    TEST_LOGGING_INIT.call_once(|| {
        if let Ok(pattern) = env::var("RUST_LOG") {
            let _ = EnvLoggerBuilder::new()
                .format(text_format)
                .filter(None, LevelFilter::Off)
                .parse_filters(&pattern)
                .is_test(true)
                .try_init();
        }
    });
}

fn text_format(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    writeln!(
        buf,
        "{:>5}|{:<30}|{:>35}:{:<4}| {}",
        record.level(),
        record.target(),
        record.file().unwrap_or(""),
        record.line().unwrap_or(0),
        record.args()
    )
}
