use std::path::PathBuf;
use std::sync::Once;

use tracing::metadata::LevelFilter;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;

fn do_init(stdout_level: Level, file_level: Option<(Level, PathBuf)>) {
    let stdout_layer =
        tracing_subscriber::fmt::layer().with_filter(LevelFilter::from(stdout_level));

    let registry = tracing_subscriber::registry().with(stdout_layer);

    let maybe_file_layer = file_level.map(|(level, output_dir)| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, output_dir, "serial-line.log");

        tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_filter(LevelFilter::from(level))
    });

    registry.with(maybe_file_layer).init();
}

/// Initialize tracing.
///
/// Will only initialize once, so tests may call this.
pub fn init(stdout_level: Level, file_logging: Option<(Level, PathBuf)>) {
    static TRACING_IS_INITIALIZED: Once = Once::new();

    TRACING_IS_INITIALIZED.call_once(|| do_init(stdout_level, file_logging));
}
