use std::io::Write;

use crate::report::Palette;

pub(crate) fn init_logging(
    level: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
    colored: bool,
) {
    let level = level.log_level_filter();
    if level == log::LevelFilter::Off {
        return;
    }

    let palette = if colored {
        Palette::colored()
    } else {
        Palette::plain()
    };

    let mut builder = env_logger::Builder::new();
    builder.write_style(if colored {
        env_logger::WriteStyle::Always
    } else {
        env_logger::WriteStyle::Never
    });

    builder.filter(None, level);

    if level == log::LevelFilter::Trace || level == log::LevelFilter::Debug {
        builder.format_timestamp_secs();
    } else {
        builder.format(move |f, record| match record.level() {
            log::Level::Error => {
                writeln!(f, "{:#}: {}", palette.error(record.level()), record.args())
            }
            log::Level::Warn => {
                writeln!(f, "{:#}: {}", palette.warn(record.level()), record.args())
            }
            log::Level::Info => writeln!(f, "{}", record.args()),
            log::Level::Debug => {
                writeln!(f, "{:#}: {}", palette.info(record.level()), record.args())
            }
            log::Level::Trace => {
                writeln!(f, "{:#}: {}", palette.hint(record.level()), record.args())
            }
        });
    }

    builder.init();
}
