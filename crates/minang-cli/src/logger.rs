use log::{LevelFilter, Log, Metadata, Record};

/// Diagnostic logger. Writes to stderr so it never interleaves with
/// program output on stdout.
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // location only matters when chasing internals
        if record.level() >= log::Level::Debug {
            let location = match (record.file(), record.line()) {
                (Some(file), Some(line)) => format!("{}:{}", file, line),
                (Some(file), None) => file.to_string(),
                (None, _) => String::from("unknown location"),
            };
            eprintln!(
                "[{level}][{target}][{location}] {message}",
                level = record.level(),
                target = record.target(),
                location = location,
                message = record.args()
            );
        } else {
            eprintln!(
                "[{level}][{target}] {message}",
                level = record.level(),
                target = record.target(),
                message = record.args()
            );
        }
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    static LOGGER: SimpleLogger = SimpleLogger;
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

/// Map a `-v` count onto a level: 0 keeps `base`, then info, debug, trace.
pub fn level_from_verbosity(base: LevelFilter, verbose: u8) -> LevelFilter {
    match verbose {
        0 => base,
        1 => base.max(LevelFilter::Info),
        2 => base.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    }
}
