use hastemap::config::HasteConfig;
use hastemap::core::HasteMapBuilder;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs;
use std::sync::Mutex;

static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            CAPTURED.lock().unwrap().push(format!("{}", record.args()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

// Sole test in this file: integration test binaries get one process
// each, so installing the global logger here clashes with nothing.
#[test]
fn diagnostics_are_mirrored_to_warn_logs() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("binary.js"), [0xff, 0xfe, 0x00, 0x01]).unwrap();
    fs::write(
        dir.path().join("first.js"),
        "/**\n * @providesModule Dup\n */\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("second.js"),
        "/**\n * @providesModule Dup\n */\n",
    )
    .unwrap();

    let config = HasteConfig::new(vec![dir.path().to_path_buf()]);
    let index = HasteMapBuilder::new(config).build().unwrap();
    assert_eq!(index.diagnostics().len(), 2);

    let captured = CAPTURED.lock().unwrap();
    assert!(captured.iter().any(|m| m.contains("not valid UTF-8")));
    assert!(captured.iter().any(|m| m.contains("already provided by")));
}
