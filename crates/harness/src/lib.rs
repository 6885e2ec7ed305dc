mod assets;
mod editor;
mod observer;

pub use assets::InstrumentedAssets;
pub use editor::TestEditor;
pub use observer::{ObserverLog, RecordingObserver};

/// Route engine logs to the test writer at debug level. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
