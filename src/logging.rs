use tracing::Level;

/// Installs the fmt subscriber. A second call keeps the first subscriber.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
