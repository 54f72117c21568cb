use tracing_subscriber::filter::{Directive, EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

/// Installs a timestamp-free fmt subscriber. `log` records are bridged into it.
///
/// Verbosity comes from `QUADMASK_LOG` (default `warn`), e.g.
/// `QUADMASK_LOG=debug quadmask`. `RUST_LOG` directives still apply on top.
pub fn init() {
    struct EmptyTime;
    impl FormatTime for EmptyTime {
        fn format_time(&self, _: &mut format::Writer<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    let default_level: Directive = std::env::var("QUADMASK_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or_else(|| LevelFilter::WARN.into());

    let format = format()
        .with_timer(EmptyTime)
        .with_level(true)
        .with_target(true)
        .with_ansi(true);

    let filter = EnvFilter::from_default_env()
        .add_directive(default_level)
        // winit and the GL backend are chatty at info
        .add_directive(directive("winit=error"))
        .add_directive(directive("eframe=warn"));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format).with_filter(filter))
        .try_init();
}

fn directive(raw: &str) -> Directive {
    raw.parse().unwrap_or_else(|_| LevelFilter::WARN.into())
}
