//! `tracing` setup for services and tests that want to see derivation and assembly events.
use tracing_subscriber::{
    fmt::{self, format},
    layer::SubscriberExt,
    EnvFilter, Registry,
};

pub use tracing_subscriber;

#[derive(Debug, Default)]
pub struct TraceOpts {
    /// `EnvFilter` directives. Falls back to `RUST_LOG`, then `info`.
    pub filters: Option<String>,
    pub json: bool,
}

fn env_filter(opts: &TraceOpts) -> EnvFilter {
    opts.filters
        .as_ref()
        .map(|f| EnvFilter::builder().parse_lossy(f))
        .unwrap_or_else(|| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        })
}

/// Install a global subscriber. Fails if one is already set.
pub fn init_tracer(opts: TraceOpts) -> anyhow::Result<()> {
    let filter = env_filter(&opts);

    if opts.json {
        let subscriber = Registry::default()
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(format::FmtSpan::CLOSE)
                    .with_target(true)
                    .with_ansi(false)
                    .flatten_event(true),
            )
            .with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true),
            )
            .with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Test-friendly subscriber writing through the libtest capture; repeated calls are no-ops.
pub fn try_init_test_tracer() {
    let subscriber = Registry::default()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::new("relay_paging=debug"));

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::trace!("global subscriber already installed");
    }
}
