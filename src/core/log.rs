use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset. Quiet by default; `-v` traces this
/// crate and the HTTP client underneath it.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "contrib_import=debug,reqwest=info"
    } else {
        "off"
    }
}

/// Diagnostics go to stderr so they never interleave with the report on stdout.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
