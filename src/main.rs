//! Galaxy viewer.
//!
//! Usage: `galaxy [params.json]`
//!
//! Set `RUST_LOG` to change verbosity (default `info`).

use galaxy::{ParameterSet, Viewer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let params = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "loading parameters");
            ParameterSet::load(&path)?
        }
        None => ParameterSet::default(),
    };

    Viewer::new().with_params(params).run()?;
    Ok(())
}
