//! Command-line interface for the `skillix` application.
//!
//! This crate is the executable entry point; everything else lives in
//! `skillix-app`.

fn main() -> anyhow::Result<()> {
    skillix_app::run()
}
