use anyhow::Result;
use vcbuild::cli;

fn main() -> Result<()> {
    cli::run()
}
