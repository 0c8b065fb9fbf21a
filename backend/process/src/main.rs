use anyhow::Result;
use clap::Parser;

use process::{Args, run};

fn main() -> Result<()> {
    let output = run(Args::parse())?;
    println!("{output}");

    Ok(())
}
