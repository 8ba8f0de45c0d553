//! Backend availability report.

use anyhow::Result;

pub fn run() -> Result<()> {
    println!("{}", haldlut_gpu::describe_backends());
    Ok(())
}
