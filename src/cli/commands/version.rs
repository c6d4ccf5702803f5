//! The `version` command.

use anyhow::Result;

use crate::cli::Output;

pub fn execute(output: &Output) -> Result<()> {
    output.key_value("name", crate::PKG_NAME, false);
    output.key_value("version", crate::VERSION, true);
    output.key_value("description", crate::PKG_DESCRIPTION, false);
    Ok(())
}
