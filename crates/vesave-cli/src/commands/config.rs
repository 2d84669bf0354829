use anyhow::Result;

use super::CliContext;

pub fn show(ctx: &CliContext) -> Result<()> {
    print!("{}", toml::to_string_pretty(&ctx.config)?);
    Ok(())
}
