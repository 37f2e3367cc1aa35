use pomotimer_core::{format_minutes_seconds, parse_minutes_seconds, Result};

pub fn format(secs: u64) -> Result<()> {
    println!("{}", format_minutes_seconds(secs));
    Ok(())
}

pub fn parse(value: &str) -> Result<()> {
    println!("{}", parse_minutes_seconds(value)?);
    Ok(())
}
