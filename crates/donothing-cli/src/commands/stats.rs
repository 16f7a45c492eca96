use super::{open_service, CliResult};

pub fn run() -> CliResult {
    let service = open_service()?;
    let summary = service.summary()?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
