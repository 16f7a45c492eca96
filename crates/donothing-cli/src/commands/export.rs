use super::{now, open_service, CliResult};

pub fn run() -> CliResult {
    let service = open_service()?;
    let export = service.export(now())?;
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
