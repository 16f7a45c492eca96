use super::{open_service, CliResult};

pub fn run(yes: bool) -> CliResult {
    if !yes {
        return Err("reset deletes every log; pass --yes to confirm".into());
    }
    let mut service = open_service()?;
    service.reset()?;
    println!("challenge reset");
    Ok(())
}
