use super::{now, open_service, CliResult};

pub fn run(json: bool) -> CliResult {
    let service = open_service()?;
    let info = service.info(now());

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info.period_label(service.rules()));
    println!("Today's target: {} min", info.target_minutes);
    if let Some(until) = info.freeze_until.filter(|_| info.is_frozen) {
        println!("Frozen until {until}");
    }
    if info.is_finished() {
        if info.is_completed {
            println!("Challenge completed");
        } else {
            println!("Challenge finished without reaching the success threshold");
        }
    }
    Ok(())
}
