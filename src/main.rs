use std::env;

use plandb::{config::EngineConfig, PlanDB};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match env::var("PLANDB_CONFIG") {
        Ok(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
        Err(_) => EngineConfig::default(),
    };
    log::debug!("config: {:?}", config);

    let args: Vec<String> = env::args().skip(1).collect();
    let query = args.join(" ");
    log::debug!("query: {}", query);
    let db = PlanDB::with_config(config)?;
    let rs = db.execute(query.as_str())?;
    let output = serde_json::json!({
        "result": rs,
        "warnings": db.default_session().warnings(),
    });
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
