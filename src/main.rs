use starsim::{ConstantsTable, SettingsConfig, SimContext, SimulationManager};

use clap::Parser;
use anyhow::{Context, Result};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser, Debug)]
struct Args {
    /// Script file under systems/
    #[arg(short, default_value = "solar.lua")]
    file_name: String,

    /// Number of ticks to run
    #[arg(long, default_value_t = 2000)]
    steps: u32,

    /// Settings file
    #[arg(long, default_value = "settings.yaml")]
    settings: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let settings_path = root.join(&args.settings);
    let file = File::open(&settings_path)
        .with_context(|| format!("failed to open {}", settings_path.display()))?;
    let settings_cfg: SettingsConfig = serde_yaml::from_reader(BufReader::new(file))?;

    let constants = ConstantsTable::load_dir(&root.join("constants"))?;

    let context = SimContext::new(settings_cfg.into_settings());
    let mut manager = SimulationManager::new(context.clone(), Rc::new(constants));
    manager.load(&root.join("systems").join(&args.file_name))?;

    for _ in 0..args.steps {
        manager.update();
    }

    println!("t = {:.4} years", manager.current_time());
    for state in manager.render() {
        let name = state.name.as_deref().unwrap_or("<unnamed>");
        println!(
            "  {name}: mass {:.6} location ({:.4}, {:.4}, {:.4})",
            state.mass, state.location.x, state.location.y, state.location.z
        );
    }

    manager.dispose();
    Ok(())
}
