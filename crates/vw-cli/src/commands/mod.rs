pub mod defaults;
pub mod simulate;

use std::fs;
use std::path::Path;

use vw_simulation::SimConfig;

/// Read a JSON configuration file. Missing fields take their defaults.
fn load_config(path: &Path) -> Result<SimConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}
