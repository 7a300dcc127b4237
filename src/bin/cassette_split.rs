//! Splits a monolithic cassette into per-port cassettes that
//! `CassetteConfig` can load.
//!
//! Usage: `cassette_split <input.yaml> <output_dir>`
//!
//! Writes `<output_dir>/<port>.cassette.yaml` for every port that has at
//! least one interaction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{env, fs};

use actionables::cassette::config::CassetteConfig;
use actionables::cassette::format::{Cassette, Interaction};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A per-port cassette that links back to the original recording session.
#[derive(Serialize)]
struct PerPortCassette {
    name: String,
    recorded_at: DateTime<Utc>,
    commit: String,
    source_session: String,
    interactions: Vec<Interaction>,
}

fn group_by_port(cassette: &Cassette) -> BTreeMap<&str, Vec<Interaction>> {
    let mut by_port: BTreeMap<&str, Vec<Interaction>> = BTreeMap::new();
    for interaction in &cassette.interactions {
        let stream = by_port.entry(interaction.port.as_str()).or_default();
        stream.push(Interaction { seq: stream.len() as u64, ..interaction.clone() });
    }
    by_port
}

fn split_cassette(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let cassette = CassetteConfig::load_cassette(input)?;
    fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create {}: {e}", output_dir.display()))?;

    let mut written = Vec::new();
    for (port, interactions) in group_by_port(&cassette) {
        let per_port = PerPortCassette {
            name: format!("{}-{port}", cassette.name),
            recorded_at: cassette.recorded_at,
            commit: cassette.commit.clone(),
            source_session: cassette.name.clone(),
            interactions,
        };

        let path = output_dir.join(format!("{port}.cassette.yaml"));
        let yaml = serde_yaml::to_string(&per_port)
            .map_err(|e| format!("Failed to serialize cassette for port {port}: {e}"))?;
        fs::write(&path, yaml).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let [_, input, output_dir] = args.as_slice() else {
        eprintln!("Usage: cassette_split <input.yaml> <output_dir>");
        return ExitCode::FAILURE;
    };

    match split_cassette(Path::new(input), Path::new(output_dir)) {
        Ok(paths) => {
            for path in paths {
                println!("Wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
