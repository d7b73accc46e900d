use anyhow::{Context, Result};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use vicsek_common::{OutputConfig, Trajectory};

/// Serialization format of the full trajectory file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryFormat {
    Json,
    Bincode,
    MessagePack,
}

impl TrajectoryFormat {
    /// Parses a format name; unknown names fall back to JSON.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.unwrap_or("json") {
            "json" => TrajectoryFormat::Json,
            "bincode" => TrajectoryFormat::Bincode,
            "messagepack" => TrajectoryFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using JSON instead.", other);
                TrajectoryFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TrajectoryFormat::Json => "json",
            TrajectoryFormat::Bincode => "bin",
            TrajectoryFormat::MessagePack => "msgpack",
        }
    }
}

/// Writes the trajectory, plus any CSV side files enabled in `output`.
/// Returns the paths written.
pub fn save_outputs(trajectory: &Trajectory, output: &OutputConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let format = TrajectoryFormat::from_name(output.format.as_deref());
    let path = PathBuf::from(format!("{}_trajectory.{}", output.base_filename, format.extension()));
    write_trajectory(trajectory, format, &path)?;
    info!("Trajectory ({} frames) saved to {}", trajectory.len(), path.display());
    written.push(path);

    if output.save_order_parameter_csv {
        let path = PathBuf::from(format!("{}_order_parameter.csv", output.base_filename));
        write_order_parameter_csv(trajectory, &path)?;
        info!("Order parameter series saved to {}", path.display());
        written.push(path);
    } else {
        info!("Skipping order parameter CSV as per config.");
    }

    if output.save_final_positions {
        let path = PathBuf::from(format!("{}_final_positions.csv", output.base_filename));
        write_final_positions_csv(trajectory, &path)?;
        info!("Final positions saved to {}", path.display());
        written.push(path);
    }
    Ok(written)
}

pub fn write_trajectory(trajectory: &Trajectory, format: TrajectoryFormat, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating trajectory file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    match format {
        TrajectoryFormat::Json => serde_json::to_writer(&mut writer, trajectory)
            .context("serializing trajectory to JSON")?,
        TrajectoryFormat::Bincode => bincode::serialize_into(&mut writer, trajectory)
            .context("serializing trajectory to bincode")?,
        TrajectoryFormat::MessagePack => rmp_serde::encode::write(&mut writer, trajectory)
            .context("serializing trajectory to MessagePack")?,
    }
    writer.flush()?;
    Ok(())
}

/// Reads back a trajectory written by [`write_trajectory`].
pub fn read_trajectory(format: TrajectoryFormat, path: &Path) -> Result<Trajectory> {
    let file = File::open(path).with_context(|| format!("opening trajectory file '{}'", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let trajectory = match format {
        TrajectoryFormat::Json => serde_json::from_reader(reader)?,
        TrajectoryFormat::Bincode => bincode::deserialize_from(reader)?,
        TrajectoryFormat::MessagePack => rmp_serde::decode::from_read(reader)?,
    };
    Ok(trajectory)
}

/// One row per frame: `step,time,phi`.
pub fn write_order_parameter_csv(trajectory: &Trajectory, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating CSV file '{}'", path.display()))?;
    writer.write_record(["step", "time", "phi"])?;
    for frame in trajectory.frames() {
        writer.write_record(&[
            frame.step.to_string(),
            format!("{:.6}", frame.time),
            format!("{:.10}", frame.order_parameter),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Last frame's particles: `x,y,theta`.
pub fn write_final_positions_csv(trajectory: &Trajectory, path: &Path) -> Result<()> {
    let Some(last) = trajectory.frame(trajectory.len().saturating_sub(1)) else {
        anyhow::bail!("cannot write final positions of an empty trajectory");
    };
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating CSV file '{}'", path.display()))?;
    writer.write_record(["x", "y", "theta"])?;
    for (&[x, y], theta) in last.positions.iter().zip(last.headings) {
        writer.write_record(&[format!("{:.6}", x), format!("{:.6}", y), format!("{:.6}", theta)])?;
    }
    writer.flush()?;
    Ok(())
}
