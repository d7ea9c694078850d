// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for sensor operations
//!
//! This module provides command-line functionality for:
//! - Listing attached depth sensors
//! - Building meshes headlessly and printing a JSON summary

use kinect_mesh::app::{MeshApp, UpdateOutcome};
use kinect_mesh::backends::sensor::enumerate_sensors;
use kinect_mesh::constants::FRAME_POLL_INTERVAL;
use kinect_mesh::errors::{AppError, AppResult};
use kinect_mesh::mesh::AttributeKind;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// How long `stats` waits for depth frames before giving up
const STATS_TIMEOUT: Duration = Duration::from_secs(5);

/// List all attached depth sensors
pub fn list_sensors() -> AppResult<()> {
    let sensors = enumerate_sensors();

    if sensors.is_empty() {
        println!("No depth sensors found.");
        return Ok(());
    }

    println!("Available depth sensors:");
    println!();
    for sensor in &sensors {
        println!("  [{}] {}", sensor.index, sensor.name);
        if let Some(serial) = &sensor.serial {
            println!("      Serial: {}", serial);
        }
        println!();
    }

    Ok(())
}

/// Summary of the last mesh built by `stats`
#[derive(Debug, Serialize)]
struct MeshStats<'a> {
    sensor: &'a str,
    frames: u64,
    divisor: usize,
    cols: usize,
    rows: usize,
    vertices: usize,
    triangles: usize,
    attribute: &'static str,
    mode: &'static str,
    z_min: Option<f32>,
    z_max: Option<f32>,
}

/// Build `frames` meshes and print a JSON summary of the last one
pub fn print_stats(mut app: MeshApp, frames: u64) -> AppResult<()> {
    let frames = frames.max(1);
    let started = Instant::now();

    while app.frames_built() < frames {
        if let UpdateOutcome::NoNewFrame = app.update() {
            if started.elapsed() > STATS_TIMEOUT {
                return Err(AppError::Other(format!(
                    "No depth frames from {} after {:?}",
                    app.sensor_name(),
                    STATS_TIMEOUT
                )));
            }
            std::thread::sleep(FRAME_POLL_INTERVAL);
        }
    }
    info!(frames = app.frames_built(), elapsed = ?started.elapsed(), "Built meshes");

    let mesh = app.mesh();
    let tables = app.projector().grid_tables();
    let z_range = mesh.z_range();
    let stats = MeshStats {
        sensor: app.sensor_name(),
        frames: app.frames_built(),
        divisor: tables.divisor(),
        cols: tables.cols(),
        rows: tables.rows(),
        vertices: mesh.num_vertices(),
        triangles: mesh.num_triangles(),
        attribute: match mesh.attribute_kind() {
            AttributeKind::TexCoords => "tex_coords",
            AttributeKind::Colors => "colors",
        },
        mode: app.tunables.mode.display_name(),
        z_min: z_range.map(|(min, _)| min),
        z_max: z_range.map(|(_, max)| max),
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
