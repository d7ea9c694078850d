// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for depth sensors
//!
//! The viewer only ever talks to a [`sensor::DepthSensor`]; which concrete
//! sensor sits behind it is decided once at startup:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │ DepthSensor
//! ┌────────────────────┴────────────────────────┐
//! │  ┌─────────────┐ ┌───────────┐ ┌──────────┐ │
//! │  │   Kinect    │ │ Synthetic │ │  Discon- │ │
//! │  │ (freedepth) │ │  (scene)  │ │  nected  │ │
//! │  └─────────────┘ └───────────┘ └──────────┘ │
//! └─────────────────────────────────────────────┘
//! ```

pub mod sensor;
