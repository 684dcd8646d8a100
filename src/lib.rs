// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod budget;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod distribution;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod models;
pub mod source;
pub mod utils;

pub use error::{Error, Result};
