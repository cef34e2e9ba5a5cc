// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod session;
pub mod config;
pub mod clients;
pub mod services;
pub mod appointments;
pub mod transactions;
pub mod reports;
pub mod exporter;
pub mod doctor;
