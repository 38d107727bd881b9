// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models: sidecar metadata, transport state and overlay text.

pub mod metadata;
pub mod overlay;
pub mod transport;
