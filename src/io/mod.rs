// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for video and sidecar files.

pub mod media;
pub mod sidecar;
