/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod json;
pub use json::{ChartMetrics, CycleOutput, FinalizedBody, HostMetrics, JsonExportInstance};
