/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, Utc};

/// Identity of a chart, a named group of related dimensions.
///
/// All fields are opaque identifiers owned by the collection subsystem and
/// pass through into the serialized record unchanged apart from JSON string
/// escaping.
#[derive(Debug, Clone)]
pub struct ChartContext {
    pub id: String,
    pub name: String,
    pub family: String,
    pub context: String,
    pub r#type: String,
    pub units: String,
}

/// One time series within a chart, carrying its last raw sample.
#[derive(Debug, Clone)]
pub struct Dimension {
    pub id: String,
    pub name: String,
    pub last_collected_value: i64,
    pub last_collected_time: DateTime<Utc>,
}
