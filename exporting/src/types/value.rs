/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

/// A dimension value in one of the two resolution modes.
///
/// Collected values are the raw last-ingested counters and render as plain
/// integers; stored values come out of the history resolver and render in
/// float form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Collected(i64),
    Stored(f64),
}

impl MetricValue {
    pub(crate) fn push_json(&self, buf: &mut Vec<u8>) {
        match self {
            MetricValue::Collected(i) => {
                buf.extend_from_slice(itoa::Buffer::new().format(*i).as_bytes())
            }
            MetricValue::Stored(v) => {
                buf.extend_from_slice(ryu::Buffer::new().format(*v).as_bytes())
            }
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Collected(i) => itoa::Buffer::new().format(*i).fmt(f),
            MetricValue::Stored(v) => ryu::Buffer::new().format(*v).fmt(f),
        }
    }
}
