/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::LabelSet;

/// A monitored system as seen by the export pipeline.
pub struct HostContext {
    pub hostname: String,
    /// Free-form host tags. May already be a JSON value, see the host_tags
    /// handling in the record formatter.
    pub tags: Option<String>,
    /// Set by the driver for the host this process runs on; the record
    /// formatter then substitutes the instance's configured hostname.
    pub is_local: bool,
    pub labels: LabelSet,
}

impl HostContext {
    pub fn new(hostname: impl Into<String>) -> Self {
        HostContext {
            hostname: hostname.into(),
            tags: None,
            is_local: false,
            labels: LabelSet::default(),
        }
    }
}
