/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, Utc};

use crate::types::{ChartContext, Dimension};

/// A value calculated from stored history for one dimension.
#[derive(Debug, Clone, Copy)]
pub struct StoredSample {
    /// NaN means there is no data for this point and the record is skipped.
    pub value: f64,
    pub last_time: DateTime<Utc>,
}

impl StoredSample {
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.value.is_nan()
    }
}

/// The stored-data aggregation collaborator consulted in calculated mode.
///
/// Implemented by the storage subsystem outside this crate; the formatting
/// core only honors the NaN-means-skip contract of [`StoredSample`].
pub trait ValueResolver {
    fn resolve(&self, chart: &ChartContext, dimension: &Dimension) -> StoredSample;
}

impl<F> ValueResolver for F
where
    F: Fn(&ChartContext, &Dimension) -> StoredSample,
{
    fn resolve(&self, chart: &ChartContext, dimension: &Dimension) -> StoredSample {
        self(chart, dimension)
    }
}
