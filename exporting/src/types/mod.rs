/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod name;
pub use name::{NodeName, ParseError};

mod value;
pub use value::MetricValue;

mod chart;
pub use chart::{ChartContext, Dimension};

mod label;
pub use label::{LabelOrigin, LabelSet, LabelSetReadGuard, LabelValue};

mod host;
pub use host::HostContext;
