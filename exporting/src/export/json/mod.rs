/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use log::debug;

use crate::config::{DataSource, Framing, JsonExporterConfig};
use crate::resolve::ValueResolver;
use crate::types::{ChartContext, Dimension, HostContext};

mod format;

const BODY_BUF_INITIAL_SIZE: usize = 2048;

/// One configured export target with its own output buffers.
///
/// All formatting for an instance is synchronous and single-writer; the
/// driver serializes calls per instance. Distinct instances share nothing
/// and may run fully in parallel.
pub struct JsonExportInstance {
    config: JsonExporterConfig,
    labels: Vec<u8>,
    buffer: Vec<u8>,
    records: usize,
}

/// Body bytes of a completed cycle.
///
/// Only [`JsonExportInstance::close_batch`] produces one, so a request head
/// can only ever be built over a finished body.
pub struct FinalizedBody {
    bytes: Vec<u8>,
}

impl FinalizedBody {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl JsonExportInstance {
    /// Build an instance for one export target.
    ///
    /// The body buffer is reserved up front; on allocation failure no
    /// half-built instance is handed out.
    pub fn new(config: JsonExporterConfig) -> anyhow::Result<Self> {
        let mut buffer = Vec::new();
        buffer.try_reserve(BODY_BUF_INITIAL_SIZE).map_err(|e| {
            anyhow!(
                "cannot allocate body buffer for exporter {}: {e}",
                config.name()
            )
        })?;
        Ok(JsonExportInstance {
            config,
            labels: Vec::new(),
            buffer,
            records: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &JsonExporterConfig {
        &self.config
    }

    /// Records appended since the last `start_cycle`.
    #[inline]
    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Reset per-cycle state. Buffers keep their allocations for reuse.
    pub fn start_cycle(&mut self) {
        self.buffer.clear();
        self.labels.clear();
        self.records = 0;
    }

    /// Open the enclosing array in HTTP batch framing; no-op in line
    /// framing. Must be the first write of the cycle.
    pub fn open_batch(&mut self) {
        if self.config.framing == Framing::HttpArray {
            debug_assert!(self.buffer.is_empty());
            self.buffer.extend_from_slice(b"[\n");
        }
    }

    /// Drop the per-host labels fragment once a host's dimensions are done,
    /// so the next host starts from a clean labels buffer.
    pub fn flush_host_labels(&mut self) {
        self.labels.clear();
    }

    /// Close the cycle and hand out the finished body.
    ///
    /// In HTTP batch framing this writes the array closer first. The body
    /// moves out of the instance, so no further record can land in it.
    pub fn close_batch(&mut self) -> FinalizedBody {
        if self.config.framing == Framing::HttpArray {
            self.buffer.extend_from_slice(b"\n]\n");
        }
        FinalizedBody {
            bytes: std::mem::take(&mut self.buffer),
        }
    }

    /// Build the request head for a finalized body.
    ///
    /// Returns `None` in line framing, which has no HTTP envelope.
    pub fn prepare_header(&self, body: &FinalizedBody) -> Option<Vec<u8>> {
        if self.config.framing != Framing::HttpArray {
            return None;
        }

        let api_path = self.config.build_api_path();
        let mut head = Vec::with_capacity(128);
        head.extend_from_slice(b"POST ");
        head.extend_from_slice(api_path.as_str().as_bytes());
        head.extend_from_slice(b" HTTP/1.1\r\n");
        head.extend_from_slice(b"Host: ");
        head.extend_from_slice(self.config.host.as_bytes());
        head.extend_from_slice(b"\r\n");
        head.extend_from_slice(b"Content-Type: application/json\r\n");
        head.extend_from_slice(b"Content-Length: ");
        head.extend_from_slice(itoa::Buffer::new().format(body.len()).as_bytes());
        head.extend_from_slice(b"\r\n\r\n");
        Some(head)
    }

    /// Take a sent or abandoned body's allocation back for the next cycle.
    pub fn reclaim(&mut self, body: FinalizedBody) {
        let mut bytes = body.bytes;
        bytes.clear();
        self.buffer = bytes;
    }
}

/// Everything to export for one host in one cycle.
pub struct HostMetrics<'a> {
    pub host: &'a HostContext,
    pub charts: Vec<ChartMetrics<'a>>,
}

pub struct ChartMetrics<'a> {
    pub chart: &'a ChartContext,
    pub dimensions: &'a [Dimension],
}

pub enum CycleOutput {
    /// Newline-delimited records, sent over the wire as-is.
    Lines(FinalizedBody),
    /// A finished HTTP request: head bytes plus array-framed body.
    HttpRequest { head: Vec<u8>, body: FinalizedBody },
}

impl JsonExportInstance {
    /// Run one full delivery cycle over the given hosts.
    ///
    /// This plays the driver role: per host it takes the label read lock for
    /// the duration of that host's iteration, then walks every dimension in
    /// the instance's data source mode.
    pub fn run_cycle<R>(&mut self, hosts: &[HostMetrics<'_>], resolver: &R) -> CycleOutput
    where
        R: ValueResolver,
    {
        self.start_cycle();
        self.open_batch();

        for host_metrics in hosts {
            let labels = host_metrics.host.labels.read();
            self.format_host_labels(&labels);
            for chart_metrics in &host_metrics.charts {
                for dimension in chart_metrics.dimensions {
                    match self.config.data_source {
                        DataSource::AsCollected => self.format_metric_collected(
                            host_metrics.host,
                            chart_metrics.chart,
                            dimension,
                        ),
                        DataSource::Calculated => {
                            self.format_metric_stored(
                                host_metrics.host,
                                chart_metrics.chart,
                                dimension,
                                resolver,
                            );
                        }
                    }
                }
            }
            self.flush_host_labels();
        }

        debug!(
            "exporter {}: {} records in this cycle",
            self.config.name(),
            self.records
        );

        let body = self.close_batch();
        match self.prepare_header(&body) {
            Some(head) => CycleOutput::HttpRequest { head, body },
            None => CycleOutput::Lines(body),
        }
    }
}
