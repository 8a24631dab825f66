/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::anyhow;
use http::uri::PathAndQuery;
use yaml_rust::{Yaml, yaml::Hash};

use crate::types::{LabelOrigin, NodeName};

pub(crate) mod yaml;

const CONFIG_KEY_EXPORTER_TYPE: &str = "type";
const CONFIG_KEY_EXPORTER_NAME: &str = "name";

const DEFAULT_PREFIX: &str = "netdata";
const DEFAULT_PORT: u16 = 5448;

const API_PATH: &str = "/api/put";

/// How records are framed in the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// One newline-terminated JSON object per record.
    Lines,
    /// A single JSON array delivered as one HTTP request body.
    HttpArray,
}

/// Which value a dimension record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The raw last-collected counter.
    AsCollected,
    /// A value calculated from stored history by the resolver.
    Calculated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonExporterConfig {
    name: NodeName,
    pub(crate) prefix: String,
    /// Hostname reported for hosts flagged as local.
    pub(crate) local_hostname: String,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) framing: Framing,
    pub(crate) data_source: DataSource,
    pub(crate) send_configured_labels: bool,
    pub(crate) send_automatic_labels: bool,
}

impl JsonExporterConfig {
    pub fn new(framing: Framing) -> Self {
        JsonExporterConfig {
            name: NodeName::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            local_hostname: "localhost".to_string(),
            host: String::new(),
            port: DEFAULT_PORT,
            framing,
            data_source: DataSource::AsCollected,
            send_configured_labels: true,
            send_automatic_labels: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    #[inline]
    pub fn framing(&self) -> Framing {
        self.framing
    }

    #[inline]
    pub fn data_source(&self) -> DataSource {
        self.data_source
    }

    pub fn exporter_type(&self) -> &'static str {
        match self.framing {
            Framing::Lines => "json",
            Framing::HttpArray => "json_http",
        }
    }

    pub(crate) fn build_api_path(&self) -> PathAndQuery {
        PathAndQuery::from_static(API_PATH)
    }

    pub(crate) fn sending_labels_configured(&self) -> bool {
        self.send_configured_labels || self.send_automatic_labels
    }

    pub(crate) fn should_send_label(&self, origin: LabelOrigin) -> bool {
        match origin {
            LabelOrigin::Config => self.send_configured_labels,
            LabelOrigin::Auto => self.send_automatic_labels,
        }
    }

    pub fn parse(map: &Hash) -> anyhow::Result<Self> {
        let mut config = JsonExporterConfig::new(Framing::Lines);

        yaml::foreach_kv(map, |k, v| config.set(k, v))?;

        config.check()?;
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match yaml::normalize_key(k).as_str() {
            CONFIG_KEY_EXPORTER_TYPE => {
                self.framing = match yaml::as_string(v)?.as_str() {
                    "json" => Framing::Lines,
                    "json_http" | "json:http" => Framing::HttpArray,
                    s => return Err(anyhow!("unsupported exporter type {s}")),
                };
                Ok(())
            }
            CONFIG_KEY_EXPORTER_NAME => {
                let s = yaml::as_string(v)?;
                self.name = NodeName::from_str(&s)
                    .map_err(|e| anyhow!("invalid exporter name {s}: {e}"))?;
                Ok(())
            }
            "prefix" => {
                self.prefix = yaml::as_string(v)?;
                Ok(())
            }
            "hostname" | "local_hostname" => {
                self.local_hostname = yaml::as_string(v)?;
                Ok(())
            }
            "host" | "server" | "destination" => {
                self.host = yaml::as_string(v)?;
                Ok(())
            }
            "port" => {
                self.port = yaml::as_u16(v)?;
                Ok(())
            }
            "data_source" => {
                self.data_source = match yaml::normalize_key(&yaml::as_string(v)?).as_str() {
                    "as_collected" | "collected" => DataSource::AsCollected,
                    "calculated" | "stored" | "average" | "sum" => DataSource::Calculated,
                    s => return Err(anyhow!("unsupported data source {s}")),
                };
                Ok(())
            }
            "send_configured_labels" => {
                self.send_configured_labels = yaml::as_bool(v)?;
                Ok(())
            }
            "send_automatic_labels" => {
                self.send_automatic_labels = yaml::as_bool(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&mut self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            return Err(anyhow!("name is not set"));
        }
        if self.host.is_empty() {
            return Err(anyhow!("peer address is not set"));
        }
        Ok(())
    }
}
