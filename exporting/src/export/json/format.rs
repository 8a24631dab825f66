/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, Utc};

use super::JsonExportInstance;
use crate::config::Framing;
use crate::escape::{push_json_escaped, push_sanitized_label_value};
use crate::resolve::ValueResolver;
use crate::types::{ChartContext, Dimension, HostContext, LabelSetReadGuard, MetricValue};

fn push_str_field(buf: &mut Vec<u8>, key: &str, value: &str) {
    buf.push(b'"');
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b"\":\"");
    push_json_escaped(buf, value);
    buf.extend_from_slice(b"\",");
}

// Tags starting with a JSON opener are trusted as pre-rendered JSON and
// spliced in as-is; anything else is wrapped as an opaque string, also as-is.
fn push_host_tags(buf: &mut Vec<u8>, tags: Option<&str>) {
    let Some(tags) = tags else {
        return;
    };
    let Some(first) = tags.as_bytes().first() else {
        return;
    };

    match first {
        b'{' | b'[' | b'"' => {
            buf.extend_from_slice(b"\"host_tags\":");
            buf.extend_from_slice(tags.as_bytes());
            buf.push(b',');
        }
        _ => {
            buf.extend_from_slice(b"\"host_tags\":\"");
            buf.extend_from_slice(tags.as_bytes());
            buf.extend_from_slice(b"\",");
        }
    }
}

impl JsonExportInstance {
    /// Rebuild the per-host labels fragment into the labels buffer.
    ///
    /// Emits nothing when label sending is disabled for this instance.
    /// The caller acquires the label read lock and keeps the guard alive for
    /// the whole call; a concurrent writer may be waiting on it.
    pub fn format_host_labels(&mut self, labels: &LabelSetReadGuard<'_>) {
        if !self.config.sending_labels_configured() {
            return;
        }

        let buf = &mut self.labels;
        buf.extend_from_slice(b"\"labels\":{");
        let mut count = 0;
        for (key, label) in labels.iter() {
            if !self.config.should_send_label(label.origin) {
                continue;
            }
            if count > 0 {
                buf.push(b',');
            }
            buf.push(b'"');
            push_json_escaped(buf, key);
            buf.extend_from_slice(b"\":\"");
            push_sanitized_label_value(buf, &label.value);
            buf.push(b'"');
            count += 1;
        }
        buf.extend_from_slice(b"},");
    }

    /// Append one record for the dimension's last collected sample.
    ///
    /// Never skips: every call appends exactly one record.
    pub fn format_metric_collected(
        &mut self,
        host: &HostContext,
        chart: &ChartContext,
        dimension: &Dimension,
    ) {
        self.append_record(
            host,
            chart,
            dimension,
            MetricValue::Collected(dimension.last_collected_value),
            dimension.last_collected_time,
        );
    }

    /// Append one record for a value calculated from stored history.
    ///
    /// Returns false when the resolver reports no data for this point, in
    /// which case the output buffer is left byte-for-byte unchanged.
    pub fn format_metric_stored<R>(
        &mut self,
        host: &HostContext,
        chart: &ChartContext,
        dimension: &Dimension,
        resolver: &R,
    ) -> bool
    where
        R: ValueResolver + ?Sized,
    {
        let sample = resolver.resolve(chart, dimension);
        if sample.is_undefined() {
            return false;
        }

        self.append_record(
            host,
            chart,
            dimension,
            MetricValue::Stored(sample.value),
            sample.last_time,
        );
        true
    }

    fn append_record(
        &mut self,
        host: &HostContext,
        chart: &ChartContext,
        dimension: &Dimension,
        value: MetricValue,
        time: DateTime<Utc>,
    ) {
        if self.config.framing == Framing::HttpArray && self.records > 0 {
            self.buffer.extend_from_slice(b",\n");
        }

        let buf = &mut self.buffer;
        buf.push(b'{');
        push_str_field(buf, "prefix", &self.config.prefix);
        let hostname = if host.is_local {
            &self.config.local_hostname
        } else {
            &host.hostname
        };
        push_str_field(buf, "hostname", hostname);
        push_host_tags(buf, host.tags.as_deref());
        buf.extend_from_slice(&self.labels);

        push_str_field(buf, "chart_id", &chart.id);
        push_str_field(buf, "chart_name", &chart.name);
        push_str_field(buf, "chart_family", &chart.family);
        push_str_field(buf, "chart_context", &chart.context);
        push_str_field(buf, "chart_type", &chart.r#type);
        push_str_field(buf, "units", &chart.units);

        push_str_field(buf, "id", &dimension.id);
        push_str_field(buf, "name", &dimension.name);
        buf.extend_from_slice(b"\"value\":");
        value.push_json(buf);
        buf.extend_from_slice(b",\"timestamp\":");
        buf.extend_from_slice(itoa::Buffer::new().format(time.timestamp()).as_bytes());
        buf.push(b'}');

        if self.config.framing == Framing::Lines {
            buf.push(b'\n');
        }
        self.records += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Framing, JsonExporterConfig};
    use crate::resolve::StoredSample;
    use crate::types::{HostContext, LabelOrigin};

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn cpu_chart() -> ChartContext {
        ChartContext {
            id: "cpu".to_string(),
            name: "cpu".to_string(),
            family: "cpu".to_string(),
            context: "system.cpu".to_string(),
            r#type: "line".to_string(),
            units: "percentage".to_string(),
        }
    }

    fn user_dimension() -> Dimension {
        Dimension {
            id: "user".to_string(),
            name: "user".to_string(),
            last_collected_value: 425,
            last_collected_time: ts(1690000000),
        }
    }

    fn line_instance() -> JsonExportInstance {
        let mut config = JsonExporterConfig::new(Framing::Lines);
        config.host = "remote".to_string();
        config.send_configured_labels = false;
        JsonExportInstance::new(config).unwrap()
    }

    #[test]
    fn collected_line_record() {
        let mut instance = line_instance();
        let host = HostContext::new("srv1");

        instance.start_cycle();
        instance.format_metric_collected(&host, &cpu_chart(), &user_dimension());

        let body = instance.close_batch();
        assert_eq!(
            body.as_bytes(),
            concat!(
                "{\"prefix\":\"netdata\",\"hostname\":\"srv1\",",
                "\"chart_id\":\"cpu\",\"chart_name\":\"cpu\",\"chart_family\":\"cpu\",",
                "\"chart_context\":\"system.cpu\",\"chart_type\":\"line\",\"units\":\"percentage\",",
                "\"id\":\"user\",\"name\":\"user\",\"value\":425,\"timestamp\":1690000000}\n"
            )
            .as_bytes()
        );
    }

    #[test]
    fn collected_never_skips() {
        let mut instance = line_instance();
        let host = HostContext::new("srv1");
        let chart = cpu_chart();
        let dimension = user_dimension();

        instance.start_cycle();
        for _ in 0..3 {
            instance.format_metric_collected(&host, &chart, &dimension);
        }
        assert_eq!(instance.records_written(), 3);

        let body = instance.close_batch();
        assert_eq!(body.as_bytes().iter().filter(|b| **b == b'\n').count(), 3);
    }

    #[test]
    fn stored_record_uses_resolver_output() {
        let mut instance = line_instance();
        let host = HostContext::new("srv1");
        let resolver = |_: &ChartContext, _: &Dimension| StoredSample {
            value: 42.5,
            last_time: ts(1690000060),
        };

        instance.start_cycle();
        let appended =
            instance.format_metric_stored(&host, &cpu_chart(), &user_dimension(), &resolver);
        assert!(appended);

        let body = instance.close_batch();
        let text = std::str::from_utf8(body.as_bytes()).unwrap();
        assert!(text.contains("\"value\":42.5,\"timestamp\":1690000060}"));
    }

    #[test]
    fn stored_undefined_is_a_no_op() {
        let mut instance = line_instance();
        let host = HostContext::new("srv1");
        let resolver = |_: &ChartContext, _: &Dimension| StoredSample {
            value: f64::NAN,
            last_time: ts(1690000060),
        };

        instance.start_cycle();
        instance.format_metric_collected(&host, &cpu_chart(), &user_dimension());
        let before = instance.buffer.clone();

        let appended =
            instance.format_metric_stored(&host, &cpu_chart(), &user_dimension(), &resolver);
        assert!(!appended);
        assert_eq!(instance.buffer, before);
        assert_eq!(instance.records_written(), 1);
    }

    #[test]
    fn stored_skip_consumes_no_separator() {
        let mut config = JsonExporterConfig::new(Framing::HttpArray);
        config.host = "remote".to_string();
        config.send_configured_labels = false;
        let mut instance = JsonExportInstance::new(config).unwrap();

        let host = HostContext::new("srv1");
        let chart = cpu_chart();
        let dimension = user_dimension();
        let mut defined = true;
        let samples = [42.5, f64::NAN, 43.5];

        instance.start_cycle();
        instance.open_batch();
        for value in samples {
            let resolver = move |_: &ChartContext, _: &Dimension| StoredSample {
                value,
                last_time: ts(1690000060),
            };
            defined &= instance.format_metric_stored(&host, &chart, &dimension, &resolver);
        }
        assert!(!defined);
        assert_eq!(instance.records_written(), 2);

        let body = instance.close_batch();
        let parsed: serde_json::Value = serde_json::from_slice(body.as_bytes()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn host_tags_classification() {
        let render = |tags: Option<&str>| {
            let mut buf = Vec::new();
            push_host_tags(&mut buf, tags);
            String::from_utf8(buf).unwrap()
        };

        assert_eq!(render(None), "");
        assert_eq!(render(Some("")), "");
        assert_eq!(
            render(Some("{\"dc\":\"fra\"}")),
            "\"host_tags\":{\"dc\":\"fra\"},"
        );
        assert_eq!(render(Some("[1,2]")), "\"host_tags\":[1,2],");
        assert_eq!(render(Some("\"fra\"")), "\"host_tags\":\"fra\",");
        assert_eq!(render(Some("dc=fra")), "\"host_tags\":\"dc=fra\",");
    }

    #[test]
    fn opaque_tags_are_not_escaped() {
        let mut buf = Vec::new();
        push_host_tags(&mut buf, Some("quote\"inside"));
        assert_eq!(buf, b"\"host_tags\":\"quote\"inside\",");
    }

    #[test]
    fn record_with_tags_and_labels() {
        let mut config = JsonExporterConfig::new(Framing::Lines);
        config.host = "remote".to_string();
        let mut instance = JsonExportInstance::new(config).unwrap();

        let mut host = HostContext::new("srv1");
        host.tags = Some("dc=fra".to_string());
        host.labels.insert(
            "room".to_string(),
            "lab".to_string(),
            LabelOrigin::Config,
        );

        instance.start_cycle();
        {
            let labels = host.labels.read();
            instance.format_host_labels(&labels);
        }
        instance.format_metric_collected(&host, &cpu_chart(), &user_dimension());
        instance.flush_host_labels();

        let body = instance.close_batch();
        let text = std::str::from_utf8(body.as_bytes()).unwrap();
        assert!(text.starts_with(concat!(
            "{\"prefix\":\"netdata\",\"hostname\":\"srv1\",",
            "\"host_tags\":\"dc=fra\",\"labels\":{\"room\":\"lab\"},\"chart_id\":\"cpu\","
        )));
    }

    #[test]
    fn labels_fragment_filtering() {
        let mut config = JsonExporterConfig::new(Framing::Lines);
        config.host = "remote".to_string();
        let mut instance = JsonExportInstance::new(config).unwrap();

        let host = HostContext::new("srv1");
        host.labels
            .insert("a".to_string(), "1".to_string(), LabelOrigin::Config);
        host.labels
            .insert("k8s_ns".to_string(), "prod".to_string(), LabelOrigin::Auto);
        host.labels
            .insert("b".to_string(), "2".to_string(), LabelOrigin::Config);

        let labels = host.labels.read();
        instance.format_host_labels(&labels);
        // automatic labels are off by default
        assert_eq!(instance.labels, b"\"labels\":{\"a\":\"1\",\"b\":\"2\"},");
    }

    #[test]
    fn labels_fragment_absent_when_disabled() {
        let mut instance = line_instance();
        let host = HostContext::new("srv1");
        host.labels
            .insert("a".to_string(), "1".to_string(), LabelOrigin::Config);

        let labels = host.labels.read();
        instance.format_host_labels(&labels);
        assert!(instance.labels.is_empty());
    }

    #[test]
    fn label_values_escaped() {
        let mut config = JsonExporterConfig::new(Framing::Lines);
        config.host = "remote".to_string();
        let mut instance = JsonExportInstance::new(config).unwrap();

        let host = HostContext::new("srv1");
        host.labels.insert(
            "note".to_string(),
            "say \"hi\"\n".to_string(),
            LabelOrigin::Config,
        );

        let labels = host.labels.read();
        instance.format_host_labels(&labels);
        assert_eq!(
            instance.labels,
            b"\"labels\":{\"note\":\"say \\\"hi\\\"\\n\"},"
        );
    }

    #[test]
    fn local_host_substitution() {
        let mut config = JsonExporterConfig::new(Framing::Lines);
        config.host = "remote".to_string();
        config.local_hostname = "edge-gw".to_string();
        config.send_configured_labels = false;
        let mut instance = JsonExportInstance::new(config).unwrap();

        let mut host = HostContext::new("srv1");
        host.is_local = true;

        instance.start_cycle();
        instance.format_metric_collected(&host, &cpu_chart(), &user_dimension());
        let body = instance.close_batch();
        let text = std::str::from_utf8(body.as_bytes()).unwrap();
        assert!(text.starts_with("{\"prefix\":\"netdata\",\"hostname\":\"edge-gw\","));
    }

    #[test]
    fn chart_fields_escaped() {
        let mut instance = line_instance();
        let host = HostContext::new("srv1");
        let mut chart = cpu_chart();
        chart.units = "bits\"/s".to_string();

        instance.start_cycle();
        instance.format_metric_collected(&host, &chart, &user_dimension());
        let body = instance.close_batch();
        let text = std::str::from_utf8(body.as_bytes()).unwrap();
        assert!(text.contains("\"units\":\"bits\\\"/s\","));
    }
}
