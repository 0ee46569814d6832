// InfluxDB repository implementation
use crate::application::record_repository::RecordRepository;
use crate::domain::record::{RawRecord, SensorRecord};
use crate::infrastructure::config::InfluxSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const WRITE_BATCH_SIZE: usize = 5000;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl InfluxRepository {
    pub fn new(settings: &InfluxSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            database: settings.database.clone(),
            retention_policy: settings.retention_policy.clone(),
            measurement: settings.measurement.clone(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host,
            urlencoding::encode(&self.database),
            urlencoding::encode(&self.retention_policy),
            urlencoding::encode(query)
        )
    }

    fn build_write_url(&self) -> String {
        format!(
            "{}/write?db={}&rp={}&precision=ms",
            self.host,
            urlencoding::encode(&self.database),
            urlencoding::encode(&self.retention_policy)
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        tracing::debug!("Executing InfluxQL query: {}", query);
        let request = self.client.get(self.build_query_url(query));
        self.send_query(request).await
    }

    /// Statements that modify data must be POSTed
    async fn execute_statement(&self, statement: &str) -> Result<InfluxQLResponse> {
        tracing::debug!("Executing InfluxQL statement: {}", statement);
        let request = self.client.post(self.build_query_url(statement));
        self.send_query(request).await
    }

    async fn send_query(&self, request: reqwest::RequestBuilder) -> Result<InfluxQLResponse> {
        let response = request
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    fn select_base(&self, machine_id: i64) -> String {
        format!(
            "SELECT * FROM {} WHERE \"lathe_id\" = '{}' ORDER BY time DESC",
            quote_identifier(&self.measurement),
            machine_id
        )
    }

    async fn select_all(&self, machine_id: i64) -> Result<Vec<SensorRecord>> {
        let response = self.execute_query(&self.select_base(machine_id)).await?;
        let (records, quarantined) = decode_records(&response);
        if quarantined > 0 {
            tracing::warn!(
                lathe_id = machine_id,
                quarantined,
                records = records.len(),
                "Skipped records that failed validation"
            );
        }
        Ok(records)
    }

    /// Newest `limit` valid records. Rows rejected by validation do not count
    /// towards the window, so further pages are read until it is full or the
    /// history runs out.
    async fn select_window(&self, machine_id: i64, limit: usize) -> Result<Vec<SensorRecord>> {
        let base = self.select_base(machine_id);
        let mut window = WindowFill::new(limit);

        while let Some((page_size, offset)) = window.next_page() {
            let query = format!("{} LIMIT {} OFFSET {}", base, page_size, offset);
            let response = self.execute_query(&query).await?;
            let (records, quarantined) = decode_records(&response);
            window.absorb(page_size, records, quarantined);
        }

        if window.quarantined > 0 {
            tracing::warn!(
                lathe_id = machine_id,
                quarantined = window.quarantined,
                window = window.records.len(),
                requested = limit,
                "Skipped records that failed validation"
            );
        }
        Ok(window.records)
    }
}

/// Paging state for a window of valid records read newest first
#[derive(Debug)]
struct WindowFill {
    limit: usize,
    rows_read: usize,
    quarantined: usize,
    exhausted: bool,
    records: Vec<SensorRecord>,
}

impl WindowFill {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            rows_read: 0,
            quarantined: 0,
            exhausted: false,
            records: Vec::with_capacity(limit),
        }
    }

    /// `(LIMIT, OFFSET)` of the next page, sized to the current shortfall
    fn next_page(&self) -> Option<(usize, usize)> {
        let missing = self.limit.saturating_sub(self.records.len());
        if self.exhausted || missing == 0 {
            None
        } else {
            Some((missing, self.rows_read))
        }
    }

    fn absorb(&mut self, page_size: usize, records: Vec<SensorRecord>, quarantined: usize) {
        let rows = records.len() + quarantined;
        self.rows_read += rows;
        self.quarantined += quarantined;
        self.exhausted = rows < page_size;
        self.records.extend(records);
    }
}

#[async_trait]
impl RecordRepository for InfluxRepository {
    async fn list_machine_ids(&self) -> Result<Vec<i64>> {
        let query = format!(
            "SHOW TAG VALUES FROM {} WITH KEY = \"lathe_id\"",
            quote_identifier(&self.measurement)
        );
        let response = self.execute_query(&query).await?;

        let mut ids = Vec::new();
        for series in response.results.iter().flat_map(|r| r.series.iter().flatten()) {
            for value_row in &series.values {
                match value_row.get(1).and_then(Value::as_str).map(str::parse::<i64>) {
                    Some(Ok(id)) => ids.push(id),
                    Some(Err(_)) => tracing::warn!("Ignoring non-numeric lathe_id tag: {:?}", value_row),
                    None => {}
                }
            }
        }
        ids.sort_unstable();
        ids.dedup();

        Ok(ids)
    }

    async fn machine_exists(&self, machine_id: i64) -> Result<bool> {
        Ok(self.list_machine_ids().await?.contains(&machine_id))
    }

    async fn fetch_recent(&self, machine_id: i64, limit: usize) -> Result<Vec<SensorRecord>> {
        self.select_window(machine_id, limit).await
    }

    async fn fetch_all(&self, machine_id: i64) -> Result<Vec<SensorRecord>> {
        self.select_all(machine_id).await
    }

    async fn write_records(&self, machine_id: i64, records: &[SensorRecord]) -> Result<()> {
        let delete = format!(
            "DELETE FROM {} WHERE \"lathe_id\" = '{}'",
            quote_identifier(&self.measurement),
            machine_id
        );
        self.execute_statement(&delete)
            .await
            .with_context(|| format!("Failed to clear history of lathe {}", machine_id))?;

        for batch in records.chunks(WRITE_BATCH_SIZE) {
            let body = batch
                .iter()
                .map(|r| to_line_protocol(&self.measurement, r))
                .collect::<Vec<_>>()
                .join("\n");

            let response = self
                .client
                .post(self.build_write_url())
                .header("Authorization", format!("Token {}", self.token))
                .body(body)
                .send()
                .await
                .context("Failed to send write to InfluxDB")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("InfluxDB write failed with status {}: {}", status, body);
            }
        }

        tracing::info!(lathe_id = machine_id, records = records.len(), "Wrote lathe history");
        Ok(())
    }
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\\\""))
}

/// Escape a measurement name, tag key or tag value for line protocol
fn escape_key(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Encode a record as one line-protocol point with millisecond precision
pub fn to_line_protocol(measurement: &str, record: &SensorRecord) -> String {
    let mut fields = vec![
        format!("air_temperature={}", record.air_temperature),
        format!("process_temperature={}", record.process_temperature),
        format!("rotational_speed={}", record.rotational_speed),
        format!("torque={}", record.torque),
        format!("tool_wear={}", record.tool_wear),
        format!("failed={}", record.failed),
        format!("health_score={}", record.health_score),
    ];
    if let Some(vibration) = record.vibration {
        fields.push(format!("vibration={}", vibration));
    }
    if let Some(uptime) = record.uptime {
        fields.push(format!("uptime={}", uptime));
    }

    format!(
        "{},lathe_id={},product_type={} {} {}",
        escape_key(measurement),
        record.machine_id,
        escape_key(&record.product_type),
        fields.join(","),
        record.timestamp.timestamp_millis()
    )
}

/// Decode every row of a SELECT response; returns the valid records and the
/// number of rows rejected by validation
fn decode_records(response: &InfluxQLResponse) -> (Vec<SensorRecord>, usize) {
    let mut records = Vec::new();
    let mut quarantined = 0;

    for series in response.results.iter().flat_map(|r| r.series.iter().flatten()) {
        for row in &series.values {
            let raw = row_to_raw(&series.columns, row);
            match SensorRecord::try_from(raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!("Quarantined row {:?}: {}", row, e);
                    quarantined += 1;
                }
            }
        }
    }

    (records, quarantined)
}

fn row_to_raw(columns: &[String], row: &[Value]) -> RawRecord {
    let mut raw = RawRecord::default();

    for (column, value) in columns.iter().zip(row) {
        match column.as_str() {
            "time" => {
                raw.timestamp = value
                    .as_str()
                    .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                    .map(|t| t.with_timezone(&chrono::Utc));
            }
            "lathe_id" => {
                raw.machine_id = match value {
                    Value::String(s) => s.parse().ok(),
                    other => other.as_i64(),
                };
            }
            "product_type" => raw.product_type = value.as_str().map(str::to_string),
            "failed" => {
                raw.failed = match value {
                    Value::Bool(b) => Some(*b),
                    other => other.as_f64().map(|f| f != 0.0),
                };
            }
            "air_temperature" => raw.air_temperature = value.as_f64(),
            "process_temperature" => raw.process_temperature = value.as_f64(),
            "rotational_speed" => raw.rotational_speed = value.as_f64(),
            "torque" => raw.torque = value.as_f64(),
            "tool_wear" => raw.tool_wear = value.as_f64(),
            "vibration" => raw.vibration = value.as_f64(),
            "health_score" => raw.health_score = value.as_f64(),
            "uptime" => raw.uptime = value.as_f64(),
            _ => {}
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::fixtures::record;

    fn settings() -> InfluxSettings {
        InfluxSettings {
            host: "http://influx:8086/".to_string(),
            token: "t".to_string(),
            database: "lathe maintenance".to_string(),
            retention_policy: "autogen".to_string(),
            measurement: "lathe_records".to_string(),
        }
    }

    #[test]
    fn test_query_url_is_encoded() {
        let repo = InfluxRepository::new(&settings());
        let url = repo.build_query_url("SELECT * FROM \"lathe_records\"");
        assert_eq!(
            url,
            "http://influx:8086/query?db=lathe%20maintenance&rp=autogen&q=SELECT%20%2A%20FROM%20%22lathe_records%22"
        );
        assert_eq!(
            repo.build_write_url(),
            "http://influx:8086/write?db=lathe%20maintenance&rp=autogen&precision=ms"
        );
    }

    #[test]
    fn test_line_protocol() {
        let mut r = record(3, 0, 87.5);
        r.product_type = "Type H".to_string();
        r.vibration = Some(12.25);
        let line = to_line_protocol("lathe_records", &r);
        assert_eq!(
            line,
            format!(
                "lathe_records,lathe_id=3,product_type=Type\\ H air_temperature=300,process_temperature=310,\
                 rotational_speed=1500,torque=40,tool_wear=100,failed=false,health_score=87.5,vibration=12.25,\
                 uptime=90 {}",
                r.timestamp.timestamp_millis()
            )
        );
    }

    #[test]
    fn test_line_protocol_omits_absent_optional_fields() {
        let mut r = record(1, 0, 60.0);
        r.uptime = None;
        let line = to_line_protocol("lathe_records", &r);
        assert!(!line.contains("uptime="));
        assert!(!line.contains("vibration="));
    }

    #[test]
    fn test_decode_records_quarantines_invalid_rows() {
        let body = serde_json::json!({
            "results": [{
                "series": [{
                    "name": "lathe_records",
                    "columns": [
                        "time", "air_temperature", "failed", "health_score", "lathe_id",
                        "process_temperature", "product_type", "rotational_speed",
                        "tool_wear", "torque", "uptime", "vibration"
                    ],
                    "values": [
                        ["2024-05-01T12:00:00Z", 300.5, true, 72.0, "2", 310.1, "M", 1490.0, 20.0, 41.0, null, 3.5],
                        ["2024-05-01T11:00:00Z", 301.0, false, 88.0, "2", 311.0, "L", 1510.0, 21.0, null, 95.0, null]
                    ]
                }]
            }]
        });
        let response: InfluxQLResponse = serde_json::from_value(body).unwrap();

        let (records, quarantined) = decode_records(&response);
        assert_eq!(quarantined, 1);
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.machine_id, 2);
        assert!(r.failed);
        assert_eq!(r.product_type, "M");
        assert_eq!(r.uptime, None);
        assert_eq!(r.vibration, Some(3.5));
        assert_eq!(r.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_window_reads_past_quarantined_rows() {
        let mut window = WindowFill::new(3);
        assert_eq!(window.next_page(), Some((3, 0)));

        // one of the three newest rows is invalid
        window.absorb(3, vec![record(1, 0, 80.0), record(1, 2, 80.0)], 1);
        assert_eq!(window.next_page(), Some((1, 3)));

        window.absorb(1, vec![record(1, 3, 70.0)], 0);
        assert_eq!(window.next_page(), None);
        assert_eq!(window.records.len(), 3);
        assert_eq!(window.quarantined, 1);
        assert_eq!(window.records[2].health_score, 70.0);
    }

    #[test]
    fn test_window_stops_when_history_runs_out() {
        let mut window = WindowFill::new(5);
        window.absorb(5, vec![record(1, 0, 80.0)], 2);
        assert_eq!(window.next_page(), None);
        assert_eq!(window.records.len(), 1);
        assert_eq!(window.rows_read, 3);
    }

    #[test]
    fn test_zero_window_reads_nothing() {
        assert_eq!(WindowFill::new(0).next_page(), None);
    }

    #[test]
    fn test_empty_result_decodes_to_nothing() {
        let response: InfluxQLResponse =
            serde_json::from_value(serde_json::json!({ "results": [{ "statement_id": 0 }] })).unwrap();
        let (records, quarantined) = decode_records(&response);
        assert!(records.is_empty());
        assert_eq!(quarantined, 0);
    }
}
