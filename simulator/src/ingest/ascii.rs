use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use hvsrcore::Record;
use std::fs;
use std::path::Path;

/// Parses a three-column text record.
///
/// Leading `# key: value` comments may carry `sample_rate` and `start_time`
/// (RFC 3339). Each remaining non-empty line holds the NS, EW and UD samples,
/// separated by commas or whitespace. A single non-numeric column header
/// before the first row is skipped.
pub fn parse_ascii_record(text: &str, fallback_sample_rate: Option<f64>) -> anyhow::Result<Record> {
    let mut sample_rate = None;
    let mut start_time: Option<DateTime<Utc>> = None;
    let mut channels: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut header_skipped = false;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if let Some((key, value)) = comment.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "sample_rate" => {
                        sample_rate = Some(value.parse::<f64>().with_context(|| {
                            format!("line {}: bad sample_rate {:?}", number + 1, value)
                        })?);
                    }
                    "start_time" => {
                        let parsed = DateTime::parse_from_rfc3339(value).with_context(|| {
                            format!("line {}: bad start_time {:?}", number + 1, value)
                        })?;
                        start_time = Some(parsed.with_timezone(&Utc));
                    }
                    _ => {}
                }
            }
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .collect();
        let parsed: Result<Vec<f64>, _> = fields.iter().map(|field| field.parse::<f64>()).collect();
        match parsed {
            Ok(values) if values.len() == 3 => {
                for (channel, value) in channels.iter_mut().zip(values) {
                    channel.push(value);
                }
            }
            Ok(values) => bail!(
                "line {}: expected 3 columns, found {}",
                number + 1,
                values.len()
            ),
            Err(_) if !header_skipped && channels[0].is_empty() => header_skipped = true,
            Err(err) => bail!("line {}: {}", number + 1, err),
        }
    }

    let sample_rate = sample_rate
        .or(fallback_sample_rate)
        .ok_or_else(|| anyhow!("no sample_rate header and no fallback sample rate given"))?;
    let [ns, ew, ud] = channels;
    Record::new(sample_rate, start_time.unwrap_or_default(), ns, ew, ud)
        .context("building record from text")
}

pub fn read_ascii_record<P: AsRef<Path>>(
    path: P,
    fallback_sample_rate: Option<f64>,
) -> anyhow::Result<Record> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading record {}", path_ref.display()))?;
    parse_ascii_record(&contents, fallback_sample_rate)
        .with_context(|| format!("parsing record {}", path_ref.display()))
}
