//! Label table export
//!
//! Writes one CSV row per graph with its category, cluster and embedding
//! coordinates, for downstream per-cluster analysis.

use crate::encode::VisualRecord;
use crate::error::AnalysisResult;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct LabelRow<'a> {
    graph_id: &'a str,
    category: &'a str,
    cluster: usize,
    x: f64,
    y: f64,
}

/// Write the label table to any writer
pub fn write_labels<W: Write>(writer: W, records: &[VisualRecord]) -> AnalysisResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(LabelRow {
            graph_id: &record.graph_id,
            category: &record.category,
            cluster: record.cluster_label,
            x: record.x,
            y: record.y,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the label table to a file
pub fn write_labels_csv<P: AsRef<Path>>(path: P, records: &[VisualRecord]) -> AnalysisResult<()> {
    let file = std::fs::File::create(path)?;
    write_labels(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Marker;

    #[test]
    fn test_write_labels() {
        let records = vec![
            VisualRecord {
                graph_id: "karate".to_string(),
                category: "Social Networks".to_string(),
                cluster_label: 2,
                x: 1.5,
                y: -0.25,
                color: "#1f77b4".to_string(),
                marker: Marker::Diamond,
            },
            VisualRecord {
                graph_id: "a,b".to_string(),
                category: "Web".to_string(),
                cluster_label: 0,
                x: 0.0,
                y: 3.0,
                color: "#aec7e8".to_string(),
                marker: Marker::Triangle,
            },
        ];
        let mut buf = Vec::new();
        write_labels(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "graph_id,category,cluster,x,y");
        assert_eq!(lines[1], "karate,Social Networks,2,1.5,-0.25");
        assert_eq!(lines[2], "\"a,b\",Web,0,0.0,3.0");
    }
}
