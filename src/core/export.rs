use crate::models::{Neighbor, RadiusTier};
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

/// Errors while serializing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One spreadsheet row of a neighbor export.
///
/// Column names and order are fixed for compatibility with the dashboards
/// and spreadsheet tooling that consume the download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Distance_KM")]
    pub distance_km: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Coordinates")]
    pub coordinates: String,
}

/// Flatten neighbors into export rows: one row per neighbor, order
/// preserved, distance formatted to two decimal places. Pure formatting,
/// no filtering.
pub fn project_rows(neighbors: &[Neighbor]) -> Vec<ExportRow> {
    neighbors
        .iter()
        .map(|n| ExportRow {
            id: n.id.clone(),
            name: n.name.clone(),
            distance_km: format!("{:.2}", n.distance_km),
            status: n.status.as_str().to_string(),
            coordinates: format!("{}, {}", n.lat, n.lng),
        })
        .collect()
}

/// Serialize rows into a CSV sink
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    // serde emits the header with the first record; an empty export still
    // needs one for spreadsheet tools
    if rows.is_empty() {
        wtr.write_record(["ID", "Name", "Distance_KM", "Status", "Coordinates"])?;
    }

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// CSV document as bytes, ready for an HTTP attachment body
pub fn csv_bytes(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    Ok(buf)
}

/// Download name for an export: `neighbors_of_{siteId}_{tier}.csv`
pub fn export_filename(site_id: &str, tier: &RadiusTier) -> String {
    format!("neighbors_of_{}_{}.csv", site_id, tier.slug())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteStatus;

    fn create_neighbor(id: &str, distance_km: f64) -> Neighbor {
        Neighbor {
            id: id.to_string(),
            name: format!("Transformer {}", id),
            lat: 12.9716,
            lng: 77.5946,
            address: "Bangalore".to_string(),
            status: SiteStatus::Active,
            distance_km,
        }
    }

    #[test]
    fn test_one_row_per_neighbor_in_order() {
        let neighbors = vec![
            create_neighbor("TR-1001", 1.5),
            create_neighbor("TR-1002", 3.25),
            create_neighbor("TR-1003", 4.0),
        ];

        let rows = project_rows(&neighbors);

        assert_eq!(rows.len(), neighbors.len());
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["TR-1001", "TR-1002", "TR-1003"]);
    }

    #[test]
    fn test_distance_formatted_to_two_decimals() {
        let rows = project_rows(&[create_neighbor("TR-1001", 1.23456)]);
        assert_eq!(rows[0].distance_km, "1.23");

        let rows = project_rows(&[create_neighbor("TR-1001", 0.0)]);
        assert_eq!(rows[0].distance_km, "0.00");
    }

    #[test]
    fn test_coordinates_and_status_columns() {
        let mut neighbor = create_neighbor("TR-1001", 2.0);
        neighbor.status = SiteStatus::Alert;

        let rows = project_rows(&[neighbor]);

        assert_eq!(rows[0].coordinates, "12.9716, 77.5946");
        assert_eq!(rows[0].status, "alert");
    }

    #[test]
    fn test_csv_header_and_records() {
        let rows = project_rows(&[create_neighbor("TR-1001", 1.5)]);
        let csv = String::from_utf8(csv_bytes(&rows).unwrap()).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Name,Distance_KM,Status,Coordinates")
        );
        assert_eq!(
            lines.next(),
            Some("TR-1001,Transformer TR-1001,1.50,active,\"12.9716, 77.5946\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = String::from_utf8(csv_bytes(&[]).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), "ID,Name,Distance_KM,Status,Coordinates");
    }

    #[test]
    fn test_export_filename() {
        let tier = RadiusTier {
            min_km: 5.0,
            max_km: Some(10.0),
        };
        assert_eq!(
            export_filename("TR-1000", &tier),
            "neighbors_of_TR-1000_5-10km.csv"
        );
    }
}
