//! Interactive map of a grouping, as a standalone Leaflet page.
//!
//! Points are drawn as pins colored after their group and gathered in a
//! marker cluster layer, so that dense areas stay readable when zoomed out.
//! Centers are drawn on the map itself as larger circles with a black
//! outline.  Coordinates are expected to be latitude/longitude pairs.

use crate::palette::group_color;
use geogroup::Point2D;
use geogroup::PointSet;
use serde::Serialize;
use std::io;

/// Zoom level of the map when opened.
pub const ZOOM: u8 = 11;

const LEAFLET_VERSION: &str = "1.9.4";
const MARKERCLUSTER_VERSION: &str = "1.5.3";

#[derive(Debug, Serialize)]
struct Marker<'a> {
    lat: f64,
    lng: f64,
    color: &'static str,
    popup: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct MapData<'a> {
    center: [f64; 2],
    zoom: u8,
    points: Vec<Marker<'a>>,
    centers: Vec<Marker<'a>>,
}

/// Serializes `data` so that it can sit inside a `<script>` element.
fn script_json(data: &MapData<'_>) -> io::Result<String> {
    let json = serde_json::to_string(data)?;
    Ok(json.replace("</", "<\\/"))
}

/// Writes an HTML page showing the points of `points`, colored after their
/// group, and the centers of the groups.
///
/// The map is centered on the mean of the points.
pub fn write<W>(
    mut w: W,
    points: &PointSet,
    assignment: &[usize],
    centers: &[Point2D],
) -> io::Result<()>
where
    W: io::Write,
{
    let center = points.mean().unwrap_or_else(Point2D::zeros);

    let data = MapData {
        center: [center.x, center.y],
        zoom: ZOOM,
        points: points
            .positions()
            .iter()
            .zip(points.labels())
            .zip(assignment)
            .map(|((position, label), &group)| Marker {
                lat: position.x,
                lng: position.y,
                color: group_color(group).hex,
                popup: format!("Cluster: {group}"),
                label,
            })
            .collect(),
        centers: centers
            .iter()
            .enumerate()
            .map(|(group, position)| Marker {
                lat: position.x,
                lng: position.y,
                color: group_color(group).hex,
                popup: format!("Center {group}"),
                label: None,
            })
            .collect(),
    };
    let data = script_json(&data)?;

    write!(
        w,
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Delivery groups</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@{MARKERCLUSTER_VERSION}/dist/MarkerCluster.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@{MARKERCLUSTER_VERSION}/dist/MarkerCluster.Default.css">
<script src="https://unpkg.com/leaflet.markercluster@{MARKERCLUSTER_VERSION}/dist/leaflet.markercluster.js"></script>
<style>
html, body, #map {{ height: 100%; margin: 0; }}
.group-pin {{ width: 14px; height: 14px; border-radius: 50% 50% 50% 0; transform: rotate(-45deg); border: 1px solid #fff; }}
</style>
</head>
<body>
<div id="map"></div>
<script>
const data = {data};
const map = L.map("map").setView(data.center, data.zoom);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors",
}}).addTo(map);
function popup(marker) {{
  const div = document.createElement("div");
  div.textContent = marker.label === undefined
    ? marker.popup
    : marker.popup + " (" + marker.label + ")";
  return div;
}}
function pin(color) {{
  const span = document.createElement("span");
  span.className = "group-pin";
  span.style.background = color;
  span.style.display = "block";
  return L.divIcon({{ html: span, className: "", iconSize: [14, 14], iconAnchor: [0, 14] }});
}}
const cluster = L.markerClusterGroup();
for (const p of data.points) {{
  cluster.addLayer(L.marker([p.lat, p.lng], {{ icon: pin(p.color) }}).bindPopup(popup(p)));
}}
cluster.addTo(map);
for (const c of data.centers) {{
  L.circleMarker([c.lat, c.lng], {{
    radius: 10, color: "black", fillColor: c.color, fillOpacity: 0.7, weight: 2,
  }}).bindPopup(popup(c)).addTo(map);
}}
</script>
</body>
</html>
"#
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geogroup::Point;

    fn page(points: &PointSet, assignment: &[usize], centers: &[Point2D]) -> String {
        let mut out = Vec::new();
        write(&mut out, points, assignment, centers).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write() {
        let points = PointSet::from_points([
            Point::new(12.5, 77.5).with_label("A-1"),
            Point::new(13.5, 77.25),
        ]);
        let centers = [Point2D::new(12.5, 77.5), Point2D::new(13.5, 77.25)];
        let html = page(&points, &[0, 1], &centers);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#""center":[13.0,77.375]"#));
        assert!(html.contains(r#""zoom":11"#));
        assert!(html.contains(r#""popup":"Cluster: 0","label":"A-1""#));
        assert!(html.contains(r#""popup":"Cluster: 1"}"#));
        assert!(html.contains(r#""popup":"Center 1""#));
        assert!(html.contains(r##""color":"#38aadd""##));
        assert!(html.contains("radius: 10"));
    }

    #[test]
    fn test_points_are_clustered() {
        let points = PointSet::from_points([Point::new(1., 2.), Point::new(1.5, 2.5)]);
        let html = page(&points, &[0, 0], &[Point2D::new(1.25, 2.25)]);

        assert!(html.contains("leaflet.markercluster.js"));
        assert!(html.contains("MarkerCluster.Default.css"));
        assert!(html.contains("L.markerClusterGroup()"));
        assert!(html.contains("cluster.addLayer(L.marker("));
        // Centers stay out of the cluster layer.
        assert!(html.contains("}).bindPopup(popup(c)).addTo(map);"));
    }

    #[test]
    fn test_labels_cannot_close_the_script() {
        let points = PointSet::from_points([Point::new(0., 0.).with_label("</script><b>")]);
        let html = page(&points, &[0], &[Point2D::zeros()]);
        assert_eq!(html.matches("</script>").count(), 3);
        assert!(html.contains(r#"<\/script><b>"#));
    }
}
