/// The single page of the editor. Talks to the server over the /api routes
/// and renders the map with Leaflet and its draw toolbar.
pub const MAP_PAGE_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Vector Data Editor</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <link rel="stylesheet" href="https://unpkg.com/leaflet-draw@1.0.4/dist/leaflet.draw.css">
  <style>
    body { font-family: sans-serif; margin: 1.5rem; }
    #map { width: 800px; height: 600px; margin-top: 1rem; }
    #status { color: #555; min-height: 1.2rem; margin-top: 0.5rem; }
    #last-edit { background: #f4f4f4; padding: 0.5rem; max-width: 800px; overflow-x: auto; }
    .controls { display: flex; gap: 0.75rem; align-items: center; flex-wrap: wrap; }
  </style>
</head>
<body>
  <h1>Vector Data Editor</h1>
  <div class="controls">
    <label>
      <input type="checkbox" id="use-default" checked>
      Load default file (nyc_roads.geojson)
    </label>
    <input type="file" id="upload" accept=".geojson,.json,.shp">
    <button id="load">Load</button>
  </div>
  <div id="status"></div>
  <div id="map"></div>
  <h2>Last edit</h2>
  <pre id="last-edit">No edit captured yet.</pre>
  <button id="save">Save Changes</button>
  <a id="download-link" href="/download" download hidden>Download edited_data.geojson</a>

  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="https://unpkg.com/leaflet-draw@1.0.4/dist/leaflet.draw.js"></script>
  <script>
    let map = null;
    let drawnItems = null;

    function setStatus(text) {
      document.getElementById("status").textContent = text;
    }

    function renderMap(payload) {
      if (map !== null) {
        map.remove();
      }
      map = L.map("map").setView(
        [payload.view.center.lat, payload.view.center.lon],
        payload.view.zoom
      );
      L.tileLayer("https://tile.openstreetmap.org/{z}/{x}/{y}.png", {
        attribution: "&copy; OpenStreetMap contributors"
      }).addTo(map);
      const overlay = L.geoJSON(payload.data).addTo(map);
      L.control.layers(null, { "Loaded Data": overlay }).addTo(map);

      drawnItems = new L.FeatureGroup().addTo(map);
      const drawControl = new L.Control.Draw({
        draw: {
          polyline: payload.draw.polyline,
          polygon: payload.draw.polygon,
          rectangle: payload.draw.rectangle,
          circle: payload.draw.circle,
          marker: payload.draw.marker,
          circlemarker: false
        },
        edit: payload.draw.edit ? { featureGroup: drawnItems } : false
      });
      map.addControl(drawControl);

      map.on(L.Draw.Event.CREATED, (event) => {
        drawnItems.addLayer(event.layer);
        captureEdit(event.layer.toGeoJSON());
      });
      map.on(L.Draw.Event.EDITED, (event) => {
        event.layers.eachLayer((layer) => captureEdit(layer.toGeoJSON()));
      });
    }

    async function captureEdit(geojson) {
      const response = await fetch("/api/draw", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(geojson)
      });
      const body = await response.json();
      if (!response.ok) {
        setStatus(body.error);
        return;
      }
      document.getElementById("last-edit").textContent =
        JSON.stringify(body.captured, null, 2);
      setStatus("Edit captured.");
    }

    async function loadData() {
      const useDefault = document.getElementById("use-default").checked;
      const fileInput = document.getElementById("upload");
      let response;
      if (useDefault) {
        response = await fetch("/api/load/default", { method: "POST" });
      } else if (fileInput.files.length > 0) {
        const form = new FormData();
        form.append("file", fileInput.files[0]);
        response = await fetch("/api/load/upload", { method: "POST", body: form });
      } else {
        setStatus("Please upload a vector file to start editing.");
        return;
      }
      const body = await response.json();
      if (!response.ok) {
        setStatus(body.error);
        return;
      }
      renderMap(body);
      document.getElementById("last-edit").textContent = "No edit captured yet.";
      document.getElementById("download-link").hidden = true;
      setStatus("Loaded.");
    }

    async function saveChanges() {
      const response = await fetch("/api/save", { method: "POST" });
      const body = await response.json();
      if (!response.ok) {
        setStatus(body.error);
        return;
      }
      setStatus("Saved to " + body.saved_to);
      document.getElementById("download-link").hidden = false;
    }

    window.addEventListener("DOMContentLoaded", async () => {
      document.getElementById("load").addEventListener("click", loadData);
      document.getElementById("save").addEventListener("click", saveChanges);
      // Pick the view back up after a page reload.
      const response = await fetch("/api/view");
      if (response.ok) {
        renderMap(await response.json());
      }
    });
  </script>
</body>
</html>
"##;
