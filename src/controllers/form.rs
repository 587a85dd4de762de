use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(upload_form))
}

// GET /
async fn upload_form(State(state): State<Arc<AppState>>) -> Response {
    if !state.config.features.enable_web_form {
        return (StatusCode::NOT_FOUND, "web form disabled").into_response();
    }
    Html(UPLOAD_FORM).into_response()
}

// Posts the chosen file to the API and renders the result in place.
const UPLOAD_FORM: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Bus Boarding Sequence Generator</title>
<style>
  body { font-family: sans-serif; max-width: 42rem; margin: 2rem auto; }
  table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
  th, td { border: 1px solid #ccc; padding: .3rem .6rem; text-align: left; }
  #errors li { color: #b00020; }
</style>
</head>
<body>
<h1>Bus Boarding Sequence Generator</h1>
<form id="upload">
  <input type="file" name="file" accept=".csv,.txt,text/csv,text/plain" required>
  <button type="submit">Generate Sequence</button>
</form>
<table id="sequence" hidden>
  <thead><tr><th>Seq</th><th>Booking ID</th><th>Seats</th></tr></thead>
  <tbody></tbody>
</table>
<ul id="errors"></ul>
<script>
const form = document.getElementById('upload');
const table = document.getElementById('sequence');
const errors = document.getElementById('errors');

function cell(row, text) {
  const td = document.createElement('td');
  td.textContent = text;
  row.appendChild(td);
}

function showErrors(list) {
  errors.replaceChildren(...list.map(msg => {
    const li = document.createElement('li');
    li.textContent = msg;
    return li;
  }));
}

form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const body = table.tBodies[0];
  body.replaceChildren();
  table.hidden = true;
  showErrors([]);

  try {
    const res = await fetch('/api/boarding-sequence', { method: 'POST', body: new FormData(form) });
    const data = await res.json();
    if (!res.ok) {
      showErrors([data.error || ('Request failed with status ' + res.status)]);
      return;
    }
    for (const entry of data.sequence) {
      const row = body.insertRow();
      cell(row, entry.Seq);
      cell(row, entry.Booking_ID);
      cell(row, entry.Seats.join(', '));
    }
    table.hidden = data.sequence.length === 0;
    showErrors(data.errors);
  } catch (err) {
    showErrors(['Failed to contact the server: ' + err]);
  }
});
</script>
</body>
</html>
"#;
