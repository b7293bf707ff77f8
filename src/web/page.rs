//! Server-rendered file browser page.
//!
//! The page lists the files it was rendered with. Uploads and deletes go
//! through the JSON API from a small inline script, which reloads the page on
//! success so the listing is fetched again.

use crate::{models::file::FileDescriptor, web::format::format_file_size};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>MinIO File Storage</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 56rem; margin: 3rem auto; padding: 0 1rem; }
  .files { background: #fff; border-radius: .5rem; box-shadow: 0 1px 3px rgba(0,0,0,.15); padding: 1.5rem; }
  .files ul { list-style: none; padding: 0; margin: 0; }
  .files li { display: flex; justify-content: space-between; align-items: center; padding: .75rem; margin-bottom: .5rem; background: #f9fafb; border-radius: .25rem; }
  .files li:hover { background: #f3f4f6; }
  .name { display: block; color: #111827; overflow: hidden; text-overflow: ellipsis; }
  .size, .empty { color: #6b7280; font-size: .875rem; }
  .uploading { color: #3b82f6; }
  .error { color: #ef4444; }
  button { background: none; border: 0; cursor: pointer; font-size: .875rem; padding: .25rem .75rem; }
  .download { color: #2563eb; }
  .delete { color: #dc2626; }
</style>
</head>
<body>
<main>
<h1>MinIO File Storage</h1>
"#;

const PAGE_SCRIPT: &str = r#"<script>
const input = document.getElementById('file-input');
const uploading = document.getElementById('uploading');
const errorLine = document.getElementById('error');

function showError(message, err) {
  errorLine.textContent = message;
  errorLine.hidden = false;
  console.error(err);
}

input.addEventListener('change', async () => {
  const file = input.files[0];
  if (!file) return;
  input.disabled = true;
  uploading.hidden = false;
  errorLine.hidden = true;
  const form = new FormData();
  form.append('file', file);
  try {
    const response = await fetch('/api/upload', { method: 'POST', body: form });
    if (!response.ok) throw new Error('Upload failed');
    window.location.reload();
  } catch (err) {
    showError('Error uploading file', err);
  } finally {
    input.disabled = false;
    uploading.hidden = true;
  }
});

document.querySelectorAll('[data-download]').forEach((button) => {
  button.addEventListener('click', () => {
    window.open('/api/download/' + encodeURIComponent(button.dataset.download), '_blank');
  });
});

document.querySelectorAll('[data-delete]').forEach((button) => {
  button.addEventListener('click', async () => {
    try {
      const response = await fetch('/api/delete/' + encodeURIComponent(button.dataset.delete), { method: 'DELETE' });
      if (!response.ok) throw new Error('Delete failed');
      window.location.reload();
    } catch (err) {
      showError('Error deleting file', err);
    }
  });
});
</script>
"#;

/// Render the index page for `files`, with `error` shown under the upload input.
pub fn render_index(files: &[FileDescriptor], error: Option<&str>) -> String {
    let mut html = String::from(PAGE_HEAD);

    html.push_str("<section class=\"upload\">\n");
    html.push_str("<label><span hidden>Choose file</span><input type=\"file\" id=\"file-input\"></label>\n");
    html.push_str("<p id=\"uploading\" class=\"uploading\" hidden>Uploading...</p>\n");
    match error {
        Some(message) => html.push_str(&format!(
            "<p id=\"error\" class=\"error\">{}</p>\n",
            html_escape(message)
        )),
        None => html.push_str("<p id=\"error\" class=\"error\" hidden></p>\n"),
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"files\">\n<h2>Files</h2>\n");
    if files.is_empty() {
        html.push_str("<p class=\"empty\">No files uploaded yet</p>\n");
    } else {
        html.push_str("<ul>\n");
        for file in files {
            let name = html_escape(&file.name);
            html.push_str(&format!(
                concat!(
                    "<li><div><span class=\"name\" title=\"{name}\">{name}</span>",
                    "<span class=\"size\">{size}</span></div>",
                    "<div><button class=\"download\" data-download=\"{name}\">Download</button>",
                    "<button class=\"delete\" data-delete=\"{name}\">Delete</button></div></li>\n"
                ),
                name = name,
                size = format_file_size(file.size),
            ));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n</main>\n");

    html.push_str(PAGE_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
