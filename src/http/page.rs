//! HTML listing page.

use htmlescape::{encode_attribute, encode_minimal};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::routing::router::{DOWNLOAD_PREFIX, UPLOAD_PATH};
use crate::storage::Listing;

/// Everything except RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
li{padding:.2rem 0}.dir{color:#666}form{margin:1.5rem 0;padding:1rem;border:1px solid #ccc;border-radius:.5rem}\
.error{color:#b00}";

/// Submits the form with `fetch` and reports the JSON answer inline.
/// Without scripting the form posts normally.
const UPLOAD_SCRIPT: &str = r#"
const form = document.getElementById("upload-form");
const statusLine = document.getElementById("upload-status");
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  statusLine.className = "";
  statusLine.textContent = "Uploading...";
  try {
    const response = await fetch(form.action, { method: "POST", body: new FormData(form) });
    const result = await response.json().catch(() => ({}));
    if (!response.ok) {
      throw new Error(result.error || `Upload failed (${response.status})`);
    }
    statusLine.textContent = result.message;
    setTimeout(() => location.reload(), 1000);
  } catch (err) {
    statusLine.className = "error";
    statusLine.textContent = err.message || "Upload failed";
  }
});
"#;

/// Download link for a file name.
pub fn download_href(name: &str) -> String {
    format!("{DOWNLOAD_PREFIX}{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// Render the listing page with its upload form.
pub fn render_listing(listing: &Listing) -> String {
    let mut html = String::with_capacity(1024 + 128 * (listing.files.len() + listing.dirs.len()));

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Shared files</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>Shared files</h1>\n");

    html.push_str(&format!(
        "<form id=\"upload-form\" method=\"post\" action=\"{UPLOAD_PATH}\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" required>\n\
         <button type=\"submit\">Upload</button>\n\
         <p id=\"upload-status\" role=\"status\"></p>\n</form>\n"
    ));

    if listing.files.is_empty() && listing.dirs.is_empty() {
        html.push_str("<p>No files shared yet.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for dir in &listing.dirs {
            html.push_str(&format!(
                "<li class=\"dir\">{}/</li>\n",
                encode_minimal(dir)
            ));
        }
        for file in &listing.files {
            html.push_str(&format!(
                "<li><a href=\"{}\" download>{}</a></li>\n",
                encode_attribute(&download_href(file)),
                encode_minimal(file)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<script>");
    html.push_str(UPLOAD_SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}
