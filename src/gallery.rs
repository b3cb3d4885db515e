//! Static HTML rendering of a [`ShellView`].
//!
//! Produces one self-contained page: header, drop zone, the loading
//! indicator or error banner, and a grid of cards, each holding a preview
//! and a `Download Page N` link whose `download` attribute is `page-N.jpg`.
//! The images are inlined as data URIs, so the file works offline.

use crate::controller::{Phase, ShellView};
use std::fmt::Write as _;

pub const TITLE: &str = "PDF → JPG Converter";
pub const SUBTITLE: &str = "Client-side · Fast · Secure";
pub const LOADING_TEXT: &str = "Converting PDF...";

const STYLE: &str = r#"
@keyframes spin { 0% { transform: rotate(0deg); } 100% { transform: rotate(360deg); } }
* { box-sizing: border-box; }
body { margin: 0; }
.page { min-height: 100vh; background: linear-gradient(135deg, #e0e7ff, #f8fafc); display: flex; justify-content: center; align-items: center; padding: clamp(16px, 3vw, 40px); font-family: system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; width: 100%; }
.card { width: 100%; max-width: 95vw; background: #ffffff; border-radius: 16px; padding: clamp(20px, 5vw, 40px); box-shadow: 0 20px 40px rgba(0, 0, 0, 0.1); margin: 0 auto; }
.title { text-align: center; font-size: clamp(24px, 4vw, 32px); font-weight: 700; color: #1f2937; margin: 0 0 8px 0; }
.subtitle { text-align: center; color: #6b7280; font-size: clamp(14px, 2vw, 16px); margin: 0 0 30px 0; }
.drop-zone { position: relative; border: 2px dashed #c7d2fe; background: #f8fafc; border-radius: 14px; padding: clamp(30px, 5vw, 50px); text-align: center; cursor: pointer; transition: all 0.3s ease; }
.drop-zone.active { border-color: #4f46e5; background: #eef2ff; }
.drop-text { font-size: clamp(14px, 2.5vw, 18px); font-weight: 500; color: #374151; margin: 0 0 8px 0; }
.or { display: block; margin: 12px 0; color: #9ca3af; font-size: 14px; }
.button { padding: 12px 24px; border-radius: 10px; border: none; background: #4f46e5; color: #fff; font-size: clamp(13px, 2vw, 15px); font-weight: 600; }
.loader-wrap { text-align: center; margin-top: 30px; padding: 20px; }
.spinner { width: 40px; height: 40px; border: 4px solid #e5e7eb; border-top: 4px solid #4f46e5; border-radius: 50%; margin: 0 auto 15px; animation: spin 1s linear infinite; }
.loading-text { color: #6b7280; font-size: 15px; font-weight: 500; margin: 0; }
.error { margin-top: 30px; padding: 16px; border-radius: 10px; background: #fef2f2; border: 1px solid #fecaca; color: #b91c1c; text-align: center; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(min(100%, 250px), 1fr)); gap: clamp(16px, 3vw, 24px); margin-top: 30px; }
.image-card { border: 1px solid #e5e7eb; border-radius: 12px; padding: 16px; background: #f9fafb; text-align: center; }
.image-card img { width: 100%; height: auto; border-radius: 8px; margin-bottom: 12px; display: block; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.08); }
.download { display: inline-block; padding: 10px 16px; background: #22c55e; color: #fff; border-radius: 8px; text-decoration: none; font-size: clamp(12px, 2vw, 14px); font-weight: 600; }
"#;

/// Render the whole view as a standalone HTML document.
pub fn render_html(view: &ShellView) -> String {
    let payload: usize = view.images.iter().map(|i| i.data_uri.len() + 256).sum();
    let mut html = String::with_capacity(4096 + payload);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(TITLE));
    let _ = writeln!(html, "<style>{}</style>", STYLE);
    html.push_str("</head>\n<body>\n<div class=\"page\">\n<div class=\"card\">\n");

    let _ = writeln!(html, "<h2 class=\"title\">{}</h2>", escape_html(TITLE));
    let _ = writeln!(html, "<p class=\"subtitle\">{}</p>", escape_html(SUBTITLE));

    let zone_class = if view.highlight {
        "drop-zone active"
    } else {
        "drop-zone"
    };
    let _ = writeln!(html, "<div class=\"{}\">", zone_class);
    html.push_str("<p class=\"drop-text\">Drag &amp; drop PDF here</p>\n");
    html.push_str("<span class=\"or\">or</span>\n");
    html.push_str("<button class=\"button\">Browse File</button>\n</div>\n");

    match &view.phase {
        Phase::Loading => {
            html.push_str("<div class=\"loader-wrap\">\n<div class=\"spinner\"></div>\n");
            let _ = writeln!(
                html,
                "<p class=\"loading-text\">{}</p>\n</div>",
                escape_html(LOADING_TEXT)
            );
        }
        Phase::Error(message) => {
            let _ = writeln!(
                html,
                "<div class=\"error\" role=\"alert\">{}</div>",
                escape_html(message)
            );
        }
        Phase::Idle | Phase::Ready => {}
    }

    html.push_str("<div class=\"grid\">\n");
    for image in view.images.iter() {
        let src = escape_html(&image.data_uri);
        let _ = writeln!(
            html,
            "<div class=\"image-card\">\n<img src=\"{src}\" alt=\"\" width=\"{w}\" height=\"{h}\">\n\
             <a class=\"download\" href=\"{src}\" download=\"{name}\">Download Page {n}</a>\n</div>",
            w = image.width,
            h = image.height,
            name = image.download_filename(),
            n = image.page_num,
        );
    }
    html.push_str("</div>\n</div>\n</div>\n</body>\n</html>\n");
    html
}

/// Escape text for use in HTML element content or a double-quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
