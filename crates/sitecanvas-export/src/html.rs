//! HTML generation.
//!
//! Each element becomes an absolutely positioned wrapper holding the markup
//! for its content. Wrappers are emitted in paint order.

use crate::css::{element_anchor, stylesheet};
use crate::options::{ExportFormat, ExportOptions};
use sitecanvas_core::document::CanvasState;
use sitecanvas_core::elements::{Element, ElementContent, ShapeKind};
use sitecanvas_core::settings::ProjectSettings;
use std::fmt::Write;

/// Escape text for use in element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&#39;"),
            _ => s.push(ch),
        }
    }
    s
}

/// Escaped URL for `href`/`src`. Script URLs are replaced with `#`.
fn escape_url(url: &str) -> String {
    let scheme = url.trim_start().to_ascii_lowercase();
    if scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") {
        log::warn!("Dropping script URL from export");
        return "#".to_string();
    }
    escape_html(url)
}

/// Escaped multi-line text with line breaks kept.
fn escape_text(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

fn shape_class(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Rectangle => "rectangle",
        ShapeKind::Circle => "circle",
        ShapeKind::Triangle => "triangle",
        ShapeKind::Diamond => "diamond",
    }
}

/// Markup for an element's content, without the positioning wrapper.
pub fn content_markup(content: &ElementContent) -> String {
    let mut html = String::new();
    match content {
        ElementContent::Heading(h) => {
            let level = h.level.clamp(1, 6);
            let _ = write!(html, "<h{level}>{}</h{level}>", escape_text(&h.text));
        }
        ElementContent::Paragraph(p) => {
            let _ = write!(html, "<p>{}</p>", escape_text(&p.text));
        }
        ElementContent::Button(b) => match &b.href {
            Some(href) => {
                let _ = write!(
                    html,
                    "<a class=\"sc-button\" href=\"{}\">{}</a>",
                    escape_url(href),
                    escape_html(&b.label)
                );
            }
            None => {
                let _ = write!(html, "<button class=\"sc-button\" type=\"button\">{}</button>", escape_html(&b.label));
            }
        },
        ElementContent::Image(img) => {
            let _ = write!(html, "<img src=\"{}\" alt=\"{}\">", escape_url(&img.src), escape_html(&img.alt));
        }
        ElementContent::Shape(shape) => {
            let _ = write!(
                html,
                "<div class=\"sc-shape sc-shape-{}\">{}</div>",
                shape_class(shape.shape),
                escape_html(&shape.label)
            );
        }
        ElementContent::Card(card) => {
            html.push_str("<div class=\"sc-card\">");
            if let Some(image) = &card.image {
                let _ = write!(html, "<img src=\"{}\" alt=\"\">", escape_url(image));
            }
            let _ = write!(html, "<h3>{}</h3>", escape_html(&card.title));
            let _ = write!(html, "<p>{}</p>", escape_text(&card.description));
            if !card.features.is_empty() {
                html.push_str("<ul>");
                for feature in &card.features {
                    let _ = write!(html, "<li>{}</li>", escape_html(feature));
                }
                html.push_str("</ul>");
            }
            if let Some(label) = &card.button_label {
                let _ = write!(html, "<button class=\"sc-button\" type=\"button\">{}</button>", escape_html(label));
            }
            html.push_str("</div>");
        }
        ElementContent::Hero(hero) => {
            match &hero.background_image {
                Some(image) => {
                    let _ = write!(
                        html,
                        "<section class=\"sc-hero\" style=\"background-image: url(&quot;{}&quot;); background-size: cover;\">",
                        escape_url(image)
                    );
                }
                None => html.push_str("<section class=\"sc-hero\">"),
            }
            let _ = write!(html, "<h1>{}</h1>", escape_html(&hero.title));
            let _ = write!(html, "<p>{}</p>", escape_text(&hero.subtitle));
            if let Some(label) = &hero.cta_label {
                let href = hero.cta_href.as_deref().unwrap_or("#");
                let _ = write!(
                    html,
                    "<a class=\"sc-button\" href=\"{}\">{}</a>",
                    escape_url(href),
                    escape_html(label)
                );
            }
            html.push_str("</section>");
        }
        ElementContent::Navbar(nav) => {
            let _ = write!(html, "<nav class=\"sc-navbar\"><span class=\"sc-brand\">{}</span><ul>", escape_html(&nav.brand));
            for item in &nav.items {
                let _ = write!(
                    html,
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_url(&item.href),
                    escape_html(&item.label)
                );
            }
            html.push_str("</ul></nav>");
        }
        ElementContent::Icon(icon) => {
            let _ = write!(html, "<span class=\"sc-icon\" data-icon=\"{}\"></span>", escape_html(&icon.name));
        }
        ElementContent::Divider(divider) => {
            if divider.label.is_empty() {
                html.push_str("<hr>");
            } else {
                let _ = write!(
                    html,
                    "<div class=\"sc-divider\"><hr><span>{}</span><hr></div>",
                    escape_html(&divider.label)
                );
            }
        }
        ElementContent::Container(_) => html.push_str("<div class=\"sc-container\"></div>"),
        ElementContent::Form(form) => {
            html.push_str("<form class=\"sc-form\" onsubmit=\"return false\">");
            if !form.title.is_empty() {
                let _ = write!(html, "<h3>{}</h3>", escape_html(&form.title));
            }
            for field in &form.fields {
                let required = if field.required { " required" } else { "" };
                let _ = write!(html, "<label>{}", escape_html(&field.label));
                if field.field_type == "textarea" {
                    let _ = write!(html, "<textarea{}></textarea>", required);
                } else {
                    let _ = write!(html, "<input type=\"{}\"{}>", escape_html(&field.field_type), required);
                }
                html.push_str("</label>");
            }
            let _ = write!(html, "<button class=\"sc-button\" type=\"submit\">{}</button>", escape_html(&form.submit_label));
            html.push_str("</form>");
        }
        ElementContent::Video(video) => {
            let _ = write!(html, "<video src=\"{}\" controls", escape_url(&video.src));
            if let Some(poster) = &video.poster {
                let _ = write!(html, " poster=\"{}\"", escape_url(poster));
            }
            html.push_str("></video>");
        }
        ElementContent::Testimonial(t) => {
            let _ = write!(
                html,
                "<blockquote class=\"sc-testimonial\"><p>{}</p><footer>{}",
                escape_text(&t.quote),
                escape_html(&t.author)
            );
            if !t.role.is_empty() {
                let _ = write!(html, ", {}", escape_html(&t.role));
            }
            html.push_str("</footer></blockquote>");
        }
    }
    html
}

/// Positioned wrapper plus content for one element.
pub fn element_markup(element: &Element) -> String {
    format!(
        "<div id=\"{}\" class=\"sc-element sc-{}\">{}</div>",
        element_anchor(element),
        element.element_type().as_str(),
        content_markup(&element.content)
    )
}

fn page_markup(state: &CanvasState) -> String {
    let mut html = String::from("<div class=\"sc-page\">\n");
    for element in state.elements_by_z() {
        let _ = writeln!(html, "  {}", element_markup(element));
    }
    html.push_str("</div>\n");
    html
}

/// Letters, digits, `-` and `_` only, for values placed inside scripts.
fn script_token(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

fn meta_tags(out: &mut String, settings: &ProjectSettings) {
    let seo = &settings.seo;
    let mut meta = |name: &str, content: &str| {
        if !content.is_empty() {
            let _ = writeln!(out, "  <meta name=\"{}\" content=\"{}\">", name, escape_html(content));
        }
    };
    meta("description", &seo.description);
    meta("keywords", &seo.keywords.join(", "));
    meta("author", &seo.author);

    let _ = writeln!(out, "  <meta property=\"og:title\" content=\"{}\">", escape_html(&seo.title));
    if !seo.description.is_empty() {
        let _ = writeln!(out, "  <meta property=\"og:description\" content=\"{}\">", escape_html(&seo.description));
    }
    if let Some(image) = &seo.og_image {
        let _ = writeln!(out, "  <meta property=\"og:image\" content=\"{}\">", escape_url(image));
    }
}

fn analytics_snippet(out: &mut String, id: &str) {
    let id = script_token(id);
    if id.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "  <script async src=\"https://www.googletagmanager.com/gtag/js?id={id}\"></script>"
    );
    let _ = writeln!(
        out,
        "  <script>window.dataLayer = window.dataLayer || []; \
         function gtag(){{dataLayer.push(arguments);}} gtag('js', new Date()); gtag('config', '{id}');</script>"
    );
}

fn scaling_script(out: &mut String, canvas_width: f64) {
    let _ = writeln!(
        out,
        "<script>(function () {{ var page = document.querySelector('.sc-page'); \
         function fit() {{ var s = Math.min(1, window.innerWidth / {}); \
         page.style.transform = 'scale(' + s + ')'; page.style.transformOrigin = 'top left'; }} \
         window.addEventListener('resize', fit); fit(); }})();</script>",
        canvas_width
    );
}

/// Drop whitespace between tags and collapse every other run to one space.
pub fn minify(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pending_space = false;

    for ch in html.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        let between_tags = out.ends_with('>') && ch == '<';
        if pending_space && !between_tags && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

/// Export a page as HTML.
pub fn export_project(state: &CanvasState, settings: &ProjectSettings, options: &ExportOptions) -> String {
    let css = options
        .include_css
        .then(|| stylesheet(state, settings, options.responsive));
    let mut out = String::new();

    match options.format {
        ExportFormat::Fragment => {
            if let Some(css) = &css {
                let _ = writeln!(out, "<style>\n{}</style>", css);
            }
            out.push_str(&page_markup(state));
        }
        ExportFormat::Html5 => {
            out.push_str("<!DOCTYPE html>\n");
            let _ = writeln!(out, "<html lang=\"{}\">", escape_html(&settings.language));
            out.push_str("<head>\n  <meta charset=\"utf-8\">\n");
            if options.responsive {
                out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
            }
            let _ = writeln!(out, "  <title>{}</title>", escape_html(&settings.seo.title));
            if options.seo {
                meta_tags(&mut out, settings);
            }
            if let Some(favicon) = &settings.favicon {
                let _ = writeln!(out, "  <link rel=\"icon\" href=\"{}\">", escape_url(favicon));
            }
            if let Some(css) = &css {
                let _ = writeln!(out, "  <style>\n{}  </style>", css);
            }
            if options.analytics {
                if let Some(id) = &settings.analytics_id {
                    analytics_snippet(&mut out, id);
                }
            }
            out.push_str("</head>\n<body>\n");
            out.push_str(&page_markup(state));
            if options.include_js {
                scaling_script(&mut out, state.canvas_width);
            }
            out.push_str("</body>\n</html>\n");
        }
    }

    log::info!("Exported {} elements ({} bytes)", state.len(), out.len());
    if options.minify { minify(&out) } else { out }
}
