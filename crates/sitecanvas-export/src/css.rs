//! Stylesheet generation.
//!
//! Element styles are stored with camelCase keys (`fontSize`); the exported
//! stylesheet uses CSS property names (`font-size`).

use sitecanvas_core::document::CanvasState;
use sitecanvas_core::elements::{Element, Styles};
use sitecanvas_core::settings::ProjectSettings;
use std::fmt::Write;

/// Convert a style key to a CSS property name. Kebab-case keys pass through.
pub fn css_property(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
        }
    }
    out
}

/// Strip characters that could end a declaration or a rule.
pub fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// CSS id of an element's wrapper.
pub fn element_anchor(element: &Element) -> String {
    let id: String = element
        .id()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("el-{}", id)
}

pub(crate) fn px(value: f64) -> String {
    format!("{}px", (value * 100.0).round() / 100.0)
}

/// `property: value;` pairs for a style map, in key order.
pub fn style_declarations(styles: &Styles) -> Vec<String> {
    styles
        .iter()
        .filter_map(|(key, value)| {
            let property = css_property(key);
            let value = css_value(value);
            (!property.is_empty() && !value.is_empty()).then(|| format!("{}: {};", property, value))
        })
        .collect()
}

/// Rule placing one element and applying its styles.
pub fn element_rule(element: &Element) -> String {
    let mut rule = String::new();
    let _ = writeln!(rule, "#{} {{", element_anchor(element));
    let _ = writeln!(rule, "  left: {};", px(element.x));
    let _ = writeln!(rule, "  top: {};", px(element.y));
    let _ = writeln!(rule, "  width: {};", px(element.width));
    let _ = writeln!(rule, "  height: {};", px(element.height));
    let _ = writeln!(rule, "  z-index: {};", element.z_index);
    for declaration in style_declarations(&element.styles) {
        let _ = writeln!(rule, "  {}", declaration);
    }
    rule.push_str("}\n");
    rule
}

/// Height of the exported page: the canvas, grown to fit every element.
pub fn page_height(state: &CanvasState) -> f64 {
    state
        .bounds()
        .map_or(state.canvas_height, |b| b.y1.max(state.canvas_height))
}

fn base_rules(state: &CanvasState, settings: &ProjectSettings) -> String {
    let theme = &settings.theme;
    let mut css = String::new();
    css.push_str("*, *::before, *::after { box-sizing: border-box; }\n");
    let _ = writeln!(
        css,
        "body {{ margin: 0; font-family: {}; color: {}; background: {}; }}",
        css_value(&theme.font_family),
        css_value(&theme.text_color),
        css_value(&theme.background_color),
    );
    let _ = writeln!(
        css,
        ".sc-page {{ position: relative; width: {}; height: {}; margin: 0 auto; }}",
        px(state.canvas_width),
        px(page_height(state)),
    );
    css.push_str(".sc-element { position: absolute; overflow: hidden; }\n");
    css.push_str(".sc-element img, .sc-element video { display: block; width: 100%; height: 100%; object-fit: cover; }\n");
    let _ = writeln!(
        css,
        ".sc-button {{ display: inline-flex; align-items: center; justify-content: center; width: 100%; height: 100%; \
         border: none; border-radius: 6px; background: {}; color: #ffffff; text-decoration: none; cursor: pointer; }}",
        css_value(&theme.primary_color),
    );
    let _ = writeln!(css, "a {{ color: {}; }}", css_value(&theme.primary_color));
    css.push_str(".sc-shape-circle { border-radius: 50%; }\n");
    css.push_str(".sc-shape-triangle { clip-path: polygon(50% 0, 100% 100%, 0 100%); }\n");
    css.push_str(".sc-shape-diamond { clip-path: polygon(50% 0, 100% 50%, 50% 100%, 0 50%); }\n");
    let _ = writeln!(
        css,
        ".sc-testimonial footer {{ color: {}; }}",
        css_value(&theme.secondary_color),
    );
    css
}

/// Media queries that scale the fixed-width page down at each breakpoint
/// narrower than the canvas.
pub fn responsive_rules(state: &CanvasState, settings: &ProjectSettings) -> String {
    let mut css = String::new();
    if state.canvas_width <= 0.0 {
        return css;
    }
    let mut breakpoints = [
        settings.responsive.tablet_breakpoint,
        settings.responsive.mobile_breakpoint,
    ];
    breakpoints.sort_by(|a, b| b.total_cmp(a));

    for breakpoint in breakpoints {
        if breakpoint <= 0.0 || breakpoint >= state.canvas_width {
            continue;
        }
        let scale = (breakpoint / state.canvas_width * 10_000.0).round() / 10_000.0;
        let _ = writeln!(
            css,
            "@media (max-width: {}) {{ .sc-page {{ transform: scale({}); transform-origin: top left; }} }}",
            px(breakpoint),
            scale,
        );
    }
    css
}

/// The full stylesheet for a page.
pub fn stylesheet(state: &CanvasState, settings: &ProjectSettings, responsive: bool) -> String {
    let mut css = base_rules(state, settings);
    for element in state.elements_by_z() {
        css.push_str(&element_rule(element));
    }
    if responsive {
        css.push_str(&responsive_rules(state, settings));
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kurbo::Point;
    use sitecanvas_core::elements::ElementType;

    #[test]
    fn test_css_property() {
        assert_eq!(css_property("fontSize"), "font-size");
        assert_eq!(css_property("backgroundColor"), "background-color");
        assert_eq!(css_property("WebkitTransform"), "-webkit-transform");
        assert_eq!(css_property("margin-top"), "margin-top");
        assert_eq!(css_property("bad key;"), "badkey");
    }

    #[test]
    fn test_css_value_cannot_break_out() {
        assert_eq!(css_value("red; } body { display: none"), "red  body  display: none");
        assert_eq!(css_value(" 12px "), "12px");
    }

    #[test]
    fn test_element_rule() {
        let mut element = Element::new(ElementType::Button, Point::new(10.0, 20.5), Utc::now());
        element.z_index = 4;
        element.styles.insert("fontSize".to_string(), "18px".to_string());
        element.styles.insert("color".to_string(), String::new());

        let rule = element_rule(&element);
        assert!(rule.starts_with(&format!("#{} {{", element_anchor(&element))));
        assert!(rule.contains("left: 10px;"));
        assert!(rule.contains("top: 20.5px;"));
        assert!(rule.contains("width: 120px;"));
        assert!(rule.contains("z-index: 4;"));
        assert!(rule.contains("font-size: 18px;"));
        assert!(!rule.contains("color:"));
    }

    #[test]
    fn test_responsive_rules_skip_wide_breakpoints() {
        let mut state = CanvasState::new();
        let settings = ProjectSettings::default();

        let css = responsive_rules(&state, &settings);
        assert!(css.contains("@media (max-width: 1024px)"));
        assert!(css.contains("scale(0.8533)"));
        assert!(css.contains("@media (max-width: 768px)"));

        state.canvas_width = 800.0;
        let css = responsive_rules(&state, &settings);
        assert!(!css.contains("1024px"));
        assert!(css.contains("scale(0.96)"));
    }

    #[test]
    fn test_page_height_grows_to_fit() {
        let mut state = CanvasState::new();
        assert_eq!(page_height(&state), state.canvas_height);

        state.add_element(Element::new(ElementType::Hero, Point::new(0.0, 1000.0), Utc::now()));
        assert!(page_height(&state) > 1000.0);
    }
}
