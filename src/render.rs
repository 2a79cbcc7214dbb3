use crate::config::{CanvasConfig, LayoutConfig};
use crate::layout::{Orientation, Point, Scene, SceneLink, Transform};
use crate::text_metrics::measure_text_width;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(scene: &Scene, theme: &Theme, config: &LayoutConfig, canvas: &CanvasConfig) -> String {
    let mut svg = String::new();
    let width = canvas.width.max(200.0);
    let height = canvas.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        canvas.background
    ));
    svg.push_str(&format!(
        "<g class=\"scene\" transform=\"{}\">",
        scene.transform.to_svg()
    ));

    svg.push_str(&format!(
        "<g class=\"links\" fill=\"none\" stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\">",
        theme.link_color, theme.link_opacity, theme.link_width
    ));
    for link in &scene.links {
        svg.push_str(&format!(
            "<path class=\"link\" data-target=\"{}\" d=\"{}\"/>",
            escape_xml(&link.target),
            link_path(link, scene.orientation)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for node in &scene.nodes {
        let mut class = String::from("node");
        if node.has_children {
            class.push_str(" has-children");
        }
        if node.collapsed {
            class.push_str(" collapsed");
        }
        let fill = if node.collapsed {
            &theme.collapsed_fill
        } else if node.has_children {
            &theme.branch_fill
        } else {
            &theme.node_fill
        };
        svg.push_str(&format!(
            "<g class=\"{class}\" data-id=\"{}\" transform=\"translate({:.2},{:.2})\">",
            escape_xml(&node.id),
            node.position.x,
            node.position.y
        ));
        svg.push_str(&format!("<title>{}</title>", escape_xml(&node.tooltip)));
        svg.push_str(&format!(
            "<circle r=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            config.node_radius, fill, theme.node_stroke, theme.node_stroke_width
        ));
        if scene.labels_visible {
            svg.push_str(&format!(
                "<text class=\"label\" x=\"0\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                -config.label_offset,
                escape_xml(&theme.font_family),
                theme.font_size,
                theme.text_color,
                escape_xml(&node.label)
            ));
        }
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    svg.push_str("</g></svg>");
    svg
}

/// Smooth tree link: the curve leaves and enters along the depth axis.
pub fn link_path(link: &SceneLink, orientation: Orientation) -> String {
    let (s, t) = (link.from, link.to);
    match orientation {
        Orientation::Horizontal => {
            let mid = (s.x + t.x) / 2.0;
            format!(
                "M{:.2},{:.2}C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                s.x, s.y, mid, s.y, mid, t.y, t.x, t.y
            )
        }
        Orientation::Vertical => {
            let mid = (s.y + t.y) / 2.0;
            format!(
                "M{:.2},{:.2}C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                s.x, s.y, s.x, mid, t.x, mid, t.x, t.y
            )
        }
    }
}

/// Transform that fits every node and label of `scene` onto the canvas.
/// Scale is clamped to the configured zoom extent.
pub fn fit_transform(scene: &Scene, theme: &Theme, config: &LayoutConfig, canvas: &CanvasConfig) -> Transform {
    let mut min = Point::new(f32::INFINITY, f32::INFINITY);
    let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for node in &scene.nodes {
        let half = measure_text_width(&node.label, theme.font_size, &theme.font_family) / 2.0;
        let half = half.max(config.node_radius);
        let top = config.label_offset + theme.font_size;
        min.x = min.x.min(node.position.x - half);
        max.x = max.x.max(node.position.x + half);
        min.y = min.y.min(node.position.y - top);
        max.y = max.y.max(node.position.y + config.node_radius);
    }
    if !min.x.is_finite() {
        return scene.transform;
    }
    let pad = config.viewport_padding;
    let avail_w = (canvas.width - 2.0 * pad).max(1.0);
    let avail_h = (canvas.height - 2.0 * pad).max(1.0);
    let k = (avail_w / (max.x - min.x).max(1.0))
        .min(avail_h / (max.y - min.y).max(1.0))
        .clamp(config.min_zoom, config.max_zoom);
    Transform {
        x: (canvas.width - (max.x - min.x) * k) / 2.0 - min.x * k,
        y: (canvas.height - (max.y - min.y) * k) / 2.0 - min.y * k,
        k,
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, canvas: &CanvasConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|f| f.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "Arial".to_string());
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(canvas.width, canvas.height)
        .ok_or_else(|| anyhow::anyhow!("invalid canvas size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
