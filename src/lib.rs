pub mod clean;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod forest;
pub mod hierarchy;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use clean::{CleanOptions, CleanReport, clean_records, sort_nodes};
pub use config::{CanvasConfig, Config, LayoutConfig, RenderConfig, load_config};
pub use engine::{HoverInfo, TreeView};
pub use error::{Error, Result};
pub use hierarchy::Hierarchy;
pub use ir::{Node, RawRecord, parse_records};
pub use layout::{Orientation, Point, Scene, Transform, Transition};
pub use render::render_svg;
pub use theme::Theme;

/// Cleans `records`, joins them under the super-root, prunes to the selected
/// sub-trees and opens an interactive view on the result.
pub fn build_view(
    records: &[RawRecord],
    render: &RenderConfig,
    config: &Config,
) -> Result<(TreeView, CleanReport)> {
    let options = CleanOptions {
        delete_ids: config.tree.delete_ids.iter().cloned().collect(),
    };
    let (nodes, report) = clean_records(records, &options);
    let selected: Vec<String> = render
        .selected_root_ids
        .iter()
        .map(|token| config.tree.resolve_clan(token))
        .collect();
    let nodes = forest::adapt(nodes, &selected, &config.tree.root_label);
    let tree = Hierarchy::build(&nodes)?;
    let view = TreeView::new(tree, render, config.layout.clone(), config.canvas.clone());
    Ok((view, report))
}

/// One-shot: JSON records in, SVG of the initial view out.
pub fn render_tree_svg(input: &str, render: &RenderConfig, config: &Config) -> Result<String> {
    let records = parse_records(input)?;
    let (view, _) = build_view(&records, render, config)?;
    Ok(render_svg(
        &view.scene(),
        &config.theme,
        &config.layout,
        &config.canvas,
    ))
}
