//! Integration tests for the ViewBuilder and Viewer APIs

use hierview::{
    ViewBuilder, ViewError, Viewer,
    config::AppConfig,
    export::{JsonSurface, SvgSurface},
    load::LoadStatus,
    notice::Notice,
    view::{ViewMode, ViewState},
};
use serde_json::Value;

const CPU: &str = r#"{
    "top_instances": [
        {
            "instance_name": "cpu0",
            "module_type": "CPU",
            "children": [
                {"instance_name": "alu0", "module_type": "ALU", "children": []},
                {"instance_name": "rf0", "module_type": "REGFILE"}
            ]
        }
    ]
}"#;

#[test]
fn test_render_json_tree() {
    let builder = ViewBuilder::default();
    let design = builder.parse(CPU).expect("Failed to parse design");
    let json = builder
        .render_json(design.as_ref(), ViewMode::Tree)
        .expect("Failed to render");

    let document: Value = serde_json::from_str(&json).unwrap();
    let elements = document["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 5);
    assert_eq!(elements[0]["data"]["label"], "cpu0 (CPU)");
    assert_eq!(document["layout"]["name"], "breadthfirst");
}

#[test]
fn test_render_json_nested() {
    let builder = ViewBuilder::default();
    let design = builder.parse(CPU).unwrap();
    let json = builder
        .render_json(design.as_ref(), ViewMode::Nested)
        .unwrap();

    let document: Value = serde_json::from_str(&json).unwrap();
    let elements = document["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 3);
    assert!(elements.iter().all(|element| element["group"] == "nodes"));
    assert_eq!(elements[2]["data"]["parent"], elements[0]["data"]["id"]);
    assert_eq!(document["layout"]["name"], "fcose");
    assert_eq!(
        document["notices"][1],
        Notice::ConnectivityOmitted.to_string().as_str()
    );
}

#[test]
fn test_render_svg_both_modes() {
    let builder = ViewBuilder::default();
    let design = builder.parse(CPU).unwrap();

    for mode in ViewMode::ALL {
        let svg = builder
            .render_svg(design.as_ref(), mode)
            .unwrap_or_else(|err| panic!("Failed to render {mode}: {err}"));
        assert!(svg.contains("<svg"), "Output should contain SVG tag");
        assert!(svg.contains("</svg>"), "Output should be complete SVG");
        assert!(svg.contains("rf0 (REGFILE)"));
    }
}

#[test]
fn test_render_nothing() {
    let builder = ViewBuilder::default();
    let design = builder.parse("null").unwrap();
    assert!(design.is_none());

    let plan = builder.plan(design.as_ref(), ViewMode::Nested).unwrap();
    assert!(plan.is_empty());
    assert!(plan.notices().is_empty());
    assert!(builder.render_svg(None, ViewMode::Tree).is_ok());
}

#[test]
fn test_parse_invalid_document_returns_error() {
    let builder = ViewBuilder::default();
    let result = builder.parse(r#"{"top_instances": {"instance_name": 3}}"#);
    assert!(matches!(result, Err(ViewError::Design { .. })));
}

#[test]
fn test_viewer_session() {
    let builder = ViewBuilder::new(AppConfig::default());
    let mut viewer = Viewer::new(builder.config().clone(), SvgSurface::new()).unwrap();
    assert_eq!(viewer.mode(), ViewMode::Tree);

    let first = viewer.begin_load();
    let second = viewer.begin_load();
    assert_eq!(viewer.state().message(), Some("Loading design..."));

    let status = viewer.finish_load(second, builder.parse(CPU)).unwrap();
    assert_eq!(status, LoadStatus::Replaced);
    let status = viewer
        .finish_load(first, builder.parse(r#"{"top_instances": []}"#))
        .unwrap();
    assert_eq!(status, LoadStatus::Superseded);

    assert!(matches!(viewer.state(), ViewState::Ready(_)));
    assert!(viewer.rendered().is_some_and(|svg| svg.contains("alu0 (ALU)")));

    viewer.set_view_mode(ViewMode::Nested).unwrap();
    let plan = viewer.state().plan().unwrap();
    assert_eq!(plan.edge_count(), 0);
    assert_eq!(plan.node_count(), 3);
}

#[test]
fn test_viewer_keeps_design_on_failed_load() {
    let builder = ViewBuilder::default();
    let mut viewer = Viewer::new(AppConfig::default(), JsonSurface::new()).unwrap();

    let ticket = viewer.begin_load();
    viewer.finish_load(ticket, builder.parse(CPU)).unwrap();

    let ticket = viewer.begin_load();
    let status = viewer
        .finish_load(ticket, builder.parse("{not json"))
        .unwrap();
    assert_eq!(status, LoadStatus::Failed);
    assert_eq!(viewer.revision(), 1);
    assert!(viewer.rendered().is_some());
}
