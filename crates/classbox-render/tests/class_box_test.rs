use classbox_core::geom::point;
use classbox_core::{ClassBoxConfig, ClassboxConfig, Look, Node};
use classbox_render::class_box::compose_class_box;
use classbox_render::class_text::{
    LabelMode, MeasuredText, TextAnchor, TextFragment, TextGroupKind, TextLine, Translate,
};
use classbox_render::model::{BoundingBox, Bounds};
use classbox_render::text::DeterministicTextMeasurer;
use classbox_render::{
    ClassBoxContext, ClassBoxShape, Error, LayoutOptions, class_box, layout_class_node,
    render_class_node_svg,
};
use futures::executor::block_on;
use serde_json::json;

const EPS: f64 = 1e-6;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn render_with(node: &mut Node, config: &ClassBoxConfig) -> ClassBoxShape {
    let measurer = DeterministicTextMeasurer::default();
    let ctx = ClassBoxContext {
        config,
        measurer: &measurer,
    };
    block_on(class_box(node, &ctx)).expect("class box")
}

fn render(node: &mut Node) -> ClassBoxShape {
    render_with(node, &ClassBoxConfig::default())
}

fn divider_y(shape: &ClassBoxShape, idx: usize) -> f64 {
    let b = shape.dividers[idx].bounds().expect("divider bounds");
    assert!(approx(b.height(), 0.0), "divider must be horizontal");
    b.min_y
}

// Default measurer: 16px font, 9.6px per column, 19.2px per line.
const LINE_H: f64 = 19.2;
const COL_W: f64 = 9.6;

#[test]
fn empty_class_gets_the_extra_box() {
    let mut node = Node::new("Animal", "Animal");
    let shape = render(&mut node);

    assert!(shape.render_extra_box);
    assert!(approx(node.height.unwrap(), LINE_H + 2.0 * 12.0 + 2.0 * 12.0));
    assert!(approx(node.width.unwrap(), 6.0 * COL_W + 24.0));
    assert_eq!(shape.dividers.len(), 1);

    let y = -LINE_H / 2.0;
    assert!(approx(shape.rect_bounds.min_y, y - 24.0));
    assert!(approx(shape.rect_bounds.max_y, -y + 24.0));

    // Annotation and label heights shrink by padding/2 around the extra box.
    assert!(approx(divider_y(&shape, 0), -6.0 + (LINE_H - 6.0) + y + 12.0));

    let t = shape.fragment(TextGroupKind::Label).unwrap().transform.unwrap();
    assert!(approx(t.dx, -3.0 * COL_W));
    assert!(approx(t.dy, y));
}

#[test]
fn hidden_empty_box_has_no_dividers() {
    let mut node = Node::new("Animal", "Animal");
    let config = ClassBoxConfig {
        hide_empty_members_box: true,
        ..ClassBoxConfig::default()
    };
    let shape = render_with(&mut node, &config);

    assert!(!shape.render_extra_box);
    assert!(shape.dividers.is_empty());
    assert!(approx(node.height.unwrap(), LINE_H + 24.0));
}

#[test]
fn single_member_draws_one_divider_under_the_label() {
    let mut node = Node::new("Animal", "Animal");
    node.members = vec!["a:int".into()];
    let shape = render(&mut node);

    assert!(!shape.render_extra_box);
    assert_eq!(shape.dividers.len(), 1);

    // label [-28.8, 28.8] x [0, 19.2]; member [0, 48] x [43.2, 62.4]
    let (w, h) = (3.0 * COL_W + 5.0 * COL_W, 2.0 * LINE_H + 24.0);
    assert!(approx(node.width.unwrap(), w + 24.0));
    assert!(approx(node.height.unwrap(), h + 24.0));
    assert!(approx(divider_y(&shape, 0), LINE_H - h / 2.0 + 12.0));

    let members = shape.fragment(TextGroupKind::Members).unwrap();
    let t = members.transform.unwrap();
    assert!(approx(t.dx, -w / 2.0));
    assert!(approx(t.dy, LINE_H + 24.0 - h / 2.0 + 12.0));
}

#[test]
fn members_and_methods_draw_two_dividers() {
    let mut node = Node::new("A", "A");
    node.members = vec!["a".into()];
    node.methods = vec!["b()".into()];
    let shape = render(&mut node);

    assert_eq!(shape.dividers.len(), 2);
    assert!(approx(divider_y(&shape, 0), -21.6));
    assert!(approx(divider_y(&shape, 1), 21.6));

    for divider in &shape.dividers {
        let b = divider.bounds().unwrap();
        assert!(approx(b.min_x, shape.rect_bounds.min_x));
        assert!(approx(b.max_x, shape.rect_bounds.max_x));
    }
}

#[test]
fn methods_only_draws_one_divider() {
    let mut node = Node::new("A", "A");
    node.methods = vec!["run()".into()];
    let shape = render(&mut node);
    assert!(!shape.render_extra_box);
    assert_eq!(shape.dividers.len(), 1);
}

#[test]
fn rectangle_is_centered_on_the_origin() {
    let cases: Vec<Node> = vec![
        Node::new("A", "A"),
        {
            let mut n = Node::new("B", "A much longer class name");
            n.annotations = vec!["interface".to_string()];
            n
        },
        {
            let mut n = Node::new("C", "C");
            n.members = vec!["+String name".into(), "-int veryLongMemberName".into()];
            n.methods = vec!["+run()".into()];
            n
        },
    ];
    for mut node in cases {
        let shape = render(&mut node);
        let b = shape.rect_bounds;
        assert!(approx(b.min_x, -b.max_x), "{}: {b:?}", node.id);
        assert!(approx(b.min_y, -b.max_y), "{}: {b:?}", node.id);
    }
}

#[test]
fn fragment_without_transform_is_placed_at_the_content_origin() {
    let mut node = Node::new("A", "A");
    node.members = vec!["x".into()];
    let mut members = TextFragment::empty(TextGroupKind::Members, None);
    members.width = 40.0;
    members.height = 20.0;
    members.lines.push(TextLine {
        text: "x".to_string(),
        y: 0.0,
        width: 40.0,
        height: 20.0,
        style: None,
    });
    let measured = MeasuredText {
        bbox: BoundingBox {
            width: 40.0,
            height: 20.0,
        },
        fragments: vec![members],
        label_mode: LabelMode::Html,
    };

    let shape = compose_class_box(&mut node, &ClassBoxConfig::default(), measured).unwrap();
    assert_eq!(
        shape.fragments[0].transform,
        Some(Translate::new(-20.0, -10.0 + 12.0))
    );
    // Missing annotation and label groups count as zero height.
    assert!(approx(divider_y(&shape, 0), -10.0 + 12.0));
}

fn fragment(kind: TextGroupKind, anchor: Option<TextAnchor>, width: f64, y: f64) -> TextFragment {
    let mut f = TextFragment::empty(kind, anchor);
    f.width = width;
    f.height = LINE_H;
    f.transform = Some(Translate::new(0.0, y));
    f.lines.push(TextLine {
        text: "x".to_string(),
        y: 0.0,
        width,
        height: LINE_H,
        style: None,
    });
    f
}

fn compose_with_members_anchor(anchor: Option<TextAnchor>) -> ClassBoxShape {
    let mut node = Node::new("A", "A");
    node.members = vec!["x".into()];
    let measured = MeasuredText {
        bbox: BoundingBox {
            width: 120.0,
            height: 2.0 * LINE_H + 24.0,
        },
        fragments: vec![
            fragment(TextGroupKind::Label, None, 120.0, 0.0),
            fragment(TextGroupKind::Members, anchor, 40.0, LINE_H + 24.0),
        ],
        label_mode: LabelMode::Svg,
    };
    compose_class_box(&mut node, &ClassBoxConfig::default(), measured).unwrap()
}

#[test]
fn middle_anchored_group_keeps_the_title_at_zero() {
    let shape = compose_with_members_anchor(Some(TextAnchor::Middle));
    let label = shape.fragment(TextGroupKind::Label).unwrap().transform.unwrap();
    assert!(approx(label.dx, 0.0));
    let members = shape.fragment(TextGroupKind::Members).unwrap().transform.unwrap();
    assert!(approx(members.dx, -60.0));
}

#[test]
fn start_anchored_groups_center_the_title_by_its_width() {
    for anchor in [None, Some(TextAnchor::Start)] {
        let shape = compose_with_members_anchor(anchor);
        let label = shape.fragment(TextGroupKind::Label).unwrap().transform.unwrap();
        assert!(approx(label.dx, -60.0), "{anchor:?}: {label:?}");
    }
}

#[test]
fn label_color_wins_over_general_color_for_svg_labels() {
    let config = ClassBoxConfig {
        html_labels: false,
        ..ClassBoxConfig::default()
    };

    let mut node = Node::new("A", "A");
    node.css_compiled_styles = vec!["color:red".to_string()];
    node.styles = Some(vec!["fill:#f9f".to_string(), "color:blue".to_string()]);
    let shape = render_with(&mut node, &config);
    let label = shape.fragment(TextGroupKind::Label).unwrap();
    assert_eq!(label.lines[0].style.as_deref(), Some("fill:red !important"));

    let mut node = Node::new("A", "A");
    node.styles = Some(vec!["fill:#f9f".to_string(), "color:blue".to_string()]);
    let shape = render_with(&mut node, &config);
    let label = shape.fragment(TextGroupKind::Label).unwrap();
    assert_eq!(label.lines[0].style.as_deref(), Some("fill:blue"));
    assert!(shape.to_svg().contains(r#"<tspan x="0" dy="1em" style="fill:blue">A</tspan>"#));
}

#[test]
fn html_spans_use_label_style_then_general_style() {
    let mut node = Node::new("A", "A");
    node.members = vec!["a".into()];
    node.css_styles = vec!["fill:#f9f".to_string(), "color:red".to_string()];
    let shape = render(&mut node);

    assert_eq!(node.label_style, "color:red !important");
    assert_eq!(node.css_styles, vec!["fill:#f9f"]);
    for fragment in &shape.fragments {
        for line in &fragment.lines {
            assert_eq!(line.style.as_deref(), Some("color:red !important"));
        }
    }

    let mut node = Node::new("B", "B");
    node.css_styles = vec!["stroke:#333".to_string()];
    let shape = render(&mut node);
    let label = shape.fragment(TextGroupKind::Label).unwrap();
    assert_eq!(label.lines[0].style.as_deref(), Some("stroke:#333 !important"));
}

#[test]
fn explicit_empty_style_list_replaces_css_styles() {
    let mut node = Node::new("A", "A");
    node.css_styles = vec!["fill:#f9f".to_string()];
    node.styles = Some(Vec::new());
    let shape = render(&mut node);

    assert!(node.css_styles.is_empty());
    // The drawn style still falls back to the compiled node styles.
    assert_eq!(
        shape.container.paths[1].style.as_deref(),
        Some("fill:#f9f !important")
    );
}

#[test]
fn path_styles_depend_on_the_look() {
    let mut node = Node::new("A", "A");
    node.css_styles = vec!["stroke:#333".to_string()];
    let shape = render(&mut node);
    assert!(shape.container.paths.iter().all(|p| p.style.is_some()));

    let mut node = Node::new("A", "A");
    node.look = Look::HandDrawn;
    node.css_styles = vec!["stroke:#333".to_string()];
    let shape = render(&mut node);
    assert_eq!(shape.container.paths[0].style, None);
    assert_eq!(
        shape.container.paths[1].style.as_deref(),
        Some("stroke:#333 !important")
    );
    assert!(shape.dividers.iter().all(|d| d.paths[0].style.is_some()));
}

#[test]
fn intersect_clips_at_the_rendered_rectangle() {
    let mut node = Node::new("A", "A");
    node.members = vec!["a".into()];
    node.x = 100.0;
    node.y = 50.0;
    assert!(node.intersect(point(300.0, 50.0)).is_none());

    render(&mut node);
    let (w, h) = (node.width.unwrap(), node.height.unwrap());

    let right = node.intersect(point(300.0, 50.0)).unwrap();
    assert!(approx(right.x, 100.0 + w / 2.0));
    assert!(approx(right.y, 50.0));

    let top = node.intersect(point(100.0, -500.0)).unwrap();
    assert!(approx(top.x, 100.0));
    assert!(approx(top.y, 50.0 - h / 2.0));
}

#[test]
fn shape_svg_lists_container_text_and_dividers_in_order() {
    let mut node = Node::new("Animal", "Animal");
    node.dom_id = Some("classId-Animal-0".to_string());
    node.css_classes = "default".to_string();
    node.members = vec!["+int age".into()];
    let svg = render(&mut node).to_svg();

    assert!(svg.starts_with(r#"<g class="node default" id="classId-Animal-0">"#));
    let container = svg.find(r#"<g class="basic label-container">"#).unwrap();
    let label = svg.find(r#"<g class="label-group text""#).unwrap();
    let divider = svg.find(r#"<g class="divider">"#).unwrap();
    assert!(container < label && label < divider);
    assert!(svg.contains(r#"<g class="methods-group text""#));
    assert!(svg.contains("<p>+int age</p>"));
    assert!(svg.ends_with("</g>"));
}

#[test]
fn layout_from_json_fills_in_node_geometry() {
    let value = json!({
        "id": "Animal",
        "label": "Animal",
        "cssClasses": "default",
        "members": [{ "displayText": "+int age" }],
        "methods": ["+isMammal()"],
        "x": 10,
        "y": 20
    });
    let (node, shape) = block_on(layout_class_node(
        &value,
        &ClassboxConfig::default(),
        &LayoutOptions::default(),
    ))
    .unwrap();
    assert_eq!(shape.dividers.len(), 2);
    assert!(approx(node.width.unwrap(), shape.rect_bounds.width()));

    let svg = block_on(render_class_node_svg(
        &value.to_string(),
        &ClassboxConfig::default(),
        &LayoutOptions::default(),
    ))
    .unwrap();
    assert!(svg.starts_with(
        r#"<g class="node default" id="Animal" transform="translate(10, 20)">"#
    ));
}

#[test]
fn invalid_input_is_reported() {
    let options = LayoutOptions::default();
    let config = ClassboxConfig::default();

    let err = block_on(render_class_node_svg("{", &config, &options)).unwrap_err();
    assert!(matches!(err, Error::Json(_)));

    let err = block_on(render_class_node_svg(r#"{"label":"x"}"#, &config, &options)).unwrap_err();
    assert!(matches!(err, Error::Core(classbox_core::Error::InvalidNode { .. })));
}

#[test]
fn padding_from_config_scales_the_box() {
    let cfg = ClassboxConfig::from_value(json!({ "class": { "padding": 20 } }));
    let config = ClassBoxConfig::from_config(&cfg);

    let mut node = Node::new("A", "A");
    node.members = vec!["a".into()];
    render_with(&mut node, &config);

    let mut reference = Node::new("A", "A");
    reference.members = vec!["a".into()];
    render(&mut reference);

    // Twice the padding delta horizontally; vertically the 2*gap member offset grows too.
    assert!(approx(node.width.unwrap() - reference.width.unwrap(), 16.0));
    assert!(approx(node.height.unwrap() - reference.height.unwrap(), 16.0 + 16.0));
}

#[test]
fn per_call_overrides_apply_over_the_base_config() {
    let value = json!({ "id": "A", "label": "A", "members": ["a"] });
    let base = ClassboxConfig::from_value(json!({
        "class": { "padding": 12, "hideEmptyMembersBox": true }
    }));
    let (plain, _) = block_on(layout_class_node(&value, &base, &LayoutOptions::default())).unwrap();

    let options = LayoutOptions {
        config_overrides: json!({
            "class": { "padding": 20 },
            "themeVariables": { "mainBkg": "#fff" }
        }),
        ..LayoutOptions::default()
    };
    let (node, shape) = block_on(layout_class_node(&value, &base, &options)).unwrap();

    assert!(approx(node.width.unwrap() - plain.width.unwrap(), 16.0));
    assert_eq!(shape.container.paths[0].fill, "#fff");
}

#[test]
fn rect_bounds_cover_the_container_paths() {
    let mut node = Node::new("A", "A");
    node.look = Look::HandDrawn;
    let shape = render(&mut node);
    let b: Bounds = shape.container.bounds().unwrap();
    assert_eq!(b, shape.rect_bounds);
    assert!(approx(node.height.unwrap(), b.height()));
}
