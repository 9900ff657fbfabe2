use svgedit::{Error, FieldKind, PropertyPanel, FILL_PALETTE, STROKE_PALETTE, TEXT_CONTENT};

use crate::editor;

fn keys(panel: &PropertyPanel) -> Vec<&str> {
    panel.fields().iter().map(|f| f.key.as_str()).collect()
}

#[test]
fn rect_fields() {
    let mut editor = editor();
    editor.select_element("r1").unwrap();
    let panel = editor.property_panel().unwrap();

    assert_eq!(panel.element_id(), "r1");
    assert_eq!(panel.kind(), "rect");
    assert_eq!(
        keys(&panel),
        ["x", "y", "fill", "stroke", "stroke-width", "width", "height"]
    );

    assert_eq!(panel.field("x").unwrap().value, "10");
    assert_eq!(panel.field("fill").unwrap().value, "red");
    assert_eq!(
        panel.field("fill").unwrap().kind,
        FieldKind::Swatches(FILL_PALETTE)
    );
    assert_eq!(
        panel.field("stroke").unwrap().kind,
        FieldKind::Swatches(STROKE_PALETTE)
    );
    assert_eq!(panel.field("width").unwrap().kind, FieldKind::Number);
}

#[test]
fn text_fields() {
    let mut editor = editor();
    editor.select_element("element-3").unwrap();
    let panel = editor.property_panel().unwrap();

    assert_eq!(
        keys(&panel),
        ["x", "y", TEXT_CONTENT, "text-anchor", "fill", "stroke", "stroke-width"]
    );
    assert_eq!(panel.field(TEXT_CONTENT).unwrap().value, "Hello");
    assert_eq!(panel.field("text-anchor").unwrap().value, "start");
}

#[test]
fn defaults() {
    let mut editor = editor();
    editor.select_element("element-2").unwrap();
    let panel = editor.property_panel().unwrap();

    assert_eq!(panel.field("x").unwrap().value, "0");
    assert_eq!(panel.field("y").unwrap().value, "0");
    assert_eq!(panel.field("stroke-width").unwrap().value, "1");
    assert_eq!(panel.field("fill").unwrap().value, "");
    // Generic attributes keep the document order.
    assert_eq!(keys(&panel)[5..], ["cx", "cy", "r"]);
    assert_eq!(panel.field("r").unwrap().kind, FieldKind::Text);
}

#[test]
fn stroke_width_prefix() {
    let mut editor = editor();
    editor.apply_mutation("r1", "stroke-width", "3.5").unwrap();
    editor.select_element("r1").unwrap();
    let panel = editor.property_panel().unwrap();
    assert_eq!(panel.field("stroke-width").unwrap().value, "3");
}

#[test]
fn no_selection() {
    let editor = editor();
    assert!(editor.property_panel().is_none());
}

#[test]
fn validation() {
    let mut editor = editor();
    editor.select_element("element-3").unwrap();
    let panel = editor.property_panel().unwrap();

    assert!(panel.edit("fill", "#60a5fa").is_ok());
    assert!(panel.edit("fill", "#000000").is_err());
    assert!(panel.edit("stroke", "#000000").is_ok());
    assert!(panel.edit("text-anchor", "middle").is_ok());
    assert!(panel.edit("text-anchor", "center").is_err());
    assert!(panel.edit("stroke-width", "10").is_ok());
    assert!(panel.edit("stroke-width", "0").is_err());
    assert!(panel.edit("stroke-width", "11").is_err());
    assert!(panel.edit("x", "12.5").is_ok());
    assert!(panel.edit("x", "-3e2").is_ok());
    assert!(panel.edit("x", "abc").is_err());
    assert!(panel.edit(TEXT_CONTENT, "anything <goes>").is_ok());
    assert!(panel.edit(TEXT_CONTENT, "a\u{1}b").is_err());

    match panel.edit("fill", "blue") {
        Err(Error::InvalidValue { key, value }) => {
            assert_eq!(key, "fill");
            assert_eq!(value, "blue");
        }
        v => panic!("unexpected result: {:?}", v),
    }

    assert!(matches!(
        panel.edit("width", "10"),
        Err(Error::UnknownProperty(_))
    ));
}

#[test]
fn apply_edit() {
    let mut editor = editor();
    editor.select_element("element-3").unwrap();
    let edit = editor
        .property_panel()
        .unwrap()
        .edit("text-anchor", "middle")
        .unwrap();
    assert_eq!(edit.id, "element-3");

    let snapshot = editor.apply_edit(&edit).unwrap();
    assert!(snapshot.contains("text-anchor=\"middle\""));
    assert_eq!(editor.history().len(), 2);

    let panel = editor.property_panel().unwrap();
    assert_eq!(panel.field("text-anchor").unwrap().value, "middle");
}
