use std::time::Duration;

use svgedit::{Editor, EditorOptions, Error, TEXT_CONTENT};

use crate::{editor, DIAGRAM};

#[test]
fn initial_state() {
    let editor = editor();
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());
    assert!(editor.selection().is_none());
    assert!(editor.snapshot().contains("id=\"element-2\""));
}

#[test]
fn set_fill() {
    let mut editor = editor();
    let snapshot = editor.apply_mutation("r1", "fill", "#0000ff").unwrap();
    assert!(snapshot.contains("fill=\"#0000ff\""));
    assert!(!snapshot.contains("fill=\"red\""));

    assert_eq!(editor.history().len(), 2);
    assert!(editor.can_undo());
    assert!(!editor.can_redo());
}

#[test]
fn every_mutation_is_recorded() {
    let mut editor = editor();
    for i in 0..5 {
        editor
            .apply_mutation("r1", "x", &(i * 10).to_string())
            .unwrap();
    }

    assert_eq!(editor.history().len(), 6);
    assert_eq!(editor.history().index(), 5);
}

#[test]
fn undo_and_redo() {
    let mut editor = editor();
    let initial = editor.snapshot().to_string();
    let edited = editor
        .apply_mutation("r1", "fill", "#1e40af")
        .unwrap()
        .to_string();

    assert_eq!(editor.undo().unwrap(), Some(initial.as_str()));
    assert_eq!(
        editor.document().element_by_id("r1").unwrap().attribute("fill"),
        Some("red")
    );
    assert!(!editor.can_undo());
    assert!(editor.can_redo());

    assert_eq!(editor.redo().unwrap(), Some(edited.as_str()));
    assert_eq!(
        editor.document().element_by_id("r1").unwrap().attribute("fill"),
        Some("#1e40af")
    );
}

#[test]
fn undo_and_redo_at_boundaries() {
    let mut editor = editor();
    assert_eq!(editor.undo().unwrap(), None);
    assert_eq!(editor.redo().unwrap(), None);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn redo_branch_is_discarded() {
    let mut editor = editor();
    let a = editor.snapshot().to_string();
    editor.apply_mutation("r1", "fill", "#60a5fa").unwrap();
    editor.apply_mutation("r1", "fill", "#1e40af").unwrap();

    editor.undo().unwrap();
    editor.undo().unwrap();
    let d = editor
        .apply_mutation("r1", "stroke", "#000000")
        .unwrap()
        .to_string();

    assert_eq!(editor.history().snapshots(), &[a, d]);
    assert!(!editor.can_redo());
}

#[test]
fn unknown_element() {
    let mut editor = editor();
    match editor.apply_mutation("missing", "fill", "blue") {
        Err(Error::ElementNotFound(ref id)) => assert_eq!(id, "missing"),
        v => panic!("unexpected result: {:?}", v),
    }

    assert_eq!(editor.history().len(), 1);
    assert!(editor.select_element("missing").is_err());
    assert!(editor.selection().is_none());
}

#[test]
fn text_content() {
    let mut editor = editor();
    let snapshot = editor
        .apply_mutation("element-3", TEXT_CONTENT, "Bye & see you")
        .unwrap();
    assert!(snapshot.contains(">Bye &amp; see you</text>"));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn text_content_on_non_text_element_is_ignored() {
    let mut editor = editor();
    let before = editor.snapshot().to_string();
    let snapshot = editor.apply_mutation("r1", TEXT_CONTENT, "nope").unwrap();
    assert_eq!(snapshot, before);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn selection() {
    let mut editor = editor();
    let sel = editor.select_element("element-3").unwrap();
    assert_eq!(sel.kind, "text");
    assert_eq!(sel.id, "element-3");
    assert_eq!(sel.attribute("x"), Some("20"));
    assert_eq!(sel.text_content.as_deref(), Some("Hello"));

    let sel = editor.select_element("r1").unwrap();
    assert_eq!(sel.kind, "rect");
    assert_eq!(sel.text_content, None);

    editor.clear_selection();
    assert!(editor.selection().is_none());
    // Selection is not a part of the history.
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn selection_follows_edits() {
    let mut editor = editor();
    editor.select_element("r1").unwrap();
    editor.apply_mutation("r1", "fill", "#ffffff").unwrap();
    editor.apply_mutation("r1", "stroke", "#000000").unwrap();

    let sel = editor.selection().unwrap();
    assert_eq!(sel.attribute("fill"), Some("#ffffff"));
    assert_eq!(sel.attribute("stroke"), Some("#000000"));

    editor.undo().unwrap();
    let sel = editor.selection().unwrap();
    assert_eq!(sel.attribute("fill"), Some("#ffffff"));
    assert_eq!(sel.attribute("stroke"), None);
}

#[test]
fn selection_is_cleared_when_element_is_gone() {
    let mut editor = editor();
    editor.apply_mutation("r1", "id", "box").unwrap();
    editor.select_element("box").unwrap();

    editor.undo().unwrap();
    assert!(editor.selection().is_none());
    assert!(editor.document().element_by_id("r1").is_some());
}

#[test]
fn changed_id_is_addressable() {
    let mut editor = editor();
    editor.select_element("r1").unwrap();
    editor.apply_mutation("r1", "id", "box").unwrap();
    assert_eq!(editor.selection().unwrap().id, "box");

    editor.apply_mutation("box", "fill", "#60a5fa").unwrap();
    assert!(editor.apply_mutation("r1", "fill", "#60a5fa").is_err());
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn select_at_point() {
    let mut editor = editor();

    let sel = editor.select_at(50.0, 20.0).unwrap().unwrap();
    assert_eq!(sel.id, "r1");

    let sel = editor.select_at(150.0, 50.0).unwrap().unwrap();
    assert_eq!(sel.id, "element-2");

    assert!(editor.select_at(195.0, 5.0).unwrap().is_none());
    assert!(editor.selection().is_none());
}

#[test]
fn load() {
    let mut editor = editor();
    editor.apply_mutation("r1", "fill", "#60a5fa").unwrap();
    editor.select_element("r1").unwrap();

    assert!(editor.load("<svg><rect></svg>").is_err());
    assert_eq!(editor.history().len(), 2);
    assert!(editor.selection().is_some());

    editor.load("<svg xmlns='http://www.w3.org/2000/svg'><path/></svg>").unwrap();
    assert_eq!(editor.history().len(), 1);
    assert!(editor.selection().is_none());
    assert!(editor.document().element_by_id("element-0").is_some());
}

#[test]
fn malformed_document() {
    assert!(matches!(
        Editor::new("<svg", EditorOptions::default()),
        Err(Error::Parse(svgedit::rwsvgtree::Error::MalformedXml(_)))
    ));

    assert!(matches!(
        Editor::new("<html/>", EditorOptions::default()),
        Err(Error::Parse(svgedit::rwsvgtree::Error::NoRootSvgElement))
    ));
}

#[test]
fn interactive_svg_is_not_recorded() {
    let editor = editor();
    assert!(editor.interactive_svg().contains("cursor:pointer"));
    assert!(!editor.snapshot().contains("cursor:pointer"));
}

fn coalescing_editor() -> Editor {
    let opt = EditorOptions {
        coalesce_window: Some(Duration::from_secs(60)),
        ..EditorOptions::default()
    };

    Editor::new(DIAGRAM, opt).unwrap()
}

#[test]
fn coalescing() {
    let mut editor = coalescing_editor();
    editor.apply_mutation("element-3", TEXT_CONTENT, "H").unwrap();
    editor.apply_mutation("element-3", TEXT_CONTENT, "Hi").unwrap();
    editor.apply_mutation("element-3", TEXT_CONTENT, "Hi!").unwrap();
    assert_eq!(editor.history().len(), 2);
    assert!(editor.snapshot().contains(">Hi!</text>"));

    // Another key starts a new entry.
    editor.apply_mutation("element-3", "x", "30").unwrap();
    assert_eq!(editor.history().len(), 3);

    editor.undo().unwrap();
    assert!(editor.snapshot().contains(">Hi!</text>"));
}

#[test]
fn coalescing_is_interrupted_by_undo() {
    let mut editor = coalescing_editor();
    editor.apply_mutation("r1", "x", "1").unwrap();
    editor.apply_mutation("r1", "x", "2").unwrap();
    assert_eq!(editor.history().len(), 2);

    editor.undo().unwrap();
    editor.redo().unwrap();
    editor.apply_mutation("r1", "x", "3").unwrap();
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn coalescing_is_disabled_by_default() {
    let mut editor = editor();
    editor.apply_mutation("r1", "x", "1").unwrap();
    editor.apply_mutation("r1", "x", "2").unwrap();
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn zoom_and_grid() {
    let mut editor = editor();
    assert_eq!(editor.zoom(), 100);
    assert_eq!(editor.zoom_in(), 125);
    for _ in 0..10 {
        editor.zoom_in();
    }
    assert_eq!(editor.zoom(), svgedit::ZOOM_MAX);

    for _ in 0..10 {
        editor.zoom_out();
    }
    assert_eq!(editor.zoom(), svgedit::ZOOM_MIN);

    assert!(!editor.show_grid());
    assert!(editor.toggle_grid());
    assert!(!editor.toggle_grid());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn malformed_edits_are_rejected() {
    let mut editor = editor();
    let initial = editor.snapshot().to_string();

    for key in ["bad key", "", "xmlns", "xmlns:foo", "foo:bar", ":x", "x:", "a:b:c", "1x"] {
        match editor.apply_mutation("r1", key, "1") {
            Err(Error::UnknownProperty(ref k)) if k == key => {}
            v => panic!("unexpected result for {:?}: {:?}", key, v),
        }
    }

    for key in ["fill", TEXT_CONTENT] {
        let id = if key == TEXT_CONTENT { "element-3" } else { "r1" };
        match editor.apply_mutation(id, key, "a\u{1}b") {
            Err(Error::InvalidValue { .. }) => {}
            v => panic!("unexpected result for {:?}: {:?}", key, v),
        }
    }

    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
    assert_eq!(editor.snapshot(), initial);
    assert_eq!(editor.document().to_string(&Default::default()), initial);
}

#[test]
fn bound_prefixes_are_accepted() {
    let mut editor = editor();
    let snapshot = editor
        .apply_mutation("element-3", "xml:space", "preserve")
        .unwrap();
    assert!(snapshot.contains("xml:space=\"preserve\""));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn xlink_is_declared_on_demand() {
    let mut editor = Editor::new(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 20 20'>\
            <defs><rect id='box' width='10' height='10'/></defs>\
            <use id='u'/>\
        </svg>",
        EditorOptions::default(),
    )
    .unwrap();

    let snapshot = editor
        .apply_mutation("u", "xlink:href", "#box")
        .unwrap()
        .to_string();
    assert!(snapshot.contains("xmlns:xlink=\"http://www.w3.org/1999/xlink\""));

    // Every snapshot stays parsable.
    let doc = svgedit::rwsvgtree::Document::parse_str(&snapshot).unwrap();
    assert_eq!(doc.element_by_id("u").unwrap().attribute("xlink:href"), Some("#box"));

    editor.undo().unwrap();
    assert!(!editor.snapshot().contains("xlink"));
    assert_eq!(editor.redo().unwrap(), Some(snapshot.as_str()));

    let png = editor
        .export(&svgedit::ExportRequest::new(svgedit::ExportFormat::Png))
        .unwrap();
    assert!(!png.data.is_empty());
}
