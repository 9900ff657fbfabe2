use svgedit::{
    DocumentSource, Editor, EditorOptions, Error, JsonTemplateStore, MatchResponse, TemplateStore,
};

const TEMPLATES: &str = r#"{
    "templates": [
        {
            "id": "flow-1",
            "summary": "A simple flow",
            "categoryId": 2,
            "content": "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 10 10'><rect/></svg>"
        },
        {
            "id": "flow-2",
            "content": "<svg xmlns='http://www.w3.org/2000/svg'><circle/></svg>"
        }
    ]
}"#;

fn store() -> JsonTemplateStore {
    JsonTemplateStore::from_json(TEMPLATES).unwrap()
}

#[test]
fn template_store() {
    let store = store();
    assert_eq!(store.templates().len(), 2);

    let t = store.template("flow-1").unwrap();
    assert_eq!(t.summary, "A simple flow");
    assert_eq!(t.category_id, 2);
    assert_eq!(store.template("flow-2").unwrap().category_id, 0);
    assert!(store.template("flow-3").is_none());
}

#[test]
fn load_store_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templates.json");
    std::fs::write(&path, TEMPLATES).unwrap();

    let store = JsonTemplateStore::load(&path).unwrap();
    assert!(store.template("flow-2").is_some());

    assert!(matches!(
        JsonTemplateStore::load(dir.path().join("missing.json")),
        Err(Error::Io(_))
    ));
}

#[test]
fn matched_templates() {
    let response =
        MatchResponse::from_json(r#"{"templateIds": ["flow-2", "flow-1", "flow-3"]}"#).unwrap();
    let source = response.into_source().unwrap();
    assert_eq!(source, DocumentSource::Template("flow-2".to_string()));

    let editor = Editor::from_source(&source, &store(), EditorOptions::default()).unwrap();
    assert_eq!(editor.document().element_by_id("element-0").unwrap().kind(), "circle");
}

#[test]
fn generated_svg() {
    let response = MatchResponse::from_json(
        r#"{"svg": "<svg xmlns='http://www.w3.org/2000/svg'><text>Hi</text></svg>"}"#,
    )
    .unwrap();
    let source = response.into_source().unwrap();

    let editor = Editor::from_source(&source, &store(), EditorOptions::default()).unwrap();
    let sel = editor.document().element_by_id("element-0").unwrap();
    assert_eq!(sel.text(), "Hi");
}

#[test]
fn empty_match() {
    let response = MatchResponse::from_json(r#"{"templateIds": []}"#).unwrap();
    assert!(matches!(
        response.into_source(),
        Err(Error::NoTemplatesMatched)
    ));
}

#[test]
fn invalid_response() {
    assert!(matches!(
        MatchResponse::from_json(r#"{"foo": 1}"#),
        Err(Error::Json(_))
    ));
}

#[test]
fn unknown_template() {
    let source = DocumentSource::Template("nope".to_string());
    match Editor::from_source(&source, &store(), EditorOptions::default()) {
        Err(Error::TemplateNotFound(id)) => assert_eq!(id, "nope"),
        v => panic!("unexpected result: {:?}", v),
    }

    let mut editor = crate::editor();
    assert!(editor.load_source(&source, &store()).is_err());
    assert!(editor.document().element_by_id("r1").is_some());

    let source = DocumentSource::Template("flow-1".to_string());
    editor.load_source(&source, &store()).unwrap();
    assert!(editor.document().element_by_id("r1").is_none());
}
