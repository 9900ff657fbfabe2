use svgedit::{Editor, EditorOptions};

mod editor;
mod panel;
mod source;

pub const DIAGRAM: &str = "\
<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 200 100'>
    <rect id='r1' x='10' y='10' width='80' height='40' fill='red'/>
    <g>
        <circle cx='150' cy='50' r='20'/>
        <text x='20' y='80'>Hello</text>
    </g>
</svg>";

pub fn editor() -> Editor {
    Editor::new(DIAGRAM, EditorOptions::default()).unwrap()
}

/// A sink that keeps delivered files in memory.
#[derive(Default)]
pub struct MemorySink {
    pub files: Vec<(String, svgedit::Blob)>,
}

impl svgedit::DownloadSink for MemorySink {
    fn deliver(&mut self, file_name: &str, blob: &svgedit::Blob) -> std::io::Result<()> {
        self.files.push((file_name.to_string(), blob.clone()));
        Ok(())
    }
}
