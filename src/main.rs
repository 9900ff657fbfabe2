// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![allow(clippy::uninlined_format_args)]

use std::path;

use svgedit::{
    export, DirectorySink, DocumentSource, Editor, EditorOptions, ExportFormat, ExportRequest,
    FieldKind, JsonTemplateStore, MatchResponse, TEXT_CONTENT,
};

fn main() {
    if let Err(e) = process() {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn timed<F, T>(perf: bool, name: &str, mut f: F) -> T
where
    F: FnMut() -> T,
{
    let now = std::time::Instant::now();
    let result = f();
    if perf {
        let elapsed = now.elapsed().as_micros() as f64 / 1000.0;
        println!("{}: {:.2}ms", name, elapsed);
    }

    result
}

fn process() -> Result<(), String> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            println!("{}", HELP);
            return Err(e);
        }
    };

    // Do not print warning during the ID querying.
    if !(args.query_all || args.quiet) {
        if let Ok(()) = log::set_logger(&LOGGER) {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    let store = match args.templates {
        Some(ref path) => timed(args.perf, "Templates Loading", || {
            JsonTemplateStore::load(path).map_err(|e| e.to_string())
        })?,
        None => JsonTemplateStore::default(),
    };

    let source = match args.input {
        InputFrom::Template(ref id) => DocumentSource::Template(id.clone()),
        InputFrom::Response(ref path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|_| "failed to open the provided response file")?;
            MatchResponse::from_json(&text)
                .and_then(MatchResponse::into_source)
                .map_err(|e| e.to_string())?
        }
        InputFrom::Stdin => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin()
                .lock()
                .read_to_string(&mut buf)
                .map_err(|_| "failed to read stdin")?;
            DocumentSource::Svg(buf)
        }
        InputFrom::File(ref file) => {
            let text = std::fs::read_to_string(file)
                .map_err(|_| "failed to open the provided file")?;
            DocumentSource::Svg(text)
        }
    };

    let mut editor = timed(args.perf, "SVG Parsing", || {
        Editor::from_source(&source, &store, EditorOptions::default()).map_err(|e| e.to_string())
    })?;

    if args.query_all {
        return query_all(&editor);
    }

    if let Some(ref id) = args.inspect {
        return inspect(&mut editor, id);
    }

    timed(args.perf, "Editing", || -> Result<(), String> {
        for (id, key, value) in &args.edits {
            editor
                .apply_mutation(id, key, value)
                .map_err(|e| e.to_string())?;
        }

        for (id, value) in &args.texts {
            editor
                .apply_mutation(id, TEXT_CONTENT, value)
                .map_err(|e| e.to_string())?;
        }

        for _ in 0..args.undo {
            if editor.undo().map_err(|e| e.to_string())?.is_none() {
                log::warn!("Nothing left to undo.");
                break;
            }
        }

        Ok(())
    })?;

    let request = ExportRequest {
        format: args.format,
        quality: args.quality.unwrap_or_else(|| args.format.default_quality()),
    };

    match args.output {
        Some(OutputTo::Stdout) => {
            use std::io::Write;
            let blob = timed(args.perf, "Exporting", || {
                editor.export(&request).map_err(|e| e.to_string())
            })?;
            std::io::stdout()
                .write_all(&blob.data)
                .map_err(|_| "failed to write to stdout")?;
        }
        Some(OutputTo::File(ref file)) => {
            let blob = timed(args.perf, "Exporting", || {
                editor.export(&request).map_err(|e| e.to_string())
            })?;
            timed(args.perf, "Saving", || {
                std::fs::write(file, &blob.data).map_err(|e| e.to_string())
            })?;
        }
        Some(OutputTo::Directory(ref dir)) => {
            let mut sink = DirectorySink::new(dir.clone());
            timed(args.perf, "Exporting", || {
                export::download(
                    editor.document(),
                    &request,
                    "diagram",
                    &editor.options().write,
                    &mut sink,
                )
                .map_err(|e| e.to_string())
            })?;
        }
        None => {}
    }

    Ok(())
}

const HELP: &str = "\
svgedit is an SVG editing application.

USAGE:
  svgedit [OPTIONS] <in-svg> <out-file>     # from file to file
  svgedit [OPTIONS] <in-svg> <out-dir>      # from file to <out-dir>/diagram.<ext>
  svgedit [OPTIONS] <in-svg> -c             # from file to stdout
  svgedit [OPTIONS] - <out-file>            # from stdin to file
  svgedit [OPTIONS] --templates FILE --template ID <out-file>
  svgedit [OPTIONS] --response FILE <out-file>

  svgedit in.svg out.png
  svgedit --set element-0:fill=#60a5fa --text element-1='Hello' in.svg out.jpeg
  svgedit --query-all in.svg

OPTIONS:
      --help                    Prints this help
  -V, --version                 Prints version
  -c                            Prints the output to the stdout

  --templates FILE              Loads templates from a JSON file
  --template ID                 Edits a template instead of <in-svg>
  --response FILE               Edits a document picked by a matching service
                                response. Template IDs are resolved using
                                the --templates file

  --set ID:KEY=VALUE            Sets an element attribute.
                                This option can be set multiple times
  --text ID=VALUE               Sets a text element content.
                                This option can be set multiple times
                                and is applied after all --set options
  --undo N                      Undoes the last N edits

  -f, --format FORMAT           Sets the output format
                                [default: output file extension or svg]
                                [possible values: svg, png, webp, jpeg]
  -q, --quality Q               Sets the lossy encoding quality
                                [default: 0.85 for jpeg, 0.9 otherwise]
                                [possible values: 0..1 (inclusive)]

  --query-all                   Queries all rendered IDs with bounding boxes
  --inspect ID                  Prints editable properties of an element

  --perf                        Prints performance stats
  --quiet                       Disables warnings

ARGS:
  <in-svg>                      Input file
  <out-file>                    Output file
";

#[derive(Debug)]
struct CliArgs {
    templates: Option<path::PathBuf>,
    template: Option<String>,
    response: Option<path::PathBuf>,

    edits: Vec<(String, String, String)>,
    texts: Vec<(String, String)>,
    undo: u32,

    stdout: bool,
    format: Option<ExportFormat>,
    quality: Option<f32>,

    query_all: bool,
    inspect: Option<String>,

    perf: bool,
    quiet: bool,

    free: Vec<String>,
}

fn collect_args() -> Result<CliArgs, pico_args::Error> {
    let mut input = pico_args::Arguments::from_env();

    if input.contains("--help") {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let mut args = CliArgs {
        templates: input.opt_value_from_str("--templates")?,
        template: input.opt_value_from_str("--template")?,
        response: input.opt_value_from_str("--response")?,

        edits: input.values_from_fn("--set", parse_edit)?,
        texts: input.values_from_fn("--text", parse_text)?,
        undo: input.opt_value_from_str("--undo")?.unwrap_or(0),

        stdout: input.contains("-c"),
        format: input.opt_value_from_str(["-f", "--format"])?,
        quality: input.opt_value_from_fn(["-q", "--quality"], parse_quality)?,

        query_all: input.contains("--query-all"),
        inspect: input.opt_value_from_str("--inspect")?,

        perf: input.contains("--perf"),
        quiet: input.contains("--quiet"),

        free: Vec::new(),
    };

    while let Some(arg) = input.opt_free_from_str::<String>()? {
        args.free.push(arg);
    }

    Ok(args)
}

fn parse_edit(s: &str) -> Result<(String, String, String), String> {
    let (id, rest) = s.split_once(':').ok_or("expected ID:KEY=VALUE")?;
    let (key, value) = rest.split_once('=').ok_or("expected ID:KEY=VALUE")?;

    if id.is_empty() || key.is_empty() {
        return Err("ID and KEY cannot be empty".to_string());
    }

    Ok((id.to_string(), key.to_string(), value.to_string()))
}

fn parse_text(s: &str) -> Result<(String, String), String> {
    let (id, value) = s.split_once('=').ok_or("expected ID=VALUE")?;

    if id.is_empty() {
        return Err("ID cannot be empty".to_string());
    }

    Ok((id.to_string(), value.to_string()))
}

fn parse_quality(s: &str) -> Result<f32, String> {
    let n: f32 = s.parse().map_err(|_| "invalid quality")?;

    if (0.0..=1.0).contains(&n) {
        Ok(n)
    } else {
        Err("quality out of bounds".to_string())
    }
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom {
    Stdin,
    File(path::PathBuf),
    Template(String),
    Response(path::PathBuf),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo {
    Stdout,
    File(path::PathBuf),
    Directory(path::PathBuf),
}

struct Args {
    input: InputFrom,
    output: Option<OutputTo>,
    templates: Option<path::PathBuf>,

    edits: Vec<(String, String, String)>,
    texts: Vec<(String, String)>,
    undo: u32,

    format: ExportFormat,
    quality: Option<f32>,

    query_all: bool,
    inspect: Option<String>,

    perf: bool,
    quiet: bool,
}

fn parse_args() -> Result<Args, String> {
    let args = collect_args().map_err(|e| e.to_string())?;

    let mut free = args.free.into_iter();

    let input = if let Some(id) = args.template {
        if args.templates.is_none() {
            return Err("--template requires --templates".to_string());
        }

        InputFrom::Template(id)
    } else if let Some(path) = args.response {
        InputFrom::Response(path)
    } else {
        match free.next() {
            Some(ref s) if s == "-" => InputFrom::Stdin,
            Some(s) => InputFrom::File(s.into()),
            None => return Err("<in-svg> must be set".to_string()),
        }
    };

    let output = match free.next() {
        Some(s) => {
            let path = path::PathBuf::from(s);
            if path.is_dir() {
                Some(OutputTo::Directory(path))
            } else {
                Some(OutputTo::File(path))
            }
        }
        None if args.stdout => Some(OutputTo::Stdout),
        None => None,
    };

    if free.next().is_some() {
        return Err("too many arguments".to_string());
    }

    if output.is_none() && !(args.query_all || args.inspect.is_some()) {
        return Err("<out-file> must be set".to_string());
    }

    let format = match (args.format, &output) {
        (Some(format), _) => format,
        (None, Some(OutputTo::File(ref path))) => {
            ExportFormat::from_extension(path).unwrap_or(ExportFormat::Svg)
        }
        _ => ExportFormat::Svg,
    };

    Ok(Args {
        input,
        output,
        templates: args.templates,

        edits: args.edits,
        texts: args.texts,
        undo: args.undo,

        format,
        quality: args.quality,

        query_all: args.query_all,
        inspect: args.inspect,

        perf: args.perf,
        quiet: args.quiet,
    })
}

fn query_all(editor: &Editor) -> Result<(), String> {
    let list = export::element_bounds(editor.document()).map_err(|e| e.to_string())?;

    if list.is_empty() {
        return Err("the file has no rendered elements".to_string());
    }

    fn round_len(v: f32) -> f32 {
        (v * 1000.0).round() / 1000.0
    }

    for bbox in list {
        println!(
            "{},{},{},{},{}",
            bbox.id,
            round_len(bbox.x),
            round_len(bbox.y),
            round_len(bbox.width),
            round_len(bbox.height)
        );
    }

    Ok(())
}

fn inspect(editor: &mut Editor, id: &str) -> Result<(), String> {
    editor.select_element(id).map_err(|e| e.to_string())?;

    let panel = match editor.property_panel() {
        Some(panel) => panel,
        None => return Ok(()),
    };

    println!("{} ({})", panel.element_id(), panel.kind());
    for field in panel.fields() {
        let kind = match field.kind {
            FieldKind::Number => "number".to_string(),
            FieldKind::Text => "text".to_string(),
            FieldKind::Choice(list) | FieldKind::Swatches(list) => list.join("|"),
            FieldKind::Slider { min, max, step } => format!("{}..{} step {}", min, max, step),
        };

        println!("  {} = '{}' [{}]", field.key, field.value, kind);
    }

    Ok(())
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
