// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use image::ImageEncoder;
use once_cell::sync::Lazy;
use rwsvgtree::{Document, WriteOptions};
use usvg::fontdb;

use crate::Error;

/// A canvas size used when a document has no valid `viewBox`.
pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (800, 600);

// fontdb initialization is pretty expensive, so perform it only once.
static FONTDB: Lazy<fontdb::Database> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("Loaded {} font faces.", db.len());
    db
});

/// An export output format.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ExportFormat {
    Svg,
    Png,
    Webp,
    Jpeg,
}

impl ExportFormat {
    /// Returns a file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Webp => "webp",
            ExportFormat::Jpeg => "jpeg",
        }
    }

    /// Returns a MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
            ExportFormat::Webp => "image/webp",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    /// Returns a quality used when none was requested.
    pub fn default_quality(&self) -> f32 {
        match self {
            ExportFormat::Jpeg => 0.85,
            _ => 0.9,
        }
    }

    /// Checks that the format requires rasterization.
    #[inline]
    pub fn is_raster(&self) -> bool {
        *self != ExportFormat::Svg
    }

    /// Guesses a format from a file extension.
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ext.parse().ok()
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "webp" => Ok(ExportFormat::Webp),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            _ => Err("invalid format"),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// An export request.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ExportRequest {
    /// Output format.
    pub format: ExportFormat,

    /// Lossy encoding quality in a 0..1 range.
    ///
    /// Used only by JPEG.
    pub quality: f32,
}

impl ExportRequest {
    /// Creates a request with the format's default quality.
    pub fn new(format: ExportFormat) -> Self {
        ExportRequest {
            format,
            quality: format.default_quality(),
        }
    }
}

/// An encoded export result.
#[derive(Clone, PartialEq, Debug)]
pub struct Blob {
    /// Content MIME type.
    pub mime_type: &'static str,

    /// Encoded data.
    pub data: Vec<u8>,
}

/// An export pipeline stage.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExportStage {
    Serializing,
    Rasterizing,
    Encoding,
    Delivering,
}

impl std::fmt::Display for ExportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ExportStage::Serializing => "serializing",
            ExportStage::Rasterizing => "rasterizing",
            ExportStage::Encoding => "encoding",
            ExportStage::Delivering => "delivering",
        };

        write!(f, "{}", name)
    }
}

/// An export error.
#[derive(Debug)]
pub enum ExportError {
    /// Failed to produce an image.
    RasterizationFailed {
        /// A stage that failed.
        stage: ExportStage,
        /// Failure details.
        reason: String,
    },

    /// Failed to deliver an image.
    Io(std::io::Error),
}

impl ExportError {
    fn rasterization(stage: ExportStage, reason: impl ToString) -> Self {
        ExportError::RasterizationFailed {
            stage,
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ExportError::RasterizationFailed { stage, ref reason } => {
                write!(f, "export failed while {}: {}", stage, reason)
            }
            ExportError::Io(ref e) => write!(f, "failed to deliver an export: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            ExportError::Io(ref e) => Some(e),
            _ => None,
        }
    }
}

/// A destination of exported files.
pub trait DownloadSink {
    /// Delivers an exported file.
    fn deliver(&mut self, file_name: &str, blob: &Blob) -> std::io::Result<()>;
}

/// Writes exported files into a directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates a new sink.
    ///
    /// The directory must exist.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        DirectorySink { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, blob: &Blob) -> std::io::Result<()> {
        std::fs::write(self.dir.join(file_name), &blob.data)
    }
}

/// Exports a document.
///
/// Raster formats are rendered on a `viewBox`-sized canvas,
/// or [`DEFAULT_CANVAS_SIZE`] when there is none, over a white background.
pub fn export(
    doc: &Document,
    request: &ExportRequest,
    opt: &WriteOptions,
) -> Result<Blob, ExportError> {
    log::debug!("Export: {}.", ExportStage::Serializing);
    let svg = doc.to_string(opt);

    if !request.format.is_raster() {
        return Ok(Blob {
            mime_type: request.format.mime_type(),
            data: svg.into_bytes(),
        });
    }

    log::debug!("Export: {}.", ExportStage::Rasterizing);
    let pixmap = rasterize(&svg, canvas_size(doc))?;

    log::debug!("Export: {}.", ExportStage::Encoding);
    let data = encode(&pixmap, request)?;

    Ok(Blob {
        mime_type: request.format.mime_type(),
        data,
    })
}

/// Exports a document and hands it to a sink as `<stem>.<ext>`.
pub fn download(
    doc: &Document,
    request: &ExportRequest,
    stem: &str,
    opt: &WriteOptions,
    sink: &mut dyn DownloadSink,
) -> Result<(), ExportError> {
    let blob = export(doc, request, opt)?;

    let file_name = format!("{}.{}", stem, request.format.extension());
    log::debug!("Export: {} '{}'.", ExportStage::Delivering, file_name);
    sink.deliver(&file_name, &blob).map_err(ExportError::Io)
}

/// Downloads a template preview without starting an editing session.
///
/// The file is named `template.<ext>`.
pub fn export_template(
    svg: &str,
    format: ExportFormat,
    sink: &mut dyn DownloadSink,
) -> Result<(), Error> {
    let doc = Document::parse_str(svg)?;
    let request = ExportRequest::new(format);
    download(&doc, &request, "template", &WriteOptions::default(), sink)?;
    Ok(())
}

/// Returns a raster canvas size.
///
/// A fractional `viewBox` size is rounded up.
pub fn canvas_size(doc: &Document) -> (u32, u32) {
    match doc.view_box() {
        Some(vb) => (vb.w.ceil() as u32, vb.h.ceil() as u32),
        None => DEFAULT_CANVAS_SIZE,
    }
}

fn parse_tree(svg: &str, (width, height): (u32, u32)) -> Result<usvg::Tree, ExportError> {
    let mut opt = usvg::Options::default();
    if let Some(size) = usvg::Size::from_wh(width as f32, height as f32) {
        opt.default_size = size;
    }

    usvg::Tree::from_str(svg, &opt, &FONTDB)
        .map_err(|e| ExportError::rasterization(ExportStage::Rasterizing, e))
}

fn rasterize(svg: &str, (width, height): (u32, u32)) -> Result<tiny_skia::Pixmap, ExportError> {
    let tree = parse_tree(svg, (width, height))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        ExportError::rasterization(
            ExportStage::Rasterizing,
            format!("failed to allocate a {}x{} canvas", width, height),
        )
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let tree_size = tree.size();
    let ts = tiny_skia::Transform::from_scale(
        width as f32 / tree_size.width(),
        height as f32 / tree_size.height(),
    );
    resvg::render(&tree, ts, &mut pixmap.as_mut());

    Ok(pixmap)
}

fn encode(pixmap: &tiny_skia::Pixmap, request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
    let map_err = |e: image::ImageError| ExportError::rasterization(ExportStage::Encoding, e);

    let mut buf = Vec::new();
    match request.format {
        ExportFormat::Png => {
            return pixmap
                .encode_png()
                .map_err(|e| ExportError::rasterization(ExportStage::Encoding, e));
        }
        ExportFormat::Jpeg => {
            let quality = quality_percent(request.quality);
            log::debug!("JPEG quality: {}.", quality);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            encoder
                .write_image(
                    &rgb_data(pixmap),
                    pixmap.width(),
                    pixmap.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(map_err)?;
        }
        ExportFormat::Webp => {
            // `image` can only write lossless WebP.
            log::debug!("WebP is lossless. Quality {} is ignored.", request.quality);
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut buf);
            encoder
                .write_image(
                    &rgba_data(pixmap),
                    pixmap.width(),
                    pixmap.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(map_err)?;
        }
        ExportFormat::Svg => {
            return Err(ExportError::rasterization(
                ExportStage::Encoding,
                "SVG is not a raster format",
            ));
        }
    }

    Ok(buf)
}

fn quality_percent(quality: f32) -> u8 {
    let q = (quality.clamp(0.0, 1.0) * 100.0).round() as u8;
    q.max(1)
}

fn rgba_data(pixmap: &tiny_skia::Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    data
}

fn rgb_data(pixmap: &tiny_skia::Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.data().len() / 4 * 3);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    data
}

/// An element bounding box in document units.
#[derive(Clone, PartialEq, Debug)]
pub struct ElementBounds {
    /// Element's ID.
    pub id: String,
    #[allow(missing_docs)]
    pub x: f32,
    #[allow(missing_docs)]
    pub y: f32,
    #[allow(missing_docs)]
    pub width: f32,
    #[allow(missing_docs)]
    pub height: f32,
}

impl ElementBounds {
    /// Checks that a point is inside the bounding box.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Returns bounding boxes of all rendered elements in paint order.
///
/// Elements that produce no graphics, like `defs` content, are not listed.
pub fn element_bounds(doc: &Document) -> Result<Vec<ElementBounds>, ExportError> {
    let svg = doc.to_string(&WriteOptions::default());
    let tree = parse_tree(&svg, canvas_size(doc))?;

    let mut list = Vec::new();
    element_bounds_impl(tree.root(), &mut list);
    Ok(list)
}

fn element_bounds_impl(parent: &usvg::Group, list: &mut Vec<ElementBounds>) {
    for node in parent.children() {
        if !node.id().is_empty() {
            let bbox = node.abs_bounding_box();
            list.push(ElementBounds {
                id: node.id().to_string(),
                x: bbox.x(),
                y: bbox.y(),
                width: bbox.width(),
                height: bbox.height(),
            });
        }

        if let usvg::Node::Group(ref group) = node {
            element_bounds_impl(group, list);
        }
    }
}

/// Returns the topmost element under a point.
pub fn hit_test(doc: &Document, x: f32, y: f32) -> Result<Option<String>, ExportError> {
    let list = element_bounds(doc)?;
    Ok(list
        .into_iter()
        .rev()
        .find(|b| b.contains(x, y))
        .map(|b| b.id))
}
