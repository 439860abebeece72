//! Binding downloaded page images into one PDF per chapter.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::DownloadedImage;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("None of the {attempted} downloaded images could be decoded")]
    NoDecodableImages { attempted: usize },
    #[error("Failed to encode page {index}: {reason}")]
    Encode { index: usize, reason: String },
    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// An input file that did not decode as an image.
#[derive(Debug, Clone)]
pub struct SkippedImage {
    pub index: usize,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct AssembleReport {
    pub pages: usize,
    pub skipped: Vec<SkippedImage>,
}

/// One encoded page ready to embed.
struct PageImage {
    width: u32,
    height: u32,
    jpeg: Vec<u8>,
}

/// Writes PDFs with one image per page, each page sized to its image.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    jpeg_quality: u8,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl DocumentAssembler {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Bind `images` in order into a PDF at `output`.
    ///
    /// Undecodable inputs are skipped. Every input file is deleted before
    /// returning, whether or not a document was written.
    pub fn assemble(
        &self,
        images: &[DownloadedImage],
        output: &Path,
        title: &str,
    ) -> Result<AssembleReport, AssembleError> {
        let result = self.write_document(images, output, title);
        remove_inputs(images);
        result
    }

    fn write_document(
        &self,
        images: &[DownloadedImage],
        output: &Path,
        title: &str,
    ) -> Result<AssembleReport, AssembleError> {
        let mut report = AssembleReport::default();
        let mut pages = Vec::with_capacity(images.len());

        for image in images {
            let decoded = match decode(&image.path) {
                Ok(decoded) => decoded,
                Err(reason) => {
                    warn!(
                        "Skipping undecodable page {} ({}): {}",
                        image.index + 1,
                        image.path.display(),
                        reason
                    );
                    report.skipped.push(SkippedImage {
                        index: image.index,
                        path: image.path.clone(),
                        reason,
                    });
                    continue;
                }
            };
            pages.push(self.encode_page(&decoded, image.index)?);
        }

        if pages.is_empty() {
            return Err(AssembleError::NoDecodableImages {
                attempted: images.len(),
            });
        }

        report.pages = pages.len();
        let mut doc = build_pdf(pages, title)?;
        save_atomically(&mut doc, output)?;

        info!("Wrote {} ({} pages)", output.display(), report.pages);
        Ok(report)
    }

    fn encode_page(&self, image: &DynamicImage, index: usize) -> Result<PageImage, AssembleError> {
        let rgb = image.to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .encode_image(&rgb)
            .map_err(|e| AssembleError::Encode {
                index,
                reason: e.to_string(),
            })?;

        Ok(PageImage {
            width: rgb.width(),
            height: rgb.height(),
            jpeg,
        })
    }
}

fn decode(path: &Path) -> Result<DynamicImage, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())
}

fn build_pdf(pages: Vec<PageImage>, title: &str) -> Result<Document, AssembleError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for (index, PageImage { width, height, jpeg }) in pages.into_iter().enumerate() {
        let width = i64::from(width);
        let height = i64::from(height);

        let image_id = doc.add_object(
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                jpeg,
            )
            .with_compression(false),
        );

        // 1 px = 1 pt: scale the unit image square to the full page
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0.into(),
                        0.into(),
                        height.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|e| AssembleError::Encode {
            index,
            reason: e.to_string(),
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(page_id.into());
        debug!("Added page {} ({}x{})", index + 1, width, height);
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal(concat!("mangapress ", env!("CARGO_PKG_VERSION"))),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    Ok(doc)
}

/// Write next to the destination, then rename so a failed write never leaves
/// a truncated document under the final name.
fn save_atomically(doc: &mut Document, output: &Path) -> Result<(), AssembleError> {
    let partial = output.with_extension("pdf.part");
    let write_err = |reason: String| AssembleError::Write {
        path: output.to_path_buf(),
        reason,
    };

    if let Err(e) = doc.save(&partial) {
        let _ = std::fs::remove_file(&partial);
        return Err(write_err(e.to_string()));
    }
    std::fs::rename(&partial, output).map_err(|e| {
        let _ = std::fs::remove_file(&partial);
        write_err(e.to_string())
    })
}

fn remove_inputs(images: &[DownloadedImage]) {
    for image in images {
        if let Err(e) = std::fs::remove_file(&image.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove scratch file {}: {}", image.path.display(), e);
            }
        }
    }
}
