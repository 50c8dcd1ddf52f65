use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use ratecon_core::TextLayerBackend;
use ratecon_pdf_text::{LopdfLayer, PdfExtractLayer};

/// Write a minimal text-native PDF with `pages` pages of Courier text.
fn write_sample_pdf(path: &Path, pages: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!(
                        "Broker load sheet fixture page {}",
                        n + 1
                    ))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn pdf_extract_layer_reads_embedded_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.pdf");
    write_sample_pdf(&path, 1);

    let text = PdfExtractLayer::new().extract_text(&path).unwrap();
    assert!(text.contains("Broker load sheet fixture page 1"));
}

#[test]
fn lopdf_layer_marks_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.pdf");
    write_sample_pdf(&path, 2);

    let text = LopdfLayer::new().extract_text(&path).unwrap();
    assert!(text.contains("--- Page 1 ---"));
    assert!(text.contains("--- Page 2 ---"));
    assert!(text.contains("Broker load sheet fixture page 2"));
}
