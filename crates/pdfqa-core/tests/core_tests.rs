use std::fs;
use tempfile::TempDir;

use pdfqa_core::data_processor::{DataProcessor, PageDocument};

#[test]
fn directory_without_pdfs_yields_no_chunks() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes.txt"), "not a pdf").unwrap();
    let chunks = DataProcessor::new().process_directory(tmp.path()).expect("process");
    assert!(chunks.is_empty());
}

#[test]
fn unreadable_pdf_is_skipped() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.pdf"), b"this is not really a pdf").unwrap();
    let chunks = DataProcessor::new().process_directory(tmp.path()).expect("process");
    assert!(chunks.is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(DataProcessor::new().process_directory(&tmp.path().join("absent")).is_err());
}

#[test]
fn pages_split_into_chunks_with_provenance() {
    let pages = vec![
        PageDocument { source: "papers/attention.pdf".into(), page: 1, text: "Transformers use attention.".into() },
        PageDocument { source: "papers/attention.pdf".into(), page: 2, text: "word ".repeat(400) },
    ];
    let chunks = DataProcessor::new().split_pages(&pages);

    assert_eq!(chunks[0].id, "attention:1:0");
    assert_eq!(chunks[0].page, Some(1));
    assert_eq!(chunks[0].text, "Transformers use attention.");
    let second_page: Vec<_> = chunks.iter().filter(|c| c.page == Some(2)).collect();
    assert!(second_page.len() >= 2, "2000 chars at chunk size 800 need several chunks");
    for (i, c) in second_page.iter().enumerate() {
        assert_eq!(c.id, format!("attention:2:{i}"));
        assert_eq!(c.source, "papers/attention.pdf");
        assert!(c.text.chars().count() <= 800);
    }
}

fn write_pdf(path: &std::path::Path, pages: &[&str]) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! { "Font" => dictionary! { "F1" => font_id } });
    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    doc.objects.insert(pages_id, Object::Dictionary(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    }));
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn pdf_pages_are_loaded_with_one_based_numbers() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("papers");
    fs::create_dir_all(&dir).unwrap();
    write_pdf(&dir.join("capitals.pdf"), &["Paris is the capital of France.", "Berlin is the capital of Germany."]);

    let processor = DataProcessor::new();
    let pages = processor.load_pages(tmp.path(), usize::MAX).expect("load");
    assert_eq!(pages.iter().map(|p| p.page).collect::<Vec<_>>(), vec![1, 2]);
    assert!(pages[0].text.contains("Paris"), "{:?}", pages[0].text);
    assert!(pages[1].text.contains("Berlin"), "{:?}", pages[1].text);
    assert!(pages[0].source.ends_with("capitals.pdf"));

    let chunks = processor.process_directory(tmp.path()).expect("process");
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["capitals:1:0", "capitals:2:0"]);
    assert_eq!(chunks[1].page, Some(2));
}

#[test]
fn limit_caps_the_number_of_pdfs() {
    let tmp = TempDir::new().unwrap();
    write_pdf(&tmp.path().join("a.pdf"), &["Alpha page."]);
    write_pdf(&tmp.path().join("b.pdf"), &["Beta page."]);

    let chunks = DataProcessor::new().process_directory_limited(tmp.path(), 1).expect("process");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].id, "a:1:0");
}
