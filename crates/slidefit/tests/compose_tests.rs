use image::{Rgb, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use slidefit::constants::pt_to_emu;
use slidefit::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    // Create pages array
    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // Create pages dict
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write `count` solid PNGs of the given pixel size
fn write_images(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("img{:02}.png", i));
            RgbImage::from_pixel(width, height, Rgb([i as u8 * 20, 80, 160]))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

fn options_with_images(dir: &Path, count: usize, grid: GridShape) -> SlideFitOptions {
    SlideFitOptions {
        images: write_images(dir, count, 40, 30),
        grid,
        ..Default::default()
    }
}

fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

fn xobject_count(doc: &Document, page_id: ObjectId) -> usize {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = match page.get(b"Resources").unwrap() {
        Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
        Object::Dictionary(dict) => dict,
        other => panic!("unexpected Resources {:?}", other),
    };
    match resources.get(b"XObject") {
        Ok(Object::Dictionary(dict)) => dict.len(),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).unwrap().len(),
        _ => 0,
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f32> {
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|obj| obj.as_float().unwrap())
        .collect()
}

#[tokio::test]
async fn test_blank_deck_gets_one_page_per_grid() {
    let dir = TempDir::new().unwrap();
    let options = options_with_images(dir.path(), 10, GridShape::new(2, 2).unwrap());

    let composition = compose(&options).await.unwrap();
    assert!(composition.is_clean());

    let stats = composition.statistics();
    assert_eq!(stats.canvases, 3);
    assert_eq!(stats.new_canvases, 3);
    assert_eq!(stats.reused_canvases, 0);
    assert_eq!(stats.capacity, 12);
    assert_eq!(stats.images_placed, 10);
    assert_eq!(stats.images_dropped, 0);

    let doc = &composition.document;
    let page_ids = pages(doc);
    assert_eq!(page_ids.len(), 3);
    assert_eq!(xobject_count(doc, page_ids[0]), 4);
    assert_eq!(xobject_count(doc, page_ids[1]), 4);
    assert_eq!(xobject_count(doc, page_ids[2]), 2);

    // Standard 4:3 slide, landscape
    assert_eq!(media_box(doc, page_ids[0]), vec![0.0, 0.0, 720.0, 540.0]);
}

#[tokio::test]
async fn test_single_image_is_centered() {
    let dir = TempDir::new().unwrap();
    let options = SlideFitOptions {
        images: write_images(dir.path(), 1, 360, 270),
        ..Default::default()
    };

    let composition = compose(&options).await.unwrap();
    let doc = &composition.document;
    let page_id = pages(doc)[0];
    let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();

    // 360x270pt image on a 720x540pt page: 180pt either side, 135pt above and below
    assert!(
        content.contains("q 360 0 0 270 180 135 cm /SfIm"),
        "unexpected content: {}",
        content
    );
}

/// Write a PNG declaring 144 dpi in a pHYs chunk
fn write_144_dpi_png(path: &Path, width: u32, height: u32) {
    let mut png = Vec::new();
    RgbImage::from_pixel(width, height, Rgb([10, 120, 200]))
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    // 5669 pixels per meter, unit meter
    let mut data = Vec::new();
    data.extend_from_slice(&5669u32.to_be_bytes());
    data.extend_from_slice(&5669u32.to_be_bytes());
    data.push(1);
    let mut crc = flate2::Crc::new();
    crc.update(b"pHYs");
    crc.update(&data);

    let mut bytes = png[..33].to_vec();
    bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    bytes.extend_from_slice(b"pHYs");
    bytes.extend_from_slice(&data);
    bytes.extend_from_slice(&crc.sum().to_be_bytes());
    bytes.extend_from_slice(&png[33..]);
    std::fs::write(path, bytes).unwrap();
}

#[tokio::test]
async fn test_image_resolution_from_header() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("hidpi.png");
    write_144_dpi_png(&image, 720, 540);
    let options = SlideFitOptions {
        images: vec![image],
        ..Default::default()
    };

    let composition = compose(&options).await.unwrap();
    let doc = &composition.document;
    let content = String::from_utf8(doc.get_page_content(pages(doc)[0]).unwrap()).unwrap();

    // 720x540px at 144 dpi is 360x270pt, not the full 720x540pt page
    assert!(
        content.contains("q 360 0 0 270 180 135 cm /SfIm"),
        "unexpected content: {}",
        content
    );
}

#[tokio::test]
async fn test_template_is_extended_with_clones() {
    let dir = TempDir::new().unwrap();
    let images = write_images(dir.path(), 5, 40, 30);
    let sources = read_image_sources(&images).await.unwrap();
    let options = SlideFitOptions {
        images,
        ..Default::default()
    };

    let composition = compose_with(Some(create_test_pdf(2)), &sources, &options).unwrap();
    assert!(composition.is_clean());

    let plan = &composition.plan;
    assert_eq!(
        plan.selection.targets,
        vec![
            CanvasTarget::Existing(0),
            CanvasTarget::Existing(1),
            CanvasTarget::New(NewCanvasLayout::CloneOf(1)),
            CanvasTarget::New(NewCanvasLayout::CloneOf(1)),
            CanvasTarget::New(NewCanvasLayout::CloneOf(1)),
        ]
    );

    let doc = &composition.document;
    let page_ids = pages(doc);
    assert_eq!(page_ids.len(), 5);
    for &page_id in &page_ids {
        assert_eq!(media_box(doc, page_id), vec![0.0, 0.0, 612.0, 792.0]);
        assert_eq!(xobject_count(doc, page_id), 1);
    }
}

#[tokio::test]
async fn test_template_content_is_kept() {
    let dir = TempDir::new().unwrap();
    let images = write_images(dir.path(), 1, 40, 30);
    let sources = read_image_sources(&images).await.unwrap();
    let options = SlideFitOptions {
        images,
        ..Default::default()
    };

    let composition = compose_with(Some(create_test_pdf(1)), &sources, &options).unwrap();
    let doc = &composition.document;
    let content = String::from_utf8(doc.get_page_content(pages(doc)[0]).unwrap()).unwrap();

    let original = content.find("q Q").expect("template content dropped");
    let drawn = content.find(" Do ").expect("image not drawn");
    assert!(original < drawn);
}

/// One-page template drawn as a portrait page turned a quarter clockwise
fn rotated_template() -> Document {
    let mut doc = create_test_pdf(1);
    let page_id = pages(&doc)[0];
    let page = doc.get_dictionary_mut(page_id).unwrap();
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(540),
            Object::Integer(720),
        ]),
    );
    page.set("Rotate", Object::Integer(90));
    doc
}

#[tokio::test]
async fn test_rotated_template_is_filled_as_displayed() {
    let dir = TempDir::new().unwrap();
    let images = write_images(dir.path(), 3, 360, 270);
    let sources = read_image_sources(&images).await.unwrap();
    let options = SlideFitOptions {
        images,
        ..Default::default()
    };

    let composition = compose_with(Some(rotated_template()), &sources, &options).unwrap();
    assert!(composition.is_clean());
    // Displayed as 720x540pt, so the 360x270pt image fits unscaled
    assert_eq!(
        composition.plan.layout.render_size,
        Size::new(pt_to_emu(360.0), pt_to_emu(270.0))
    );

    let doc = &composition.document;
    let page_ids = pages(doc);
    assert_eq!(page_ids.len(), 3);
    for &page_id in &page_ids {
        let page = doc.get_dictionary(page_id).unwrap();
        assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
        assert_eq!(media_box(doc, page_id), vec![0.0, 0.0, 540.0, 720.0]);

        let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();
        assert!(
            content.contains("q 0 360 -270 0 405 180 cm /SfIm"),
            "unexpected content: {}",
            content
        );
    }
}

#[tokio::test]
async fn test_selected_pages_only() {
    let dir = TempDir::new().unwrap();
    let images = write_images(dir.path(), 3, 40, 30);
    let sources = read_image_sources(&images).await.unwrap();
    let options = SlideFitOptions {
        images,
        pages: Some("4,2".to_string()),
        grid: GridShape::new(2, 1).unwrap(),
        ..Default::default()
    };

    let composition = compose_with(Some(create_test_pdf(5)), &sources, &options).unwrap();
    assert!(composition.is_clean());
    assert_eq!(
        composition.plan.selection.targets,
        vec![CanvasTarget::Existing(1), CanvasTarget::Existing(3)]
    );

    let doc = &composition.document;
    let page_ids = pages(doc);
    assert_eq!(page_ids.len(), 5, "selected pages never add canvases");
    let counts: Vec<usize> = page_ids.iter().map(|&id| xobject_count(doc, id)).collect();
    assert_eq!(counts, vec![0, 2, 0, 1, 0]);
}

#[tokio::test]
async fn test_missing_pages_and_overflow_warn() {
    let dir = TempDir::new().unwrap();
    let images = write_images(dir.path(), 4, 40, 30);
    let sources = read_image_sources(&images).await.unwrap();
    let options = SlideFitOptions {
        images,
        pages: Some("2-5".to_string()),
        ..Default::default()
    };

    let composition = compose_with(Some(create_test_pdf(3)), &sources, &options).unwrap();
    assert!(!composition.is_clean());
    assert_eq!(
        composition.warnings,
        vec![
            Warning::TemplateUnderCapacity { template_pages: 3 },
            Warning::ImageOverflow {
                dropped: 2,
                total: 4
            },
        ]
    );

    let stats = composition.statistics();
    assert!(stats.truncated);
    assert_eq!(stats.canvases, 2);
    assert_eq!(stats.images_placed, 2);
    assert_eq!(stats.images_dropped, 2);
}

#[tokio::test]
async fn test_page_selection_ignored_without_template() {
    let dir = TempDir::new().unwrap();
    let mut options = options_with_images(dir.path(), 2, GridShape::default());
    options.pages = Some("7-x".to_string());

    let composition = compose(&options).await.unwrap();
    assert!(composition.is_clean());
    assert_eq!(pages(&composition.document).len(), 2);
}

#[tokio::test]
async fn test_same_image_is_embedded_once() {
    let dir = TempDir::new().unwrap();
    let image = write_images(dir.path(), 1, 40, 30).remove(0);
    let options = SlideFitOptions {
        images: vec![image.clone(), image.clone(), image],
        grid: GridShape::new(1, 3).unwrap(),
        ..Default::default()
    };

    let composition = compose(&options).await.unwrap();
    let doc = &composition.document;
    let image_streams = doc
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Image")
        })
        .count();
    assert_eq!(image_streams, 1);
}

#[tokio::test]
async fn test_widescreen_portrait_canvas() {
    let dir = TempDir::new().unwrap();
    let mut options = options_with_images(dir.path(), 1, GridShape::default());
    options.canvas = CanvasPreset::Widescreen;
    options.orientation = Orientation::Portrait;

    let composition = compose(&options).await.unwrap();
    let doc = &composition.document;
    assert_eq!(media_box(doc, pages(doc)[0]), vec![0.0, 0.0, 540.0, 960.0]);
}

#[tokio::test]
async fn test_no_images_fails() {
    let options = SlideFitOptions::default();
    assert!(matches!(
        compose(&options).await,
        Err(SlideFitError::NoImages)
    ));
}

#[tokio::test]
async fn test_missing_image_fails() {
    let dir = TempDir::new().unwrap();
    let options = SlideFitOptions {
        images: vec![dir.path().join("missing.png")],
        ..Default::default()
    };
    assert!(compose(&options).await.is_err());
}

#[tokio::test]
async fn test_margins_consuming_canvas_fail_before_drawing() {
    let dir = TempDir::new().unwrap();
    let images = write_images(dir.path(), 1, 40, 30);
    let sources = read_image_sources(&images).await.unwrap();
    let mut options = SlideFitOptions {
        images,
        ..Default::default()
    };
    options.reserved.left_percent = 70.0;
    options.reserved.right_percent = 40.0;

    match compose_with(None, &sources, &options) {
        Err(SlideFitError::InvalidMargins { axis, .. }) => assert_eq!(axis, Axis::Horizontal),
        other => panic!("Expected InvalidMargins, got {:?}", other.map(|c| c.warnings)),
    }
}

#[tokio::test]
async fn test_plan_run_draws_nothing() {
    let dir = TempDir::new().unwrap();
    let options = options_with_images(dir.path(), 7, GridShape::new(1, 3).unwrap());

    let plan = plan_run(&options).await.unwrap();
    assert_eq!(plan.statistics.canvases, 3);
    assert_eq!(plan.fill.placed(), 7);
    assert_eq!(plan.layout.capacity(), 3);
    assert!(plan.warnings(None).is_empty());
}
