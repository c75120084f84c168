//! Extraction integration tests that need neither pdfium nor an API key.
//!
//! Page text is supplied as line sequences shaped like the text layer of the
//! published placename orders.

use logainm::output::placenames_csv;
use logainm::{
    area_from_file_name, extract_directory, extract_pages, read_placenames_csv, write_placenames_csv,
    DocumentError, ExtractionConfig, NamePair, PlacenameRow, RunProgressCallback,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn pairs(expected: &[(&str, &str)]) -> Vec<NamePair> {
    expected.iter().map(|(en, ga)| NamePair::new(*en, *ga)).collect()
}

fn page(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}

// ── Page fixtures ────────────────────────────────────────────────────────────

#[test]
fn gaeltacht_2004_page() {
    let pages = vec![page(&[
        "AN tORDÚ LOGAINMNEACHA (CEANTAIR GHAELTACHTA) 2004",
        "SCEIDEAL",
        "Contae Mhaigh Eo",
        "1.",
        "Addergoole",
        "Eadargúil",
        "2.",
        "Attyshonock",
        "Áit Tí Seonac",
        "3.",
        "Carn",
        "An Carn",
        "4.",
        "Glebe",
        "An Seantóir",
        "5.",
        "Leathanach 3",
    ])];

    assert_eq!(
        extract_pages(&pages),
        pairs(&[
            ("Addergoole", "Eadargúil"),
            ("Attyshonock", "Áit Tí Seonac"),
            ("Carn", "An Carn"),
            ("Glebe", "An Seantóir"),
        ])
    );
}

#[test]
fn longford_pages_with_variants_and_annotations() {
    let pages = vec![
        page(&[
            "BARÚNACHT GHRANAIRD",
            "1.",
            "Abbey Land",
            "Fearann na Mainistreach",
            "2.",
            "Aghamore (part of)",
            "Achadh Mór",
            "3.",
            "Goat’s Island or Inishgower",
            "Inse an Ghabhair nó Inis Ghabhair",
            "4.",
        ]),
        page(&[
            "10.",
            "Garrycam [ED:Abbeylara]",
            "An Garraí Cam [TT:Mainistir Leathrátha]",
            "11.",
            "Abbey Land",
            "Fearann na Mainistreach",
            "12.",
        ]),
    ];

    assert_eq!(
        extract_pages(&pages),
        pairs(&[
            ("Abbey Land", "Fearann na Mainistreach"),
            ("Aghamore", "Achadh Mór"),
            ("Goat’s Island", "Inse an Ghabhair"),
            ("Garrycam", "An Garraí Cam"),
        ])
    );
}

#[test]
fn headers_between_records_are_skipped() {
    let pages = vec![page(&[
        "1.",
        "Adamstown",
        "Baile Adaim",
        "2.",
        "PARÓISTE CHAISLEÁN CNUCHA",
        "3.",
        "Castleknock",
        "Caisleán Cnucha",
        "4.",
        "Crumlin",
        "Cromghlinn",
    ])];

    // "2." opens a window whose names fail validation; the cursor then
    // slides one line at a time to "3.". The last record has no closing
    // marker on the page.
    assert_eq!(
        extract_pages(&pages),
        pairs(&[("Adamstown", "Baile Adaim"), ("Castleknock", "Caisleán Cnucha")])
    );
}

#[test]
fn page_numbers_with_digits_never_become_names() {
    let pages = vec![page(&["7.", "8", "Oileáin Eanach Dhúin", "9."])];
    assert!(extract_pages(&pages).is_empty());
}

// ── Area derivation ──────────────────────────────────────────────────────────

#[test]
fn fixture_file_names_map_to_areas() {
    let cases = [
        ("an-tordu-logainmneacha-ceantair-ghaeltachta-2004.pdf", "ceantair ghaeltachta"),
        ("an-tordu-logainmneacha-contae-an-longfoirt-2014-dreacht.pdf", "contae an longfoirt"),
        ("an-tordu-logainmneacha-contae-bhaile-atha-cliath-2011.pdf", "contae bhaile atha cliath"),
        ("an-tordu-logainmneacha-contae-laoise-2018-dreacht.pdf", "contae laoise"),
        ("announcement.pdf", "err"),
    ];
    for (file, area) in cases {
        assert_eq!(area_from_file_name(file), area, "{file}");
    }
}

// ── Directory boundary ───────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    started: AtomicUsize,
    errors: AtomicUsize,
    labels: Mutex<Vec<String>>,
    completed_with: AtomicUsize,
}

impl RunProgressCallback for Recorder {
    fn on_run_start(&self, total: usize) {
        self.started.store(total, Ordering::SeqCst);
    }

    fn on_item_start(&self, _index: usize, _total: usize, label: &str) {
        self.labels.lock().unwrap().push(label.to_string());
    }

    fn on_item_error(&self, _index: usize, _total: usize, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    fn on_run_complete(&self, _total: usize, success_count: usize) {
        self.completed_with.store(success_count, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn unreadable_documents_never_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b-notes.txt"), "not a pdf").unwrap();
    std::fs::write(
        dir.path().join("an-tordu-logainmneacha-contae-laoise-2018.pdf"),
        b"PK\x03\x04 zip, not pdf",
    )
    .unwrap();
    std::fs::create_dir(dir.path().join("subdir")).unwrap();

    let recorder = Arc::new(Recorder::default());
    let config = ExtractionConfig::builder()
        .progress_callback(recorder.clone() as Arc<dyn RunProgressCallback>)
        .build()
        .unwrap();

    let output = extract_directory(dir.path(), &config).await;

    assert_eq!(output.stats.total_documents, 2);
    assert_eq!(output.stats.failed_documents, 2);
    assert_eq!(output.stats.total_pairs, 0);

    let first = &output.documents[0];
    assert_eq!(first.file, "an-tordu-logainmneacha-contae-laoise-2018.pdf");
    assert_eq!(first.area, "contae laoise");
    assert!(first.pairs.is_empty());
    assert!(matches!(first.error, Some(DocumentError::Unreadable { .. })));
    assert_eq!(output.documents[1].area, "err");

    assert_eq!(recorder.started.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.errors.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.completed_with.load(Ordering::SeqCst), 0);
    assert_eq!(
        *recorder.labels.lock().unwrap(),
        vec!["an-tordu-logainmneacha-contae-laoise-2018.pdf", "b-notes.txt"]
    );
}

#[test]
fn empty_directory_sync() {
    let dir = tempfile::tempdir().unwrap();
    let output = tokio_test::block_on(extract_directory(dir.path(), &ExtractionConfig::default()));
    assert!(output.documents.is_empty());
    assert_eq!(placenames_csv(&output), "Ceantar,Logainm\n");
}

// ── CSV boundary ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn placenames_csv_round_trip() {
    use logainm::{DocumentResult, ExtractionOutput, ExtractionStats, ScanStats};

    let found = extract_pages(&[page(&[
        "1.",
        "Owenwee River",
        "An Abhainn Bhuí",
        "2.",
        "Fiddaunacushnane",
        "Feadán an Chuisneáin",
        "3.",
    ])]);
    let output = ExtractionOutput {
        documents: vec![DocumentResult {
            file: "an-tordu-logainmneacha-ceantair-ghaeltachta-2011.pdf".into(),
            area: "ceantair ghaeltachta".into(),
            pairs: found,
            pages: 1,
            scan: ScanStats::default(),
            duration_ms: 0,
            error: None,
        }],
        stats: ExtractionStats {
            total_pairs: 2,
            ..Default::default()
        },
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("placenames.csv");
    let written = write_placenames_csv(&path, &output).await.unwrap();
    assert_eq!(written, 2);

    let rows = read_placenames_csv(&path).await.unwrap();
    assert_eq!(
        rows,
        vec![
            PlacenameRow {
                area: "ceantair ghaeltachta".into(),
                placename: "An Abhainn Bhuí".into(),
            },
            PlacenameRow {
                area: "ceantair ghaeltachta".into(),
                placename: "Feadán an Chuisneáin".into(),
            },
        ]
    );
    assert!(!path.with_extension("csv.tmp").exists());
}

#[tokio::test]
async fn reads_pandas_style_csv_with_index_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("placenames.csv");
    std::fs::write(
        &path,
        ",Ceantar,Logainm\n0,ceantair ghaeltachta,Sruthán Áth na Circe\n1,ceantair ghaeltachta,\"Aill an Phúca, Thiar\"\n",
    )
    .unwrap();

    let rows = read_placenames_csv(&path).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].placename, "Sruthán Áth na Circe");
    assert_eq!(rows[1].placename, "Aill an Phúca, Thiar");
}
