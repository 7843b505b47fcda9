use super::*;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ColumnLayout;
use crate::input::records::{load_case_file, load_group_file};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("nucleator_bin_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

#[test]
fn test_measurement_file_name_with_and_without_run() {
    assert_eq!(
        measurement_file_name("Case B", "Nuc 2", "Basal", "Astrocyte"),
        "Case B Nuc 2 Basal Astrocyte.txt"
    );
    assert_eq!(
        measurement_file_name("Case B", "", "Basal", "Astrocyte"),
        "Case B Basal Astrocyte.txt"
    );
    assert_eq!(case_file_name("Case B"), "Case B.txt");
}

#[test]
fn test_read_delimited_splits_tabs_and_drops_blank_lines() {
    let dir = make_temp_dir();
    let path = dir.join("rows.txt");
    write_file(&path, "a\tb\tc\r\n\nd\te\tf\n\n");

    let rows = read_delimited(&path).unwrap();
    assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_file_is_a_distinct_error() {
    let dir = make_temp_dir();
    let err = read_delimited(&dir.join("no such file.txt")).unwrap_err();
    assert!(matches!(err, InputError::MissingInput(_)));
    assert!(err.to_string().contains("no such file.txt"));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_group_file_tags_and_parses() {
    let dir = make_temp_dir();
    let path = dir.join("Case B Basal Astrocyte.txt");
    let mut contents = String::from("Marker\tArea\tVolume\n");
    contents.push_str("AstroMicro\t5.1\t3.2\n");
    contents.push_str("AstroMicro\tNA\tNA\n");
    contents.push_str("AstroMicro\t8.0\t27.9\n");
    for i in 0..6 {
        contents.push_str(&format!("Summary {i}\t\t\n"));
    }
    write_file(&path, &contents);

    let layout = ColumnLayout::per_group();
    let records = load_group_file(&path, "Case B", "", "Basal", &layout).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].case, "Case B");
    assert_eq!(records[0].region, "Basal");
    assert_eq!(records[0].marker, "AstroMicro");
    assert_eq!(records[0].area, Some(5.1));
    assert_eq!(records[0].volume, Some(3.2));
    assert_eq!(records[1].area, None);
    assert_eq!(records[1].volume, None);
    assert_eq!(records[2].volume, Some(27.9));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_case_file_reads_marker_column_and_header() {
    let dir = make_temp_dir();
    let path = dir.join("Case B.txt");
    let mut contents = String::from("Marker\tc1\tc2\tc3\tArea\tVolume\n");
    contents.push_str("AstroMicro\tx\tx\tx\t5.1\t3.2\n");
    contents.push_str("Oligodendrocyte\tx\tx\tx\t7.7\t12.0\n");
    write_file(&path, &contents);

    let layout = ColumnLayout::per_case();
    let loaded = load_case_file(&path, "Case B", &layout).unwrap();

    assert_eq!(loaded.marker_header, "Marker");
    assert_eq!(loaded.records.len(), 2);
    assert_eq!(loaded.records[0].marker, "AstroMicro");
    assert_eq!(loaded.records[0].area, Some(5.1));
    assert_eq!(loaded.records[1].volume, Some(12.0));
    assert!(loaded.records[1].region.is_empty());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_correction_table_load_pads_short_rows() {
    let dir = make_temp_dir();
    let path = dir.join("counts.txt");
    write_file(
        &path,
        "Case\tRun\tRegion\tCell\tCount\nCase B\t\tBasal\tAstroMicro\t120\nCase B\n",
    );

    let table = correction::CorrectionTable::load(&path).unwrap();
    assert_eq!(table.len(), 2);
    let key = correction::GroupKey {
        case: "Case B",
        run: None,
        region: Some("Basal"),
        marker: "AstroMicro",
    };
    assert_eq!(table.lookup(&key), Some(120.0));

    fs::remove_dir_all(&dir).ok();
}
