use super::*;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::record::Metric;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("nucleator_bin_ingest_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn per_group_config(dir: &Path) -> RunConfig {
    RunConfig {
        input_dir: dir.to_path_buf(),
        cases: vec!["Case B".to_string()],
        runs: vec![String::new()],
        regions: vec!["Basal".to_string(), "Lateral".to_string()],
        cell_types: vec!["Astrocyte".to_string()],
        markers: vec!["AstroMicro".to_string()],
        metric: Metric::Volume,
        bin_size: 10.0,
        bin_min: 0.0,
        bin_max: 50.0,
        output_file: "binned.txt".to_string(),
        correction_source: String::new(),
        layout: LayoutKind::PerGroup,
        marker_column: None,
        area_column: None,
        volume_column: None,
        trailing_summary_rows: Some(0),
    }
}

fn group_file(marker: &str, volumes: &[&str]) -> String {
    let mut out = String::from("Marker\tArea\tVolume\n");
    for v in volumes {
        out.push_str(&format!("{marker}\t1.0\t{v}\n"));
    }
    out
}

#[test]
fn test_expected_files_cover_the_grouping() {
    let dir = make_temp_dir();
    let mut config = per_group_config(&dir);
    config.runs = vec!["Nuc 2".to_string()];

    let paths = expected_files(&config);
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Case B Nuc 2 Basal Astrocyte.txt",
            "Case B Nuc 2 Lateral Astrocyte.txt"
        ]
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_per_group_ingest_reads_every_expected_file() {
    let dir = make_temp_dir();
    let config = per_group_config(&dir);
    write_file(
        &dir.join("Case B Basal Astrocyte.txt"),
        &group_file("AstroMicro", &["3.2", "NA", "27.9"]),
    );
    write_file(
        &dir.join("Case B Lateral Astrocyte.txt"),
        &group_file("AstroMicro", &["12.0"]),
    );

    let output = run_stage1(&config).unwrap();
    assert_eq!(output.files_read, 2);
    assert_eq!(output.records.len(), 4);
    assert_eq!(output.markers, vec!["AstroMicro"]);
    assert_eq!(output.records[0].region, "Basal");
    assert_eq!(output.records[3].region, "Lateral");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_expected_file_aborts_ingest() {
    let dir = make_temp_dir();
    let config = per_group_config(&dir);
    write_file(
        &dir.join("Case B Basal Astrocyte.txt"),
        &group_file("AstroMicro", &["3.2"]),
    );

    let err = run_stage1(&config).unwrap_err();
    assert!(matches!(err, InputError::MissingInput(_)));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_per_case_ingest_discovers_markers() {
    let dir = make_temp_dir();
    let mut config = per_group_config(&dir);
    config.layout = LayoutKind::PerCase;
    config.cases = vec!["Case B".to_string(), "Case X".to_string()];
    config.cell_types.clear();
    config.markers.clear();
    config.marker_column = Some(0);
    config.area_column = Some(1);
    config.volume_column = Some(2);

    write_file(
        &dir.join("Case B.txt"),
        "Marker\tArea\tVolume\nOligodendrocyte\t1.0\t12.0\nAstroMicro\t1.0\t3.2\n",
    );
    write_file(
        &dir.join("Case X.txt"),
        "Marker\tArea\tVolume\nAstroMicro\t1.0\t7.0\nMarker\tArea\tVolume\n",
    );

    let output = run_stage1(&config).unwrap();
    assert_eq!(output.files_read, 2);
    assert_eq!(output.records.len(), 4);
    // Repeated header rows are excluded from discovery.
    assert_eq!(output.markers, vec!["AstroMicro", "Oligodendrocyte"]);

    fs::remove_dir_all(&dir).ok();
}
