use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gmtplot::{
    build_arg_string, Figure, GmtPlotError, HistogramOptions, OptionValue, Options, Table, HISTOGRAM,
};
use gmtplot_session::{
    DataStager, EngineError, ProcessEngine, RecordingEngine, StagedTable, StagingError,
    TempFileStager,
};
use rstest::rstest;

/// Stages every table under a fixed reference and counts stage/release calls.
#[derive(Default)]
struct CountingStager {
    staged: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl DataStager for CountingStager {
    fn stage(&self, _table: &Table) -> Result<StagedTable, StagingError> {
        self.staged.fetch_add(1, Ordering::SeqCst);
        let released = self.released.clone();
        Ok(StagedTable::with_release("@staged", move || {
            released.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

struct Harness {
    figure: Figure,
    engine: Arc<RecordingEngine>,
    stager: Arc<CountingStager>,
}

impl Harness {
    fn new(engine: RecordingEngine) -> Self {
        let engine = Arc::new(engine);
        let stager = Arc::new(CountingStager::default());
        let figure = Figure::new(engine.clone(), stager.clone());
        Self {
            figure,
            engine,
            stager,
        }
    }

    fn staged(&self) -> usize {
        self.stager.staged.load(Ordering::SeqCst)
    }

    fn released(&self) -> usize {
        self.stager.released.load(Ordering::SeqCst)
    }

    fn only_call(&self) -> (String, String) {
        let calls = self.engine.calls();
        assert_eq!(calls.len(), 1, "expected exactly one engine call");
        calls[0].clone()
    }
}

fn table() -> Table {
    Table::File(PathBuf::from("values.txt"))
}

fn options(pairs: Vec<(&str, OptionValue)>) -> Options {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[rstest]
#[case("horizontal", "-A")]
#[case("center", "-F")]
#[case("step", "-S")]
#[case("annotate", "-D")]
#[case("cumulative", "-Q")]
#[case("normal", "-N")]
fn test_true_flag_is_bare_flag(#[case] name: &str, #[case] expected: &str) {
    let args = build_arg_string(&HISTOGRAM, &options(vec![(name, true.into())])).unwrap();
    assert_eq!(args, expected);
}

#[rstest]
#[case("horizontal")]
#[case("center")]
#[case("step")]
#[case("cumulative")]
fn test_false_flag_is_omitted(#[case] name: &str) {
    let args = build_arg_string(&HISTOGRAM, &options(vec![(name, false.into())])).unwrap();
    assert_eq!(args, "");
}

#[rstest]
#[case("region", vec![0.0, 1.0, 0.0, 1.0], "-R0/1/0/1")]
#[case("region", vec![-180.0, 180.0, -90.5, 90.5], "-R-180/180/-90.5/90.5")]
#[case("series", vec![0.0, 100.0, 2.5], "-T0/100/2.5")]
fn test_sequence_joined_with_slash(
    #[case] name: &str,
    #[case] values: Vec<f64>,
    #[case] expected: &str,
) {
    let args = build_arg_string(&HISTOGRAM, &options(vec![(name, values.into())])).unwrap();
    assert_eq!(args, expected);
}

#[test]
fn test_region_series_fill_scenario() -> Result<(), GmtPlotError> {
    let harness = Harness::new(RecordingEngine::new());
    let opts: Options = HistogramOptions::new()
        .region([0i64, 10, 0, 5])
        .series(1i64)
        .fill("red")
        .into();
    harness.figure.histogram(&table(), &opts)?;

    let (module, args) = harness.only_call();
    assert_eq!(module, "histogram");
    assert_eq!(args, "@staged -R0/10/0/5 -T1 -Gred");
    Ok(())
}

#[test]
fn test_cumulative_reverse() -> Result<(), GmtPlotError> {
    let harness = Harness::new(RecordingEngine::new());
    harness
        .figure
        .histogram(&table(), &options(vec![("cumulative", "r".into())]))?;
    let (_, args) = harness.only_call();
    assert!(args.contains("-Qr"));
    Ok(())
}

#[test]
fn test_unknown_option_fails_before_staging() {
    let harness = Harness::new(RecordingEngine::new());
    let err = harness
        .figure
        .histogram(&table(), &options(vec![("foo", 1i64.into())]))
        .unwrap_err();

    assert!(matches!(
        &err,
        GmtPlotError::UnsupportedOption { name, module } if name == "foo" && module == "histogram"
    ));
    assert_eq!(harness.staged(), 0);
    assert!(harness.engine.calls().is_empty());
}

#[test]
fn test_invalid_value_fails_before_staging() {
    let harness = Harness::new(RecordingEngine::new());
    let err = harness
        .figure
        .histogram(&table(), &options(vec![("fill", true.into())]))
        .unwrap_err();

    assert!(matches!(err, GmtPlotError::InvalidOptionValue { .. }));
    assert_eq!(harness.staged(), 0);
}

#[test]
fn test_flags_follow_insertion_order() {
    let forward = options(vec![
        ("step", true.into()),
        ("pen", "1p,black".into()),
        ("barwidth", 0.5f64.into()),
    ]);
    let reverse = options(vec![
        ("barwidth", 0.5f64.into()),
        ("pen", "1p,black".into()),
        ("step", true.into()),
    ]);
    assert_eq!(
        build_arg_string(&HISTOGRAM, &forward).unwrap(),
        "-S -W1p,black -E0.5"
    );
    assert_eq!(
        build_arg_string(&HISTOGRAM, &reverse).unwrap(),
        "-E0.5 -W1p,black -S"
    );
}

#[test]
fn test_translation_is_idempotent() -> Result<(), GmtPlotError> {
    let harness = Harness::new(RecordingEngine::new());
    let opts = options(vec![
        ("projection", "X10c/6c".into()),
        ("frame", vec!["af", "WSne"].into()),
        ("type", 1i64.into()),
    ]);
    harness.figure.histogram(&table(), &opts)?;
    harness.figure.histogram(&table(), &opts)?;

    let calls = harness.engine.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[0].1, "@staged -JX10c/6c -Baf -BWSne -Z1");
    assert_eq!(harness.staged(), 2);
    assert_eq!(harness.released(), 2);
    Ok(())
}

#[test]
fn test_no_options_passes_only_table() -> Result<(), GmtPlotError> {
    let harness = Harness::new(RecordingEngine::new());
    harness.figure.histogram(&table(), &Options::new())?;
    assert_eq!(harness.only_call().1, "@staged");
    Ok(())
}

#[test]
fn test_engine_failure_propagates_and_releases_table() {
    let harness = Harness::new(RecordingEngine::failing("histogram [ERROR]: Option -T parsing failure"));
    let err = harness
        .figure
        .histogram(&table(), &options(vec![("series", "x".into())]))
        .unwrap_err();

    match err {
        GmtPlotError::Engine(EngineError::ModuleFailed { module, stderr, .. }) => {
            assert_eq!(module, "histogram");
            assert!(stderr.contains("Option -T parsing failure"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(harness.staged(), 1);
    assert_eq!(harness.released(), 1);
}

#[test]
fn test_staging_failure_propagates_without_engine_call() {
    let engine = Arc::new(RecordingEngine::new());
    let figure = Figure::new(engine.clone(), Arc::new(TempFileStager::new()));
    let err = figure
        .histogram(
            &Table::Vectors(vec![vec![1.0, 2.0], vec![3.0]]),
            &options(vec![("fill", "red".into())]),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        GmtPlotError::Staging(StagingError::MismatchedColumns { .. })
    ));
    assert!(engine.calls().is_empty());
}

#[test]
fn test_in_memory_table_staged_then_removed() -> Result<(), GmtPlotError> {
    let dir = tempfile::tempdir().map_err(StagingError::from)?;
    let engine = Arc::new(RecordingEngine::new());
    let figure = Figure::new(engine.clone(), Arc::new(TempFileStager::in_dir(dir.path())));

    figure.histogram(
        &Table::from(vec![1.0, 2.0, 2.0, 3.0]),
        &options(vec![("series", 1i64.into()), ("center", true.into())]),
    )?;

    let (_, args) = engine.calls().remove(0);
    let (reference, flags) = args.split_once(' ').unwrap();
    assert_eq!(flags, "-T1 -F");
    assert!(PathBuf::from(reference).starts_with(dir.path()));
    assert!(!PathBuf::from(reference).exists());
    Ok(())
}

#[test]
fn test_repeated_normal_curves() {
    let args = build_arg_string(
        &HISTOGRAM,
        &options(vec![("normal", vec![0i64, 1, 2].into())]),
    )
    .unwrap();
    assert_eq!(args, "-N0 -N1 -N2");
}

#[cfg(unix)]
#[rstest]
#[case("/data/bob's.txt")]
#[case("/data/say\"hi\".txt")]
#[case("/data/bob's values.txt")]
fn test_file_path_with_quotes_reaches_engine(#[case] path: &str) -> Result<(), GmtPlotError> {
    let figure = Figure::new(
        Arc::new(ProcessEngine::new("true")),
        Arc::new(TempFileStager::new()),
    );
    figure.histogram(&Table::from(path), &options(vec![("fill", "red".into())]))
}
