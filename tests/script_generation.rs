//! Script generation over real input layouts

mod helpers;

use crate::helpers::*;
use niakrun::core::descriptor::DescriptorError;
use niakrun::core::tuning::TuningConfig;
use niakrun::pipelines::{Basc, FmriPreprocess, FmriPreprocessBids, PipelineKind, PreprocessParams, Settings};
use std::path::{Path, PathBuf};

fn settings() -> Settings {
    Settings {
        niak_config_path: PathBuf::from("/local_config"),
        debug: false,
    }
}

#[test]
fn test_preprocess_demographics_script() {
    let dir = tempfile::tempdir().unwrap();
    make_demographics_dataset(dir.path());
    let folder = dir.path().display().to_string();

    let launch = FmriPreprocess::new(dir.path(), Path::new("/out"), "", "", "");
    let script = launch.script().unwrap();

    assert_eq!(
        script.lines(),
        &[
            "opt.folder_out='/out'".to_string(),
            format!("list_subject=fcon_read_demog('{}/cohort_demographics.txt')", folder),
            format!("opt_g.path_database='{}/'", folder),
            "files_in=fcon_get_files(list_subject,opt_g)".to_string(),
        ]
    );
    assert!(script
        .render()
        .ends_with("niak_pipeline_fmri_preprocess(files_in, opt);\n"));
}

#[test]
fn test_preprocess_bids_script_narrows_subjects() {
    let dir = tempfile::tempdir().unwrap();
    make_bids_dataset(dir.path());
    let folder = dir.path().display().to_string();

    let launch = FmriPreprocess::new(dir.path(), Path::new("/out"), "1,3-4", "rest", "");
    let script = launch.script().unwrap();

    assert_eq!(
        script.lines(),
        &[
            "opt.folder_out='/out'".to_string(),
            "opt_gr = struct()".to_string(),
            "opt_gr.subject_list = {1, 3, 4}".to_string(),
            "opt_gr.func_hint = 'rest'".to_string(),
            format!("files_in=niak_grab_bids('{}',opt_gr)", folder),
        ]
    );
}

#[test]
fn test_preprocess_legacy_script() {
    let dir = tempfile::tempdir().unwrap();
    make_legacy_dataset(dir.path());
    let folder = dir.path().display().to_string();

    let launch = FmriPreprocess::new(dir.path(), Path::new("/out"), "", "", "");
    let script = launch.script().unwrap();

    assert_eq!(
        script.lines(),
        &[
            "opt.folder_out='/out'".to_string(),
            format!("files_in.subject1.anat='{}/anat_subject1.mnc.gz'", folder),
            format!(
                "files_in.subject1.fmri.session1.motor='{}/func_motor_subject1.mnc.gz'",
                folder
            ),
            format!("files_in.subject2.anat='{}/anat_subject2.mnc.gz'", folder),
            format!(
                "files_in.subject2.fmri.session1.motor='{}/func_motor_subject2.mnc.gz'",
                folder
            ),
        ]
    );
}

#[test]
fn test_bids_app_script_with_tuning_prelude() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    make_bids_dataset(input.path());

    let yaml = "\
group:
  psom:
    max_queued: 6
\"1-2\":
  smooth_vol:
    fwhm: 4
";
    let launch = FmriPreprocessBids::new(
        input.path(),
        output.path(),
        vec![1, 2],
        TuningConfig::from_yaml(yaml, 4).unwrap(),
        &PreprocessParams::default(),
        false,
        &settings(),
    )
    .unwrap();

    let script = launch.script().unwrap();
    let lines = script.lines();

    assert_eq!(
        &lines[..5],
        &[
            "opt.psom.max_queued=6".to_string(),
            "opt.tune(1).subject=\"sub-0001\"".to_string(),
            "opt.tune(1).smooth_vol.fwhm=4".to_string(),
            "opt.tune(2).subject=\"sub-0002\"".to_string(),
            "opt.tune(2).smooth_vol.fwhm=4".to_string(),
        ]
    );
    assert!(lines[5].starts_with("opt.folder_out='"));
    assert!(lines.contains(&"opt_gr.subject_list = {1, 2}".to_string()));
    assert!(lines.contains(&"opt.slice_timing.flag_skip=true".to_string()));
    assert!(lines.contains(&"opt.size_output = 'all'".to_string()));
    assert!(script
        .render()
        .ends_with("niak_pipeline_fmri_preprocess(files_in, opt);\n"));
}

#[test]
fn test_basc_script_with_cli_option() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().display().to_string();

    let mut launch = Basc::new(dir.path(), Path::new("/out/basc"), "3,5", 100);
    let table = PipelineKind::Basc.descriptor().unwrap().casting_table();
    launch
        .apply_cli_options(
            &table,
            &[("--opt-stability_group-nb_samps".to_string(), "500".to_string())],
        )
        .unwrap();

    let script = launch.script();
    assert_eq!(
        script.lines(),
        &[
            "opt.folder_out='/out/basc'".to_string(),
            "opt_g.min_nb_vol = 100".to_string(),
            "opt_g.type_files = 'rest'".to_string(),
            "opt_g.include_subject = {3, 5}".to_string(),
            format!("files_in = niak_grab_fmri_preprocess('{}',opt_g)", folder),
            "opt.stability_group.nb_samps=500".to_string(),
        ]
    );
    assert!(script
        .render()
        .ends_with("niak_pipeline_stability_rest(files_in, opt);\n"));
}

#[test]
fn test_unknown_option_flag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    make_bids_dataset(dir.path());

    let mut launch = FmriPreprocess::new(dir.path(), Path::new("/out"), "", "", "");
    let table = PipelineKind::FmriPreprocess
        .descriptor()
        .unwrap()
        .casting_table();
    let err = launch
        .apply_cli_options(&table, &[("--opt-no_such_knob".to_string(), "1".to_string())])
        .unwrap_err();

    assert!(matches!(err, DescriptorError::UnknownFlag(_)));
}
