//! Command-line parsing

use niakrun::cli::{Cli, Command};
use niakrun::pipelines::PipelineKind;

#[test]
fn test_run_command_defaults() {
    let cli = Cli::try_parse_from(["niakrun", "run", "-p", "basc", "-i", "/in", "-o", "/out"])
        .unwrap();

    let cmd = match cli.command {
        Command::Run(cmd) => cmd,
        other => panic!("expected run, got {:?}", other),
    };
    assert_eq!(cmd.launch.pipeline, PipelineKind::Basc);
    assert_eq!(cmd.launch.subjects, "");
    assert_eq!(cmd.launch.subject_pad, 4);
    assert_eq!(cmd.launch.min_nb_vol, 100);
    assert_eq!(cmd.octave, "octave");
    assert_eq!(cmd.timeout_secs, 10800);
    assert!(!cmd.skip_validation);
    assert!(!cli.verbose);
}

#[test]
fn test_run_command_with_overrides() {
    let cli = Cli::try_parse_from([
        "niakrun",
        "run",
        "--pipeline",
        "fmri-preprocess-bids",
        "--input",
        "/data/bids",
        "--output",
        "/data/out",
        "--subjects",
        "1,3-5",
        "--n-thread",
        "8",
        "--acquisition-type",
        "interleaved",
        "--skip-slice-timing",
        "--group",
        "--opt",
        "--opt-psom-max_queued=4",
        "--opt",
        "--opt_g-min_nb_vol=60",
        "--timeout-secs",
        "600",
    ])
    .unwrap();

    let cmd = match cli.command {
        Command::Run(cmd) => cmd,
        other => panic!("expected run, got {:?}", other),
    };
    assert_eq!(cmd.launch.pipeline, PipelineKind::FmriPreprocessBids);
    assert_eq!(cmd.launch.subjects, "1,3-5");
    assert_eq!(cmd.launch.preprocess.n_thread, 8);
    assert_eq!(
        cmd.launch.preprocess.acquisition_type.as_deref(),
        Some("interleaved")
    );
    assert!(cmd.launch.preprocess.skip_slice_timing);
    assert!(cmd.launch.preprocess.group);
    assert_eq!(
        cmd.launch.options,
        vec![
            ("--opt-psom-max_queued".to_string(), "4".to_string()),
            ("--opt_g-min_nb_vol".to_string(), "60".to_string()),
        ]
    );
    assert_eq!(cmd.timeout_secs, 600);
}

#[test]
fn test_bad_option_pair_is_rejected() {
    let result = Cli::try_parse_from([
        "niakrun", "run", "-p", "basc", "-i", "/in", "-o", "/out", "--opt", "nonsense",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_script_command() {
    let cli = Cli::try_parse_from([
        "niakrun",
        "script",
        "-p",
        "fmri-preprocess",
        "-i",
        "/in",
        "-o",
        "/out",
        "--func-hint",
        "rest",
    ])
    .unwrap();

    match cli.command {
        Command::Script(cmd) => {
            assert_eq!(cmd.launch.pipeline, PipelineKind::FmriPreprocess);
            assert_eq!(cmd.launch.func_hint, "rest");
        }
        other => panic!("expected script, got {:?}", other),
    }
}

#[test]
fn test_worker_command_defaults() {
    let cli = Cli::try_parse_from(["niakrun", "worker", "-d", "/pipe", "-w", "3"]).unwrap();

    match cli.command {
        Command::Worker(cmd) => {
            assert_eq!(cmd.worker_id, 3);
            assert_eq!(cmd.wait_secs, 600);
        }
        other => panic!("expected worker, got {:?}", other),
    }
}

#[test]
fn test_verbose_is_global() {
    let cli = Cli::try_parse_from(["niakrun", "list", "--json", "-v"]).unwrap();
    assert!(cli.verbose);
    match cli.command {
        Command::List(cmd) => assert!(cmd.json),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn test_validate_command_flags() {
    let cli = Cli::try_parse_from([
        "niakrun",
        "validate",
        "-i",
        "/data/bids",
        "--ignore-nifti-headers",
    ])
    .unwrap();

    match cli.command {
        Command::Validate(cmd) => {
            assert!(cmd.ignore_nifti_headers);
            assert!(!cmd.ignore_warnings);
            assert!(cmd.config.is_none());
        }
        other => panic!("expected validate, got {:?}", other),
    }
}

#[test]
fn test_validate_tuning_only() {
    let cli = Cli::try_parse_from(["niakrun", "validate", "-c", "/tune.yaml", "--json"]).unwrap();

    match cli.command {
        Command::Validate(cmd) => {
            assert!(cmd.input.is_none());
            assert_eq!(cmd.config.as_deref(), Some(std::path::Path::new("/tune.yaml")));
            assert!(cmd.json);
        }
        other => panic!("expected validate, got {:?}", other),
    }
}
