use super::*;
use std::io::Write;

#[test]
fn default_config_has_all_stages_parallel() {
    let cfg = ClusterConfig::default();
    assert!(cfg.parallel_stage2());
    assert!(cfg.parallel_stage4());
    assert!(cfg.parallel_stage5());
    assert_eq!(cfg.kernel(), Kernel::Scalar);
}

#[test]
fn sequential_disables_every_stage() {
    let cfg = ClusterConfig::sequential();
    assert!(!cfg.parallel_stage2());
    assert!(!cfg.parallel_stage4());
    assert!(!cfg.parallel_stage5());
}

#[test]
fn thread_config_zero_is_auto() {
    assert_eq!(ThreadConfig::from_count(0), ThreadConfig::Auto);
    assert_eq!(ThreadConfig::from_count(4), ThreadConfig::Fixed(4));
}

#[test]
fn builder_methods_compose() {
    let cfg = ClusterConfig::default()
        .with_kernel(Kernel::AvxOptNoSqrt)
        .with_parallel_stage4(false)
        .with_threads_stage2(ThreadConfig::Fixed(8))
        .with_check_alignment(true);

    assert_eq!(cfg.kernel(), Kernel::AvxOptNoSqrt);
    assert!(!cfg.parallel_stage4());
    assert_eq!(cfg.threads_stage2(), ThreadConfig::Fixed(8));
    assert!(cfg.check_alignment());
}

#[test]
fn loads_partial_overrides_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "kernel = \"avx_opt\"\nparallel_stage5 = false").unwrap();

    let cfg = ClusterConfig::from_file(file.path()).unwrap();
    assert_eq!(cfg.kernel(), Kernel::AvxOpt);
    assert!(!cfg.parallel_stage5());
    // Untouched fields keep their default.
    assert!(cfg.parallel_stage2());
}
