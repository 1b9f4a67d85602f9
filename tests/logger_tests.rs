use eyre::Result;
use simplexfit::prelude::*;

#[test]
fn log_to_file() -> Result<()> {
    let folder = std::env::temp_dir().join(format!("simplexfit_log_{}", std::process::id()));
    let mut settings = Settings::new();
    settings.log.level = "debug".to_string();
    settings.log.file = Some("run.log".to_string());
    settings.set_output_path(folder.to_string_lossy());

    setup_log(&settings)?;
    let x = minimize_fn(|x| (x[0] - 1.0).powi(2), &[0.0], 1e-12)?;
    tracing::info!("Minimum at {:?}", x);

    assert!(folder.join("run.log").exists());
    // Only one global subscriber can be installed
    assert!(setup_log(&settings).is_err());

    std::fs::remove_dir_all(folder)?;
    Ok(())
}
