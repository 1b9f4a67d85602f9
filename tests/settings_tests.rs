use eyre::Result;
use simplexfit::prelude::*;
use std::path::PathBuf;

fn write_config(name: &str, contents: &str) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!(
        "simplexfit_{}_{}.toml",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Test reading a complete settings file
#[test]
fn test_read_settings() -> Result<()> {
    let path = write_config(
        "complete",
        r#"
[optimizer]
tolerance = 1e-10

[weibull]
method = "grid"
precision = 25

[log]
level = "debug"
file = "fit.log"

[output]
path = "results"
write = true
"#,
    )?;

    let settings = read_settings(&path)?;
    assert_eq!(settings.optimizer.tolerance, 1e-10);
    assert_eq!(settings.weibull.method, Method::Grid);
    assert_eq!(settings.weibull.precision, 25);
    assert_eq!(settings.log.level, "debug");
    assert_eq!(settings.log.file.as_deref(), Some("fit.log"));
    assert_eq!(settings.output.path, "results");
    assert!(settings.output.write);

    std::fs::remove_file(path)?;
    Ok(())
}

/// Missing sections fall back to their defaults
#[test]
fn test_settings_defaults() -> Result<()> {
    let path = write_config("partial", "[weibull]\nprecision = 10\n")?;

    let settings = read_settings(&path)?;
    assert_eq!(settings.optimizer.tolerance, DEFAULT_TOLERANCE);
    assert_eq!(settings.weibull.method, Method::NelderMead);
    assert_eq!(settings.weibull.precision, 10);
    assert_eq!(settings.log.level, "info");
    assert_eq!(settings.output.path, "outputs");

    std::fs::remove_file(path)?;
    Ok(())
}

/// Invalid values are rejected when reading
#[test]
fn test_invalid_settings() -> Result<()> {
    let path = write_config("invalid", "[optimizer]\ntolerance = -1.0\n")?;
    assert!(read_settings(&path).is_err());
    std::fs::remove_file(path)?;

    let path = write_config("unknown_method", "[weibull]\nmethod = \"simulated\"\n")?;
    assert!(read_settings(&path).is_err());
    std::fs::remove_file(path)?;
    Ok(())
}

/// Test Settings serialization to JSON
#[test]
fn test_settings_serialization() -> Result<()> {
    let mut settings = Settings::new();
    settings.set_method(Method::Grid);
    settings.set_tolerance(1e-8);

    let json = serde_json::to_string(&settings)?;
    assert!(json.contains("\"method\":\"grid\""));

    let folder = std::env::temp_dir().join(format!("simplexfit_settings_{}", std::process::id()));
    settings.set_output_path(folder.to_string_lossy());
    let written = settings.write()?;
    let contents = std::fs::read_to_string(&written)?;
    assert!(contents.contains("\"tolerance\": 1e-8"));

    std::fs::remove_dir_all(folder)?;
    Ok(())
}
