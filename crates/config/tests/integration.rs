//! Integration tests for configuration loading and precedence

#[cfg(test)]
mod tests {
    use cypack_config::{ColorChoice, Config};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_full_config_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
[general]
color = "never"

[build]
python = "python3.12"
excluded_dirs = ["__pycache__", ".mypy_cache"]

[provision]
env_dir = "runtime"
skip_install = true
"#,
        )
        .await
        .unwrap();

        let config = Config::load_from_file(&path).await.unwrap();
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.build.python, "python3.12");
        assert_eq!(
            config.build.excluded_dirs,
            vec!["__pycache__", ".mypy_cache"]
        );
        assert_eq!(config.provision.env_dir, "runtime");
        assert!(config.provision.skip_install);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp = tempdir().unwrap();
        let err = Config::load_from_file(&temp.path().join("absent.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            cypack_errors::Error::Config(cypack_errors::ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_explicit_path_wins_over_default() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[build]\npython = \"pypy3\"\n")
            .await
            .unwrap();

        let config = Config::load_or_default(Some(path.as_path())).await.unwrap();
        assert_eq!(config.build.python, "pypy3");
    }
}
