//! Integration tests for error types

#[cfg(test)]
mod tests {
    use cypack_errors::*;

    #[test]
    fn test_error_conversion() {
        let build_err = BuildError::ToolchainFailed {
            message: "exit status: 1".into(),
        };
        let err: Error = build_err.into();
        assert!(matches!(err, Error::Build(_)));
    }

    #[test]
    fn test_error_display() {
        let err = BuildError::TraversalFailed {
            path: "/project/locked".into(),
            message: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "traversal failed at /project/locked: permission denied"
        );
    }

    #[test]
    fn test_error_clone() {
        let err = ProvisionError::EnvironmentCreationFailed {
            message: "venv module missing".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
    }

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io_with_path(&io_err, "/project/missing");
        match err {
            Error::Io { path, .. } => {
                assert_eq!(
                    path.as_deref(),
                    Some(std::path::Path::new("/project/missing"))
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_user_facing_surface() {
        let err: Error = BuildError::OperationInProgress.into();
        assert_eq!(err.user_code(), Some("build.operation_in_progress"));
        assert!(err.is_retryable());
        assert!(err.user_hint().is_some());

        let err: Error = ProvisionError::DependencyInstallFailed {
            message: "no matching distribution".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("provision.dependency_install_failed"));
        assert!(err.is_retryable());
    }
}
