#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test_case("#line 12 \"a.idl\"", "# 12 \"a.idl\"" ; "marker prefix")]
#[test_case("#line 1 \"C:\\\\idl\\\\a.idl\"", "# 1 \"C:\\idl\\a.idl\"" ; "doubled backslashes")]
#[test_case("struct A {", "struct A {" ; "ordinary line")]
#[test_case("# 3 \"C:\\\\a.idl\"", "# 3 \"C:\\\\a.idl\"" ; "short marker untouched")]
fn rewrite_line_marker___various_lines___rewritten_only_for_markers(input: &str, expected: &str) {
    assert_eq!(rewrite_line_marker(input), expected);
}

#[cfg(unix)]
mod process {
    use super::*;
    use tempfile::TempDir;

    fn sh(script: &str) -> CommandLine {
        CommandLine::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn ToolInvoker___run___returns_exit_code() {
        let invoker = ToolInvoker::new().unwrap();

        let code = invoker.run(&sh("exit 3"), &RunOptions::default()).unwrap();

        assert_eq!(code, 3);
    }

    #[test]
    fn ToolInvoker___run_checked___non_zero_is_error() {
        let invoker = ToolInvoker::new().unwrap();

        let err = invoker
            .run_checked(&sh("echo broken >&2; exit 2"), &RunOptions::default())
            .unwrap_err();

        assert_eq!(err.exit_code(), Some(2));
        assert!(err.to_string().contains("sh returned an error"));
    }

    #[test]
    fn ToolInvoker___run___missing_program_is_launch_error() {
        let invoker = ToolInvoker::new().unwrap();

        let err = invoker
            .run(&CommandLine::new("/nonexistent/ddsgen-tool"), &RunOptions::default())
            .unwrap_err();

        assert!(matches!(err, ToolchainError::Launch { .. }));
    }

    #[test]
    fn ToolInvoker___run___redirect_rewrites_line_markers() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a.cc");
        let invoker = ToolInvoker::new().unwrap();
        let script = r##"printf '%s\n' '#line 1 "C:\\idl\\a.idl"' 'struct A { long x; };'"##;

        let code = invoker
            .run(&sh(script), &RunOptions::default().with_redirect(&out))
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "# 1 \"C:\\idl\\a.idl\"\nstruct A { long x; };\n"
        );
    }

    #[test]
    fn ToolInvoker___run___large_output_on_both_streams_completes() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("big.txt");
        let invoker = ToolInvoker::new().unwrap();

        let code = invoker
            .run(
                &sh("seq 1 50000 >&2; seq 1 100000"),
                &RunOptions::default().with_redirect(&out),
            )
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap().lines().count(), 100000);
    }

    #[test]
    fn ToolInvoker___run___missing_program_leaves_redirect_target_alone() {
        let dir = TempDir::new().unwrap();
        let previous = dir.path().join("previous.cc");
        let absent = dir.path().join("absent.cc");
        std::fs::write(&previous, "kept\n").unwrap();
        let invoker = ToolInvoker::new().unwrap();
        let missing = CommandLine::new("/nonexistent/ddsgen-tool");

        let first = invoker
            .run(&missing, &RunOptions::default().with_redirect(&previous))
            .unwrap_err();
        let second = invoker
            .run(&missing, &RunOptions::default().with_redirect(&absent))
            .unwrap_err();

        assert!(matches!(first, ToolchainError::Launch { .. }));
        assert!(matches!(second, ToolchainError::Launch { .. }));
        assert_eq!(std::fs::read_to_string(&previous).unwrap(), "kept\n");
        assert!(!absent.exists());
    }

    #[test]
    fn ToolInvoker___run___unwritable_redirect_is_redirect_error() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("missing").join("a.cc");
        let invoker = ToolInvoker::new().unwrap();

        let err = invoker
            .run(&sh("exit 0"), &RunOptions::default().with_redirect(&out))
            .unwrap_err();

        assert!(matches!(err, ToolchainError::Redirect { .. }));
    }
}
