//! Test fixtures - reusable content constants for tests.

/// A small requirements manifest
pub const REQUIREMENTS: &str = "boto3>=1.34\nrequests==2.31.0\n";

/// The same manifest after someone bumped a pin
pub const REQUIREMENTS_BUMPED: &str = "boto3>=1.34\nrequests==2.32.3\n";

/// Stand-in for `python3`.
///
/// Appends its arguments to `$FAKE_PYTHON_LOG`, imitates `-m venv <dir>` by
/// writing `pyvenv.cfg` and copying itself to `<dir>/bin/python`, and
/// succeeds on `-m pip`. Setting `FAKE_PYTHON_FAIL_INSTALL` makes
/// `pip install -r` fail the way an unresolvable pin would.
pub const FAKE_PYTHON: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_PYTHON_LOG"
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
    mkdir -p "$3/bin" || exit 1
    : > "$3/pyvenv.cfg"
    cp "$0" "$3/bin/python" && chmod 755 "$3/bin/python"
    exit $?
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
    case " $* " in
        *" -r "*)
            if [ -n "$FAKE_PYTHON_FAIL_INSTALL" ]; then
                echo "ERROR: No matching distribution found for requests==99" >&2
                exit 1
            fi
            echo "Successfully installed requirements"
            ;;
    esac
    exit 0
fi
echo "fake python: unsupported invocation: $*" >&2
exit 2
"#;

/// Project config that moves every path away from the defaults
pub const CUSTOM_PATHS_CONFIG: &str = r#"
[paths]
manifest = "deps/requirements.txt"
sentinel = "build/deps.stamp"
env_dir = "env"

[bootstrap]
pip = "latest"
"#;
