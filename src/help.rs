//! Long-form help for build arguments.

/// Printed by `build-args overview`.
pub const BUILD_ARGS_HELP: &str = r#"Build Arguments Overview

  Build arguments are variables passed in from outside of the build that build
  files can query to determine how the build works.

How build arguments are set

  First, system default arguments are set based on the current system. The
  built-in arguments are:
   - host_cpu
   - host_os
   - current_cpu
   - current_os
   - target_cpu
   - target_os

  Next, project-specific overrides are applied. These are specified in the
  default_args table of the build manifest. They are never reported as
  unused.

  If specified, arguments from --args-file and --arg are used.

  Last, for a toolchain with toolchain_args, those overrides are applied. The
  use-case is a toolchain building code for a different platform that always
  wants, for example, a fixed current_os.

  If you specify an override for a build argument that never appears in a
  declare_args block, `build-args check` reports an error and suggests the
  closest declared name.

How build arguments are used

  Declare an argument with a default value in a declare_args block. The
  default applies only if none of the steps above set the argument.

  Each argument may be declared in exactly one place in the entire build. The
  same file evaluated again for another toolchain is not a second
  declaration.
"#;
