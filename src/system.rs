//! Host platform detection and the implicitly declared system arguments
//!
//! Six arguments exist in every toolchain context before any build file
//! runs: the host OS and CPU (detected here) and empty placeholders for the
//! target and current OS/CPU, which toolchain overrides fill in later.

use build_args_value::{KeyValueMap, Value};
use serde::{Deserialize, Serialize};

use crate::error::ArgsError;

pub const HOST_OS: &str = "host_os";
pub const HOST_CPU: &str = "host_cpu";
pub const TARGET_OS: &str = "target_os";
pub const TARGET_CPU: &str = "target_cpu";
pub const CURRENT_OS: &str = "current_os";
pub const CURRENT_CPU: &str = "current_cpu";

/// Every implicitly declared system argument.
pub const SYSTEM_VAR_NAMES: &[&str] = &[
    HOST_OS,
    HOST_CPU,
    TARGET_OS,
    TARGET_CPU,
    CURRENT_OS,
    CURRENT_CPU,
];

/// Source of the raw host architecture string.
pub trait HostPlatform {
    /// Architecture as the operating system reports it (e.g. "x86_64").
    fn os_arch(&self) -> String;
}

/// The machine this process runs on.
///
/// Reads the kernel's machine name rather than the architecture this binary
/// was compiled for, so a 32-bit build on a 64-bit host still reports the
/// 64-bit CPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePlatform;

impl HostPlatform for NativePlatform {
    #[cfg(unix)]
    fn os_arch(&self) -> String {
        match nix::sys::utsname::uname() {
            Ok(info) => info.machine().to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "uname failed, using compile-time architecture");
                std::env::consts::ARCH.to_string()
            }
        }
    }

    #[cfg(not(unix))]
    fn os_arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }
}

/// Fixed platform, for tests and for reproducing another host's view.
#[derive(Debug, Clone)]
pub struct FixedPlatform(pub String);

impl HostPlatform for FixedPlatform {
    fn os_arch(&self) -> String {
        self.0.clone()
    }
}

/// OS tag of the host this binary was built for.
pub fn host_os() -> &'static str {
    if cfg!(windows) {
        "win"
    } else if cfg!(target_os = "macos") {
        "mac"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "freebsd") {
        "freebsd"
    } else if cfg!(target_os = "aix") {
        "aix"
    } else if cfg!(target_os = "openbsd") {
        "openbsd"
    } else if cfg!(target_os = "haiku") {
        "haiku"
    } else if cfg!(target_os = "solaris") {
        "solaris"
    } else if cfg!(target_os = "netbsd") {
        "netbsd"
    } else {
        std::env::consts::OS
    }
}

/// Map a raw architecture string to its canonical CPU tag.
pub fn canonical_cpu(os_arch: &str) -> Result<&'static str, ArgsError> {
    let cpu = match os_arch {
        "x86" | "BePC" => "x86",
        "x86_64" => "x64",
        "aarch64" | "arm64" => "arm64",
        arch if arch.starts_with("arm") => "arm",
        "mips" => "mipsel",
        "mips64" => "mips64el",
        "s390x" => "s390x",
        // Endianness is handled by the build files, both share one toolchain.
        "ppc64" | "ppc64le" => "ppc64",
        "riscv32" => "riscv32",
        "riscv64" => "riscv64",
        "e2k" => "e2k",
        "loongarch64" => "loong64",
        other => return Err(ArgsError::UnknownHostArchitecture(other.to_string())),
    };
    Ok(cpu)
}

/// Detected host OS and CPU tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub os: String,
    pub cpu: String,
}

impl HostInfo {
    pub fn new(os: impl Into<String>, cpu: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            cpu: cpu.into(),
        }
    }

    /// Detect the host through `platform`.
    pub fn detect(platform: &dyn HostPlatform) -> Result<Self, ArgsError> {
        let raw = platform.os_arch();
        let cpu = canonical_cpu(&raw)?;
        tracing::debug!(os = host_os(), raw_arch = %raw, cpu, "detected host platform");
        Ok(Self::new(host_os(), cpu))
    }

    pub fn native() -> Result<Self, ArgsError> {
        Self::detect(&NativePlatform)
    }

    /// Default values of the six system arguments for this host.
    pub fn system_defaults(&self) -> KeyValueMap {
        let empty = Value::string("");
        let mut values = KeyValueMap::new();
        values.insert(HOST_OS.to_string(), Value::string(self.os.clone()));
        values.insert(TARGET_OS.to_string(), empty.clone());
        values.insert(CURRENT_OS.to_string(), empty.clone());
        values.insert(HOST_CPU.to_string(), Value::string(self.cpu.clone()));
        values.insert(TARGET_CPU.to_string(), empty.clone());
        values.insert(CURRENT_CPU.to_string(), empty);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_cpu_table() {
        let cases = [
            ("x86", "x86"),
            ("BePC", "x86"),
            ("x86_64", "x64"),
            ("aarch64", "arm64"),
            ("arm64", "arm64"),
            ("armv7l", "arm"),
            ("arm", "arm"),
            ("mips", "mipsel"),
            ("mips64", "mips64el"),
            ("s390x", "s390x"),
            ("ppc64", "ppc64"),
            ("ppc64le", "ppc64"),
            ("riscv32", "riscv32"),
            ("riscv64", "riscv64"),
            ("e2k", "e2k"),
            ("loongarch64", "loong64"),
        ];
        for (raw, expected) in cases {
            assert_eq!(canonical_cpu(raw).unwrap(), expected, "raw arch {}", raw);
        }
    }

    #[test]
    fn test_unknown_architecture_is_error() {
        let err = canonical_cpu("vax").unwrap_err();
        assert_eq!(err, ArgsError::UnknownHostArchitecture("vax".to_string()));
        assert!(HostInfo::detect(&FixedPlatform("sparc".to_string())).is_err());
    }

    #[test]
    fn test_detect_uses_platform() {
        let host = HostInfo::detect(&FixedPlatform("aarch64".to_string())).unwrap();
        assert_eq!(host.cpu, "arm64");
        assert_eq!(host.os, host_os());
    }

    #[test]
    fn test_system_defaults() {
        let host = HostInfo::new("linux", "x64");
        let values = host.system_defaults();

        assert_eq!(values.len(), SYSTEM_VAR_NAMES.len());
        assert_eq!(values[HOST_OS], Value::string("linux"));
        assert_eq!(values[HOST_CPU], Value::string("x64"));
        for name in [TARGET_OS, TARGET_CPU, CURRENT_OS, CURRENT_CPU] {
            assert_eq!(values[name], Value::string(""), "{}", name);
            assert!(values[name].origin().is_none());
        }
    }
}
