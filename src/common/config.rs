//! Stub generation settings

/// What the writer puts in place of a method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodBodyStyle {
    /// `aconst_null; athrow`: the smallest body the verifier accepts.
    #[default]
    ThrowNull,
    /// No `Code` attribute at all. Compilers accept this; the JVM does not.
    Omit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub method_bodies: MethodBodyStyle,
    /// Run the structural verifier on every emitted class file.
    pub verify: bool,
    /// Leave anonymous and local classes out when stubbing a directory.
    pub skip_anonymous_and_local: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method_bodies: MethodBodyStyle::ThrowNull,
            verify: true,
            skip_anonymous_and_local: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.method_bodies, MethodBodyStyle::ThrowNull);
        assert!(config.verify);
        assert!(config.skip_anonymous_and_local);
    }

    #[test]
    fn struct_update_syntax() {
        let config = Config { verify: false, ..Default::default() };
        assert!(!config.verify);
        assert_eq!(config.method_bodies, MethodBodyStyle::ThrowNull);
    }
}
